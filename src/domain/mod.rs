//! Core domain types and ledger logic.

pub mod keys;
pub mod instrument;
pub mod position;
pub mod portfolio;
pub mod market;
pub mod seed;
pub mod config;
pub mod ledger;
pub mod error;
