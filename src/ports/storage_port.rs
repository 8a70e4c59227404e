//! Key-value persistence port.

use crate::domain::error::LedgerError;

/// String-keyed, string-valued store standing in for browser local storage.
///
/// Writes are not transactional: each call commits on its own.
pub trait StoragePort {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError>;

    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError>;

    fn remove(&self, key: &str) -> Result<(), LedgerError>;

    fn keys(&self) -> Result<Vec<String>, LedgerError>;

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, LedgerError> {
        Ok(self
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }
}

impl<T: StoragePort + ?Sized> StoragePort for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), LedgerError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, LedgerError> {
        (**self).keys()
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, LedgerError> {
        (**self).keys_with_prefix(prefix)
    }
}
