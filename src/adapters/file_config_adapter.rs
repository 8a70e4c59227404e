//! INI file configuration adapter.

use crate::domain::error::LedgerError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    /// Load `path`, reporting failures as a config parse error.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        Self::from_file(path).map_err(|e| LedgerError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Configuration with no keys; every lookup yields its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const FULL: &str = r#"
[storage]
backend = sqlite
path = /var/lib/stockledger/ledger.db
pool_size = 2

[market]
volatility_pct = 1.5
min_price = 0.05
seed = 42

[wallet]
default = C1EuT9VokAKLiW7i2ingX3AAKdCXRyFep7pvKQCyTukJ
"#;

    #[test]
    fn from_string_parses_all_sections() {
        let adapter = FileConfigAdapter::from_string(FULL).unwrap();
        assert_eq!(
            adapter.get_string("storage", "backend"),
            Some("sqlite".to_string())
        );
        assert_eq!(adapter.get_int("storage", "pool_size", 4), 2);
        assert_eq!(adapter.get_double("market", "volatility_pct", 2.0), 1.5);
        assert_eq!(adapter.get_int("market", "seed", 0), 42);
        assert_eq!(
            adapter.get_string("wallet", "default"),
            Some("C1EuT9VokAKLiW7i2ingX3AAKdCXRyFep7pvKQCyTukJ".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[storage]\npath = x.db\n").unwrap();
        assert_eq!(adapter.get_string("storage", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[storage]\npool_size = abc\n").unwrap();
        assert_eq!(adapter.get_int("storage", "pool_size", 4), 4);
    }

    #[test]
    fn get_double_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[market]\n").unwrap();
        assert_eq!(adapter.get_double("market", "min_price", 0.01), 0.01);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[storage]\nbackend = memory\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("storage", "backend"),
            Some("memory".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/stockledger.ini");
        assert!(result.is_err());
    }

    #[test]
    fn load_maps_failure_to_config_parse() {
        let path = Path::new("/nonexistent/path/stockledger.ini");
        match FileConfigAdapter::load(path) {
            Err(LedgerError::ConfigParse { file, .. }) => {
                assert!(file.ends_with("stockledger.ini"))
            }
            Err(other) => panic!("expected ConfigParse, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn empty_yields_defaults() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("storage", "backend"), None);
        assert_eq!(adapter.get_int("storage", "pool_size", 4), 4);
    }
}
