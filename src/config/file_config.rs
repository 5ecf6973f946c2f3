use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_path: Option<String>,
    pub bin_capacity: Option<usize>,
    /// Trigger recorded when a command is not given `--trigger`.
    pub default_trigger: Option<String>,
    /// EnvFilter directive, e.g. "debug" or "vinyl_bins=trace".
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_full_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
db_path = "/srv/vinyl/inventory.db"
bin_capacity = 40
default_trigger = "front-desk"
log_level = "debug"
"#
        )
        .unwrap();

        let config = FileConfig::load(file.path()).unwrap();

        assert_eq!(config.db_path.as_deref(), Some("/srv/vinyl/inventory.db"));
        assert_eq!(config.bin_capacity, Some(40));
        assert_eq!(config.default_trigger.as_deref(), Some("front-desk"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "bin_capacity = 30").unwrap();

        let config = FileConfig::load(file.path()).unwrap();

        assert_eq!(config.bin_capacity, Some(30));
        assert!(config.db_path.is_none());
        assert!(config.default_trigger.is_none());
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "bin_capacity = \"lots\"").unwrap();

        let err = FileConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = FileConfig::load(Path::new("/nonexistent/vinyl-bins.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
