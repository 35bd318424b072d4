//! Optional TOML configuration for the command line driver
//!
//! ```toml
//! [background]
//! history = 300
//! var_threshold = 25.0
//! detect_shadows = false
//! ```

use anyhow::{Context, Result};
use cvbind_cv::Mog2Settings;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CvbindConfig {
    pub background: Mog2Settings,
}

pub fn load_config(path: &Path) -> Result<CvbindConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: CvbindConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    config
        .background
        .validate()
        .with_context(|| format!("Invalid [background] settings in {:?}", path))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_table_keeps_defaults() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "[background]\nhistory = 120\ndetect_shadows = false")?;

        let config = load_config(file.path())?;
        assert_eq!(config.background.history, 120);
        assert!(!config.background.detect_shadows);
        assert_eq!(config.background.var_threshold, 16.0);
        Ok(())
    }

    #[test]
    fn test_empty_file_is_all_defaults() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        let config = load_config(file.path())?;
        assert_eq!(config.background, Mog2Settings::default());
        Ok(())
    }

    #[test]
    fn test_invalid_settings_are_reported() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "[background]\nhistory = 0")?;
        assert!(load_config(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/cvbind.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
