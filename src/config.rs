//! Rebuild job configuration, loaded from TOML.
//!
//! Every section has defaults, so an empty file (or no file) is valid:
//!
//! ```toml
//! [feed]
//! first_n_distinct_handles = 5
//! size = 500
//!
//! [feed.weights]
//! time = 1.0
//! popularity = 2.0
//!
//! [tessellation]
//! name = "global"
//! min_separation = 0.02
//! ```

use crate::feed::FeedConfig;
use crate::tessellation::TessellationConfig;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub tessellation: TessellationConfig,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn validate(&self) -> Result<()> {
        self.feed.validate()?;
        self.tessellation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_empty_is_default() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.feed.first_n_distinct_handles, 5);
        assert_eq!(config.feed.size, None);
        assert_eq!(config.tessellation.name, "global");
        assert_eq!(config.tessellation.min_separation, 0.02);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
            [feed]
            size = 100

            [feed.weights]
            popularity = 2.5
            "#,
        )
        .unwrap();
        assert_eq!(config.feed.size, Some(100));
        assert_eq!(config.feed.weights.popularity, 2.5);
        assert_eq!(config.feed.weights.time, 1.0);
        assert_eq!(config.feed.time_decay.k, 0.01);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::from_toml_str("[feed.weights]\ntime = -2.0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = Config::from_toml_str("[feed]\nsize = \"many\"\n").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skyfeed.toml");
        std::fs::write(&path, "[tessellation]\nmin_separation = 0.05\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.tessellation.min_separation, 0.05);
    }
}
