//! Resolver configuration.
//!
//! Controls how flag names are derived and whether resolved values are
//! checked by the validation layer.
//!
//! # Example YAML
//!
//! ```yaml
//! name_case: snake
//! validate: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use argz_core::{NameCase, NameConverter};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings applied to every resolution.
///
/// # Examples
///
/// ```
/// use argz_core::NameCase;
/// use argz_document::ResolverConfig;
///
/// let config: ResolverConfig = serde_yaml::from_str("name_case: camel").unwrap();
/// assert_eq!(config.name_case, NameCase::Camel);
/// assert!(config.validate);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Convention used to derive flag names from field keys.
    #[serde(default)]
    pub name_case: NameCase,
    /// Whether the resolved value is checked against the schema.
    #[serde(default = "default_validate")]
    pub validate: bool,
}

fn default_validate() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            name_case: NameCase::default(),
            validate: default_validate(),
        }
    }
}

impl ResolverConfig {
    /// Loads configuration from a YAML (or JSON) file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DocumentError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::DocumentError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DocumentError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::DocumentError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// The configured name converter.
    pub fn converter(&self) -> Arc<dyn NameConverter> {
        Arc::new(self.name_case)
    }
}
