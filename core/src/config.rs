//! Validation options.
//!
//! [`ValidateOptions`] tunes how a validation call walks a schema. The
//! defaults are what [`Schema::validate`](crate::Schema::validate) uses;
//! options can also be loaded from YAML so a host application keeps them
//! next to its other settings.
//!
//! # Example YAML
//!
//! ```yaml
//! max_depth: 64
//! allow_omitted_optional: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default limit on schema nesting walked by one validation call.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Errors raised while loading or saving [`ValidateOptions`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Knobs for a validation call.
///
/// Missing YAML fields take their default values.
///
/// # Examples
///
/// ```
/// use shapecheck_core::ValidateOptions;
///
/// let options = ValidateOptions::from_yaml_str("allow_omitted_optional: true").unwrap();
/// assert!(options.allow_omitted_optional);
/// assert_eq!(options.max_depth, shapecheck_core::DEFAULT_MAX_DEPTH);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateOptions {
    /// Deepest schema nesting a validation may walk before failing with
    /// [`ErrorKind::DepthExceeded`](crate::ErrorKind::DepthExceeded).
    pub max_depth: usize,
    /// Lets an object field wrapped in [`optional`](crate::optional) be
    /// left out of the input entirely. When `false`, the key must be present
    /// (possibly holding `nil`).
    pub allow_omitted_optional: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            allow_omitted_optional: false,
        }
    }
}

impl ValidateOptions {
    /// Sets [`max_depth`](Self::max_depth).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets [`allow_omitted_optional`](Self::allow_omitted_optional).
    pub fn with_omitted_optional(mut self, allow: bool) -> Self {
        self.allow_omitted_optional = allow;
        self
    }

    /// Parses options from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the document is malformed.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads options from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let options = serde_yaml::from_reader(reader)?;
        Ok(options)
    }

    /// Saves the options as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be written, or
    /// [`ConfigError::Yaml`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
