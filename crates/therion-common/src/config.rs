//! Per-invocation configuration for parsing and inclusion.
//!
//! A [`ParseConfig`] value is threaded through every top-level call; nothing
//! in the workspace reads process-wide defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{Result, TherionError};
use crate::types::{Encoding, LineEnding};

/// Configuration for one parse/serialize/expand invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Encoding assumed when a buffer declares none.
    pub default_encoding: Encoding,
    /// Encoding names accepted by `encoding` directives.
    pub supported_encodings: Vec<Encoding>,
    /// Extension (without the dot) appended to `input` targets lacking one.
    pub default_extension: String,
    /// Separator placed before `#` on programmatically built lines.
    pub comment_separator: String,
    /// Terminator used when serializing lines.
    pub line_ending: LineEnding,
    /// Maximum `input` recursion depth; `None` expands everything reachable.
    pub max_include_depth: Option<u32>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            default_encoding: constants::DEFAULT_ENCODING,
            supported_encodings: Encoding::ALL.to_vec(),
            default_extension: constants::DEFAULT_EXTENSION.to_string(),
            comment_separator: constants::DEFAULT_COMMENT_SEPARATOR.to_string(),
            line_ending: LineEnding::default(),
            max_include_depth: None,
        }
    }
}

impl ParseConfig {
    /// Loads a configuration from a JSON file; missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TherionError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks internal consistency of the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the default encoding is not itself supported.
    pub fn validate(&self) -> Result<()> {
        if !self.supported_encodings.contains(&self.default_encoding) {
            return Err(TherionError::encoding(format!(
                "default encoding {} is not in the supported set",
                self.default_encoding
            )));
        }
        Ok(())
    }

    /// Parses an encoding name and checks it against the supported set.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or not supported here.
    pub fn supported_encoding(&self, name: &str) -> Result<Encoding> {
        let encoding: Encoding = name.parse()?;
        if self.supported_encodings.contains(&encoding) {
            Ok(encoding)
        } else {
            Err(TherionError::encoding(format!(
                "encoding {encoding} is not supported by this configuration"
            )))
        }
    }
}
