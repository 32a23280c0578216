//! Error handling for the restgen library.
//!
//! Generation itself never fails: unmodeled shapes degrade to placeholders and
//! are reported through [`crate::diagnostics::Diagnostics`]. The `Error` type
//! defined here covers the steps around generation that can legitimately
//! fail, namely loading input documents, configuration files and custom stub
//! templates.
//!
//! # Examples
//!
//! ```
//! use restgen_core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     // Operations that might fail...
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result type for restgen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for restgen operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Input document error
    #[error("Document error: {0}")]
    Document(String),

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new document error
    pub fn document<S: Into<String>>(msg: S) -> Self {
        Self::Document(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }
}
