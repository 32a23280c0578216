//! Configuration management for restgen code generation.
//!
//! This module defines the `Config` struct that controls naming, grouping and
//! output conventions of a generation run. The configuration can be created
//! programmatically or loaded from a YAML or TOML file.
//!
//! # Examples
//!
//! ```no_run
//! use restgen_core::config::Config;
//!
//! // Create a new config programmatically
//! let mut config = Config::new("web/src/services");
//! config.ignores.push("RawExtension".to_string());
//! config.generate_types = true;
//! ```

// Internal imports (std, crate)
use std::path::Path;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Metadata key holding the OpenAPI tags of a route.
pub const OPENAPI_TAGS_KEY: &str = "openapi.tags";

/// Configuration for a restgen generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Output directory for generated files
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// File extension of generated files (`api.<group>.<ext>`, `types.d.<ext>`)
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Namespace wrapping every declaration
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Route metadata key carrying an explicit front-end function name
    #[serde(default = "default_api_name_key")]
    pub api_name_key: String,

    /// Group used for routes without an OpenAPI tag
    #[serde(default = "default_group")]
    pub default_group: String,

    /// First line of every stub file
    #[serde(default = "default_import_line")]
    pub import_line: String,

    /// Whether to emit the declaration file
    #[serde(default = "default_true")]
    pub generate_types: bool,

    /// Type names rendered as `any` with a manual-conversion warning
    #[serde(default)]
    pub ignores: Vec<String>,

    /// Type names never walked and always rendered as `any`
    #[serde(default = "default_opaque_types")]
    pub opaque_types: Vec<String>,

    /// Internal helper type whose fields are never emitted
    #[serde(default = "default_sentinel_type")]
    pub sentinel_type: String,

    /// Optional path to a Tera template replacing the built-in stub template
    #[serde(default)]
    pub stub_template: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(default_output_dir())
    }
}

impl Config {
    /// Create a new Config with default values
    pub fn new(output_dir: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            extension: default_extension(),
            namespace: default_namespace(),
            api_name_key: default_api_name_key(),
            default_group: default_group(),
            import_line: default_import_line(),
            generate_types: true,
            ignores: Vec::new(),
            opaque_types: default_opaque_types(),
            sentinel_type: default_sentinel_type(),
            stub_template: None,
        }
    }

    /// Load configuration from a file
    ///
    /// Files ending in `.toml` are read as TOML, everything else as YAML.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let config: Self = if is_toml(path) {
            toml::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject values that would produce unusable output
    pub fn validate(&self) -> crate::Result<()> {
        if self.extension.trim().is_empty() {
            return Err(crate::Error::config("extension must not be empty"));
        }
        if self.namespace.trim().is_empty() || self.namespace.contains(char::is_whitespace) {
            return Err(crate::Error::config(format!(
                "namespace '{}' is not a valid identifier",
                self.namespace
            )));
        }
        if self.default_group.trim().is_empty() {
            return Err(crate::Error::config("default_group must not be empty"));
        }
        Ok(())
    }

    /// Save configuration to a file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let content = if is_toml(path) {
            toml::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)?
        };
        fs::write(path, content).await?;
        Ok(())
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

fn default_output_dir() -> String {
    "services".to_string()
}

fn default_extension() -> String {
    "ts".to_string()
}

fn default_namespace() -> String {
    "API".to_string()
}

fn default_api_name_key() -> String {
    "GlobalApiName".to_string()
}

fn default_group() -> String {
    "api".to_string()
}

fn default_import_line() -> String {
    "import { request } from '@umijs/max';".to_string()
}

fn default_true() -> bool {
    true
}

fn default_opaque_types() -> Vec<String> {
    vec!["TokenReviewSpec".to_string(), "TokenReviewStatus".to_string()]
}

fn default_sentinel_type() -> String {
    "StructField".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_config_roundtrip() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("restgen.yaml");

        let mut config = Config::new("out");
        config.ignores.push("RawExtension".to_string());
        config.save(&file_path).await?;

        let loaded = Config::from_file(&file_path).await?;
        assert_eq!(loaded, config);
        assert_eq!(loaded.extension, "ts");
        assert_eq!(loaded.namespace, "API");
        assert_eq!(loaded.sentinel_type, "StructField");
        assert!(loaded.generate_types);

        Ok(())
    }

    #[tokio::test]
    async fn test_config_toml_roundtrip() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("restgen.toml");

        let mut config = Config::new("out");
        config.stub_template = Some("stub.tera".to_string());
        config.save(&file_path).await?;

        let loaded = Config::from_file(&file_path).await?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_config_uses_defaults() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("partial.yaml");
        tokio::fs::write(&file_path, "extension: js\ngenerate_types: false\n").await?;

        let loaded = Config::from_file(&file_path).await?;
        assert_eq!(loaded.extension, "js");
        assert!(!loaded.generate_types);
        assert_eq!(loaded.output_dir, "services");
        assert_eq!(loaded.api_name_key, "GlobalApiName");
        assert_eq!(
            loaded.opaque_types,
            vec!["TokenReviewSpec".to_string(), "TokenReviewStatus".to_string()]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("bad.yaml");
        tokio::fs::write(&file_path, "namespace: \"My API\"\n").await?;

        let err = Config::from_file(&file_path).await.unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
        Ok(())
    }
}
