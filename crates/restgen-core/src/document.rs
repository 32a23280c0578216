//! Input documents describing a backend's types and routes.
//!
//! A document bundles the type descriptor graph with the route descriptors
//! registered by the service. It can be loaded from a local file or fetched
//! over HTTP(S), in either JSON or YAML.
//!
//! # Examples
//!
//! ```no_run
//! use restgen_core::document::ApiDocument;
//! use restgen_core::error::Result;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let document = ApiDocument::from_file_or_url("descriptors.yaml").await?;
//! println!("{} routes, {} types", document.routes.len(), document.types.len());
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::path::Path;

use crate::descriptor::{TypeDef, TypeGraph};
use crate::route::RouteDescriptor;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;
use url::Url;

/// Types and routes of one backend service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiDocument {
    /// Every named type the routes may reference
    #[serde(default)]
    pub types: Vec<TypeDef>,
    #[serde(default)]
    pub routes: Vec<RouteDescriptor>,
    /// Struct names declared even when no route references them
    #[serde(default)]
    pub extra_types: Vec<String>,
}

impl ApiDocument {
    /// Load a document from a file or URL (supports both YAML and JSON)
    pub async fn from_file_or_url<P: AsRef<str>>(location: P) -> crate::Result<Self> {
        let location = location.as_ref();
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::from_url(url.as_str()).await,
            _ => Self::from_file(location).await,
        }
    }

    /// Load a document from a file (supports both YAML and JSON)
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let document = Self::parse_content(&content).map_err(|e| {
            crate::Error::document(format!(
                "Failed to parse document at {}: {}",
                path.display(),
                e
            ))
        })?;
        log::debug!(
            "Loaded {} types and {} routes from {}",
            document.types.len(),
            document.routes.len(),
            path.display()
        );
        Ok(document)
    }

    /// Fetch a document over HTTP(S) (supports both YAML and JSON)
    pub async fn from_url(url: &str) -> crate::Result<Self> {
        let response = reqwest::get(url).await.map_err(|e| {
            crate::Error::document(format!("Failed to fetch document from {}: {}", url, e))
        })?;

        if !response.status().is_success() {
            return Err(crate::Error::document(format!(
                "Failed to fetch document from {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let content = response.text().await.map_err(|e| {
            crate::Error::document(format!("Failed to read response from {}: {}", url, e))
        })?;

        Self::parse_content(&content).map_err(|e| {
            crate::Error::document(format!("Failed to parse document from {}: {}", url, e))
        })
    }

    /// Parse content as either JSON or YAML
    pub fn parse_content(content: &str) -> Result<Self, String> {
        if let Ok(document) = serde_json::from_str(content) {
            return Ok(document);
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// The type descriptor graph of this document
    pub fn graph(&self) -> TypeGraph {
        self.types.iter().cloned().collect()
    }
}
