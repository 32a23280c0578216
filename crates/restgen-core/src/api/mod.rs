//! Route parsing and API stub generation.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::route::ParameterKind;

pub mod parser;
pub mod stub;

pub use parser::{ParsedRoutes, RouteParser};
pub use stub::StubEmitter;

/// One parsed endpoint, ready for stub rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApiData {
    /// Output group the stub is written to
    pub document_name: String,
    /// Exported function name
    pub name: String,
    pub doc: String,
    pub notes: String,
    pub path: String,
    pub method: String,
    pub parameters: IndexMap<String, ParamInfo>,
    /// Request body type, empty when absent
    pub request_model: String,
    /// Response type, empty when absent
    pub response_model: String,
    pub responses: BTreeMap<u16, ResponsePayload>,
}

impl ApiData {
    /// Key under which the endpoint is stored, `"{method} {path}"`
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Names of path parameters in declaration order
    pub fn path_params(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .values()
            .filter(|p| p.position == ParameterKind::Path)
            .map(|p| p.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamInfo {
    pub name: String,
    pub data_type: String,
    pub position: ParameterKind,
    pub description: String,
    pub required: bool,
    #[serde(rename = "enum")]
    pub enums: Vec<String>,
    pub default: String,
}

/// Documented payload of one response code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    /// Name of a declared type
    Model(String),
    /// JSON object of field name to field description
    Fields(String),
}

impl fmt::Display for ResponsePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(s) | Self::Fields(s) => write!(f, "{}", s),
        }
    }
}
