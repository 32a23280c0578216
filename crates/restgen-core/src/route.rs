//! HTTP route descriptors, independent of the web framework that registered them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::descriptor::TypeExpr;

/// Where a parameter travels in the request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Path,
    Query,
    Body,
    Header,
    Form,
    Multipart,
}

impl ParameterKind {
    /// Position label used in generated documentation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
            Self::Header => "header",
            Self::Form => "form",
            Self::Multipart => "multipart/form-data",
        }
    }
}

/// Documentation of one declared parameter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterDoc {
    pub name: String,
    /// Semantic data type, e.g. `string`, `integer` or `model.User` for bodies
    #[serde(default = "default_data_type")]
    pub data_type: String,
    pub kind: ParameterKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default_value: String,
    #[serde(default)]
    pub possible_values: Vec<String>,
}

impl ParameterDoc {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            data_type: default_data_type(),
            kind,
            description: String::new(),
            required: false,
            default_value: String::new(),
            possible_values: Vec::new(),
        }
    }

    pub fn data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

fn default_data_type() -> String {
    "string".to_string()
}

/// A declared response for one status code
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseDecl {
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub model: Option<TypeExpr>,
}

/// One HTTP endpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub method: String,
    /// Path template with `{name}` placeholders
    pub path: String,
    /// Operation identifier (usually the handler name)
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub metadata: IndexMap<String, JsonValue>,
    #[serde(default)]
    pub parameters: Vec<ParameterDoc>,
    /// Type of the request body sample
    #[serde(default)]
    pub read_sample: Option<TypeExpr>,
    /// Type of the response body sample
    #[serde(default)]
    pub write_sample: Option<TypeExpr>,
    #[serde(default)]
    pub responses: Vec<ResponseDecl>,
}

impl RouteDescriptor {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            operation: String::new(),
            doc: String::new(),
            notes: String::new(),
            metadata: IndexMap::new(),
            parameters: Vec::new(),
            read_sample: None,
            write_sample: None,
            responses: Vec::new(),
        }
    }

    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn param(mut self, param: ParameterDoc) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn reads(mut self, sample: TypeExpr) -> Self {
        self.read_sample = Some(sample);
        self
    }

    pub fn writes(mut self, sample: TypeExpr) -> Self {
        self.write_sample = Some(sample);
        self
    }

    pub fn returns(mut self, code: u16, model: Option<TypeExpr>) -> Self {
        self.responses.push(ResponseDecl {
            code,
            message: String::new(),
            model,
        });
        self
    }

    /// Text of a metadata entry; lists yield their first item
    pub fn metadata_text(&self, key: &str) -> Option<String> {
        self.metadata.get(key).and_then(json_text)
    }
}

fn json_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Array(items) => items.first().and_then(json_text),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_text() {
        let route = RouteDescriptor::new("GET", "/users")
            .metadata("openapi.tags", json!(["user-mgmt", "admin"]))
            .metadata("GlobalApiName", json!("listUsers"))
            .metadata("weight", json!(3))
            .metadata("empty", json!([]));
        assert_eq!(route.metadata_text("openapi.tags").as_deref(), Some("user-mgmt"));
        assert_eq!(route.metadata_text("GlobalApiName").as_deref(), Some("listUsers"));
        assert_eq!(route.metadata_text("weight").as_deref(), Some("3"));
        assert_eq!(route.metadata_text("empty"), None);
        assert_eq!(route.metadata_text("missing"), None);
    }

    #[test]
    fn test_route_from_yaml() {
        let yaml = r#"
method: PUT
path: /users/{id}
operation: updateUser
parameters:
  - name: id
    kind: path
    required: true
  - name: body
    kind: body
    data_type: model.User
read_sample: "*model.User"
responses:
  - code: 200
    model: model.User
  - code: 404
"#;
        let route: RouteDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(route.parameters[0].kind, ParameterKind::Path);
        assert_eq!(route.parameters[0].data_type, "string");
        assert_eq!(route.parameters[1].kind.as_str(), "body");
        assert_eq!(route.read_sample.unwrap().to_string(), "*model.User");
        assert_eq!(route.responses.len(), 2);
        assert!(route.responses[1].model.is_none());
    }
}
