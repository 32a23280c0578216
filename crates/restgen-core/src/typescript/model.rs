//! Declarations collected by the walker, ready for emission.

use std::fmt;

use serde::Serialize;

/// Untyped placeholder used for every shape that cannot be modeled
pub const PLACEHOLDER: &str = "any";

/// Literal type of an enumeration constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Unsigned,
}

/// One enumeration literal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EnumValue {
    Str(String),
    Uint(u64),
}

impl EnumValue {
    /// The value as a TypeScript literal type
    pub fn literal(&self) -> String {
        match self {
            Self::Str(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Self::Uint(n) => n.to_string(),
        }
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{}", s),
            Self::Uint(n) => write!(f, "{}", n),
        }
    }
}

/// A struct field as it will be declared
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    /// Source identifier
    pub name: String,
    /// Serialization key, the declared property name
    pub json_name: String,
    /// Resolved TypeScript type expression
    pub kind: String,
    pub description: String,
    pub required: bool,
    pub enum_values: Vec<EnumValue>,
    pub default: String,
    pub enum_raw: String,
    /// Maximum length from a `varchar(N)` column type
    pub length: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructInfo {
    pub name: String,
    pub description: String,
    pub fields: Vec<FieldInfo>,
}

impl StructInfo {
    pub fn field(&self, json_name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.json_name == json_name)
    }
}

/// Union type generated from an enumeration tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstDecl {
    /// Owning struct name
    pub model: String,
    /// `{StructName}{FieldName}`
    pub name: String,
    pub raw: String,
    pub value_kind: ValueKind,
    pub values: Vec<EnumValue>,
    pub description: String,
}
