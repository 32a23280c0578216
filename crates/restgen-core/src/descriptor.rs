//! Serializable type descriptors.
//!
//! A backend describes its data shapes as a closed graph of [`TypeDef`]s. Field
//! and sample types are [`TypeExpr`]s written in the backend's notation
//! (`*model.User`, `[]string`, `map[string]interface {}`); the same canonical
//! text is used as the Kind Mapper lookup key.
//!
//! ```
//! use restgen_core::descriptor::{Primitive, TypeExpr};
//!
//! let ty: TypeExpr = "[]*model.Role".parse().unwrap();
//! assert_eq!(ty, TypeExpr::slice(TypeExpr::pointer(TypeExpr::qualified("model", "Role"))));
//! assert_eq!(ty.to_string(), "[]*model.Role");
//! assert_eq!("uint".parse::<TypeExpr>().unwrap(), TypeExpr::Primitive(Primitive::Uint));
//! ```

// Internal imports (std, crate)
use std::fmt;
use std::str::FromStr;

// External imports (alphabetized)
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_value::Value as SerdeValue;

/// Serialization key tag
pub const JSON_TAG: &str = "json";
/// Validation tag; any non-empty value other than `-` marks a field required
pub const VALIDATE_TAG: &str = "validate";
/// ORM column tag (`default:…;type:varchar(N)`)
pub const ORM_TAG: &str = "gorm";
/// Human readable description tag
pub const DESCRIPTION_TAG: &str = "description";
/// `|`-delimited enumeration tag
pub const ENUM_TAG: &str = "enum";
/// Field whose description documents the owning struct
pub const DOC_FIELD: &str = "Doc";

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
}

impl Primitive {
    pub const ALL: [Primitive; 14] = [
        Primitive::Bool,
        Primitive::Int,
        Primitive::Int8,
        Primitive::Int16,
        Primitive::Int32,
        Primitive::Int64,
        Primitive::Uint,
        Primitive::Uint8,
        Primitive::Uint16,
        Primitive::Uint32,
        Primitive::Uint64,
        Primitive::Float32,
        Primitive::Float64,
        Primitive::String,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Uint
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
        )
    }

    /// Whether `name` spells one of the primitive types
    pub fn is_primitive_name(name: &str) -> bool {
        name.parse::<Primitive>().is_ok()
    }
}

impl FromStr for Primitive {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown primitive type: {}", s))
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A type name with an optional package qualifier (`model.User`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub package: Option<String>,
    pub name: String,
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.package {
            Some(package) => write!(f, "{}.{}", package, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A type expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeExpr {
    Primitive(Primitive),
    /// Reference to a [`TypeDef`] (or a well-known external type such as `time.Time`)
    Named(QualifiedName),
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Interface,
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(QualifiedName {
            package: None,
            name: name.into(),
        })
    }

    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named(QualifiedName {
            package: Some(package.into()),
            name: name.into(),
        })
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        Self::Pointer(Box::new(inner))
    }

    pub fn slice(elem: TypeExpr) -> Self {
        Self::Slice(Box::new(elem))
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Strip every pointer level
    pub fn deref(&self) -> &TypeExpr {
        match self {
            Self::Pointer(inner) => inner.deref(),
            other => other,
        }
    }

    /// Name used for the secondary Kind Mapper lookup: pointer markers and the
    /// package qualifier are dropped for named types, other shapes keep their
    /// canonical text.
    pub fn lookup_name(&self) -> String {
        match self.deref() {
            Self::Named(q) => q.name.clone(),
            other => other.to_string(),
        }
    }

    /// The type's name when it is a (possibly pointed-to) named type
    pub fn type_name(&self) -> Option<&str> {
        match self.deref() {
            Self::Named(q) => Some(q.name.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{}", p),
            Self::Named(q) => write!(f, "{}", q),
            Self::Pointer(inner) => write!(f, "*{}", inner),
            Self::Slice(elem) => write!(f, "[]{}", elem),
            Self::Map { key, value } => write!(f, "map[{}]{}", key, value),
            Self::Interface => write!(f, "interface {{}}"),
        }
    }
}

impl FromStr for TypeExpr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty type expression".to_string());
        }
        if let Some(rest) = s.strip_prefix('*') {
            return Ok(Self::pointer(rest.parse()?));
        }
        if let Some(rest) = s.strip_prefix("[]") {
            return Ok(Self::slice(rest.parse()?));
        }
        if let Some(rest) = s.strip_prefix("map[") {
            let mut depth = 1usize;
            for (i, c) in rest.char_indices() {
                match c {
                    '[' => depth += 1,
                    ']' => {
                        depth -= 1;
                        if depth == 0 {
                            let key = rest[..i].parse()?;
                            let value = rest[i + 1..].parse()?;
                            return Ok(Self::map(key, value));
                        }
                    }
                    _ => {}
                }
            }
            return Err(format!("unbalanced brackets in map type: {}", s));
        }
        if matches!(s, "interface {}" | "interface{}" | "any") {
            return Ok(Self::Interface);
        }
        if let Ok(p) = s.parse::<Primitive>() {
            return Ok(Self::Primitive(p));
        }
        if !s
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
        {
            return Err(format!("invalid type name: {}", s));
        }
        Ok(match s.rsplit_once('.') {
            Some((package, name)) if !package.is_empty() && !name.is_empty() => {
                Self::qualified(package, name)
            }
            Some(_) => return Err(format!("invalid qualified name: {}", s)),
            None => Self::named(s),
        })
    }
}

impl TryFrom<String> for TypeExpr {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeExpr> for String {
    fn from(value: TypeExpr) -> Self {
        value.to_string()
    }
}

/// Tags attached to a struct field.
///
/// Deserializes from either a map or a raw tag string such as
/// `json:"id" validate:"required"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tags(IndexMap<String, String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a tag, empty when absent
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a raw `key:"value"` tag string
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut tags = Self::new();
        let mut rest = raw.trim_start();
        while !rest.is_empty() {
            let colon = rest
                .find(':')
                .ok_or_else(|| format!("missing ':' in tag string: {}", raw))?;
            let key = &rest[..colon];
            if key.is_empty() || key.contains(char::is_whitespace) {
                return Err(format!("invalid tag key in: {}", raw));
            }
            let after = rest[colon + 1..]
                .strip_prefix('"')
                .ok_or_else(|| format!("tag value for '{}' must be quoted", key))?;

            let mut value = String::new();
            let mut escaped = false;
            let mut end = None;
            for (i, c) in after.char_indices() {
                if escaped {
                    value.push(c);
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    end = Some(i);
                    break;
                } else {
                    value.push(c);
                }
            }
            let end = end.ok_or_else(|| format!("unterminated value for tag '{}'", key))?;
            tags.insert(key, value);
            rest = after[end + 1..].trim_start();
        }
        Ok(tags)
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = SerdeValue::deserialize(deserializer)?;

        match value {
            SerdeValue::String(s) => Tags::parse(&s).map_err(serde::de::Error::custom),
            SerdeValue::Map(map) => {
                let mut tags = Tags::new();
                for (k, v) in map {
                    match (k, v) {
                        (SerdeValue::String(k), SerdeValue::String(v)) => tags.insert(k, v),
                        _ => {
                            return Err(serde::de::Error::custom(
                                "Expected a map of string tags",
                            ))
                        }
                    }
                }
                Ok(tags)
            }
            SerdeValue::Unit | SerdeValue::Option(None) => Ok(Tags::new()),
            _ => Err(serde::de::Error::custom(
                "Expected a tag string or a map of tags",
            )),
        }
    }
}

/// One field of a struct type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            tags: Tags::new(),
        }
    }

    /// Builder-style tag setter
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key, value);
        self
    }
}

/// Body of a named type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeBody {
    Struct {
        #[serde(default)]
        fields: Vec<FieldDescriptor>,
    },
    /// A named non-struct type, e.g. `ArrayUint` over `[]uint`
    Alias { target: TypeExpr },
}

/// A named type of the descriptor graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(flatten)]
    pub body: TypeBody,
}

impl TypeDef {
    pub fn structure(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            package: None,
            body: TypeBody::Struct { fields },
        }
    }

    pub fn alias(name: impl Into<String>, target: TypeExpr) -> Self {
        Self {
            name: name.into(),
            package: None,
            body: TypeBody::Alias { target },
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Fields of a struct type, `None` for aliases
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        match &self.body {
            TypeBody::Struct { fields } => Some(fields),
            TypeBody::Alias { .. } => None,
        }
    }
}

/// Structural shape of a type expression once pointers and aliases are followed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    Primitive(Primitive),
    Struct(&'a TypeDef),
    Slice,
    Map,
    Interface,
    /// A named type missing from the graph
    Unknown,
}

/// Closed set of named types available to one generation run, keyed by name
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    defs: IndexMap<String, TypeDef>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition, replacing (and returning) one with the same name
    pub fn insert(&mut self, def: TypeDef) -> Option<TypeDef> {
        self.defs.insert(def.name.clone(), def)
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.defs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDef> {
        self.defs.values()
    }

    /// Resolve the structural shape of `expr`, following pointers and aliases
    pub fn shape_of<'a>(&'a self, expr: &TypeExpr) -> Shape<'a> {
        let mut seen: Vec<&str> = Vec::new();
        let mut current = expr.deref().clone();
        loop {
            match current {
                TypeExpr::Primitive(p) => return Shape::Primitive(p),
                TypeExpr::Slice(_) => return Shape::Slice,
                TypeExpr::Map { .. } => return Shape::Map,
                TypeExpr::Interface => return Shape::Interface,
                TypeExpr::Pointer(inner) => current = *inner,
                TypeExpr::Named(q) => {
                    let Some(def) = self.defs.get(&q.name) else {
                        return Shape::Unknown;
                    };
                    match &def.body {
                        TypeBody::Struct { .. } => return Shape::Struct(def),
                        TypeBody::Alias { target } => {
                            if seen.contains(&def.name.as_str()) {
                                return Shape::Unknown;
                            }
                            seen.push(def.name.as_str());
                            current = target.clone();
                        }
                    }
                }
            }
        }
    }
}

impl FromIterator<TypeDef> for TypeGraph {
    fn from_iter<I: IntoIterator<Item = TypeDef>>(iter: I) -> Self {
        let mut graph = Self::new();
        for def in iter {
            graph.insert(def);
        }
        graph
    }
}
