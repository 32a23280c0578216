//! Type descriptor walker.
//!
//! Converts struct [`TypeDef`]s into [`StructInfo`]s, following nested struct,
//! pointer, alias and slice types through the [`TypeGraph`]. Every struct it
//! reaches is registered once; enumeration tags become [`ConstDecl`]s.
//!
//! The walker never fails. Shapes it cannot model become [`PLACEHOLDER`] and
//! are reported as diagnostics.

// Internal imports (std, crate)
use std::collections::{BTreeMap, HashSet};

use crate::config::Config;
use crate::descriptor::{
    DESCRIPTION_TAG, DOC_FIELD, ENUM_TAG, FieldDescriptor, JSON_TAG, ORM_TAG, Primitive, Shape,
    TypeBody, TypeDef, TypeExpr, TypeGraph, VALIDATE_TAG,
};
use crate::diagnostics::{DiagnosticKind, Diagnostics};

use super::kinds;
use super::model::{ConstDecl, EnumValue, FieldInfo, PLACEHOLDER, StructInfo, ValueKind};

// External imports (alphabetized)
use indexmap::IndexSet;

/// `json` tag values that mark an embedded type the walker does not model
const INLINE_MARKERS: [&str; 2] = [",inline", "metadata,omitempty"];

/// Everything discovered by one walk
#[derive(Debug, Clone, Default)]
pub struct WalkOutput {
    /// Discovered structs keyed (and therefore emitted) by name
    pub structs: BTreeMap<String, StructInfo>,
    /// Enumeration constants in discovery order
    pub consts: Vec<ConstDecl>,
}

/// Walks the descriptor graph starting from a set of root types
#[derive(Debug)]
pub struct TypeWalker<'a> {
    graph: &'a TypeGraph,
    config: &'a Config,
    roots: IndexSet<String>,
    structs: BTreeMap<String, StructInfo>,
    consts: Vec<ConstDecl>,
    /// Every type name entered so far, across all branches
    visiting: HashSet<String>,
    diagnostics: Diagnostics,
}

impl<'a> TypeWalker<'a> {
    pub fn new(graph: &'a TypeGraph, config: &'a Config) -> Self {
        Self {
            graph,
            config,
            roots: IndexSet::new(),
            structs: BTreeMap::new(),
            consts: Vec::new(),
            visiting: HashSet::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Register a type to declare. Roots are walked at top level, never as a
    /// nested field type.
    pub fn add_root(&mut self, name: impl Into<String>) {
        self.roots.insert(name.into());
    }

    /// Walk every root and return the discovered declarations
    pub fn run(mut self) -> (WalkOutput, Diagnostics) {
        let graph = self.graph;
        let roots: Vec<String> = self.roots.iter().cloned().collect();
        for name in roots {
            match graph.get(&name) {
                Some(def) if def.fields().is_some() => {
                    log::debug!("Walking root type {}", name);
                    self.visiting.insert(name.clone());
                    let info = self.walk(def);
                    self.structs.insert(name, info);
                }
                Some(_) => self.diagnostics.push(
                    DiagnosticKind::UnresolvedType,
                    name,
                    "only struct types can be declared",
                ),
                None => self.diagnostics.push(
                    DiagnosticKind::UnresolvedType,
                    name,
                    "type is not defined in the descriptor graph",
                ),
            }
        }

        let output = WalkOutput {
            structs: self.structs,
            consts: self.consts,
        };
        (output, self.diagnostics)
    }

    /// Extract the declared fields of one struct type
    pub fn walk(&mut self, def: &'a TypeDef) -> StructInfo {
        let mut info = StructInfo {
            name: def.name.clone(),
            ..Default::default()
        };
        let Some(fields) = def.fields() else {
            return info;
        };
        let is_sentinel = def.name == self.config.sentinel_type;

        for field in fields {
            if field.name == DOC_FIELD {
                info.description = field.tags.get(DESCRIPTION_TAG).to_string();
                continue;
            }

            let json_tag = field.tags.get(JSON_TAG);
            let Some(json_name) = json_name(json_tag, &field.name) else {
                continue;
            };

            let mut out = FieldInfo {
                name: field.name.clone(),
                json_name,
                description: field.tags.get(DESCRIPTION_TAG).to_string(),
                ..Default::default()
            };
            apply_orm_tag(&mut out, field.tags.get(ORM_TAG));

            let validate = field.tags.get(VALIDATE_TAG);
            out.required = !validate.is_empty() && validate != "-";

            let enum_raw = field.tags.get(ENUM_TAG);
            if !enum_raw.is_empty() {
                self.extract_enum(def, field, &mut out, enum_raw);
            }

            if out.kind.is_empty() {
                let subject = format!("{}.{}", def.name, field.name);
                out.kind = self.resolve_kind(&field.ty, json_tag, &subject);
            }

            if !is_sentinel {
                info.fields.push(out);
            }
        }
        info
    }

    fn extract_enum(
        &mut self,
        owner: &TypeDef,
        field: &FieldDescriptor,
        out: &mut FieldInfo,
        raw: &str,
    ) {
        let name = format!("{}{}", owner.name, field.name);
        let value_kind = match self.graph.shape_of(&field.ty) {
            Shape::Primitive(Primitive::String) => ValueKind::String,
            Shape::Primitive(p) if p.is_integer() => ValueKind::Unsigned,
            _ => {
                self.diagnostics.push(
                    DiagnosticKind::UnresolvedType,
                    &name,
                    format!("enumeration on {} is emitted as string literals", field.ty),
                );
                ValueKind::String
            }
        };

        let mut values = Vec::new();
        for literal in raw.split('|') {
            let value = match value_kind {
                ValueKind::String => EnumValue::Str(literal.to_string()),
                ValueKind::Unsigned => match literal.trim().parse::<u64>() {
                    Ok(n) => EnumValue::Uint(n),
                    Err(_) => {
                        self.diagnostics.push(
                            DiagnosticKind::MalformedEnumValue,
                            &name,
                            format!("'{}' is not an unsigned integer, using 0", literal),
                        );
                        EnumValue::Uint(0)
                    }
                },
            };
            values.push(value);
        }

        out.kind = name.clone();
        out.enum_raw = raw.to_string();
        out.enum_values = values.clone();
        self.consts.push(ConstDecl {
            model: owner.name.clone(),
            name,
            raw: raw.to_string(),
            value_kind,
            values,
            description: out.description.clone(),
        });
    }

    fn resolve_kind(&mut self, ty: &TypeExpr, json_tag: &str, subject: &str) -> String {
        if let Some(kind) = kinds::resolve(&ty.to_string()) {
            return kind.to_string();
        }
        let short = ty.lookup_name();
        if let Some(kind) = kinds::resolve(&short) {
            return kind.to_string();
        }
        // The sentinel is never declared
        if short == self.config.sentinel_type
            || self.config.opaque_types.iter().any(|t| *t == short)
        {
            return PLACEHOLDER.to_string();
        }

        match ty {
            TypeExpr::Named(q) => self.resolve_named(&q.name, json_tag, subject),
            TypeExpr::Pointer(inner) => self.resolve_kind(inner, json_tag, subject),
            TypeExpr::Slice(elem) => format!("{}[]", self.resolve_kind(elem, "", subject)),
            TypeExpr::Map { .. } | TypeExpr::Primitive(_) => {
                self.diagnostics.push(
                    DiagnosticKind::UnresolvedType,
                    subject,
                    format!("no TypeScript mapping for {}", ty),
                );
                PLACEHOLDER.to_string()
            }
            TypeExpr::Interface => PLACEHOLDER.to_string(),
        }
    }

    fn resolve_named(&mut self, name: &str, json_tag: &str, subject: &str) -> String {
        let graph = self.graph;
        let Some(def) = graph.get(name) else {
            self.diagnostics.push(
                DiagnosticKind::UnresolvedType,
                subject,
                format!("type {} is not defined in the descriptor graph", name),
            );
            return PLACEHOLDER.to_string();
        };

        match &def.body {
            TypeBody::Alias { target } => {
                if !self.visiting.insert(name.to_string()) {
                    self.diagnostics.push(
                        DiagnosticKind::UnresolvedType,
                        subject,
                        format!("alias {} refers to itself", name),
                    );
                    return PLACEHOLDER.to_string();
                }
                let kind = self.resolve_kind(target, json_tag, subject);
                self.visiting.remove(name);
                kind
            }
            TypeBody::Struct { .. } => {
                let known = self.roots.contains(name)
                    || self.structs.contains_key(name)
                    || self.visiting.contains(name);
                if !known {
                    if INLINE_MARKERS.contains(&json_tag) {
                        return PLACEHOLDER.to_string();
                    }
                    log::debug!("Walking nested type {} (from {})", name, subject);
                    self.visiting.insert(name.to_string());
                    let info = self.walk(def);
                    self.structs.insert(name.to_string(), info);
                }
                name.to_string()
            }
        }
    }
}

/// Serialization key of a field, `None` when the field is excluded
pub(crate) fn json_name(tag: &str, field_name: &str) -> Option<String> {
    if tag == "-" {
        return None;
    }
    let name = tag.split(',').next().unwrap_or_default();
    if name.is_empty() {
        Some(field_name.to_string())
    } else {
        Some(name.to_string())
    }
}

fn apply_orm_tag(field: &mut FieldInfo, orm: &str) {
    for item in orm.split(';') {
        let Some((key, value)) = item.split_once(':') else {
            continue;
        };
        match key.trim() {
            "default" => field.default = value.to_string(),
            "type" => {
                if let Some(length) = value
                    .trim()
                    .strip_prefix("varchar(")
                    .and_then(|rest| rest.strip_suffix(')'))
                {
                    field.length = length.to_string();
                }
            }
            _ => {}
        }
    }
}
