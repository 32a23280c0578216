//! Converts route descriptors into [`ApiData`] entries.
//!
//! Every request or response type a route references is collected as a root
//! for the type walker.

use std::collections::BTreeMap;

use indexmap::IndexSet;

use crate::config::{Config, OPENAPI_TAGS_KEY};
use crate::descriptor::{DESCRIPTION_TAG, JSON_TAG, Primitive, Shape, TypeDef, TypeExpr, TypeGraph};
use crate::route::{ParameterDoc, ParameterKind, RouteDescriptor};
use crate::typescript::kinds;
use crate::typescript::walker::json_name;
use crate::utils::{last_segment, strip_brackets};

use super::{ApiData, ParamInfo, ResponsePayload};

/// Result of parsing a set of routes
#[derive(Debug, Clone, Default)]
pub struct ParsedRoutes {
    /// Endpoints keyed by `"{method} {path}"`
    pub apis: BTreeMap<String, ApiData>,
    /// Type names referenced by request and response samples
    pub roots: IndexSet<String>,
}

/// A referenced sample type after resolution
enum SampleModel {
    /// A struct (or an unknown named type), declared as a root
    Declared(String),
    Primitive(Primitive),
}

impl SampleModel {
    fn name(&self) -> String {
        match self {
            Self::Declared(name) => name.clone(),
            Self::Primitive(p) => p.as_str().to_string(),
        }
    }
}

#[derive(Debug)]
pub struct RouteParser<'a> {
    graph: &'a TypeGraph,
    config: &'a Config,
}

impl<'a> RouteParser<'a> {
    pub fn new(graph: &'a TypeGraph, config: &'a Config) -> Self {
        Self { graph, config }
    }

    /// Parse every route; a later route with the same method and path
    /// replaces an earlier one
    pub fn parse(&self, routes: &[RouteDescriptor]) -> ParsedRoutes {
        let mut parsed = ParsedRoutes::default();
        for route in routes {
            let api = self.parse_route(route, &mut parsed.roots);
            if parsed.apis.insert(api.key(), api).is_some() {
                log::debug!("Route {} {} replaces an earlier one", route.method, route.path);
            }
        }
        parsed
    }

    fn parse_route(&self, route: &RouteDescriptor, roots: &mut IndexSet<String>) -> ApiData {
        let mut api = ApiData {
            doc: route.doc.clone(),
            notes: route.notes.clone(),
            path: route.path.clone(),
            method: route.method.clone(),
            name: self.api_name(route),
            document_name: self.document_name(route),
            ..Default::default()
        };

        for param in &route.parameters {
            let info = param_info(param);
            api.parameters.insert(info.name.clone(), info);
        }

        if let Some(model) = route.read_sample.as_ref().and_then(|ty| self.sample_model(ty)) {
            api.request_model = model.name();
            if let SampleModel::Declared(name) = model {
                roots.insert(name);
            }
        }
        if let Some(model) = route.write_sample.as_ref().and_then(|ty| self.sample_model(ty)) {
            api.response_model = model.name();
            if let SampleModel::Declared(name) = model {
                roots.insert(name);
            }
        }

        for response in &route.responses {
            let Some(model) = &response.model else {
                continue;
            };
            if matches!(response.code, 200 | 201) {
                self.success_response(&mut api, roots, response.code, model);
            } else if let Shape::Struct(def) = self.graph.shape_of(model) {
                api.responses
                    .insert(response.code, ResponsePayload::Fields(field_descriptions(def)));
            }
        }

        log::debug!("Parsed route {} as {}", api.key(), api.name);
        api
    }

    fn success_response(
        &self,
        api: &mut ApiData,
        roots: &mut IndexSet<String>,
        code: u16,
        model: &TypeExpr,
    ) {
        let shape = self.graph.shape_of(model);
        if !matches!(shape, Shape::Primitive(_)) && is_kind_mapped(model) {
            log::debug!("Response model {} maps to a built-in kind", model);
            return;
        }
        if api.response_model.is_empty() {
            api.response_model = match shape {
                Shape::Primitive(p) => p.as_str().to_string(),
                _ => model.type_name().unwrap_or_default().to_string(),
            };
        }
        if let Some(name) = declared_name(model, shape) {
            roots.insert(name.clone());
            api.responses.insert(code, ResponsePayload::Model(name));
        }
    }

    fn api_name(&self, route: &RouteDescriptor) -> String {
        route
            .metadata_text(&self.config.api_name_key)
            .map(|name| strip_brackets(&name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("{}{}", route.method.to_lowercase(), route.operation))
    }

    fn document_name(&self, route: &RouteDescriptor) -> String {
        route
            .metadata_text(OPENAPI_TAGS_KEY)
            .map(|tag| strip_brackets(&tag).replace('-', "_"))
            .filter(|tag| !tag.is_empty())
            .unwrap_or_else(|| self.config.default_group.clone())
    }

    /// Model of a read or write sample; strings, slices and built-in kinds
    /// have none
    fn sample_model(&self, ty: &TypeExpr) -> Option<SampleModel> {
        let shape = self.graph.shape_of(ty);
        match shape {
            Shape::Primitive(Primitive::String) | Shape::Slice => None,
            Shape::Primitive(p) => Some(SampleModel::Primitive(p)),
            _ if is_kind_mapped(ty) => None,
            _ => declared_name(ty, shape).map(SampleModel::Declared),
        }
    }
}

/// Whether the Kind Mapper renders `ty` directly, so it is never declared
fn is_kind_mapped(ty: &TypeExpr) -> bool {
    kinds::resolve(&ty.to_string()).is_some() || kinds::resolve(&ty.lookup_name()).is_some()
}

/// Name to declare for a struct-shaped (or unknown named) type
fn declared_name(ty: &TypeExpr, shape: Shape<'_>) -> Option<String> {
    match shape {
        Shape::Struct(def) => Some(def.name.clone()),
        Shape::Unknown => ty.type_name().map(str::to_string),
        _ => None,
    }
}

fn param_info(param: &ParameterDoc) -> ParamInfo {
    let data_type = if param.kind == ParameterKind::Body {
        last_segment(&param.data_type).to_string()
    } else {
        param.data_type.clone()
    };
    ParamInfo {
        name: param.name.clone(),
        data_type,
        position: param.kind,
        description: param.description.clone(),
        required: param.required,
        enums: param.possible_values.clone(),
        default: param.default_value.clone(),
    }
}

/// JSON object mapping each serialized field name of `def` to its
/// description, falling back to the field name. Keys are sorted.
pub fn field_descriptions(def: &TypeDef) -> String {
    let mut result = BTreeMap::new();
    for field in def.fields().unwrap_or_default() {
        let Some(key) = json_name(field.tags.get(JSON_TAG), &field.name) else {
            continue;
        };
        let description = match field.tags.get(DESCRIPTION_TAG) {
            "" => field.name.as_str(),
            d => d,
        };
        result.insert(key, description.to_string());
    }
    serde_json::to_string(&result).unwrap_or_default()
}
