//! Restgen Core Library
//!
//! This library turns the type and route descriptors of a backend service
//! into TypeScript declarations (`declare namespace API { ... }`) and one
//! typed request stub per route.

pub mod api;
pub mod config;
pub mod descriptor;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod generate;
pub mod output;
pub mod route;
pub mod typescript;
pub mod utils;

pub use crate::{
    config::Config,
    descriptor::{FieldDescriptor, TypeDef, TypeExpr, TypeGraph},
    diagnostics::{Diagnostic, DiagnosticKind, Diagnostics},
    document::ApiDocument,
    error::{Error, Result},
    generate::{Generation, Generator},
    route::{ParameterDoc, ParameterKind, RouteDescriptor},
};
