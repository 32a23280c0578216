//! Code generation pipeline for restgen.
//!
//! A [`Generator`] owns the registered types and routes. Generation runs the
//! route parser, walks every discovered type, emits the declaration file and
//! renders one stub per route, grouped by document name.

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::api::{ApiData, RouteParser, StubEmitter};
use crate::config::Config;
use crate::descriptor::{TypeDef, TypeGraph};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::document::ApiDocument;
use crate::output::OutputWriter;
use crate::route::RouteDescriptor;
use crate::typescript::{DeclarationEmitter, TypeWalker};

// External imports (alphabetized)
use indexmap::IndexSet;

/// Result of one generation run
#[derive(Debug, Clone, Default)]
pub struct Generation {
    /// Declaration file text, empty when type generation is disabled
    pub declarations: String,
    /// Concatenated stub text per document name
    pub stubs: BTreeMap<String, String>,
    pub diagnostics: Diagnostics,
    /// Files written by [`Generator::generate_to_dir`]
    pub written: Vec<PathBuf>,
}

/// Collects inputs and runs the generation pipeline
#[derive(Debug, Clone)]
pub struct Generator {
    config: Config,
    graph: TypeGraph,
    routes: Vec<RouteDescriptor>,
    /// Types declared regardless of route references
    roots: IndexSet<String>,
}

impl Generator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            graph: TypeGraph::new(),
            routes: Vec::new(),
            roots: IndexSet::new(),
        }
    }

    /// Generator preloaded with every type, route and extra type of a document
    pub fn from_document(config: Config, document: ApiDocument) -> Self {
        let mut generator = Self::new(config);
        for def in document.types {
            generator.add_type(def);
        }
        for route in document.routes {
            generator.add_route(route);
        }
        generator.roots.extend(document.extra_types);
        generator
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Make a type available for resolution without declaring it
    pub fn add_type(&mut self, def: TypeDef) -> &mut Self {
        self.graph.insert(def);
        self
    }

    /// Make a type available and always declare it
    pub fn add_struct(&mut self, def: TypeDef) -> &mut Self {
        self.roots.insert(def.name.clone());
        self.add_type(def)
    }

    pub fn add_route(&mut self, route: RouteDescriptor) -> &mut Self {
        self.routes.push(route);
        self
    }

    /// Render fields of these types as `any` with a warning comment
    pub fn add_ignores<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.ignores.extend(names.into_iter().map(Into::into));
        self
    }

    /// Run the pipeline in memory
    pub fn generate(&self) -> Generation {
        let mut generation = Generation::default();

        let parsed = RouteParser::new(&self.graph, &self.config).parse(&self.routes);
        log::debug!(
            "Parsed {} routes into {} endpoints",
            self.routes.len(),
            parsed.apis.len()
        );

        if self.config.generate_types {
            let mut walker = TypeWalker::new(&self.graph, &self.config);
            for name in self.roots.iter().chain(parsed.roots.iter()) {
                walker.add_root(name.clone());
            }
            let (walked, diagnostics) = walker.run();
            generation.diagnostics.extend(diagnostics);
            log::debug!(
                "Declaring {} types and {} constants",
                walked.structs.len(),
                walked.consts.len()
            );
            generation.declarations =
                DeclarationEmitter::new(&self.config).emit(&walked.structs, &walked.consts);
        }

        let emitter = self.stub_emitter(&mut generation.diagnostics);
        for api in parsed.apis.values() {
            let text = match &emitter {
                Some(emitter) => render_stub(emitter, api, &mut generation.diagnostics),
                None => String::new(),
            };
            generation
                .stubs
                .entry(api.document_name.clone())
                .or_default()
                .push_str(&text);
        }

        generation
    }

    /// Run the pipeline and write the results into `dir`
    pub async fn generate_to_dir(&self, dir: impl AsRef<Path>) -> Generation {
        let mut generation = self.generate();
        let writer = OutputWriter::new(dir.as_ref(), &self.config);
        let report = writer
            .write(&generation.declarations, &generation.stubs)
            .await;
        generation.written = report.written;
        generation.diagnostics.extend(report.diagnostics);
        generation
    }

    /// The configured stub template, falling back to the built-in one
    fn stub_emitter(&self, diagnostics: &mut Diagnostics) -> Option<StubEmitter> {
        if let Some(path) = &self.config.stub_template {
            match StubEmitter::from_file(path) {
                Ok(emitter) => return Some(emitter),
                Err(e) => diagnostics.push(
                    DiagnosticKind::TemplateRender,
                    path,
                    format!("cannot load stub template, using the built-in one: {}", e),
                ),
            }
        }
        match StubEmitter::new() {
            Ok(emitter) => Some(emitter),
            Err(e) => {
                diagnostics.push(DiagnosticKind::TemplateRender, "built-in", e.to_string());
                None
            }
        }
    }
}

fn render_stub(emitter: &StubEmitter, api: &ApiData, diagnostics: &mut Diagnostics) -> String {
    match emitter.render(api) {
        Ok(text) => text,
        Err(e) => {
            diagnostics.push(DiagnosticKind::TemplateRender, api.key(), e.to_string());
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldDescriptor, TypeExpr};
    use crate::route::{ParameterDoc, ParameterKind};
    use serde_json::json;
    use tempfile::tempdir;

    fn ty(s: &str) -> TypeExpr {
        s.parse().unwrap()
    }

    fn generator(config: Config) -> Generator {
        let mut generator = Generator::new(config);
        generator
            .add_type(TypeDef::structure(
                "User",
                vec![
                    FieldDescriptor::new("ID", ty("uint"))
                        .tag("json", "id")
                        .tag("validate", "required"),
                    FieldDescriptor::new("Raw", ty("RawExtension")).tag("json", "raw"),
                ],
            ))
            .add_type(TypeDef::structure("RawExtension", vec![]))
            .add_struct(TypeDef::structure(
                "Audit",
                vec![FieldDescriptor::new("At", ty("time.Time")).tag("json", "at")],
            ))
            .add_route(
                RouteDescriptor::new("GET", "/users/{id}")
                    .operation("GetUser")
                    .metadata("openapi.tags", json!(["user"]))
                    .param(ParameterDoc::new("id", ParameterKind::Path).required(true))
                    .writes(ty("*User")),
            )
            .add_route(RouteDescriptor::new("GET", "/health").operation("Health"));
        generator
    }

    #[test]
    fn test_generate_in_memory() {
        let mut generator = generator(Config::default());
        generator.add_ignores(["RawExtension"]);
        let generation = generator.generate();

        assert!(generation.diagnostics.is_empty(), "{:?}", generation.diagnostics);
        assert!(generation.declarations.contains("    type Audit = {\n"));
        assert!(generation.declarations.contains("    type User = {\n"));
        assert!(generation
            .declarations
            .contains("raw?: any; // ignored type RawExtension, convert manually"));

        let groups: Vec<_> = generation.stubs.keys().cloned().collect();
        assert_eq!(groups, vec!["api", "user"]);
        assert!(generation.stubs["user"].contains("export const getGetUser = "));
        assert!(generation.stubs["api"].contains("export const getHealth = "));
    }

    #[test]
    fn test_types_can_be_disabled() {
        let mut config = Config::default();
        config.generate_types = false;
        let generation = generator(config).generate();
        assert!(generation.declarations.is_empty());
        assert_eq!(generation.stubs.len(), 2);
    }

    #[test]
    fn test_missing_custom_template_falls_back() {
        let mut config = Config::default();
        config.stub_template = Some("/nonexistent/stub.tera".to_string());
        let generation = generator(config).generate();
        assert_eq!(
            generation
                .diagnostics
                .of_kind(DiagnosticKind::TemplateRender)
                .count(),
            1
        );
        assert!(generation.stubs["api"].contains("export const getHealth"));
    }

    #[test]
    fn test_render_failure_leaves_empty_stubs() -> crate::Result<()> {
        let dir = tempdir()?;
        let template = dir.path().join("stub.tera");
        std::fs::write(&template, "{{ missing_variable }}")?;

        let mut config = Config::default();
        config.stub_template = Some(template.display().to_string());
        let generation = generator(config).generate();

        assert_eq!(
            generation
                .diagnostics
                .of_kind(DiagnosticKind::TemplateRender)
                .count(),
            2
        );
        assert_eq!(generation.stubs.len(), 2);
        assert_eq!(generation.stubs["api"], "");
        assert_eq!(generation.stubs["user"], "");
        assert!(generation.declarations.contains("    type User = {\n"));
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_to_dir() -> crate::Result<()> {
        let dir = tempdir()?;
        let generation = generator(Config::default()).generate_to_dir(dir.path()).await;
        assert_eq!(generation.written.len(), 3);
        assert!(dir.path().join("api.user.ts").exists());
        assert!(dir.path().join("api.api.ts").exists());
        assert!(dir.path().join("types.d.ts").exists());
        Ok(())
    }
}
