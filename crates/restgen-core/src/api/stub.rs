//! Renders one exported request function per [`ApiData`].
//!
//! The function body is produced by a Tera template. The built-in template
//! ships with the crate; a replacement can be loaded from a file and receives
//! the same context, plus the full `api` entry.

// Internal imports (std, crate)
use std::path::Path;

use crate::descriptor::Primitive;
use crate::utils;
use crate::Result;

use super::ApiData;

// External imports (alphabetized)
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use tera::{Context, Tera};

/// Registered name of the stub template
pub const STUB_TEMPLATE: &str = "api_stub.ts";

const BUILTIN_TEMPLATE: &str = include_str!("../../templates/api_stub.ts.tera");

static PATH_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}/]+)\}").expect("path placeholder pattern is valid"));

/// Values available to the stub template
#[derive(Debug, Serialize)]
struct StubContext<'a> {
    comments: Vec<String>,
    name: &'a str,
    /// Lowercase HTTP method
    method: String,
    /// Path template rewritten into a template literal body
    url: String,
    path_params: Vec<&'a str>,
    /// Response generic, empty when the response is untyped or primitive
    response_model: &'a str,
    /// `body`, `params` or empty when the method sends neither
    payload_key: &'static str,
    /// `rest` when path parameters were extracted, otherwise `params`
    payload: &'static str,
    api: &'a ApiData,
}

#[derive(Debug)]
pub struct StubEmitter {
    tera: Tera,
}

impl StubEmitter {
    /// Emitter using the built-in template
    pub fn new() -> Result<Self> {
        Self::with_template(BUILTIN_TEMPLATE)
    }

    /// Emitter using template source text
    pub fn with_template(source: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(STUB_TEMPLATE, source)?;
        Ok(Self { tera })
    }

    /// Emitter using a template file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_template_file(path, Some(STUB_TEMPLATE))
            .map_err(|e| {
                crate::Error::template(format!(
                    "Failed to load stub template {}: {}",
                    path.display(),
                    e
                ))
            })?;
        log::debug!("Loaded stub template from {}", path.display());
        Ok(Self { tera })
    }

    /// Render the stub of one endpoint
    pub fn render(&self, api: &ApiData) -> Result<String> {
        let context = Context::from_serialize(build_context(api))?;
        let mut rendered = self.tera.render(STUB_TEMPLATE, &context)?;
        if !rendered.ends_with('\n') {
            rendered.push('\n');
        }
        Ok(rendered)
    }
}

fn build_context(api: &ApiData) -> StubContext<'_> {
    let path_params: Vec<&str> = api.path_params().collect();
    let has_path_params = !path_params.is_empty();

    let payload_key = match api.method.to_uppercase().as_str() {
        "POST" | "PUT" => "body",
        "GET" | "DELETE" => "params",
        _ => "",
    };
    let payload = if has_path_params { "rest" } else { "params" };

    let response_model = if Primitive::is_primitive_name(&api.response_model) {
        ""
    } else {
        api.response_model.as_str()
    };

    StubContext {
        comments: comment_lines(api),
        name: &api.name,
        method: api.method.to_lowercase(),
        url: rewrite_path(&api.path, &path_params),
        path_params,
        response_model,
        payload_key,
        payload,
        api,
    }
}

/// Replace `{name}` with `${name}` for every declared path parameter
fn rewrite_path(path: &str, path_params: &[&str]) -> String {
    PATH_PLACEHOLDER
        .replace_all(path, |caps: &Captures| {
            let name = &caps[1];
            if path_params.contains(&name) {
                format!("${{{}}}", name)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn comment_lines(api: &ApiData) -> Vec<String> {
    let mut lines = Vec::new();
    if !api.doc.is_empty() {
        lines.push(api.doc.clone());
    }
    if !api.notes.is_empty() && api.notes != api.doc {
        lines.push(api.notes.clone());
    }
    lines.push(format!("method: {}", api.method));
    lines.push(format!("path: {}", api.path));
    for (code, payload) in &api.responses {
        lines.push(format!("response {}: {}", code, payload));
    }
    for (name, param) in &api.parameters {
        let mut line = format!(
            "param: {} type: {} in: {} required: {}",
            name,
            param.data_type,
            param.position.as_str(),
            if param.required { "yes" } else { "no" },
        );
        if !param.description.is_empty() {
            line.push_str(&format!(" description: {}", param.description));
        }
        if !param.default.is_empty() {
            line.push_str(&format!(" default: {}", param.default));
        }
        if !param.enums.is_empty() {
            line.push_str(&format!(" values: {}", param.enums.join(";")));
        }
        lines.push(line);
    }
    lines
        .iter()
        .flat_map(|line| utils::comment_lines(line))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ParamInfo, ResponsePayload};
    use crate::route::ParameterKind;
    use pretty_assertions::assert_eq;

    fn param(name: &str, position: ParameterKind, required: bool) -> ParamInfo {
        ParamInfo {
            name: name.to_string(),
            data_type: "string".to_string(),
            position,
            description: String::new(),
            required,
            enums: Vec::new(),
            default: String::new(),
        }
    }

    fn api(method: &str, path: &str, params: Vec<ParamInfo>) -> ApiData {
        ApiData {
            document_name: "api".to_string(),
            name: format!("{}Thing", method.to_lowercase()),
            method: method.to_string(),
            path: path.to_string(),
            parameters: params.into_iter().map(|p| (p.name.clone(), p)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_put_with_path_params() {
        let mut data = api(
            "PUT",
            "/users/{id}/roles/{role}",
            vec![
                param("id", ParameterKind::Path, true),
                param("role", ParameterKind::Path, true),
                param("body", ParameterKind::Body, true),
            ],
        );
        data.doc = "Assign a role".to_string();
        data.notes = "Assign a role".to_string();
        data.response_model = "User".to_string();
        data.responses
            .insert(200, ResponsePayload::Model("User".to_string()));
        data.parameters["role"].description = "Role code".to_string();
        data.parameters["role"].enums = vec!["admin".to_string(), "viewer".to_string()];

        let stub = StubEmitter::new().unwrap().render(&data).unwrap();
        let expected = "\
// Assign a role
// method: PUT
// path: /users/{id}/roles/{role}
// response 200: User
// param: id type: string in: path required: yes
// param: role type: string in: path required: yes description: Role code values: admin;viewer
// param: body type: string in: body required: yes
export const putThing = async (params?: any) => {
    const { id, role, ...rest } = params;
    return request<API.User>(`/users/${id}/roles/${role}`, {
        method: 'put',
        body: rest,
    });
};
";
        assert_eq!(stub, expected);
    }

    #[test]
    fn test_method_placement_without_path_params() {
        let emitter = StubEmitter::new().unwrap();

        let post = emitter.render(&api("POST", "/users", vec![])).unwrap();
        assert!(post.contains("        body: params,\n"));
        assert!(!post.contains("...rest"));

        let get = emitter.render(&api("GET", "/users", vec![])).unwrap();
        assert!(get.contains("        params: params,\n"));
        assert!(get.contains("return request(`/users`, {"));

        let delete = emitter
            .render(&api("DELETE", "/users/{id}", vec![param("id", ParameterKind::Path, true)]))
            .unwrap();
        assert!(delete.contains("        params: rest,\n"));

        let patch = emitter.render(&api("PATCH", "/users", vec![])).unwrap();
        assert!(!patch.contains("body:"));
        assert!(!patch.contains("params: params"));
        assert!(patch.contains("        method: 'patch',\n    });\n"));
    }

    #[test]
    fn test_primitive_response_has_no_generic() {
        let mut data = api("GET", "/users/count", vec![]);
        data.response_model = "uint".to_string();
        let stub = StubEmitter::new().unwrap().render(&data).unwrap();
        assert!(stub.contains("return request(`/users/count`"));
    }

    #[test]
    fn test_rewrite_only_declared_placeholders() {
        assert_eq!(rewrite_path("/a/{id}/b/{other}", &["id"]), "/a/${id}/b/{other}");
        assert_eq!(rewrite_path("/a", &[]), "/a");
    }

    #[test]
    fn test_custom_template() {
        let emitter =
            StubEmitter::with_template("{{ name }} {{ api.method }} {{ url }}").unwrap();
        let stub = emitter
            .render(&api("GET", "/users/{id}", vec![param("id", ParameterKind::Path, true)]))
            .unwrap();
        assert_eq!(stub, "getThing GET /users/${id}\n");
    }

    #[test]
    fn test_multiline_text_stays_commented() {
        let mut data = api("GET", "/users", vec![param("q", ParameterKind::Query, false)]);
        data.doc = "line one\nline two".to_string();
        data.notes = "first note\r\nsecond note".to_string();
        data.parameters["q"].description = "search\nterm".to_string();

        let stub = StubEmitter::new().unwrap().render(&data).unwrap();
        assert!(stub.starts_with(
            "// line one\n// line two\n// first note\n// second note\n// method: GET\n"
        ));
        assert!(stub.contains(
            "// param: q type: string in: query required: no description: search\n// term\n"
        ));
        for line in stub.lines().take_while(|l| !l.starts_with("export")) {
            assert!(line.starts_with("//"), "uncommented line: {line}");
        }
    }

    #[test]
    fn test_broken_template_fails_to_render() {
        let emitter = StubEmitter::with_template("{{ missing_variable }}").unwrap();
        assert!(emitter.render(&api("GET", "/", vec![])).is_err());
        assert!(StubEmitter::with_template("{% if %}").is_err());
    }
}
