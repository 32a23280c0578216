//! Serializes walked structs and constants into a declaration file.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;

use crate::config::Config;
use crate::utils;

use super::model::{ConstDecl, EnumValue, FieldInfo, PLACEHOLDER, StructInfo};

const INDENT: &str = "    ";

/// Renders `declare namespace <ns> { ... }` text
#[derive(Debug, Clone)]
pub struct DeclarationEmitter {
    namespace: String,
    sentinel_type: String,
    ignores: HashSet<String>,
}

impl DeclarationEmitter {
    pub fn new(config: &Config) -> Self {
        Self {
            namespace: config.namespace.clone(),
            sentinel_type: config.sentinel_type.clone(),
            ignores: config.ignores.iter().cloned().collect(),
        }
    }

    /// Add type names that are rendered as `any` with a warning comment
    pub fn ignore<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignores.extend(names.into_iter().map(Into::into));
        self
    }

    /// Emit constants in the given order, then structs sorted by name
    pub fn emit(&self, structs: &BTreeMap<String, StructInfo>, consts: &[ConstDecl]) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = writeln!(out, "declare namespace {} {{", self.namespace);

        for decl in consts {
            self.write_const(&mut out, decl);
        }
        for info in structs.values() {
            if info.name == self.sentinel_type {
                continue;
            }
            self.write_struct(&mut out, info);
        }

        out.push_str("}\n");
        out
    }

    fn write_const(&self, out: &mut String, decl: &ConstDecl) {
        if decl.description.is_empty() {
            write_comment(out, INDENT, &decl.name);
        } else {
            write_comment(out, INDENT, &decl.description);
        }
        let members: Vec<String> = decl.values.iter().map(EnumValue::literal).collect();
        let _ = writeln!(
            out,
            "{INDENT}type {} = {};",
            decl.name,
            members.join(" | ")
        );
    }

    fn write_struct(&self, out: &mut String, info: &StructInfo) {
        if info.description.is_empty() {
            write_comment(out, INDENT, &info.name);
        } else {
            write_comment(out, INDENT, &format!("{}: {}", info.name, info.description));
        }
        let _ = writeln!(out, "{INDENT}type {} = {{", info.name);
        for field in &info.fields {
            if field.json_name.trim().is_empty() {
                continue;
            }
            self.write_field(out, field);
        }
        let _ = writeln!(out, "{INDENT}}};");
    }

    fn write_field(&self, out: &mut String, field: &FieldInfo) {
        let pad = format!("{INDENT}{INDENT}");
        if !field.description.is_empty() {
            write_comment(out, &pad, &field.description);
        }
        if !field.default.is_empty() {
            write_comment(out, &pad, &format!("default: {}", field.default));
        }
        if !field.enum_values.is_empty() {
            let values: Vec<String> = field.enum_values.iter().map(|v| v.to_string()).collect();
            let _ = writeln!(out, "{pad}// values: {}", values.join(";"));
        }
        if !field.length.is_empty() {
            let _ = writeln!(out, "{pad}// max length: {}", field.length);
        }

        let optional = if field.required { "" } else { "?" };
        let kind = if field.kind.is_empty() {
            PLACEHOLDER
        } else {
            field.kind.as_str()
        };
        if self.ignores.contains(kind) {
            let _ = writeln!(
                out,
                "{pad}{}{optional}: {PLACEHOLDER}; // ignored type {kind}, convert manually",
                field.json_name
            );
        } else {
            let _ = writeln!(out, "{pad}{}{optional}: {kind};", field.json_name);
        }
    }
}

/// Write `text` as `//` comment lines, one per source line
fn write_comment(out: &mut String, pad: &str, text: &str) {
    for line in utils::comment_lines(text) {
        let _ = writeln!(out, "{pad}// {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typescript::model::ValueKind;
    use pretty_assertions::assert_eq;

    fn field(json_name: &str, kind: &str, required: bool) -> FieldInfo {
        FieldInfo {
            name: json_name.to_string(),
            json_name: json_name.to_string(),
            kind: kind.to_string(),
            required,
            ..Default::default()
        }
    }

    fn sample() -> (BTreeMap<String, StructInfo>, Vec<ConstDecl>) {
        let mut name = field("name", "string", false);
        name.description = "Display name".to_string();
        name.default = "anonymous".to_string();
        name.length = "64".to_string();

        let mut status = field("status", "UserStatus", true);
        status.enum_values = vec![
            EnumValue::Str("active".to_string()),
            EnumValue::Str("locked".to_string()),
        ];

        let user = StructInfo {
            name: "User".to_string(),
            description: "A user account".to_string(),
            fields: vec![field("id", "number", true), name, status],
        };
        let role = StructInfo {
            name: "Role".to_string(),
            description: String::new(),
            fields: vec![field("code", "string", true), field("raw", "RawExtension", false)],
        };

        let mut structs = BTreeMap::new();
        structs.insert("User".to_string(), user);
        structs.insert("Role".to_string(), role);

        let consts = vec![
            ConstDecl {
                model: "User".to_string(),
                name: "UserStatus".to_string(),
                raw: "active|locked".to_string(),
                value_kind: ValueKind::String,
                values: vec![
                    EnumValue::Str("active".to_string()),
                    EnumValue::Str("locked".to_string()),
                ],
                description: "Account status".to_string(),
            },
            ConstDecl {
                model: "User".to_string(),
                name: "UserLevel".to_string(),
                raw: "1|2".to_string(),
                value_kind: ValueKind::Unsigned,
                values: vec![EnumValue::Uint(1), EnumValue::Uint(2)],
                description: String::new(),
            },
        ];
        (structs, consts)
    }

    #[test]
    fn test_emit_declarations() {
        let mut config = Config::default();
        config.ignores.push("RawExtension".to_string());
        let (structs, consts) = sample();
        let text = DeclarationEmitter::new(&config).emit(&structs, &consts);

        let expected = "\
declare namespace API {
    // Account status
    type UserStatus = 'active' | 'locked';
    // UserLevel
    type UserLevel = 1 | 2;
    // Role
    type Role = {
        code: string;
        raw?: any; // ignored type RawExtension, convert manually
    };
    // User: A user account
    type User = {
        id: number;
        // Display name
        // default: anonymous
        // max length: 64
        name?: string;
        // values: active;locked
        status: UserStatus;
    };
}
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_sentinel_and_custom_namespace() {
        let mut config = Config::default();
        config.namespace = "Backend".to_string();
        let mut structs = BTreeMap::new();
        structs.insert(
            "StructField".to_string(),
            StructInfo {
                name: "StructField".to_string(),
                ..Default::default()
            },
        );
        let text = DeclarationEmitter::new(&config).emit(&structs, &[]);
        assert_eq!(text, "declare namespace Backend {\n}\n");
    }

    #[test]
    fn test_ignore_builder_and_empty_kind() {
        let mut structs = BTreeMap::new();
        structs.insert(
            "Pod".to_string(),
            StructInfo {
                name: "Pod".to_string(),
                description: String::new(),
                fields: vec![field("spec", "PodSpec", true), field("extra", "", false)],
            },
        );
        let text = DeclarationEmitter::new(&Config::default())
            .ignore(["PodSpec"])
            .emit(&structs, &[]);
        assert!(text.contains("        spec: any; // ignored type PodSpec, convert manually\n"));
        assert!(text.contains("        extra?: any;\n"));
    }

    #[test]
    fn test_multiline_descriptions_stay_commented() {
        let mut note = field("note", "string", false);
        note.description = "first line\r\nsecond line".to_string();
        let mut structs = BTreeMap::new();
        structs.insert(
            "Memo".to_string(),
            StructInfo {
                name: "Memo".to_string(),
                description: "A memo\nwith details".to_string(),
                fields: vec![note],
            },
        );
        let text = DeclarationEmitter::new(&Config::default()).emit(&structs, &[]);
        let expected = "\
declare namespace API {
    // Memo: A memo
    // with details
    type Memo = {
        // first line
        // second line
        note?: string;
    };
}
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_string_literals_are_escaped() {
        let consts = vec![ConstDecl {
            model: "Q".to_string(),
            name: "QMode".to_string(),
            raw: "it's".to_string(),
            value_kind: ValueKind::String,
            values: vec![EnumValue::Str("it's".to_string())],
            description: String::new(),
        }];
        let text = DeclarationEmitter::new(&Config::default()).emit(&BTreeMap::new(), &consts);
        assert!(text.contains("type QMode = 'it\\'s';"));
    }
}
