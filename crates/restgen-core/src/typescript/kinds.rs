//! Static mapping from backend type names to TypeScript types.

use std::collections::HashMap;

use once_cell::sync::Lazy;

static KINDS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("bool", "boolean"),
        ("interface {}", "any"),
        ("int", "number"),
        ("int8", "number"),
        ("int16", "number"),
        ("int32", "number"),
        ("int64", "number"),
        ("uint", "number"),
        ("uint8", "number"),
        ("uint16", "number"),
        ("uint32", "number"),
        ("uint64", "number"),
        ("float32", "number"),
        ("float64", "number"),
        ("string", "string"),
        ("Time", "string"),
        ("JSONMap", "{[key: string]: string}"),
        ("map[string]string", "{[key: string]: string}"),
        ("[]string", "string[]"),
        ("ArrayUint", "number[]"),
        ("[]uint", "number[]"),
        ("map[string]interface {}", "{[key: string]: any}"),
        ("map[string][]string", "{[key: string]: string[]}"),
    ])
});

/// Exact-match lookup of a normalized type name
pub fn resolve(type_name: &str) -> Option<&'static str> {
    KINDS.get(type_name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Primitive;

    #[test]
    fn test_every_primitive_is_mapped() {
        for p in Primitive::ALL {
            assert!(resolve(p.as_str()).is_some(), "{} is not mapped", p);
        }
        assert_eq!(resolve("bool"), Some("boolean"));
        assert_eq!(resolve("float32"), Some("number"));
    }

    #[test]
    fn test_semantic_aliases() {
        assert_eq!(resolve("Time"), Some("string"));
        assert_eq!(resolve("ArrayUint"), Some("number[]"));
        assert_eq!(resolve("map[string]string"), Some("{[key: string]: string}"));
        assert_eq!(resolve("map[string]interface {}"), Some("{[key: string]: any}"));
    }

    #[test]
    fn test_miss_is_none() {
        assert_eq!(resolve("User"), None);
        assert_eq!(resolve("*string"), None);
        assert_eq!(resolve("time.Time"), None);
    }
}
