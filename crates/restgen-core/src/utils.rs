//! String transformation utilities for code generation

/// Keep only the last `.`-separated segment of a qualified name
pub fn last_segment(s: &str) -> &str {
    s.rsplit('.').next().unwrap_or(s)
}

/// Remove every `[` and `]`, as left behind by list-valued metadata
pub fn strip_brackets(s: &str) -> String {
    s.replace(['[', ']'], "")
}

/// Split comment text into lines, accepting `\n` and `\r\n`
pub fn comment_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
}

/// Sanitize a string to be safe for use as a filename across all operating systems
/// Replaces any non-alphanumeric characters with underscores
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("model.User"), "User");
        assert_eq!(last_segment("github.com/acme/model.User"), "User");
        assert_eq!(last_segment("User"), "User");
        assert_eq!(last_segment(""), "");
    }

    #[test]
    fn test_strip_brackets() {
        assert_eq!(strip_brackets("[listUsers]"), "listUsers");
        assert_eq!(strip_brackets("a[b]c"), "abc");
    }

    #[test]
    fn test_comment_lines() {
        let lines: Vec<_> = comment_lines("first\r\nsecond\nthird").collect();
        assert_eq!(lines, vec!["first", "second", "third"]);
        assert_eq!(comment_lines("single").count(), 1);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("user_mgmt"), "user_mgmt");
        assert_eq!(sanitize_filename("user mgmt/v2"), "user_mgmt_v2");
    }
}
