//! Leaf directive parsing: `::name[content]{attrs}` on a line of its own.

use crate::Attributes;
use crate::args::parse_attributes;

/// A leaf directive parsed from a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LeafDirective {
    pub(crate) name: String,
    pub(crate) content: String,
    pub(crate) attrs: Attributes,
}

/// Parse a line as a leaf directive.
///
/// Returns `None` unless the whole line (ignoring surrounding whitespace) is
/// exactly one directive. Three or more colons are container syntax and are
/// not leaf directives.
pub(crate) fn parse_leaf_line(line: &str) -> Option<LeafDirective> {
    let trimmed = line.trim();
    let after_colons = trimmed.strip_prefix("::")?;
    if after_colons.starts_with(':') {
        return None;
    }

    // Name ends at [, { or whitespace
    let name_end = after_colons
        .find(|c: char| c == '[' || c == '{' || c.is_whitespace())
        .unwrap_or(after_colons.len());
    let name = &after_colons[..name_end];
    if !is_valid_directive_name(name) {
        return None;
    }

    let mut rest = &after_colons[name_end..];

    let content = match balanced(rest, '[', ']') {
        Some((inner, consumed)) => {
            rest = &rest[consumed..];
            inner
        }
        None if rest.starts_with('[') => return None,
        None => "",
    };

    let attrs = match balanced(rest, '{', '}') {
        Some((inner, consumed)) => {
            rest = &rest[consumed..];
            parse_attributes(inner)
        }
        None if rest.starts_with('{') => return None,
        None => Attributes::new(),
    };

    if !rest.trim().is_empty() {
        return None;
    }

    Some(LeafDirective {
        name: name.to_owned(),
        content: content.to_owned(),
        attrs,
    })
}

/// Check if a name is a valid directive name.
///
/// Valid names start with a letter and contain only alphanumeric characters,
/// hyphens, and underscores.
fn is_valid_directive_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_alphabetic)
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Extract the content of a balanced `open ... close` group at the start of `s`.
///
/// Returns `(inner, bytes_consumed)`, or `None` if `s` does not start with
/// `open` or the group is never closed. Quoted sections are skipped so a
/// closing character inside a value does not end the group.
fn balanced(s: &str, open: char, close: char) -> Option<(&str, usize)> {
    if !s.starts_with(open) {
        return None;
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' if open == '{' => quote = Some(c),
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some((&s[1..i], i + 1));
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_leaf() {
        let directive = parse_leaf_line("::page").unwrap();
        assert_eq!(directive.name, "page");
        assert!(directive.content.is_empty());
        assert!(directive.attrs.is_empty());
    }

    #[test]
    fn test_leaf_with_attrs() {
        let directive = parse_leaf_line(r#"::code{src="snippet.go"}"#).unwrap();
        assert_eq!(directive.name, "code");
        assert_eq!(directive.attrs.get("src"), Some("snippet.go"));
    }

    #[test]
    fn test_leaf_with_content_and_attrs() {
        let directive = parse_leaf_line("::include[intro.md]{section=2}").unwrap();
        assert_eq!(directive.content, "intro.md");
        assert_eq!(directive.attrs.get("section"), Some("2"));
    }

    #[test]
    fn test_brace_inside_quoted_value() {
        let directive = parse_leaf_line(r#"::code{exec="echo }"}"#).unwrap();
        assert_eq!(directive.attrs.get("exec"), Some("echo }"));
    }

    #[test]
    fn test_surrounding_whitespace_allowed() {
        assert!(parse_leaf_line("  ::page  \n").is_some());
    }

    #[test]
    fn test_trailing_text_rejected() {
        assert_eq!(parse_leaf_line("::page and more"), None);
    }

    #[test]
    fn test_container_syntax_rejected() {
        assert_eq!(parse_leaf_line(":::note"), None);
    }

    #[test]
    fn test_inline_syntax_rejected() {
        assert_eq!(parse_leaf_line(":kbd[Ctrl]"), None);
    }

    #[test]
    fn test_unclosed_braces_rejected() {
        assert_eq!(parse_leaf_line("::code{src=a.go"), None);
    }

    #[test]
    fn test_invalid_name_rejected() {
        assert_eq!(parse_leaf_line("::"), None);
        assert_eq!(parse_leaf_line("::1abc"), None);
        assert_eq!(parse_leaf_line("::foo!"), None);
    }

    #[test]
    fn test_prose_with_double_colon_rejected() {
        assert_eq!(parse_leaf_line("std::io::Result"), None);
    }
}
