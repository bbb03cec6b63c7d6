//! Classification of `code` elements into nodes.
//!
//! The rule is a strict three-way partition on attribute presence:
//!
//! | attributes        | node                      |
//! |-------------------|---------------------------|
//! | none              | [`InlineCode`]            |
//! | `src` present     | [`SourceCode`]            |
//! | anything else     | [`FencedCode`]            |
//!
//! Classification never inspects attribute values beyond what is needed to
//! build the node. Unknown directives are left for execution time.

use std::path::{Path, PathBuf};

use weave_lexer::Element;

use crate::error::{Error, Location, Result};
use crate::node::{FencedCode, InlineCode, Node, SourceCode};

/// Paths fixed when the parser is configured.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassifyContext {
    /// Directory `src` references resolve against.
    pub root: PathBuf,
    /// Directory executed code runs in.
    pub work_dir: PathBuf,
    /// Document filename, used in error locations.
    pub filename: Option<String>,
}

impl ClassifyContext {
    fn location(&self, element: &Element) -> Location {
        Location::new(self.filename.as_deref(), element.line())
    }
}

/// Classify a `code` element into nodes.
///
/// Returns an error for a missing element, checked before any attribute is
/// looked at, and for an empty `src` value.
pub fn classify_code(element: Option<&Element>, ctx: &ClassifyContext) -> Result<Vec<Node>> {
    let Some(element) = element else {
        return Err(Error::InvalidInput("code element is missing".to_owned()));
    };

    let attrs = element.attrs();
    let location = ctx.location(element);

    let node = if attrs.is_empty() {
        Node::InlineCode(InlineCode::new(
            location,
            element.text(),
            element.source().to_owned(),
        ))
    } else if let Some(src) = attrs.get("src") {
        if src.trim().is_empty() {
            return Err(Error::MalformedAttribute {
                location,
                name: "src".to_owned(),
                value: src.to_owned(),
                reason: "expected a file path".to_owned(),
            });
        }
        let language = attrs
            .get("language")
            .filter(|lang| !lang.is_empty())
            .map(str::to_owned);
        Node::SourceCode(SourceCode::new(
            location,
            src.to_owned(),
            resolve(&ctx.root, src),
            language,
            element.source().to_owned(),
        ))
    } else {
        Node::FencedCode(FencedCode::new(
            location,
            attrs.clone(),
            element.text(),
            element.source().to_owned(),
            ctx.work_dir.clone(),
        ))
    };

    tracing::debug!(line = element.line(), kind = node.kind(), "classified code element");
    Ok(vec![node])
}

fn resolve(root: &Path, src: &str) -> PathBuf {
    let path = Path::new(src);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx() -> ClassifyContext {
        ClassifyContext {
            root: PathBuf::from("/book/ch1"),
            work_dir: PathBuf::from("/work"),
            filename: Some("hype.md".to_owned()),
        }
    }

    fn classify_one(element: &Element) -> Node {
        let mut nodes = classify_code(Some(element), &ctx()).unwrap();
        assert_eq!(nodes.len(), 1);
        nodes.remove(0)
    }

    #[test]
    fn test_missing_element_is_invalid_input() {
        let err = classify_code(None, &ctx()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_no_attributes_is_inline() {
        let element = Element::new("code").with_text("ls -la").with_source("`ls -la`");
        let node = classify_one(&element);
        assert!(matches!(node, Node::InlineCode(_)));
        assert_eq!(node.to_string(), "`ls -la`");
    }

    #[test]
    fn test_src_is_source_code() {
        let element = Element::new("code")
            .with_attr("src", "snippet.go")
            .with_line(4);
        let Node::SourceCode(node) = classify_one(&element) else {
            panic!("expected source code");
        };
        assert_eq!(node.path(), Path::new("/book/ch1/snippet.go"));
        assert_eq!(node.language(), "go");
        assert_eq!(node.location().to_string(), "hype.md:4");
    }

    #[test]
    fn test_src_wins_over_other_attributes() {
        let element = Element::new("code")
            .with_attr("language", "text")
            .with_attr("exec", "")
            .with_attr("src", "main.go");
        let Node::SourceCode(node) = classify_one(&element) else {
            panic!("expected source code");
        };
        assert_eq!(node.language(), "text");
    }

    #[test]
    fn test_absolute_src_is_kept() {
        let element = Element::new("code").with_attr("src", "/etc/hosts");
        let Node::SourceCode(node) = classify_one(&element) else {
            panic!("expected source code");
        };
        assert_eq!(node.path(), Path::new("/etc/hosts"));
    }

    #[test]
    fn test_empty_src_is_malformed() {
        let element = Element::new("code").with_attr("src", "");
        let err = classify_code(Some(&element), &ctx()).unwrap_err();
        assert!(matches!(err, Error::MalformedAttribute { ref name, .. } if name == "src"));
    }

    #[test]
    fn test_other_attributes_are_fenced() {
        let element = Element::new("code")
            .with_attr("language", "cobol")
            .with_attr("exec", "")
            .with_attr("frobnicate", "yes")
            .with_text("DISPLAY 'HI'.\n");
        let Node::FencedCode(node) = classify_one(&element) else {
            panic!("expected fenced code");
        };
        assert_eq!(node.language(), Some("cobol"));
        assert_eq!(node.code(), "DISPLAY 'HI'.\n");
        assert_eq!(node.attrs().get("frobnicate"), Some("yes"));
    }

    #[test]
    fn test_empty_language_is_still_fenced() {
        let element = Element::new("code").with_attr("language", "");
        assert!(matches!(classify_one(&element), Node::FencedCode(_)));
    }

    #[test]
    fn test_classification_does_not_mutate_element() {
        let element = Element::new("code").with_attr("src", "a.go").with_text("x");
        let before = element.clone();
        classify_one(&element);
        assert_eq!(element, before);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let element = Element::new("code").with_attr("language", "sh").with_text("ls\n");
        assert_eq!(classify_one(&element), classify_one(&element));
    }
}
