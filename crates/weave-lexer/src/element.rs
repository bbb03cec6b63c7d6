//! Generic tagged elements produced by the lexer.

use std::fmt;

/// Ordered attribute set with unique keys.
///
/// Insertion order is kept for re-serialization. Inserting a key that is
/// already present replaces its value in place.
///
/// # Example
///
/// ```
/// use weave_lexer::Attributes;
///
/// let mut attrs = Attributes::new();
/// attrs.insert("language", "sh");
/// attrs.insert("exec", "");
/// attrs.insert("language", "bash");
///
/// assert_eq!(attrs.len(), 2);
/// assert_eq!(attrs.get("language"), Some("bash"));
/// assert_eq!(attrs.to_syntax(), r#"language="bash" exec"#);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// Create an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an attribute value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Insert an attribute, replacing the value of an existing key.
    ///
    /// Returns the previous value if the key was already present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(key, _)| *key == name) {
            return Some(std::mem::replace(&mut entry.1, value));
        }
        self.entries.push((name, value));
        None
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Serialize back to `key="value"` syntax.
    ///
    /// Attributes with an empty value are written as bare flags. A value
    /// containing `"` is single-quoted, since quoted values have no escapes.
    #[must_use]
    pub fn to_syntax(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| {
                if value.is_empty() {
                    key.clone()
                } else if value.contains('"') {
                    format!("{key}='{value}'")
                } else {
                    format!(r#"{key}="{value}""#)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (key, value) in iter {
            attrs.insert(key, value);
        }
        attrs
    }
}

/// A child of an element, or a top-level item of the lexed stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Child {
    /// A tagged element.
    Element(Element),
    /// Literal text.
    Text(String),
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// A generic parsed unit: tag name, attributes and children.
///
/// Elements also remember the 1-based line they start on and the verbatim
/// markup they were lexed from, so consumers can render them losslessly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: Attributes,
    children: Vec<Child>,
    line: usize,
    source: String,
}

impl Element {
    /// Create an element with the given tag and no attributes.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            line: 1,
            ..Self::default()
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name, value);
        self
    }

    /// Replace the attribute set.
    #[must_use]
    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    /// Append a text child.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Child::Text(text.into()));
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Set the source line.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Set the verbatim markup.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// 1-based line the element starts on.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Verbatim markup the element was lexed from.
    ///
    /// Empty for elements built by hand.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Concatenated text of all descendants.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(children: &[Child], out: &mut String) {
    for child in children {
        match child {
            Child::Text(text) => out.push_str(text),
            Child::Element(element) => collect_text(&element.children, out),
        }
    }
}

impl fmt::Display for Element {
    /// Writes the verbatim source, or a `::tag{attrs}` form for hand-built elements.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.source.is_empty() {
            return f.write_str(&self.source);
        }
        write!(f, "::{}", self.tag)?;
        if !self.attrs.is_empty() {
            write!(f, "{{{}}}", self.attrs.to_syntax())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_keeps_keys_unique() {
        let mut attrs = Attributes::new();
        assert_eq!(attrs.insert("src", "a.go"), None);
        assert_eq!(attrs.insert("src", "b.go"), Some("a.go".to_owned()));
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("src"), Some("b.go"));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let attrs: Attributes = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        let keys: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut attrs: Attributes = [("a", "1"), ("b", "2")].into_iter().collect();
        attrs.insert("a", "9");
        assert_eq!(attrs.to_syntax(), r#"a="9" b="2""#);
    }

    #[test]
    fn test_missing_lookup_is_none() {
        let attrs = Attributes::new();
        assert!(attrs.is_empty());
        assert_eq!(attrs.get("src"), None);
    }

    #[test]
    fn test_to_syntax_single_quotes_double_quoted_value() {
        let attrs: Attributes = [("exec", r#"echo "hi""#)].into_iter().collect();
        assert_eq!(attrs.to_syntax(), r#"exec='echo "hi"'"#);
    }

    #[test]
    fn test_element_text_is_recursive() {
        let inner = Element::new("em").with_text("world");
        let element = Element::new("p").with_text("hello ").with_child(inner);
        assert_eq!(element.text(), "hello world");
    }

    #[test]
    fn test_display_prefers_source() {
        let element = Element::new("code")
            .with_attr("src", "main.go")
            .with_source("::code{src=main.go}\n");
        assert_eq!(element.to_string(), "::code{src=main.go}\n");
    }

    #[test]
    fn test_display_without_source() {
        let element = Element::new("page").with_attr("section", "2");
        assert_eq!(element.to_string(), r#"::page{section="2"}"#);
    }
}
