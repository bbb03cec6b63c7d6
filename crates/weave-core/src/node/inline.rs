use std::fmt;

use crate::error::Location;

/// Code without attributes (e.g. an inline code span).
///
/// Rendered exactly as it was written; never executed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineCode {
    location: Location,
    code: String,
    source: String,
}

impl InlineCode {
    pub(crate) fn new(location: Location, code: String, source: String) -> Self {
        Self {
            location,
            code,
            source,
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The code, without delimiters.
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for InlineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.source.is_empty() {
            write!(f, "`{}`", self.code)
        } else {
            f.write_str(&self.source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_source_verbatim() {
        let node = InlineCode::new(Location::default(), "a`b".to_owned(), "`` a`b ``".to_owned());
        assert_eq!(node.to_string(), "`` a`b ``");
    }

    #[test]
    fn test_renders_code_without_source() {
        let node = InlineCode::new(Location::default(), "ls".to_owned(), String::new());
        assert_eq!(node.to_string(), "`ls`");
    }
}
