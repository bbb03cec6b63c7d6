//! Turns lexed elements into a [`Document`].

use std::io::Read;
use std::path::{Path, PathBuf};

use weave_lexer::{Child, Element, lex};

use crate::classify::{ClassifyContext, classify_code};
use crate::document::{Document, Section};
use crate::error::{Error, Location, Result};
use crate::node::Node;

const CODE_TAG: &str = "code";
const PAGE_TAG: &str = "page";

/// Document parser, configured once and reusable across inputs.
///
/// `src` references resolve against `root`; executed code runs in
/// `work_dir`. Both are fixed here so parsing never depends on the process
/// working directory.
///
/// # Example
///
/// ```
/// use weave_core::{Node, Parser};
///
/// let parser = Parser::new("/book/ch1").with_filename("hype.md");
/// let doc = parser.parse("Intro\n::page\nMore `ls`\n").unwrap();
///
/// assert_eq!(doc.sections().len(), 2);
/// assert!(matches!(doc.nodes()[2], Node::InlineCode(_)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parser {
    root: PathBuf,
    filename: Option<String>,
    work_dir: PathBuf,
    section: usize,
    section_override: Option<usize>,
}

impl Parser {
    /// Parser rooted at `root`, which is also the working directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            work_dir: root.clone(),
            root,
            filename: None,
            section: 1,
            section_override: None,
        }
    }

    /// Filename used in error locations.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Directory executed code runs in.
    #[must_use]
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Number of the first section. Zero means the default of 1.
    #[must_use]
    pub fn with_section(mut self, section: usize) -> Self {
        self.section = section.max(1);
        self
    }

    /// Section number that wins over any `section` attribute in the input.
    ///
    /// Zero clears the override.
    #[must_use]
    pub fn with_section_override(mut self, section: usize) -> Self {
        self.section_override = (section > 0).then_some(section);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn section(&self) -> usize {
        self.section
    }

    pub fn section_override(&self) -> Option<usize> {
        self.section_override
    }

    /// Lex and parse markup text.
    pub fn parse(&self, input: &str) -> Result<Document> {
        self.parse_children(lex(input)?)
    }

    /// Read all of `reader`, then parse it.
    pub fn parse_reader(&self, mut reader: impl Read) -> Result<Document> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;
        self.parse(&input)
    }

    /// Parse an already-lexed stream.
    ///
    /// Stops at the first element that cannot be handled.
    pub fn parse_children(&self, children: impl IntoIterator<Item = Child>) -> Result<Document> {
        let ctx = ClassifyContext {
            root: self.root.clone(),
            work_dir: self.work_dir.clone(),
            filename: self.filename.clone(),
        };
        let mut builder = Builder::new(self.section_override.unwrap_or(self.section));

        for child in children {
            match child {
                Child::Text(text) => builder.nodes.push(Node::Text(text)),
                Child::Element(element) => match element.tag() {
                    CODE_TAG => builder.nodes.extend(classify_code(Some(&element), &ctx)?),
                    PAGE_TAG => builder.page(&element, self)?,
                    tag => {
                        return Err(Error::UnknownElement {
                            location: self.location(&element),
                            tag: tag.to_owned(),
                        });
                    }
                },
            }
        }

        let doc = builder.finish();
        tracing::info!(
            nodes = doc.len(),
            sections = doc.sections().len(),
            first_section = doc.section(),
            "parsed document"
        );
        Ok(doc)
    }

    fn location(&self, element: &Element) -> Location {
        Location::new(self.filename.as_deref(), element.line())
    }

    /// Section number requested by a page marker's `section` attribute.
    fn requested_section(&self, element: &Element) -> Result<Option<usize>> {
        let Some(value) = element.attrs().get("section") else {
            return Ok(None);
        };
        match value.trim().parse::<usize>() {
            Ok(number) if number > 0 => Ok(Some(number)),
            _ => Err(Error::MalformedAttribute {
                location: self.location(element),
                name: "section".to_owned(),
                value: value.to_owned(),
                reason: "expected a positive integer".to_owned(),
            }),
        }
    }
}

/// Accumulates nodes and section starts while parsing.
struct Builder {
    nodes: Vec<Node>,
    sections: Vec<Section>,
}

impl Builder {
    fn new(section: usize) -> Self {
        Self {
            nodes: Vec::new(),
            sections: vec![Section {
                number: section,
                start: 0,
            }],
        }
    }

    fn current(&self) -> usize {
        self.sections.last().map_or(1, |section| section.number)
    }

    /// Whether nothing but blank text has been seen.
    fn at_start(&self) -> bool {
        self.sections.len() == 1
            && self
                .nodes
                .iter()
                .all(|node| matches!(node, Node::Text(text) if text.trim().is_empty()))
    }

    fn page(&mut self, element: &Element, parser: &Parser) -> Result<()> {
        let requested = parser.requested_section(element)?;
        // An explicit override decides numbering; markers only split pages
        let requested = if parser.section_override.is_some() {
            if requested.is_some() {
                tracing::debug!(line = element.line(), "section attribute ignored");
            }
            None
        } else {
            requested
        };

        if self.at_start() {
            // A leading marker names the first section instead of opening an empty page
            if let Some(number) = requested {
                self.sections[0].number = number;
            }
            return Ok(());
        }

        let current = self.current();
        let number = requested.unwrap_or(current + 1);
        if number <= current {
            return Err(Error::Structural(format!(
                "{}: section {number} does not follow section {current}",
                parser.location(element)
            )));
        }

        self.sections.push(Section {
            number,
            start: self.nodes.len(),
        });
        Ok(())
    }

    fn finish(self) -> Document {
        Document::from_sections(self.nodes, self.sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn numbers(doc: &Document) -> Vec<usize> {
        doc.sections().iter().map(|s| s.number).collect()
    }

    #[test]
    fn test_prose_and_inline_code() {
        let doc = Parser::new("/root").parse("Run `ls` now.\n").unwrap();
        assert_eq!(doc.len(), 3);
        assert!(matches!(doc.nodes()[1], Node::InlineCode(_)));
        assert_eq!(doc.render().unwrap(), "Run `ls` now.\n");
    }

    #[test]
    fn test_default_section_is_one() {
        let parser = Parser::new("/root").with_section(0);
        assert_eq!(parser.section(), 1);
        let doc = parser.parse("text\n").unwrap();
        assert_eq!(numbers(&doc), vec![1]);
    }

    #[test]
    fn test_page_markers_split_sections() {
        let input = "one\n::page\ntwo\n::page\nthree\n";
        let doc = Parser::new("/root").parse(input).unwrap();
        assert_eq!(numbers(&doc), vec![1, 2, 3]);
        assert_eq!(
            doc.render().unwrap(),
            "one\n\n<!--BREAK-->\ntwo\n\n<!--BREAK-->\nthree\n"
        );
    }

    #[test]
    fn test_explicit_section_numbers() {
        let input = "one\n::page{section=4}\ntwo\n";
        let doc = Parser::new("/root").parse(input).unwrap();
        assert_eq!(numbers(&doc), vec![1, 4]);
    }

    #[test]
    fn test_leading_marker_sets_first_section() {
        let input = "\n::page{section=3}\nbody\n::page\nmore\n";
        let doc = Parser::new("/root").parse(input).unwrap();
        assert_eq!(numbers(&doc), vec![3, 4]);
        assert_eq!(doc.pages().unwrap().len(), 2);
    }

    #[test]
    fn test_override_wins_over_markers() {
        let input = "::page{section=3}\nbody\n::page{section=9}\nmore\n";
        let doc = Parser::new("/root")
            .with_section(2)
            .with_section_override(5)
            .parse(input)
            .unwrap();
        assert_eq!(numbers(&doc), vec![5, 6]);
    }

    #[test]
    fn test_non_increasing_section_is_structural() {
        let input = "one\n::page{section=2}\ntwo\n::page{section=2}\n";
        let err = Parser::new("/root")
            .with_filename("hype.md")
            .parse(input)
            .unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
        assert!(err.to_string().contains("hype.md:4"));
    }

    #[test]
    fn test_malformed_section_attribute() {
        let err = Parser::new("/root").parse("a\n::page{section=zero}\n").unwrap_err();
        assert!(matches!(err, Error::MalformedAttribute { ref name, .. } if name == "section"));
    }

    #[test]
    fn test_unknown_element_fails_fast() {
        let input = "a\n::include{src=b.md}\n";
        let err = Parser::new("/root")
            .with_filename("hype.md")
            .parse(input)
            .unwrap_err();
        assert_eq!(err.to_string(), "hype.md:2: unknown element 'include'");
    }

    #[test]
    fn test_source_resolves_against_root() {
        let doc = Parser::new("/book/ch1")
            .with_work_dir("/elsewhere")
            .parse("::code{src=snippet.go}\n")
            .unwrap();
        let Node::SourceCode(node) = &doc.nodes()[0] else {
            panic!("expected source code");
        };
        assert_eq!(node.path(), Path::new("/book/ch1/snippet.go"));
    }

    #[test]
    fn test_parse_reader() {
        let doc = Parser::new("/root")
            .parse_reader("hello `world`\n".as_bytes())
            .unwrap();
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn test_lex_error_propagates() {
        let err = Parser::new("/root").parse("```sh\nnever closed\n").unwrap_err();
        assert!(matches!(err, Error::Lex(_)));
    }

    #[test]
    fn test_parse_children_without_lexer() {
        let children = vec![
            Child::Text("see ".to_owned()),
            Child::Element(Element::new("code").with_text("ls")),
        ];
        let doc = Parser::new("/root").parse_children(children).unwrap();
        assert_eq!(doc.to_string(), "see `ls`");
    }
}
