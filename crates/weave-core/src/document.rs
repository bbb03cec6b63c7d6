//! Parsed documents, their execution and pagination.

use std::fmt;

use crate::context::ExecContext;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::page::{BREAK_MARKER, Page, render_pages};

/// Start of a section within a document's node sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Section {
    /// Section number, at least 1.
    pub number: usize,
    /// Index of the first node of the section.
    pub start: usize,
}

/// Ordered nodes plus the section boundaries recorded while parsing.
///
/// # Example
///
/// ```
/// use weave_core::{Document, Node};
///
/// let nodes = vec![Node::text("a"), Node::text("b"), Node::text("c")];
/// let doc = Document::with_breaks(nodes, 1, &[2]);
///
/// let pages = doc.pages().unwrap();
/// assert_eq!(pages.len(), 2);
/// assert_eq!(doc.render().unwrap(), "ab\n<!--BREAK-->\nc");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
    sections: Vec<Section>,
}

impl Document {
    /// A single-section document.
    #[must_use]
    pub fn new(nodes: Vec<Node>, section: usize) -> Self {
        Self::from_sections(nodes, vec![Section { number: section, start: 0 }])
    }

    /// A document numbered consecutively from `section`, with a new section
    /// starting at each index in `breaks`.
    #[must_use]
    pub fn with_breaks(nodes: Vec<Node>, section: usize, breaks: &[usize]) -> Self {
        let sections = std::iter::once(0)
            .chain(breaks.iter().copied())
            .zip(section..)
            .map(|(start, number)| Section { number, start })
            .collect();
        Self::from_sections(nodes, sections)
    }

    /// A document with explicit sections.
    ///
    /// Sections are checked by [`pages`](Self::pages), not here.
    #[must_use]
    pub fn from_sections(nodes: Vec<Node>, sections: Vec<Section>) -> Self {
        Self { nodes, sections }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Number of the first section.
    pub fn section(&self) -> usize {
        self.sections.first().map_or(1, |section| section.number)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Run every executable node once, in document order.
    ///
    /// Stops at the first failure. The context is checked before anything
    /// runs and again before each executable node; once it is done no
    /// further node is started.
    pub async fn execute(&mut self, ctx: &ExecContext) -> Result<()> {
        if let Some(cause) = ctx.err() {
            return Err(Error::Cancelled {
                location: None,
                cause,
            });
        }

        let executable = self.nodes.iter().filter(|node| node.is_executable()).count();
        tracing::info!(nodes = self.nodes.len(), executable, "executing document");

        for node in self.nodes.iter_mut().filter(|node| node.is_executable()) {
            if let Some(cause) = ctx.err() {
                return Err(Error::Cancelled {
                    location: node.location().cloned(),
                    cause,
                });
            }
            node.run(ctx).await?;
        }

        Ok(())
    }

    /// Split into one page per section, in ascending section order.
    ///
    /// Every page but the last carries a trailing break marker.
    pub fn pages(&self) -> Result<Vec<Page<'_>>> {
        self.validate()?;

        let last = self.sections.len() - 1;
        let pages = self
            .sections
            .iter()
            .enumerate()
            .map(|(index, section)| {
                let end = self
                    .sections
                    .get(index + 1)
                    .map_or(self.nodes.len(), |next| next.start);
                Page::new(section.number, &self.nodes[section.start..end], index != last)
            })
            .collect();
        Ok(pages)
    }

    /// The page for section `number`.
    pub fn page(&self, number: usize) -> Result<Page<'_>> {
        self.pages()?
            .into_iter()
            .find(|page| page.number() == number)
            .ok_or_else(|| Error::Structural(format!("section {number} not found")))
    }

    /// Render all pages.
    pub fn render(&self) -> Result<String> {
        Ok(render_pages(&self.pages()?))
    }

    fn validate(&self) -> Result<()> {
        let Some(first) = self.sections.first() else {
            return Err(Error::Structural("document has no sections".to_owned()));
        };
        if first.number == 0 {
            return Err(Error::Structural("section numbers start at 1".to_owned()));
        }
        if first.start != 0 {
            return Err(Error::Structural(format!(
                "first section starts at node {} instead of 0",
                first.start
            )));
        }

        for pair in self.sections.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if next.number <= prev.number {
                return Err(Error::Structural(format!(
                    "section {} follows section {}",
                    next.number, prev.number
                )));
            }
            if next.start < prev.start {
                return Err(Error::Structural(format!(
                    "section {} starts before section {}",
                    next.number, prev.number
                )));
            }
        }

        let last = self.sections[self.sections.len() - 1];
        if last.start > self.nodes.len() {
            return Err(Error::Structural(format!(
                "section {} starts at node {} of {}",
                last.number,
                last.start,
                self.nodes.len()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Document {
    /// Nodes in order, with the break marker at every later section start.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut breaks = self.sections.iter().skip(1).map(|s| s.start).peekable();
        for (index, node) in self.nodes.iter().enumerate() {
            while breaks.next_if_eq(&index).is_some() {
                f.write_str(BREAK_MARKER)?;
            }
            node.fmt(f)?;
        }
        breaks.try_for_each(|_| f.write_str(BREAK_MARKER))
    }
}
