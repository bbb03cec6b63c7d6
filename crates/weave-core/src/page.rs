//! Pages: borrowed views of one section of a document.

use std::fmt;

use crate::node::Node;

/// Literal written between consecutive pages.
pub const BREAK_MARKER: &str = "\n<!--BREAK-->\n";

static BREAK: Node = Node::Break;

/// One section of a [`Document`](crate::Document).
///
/// A page borrows its nodes from the document; it has no lifecycle of its
/// own. Every page except the last ends with the break marker.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<'a> {
    number: usize,
    nodes: &'a [Node],
    trailing_break: bool,
}

impl<'a> Page<'a> {
    pub(crate) fn new(number: usize, nodes: &'a [Node], trailing_break: bool) -> Self {
        Self {
            number,
            nodes,
            trailing_break,
        }
    }

    /// Section number of this page.
    pub fn number(&self) -> usize {
        self.number
    }

    /// The page's nodes, including the trailing break marker if present.
    pub fn nodes(&self) -> impl Iterator<Item = &'a Node> + use<'a> {
        let marker = self.trailing_break.then_some(&BREAK);
        self.nodes.iter().chain(marker)
    }

    /// Nodes borrowed from the document, without the break marker.
    pub fn content(&self) -> &'a [Node] {
        self.nodes
    }

    /// Node count, including the break marker.
    pub fn len(&self) -> usize {
        self.nodes.len() + usize::from(self.trailing_break)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ends_with_break(&self) -> bool {
        self.trailing_break
    }
}

impl fmt::Display for Page<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.nodes().try_for_each(|node| node.fmt(f))
    }
}

/// Concatenate rendered pages.
#[must_use]
pub fn render_pages(pages: &[Page<'_>]) -> String {
    pages.iter().map(ToString::to_string).collect()
}
