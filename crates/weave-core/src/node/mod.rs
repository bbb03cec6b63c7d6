//! Document nodes.
//!
//! [`Node`] is a closed set of variants. Only [`SourceCode`] and
//! [`FencedCode`] are executable; every other variant is inert and
//! [`Node::run`] is a no-op for it.

mod command;
mod fenced;
mod inline;
mod source;

use std::fmt;

pub use command::CapturedOutput;
pub use fenced::FencedCode;
pub use inline::InlineCode;
pub use source::SourceCode;

use crate::context::ExecContext;
use crate::error::{Location, Result};
use crate::page::BREAK_MARKER;

/// A classified unit of a document.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Literal content, never executed.
    Text(String),
    /// Code without attributes, rendered verbatim.
    InlineCode(InlineCode),
    /// Code loaded from a file referenced by `src`.
    SourceCode(SourceCode),
    /// Fenced code, optionally executed.
    FencedCode(FencedCode),
    /// Page break marker between sections.
    Break,
}

impl Node {
    /// Create a text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Whether this variant can run.
    pub fn is_executable(&self) -> bool {
        matches!(self, Self::SourceCode(_) | Self::FencedCode(_))
    }

    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::InlineCode(_) => "inline code",
            Self::SourceCode(_) => "source code",
            Self::FencedCode(_) => "fenced code",
            Self::Break => "break",
        }
    }

    /// Where the node came from, for nodes created from elements.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::InlineCode(node) => Some(node.location()),
            Self::SourceCode(node) => Some(node.location()),
            Self::FencedCode(node) => Some(node.location()),
            Self::Text(_) | Self::Break => None,
        }
    }

    /// Execute the node, updating its rendered form in place.
    ///
    /// Inert variants return `Ok(())` without touching the context.
    pub async fn run(&mut self, ctx: &ExecContext) -> Result<()> {
        match self {
            Self::SourceCode(node) => node.run(ctx).await,
            Self::FencedCode(node) => node.run(ctx).await,
            Self::Text(_) | Self::InlineCode(_) | Self::Break => Ok(()),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::InlineCode(node) => node.fmt(f),
            Self::SourceCode(node) => node.fmt(f),
            Self::FencedCode(node) => node.fmt(f),
            Self::Break => f.write_str(BREAK_MARKER),
        }
    }
}

/// Write `body` inside a code fence long enough not to be closed by it.
pub(crate) fn write_fenced(f: &mut fmt::Formatter<'_>, info: &str, body: &str) -> fmt::Result {
    let longest_run = body
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run.max(2) + 1);

    writeln!(f, "{fence}{info}")?;
    f.write_str(body)?;
    if !body.is_empty() && !body.ends_with('\n') {
        f.write_str("\n")?;
    }
    write!(f, "{fence}")
}
