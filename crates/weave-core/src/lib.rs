//! Core pipeline for weave literate documents.
//!
//! Lexed elements are classified into [`Node`]s, executable nodes run under
//! an [`ExecContext`], and the resulting [`Document`] is split into
//! [`Page`]s and rendered back to text.
//!
//! ```text
//! markup ─▶ Parser (classify_code per element) ─▶ Document
//!        ─▶ Document::execute ─▶ Document::pages ─▶ render_pages ─▶ sink
//! ```
//!
//! [`Engine`] drives the whole pipeline under a timeout.
//!
//! # Example
//!
//! ```
//! use weave_core::{ExecContext, Parser};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let parser = Parser::new(std::env::temp_dir());
//! let mut doc = parser.parse("Use `ls` to list files.\n").unwrap();
//!
//! doc.execute(&ExecContext::background()).await.unwrap();
//! assert_eq!(doc.render().unwrap(), "Use `ls` to list files.\n");
//! # });
//! ```

mod classify;
mod context;
mod document;
mod duration;
mod engine;
mod error;
mod node;
mod page;
mod parser;

pub use classify::{ClassifyContext, classify_code};
pub use context::{CancelHandle, ContextError, ExecContext};
pub use document::{Document, Section};
pub use duration::{DurationError, parse_duration};
pub use engine::{DEFAULT_TIMEOUT, Engine, EngineConfig};
pub use error::{Error, Location, Result};
pub use node::{CapturedOutput, FencedCode, InlineCode, Node, SourceCode};
pub use page::{BREAK_MARKER, Page, render_pages};
pub use parser::Parser;
pub use weave_lexer::{Attributes, Child, Element, LexError};
