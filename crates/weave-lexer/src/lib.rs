//! Lexer for weave literate documents.
//!
//! Splits markup text into an ordered stream of [`Child`] values: literal
//! prose ([`Child::Text`]) and generic tagged [`Element`]s. The lexer knows
//! nothing about what elements mean; classification happens in `weave-core`.
//!
//! # Recognized syntax
//!
//! - Fenced code blocks (backticks or tildes) become `code` elements. The info
//!   string `language key=value flag` becomes attributes, with the first bare
//!   word stored as `language`.
//! - Inline code spans become `code` elements with no attributes.
//! - Leaf directives on a line of their own, `::name[content]{attrs}`, become
//!   elements tagged `name` (e.g. `::code{src="main.go"}`, `::page`).
//! - Everything else is passed through verbatim as text.
//!
//! # Example
//!
//! ```
//! use weave_lexer::{Child, lex};
//!
//! let children = lex("Run `ls` first.\n").unwrap();
//! assert_eq!(children.len(), 3);
//! assert!(matches!(&children[1], Child::Element(el) if el.tag() == "code"));
//! ```

mod args;
mod directive;
mod element;
mod error;
mod fence;
mod lexer;

pub use element::{Attributes, Child, Element};
pub use error::LexError;
pub use lexer::lex;
