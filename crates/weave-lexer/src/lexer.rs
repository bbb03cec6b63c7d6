//! Line-based lexer.
//!
//! Block structure (fences and leaf directives) is found line by line; inline
//! code spans inside prose are located with pulldown-cmark so that backtick
//! runs are matched the way `CommonMark` matches them.

use pulldown_cmark::{Event, Options, Parser};

use crate::args::parse_info_string;
use crate::directive::parse_leaf_line;
use crate::fence::OpenFence;
use crate::{Child, Element, LexError};

/// Tag given to code elements.
const CODE_TAG: &str = "code";

/// Split markup text into prose and elements.
///
/// Concatenating the [`Element::source`] of every element and the content of
/// every text child, in order, reproduces `input` exactly.
///
/// # Errors
///
/// Returns [`LexError::UnterminatedFence`] if a code fence is never closed.
pub fn lex(input: &str) -> Result<Vec<Child>, LexError> {
    let mut out = Vec::new();
    let mut prose = Prose::default();
    let mut lines = input.split_inclusive('\n').zip(1..);

    while let Some((line, line_no)) = lines.next() {
        if let Some(fence) = OpenFence::detect(line) {
            prose.flush(&mut out);

            let mut source = line.to_owned();
            let mut body = String::new();
            let mut closed = false;
            for (next, _) in lines.by_ref() {
                source.push_str(next);
                if fence.is_closed_by(next) {
                    closed = true;
                    break;
                }
                body.push_str(next);
            }
            if !closed {
                return Err(LexError::UnterminatedFence { line: line_no });
            }

            tracing::trace!(line = line_no, info = %fence.info, "fenced code");
            let element = Element::new(CODE_TAG)
                .with_attrs(parse_info_string(&fence.info))
                .with_text(body)
                .with_line(line_no)
                .with_source(source);
            out.push(Child::Element(element));
            continue;
        }

        if let Some(directive) = parse_leaf_line(line) {
            prose.flush(&mut out);

            tracing::trace!(line = line_no, name = %directive.name, "leaf directive");
            let mut element = Element::new(directive.name)
                .with_attrs(directive.attrs)
                .with_line(line_no)
                .with_source(line);
            if !directive.content.is_empty() {
                element = element.with_text(directive.content);
            }
            out.push(Child::Element(element));
            continue;
        }

        prose.push(line, line_no);
    }

    prose.flush(&mut out);
    Ok(out)
}

/// Accumulated prose lines waiting to be scanned for inline code.
#[derive(Default)]
struct Prose {
    text: String,
    first_line: usize,
}

impl Prose {
    fn push(&mut self, line: &str, line_no: usize) {
        if self.text.is_empty() {
            self.first_line = line_no;
        }
        self.text.push_str(line);
    }

    /// Emit the buffered prose, splitting out inline code spans.
    fn flush(&mut self, out: &mut Vec<Child>) {
        if self.text.is_empty() {
            return;
        }

        let text = std::mem::take(&mut self.text);
        let mut cursor = 0;

        for (event, range) in Parser::new_ext(&text, Options::empty()).into_offset_iter() {
            let Event::Code(code) = event else {
                continue;
            };
            if range.start > cursor {
                out.push(Child::Text(text[cursor..range.start].to_owned()));
            }
            let line = self.first_line + text[..range.start].matches('\n').count();
            let element = Element::new(CODE_TAG)
                .with_text(code.into_string())
                .with_line(line)
                .with_source(&text[range.clone()]);
            out.push(Child::Element(element));
            cursor = range.end;
        }

        if cursor < text.len() {
            out.push(Child::Text(text[cursor..].to_owned()));
        }
    }
}
