//! Comment stripping for pypx
//!
//! Two comment forms exist. Exclusive spans (`:: ... ::`) are removed
//! entirely and may cross lines; the opening line's prefix and the closing
//! line's suffix merge into one structural line. Inclusive spans
//! (`?: ... ?:`) are kept intact for the asset directive stage, with
//! multi-line bodies merged onto their opening line. Matching is
//! non-nesting: the first closing delimiter after an opener ends the span.
//! An unterminated opener is fatal.
//!
//! The scanner is escape-aware while outside a span, so `\::` never opens a
//! comment. Inside a span the first closer wins regardless of escapes.

use crate::pypx::ast::{CompileError, CompileResult, SourceLocation};
use crate::pypx::lexer::escape::{recognize, shield};
use crate::pypx::lexer::lines::SourceLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanState {
    Normal,
    Exclusive,
    Inclusive,
}

/// Strip exclusive comments and merge multi-line inclusive spans.
pub fn strip(lines: Vec<SourceLine>, origin: &str) -> CompileResult<Vec<SourceLine>> {
    log::trace!("stripping comments in {}", origin);
    let mut out: Vec<SourceLine> = Vec::with_capacity(lines.len());
    let mut state = SpanState::Normal;
    // The line being accumulated while a span crosses physical lines.
    let mut current: Option<SourceLine> = None;
    let mut opened_at = 0usize;

    for line in lines {
        let mut acc = match current.take() {
            Some(pending) => pending,
            None => SourceLine {
                text: String::new(),
                depth: line.depth,
                line: line.line,
            },
        };
        if state == SpanState::Inclusive && !acc.text.is_empty() {
            // Preserve the interior line break of a multi-line directive.
            acc.text.push(shield('\n'));
        }

        let text = line.text;
        let mut i = 0usize;
        while i < text.len() {
            let rest = &text[i..];
            match state {
                SpanState::Normal => {
                    if rest.starts_with('\\') {
                        if let Some((consumed, _)) = recognize(&rest[1..]) {
                            acc.text.push_str(&rest[..1 + consumed]);
                            i += 1 + consumed;
                        } else {
                            acc.text.push('\\');
                            i += 1;
                        }
                    } else if rest.starts_with("::") {
                        state = SpanState::Exclusive;
                        opened_at = line.line;
                        i += 2;
                    } else if rest.starts_with("?:") {
                        state = SpanState::Inclusive;
                        opened_at = line.line;
                        acc.text.push_str("?:");
                        i += 2;
                    } else {
                        let c = rest.chars().next().unwrap();
                        acc.text.push(c);
                        i += c.len_utf8();
                    }
                }
                SpanState::Exclusive => match rest.find("::") {
                    Some(pos) => {
                        state = SpanState::Normal;
                        i += pos + 2;
                    }
                    None => i = text.len(),
                },
                SpanState::Inclusive => match rest.find("?:") {
                    Some(pos) => {
                        acc.text.push_str(&rest[..pos + 2]);
                        state = SpanState::Normal;
                        i += pos + 2;
                    }
                    None => {
                        acc.text.push_str(rest);
                        i = text.len();
                    }
                },
            }
        }

        if state == SpanState::Normal {
            // Comment removal can leave stray edge whitespace behind.
            acc.text = acc.text.trim().to_string();
            out.push(acc);
        } else {
            current = Some(acc);
        }
    }

    if state != SpanState::Normal {
        let form = if state == SpanState::Exclusive { "::" } else { "?:" };
        return Err(CompileError::structure(
            format!("unterminated '{}' comment", form),
            SourceLocation::new(origin, opened_at),
        ));
    }

    Ok(out)
}
