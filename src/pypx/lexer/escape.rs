//! Escape processing for pypx
//!
//! The escape marker `\` followed by 1-2 characters emits those characters
//! literally, suppressing their special meaning in later stages. Recognized
//! sequences are rewritten to private-use sentinels so the block builder and
//! variable binder never reinterpret them; the serializer restores the
//! literal characters at output time. A marker followed by anything else
//! passes through as two literal characters, without error.

use crate::pypx::lexer::lines::SourceLine;
use crate::pypx::lexer::tokens::{lex_line, Marker};

/// Base of the private-use block used for shielded characters.
const SENTINEL_BASE: u32 = 0xE000;

/// Shield a literal character so later stages skip it.
pub fn shield(c: char) -> char {
    debug_assert!((c as u32) < 0x100);
    char::from_u32(SENTINEL_BASE + c as u32).unwrap_or(c)
}

/// Restore shielded characters in final output.
pub fn restore(text: &str) -> String {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if (SENTINEL_BASE..SENTINEL_BASE + 0x100).contains(&code) {
                char::from_u32(code - SENTINEL_BASE).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Recognize the escape sequence at the head of `rest` (the text following
/// a `\` marker). Returns the number of source characters consumed and the
/// literal text they stand for, or `None` for the passthrough fallback.
pub fn recognize(rest: &str) -> Option<(usize, &'static str)> {
    if rest.starts_with("::") {
        return Some((2, "::"));
    }
    if rest.starts_with("?:") {
        return Some((2, "?:"));
    }
    match rest.chars().next()? {
        '\\' => Some((1, "\\")),
        ':' => Some((1, ":")),
        ';' => Some((1, ";")),
        '[' => Some((1, "[")),
        ']' => Some((1, "]")),
        '{' => Some((1, "{")),
        '}' => Some((1, "}")),
        '?' => Some((1, "?")),
        '<' => Some((1, "<")),
        'n' => Some((1, "\n")),
        _ => None,
    }
}

/// Resolve escape sequences in one line of content, left to right,
/// non-overlapping.
pub fn process_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut skip_until = 0usize;

    for (marker, span) in lex_line(text) {
        if span.start < skip_until {
            // Tail of a token whose head was consumed by an escape.
            if span.end > skip_until {
                out.push_str(&text[skip_until..span.end]);
            }
            continue;
        }
        match marker {
            Marker::Escape => match recognize(&text[span.end..]) {
                Some((consumed, literal)) => {
                    for c in literal.chars() {
                        out.push(shield(c));
                    }
                    skip_until = span.end + consumed;
                }
                None => out.push('\\'),
            },
            _ => out.push_str(&text[span.start..span.end]),
        }
    }
    out
}

/// Run escape resolution over the whole line stream.
pub fn process(lines: Vec<SourceLine>) -> Vec<SourceLine> {
    lines
        .into_iter()
        .map(|line| SourceLine {
            text: process_line(&line.text),
            ..line
        })
        .collect()
}
