//! Marker tokens for pypx line content
//!
//! The structural shape of a pypx document comes from indentation, which the
//! normalizer computes by hand. Within a line, the delimiters that matter to
//! later stages are tokenized with logos.

use logos::Logos;
use serde::Serialize;

/// Delimiter markers recognized inside a single line of pypx.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Marker {
    /// Exclusive comment delimiter, removed entirely.
    #[token("::")]
    Exclusive,

    /// Inclusive comment / asset directive delimiter.
    #[token("?:")]
    Inclusive,

    /// Escape marker; protects the following 1-2 characters.
    #[token("\\")]
    Escape,

    /// Attribute span delimiter.
    #[token(";")]
    AttrDelim,

    #[token("[")]
    ImportOpen,

    #[token("]")]
    ImportClose,

    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    /// Literal tag marker; a line starting with it is raw HTML.
    #[token("<")]
    TagOpen,

    /// Run of characters with no special meaning.
    #[regex(r"[^:?\\;\[\]{}<]+")]
    Text,

    // Lone halves of the two-character delimiters.
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
}

/// Tokenize one line of content, keeping byte spans.
pub fn lex_line(text: &str) -> Vec<(Marker, std::ops::Range<usize>)> {
    let mut lexer = Marker::lexer(text);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        if let Ok(token) = result {
            tokens.push((token, lexer.span()));
        }
    }
    tokens
}
