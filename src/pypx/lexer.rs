//! Lexing and normalization stages for pypx
//!
//! Raw source passes through three stages before tree building: line
//! normalization (indentation depth), comment stripping, and escape
//! resolution.

pub mod comments;
pub mod escape;
pub mod lines;
pub mod tokens;

pub use lines::SourceLine;
pub use tokens::{lex_line, Marker};

use crate::pypx::ast::CompileResult;

/// Run the full lexing front-end: normalize, strip comments, resolve
/// escapes. Blank lines survive; the block builder drops them.
pub fn lex(source: &str, indent_width: usize, origin: &str) -> CompileResult<Vec<SourceLine>> {
    let normalized = lines::normalize(source, indent_width, origin)?;
    let stripped = comments::strip(normalized, origin)?;
    Ok(escape::process(stripped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_front_end_chain() {
        let lines = lex(":: c ::div\n    a\\;b", 4, "t.pypx").unwrap();
        let kept: Vec<&SourceLine> = lines.iter().filter(|l| !l.is_blank()).collect();
        assert_eq!(kept[0].text, "div");
        assert_eq!(kept[1].depth, 1);
        assert!(!kept[1].text.contains(';'));
    }
}
