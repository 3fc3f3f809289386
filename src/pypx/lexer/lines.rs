//! Line normalization for pypx source
//!
//! Turns raw source text into a sequence of structural lines with explicit
//! nesting depth. Tabs expand to four spaces before measuring; the
//! indentation unit is either configured or inferred from the first
//! indented line of the file. Inconsistent indentation is fatal.

use serde::Serialize;

use crate::pypx::ast::{CompileError, CompileResult, SourceLocation};

/// One physical line of pypx source after normalization.
///
/// `text` has the indentation stripped; `line` is the 1-based source line
/// number kept for diagnostics. Blank lines survive normalization (the
/// comment stripper needs them for span tracking) and are dropped before
/// tree building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLine {
    pub text: String,
    pub depth: usize,
    pub line: usize,
}

impl SourceLine {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Normalize raw source into structural lines.
///
/// `indent_width` of 0 means "infer the unit from the first indented line".
pub fn normalize(source: &str, indent_width: usize, origin: &str) -> CompileResult<Vec<SourceLine>> {
    log::trace!("normalizing {} ({} bytes)", origin, source.len());
    let expanded = source.replace("\r\n", "\n").replace('\t', "    ");

    let mut unit = if indent_width > 0 { Some(indent_width) } else { None };
    let mut lines = Vec::new();

    for (idx, raw) in expanded.split('\n').enumerate() {
        let number = idx + 1;
        let trimmed = raw.trim_start_matches(' ');
        let spaces = raw.len() - trimmed.len();

        if trimmed.is_empty() {
            lines.push(SourceLine {
                text: String::new(),
                depth: 0,
                line: number,
            });
            continue;
        }

        let depth = if spaces == 0 {
            0
        } else {
            let unit = *unit.get_or_insert(spaces);
            if spaces % unit != 0 {
                return Err(CompileError::structure(
                    format!(
                        "inconsistent indentation: {} spaces is not a multiple of the {}-space unit",
                        spaces, unit
                    ),
                    SourceLocation::new(origin, number),
                ));
            }
            spaces / unit
        };

        lines.push(SourceLine {
            text: trimmed.trim_end().to_string(),
            depth,
            line: number,
        });
    }

    Ok(lines)
}
