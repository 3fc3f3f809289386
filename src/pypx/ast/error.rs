//! Error types for the pypx compiler
//!
//! Every content error carries the source file and line where detection
//! occurred. Nothing is retried; these are deterministic content errors.

use std::fmt;
use std::path::PathBuf;

/// A location in pypx source, used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// Display name of the originating file, when known.
    pub file: Option<String>,
    /// 1-based line number.
    pub line: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        SourceLocation {
            file: Some(file.into()),
            line,
        }
    }

    pub fn line_only(line: usize) -> Self {
        SourceLocation { file: None, line }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}", file, self.line),
            None => write!(f, "line {}", self.line),
        }
    }
}

/// Errors produced by the compilation pipeline.
#[derive(Debug, Clone)]
pub enum CompileError {
    /// Bad indentation or an unterminated comment/delimiter span.
    Structure {
        message: String,
        location: SourceLocation,
    },
    /// An import target could not be resolved.
    Import {
        target: String,
        message: String,
        location: SourceLocation,
    },
    /// An import cycle was detected. Always fatal.
    CircularImport {
        chain: Vec<PathBuf>,
        location: SourceLocation,
    },
    /// A required variable had no binding and no default. Always fatal.
    Name {
        variable: String,
        location: SourceLocation,
    },
    /// The layout file is missing its injection slot, or has several.
    Layout {
        message: String,
        location: SourceLocation,
    },
    /// Configuration could not be located or deserialized.
    Config { message: String },
    /// A file read failed.
    Io { path: PathBuf, message: String },
    /// The downstream template-logic evaluator rejected the output.
    Render { message: String },
    /// A pipeline invariant was violated. Not a user error.
    Internal { message: String },
}

impl CompileError {
    pub fn structure(message: impl Into<String>, location: SourceLocation) -> Self {
        CompileError::Structure {
            message: message.into(),
            location,
        }
    }

    pub fn import(
        target: impl Into<String>,
        message: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        CompileError::Import {
            target: target.into(),
            message: message.into(),
            location,
        }
    }

    pub fn layout(message: impl Into<String>, location: SourceLocation) -> Self {
        CompileError::Layout {
            message: message.into(),
            location,
        }
    }

    /// The location the error was detected at, when it has one.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            CompileError::Structure { location, .. }
            | CompileError::Import { location, .. }
            | CompileError::CircularImport { location, .. }
            | CompileError::Name { location, .. }
            | CompileError::Layout { location, .. } => Some(location),
            _ => None,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Structure { message, location } => {
                write!(f, "[{}] structure error: {}", location, message)
            }
            CompileError::Import {
                target,
                message,
                location,
            } => {
                write!(f, "[{}] import of '{}' failed: {}", location, target, message)
            }
            CompileError::CircularImport { chain, location } => {
                let rendered: Vec<String> = chain
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                write!(
                    f,
                    "[{}] circular import: {}",
                    location,
                    rendered.join(" -> ")
                )
            }
            CompileError::Name { variable, location } => {
                write!(
                    f,
                    "[{}] variable '{}' has not been defined and has no default",
                    location, variable
                )
            }
            CompileError::Layout { message, location } => {
                write!(f, "[{}] layout error: {}", location, message)
            }
            CompileError::Config { message } => write!(f, "configuration error: {}", message),
            CompileError::Io { path, message } => {
                write!(f, "io error for {}: {}", path.display(), message)
            }
            CompileError::Render { message } => write!(f, "render error: {}", message),
            CompileError::Internal { message } => write!(f, "internal error: {}", message),
        }
    }
}

impl std::error::Error for CompileError {}

/// Type alias for pipeline results.
pub type CompileResult<T> = Result<T, CompileError>;

/// Format source code context around an error location.
///
/// Shows up to 2 lines before the error, the error line with a >> marker,
/// and up to 2 lines after, all numbered.
pub fn format_source_context(source: &str, error_line: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    if error_line == 0 {
        return String::new();
    }
    let idx = error_line - 1;
    let start = idx.saturating_sub(2);
    let end = (idx + 3).min(lines.len());

    let mut context = String::new();
    for line_num in start..end {
        let marker = if line_num == idx { ">>" } else { "  " };
        context.push_str(&format!("{} {:3} | {}\n", marker, line_num + 1, lines[line_num]));
    }
    context
}
