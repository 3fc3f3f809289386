//! AST types for the pypx compiler

pub mod error;
pub mod node;

pub use error::{format_source_context, CompileError, CompileResult, SourceLocation};
pub use node::{AssetMode, AttrMap, Node};
