//! # pypx
//!
//! A compiler for the pypx format: an indentation-based markup language
//! that transpiles to HTML, with component imports, variable interpolation,
//! layout wrapping, attribute injection, comments, and asset inclusion.
//!
//! ```text
//! html
//!     body
//!         h1
//!             Hello World
//! ```
//!
//! compiles to `<html><body><h1>Hello World</h1></body></html>`.

pub mod pypx;
