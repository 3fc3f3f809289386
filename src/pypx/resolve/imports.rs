//! Import resolution for pypx
//!
//! Depth-first expansion of every `ImportRef` in a tree. Targets are located
//! under the component search path (then the pages directory), always
//! relative to the project root, never to the importing file. Each target is
//! parsed fresh through the lexing and building stages; nested imports
//! resolve with the same import stack, which doubles as cycle detection.

use std::path::{Path, PathBuf};

use crate::pypx::ast::{AssetMode, CompileError, CompileResult, Node, SourceLocation};
use crate::pypx::builder;
use crate::pypx::compiler::ParseContext;
use crate::pypx::config::COMPONENT_EXTENSION;
use crate::pypx::lexer;

/// Bound on non-cyclic import chains, so pathological depth becomes an
/// error instead of unbounded stack growth.
const MAX_IMPORT_DEPTH: usize = 64;

/// URL prefix used when assets are referenced instead of embedded.
pub const STATIC_URL_PREFIX: &str = "/__static";

/// Resolve every import reference in the forest, in place.
pub fn resolve(nodes: &mut [Node], ctx: &mut ParseContext<'_>, origin: &str) -> CompileResult<()> {
    for node in nodes.iter_mut() {
        match node {
            Node::Element { children, .. } => resolve(children, ctx, origin)?,
            Node::ImportRef {
                target,
                resolved,
                line,
                ..
            } => {
                if resolved.is_none() {
                    let subtree = expand(target, *line, ctx, origin)?;
                    *resolved = Some(subtree);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Expand one import target into its subtree.
fn expand(
    target: &str,
    line: usize,
    ctx: &mut ParseContext<'_>,
    origin: &str,
) -> CompileResult<Vec<Node>> {
    let location = SourceLocation::new(origin, line);
    log::debug!("resolving import '{}' from {}", target, location);

    if ctx.import_stack.len() >= MAX_IMPORT_DEPTH {
        return Err(CompileError::import(
            target,
            format!("import chain deeper than {} levels", MAX_IMPORT_DEPTH),
            location,
        ));
    }

    let file_name = with_default_extension(target);
    let path = match locate(&file_name, ctx) {
        Some(path) => path,
        None => {
            if ctx.config.strict_imports {
                return Err(CompileError::import(
                    target,
                    format!("'{}' not found under the component search path", file_name),
                    location,
                ));
            }
            log::warn!("import '{}' not found, skipped", target);
            return Ok(Vec::new());
        }
    };

    let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
    if ctx.import_stack.contains(&canonical) {
        let mut chain = ctx.import_stack.clone();
        chain.push(canonical);
        return Err(CompileError::CircularImport { chain, location });
    }

    let content = std::fs::read_to_string(&path).map_err(|e| CompileError::Io {
        path: path.clone(),
        message: e.to_string(),
    })?;

    if !is_markup(&path) {
        return Ok(vec![asset_node(&path, &file_name, content, ctx, line)]);
    }

    let target_origin = path.display().to_string();
    ctx.import_stack.push(canonical);
    let result = expand_markup(&content, &target_origin, ctx);
    ctx.import_stack.pop();
    result
}

/// Re-enter the front-end stages for an imported pypx file.
fn expand_markup(
    content: &str,
    origin: &str,
    ctx: &mut ParseContext<'_>,
) -> CompileResult<Vec<Node>> {
    let lines = lexer::lex(content, ctx.config.indent_width, origin)?;
    let mut subtree = builder::build(&lines, origin)?;
    resolve(&mut subtree, ctx, origin)?;
    Ok(subtree)
}

/// Append the default component extension to extension-less targets.
fn with_default_extension(target: &str) -> String {
    if Path::new(target).extension().is_some() {
        target.to_string()
    } else {
        format!("{}.{}", target, COMPONENT_EXTENSION)
    }
}

/// Search the component directory, then the pages directory. A target that
/// resolves outside the directory it was found under is refused.
fn locate(file_name: &str, ctx: &ParseContext<'_>) -> Option<PathBuf> {
    for root in [&ctx.config.components_root, &ctx.config.pages_root] {
        let candidate = root.join(file_name);
        if !candidate.is_file() {
            continue;
        }
        match (candidate.canonicalize(), root.canonicalize()) {
            (Ok(canonical), Ok(root_canonical)) if canonical.starts_with(&root_canonical) => {
                return Some(candidate);
            }
            _ => {
                log::warn!(
                    "import '{}' resolves outside {}, refused",
                    file_name,
                    root.display()
                );
            }
        }
    }
    None
}

fn is_markup(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext == COMPONENT_EXTENSION)
}

/// Non-markup imports are embedded verbatim or referenced, per config.
fn asset_node(
    path: &Path,
    file_name: &str,
    content: String,
    ctx: &ParseContext<'_>,
    line: usize,
) -> Node {
    if ctx.config.inline_imports {
        Node::Raw { content, line }
    } else {
        Node::AssetRef {
            path: path.to_path_buf(),
            url: format!("{}/{}", STATIC_URL_PREFIX, file_name.replace('\\', "/")),
            mode: AssetMode::Link,
            line,
        }
    }
}
