//! Asset directive resolution for pypx
//!
//! `?:body?:` spans resolve to an embedded copy of the referenced file, a
//! static URL, or a plain HTML comment. A body that names an existing file
//! under the asset search directories is an asset inclusion; anything else
//! is an inclusive comment. Inferring intent from the filesystem is
//! documented behavior and preserved as-is.
//!
//! Link-mode asset references produced by the import resolver are lowered
//! to markup here, so the serializer never sees them.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::pypx::ast::{CompileError, CompileResult, Node};
use crate::pypx::config::Config;
use crate::pypx::lexer::escape::restore;
use crate::pypx::resolve::imports::STATIC_URL_PREFIX;

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?:(.*?)\?:").unwrap());

/// Resolve every asset directive and reference in the forest.
pub fn resolve(nodes: &mut [Node], config: &Config) -> CompileResult<()> {
    for node in nodes.iter_mut() {
        match node {
            Node::Element {
                attributes,
                children,
                ..
            } => {
                for value in attributes.values_mut() {
                    if value.contains("?:") {
                        *value = resolve_directives(value, config, true)?;
                    }
                }
                resolve(children, config)?;
            }
            Node::VoidElement { attributes, .. } => {
                for value in attributes.values_mut() {
                    if value.contains("?:") {
                        *value = resolve_directives(value, config, true)?;
                    }
                }
            }
            Node::Text { content, .. } | Node::Raw { content, .. } => {
                if content.contains("?:") {
                    *content = resolve_directives(content, config, false)?;
                }
            }
            Node::AssetRef { path, url, line, .. } => {
                *node = Node::Raw {
                    content: reference_markup(path, url),
                    line: *line,
                };
            }
            _ => {}
        }
    }
    Ok(())
}

/// Replace `?:body?:` spans within one string. Inside attribute values a
/// resolved asset always becomes a URL, and free text stays untouched (an
/// HTML comment cannot live inside an attribute).
fn resolve_directives(text: &str, config: &Config, in_attribute: bool) -> CompileResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0usize;
    for caps in DIRECTIVE.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let body = caps.get(1).unwrap().as_str().trim();
        out.push_str(&text[last..whole.start()]);
        out.push_str(&resolve_one(body, whole.as_str(), config, in_attribute)?);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

fn resolve_one(
    body: &str,
    span: &str,
    config: &Config,
    in_attribute: bool,
) -> CompileResult<String> {
    let relative = body.trim_start_matches("./");
    match locate(relative, config) {
        Some(path) => {
            if config.inline_imports && !in_attribute {
                log::debug!("embedding asset {}", path.display());
                std::fs::read_to_string(&path).map_err(|e| CompileError::Io {
                    path,
                    message: e.to_string(),
                })
            } else {
                Ok(format!(
                    "{}/{}",
                    STATIC_URL_PREFIX,
                    relative.replace('\\', "/")
                ))
            }
        }
        None if in_attribute => Ok(span.to_string()),
        // Free text between the delimiters is an inclusive comment.
        None => Ok(format!("<!-- {} -->", restore(body))),
    }
}

/// Probe the asset search directories. The resolved file must stay inside
/// the directory it was found under; traversal outside is treated as
/// not-found.
fn locate(relative: &str, config: &Config) -> Option<PathBuf> {
    if relative.is_empty() {
        return None;
    }
    for root in [&config.assets_root, &config.components_root] {
        let candidate = root.join(relative);
        if !candidate.is_file() {
            continue;
        }
        let canonical = candidate.canonicalize().ok()?;
        let root_canonical = root.canonicalize().ok()?;
        if canonical.starts_with(&root_canonical) {
            return Some(candidate);
        }
        log::warn!(
            "asset '{}' resolves outside {}, refused",
            relative,
            root.display()
        );
    }
    None
}

/// Markup for a link-mode asset reference.
fn reference_markup(path: &Path, url: &str) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some("css") => format!("<link rel=\"stylesheet\" href=\"{}\" />", url),
        Some("js") => format!("<script src=\"{}\"></script>", url),
        _ => url.to_string(),
    }
}
