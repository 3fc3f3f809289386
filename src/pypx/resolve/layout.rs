//! Layout wrapping for pypx
//!
//! A `_layout.pypx` file in a page's directory wraps every page in that
//! directory. The layout parses through the same front-end stages, resolves
//! its own imports, must contain exactly one `{children}` slot, and binds
//! its variables from the values the page exposes plus `headcontent`
//! (the serialized children of a top-level `head` element lifted out of
//! the page).

use std::path::Path;

use crate::pypx::ast::{CompileError, CompileResult, Node, SourceLocation};
use crate::pypx::builder;
use crate::pypx::codegen;
use crate::pypx::compiler::ParseContext;
use crate::pypx::config::LAYOUT_FILE;
use crate::pypx::lexer;
use crate::pypx::resolve::{assets, imports, scope::Scope, vars, vars::BindMode};

/// Wrap a fully resolved page forest in its directory's layout, when one
/// exists and wrapping is enabled.
pub fn wrap(
    mut page: Vec<Node>,
    page_dir: &Path,
    ctx: &mut ParseContext<'_>,
    page_scope: &Scope<'_>,
) -> CompileResult<Vec<Node>> {
    let layout_path = page_dir.join(LAYOUT_FILE);
    if !layout_path.is_file() {
        log::warn!("no layout file in {}", page_dir.display());
        return Ok(page);
    }

    let origin = layout_path.display().to_string();
    log::debug!("wrapping page in {}", origin);
    let source = std::fs::read_to_string(&layout_path).map_err(|e| CompileError::Io {
        path: layout_path.clone(),
        message: e.to_string(),
    })?;

    let lines = lexer::lex(&source, ctx.config.indent_width, &origin)?;
    let mut layout = builder::build(&lines, &origin)?;
    imports::resolve(&mut layout, ctx, &origin)?;

    let slots = mark_slots(&mut layout);
    if slots != 1 {
        return Err(CompileError::layout(
            format!("expected exactly one {{children}} slot, found {}", slots),
            SourceLocation::new(&*origin, 1),
        ));
    }

    let headcontent = lift_head(&mut page)?;
    let mut layout_vars = crate::pypx::resolve::scope::Vars::new();
    layout_vars.insert("headcontent".to_string(), headcontent);
    let layout_scope = page_scope.child(layout_vars);

    vars::bind(&mut layout, &layout_scope, BindMode::Layout, &origin)?;
    assets::resolve(&mut layout, ctx.config)?;

    splice(&mut layout, &mut Some(page));
    Ok(layout)
}

/// Convert `{children}` text nodes into layout slots, returning the count.
fn mark_slots(nodes: &mut [Node]) -> usize {
    let mut count = 0;
    for node in nodes.iter_mut() {
        match node {
            Node::Text { content, line } if content.trim() == "{children}" => {
                *node = Node::LayoutSlot { line: *line };
                count += 1;
            }
            Node::Element { children, .. } => count += mark_slots(children),
            _ => {}
        }
    }
    count
}

/// Replace the single slot with the page forest.
fn splice(nodes: &mut Vec<Node>, page: &mut Option<Vec<Node>>) {
    let mut out = Vec::with_capacity(nodes.len());
    for mut node in nodes.drain(..) {
        match &mut node {
            Node::LayoutSlot { .. } => {
                if let Some(content) = page.take() {
                    out.extend(content);
                }
                continue;
            }
            Node::Element { children, .. } => splice(children, page),
            _ => {}
        }
        out.push(node);
    }
    *nodes = out;
}

/// Remove a top-level `head` element from the page and serialize its
/// children for the layout's `headcontent` binding.
fn lift_head(page: &mut Vec<Node>) -> CompileResult<String> {
    let position = page
        .iter()
        .position(|node| node.tag().map_or(false, |t| t.eq_ignore_ascii_case("head")));
    match position {
        Some(idx) => {
            let head = page.remove(idx);
            match head {
                Node::Element { children, .. } => codegen::serialize(&children),
                Node::VoidElement { .. } => Ok(String::new()),
                _ => unreachable!("position matched an element tag"),
            }
        }
        None => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(content: &str) -> Node {
        Node::Text {
            content: content.to_string(),
            line: 1,
        }
    }

    #[test]
    fn test_mark_slots_counts_nested() {
        let mut nodes = vec![
            Node::Element {
                tag: "body".to_string(),
                attributes: Default::default(),
                children: vec![text("{children}")],
                line: 1,
            },
            text("{children}"),
        ];
        assert_eq!(mark_slots(&mut nodes), 2);
        assert!(matches!(nodes[1], Node::LayoutSlot { .. }));
    }

    #[test]
    fn test_mark_slots_ignores_other_text() {
        let mut nodes = vec![text("children"), text("{children} and more")];
        assert_eq!(mark_slots(&mut nodes), 0);
    }

    #[test]
    fn test_splice_replaces_slot() {
        let mut layout = vec![Node::Element {
            tag: "main".to_string(),
            attributes: Default::default(),
            children: vec![Node::LayoutSlot { line: 2 }],
            line: 1,
        }];
        splice(&mut layout, &mut Some(vec![text("page content")]));
        match &layout[0] {
            Node::Element { children, .. } => {
                assert_eq!(children.len(), 1);
                assert!(matches!(&children[0], Node::Text { content, .. } if content == "page content"));
            }
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_lift_head_extracts_and_serializes() {
        let mut page = vec![
            Node::Element {
                tag: "head".to_string(),
                attributes: Default::default(),
                children: vec![Node::Raw {
                    content: "<meta charset=\"utf-8\">".to_string(),
                    line: 1,
                }],
                line: 1,
            },
            text("body text"),
        ];
        let head = lift_head(&mut page).unwrap();
        assert_eq!(head, "<meta charset=\"utf-8\">");
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn test_lift_head_absent() {
        let mut page = vec![text("no head here")];
        assert_eq!(lift_head(&mut page).unwrap(), "");
        assert_eq!(page.len(), 1);
    }
}
