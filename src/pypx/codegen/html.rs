//! HTML serialization for pypx trees
//!
//! Depth-first pre-order walk over a fully resolved forest. Elements get
//! explicit open and close tags, void elements self-close, text and raw
//! nodes are emitted verbatim with no separators between siblings. Double
//! quotes inside attribute values are escaped; text is intentionally not
//! escaped (raw-HTML passthrough is a feature of the format). Shielded
//! escape characters are restored last.

use crate::pypx::ast::{CompileError, CompileResult, Node};
use crate::pypx::lexer::escape::restore;

/// Serialize a resolved forest to HTML text.
pub fn serialize(nodes: &[Node]) -> CompileResult<String> {
    let mut out = String::new();
    write_nodes(nodes, &mut out)?;
    Ok(restore(&out))
}

fn write_nodes(nodes: &[Node], out: &mut String) -> CompileResult<()> {
    for node in nodes {
        write_node(node, out)?;
    }
    Ok(())
}

fn write_node(node: &Node, out: &mut String) -> CompileResult<()> {
    match node {
        Node::Element {
            tag,
            attributes,
            children,
            ..
        } => {
            out.push('<');
            out.push_str(tag);
            write_attributes(attributes, out);
            out.push('>');
            write_nodes(children, out)?;
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        Node::VoidElement { tag, attributes, .. } => {
            out.push('<');
            out.push_str(tag);
            write_attributes(attributes, out);
            out.push_str(" />");
        }
        Node::Text { content, .. } | Node::Raw { content, .. } => {
            out.push_str(content);
        }
        // None of these may survive to serialization; their presence is a
        // pipeline bug, not a user error.
        Node::ImportRef { target, line, .. } => {
            return Err(CompileError::Internal {
                message: format!("unresolved import '{}' (line {}) at serialization", target, line),
            });
        }
        Node::AssetRef { path, line, .. } => {
            return Err(CompileError::Internal {
                message: format!(
                    "unresolved asset reference '{}' (line {}) at serialization",
                    path.display(),
                    line
                ),
            });
        }
        Node::LayoutSlot { line } => {
            return Err(CompileError::Internal {
                message: format!("unfilled layout slot (line {}) at serialization", line),
            });
        }
    }
    Ok(())
}

fn write_attributes(attributes: &crate::pypx::ast::AttrMap, out: &mut String) {
    for (name, value) in attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&value.replace('"', "&quot;"));
        out.push('"');
    }
}
