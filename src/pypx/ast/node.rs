//! Node tree for parsed pypx documents
//!
//! A parsed file is a forest of nodes under one synthetic root. Import
//! expansion must never introduce a cycle; the resolver enforces this with
//! an explicit import stack.

use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;

/// Ordered attribute mapping. Later duplicate keys override earlier values
/// while keeping the first occurrence's position.
pub type AttrMap = IndexMap<String, String>;

/// How a referenced asset is brought into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssetMode {
    /// The file's content is inlined verbatim at the reference point.
    Embed,
    /// A reference (`link`/`script src`) is emitted instead.
    Link,
}

/// A single node in the parsed tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    /// Container with explicit open/close tags.
    Element {
        tag: String,
        attributes: AttrMap,
        children: Vec<Node>,
        line: usize,
    },
    /// Childless element, serialized self-closing.
    VoidElement {
        tag: String,
        attributes: AttrMap,
        line: usize,
    },
    /// Leaf text, emitted verbatim after variable substitution.
    Text { content: String, line: usize },
    /// Line that began with a literal tag marker; passed through unedited
    /// except for the comment/escape/variable passes.
    Raw { content: String, line: usize },
    /// Placeholder for an import directive. `resolved` is set exactly once
    /// by the import resolver; the variable binder splices the subtree in.
    ImportRef {
        target: String,
        args: AttrMap,
        resolved: Option<Vec<Node>>,
        line: usize,
    },
    /// A non-markup file brought in by reference.
    AssetRef {
        path: PathBuf,
        url: String,
        mode: AssetMode,
        line: usize,
    },
    /// Injection point for page content; appears only within layout trees.
    LayoutSlot { line: usize },
}

impl Node {
    /// Source line the node was produced from.
    pub fn line(&self) -> usize {
        match self {
            Node::Element { line, .. }
            | Node::VoidElement { line, .. }
            | Node::Text { line, .. }
            | Node::Raw { line, .. }
            | Node::ImportRef { line, .. }
            | Node::AssetRef { line, .. }
            | Node::LayoutSlot { line } => *line,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element { .. } | Node::VoidElement { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text { .. })
    }

    /// Tag name for element nodes.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Element { tag, .. } | Node::VoidElement { tag, .. } => Some(tag),
            _ => None,
        }
    }
}
