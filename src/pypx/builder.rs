//! Block builder for pypx
//!
//! Converts the normalized, comment-free line stream into a tree of nodes.
//! Nesting and closing are inferred purely from indentation: a stack holds
//! the open containers, and a line at depth d closes every container at
//! depth >= d before attaching at the level above.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::pypx::ast::{AttrMap, CompileError, CompileResult, Node, SourceLocation};
use crate::pypx::lexer::{lex_line, Marker, SourceLine};

/// A whole line forming an import directive: `[name]` or `[name || k='v']`.
static IMPORT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[\s*([A-Za-z0-9._/\- ]+?)\s*(?:\|\|(.*))?\]$").unwrap()
});

/// One `;...;` attribute span.
static ATTR_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r";([^;]*);").unwrap());

/// The content of a span: `name`, `name="v"`, `name='v'` or `name=v`.
static ATTR_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*([A-Za-z_@:][A-Za-z0-9_.:-]*)\s*(?:=\s*(?:"([^"]*)"|'([^']*)'|([^\s"']*)))?\s*$"#)
        .unwrap()
});

/// An argument in an import directive's parameter list.
static ARG_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(?:'([^']*)'|"([^"]*)"|(.*?))\s*$"#).unwrap()
});

/// An open container on the builder stack.
#[derive(Debug)]
struct OpenContainer {
    depth: usize,
    tag: String,
    attributes: AttrMap,
    children: Vec<Node>,
    line: usize,
}

impl OpenContainer {
    fn into_node(self) -> Node {
        if self.children.is_empty() && !self.attributes.is_empty() {
            Node::VoidElement {
                tag: self.tag,
                attributes: self.attributes,
                line: self.line,
            }
        } else {
            Node::Element {
                tag: self.tag,
                attributes: self.attributes,
                children: self.children,
                line: self.line,
            }
        }
    }
}

fn attach(stack: &mut Vec<OpenContainer>, roots: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(open) => open.children.push(node),
        None => roots.push(node),
    }
}

/// Build the node forest for one file.
pub fn build(lines: &[SourceLine], origin: &str) -> CompileResult<Vec<Node>> {
    log::trace!("building blocks for {}", origin);
    let lines: Vec<&SourceLine> = lines.iter().filter(|l| !l.is_blank()).collect();

    let mut roots: Vec<Node> = Vec::new();
    let mut stack: Vec<OpenContainer> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        while stack.last().map_or(false, |open| open.depth >= line.depth) {
            let finished = stack.pop().unwrap().into_node();
            attach(&mut stack, &mut roots, finished);
        }

        let first_marker = lex_line(&line.text).first().map(|(m, _)| *m);
        match first_marker {
            Some(Marker::TagOpen) => {
                attach(
                    &mut stack,
                    &mut roots,
                    Node::Raw {
                        content: line.text.clone(),
                        line: line.line,
                    },
                );
            }
            Some(Marker::AttrDelim) => {
                let owner = stack.last_mut().ok_or_else(|| {
                    CompileError::structure(
                        "attribute span without an owning element",
                        SourceLocation::new(origin, line.line),
                    )
                })?;
                parse_attribute_line(&line.text, &mut owner.attributes, origin, line.line)?;
            }
            Some(Marker::ImportOpen) if IMPORT_LINE.is_match(&line.text) => {
                let node = parse_import_line(&line.text, line.line);
                attach(&mut stack, &mut roots, node);
            }
            _ => {
                let deeper_follows = lines.get(idx + 1).map_or(false, |n| n.depth > line.depth);
                if deeper_follows {
                    let (tag, inline) = split_tag(&line.text);
                    let mut open = OpenContainer {
                        depth: line.depth,
                        tag,
                        attributes: AttrMap::new(),
                        children: Vec::new(),
                        line: line.line,
                    };
                    if let Some(text) = inline {
                        open.children.push(Node::Text {
                            content: text,
                            line: line.line,
                        });
                    }
                    stack.push(open);
                } else {
                    attach(
                        &mut stack,
                        &mut roots,
                        Node::Text {
                            content: line.text.clone(),
                            line: line.line,
                        },
                    );
                }
            }
        }
    }

    while let Some(open) = stack.pop() {
        let finished = open.into_node();
        attach(&mut stack, &mut roots, finished);
    }

    Ok(roots)
}

/// Tag name is the line's first token; the remainder becomes inline text.
fn split_tag(text: &str) -> (String, Option<String>) {
    match text.split_once(char::is_whitespace) {
        Some((tag, rest)) => {
            let rest = rest.trim_start();
            if rest.is_empty() {
                (tag.to_string(), None)
            } else {
                (tag.to_string(), Some(rest.to_string()))
            }
        }
        None => (text.to_string(), None),
    }
}

/// Parse every `;...;` span on an attribute line into the owner's map.
fn parse_attribute_line(
    text: &str,
    attributes: &mut AttrMap,
    origin: &str,
    line: usize,
) -> CompileResult<()> {
    let mut covered = 0usize;
    for caps in ATTR_SPAN.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let between = &text[covered..whole.start()];
        if !between.trim().is_empty() {
            return Err(CompileError::structure(
                format!("unexpected content '{}' between attribute spans", between.trim()),
                SourceLocation::new(origin, line),
            ));
        }
        covered = whole.end();

        let content = caps.get(1).unwrap().as_str();
        if content.trim().is_empty() {
            continue;
        }
        let pair = ATTR_PAIR.captures(content).ok_or_else(|| {
            CompileError::structure(
                format!("malformed attribute span ';{}'", content),
                SourceLocation::new(origin, line),
            )
        })?;
        let name = pair.get(1).unwrap().as_str().to_string();
        let value = pair
            .get(2)
            .or_else(|| pair.get(3))
            .or_else(|| pair.get(4))
            .map(|m| m.as_str())
            .unwrap_or("")
            .to_string();
        attributes.insert(name, value);
    }
    if !text[covered..].trim().is_empty() {
        return Err(CompileError::structure(
            format!(
                "unexpected content '{}' after attribute span",
                text[covered..].trim()
            ),
            SourceLocation::new(origin, line),
        ));
    }
    Ok(())
}

/// Parse `[name]` / `[name || k='v', ...]` into an unresolved import node.
fn parse_import_line(text: &str, line: usize) -> Node {
    let caps = IMPORT_LINE.captures(text).expect("checked by caller");
    let target = caps.get(1).unwrap().as_str().trim().to_string();
    let mut args = AttrMap::new();
    if let Some(params) = caps.get(2) {
        for piece in params.as_str().split(',') {
            if piece.trim().is_empty() {
                continue;
            }
            if let Some(pair) = ARG_PAIR.captures(piece) {
                let key = pair.get(1).unwrap().as_str().to_string();
                let value = pair
                    .get(2)
                    .or_else(|| pair.get(3))
                    .or_else(|| pair.get(4))
                    .map(|m| m.as_str())
                    .unwrap_or("")
                    .to_string();
                args.insert(key, value);
            }
        }
    }
    Node::ImportRef {
        target,
        args,
        resolved: None,
        line,
    }
}
