//! Variable binding for pypx
//!
//! Resolves `{name}` / `{name=default}` placeholders in text and attribute
//! values against the active scope chain, innermost first. A missing name
//! with no default marker is always fatal, to surface template authoring
//! mistakes instead of silently emitting blank content. Substitution is a
//! single pass per occurrence; substituted text is never re-expanded.
//!
//! Resolved import subtrees are bound here with a child scope seeded from
//! their directive arguments, then spliced in place of the reference.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::pypx::ast::{CompileError, CompileResult, Node, SourceLocation};
use crate::pypx::resolve::scope::Scope;

/// `{name}` or `{name=default}`; `{name=}` is an explicit empty default.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)(?:=([^}]*))?\}").unwrap());

/// Names owned by the layout wrapper; the page-level binder skips them.
pub const RESERVED_LAYOUT_VARS: &[&str] = &["children", "headcontent"];

/// Which reserved-name policy a binding pass runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// Page content: reserved layout names stay untouched.
    Page,
    /// Layout content: reserved names resolve like any other variable.
    Layout,
}

/// Bind every placeholder in the forest, splicing resolved imports.
pub fn bind(
    nodes: &mut Vec<Node>,
    scope: &Scope<'_>,
    mode: BindMode,
    origin: &str,
) -> CompileResult<()> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for mut node in nodes.drain(..) {
        match &mut node {
            Node::Element {
                attributes,
                children,
                line,
                ..
            } => {
                let line = *line;
                for value in attributes.values_mut() {
                    *value = substitute(value, scope, mode, origin, line)?;
                }
                bind(children, scope, mode, origin)?;
            }
            Node::VoidElement {
                attributes, line, ..
            } => {
                let line = *line;
                for value in attributes.values_mut() {
                    *value = substitute(value, scope, mode, origin, line)?;
                }
            }
            Node::Text { content, line } | Node::Raw { content, line } => {
                *content = substitute(content, scope, mode, origin, *line)?;
            }
            Node::ImportRef {
                target,
                args,
                resolved,
                ..
            } => {
                let mut subtree = resolved.take().ok_or_else(|| CompileError::Internal {
                    message: format!("import '{}' reached the binder unresolved", target),
                })?;
                let child = scope.child(args.clone());
                bind(&mut subtree, &child, mode, origin)?;
                // The reference now behaves as its resolved subtree.
                out.extend(subtree);
                continue;
            }
            Node::AssetRef { .. } | Node::LayoutSlot { .. } => {}
        }
        out.push(node);
    }
    *nodes = out;
    Ok(())
}

/// Substitute placeholders in one string, left to right, single pass.
pub fn substitute(
    text: &str,
    scope: &Scope<'_>,
    mode: BindMode,
    origin: &str,
    line: usize,
) -> CompileResult<String> {
    if !text.contains('{') {
        return Ok(text.to_string());
    }

    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut last = 0usize;

    for caps in PLACEHOLDER.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        // A doubled brace belongs to the downstream template-logic
        // evaluator, not to us.
        let doubled_open = whole.start() > 0 && bytes[whole.start() - 1] == b'{';
        let doubled_close = whole.end() < bytes.len() && bytes[whole.end()] == b'}';
        if doubled_open || doubled_close {
            continue;
        }

        let name = caps.get(1).unwrap().as_str();
        if mode == BindMode::Page && RESERVED_LAYOUT_VARS.contains(&name) {
            continue;
        }

        let replacement = match scope.lookup(name) {
            Some(value) => value.to_string(),
            None => match caps.get(2) {
                Some(default) => default.as_str().to_string(),
                None => {
                    return Err(CompileError::Name {
                        variable: name.to_string(),
                        location: SourceLocation::new(origin, line),
                    })
                }
            },
        };

        out.push_str(&text[last..whole.start()]);
        out.push_str(&replacement);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pypx::resolve::scope::Vars;

    fn scope(pairs: &[(&str, &str)]) -> Scope<'static> {
        Scope::root(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vars>(),
        )
    }

    fn subst(text: &str, s: &Scope<'_>) -> CompileResult<String> {
        substitute(text, s, BindMode::Page, "t.pypx", 1)
    }

    #[test]
    fn test_bound_variable() {
        let s = scope(&[("name", "Ann")]);
        assert_eq!(subst("Hello, {name}!", &s).unwrap(), "Hello, Ann!");
    }

    #[test]
    fn test_default_used_when_unbound() {
        let s = scope(&[]);
        assert_eq!(subst("Hello, {name=Guest}!", &s).unwrap(), "Hello, Guest!");
    }

    #[test]
    fn test_binding_beats_default() {
        let s = scope(&[("name", "Ann")]);
        assert_eq!(subst("Hello, {name=Guest}!", &s).unwrap(), "Hello, Ann!");
    }

    #[test]
    fn test_empty_default_yields_empty() {
        let s = scope(&[]);
        assert_eq!(subst("[{x=}]", &s).unwrap(), "[]");
    }

    #[test]
    fn test_missing_without_default_is_fatal() {
        let s = scope(&[]);
        let err = subst("{missing}", &s).unwrap_err();
        match err {
            CompileError::Name { variable, location } => {
                assert_eq!(variable, "missing");
                assert_eq!(location.line, 1);
            }
            other => panic!("expected name error, got {:?}", other),
        }
    }

    #[test]
    fn test_no_recursive_expansion() {
        let s = scope(&[("a", "{b}"), ("b", "X")]);
        // The substituted text is not rescanned.
        assert_eq!(subst("{a}", &s).unwrap(), "{b}");
    }

    #[test]
    fn test_reserved_names_skipped_in_page_mode() {
        let s = scope(&[]);
        assert_eq!(subst("{children}", &s).unwrap(), "{children}");
        assert_eq!(subst("{headcontent}", &s).unwrap(), "{headcontent}");
    }

    #[test]
    fn test_reserved_names_bound_in_layout_mode() {
        let s = scope(&[("headcontent", "<meta>")]);
        let out = substitute("{headcontent}", &s, BindMode::Layout, "t.pypx", 1).unwrap();
        assert_eq!(out, "<meta>");
    }

    #[test]
    fn test_template_logic_syntax_untouched() {
        let s = scope(&[("x", "V")]);
        assert_eq!(subst("{% if x %}{x}{% endif %}", &s).unwrap(), "{% if x %}V{% endif %}");
        assert_eq!(subst("{{x}}", &s).unwrap(), "{{x}}");
        assert_eq!(subst("{{ x }}", &s).unwrap(), "{{ x }}");
    }

    #[test]
    fn test_multiple_placeholders_one_string() {
        let s = scope(&[("a", "1"), ("b", "2")]);
        assert_eq!(subst("{a}+{b}={c=3}", &s).unwrap(), "1+2=3");
    }

    #[test]
    fn test_non_identifier_braces_left_alone() {
        let s = scope(&[]);
        assert_eq!(subst("{ not a var }", &s).unwrap(), "{ not a var }");
        assert_eq!(subst("{1abc}", &s).unwrap(), "{1abc}");
    }

    #[test]
    fn test_bind_splices_resolved_import() {
        let mut nodes = vec![Node::ImportRef {
            target: "card".to_string(),
            args: [("title".to_string(), "Hi".to_string())]
                .into_iter()
                .collect(),
            resolved: Some(vec![Node::Text {
                content: "{title}".to_string(),
                line: 1,
            }]),
            line: 1,
        }];
        let s = scope(&[]);
        bind(&mut nodes, &s, BindMode::Page, "t.pypx").unwrap();
        assert_eq!(
            nodes,
            vec![Node::Text {
                content: "Hi".to_string(),
                line: 1
            }]
        );
    }

    #[test]
    fn test_import_scope_falls_back_to_parent() {
        let mut nodes = vec![Node::ImportRef {
            target: "card".to_string(),
            args: Vars::new(),
            resolved: Some(vec![Node::Text {
                content: "{site}".to_string(),
                line: 1,
            }]),
            line: 1,
        }];
        let s = scope(&[("site", "example.org")]);
        bind(&mut nodes, &s, BindMode::Page, "t.pypx").unwrap();
        assert_eq!(
            nodes,
            vec![Node::Text {
                content: "example.org".to_string(),
                line: 1
            }]
        );
    }

    #[test]
    fn test_unresolved_import_is_internal_error() {
        let mut nodes = vec![Node::ImportRef {
            target: "card".to_string(),
            args: Vars::new(),
            resolved: None,
            line: 1,
        }];
        let s = scope(&[]);
        let err = bind(&mut nodes, &s, BindMode::Page, "t.pypx").unwrap_err();
        assert!(matches!(err, CompileError::Internal { .. }));
    }
}
