//! Minimal runtime template language for view templates.
//!
//! | Syntax                              | Meaning                                   |
//! |-------------------------------------|-------------------------------------------|
//! | `{{ page.title }}`                  | HTML-escaped value, missing -> empty      |
//! | `{{#if key}} .. {{else}} .. {{/if}}` | Branch on truthiness                      |
//! | `{{#each key}} .. {{/each}}`         | Repeat for each array entry as `item`     |
//! | `{{skip}}`                          | Abort the page (skip-page signal)         |

use super::{DispatchError, JsonMap};
use crate::utils::html::escape;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(String),
    If {
        key: String,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    Each {
        key: String,
        body: Vec<Node>,
    },
    Skip,
}

/// An open `#if` / `#each` block while parsing.
struct Open {
    directive: &'static str,
    key: String,
    /// Nodes of the enclosing block.
    parent: Vec<Node>,
    /// Nodes collected before `{{else}}`.
    then: Option<Vec<Node>>,
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template source. Errors carry a human-readable message.
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut open: Vec<Open> = Vec::new();
        let mut current: Vec<Node> = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                current.push(Node::Text(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or_else(|| "unclosed `{{`".to_string())?;
            let tag = after[..end].trim();
            rest = &after[end + 2..];

            if let Some(key) = tag.strip_prefix("#if ") {
                open.push(Open {
                    directive: "if",
                    key: key.trim().to_string(),
                    parent: std::mem::take(&mut current),
                    then: None,
                });
            } else if let Some(key) = tag.strip_prefix("#each ") {
                open.push(Open {
                    directive: "each",
                    key: key.trim().to_string(),
                    parent: std::mem::take(&mut current),
                    then: None,
                });
            } else if tag == "else" {
                match open.last_mut() {
                    Some(block) if block.directive == "if" && block.then.is_none() => {
                        block.then = Some(std::mem::take(&mut current));
                    }
                    _ => return Err("`{{else}}` outside of `{{#if}}`".to_string()),
                }
            } else if tag == "/if" || tag == "/each" {
                let block = open
                    .pop()
                    .filter(|block| block.directive == &tag[1..])
                    .ok_or_else(|| format!("unexpected `{{{{{tag}}}}}`"))?;
                let inner = std::mem::replace(&mut current, block.parent);
                let node = match (block.directive, block.then) {
                    ("if", Some(then)) => Node::If {
                        key: block.key,
                        then,
                        otherwise: inner,
                    },
                    ("if", None) => Node::If {
                        key: block.key,
                        then: inner,
                        otherwise: Vec::new(),
                    },
                    _ => Node::Each {
                        key: block.key,
                        body: inner,
                    },
                };
                current.push(node);
            } else if tag == "skip" {
                current.push(Node::Skip);
            } else if tag.is_empty() || tag.starts_with(['#', '/']) {
                return Err(format!("unknown directive `{{{{{tag}}}}}`"));
            } else {
                current.push(Node::Var(tag.to_string()));
            }
        }

        if let Some(block) = open.pop() {
            return Err(format!(
                "`{{{{#{} {}}}}}` is never closed",
                block.directive, block.key
            ));
        }
        if !rest.is_empty() {
            current.push(Node::Text(rest.to_string()));
        }

        Ok(Self { nodes: current })
    }

    /// Render against an argument bundle.
    ///
    /// Fails only with [`DispatchError::SkipPage`].
    pub fn render(&self, args: &JsonMap) -> Result<String, DispatchError> {
        let mut out = String::new();
        render_nodes(&self.nodes, &Scope { args, item: None }, &mut out)?;
        Ok(out)
    }
}

/// Lookup scope: the argument bundle plus the innermost `#each` item.
struct Scope<'a> {
    args: &'a JsonMap,
    item: Option<&'a Value>,
}

impl<'a> Scope<'a> {
    fn lookup(&self, key: &str) -> Option<&'a Value> {
        let mut parts = key.split('.');
        let first = parts.next()?;
        let mut value = match (first, self.item) {
            ("item", Some(item)) => item,
            _ => self.args.get(first)?,
        };
        for part in parts {
            value = match value {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(value)
    }
}

fn render_nodes(nodes: &[Node], scope: &Scope<'_>, out: &mut String) -> Result<(), DispatchError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(key) => {
                if let Some(value) = scope.lookup(key) {
                    out.push_str(&escape(&display_value(value)));
                }
            }
            Node::If {
                key,
                then,
                otherwise,
            } => {
                let branch = if scope.lookup(key).is_some_and(is_truthy) {
                    then
                } else {
                    otherwise
                };
                render_nodes(branch, scope, out)?;
            }
            Node::Each { key, body } => {
                if let Some(Value::Array(items)) = scope.lookup(key) {
                    for item in items {
                        let inner = Scope {
                            args: scope.args,
                            item: Some(item),
                        };
                        render_nodes(body, &inner, out)?;
                    }
                }
            }
            Node::Skip => return Err(DispatchError::SkipPage),
        }
    }
    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
