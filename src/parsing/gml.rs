//! Parser for scaffold graphs in GML.
//!
//! Only the parts of GML used by scaffolders such as MetaCarvel
//! (`oriented.gml`) are interpreted:
//!
//! ```text
//! graph [
//!   directed 1
//!   node [ id 0 label "NODE_1" orientation "FOW" ]
//!   node [ id 1 label "NODE_2" orientation "REV" ]
//!   edge [ source 0 target 1 orientation "EE" bsize 12 ]
//! ]
//! ```
//!
//! Nodes are named by their `label` (their `id` when unlabeled). A link takes
//! its `orientation` attribute when present, otherwise the orientation implied
//! by the `orientation` attributes of its nodes, otherwise `EB`. All other
//! attributes are ignored.

use std::collections::HashMap;
use std::path::Path;

use crate::core::contig::{LinkOrientation, Strand};
use crate::core::graph::ScaffoldGraph;
use crate::parsing::ParseError;

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Scalar(String),
    List(Vec<(String, Value)>),
}

impl Value {
    fn scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::List(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    Word(String),
}

/// Parse a GML file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` if the content is not a usable graph.
pub fn parse_gml_file(path: &Path) -> Result<ScaffoldGraph, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_gml_text(&content)
}

/// Parse GML text
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the text is not well formed, has no
/// `graph` block, or has edges pointing at undeclared nodes.
pub fn parse_gml_text(text: &str) -> Result<ScaffoldGraph, ParseError> {
    let tokens = tokenize(text)?;
    let mut pos = 0;
    let top = parse_list(&tokens, &mut pos, false)?;

    let graph_entries = top
        .into_iter()
        .find_map(|(key, value)| match value {
            Value::List(entries) if key == "graph" => Some(entries),
            _ => None,
        })
        .ok_or_else(|| ParseError::InvalidFormat("No graph block found".to_string()))?;

    let mut graph = ScaffoldGraph::new();
    let mut names: HashMap<String, (String, Option<Strand>)> = HashMap::new();

    for (key, value) in &graph_entries {
        if key != "node" {
            continue;
        }
        let Value::List(attrs) = value else {
            return Err(ParseError::InvalidFormat("node must be a list".to_string()));
        };
        let id = attr(attrs, "id")
            .ok_or_else(|| ParseError::InvalidFormat("node without id".to_string()))?;
        let label = attr(attrs, "label").unwrap_or(id);
        let strand = attr(attrs, "orientation").and_then(Strand::parse);

        graph.add_contig(label);
        names.insert(id.to_string(), (label.to_string(), strand));
    }

    for (key, value) in &graph_entries {
        if key != "edge" {
            continue;
        }
        let Value::List(attrs) = value else {
            return Err(ParseError::InvalidFormat("edge must be a list".to_string()));
        };
        let (source, source_strand) = endpoint(attrs, &names, "source")?;
        let (target, target_strand) = endpoint(attrs, &names, "target")?;

        let orientation = match attr(attrs, "orientation") {
            Some(raw) => LinkOrientation::parse(raw).ok_or_else(|| {
                ParseError::InvalidFormat(format!("Invalid link orientation '{raw}'"))
            })?,
            None => LinkOrientation::from_strands(
                source_strand.unwrap_or_default(),
                target_strand.unwrap_or_default(),
            ),
        };
        graph.add_link(source, target, orientation);
    }

    Ok(graph)
}

/// Contig id and strand of the node an edge attribute points at
fn endpoint<'a>(
    attrs: &[(String, Value)],
    names: &'a HashMap<String, (String, Option<Strand>)>,
    name: &str,
) -> Result<&'a (String, Option<Strand>), ParseError> {
    let id = attr(attrs, name)
        .ok_or_else(|| ParseError::InvalidFormat(format!("edge without {name}")))?;
    names.get(id).ok_or_else(|| {
        ParseError::InvalidFormat(format!("edge {name} '{id}' is not a declared node"))
    })
}

fn attr<'a>(attrs: &'a [(String, Value)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .and_then(|(_, v)| v.scalar())
}

fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '[' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ']' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '"' => {
                chars.next();
                let mut word = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '"' {
                        closed = true;
                        break;
                    }
                    word.push(c);
                }
                if !closed {
                    return Err(ParseError::InvalidFormat(
                        "Unterminated string in GML".to_string(),
                    ));
                }
                tokens.push(Token::Word(word));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '[' || c == ']' || c == '"' {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }

    Ok(tokens)
}

/// Parse `key value` pairs until a closing bracket (`nested`) or the end
fn parse_list(
    tokens: &[Token],
    pos: &mut usize,
    nested: bool,
) -> Result<Vec<(String, Value)>, ParseError> {
    let mut entries = Vec::new();

    loop {
        let key = match tokens.get(*pos) {
            None if nested => {
                return Err(ParseError::InvalidFormat("Unclosed '[' in GML".to_string()));
            }
            None => return Ok(entries),
            Some(Token::Close) if nested => {
                *pos += 1;
                return Ok(entries);
            }
            Some(Token::Close) => {
                return Err(ParseError::InvalidFormat("Unexpected ']' in GML".to_string()));
            }
            Some(Token::Open) => {
                return Err(ParseError::InvalidFormat("Unexpected '[' in GML".to_string()));
            }
            Some(Token::Word(key)) => key.clone(),
        };
        *pos += 1;

        let value = match tokens.get(*pos) {
            Some(Token::Open) => {
                *pos += 1;
                Value::List(parse_list(tokens, pos, true)?)
            }
            Some(Token::Word(w)) => {
                *pos += 1;
                Value::Scalar(w.clone())
            }
            _ => {
                return Err(ParseError::InvalidFormat(format!(
                    "Missing value for GML key '{key}'"
                )));
            }
        };
        entries.push((key, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIENTED: &str = r#"
graph [
  directed 1
  # scaffolder output
  node [ id 0 label "NODE_1" orientation "FOW" ]
  node [
    id 1
    label "NODE_2"
    orientation "REV"
  ]
  node [ id 2 label "NODE_3" orientation "FOW" ]
  edge [ source 0 target 1 orientation "EE" bsize 4 mean 120.5 ]
  edge [ source 1 target 2 ]
]
"#;

    #[test]
    fn test_parse_oriented_graph() {
        let graph = parse_gml_text(ORIENTED).unwrap();
        assert_eq!(
            graph.contig_ids().collect::<Vec<_>>(),
            vec!["NODE_1", "NODE_2", "NODE_3"]
        );
        let links: Vec<_> = graph
            .links()
            .map(|(s, t, o)| (graph.contig_id(s), graph.contig_id(t), o))
            .collect();
        assert_eq!(
            links,
            vec![
                ("NODE_1", "NODE_2", LinkOrientation::EE),
                // Derived from node orientations REV -> FOW
                ("NODE_2", "NODE_3", LinkOrientation::BB),
            ]
        );
    }

    #[test]
    fn test_unlabeled_nodes_use_id() {
        let graph = parse_gml_text("graph [ node [ id 7 ] node [ id 8 ] edge [ source 7 target 8 ] ]")
            .unwrap();
        assert!(graph.contains("7"));
        assert_eq!(graph.links().next().map(|(_, _, o)| o), Some(LinkOrientation::EB));
    }

    #[test]
    fn test_edge_to_unknown_node() {
        let err = parse_gml_text("graph [ node [ id 0 ] edge [ source 0 target 9 ] ]").unwrap_err();
        assert!(err.to_string().contains("not a declared node"));
    }

    #[test]
    fn test_malformed_gml() {
        assert!(parse_gml_text("graph [ node [ id 0 ]").is_err());
        assert!(parse_gml_text("graph [ ] ]").is_err());
        assert!(parse_gml_text("graph [ node [ label \"x ] ]").is_err());
        assert!(parse_gml_text("creator \"nobody\"").is_err());
    }

    #[test]
    fn test_invalid_orientation() {
        let text = "graph [ node [ id 0 ] node [ id 1 ] edge [ source 0 target 1 orientation \"QQ\" ] ]";
        assert!(parse_gml_text(text).is_err());
    }
}
