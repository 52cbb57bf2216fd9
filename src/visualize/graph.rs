//! Structs and functions concerned with generating graphs with Graphviz and DOT language.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt::{self, Display};

use phf::phf_set;
use thiserror::Error;

/// Unique name of a node within one visualization session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Default,
    Square,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    /// Plain text, quoted and escaped in the output.
    Text(String),
    /// Graphviz HTML-like label, written as `<...>`.
    Html(String),
}

impl Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Label::Text(text) => write!(f, "\"{}\"", escape(text)),
            Label::Html(html) => write!(f, "<{}>", html),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub label: Label,
    pub shape: Shape,
}

impl Node {
    pub fn new(id: NodeId, label: Label, shape: Shape) -> Self {
        Self { id, label, shape }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.shape {
            Shape::Default => write!(f, "{} [ label={} ];", self.id, self.label),
            Shape::Square => write!(f, "{} [ label={} shape=square ];", self.id, self.label),
        }
    }
}

/// Directed edge from a parent node to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {};", self.from, self.to)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("node {0} was already inserted")]
    DuplicateNode(NodeId),
    #[error("edge {from} -> {to} references a node that was never inserted")]
    UnknownEndpoint { from: NodeId, to: NodeId },
    #[error("graph is limited to {limit} nodes")]
    CapacityExceeded { limit: usize },
}

/// Receiver of the nodes and edges produced while walking a parse tree.
pub trait GraphSink {
    fn add_node(&mut self, node: Node) -> Result<(), SinkError>;
    fn add_edge(&mut self, edge: Edge) -> Result<(), SinkError>;
}

/// Directed graph keeping nodes and edges in insertion order.
#[derive(Debug, Clone)]
pub struct Graph {
    name: String,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    ids: HashSet<NodeId>,
    max_nodes: Option<usize>,
}

impl Graph {
    pub fn new(name: &str) -> Self {
        Graph {
            name: name.to_string(),
            nodes: Vec::new(),
            edges: Vec::new(),
            ids: HashSet::new(),
            max_nodes: None,
        }
    }

    /// Rejects every node insertion past `limit` nodes.
    pub fn with_max_nodes(mut self, limit: usize) -> Self {
        self.max_nodes = Some(limit);
        self
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn as_dot<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        write!(writer, "{}", self)
    }
}

impl GraphSink for Graph {
    fn add_node(&mut self, node: Node) -> Result<(), SinkError> {
        if let Some(limit) = self.max_nodes {
            if self.nodes.len() >= limit {
                return Err(SinkError::CapacityExceeded { limit });
            }
        }
        if !self.ids.insert(node.id) {
            return Err(SinkError::DuplicateNode(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    fn add_edge(&mut self, edge: Edge) -> Result<(), SinkError> {
        if !self.ids.contains(&edge.from) || !self.ids.contains(&edge.to) {
            return Err(SinkError::UnknownEndpoint { from: edge.from, to: edge.to });
        }
        self.edges.push(edge);
        Ok(())
    }
}

impl Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "digraph {} {{", dot_id(&self.name))?;
        for node in self.nodes.iter() {
            writeln!(f, "\t{}", node)?;
        }
        for edge in self.edges.iter() {
            writeln!(f, "\t{}", edge)?;
        }
        write!(f, "}}")
    }
}

/// DOT keywords are case insensitive and cannot be used as bare identifiers.
static DOT_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "node",
    "edge",
    "graph",
    "digraph",
    "subgraph",
    "strict"
};

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Quotes `name` unless it is a plain DOT identifier.
fn dot_id(name: &str) -> Cow<'_, str> {
    let plain = name
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain && !DOT_KEYWORDS.contains(name.to_ascii_lowercase().as_str()) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("\"{}\"", escape(name)))
    }
}
