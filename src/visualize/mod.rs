//! Visualizing a parse tree as directed graph.
//!
//! Every tree node becomes exactly one graph node labeled with its symbol name. Terminal
//! children do not get nodes of their own, instead their parent is drawn as a square. An
//! empty derivation gets a fresh epsilon node as its only child so it can be told apart from
//! a node whose children were simply never recorded.

use tracing::{debug, trace};

use crate::config::{Traversal, VizConfig};
use crate::error::VizError;
use crate::frontend::tree::{Child, ParseTree, SymbolNamer};

use graph::{Edge, Graph, GraphSink, Label, Node, Shape};
use ids::IdGenerator;

pub mod graph;
pub mod ids;
pub mod render;

/// HTML label of the epsilon placeholder.
pub const EPSILON_LABEL: &str = "&epsilon;";

/// Creates a new epsilon placeholder. Its name comes from the same session as every other node.
pub fn make_epsilon(ids: &mut IdGenerator) -> Node {
    Node::new(ids.next(), Label::Html(EPSILON_LABEL.to_string()), Shape::Square)
}

pub struct Visualizer {
    /// Session used for giving each node a unique name.
    ids: IdGenerator,
    traversal: Traversal,
}

/// Pending work of the explicit stack traversal.
struct Frame<'t> {
    tree: &'t ParseTree,
    node: Node,
    /// Index of the first child that was not visited yet.
    next: usize,
}

impl Visualizer {
    pub fn new(traversal: Traversal) -> Self {
        Self {
            ids: IdGenerator::new(),
            traversal,
        }
    }

    /// Walks `tree` depth first and inserts its nodes and edges into `sink`. Returns the node
    /// created for the root of `tree`.
    ///
    /// Nodes are inserted in pre-order. The edge to a child is inserted once the child's
    /// whole subtree is in the sink, so edges follow the left to right order of the children.
    pub fn visit<S, N>(&mut self, tree: &ParseTree, sink: &mut S, namer: &N) -> Result<Node, VizError>
    where
        S: GraphSink + ?Sized,
        N: SymbolNamer + ?Sized,
    {
        match self.traversal {
            Traversal::Recursive => self.visit_recursive(tree, sink, namer),
            Traversal::WorkStack => self.visit_work_stack(tree, sink, namer),
        }
    }

    fn visit_recursive<S, N>(&mut self, tree: &ParseTree, sink: &mut S, namer: &N) -> Result<Node, VizError>
    where
        S: GraphSink + ?Sized,
        N: SymbolNamer + ?Sized,
    {
        let node = self.open(tree, sink, namer)?;
        for child in tree.children.iter() {
            if let Child::Node(subtree) = child {
                let child_node = self.visit_recursive(subtree, sink, namer)?;
                sink.add_edge(Edge::new(node.id, child_node.id))?;
            }
        }
        self.close(&node, tree, sink)?;
        Ok(node)
    }

    fn visit_work_stack<S, N>(&mut self, tree: &ParseTree, sink: &mut S, namer: &N) -> Result<Node, VizError>
    where
        S: GraphSink + ?Sized,
        N: SymbolNamer + ?Sized,
    {
        let root = self.open(tree, sink, namer)?;
        let mut stack = vec![Frame {
            tree,
            node: root.clone(),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let current = frame.tree;
            let pending = current
                .children
                .iter()
                .enumerate()
                .skip(frame.next)
                .find_map(|(i, child)| match child {
                    Child::Node(subtree) => Some((i, subtree)),
                    Child::Terminal(_) => None,
                });

            match pending {
                Some((i, subtree)) => {
                    frame.next = i + 1;
                    let node = self.open(subtree, sink, namer)?;
                    stack.push(Frame {
                        tree: subtree,
                        node,
                        next: 0,
                    });
                }
                None => {
                    if let Some(done) = stack.pop() {
                        self.close(&done.node, done.tree, sink)?;
                        if let Some(parent) = stack.last() {
                            sink.add_edge(Edge::new(parent.node.id, done.node.id))?;
                        }
                    }
                }
            }
        }
        Ok(root)
    }

    /// Creates and inserts the node for `tree` itself.
    fn open<S, N>(&mut self, tree: &ParseTree, sink: &mut S, namer: &N) -> Result<Node, VizError>
    where
        S: GraphSink + ?Sized,
        N: SymbolNamer + ?Sized,
    {
        let name = namer
            .symbol_name(tree.symbol)
            .filter(|name| !name.is_empty())
            .ok_or(VizError::UnknownSymbol(tree.symbol))?;
        let shape = if tree.children.iter().any(Child::is_terminal) {
            Shape::Square
        } else {
            Shape::Default
        };
        let node = Node::new(self.ids.next(), Label::Text(name.to_string()), shape);
        trace!("node {} for symbol {} ({})", node.id, tree.symbol, name);
        sink.add_node(node.clone())?;
        Ok(node)
    }

    /// Attaches the epsilon placeholder once all children of an empty derivation are done.
    fn close<S>(&mut self, node: &Node, tree: &ParseTree, sink: &mut S) -> Result<(), VizError>
    where
        S: GraphSink + ?Sized,
    {
        if tree.children.is_empty() {
            let epsilon = make_epsilon(&mut self.ids);
            let edge = Edge::new(node.id, epsilon.id);
            sink.add_node(epsilon)?;
            sink.add_edge(edge)?;
        }
        Ok(())
    }
}

/// Runs one fresh visualization session of `tree` into a new graph.
pub fn visualize<N>(tree: &ParseTree, namer: &N, config: &VizConfig) -> Result<Graph, VizError>
where
    N: SymbolNamer + ?Sized,
{
    let mut graph = Graph::new(&config.graph_name);
    if let Some(limit) = config.max_nodes {
        graph = graph.with_max_nodes(limit);
    }
    let mut visualizer = Visualizer::new(config.traversal);
    visualizer.visit(tree, &mut graph, namer)?;
    debug!(
        "visualized parse tree: {} nodes, {} edges",
        graph.nodes().len(),
        graph.edges().len()
    );
    Ok(graph)
}
