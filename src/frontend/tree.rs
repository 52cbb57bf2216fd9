//! Parse tree datastructures.
//! A tree node is a grammar symbol together with its ordered children, where every child is
//! either a nested derivation or a matched terminal which is not decomposed any further.
//!
//! Parse trees can be arbitrarily deep, e.g. for right recursive grammars. Walking, encoding,
//! decoding and dropping a tree therefore never recurse over its depth.

use std::mem;

use serde::Deserialize;
use serde_json::Value;

use crate::error::VizError;

/// Index of a grammar symbol in the symbol table of the parser that produced the tree.
pub type SymbolId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    pub symbol: SymbolId,
    pub children: Vec<Child>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    /// Nonterminal derivation
    Node(ParseTree),
    /// Matched input text of a terminal
    Terminal(String),
}

impl Child {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Child::Terminal(_))
    }
}

/// Lookup of display names for the symbols appearing in a parse tree.
pub trait SymbolNamer {
    fn symbol_name(&self, symbol: SymbolId) -> Option<&str>;
}

impl<S: AsRef<str>> SymbolNamer for [S] {
    fn symbol_name(&self, symbol: SymbolId) -> Option<&str> {
        self.get(symbol).map(AsRef::as_ref)
    }
}

impl<S: AsRef<str>> SymbolNamer for Vec<S> {
    fn symbol_name(&self, symbol: SymbolId) -> Option<&str> {
        self.as_slice().symbol_name(symbol)
    }
}

impl Drop for ParseTree {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_subtrees(&mut self.children, &mut pending);
        while let Some(mut tree) = pending.pop() {
            detach_subtrees(&mut tree.children, &mut pending);
        }
    }
}

fn detach_subtrees(children: &mut Vec<Child>, pending: &mut Vec<ParseTree>) {
    for child in children.drain(..) {
        if let Child::Node(tree) = child {
            pending.push(tree);
        }
    }
}

impl ParseTree {
    pub fn new(symbol: SymbolId, children: Vec<Child>) -> Self {
        Self { symbol, children }
    }

    /// A derivation without any children, i.e. an epsilon production.
    pub fn empty(symbol: SymbolId) -> Self {
        Self::new(symbol, Vec::new())
    }

    /// All tree nodes in pre-order, starting with `self`.
    pub fn subtrees(&self) -> impl Iterator<Item = &ParseTree> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let tree = stack.pop()?;
            stack.extend(tree.children.iter().rev().filter_map(|child| match child {
                Child::Node(subtree) => Some(subtree),
                Child::Terminal(_) => None,
            }));
            Some(tree)
        })
    }

    /// Number of tree nodes (terminal markers not included).
    pub fn nonterminal_count(&self) -> usize {
        self.subtrees().count()
    }

    /// Number of tree nodes on the longest path from this node downwards.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((tree, level)) = stack.pop() {
            deepest = deepest.max(level);
            for child in tree.children.iter() {
                if let Child::Node(subtree) = child {
                    stack.push((subtree, level + 1));
                }
            }
        }
        deepest
    }

    /// Decodes the nested `[symbol, [children...]]` form emitted by the parser module.
    pub fn from_json_str(src: &str) -> Result<Self, VizError> {
        let mut json = serde_json::Deserializer::from_str(src);
        json.disable_recursion_limit();
        let value = Value::deserialize(serde_stacker::Deserializer::new(&mut json))?;
        if let Err(err) = json.end() {
            dismantle(value);
            return Err(err.into());
        }
        Self::from_json(value)
    }

    pub fn from_json(value: Value) -> Result<Self, VizError> {
        let mut stack = match PendingTree::open(value, 0) {
            Ok(root) => vec![root],
            Err((suffix, reason)) => return Err(VizError::malformed(&format!("${}", suffix), reason)),
        };

        while let Some(top) = stack.last_mut() {
            let slot = top.next_slot;
            match top.rest.next() {
                Some(Value::String(text)) => {
                    top.children.push(Child::Terminal(text));
                    top.next_slot += 1;
                }
                Some(child @ Value::Array(_)) => {
                    top.next_slot += 1;
                    match PendingTree::open(child, slot) {
                        Ok(pending) => stack.push(pending),
                        Err((suffix, reason)) => {
                            let path = format!("{}[1][{}]{}", json_path(&stack), slot, suffix);
                            return Err(VizError::malformed(&path, reason));
                        }
                    }
                }
                Some(other) => {
                    dismantle(other);
                    let path = format!("{}[1][{}]", json_path(&stack), slot);
                    return Err(VizError::malformed(&path, "child is neither a terminal nor a subtree"));
                }
                None => {
                    if let Some(mut done) = stack.pop() {
                        let tree = ParseTree::new(done.symbol, mem::take(&mut done.children));
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(Child::Node(tree)),
                            None => return Ok(tree),
                        }
                    }
                }
            }
        }
        Err(VizError::malformed("$", "empty document"))
    }

    /// Encodes the tree in the same `[symbol, [children...]]` form, without whitespace.
    pub fn to_json_string(&self) -> String {
        enum Step<'t> {
            Tree(&'t ParseTree),
            Terminal(&'t str),
            Raw(&'static str),
        }

        let mut out = String::new();
        let mut steps = vec![Step::Tree(self)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Raw(text) => out.push_str(text),
                Step::Terminal(text) => out.push_str(&Value::from(text).to_string()),
                Step::Tree(tree) => {
                    out.push_str(&format!("[{},[", tree.symbol));
                    steps.push(Step::Raw("]]"));
                    for (i, child) in tree.children.iter().enumerate().rev() {
                        steps.push(match child {
                            Child::Node(subtree) => Step::Tree(subtree),
                            Child::Terminal(text) => Step::Terminal(text),
                        });
                        if i > 0 {
                            steps.push(Step::Raw(","));
                        }
                    }
                }
            }
        }
        out
    }
}

/// A tree node whose children are still being decoded.
struct PendingTree {
    symbol: SymbolId,
    children: Vec<Child>,
    rest: std::vec::IntoIter<Value>,
    /// Position of this node in its parent's children.
    slot: usize,
    next_slot: usize,
}

impl PendingTree {
    /// Fails with the path suffix relative to `value` and the reason.
    fn open(value: Value, slot: usize) -> Result<Self, (&'static str, &'static str)> {
        let mut pair = match value {
            Value::Array(pair) if pair.len() == 2 => pair,
            Value::Array(items) => {
                items.into_iter().for_each(dismantle);
                return Err(("", "expected a [symbol, children] pair"));
            }
            other => {
                dismantle(other);
                return Err(("", "expected an array"));
            }
        };
        let children = pair.pop();
        let symbol = pair
            .pop()
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|s| SymbolId::try_from(s).ok());
        match (symbol, children) {
            (None, children) => {
                children.into_iter().for_each(dismantle);
                Err(("[0]", "symbol is not a non-negative integer"))
            }
            (Some(symbol), Some(Value::Array(children))) => Ok(Self {
                symbol,
                children: Vec::with_capacity(children.len()),
                rest: children.into_iter(),
                slot,
                next_slot: 0,
            }),
            (Some(_), children) => {
                children.into_iter().for_each(dismantle);
                Err(("[1]", "children are not an array"))
            }
        }
    }
}

impl Drop for PendingTree {
    fn drop(&mut self) {
        self.rest.by_ref().for_each(dismantle);
    }
}

/// JSON path of the innermost node on `stack`.
fn json_path(stack: &[PendingTree]) -> String {
    let mut path = "$".to_string();
    for pending in stack.iter().skip(1) {
        path.push_str(&format!("[1][{}]", pending.slot));
    }
    path
}

/// Drops a JSON value without recursing over its nesting depth.
fn dismantle(value: Value) {
    let mut stack = vec![value];
    while let Some(value) = stack.pop() {
        match value {
            Value::Array(items) => stack.extend(items),
            Value::Object(map) => stack.extend(map.into_iter().map(|(_, v)| v)),
            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_malformed(src: &str, expected_path: &str) {
        match ParseTree::from_json_str(src) {
            Err(VizError::MalformedTree { path, .. }) => assert_eq!(path, expected_path),
            other => panic!("expected malformed tree error, got {:?}", other),
        }
    }

    /// `[0, [[0, [ ... [0, []] ... ]]]]` with `levels` tree nodes.
    fn nested_json(levels: usize) -> String {
        let mut src = String::new();
        for _ in 1..levels {
            src.push_str("[0,[");
        }
        src.push_str("[0,[]]");
        for _ in 1..levels {
            src.push_str("]]");
        }
        src
    }

    #[test]
    fn test_decode_nested_tree() {
        let tree = ParseTree::from_json_str(r#"[3, [[4, [[0, ["("]], [4, []]]], "x"]]"#).unwrap();
        assert_eq!(tree.symbol, 3);
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[1], Child::Terminal("x".to_string()));
        assert_eq!(tree.nonterminal_count(), 4);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.to_json_string(), r#"[3,[[4,[[0,["("]],[4,[]]]],"x"]]"#);
        let symbols: Vec<SymbolId> = tree.subtrees().map(|t| t.symbol).collect();
        assert_eq!(symbols, vec![3, 4, 0, 4]);
    }

    #[test]
    fn test_encode_escapes_terminals() {
        let tree = ParseTree::new(1, vec![Child::Terminal("\"".to_string()), Child::Terminal("\\".to_string())]);
        assert_eq!(tree.to_json_string(), r#"[1,["\"","\\"]]"#);
        assert_eq!(ParseTree::from_json_str(&tree.to_json_string()).unwrap(), tree);
    }

    #[test]
    fn test_malformed_trees() {
        assert_malformed(r#"{"symbol": 1}"#, "$");
        assert_malformed("[1]", "$");
        assert_malformed("[-1, []]", "$[0]");
        assert_malformed("[1.5, []]", "$[0]");
        assert_malformed("[1, null]", "$[1]");
        assert_malformed(r#"[1, ["a", 7]]"#, "$[1][1]");
        assert_malformed(r#"[1, [[2, [[3]]]]]"#, "$[1][0][1][0]");
        assert_malformed(r#"[1, [[2, []], [2, ["a", [5, {}]]]]]"#, "$[1][1][1][1][1]");
        assert!(matches!(ParseTree::from_json_str("[1, []] x"), Err(VizError::Json(_))));
    }

    #[test]
    fn test_deep_trees() {
        let levels = 100_000;
        let src = nested_json(levels);
        let tree = ParseTree::from_json_str(&src).unwrap();
        assert_eq!(tree.depth(), levels);
        assert_eq!(tree.nonterminal_count(), levels);
        assert_eq!(tree.to_json_string(), src);

        let mut broken = nested_json(levels);
        broken.insert_str(broken.len() / 2, "7,");
        assert!(matches!(
            ParseTree::from_json_str(&broken),
            Err(VizError::MalformedTree { .. })
        ));
    }

    #[test]
    fn test_symbol_namer_for_slices() {
        let names = vec!["S'".to_string(), "S".to_string()];
        assert_eq!(names.symbol_name(1), Some("S"));
        assert_eq!(names.symbol_name(2), None);
        let names = ["a", "b"];
        assert_eq!(names[..].symbol_name(0), Some("a"));
    }
}
