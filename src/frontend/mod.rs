//! The frontend module contains everything that is concerned with turning an input string into
//! a parse tree.
//!
//! # Tree
//! The parse tree is a nested structure of grammar symbols and their ordered children. A child
//! is either another derivation or a matched terminal. Trees can also be read from their JSON
//! form `[symbol, [children...]]`.
//! ### Example
//! ```rust
//! use lrviz::frontend::tree::ParseTree;
//! let tree = ParseTree::from_json_str(r#"[0, [[1, []], "x"]]"#);
//! ```
//!
//! # Parser
//! The parser is a table driven LR(1) parser. Its action/goto table, rules and symbol names
//! are loaded from a JSON table file, so one binary serves any grammar.
//! ### Example
//! ```rust,no_run
//! use lrviz::frontend::parser::{Parser, TableParser};
//! let parser = TableParser::load("demos/wfp.json").unwrap();
//! let tree_or_err = parser.parse("(())");
//! ```
//! The parser returns either an error describing the offending character/state or the parse tree.

pub mod parser;
pub mod token;
pub mod tree;
