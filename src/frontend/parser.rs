//! Table driven LR(1) parser.
//!
//! The parser is not generated for a fixed grammar. It is loaded from a JSON table which
//! holds the action/goto table, the rules, and the symbol names of a canonical LR(1)
//! analyzer built elsewhere. The resulting parse trees keep every matched terminal: a shifted
//! character becomes a tree node of the terminal symbol whose single child is the
//! character itself.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::token::TokenStream;
use super::tree::{Child, ParseTree, SymbolId, SymbolNamer};
use crate::error::VizError;

/// A parser capability injected into the visualizer: turns input text into a parse tree
/// and names the symbols found in that tree.
pub trait Parser: SymbolNamer {
    fn parse(&self, input: &str) -> Result<ParseTree, VizError>;
}

/// Entry of the action/goto table, encoded as `[kind, argument]` in the table file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "(u8, usize)")]
pub enum Action {
    Reject,
    /// Shift a terminal or go to a state after a reduction.
    Shift(usize),
    /// Reduce by the rule with the given index.
    Reduce(usize),
}

impl TryFrom<(u8, usize)> for Action {
    type Error = String;

    fn try_from((kind, arg): (u8, usize)) -> Result<Self, String> {
        match kind {
            0 => Ok(Action::Reject),
            1 => Ok(Action::Shift(arg)),
            2 => Ok(Action::Reduce(arg)),
            _ => Err(format!("unknown action kind {}", kind)),
        }
    }
}

/// Left hand side of a rule and the length of its right hand side.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Rule {
    pub lhs: SymbolId,
    pub len: usize,
}

#[derive(Deserialize)]
struct RawTable {
    terminals: HashMap<String, SymbolId>,
    eol: SymbolId,
    table: Vec<Vec<Action>>,
    rules: Vec<Rule>,
    root_symbol: SymbolId,
    symbol_names: Vec<String>,
}

#[derive(Debug)]
pub struct TableParser {
    terminals: HashMap<char, SymbolId>,
    eol: SymbolId,
    table: Vec<Vec<Action>>,
    rules: Vec<Rule>,
    root_symbol: SymbolId,
    symbol_names: Vec<String>,
}

impl TableParser {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, VizError> {
        let src = fs::read_to_string(path)?;
        Self::from_json_str(&src)
    }

    pub fn from_json_str(src: &str) -> Result<Self, VizError> {
        let raw: RawTable = serde_json::from_str(src)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawTable) -> Result<Self, VizError> {
        let symbols = raw.symbol_names.len();
        let in_range = |what: &str, symbol: SymbolId| {
            if symbol < symbols {
                Ok(())
            } else {
                Err(VizError::Table(format!("{} symbol {} is out of range", what, symbol)))
            }
        };
        in_range("end of input", raw.eol)?;
        in_range("root", raw.root_symbol)?;

        let mut terminals = HashMap::with_capacity(raw.terminals.len());
        for (text, symbol) in raw.terminals {
            let mut chars = text.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => return Err(VizError::Table(format!("terminal {:?} is not a single character", text))),
            };
            in_range("terminal", symbol)?;
            terminals.insert(ch, symbol);
        }

        for (i, rule) in raw.rules.iter().enumerate() {
            if rule.lhs >= symbols {
                return Err(VizError::Table(format!("rule {} has unknown left hand side {}", i, rule.lhs)));
            }
        }

        if raw.table.is_empty() {
            return Err(VizError::Table("table has no states".to_string()));
        }
        for (state, row) in raw.table.iter().enumerate() {
            if row.len() != symbols {
                return Err(VizError::Table(format!(
                    "state {} has {} entries but there are {} symbols",
                    state,
                    row.len(),
                    symbols
                )));
            }
            for action in row {
                match *action {
                    Action::Shift(target) if target >= raw.table.len() => {
                        return Err(VizError::Table(format!("state {} shifts to unknown state {}", state, target)))
                    }
                    Action::Reduce(rule) if rule >= raw.rules.len() => {
                        return Err(VizError::Table(format!("state {} reduces by unknown rule {}", state, rule)))
                    }
                    _ => (),
                }
            }
        }

        Ok(Self {
            terminals,
            eol: raw.eol,
            table: raw.table,
            rules: raw.rules,
            root_symbol: raw.root_symbol,
            symbol_names: raw.symbol_names,
        })
    }

    fn action(&self, state: usize, symbol: SymbolId) -> Action {
        self.table
            .get(state)
            .and_then(|row| row.get(symbol))
            .copied()
            .unwrap_or(Action::Reject)
    }
}

impl SymbolNamer for TableParser {
    fn symbol_name(&self, symbol: SymbolId) -> Option<&str> {
        self.symbol_names.symbol_name(symbol)
    }
}

impl Parser for TableParser {
    fn parse(&self, input: &str) -> Result<ParseTree, VizError> {
        let mut tokens = TokenStream::new(input, &self.terminals, self.eol);
        // Invariant: states.len() == trees.len() + 1
        let mut states: Vec<usize> = vec![0];
        let mut trees: Vec<ParseTree> = Vec::new();

        loop {
            let (symbol, ch) = tokens.peek()?;
            let state = states.last().copied().unwrap_or(0);
            let pos = tokens.position();
            match self.action(state, symbol) {
                Action::Reject => return Err(VizError::Parse { pos, state, symbol }),
                Action::Shift(_) if symbol == self.eol => {
                    return Err(VizError::Parse { pos, state, symbol })
                }
                Action::Shift(target) => {
                    trees.push(ParseTree::new(symbol, vec![Child::Terminal(ch.to_string())]));
                    states.push(target);
                    tokens.next()?;
                }
                Action::Reduce(index) => {
                    let rule = self.rules[index];
                    if rule.len > trees.len() {
                        return Err(VizError::Table(format!(
                            "rule {} pops {} symbols from a stack of {}",
                            index,
                            rule.len,
                            trees.len()
                        )));
                    }
                    let children = trees
                        .split_off(trees.len() - rule.len)
                        .into_iter()
                        .map(Child::Node)
                        .collect();
                    states.truncate(states.len() - rule.len);
                    let tree = ParseTree::new(rule.lhs, children);

                    if rule.lhs == self.root_symbol {
                        debug!(
                            "parsed {} characters into {} tree nodes",
                            pos,
                            tree.nonterminal_count()
                        );
                        return Ok(tree);
                    }

                    let top = states.last().copied().unwrap_or(0);
                    match self.action(top, rule.lhs) {
                        Action::Shift(target) => {
                            trees.push(tree);
                            states.push(target);
                        }
                        _ => {
                            return Err(VizError::Parse {
                                pos,
                                state: top,
                                symbol: rule.lhs,
                            })
                        }
                    }
                }
            }
        }
    }
}
