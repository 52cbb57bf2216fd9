//! Character level token stream feeding the LR parser. Every terminal of the grammar is a
//! single character, so tokenizing is a plain table lookup.

use std::collections::HashMap;

use super::tree::SymbolId;
use crate::error::VizError;

/// Character returned together with the end of input symbol.
pub const EOL_CHAR: char = '\0';

pub struct TokenStream<'a> {
    /// Mapping of terminal characters to their grammar symbol.
    table: &'a HashMap<char, SymbolId>,
    /// Symbol reported once the input is exhausted.
    eol: SymbolId,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(text: &str, table: &'a HashMap<char, SymbolId>, eol: SymbolId) -> Self {
        Self {
            table,
            eol,
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    /// Looks at the current token without consuming it.
    pub fn peek(&self) -> Result<(SymbolId, char), VizError> {
        match self.chars.get(self.pos) {
            None => Ok((self.eol, EOL_CHAR)),
            Some(&ch) => self
                .table
                .get(&ch)
                .map(|&symbol| (symbol, ch))
                .ok_or(VizError::Token { pos: self.pos, ch }),
        }
    }

    /// Consumes the current token.
    pub fn next(&mut self) -> Result<(SymbolId, char), VizError> {
        let token = self.peek()?;
        if self.pos < self.chars.len() {
            self.pos += 1;
        }
        Ok(token)
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}
