use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::frontend::tree::SymbolId;
use crate::visualize::graph::SinkError;

/// Every failure aborts the whole run. Nothing is skipped or relabeled, a partially
/// built graph must not be rendered.
#[derive(Debug, Error)]
pub enum VizError {
    #[error("Malformed parse tree at {path}: {reason}")]
    MalformedTree { path: String, reason: String },
    #[error("Unknown symbol id {0}")]
    UnknownSymbol(SymbolId),
    #[error("Graph rejected insertion: {0}")]
    Sink(#[from] SinkError),
    #[error("Unexpected character {ch:?} at position {pos}")]
    Token { pos: usize, ch: char },
    #[error("Parse error at position {pos}: no action for symbol {symbol} in state {state}")]
    Parse { pos: usize, state: usize, symbol: SymbolId },
    #[error("Invalid parser table: {0}")]
    Table(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Rendering failed: {0}")]
    Render(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl VizError {
    pub(crate) fn malformed(path: &str, reason: &str) -> Self {
        VizError::MalformedTree {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}
