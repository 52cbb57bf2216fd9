//! lrviz configuration
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments
//! 2. File given with --config
//! 3. lrviz.toml in the working directory
//! 4. Default values
//! ```
//!
//! Example `lrviz.toml`:
//!
//! ```toml
//! graph_name = "parse_tree"
//! traversal = "work-stack"
//! max_nodes = 100000
//!
//! [render]
//! dot_binary = "/usr/local/bin/dot"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "lrviz.toml";

/// How the parse tree is walked. Both produce exactly the same graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Traversal {
    /// Depth first recursion, one call frame per tree level.
    #[default]
    Recursive,
    /// Explicit stack of frames, for trees too deep for the call stack.
    WorkStack,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VizConfig {
    /// Name of the generated digraph
    #[serde(default = "default_graph_name")]
    pub graph_name: String,
    #[serde(default)]
    pub traversal: Traversal,
    /// Upper bound for the number of nodes in one graph
    #[serde(default)]
    pub max_nodes: Option<usize>,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Graphviz executable used for non-DOT output formats
    #[serde(default = "default_dot_binary")]
    pub dot_binary: String,
}

fn default_graph_name() -> String {
    "parse_tree".to_string()
}

fn default_dot_binary() -> String {
    "dot".to_string()
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            graph_name: default_graph_name(),
            traversal: Traversal::default(),
            max_nodes: None,
            render: RenderConfig::default(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dot_binary: default_dot_binary(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Config parse error in {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

impl VizConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(src)
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `explicit` if given, otherwise `lrviz.toml` from `dir` if it exists,
    /// otherwise the defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }
        let local = dir.join(CONFIG_FILE_NAME);
        if local.is_file() {
            Self::load_file(&local)
        } else {
            Ok(Self::default())
        }
    }
}
