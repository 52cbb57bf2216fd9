//! Writing graphs to disk, either as DOT source or rendered by Graphviz.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, info};

use super::graph::Graph;
use crate::config::RenderConfig;
use crate::error::VizError;

/// Extensions that are written as DOT source without invoking Graphviz.
const DOT_EXTENSIONS: [&str; 2] = ["dot", "gv"];

pub struct Renderer {
    dot_binary: String,
}

impl Renderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            dot_binary: config.dot_binary.clone(),
        }
    }

    pub fn write_dot(&self, graph: &Graph, path: &Path) -> Result<(), VizError> {
        fs::write(path, format!("{}\n", graph))?;
        info!("wrote {}", path.display());
        Ok(())
    }

    /// Writes `graph` to `path`. The output format is taken from the file extension,
    /// e.g. `tree.png` is rendered with `dot -Tpng`.
    pub fn render(&self, graph: &Graph, path: &Path) -> Result<(), VizError> {
        let format = output_format(path)?;
        if DOT_EXTENSIONS.contains(&format.as_str()) {
            return self.write_dot(graph, path);
        }

        debug!("running {} -T{}", self.dot_binary, format);
        let mut dot = Command::new(&self.dot_binary)
            .arg(format!("-T{}", format))
            .arg("-o")
            .arg(path)
            .stdin(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                VizError::Render(format!(
                    "cannot run {}: {}. Graphviz is probably not installed",
                    self.dot_binary, e
                ))
            })?;

        // dot may fill the stderr pipe before it has read all of stdin, so feed it from
        // a separate thread while this one collects the output.
        let source = graph.to_string();
        let feeder = dot
            .stdin
            .take()
            .map(|mut stdin| thread::spawn(move || stdin.write_all(source.as_bytes())));
        let output = dot.wait_with_output()?;
        let written = match feeder {
            Some(handle) => handle
                .join()
                .map_err(|_| VizError::Render("writing to dot panicked".to_string()))?,
            None => Ok(()),
        };

        if !output.status.success() {
            return Err(VizError::Render(format!(
                "{} exited with {}: {}",
                self.dot_binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        written?;
        info!("wrote {}", path.display());
        Ok(())
    }
}

fn output_format(path: &Path) -> Result<String, VizError> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| {
            VizError::Render(format!(
                "cannot tell the output format of {}, add an extension like .png or .dot",
                path.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualize::graph::{GraphSink, Label, Node, NodeId, Shape};

    fn graph() -> Graph {
        let mut graph = Graph::new("g");
        graph
            .add_node(Node::new(NodeId(1), Label::Text("S".to_string()), Shape::Default))
            .unwrap();
        graph
    }

    #[test]
    fn test_output_format() {
        assert_eq!(output_format(Path::new("out/tree.PNG")).unwrap(), "png");
        assert_eq!(output_format(Path::new("tree.dot")).unwrap(), "dot");
        assert!(output_format(Path::new("tree")).is_err());
    }

    #[test]
    fn test_render_dot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.gv");
        let renderer = Renderer::new(&RenderConfig {
            dot_binary: "does-not-exist".to_string(),
        });
        renderer.render(&graph(), &path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "digraph g {\n\tv1 [ label=\"S\" ];\n}\n"
        );
    }

    #[test]
    fn test_missing_graphviz() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = Renderer::new(&RenderConfig {
            dot_binary: "lrviz-missing-dot-binary".to_string(),
        });
        let result = renderer.render(&graph(), &dir.path().join("tree.png"));
        assert!(matches!(result, Err(VizError::Render(_))));
    }

    /// A failing `dot` that floods stderr before reading its input must not hang the renderer.
    #[cfg(unix)]
    #[test]
    fn test_noisy_failing_graphviz() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-dot");
        fs::write(
            &script,
            "#!/bin/sh\nyes warning | head -n 20000 >&2\ncat > /dev/null\nexit 2\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let mut big = Graph::new("big");
        for id in 1..=5000 {
            big.add_node(Node::new(NodeId(id), Label::Text("S".to_string()), Shape::Default))
                .unwrap();
        }
        let renderer = Renderer::new(&RenderConfig {
            dot_binary: script.to_string_lossy().into_owned(),
        });
        match renderer.render(&big, &dir.path().join("tree.png")) {
            Err(VizError::Render(msg)) => {
                assert!(msg.contains("exited with"));
                assert!(msg.contains("warning"));
            }
            other => panic!("expected render error, got {:?}", other),
        }
    }
}
