use super::graph::NodeId;

/// Issues node names for one visualization session. Names start at `v1` and are never reused.
#[derive(Debug, Default)]
pub struct IdGenerator {
    counter: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> NodeId {
        self.counter += 1;
        NodeId(self.counter)
    }
}
