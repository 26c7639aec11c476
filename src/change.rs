use crate::{EdgeId, NodeId, Position};

/// Patch emitted by the canvas for a single node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    /// Node dragged to a new graph-space position
    Position { id: NodeId, position: Position },

    /// Node clicked, shift-clicked or deselected
    Select { id: NodeId, selected: bool },

    /// Node deleted from the canvas (Delete key)
    Remove { id: NodeId },
}

/// Patch emitted by the canvas for a single edge
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeChange {
    Select { id: EdgeId, selected: bool },
    Remove { id: EdgeId },
}

/// Connect gesture from an output handle to an input handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
}

impl Connection {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}
