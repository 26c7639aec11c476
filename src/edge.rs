use crate::NodeId;
use serde::{Deserialize, Serialize};

/// Edge identifier
pub type EdgeId = String;

/// Directed connection between two nodes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Edge {
    pub id: EdgeId,

    /// Node the edge starts from (output handle)
    pub source: NodeId,

    /// Node the edge ends at (input handle)
    pub target: NodeId,

    /// Selection flag, driven by the canvas
    #[serde(default)]
    pub selected: bool,
}

impl Edge {
    /// Create a new edge with the canonical id for its endpoints
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: Self::id_for(&source, &target),
            source,
            target,
            selected: false,
        }
    }

    /// Canonical id of the edge joining `source` to `target`.
    /// Not unique on its own when node ids contain `-`; the graph suffixes collisions.
    pub fn id_for(source: &str, target: &str) -> EdgeId {
        format!("flow__edge-{}-{}", source, target)
    }

    /// Check if this edge touches a given node
    pub fn involves(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    /// Check if this edge joins the same endpoints as `other`
    pub fn connects(&self, source: &str, target: &str) -> bool {
        self.source == source && self.target == target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_creation() {
        let edge = Edge::new("a", "b");

        assert_eq!(edge.source, "a");
        assert_eq!(edge.target, "b");
        assert_eq!(edge.id, "flow__edge-a-b");
        assert!(!edge.selected);
    }

    #[test]
    fn test_edge_involves() {
        let edge = Edge::new("a", "b");

        assert!(edge.involves("a"));
        assert!(edge.involves("b"));
        assert!(!edge.involves("c"));
    }

    #[test]
    fn test_edge_direction() {
        let edge = Edge::new("a", "b");

        assert!(edge.connects("a", "b"));
        assert!(!edge.connects("b", "a"));
    }
}
