use crate::{EdgeId, NodeData, NodeId, NodeKind, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A graph event with timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEvent {
    pub timestamp: DateTime<Utc>,
    pub event: EventType,
}

impl GraphEvent {
    /// Create a new event with the current timestamp
    pub fn new(event: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Types of events that can occur in the flow graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventType {
    NodeAdded {
        id: NodeId,
        kind: NodeKind,
        position: Position,
    },

    NodeMoved {
        id: NodeId,
        position: Position,
    },

    NodeDataChanged {
        id: NodeId,
        new_data: NodeData,
    },

    NodeRemoved {
        id: NodeId,
    },

    EdgeCreated {
        id: EdgeId,
        source: NodeId,
        target: NodeId,
    },

    EdgeRemoved {
        id: EdgeId,
    },

    /// Every selection flag cleared by "unselect"
    SelectionCleared,

    FlowSaved {
        node_count: usize,
        edge_count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = GraphEvent::new(EventType::NodeAdded {
            id: "dndnode_0".to_string(),
            kind: NodeKind::Message,
            position: Position::new(0.0, 0.0),
        });

        assert!(event.timestamp <= Utc::now());
    }

    #[test]
    fn test_event_serialization() {
        let event = GraphEvent::new(EventType::EdgeCreated {
            id: "flow__edge-a-b".to_string(),
            source: "a".to_string(),
            target: "b".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: GraphEvent = serde_json::from_str(&json).unwrap();

        match (&event.event, &deserialized.event) {
            (
                EventType::EdgeCreated { source: s1, target: t1, .. },
                EventType::EdgeCreated { source: s2, target: t2, .. },
            ) => {
                assert_eq!(s1, s2);
                assert_eq!(t1, t2);
            }
            _ => panic!("Event type mismatch"),
        }
    }
}
