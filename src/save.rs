use crate::{
    validation::Validator, Edge, EventType, FlowGraph, GraphEvent, Node, PersistenceError,
    SaveError,
};
use log::{info, warn};

pub const FLOW_SAVED: &str = "Flow Saved";
pub const CANNOT_SAVE_FLOW: &str = "Cannot Save Flow";

/// Borrowed view of everything a store needs to write
#[derive(Debug, Clone, Copy)]
pub struct FlowDocument<'a> {
    pub nodes: &'a [Node],
    pub edges: &'a [Edge],
    /// Events since the last successful save
    pub events: &'a [GraphEvent],
}

/// Persistence collaborator behind the save action
pub trait FlowStore {
    fn persist(&mut self, flow: &FlowDocument<'_>) -> Result<(), PersistenceError>;

    /// Short human-readable description for the status bar
    fn describe(&self) -> String;
}

/// Store that keeps nothing; saving only confirms the flow is valid
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl FlowStore for NullStore {
    fn persist(&mut self, flow: &FlowDocument<'_>) -> Result<(), PersistenceError> {
        info!(
            "Flow with {} nodes and {} edges accepted (no persistence configured)",
            flow.nodes.len(),
            flow.edges.len()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory only".to_string()
    }
}

/// Severity of a user-visible notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Failure,
}

/// Blocking message shown after a save attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub detail: Option<String>,
}

impl Notification {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            detail: None,
        }
    }

    pub fn failure(title: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            level: NotificationLevel::Failure,
            title: title.into(),
            detail,
        }
    }

    /// Notification for the outcome of [`save_flow`]
    pub fn for_save(outcome: &Result<(), SaveError>) -> Self {
        match outcome {
            Ok(()) => Self::success(FLOW_SAVED),
            Err(e) => Self::failure(CANNOT_SAVE_FLOW, Some(e.to_string())),
        }
    }

    pub fn is_success(&self) -> bool {
        self.level == NotificationLevel::Success
    }
}

/// Validate the graph and hand it to the store.
///
/// Nothing in `graph` changes unless the store accepts the flow; after a successful
/// save the event log is cleared since its contents now live in the store.
pub fn save_flow(graph: &mut FlowGraph, store: &mut dyn FlowStore) -> Result<(), SaveError> {
    let result = Validator::validate(graph.nodes(), graph.edges());
    if !result.is_valid() {
        let unconnected: Vec<String> = result.affected_nodes().into_iter().cloned().collect();
        warn!("Save rejected: unconnected nodes {:?}", unconnected);
        return Err(SaveError::InvalidFlow(unconnected));
    }

    let mut events = graph.events().to_vec();
    events.push(GraphEvent::new(EventType::FlowSaved {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
    }));

    let document = FlowDocument {
        nodes: graph.nodes(),
        edges: graph.edges(),
        events: &events,
    };

    if let Err(e) = store.persist(&document) {
        warn!("Save failed ({}): {}", store.describe(), e);
        return Err(e.into());
    }

    info!("Flow saved to {}", store.describe());
    graph.clear_events();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Connection, NodeData, NodeKind, Position};
    use assert_matches::assert_matches;

    struct FailingStore;

    impl FlowStore for FailingStore {
        fn persist(&mut self, _flow: &FlowDocument<'_>) -> Result<(), PersistenceError> {
            Err(anyhow::anyhow!("disk full").into())
        }

        fn describe(&self) -> String {
            "failing store".to_string()
        }
    }

    fn two_nodes() -> FlowGraph {
        let mut graph = FlowGraph::new();
        for id in ["a", "b"] {
            graph.add_node(Node::new(id, NodeKind::Message, Position::default(), NodeData::default()));
        }
        graph
    }

    #[test]
    fn test_invalid_flow_is_rejected() {
        let mut graph = two_nodes();
        let events_before = graph.events().len();

        let outcome = save_flow(&mut graph, &mut NullStore);

        assert_matches!(&outcome, Err(SaveError::InvalidFlow(ids)) if ids.len() == 2);
        assert_eq!(graph.events().len(), events_before);

        let notification = Notification::for_save(&outcome);
        assert_eq!(notification.title, CANNOT_SAVE_FLOW);
        assert!(!notification.is_success());
    }

    #[test]
    fn test_valid_flow_is_saved() {
        let mut graph = two_nodes();
        graph.connect(Connection::new("a", "b")).unwrap();

        let outcome = save_flow(&mut graph, &mut NullStore);

        assert!(outcome.is_ok());
        assert!(graph.events().is_empty());
        assert_eq!(Notification::for_save(&outcome), Notification::success(FLOW_SAVED));
    }

    #[test]
    fn test_persistence_failure_keeps_state() {
        let mut graph = two_nodes();
        graph.connect(Connection::new("a", "b")).unwrap();
        let events_before = graph.events().len();

        let outcome = save_flow(&mut graph, &mut FailingStore);

        assert_matches!(outcome, Err(SaveError::Persistence(_)));
        assert_eq!(graph.events().len(), events_before);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_empty_flow_saves() {
        let mut graph = FlowGraph::new();
        assert!(save_flow(&mut graph, &mut NullStore).is_ok());
    }
}
