use crate::{
    Connection, Edge, EdgeChange, EdgeId, EventType, GraphEvent, Node, NodeChange, NodeData,
    NodeId, Position,
};
use anyhow::{anyhow, Result};
use chrono::Utc;
use log::debug;

/// Flow graph holding the ordered node and edge collections
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    /// Nodes in insertion order
    nodes: Vec<Node>,

    /// Edges in creation order
    edges: Vec<Edge>,

    /// Event log for history tracking
    events: Vec<GraphEvent>,
}

impl FlowGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a graph from stored collections, without logging events
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            nodes,
            edges,
            events: Vec::new(),
        }
    }

    // ========== Node Operations ==========

    /// Append a node
    pub fn add_node(&mut self, node: Node) {
        self.log_event(EventType::NodeAdded {
            id: node.id.clone(),
            kind: node.kind,
            position: node.position,
        });
        self.nodes.push(node);
    }

    /// Get a node by ID
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Get a mutable reference to a node by ID
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// All nodes in order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Check whether a node id is taken
    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Replace a node's data
    pub fn update_node_data(&mut self, id: &str, data: NodeData) -> Result<()> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| anyhow!("Node not found: {}", id))?;

        node.set_data(data.clone());

        self.log_event(EventType::NodeDataChanged {
            id: id.to_string(),
            new_data: data,
        });

        Ok(())
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, id: &str) -> Result<Node> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| anyhow!("Node not found: {}", id))?;

        let incident: Vec<EdgeId> = self.incident_edges(id).map(|e| e.id.clone()).collect();

        for edge_id in incident {
            self.remove_edge(&edge_id)?;
        }

        let node = self.nodes.remove(index);
        self.log_event(EventType::NodeRemoved { id: node.id.clone() });

        Ok(node)
    }

    // ========== Selection ==========

    /// Whether at least one node is selected
    pub fn any_selected(&self) -> bool {
        self.nodes.iter().any(|n| n.selected)
    }

    /// Selected nodes in collection order
    pub fn selected_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.selected)
    }

    /// Clear the selection flag on every node
    pub fn unselect_all(&mut self) {
        for node in &mut self.nodes {
            node.set_selected(false);
        }
        self.log_event(EventType::SelectionCleared);
    }

    // ========== Edge Operations ==========

    /// Connect two nodes, returning the new or already existing edge
    pub fn connect(&mut self, connection: Connection) -> Result<&Edge> {
        let Connection { source, target } = connection;

        let source_node = self
            .node(&source)
            .ok_or_else(|| anyhow!("Source node not found: {}", source))?;
        let target_node = self
            .node(&target)
            .ok_or_else(|| anyhow!("Target node not found: {}", target))?;

        if source == target {
            return Err(anyhow!("Cannot connect a node to itself"));
        }
        if !source_node.kind.renderer().has_output_handle() {
            return Err(anyhow!("{} nodes have no output handle", source_node.kind));
        }
        if !target_node.kind.renderer().has_input_handle() {
            return Err(anyhow!("{} nodes have no input handle", target_node.kind));
        }

        let index = match self.edges.iter().position(|e| e.connects(&source, &target)) {
            Some(existing) => {
                debug!("Edge {} -> {} already exists", source, target);
                existing
            }
            None => {
                let mut edge = Edge::new(source, target);
                edge.id = self.unique_edge_id(&edge.id);
                self.log_event(EventType::EdgeCreated {
                    id: edge.id.clone(),
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                });
                self.edges.push(edge);
                self.edges.len() - 1
            }
        };

        Ok(&self.edges[index])
    }

    /// Get an edge by ID
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// All edges in order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Remove an edge
    pub fn remove_edge(&mut self, id: &str) -> Result<Edge> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| anyhow!("Edge not found: {}", id))?;

        let edge = self.edges.remove(index);
        self.log_event(EventType::EdgeRemoved { id: edge.id.clone() });

        Ok(edge)
    }

    /// Edges touching a node
    pub fn incident_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.involves(node_id))
    }

    /// `base`, or `base` with the smallest numeric suffix no stored edge uses.
    /// Node ids may contain `-`, so two endpoint pairs can share a canonical id.
    fn unique_edge_id(&self, base: &str) -> EdgeId {
        let mut id = base.to_string();
        let mut suffix = 1;
        while self.edge(&id).is_some() {
            id = format!("{}~{}", base, suffix);
            suffix += 1;
        }
        id
    }

    // ========== Canvas Patches ==========

    /// Apply node patches from the canvas. Patches naming unknown nodes are skipped.
    pub fn apply_node_changes(&mut self, changes: impl IntoIterator<Item = NodeChange>) {
        for change in changes {
            match change {
                NodeChange::Position { id, position } => {
                    if let Some(node) = self.node_mut(&id) {
                        node.set_position(position);
                        self.log_move(id, position);
                    } else {
                        debug!("Position change for unknown node {}", id);
                    }
                }
                NodeChange::Select { id, selected } => {
                    if let Some(node) = self.node_mut(&id) {
                        node.set_selected(selected);
                    } else {
                        debug!("Select change for unknown node {}", id);
                    }
                }
                NodeChange::Remove { id } => {
                    if let Err(e) = self.remove_node(&id) {
                        debug!("Remove change skipped: {}", e);
                    }
                }
            }
        }
    }

    /// Apply edge patches from the canvas. Patches naming unknown edges are skipped.
    pub fn apply_edge_changes(&mut self, changes: impl IntoIterator<Item = EdgeChange>) {
        for change in changes {
            match change {
                EdgeChange::Select { id, selected } => {
                    if let Some(edge) = self.edges.iter_mut().find(|e| e.id == id) {
                        edge.selected = selected;
                    }
                }
                EdgeChange::Remove { id } => {
                    if let Err(e) = self.remove_edge(&id) {
                        debug!("Remove change skipped: {}", e);
                    }
                }
            }
        }
    }

    // ========== Event Logging ==========

    /// Log an event
    pub(crate) fn log_event(&mut self, event: EventType) {
        self.events.push(GraphEvent::new(event));
    }

    /// A drag reports a position every frame; consecutive moves of one node
    /// collapse into a single event carrying the latest position.
    fn log_move(&mut self, id: NodeId, position: Position) {
        if let Some(last) = self.events.last_mut() {
            if let EventType::NodeMoved { id: moved, position: at } = &mut last.event {
                if *moved == id {
                    *at = position;
                    last.timestamp = Utc::now();
                    return;
                }
            }
        }
        self.log_event(EventType::NodeMoved { id, position });
    }

    /// Get all events
    pub fn events(&self) -> &[GraphEvent] {
        &self.events
    }

    /// Clear event log
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    // ========== Utility Methods ==========

    /// Count nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Count edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Ids of all nodes
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeKind, Position};

    fn node(id: &str, kind: NodeKind) -> Node {
        Node::new(id, kind, Position::default(), NodeData::text(id))
    }

    #[test]
    fn test_graph_creation() {
        let graph = FlowGraph::new();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_node_crud() {
        let mut graph = FlowGraph::new();

        graph.add_node(node("a", NodeKind::Message));
        assert_eq!(graph.node_count(), 1);

        assert_eq!(graph.node("a").unwrap().data.text, "a");

        graph.update_node_data("a", NodeData::text("Updated")).unwrap();
        assert_eq!(graph.node("a").unwrap().data.text, "Updated");

        assert!(graph.update_node_data("missing", NodeData::default()).is_err());

        graph.remove_node("a").unwrap();
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_nodes_keep_insertion_order() {
        let mut graph = FlowGraph::new();
        for id in ["c", "a", "b"] {
            graph.add_node(node(id, NodeKind::Message));
        }

        let ids: Vec<&str> = graph.node_ids().collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_connect() {
        let mut graph = FlowGraph::new();
        graph.add_node(node("a", NodeKind::Input));
        graph.add_node(node("b", NodeKind::Message));

        let edge = graph.connect(Connection::new("a", "b")).unwrap().clone();
        assert_eq!(edge.source, "a");
        assert_eq!(edge.target, "b");
        assert_eq!(graph.edge_count(), 1);

        // Same endpoints again returns the existing edge
        let again = graph.connect(Connection::new("a", "b")).unwrap().clone();
        assert_eq!(again, edge);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_connect_rejections() {
        let mut graph = FlowGraph::new();
        graph.add_node(node("in", NodeKind::Input));
        graph.add_node(node("msg", NodeKind::Message));
        graph.add_node(node("out", NodeKind::Output));

        assert!(graph.connect(Connection::new("msg", "msg")).is_err());
        assert!(graph.connect(Connection::new("msg", "in")).is_err());
        assert!(graph.connect(Connection::new("out", "msg")).is_err());
        assert!(graph.connect(Connection::new("msg", "ghost")).is_err());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut graph = FlowGraph::new();
        graph.add_node(node("a", NodeKind::Message));
        graph.add_node(node("b", NodeKind::Message));
        graph.add_node(node("c", NodeKind::Message));
        graph.connect(Connection::new("a", "b")).unwrap();
        graph.connect(Connection::new("b", "c")).unwrap();
        graph.connect(Connection::new("a", "c")).unwrap();

        graph.remove_node("b").unwrap();

        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edges()[0].connects("a", "c"));
    }

    #[test]
    fn test_edge_queries() {
        let mut graph = FlowGraph::new();
        graph.add_node(node("a", NodeKind::Message));
        graph.add_node(node("b", NodeKind::Message));
        graph.add_node(node("c", NodeKind::Message));
        graph.connect(Connection::new("a", "b")).unwrap();
        graph.connect(Connection::new("b", "c")).unwrap();

        assert_eq!(graph.incident_edges("b").count(), 2);
        assert_eq!(graph.incident_edges("a").count(), 1);
    }

    #[test]
    fn test_edge_ids_stay_unique_for_hyphenated_node_ids() {
        let mut graph = FlowGraph::new();
        for id in ["a-b", "c", "a", "b-c"] {
            graph.add_node(node(id, NodeKind::Message));
        }

        let first = graph.connect(Connection::new("a-b", "c")).unwrap().clone();
        let second = graph.connect(Connection::new("a", "b-c")).unwrap().clone();

        assert_ne!(first.id, second.id);
        assert_eq!(graph.edge(&second.id).unwrap().source, "a");

        // Reconnecting either pair still finds its own edge
        assert_eq!(graph.connect(Connection::new("a", "b-c")).unwrap().id, second.id);
        assert_eq!(graph.edge_count(), 2);

        graph.apply_edge_changes(vec![EdgeChange::Remove { id: second.id }]);

        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edges()[0].connects("a-b", "c"));
    }

    #[test]
    fn test_node_changes() {
        let mut graph = FlowGraph::new();
        graph.add_node(node("a", NodeKind::Message));
        graph.add_node(node("b", NodeKind::Message));

        graph.apply_node_changes(vec![
            NodeChange::Position {
                id: "a".to_string(),
                position: Position::new(40.0, 50.0),
            },
            NodeChange::Select {
                id: "b".to_string(),
                selected: true,
            },
            NodeChange::Select {
                id: "ghost".to_string(),
                selected: true,
            },
        ]);

        assert_eq!(graph.node("a").unwrap().position, Position::new(40.0, 50.0));
        assert!(graph.node("b").unwrap().selected);
        assert!(graph.any_selected());
        assert_eq!(graph.selected_nodes().count(), 1);

        graph.apply_node_changes(vec![NodeChange::Remove {
            id: "a".to_string(),
        }]);
        assert!(!graph.contains_node("a"));
    }

    #[test]
    fn test_drag_frames_fold_into_one_move() {
        let mut graph = FlowGraph::new();
        graph.add_node(node("a", NodeKind::Message));
        graph.add_node(node("b", NodeKind::Message));
        graph.clear_events();

        let moves = |id: &str, from: f32| {
            (0..100)
                .map(|step| NodeChange::Position {
                    id: id.to_string(),
                    position: Position::new(from + step as f32, 0.0),
                })
                .collect::<Vec<_>>()
        };
        for change in moves("a", 0.0) {
            graph.apply_node_changes(vec![change]);
        }
        assert_eq!(graph.events().len(), 1);
        match &graph.events()[0].event {
            EventType::NodeMoved { id, position } => {
                assert_eq!(id, "a");
                assert_eq!(*position, Position::new(99.0, 0.0));
            }
            _ => panic!("Expected NodeMoved event"),
        }

        // Moving another node in between starts a new entry
        graph.apply_node_changes(moves("b", 10.0));
        graph.apply_node_changes(moves("a", 200.0));
        assert_eq!(graph.events().len(), 3);
        assert!(matches!(
            &graph.events()[2].event,
            EventType::NodeMoved { id, position } if id == "a" && *position == Position::new(299.0, 0.0)
        ));
    }

    #[test]
    fn test_edge_changes() {
        let mut graph = FlowGraph::new();
        graph.add_node(node("a", NodeKind::Message));
        graph.add_node(node("b", NodeKind::Message));
        let id = graph.connect(Connection::new("a", "b")).unwrap().id.clone();

        graph.apply_edge_changes(vec![EdgeChange::Select {
            id: id.clone(),
            selected: true,
        }]);
        assert!(graph.edge(&id).unwrap().selected);

        graph.apply_edge_changes(vec![EdgeChange::Remove { id: id.clone() }]);
        assert!(graph.edge(&id).is_none());
    }

    #[test]
    fn test_unselect_all() {
        let mut graph = FlowGraph::new();
        graph.add_node(node("a", NodeKind::Message));
        graph.add_node(node("b", NodeKind::Message));
        graph.node_mut("a").unwrap().set_selected(true);
        graph.node_mut("b").unwrap().set_selected(true);

        graph.unselect_all();

        assert!(!graph.any_selected());
    }

    #[test]
    fn test_event_logging() {
        let mut graph = FlowGraph::new();
        graph.add_node(node("a", NodeKind::Message));

        assert_eq!(graph.events().len(), 1);

        match &graph.events()[0].event {
            EventType::NodeAdded { kind, .. } => {
                assert_eq!(*kind, NodeKind::Message);
            }
            _ => panic!("Expected NodeAdded event"),
        }

        graph.clear_events();
        assert!(graph.events().is_empty());
    }
}
