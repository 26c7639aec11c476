use crate::{
    config::EditorConfig,
    drop::{self, CoordinateMapper, DragData, DropEffect, ScreenPoint},
    save::{save_flow, Notification},
    Connection, Edge, EdgeChange, FileStore, FlowGraph, FlowStore, IdGenerator, Node,
    NodeChange, NodeData, NodeId, NodeKind, NullStore, PanelState,
};
use anyhow::{anyhow, Result};
use log::{info, warn};

/// One editing session: the graph plus everything the handlers need to mutate it.
///
/// All mutation goes through the `on_*` handlers, each of which runs to completion
/// before the next gesture is dispatched.
pub struct FlowEditor {
    graph: FlowGraph,
    ids: IdGenerator,
    store: Box<dyn FlowStore>,
    drag_format: String,
    notification: Option<Notification>,
}

impl FlowEditor {
    /// Empty session that saves nowhere
    pub fn new() -> Self {
        Self::with_store(Box::new(NullStore))
    }

    /// Empty session backed by `store`
    pub fn with_store(store: Box<dyn FlowStore>) -> Self {
        let defaults = EditorConfig::default();
        Self {
            graph: FlowGraph::new(),
            ids: IdGenerator::with_prefix(defaults.id_prefix),
            store,
            drag_format: defaults.drag_format,
            notification: None,
        }
    }

    /// Continue editing `graph`, seeding the id generator past its node ids
    pub fn resume(graph: FlowGraph, store: Box<dyn FlowStore>, config: &EditorConfig) -> Self {
        let ids = IdGenerator::from_existing_ids(config.id_prefix.clone(), graph.node_ids());
        Self {
            graph,
            ids,
            store,
            drag_format: config.drag_format.clone(),
            notification: None,
        }
    }

    /// Build the session described by `config`, loading any flow saved in its project
    pub fn from_config(config: &EditorConfig) -> Result<Self> {
        match &config.save_dir {
            Some(dir) => {
                let store = FileStore::open_or_create(dir)?;
                let graph = store.load_flow()?;
                info!(
                    "Opened flow at {} ({} nodes, {} edges)",
                    dir.display(),
                    graph.node_count(),
                    graph.edge_count()
                );
                Ok(Self::resume(graph, Box::new(store), config))
            }
            None => Ok(Self::resume(FlowGraph::new(), Box::new(NullStore), config)),
        }
    }

    /// Drop the current graph and restart id numbering
    pub fn reset_session(&mut self) {
        self.graph = FlowGraph::new();
        self.ids.reset();
        self.notification = None;
    }

    // ========== Read Access ==========

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn nodes(&self) -> &[Node] {
        self.graph.nodes()
    }

    pub fn edges(&self) -> &[Edge] {
        self.graph.edges()
    }

    pub fn drag_format(&self) -> &str {
        &self.drag_format
    }

    /// Where saves go, for the status bar
    pub fn store_description(&self) -> String {
        self.store.describe()
    }

    /// Sidebar or data editor
    pub fn panel(&self) -> PanelState {
        PanelState::from_nodes(self.graph.nodes())
    }

    // ========== Canvas Handlers ==========

    /// Payload the sidebar attaches when a node type starts dragging
    pub fn on_drag_start(&self, kind: NodeKind) -> DragData {
        DragData::for_kind(&self.drag_format, kind)
    }

    pub fn on_drag_over(&self, payload: Option<&DragData>) -> DropEffect {
        drop::drag_over(payload, &self.drag_format)
    }

    pub fn on_drop(
        &mut self,
        payload: Option<&DragData>,
        point: ScreenPoint,
        mapper: &dyn CoordinateMapper,
    ) -> Option<NodeId> {
        drop::handle_drop(
            &mut self.graph,
            &mut self.ids,
            payload,
            &self.drag_format,
            point,
            mapper,
        )
    }

    pub fn on_connect(&mut self, connection: Connection) -> Result<Edge> {
        self.graph.connect(connection).cloned()
    }

    pub fn on_nodes_change(&mut self, changes: impl IntoIterator<Item = NodeChange>) {
        self.graph.apply_node_changes(changes);
    }

    pub fn on_edges_change(&mut self, changes: impl IntoIterator<Item = EdgeChange>) {
        self.graph.apply_edge_changes(changes);
    }

    // ========== Node Data Editor ==========

    /// Replace the text label of a node
    pub fn update_node_text(&mut self, id: &str, text: impl Into<String>) -> Result<()> {
        let mut data = self
            .graph
            .node(id)
            .map(|n| n.data.clone())
            .ok_or_else(|| anyhow!("Node not found: {}", id))?;
        data.text = text.into();
        self.graph.update_node_data(id, data)
    }

    /// Replace a node's whole data record
    pub fn update_node_data(&mut self, id: &str, data: NodeData) -> Result<()> {
        self.graph.update_node_data(id, data)
    }

    /// Clear every selection flag, returning to the sidebar
    pub fn unselect(&mut self) {
        self.graph.unselect_all();
    }

    // ========== Save ==========

    /// Validate and persist, leaving a notification for the UI to show
    pub fn save(&mut self) -> &Notification {
        let outcome = save_flow(&mut self.graph, self.store.as_mut());
        if let Err(e) = &outcome {
            warn!("Save failed: {}", e);
        }
        self.notification.insert(Notification::for_save(&outcome))
    }

    /// Notification waiting to be acknowledged
    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }
}

impl Default for FlowEditor {
    fn default() -> Self {
        Self::new()
    }
}
