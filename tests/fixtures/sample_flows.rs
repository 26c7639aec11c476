// Helper functions to build flows in various states of connectedness

use flow_editor::{Connection, FlowGraph, Node, NodeData, NodeId, NodeKind, Position};

/// Create a node with a placeholder label at the origin
pub fn node(id: &str, kind: NodeKind) -> Node {
    Node::new(id, kind, Position::default(), NodeData::text(format!("{} label", id)))
}

/// Two message nodes `a` and `b` with no edges
pub fn two_unconnected() -> FlowGraph {
    FlowGraph::from_parts(
        vec![node("a", NodeKind::Message), node("b", NodeKind::Message)],
        Vec::new(),
    )
}

/// Two message nodes joined by `a -> b`
pub fn two_connected() -> FlowGraph {
    let mut graph = two_unconnected();
    graph
        .connect(Connection::new("a", "b"))
        .expect("a -> b should connect");
    graph
}

/// Input -> Message x `messages` -> Output, connected in series
pub fn chain(messages: usize) -> (FlowGraph, Vec<NodeId>) {
    let mut graph = FlowGraph::new();
    let mut ids = vec!["start".to_string()];
    graph.add_node(node("start", NodeKind::Input));

    for i in 0..messages {
        let id = format!("msg{}", i);
        graph.add_node(node(&id, NodeKind::Message));
        ids.push(id);
    }

    graph.add_node(node("end", NodeKind::Output));
    ids.push("end".to_string());

    for pair in ids.windows(2) {
        graph
            .connect(Connection::new(pair[0].clone(), pair[1].clone()))
            .expect("chain should connect");
    }

    (graph, ids)
}

/// A connected pair plus one node with no edges; returns the orphan's id
pub fn with_orphan() -> (FlowGraph, NodeId) {
    let mut graph = two_connected();
    graph.add_node(node("orphan", NodeKind::Message));
    (graph, "orphan".to_string())
}
