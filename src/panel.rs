use crate::{Node, NodeId};

/// Which side panel the editor shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelState {
    /// No node selected: the sidebar of node types is shown
    Browsing,
    /// At least one node selected: the data editor is shown for `node_id`,
    /// the first selected node in collection order
    Editing {
        node_id: NodeId,
        selected_count: usize,
    },
}

impl PanelState {
    /// Derive the panel from the current selection flags
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let mut selected = nodes.iter().filter(|n| n.selected);
        match selected.next() {
            None => PanelState::Browsing,
            Some(first) => PanelState::Editing {
                node_id: first.id.clone(),
                selected_count: 1 + selected.count(),
            },
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, PanelState::Editing { .. })
    }

    /// Node the data editor targets
    pub fn editing_node(&self) -> Option<&str> {
        match self {
            PanelState::Browsing => None,
            PanelState::Editing { node_id, .. } => Some(node_id),
        }
    }
}
