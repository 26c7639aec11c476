use crate::NodeKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node identifier, unique within one editing session
pub type NodeId = String;

/// A node placed on the flow canvas
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Session-unique identifier (e.g. "dndnode_3")
    pub id: NodeId,

    /// Node kind determines rendering and connection handles
    pub kind: NodeKind,

    /// Top-left corner in graph space
    pub position: Position,

    /// Free-form node payload
    pub data: NodeData,

    /// Selection flag, driven by the canvas
    #[serde(default)]
    pub selected: bool,
}

impl Node {
    /// Create a new unselected node
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, position: Position, data: NodeData) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            data,
            selected: false,
        }
    }

    /// Move the node to a new graph-space position
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Replace the node's data
    pub fn set_data(&mut self, data: NodeData) {
        self.data = data;
    }

    /// Set or clear the selection flag
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

/// Position in graph space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Create a new position
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Free-form record attached to a node.
///
/// `text` is the label every node kind renders; any other field round-trips
/// through `extra` untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NodeData {
    #[serde(default)]
    pub text: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeData {
    /// Data with only a text label
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            extra: Map::new(),
        }
    }

    /// Placeholder label for the `ordinal`-th node on the canvas (1-based)
    pub fn placeholder(ordinal: usize) -> Self {
        Self::text(format!("Test Message {}", ordinal))
    }

    /// Read an extra field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Set an extra field; `text` is routed to the label
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if key == "text" {
            if let Value::String(s) = value {
                self.text = s;
            } else {
                self.text = value.to_string();
            }
            return;
        }
        self.extra.insert(key, value);
    }
}
