// Flow Editor - Core Library

pub mod change;
pub mod config;
pub mod drop;
pub mod edge;
pub mod editor;
pub mod error;
pub mod event;
pub mod graph;
pub mod id_generator;
pub mod node;
pub mod node_kind;
pub mod panel;
pub mod save;
pub mod storage;
pub mod ui;
pub mod validation;

// Re-export main types for convenience
pub use change::{Connection, EdgeChange, NodeChange};
pub use config::EditorConfig;
pub use drop::{CoordinateMapper, DragData, DropEffect, ScreenPoint, Viewport};
pub use edge::{Edge, EdgeId};
pub use editor::FlowEditor;
pub use error::{PersistenceError, SaveError};
pub use event::{EventType, GraphEvent};
pub use graph::FlowGraph;
pub use id_generator::IdGenerator;
pub use node::{Node, NodeData, NodeId, Position};
pub use node_kind::{NodeKind, NodeRenderer};
pub use panel::PanelState;
pub use save::{FlowDocument, FlowStore, Notification, NotificationLevel, NullStore};
pub use storage::{FileStore, Manifest};
pub use ui::FlowEditorApp;
pub use validation::{is_valid_flow, ValidatedFlow, ValidationIssue, ValidationResult};
