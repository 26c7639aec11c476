use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Node kinds offered by the sidebar.
///
/// The set is closed: every kind has exactly one [`NodeRenderer`] in
/// [`NodeKind::renderer`], so adding a kind without a renderer fails to compile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Input,
    Message,
    Output,
}

impl NodeKind {
    /// All kinds in sidebar order
    pub const ALL: [NodeKind; 3] = [NodeKind::Input, NodeKind::Message, NodeKind::Output];

    /// Type name carried in the drag payload
    pub fn type_name(self) -> &'static str {
        match self {
            NodeKind::Input => "input",
            NodeKind::Message => "message",
            NodeKind::Output => "output",
        }
    }

    /// Render/behavior implementation for this kind
    pub fn renderer(self) -> &'static dyn NodeRenderer {
        match self {
            NodeKind::Input => &InputNode,
            NodeKind::Message => &MessageNode,
            NodeKind::Output => &OutputNode,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Error for a type name outside the registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown node type: {0}")]
pub struct UnknownNodeKind(pub String);

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.type_name() == s)
            .ok_or_else(|| UnknownNodeKind(s.to_string()))
    }
}

/// RGB triple, kept free of GUI types so the registry stays headless
pub type Rgb = [u8; 3];

/// How a node kind is drawn and which handles it exposes
pub trait NodeRenderer: Sync {
    /// Title shown in the sidebar and the node header
    fn title(&self) -> &'static str;

    /// Header fill colour
    fn accent(&self) -> Rgb;

    /// Node size in graph units
    fn size(&self) -> (f32, f32) {
        (180.0, 64.0)
    }

    /// Whether edges may end at this node
    fn has_input_handle(&self) -> bool;

    /// Whether edges may start at this node
    fn has_output_handle(&self) -> bool;
}

struct InputNode;
struct MessageNode;
struct OutputNode;

impl NodeRenderer for InputNode {
    fn title(&self) -> &'static str {
        "Input"
    }

    fn accent(&self) -> Rgb {
        [82, 163, 115]
    }

    fn size(&self) -> (f32, f32) {
        (150.0, 48.0)
    }

    fn has_input_handle(&self) -> bool {
        false
    }

    fn has_output_handle(&self) -> bool {
        true
    }
}

impl NodeRenderer for MessageNode {
    fn title(&self) -> &'static str {
        "Send Message"
    }

    fn accent(&self) -> Rgb {
        [178, 240, 227]
    }

    fn has_input_handle(&self) -> bool {
        true
    }

    fn has_output_handle(&self) -> bool {
        true
    }
}

impl NodeRenderer for OutputNode {
    fn title(&self) -> &'static str {
        "Output"
    }

    fn accent(&self) -> Rgb {
        [219, 112, 99]
    }

    fn size(&self) -> (f32, f32) {
        (150.0, 48.0)
    }

    fn has_input_handle(&self) -> bool {
        true
    }

    fn has_output_handle(&self) -> bool {
        false
    }
}
