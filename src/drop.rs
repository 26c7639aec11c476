//! Drop-to-place: turns a dragged node type released over the canvas into a new node.

use crate::{FlowGraph, IdGenerator, Node, NodeData, NodeId, NodeKind, Position};
use log::{debug, warn};
use std::collections::HashMap;

/// Format key the sidebar writes the node type under
pub const FLOW_NODE_FORMAT: &str = "application/flow-editor";

/// Drag payload channel: string entries keyed by format, like a platform data transfer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragData {
    entries: HashMap<String, String>,
}

impl DragData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload the sidebar produces for a node kind
    pub fn for_kind(format: &str, kind: NodeKind) -> Self {
        let mut data = Self::new();
        data.set_data(format, kind.type_name());
        data
    }

    pub fn set_data(&mut self, format: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(format.into(), value.into());
    }

    /// Entry for `format`; absent and empty entries both read as `None`
    pub fn get_data(&self, format: &str) -> Option<&str> {
        self.entries
            .get(format)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Point in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Maps screen space to graph space
pub trait CoordinateMapper {
    fn screen_to_flow(&self, point: ScreenPoint) -> Position;

    fn flow_to_screen(&self, position: Position) -> ScreenPoint;
}

/// Pan/zoom state of the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Screen position of the canvas' top-left corner
    pub origin: ScreenPoint,
    /// Pan offset in screen pixels
    pub offset: (f32, f32),
    pub zoom: f32,
}

impl Viewport {
    pub fn new(origin: ScreenPoint) -> Self {
        Self {
            origin,
            offset: (0.0, 0.0),
            zoom: 1.0,
        }
    }

    /// Pan by a screen-space delta
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.offset.0 += dx;
        self.offset.1 += dy;
    }

    /// Zoom around a screen point so that point stays fixed under the cursor
    pub fn zoom_at(&mut self, anchor: ScreenPoint, factor: f32, min: f32, max: f32) {
        let before = self.screen_to_flow(anchor);
        self.zoom = (self.zoom * factor).clamp(min, max);
        let after = self.flow_to_screen(before);
        self.offset.0 += anchor.x - after.x;
        self.offset.1 += anchor.y - after.y;
    }

    /// Back to no pan and 100% zoom
    pub fn reset(&mut self) {
        self.offset = (0.0, 0.0);
        self.zoom = 1.0;
    }

    /// Zoom and pan so `bounds` sits centered in a canvas of `size` pixels.
    ///
    /// `padding` is the fraction of the canvas left free on each side. The zoom
    /// stays within `min..=max`.
    pub fn fit_bounds(
        &mut self,
        (top_left, bottom_right): (Position, Position),
        size: (f32, f32),
        padding: f32,
        min: f32,
        max: f32,
    ) {
        let (width, height) = (bottom_right.x - top_left.x, bottom_right.y - top_left.y);
        let usable = (size.0 * (1.0 - 2.0 * padding), size.1 * (1.0 - 2.0 * padding));
        let fit = |space: f32, extent: f32| {
            if extent > 0.0 {
                space / extent
            } else {
                f32::INFINITY
            }
        };

        self.zoom = fit(usable.0, width).min(fit(usable.1, height)).clamp(min, max);

        let center = (
            (top_left.x + bottom_right.x) / 2.0,
            (top_left.y + bottom_right.y) / 2.0,
        );
        self.offset = (
            size.0 / 2.0 - center.0 * self.zoom,
            size.1 / 2.0 - center.1 * self.zoom,
        );
    }
}

/// Corners of the smallest box holding every node, in graph units
pub fn flow_bounds(nodes: &[Node]) -> Option<(Position, Position)> {
    nodes.iter().fold(None, |bounds, node| {
        let (width, height) = node.kind.renderer().size();
        let (x0, y0) = (node.position.x, node.position.y);
        let (x1, y1) = (x0 + width, y0 + height);
        Some(match bounds {
            None => (Position::new(x0, y0), Position::new(x1, y1)),
            Some((min, max)) => (
                Position::new(min.x.min(x0), min.y.min(y0)),
                Position::new(max.x.max(x1), max.y.max(y1)),
            ),
        })
    })
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ScreenPoint::default())
    }
}

impl CoordinateMapper for Viewport {
    fn screen_to_flow(&self, point: ScreenPoint) -> Position {
        Position::new(
            (point.x - self.origin.x - self.offset.0) / self.zoom,
            (point.y - self.origin.y - self.offset.1) / self.zoom,
        )
    }

    fn flow_to_screen(&self, position: Position) -> ScreenPoint {
        ScreenPoint::new(
            self.origin.x + position.x * self.zoom + self.offset.0,
            self.origin.y + position.y * self.zoom + self.offset.1,
        )
    }
}

/// Feedback while a payload hovers the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEffect {
    None,
    Move,
}

/// Drag-over check: `Move` when the payload carries a node type
pub fn drag_over(payload: Option<&DragData>, format: &str) -> DropEffect {
    match payload.and_then(|p| p.get_data(format)) {
        Some(_) => DropEffect::Move,
        None => DropEffect::None,
    }
}

/// Place a node for a released drag payload.
///
/// Returns the new node's id, or `None` when the payload is absent, empty or names
/// no registered kind. In the `None` case the graph is left untouched.
pub fn handle_drop(
    graph: &mut FlowGraph,
    ids: &mut IdGenerator,
    payload: Option<&DragData>,
    format: &str,
    point: ScreenPoint,
    mapper: &dyn CoordinateMapper,
) -> Option<NodeId> {
    let Some(type_name) = payload.and_then(|p| p.get_data(format)) else {
        debug!("Drop without a node type payload ignored");
        return None;
    };

    let kind: NodeKind = match type_name.parse() {
        Ok(kind) => kind,
        Err(e) => {
            warn!("Drop ignored: {}", e);
            return None;
        }
    };

    let position = mapper.screen_to_flow(point);
    // Loaded flows may carry foreign ids that the generator was not seeded with.
    let Some(id) = std::iter::from_fn(|| ids.next_id()).find(|id| !graph.contains_node(id)) else {
        warn!("Drop ignored: node id space exhausted");
        return None;
    };

    let node = Node::new(
        id.clone(),
        kind,
        position,
        NodeData::placeholder(graph.node_count() + 1),
    );
    debug!("Dropped {} node {} at ({}, {})", kind, id, position.x, position.y);
    graph.add_node(node);

    Some(id)
}
