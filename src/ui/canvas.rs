//! Canvas adapter over egui.
//!
//! Reads the node and edge collections, paints them, hit-tests pointer input and
//! reports what the user did as [`CanvasEvent`]s. It never mutates the graph itself.

use crate::{
    drop::{self, CoordinateMapper, DragData, DropEffect, ScreenPoint, Viewport},
    Connection, Edge, EdgeChange, Node, NodeChange, NodeId,
};
use egui::{
    epaint::{CubicBezierShape, PathShape},
    pos2, vec2, Align2, Color32, FontId, Key, Pos2, Rect, Response, Rounding, Sense, Stroke,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Handle radius in screen pixels
const HANDLE_RADIUS: f32 = 6.0;

/// Pointer slop around handles and edges
const HIT_SLOP: f32 = 6.0;

/// Zoom step of the zoom in/out controls
pub const ZOOM_STEP: f32 = 1.2;

/// Share of the canvas left free on each side by "Fit View"
const FIT_PADDING: f32 = 0.1;

const SELECTION_COLOR: Color32 = Color32::from_rgb(0, 120, 255);
const EDGE_COLOR: Color32 = Color32::from_rgb(120, 120, 140);

/// What the user did on the canvas this frame
#[derive(Debug, Clone)]
pub enum CanvasEvent {
    Nodes(Vec<NodeChange>),
    Edges(Vec<EdgeChange>),
    Connect(Connection),
    Drop {
        payload: Arc<DragData>,
        point: ScreenPoint,
    },
}

/// Per-frame view handed to the canvas
pub struct CanvasInput<'a> {
    pub nodes: &'a [Node],
    pub edges: &'a [Edge],
    /// Nodes outlined as blocking a save
    pub issues: &'a HashSet<NodeId>,
    pub drag_format: &'a str,
    pub show_grid: bool,
    pub zoom_range: (f32, f32),
    /// False while a modal notification blocks input
    pub interactive: bool,
}

/// Interaction state that survives between frames
#[derive(Debug, Default)]
pub struct CanvasState {
    pub viewport: Viewport,
    dragging_node: Option<(NodeId, egui::Vec2)>,
    connecting_from: Option<NodeId>,
    panning: bool,
    /// Canvas size in pixels as of the last frame
    size: (f32, f32),
}

impl CanvasState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint the graph and collect this frame's events
    pub fn show(&mut self, ui: &mut egui::Ui, input: &CanvasInput<'_>) -> Vec<CanvasEvent> {
        let mut events = Vec::new();
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let canvas_rect = response.rect;
        self.viewport.origin = ScreenPoint::new(canvas_rect.min.x, canvas_rect.min.y);
        self.size = (canvas_rect.width(), canvas_rect.height());

        let pointer = ui.input(|i| i.pointer.latest_pos());

        if input.interactive {
            self.handle_zoom(ui, &response, pointer, input.zoom_range);
            self.handle_drag(ui, &response, pointer, input, &mut events);
            self.handle_click(ui, &response, pointer, input, &mut events);
            self.handle_delete(ui, input, &mut events);

            if let (Some(payload), Some(p)) = (response.dnd_release_payload::<DragData>(), pointer) {
                events.push(CanvasEvent::Drop {
                    payload,
                    point: screen_point(p),
                });
            }
        }

        painter.rect_filled(canvas_rect, 0.0, Color32::from_gray(250));
        if input.show_grid {
            self.draw_grid(&painter, canvas_rect);
        }

        let hovering = response.dnd_hover_payload::<DragData>();
        if drop::drag_over(hovering.as_deref(), input.drag_format) == DropEffect::Move {
            painter.rect_stroke(canvas_rect.shrink(2.0), 4.0, Stroke::new(2.0, SELECTION_COLOR));
        }

        for edge in input.edges {
            self.draw_edge(&painter, input.nodes, edge);
        }

        if let (Some(source_id), Some(p)) = (&self.connecting_from, pointer) {
            if let Some(source) = input.nodes.iter().find(|n| &n.id == source_id) {
                let from = self.node_rect(source).right_center();
                painter.add(CubicBezierShape::from_points_stroke(
                    edge_curve(from, p),
                    false,
                    Color32::TRANSPARENT,
                    Stroke::new(2.0, SELECTION_COLOR),
                ));
            }
        }

        for node in input.nodes {
            self.draw_node(&painter, node, input.issues.contains(&node.id));
        }

        events
    }

    // ========== View Controls ==========

    /// Zoom around the canvas center
    pub fn zoom_by(&mut self, factor: f32, (min, max): (f32, f32)) {
        let center = ScreenPoint::new(
            self.viewport.origin.x + self.size.0 / 2.0,
            self.viewport.origin.y + self.size.1 / 2.0,
        );
        self.viewport.zoom_at(center, factor, min, max);
    }

    /// Frame every node; an empty flow goes back to the default view
    pub fn fit_view(&mut self, nodes: &[Node], (min, max): (f32, f32)) {
        match drop::flow_bounds(nodes) {
            Some(bounds) if self.size.0 > 0.0 && self.size.1 > 0.0 => {
                self.viewport.fit_bounds(bounds, self.size, FIT_PADDING, min, max);
            }
            Some(_) => {}
            None => self.viewport.reset(),
        }
    }

    // ========== Input Handling ==========

    fn handle_zoom(
        &mut self,
        ui: &egui::Ui,
        response: &Response,
        pointer: Option<Pos2>,
        (min, max): (f32, f32),
    ) {
        if !response.hovered() {
            return;
        }
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
        if let (true, Some(p)) = (scroll_delta != 0.0, pointer) {
            let factor = (scroll_delta * 0.002).exp();
            self.viewport.zoom_at(screen_point(p), factor, min, max);
        }
    }

    fn handle_drag(
        &mut self,
        ui: &egui::Ui,
        response: &Response,
        pointer: Option<Pos2>,
        input: &CanvasInput<'_>,
        events: &mut Vec<CanvasEvent>,
    ) {
        if response.drag_started() {
            let origin = ui.input(|i| i.pointer.press_origin()).or(pointer);
            if let Some(p) = origin {
                if let Some(node) = self.output_handle_at(input.nodes, p) {
                    self.connecting_from = Some(node.id.clone());
                } else if let Some(node) = self.node_at(input.nodes, p) {
                    let grab = p - self.node_rect(node).min;
                    self.dragging_node = Some((node.id.clone(), grab));
                    if !node.selected {
                        events.push(CanvasEvent::Nodes(select_only(input.nodes, &node.id)));
                    }
                } else {
                    self.panning = true;
                }
            }
        }

        if response.dragged() && response.drag_delta() != egui::Vec2::ZERO {
            if let (Some((id, grab)), Some(p)) = (&self.dragging_node, pointer) {
                let position = self.viewport.screen_to_flow(screen_point(p - *grab));
                events.push(CanvasEvent::Nodes(vec![NodeChange::Position {
                    id: id.clone(),
                    position,
                }]));
            } else if self.panning {
                let delta = response.drag_delta();
                self.viewport.pan(delta.x, delta.y);
            }
        }

        if response.drag_stopped() {
            if let (Some(source), Some(p)) = (self.connecting_from.take(), pointer) {
                if let Some(target) = self.input_target_at(input.nodes, p) {
                    events.push(CanvasEvent::Connect(Connection::new(
                        source,
                        target.id.clone(),
                    )));
                }
            }
            self.dragging_node = None;
            self.panning = false;
        }
    }

    fn handle_click(
        &self,
        ui: &egui::Ui,
        response: &Response,
        pointer: Option<Pos2>,
        input: &CanvasInput<'_>,
        events: &mut Vec<CanvasEvent>,
    ) {
        let Some(p) = pointer.filter(|_| response.clicked()) else {
            return;
        };

        if let Some(node) = self.node_at(input.nodes, p) {
            let changes = if ui.input(|i| i.modifiers.shift) {
                vec![NodeChange::Select {
                    id: node.id.clone(),
                    selected: !node.selected,
                }]
            } else {
                select_only(input.nodes, &node.id)
            };
            events.push(CanvasEvent::Nodes(changes));
            events.push(CanvasEvent::Edges(select_only_edge(input.edges, None)));
        } else if let Some(edge) = self.edge_at(input.nodes, input.edges, p) {
            events.push(CanvasEvent::Edges(select_only_edge(input.edges, Some(&edge.id))));
        } else {
            // Pane clicks clear edge selection only; nodes leave the editor via "unselect"
            events.push(CanvasEvent::Edges(select_only_edge(input.edges, None)));
        }
    }

    fn handle_delete(&self, ui: &egui::Ui, input: &CanvasInput<'_>, events: &mut Vec<CanvasEvent>) {
        if ui.ctx().wants_keyboard_input() {
            return;
        }
        if !ui.input(|i| i.key_pressed(Key::Delete) || i.key_pressed(Key::Backspace)) {
            return;
        }

        let edges: Vec<EdgeChange> = input
            .edges
            .iter()
            .filter(|e| e.selected)
            .map(|e| EdgeChange::Remove { id: e.id.clone() })
            .collect();
        let nodes: Vec<NodeChange> = input
            .nodes
            .iter()
            .filter(|n| n.selected)
            .map(|n| NodeChange::Remove { id: n.id.clone() })
            .collect();

        if !edges.is_empty() {
            events.push(CanvasEvent::Edges(edges));
        }
        if !nodes.is_empty() {
            events.push(CanvasEvent::Nodes(nodes));
        }
    }

    // ========== Hit Testing ==========

    fn node_rect(&self, node: &Node) -> Rect {
        let (width, height) = node.kind.renderer().size();
        let min = self.viewport.flow_to_screen(node.position);
        Rect::from_min_size(pos2(min.x, min.y), vec2(width, height) * self.viewport.zoom)
    }

    /// Topmost node under the pointer; later nodes paint above earlier ones
    fn node_at<'a>(&self, nodes: &'a [Node], p: Pos2) -> Option<&'a Node> {
        nodes.iter().rev().find(|n| self.node_rect(n).contains(p))
    }

    fn output_handle_at<'a>(&self, nodes: &'a [Node], p: Pos2) -> Option<&'a Node> {
        nodes.iter().rev().find(|n| {
            n.kind.renderer().has_output_handle()
                && self.node_rect(n).right_center().distance(p) <= HANDLE_RADIUS + HIT_SLOP
        })
    }

    /// Node accepting a connection dropped at `p`: its input handle or anywhere on its body
    fn input_target_at<'a>(&self, nodes: &'a [Node], p: Pos2) -> Option<&'a Node> {
        nodes.iter().rev().find(|n| {
            if !n.kind.renderer().has_input_handle() {
                return false;
            }
            let rect = self.node_rect(n);
            rect.contains(p) || rect.left_center().distance(p) <= HANDLE_RADIUS + HIT_SLOP
        })
    }

    fn edge_at<'a>(&self, nodes: &[Node], edges: &'a [Edge], p: Pos2) -> Option<&'a Edge> {
        edges.iter().rev().find(|edge| {
            self.edge_endpoints(nodes, edge)
                .map(|(from, to)| distance_to_curve(edge_curve(from, to), p) <= HIT_SLOP)
                .unwrap_or(false)
        })
    }

    fn edge_endpoints(&self, nodes: &[Node], edge: &Edge) -> Option<(Pos2, Pos2)> {
        let source = nodes.iter().find(|n| n.id == edge.source)?;
        let target = nodes.iter().find(|n| n.id == edge.target)?;
        Some((
            self.node_rect(source).right_center(),
            self.node_rect(target).left_center(),
        ))
    }

    // ========== Painting ==========

    fn draw_node(&self, painter: &egui::Painter, node: &Node, unconnected: bool) {
        let renderer = node.kind.renderer();
        let zoom = self.viewport.zoom;
        let rect = self.node_rect(node);
        let [r, g, b] = renderer.accent();

        let (stroke_width, stroke_color) = if node.selected {
            (3.0, SELECTION_COLOR)
        } else if unconnected {
            (2.0, Color32::RED)
        } else {
            (1.0, Color32::DARK_GRAY)
        };

        painter.rect(
            rect,
            6.0 * zoom,
            Color32::WHITE,
            Stroke::new(stroke_width, stroke_color),
        );

        let header = Rect::from_min_size(rect.min, vec2(rect.width(), 20.0 * zoom));
        painter.rect_filled(
            header.shrink(1.0),
            Rounding {
                nw: 6.0 * zoom,
                ne: 6.0 * zoom,
                sw: 0.0,
                se: 0.0,
            },
            Color32::from_rgb(r, g, b),
        );
        painter.text(
            header.left_center() + vec2(8.0 * zoom, 0.0),
            Align2::LEFT_CENTER,
            renderer.title(),
            FontId::proportional(12.0 * zoom),
            Color32::BLACK,
        );

        painter.text(
            rect.left_top() + vec2(8.0 * zoom, 26.0 * zoom),
            Align2::LEFT_TOP,
            label_preview(&node.data.text),
            FontId::proportional(13.0 * zoom),
            Color32::from_gray(60),
        );

        let handle_stroke = Stroke::new(1.0, Color32::WHITE);
        if renderer.has_input_handle() {
            painter.circle(rect.left_center(), HANDLE_RADIUS, Color32::DARK_GRAY, handle_stroke);
        }
        if renderer.has_output_handle() {
            painter.circle(rect.right_center(), HANDLE_RADIUS, Color32::DARK_GRAY, handle_stroke);
        }
    }

    fn draw_edge(&self, painter: &egui::Painter, nodes: &[Node], edge: &Edge) {
        let Some((from, to)) = self.edge_endpoints(nodes, edge) else {
            return;
        };

        let color = if edge.selected { SELECTION_COLOR } else { EDGE_COLOR };
        let stroke = Stroke::new(2.0, color);
        let curve = edge_curve(from, to);

        painter.add(CubicBezierShape::from_points_stroke(
            curve,
            false,
            Color32::TRANSPARENT,
            stroke,
        ));

        // Arrowhead along the final tangent
        let dir = (curve[3] - curve[2]).normalized();
        let perpendicular = vec2(-dir.y, dir.x);
        let arrow_size = 10.0;
        let arrow_tip = to - dir * HANDLE_RADIUS;

        let arrow_point1 = arrow_tip - dir * arrow_size + perpendicular * arrow_size * 0.5;
        let arrow_point2 = arrow_tip - dir * arrow_size - perpendicular * arrow_size * 0.5;

        painter.add(PathShape::convex_polygon(
            vec![arrow_tip, arrow_point1, arrow_point2],
            color,
            stroke,
        ));
    }

    fn draw_grid(&self, painter: &egui::Painter, canvas_rect: Rect) {
        let grid_spacing = 25.0 * self.viewport.zoom;
        let grid_color = Color32::from_gray(220);
        let (offset_x, offset_y) = self.viewport.offset;

        // Vertical lines
        let mut x = canvas_rect.left() + offset_x.rem_euclid(grid_spacing);
        while x < canvas_rect.right() {
            painter.line_segment(
                [pos2(x, canvas_rect.top()), pos2(x, canvas_rect.bottom())],
                Stroke::new(1.0, grid_color),
            );
            x += grid_spacing;
        }

        // Horizontal lines
        let mut y = canvas_rect.top() + offset_y.rem_euclid(grid_spacing);
        while y < canvas_rect.bottom() {
            painter.line_segment(
                [pos2(canvas_rect.left(), y), pos2(canvas_rect.right(), y)],
                Stroke::new(1.0, grid_color),
            );
            y += grid_spacing;
        }
    }
}

fn screen_point(p: Pos2) -> ScreenPoint {
    ScreenPoint::new(p.x, p.y)
}

/// Select `id` and deselect every other node
fn select_only(nodes: &[Node], id: &str) -> Vec<NodeChange> {
    nodes
        .iter()
        .filter_map(|n| {
            let wanted = n.id == id;
            (n.selected != wanted).then(|| NodeChange::Select {
                id: n.id.clone(),
                selected: wanted,
            })
        })
        .collect()
}

/// Select at most one edge
fn select_only_edge(edges: &[Edge], id: Option<&str>) -> Vec<EdgeChange> {
    edges
        .iter()
        .filter_map(|e| {
            let wanted = Some(e.id.as_str()) == id;
            (e.selected != wanted).then(|| EdgeChange::Select {
                id: e.id.clone(),
                selected: wanted,
            })
        })
        .collect()
}

/// Horizontal S-curve from an output handle to an input handle
fn edge_curve(from: Pos2, to: Pos2) -> [Pos2; 4] {
    let bend = ((to.x - from.x).abs() * 0.5).max(40.0);
    [from, from + vec2(bend, 0.0), to - vec2(bend, 0.0), to]
}

fn bezier_point([p0, p1, p2, p3]: [Pos2; 4], t: f32) -> Pos2 {
    let u = 1.0 - t;
    let v = p0.to_vec2() * (u * u * u)
        + p1.to_vec2() * (3.0 * u * u * t)
        + p2.to_vec2() * (3.0 * u * t * t)
        + p3.to_vec2() * (t * t * t);
    v.to_pos2()
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn distance_to_curve(curve: [Pos2; 4], p: Pos2) -> f32 {
    const SAMPLES: usize = 24;
    (0..SAMPLES)
        .map(|i| {
            let a = bezier_point(curve, i as f32 / SAMPLES as f32);
            let b = bezier_point(curve, (i + 1) as f32 / SAMPLES as f32);
            distance_to_segment(p, a, b)
        })
        .fold(f32::INFINITY, f32::min)
}

/// First line of a label, shortened to fit a node
fn label_preview(text: &str) -> String {
    const MAX_CHARS: usize = 24;
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > MAX_CHARS {
        let short: String = line.chars().take(MAX_CHARS - 1).collect();
        format!("{}…", short)
    } else {
        line.to_string()
    }
}
