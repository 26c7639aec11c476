mod canvas;
mod node_data_editor;
mod sidebar;

pub use canvas::{CanvasEvent, CanvasInput, CanvasState, ZOOM_STEP};
pub use node_data_editor::DataEditorAction;

use crate::{
    config::{self, EditorConfig},
    validation::ValidatedFlow,
    FlowEditor, NodeId, NotificationLevel, PanelState,
};
use egui::{Align2, Color32, Key, Modifiers, Vec2};
use log::debug;
use std::collections::HashSet;

/// Main application state
pub struct FlowEditorApp {
    /// Editing session: graph, id generator, store
    editor: FlowEditor,

    /// Settings the app was started with; view toggles are written back
    config: EditorConfig,

    /// Pan/zoom and in-progress canvas gestures
    canvas: CanvasState,

    /// Frame the flow once the canvas has been laid out
    fit_pending: bool,

    /// Outline nodes that would block a save
    show_validation: bool,

    /// Nodes that would block a save
    validation_issues: HashSet<NodeId>,

    /// Status message
    status_message: String,
}

impl Default for FlowEditorApp {
    fn default() -> Self {
        Self::new(FlowEditor::new(), EditorConfig::default())
    }
}

impl FlowEditorApp {
    pub fn new(editor: FlowEditor, config: EditorConfig) -> Self {
        let status_message = format!("Saving to {}", editor.store_description());
        Self {
            editor,
            config,
            canvas: CanvasState::new(),
            fit_pending: true,
            show_validation: true,
            validation_issues: HashSet::new(),
            status_message,
        }
    }

    pub fn editor(&self) -> &FlowEditor {
        &self.editor
    }

    fn save_flow(&mut self) {
        let notification = self.editor.save();
        self.status_message = match notification.level {
            NotificationLevel::Success => format!("✓ {}", notification.title),
            NotificationLevel::Failure => format!("❌ {}", notification.title),
        };
    }

    fn handle_editor_action(&mut self, action: DataEditorAction) {
        match action {
            DataEditorAction::Save => self.save_flow(),
            DataEditorAction::Unselect => self.editor.unselect(),
        }
    }

    fn zoom_range(&self) -> (f32, f32) {
        (self.config.min_zoom, self.config.max_zoom)
    }

    fn fit_view(&mut self) {
        let range = self.zoom_range();
        self.canvas.fit_view(self.editor.nodes(), range);
    }

    fn zoom_by(&mut self, factor: f32) {
        let range = self.zoom_range();
        self.canvas.zoom_by(factor, range);
    }

    fn new_flow(&mut self) {
        self.editor.reset_session();
        self.canvas.viewport.reset();
        self.status_message = "New flow".to_string();
    }

    /// Render the entire UI
    fn render_ui(&mut self, ctx: &egui::Context) {
        let blocked = self.editor.notification().is_some();

        if self.show_validation {
            let result = self.editor.graph().validate();
            self.validation_issues = self.editor.graph().nodes_with_issues(&result);
        } else {
            self.validation_issues.clear();
        }

        if !blocked {
            self.handle_shortcuts(ctx);
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                egui::menu::bar(ui, |ui| {
                    ui.menu_button("File", |ui| {
                        if ui.button("New Flow").clicked() {
                            self.new_flow();
                            ui.close_menu();
                        }
                        if ui.button("Save").clicked() {
                            self.save_flow();
                            ui.close_menu();
                        }
                        if ui.button("Quit").clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });

                    ui.menu_button("View", |ui| {
                        if ui.checkbox(&mut self.config.show_grid, "Show Grid").changed() {
                            config::save_config(&self.config);
                        }
                        ui.checkbox(&mut self.show_validation, "Highlight Unconnected Nodes");
                        ui.separator();
                        if ui.button("Zoom In").clicked() {
                            self.zoom_by(ZOOM_STEP);
                            ui.close_menu();
                        }
                        if ui.button("Zoom Out").clicked() {
                            self.zoom_by(1.0 / ZOOM_STEP);
                            ui.close_menu();
                        }
                        if ui.button("Fit View").clicked() {
                            self.fit_view();
                            ui.close_menu();
                        }
                        if ui.button("Reset Zoom").clicked() {
                            self.canvas.viewport.reset();
                            ui.close_menu();
                        }
                    });

                    ui.menu_button("Help", |ui| {
                        ui.label("Drag node types from the panel onto the canvas");
                        ui.label("Drag from an output handle to an input handle to connect");
                        ui.label("Click a node to edit it, Delete to remove");
                        ui.label("Scroll to zoom, drag empty space to pan");
                        ui.label("Every node needs a connection before saving");
                    });
                });
            });
        });

        // Toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("💾 save changes").clicked() {
                        self.save_flow();
                    }

                    ui.separator();

                    if ui.small_button("➕").on_hover_text("Zoom in").clicked() {
                        self.zoom_by(ZOOM_STEP);
                    }
                    if ui.small_button("➖").on_hover_text("Zoom out").clicked() {
                        self.zoom_by(1.0 / ZOOM_STEP);
                    }
                    if ui.small_button("⛶").on_hover_text("Fit view").clicked() {
                        self.fit_view();
                    }

                    ui.separator();

                    // Stats
                    ui.label(format!("Nodes: {}", self.editor.graph().node_count()));
                    ui.label(format!("Edges: {}", self.editor.graph().edge_count()));
                    ui.label(format!("Zoom: {:.0}%", self.canvas.viewport.zoom * 100.0));

                    let unconnected = self.validation_issues.len();
                    if unconnected > 0 {
                        ui.separator();
                        ui.colored_label(Color32::RED, format!("❌ {} unconnected", unconnected));
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status_message);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(self.editor.store_description());
                });
            });
        });

        // Right panel: node palette or data editor
        let action = egui::SidePanel::right("side_panel")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.add_enabled_ui(!blocked, |ui| match self.editor.panel() {
                    PanelState::Browsing => {
                        sidebar::show(ui, &self.editor);
                        None
                    }
                    PanelState::Editing {
                        node_id,
                        selected_count,
                    } => node_data_editor::show(
                        ui,
                        &mut self.editor,
                        &node_id,
                        selected_count,
                        &mut self.status_message,
                    ),
                })
                .inner
            })
            .inner;
        if let Some(action) = action {
            self.handle_editor_action(action);
        }

        // Central panel (canvas)
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let input = CanvasInput {
                    nodes: self.editor.nodes(),
                    edges: self.editor.edges(),
                    issues: &self.validation_issues,
                    drag_format: self.editor.drag_format(),
                    show_grid: self.config.show_grid,
                    zoom_range: self.zoom_range(),
                    interactive: !blocked,
                };
                let events = self.canvas.show(ui, &input);
                self.apply_canvas_events(events);
            });

        if std::mem::take(&mut self.fit_pending) {
            self.fit_view();
            ctx.request_repaint();
        }

        self.render_notification(ctx);
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::S)) {
            self.save_flow();
        }
        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(Key::Escape)) {
            self.handle_editor_action(DataEditorAction::Unselect);
        }
    }

    /// Dispatch canvas gestures to the editor handlers, one at a time
    fn apply_canvas_events(&mut self, events: Vec<CanvasEvent>) {
        for event in events {
            match event {
                CanvasEvent::Nodes(changes) => self.editor.on_nodes_change(changes),
                CanvasEvent::Edges(changes) => self.editor.on_edges_change(changes),
                CanvasEvent::Connect(connection) => match self.editor.on_connect(connection) {
                    Ok(edge) => {
                        self.status_message = format!("Connected {} → {}", edge.source, edge.target);
                    }
                    Err(e) => {
                        self.status_message = format!("⚠ {}", e);
                    }
                },
                CanvasEvent::Drop { payload, point } => {
                    match self
                        .editor
                        .on_drop(Some(payload.as_ref()), point, &self.canvas.viewport)
                    {
                        Some(id) => self.status_message = format!("Added {}", id),
                        None => debug!("Drop ignored"),
                    }
                }
            }
        }
    }

    /// Blocking acknowledgement of the last save
    fn render_notification(&mut self, ctx: &egui::Context) {
        let Some(notification) = self.editor.notification().cloned() else {
            return;
        };

        // Dim everything behind the dialog
        ctx.layer_painter(egui::LayerId::new(
            egui::Order::Middle,
            egui::Id::new("notification_backdrop"),
        ))
        .rect_filled(ctx.screen_rect(), 0.0, Color32::from_black_alpha(96));

        let color = match notification.level {
            NotificationLevel::Success => Color32::from_rgb(0, 150, 0),
            NotificationLevel::Failure => Color32::RED,
        };

        let mut dismissed = false;
        egui::Window::new("Save")
            .order(egui::Order::Foreground)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.colored_label(color, &notification.title);
                if let Some(detail) = &notification.detail {
                    ui.label(detail);
                }
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });

        if dismissed || ctx.input(|i| i.key_pressed(Key::Enter) || i.key_pressed(Key::Escape)) {
            self.editor.dismiss_notification();
        }
    }
}

impl eframe::App for FlowEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_ui(ctx);
    }
}
