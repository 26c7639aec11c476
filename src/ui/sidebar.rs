use crate::{FlowEditor, NodeKind};
use egui::{Color32, RichText, Stroke};

/// Palette of node types; each entry is a drag source carrying the kind's payload
pub fn show(ui: &mut egui::Ui, editor: &FlowEditor) {
    ui.heading("Nodes");
    ui.label("Drag a node onto the canvas");
    ui.separator();

    for kind in NodeKind::ALL {
        let payload = editor.on_drag_start(kind);
        let id = egui::Id::new("node_palette").with(kind.type_name());
        ui.dnd_drag_source(id, payload, |ui| palette_entry(ui, kind));
        ui.add_space(6.0);
    }
}

fn palette_entry(ui: &mut egui::Ui, kind: NodeKind) {
    let renderer = kind.renderer();
    let [r, g, b] = renderer.accent();

    egui::Frame::none()
        .fill(Color32::from_rgb(r, g, b).linear_multiply(0.35))
        .stroke(Stroke::new(1.0, Color32::from_rgb(r, g, b)))
        .rounding(4.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(RichText::new(renderer.title()).strong());
            ui.label(RichText::new(kind.type_name()).small().weak());
        });
}
