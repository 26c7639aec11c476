use crate::FlowEditor;
use anyhow::Result;
use arboard::Clipboard;
use egui::{Color32, RichText};

/// Buttons of the data editor that the app carries out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEditorAction {
    Save,
    Unselect,
}

/// Data editor for the selected node.
///
/// Text edits are written back on every change. Saving and unselecting are
/// returned to the caller so they share the app's save path.
pub fn show(
    ui: &mut egui::Ui,
    editor: &mut FlowEditor,
    node_id: &str,
    selected_count: usize,
    status_message: &mut String,
) -> Option<DataEditorAction> {
    let mut action = None;

    // Clone what we need before any mutation
    let Some((kind, position, mut text, extra)) = editor
        .graph()
        .node(node_id)
        .map(|n| (n.kind, n.position, n.data.text.clone(), n.data.extra.clone()))
    else {
        ui.label("Node no longer exists");
        return None;
    };

    ui.horizontal(|ui| {
        if ui.button("⬅").on_hover_text("Unselect").clicked() {
            action = Some(DataEditorAction::Unselect);
        }
        ui.heading(kind.renderer().title());
    });
    ui.separator();

    if selected_count > 1 {
        ui.colored_label(
            Color32::from_rgb(255, 165, 0),
            format!("{} nodes selected, editing {}", selected_count, node_id),
        );
        ui.add_space(4.0);
    }

    ui.label(RichText::new("Text").strong());
    let response = ui.add(
        egui::TextEdit::multiline(&mut text)
            .desired_width(f32::INFINITY)
            .desired_rows(4),
    );
    if response.changed() {
        if let Err(e) = editor.update_node_text(node_id, text) {
            *status_message = format!("❌ {}", e);
        }
    }

    ui.add_space(8.0);
    egui::Grid::new("node_details").num_columns(2).show(ui, |ui| {
        ui.label("ID:");
        ui.horizontal(|ui| {
            ui.monospace(node_id);
            if ui.small_button("📋").on_hover_text("Copy ID").clicked() {
                *status_message = match copy_to_clipboard(node_id) {
                    Ok(()) => format!("Copied {}", node_id),
                    Err(e) => format!("❌ Copy failed: {}", e),
                };
            }
        });
        ui.end_row();

        ui.label("Type:");
        ui.label(kind.type_name());
        ui.end_row();

        ui.label("Position:");
        ui.label(format!("({:.0}, {:.0})", position.x, position.y));
        ui.end_row();

        for (key, value) in &extra {
            ui.label(format!("{}:", key));
            ui.label(value.to_string());
            ui.end_row();
        }
    });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        if ui.button("💾 save changes").clicked() {
            action = Some(DataEditorAction::Save);
        }
        if ui.button("Unselect").clicked() {
            action = Some(DataEditorAction::Unselect);
        }
    });

    action
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text)?;
    Ok(())
}
