use eframe::egui;
use flow_editor::{config, FlowEditor, FlowEditorApp, FlowGraph, NullStore};
use log::{info, warn};

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = config::load_config();
    let editor = FlowEditor::from_config(&config).unwrap_or_else(|e| {
        warn!("Could not open saved flow, starting empty: {:#}", e);
        FlowEditor::resume(FlowGraph::new(), Box::new(NullStore), &config)
    });
    info!("Flow editor starting, saving to {}", editor.store_description());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_title("Flow Editor"),
        ..Default::default()
    };

    eframe::run_native(
        "Flow Editor",
        options,
        Box::new(move |_cc| Ok(Box::new(FlowEditorApp::new(editor, config)))),
    )
}
