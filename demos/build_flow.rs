//! Builds a small flow without a window, saves it and reloads it.
//!
//! Usage: `cargo run --example build_flow [PROJECT_DIR]`

use anyhow::Result;
use flow_editor::{
    Connection, EditorConfig, FileStore, FlowEditor, NodeChange, NodeKind, ScreenPoint,
    ValidatedFlow, Viewport,
};
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::init();

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("flow_editor_demo"));

    println!("Flow Editor - headless demo");
    println!("===========================\n");

    let store = FileStore::open_or_create(&dir)?;
    let mut editor = FlowEditor::with_store(Box::new(store));
    let viewport = Viewport::default();

    // Drop three nodes the way the sidebar would
    let mut ids = Vec::new();
    for (i, kind) in NodeKind::ALL.into_iter().enumerate() {
        let payload = editor.on_drag_start(kind);
        let point = ScreenPoint::new(60.0 + 260.0 * i as f32, 120.0);
        if let Some(id) = editor.on_drop(Some(&payload), point, &viewport) {
            println!("✓ Dropped {} node as {}", kind, id);
            ids.push(id);
        }
    }

    // Saving now fails: nothing is connected yet
    let notification = editor.save().clone();
    println!("\n💾 {}", notification.title);
    if let Some(detail) = &notification.detail {
        println!("   {}", detail);
    }
    editor.dismiss_notification();

    for pair in ids.windows(2) {
        let edge = editor.on_connect(Connection::new(pair[0].clone(), pair[1].clone()))?;
        println!("✓ Connected {}", edge.id);
    }

    // Edit the message node through the data editor path
    if let Some(message) = ids.get(1) {
        editor.on_nodes_change(vec![NodeChange::Select {
            id: message.clone(),
            selected: true,
        }]);
        editor.update_node_text(message, "Hello from the demo")?;
        editor.unselect();
    }

    let issues = editor.graph().validate();
    println!("\n🔍 Validation issues: {}", issues.issues.len());

    println!("💾 {}", editor.save().title);
    editor.dismiss_notification();

    // Reload the project and keep numbering where the session left off
    let config = EditorConfig {
        save_dir: Some(dir.clone()),
        ..Default::default()
    };
    let mut resumed = FlowEditor::from_config(&config)?;
    let payload = resumed.on_drag_start(NodeKind::Message);
    let next = resumed.on_drop(Some(&payload), ScreenPoint::new(60.0, 300.0), &viewport);

    println!("\n📊 Reloaded from {}", dir.display());
    println!("  └─ Nodes: {}", resumed.nodes().len());
    println!("  └─ Edges: {}", resumed.edges().len());
    println!("  └─ Next id: {}", next.unwrap_or_default());

    Ok(())
}
