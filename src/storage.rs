use crate::{Edge, FlowDocument, FlowGraph, FlowStore, GraphEvent, Node, PersistenceError};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use ulid::Ulid;

/// Project manifest containing metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    /// Stable identity of the flow across saves
    pub flow_id: Ulid,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Manifest {
    /// Create a new manifest
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            version: "0.1.0".to_string(),
            flow_id: Ulid::new(),
            created: now,
            modified: now,
        }
    }

    /// Update the modified timestamp
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    /// Save manifest to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)
            .with_context(|| format!("Failed to serialize manifest for: {}", path.display()))?;
        write_replacing(path, &bytes)
    }

    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open manifest file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse manifest from: {}", path.display()))
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

/// On-disk shape of flow.json
#[derive(Debug, Serialize, Deserialize)]
struct SerializableFlow {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

/// Directory-backed flow store.
///
/// Layout: `manifest.json`, `flow.json` and an append-only `events.jsonl`.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Root directory of the project
    root_dir: PathBuf,
}

impl FileStore {
    /// Create a new project at the given path
    pub fn create(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create project directory: {}", path.display()))?;

        let store = Self {
            root_dir: path.to_path_buf(),
        };

        Manifest::new().save(&store.manifest_path())?;
        store.write_flow(&[], &[])?;

        File::create(store.events_path()).with_context(|| {
            format!(
                "Failed to create events.jsonl: {}",
                store.events_path().display()
            )
        })?;

        Ok(store)
    }

    /// Open an existing project
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow!("Project directory does not exist: {}", path.display()));
        }

        let store = Self {
            root_dir: path.to_path_buf(),
        };

        if !store.manifest_path().exists() {
            return Err(anyhow!("manifest.json not found in project directory"));
        }
        if !store.flow_path().exists() {
            return Err(anyhow!("flow.json not found in project directory"));
        }

        Ok(store)
    }

    /// Open the project at `path`, creating it if missing
    pub fn open_or_create(path: &Path) -> Result<Self> {
        if path.join("manifest.json").exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Get the root directory
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get path to manifest.json
    pub fn manifest_path(&self) -> PathBuf {
        self.root_dir.join("manifest.json")
    }

    /// Get path to flow.json
    pub fn flow_path(&self) -> PathBuf {
        self.root_dir.join("flow.json")
    }

    /// Get path to events.jsonl
    pub fn events_path(&self) -> PathBuf {
        self.root_dir.join("events.jsonl")
    }

    /// Load manifest
    pub fn load_manifest(&self) -> Result<Manifest> {
        Manifest::load(&self.manifest_path())
    }

    fn write_flow(&self, nodes: &[Node], edges: &[Edge]) -> Result<()> {
        let flow_path = self.flow_path();
        let serializable = SerializableFlow {
            nodes: nodes.to_vec(),
            edges: edges.to_vec(),
        };

        let bytes = serde_json::to_vec_pretty(&serializable)
            .with_context(|| format!("Failed to serialize flow.json: {}", flow_path.display()))?;
        write_replacing(&flow_path, &bytes)
    }

    /// Load the graph from flow.json
    pub fn load_flow(&self) -> Result<FlowGraph> {
        let flow_path = self.flow_path();

        let file = File::open(&flow_path)
            .with_context(|| format!("Failed to open flow.json: {}", flow_path.display()))?;
        let reader = BufReader::new(file);

        let serializable: SerializableFlow = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse flow.json: {}", flow_path.display()))?;

        Ok(FlowGraph::from_parts(serializable.nodes, serializable.edges))
    }

    /// Append events to events.jsonl
    pub fn append_events(&self, events: &[GraphEvent]) -> Result<()> {
        let events_path = self.events_path();

        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&events_path)
            .with_context(|| format!("Failed to open events.jsonl: {}", events_path.display()))?;

        let mut writer = BufWriter::new(file);

        for event in events {
            let json = serde_json::to_string(event).with_context(|| {
                format!("Failed to serialize event: {}", events_path.display())
            })?;
            writeln!(writer, "{}", json).with_context(|| {
                format!("Failed to write event to: {}", events_path.display())
            })?;
        }

        writer
            .flush()
            .with_context(|| format!("Failed to flush events.jsonl: {}", events_path.display()))?;

        Ok(())
    }

    /// Load all events from events.jsonl
    pub fn load_events(&self) -> Result<Vec<GraphEvent>> {
        let events_path = self.events_path();

        if !events_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&events_path)
            .with_context(|| format!("Failed to open events.jsonl: {}", events_path.display()))?;
        let reader = BufReader::new(file);

        let mut events = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| {
                format!(
                    "Failed to read line {} from: {}",
                    line_num + 1,
                    events_path.display()
                )
            })?;

            // Skip empty lines
            if line.trim().is_empty() {
                continue;
            }

            let event: GraphEvent = serde_json::from_str(&line).with_context(|| {
                format!(
                    "Failed to parse event on line {} from: {}",
                    line_num + 1,
                    events_path.display()
                )
            })?;

            events.push(event);
        }

        Ok(events)
    }

    /// Save complete project state (manifest, flow and events)
    ///
    /// A manifest that cannot be read fails the save before anything is written,
    /// so the flow keeps its identity.
    pub fn save(&self, flow: &FlowDocument<'_>) -> Result<()> {
        let mut manifest = self.load_manifest()?;
        manifest.touch();

        self.write_flow(flow.nodes, flow.edges)?;
        self.append_events(flow.events)?;
        manifest.save(&self.manifest_path())?;

        Ok(())
    }
}

/// Write `bytes` next to `path` and rename over it, so readers see either the
/// old file or the new one.
fn write_replacing(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, bytes)
        .with_context(|| format!("Failed to write temporary file: {}", tmp_path.display()))?;
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        let context = format!("Failed to replace: {}", path.display());
        return Err(anyhow::Error::new(err).context(context));
    }
    Ok(())
}

impl FlowStore for FileStore {
    fn persist(&mut self, flow: &FlowDocument<'_>) -> Result<(), PersistenceError> {
        self.save(flow)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.root_dir.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Connection, EventType, NodeData, NodeKind, Position};
    use tempfile::TempDir;

    fn sample_graph() -> FlowGraph {
        let mut graph = FlowGraph::new();
        graph.add_node(Node::new(
            "dndnode_0",
            NodeKind::Input,
            Position::new(0.0, 0.0),
            NodeData::text("Start"),
        ));
        graph.add_node(Node::new(
            "dndnode_1",
            NodeKind::Output,
            Position::new(200.0, 0.0),
            NodeData::text("End"),
        ));
        graph
            .connect(Connection::new("dndnode_0", "dndnode_1"))
            .unwrap();
        graph
    }

    fn document(graph: &FlowGraph) -> FlowDocument<'_> {
        FlowDocument {
            nodes: graph.nodes(),
            edges: graph.edges(),
            events: graph.events(),
        }
    }

    #[test]
    fn test_manifest_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let manifest_path = temp_dir.path().join("manifest.json");

        let manifest = Manifest::new();
        manifest.save(&manifest_path).unwrap();
        let loaded = Manifest::load(&manifest_path).unwrap();

        assert_eq!(loaded.version, "0.1.0");
        assert_eq!(loaded.flow_id, manifest.flow_id);
    }

    #[test]
    fn test_project_create() {
        let temp_dir = TempDir::new().unwrap();
        let project_path = temp_dir.path().join("test_project");

        let store = FileStore::create(&project_path).unwrap();

        assert!(store.manifest_path().exists());
        assert!(store.flow_path().exists());
        assert!(store.events_path().exists());
        assert_eq!(store.load_flow().unwrap().node_count(), 0);
    }

    #[test]
    fn test_open_missing_project() {
        let temp_dir = TempDir::new().unwrap();
        assert!(FileStore::open(&temp_dir.path().join("nope")).is_err());
        assert!(FileStore::open(temp_dir.path()).is_err());
    }

    #[test]
    fn test_save_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::create(&temp_dir.path().join("flow")).unwrap();
        let flow_id = store.load_manifest().unwrap().flow_id;

        let graph = sample_graph();
        store.persist(&document(&graph)).unwrap();

        let loaded = store.load_flow().unwrap();
        assert_eq!(loaded.nodes(), graph.nodes());
        assert_eq!(loaded.edges(), graph.edges());
        assert!(loaded.events().is_empty());

        // Flow identity survives saves
        assert_eq!(store.load_manifest().unwrap().flow_id, flow_id);
    }

    #[test]
    fn test_event_logging() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::create(&temp_dir.path().join("flow")).unwrap();

        let graph = sample_graph();
        store.append_events(graph.events()).unwrap();
        store.append_events(graph.events()).unwrap();

        let loaded_events = store.load_events().unwrap();
        assert_eq!(loaded_events.len(), graph.events().len() * 2);
        assert!(matches!(loaded_events[0].event, EventType::NodeAdded { .. }));
    }

    #[test]
    fn test_open_or_create_reuses_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flow");

        let first = FileStore::open_or_create(&path).unwrap();
        let flow_id = first.load_manifest().unwrap().flow_id;
        let second = FileStore::open_or_create(&path).unwrap();

        assert_eq!(second.load_manifest().unwrap().flow_id, flow_id);
    }

    #[test]
    fn test_corrupted_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let manifest_path = temp_dir.path().join("manifest.json");

        fs::write(&manifest_path, "{ invalid json }").unwrap();

        assert!(Manifest::load(&manifest_path).is_err());
    }

    #[test]
    fn test_corrupted_flow() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::create(&temp_dir.path().join("flow")).unwrap();

        fs::write(store.flow_path(), "{ invalid json }").unwrap();

        assert!(store.load_flow().is_err());
    }

    #[test]
    fn test_save_with_unreadable_manifest_keeps_flow() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::create(&temp_dir.path().join("flow")).unwrap();
        let flow_before = fs::read_to_string(store.flow_path()).unwrap();
        fs::write(store.manifest_path(), "{ invalid json }").unwrap();

        let graph = sample_graph();
        assert!(store.persist(&document(&graph)).is_err());

        assert_eq!(fs::read_to_string(store.flow_path()).unwrap(), flow_before);
        assert!(store.load_events().unwrap().is_empty());
        // The broken manifest is reported, not replaced by a fresh flow id
        assert!(store.load_manifest().is_err());
    }

    #[test]
    fn test_save_leaves_no_temporary_files() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::create(&temp_dir.path().join("flow")).unwrap();

        let graph = sample_graph();
        store.persist(&document(&graph)).unwrap();
        store.persist(&document(&graph)).unwrap();

        let mut names: Vec<String> = fs::read_dir(store.root_dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["events.jsonl", "flow.json", "manifest.json"]);
    }

    #[test]
    fn test_unwritable_root_is_persistence_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::create(&temp_dir.path().join("flow")).unwrap();
        fs::remove_dir_all(store.root_dir()).unwrap();

        let graph = sample_graph();
        let err = store.persist(&document(&graph)).unwrap_err();
        assert!(matches!(err, PersistenceError::Other(_)));
    }
}
