use crate::{Edge, FlowGraph, Node, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Validation issue; every issue blocks saving
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub message: String,
    pub affected_nodes: Vec<NodeId>,
    pub issue_type: ValidationIssueType,
}

/// Types of validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationIssueType {
    /// Node is neither source nor target of any edge
    UnconnectedNode,
}

/// Complete validation result
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a new empty validation result
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Add an issue
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Nodes named by any issue, in issue order
    pub fn affected_nodes(&self) -> Vec<&NodeId> {
        self.issues
            .iter()
            .flat_map(|i| i.affected_nodes.iter())
            .collect()
    }

    /// Check if validation passed (no issues)
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Returns true when every node is the source or target of at least one edge.
/// An empty node list is valid.
pub fn is_valid_flow(nodes: &[Node], edges: &[Edge]) -> bool {
    nodes
        .iter()
        .all(|node| edges.iter().any(|edge| edge.involves(&node.id)))
}

/// Validator for flow graphs
pub struct Validator;

impl Validator {
    /// Run all validations over the node and edge collections
    pub fn validate(nodes: &[Node], edges: &[Edge]) -> ValidationResult {
        let mut result = ValidationResult::new();

        let connected: HashSet<&str> = edges
            .iter()
            .flat_map(|e| [e.source.as_str(), e.target.as_str()])
            .collect();

        for node in nodes {
            if !connected.contains(node.id.as_str()) {
                result.add_issue(ValidationIssue {
                    message: format!("Node '{}' has no connections", node.data.text),
                    affected_nodes: vec![node.id.clone()],
                    issue_type: ValidationIssueType::UnconnectedNode,
                });
            }
        }

        result
    }
}

/// Extension trait for FlowGraph to add validation
pub trait ValidatedFlow {
    /// Validate the graph
    fn validate(&self) -> ValidationResult;

    /// Quick yes/no check used by the save gate
    fn is_valid_flow(&self) -> bool;

    /// Get nodes with validation issues
    fn nodes_with_issues(&self, result: &ValidationResult) -> HashSet<NodeId>;
}

impl ValidatedFlow for FlowGraph {
    fn validate(&self) -> ValidationResult {
        Validator::validate(self.nodes(), self.edges())
    }

    fn is_valid_flow(&self) -> bool {
        is_valid_flow(self.nodes(), self.edges())
    }

    fn nodes_with_issues(&self, result: &ValidationResult) -> HashSet<NodeId> {
        result.affected_nodes().into_iter().cloned().collect()
    }
}
