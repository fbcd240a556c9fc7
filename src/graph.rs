use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub group: usize,
}

/// Weighted edge between two node indices.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

/// Node/link graph in the `{"nodes": [...], "links": [...]}` layout.
#[derive(Debug, Clone, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Graph {
    pub fn from_path(path: &Path) -> Result<Self> {
        let data =
            fs::read_to_string(path).with_context(|| format!("Failed reading {}", path.display()))?;
        let graph: Graph = serde_json::from_str(&data)
            .with_context(|| format!("Failed parsing graph JSON {}", path.display()))?;
        tracing::info!(
            "Loaded graph with {} nodes and {} links from {}",
            graph.nodes.len(),
            graph.links.len(),
            path.display()
        );
        Ok(graph)
    }

    pub fn node_names(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.name.clone()).collect()
    }

    /// Node names ordered by group, keeping input order within a group.
    pub fn names_by_group(&self) -> Vec<String> {
        let mut nodes: Vec<&Node> = self.nodes.iter().collect();
        nodes.sort_by_key(|n| n.group);
        nodes.into_iter().map(|n| n.name.clone()).collect()
    }
}
