use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::screen::screen_model::{Screen, ScreenSummary};

// ============================================================================
// Graph data model
// ============================================================================

/// A directed transition between two visual states.
///
/// Direction matters — the graph never collapses A→B with B→A. Repeats of
/// the same ordered pair increment `count` instead of duplicating the edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub count: u32,
}

/// Accumulated map of unique screens and observed transitions.
///
/// Nodes are keyed by visual hash and kept in discovery order (depth-first
/// pre-order of the actual navigation performed).
#[derive(Debug, Default)]
pub struct NavigationGraph {
    nodes: HashMap<String, Screen>,
    node_order: Vec<String>,
    edges: Vec<Edge>,
    edge_index: HashMap<(String, String), usize>,
}

impl NavigationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a screen as a node. Idempotent by visual hash: re-adding an
    /// existing hash keeps the original screen and evidence.
    pub fn add_node(&mut self, screen: Screen) {
        if self.nodes.contains_key(&screen.visual_hash) {
            return;
        }
        self.node_order.push(screen.visual_hash.clone());
        self.nodes.insert(screen.visual_hash.clone(), screen);
    }

    /// Record one observed transition. A repeated (from, to) pair bumps the
    /// occurrence counter on the existing edge.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let key = (from.to_string(), to.to_string());
        match self.edge_index.get(&key) {
            Some(&i) => self.edges[i].count += 1,
            None => {
                self.edge_index.insert(key, self.edges.len());
                self.edges.push(Edge {
                    from: from.to_string(),
                    to: to.to_string(),
                    count: 1,
                });
            }
        }
    }

    pub fn unique_screen_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn has_node(&self, visual_hash: &str) -> bool {
        self.nodes.contains_key(visual_hash)
    }

    pub fn node(&self, visual_hash: &str) -> Option<&Screen> {
        self.nodes.get(visual_hash)
    }

    pub fn edge_count(&self, from: &str, to: &str) -> u32 {
        self.edge_index
            .get(&(from.to_string(), to.to_string()))
            .map(|&i| self.edges[i].count)
            .unwrap_or(0)
    }

    /// Screens in discovery order.
    pub fn screens(&self) -> impl Iterator<Item = &Screen> {
        self.node_order.iter().filter_map(|h| self.nodes.get(h))
    }

    /// Serializable view for external renderers: node summaries in discovery
    /// order plus counted edges. Raw screenshot/dump bytes are not included.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.screens().map(Screen::summary).collect(),
            edges: self.edges.clone(),
            unique_screen_count: self.nodes.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<ScreenSummary>,
    pub edges: Vec<Edge>,
    pub unique_screen_count: usize,
}
