use std::collections::HashSet;

use serde::Serialize;

use crate::explorer::budget::InteractionBudget;
use crate::explorer::nav_graph::NavigationGraph;
use crate::session::settings::ExploreSettings;
use crate::trace::log_buffer::LogBuffer;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Running,
    Completed,
    Stopped,
    Error,
}

/// Everything one run accumulates. Built fresh on every `start`, mutated
/// only by the engine's single thread of control (the shared running flag
/// lives outside, as an atomic owned by the controller).
///
/// `seen_visual` is the novelty key; `seen_structural` exists only to scope
/// element identity. The two can disagree on what "the same screen" means —
/// both are kept so the disagreement shows up in logs instead of being
/// silently merged.
pub struct SessionState {
    pub device_id: String,
    pub package: String,
    pub settings: ExploreSettings,
    pub phase: SessionPhase,

    pub seen_structural: HashSet<String>,
    pub seen_visual: HashSet<String>,

    pub budget: InteractionBudget,
    pub graph: NavigationGraph,

    pub logs: LogBuffer,
}

impl SessionState {
    pub fn new(device_id: String, package: String, settings: ExploreSettings) -> Self {
        Self {
            device_id,
            package,
            settings,
            phase: SessionPhase::Idle,
            seen_structural: HashSet::new(),
            seen_visual: HashSet::new(),
            budget: InteractionBudget::new(),
            graph: NavigationGraph::new(),
            logs: LogBuffer::new(),
        }
    }

    /// Placeholder state before any session has started.
    pub fn idle() -> Self {
        Self::new(String::new(), String::new(), ExploreSettings::default())
    }

    pub fn unique_screen_count(&self) -> usize {
        self.graph.unique_screen_count()
    }
}

/// Aggregate view exposed to observers polling a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub running: bool,
    pub device_id: String,
    pub package: String,
    pub unique_screen_count: usize,
    pub max_screens: usize,
}
