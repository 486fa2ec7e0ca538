use serde::Serialize;

use crate::explorer::nav_graph::GraphSnapshot;
use crate::screen::screen_model::Screen;
use crate::trace::log_buffer::LogEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub percentage: u32,
    pub screen_count: usize,
    pub max_screens: usize,
}

// ============================================================================
// ExplorationObserver trait — the event surface consumed by front ends
// ============================================================================

/// Callbacks fired by a running session. All methods default to no-ops so
/// observers implement only what they care about. Artifact persistence is
/// the observer's job — the core hands over screenshots and dumps through
/// `on_new_screen` and never touches disk itself.
pub trait ExplorationObserver {
    fn on_new_screen(&mut self, _screen: &Screen) {}

    fn on_progress(&mut self, _progress: &Progress) {}

    fn on_log(&mut self, _entry: &LogEntry) {}

    fn on_complete(&mut self) {}

    fn on_error(&mut self, _message: &str) {}

    fn on_graph_snapshot(&mut self, _snapshot: &GraphSnapshot) {}
}

/// Observer that ignores every event.
pub struct NullObserver;

impl ExplorationObserver for NullObserver {}
