use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// One classified observation of the device display.
///
/// Created once per capture and never mutated; the navigation graph owns it
/// once it is classified as a new visual state.
#[derive(Debug, Clone)]
pub struct Screen {
    pub structural_hash: String,
    pub visual_hash: String,

    /// Foreground activity at capture time, `package/activity` form
    pub activity: String,

    pub screenshot: Vec<u8>,
    pub ui_dump: String,

    pub element_count: usize,
    pub clickable_count: usize,

    pub captured_at_ms: u128,

    /// Hops from the session's entry screen
    pub depth: usize,

    /// True iff this visual hash had not been seen earlier in the session
    pub new_visual_state: bool,
}

impl Screen {
    pub fn summary(&self) -> ScreenSummary {
        ScreenSummary {
            structural_hash: self.structural_hash.clone(),
            visual_hash: self.visual_hash.clone(),
            activity: self.activity.clone(),
            element_count: self.element_count,
            clickable_count: self.clickable_count,
            captured_at_ms: self.captured_at_ms,
            depth: self.depth,
        }
    }
}

pub fn capture_timestamp_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Graph-snapshot view of a screen: everything but the raw evidence bytes,
/// which observers receive through `on_new_screen` and persist themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSummary {
    pub structural_hash: String,
    pub visual_hash: String,
    pub activity: String,
    pub element_count: usize,
    pub clickable_count: usize,
    pub captured_at_ms: u128,
    pub depth: usize,
}
