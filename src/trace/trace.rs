use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// One step of an exploration session, as written to the JSONL trace.
///
/// Flat record with optional fields so every event kind serializes through
/// the same shape: `session_start`, `screen`, `tap`, `back`, `relaunch`,
/// `session_end`.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub kind: String,

    /// Visual hash of the screen the event refers to, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TraceEvent {
    pub fn now(kind: impl Into<String>) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis(),
            kind: kind.into(),
            screen: None,
            depth: None,
            x: None,
            y: None,
            detail: None,
        }
    }

    pub fn with_screen(mut self, visual_hash: &str) -> Self {
        self.screen = Some(visual_hash.to_string());
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}
