use serde::{Deserialize, Serialize};

/// Action-selection strategy. Only the randomized baseline is built in;
/// the field is a hint so alternative policies can slot in later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Random,
}

/// Knobs recognized by a session.
///
/// Termination is driven purely by `max_screens`, `max_depth`, an explicit
/// stop, or an unrecoverable error — there is no wall-clock timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExploreSettings {
    /// Stop the session once this many unique visual states are known
    #[serde(default = "default_max_screens")]
    pub max_screens: usize,

    /// Observe but do not act once a branch reaches this depth
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Settle delay after a tap or relaunch, milliseconds
    #[serde(default = "default_screen_delay")]
    pub screen_delay_ms: u64,

    /// Settle delay after a back event; falls back to `screen_delay_ms`
    #[serde(default)]
    pub back_delay_ms: Option<u64>,

    /// Class-name substrings excluded from interaction
    #[serde(default = "default_ignore")]
    pub ignore_elements: Vec<String>,

    /// Relaunch the target app whenever the foreground leaves it
    #[serde(default)]
    pub stay_in_app: bool,

    #[serde(default)]
    pub mode: SelectionMode,

    /// Fixed RNG seed for reproducible action orderings
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ExploreSettings {
    pub fn back_delay(&self) -> u64 {
        self.back_delay_ms.unwrap_or(self.screen_delay_ms)
    }
}

impl Default for ExploreSettings {
    fn default() -> Self {
        Self {
            max_screens: default_max_screens(),
            max_depth: default_max_depth(),
            screen_delay_ms: default_screen_delay(),
            back_delay_ms: None,
            ignore_elements: default_ignore(),
            stay_in_app: false,
            mode: SelectionMode::Random,
            seed: None,
        }
    }
}

// Serde default helpers
fn default_max_screens() -> usize { 20 }
fn default_max_depth() -> usize { 5 }
fn default_screen_delay() -> u64 { 1500 }
fn default_ignore() -> Vec<String> { vec!["ImageView".to_string()] }
