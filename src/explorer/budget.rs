use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::screen::elements::InteractiveElement;

/// Per-element tap cap for one session. Bounds loops on self-referential UI.
pub const CLICK_BUDGET: u32 = 3;

#[derive(Debug, PartialEq, Eq)]
pub enum BudgetDecision {
    Allow,
    Exhausted,
}

/// Session-scoped click accounting, keyed by element hash.
///
/// Element hashes already fold in the screen's structural hash, so the same
/// class+bounds on two different screens spend independent budgets.
#[derive(Debug, Default)]
pub struct InteractionBudget {
    clicks: HashMap<String, u32>,
}

impl InteractionBudget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_click(&mut self, element_hash: &str) {
        *self.clicks.entry(element_hash.to_string()).or_insert(0) += 1;
    }

    /// 0 for elements never seen.
    pub fn click_count(&self, element_hash: &str) -> u32 {
        self.clicks.get(element_hash).copied().unwrap_or(0)
    }

    pub fn check(&self, element_hash: &str) -> BudgetDecision {
        if self.click_count(element_hash) >= CLICK_BUDGET {
            BudgetDecision::Exhausted
        } else {
            BudgetDecision::Allow
        }
    }

    /// Order the current catalog into a try-list.
    ///
    /// Never-clicked elements all come first, in randomized order, so every
    /// fresh affordance gets an attempt before effort goes to re-tries. A
    /// bounded tail of under-budget, previously-clicked elements (at most
    /// `max(3, 30%)` of that bucket, also randomized) allows second-order
    /// states to surface without degenerating into a random walk on one
    /// control. Exhausted elements are excluded entirely.
    ///
    /// Ordering is intentionally non-deterministic; callers hold the RNG so
    /// a fixed seed reproduces a specific ordering.
    pub fn build_try_list(
        &self,
        elements: &[InteractiveElement],
        rng: &mut StdRng,
    ) -> Vec<InteractiveElement> {
        let mut fresh: Vec<InteractiveElement> = Vec::new();
        let mut retry: Vec<InteractiveElement> = Vec::new();

        for element in elements {
            match self.click_count(&element.hash) {
                0 => fresh.push(element.clone()),
                n if n < CLICK_BUDGET => retry.push(element.clone()),
                _ => {}
            }
        }

        fresh.shuffle(rng);
        retry.shuffle(rng);

        let retry_cap = (retry.len() * 3 / 10).max(3).min(retry.len());
        fresh.extend(retry.into_iter().take(retry_cap));
        fresh
    }
}
