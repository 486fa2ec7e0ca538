use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::screen::identity::element_hash;
use crate::session::error::ExploreError;

// ============================================================================
// Element geometry
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    /// Tap target for this element.
    pub fn center(&self) -> (i32, i32) {
        ((self.left + self.right) / 2, (self.top + self.bottom) / 2)
    }
}

/// Parse the uiautomator bounds attribute format `[l,t][r,b]`.
///
/// Returns None for anything malformed — a node carrying a broken bounds
/// string is skipped rather than failing the whole dump.
pub fn parse_bounds(raw: &str) -> Option<Bounds> {
    let rest = raw.strip_prefix('[')?;
    let (first, rest) = rest.split_once("][")?;
    let second = rest.strip_suffix(']')?;

    let (left, top) = parse_pair(first)?;
    let (right, bottom) = parse_pair(second)?;

    Some(Bounds {
        left,
        top,
        right,
        bottom,
    })
}

fn parse_pair(raw: &str) -> Option<(i32, i32)> {
    let (a, b) = raw.split_once(',')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

// ============================================================================
// Interactive element catalog
// ============================================================================

/// One tappable affordance extracted from a UI dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveElement {
    /// Android widget class, e.g. `android.widget.Button`
    pub class: String,

    pub bounds: Bounds,

    pub clickable: bool,

    /// Identity scoped to the screen this element was observed on
    pub hash: String,
}

/// Count every widget node in a dump (anything carrying a class), before
/// any clickability or ignore filtering.
pub fn element_node_count(xml: &str) -> Result<usize, ExploreError> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| ExploreError::DumpParse {
        context: "uiautomator hierarchy".into(),
        detail: e.to_string(),
    })?;
    Ok(doc
        .descendants()
        .filter(|n| n.is_element() && n.has_attribute("class"))
        .count())
}

/// Extract the deduplicated clickable elements from a uiautomator dump.
///
/// Keeps nodes that carry a class, a parseable bounds attribute, and
/// `clickable="true"`; drops any whose class contains one of the configured
/// ignore substrings; collapses duplicate (class, bounds) dump nodes into a
/// single candidate. Each survivor is tagged with its element hash so the
/// interaction budget can look it up.
pub fn parse_elements(
    xml: &str,
    ignore_class_substrings: &[String],
    structural_hash: &str,
) -> Result<Vec<InteractiveElement>, ExploreError> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| ExploreError::DumpParse {
        context: "uiautomator hierarchy".into(),
        detail: e.to_string(),
    })?;

    let mut seen: HashSet<(String, Bounds)> = HashSet::new();
    let mut elements = Vec::new();

    for node in doc.descendants().filter(|n| n.is_element()) {
        let Some(class) = node.attribute("class") else {
            continue;
        };
        let Some(bounds) = node.attribute("bounds").and_then(parse_bounds) else {
            continue;
        };

        if node.attribute("clickable") != Some("true") {
            continue;
        }

        if ignore_class_substrings.iter().any(|s| class.contains(s)) {
            continue;
        }

        if !seen.insert((class.to_string(), bounds)) {
            continue;
        }

        elements.push(InteractiveElement {
            class: class.to_string(),
            bounds,
            clickable: true,
            hash: element_hash(structural_hash, class, &bounds),
        });
    }

    Ok(elements)
}
