use sha1::{Digest, Sha1};

use crate::screen::elements::Bounds;

/// Fingerprint of the raw UI hierarchy dump. Scopes element identity to one
/// screen instance; it is never the novelty key for "have we seen this
/// screen" (that is `visual_hash`).
pub fn structural_hash(xml: &str) -> String {
    fingerprint(xml.as_bytes())
}

/// Fingerprint of the raw screenshot bytes — the primary key for
/// previously-seen screens. Any byte difference produces a different hash,
/// so non-semantic rendering noise (a blinking cursor, a clock tick) counts
/// as a new visual state. That over-counting is intentional behavior, not a
/// defect to paper over.
pub fn visual_hash(image: &[u8]) -> String {
    fingerprint(image)
}

/// Identity of one tappable affordance on one specific screen.
///
/// Mixing the structural hash in keeps elements with identical class and
/// bounds on different screens independently budgeted.
pub fn element_hash(structural_hash: &str, class: &str, bounds: &Bounds) -> String {
    let mut hasher = Sha1::new();
    hasher.update(structural_hash.as_bytes());
    hasher.update(b"|");
    hasher.update(class.as_bytes());
    hasher.update(b"|");
    hasher.update(
        format!(
            "{},{},{},{}",
            bounds.left, bounds.top, bounds.right, bounds.bottom
        )
        .as_bytes(),
    );
    format!("{:x}", hasher.finalize())
}

fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
