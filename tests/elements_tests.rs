use droidmap::screen::elements::{Bounds, element_node_count, parse_bounds, parse_elements};
use droidmap::screen::identity::structural_hash;

// ============================================================================
// Helper: uiautomator-style dump snippets
// ============================================================================

fn dump(nodes: &str) -> String {
    format!(
        r#"<?xml version='1.0' encoding='UTF-8' standalone='yes' ?><hierarchy rotation="0">{}</hierarchy>"#,
        nodes
    )
}

fn node(class: &str, bounds: &str, clickable: bool) -> String {
    format!(
        r#"<node index="0" text="" class="{}" package="com.example.app" clickable="{}" bounds="{}" />"#,
        class, clickable, bounds
    )
}

// ============================================================================
// 1. Bounds parsing — well-formed
// ============================================================================

#[test]
fn bounds_parse_well_formed() {
    assert_eq!(
        parse_bounds("[10,20][110,220]"),
        Some(Bounds {
            left: 10,
            top: 20,
            right: 110,
            bottom: 220
        })
    );
}

// ============================================================================
// 2. Bounds parsing — malformed inputs
// ============================================================================

#[test]
fn bounds_parse_malformed() {
    assert_eq!(parse_bounds(""), None);
    assert_eq!(parse_bounds("[10,20]"), None);
    assert_eq!(parse_bounds("10,20,110,220"), None);
    assert_eq!(parse_bounds("[10,20][110,abc]"), None);
    assert_eq!(parse_bounds("[10 20][110 220]"), None);
}

// ============================================================================
// 3. Bounds center
// ============================================================================

#[test]
fn bounds_center() {
    let b = Bounds {
        left: 10,
        top: 10,
        right: 50,
        bottom: 50,
    };
    assert_eq!(b.center(), (30, 30));
}

// ============================================================================
// 4. Only clickable nodes survive
// ============================================================================

#[test]
fn parse_keeps_only_clickable() {
    let xml = dump(&format!(
        "{}{}",
        node("android.widget.Button", "[0,0][100,50]", true),
        node("android.widget.TextView", "[0,60][100,110]", false),
    ));
    let s_hash = structural_hash(&xml);
    let elements = parse_elements(&xml, &[], &s_hash).unwrap();

    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].class, "android.widget.Button");
    assert!(elements[0].clickable);
}

// ============================================================================
// 5. Ignore-substring filter
// ============================================================================

#[test]
fn parse_applies_ignore_filter() {
    let xml = dump(&format!(
        "{}{}",
        node("android.widget.Button", "[0,0][100,50]", true),
        node("android.widget.ImageView", "[0,60][100,110]", true),
    ));
    let s_hash = structural_hash(&xml);
    let elements = parse_elements(&xml, &["ImageView".to_string()], &s_hash).unwrap();

    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].class, "android.widget.Button");
}

// ============================================================================
// 6. Duplicate (class, bounds) dump nodes collapse to one candidate
// ============================================================================

#[test]
fn parse_collapses_duplicates() {
    let xml = dump(&format!(
        "{}{}{}",
        node("android.widget.Button", "[0,0][100,50]", true),
        node("android.widget.Button", "[0,0][100,50]", true),
        node("android.widget.Button", "[0,60][100,110]", true),
    ));
    let s_hash = structural_hash(&xml);
    let elements = parse_elements(&xml, &[], &s_hash).unwrap();

    assert_eq!(elements.len(), 2);
}

// ============================================================================
// 7. Node with unparseable bounds is skipped, not fatal
// ============================================================================

#[test]
fn parse_skips_broken_bounds() {
    let xml = dump(&format!(
        "{}{}",
        node("android.widget.Button", "[0,0][100,50]", true),
        node("android.widget.Button", "not-bounds", true),
    ));
    let s_hash = structural_hash(&xml);
    let elements = parse_elements(&xml, &[], &s_hash).unwrap();

    assert_eq!(elements.len(), 1);
}

// ============================================================================
// 8. Malformed XML is a parse error
// ============================================================================

#[test]
fn parse_rejects_malformed_xml() {
    let xml = "<hierarchy><node class=\"x\"";
    assert!(parse_elements(xml, &[], "s").is_err());
    assert!(element_node_count(xml).is_err());
}

// ============================================================================
// 9. Elements are tagged with screen-scoped hashes
// ============================================================================

#[test]
fn parse_tags_element_hashes() {
    let xml_a = dump(&node("android.widget.Button", "[10,10][50,50]", true));
    let xml_b = format!("{} ", xml_a); // trailing byte changes the structural hash

    let on_a = parse_elements(&xml_a, &[], &structural_hash(&xml_a)).unwrap();
    let on_b = parse_elements(&xml_b, &[], &structural_hash(&xml_b)).unwrap();

    assert_eq!(on_a.len(), 1);
    assert_eq!(on_b.len(), 1);
    // Same class and bounds, different screens — identities stay apart.
    assert_eq!(on_a[0].class, on_b[0].class);
    assert_eq!(on_a[0].bounds, on_b[0].bounds);
    assert_ne!(on_a[0].hash, on_b[0].hash);
}

// ============================================================================
// 10. Node count includes non-clickable widgets
// ============================================================================

#[test]
fn node_count_counts_all_widgets() {
    let xml = dump(&format!(
        "{}{}{}",
        node("android.widget.Button", "[0,0][100,50]", true),
        node("android.widget.TextView", "[0,60][100,110]", false),
        node("android.widget.ImageView", "[0,120][100,170]", false),
    ));
    assert_eq!(element_node_count(&xml).unwrap(), 3);
}
