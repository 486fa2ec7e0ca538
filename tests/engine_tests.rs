use droidmap::device::scripted::{ScriptedDevice, ScriptedScreen, TapOutcome};
use droidmap::screen::identity::visual_hash;
use droidmap::session::controller::SessionController;
use droidmap::session::error::ExploreError;
use droidmap::session::observer::NullObserver;
use droidmap::session::settings::ExploreSettings;

const PKG: &str = "com.example.app";

// ============================================================================
// Helper builders
// ============================================================================

/// Zero delays and a fixed seed so runs are fast and reproducible.
fn settings(max_screens: usize, max_depth: usize) -> ExploreSettings {
    ExploreSettings {
        max_screens,
        max_depth,
        screen_delay_ms: 0,
        back_delay_ms: Some(0),
        ignore_elements: vec![],
        stay_in_app: false,
        seed: Some(7),
        ..ExploreSettings::default()
    }
}

fn dump(marker: &str, nodes: &str) -> String {
    format!(
        r#"<?xml version='1.0' encoding='UTF-8' standalone='yes' ?><hierarchy rotation="0"><node class="android.widget.FrameLayout" text="{}" clickable="false" bounds="[0,0][1080,1920]">{}</node></hierarchy>"#,
        marker, nodes
    )
}

fn button(bounds: &str) -> String {
    format!(
        r#"<node class="android.widget.Button" package="com.example.app" clickable="true" bounds="{}" />"#,
        bounds
    )
}

fn screen(name: &str, nodes: &str) -> ScriptedScreen {
    ScriptedScreen::new(name, format!("{}.{}Activity", PKG, name))
        .with_dump(dump(name, nodes))
        .with_screenshot(format!("shot-{}", name).into_bytes())
}

fn shot_hash(name: &str) -> String {
    visual_hash(format!("shot-{}", name).as_bytes())
}

// ============================================================================
// 1. Scenario: looping 3-screen app stops at exactly max_screens
// ============================================================================

#[test]
fn looping_app_stops_at_max_screens() {
    // A has two buttons (to B and to C); B loops back to A; C is a leaf.
    // A gets revisited through the loop, but only 3 visual states exist.
    let mut device = ScriptedDevice::new(PKG)
        .with_screen(
            screen(
                "a",
                &format!("{}{}", button("[0,0][100,50]"), button("[0,60][100,110]")),
            )
            .with_tap(50, 25, TapOutcome::Goto("b".into()))
            .with_tap(50, 85, TapOutcome::Goto("c".into())),
        )
        .with_screen(
            screen("b", &button("[0,0][100,50]")).with_tap(50, 25, TapOutcome::Goto("a".into())),
        )
        .with_screen(screen("c", ""));

    let controller = SessionController::new();
    let outcome = controller
        .start(&mut device, PKG, settings(3, 5), &mut NullObserver)
        .unwrap();

    assert_eq!(
        outcome,
        droidmap::explorer::engine::RunOutcome::Completed
    );

    let snapshot = controller.graph_snapshot();
    assert_eq!(snapshot.unique_screen_count, 3);

    let hashes: Vec<&str> = snapshot
        .nodes
        .iter()
        .map(|n| n.visual_hash.as_str())
        .collect();
    assert!(hashes.contains(&shot_hash("a").as_str()));
    assert!(hashes.contains(&shot_hash("b").as_str()));
    assert!(hashes.contains(&shot_hash("c").as_str()));
    assert!(!snapshot.edges.is_empty());
}

// ============================================================================
// 2. Unique screen count never exceeds max_screens
// ============================================================================

#[test]
fn unique_count_bounded_by_max_screens() {
    // Five distinct screens in a chain, but the session is capped at 2.
    let mut device = ScriptedDevice::new(PKG);
    let names = ["a", "b", "c", "d", "e"];
    for (i, name) in names.iter().enumerate() {
        let mut s = screen(name, &button("[0,0][100,50]"));
        if let Some(next) = names.get(i + 1) {
            s = s.with_tap(50, 25, TapOutcome::Goto((*next).into()));
        }
        device = device.with_screen(s);
    }

    let controller = SessionController::new();
    controller
        .start(&mut device, PKG, settings(2, 10), &mut NullObserver)
        .unwrap();

    assert_eq!(controller.graph_snapshot().unique_screen_count, 2);
    assert!(controller.status().unique_screen_count <= 2);
}

// ============================================================================
// 3. Depth bound: screens past max_depth are observed, never acted on
// ============================================================================

#[test]
fn depth_bound_observes_without_acting() {
    let mut device = ScriptedDevice::new(PKG)
        .with_screen(
            screen("a", &button("[0,0][100,50]"))
                .with_tap(50, 25, TapOutcome::Goto("b".into())),
        )
        .with_screen(
            screen("b", &button("[0,0][100,50]"))
                .with_tap(50, 25, TapOutcome::Goto("c".into())),
        )
        .with_screen(
            screen("c", &button("[0,0][100,50]"))
                .with_tap(50, 25, TapOutcome::Goto("d".into())),
        )
        .with_screen(screen("d", ""));

    let controller = SessionController::new();
    controller
        .start(&mut device, PKG, settings(10, 2), &mut NullObserver)
        .unwrap();

    let snapshot = controller.graph_snapshot();
    // c is captured at depth 2; its button is never tapped, so d stays
    // undiscovered.
    assert_eq!(snapshot.unique_screen_count, 3);
    assert_eq!(device.tap_log.len(), 2);

    let deepest = snapshot.nodes.iter().map(|n| n.depth).max().unwrap();
    assert_eq!(deepest, 2);
}

// ============================================================================
// 4. Scenario: unresponsive element is tried 3 times, then skipped for good
// ============================================================================

#[test]
fn dead_element_exhausts_click_budget() {
    let mut device = ScriptedDevice::new(PKG).with_screen(
        screen("a", &button("[10,10][50,50]")).with_tap(30, 30, TapOutcome::Nothing),
    );

    let controller = SessionController::new();
    let outcome = controller
        .start(&mut device, PKG, settings(10, 10), &mut NullObserver)
        .unwrap();

    assert_eq!(outcome, droidmap::explorer::engine::RunOutcome::Completed);
    assert_eq!(device.tap_log, vec![(30, 30); 3]);

    let snapshot = controller.graph_snapshot();
    assert_eq!(snapshot.unique_screen_count, 1);
    // Every dead tap re-observed the same screen: a self-edge per attempt.
    let self_edge = snapshot
        .edges
        .iter()
        .find(|e| e.from == e.to)
        .expect("self edge");
    assert_eq!(self_edge.count, 3);
}

// ============================================================================
// 5. Scenario: identical bounds on another screen budget independently
// ============================================================================

#[test]
fn identical_element_on_other_screen_keeps_own_budget() {
    // Same widget class and bounds on both screens; a's button navigates,
    // b's button is dead. b's copy still gets its own 3 attempts.
    let mut device = ScriptedDevice::new(PKG)
        .with_screen(
            screen("a", &button("[10,10][50,50]"))
                .with_tap(30, 30, TapOutcome::Goto("b".into())),
        )
        .with_screen(
            screen("b", &button("[10,10][50,50]")).with_tap(30, 30, TapOutcome::Nothing),
        );

    let controller = SessionController::new();
    controller
        .start(&mut device, PKG, settings(10, 10), &mut NullObserver)
        .unwrap();

    // 1 tap on a, then 3 on b before its budget runs out.
    assert_eq!(device.tap_log, vec![(30, 30); 4]);
}

// ============================================================================
// 6. Scenario: leaving the app with stay_in_app recovers and continues
// ============================================================================

#[test]
fn stay_in_app_relaunches_and_continues() {
    let mut device = ScriptedDevice::new(PKG).with_screen(
        screen("a", &button("[10,10][50,50]"))
            .with_tap(30, 30, TapOutcome::LeaveApp("com.android.systemui".into())),
    );

    let mut cfg = settings(10, 10);
    cfg.stay_in_app = true;

    let controller = SessionController::new();
    let outcome = controller
        .start(&mut device, PKG, cfg, &mut NullObserver)
        .unwrap();

    assert_eq!(outcome, droidmap::explorer::engine::RunOutcome::Completed);
    // Initial launch plus one recovery per escaping tap.
    assert_eq!(device.launch_count, 4);
    assert_eq!(controller.graph_snapshot().unique_screen_count, 1);
}

// ============================================================================
// 7. Scenario: relaunch that fails to recover aborts the session
// ============================================================================

#[test]
fn failed_relaunch_is_fatal() {
    let mut device = ScriptedDevice::new(PKG)
        .with_screen(
            screen("a", &button("[10,10][50,50]"))
                .with_tap(30, 30, TapOutcome::LeaveApp("com.android.systemui".into())),
        )
        .with_relaunch_limit(1); // only the session-opening launch works

    let mut cfg = settings(10, 10);
    cfg.stay_in_app = true;

    let controller = SessionController::new();
    let result = controller.start(&mut device, PKG, cfg, &mut NullObserver);

    assert!(matches!(result, Err(ExploreError::OutOfApp { .. })));

    // The failure is always inspectable post-mortem via the log ring.
    let logs = controller.logs();
    assert!(logs
        .iter()
        .any(|e| e.level == droidmap::trace::log_buffer::LogLevel::Error));
}

// ============================================================================
// 8. Without stay_in_app, outside screens are dead ends, not errors
// ============================================================================

#[test]
fn outside_package_is_dead_end_without_stay_in_app() {
    let mut device = ScriptedDevice::new(PKG).with_screen(
        screen("a", &button("[10,10][50,50]"))
            .with_tap(30, 30, TapOutcome::LeaveApp("com.android.chrome".into())),
    );

    let controller = SessionController::new();
    let outcome = controller
        .start(&mut device, PKG, settings(10, 10), &mut NullObserver)
        .unwrap();

    assert_eq!(outcome, droidmap::explorer::engine::RunOutcome::Completed);
    // No relaunch was attempted beyond the session-opening one.
    assert_eq!(device.launch_count, 1);
    assert_eq!(controller.graph_snapshot().unique_screen_count, 1);
}

// ============================================================================
// 9. Ignored classes are never tapped
// ============================================================================

#[test]
fn ignored_classes_are_not_tapped() {
    let image = r#"<node class="android.widget.ImageView" clickable="true" bounds="[200,200][300,300]" />"#;
    let mut device = ScriptedDevice::new(PKG).with_screen(
        screen("a", &format!("{}{}", button("[10,10][50,50]"), image))
            .with_tap(30, 30, TapOutcome::Nothing)
            .with_tap(250, 250, TapOutcome::Goto("hidden".into())),
    );

    let mut cfg = settings(10, 10);
    cfg.ignore_elements = vec!["ImageView".to_string()];

    let controller = SessionController::new();
    controller
        .start(&mut device, PKG, cfg, &mut NullObserver)
        .unwrap();

    assert!(device.tap_log.iter().all(|&(x, y)| (x, y) == (30, 30)));
    assert_eq!(controller.graph_snapshot().unique_screen_count, 1);
}

// ============================================================================
// 10. Every tap is eventually balanced by one back press
// ============================================================================

#[test]
fn taps_and_backs_balance() {
    let mut device = ScriptedDevice::new(PKG)
        .with_screen(
            screen("a", &button("[0,0][100,50]"))
                .with_tap(50, 25, TapOutcome::Goto("b".into())),
        )
        .with_screen(screen("b", ""));

    let controller = SessionController::new();
    controller
        .start(&mut device, PKG, settings(10, 10), &mut NullObserver)
        .unwrap();

    assert_eq!(device.tap_log.len() as u32, device.back_count);
}
