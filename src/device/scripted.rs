use std::collections::HashMap;

use crate::device::interface::{DeviceInterface, ForegroundActivity};
use crate::session::error::ExploreError;

// ============================================================================
// ScriptedDevice — deterministic in-memory device (no adb needed)
// ============================================================================

/// What a tap at a scripted point does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// Navigate to another scripted screen
    Goto(String),
    /// Hand the foreground to a different package (share sheet, browser, …)
    LeaveApp(String),
    /// Consume the tap without changing anything
    Nothing,
}

#[derive(Debug, Clone)]
struct TapRule {
    x: i32,
    y: i32,
    outcome: TapOutcome,
}

/// One simulated screen: fixed dump text, fixed screenshot bytes, and the
/// tap points that lead elsewhere. Fixed bytes mean revisits hash
/// identically, which is exactly what loop-avoidance tests need.
#[derive(Debug, Clone)]
pub struct ScriptedScreen {
    name: String,
    activity: String,
    dump: String,
    screenshot: Vec<u8>,
    taps: Vec<TapRule>,
}

impl ScriptedScreen {
    pub fn new(name: impl Into<String>, activity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            activity: activity.into(),
            dump: String::new(),
            screenshot: Vec::new(),
            taps: Vec::new(),
        }
    }

    pub fn with_dump(mut self, dump: impl Into<String>) -> Self {
        self.dump = dump.into();
        self
    }

    pub fn with_screenshot(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.screenshot = bytes.into();
        self
    }

    pub fn with_tap(mut self, x: i32, y: i32, outcome: TapOutcome) -> Self {
        self.taps.push(TapRule { x, y, outcome });
        self
    }
}

/// Simulated device driven by a declarative screen table.
///
/// Plays the role the Mock* seam implementations play elsewhere in the
/// crate's lineage: an in-process stand-in behind the same trait the real
/// transport implements, so the whole engine is exercisable in tests and
/// offline runs without a device.
pub struct ScriptedDevice {
    id: String,
    package: String,
    screens: HashMap<String, ScriptedScreen>,
    home: String,
    current: String,
    foreground: ForegroundActivity,
    back_stack: Vec<String>,

    /// How many launches actually restore the foreground; None = all of
    /// them. Lets tests simulate a relaunch that stops working mid-session.
    recover_limit: Option<u32>,

    pub tap_log: Vec<(i32, i32)>,
    pub launch_count: u32,
    pub back_count: u32,
}

impl ScriptedDevice {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            id: "scripted-device".to_string(),
            package: package.into(),
            screens: HashMap::new(),
            home: String::new(),
            current: String::new(),
            foreground: ForegroundActivity::new("", ""),
            back_stack: Vec::new(),
            recover_limit: None,
            tap_log: Vec::new(),
            launch_count: 0,
            back_count: 0,
        }
    }

    pub fn with_screen(mut self, screen: ScriptedScreen) -> Self {
        if self.home.is_empty() {
            // First screen registered is the launcher entry point.
            self.home = screen.name.clone();
        }
        self.screens.insert(screen.name.clone(), screen);
        self
    }

    pub fn with_home(mut self, name: impl Into<String>) -> Self {
        self.home = name.into();
        self
    }

    pub fn with_failing_relaunch(mut self) -> Self {
        self.recover_limit = Some(0);
        self
    }

    /// Only the first `limit` launches recover the foreground.
    pub fn with_relaunch_limit(mut self, limit: u32) -> Self {
        self.recover_limit = Some(limit);
        self
    }

    pub fn current_screen(&self) -> &str {
        &self.current
    }

    fn screen(&self) -> Result<&ScriptedScreen, ExploreError> {
        self.screens
            .get(&self.current)
            .ok_or_else(|| ExploreError::CommandOutput {
                command: "scripted".to_string(),
                detail: format!("unknown screen '{}'", self.current),
            })
    }

    fn in_app_foreground(&self, screen_name: &str) -> ForegroundActivity {
        let activity = self
            .screens
            .get(screen_name)
            .map(|s| s.activity.clone())
            .unwrap_or_default();
        ForegroundActivity::new(self.package.clone(), activity)
    }
}

impl DeviceInterface for ScriptedDevice {
    fn device_id(&self) -> &str {
        &self.id
    }

    fn execute_shell(&mut self, _command: &str) -> Result<String, ExploreError> {
        Ok(String::new())
    }

    fn dump_ui_hierarchy(&mut self) -> Result<String, ExploreError> {
        Ok(self.screen()?.dump.clone())
    }

    fn capture_screenshot(&mut self) -> Result<Vec<u8>, ExploreError> {
        Ok(self.screen()?.screenshot.clone())
    }

    fn tap(&mut self, x: i32, y: i32) -> Result<(), ExploreError> {
        self.tap_log.push((x, y));

        if self.foreground.package != self.package {
            // Taps on foreign UI don't move the scripted app.
            return Ok(());
        }

        let outcome = self
            .screen()?
            .taps
            .iter()
            .find(|rule| rule.x == x && rule.y == y)
            .map(|rule| rule.outcome.clone());

        match outcome {
            Some(TapOutcome::Goto(target)) => {
                self.back_stack.push(self.current.clone());
                self.foreground = self.in_app_foreground(&target);
                self.current = target;
            }
            Some(TapOutcome::LeaveApp(package)) => {
                self.foreground = ForegroundActivity::new(package, "ForeignActivity");
            }
            Some(TapOutcome::Nothing) | None => {}
        }
        Ok(())
    }

    fn press_back(&mut self) -> Result<(), ExploreError> {
        self.back_count += 1;

        if self.foreground.package != self.package {
            // Back from a foreign surface lands on the app screen beneath it.
            self.foreground = self.in_app_foreground(&self.current.clone());
            return Ok(());
        }

        if let Some(previous) = self.back_stack.pop() {
            self.foreground = self.in_app_foreground(&previous);
            self.current = previous;
        }
        Ok(())
    }

    fn launch_app(&mut self, package: &str) -> Result<(), ExploreError> {
        self.launch_count += 1;
        let recovers = match self.recover_limit {
            None => true,
            Some(limit) => self.launch_count <= limit,
        };
        if !recovers {
            return Ok(());
        }
        if package == self.package {
            self.current = self.home.clone();
            self.back_stack.clear();
            self.foreground = self.in_app_foreground(&self.home.clone());
        }
        Ok(())
    }

    fn foreground_activity(&mut self) -> Result<ForegroundActivity, ExploreError> {
        Ok(self.foreground.clone())
    }
}
