use crate::session::error::ExploreError;

/// The activity that currently owns the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundActivity {
    pub package: String,
    pub activity: String,
}

impl ForegroundActivity {
    pub fn new(package: impl Into<String>, activity: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            activity: activity.into(),
        }
    }

    pub fn qualified(&self) -> String {
        format!("{}/{}", self.package, self.activity)
    }
}

// ============================================================================
// DeviceInterface trait — the transport seam the engine is written against
// ============================================================================

/// Low-level device command surface. One implementation drives a real device
/// over adb; `ScriptedDevice` simulates an app for tests and offline runs.
///
/// All methods are synchronous; every call is a suspension point where the
/// engine may be cancelled. Any failure is surfaced as a typed error and is
/// fatal to the session — implementations do not retry internally.
pub trait DeviceInterface {
    /// Stable identifier (serial for adb devices).
    fn device_id(&self) -> &str;

    /// Run a shell command on the device, returning stdout text.
    fn execute_shell(&mut self, command: &str) -> Result<String, ExploreError>;

    /// Pull the current UI hierarchy as uiautomator XML.
    fn dump_ui_hierarchy(&mut self) -> Result<String, ExploreError>;

    /// Pull a screenshot of the current display as raw image bytes.
    fn capture_screenshot(&mut self) -> Result<Vec<u8>, ExploreError>;

    fn tap(&mut self, x: i32, y: i32) -> Result<(), ExploreError>;

    fn press_back(&mut self) -> Result<(), ExploreError>;

    fn launch_app(&mut self, package: &str) -> Result<(), ExploreError>;

    fn foreground_activity(&mut self) -> Result<ForegroundActivity, ExploreError>;
}
