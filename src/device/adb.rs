use std::process::Command;

use crate::device::interface::{DeviceInterface, ForegroundActivity};
use crate::session::error::ExploreError;

const DUMP_PATH: &str = "/sdcard/droidmap_dump.xml";

/// Resumed-activity markers emitted by `dumpsys activity activities`,
/// newest Android releases first.
const FOREGROUND_MARKERS: [&str; 3] = [
    "topResumedActivity=",
    "mResumedActivity:",
    "mFocusedActivity:",
];

// ============================================================================
// AdbDevice — reference transport over the adb CLI
// ============================================================================

/// Drives one device through the `adb` binary, spawning a short-lived
/// subprocess per command.
pub struct AdbDevice {
    serial: String,
    adb_path: String,
}

impl AdbDevice {
    pub fn new(serial: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
            adb_path: "adb".to_string(),
        }
    }

    pub fn with_adb_path(mut self, path: impl Into<String>) -> Self {
        self.adb_path = path.into();
        self
    }

    /// Run `adb -s <serial> <args…>` and return raw stdout.
    fn run(&self, args: &[&str]) -> Result<Vec<u8>, ExploreError> {
        let rendered = format!("{} -s {} {}", self.adb_path, self.serial, args.join(" "));

        let output = Command::new(&self.adb_path)
            .arg("-s")
            .arg(&self.serial)
            .args(args)
            .output()
            .map_err(|e| ExploreError::CommandSpawn {
                command: rendered.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(ExploreError::CommandFailed {
                command: rendered,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }

    fn run_text(&self, args: &[&str]) -> Result<String, ExploreError> {
        let bytes = self.run(args)?;
        String::from_utf8(bytes).map_err(|e| ExploreError::CommandOutput {
            command: format!("{} -s {} {}", self.adb_path, self.serial, args.join(" ")),
            detail: e.to_string(),
        })
    }
}

impl DeviceInterface for AdbDevice {
    fn device_id(&self) -> &str {
        &self.serial
    }

    fn execute_shell(&mut self, command: &str) -> Result<String, ExploreError> {
        self.run_text(&["shell", command])
    }

    fn dump_ui_hierarchy(&mut self) -> Result<String, ExploreError> {
        // Dump to a file first: `uiautomator dump` mixes status text into
        // its stdout, the file stays clean XML.
        self.execute_shell(&format!("uiautomator dump {}", DUMP_PATH))?;
        self.run_text(&["exec-out", "cat", DUMP_PATH])
    }

    fn capture_screenshot(&mut self) -> Result<Vec<u8>, ExploreError> {
        self.run(&["exec-out", "screencap", "-p"])
    }

    fn tap(&mut self, x: i32, y: i32) -> Result<(), ExploreError> {
        self.execute_shell(&format!("input tap {} {}", x, y))?;
        Ok(())
    }

    fn press_back(&mut self) -> Result<(), ExploreError> {
        self.execute_shell("input keyevent 4")?;
        Ok(())
    }

    fn launch_app(&mut self, package: &str) -> Result<(), ExploreError> {
        self.execute_shell(&format!(
            "monkey -p {} -c android.intent.category.LAUNCHER 1",
            package
        ))?;
        Ok(())
    }

    fn foreground_activity(&mut self) -> Result<ForegroundActivity, ExploreError> {
        let text = self.execute_shell("dumpsys activity activities")?;
        parse_foreground(&text).ok_or_else(|| ExploreError::CommandOutput {
            command: "dumpsys activity activities".to_string(),
            detail: "no resumed activity record found".to_string(),
        })
    }
}

// ============================================================================
// dumpsys / device-list output parsing (token-based, typed results)
// ============================================================================

/// Extract the resumed activity from `dumpsys activity activities` output.
///
/// Looks for the first line carrying a resumed-activity marker and takes its
/// `package/activity` component token, e.g. from
/// `topResumedActivity=ActivityRecord{af85f2 u0 com.example.app/.MainActivity t123}`.
/// A leading-dot activity name is expanded with the package.
pub fn parse_foreground(dumpsys: &str) -> Option<ForegroundActivity> {
    for line in dumpsys.lines() {
        let trimmed = line.trim();
        if !FOREGROUND_MARKERS.iter().any(|m| trimmed.contains(m)) {
            continue;
        }
        let Some(component) = trimmed
            .split_whitespace()
            .find(|token| token.contains('/'))
        else {
            continue;
        };
        let component = component.trim_end_matches('}');
        let (package, activity) = component.split_once('/')?;
        let activity = match activity.strip_prefix('.') {
            Some(rest) => format!("{}.{}", package, rest),
            None => activity.to_string(),
        };
        return Some(ForegroundActivity::new(package, activity));
    }
    None
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    pub serial: String,
    pub state: String,
}

/// Parse `adb devices` output into typed entries.
pub fn parse_device_list(output: &str) -> Vec<DeviceEntry> {
    output
        .lines()
        .skip(1) // "List of devices attached"
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            let state = parts.next()?;
            Some(DeviceEntry {
                serial: serial.to_string(),
                state: state.to_string(),
            })
        })
        .collect()
}

/// Enumerate devices known to the local adb server.
pub fn list_devices(adb_path: &str) -> Result<Vec<DeviceEntry>, ExploreError> {
    let rendered = format!("{} devices", adb_path);
    let output = Command::new(adb_path)
        .arg("devices")
        .output()
        .map_err(|e| ExploreError::CommandSpawn {
            command: rendered.clone(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(ExploreError::CommandFailed {
            command: rendered.clone(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let text = String::from_utf8(output.stdout).map_err(|e| ExploreError::CommandOutput {
        command: rendered,
        detail: e.to_string(),
    })?;

    Ok(parse_device_list(&text))
}
