use std::fs;
use std::path::PathBuf;

use crate::device::adb::{AdbDevice, list_devices};
use crate::explorer::nav_graph::GraphSnapshot;
use crate::screen::screen_model::Screen;
use crate::session::controller::SessionController;
use crate::session::observer::{ExplorationObserver, Progress};
use crate::session::settings::ExploreSettings;
use crate::trace::log_buffer::LogEntry;

// ============================================================================
// explore subcommand
// ============================================================================

pub fn cmd_explore(
    device_serial: &str,
    package: &str,
    settings: ExploreSettings,
    output_dir: &str,
    trace: Option<&str>,
    adb_path: Option<&str>,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut device = AdbDevice::new(device_serial);
    if let Some(path) = adb_path {
        device = device.with_adb_path(path);
    }

    let controller = match trace {
        Some(path) => SessionController::with_trace(path),
        None => SessionController::new(),
    };
    let mut observer = CliObserver::new(output_dir, verbose)?;

    if verbose > 0 {
        eprintln!(
            "Exploring {} on {} (max_screens={}, max_depth={})...",
            package, device_serial, settings.max_screens, settings.max_depth
        );
    }

    controller.start(&mut device, package, settings, &mut observer)?;

    let snapshot = controller.graph_snapshot();
    println!(
        "Discovered {} screens, {} transitions",
        snapshot.unique_screen_count,
        snapshot.edges.len()
    );
    for node in &snapshot.nodes {
        println!(
            "  [{}] {} — {} ({} clickable)",
            node.depth,
            &node.visual_hash[..node.visual_hash.len().min(8)],
            node.activity,
            node.clickable_count
        );
    }

    observer.write_graph(&snapshot)?;
    println!("Artifacts written to {}", output_dir);
    Ok(())
}

// ============================================================================
// devices subcommand
// ============================================================================

pub fn cmd_devices(adb_path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let devices = list_devices(adb_path.unwrap_or("adb"))?;
    if devices.is_empty() {
        println!("No devices attached");
        return Ok(());
    }
    for device in devices {
        println!("{}\t{}", device.serial, device.state);
    }
    Ok(())
}

// ============================================================================
// CliObserver — prints progress and persists per-screen evidence
// ============================================================================

/// The core never touches disk; this observer does. Each new screen's
/// screenshot and UI dump land under `<output_dir>/screens/`, and the final
/// graph snapshot as `<output_dir>/graph.json`. Evidence writes are
/// best-effort: a failed write warns and the session keeps going.
pub struct CliObserver {
    output_dir: PathBuf,
    verbose: u8,
    saved: usize,
}

impl CliObserver {
    pub fn new(output_dir: &str, verbose: u8) -> std::io::Result<Self> {
        let output_dir = PathBuf::from(output_dir);
        fs::create_dir_all(output_dir.join("screens"))?;
        Ok(Self {
            output_dir,
            verbose,
            saved: 0,
        })
    }

    pub fn write_graph(&self, snapshot: &GraphSnapshot) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(self.output_dir.join("graph.json"), json)?;
        Ok(())
    }
}

impl ExplorationObserver for CliObserver {
    fn on_new_screen(&mut self, screen: &Screen) {
        self.saved += 1;
        let stem = format!(
            "{:03}_{}",
            self.saved,
            &screen.visual_hash[..screen.visual_hash.len().min(8)]
        );

        let png = self.output_dir.join("screens").join(format!("{}.png", stem));
        if let Err(e) = fs::write(&png, &screen.screenshot) {
            eprintln!("Warning: could not write {}: {}", png.display(), e);
        }
        let xml = self.output_dir.join("screens").join(format!("{}.xml", stem));
        if let Err(e) = fs::write(&xml, &screen.ui_dump) {
            eprintln!("Warning: could not write {}: {}", xml.display(), e);
        }

        if self.verbose > 0 {
            eprintln!("  New screen: {} (depth {})", stem, screen.depth);
        }
    }

    fn on_progress(&mut self, progress: &Progress) {
        if self.verbose > 0 {
            eprintln!(
                "  Progress: {}% ({}/{})",
                progress.percentage, progress.screen_count, progress.max_screens
            );
        }
    }

    fn on_log(&mut self, entry: &LogEntry) {
        if self.verbose > 1 {
            eprintln!("  [{:?}] {}", entry.level, entry.message);
        }
    }

    fn on_error(&mut self, message: &str) {
        eprintln!("Session error: {}", message);
    }
}
