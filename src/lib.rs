use crate::{
    device::{adb::AdbDevice, interface::DeviceInterface},
    explorer::engine::RunOutcome,
    explorer::nav_graph::GraphSnapshot,
    session::{
        controller::SessionController, error::ExploreError, observer::ExplorationObserver,
        settings::ExploreSettings,
    },
};

pub mod cli;
pub mod device;
pub mod explorer;
pub mod screen;
pub mod session;
pub mod trace;

/// Run one exploration session against a device attached to the local adb
/// server and return the accumulated navigation graph.
///
/// Thin wiring over [`SessionController`]; embedders that need `stop()`,
/// `status()` or `logs()` mid-run should hold a controller themselves.
pub fn run_exploration(
    device_serial: &str,
    package: &str,
    settings: ExploreSettings,
    observer: &mut dyn ExplorationObserver,
) -> Result<GraphSnapshot, ExploreError> {
    let mut device = AdbDevice::new(device_serial);
    run_exploration_on(&mut device, package, settings, observer)
}

/// Same as [`run_exploration`], against any [`DeviceInterface`].
pub fn run_exploration_on(
    device: &mut dyn DeviceInterface,
    package: &str,
    settings: ExploreSettings,
    observer: &mut dyn ExplorationObserver,
) -> Result<GraphSnapshot, ExploreError> {
    let controller = SessionController::new();
    let _outcome: RunOutcome = controller.start(device, package, settings, observer)?;
    Ok(controller.graph_snapshot())
}
