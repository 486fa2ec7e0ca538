use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::device::interface::DeviceInterface;
use crate::explorer::engine::{ExplorationEngine, RunOutcome};
use crate::explorer::nav_graph::GraphSnapshot;
use crate::session::error::ExploreError;
use crate::session::observer::ExplorationObserver;
use crate::session::settings::ExploreSettings;
use crate::session::state::{SessionPhase, SessionState, SessionStatus};
use crate::trace::log_buffer::{LogEntry, LogLevel};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

// ============================================================================
// SessionController — lifecycle owner for one exploration at a time
// ============================================================================

/// Owns session lifecycle: start/stop/status/logs, the single-session
/// invariant, and the full state reset between runs.
///
/// `start` runs the engine to completion on the calling thread; `stop`,
/// `status`, `logs` and `graph_snapshot` are safe to call from any other
/// thread while it runs. The running flag doubles as the conflict guard:
/// acquired atomically on start, observed by the engine at every loop head,
/// always released on exit.
pub struct SessionController {
    state: Arc<Mutex<SessionState>>,
    running: Arc<AtomicBool>,
    tracer: TraceLogger,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::idle())),
            running: Arc::new(AtomicBool::new(false)),
            tracer: TraceLogger::disabled(),
        }
    }

    /// Controller that also writes a JSONL step trace.
    pub fn with_trace(path: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::idle())),
            running: Arc::new(AtomicBool::new(false)),
            tracer: TraceLogger::new(path),
        }
    }

    /// Run one exploration session.
    ///
    /// Rejects with `SessionConflict` (and touches nothing) while another
    /// session runs. Otherwise resets all session state, launches the target
    /// app, and drives the engine from depth 0 until a terminal state.
    pub fn start(
        &self,
        device: &mut dyn DeviceInterface,
        package: &str,
        settings: ExploreSettings,
        observer: &mut dyn ExplorationObserver,
    ) -> Result<RunOutcome, ExploreError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ExploreError::SessionConflict);
        }

        {
            let mut state = self.state.lock().expect("session state lock");
            *state = SessionState::new(
                device.device_id().to_string(),
                package.to_string(),
                settings.clone(),
            );
            state.phase = SessionPhase::Running;
        }
        self.log(
            observer,
            LogLevel::Info,
            format!("Session started: {} on {}", package, device.device_id()),
        );
        self.tracer
            .log(&TraceEvent::now("session_start").with_detail(package));

        let result = (|| {
            device.launch_app(package)?;
            if settings.screen_delay_ms > 0 {
                thread::sleep(Duration::from_millis(settings.screen_delay_ms));
            }
            let mut engine = ExplorationEngine::new(
                &mut *device,
                &self.state,
                &self.running,
                &mut *observer,
                &self.tracer,
                settings,
                package.to_string(),
            );
            engine.run()
        })();

        match &result {
            Ok(RunOutcome::Completed) => {
                let (snapshot, count) = {
                    let mut state = self.state.lock().expect("session state lock");
                    state.phase = SessionPhase::Completed;
                    (state.graph.snapshot(), state.unique_screen_count())
                };
                self.log(
                    observer,
                    LogLevel::Info,
                    format!("Session complete: {} unique screens", count),
                );
                observer.on_graph_snapshot(&snapshot);
                observer.on_complete();
                self.tracer
                    .log(&TraceEvent::now("session_end").with_detail("completed"));
            }
            Ok(RunOutcome::Stopped) => {
                let snapshot = {
                    let mut state = self.state.lock().expect("session state lock");
                    state.phase = SessionPhase::Stopped;
                    state.graph.snapshot()
                };
                self.log(observer, LogLevel::Info, "Session stopped by request");
                observer.on_graph_snapshot(&snapshot);
                self.tracer
                    .log(&TraceEvent::now("session_end").with_detail("stopped"));
            }
            Err(e) => {
                {
                    let mut state = self.state.lock().expect("session state lock");
                    state.phase = SessionPhase::Error;
                }
                // Error-level entry lands in the ring buffer even when the
                // observer misses the live callback.
                self.log(observer, LogLevel::Error, format!("Session failed: {}", e));
                observer.on_error(&e.to_string());
                self.tracer
                    .log(&TraceEvent::now("session_end").with_detail(format!("error: {}", e)));
            }
        }

        self.running.store(false, Ordering::SeqCst);
        result
    }

    /// Request the running session to halt. The engine observes the flag at
    /// the head of every step and element iteration, so latency is bounded
    /// by one in-flight device operation plus its settle delay.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.lock().expect("session state lock").phase
    }

    pub fn status(&self) -> SessionStatus {
        let state = self.state.lock().expect("session state lock");
        SessionStatus {
            running: self.is_running(),
            device_id: state.device_id.clone(),
            package: state.package.clone(),
            unique_screen_count: state.unique_screen_count(),
            max_screens: state.settings.max_screens,
        }
    }

    /// Snapshot of the bounded session log, oldest first.
    pub fn logs(&self) -> Vec<LogEntry> {
        self.state
            .lock()
            .expect("session state lock")
            .logs
            .snapshot()
    }

    pub fn graph_snapshot(&self) -> GraphSnapshot {
        self.state
            .lock()
            .expect("session state lock")
            .graph
            .snapshot()
    }

    fn log(
        &self,
        observer: &mut dyn ExplorationObserver,
        level: LogLevel,
        message: impl Into<String>,
    ) {
        let entry = LogEntry::now(level, message);
        {
            let mut state = self.state.lock().expect("session state lock");
            state.logs.push(entry.clone());
        }
        observer.on_log(&entry);
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}
