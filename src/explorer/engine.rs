use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::device::interface::{DeviceInterface, ForegroundActivity};
use crate::explorer::budget::BudgetDecision;
use crate::screen::elements::{InteractiveElement, element_node_count, parse_elements};
use crate::screen::identity::{structural_hash, visual_hash};
use crate::screen::screen_model::{Screen, capture_timestamp_ms};
use crate::session::error::ExploreError;
use crate::session::observer::{ExplorationObserver, Progress};
use crate::session::settings::{ExploreSettings, SelectionMode};
use crate::session::state::SessionState;
use crate::trace::log_buffer::{LogEntry, LogLevel};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

/// How a run ended, absent an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Max screens reached, or every branch exhausted its candidates
    Completed,
    /// The stop flag was flipped mid-run
    Stopped,
}

/// One open branch of the traversal: the screen it was entered on, the
/// ordered candidates still to try, and a cursor into them.
struct Frame {
    visual_hash: String,
    try_list: Vec<InteractiveElement>,
    next: usize,
}

/// What one observation step decided.
enum StepOutcome {
    /// Screen observed and actionable — descend into it
    Descend(Frame),
    /// Observed (or outside the app) but not actionable — backtrack
    DeadEnd,
    /// Unique-screen bound reached — the whole session is done
    Done,
    /// Stop flag flipped mid-step
    Halted,
}

// ============================================================================
// ExplorationEngine — depth-first capture/identify/select/act controller
// ============================================================================

/// Drives one session over a device.
///
/// The traversal is depth-first and runs on an explicit frame stack rather
/// than call recursion: the stack IS the navigation path, which keeps depth
/// off the call stack and makes cancellation a loop-head check. Every tap
/// is balanced by exactly one back press when its branch finishes; the root
/// frame's pop sends none.
///
/// Screens and edges are recorded in strict pre-order of the navigation
/// actually performed. Any transport or parse failure aborts the whole
/// session; the only retries anywhere are the two single-relaunch recoveries
/// under `stay_in_app`.
pub struct ExplorationEngine<'a> {
    device: &'a mut dyn DeviceInterface,
    state: &'a Mutex<SessionState>,
    running: &'a AtomicBool,
    observer: &'a mut dyn ExplorationObserver,
    tracer: &'a TraceLogger,
    settings: ExploreSettings,
    package: String,
    rng: StdRng,
}

impl<'a> ExplorationEngine<'a> {
    pub fn new(
        device: &'a mut dyn DeviceInterface,
        state: &'a Mutex<SessionState>,
        running: &'a AtomicBool,
        observer: &'a mut dyn ExplorationObserver,
        tracer: &'a TraceLogger,
        settings: ExploreSettings,
        package: String,
    ) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            device,
            state,
            running,
            observer,
            tracer,
            settings,
            package,
            rng,
        }
    }

    pub fn run(&mut self) -> Result<RunOutcome, ExploreError> {
        let mut stack: Vec<Frame> = Vec::new();

        match self.observe(0, None)? {
            StepOutcome::Descend(frame) => stack.push(frame),
            StepOutcome::DeadEnd | StepOutcome::Done => return Ok(RunOutcome::Completed),
            StepOutcome::Halted => return Ok(RunOutcome::Stopped),
        }

        while !stack.is_empty() {
            if !self.is_running() {
                return Ok(RunOutcome::Stopped);
            }

            let Some(element) = self.next_candidate(stack.last_mut().expect("stack non-empty"))
            else {
                // Branch exhausted: return to where its entering tap was made.
                stack.pop();
                if !stack.is_empty() {
                    self.backtrack()?;
                }
                continue;
            };

            let (x, y) = element.bounds.center();
            self.device.tap(x, y)?;
            {
                let mut state = self.state.lock().expect("session state lock");
                state.budget.record_click(&element.hash);
            }
            self.log(
                LogLevel::Info,
                format!("Tapped {} at ({}, {})", element.class, x, y),
            );
            self.tracer.log(
                &TraceEvent::now("tap")
                    .with_position(x, y)
                    .with_detail(&element.class),
            );
            self.settle(self.settings.screen_delay_ms);

            let predecessor = stack.last().expect("stack non-empty").visual_hash.clone();
            let depth = stack.len();
            match self.observe(depth, Some(&predecessor))? {
                StepOutcome::Descend(frame) => stack.push(frame),
                StepOutcome::DeadEnd => self.backtrack()?,
                StepOutcome::Done => return Ok(RunOutcome::Completed),
                StepOutcome::Halted => return Ok(RunOutcome::Stopped),
            }
        }

        Ok(RunOutcome::Completed)
    }

    // ------------------------------------------------------------------------
    // One observation step: capture → identify → catalog → classify → bound
    // ------------------------------------------------------------------------

    fn observe(
        &mut self,
        depth: usize,
        predecessor: Option<&str>,
    ) -> Result<StepOutcome, ExploreError> {
        if !self.is_running() {
            return Ok(StepOutcome::Halted);
        }

        let Some(foreground) = self.ensure_in_app()? else {
            return Ok(StepOutcome::DeadEnd);
        };

        let dump = self.device.dump_ui_hierarchy()?;
        let screenshot = self.device.capture_screenshot()?;
        // Each device round-trip is a suspension point; sample the stop flag
        // as soon as the captures land.
        if !self.is_running() {
            return Ok(StepOutcome::Halted);
        }
        let s_hash = structural_hash(&dump);
        let v_hash = visual_hash(&screenshot);

        let elements = parse_elements(&dump, &self.settings.ignore_elements, &s_hash)?;
        let element_count = element_node_count(&dump)?;
        let clickable_count = elements.len();

        // Novelty is keyed by the visual hash alone; the structural hash
        // only scopes element identity.
        let is_new = {
            let mut state = self.state.lock().expect("session state lock");
            state.seen_structural.insert(s_hash.clone());
            state.seen_visual.insert(v_hash.clone())
        };

        let unique_count;
        if is_new {
            let screen = Screen {
                structural_hash: s_hash.clone(),
                visual_hash: v_hash.clone(),
                activity: foreground.qualified(),
                screenshot,
                ui_dump: dump,
                element_count,
                clickable_count,
                captured_at_ms: capture_timestamp_ms(),
                depth,
                new_visual_state: true,
            };
            {
                let mut state = self.state.lock().expect("session state lock");
                state.graph.add_node(screen.clone());
                unique_count = state.graph.unique_screen_count();
            }
            self.observer.on_new_screen(&screen);
            self.observer.on_progress(&Progress {
                percentage: ((unique_count * 100) / self.settings.max_screens.max(1)).min(100)
                    as u32,
                screen_count: unique_count,
                max_screens: self.settings.max_screens,
            });
            self.log(
                LogLevel::Info,
                format!(
                    "New screen #{} {} at depth {} ({} clickable elements)",
                    unique_count,
                    short(&v_hash),
                    depth,
                    clickable_count
                ),
            );
            self.tracer.log(
                &TraceEvent::now("screen")
                    .with_screen(&v_hash)
                    .with_depth(depth)
                    .with_detail("new"),
            );
        } else {
            unique_count = self
                .state
                .lock()
                .expect("session state lock")
                .graph
                .unique_screen_count();
            self.log(
                LogLevel::Info,
                format!(
                    "Revisited screen {} (structural {}) at depth {}",
                    short(&v_hash),
                    short(&s_hash),
                    depth
                ),
            );
            self.tracer.log(
                &TraceEvent::now("screen")
                    .with_screen(&v_hash)
                    .with_depth(depth)
                    .with_detail("revisit"),
            );
        }

        if let Some(previous) = predecessor {
            let mut state = self.state.lock().expect("session state lock");
            state.graph.add_edge(previous, &v_hash);
        }

        if unique_count >= self.settings.max_screens {
            self.log(
                LogLevel::Info,
                format!("Reached max screens ({}), finishing", self.settings.max_screens),
            );
            let snapshot = self
                .state
                .lock()
                .expect("session state lock")
                .graph
                .snapshot();
            self.observer.on_graph_snapshot(&snapshot);
            return Ok(StepOutcome::Done);
        }

        if depth >= self.settings.max_depth {
            self.log(
                LogLevel::Info,
                format!("Max depth ({}) reached, backing out", self.settings.max_depth),
            );
            return Ok(StepOutcome::DeadEnd);
        }

        let try_list = {
            let state = self.state.lock().expect("session state lock");
            match self.settings.mode {
                SelectionMode::Random => state.budget.build_try_list(&elements, &mut self.rng),
            }
        };

        Ok(StepOutcome::Descend(Frame {
            visual_hash: v_hash,
            try_list,
            next: 0,
        }))
    }

    /// Advance the frame's cursor to the next candidate still under budget.
    /// Counts may have moved since the try-list was built (the same element
    /// hash can be re-tapped on a deeper revisit of the same screen), so the
    /// budget is re-checked here rather than trusted from list-build time.
    fn next_candidate(&mut self, frame: &mut Frame) -> Option<InteractiveElement> {
        let state = self.state.lock().expect("session state lock");
        while frame.next < frame.try_list.len() {
            let element = &frame.try_list[frame.next];
            frame.next += 1;
            if state.budget.check(&element.hash) == BudgetDecision::Allow {
                return Some(element.clone());
            }
        }
        None
    }

    // ------------------------------------------------------------------------
    // Foreground recovery and backtracking
    // ------------------------------------------------------------------------

    /// Step-entry foreground guard. `Ok(None)` means the display belongs to
    /// another package and this branch is a dead end.
    fn ensure_in_app(&mut self) -> Result<Option<ForegroundActivity>, ExploreError> {
        let foreground = self.device.foreground_activity()?;
        if foreground.package == self.package {
            return Ok(Some(foreground));
        }
        if !self.settings.stay_in_app {
            self.log(
                LogLevel::Info,
                format!(
                    "Foreground is {}; not exploring outside {}",
                    foreground.package, self.package
                ),
            );
            return Ok(None);
        }
        let foreground = self.relaunch_and_verify(&foreground)?;
        Ok(Some(foreground))
    }

    /// One relaunch attempt. Still being outside the package afterwards is
    /// fatal to the session.
    fn relaunch_and_verify(
        &mut self,
        from: &ForegroundActivity,
    ) -> Result<ForegroundActivity, ExploreError> {
        self.log(
            LogLevel::Warn,
            format!("Foreground is {}; relaunching {}", from.package, self.package),
        );
        self.tracer
            .log(&TraceEvent::now("relaunch").with_detail(&self.package));
        self.device.launch_app(&self.package)?;
        self.settle(self.settings.screen_delay_ms);

        let foreground = self.device.foreground_activity()?;
        if foreground.package != self.package {
            return Err(ExploreError::OutOfApp {
                package: self.package.clone(),
                foreground: foreground.package,
            });
        }
        self.log(
            LogLevel::Info,
            format!("Relaunch recovered {}", self.package),
        );
        Ok(foreground)
    }

    /// Undo one navigation step: back event, settle, and verify the app
    /// still owns the display (with the single relaunch under stay_in_app).
    fn backtrack(&mut self) -> Result<(), ExploreError> {
        self.device.press_back()?;
        self.tracer.log(&TraceEvent::now("back"));
        self.settle(self.settings.back_delay());

        let foreground = self.device.foreground_activity()?;
        if foreground.package == self.package {
            return Ok(());
        }
        if self.settings.stay_in_app {
            self.relaunch_and_verify(&foreground)?;
        } else {
            self.log(
                LogLevel::Info,
                format!(
                    "Back landed outside {} (foreground is {})",
                    self.package, foreground.package
                ),
            );
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Small helpers
    // ------------------------------------------------------------------------

    fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::now(level, message);
        {
            let mut state = self.state.lock().expect("session state lock");
            state.logs.push(entry.clone());
        }
        self.observer.on_log(&entry);
    }

    fn settle(&self, ms: u64) {
        if ms > 0 {
            thread::sleep(Duration::from_millis(ms));
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

fn short(hash: &str) -> &str {
    &hash[..hash.len().min(8)]
}
