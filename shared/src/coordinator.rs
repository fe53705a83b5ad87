//! Handshake and run-request lifecycle between the page and its worker.
//!
//! ```text
//! Uninitialized -> Initializing -> Ready <-> Running
//!                       |             |          |
//!                       +-------------+----------+--> Failed
//! ```
//!
//! The state machine, not the run button, guarantees that at most one
//! request is in flight: `submit` outside `Ready` is ignored.

use crate::error::GseaError;
use crate::form::FormInput;
use crate::protocol::{AnalysisRequest, UnitEvent, WorkerStatus};
use crate::view::ResultView;
use std::fmt;

/// The page's handle on its computation unit.
pub trait UnitHandle {
    /// Spawns the unit. Its readiness arrives later as a [`UnitEvent`].
    fn start(&mut self) -> Result<(), String>;
    /// Posts one request. Never blocks; the answer arrives as a later event.
    fn dispatch(&mut self, request: &AnalysisRequest) -> Result<(), String>;
    fn terminate(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    Running,
    Failed,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Uninitialized => "Not started",
            Phase::Initializing => "Loading analysis module...",
            Phase::Ready => "Ready",
            Phase::Running => "Running",
            Phase::Failed => "Unavailable",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why an input was dropped without effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// `submit` while not `Ready`.
    NotReady(Phase),
    /// `start` called twice.
    AlreadyStarted,
    /// `ready` after the handshake already completed.
    RepeatedReady,
    /// A terminal status with no request outstanding.
    NoOutstandingRequest,
    /// Anything arriving after the unit became unusable.
    UnitUnavailable,
}

impl fmt::Display for Ignored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ignored::NotReady(phase) => write!(f, "submit ignored while {phase}"),
            Ignored::AlreadyStarted => f.write_str("worker already started"),
            Ignored::RepeatedReady => f.write_str("repeated ready message"),
            Ignored::NoOutstandingRequest => f.write_str("response with no outstanding request"),
            Ignored::UnitUnavailable => f.write_str("message from an unavailable worker"),
        }
    }
}

/// Effect of one coordinator input on the results area.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Replace the results area with this view.
    Render(ResultView),
    /// State changed but the results area stays as it is.
    Unchanged,
    Ignored(Ignored),
}

pub struct Coordinator<U: UnitHandle> {
    unit: U,
    phase: Phase,
    ready_received: bool,
}

impl<U: UnitHandle> Coordinator<U> {
    pub fn new(unit: U) -> Self {
        Self {
            unit,
            phase: Phase::Uninitialized,
            ready_received: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The run control is enabled exactly when a submission would be accepted.
    pub fn run_enabled(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn ready_received(&self) -> bool {
        self.ready_received
    }

    pub fn unit(&self) -> &U {
        &self.unit
    }

    pub fn start(&mut self) -> Outcome {
        if self.phase != Phase::Uninitialized {
            return Outcome::Ignored(Ignored::AlreadyStarted);
        }
        match self.unit.start() {
            Ok(()) => {
                self.phase = Phase::Initializing;
                Outcome::Unchanged
            }
            Err(error) => {
                self.phase = Phase::Failed;
                Outcome::Render(ResultView::failure(&GseaError::initialization(&error)))
            }
        }
    }

    pub fn submit(&mut self, form: &FormInput) -> Outcome {
        if self.phase != Phase::Ready {
            return Outcome::Ignored(Ignored::NotReady(self.phase));
        }
        let request = match form.marshal() {
            Ok(request) => request,
            Err(error) => return Outcome::Render(ResultView::failure(&error.into())),
        };
        match self.unit.dispatch(&request) {
            Ok(()) => {
                self.phase = Phase::Running;
                Outcome::Render(ResultView::Pending)
            }
            Err(error) => Outcome::Render(ResultView::failure(&GseaError::Computation(error))),
        }
    }

    pub fn on_event(&mut self, event: UnitEvent) -> Outcome {
        match (self.phase, event) {
            (Phase::Uninitialized | Phase::Failed, _) => {
                Outcome::Ignored(Ignored::UnitUnavailable)
            }

            (Phase::Initializing, UnitEvent::Status(WorkerStatus::Ready)) => {
                self.ready_received = true;
                self.phase = Phase::Ready;
                Outcome::Unchanged
            }
            (_, UnitEvent::Status(WorkerStatus::Ready)) => Outcome::Ignored(Ignored::RepeatedReady),

            (Phase::Running, UnitEvent::Status(WorkerStatus::Success { result })) => {
                self.phase = Phase::Ready;
                Outcome::Render(ResultView::from_payload(&result))
            }

            (Phase::Initializing, event) => match event.failure_message() {
                Some(message) => {
                    self.phase = Phase::Failed;
                    Outcome::Render(ResultView::failure(&GseaError::initialization(&message)))
                }
                None => Outcome::Ignored(Ignored::NoOutstandingRequest),
            },

            // A fatal fault means the worker's request loop is gone.
            (Phase::Running, event) => match event.failure() {
                Some(error) => {
                    self.phase = if error.is_fatal() {
                        Phase::Failed
                    } else {
                        Phase::Ready
                    };
                    Outcome::Render(ResultView::failure(&error))
                }
                None => Outcome::Ignored(Ignored::NoOutstandingRequest),
            },

            (Phase::Ready, event) => match event.failure() {
                Some(error) if error.is_fatal() => {
                    self.phase = Phase::Failed;
                    Outcome::Render(ResultView::failure(&error))
                }
                _ => Outcome::Ignored(Ignored::NoOutstandingRequest),
            },
        }
    }

    /// Stops the unit for good. Later events are ignored.
    pub fn teardown(&mut self) {
        if self.phase != Phase::Uninitialized {
            self.unit.terminate();
        }
        self.phase = Phase::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::PENDING_TEXT;
    use serde_json::json;

    #[derive(Default)]
    struct FakeUnit {
        started: usize,
        dispatched: Vec<AnalysisRequest>,
        terminated: bool,
        fail_start: Option<String>,
        fail_dispatch: Option<String>,
    }

    impl UnitHandle for FakeUnit {
        fn start(&mut self) -> Result<(), String> {
            self.started += 1;
            match &self.fail_start {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            }
        }

        fn dispatch(&mut self, request: &AnalysisRequest) -> Result<(), String> {
            if let Some(error) = &self.fail_dispatch {
                return Err(error.clone());
            }
            self.dispatched.push(request.clone());
            Ok(())
        }

        fn terminate(&mut self) {
            self.terminated = true;
        }
    }

    fn form() -> FormInput {
        FormInput {
            genes: "TP53, BRCA1 ,MYC".to_string(),
            metric: "1.0, 0.5, -2".to_string(),
            gene_sets: r#"{"HALLMARK_X": ["TP53", "MYC"]}"#.to_string(),
            weight: "1.0".to_string(),
            min_size: "1".to_string(),
            max_size: "500".to_string(),
            nperm: "100".to_string(),
            seed: "42".to_string(),
        }
    }

    fn ready_coordinator() -> Coordinator<FakeUnit> {
        let mut coordinator = Coordinator::new(FakeUnit::default());
        coordinator.start();
        coordinator.on_event(UnitEvent::Status(WorkerStatus::Ready));
        coordinator
    }

    fn success(payload: serde_json::Value) -> UnitEvent {
        UnitEvent::Status(WorkerStatus::Success { result: payload })
    }

    #[test]
    fn handshake_enables_run_control() {
        let mut coordinator = Coordinator::new(FakeUnit::default());
        assert_eq!(coordinator.phase(), Phase::Uninitialized);
        assert!(!coordinator.run_enabled());

        assert_eq!(coordinator.start(), Outcome::Unchanged);
        assert_eq!(coordinator.phase(), Phase::Initializing);
        assert!(!coordinator.run_enabled());
        assert_eq!(coordinator.unit().started, 1);

        let outcome = coordinator.on_event(UnitEvent::Status(WorkerStatus::Ready));
        assert_eq!(outcome, Outcome::Unchanged);
        assert!(coordinator.run_enabled());
        assert!(coordinator.ready_received());
    }

    #[test]
    fn start_twice_is_ignored() {
        let mut coordinator = ready_coordinator();
        assert_eq!(
            coordinator.start(),
            Outcome::Ignored(Ignored::AlreadyStarted)
        );
        assert_eq!(coordinator.unit().started, 1);
    }

    #[test]
    fn no_dispatch_before_ready() {
        let mut coordinator = Coordinator::new(FakeUnit::default());
        assert_eq!(
            coordinator.submit(&form()),
            Outcome::Ignored(Ignored::NotReady(Phase::Uninitialized))
        );
        coordinator.start();
        assert_eq!(
            coordinator.submit(&form()),
            Outcome::Ignored(Ignored::NotReady(Phase::Initializing))
        );
        assert!(coordinator.unit().dispatched.is_empty());
        assert!(!coordinator.ready_received());
    }

    #[test]
    fn submit_dispatches_once_and_shows_pending() {
        let mut coordinator = ready_coordinator();
        assert_eq!(
            coordinator.submit(&form()),
            Outcome::Render(ResultView::Pending)
        );
        assert_eq!(coordinator.phase(), Phase::Running);
        assert!(!coordinator.run_enabled());
        assert_eq!(
            coordinator.unit().dispatched[0].genes,
            vec!["TP53", "BRCA1", "MYC"]
        );
        assert_eq!(PENDING_TEXT, "Calculating...");
    }

    #[test]
    fn second_submit_while_running_is_not_dispatched() {
        let mut coordinator = ready_coordinator();
        coordinator.submit(&form());
        assert_eq!(
            coordinator.submit(&form()),
            Outcome::Ignored(Ignored::NotReady(Phase::Running))
        );
        assert_eq!(coordinator.unit().dispatched.len(), 1);
    }

    #[test]
    fn parse_failure_renders_and_keeps_run_enabled() {
        let mut coordinator = ready_coordinator();
        let mut bad = form();
        bad.metric = "1.0, abc, 2.0".to_string();

        match coordinator.submit(&bad) {
            Outcome::Render(ResultView::Failure(message)) => assert!(message.contains("abc")),
            other => panic!("expected failure view, got {other:?}"),
        }
        assert!(coordinator.unit().dispatched.is_empty());
        assert!(coordinator.run_enabled());
    }

    #[test]
    fn dispatch_failure_keeps_coordinator_ready() {
        let mut coordinator = ready_coordinator();
        coordinator.unit.fail_dispatch = Some("DataCloneError".to_string());
        assert_eq!(
            coordinator.submit(&form()),
            Outcome::Render(ResultView::Failure("DataCloneError".to_string()))
        );
        assert_eq!(coordinator.phase(), Phase::Ready);
    }

    #[test]
    fn success_renders_table_and_reenables() {
        let mut coordinator = ready_coordinator();
        coordinator.submit(&form());
        let outcome = coordinator.on_event(success(json!({"summaries": [
            {"term": "HALLMARK_X", "es": 0.5, "nes": 1.23456, "pval": 0.00012, "fdr": 0.0034}
        ]})));
        let Outcome::Render(ResultView::Table(rows)) = outcome else {
            panic!("expected table, got {outcome:?}");
        };
        assert_eq!(rows[0].nes, "1.2346");
        assert_eq!(rows[0].pval, "1.20e-4");
        assert!(coordinator.run_enabled());
    }

    #[test]
    fn invalid_result_renders_error_and_reenables() {
        let mut coordinator = ready_coordinator();
        coordinator.submit(&form());
        let outcome = coordinator.on_event(success(json!({"summaries": "not-an-array"})));
        assert_eq!(
            outcome,
            Outcome::Render(ResultView::Failure(
                "Invalid summaries structure".to_string()
            ))
        );
        assert!(coordinator.run_enabled());
    }

    #[test]
    fn computation_error_reenables() {
        let mut coordinator = ready_coordinator();
        coordinator.submit(&form());
        let outcome = coordinator.on_event(UnitEvent::Status(WorkerStatus::error("panicked")));
        assert_eq!(
            outcome,
            Outcome::Render(ResultView::Failure("panicked".to_string()))
        );
        assert_eq!(coordinator.phase(), Phase::Ready);

        // Strict alternation: the next request goes through.
        assert_eq!(
            coordinator.submit(&form()),
            Outcome::Render(ResultView::Pending)
        );
        assert_eq!(coordinator.unit().dispatched.len(), 2);
    }

    #[test]
    fn worker_fault_while_running_is_fatal() {
        let mut coordinator = ready_coordinator();
        coordinator.submit(&form());
        let outcome = coordinator.on_event(UnitEvent::Fault("unreachable executed".to_string()));
        assert_eq!(
            outcome,
            Outcome::Render(ResultView::Failure(
                "An error occurred in the worker: unreachable executed".to_string()
            ))
        );
        assert_eq!(coordinator.phase(), Phase::Failed);
        assert!(!coordinator.run_enabled());
        assert_eq!(
            coordinator.submit(&form()),
            Outcome::Ignored(Ignored::NotReady(Phase::Failed))
        );
        assert_eq!(coordinator.unit().dispatched.len(), 1);
    }

    #[test]
    fn malformed_status_while_running_reenables() {
        let mut coordinator = ready_coordinator();
        coordinator.submit(&form());
        let outcome = coordinator.on_event(UnitEvent::Malformed("missing status".to_string()));
        assert_eq!(
            outcome,
            Outcome::Render(ResultView::Failure(
                "Malformed worker message: missing status".to_string()
            ))
        );
        assert!(coordinator.run_enabled());
    }

    #[test]
    fn worker_fault_while_idle_is_fatal() {
        let mut coordinator = ready_coordinator();
        let outcome = coordinator.on_event(UnitEvent::Fault("script error".to_string()));
        assert!(matches!(outcome, Outcome::Render(ResultView::Failure(_))));
        assert_eq!(coordinator.phase(), Phase::Failed);
    }

    #[test]
    fn initialization_error_is_terminal() {
        let mut coordinator = Coordinator::new(FakeUnit::default());
        coordinator.start();
        let outcome = coordinator.on_event(UnitEvent::Status(WorkerStatus::error(
            "Failed to initialize WebAssembly: 404 Not Found",
        )));
        assert_eq!(
            outcome,
            Outcome::Render(ResultView::Failure(
                "Failed to initialize WebAssembly: 404 Not Found".to_string()
            ))
        );
        assert_eq!(coordinator.phase(), Phase::Failed);
        assert!(!coordinator.run_enabled());

        // Nothing revives it.
        assert_eq!(
            coordinator.on_event(UnitEvent::Status(WorkerStatus::Ready)),
            Outcome::Ignored(Ignored::UnitUnavailable)
        );
        assert!(!coordinator.run_enabled());
        assert_eq!(
            coordinator.submit(&form()),
            Outcome::Ignored(Ignored::NotReady(Phase::Failed))
        );
    }

    #[test]
    fn spawn_failure_is_an_initialization_error() {
        let unit = FakeUnit {
            fail_start: Some("Worker constructor threw".to_string()),
            ..FakeUnit::default()
        };
        let mut coordinator = Coordinator::new(unit);
        assert_eq!(
            coordinator.start(),
            Outcome::Render(ResultView::Failure(
                "Failed to initialize WebAssembly: Worker constructor threw".to_string()
            ))
        );
        assert_eq!(coordinator.phase(), Phase::Failed);
    }

    #[test]
    fn malformed_status_during_handshake_fails() {
        let mut coordinator = Coordinator::new(FakeUnit::default());
        coordinator.start();
        let outcome = coordinator.on_event(UnitEvent::Malformed("missing status".to_string()));
        assert!(matches!(outcome, Outcome::Render(ResultView::Failure(_))));
        assert_eq!(coordinator.phase(), Phase::Failed);
    }

    #[test]
    fn stray_messages_are_ignored() {
        let mut coordinator = ready_coordinator();
        assert_eq!(
            coordinator.on_event(UnitEvent::Status(WorkerStatus::Ready)),
            Outcome::Ignored(Ignored::RepeatedReady)
        );
        assert_eq!(
            coordinator.on_event(success(json!({"summaries": []}))),
            Outcome::Ignored(Ignored::NoOutstandingRequest)
        );
        assert_eq!(
            coordinator.on_event(UnitEvent::Status(WorkerStatus::error("late"))),
            Outcome::Ignored(Ignored::NoOutstandingRequest)
        );
        assert_eq!(coordinator.phase(), Phase::Ready);

        coordinator.submit(&form());
        assert_eq!(
            coordinator.on_event(UnitEvent::Status(WorkerStatus::Ready)),
            Outcome::Ignored(Ignored::RepeatedReady)
        );
        assert_eq!(coordinator.phase(), Phase::Running);
    }

    #[test]
    fn success_during_handshake_is_ignored() {
        let mut coordinator = Coordinator::new(FakeUnit::default());
        coordinator.start();
        assert_eq!(
            coordinator.on_event(success(json!({"summaries": []}))),
            Outcome::Ignored(Ignored::NoOutstandingRequest)
        );
        assert_eq!(coordinator.phase(), Phase::Initializing);
    }

    #[test]
    fn teardown_terminates_the_unit() {
        let mut coordinator = ready_coordinator();
        coordinator.teardown();
        assert!(coordinator.unit().terminated);
        assert_eq!(coordinator.phase(), Phase::Failed);
        assert_eq!(
            coordinator.on_event(success(json!({"summaries": []}))),
            Outcome::Ignored(Ignored::UnitUnavailable)
        );
    }
}
