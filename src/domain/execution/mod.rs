//! Execution handle state machine
//!
//! One handle per in-flight engine invocation. Engine callbacks arrive as
//! [`EngineEvent`]s; the first terminal event resolves the handle and every
//! later event is ignored.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::model::MergeOutput;

/// Lifecycle state of one engine invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Submitted,
    Running,
    Succeeded,
    Failed,
}

impl ExecutionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionState::Succeeded | ExecutionState::Failed)
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionState::Submitted => "submitted",
            ExecutionState::Running => "running",
            ExecutionState::Succeeded => "succeeded",
            ExecutionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Engine callbacks plus the controller's own terminal signals
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Start,
    Progress(String),
    Success(String),
    Failure(String),
    Finish,
    Cancelled,
    TimedOut,
}

impl EngineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::Start => "start",
            EngineEvent::Progress(_) => "progress",
            EngineEvent::Success(_) => "success",
            EngineEvent::Failure(_) => "failure",
            EngineEvent::Finish => "finish",
            EngineEvent::Cancelled => "cancelled",
            EngineEvent::TimedOut => "timed_out",
        }
    }
}

/// Result of feeding one event to a handle
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// State changed without resolving (`Submitted -> Running`)
    Advanced(ExecutionState),
    /// Event seen, state unchanged (progress, duplicate start)
    Observed,
    /// First terminal event; the caller result is this outcome
    Resolved(Result<MergeOutput, DomainError>),
    /// Arrived after resolution; must not affect the caller
    Ignored,
}

/// One in-flight engine invocation and the output path it owns
#[derive(Debug, Clone)]
pub struct ExecutionHandle {
    id: Uuid,
    output_path: PathBuf,
    state: ExecutionState,
    submitted_at: DateTime<Utc>,
    progress_events: usize,
    last_progress: Option<String>,
}

impl ExecutionHandle {
    /// Create a handle at submission time
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            output_path: output_path.into(),
            state: ExecutionState::Submitted,
            submitted_at: Utc::now(),
            progress_events: 0,
            last_progress: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn progress_events(&self) -> usize {
        self.progress_events
    }

    pub fn last_progress(&self) -> Option<&str> {
        self.last_progress.as_deref()
    }

    /// Apply one event
    pub fn apply(&mut self, event: EngineEvent) -> Transition {
        if self.state.is_terminal() {
            return Transition::Ignored;
        }

        match event {
            EngineEvent::Start => {
                if self.state == ExecutionState::Submitted {
                    self.state = ExecutionState::Running;
                    Transition::Advanced(self.state)
                } else {
                    Transition::Observed
                }
            }
            EngineEvent::Progress(message) => {
                self.progress_events += 1;
                self.last_progress = Some(message);
                Transition::Observed
            }
            EngineEvent::Success(_) => {
                self.state = ExecutionState::Succeeded;
                Transition::Resolved(Ok(MergeOutput::new(self.output_path.clone())))
            }
            EngineEvent::Failure(message) => self.fail(DomainError::EngineExecutionFailure(message)),
            EngineEvent::Finish => self.fail(DomainError::EngineExecutionFailure(
                "engine finished without reporting an outcome".to_string(),
            )),
            EngineEvent::Cancelled => {
                self.fail(DomainError::Cancelled("merge cancelled by caller".to_string()))
            }
            EngineEvent::TimedOut => self.fail(DomainError::TimedOut(
                "engine did not finish before the deadline".to_string(),
            )),
        }
    }

    fn fail(&mut self, error: DomainError) -> Transition {
        self.state = ExecutionState::Failed;
        Transition::Resolved(Err(error))
    }
}
