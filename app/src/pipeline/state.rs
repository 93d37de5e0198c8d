//! Pipeline State Machine - single source of truth for valid run transitions
//!
//! State diagram:
//! ```text
//! Idle ──SizeMeasured──> SizeChecked ──ExceedsCeiling──> Compressing ──CompressionFinished──> Compressed ─┐
//!                             │                                                                         │
//!                             └──WithinCeiling──> SkipCompression ──────────────────────────────────────┤
//!                                                                                                       │
//!                                      Done <──ResultReady── Transcribing <──DispatchStarted────────────┘
//!
//! Any non-terminal state ──Failed──> Error
//! ```
//!
//! Done and Error are terminal. A tracker lives for exactly one run.

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum PipelineEvent {
    /// Input byte size was read
    SizeMeasured,
    /// Input is larger than the ceiling
    ExceedsCeiling,
    /// Input already fits under the ceiling
    WithinCeiling,
    /// Compressed asset written
    CompressionFinished,
    /// Asset handed to the dispatcher
    DispatchStarted,
    /// Transcript received
    ResultReady,
    /// Any step failed
    Failed,
}

/// Pipeline states
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum PipelineState {
    Idle,
    SizeChecked,
    Compressing,
    Compressed,
    SkipCompression,
    Transcribing,
    Done,
    Error,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// Reason a transition was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{attempted_event} event rejected in {current_state} state")]
pub struct TransitionRejection {
    pub current_state: PipelineState,
    pub attempted_event: PipelineEvent,
}

/// Tracks the state of a single pipeline run and every state it visited
#[derive(Debug, Clone)]
pub struct PipelineTracker {
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl PipelineTracker {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        }
    }

    pub fn current(&self) -> PipelineState {
        self.state
    }

    /// States visited so far, starting with `Idle`
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Attempt a state transition based on an event
    ///
    /// This is the ONLY way to change state - ensures all transitions are valid.
    pub fn transition(&mut self, event: PipelineEvent) -> Result<PipelineState, TransitionRejection> {
        match compute_transition(self.state, event) {
            Some(next) => {
                log::debug!("Pipeline {} --{}--> {}", self.state, event, next);
                self.state = next;
                self.history.push(next);
                Ok(next)
            }
            None => Err(TransitionRejection {
                current_state: self.state,
                attempted_event: event,
            }),
        }
    }

    /// Like [`transition`](Self::transition), but a rejection is only logged
    pub fn advance(&mut self, event: PipelineEvent) {
        if let Err(rejection) = self.transition(event) {
            log::warn!("{}", rejection);
        }
    }
}

impl Default for PipelineTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure function: compute what transition should happen (if any)
/// Returns None if the transition is invalid
fn compute_transition(current: PipelineState, event: PipelineEvent) -> Option<PipelineState> {
    if event == PipelineEvent::Failed {
        return (!current.is_terminal()).then_some(PipelineState::Error);
    }

    match (current, event) {
        (PipelineState::Idle, PipelineEvent::SizeMeasured) => Some(PipelineState::SizeChecked),
        (PipelineState::SizeChecked, PipelineEvent::ExceedsCeiling) => {
            Some(PipelineState::Compressing)
        }
        (PipelineState::SizeChecked, PipelineEvent::WithinCeiling) => {
            Some(PipelineState::SkipCompression)
        }
        (PipelineState::Compressing, PipelineEvent::CompressionFinished) => {
            Some(PipelineState::Compressed)
        }
        (
            PipelineState::Compressed | PipelineState::SkipCompression,
            PipelineEvent::DispatchStarted,
        ) => Some(PipelineState::Transcribing),
        (PipelineState::Transcribing, PipelineEvent::ResultReady) => Some(PipelineState::Done),
        _ => None,
    }
}
