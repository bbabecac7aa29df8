use super::states::OrchestratorState;
use crate::error::{OrchestratorError, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Recorded transition, kept for the run summary and for tests
#[derive(Debug, Clone, PartialEq)]
pub struct StateTransition {
    pub from: OrchestratorState,
    pub to: OrchestratorState,
    pub at: DateTime<Utc>,
}

/// Guards the orchestrator's single forward pass
#[derive(Debug, Default)]
pub struct OrchestratorStateMachine {
    current: OrchestratorState,
    history: Vec<StateTransition>,
}

impl OrchestratorStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> OrchestratorState {
        self.current
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    pub fn transition_to(&mut self, next: OrchestratorState) -> Result<()> {
        if !self.current.can_transition_to(&next) {
            return Err(OrchestratorError::StateTransitionError {
                from: self.current,
                to: next,
            });
        }
        debug!(from = %self.current, to = %next, "Orchestrator transition");
        self.history.push(StateTransition {
            from: self.current,
            to: next,
            at: Utc::now(),
        });
        self.current = next;
        Ok(())
    }
}
