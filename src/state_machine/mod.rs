// State machine for a single orchestration run.
//
// The orchestrator moves strictly forward through its states; there is no
// retry loop and no way back once the merge job has been attempted.

pub mod orchestrator_state_machine;
pub mod states;

pub use orchestrator_state_machine::{OrchestratorStateMachine, StateTransition};
pub use states::OrchestratorState;
