use serde::{Deserialize, Serialize};
use std::fmt;

/// Orchestrator run states
///
/// `Init → SubmittingBatches(0..N) → AllBatchesAttempted → SubmittingMerge → Done`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "index")]
pub enum OrchestratorState {
    /// Configuration accepted, nothing submitted yet
    Init,
    /// Generating and submitting the batch with this index
    SubmittingBatches(usize),
    /// Every batch index has been attempted
    AllBatchesAttempted,
    /// Merge descriptor generated and being submitted
    SubmittingMerge,
    /// Merge submission attempted; reached once per run
    Done,
}

impl OrchestratorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Single-pass forward transitions only; batch indices advance by one
    pub fn can_transition_to(&self, next: &Self) -> bool {
        match (self, next) {
            (Self::Init, Self::SubmittingBatches(0)) => true,
            (Self::Init, Self::AllBatchesAttempted) => true,
            (Self::SubmittingBatches(i), Self::SubmittingBatches(j)) => *j == i + 1,
            (Self::SubmittingBatches(_), Self::AllBatchesAttempted) => true,
            (Self::AllBatchesAttempted, Self::SubmittingMerge) => true,
            (Self::SubmittingMerge, Self::Done) => true,
            _ => false,
        }
    }
}

impl Default for OrchestratorState {
    fn default() -> Self {
        Self::Init
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::SubmittingBatches(index) => write!(f, "submitting_batches({index})"),
            Self::AllBatchesAttempted => write!(f, "all_batches_attempted"),
            Self::SubmittingMerge => write!(f, "submitting_merge"),
            Self::Done => write!(f, "done"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_are_allowed() {
        use OrchestratorState::*;
        assert!(Init.can_transition_to(&SubmittingBatches(0)));
        assert!(SubmittingBatches(0).can_transition_to(&SubmittingBatches(1)));
        assert!(SubmittingBatches(4).can_transition_to(&AllBatchesAttempted));
        assert!(AllBatchesAttempted.can_transition_to(&SubmittingMerge));
        assert!(SubmittingMerge.can_transition_to(&Done));
        // zero batches skip straight past the loop
        assert!(Init.can_transition_to(&AllBatchesAttempted));
    }

    #[test]
    fn backward_and_skipping_transitions_are_rejected() {
        use OrchestratorState::*;
        assert!(!SubmittingBatches(1).can_transition_to(&SubmittingBatches(1)));
        assert!(!SubmittingBatches(1).can_transition_to(&SubmittingBatches(0)));
        assert!(!SubmittingBatches(1).can_transition_to(&SubmittingBatches(3)));
        assert!(!Init.can_transition_to(&SubmittingBatches(1)));
        assert!(!Init.can_transition_to(&SubmittingMerge));
        assert!(!Done.can_transition_to(&Init));
        assert!(!SubmittingMerge.can_transition_to(&SubmittingBatches(0)));
        assert!(Done.is_terminal());
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(OrchestratorState::SubmittingBatches(3).to_string(), "submitting_batches(3)");
        assert_eq!(OrchestratorState::AllBatchesAttempted.to_string(), "all_batches_attempted");
    }
}
