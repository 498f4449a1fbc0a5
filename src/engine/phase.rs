//! engine::phase
//!
//! The commit pipeline as an explicit state machine.
//!
//! ```text
//! Idle -> ResolvingTargets -> ReadingBase -> UploadingBlobs -> BuildingTree
//!      -> CheckingIdempotency -> NoOp -> Done
//!                             -> BuildingCommit -> UpdatingRef -> SyncingLocal -> Done
//! ```
//!
//! `ResolvingTargets -> Done` covers the no-files and dry-run exits.
//! `Failed` is reachable from every non-terminal phase.

use serde::Serialize;
use tracing::debug;

use crate::error::PluginError;

/// A pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    ResolvingTargets,
    ReadingBase,
    UploadingBlobs,
    BuildingTree,
    CheckingIdempotency,
    NoOp,
    BuildingCommit,
    UpdatingRef,
    SyncingLocal,
    Done,
    Failed,
}

impl Phase {
    /// Get the phase name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::ResolvingTargets => "resolving_targets",
            Phase::ReadingBase => "reading_base",
            Phase::UploadingBlobs => "uploading_blobs",
            Phase::BuildingTree => "building_tree",
            Phase::CheckingIdempotency => "checking_idempotency",
            Phase::NoOp => "no_op",
            Phase::BuildingCommit => "building_commit",
            Phase::UpdatingRef => "updating_ref",
            Phase::SyncingLocal => "syncing_local",
            Phase::Done => "done",
            Phase::Failed => "failed",
        }
    }

    /// Whether the run is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }

    /// Whether the phase writes to the remote.
    ///
    /// A failure in or after one of these phases may leave unreferenced
    /// objects behind on the remote.
    pub fn mutates_remote(&self) -> bool {
        matches!(
            self,
            Phase::UploadingBlobs | Phase::BuildingTree | Phase::BuildingCommit | Phase::UpdatingRef
        )
    }

    /// Whether `next` may follow this phase.
    pub fn can_transition_to(&self, next: Phase) -> bool {
        use Phase::*;

        if next == Failed {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (Idle, ResolvingTargets)
                | (ResolvingTargets, ReadingBase)
                | (ResolvingTargets, Done)
                | (ReadingBase, UploadingBlobs)
                | (UploadingBlobs, BuildingTree)
                | (BuildingTree, CheckingIdempotency)
                | (CheckingIdempotency, NoOp)
                | (CheckingIdempotency, BuildingCommit)
                | (NoOp, Done)
                | (BuildingCommit, UpdatingRef)
                | (UpdatingRef, SyncingLocal)
                | (SyncingLocal, Done)
        )
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Tracks the current phase of one run and logs each transition.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    current: Phase,
    history: Vec<Phase>,
}

impl PhaseTracker {
    /// Start in `Idle`.
    pub fn new() -> Self {
        Self {
            current: Phase::Idle,
            history: vec![Phase::Idle],
        }
    }

    /// The current phase.
    pub fn current(&self) -> Phase {
        self.current
    }

    /// Every phase entered so far, in order.
    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    /// Move to `next`.
    pub fn advance(&mut self, next: Phase) {
        debug_assert!(
            self.current.can_transition_to(next),
            "illegal phase transition {} -> {}",
            self.current,
            next
        );
        debug!(from = %self.current, to = %next, "phase");
        self.current = next;
        self.history.push(next);
    }

    /// Move to `Failed`, remembering where the failure happened.
    ///
    /// Returns the phase that failed. Does nothing once terminal.
    pub fn fail(&mut self, err: &PluginError) -> Phase {
        let failed_in = self.current;
        if !failed_in.is_terminal() {
            debug!(phase = %failed_in, code = %err.code, "phase failed");
            self.current = Phase::Failed;
            self.history.push(Phase::Failed);
        }
        failed_in
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    mod transitions {
        use super::*;

        #[test]
        fn commit_path() {
            let path = [
                Phase::Idle,
                Phase::ResolvingTargets,
                Phase::ReadingBase,
                Phase::UploadingBlobs,
                Phase::BuildingTree,
                Phase::CheckingIdempotency,
                Phase::BuildingCommit,
                Phase::UpdatingRef,
                Phase::SyncingLocal,
                Phase::Done,
            ];
            for pair in path.windows(2) {
                assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
            }
        }

        #[test]
        fn no_op_path() {
            assert!(Phase::CheckingIdempotency.can_transition_to(Phase::NoOp));
            assert!(Phase::NoOp.can_transition_to(Phase::Done));
            assert!(!Phase::NoOp.can_transition_to(Phase::BuildingCommit));
        }

        #[test]
        fn early_exit_only_before_reads() {
            assert!(Phase::ResolvingTargets.can_transition_to(Phase::Done));
            assert!(!Phase::ReadingBase.can_transition_to(Phase::Done));
            assert!(!Phase::UpdatingRef.can_transition_to(Phase::Done));
        }

        #[test]
        fn ref_update_requires_commit() {
            assert!(!Phase::BuildingTree.can_transition_to(Phase::UpdatingRef));
            assert!(!Phase::CheckingIdempotency.can_transition_to(Phase::UpdatingRef));
        }

        #[test]
        fn failed_reachable_from_non_terminal() {
            assert!(Phase::Idle.can_transition_to(Phase::Failed));
            assert!(Phase::SyncingLocal.can_transition_to(Phase::Failed));
            assert!(!Phase::Done.can_transition_to(Phase::Failed));
            assert!(!Phase::Failed.can_transition_to(Phase::Failed));
        }

        #[test]
        fn mutating_phases() {
            assert!(!Phase::ReadingBase.mutates_remote());
            assert!(Phase::UploadingBlobs.mutates_remote());
            assert!(Phase::UpdatingRef.mutates_remote());
            assert!(!Phase::SyncingLocal.mutates_remote());
        }
    }

    mod tracker {
        use super::*;

        #[test]
        fn records_history() {
            let mut tracker = PhaseTracker::new();
            tracker.advance(Phase::ResolvingTargets);
            tracker.advance(Phase::Done);
            assert_eq!(tracker.current(), Phase::Done);
            assert_eq!(
                tracker.history(),
                &[Phase::Idle, Phase::ResolvingTargets, Phase::Done]
            );
        }

        #[test]
        fn fail_reports_failing_phase() {
            let mut tracker = PhaseTracker::new();
            tracker.advance(Phase::ResolvingTargets);
            let err = PluginError::new(ErrorCode::NoAuth, "no token");
            assert_eq!(tracker.fail(&err), Phase::ResolvingTargets);
            assert_eq!(tracker.current(), Phase::Failed);

            // Already terminal: unchanged.
            assert_eq!(tracker.fail(&err), Phase::Failed);
            assert_eq!(tracker.history().len(), 3);
        }

        #[test]
        fn display_names() {
            assert_eq!(Phase::CheckingIdempotency.to_string(), "checking_idempotency");
            assert_eq!(Phase::NoOp.to_string(), "no_op");
        }
    }
}
