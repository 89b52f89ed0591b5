//! Lifecycle control for one emulation run.
//!
//! The host owns a [`LifecycleState`] and shares it with the core's main
//! loop, which polls [`is_paused`](LifecycleState::is_paused) and
//! [`is_cancelled`](LifecycleState::is_cancelled) once per iteration. The
//! state is an explicit object scoped to a single run — it is created with
//! the run and destroyed with it, never a process-wide singleton.

use emberbox_types::RunId;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Coarse phase of an emulation run, derived from the control flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Running,
    Paused,
    /// Cancellation was requested; the core is unwinding toward shutdown.
    Cancelling,
    Terminated,
}

/// Pause/cancel flags polled by the core's main loop.
///
/// Mutated only by the host. Polling costs one atomic load per flag, so the
/// core can afford to check both every iteration.
#[derive(Debug)]
pub struct LifecycleState {
    run_id: RunId,
    paused: AtomicBool,
    cancelled: AtomicBool,
    terminated: AtomicBool,
}

impl LifecycleState {
    /// Creates the state for a fresh run.
    #[must_use]
    pub fn new() -> Self {
        Self::with_run_id(RunId::new())
    }

    /// Creates the state for a run with a caller-chosen identifier.
    #[must_use]
    pub fn with_run_id(run_id: RunId) -> Self {
        Self {
            run_id,
            paused: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
        }
    }

    /// Identifier of the run this state is scoped to.
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// When true, the core suspends forward progress but keeps its event
    /// pump alive so it can resume later.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// When true, the core unwinds its full execution stack and terminates
    /// cleanly. Monotonic: once true, true for the remainder of the run.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        debug!(run_id = %self.run_id, "emulation paused");
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        debug!(run_id = %self.run_id, "emulation resumed");
    }

    /// Requests cooperative cancellation. Takes effect at the core's next
    /// polling point; there is no way to rescind it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        info!(run_id = %self.run_id, "cancellation requested");
    }

    /// Marks the run as fully shut down. Called once the core has released
    /// its emulation resources.
    pub fn mark_terminated(&self) {
        self.terminated.store(true, Ordering::SeqCst);
        info!(run_id = %self.run_id, "emulation terminated");
    }

    /// Derives the run phase. Termination and cancellation take precedence
    /// over the pause flag.
    pub fn phase(&self) -> RunPhase {
        if self.terminated.load(Ordering::SeqCst) {
            RunPhase::Terminated
        } else if self.is_cancelled() {
            RunPhase::Cancelling
        } else if self.is_paused() {
            RunPhase::Paused
        } else {
            RunPhase::Running
        }
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running() {
        let state = LifecycleState::new();
        assert!(!state.is_paused());
        assert!(!state.is_cancelled());
        assert_eq!(state.phase(), RunPhase::Running);
    }

    #[test]
    fn pause_and_resume_alternate() {
        let state = LifecycleState::new();
        state.pause();
        assert!(state.is_paused());
        assert_eq!(state.phase(), RunPhase::Paused);
        state.resume();
        assert!(!state.is_paused());
        assert_eq!(state.phase(), RunPhase::Running);
    }

    #[test]
    fn cancel_is_monotonic() {
        let state = LifecycleState::new();
        state.cancel();
        assert!(state.is_cancelled());
        // Pause churn does not disturb the cancelled flag.
        state.pause();
        state.resume();
        assert!(state.is_cancelled());
        assert_eq!(state.phase(), RunPhase::Cancelling);
    }

    #[test]
    fn cancellation_outranks_pause_in_phase() {
        let state = LifecycleState::new();
        state.pause();
        state.cancel();
        assert_eq!(state.phase(), RunPhase::Cancelling);
    }

    #[test]
    fn terminated_is_terminal_phase() {
        let state = LifecycleState::new();
        state.cancel();
        state.mark_terminated();
        assert_eq!(state.phase(), RunPhase::Terminated);
    }

    #[test]
    fn run_id_is_stable() {
        let state = LifecycleState::new();
        assert_eq!(state.run_id(), state.run_id());
    }
}
