//! `tokio` driver that runs a session's effects and CPU thinking timers.

use alloc::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::effects::{Effect, EffectRunner};
use crate::error::{ActionError, ClaimError};
use crate::game::{Actor, CpuTicket, Session};
use crate::result::{ClaimReport, RollReport, RoundOutcome};
use crate::sync::Mutex;

/// Owns a session and delivers its effects.
///
/// Each action is forwarded to the [`Session`]; afterwards the queued effects
/// go to the [`EffectRunner`], and CPU turns are played on a timer task.
/// Lifecycle resets abort the timer, and a timer that fires for an old
/// ticket is discarded by the session.
#[derive(Clone)]
pub struct Driver {
    session: Arc<Session>,
    runner: Arc<EffectRunner>,
    timer: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Driver {
    /// Wraps a session. Saved opponent state is restored through the runner.
    #[must_use]
    pub fn new(session: Session, runner: EffectRunner) -> Self {
        if runner.restore_opponent(session.opponent()) {
            info!("opponent state restored");
        }
        Self {
            session: Arc::new(session),
            runner: Arc::new(runner),
            timer: Arc::new(Mutex::new(None)),
        }
    }

    /// The driven session, for reading observables.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Starts a new match.
    ///
    /// # Errors
    ///
    /// Returns an error if a transition is in flight.
    pub fn new_game(&self) -> Result<(), ActionError> {
        let result = self.session.new_game();
        self.flush();
        result
    }

    /// Starts a survival run.
    ///
    /// # Errors
    ///
    /// Returns an error if a transition is in flight.
    pub fn start_run(&self) -> Result<(), ActionError> {
        let result = self.session.start_run();
        self.flush();
        result
    }

    /// Restarts the survival run.
    ///
    /// # Errors
    ///
    /// Returns an error if a transition is in flight.
    pub fn restart_run(&self) -> Result<(), ActionError> {
        let result = self.session.restart_run();
        self.flush();
        result
    }

    /// Stops the survival run.
    ///
    /// # Errors
    ///
    /// Returns an error if a transition is in flight.
    pub fn stop_run(&self) -> Result<(), ActionError> {
        let result = self.session.stop_run();
        self.flush();
        result
    }

    /// Rolls for `actor`.
    ///
    /// # Errors
    ///
    /// See [`Session::roll`].
    pub fn roll(&self, actor: Actor) -> Result<RollReport, ActionError> {
        let result = self.session.roll(actor);
        self.flush();
        result
    }

    /// Claims for `actor`, scheduling the CPU's answer.
    ///
    /// # Errors
    ///
    /// See [`Session::claim`].
    pub fn claim(&self, actor: Actor, code: u8) -> Result<ClaimReport, ClaimError> {
        let result = self.session.claim(actor, code);
        self.flush();
        result
    }

    /// Calls the standing claim for `actor`.
    ///
    /// # Errors
    ///
    /// See [`Session::call_bluff`].
    pub fn call_bluff(&self, actor: Actor) -> Result<RoundOutcome, ActionError> {
        let result = self.session.call_bluff(actor);
        self.flush();
        result
    }

    /// Cancels any pending CPU turn, e.g. when the host navigates away.
    pub fn shutdown(&self) {
        self.session.cancel_cpu_turns();
        self.flush();
        info!("driver shut down");
    }

    /// Runs queued effects and arms or aborts the CPU timer.
    pub fn flush(&self) {
        let effects = self.session.drain_effects();
        for effect in self.runner.run(effects) {
            match effect {
                Effect::CancelCpuTurns => self.abort_timer(),
                Effect::ScheduleCpuTurn { ticket, delay } => {
                    let driver = self.clone();
                    let handle = tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        driver.play_cpu_turn(ticket);
                    });
                    self.abort_timer();
                    *self.timer.lock() = Some(handle);
                }
                _ => {}
            }
        }
    }

    fn play_cpu_turn(&self, ticket: CpuTicket) {
        match self.session.run_cpu_turn(ticket) {
            Ok(turn) => debug!(?ticket, action = ?turn.action, "cpu turn played"),
            Err(ClaimError::Action(ActionError::StaleTicket)) => {
                debug!(?ticket, "stale cpu turn dropped");
            }
            Err(err) => warn!(?ticket, error = %err, "cpu turn failed"),
        }
        self.flush();
    }

    fn abort_timer(&self) {
        if let Some(handle) = self.timer.lock().take() {
            handle.abort();
            debug!("cpu timer aborted");
        }
    }
}
