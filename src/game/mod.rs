//! Session state machine.

use core::sync::atomic::{AtomicU64, Ordering};

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::sync::{Latch, LatchGuard, Mutex};

use crate::challenge::ChallengeState;
use crate::claim::Claim;
use crate::dice::{Dice, Roll};
use crate::effects::{Effect, RankUpdate};
use crate::error::ActionError;
use crate::history::{ClaimHistory, HistoryEntry};
use crate::ledger::ScoreLedger;
use crate::opponent::{BaselineOpponent, OpponentDecisionPort};
use crate::options::GameOptions;

mod actions;
mod bluff;
mod cpu;
pub mod state;

pub use state::{Actor, CpuTicket, GameMode, Phase};

/// The claim currently standing on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StandingClaim {
    claimant: Actor,
    claim: Claim,
    roll: Roll,
    truthful: bool,
}

/// A CPU claim the player has not yet accepted or called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRaise {
    claim: Claim,
    bluffed: bool,
}

#[derive(Debug, Clone)]
struct RoundState {
    phase: Phase,
    opener: Actor,
    challenge: ChallengeState,
    standing: Option<StandingClaim>,
    must_bluff: bool,
    pending_cpu_raise: Option<PendingRaise>,
    bluff_events: u32,
    correct_bluff_events: u32,
}

impl RoundState {
    const fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            opener: Actor::Player,
            challenge: ChallengeState::new(),
            standing: None,
            must_bluff: false,
            pending_cpu_raise: None,
            bluff_events: 0,
            correct_bluff_events: 0,
        }
    }

    const fn clear_round(&mut self) {
        self.challenge.clear();
        self.standing = None;
        self.must_bluff = false;
        self.pending_cpu_raise = None;
    }
}

#[derive(Debug, Clone)]
struct Histories {
    matches: ClaimHistory,
    survival: ClaimHistory,
}

impl Histories {
    const fn get_mut(&mut self, mode: GameMode) -> &mut ClaimHistory {
        match mode {
            GameMode::Match => &mut self.matches,
            GameMode::Survival => &mut self.survival,
        }
    }

    const fn get(&self, mode: GameMode) -> &ClaimHistory {
        match mode {
            GameMode::Match => &self.matches,
            GameMode::Survival => &self.survival,
        }
    }
}

/// A dice session between the player and a CPU opponent.
///
/// The session owns the dice, the standing challenge, the scores and a
/// history per mode. Every action takes `&self`; a cooperative busy flag
/// refuses overlapping transitions and a turn lock refuses player input
/// while a CPU turn is scheduled.
pub struct Session {
    /// Session options.
    pub options: GameOptions,
    /// Strategy consulted on CPU turns.
    opponent: Box<dyn OpponentDecisionPort>,
    /// Dice source shared by both sides.
    dice: Mutex<Dice>,
    /// Phase, challenge and standing claim of the current round.
    round: Mutex<RoundState>,
    /// Scores or survival streak.
    ledger: Mutex<ScoreLedger>,
    /// Claim history, one per mode.
    histories: Mutex<Histories>,
    /// Latest banner text.
    narration: Mutex<String>,
    /// Effects queued for the host.
    effects: Mutex<Vec<Effect>>,
    /// Held while a transition runs.
    busy: Latch,
    /// Set from scheduling a CPU turn until it finishes.
    turn_lock: Latch,
    /// Bumped by lifecycle resets to invalidate tickets.
    epoch: AtomicU64,
    /// Number of CPU turns scheduled so far.
    cpu_turns: AtomicU64,
    /// The only CPU turn that may still run.
    pending_ticket: Mutex<Option<CpuTicket>>,
}

impl Session {
    /// Creates an idle session with the given opponent and dice seed.
    ///
    /// Call [`Session::new_game`] or [`Session::start_run`] to begin.
    pub fn new(
        options: GameOptions,
        opponent: impl OpponentDecisionPort + 'static,
        seed: u64,
    ) -> Self {
        let histories = Histories {
            matches: ClaimHistory::new(options.history_len),
            survival: ClaimHistory::new(options.history_len),
        };
        let ledger = ScoreLedger::new(GameMode::Match, options.starting_score);

        Self {
            options,
            opponent: Box::new(opponent),
            dice: Mutex::new(Dice::new(ChaCha8Rng::seed_from_u64(seed))),
            round: Mutex::new(RoundState::idle()),
            ledger: Mutex::new(ledger),
            histories: Mutex::new(histories),
            narration: Mutex::new(String::new()),
            effects: Mutex::new(Vec::new()),
            busy: Latch::new(),
            turn_lock: Latch::new(),
            epoch: AtomicU64::new(0),
            cpu_turns: AtomicU64::new(0),
            pending_ticket: Mutex::new(None),
        }
    }

    /// Creates a session against [`BaselineOpponent`].
    #[must_use]
    pub fn with_baseline_opponent(options: GameOptions, seed: u64) -> Self {
        Self::new(options, BaselineOpponent::new(seed.rotate_left(17)), seed)
    }

    /// Starts a new match. Both scores reset and the player opens.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Busy`] if a transition is in flight.
    pub fn new_game(&self) -> Result<(), ActionError> {
        self.reset(GameMode::Match)?;
        self.narrate("New game. Roll to open.");
        info!(mode = ?GameMode::Match, "game started");
        Ok(())
    }

    /// Starts a survival run. The streak resets and the player opens.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Busy`] if a transition is in flight.
    pub fn start_run(&self) -> Result<(), ActionError> {
        self.reset(GameMode::Survival)?;
        self.narrate("Survival run started. Roll to open.");
        info!(mode = ?GameMode::Survival, "run started");
        Ok(())
    }

    /// Ends the current run, if any, and starts a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Busy`] if a transition is in flight.
    pub fn restart_run(&self) -> Result<(), ActionError> {
        self.stop_run()?;
        self.start_run()
    }

    /// Ends the current survival run and returns the session to idle.
    ///
    /// The run's streak is recorded as if it had been broken. Pending CPU
    /// turns are cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Busy`] if a transition is in flight.
    pub fn stop_run(&self) -> Result<(), ActionError> {
        let _busy = self.busy.try_acquire().ok_or(ActionError::Busy)?;
        self.cancel_cpu_turns();

        let mut ledger = self.ledger.lock();
        let live = ledger.mode() == GameMode::Survival && !ledger.is_finished();
        let mut round = self.round.lock();
        let started = round.phase != Phase::Idle;
        if live && started {
            let run = ledger.close_run();
            let update = RankUpdate {
                mode: GameMode::Survival,
                won: None,
                survival_streak: Some(run.streak),
                bluff_events: round.bluff_events,
                correct_bluff_events: round.correct_bluff_events,
            };
            self.push_effect(Effect::RecordRun { streak: run.streak });
            self.push_effect(Effect::UpdateRank(update));
            info!(streak = run.streak, best = run.best_of_session, "run stopped");
        }
        drop(ledger);
        *round = RoundState::idle();
        drop(round);

        self.narrate("Run stopped.");
        Ok(())
    }

    fn reset(&self, mode: GameMode) -> Result<(), ActionError> {
        let _busy = self.busy.try_acquire().ok_or(ActionError::Busy)?;
        self.cancel_cpu_turns();

        self.ledger.lock().reset(mode);
        self.histories.lock().get_mut(mode).clear();
        let mut round = self.round.lock();
        *round = RoundState::idle();
        round.phase = Phase::AwaitingRoll(Actor::Player);
        drop(round);
        Ok(())
    }

    /// Cancels any scheduled CPU turn.
    ///
    /// The epoch is bumped so the outstanding ticket becomes stale, and the
    /// turn lock is released. Hosts call this when tearing a session down
    /// mid-turn; lifecycle resets do it themselves.
    pub fn cancel_cpu_turns(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *self.pending_ticket.lock() = None;
        self.turn_lock.release();
        self.push_effect(Effect::CancelCpuTurns);
    }

    /// Guards a player-facing action.
    fn enter(&self, actor: Actor) -> Result<LatchGuard<'_>, ActionError> {
        if self.turn_lock.is_set() {
            return Err(self.reject(actor, ActionError::Busy));
        }
        self.busy
            .try_acquire()
            .ok_or_else(|| self.reject(actor, ActionError::Busy))
    }

    /// Logs and narrates a refused action.
    fn reject<E: core::fmt::Display>(&self, actor: Actor, err: E) -> E {
        debug!(%actor, error = %err, "action rejected");
        self.narrate(format!("{err}."));
        err
    }

    fn narrate(&self, text: impl Into<String>) {
        *self.narration.lock() = text.into();
    }

    fn push_effect(&self, effect: Effect) {
        self.effects.lock().push(effect);
    }

    fn push_history(&self, entry: HistoryEntry) {
        let mode = self.ledger.lock().mode();
        self.histories.lock().get_mut(mode).push(entry);
    }

    /// Queues the opponent's learning state for persistence.
    fn persist_opponent(&self) {
        if let Some(blob) = self.opponent.snapshot() {
            self.push_effect(Effect::SaveOpponentState(blob));
        }
    }

    /// Takes every queued effect, oldest first.
    pub fn drain_effects(&self) -> Vec<Effect> {
        core::mem::take(&mut *self.effects.lock())
    }

    /// Queues rolls to be used before random ones.
    pub fn force_rolls<I: IntoIterator<Item = Roll>>(&self, rolls: I) {
        self.dice.lock().force(rolls);
    }

    /// The opponent strategy.
    #[must_use]
    pub fn opponent(&self) -> &dyn OpponentDecisionPort {
        self.opponent.as_ref()
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.round.lock().phase
    }

    /// Current mode.
    pub fn mode(&self) -> GameMode {
        self.ledger.lock().mode()
    }

    /// The side expected to act.
    pub fn current_actor(&self) -> Option<Actor> {
        self.phase().actor()
    }

    /// The value the acting side must meet or beat.
    pub fn active_challenge(&self) -> Option<Claim> {
        self.round.lock().challenge.active()
    }

    /// The full challenge state.
    pub fn challenge(&self) -> ChallengeState {
        self.round.lock().challenge
    }

    /// The standing claim and who made it.
    pub fn standing_claim(&self) -> Option<(Actor, Claim)> {
        self.round
            .lock()
            .standing
            .map(|standing| (standing.claimant, standing.claim))
    }

    /// The roll waiting to be declared, if any.
    pub fn pending_roll(&self) -> Option<Roll> {
        match self.phase() {
            Phase::AwaitingClaim { roll, .. } => Some(roll),
            _ => None,
        }
    }

    /// Whether the pending roll cannot be declared truthfully.
    pub fn must_bluff(&self) -> bool {
        self.round.lock().must_bluff
    }

    /// Legal claims for the side holding the pending roll.
    pub fn claim_options(&self) -> Vec<Claim> {
        let round = self.round.lock();
        let roll = match round.phase {
            Phase::AwaitingClaim { roll, .. } => Some(roll),
            _ => None,
        };
        round.challenge.options_for(roll)
    }

    /// Latest narration line for banners.
    pub fn narration(&self) -> String {
        self.narration.lock().clone()
    }

    /// History of the current mode, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        let mode = self.mode();
        self.histories.lock().get(mode).to_vec()
    }

    /// Score of `actor` (match mode).
    pub fn score(&self, actor: Actor) -> u32 {
        self.ledger.lock().score(actor)
    }

    /// Current survival streak.
    pub fn streak(&self) -> u32 {
        self.ledger.lock().streak()
    }

    /// Best survival streak this session.
    pub fn best_streak(&self) -> u32 {
        self.ledger.lock().best_streak()
    }

    /// Whether the game is over or the run is broken.
    pub fn is_finished(&self) -> bool {
        self.phase().is_terminal()
    }

    /// Whether a transition is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    /// Whether a CPU turn is scheduled or running.
    pub fn is_cpu_thinking(&self) -> bool {
        self.turn_lock.is_set()
    }

    /// The scheduled CPU turn, if any.
    pub fn pending_cpu_turn(&self) -> Option<CpuTicket> {
        *self.pending_ticket.lock()
    }

    /// Bluff calls by the player this game, and how many caught a lie.
    pub fn bluff_stats(&self) -> (u32, u32) {
        let round = self.round.lock();
        (round.bluff_events, round.correct_bluff_events)
    }
}
