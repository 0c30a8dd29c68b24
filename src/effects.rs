//! Side effects requested by session transitions, and the runner that
//! delivers them to external gateways.
//!
//! Transitions only queue [`Effect`]s. Hosts drain them with
//! [`Session::drain_effects`](crate::Session::drain_effects) and hand them to
//! an [`EffectRunner`]. Gateway failures are logged and dropped; they never
//! reach game state.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::time::Duration;

use tracing::{debug, warn};

use crate::claim::Claim;
use crate::error::GatewayError;
use crate::game::state::{Actor, CpuTicket, GameMode};
use crate::opponent::OpponentDecisionPort;

/// Outcome of a resolved round, as reported to stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeRecord {
    /// Mode being played.
    pub mode: GameMode,
    /// Who called the bluff, or who failed to answer Inferno.
    pub caller: Actor,
    /// Who paid the penalty.
    pub loser: Actor,
    /// Whether the called claim was a lie.
    pub liar: bool,
    /// Points charged.
    pub penalty: u8,
    /// Whether the round ended because Inferno went unanswered.
    pub forfeit: bool,
}

/// Result of a finished game or run, as reported to ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankUpdate {
    /// Mode being played.
    pub mode: GameMode,
    /// Whether the player won (match mode).
    pub won: Option<bool>,
    /// Final streak (survival mode).
    pub survival_streak: Option<u32>,
    /// Bluff calls made by the player.
    pub bluff_events: u32,
    /// Bluff calls by the player that caught a lie.
    pub correct_bluff_events: u32,
}

/// A side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// A roll was made.
    RecordRoll(Claim),
    /// A claim was declared.
    RecordClaim(Claim),
    /// A round was resolved by a bluff call or a forfeit.
    RecordOutcome(OutcomeRecord),
    /// A survival run ended with this streak.
    RecordRun {
        /// Final streak.
        streak: u32,
    },
    /// The opponent's learning state changed.
    SaveOpponentState(Vec<u8>),
    /// A game or run finished.
    UpdateRank(RankUpdate),
    /// The CPU should act after `delay`.
    ScheduleCpuTurn {
        /// Identifies the turn; stale tickets are rejected.
        ticket: CpuTicket,
        /// Thinking delay before acting.
        delay: Duration,
    },
    /// Any scheduled CPU turn is obsolete.
    CancelCpuTurns,
}

/// Persistence for the opponent's opaque learning state.
pub trait PersistenceGateway: Send + Sync {
    /// Stores the blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn save_opponent_state(&self, blob: &[u8]) -> Result<(), GatewayError>;

    /// Loads the last stored blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn load(&self) -> Result<Option<Vec<u8>>, GatewayError>;
}

/// Fire-and-forget telemetry.
pub trait StatsGateway: Send + Sync {
    /// Records a roll.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn record_roll(&self, claim: Claim) -> Result<(), GatewayError>;

    /// Records a declared claim.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn record_claim(&self, claim: Claim) -> Result<(), GatewayError>;

    /// Records a resolved round.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn record_outcome(&self, outcome: &OutcomeRecord) -> Result<(), GatewayError>;

    /// Records a finished survival run.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn record_run(&self, streak: u32) -> Result<(), GatewayError>;
}

/// Best-effort ranking updates.
pub trait RankGateway: Send + Sync {
    /// Updates the player's rank from a finished game or run.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn update_from_result(&self, update: &RankUpdate) -> Result<(), GatewayError>;
}

/// Delivers effects to whichever gateways are configured.
#[derive(Default)]
pub struct EffectRunner {
    stats: Option<Box<dyn StatsGateway>>,
    persistence: Option<Box<dyn PersistenceGateway>>,
    rank: Option<Box<dyn RankGateway>>,
}

impl EffectRunner {
    /// Creates a runner with no gateways.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stats gateway.
    #[must_use]
    pub fn with_stats(mut self, stats: impl StatsGateway + 'static) -> Self {
        self.stats = Some(Box::new(stats));
        self
    }

    /// Adds a persistence gateway.
    #[must_use]
    pub fn with_persistence(mut self, persistence: impl PersistenceGateway + 'static) -> Self {
        self.persistence = Some(Box::new(persistence));
        self
    }

    /// Adds a rank gateway.
    #[must_use]
    pub fn with_rank(mut self, rank: impl RankGateway + 'static) -> Self {
        self.rank = Some(Box::new(rank));
        self
    }

    /// Restores the opponent's learning state from persistence.
    ///
    /// Returns `true` if a blob was loaded and accepted.
    pub fn restore_opponent(&self, opponent: &dyn OpponentDecisionPort) -> bool {
        let Some(persistence) = &self.persistence else {
            return false;
        };
        match persistence.load() {
            Ok(Some(blob)) => match opponent.restore(&blob) {
                Ok(()) => true,
                Err(err) => {
                    warn!(error = %err, "discarding unreadable opponent state");
                    false
                }
            },
            Ok(None) => false,
            Err(err) => {
                warn!(error = %err, "failed to load opponent state");
                false
            }
        }
    }

    /// Runs gateway effects and returns the scheduling effects the caller
    /// must handle itself.
    pub fn run<I>(&self, effects: I) -> Vec<Effect>
    where
        I: IntoIterator<Item = Effect>,
    {
        let mut scheduling = Vec::new();
        for effect in effects {
            match effect {
                Effect::RecordRoll(claim) => {
                    if let Some(stats) = &self.stats {
                        log_failure("record_roll", stats.record_roll(claim));
                    }
                }
                Effect::RecordClaim(claim) => {
                    if let Some(stats) = &self.stats {
                        log_failure("record_claim", stats.record_claim(claim));
                    }
                }
                Effect::RecordOutcome(outcome) => {
                    if let Some(stats) = &self.stats {
                        log_failure("record_outcome", stats.record_outcome(&outcome));
                    }
                }
                Effect::RecordRun { streak } => {
                    if let Some(stats) = &self.stats {
                        log_failure("record_run", stats.record_run(streak));
                    }
                }
                Effect::SaveOpponentState(blob) => {
                    if let Some(persistence) = &self.persistence {
                        log_failure(
                            "save_opponent_state",
                            persistence.save_opponent_state(&blob),
                        );
                    }
                }
                Effect::UpdateRank(update) => {
                    if let Some(rank) = &self.rank {
                        log_failure("update_from_result", rank.update_from_result(&update));
                    }
                }
                Effect::ScheduleCpuTurn { .. } | Effect::CancelCpuTurns => {
                    scheduling.push(effect);
                }
            }
        }
        scheduling
    }
}

fn log_failure(call: &'static str, result: Result<(), GatewayError>) {
    match result {
        Ok(()) => debug!(call, "gateway call delivered"),
        Err(err) => warn!(call, error = %err, "gateway call failed, continuing"),
    }
}
