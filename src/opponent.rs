//! The CPU opponent's decision port and a reference strategy.
//!
//! The session never trusts a [`Decision`]: suggested claims are checked
//! against the claim rules and coerced to a legal value before use.

use alloc::sync::Arc;
use alloc::vec::Vec;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::claim::{Claim, meets_or_beats};
use crate::dice::{FACES, Roll};
use crate::error::OpponentError;
use crate::game::state::GameMode;
use crate::history::HistoryEntry;
use crate::sync::Mutex;

/// What the opponent sees when asked to act.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    /// The value to beat after resolving reverses.
    pub challenge: Option<Claim>,
    /// Whether only 21, 31 and 41 are accepted.
    pub locked_down: bool,
    /// The claim standing on the table, if any.
    pub standing_claim: Option<Claim>,
    /// Whether a bluff call is currently possible.
    pub can_call_bluff: bool,
    /// The opponent's own roll.
    pub roll: Roll,
    /// Whether the roll cannot be declared truthfully.
    pub must_bluff: bool,
    /// Legal claims for this roll, ascending.
    pub options: &'a [Claim],
    /// Recent history, oldest first.
    pub history: &'a [HistoryEntry],
    /// The opponent's score (match mode).
    pub own_score: u32,
    /// The player's score (match mode).
    pub player_score: u32,
    /// The mode being played.
    pub mode: GameMode,
}

/// An opponent's chosen action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Declare this claim code. Unknown or illegal codes are coerced.
    Raise(u8),
    /// Call the standing claim.
    CallBluff,
}

/// Information revealed to the opponent after a round event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// The opponent called the player's claim and saw the dice.
    PlayerClaimRevealed {
        /// What the player declared.
        claim: Claim,
        /// Whether it was justified.
        truthful: bool,
    },
    /// The player accepted or called one of the opponent's claims.
    CpuClaimSettled {
        /// What the opponent declared.
        claim: Claim,
        /// Whether the opponent was bluffing.
        bluffed: bool,
        /// Whether the player called it.
        contested: bool,
    },
}

/// Decision port the session consults on CPU turns.
///
/// Implementations may keep adaptive state behind interior mutability and
/// expose it as an opaque blob for persistence.
pub trait OpponentDecisionPort: Send + Sync {
    /// Chooses an action for the CPU's turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the strategy cannot decide; the session then
    /// falls back to its own legal choice.
    fn decide(&self, context: &DecisionContext<'_>) -> Result<Decision, OpponentError>;

    /// Receives information revealed by a round event.
    fn observe(&self, _observation: &Observation) {}

    /// Exports learning state for persistence.
    fn snapshot(&self) -> Option<Vec<u8>> {
        None
    }

    /// Restores learning state exported by [`OpponentDecisionPort::snapshot`].
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be read.
    fn restore(&self, _blob: &[u8]) -> Result<(), OpponentError> {
        Ok(())
    }
}

/// Probability that an honest roll meets or beats `challenge`.
#[must_use]
pub fn honest_odds(challenge: Claim) -> f64 {
    let mut hits = 0_u32;
    for first in 1..=FACES {
        for second in 1..=FACES {
            if let Some(roll) = Roll::new(first, second) {
                if meets_or_beats(roll.claim(), challenge) {
                    hits += 1;
                }
            }
        }
    }
    f64::from(hits) / f64::from(u32::from(FACES) * u32::from(FACES))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    revealed: u32,
    lies: u32,
}

impl Tally {
    fn suspicion(self) -> f64 {
        f64::from(self.lies + 1) / f64::from(self.revealed + 2)
    }
}

/// Reference strategy: honest when it can be, suspicious when the challenge
/// is unlikely, and calibrated by how often the player has been caught.
pub struct BaselineOpponent {
    rng: Mutex<ChaCha8Rng>,
    tally: Mutex<Tally>,
}

impl BaselineOpponent {
    /// Creates a seeded opponent.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            tally: Mutex::new(Tally::default()),
        }
    }

    /// Estimated probability that the player is bluffing.
    pub fn suspicion(&self) -> f64 {
        self.tally.lock().suspicion()
    }

    fn call_probability(&self, context: &DecisionContext<'_>, challenge: Claim) -> f64 {
        let unlikely = 1.0 - honest_odds(challenge);
        let suspicion = self.suspicion();
        let p = if context.must_bluff {
            suspicion + unlikely * 0.5
        } else {
            suspicion * unlikely * 0.5
        };
        p.clamp(0.05, 0.9)
    }

    fn pick_bluff(&self, context: &DecisionContext<'_>) -> Decision {
        let mut candidates = context
            .options
            .iter()
            .copied()
            .filter(|claim| *claim != Claim::SOCIAL);
        let first = candidates.next();
        let second = candidates.next();
        let pick = match (first, second) {
            (Some(first), Some(second)) => {
                if self.rng.lock().random_bool(0.3) {
                    second
                } else {
                    first
                }
            }
            (Some(only), None) => only,
            (None, _) => Claim::INFERNO,
        };
        Decision::Raise(pick.code())
    }
}

impl OpponentDecisionPort for BaselineOpponent {
    fn decide(&self, context: &DecisionContext<'_>) -> Result<Decision, OpponentError> {
        let shown = context.roll.claim();
        if shown == Claim::SOCIAL {
            return Ok(Decision::Raise(shown.code()));
        }

        if context.can_call_bluff {
            if let Some(challenge) = context.challenge {
                let p = self.call_probability(context, challenge);
                if self.rng.lock().random_bool(p) {
                    return Ok(Decision::CallBluff);
                }
            }
        }

        if !context.must_bluff {
            return Ok(Decision::Raise(shown.code()));
        }

        Ok(self.pick_bluff(context))
    }

    fn observe(&self, observation: &Observation) {
        if let Observation::PlayerClaimRevealed { truthful, .. } = *observation {
            let mut tally = self.tally.lock();
            tally.revealed = tally.revealed.saturating_add(1);
            if !truthful {
                tally.lies = tally.lies.saturating_add(1);
            }
        }
    }

    fn snapshot(&self) -> Option<Vec<u8>> {
        let tally = *self.tally.lock();
        let mut blob = Vec::with_capacity(8);
        blob.extend_from_slice(&tally.revealed.to_le_bytes());
        blob.extend_from_slice(&tally.lies.to_le_bytes());
        Some(blob)
    }

    fn restore(&self, blob: &[u8]) -> Result<(), OpponentError> {
        let (revealed, lies) = blob.split_at_checked(4).ok_or(OpponentError::CorruptState)?;
        let revealed: [u8; 4] = revealed
            .try_into()
            .map_err(|_| OpponentError::CorruptState)?;
        let lies: [u8; 4] = lies.try_into().map_err(|_| OpponentError::CorruptState)?;
        let tally = Tally {
            revealed: u32::from_le_bytes(revealed),
            lies: u32::from_le_bytes(lies),
        };
        if tally.lies > tally.revealed {
            return Err(OpponentError::CorruptState);
        }
        *self.tally.lock() = tally;
        Ok(())
    }
}

impl<T: OpponentDecisionPort + ?Sized> OpponentDecisionPort for Arc<T> {
    fn decide(&self, context: &DecisionContext<'_>) -> Result<Decision, OpponentError> {
        (**self).decide(context)
    }

    fn observe(&self, observation: &Observation) {
        (**self).observe(observation);
    }

    fn snapshot(&self) -> Option<Vec<u8>> {
        (**self).snapshot()
    }

    fn restore(&self, blob: &[u8]) -> Result<(), OpponentError> {
        (**self).restore(blob)
    }
}
