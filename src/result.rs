//! Reports returned by session actions.

use crate::claim::Claim;
use crate::dice::Roll;
use crate::game::state::Actor;
use crate::ledger::LossOutcome;

/// How a round was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A bluff was called on the standing claim.
    BluffCalled,
    /// An actor answered Inferno with an ordinary claim.
    InfernoForfeit,
}

/// Result of a resolved round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    /// How the round ended.
    pub resolution: Resolution,
    /// The side that called, or that failed to answer Inferno.
    pub caller: Actor,
    /// The side whose claim was standing.
    pub defender: Actor,
    /// The standing claim.
    pub defender_claim: Claim,
    /// The roll under the standing claim.
    pub defender_roll: Roll,
    /// Whether the defender lied.
    pub liar_is_defender: bool,
    /// Points charged to the loser.
    pub penalty: u8,
    /// Ledger result for the loser.
    pub ledger: LossOutcome,
}

impl RoundOutcome {
    /// The side that paid the penalty.
    #[must_use]
    pub const fn loser(&self) -> Actor {
        self.ledger.loser
    }

    /// The side that won the round.
    #[must_use]
    pub const fn winner(&self) -> Actor {
        self.ledger.loser.other()
    }
}

/// Result of a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollReport {
    /// Who rolled.
    pub actor: Actor,
    /// The roll.
    pub roll: Roll,
    /// Whether a truthful claim is illegal against the current challenge.
    pub must_bluff: bool,
}

/// Result of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimReport {
    /// The claim stands and the other side must respond.
    Passed {
        /// The declared value.
        claim: Claim,
        /// Whether the roll justified it.
        truthful: bool,
        /// The side that responds next.
        next: Actor,
    },
    /// A Social was shown; the round starts over.
    SocialReset {
        /// The side that opens the fresh round.
        opener: Actor,
    },
    /// Inferno went unanswered; the claimant lost the round.
    InfernoForfeit(RoundOutcome),
}

/// What the CPU did with its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuAction {
    /// The CPU declared a claim.
    Claimed(ClaimReport),
    /// The CPU called the player's claim.
    CalledBluff(RoundOutcome),
}

/// Result of a CPU turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTurn {
    /// The CPU's roll.
    pub roll: Roll,
    /// Whether the CPU's suggested action had to be replaced by a legal one.
    pub coerced: bool,
    /// What the CPU did.
    pub action: CpuAction,
}
