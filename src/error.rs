//! Error types for session operations and external collaborators.

use alloc::string::String;

use thiserror::Error;

/// Errors for actions attempted out of turn or in the wrong phase.
///
/// These never change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    /// No game or run has been started.
    #[error("no game in progress")]
    Idle,
    /// The game or run has already ended.
    #[error("the game is over")]
    Finished,
    /// Not this actor's turn.
    #[error("not your turn")]
    NotYourTurn,
    /// The actor already rolled this turn.
    #[error("already rolled this turn")]
    AlreadyRolled,
    /// Another transition is in flight, or the CPU is thinking.
    #[error("waiting for the other side")]
    Busy,
    /// There is no standing claim to call.
    #[error("there is no claim to call")]
    NoStandingClaim,
    /// The standing claim belongs to the caller.
    #[error("cannot call your own claim")]
    OwnClaim,
    /// A scheduled CPU turn belongs to a round or session that no longer exists.
    #[error("stale cpu turn")]
    StaleTicket,
}

/// Errors for claims that break the claim rules.
///
/// Failing to answer Inferno is not an error; it is reported as a forfeit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClaimError {
    /// The code is not a two-dice claim.
    #[error("{0} is not a claim")]
    UnknownClaim(u8),
    /// The actor has not rolled yet.
    #[error("roll before claiming")]
    NotRolled,
    /// The claim does not meet or beat the challenge.
    #[error("{claim} does not beat {challenge}")]
    DoesNotBeat {
        /// The rejected claim code.
        claim: u8,
        /// The challenge code it had to beat.
        challenge: u8,
    },
    /// A Social (41) can only be shown, never bluffed.
    #[error("41 can only be claimed when rolled")]
    SocialNotRolled,
    /// The action itself was not allowed.
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Errors reported by an opponent strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpponentError {
    /// The strategy had no answer in time.
    #[error("opponent decision timed out")]
    Timeout,
    /// The strategy failed internally.
    #[error("opponent failure: {0}")]
    Internal(String),
    /// A saved state blob could not be read.
    #[error("opponent state is corrupt")]
    CorruptState,
}

/// Errors reported by persistence, stats and rank gateways.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The backend could not be reached.
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
    /// The backend refused the request.
    #[error("gateway rejected request: {0}")]
    Rejected(String),
}
