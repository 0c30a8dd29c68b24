//! A Mexican/Inferno dice bluffing game engine with optional `no_std` support.
//!
//! Two dice are read as a ranked two-digit claim. The active side declares
//! its roll or bluffs higher; the other side raises or calls. The crate
//! provides the claim rules ([`claim`], [`challenge`]), a [`Session`] state
//! machine that sequences rolls, claims and bluff calls against a pluggable
//! CPU opponent, and a [`ScoreLedger`] for match and survival scoring.
//!
//! Side effects (stats, persistence, ranking, CPU thinking timers) are queued
//! as [`Effect`]s for the host to run, so the session never blocks on I/O.
//!
//! # Example
//!
//! ```
//! use inferno_dice::{Actor, GameOptions, Roll, Session};
//!
//! let session = Session::with_baseline_opponent(GameOptions::default(), 42);
//! session.new_game().unwrap();
//! session.force_rolls([Roll::new(5, 3).unwrap()]);
//!
//! let rolled = session.roll(Actor::Player).unwrap();
//! assert!(!rolled.must_bluff);
//! session.claim(Actor::Player, 53).unwrap();
//! assert_eq!(session.active_challenge().map(|c| c.code()), Some(53));
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(all(not(feature = "std"), not(feature = "alloc")))]
compile_error!(
    "`std` is disabled but `alloc` feature is not enabled. Enable `alloc` or keep `std` enabled."
);

extern crate alloc;

pub mod challenge;
pub mod claim;
pub mod dice;
pub mod effects;
pub mod error;
pub mod game;
pub mod history;
pub mod ledger;
pub mod opponent;
pub mod options;
pub mod result;
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod runtime;
mod sync;

// Re-export main types
pub use challenge::{ChallengeState, LastAction, build_claim_options, resolve_active_challenge};
pub use claim::{
    BluffVerdict, Category, Claim, compare_claims, enumerate_claims, is_legal_raise,
    meets_or_beats, next_higher_claim, normalize_roll, resolve_bluff, split_claim,
};
pub use dice::Roll;
pub use effects::{
    Effect, EffectRunner, OutcomeRecord, PersistenceGateway, RankGateway, RankUpdate,
    StatsGateway,
};
pub use error::{ActionError, ClaimError, GatewayError, OpponentError};
pub use game::{Actor, CpuTicket, GameMode, Phase, Session};
pub use history::{ClaimHistory, HistoryEntry};
pub use ledger::{LossOutcome, RunSummary, ScoreLedger};
pub use opponent::{BaselineOpponent, Decision, DecisionContext, Observation, OpponentDecisionPort};
pub use options::GameOptions;
pub use result::{ClaimReport, CpuAction, CpuTurn, Resolution, RollReport, RoundOutcome};
#[cfg(feature = "tokio")]
pub use runtime::Driver;
