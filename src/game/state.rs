//! Session phase types.

use core::fmt;

use crate::dice::Roll;

/// One of the two sides at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actor {
    /// The human player.
    Player,
    /// The computer opponent.
    Cpu,
}

impl Actor {
    /// Returns the other side.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Player => Self::Cpu,
            Self::Cpu => Self::Player,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => f.write_str("player"),
            Self::Cpu => f.write_str("cpu"),
        }
    }
}

/// Kind of session being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameMode {
    /// Both sides start with a score; the first to zero loses.
    Match,
    /// The player keeps a win streak until losing a single round.
    Survival,
}

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No game or run in progress.
    Idle,
    /// The actor opens a round by rolling.
    AwaitingRoll(Actor),
    /// The actor has rolled and must declare.
    AwaitingClaim {
        /// Who rolled.
        actor: Actor,
        /// The hidden roll.
        roll: Roll,
    },
    /// The actor faces a standing claim and may roll or call it.
    AwaitingResponse(Actor),
    /// A match ended.
    GameOver {
        /// The side that still has points.
        winner: Actor,
    },
    /// A survival run ended.
    StreakBroken {
        /// The streak the run finished with.
        streak: u32,
    },
}

impl Phase {
    /// The actor expected to act, if any.
    #[must_use]
    pub const fn actor(&self) -> Option<Actor> {
        match self {
            Self::AwaitingRoll(actor)
            | Self::AwaitingResponse(actor)
            | Self::AwaitingClaim { actor, .. } => Some(*actor),
            Self::Idle | Self::GameOver { .. } | Self::StreakBroken { .. } => None,
        }
    }

    /// Whether the session reached a terminal phase.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::GameOver { .. } | Self::StreakBroken { .. })
    }
}

/// Identifies one scheduled CPU turn.
///
/// A ticket is only honoured while it is the session's pending ticket;
/// anything older is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CpuTicket {
    /// Session epoch, bumped by every lifecycle reset.
    pub epoch: u64,
    /// Turn counter within the epoch.
    pub turn: u64,
}
