//! Dice faces and two-die rolls.

use alloc::collections::VecDeque;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::claim::Claim;

/// Number of faces on a die.
pub const FACES: u8 = 6;

/// The actual result of rolling both dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Roll {
    first: u8,
    second: u8,
}

impl Roll {
    /// Creates a roll from two faces.
    ///
    /// Returns `None` if either face is outside `1..=6`.
    #[must_use]
    pub const fn new(first: u8, second: u8) -> Option<Self> {
        if first == 0 || first > FACES || second == 0 || second > FACES {
            return None;
        }
        Some(Self { first, second })
    }

    /// Returns the faces in the order they were rolled.
    #[must_use]
    pub const fn faces(&self) -> (u8, u8) {
        (self.first, self.second)
    }

    /// Returns the claim code this roll reads as.
    ///
    /// The larger face is the tens digit.
    #[must_use]
    pub const fn claim(&self) -> Claim {
        let (hi, lo) = if self.first >= self.second {
            (self.first, self.second)
        } else {
            (self.second, self.first)
        };
        Claim::from_faces_unchecked(hi, lo)
    }

    /// Builds the canonical roll for a claim code (tens digit first).
    #[must_use]
    pub const fn of_claim(claim: Claim) -> Self {
        let (hi, lo) = claim.split();
        Self { first: hi, second: lo }
    }
}

/// Source of rolls for a session.
///
/// Rolls come from a seeded `ChaCha8Rng`. Forced rolls queued with
/// [`Dice::force`] are consumed first, which lets hosts replay a game and
/// lets tests script exact sequences.
#[derive(Debug, Clone)]
pub struct Dice {
    rng: ChaCha8Rng,
    forced: VecDeque<Roll>,
}

impl Dice {
    /// Creates a dice source from an RNG.
    #[must_use]
    pub const fn new(rng: ChaCha8Rng) -> Self {
        Self {
            rng,
            forced: VecDeque::new(),
        }
    }

    /// Queues rolls to be returned before any random ones.
    pub fn force<I: IntoIterator<Item = Roll>>(&mut self, rolls: I) {
        self.forced.extend(rolls);
    }

    /// Rolls both dice.
    pub fn roll(&mut self) -> Roll {
        if let Some(roll) = self.forced.pop_front() {
            return roll;
        }
        let first = self.rng.random_range(1..=FACES);
        let second = self.rng.random_range(1..=FACES);
        Roll { first, second }
    }
}
