//! Claim codes and the ranking rules between them.
//!
//! Every function in this module is pure. The round state machine and any
//! opponent strategy go through these rules, so legality is decided in
//! exactly one place.

use core::cmp::Ordering;
use core::fmt;

use crate::dice::{FACES, Roll};
use crate::error::ClaimError;

/// Category of a claim, in ascending rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Two different faces that are not a special (e.g. 53).
    Mixed,
    /// Two equal faces (11 through 66).
    Double,
    /// 21, 31 or 41.
    Special,
}

/// A two-digit claim code, the larger face first.
///
/// The 21 representable codes are exactly the normalized rolls. Three of them
/// are specials: [`Claim::INFERNO`], [`Claim::REVERSE`] and [`Claim::SOCIAL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Claim(u8);

impl Claim {
    /// 21, the top rank. Doubles the stakes and locks down responses.
    pub const INFERNO: Self = Self(21);
    /// 31, reflects the standing challenge back to the previous claimant.
    pub const REVERSE: Self = Self(31);
    /// 41, show-only. Resets the round without a penalty.
    pub const SOCIAL: Self = Self(41);

    /// Parses a claim code.
    ///
    /// Returns `None` unless both digits are faces and the tens digit is not
    /// smaller than the units digit.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        let hi = code / 10;
        let lo = code % 10;
        if hi == 0 || hi > FACES || lo == 0 || lo > FACES || hi < lo {
            return None;
        }
        Some(Self(code))
    }

    pub(crate) const fn from_faces_unchecked(hi: u8, lo: u8) -> Self {
        Self(hi * 10 + lo)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        self.0
    }

    /// Splits the code into its (tens, units) digits.
    #[must_use]
    pub const fn split(&self) -> (u8, u8) {
        (self.0 / 10, self.0 % 10)
    }

    /// Returns the category of this claim.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self.0 {
            21 | 31 | 41 => Category::Special,
            _ if self.0 / 10 == self.0 % 10 => Category::Double,
            _ => Category::Mixed,
        }
    }

    /// Returns `true` for 21, 31 and 41.
    #[must_use]
    pub const fn is_special(&self) -> bool {
        matches!(self.category(), Category::Special)
    }

    /// Display name of a special claim.
    #[must_use]
    pub const fn special_name(&self) -> Option<&'static str> {
        match self.0 {
            21 => Some("Inferno"),
            31 => Some("Reverse"),
            41 => Some("Social"),
            _ => None,
        }
    }

    const fn rank(&self) -> (Category, u8) {
        let within = match self.0 {
            41 => 0,
            31 => 1,
            21 => 2,
            code => code,
        };
        (self.category(), within)
    }
}

impl Ord for Claim {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Claim {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TryFrom<u8> for Claim {
    type Error = ClaimError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(ClaimError::UnknownClaim(code))
    }
}

impl From<Roll> for Claim {
    fn from(roll: Roll) -> Self {
        roll.claim()
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.special_name() {
            Some(name) => write!(f, "{} ({name})", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Every claim code in ascending rank order.
pub const ALL_CLAIMS: [Claim; 21] = [
    Claim(32),
    Claim(42),
    Claim(43),
    Claim(51),
    Claim(52),
    Claim(53),
    Claim(54),
    Claim(61),
    Claim(62),
    Claim(63),
    Claim(64),
    Claim(65),
    Claim(11),
    Claim(22),
    Claim(33),
    Claim(44),
    Claim(55),
    Claim(66),
    Claim(41),
    Claim(31),
    Claim(21),
];

/// Reads two faces as a claim code.
///
/// Returns `None` if either face is outside `1..=6`.
#[must_use]
pub const fn normalize_roll(d1: u8, d2: u8) -> Option<Claim> {
    match Roll::new(d1, d2) {
        Some(roll) => Some(roll.claim()),
        None => None,
    }
}

/// Splits a claim into (tens, units). Specials split into their literal
/// digits for display.
#[must_use]
pub const fn split_claim(claim: Claim) -> (u8, u8) {
    claim.split()
}

/// Returns the category of a claim.
#[must_use]
pub const fn categorize_claim(claim: Claim) -> Category {
    claim.category()
}

/// Returns `true` for claims that may be declared over any challenge.
///
/// 41 additionally needs the actor to have rolled it, see
/// [`claim_matches_roll`].
#[must_use]
pub const fn is_always_claimable(claim: Claim) -> bool {
    claim.is_special()
}

/// Returns `true` only for 21.
#[must_use]
pub const fn is_inferno(claim: Claim) -> bool {
    claim.0 == Claim::INFERNO.0
}

/// Returns `true` when `candidate` reverses a standing claim.
#[must_use]
pub const fn is_reverse_of(previous: Option<Claim>, candidate: Claim) -> bool {
    previous.is_some() && candidate.0 == Claim::REVERSE.0
}

/// Total order over claims: category first, then value within the category.
#[must_use]
pub fn compare_claims(a: Claim, b: Claim) -> Ordering {
    a.cmp(&b)
}

/// Returns `true` if `candidate` ranks at least as high as `previous`.
#[must_use]
pub fn meets_or_beats(candidate: Claim, previous: Claim) -> bool {
    compare_claims(candidate, previous) != Ordering::Less
}

/// Returns `true` if `candidate` may be declared against `active`.
#[must_use]
pub fn is_legal_raise(active: Option<Claim>, candidate: Claim) -> bool {
    match active {
        None => true,
        Some(active) => is_always_claimable(candidate) || meets_or_beats(candidate, active),
    }
}

/// Returns `true` if a claim can stand as the object of a future Reverse.
#[must_use]
pub const fn is_challenge_claim(claim: Option<Claim>) -> bool {
    claim.is_some()
}

/// Returns `true` if the claim is truthful about `actual`.
#[must_use]
pub fn claim_matches_roll(claim: Claim, actual: Roll) -> bool {
    actual.claim() == claim
}

/// Smallest ordinary claim strictly above `value`.
///
/// Falls back to 21 when nothing ordinary ranks higher, which covers 66 and
/// every special.
#[must_use]
pub fn next_higher_claim(value: Claim) -> Claim {
    ALL_CLAIMS
        .iter()
        .copied()
        .filter(|claim| !claim.is_special())
        .find(|claim| compare_claims(*claim, value) == Ordering::Greater)
        .unwrap_or(Claim::INFERNO)
}

/// Returns every claim code in ascending rank order.
#[must_use]
pub const fn enumerate_claims() -> &'static [Claim] {
    &ALL_CLAIMS
}

/// Result of checking a claim against the roll underneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BluffVerdict {
    /// Whether the claimant lied.
    pub liar: bool,
    /// Points the loser of the call pays (1, or 2 under Inferno stakes).
    pub penalty: u8,
}

/// Resolves a bluff call on `claim` given the roll that was actually under it.
///
/// Specials are only justified by the identical roll. An ordinary claim is
/// justified by any roll meeting or beating it, so under-claiming is honest.
/// The penalty is 2 when the claim is 21 or when it is a Reverse played
/// against 21.
#[must_use]
pub fn resolve_bluff(claim: Claim, actual: Roll, reverse_vs_inferno: bool) -> BluffVerdict {
    let shown = actual.claim();
    let honest = if claim.is_special() {
        shown == claim
    } else {
        meets_or_beats(shown, claim)
    };
    let penalty = if is_inferno(claim) || reverse_vs_inferno {
        2
    } else {
        1
    };
    BluffVerdict {
        liar: !honest,
        penalty,
    }
}
