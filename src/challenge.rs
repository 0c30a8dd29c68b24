//! The standing challenge and the value an actor actually has to beat.

use alloc::vec::Vec;

use crate::claim::{Claim, enumerate_claims, is_inferno, is_legal_raise, is_reverse_of};
use crate::dice::Roll;

/// What the most recent claim did to the challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastAction {
    /// An ordinary claim, or no claim yet.
    #[default]
    Normal,
    /// A Reverse played while the effective challenge was Inferno.
    ReverseVsInferno,
}

/// Returns the claim the next actor has to meet or beat.
///
/// A Reverse bounces the baseline back, so after one or more reverses the
/// value to beat is still the baseline rather than 31.
#[must_use]
pub fn resolve_active_challenge(baseline: Option<Claim>, last: Option<Claim>) -> Option<Claim> {
    match (last, baseline) {
        (Some(Claim::REVERSE), Some(baseline)) => Some(baseline),
        (last, _) => last,
    }
}

/// Returns `true` if the effective challenge is Inferno.
#[must_use]
pub fn is_locked_down(baseline: Option<Claim>, last: Option<Claim>) -> bool {
    resolve_active_challenge(baseline, last).is_some_and(is_inferno)
}

/// Returns `true` if `candidate` is an accepted answer under lockdown.
///
/// Only 21 and 31 are; 41 is accepted separately when it was rolled.
#[must_use]
pub fn answers_inferno(candidate: Claim) -> bool {
    candidate == Claim::INFERNO || candidate == Claim::REVERSE
}

/// Returns the claims an actor may raise to, in ascending rank order.
///
/// 41 is never offered because it can only be shown, not chosen.
#[must_use]
pub fn build_claim_options(last: Option<Claim>, baseline: Option<Claim>) -> Vec<Claim> {
    let active = resolve_active_challenge(baseline, last);
    let locked = active.is_some_and(is_inferno);
    enumerate_claims()
        .iter()
        .copied()
        .filter(|claim| *claim != Claim::SOCIAL)
        .filter(|claim| {
            if locked {
                answers_inferno(*claim)
            } else {
                is_legal_raise(active, *claim)
            }
        })
        .collect()
}

/// Challenge state carried through a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChallengeState {
    baseline: Option<Claim>,
    last: Option<Claim>,
    last_action: LastAction,
}

impl ChallengeState {
    /// Creates an empty challenge.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            baseline: None,
            last: None,
            last_action: LastAction::Normal,
        }
    }

    /// The original contested value, preserved across reverses.
    #[must_use]
    pub const fn baseline(&self) -> Option<Claim> {
        self.baseline
    }

    /// The literal most recent claim.
    #[must_use]
    pub const fn last(&self) -> Option<Claim> {
        self.last
    }

    /// What the most recent claim did.
    #[must_use]
    pub const fn last_action(&self) -> LastAction {
        self.last_action
    }

    /// The value the next actor has to beat.
    #[must_use]
    pub fn active(&self) -> Option<Claim> {
        resolve_active_challenge(self.baseline, self.last)
    }

    /// Whether responses are restricted to 21, 31 and 41.
    #[must_use]
    pub fn is_locked_down(&self) -> bool {
        is_locked_down(self.baseline, self.last)
    }

    /// Whether the actor holding `roll` can truthfully declare it.
    #[must_use]
    pub fn allows_truth(&self, roll: Roll) -> bool {
        self.allows(roll.claim(), roll)
    }

    /// Whether `candidate` is legal for an actor holding `roll`.
    #[must_use]
    pub fn allows(&self, candidate: Claim, roll: Roll) -> bool {
        if candidate == Claim::SOCIAL {
            return roll.claim() == Claim::SOCIAL;
        }
        if self.is_locked_down() {
            return answers_inferno(candidate);
        }
        is_legal_raise(self.active(), candidate)
    }

    /// Claim options for the actor holding `roll`, including 41 when rolled.
    #[must_use]
    pub fn options_for(&self, roll: Option<Roll>) -> Vec<Claim> {
        let mut options = build_claim_options(self.last, self.baseline);
        if roll.is_some_and(|roll| roll.claim() == Claim::SOCIAL) {
            let at = options
                .iter()
                .position(|claim| *claim > Claim::SOCIAL)
                .unwrap_or(options.len());
            options.insert(at, Claim::SOCIAL);
        }
        options
    }

    /// Applies a legal claim to the challenge.
    pub fn apply(&mut self, claim: Claim) {
        if claim == Claim::SOCIAL {
            self.clear();
            return;
        }

        if is_reverse_of(self.last, claim) {
            self.last_action = if self.is_locked_down() {
                LastAction::ReverseVsInferno
            } else {
                LastAction::Normal
            };
            if self.baseline.is_none() {
                self.baseline = self.last;
            }
            self.last = Some(claim);
            return;
        }

        self.baseline = Some(claim);
        self.last = Some(claim);
        self.last_action = LastAction::Normal;
    }

    /// Resets the challenge for a new round.
    pub const fn clear(&mut self) {
        *self = Self::new();
    }
}
