use core::sync::atomic::Ordering;

use alloc::vec::Vec;
use tracing::{debug, warn};

use crate::challenge::ChallengeState;
use crate::claim::{Claim, next_higher_claim};
use crate::dice::Roll;
use crate::effects::Effect;
use crate::error::{ActionError, ClaimError};
use crate::opponent::{Decision, DecisionContext};
use crate::result::{CpuAction, CpuTurn};

use super::{Actor, CpuTicket, Session};

/// Releases the turn lock when a CPU turn ends, unless that turn scheduled
/// another one.
struct CpuTurnGuard<'a>(&'a Session);

impl Drop for CpuTurnGuard<'_> {
    fn drop(&mut self) {
        if self.0.pending_ticket.lock().is_none() {
            self.0.turn_lock.release();
        }
    }
}

/// Picks a legal claim for `roll`, preferring `suggested`.
///
/// Falls back to the truthful roll when it is legal, then to the smallest
/// claim above the challenge.
fn coerce_claim(suggested: Option<u8>, roll: Roll, challenge: &ChallengeState) -> Claim {
    if let Some(claim) = suggested.and_then(Claim::from_code) {
        if challenge.allows(claim, roll) {
            return claim;
        }
    }
    if challenge.allows_truth(roll) {
        return roll.claim();
    }
    challenge.active().map_or(roll.claim(), next_higher_claim)
}

impl Session {
    /// Schedules the CPU's next turn and locks out player input until it runs.
    pub(super) fn schedule_cpu_turn(&self) {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let turn = self.cpu_turns.fetch_add(1, Ordering::SeqCst) + 1;
        let ticket = CpuTicket { epoch, turn };
        *self.pending_ticket.lock() = Some(ticket);
        self.turn_lock.set();

        let delay = self.options.delay_for(self.ledger.lock().lowest_score());
        self.push_effect(Effect::ScheduleCpuTurn { ticket, delay });
        debug!(?ticket, ?delay, "cpu turn scheduled");
    }

    /// Plays the CPU turn identified by `ticket`.
    ///
    /// The CPU rolls, asks the opponent strategy what to do, and then calls
    /// or claims. Suggestions that break the rules are replaced by the
    /// truthful roll when legal, otherwise by the smallest legal bluff. A
    /// failing strategy is treated as having no suggestion.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::StaleTicket`] if the ticket no longer matches
    /// the session, or [`ActionError::Busy`] if another transition is in
    /// flight.
    pub fn run_cpu_turn(&self, ticket: CpuTicket) -> Result<CpuTurn, ClaimError> {
        let _busy = self.busy.try_acquire().ok_or(ActionError::Busy)?;
        {
            let mut pending = self.pending_ticket.lock();
            if *pending != Some(ticket) {
                debug!(?ticket, "discarding stale cpu turn");
                return Err(ActionError::StaleTicket.into());
            }
            *pending = None;
        }
        let _turn = CpuTurnGuard(self);

        let rolled = self.roll_as(Actor::Cpu)?;
        let roll = rolled.roll;

        let ledger = self.ledger.lock();
        let (mode, own_score, player_score) = (
            ledger.mode(),
            ledger.score(Actor::Cpu),
            ledger.score(Actor::Player),
        );
        drop(ledger);
        let round = self.round.lock();
        let challenge = round.challenge;
        let standing = round.standing;
        let must_bluff = round.must_bluff;
        drop(round);
        let can_call_bluff = standing.is_some_and(|standing| standing.claimant == Actor::Player);
        let options = challenge.options_for(Some(roll));
        let history: Vec<_> = self.history();

        let context = DecisionContext {
            challenge: challenge.active(),
            locked_down: challenge.is_locked_down(),
            standing_claim: standing.map(|standing| standing.claim),
            can_call_bluff,
            roll,
            must_bluff,
            options: &options,
            history: &history,
            own_score,
            player_score,
            mode,
        };

        let decision = match self.opponent.decide(&context) {
            Ok(decision) => Some(decision),
            Err(err) => {
                warn!(error = %err, "opponent failed to decide, falling back");
                None
            }
        };

        if decision == Some(Decision::CallBluff) && can_call_bluff {
            let outcome = self.call_bluff_as(Actor::Cpu)?;
            return Ok(CpuTurn {
                roll,
                coerced: false,
                action: CpuAction::CalledBluff(outcome),
            });
        }

        let suggested = match decision {
            Some(Decision::Raise(code)) => Some(code),
            Some(Decision::CallBluff) | None => None,
        };
        let claim = coerce_claim(suggested, roll, &challenge);
        let coerced = suggested != Some(claim.code());
        if coerced {
            warn!(?suggested, claim = claim.code(), "opponent decision replaced");
        }
        let report = self.claim_as(Actor::Cpu, claim.code())?;

        Ok(CpuTurn {
            roll,
            coerced,
            action: CpuAction::Claimed(report),
        })
    }
}
