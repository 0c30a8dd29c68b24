use alloc::format;
use tracing::debug;

use crate::challenge::answers_inferno;
use crate::claim::{Claim, claim_matches_roll, resolve_bluff};
use crate::effects::Effect;
use crate::error::{ActionError, ClaimError};
use crate::history::HistoryEntry;
use crate::opponent::Observation;
use crate::result::{ClaimReport, RollReport};

use super::{Actor, Phase, PendingRaise, Session, StandingClaim};

impl Session {
    /// Rolls the dice for `actor`.
    ///
    /// Valid when `actor` opens a round or faces a standing claim and has not
    /// rolled yet. A player roll accepts any unsettled CPU claim.
    ///
    /// # Errors
    ///
    /// Returns an error if no game is running, the game is over, it is not
    /// the actor's turn, the actor already rolled, or the session is busy.
    pub fn roll(&self, actor: Actor) -> Result<RollReport, ActionError> {
        let _busy = self.enter(actor)?;
        self.roll_as(actor)
    }

    pub(super) fn roll_as(&self, actor: Actor) -> Result<RollReport, ActionError> {
        let mut round = self.round.lock();
        let allowed = match round.phase {
            Phase::AwaitingRoll(turn) | Phase::AwaitingResponse(turn) if turn == actor => Ok(()),
            Phase::AwaitingClaim { actor: turn, .. } if turn == actor => {
                Err(ActionError::AlreadyRolled)
            }
            Phase::Idle => Err(ActionError::Idle),
            Phase::GameOver { .. } | Phase::StreakBroken { .. } => Err(ActionError::Finished),
            _ => Err(ActionError::NotYourTurn),
        };
        if let Err(err) = allowed {
            drop(round);
            return Err(self.reject(actor, err));
        }

        let roll = self.dice.lock().roll();
        let must_bluff = !round.challenge.allows_truth(roll);
        round.phase = Phase::AwaitingClaim { actor, roll };
        round.must_bluff = must_bluff;
        let settled = if actor == Actor::Player {
            round.pending_cpu_raise.take()
        } else {
            None
        };
        drop(round);

        if let Some(raise) = settled {
            self.opponent.observe(&Observation::CpuClaimSettled {
                claim: raise.claim,
                bluffed: raise.bluffed,
                contested: false,
            });
        }

        self.push_effect(Effect::RecordRoll(roll.claim()));
        match (actor, must_bluff) {
            (Actor::Player, false) => self.narrate(format!("You rolled {}.", roll.claim())),
            (Actor::Player, true) => {
                self.narrate(format!("You rolled {}. You have to bluff.", roll.claim()));
            }
            (Actor::Cpu, _) => self.narrate("The CPU rolled."),
        }
        debug!(%actor, roll = roll.claim().code(), must_bluff, "rolled");

        Ok(RollReport {
            actor,
            roll,
            must_bluff,
        })
    }

    /// Declares `code` for the roll `actor` is holding.
    ///
    /// A 41 resets the round. Answering an Inferno with anything other than
    /// 21, 31 or a rolled 41 loses the round for two points; that is reported
    /// as [`ClaimReport::InfernoForfeit`], not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the action is not allowed, the actor has not
    /// rolled, the code is not a claim, a 41 was not rolled, or the claim
    /// does not beat the challenge. None of these change state.
    pub fn claim(&self, actor: Actor, code: u8) -> Result<ClaimReport, ClaimError> {
        let _busy = self.enter(actor)?;
        self.claim_as(actor, code)
    }

    pub(super) fn claim_as(&self, actor: Actor, code: u8) -> Result<ClaimReport, ClaimError> {
        let mut round = self.round.lock();
        let roll = match round.phase {
            Phase::AwaitingClaim { actor: turn, roll } if turn == actor => Ok(roll),
            Phase::AwaitingRoll(turn) | Phase::AwaitingResponse(turn) if turn == actor => {
                Err(ClaimError::NotRolled)
            }
            Phase::Idle => Err(ActionError::Idle.into()),
            Phase::GameOver { .. } | Phase::StreakBroken { .. } => {
                Err(ActionError::Finished.into())
            }
            _ => Err(ActionError::NotYourTurn.into()),
        };
        let roll = match roll {
            Ok(roll) => roll,
            Err(err) => {
                drop(round);
                return Err(self.reject(actor, err));
            }
        };

        let claim = match Claim::try_from(code) {
            Ok(claim) => claim,
            Err(err) => {
                drop(round);
                return Err(self.reject(actor, err));
            }
        };

        if claim == Claim::SOCIAL {
            if !claim_matches_roll(claim, roll) {
                drop(round);
                return Err(self.reject(actor, ClaimError::SocialNotRolled));
            }
            round.clear_round();
            let opener = round.opener;
            round.phase = Phase::AwaitingRoll(opener);
            drop(round);
            return Ok(self.social_reset(actor, opener));
        }

        if round.challenge.is_locked_down() && !answers_inferno(claim) {
            if let Some(standing) = round.standing {
                drop(round);
                let outcome = self.forfeit_inferno(actor, claim, roll, standing);
                return Ok(ClaimReport::InfernoForfeit(outcome));
            }
        }

        if !round.challenge.allows(claim, roll) {
            let challenge = round.challenge.active().map_or(0, |active| active.code());
            drop(round);
            return Err(self.reject(
                actor,
                ClaimError::DoesNotBeat {
                    claim: claim.code(),
                    challenge,
                },
            ));
        }

        let truthful = !resolve_bluff(claim, roll, false).liar;
        round.challenge.apply(claim);
        let locked = round.challenge.is_locked_down();
        round.standing = Some(StandingClaim {
            claimant: actor,
            claim,
            roll,
            truthful,
        });
        round.must_bluff = false;
        round.pending_cpu_raise = (actor == Actor::Cpu).then_some(PendingRaise {
            claim,
            bluffed: !truthful,
        });
        let next = actor.other();
        round.phase = Phase::AwaitingResponse(next);
        drop(round);

        self.push_history(HistoryEntry::Claim {
            actor,
            claim,
            truthful,
        });
        self.push_effect(Effect::RecordClaim(claim));
        let who = match actor {
            Actor::Player => "You claim",
            Actor::Cpu => "The CPU claims",
        };
        if locked {
            self.narrate(format!("{who} {claim}. Only 21, 31 or a shown 41 can answer."));
        } else {
            self.narrate(format!("{who} {claim}."));
        }
        debug!(%actor, claim = claim.code(), truthful, "claimed");

        if next == Actor::Cpu {
            self.schedule_cpu_turn();
        }

        Ok(ClaimReport::Passed {
            claim,
            truthful,
            next,
        })
    }

    fn social_reset(&self, actor: Actor, opener: Actor) -> ClaimReport {
        self.push_history(HistoryEntry::Claim {
            actor,
            claim: Claim::SOCIAL,
            truthful: true,
        });
        self.push_history(HistoryEntry::Event(format!(
            "{actor} showed 41. The round starts over."
        )));
        self.push_effect(Effect::RecordClaim(Claim::SOCIAL));
        self.narrate(format!("{actor} showed a Social. {opener} opens again."));
        debug!(%actor, %opener, "social reset");

        if opener == Actor::Cpu {
            self.schedule_cpu_turn();
        }

        ClaimReport::SocialReset { opener }
    }
}
