use alloc::format;
use tracing::info;

use crate::challenge::LastAction;
use crate::claim::{Claim, claim_matches_roll, resolve_bluff};
use crate::dice::Roll;
use crate::effects::{Effect, OutcomeRecord, RankUpdate};
use crate::error::ActionError;
use crate::history::HistoryEntry;
use crate::opponent::Observation;
use crate::result::{Resolution, RoundOutcome};

use super::{Actor, GameMode, Phase, Session, StandingClaim};

impl Session {
    /// Calls the standing claim made by the other side.
    ///
    /// The claim is checked against the roll that was actually under it. The
    /// loser pays 1 point, or 2 when the claim was 21 or a Reverse against
    /// 21, and the winner opens the next round.
    ///
    /// # Errors
    ///
    /// Returns an error if no game is running, the game is over, it is not
    /// the caller's turn, there is no standing claim, the claim is the
    /// caller's own, or the session is busy.
    pub fn call_bluff(&self, actor: Actor) -> Result<RoundOutcome, ActionError> {
        let _busy = self.enter(actor)?;
        self.call_bluff_as(actor)
    }

    pub(super) fn call_bluff_as(&self, actor: Actor) -> Result<RoundOutcome, ActionError> {
        let mut round = self.round.lock();
        let allowed = match round.phase {
            Phase::AwaitingResponse(turn) | Phase::AwaitingClaim { actor: turn, .. }
                if turn == actor =>
            {
                Ok(())
            }
            Phase::AwaitingRoll(turn) if turn == actor => Err(ActionError::NoStandingClaim),
            Phase::Idle => Err(ActionError::Idle),
            Phase::GameOver { .. } | Phase::StreakBroken { .. } => Err(ActionError::Finished),
            _ => Err(ActionError::NotYourTurn),
        };
        let standing = allowed.and_then(|()| round.standing.ok_or(ActionError::NoStandingClaim));
        let standing = match standing {
            Ok(standing) if standing.claimant == actor => Err(ActionError::OwnClaim),
            other => other,
        };
        let standing = match standing {
            Ok(standing) => standing,
            Err(err) => {
                drop(round);
                return Err(self.reject(actor, err));
            }
        };

        let reverse_vs_inferno = round.challenge.last_action() == LastAction::ReverseVsInferno;
        let verdict = resolve_bluff(standing.claim, standing.roll, reverse_vs_inferno);
        if actor == Actor::Player {
            round.bluff_events += 1;
            if verdict.liar {
                round.correct_bluff_events += 1;
            }
        }
        let settled = round.pending_cpu_raise.take();
        drop(round);

        match actor {
            Actor::Player => {
                if let Some(raise) = settled {
                    self.opponent.observe(&Observation::CpuClaimSettled {
                        claim: raise.claim,
                        bluffed: raise.bluffed,
                        contested: true,
                    });
                }
            }
            Actor::Cpu => self.opponent.observe(&Observation::PlayerClaimRevealed {
                claim: standing.claim,
                truthful: !verdict.liar,
            }),
        }

        let loser = if verdict.liar {
            standing.claimant
        } else {
            actor
        };
        let verb = if verdict.liar { "bluffing" } else { "honest" };
        self.push_history(HistoryEntry::Event(format!(
            "{actor} called {}: {} was {verb} with {}.",
            standing.claim,
            standing.claimant,
            standing.roll.claim(),
        )));

        Ok(self.resolve_round(
            Resolution::BluffCalled,
            actor,
            standing,
            verdict.liar,
            verdict.penalty,
            loser,
        ))
    }

    /// Resolves an ordinary answer to Inferno as a two-point loss.
    pub(super) fn forfeit_inferno(
        &self,
        actor: Actor,
        claim: Claim,
        roll: Roll,
        standing: StandingClaim,
    ) -> RoundOutcome {
        self.push_history(HistoryEntry::Claim {
            actor,
            claim,
            truthful: claim_matches_roll(claim, roll),
        });
        self.push_history(HistoryEntry::Event(format!(
            "{actor} answered Inferno with {claim} and forfeits the round."
        )));
        self.push_effect(Effect::RecordClaim(claim));
        self.resolve_round(Resolution::InfernoForfeit, actor, standing, false, 2, actor)
    }

    /// Charges the loser, clears the round and hands the next round to the
    /// winner.
    fn resolve_round(
        &self,
        resolution: Resolution,
        caller: Actor,
        standing: StandingClaim,
        liar_is_defender: bool,
        penalty: u8,
        loser: Actor,
    ) -> RoundOutcome {
        let mut ledger = self.ledger.lock();
        let mode = ledger.mode();
        let loss = ledger.apply_loss(loser, penalty);
        let (player_score, cpu_score) = (ledger.score(Actor::Player), ledger.score(Actor::Cpu));
        drop(ledger);

        let winner = loser.other();
        let mut round = self.round.lock();
        round.clear_round();
        // In survival mode a caught CPU bluff hands the next round straight
        // to the CPU; otherwise the winner opens.
        let caught_cpu = caller == Actor::Player && liar_is_defender;
        let opener = if mode == GameMode::Survival
            && caught_cpu
            && self.options.survival_auto_advance
        {
            Actor::Cpu
        } else {
            winner
        };
        round.opener = opener;
        round.phase = match (loss.finished, mode) {
            (false, _) => Phase::AwaitingRoll(opener),
            (true, GameMode::Match) => Phase::GameOver { winner },
            (true, GameMode::Survival) => Phase::StreakBroken {
                streak: loss.streak.unwrap_or_default(),
            },
        };
        let (bluff_events, correct_bluff_events) =
            (round.bluff_events, round.correct_bluff_events);
        drop(round);

        self.push_effect(Effect::RecordOutcome(OutcomeRecord {
            mode,
            caller,
            loser,
            liar: liar_is_defender,
            penalty,
            forfeit: resolution == Resolution::InfernoForfeit,
        }));
        self.persist_opponent();

        if loss.finished {
            let update = match mode {
                GameMode::Match => RankUpdate {
                    mode,
                    won: Some(winner == Actor::Player),
                    survival_streak: None,
                    bluff_events,
                    correct_bluff_events,
                },
                GameMode::Survival => {
                    let streak = loss.streak.unwrap_or_default();
                    self.push_effect(Effect::RecordRun { streak });
                    RankUpdate {
                        mode,
                        won: None,
                        survival_streak: Some(streak),
                        bluff_events,
                        correct_bluff_events,
                    }
                }
            };
            self.push_effect(Effect::UpdateRank(update));
        }

        let banner = match (loss.finished, mode) {
            (true, GameMode::Match) => format!("{loser} loses {penalty}. {winner} wins the game!"),
            (true, GameMode::Survival) => format!(
                "Streak broken at {}.",
                loss.streak.unwrap_or_default()
            ),
            (false, GameMode::Match) => format!(
                "{loser} loses {penalty}. Score: player {player_score}, cpu {cpu_score}."
            ),
            (false, GameMode::Survival) => {
                format!("Round won. Streak: {}.", loss.streak.unwrap_or_default())
            }
        };
        self.narrate(banner);
        info!(
            ?resolution,
            %caller,
            %loser,
            penalty,
            claim = standing.claim.code(),
            finished = loss.finished,
            "round resolved"
        );

        if !loss.finished && opener == Actor::Cpu {
            self.schedule_cpu_turn();
        }

        RoundOutcome {
            resolution,
            caller,
            defender: standing.claimant,
            defender_claim: standing.claim,
            defender_roll: standing.roll,
            liar_is_defender,
            penalty,
            ledger: loss,
        }
    }
}
