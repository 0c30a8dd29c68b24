//! Ledger, history, effect delivery and opponent persistence tests.

use core::time::Duration;
use std::sync::{Arc, Mutex};

use inferno_dice::{
    Actor, BaselineOpponent, Claim, ClaimHistory, CpuTicket, Decision, DecisionContext, Effect,
    EffectRunner, GameMode, GatewayError, HistoryEntry, Observation, OpponentDecisionPort,
    OpponentError, OutcomeRecord, PersistenceGateway, RankGateway, RankUpdate, Roll, ScoreLedger,
    StatsGateway, build_claim_options,
};
use proptest::prelude::*;

#[test]
fn match_losses_clamp_at_zero() {
    let mut ledger = ScoreLedger::new(GameMode::Match, 2);
    let first = ledger.apply_loss(Actor::Cpu, 1);
    assert_eq!(first.loser_score, 1);
    assert!(!first.finished);

    let second = ledger.apply_loss(Actor::Cpu, 2);
    assert_eq!(second.loser_score, 0);
    assert!(second.finished);
    assert!(ledger.is_finished());
    assert_eq!(ledger.score(Actor::Player), 2);
    assert_eq!(second.streak, None);
}

#[test]
fn survival_streak_and_best() {
    let mut ledger = ScoreLedger::new(GameMode::Survival, 5);
    assert_eq!(ledger.apply_loss(Actor::Cpu, 1).streak, Some(1));
    assert_eq!(ledger.apply_loss(Actor::Cpu, 2).streak, Some(3));
    assert!(!ledger.is_finished());

    let broken = ledger.apply_loss(Actor::Player, 1);
    assert!(broken.finished);
    let run = broken.run.unwrap();
    assert_eq!(run.streak, 3);
    assert_eq!(run.best_of_session, 3);
    assert!(run.new_best);

    ledger.reset(GameMode::Survival);
    assert_eq!(ledger.streak(), 0);
    assert_eq!(ledger.best_streak(), 3);
    ledger.record_win(1);
    let shorter = ledger.close_run();
    assert!(!shorter.new_best);
    assert_eq!(shorter.best_of_session, 3);
}

proptest! {
    #[test]
    fn match_score_never_underflows(
        start in 0u32..10,
        losses in prop::collection::vec((any::<bool>(), 1u8..=2), 0..20),
    ) {
        let mut ledger = ScoreLedger::new(GameMode::Match, start);
        for (cpu, amount) in losses {
            let actor = if cpu { Actor::Cpu } else { Actor::Player };
            let before = ledger.score(actor);
            let outcome = ledger.apply_loss(actor, amount);
            prop_assert_eq!(outcome.loser_score, before.saturating_sub(u32::from(amount)));
            prop_assert_eq!(outcome.finished, ledger.is_finished());
            if outcome.loser_score == 0 {
                prop_assert!(outcome.finished);
            }
        }
    }
}

#[test]
fn history_evicts_the_oldest_entry() {
    let mut history = ClaimHistory::new(2);
    history.push(HistoryEntry::Claim {
        actor: Actor::Player,
        claim: Claim::INFERNO,
        truthful: false,
    });
    history.push_event("first call");
    history.push_event("second call");
    assert_eq!(history.len(), 2);
    assert_eq!(
        history.to_vec(),
        vec![
            HistoryEntry::Event("first call".into()),
            HistoryEntry::Event("second call".into()),
        ]
    );

    let mut disabled = ClaimHistory::new(0);
    disabled.push_event("ignored");
    assert!(disabled.is_empty());
}

struct FailingStats;

impl StatsGateway for FailingStats {
    fn record_roll(&self, _claim: Claim) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable("offline".into()))
    }

    fn record_claim(&self, _claim: Claim) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable("offline".into()))
    }

    fn record_outcome(&self, _outcome: &OutcomeRecord) -> Result<(), GatewayError> {
        Err(GatewayError::Rejected("bad outcome".into()))
    }

    fn record_run(&self, _streak: u32) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable("offline".into()))
    }
}

#[derive(Clone, Default)]
struct MemoryStore {
    blob: Arc<Mutex<Option<Vec<u8>>>>,
}

impl PersistenceGateway for MemoryStore {
    fn save_opponent_state(&self, blob: &[u8]) -> Result<(), GatewayError> {
        *self.blob.lock().unwrap() = Some(blob.to_vec());
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<u8>>, GatewayError> {
        Ok(self.blob.lock().unwrap().clone())
    }
}

#[derive(Clone, Default)]
struct RecordingRank {
    updates: Arc<Mutex<Vec<RankUpdate>>>,
}

impl RankGateway for RecordingRank {
    fn update_from_result(&self, update: &RankUpdate) -> Result<(), GatewayError> {
        self.updates.lock().unwrap().push(*update);
        Ok(())
    }
}

#[test]
fn gateway_failures_are_swallowed() {
    let rank = RecordingRank::default();
    let runner = EffectRunner::new()
        .with_stats(FailingStats)
        .with_rank(rank.clone());
    let ticket = CpuTicket { epoch: 1, turn: 3 };
    let update = RankUpdate {
        mode: GameMode::Match,
        won: Some(false),
        survival_streak: None,
        bluff_events: 2,
        correct_bluff_events: 1,
    };

    let scheduling = runner.run([
        Effect::RecordRoll(Claim::REVERSE),
        Effect::RecordClaim(Claim::INFERNO),
        Effect::RecordRun { streak: 4 },
        Effect::ScheduleCpuTurn {
            ticket,
            delay: Duration::from_millis(5),
        },
        Effect::UpdateRank(update),
        Effect::SaveOpponentState(vec![1, 2, 3]),
        Effect::CancelCpuTurns,
    ]);

    assert_eq!(
        scheduling,
        vec![
            Effect::ScheduleCpuTurn {
                ticket,
                delay: Duration::from_millis(5),
            },
            Effect::CancelCpuTurns,
        ]
    );
    assert_eq!(*rank.updates.lock().unwrap(), vec![update]);
}

#[test]
fn opponent_state_survives_a_round_trip() {
    let store = MemoryStore::default();
    let runner = EffectRunner::new().with_persistence(store.clone());
    assert!(!runner.restore_opponent(&BaselineOpponent::new(1)));

    let trained = BaselineOpponent::new(1);
    for truthful in [false, false, true] {
        trained.observe(&Observation::PlayerClaimRevealed {
            claim: Claim::INFERNO,
            truthful,
        });
    }
    let blob = trained.snapshot().unwrap();
    runner.run([Effect::SaveOpponentState(blob)]);

    let fresh = BaselineOpponent::new(2);
    assert!(fresh.suspicion() < trained.suspicion());
    assert!(runner.restore_opponent(&fresh));
    assert!((fresh.suspicion() - trained.suspicion()).abs() < f64::EPSILON);
}

#[test]
fn corrupt_opponent_state_is_rejected() {
    let opponent = BaselineOpponent::new(3);
    assert_eq!(opponent.restore(&[1, 2, 3]), Err(OpponentError::CorruptState));

    let mut lies_exceed_reveals = Vec::new();
    lies_exceed_reveals.extend_from_slice(&1u32.to_le_bytes());
    lies_exceed_reveals.extend_from_slice(&5u32.to_le_bytes());
    assert_eq!(
        opponent.restore(&lies_exceed_reveals),
        Err(OpponentError::CorruptState)
    );

    let store = MemoryStore::default();
    store.save_opponent_state(&[9]).unwrap();
    let runner = EffectRunner::new().with_persistence(store);
    assert!(!runner.restore_opponent(&opponent));
}

#[test]
fn baseline_opponent_shows_a_social() {
    let opponent = BaselineOpponent::new(11);
    let roll = Roll::new(1, 4).unwrap();
    let options = build_claim_options(Some(Claim::INFERNO), None);
    let context = DecisionContext {
        challenge: Some(Claim::INFERNO),
        locked_down: true,
        standing_claim: Some(Claim::INFERNO),
        can_call_bluff: true,
        roll,
        must_bluff: true,
        options: &options,
        history: &[],
        own_score: 5,
        player_score: 5,
        mode: GameMode::Match,
    };
    assert_eq!(opponent.decide(&context), Ok(Decision::Raise(41)));
}

#[test]
fn baseline_opponent_is_honest_when_it_cannot_call() {
    let opponent = BaselineOpponent::new(5);
    let roll = Roll::new(6, 2).unwrap();
    let options = build_claim_options(None, None);
    let context = DecisionContext {
        challenge: None,
        locked_down: false,
        standing_claim: None,
        can_call_bluff: false,
        roll,
        must_bluff: false,
        options: &options,
        history: &[],
        own_score: 5,
        player_score: 5,
        mode: GameMode::Survival,
    };
    for _ in 0..20 {
        assert_eq!(opponent.decide(&context), Ok(Decision::Raise(62)));
    }
}
