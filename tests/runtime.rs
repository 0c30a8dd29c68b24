//! Driver tests on a paused tokio clock.

use core::time::Duration;
use std::sync::{Arc, Mutex};

use inferno_dice::{
    Actor, Claim, Decision, DecisionContext, Driver, EffectRunner, GameOptions, GatewayError,
    OpponentDecisionPort, OpponentError, OutcomeRecord, Phase, Roll, Session, StatsGateway,
};

/// Always declares its own roll.
struct Honest;

impl OpponentDecisionPort for Honest {
    fn decide(&self, context: &DecisionContext<'_>) -> Result<Decision, OpponentError> {
        Ok(Decision::Raise(context.roll.claim().code()))
    }
}

#[derive(Clone, Default)]
struct RecordingStats {
    rolls: Arc<Mutex<Vec<Claim>>>,
    claims: Arc<Mutex<Vec<Claim>>>,
}

impl StatsGateway for RecordingStats {
    fn record_roll(&self, claim: Claim) -> Result<(), GatewayError> {
        self.rolls.lock().unwrap().push(claim);
        Ok(())
    }

    fn record_claim(&self, claim: Claim) -> Result<(), GatewayError> {
        self.claims.lock().unwrap().push(claim);
        Ok(())
    }

    fn record_outcome(&self, _outcome: &OutcomeRecord) -> Result<(), GatewayError> {
        Ok(())
    }

    fn record_run(&self, _streak: u32) -> Result<(), GatewayError> {
        Ok(())
    }
}

fn roll(first: u8, second: u8) -> Roll {
    Roll::new(first, second).unwrap()
}

fn driver() -> (Driver, RecordingStats) {
    let stats = RecordingStats::default();
    let session = Session::new(GameOptions::default(), Honest, 3);
    let driver = Driver::new(session, EffectRunner::new().with_stats(stats.clone()));
    (driver, stats)
}

/// Starts a match and has the player claim a truthful 53.
fn open_with_53(driver: &Driver) {
    driver.new_game().unwrap();
    driver.session().force_rolls([roll(5, 3), roll(6, 4)]);
    driver.roll(Actor::Player).unwrap();
    driver.claim(Actor::Player, 53).unwrap();
}

#[tokio::test(start_paused = true)]
async fn cpu_answers_after_thinking() {
    let (driver, stats) = driver();
    open_with_53(&driver);
    assert!(driver.session().is_cpu_thinking());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(driver.session().phase(), Phase::AwaitingResponse(Actor::Cpu));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(driver.session().phase(), Phase::AwaitingResponse(Actor::Player));
    assert!(!driver.session().is_cpu_thinking());
    assert_eq!(
        driver.session().standing_claim(),
        Some((Actor::Cpu, roll(6, 4).claim()))
    );
    assert_eq!(stats.rolls.lock().unwrap().len(), 2);
    assert_eq!(stats.claims.lock().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn new_game_aborts_the_pending_turn() {
    let (driver, stats) = driver();
    open_with_53(&driver);
    driver.new_game().unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(driver.session().phase(), Phase::AwaitingRoll(Actor::Player));
    assert!(!driver.session().is_cpu_thinking());
    assert_eq!(stats.rolls.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_cpu() {
    let (driver, stats) = driver();
    open_with_53(&driver);
    driver.shutdown();

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(driver.session().phase(), Phase::AwaitingResponse(Actor::Cpu));
    assert!(!driver.session().is_cpu_thinking());
    assert_eq!(stats.claims.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn player_input_waits_for_the_cpu() {
    let (driver, _) = driver();
    open_with_53(&driver);
    assert!(driver.call_bluff(Actor::Player).is_err());

    tokio::time::sleep(Duration::from_secs(1)).await;
    let outcome = driver.call_bluff(Actor::Player).unwrap();
    assert!(!outcome.liar_is_defender);
    assert_eq!(driver.session().score(Actor::Player), 4);

    // The CPU won the round and opens the next one on its own.
    driver.session().force_rolls([roll(6, 2)]);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(driver.session().phase(), Phase::AwaitingResponse(Actor::Player));
}

#[tokio::test(start_paused = true)]
async fn cpu_turn_can_schedule_the_next_one() {
    let (driver, _) = driver();
    open_with_53(&driver);
    tokio::time::sleep(Duration::from_secs(1)).await;
    driver.call_bluff(Actor::Player).unwrap();

    // The CPU opens, shows a Social and has to open again from its own timer.
    driver.session().force_rolls([roll(4, 1), roll(6, 2)]);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(driver.session().phase(), Phase::AwaitingRoll(Actor::Cpu));
    assert!(driver.session().is_cpu_thinking());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(driver.session().phase(), Phase::AwaitingResponse(Actor::Player));
    assert_eq!(
        driver.session().standing_claim(),
        Some((Actor::Cpu, roll(6, 2).claim()))
    );
}
