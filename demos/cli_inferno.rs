//! CLI Inferno Dice example.

#![allow(clippy::missing_docs_in_private_items)]

use std::io::{self, Write};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use inferno_dice::{
    Actor, ClaimReport, CpuAction, Effect, EffectRunner, GameOptions, HistoryEntry, Phase,
    RoundOutcome, Session,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    println!("Inferno Dice CLI example (type 'q' to quit)");

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let session = Session::with_baseline_opponent(GameOptions::default(), seed);
    let runner = EffectRunner::new();

    if session.new_game().is_err() {
        return;
    }

    loop {
        pump(&session, &runner);
        print_table(&session);

        match session.phase() {
            Phase::GameOver { winner } => {
                println!("{}", colorize(&format!("Game over. {winner} wins."), "33"));
                match prompt_line("Play again? (y/n): ").as_str() {
                    "y" | "yes" => {
                        let _ = session.new_game();
                        continue;
                    }
                    _ => break,
                }
            }
            Phase::AwaitingRoll(Actor::Player) => {
                match prompt_line("[r]oll: ").as_str() {
                    "q" | "quit" => break,
                    _ => report_roll(&session),
                }
            }
            Phase::AwaitingResponse(Actor::Player) => {
                match prompt_line("[r]oll or [c]all: ").as_str() {
                    "q" | "quit" => break,
                    "c" | "call" => match session.call_bluff(Actor::Player) {
                        Ok(outcome) => print_outcome(&outcome),
                        Err(err) => println!("{err}"),
                    },
                    _ => report_roll(&session),
                }
            }
            Phase::AwaitingClaim {
                actor: Actor::Player,
                roll,
            } => {
                let options = session
                    .claim_options()
                    .iter()
                    .map(|claim| claim.code().to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("You hold {}. Options: {options}", roll.claim());
                let Some(code) = prompt_u8("Claim: ") else {
                    break;
                };
                match session.claim(Actor::Player, code) {
                    Ok(ClaimReport::InfernoForfeit(outcome)) => print_outcome(&outcome),
                    Ok(_) => {}
                    Err(err) => println!("{err}"),
                }
            }
            _ => {}
        }
    }

    println!("Goodbye.");
}

/// Runs queued effects and plays scheduled CPU turns inline.
fn pump(session: &Session, runner: &EffectRunner) {
    loop {
        let scheduling = runner.run(session.drain_effects());
        let mut played = false;
        for effect in scheduling {
            if let Effect::ScheduleCpuTurn { ticket, delay } = effect {
                thread::sleep(delay);
                match session.run_cpu_turn(ticket) {
                    Ok(turn) => {
                        played = true;
                        match turn.action {
                            CpuAction::CalledBluff(outcome) => print_outcome(&outcome),
                            CpuAction::Claimed(ClaimReport::Passed { claim, .. }) => {
                                println!("{}", colorize(&format!("CPU claims {claim}"), "36"));
                            }
                            CpuAction::Claimed(ClaimReport::SocialReset { .. }) => {
                                println!("{}", colorize("CPU shows a Social.", "36"));
                            }
                            CpuAction::Claimed(ClaimReport::InfernoForfeit(outcome)) => {
                                print_outcome(&outcome);
                            }
                        }
                    }
                    Err(err) => println!("CPU turn skipped: {err}"),
                }
            }
        }
        if !played {
            break;
        }
    }
}

fn report_roll(session: &Session) {
    if let Err(err) = session.roll(Actor::Player) {
        println!("{err}");
    }
}

fn print_outcome(outcome: &RoundOutcome) {
    let verdict = if outcome.liar_is_defender {
        colorize("bluff!", "31")
    } else {
        colorize("honest", "32")
    };
    println!(
        "{} called {}: {verdict} (rolled {}). {} loses {}.",
        outcome.caller,
        outcome.defender_claim,
        outcome.defender_roll.claim(),
        outcome.loser(),
        outcome.penalty
    );
}

fn print_table(session: &Session) {
    println!(
        "\nScore: you {} | cpu {}",
        session.score(Actor::Player),
        session.score(Actor::Cpu)
    );
    if let Some(challenge) = session.active_challenge() {
        println!("To beat: {challenge}");
    }
    for entry in session.history().iter().rev().take(3).rev() {
        match entry {
            HistoryEntry::Claim { actor, claim, .. } => println!("  {actor}: {claim}"),
            HistoryEntry::Event(text) => println!("  {text}"),
        }
    }
    println!("{}", session.narration());
}

fn prompt_line(prompt: &str) -> String {
    print!("{prompt}");
    let _ = io::stdout().flush();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return String::new();
    }
    input.trim().to_lowercase()
}

fn prompt_u8(prompt: &str) -> Option<u8> {
    loop {
        let input = prompt_line(prompt);
        if input == "q" || input == "quit" {
            return None;
        }
        match input.parse::<u8>() {
            Ok(value) => return Some(value),
            Err(_) => println!("Please enter a claim like 53."),
        }
    }
}

fn colorize(text: &str, code: &str) -> String {
    format!("\u{1b}[{code}m{text}\u{1b}[0m")
}
