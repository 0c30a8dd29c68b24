//! Score and streak bookkeeping.

use crate::game::state::{Actor, GameMode};

/// Summary of a finished survival run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Streak the run ended with.
    pub streak: u32,
    /// Best streak in this session, including this run.
    pub best_of_session: u32,
    /// Whether this run set a new session best.
    pub new_best: bool,
}

/// What a single loss did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LossOutcome {
    /// The side that lost the round.
    pub loser: Actor,
    /// Points charged (1, or 2 under Inferno stakes).
    pub amount: u8,
    /// The loser's remaining score. Survival mode has no score pool and
    /// always reports 0 here.
    pub loser_score: u32,
    /// Whether the game or run ended.
    pub finished: bool,
    /// Survival streak after this result.
    pub streak: Option<u32>,
    /// Set when a survival run ended.
    pub run: Option<RunSummary>,
}

/// Per-session scores or streak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLedger {
    mode: GameMode,
    starting_score: u32,
    player: u32,
    cpu: u32,
    streak: u32,
    best_streak: u32,
    finished: bool,
}

impl ScoreLedger {
    /// Creates a ledger for `mode`, both sides starting at `starting_score`.
    #[must_use]
    pub const fn new(mode: GameMode, starting_score: u32) -> Self {
        Self {
            mode,
            starting_score,
            player: starting_score,
            cpu: starting_score,
            streak: 0,
            best_streak: 0,
            finished: false,
        }
    }

    /// Starts over in `mode`. The session-best streak is kept.
    pub const fn reset(&mut self, mode: GameMode) {
        self.mode = mode;
        self.player = self.starting_score;
        self.cpu = self.starting_score;
        self.streak = 0;
        self.finished = false;
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> GameMode {
        self.mode
    }

    /// Current score of `actor`.
    #[must_use]
    pub const fn score(&self, actor: Actor) -> u32 {
        match actor {
            Actor::Player => self.player,
            Actor::Cpu => self.cpu,
        }
    }

    /// Current survival streak.
    #[must_use]
    pub const fn streak(&self) -> u32 {
        self.streak
    }

    /// Best survival streak this session.
    #[must_use]
    pub const fn best_streak(&self) -> u32 {
        self.best_streak
    }

    /// Whether the game or run has ended.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Lowest score on the table, used to pace the CPU.
    #[must_use]
    pub fn lowest_score(&self) -> u32 {
        self.player.min(self.cpu)
    }

    /// Charges `amount` to `actor`.
    ///
    /// In match mode the score is clamped at zero and reaching zero ends the
    /// game. In survival mode a player loss ends the run and a CPU loss
    /// extends the streak by `amount`.
    pub fn apply_loss(&mut self, actor: Actor, amount: u8) -> LossOutcome {
        match self.mode {
            GameMode::Match => {
                let score = match actor {
                    Actor::Player => &mut self.player,
                    Actor::Cpu => &mut self.cpu,
                };
                *score = score.saturating_sub(u32::from(amount));
                let loser_score = *score;
                if loser_score == 0 {
                    self.finished = true;
                }
                LossOutcome {
                    loser: actor,
                    amount,
                    loser_score,
                    finished: self.finished,
                    streak: None,
                    run: None,
                }
            }
            GameMode::Survival => match actor {
                Actor::Cpu => {
                    self.record_win(amount);
                    LossOutcome {
                        loser: actor,
                        amount,
                        loser_score: 0,
                        finished: false,
                        streak: Some(self.streak),
                        run: None,
                    }
                }
                Actor::Player => {
                    let run = self.close_run();
                    LossOutcome {
                        loser: actor,
                        amount,
                        loser_score: 0,
                        finished: true,
                        streak: Some(run.streak),
                        run: Some(run),
                    }
                }
            },
        }
    }

    /// Adds a round win to the survival streak.
    pub const fn record_win(&mut self, amount: u8) {
        self.streak = self.streak.saturating_add(amount as u32);
    }

    /// Ends the current survival run and returns its summary.
    pub fn close_run(&mut self) -> RunSummary {
        let new_best = self.streak > self.best_streak;
        if new_best {
            self.best_streak = self.streak;
        }
        self.finished = true;
        RunSummary {
            streak: self.streak,
            best_of_session: self.best_streak,
            new_best,
        }
    }
}
