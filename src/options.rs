//! Session configuration options.

use core::time::Duration;

/// Configuration options for a dice session.
///
/// Use the builder pattern to customize options:
///
/// ```
/// use core::time::Duration;
/// use inferno_dice::GameOptions;
///
/// let options = GameOptions::default()
///     .with_starting_score(3)
///     .with_history_len(20)
///     .with_thinking_delay(Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOptions {
    /// Score each side starts a match with.
    pub starting_score: u32,
    /// Number of history entries kept per game mode.
    pub history_len: usize,
    /// How long the CPU "thinks" before acting.
    pub thinking_delay: Duration,
    /// Thinking delay used when a score is at or below `critical_score`.
    pub tense_thinking_delay: Duration,
    /// Score at which the CPU slows down for tension.
    pub critical_score: u32,
    /// Whether the CPU opens the next round after the player catches one of
    /// its bluffs in survival mode.
    pub survival_auto_advance: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            starting_score: 5,
            history_len: 10,
            thinking_delay: Duration::from_millis(900),
            tense_thinking_delay: Duration::from_millis(1600),
            critical_score: 1,
            survival_auto_advance: true,
        }
    }
}

impl GameOptions {
    /// Sets the starting score.
    ///
    /// # Example
    ///
    /// ```
    /// use inferno_dice::GameOptions;
    ///
    /// let options = GameOptions::default().with_starting_score(3);
    /// assert_eq!(options.starting_score, 3);
    /// ```
    #[must_use]
    pub const fn with_starting_score(mut self, score: u32) -> Self {
        self.starting_score = score;
        self
    }

    /// Sets the history length.
    #[must_use]
    pub const fn with_history_len(mut self, len: usize) -> Self {
        self.history_len = len;
        self
    }

    /// Sets the CPU thinking delay.
    ///
    /// # Example
    ///
    /// ```
    /// use core::time::Duration;
    /// use inferno_dice::GameOptions;
    ///
    /// let options = GameOptions::default().with_thinking_delay(Duration::ZERO);
    /// assert_eq!(options.thinking_delay, Duration::ZERO);
    /// ```
    #[must_use]
    pub const fn with_thinking_delay(mut self, delay: Duration) -> Self {
        self.thinking_delay = delay;
        self
    }

    /// Sets the tense CPU thinking delay.
    #[must_use]
    pub const fn with_tense_thinking_delay(mut self, delay: Duration) -> Self {
        self.tense_thinking_delay = delay;
        self
    }

    /// Sets the critical score.
    #[must_use]
    pub const fn with_critical_score(mut self, score: u32) -> Self {
        self.critical_score = score;
        self
    }

    /// Sets whether survival mode hands the next round straight to the CPU.
    #[must_use]
    pub const fn with_survival_auto_advance(mut self, enabled: bool) -> Self {
        self.survival_auto_advance = enabled;
        self
    }

    /// Returns the thinking delay for the given lowest score on the table.
    #[must_use]
    pub const fn delay_for(&self, lowest_score: u32) -> Duration {
        if lowest_score <= self.critical_score {
            self.tense_thinking_delay
        } else {
            self.thinking_delay
        }
    }
}
