//! Display-mode state machine.
//!
//! Tracks the two independent reasons the board shows a bare clock
//! (consecutive fetch failures, or the user forcing it) plus the news
//! overlay countdown and the modal flags. The effective mode is derived,
//! never stored.

/// What the board is currently presenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Weather,
    ClockOnly,
    NewsOverlay,
}

#[derive(Debug)]
pub struct StateMachine {
    err_count: u32,
    err_max: u32,
    fallback_clock: bool,
    user_clock: bool,
    news_remaining: u64,
    news_secs: u64,
    help_shown: bool,
    config_open: bool,
}

impl StateMachine {
    pub fn new(err_max: u32, news_secs: u64) -> Self {
        Self {
            err_count: 0,
            err_max,
            fallback_clock: false,
            user_clock: false,
            news_remaining: 0,
            news_secs,
            help_shown: false,
            config_open: false,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        if self.fallback_clock || self.user_clock {
            DisplayMode::ClockOnly
        } else if self.news_remaining > 0 {
            DisplayMode::NewsOverlay
        } else {
            DisplayMode::Weather
        }
    }

    pub fn clock_only(&self) -> bool {
        self.fallback_clock || self.user_clock
    }

    pub fn err_count(&self) -> u32 {
        self.err_count
    }

    /// A weather fetch succeeded. Clears the failure streak and the
    /// fallback clock; a user-forced clock survives.
    pub fn on_weather_success(&mut self) {
        self.err_count = 0;
        self.fallback_clock = false;
    }

    /// A weather fetch failed. Returns true when this failure tips the
    /// board into the fallback clock. A first-run failure falls back
    /// immediately since there is nothing cached to keep showing.
    pub fn on_weather_failure(&mut self, first_run: bool) -> bool {
        self.err_count += 1;
        let was = self.fallback_clock;
        if first_run || self.err_count > self.err_max {
            self.fallback_clock = true;
        }
        self.fallback_clock && !was
    }

    /// User toggled the clock-only view. Returns the new forced state.
    pub fn toggle_user_clock(&mut self) -> bool {
        self.user_clock = !self.user_clock;
        self.user_clock
    }

    pub fn user_clock(&self) -> bool {
        self.user_clock
    }

    pub fn clear_user_clock(&mut self) {
        self.user_clock = false;
    }

    /// Fresh headlines arrived: (re)start the overlay countdown. A new
    /// batch replaces the remaining time, it never stacks.
    pub fn news_arrived(&mut self) {
        self.news_remaining = self.news_secs;
    }

    /// Restore a countdown carried across a restart.
    pub fn resume_news(&mut self, remaining: u64) {
        self.news_remaining = remaining.min(self.news_secs);
    }

    /// One second of overlay time passed. Returns true when the
    /// countdown just expired.
    pub fn tick_news(&mut self) -> bool {
        if self.news_remaining == 0 {
            return false;
        }
        self.news_remaining -= 1;
        self.news_remaining == 0
    }

    pub fn news_remaining(&self) -> u64 {
        self.news_remaining
    }

    pub fn news_showing(&self) -> bool {
        self.news_remaining > 0
    }

    pub fn toggle_help(&mut self) -> bool {
        self.help_shown = !self.help_shown;
        self.help_shown
    }

    pub fn help_shown(&self) -> bool {
        self.help_shown
    }

    pub fn set_config_open(&mut self, open: bool) {
        self.config_open = open;
    }

    pub fn config_open(&self) -> bool {
        self.config_open
    }
}
