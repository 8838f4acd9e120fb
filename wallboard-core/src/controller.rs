//! The update orchestrator.
//!
//! A single `select!` loop owns the snapshot, the diff engine, and the
//! state machine. Timers and fetch completions all funnel through it, so
//! no display state is ever touched concurrently. Network work happens
//! on the worker tasks; their tagged outcomes come back over a channel
//! and stale ones (completed after a location change) are dropped here.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime, Timelike};
use tokio::sync::mpsc;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{Config, NewsMode};
use crate::editor::{SettingsEditor, SettingsSession};
use crate::lookup;
use crate::model::{Continuation, DEFAULT_BKG, Snapshot, StartOptions, UserAction};
use crate::news::{NewsSource, NewsSourceId};
use crate::patch::{DiffEngine, Group, Patch};
use crate::provider::{WeatherProvider, WeatherReport};
use crate::snapshot::apply_weather;
use crate::state::StateMachine;
use crate::worker::{self, FetchOutcome, NewsJob, WeatherJob, WorkerHandle};

/// Why the controller loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exit {
    Quit,
    /// Relaunch with this state after the settings editor closed.
    Restart(Continuation),
}

enum Event {
    WeatherPoll,
    Second,
    Outcome(FetchOutcome),
    Action(UserAction),
    ChannelClosed,
}

pub struct Controller {
    cfg: Arc<Config>,
    snapshot: Snapshot,
    diff: DiffEngine,
    state: StateMachine,
    patches: mpsc::UnboundedSender<Vec<Patch>>,
    weather_worker: WorkerHandle<WeatherJob>,
    news_worker: WorkerHandle<NewsJob>,
    outcomes: mpsc::Receiver<FetchOutcome>,
    actions: mpsc::Receiver<UserAction>,
    editor: Box<dyn SettingsEditor>,
    session: Option<Box<dyn SettingsSession>>,
    news_source: NewsSourceId,
    last_report: Option<WeatherReport>,
    window_pos: Option<(i32, i32)>,
    first_fetch_done: bool,
    last_hm: String,
    exit: Option<Exit>,
}

impl Controller {
    /// Build the controller and spawn its fetch workers. Must run inside
    /// a tokio runtime. Returns the sender for user actions.
    pub fn new(
        cfg: Arc<Config>,
        options: StartOptions,
        provider: Arc<dyn WeatherProvider>,
        news: Arc<dyn NewsSource>,
        editor: Box<dyn SettingsEditor>,
        patches: mpsc::UnboundedSender<Vec<Patch>>,
    ) -> (Self, mpsc::Sender<UserAction>) {
        let (outcome_tx, outcome_rx) = mpsc::channel(16);
        let weather_worker = worker::spawn_weather(provider, outcome_tx.clone());
        let news_worker = worker::spawn_news(news, outcome_tx);
        let (action_tx, action_rx) = mpsc::channel(16);

        let location_index = options.location_index.min(cfg.locations.len() - 1);
        let mut state = StateMachine::new(cfg.intervals.err_max, cfg.news.show_secs);
        state.resume_news(options.news_remaining);
        if options.show_help {
            state.toggle_help();
        }

        let controller = Self {
            snapshot: Snapshot::new(location_index),
            diff: DiffEngine::new(),
            state,
            patches,
            weather_worker,
            news_worker,
            outcomes: outcome_rx,
            actions: action_rx,
            editor,
            session: None,
            news_source: options.news_source.unwrap_or(NewsSourceId::primary()),
            last_report: None,
            window_pos: options.window_pos,
            first_fetch_done: false,
            last_hm: String::new(),
            exit: None,
            cfg,
        };

        (controller, action_tx)
    }

    /// Run until quit or restart. Consumes the controller; workers are
    /// joined before returning.
    pub async fn run(mut self) -> Exit {
        let mut poll = time::interval(Duration::from_secs(self.cfg.intervals.weather_minutes * 60));
        let mut tick = time::interval(Duration::from_secs(1));
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.bootstrap(Local::now().naive_local());

        let exit = loop {
            let event = tokio::select! {
                _ = poll.tick() => Event::WeatherPoll,
                _ = tick.tick() => Event::Second,
                outcome = self.outcomes.recv() => match outcome {
                    Some(o) => Event::Outcome(o),
                    None => Event::ChannelClosed,
                },
                action = self.actions.recv() => match action {
                    Some(a) => Event::Action(a),
                    None => Event::ChannelClosed,
                },
            };

            let now = Local::now().naive_local();
            match event {
                Event::WeatherPoll => {
                    let first_run = !self.first_fetch_done;
                    self.request_weather(first_run);
                }
                Event::Second => self.handle_second(now),
                Event::Outcome(outcome) => self.handle_outcome(outcome, now),
                Event::Action(action) => self.handle_action(action),
                Event::ChannelClosed => self.exit = Some(Exit::Quit),
            }

            if let Some(exit) = self.exit.take() {
                break exit;
            }
        };

        self.weather_worker.shutdown().await;
        self.news_worker.shutdown().await;
        exit
    }

    /// First emission: calendar header, clock, and the resumed ticker.
    fn bootstrap(&mut self, now: NaiveDateTime) {
        self.set_header(now);
        self.set_clock(now);
        self.last_hm = now.format("%H:%M").to_string();

        self.emit(&[Group::Background, Group::Header, Group::Separator, Group::Time]);

        // A resumed countdown has no titles yet; refetch them.
        if self.state.news_showing() && self.cfg.news.mode != NewsMode::AlwaysOff {
            self.request_news();
        }
    }

    fn handle_second(&mut self, now: NaiveDateTime) {
        if self.session.as_mut().is_some_and(|s| s.is_finished()) {
            self.session = None;
            self.state.set_config_open(false);
            info!("settings editor closed, restarting");
            self.exit = Some(Exit::Restart(self.continuation()));
            return;
        }

        let mut scope = vec![Group::Separator];

        if self.state.tick_news() {
            self.snapshot.news.showing = false;
            scope.push(Group::News);
        }

        self.snapshot.clock.sep_on = now.second() % 2 == 0;

        let hm = now.format("%H:%M").to_string();
        if hm != self.last_hm {
            self.last_hm = hm.clone();
            self.handle_minute(now, &hm, &mut scope);
        }

        self.emit(&scope);
    }

    fn handle_minute(&mut self, now: NaiveDateTime, hm: &str, scope: &mut Vec<Group>) {
        self.set_clock(now);
        scope.push(Group::Time);

        if hm == "00:00" {
            // New day: calendar header plus every date-derived field.
            self.set_header(now);
            scope.push(Group::Header);
            if self.refresh_from_cache(now) {
                self.sync_display_mode();
                scope.extend(Group::WEATHER);
            } else {
                self.snapshot.astro.sun_sign = lookup::sun_sign(now).to_string();
                self.snapshot.astro.moon =
                    lookup::moon_phase_name(lookup::moon_position(now)).to_string();
                scope.extend([Group::Moon, Group::SunSign]);
            }
        } else if hm == self.snapshot.astro.sunrise || hm == self.snapshot.astro.sunset {
            // Day/night boundary: re-derive icons from the cached report.
            if self.refresh_from_cache(now) {
                self.sync_display_mode();
                scope.extend(Group::WEATHER);
            }
        }

        match self.cfg.news.mode {
            NewsMode::AlwaysOn => {
                if !self.state.news_showing() {
                    self.request_news();
                }
            }
            NewsMode::Period => {
                if now.minute() % self.cfg.news.period_minutes == 0 {
                    self.request_news();
                }
            }
            NewsMode::AlwaysOff => {}
        }
    }

    fn handle_outcome(&mut self, outcome: FetchOutcome, now: NaiveDateTime) {
        match outcome {
            FetchOutcome::Weather { location_index, first_run, result } => {
                if location_index != self.snapshot.location_index {
                    debug!(location_index, "dropping stale weather result");
                    return;
                }
                match result {
                    Ok(report) => {
                        self.state.on_weather_success();
                        self.first_fetch_done = true;
                        self.last_report = Some(report);
                        self.refresh_from_cache(now);
                        self.sync_display_mode();
                        self.emit(&Group::WEATHER);
                    }
                    Err(e) => {
                        let entered_fallback = self.state.on_weather_failure(first_run);
                        warn!(errors = self.state.err_count(), "weather fetch failed: {e}");
                        if entered_fallback {
                            self.sync_display_mode();
                            self.emit(&[Group::Background, Group::ClockOnlyToggle]);
                        }
                    }
                }
            }
            FetchOutcome::News { source, result } => {
                match result {
                    Ok(titles) if !titles.is_empty() => {
                        self.snapshot.news.head =
                            format!("{} {} | ", source.display_name(), now.format("%H:%M"));
                        self.snapshot.news.titles = titles;
                        self.snapshot.news.showing = true;
                        self.state.news_arrived();
                        self.emit(&[Group::News]);
                    }
                    Ok(_) => debug!(%source, "feed yielded no titles"),
                    Err(e) => warn!(%source, "news fetch failed: {e}"),
                }
                // Alternate after every completed cycle, failed ones too.
                if self.cfg.news.alternate_sources {
                    self.news_source = self.news_source.other();
                }
            }
        }
    }

    fn handle_action(&mut self, action: UserAction) {
        match action {
            UserAction::SelectLocation(index) => {
                if index == self.snapshot.location_index {
                    return;
                }
                info!(location = %self.cfg.location(index).name, "location selected");
                self.snapshot.location_index = index;
                self.snapshot.header.location = self.cfg.location(index).name.clone();
                self.state.clear_user_clock();
                // Old location's values must not suppress the new ones.
                self.diff.reset_weather();
                self.emit(&[Group::Header]);
                self.request_weather(true);
            }
            UserAction::SelectNewsSource(source) => {
                self.news_source = source;
                self.request_news();
            }
            UserAction::ToggleClockOnly => {
                if self.state.toggle_user_clock() {
                    self.sync_display_mode();
                    self.emit(&[Group::Background, Group::ClockOnlyToggle]);
                } else {
                    // Weather comes back only with fresh data.
                    self.request_weather(false);
                }
            }
            UserAction::OpenSettings => {
                if self.session.is_some() {
                    return;
                }
                match self.editor.open() {
                    Ok(session) => {
                        self.session = Some(session);
                        self.state.set_config_open(true);
                    }
                    Err(e) => warn!("could not open settings editor: {e}"),
                }
            }
            UserAction::ToggleHelp => {
                let shown = self.state.toggle_help();
                debug!(shown, "help toggled");
            }
            UserAction::Quit => self.exit = Some(Exit::Quit),
        }
    }

    /// Re-derive the display fields from the cached report with the
    /// current wall-clock time. Returns false when nothing is cached.
    fn refresh_from_cache(&mut self, now: NaiveDateTime) -> bool {
        let Some(report) = self.last_report.as_ref() else {
            return false;
        };
        apply_weather(&mut self.snapshot, report, now, &self.cfg);
        true
    }

    /// Keep the snapshot's mode-dependent fields in line with the state
    /// machine: clock-only hides the weather background.
    fn sync_display_mode(&mut self) {
        self.snapshot.clock_only = self.state.clock_only();
        self.snapshot.bkg = if self.snapshot.clock_only {
            DEFAULT_BKG.to_string()
        } else {
            self.snapshot.current.bkg.clone()
        };
    }

    fn set_header(&mut self, now: NaiveDateTime) {
        let header = &mut self.snapshot.header;
        header.weekday = now.format("%A").to_string();
        header.day = now.format("%d").to_string();
        header.month = now.format("%B").to_string();
        header.source = "OpenWeather".to_string();
        header.location = self.cfg.location(self.snapshot.location_index).name.clone();
    }

    fn set_clock(&mut self, now: NaiveDateTime) {
        self.snapshot.clock.hour = now.format("%H").to_string();
        self.snapshot.clock.minute = now.format("%M").to_string();
    }

    fn request_weather(&mut self, first_run: bool) {
        let location = self.cfg.location(self.snapshot.location_index);
        self.weather_worker.submit(WeatherJob {
            query: location.query.clone(),
            location_index: self.snapshot.location_index,
            first_run,
        });
    }

    fn request_news(&mut self) {
        self.news_worker.submit(NewsJob { source: self.news_source });
    }

    fn continuation(&self) -> Continuation {
        Continuation {
            window_pos: self.window_pos,
            location_index: self.snapshot.location_index,
            news_remaining: self.state.news_remaining(),
            news_source: self.news_source,
        }
    }

    fn emit(&mut self, scope: &[Group]) {
        let patches = self.diff.diff(&self.snapshot, scope);
        if !patches.is_empty() {
            let _ = self.patches.send(patches);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::error::FetchError;
    use crate::patch::NewsPatch;
    use crate::snapshot::tests::sample_report;
    use chrono::NaiveDate;

    #[derive(Debug)]
    struct StubProvider;

    #[async_trait::async_trait]
    impl WeatherProvider for StubProvider {
        async fn fetch(&self, _query: &str) -> Result<WeatherReport, FetchError> {
            Err(FetchError::Timeout)
        }
    }

    struct InstantSession;
    impl SettingsSession for InstantSession {
        fn is_finished(&mut self) -> bool {
            true
        }
    }

    struct InstantEditor;
    impl SettingsEditor for InstantEditor {
        fn open(&mut self) -> anyhow::Result<Box<dyn SettingsSession>> {
            Ok(Box::new(InstantSession))
        }
    }

    /// Records which sources were fetched; never touches the network.
    #[derive(Debug, Default)]
    struct RecordingSource {
        calls: std::sync::Mutex<Vec<NewsSourceId>>,
    }

    impl RecordingSource {
        fn count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl NewsSource for RecordingSource {
        async fn fetch_titles(&self, id: NewsSourceId) -> Result<String, FetchError> {
            self.calls.lock().unwrap().push(id);
            Err(FetchError::Timeout)
        }
    }

    fn build(
        cfg: Config,
    ) -> (Controller, mpsc::UnboundedReceiver<Vec<Patch>>, Arc<RecordingSource>) {
        let cfg = Arc::new(cfg);
        let (tx, rx) = mpsc::unbounded_channel();
        let news = Arc::new(RecordingSource::default());
        let (controller, _actions) = Controller::new(
            cfg,
            StartOptions::default(),
            Arc::new(StubProvider),
            news.clone(),
            Box::new(InstantEditor),
            tx,
        );
        (controller, rx, news)
    }

    /// Let the worker tasks drain their job queues.
    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Vec<Patch>>) -> Vec<Patch> {
        let mut all = Vec::new();
        while let Ok(batch) = rx.try_recv() {
            all.extend(batch);
        }
        all
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 12).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    fn weather_ok(location_index: usize) -> FetchOutcome {
        FetchOutcome::Weather { location_index, first_run: false, result: Ok(sample_report()) }
    }

    fn weather_err(location_index: usize, first_run: bool) -> FetchOutcome {
        FetchOutcome::Weather { location_index, first_run, result: Err(FetchError::Timeout) }
    }

    #[tokio::test]
    async fn bootstrap_emits_header_clock_and_background() {
        let (mut ctl, mut rx, _news) = build(test_config());
        ctl.bootstrap(at(12, 30, 0));

        let patches = drain(&mut rx);
        let groups: Vec<Group> = patches.iter().map(Patch::group).collect();
        assert_eq!(
            groups,
            vec![Group::Background, Group::Header, Group::Separator, Group::Time]
        );
        assert!(patches.contains(&Patch::Background { bkg: "99".into() }));
        assert!(patches.contains(&Patch::Time { hour: "12".into(), minute: "30".into() }));
    }

    #[tokio::test]
    async fn seconds_only_blink_the_separator() {
        let (mut ctl, mut rx, _news) = build(test_config());
        ctl.bootstrap(at(12, 30, 0));
        drain(&mut rx);

        // Still off on odd seconds, no patch.
        ctl.handle_second(at(12, 30, 1));
        assert!(drain(&mut rx).is_empty());

        ctl.handle_second(at(12, 30, 2));
        assert_eq!(drain(&mut rx), vec![Patch::Separator { on: true }]);

        ctl.handle_second(at(12, 30, 3));
        assert_eq!(drain(&mut rx), vec![Patch::Separator { on: false }]);
    }

    #[tokio::test]
    async fn minute_rollover_updates_the_clock() {
        let (mut ctl, mut rx, _news) = build(test_config());
        ctl.bootstrap(at(12, 30, 58));
        drain(&mut rx);

        ctl.handle_second(at(12, 31, 0));
        let patches = drain(&mut rx);
        assert!(patches.contains(&Patch::Time { hour: "12".into(), minute: "31".into() }));
    }

    #[tokio::test]
    async fn midnight_rolls_the_header() {
        let (mut ctl, mut rx, _news) = build(test_config());
        ctl.bootstrap(at(23, 59, 58));
        drain(&mut rx);

        ctl.handle_second(
            NaiveDate::from_ymd_opt(2025, 8, 13).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        );
        let patches = drain(&mut rx);
        let header = patches.iter().find_map(|p| match p {
            Patch::Header(h) => Some(h.clone()),
            _ => None,
        });
        let header = header.expect("header re-emitted at midnight");
        assert_eq!(header.day, "13");
        assert_eq!(header.weekday, "Wednesday");
    }

    #[tokio::test]
    async fn weather_success_fills_the_board() {
        let (mut ctl, mut rx, _news) = build(test_config());
        ctl.bootstrap(at(12, 0, 0));
        drain(&mut rx);

        ctl.handle_outcome(weather_ok(0), at(12, 0, 5));
        let patches = drain(&mut rx);

        assert!(patches.contains(&Patch::Background { bkg: "32".into() }));
        assert!(patches.iter().any(|p| matches!(p, Patch::CurrentConditions(_))));
        assert!(patches.iter().any(|p| matches!(p, Patch::DailyForecast { .. })));
        assert!(patches.iter().any(|p| matches!(p, Patch::HourlyForecast { .. })));
        assert_eq!(ctl.snapshot.current.temp, "21");
        assert!(!ctl.snapshot.clock_only);
    }

    #[tokio::test]
    async fn stale_location_results_are_dropped() {
        let (mut ctl, mut rx, _news) = build(test_config());
        ctl.bootstrap(at(12, 0, 0));
        drain(&mut rx);

        ctl.handle_outcome(weather_ok(1), at(12, 0, 5));
        assert!(drain(&mut rx).is_empty());
        assert_eq!(ctl.snapshot.current.temp, "");
    }

    #[tokio::test]
    async fn failure_streak_falls_back_to_clock() {
        let (mut ctl, mut rx, _news) = build(test_config());
        ctl.bootstrap(at(12, 0, 0));
        ctl.handle_outcome(weather_ok(0), at(12, 0, 5));
        drain(&mut rx);

        for _ in 0..8 {
            ctl.handle_outcome(weather_err(0, false), at(12, 1, 0));
        }
        assert!(drain(&mut rx).is_empty());

        ctl.handle_outcome(weather_err(0, false), at(12, 1, 0));
        let patches = drain(&mut rx);
        assert!(patches.contains(&Patch::Background { bkg: "99".into() }));
        assert!(patches.contains(&Patch::ClockOnlyToggle { enabled: true }));
    }

    #[tokio::test]
    async fn first_run_failure_falls_back_immediately() {
        let (mut ctl, mut rx, _news) = build(test_config());
        ctl.bootstrap(at(12, 0, 0));
        drain(&mut rx);

        ctl.handle_outcome(weather_err(0, true), at(12, 0, 5));
        let patches = drain(&mut rx);
        assert!(patches.contains(&Patch::ClockOnlyToggle { enabled: true }));
    }

    #[tokio::test]
    async fn success_after_fallback_restores_weather() {
        let (mut ctl, mut rx, _news) = build(test_config());
        ctl.bootstrap(at(12, 0, 0));
        ctl.handle_outcome(weather_err(0, true), at(12, 0, 5));
        drain(&mut rx);

        ctl.handle_outcome(weather_ok(0), at(12, 1, 0));
        let patches = drain(&mut rx);
        assert!(patches.contains(&Patch::ClockOnlyToggle { enabled: false }));
        assert!(patches.contains(&Patch::Background { bkg: "32".into() }));
    }

    #[tokio::test]
    async fn user_forced_clock_survives_fetch_success() {
        let (mut ctl, mut rx, _news) = build(test_config());
        ctl.bootstrap(at(12, 0, 0));
        ctl.handle_outcome(weather_ok(0), at(12, 0, 5));
        drain(&mut rx);

        ctl.handle_action(UserAction::ToggleClockOnly);
        let patches = drain(&mut rx);
        assert!(patches.contains(&Patch::Background { bkg: "99".into() }));
        assert!(patches.contains(&Patch::ClockOnlyToggle { enabled: true }));

        ctl.handle_outcome(weather_ok(0), at(12, 5, 0));
        assert!(ctl.snapshot.clock_only);
        let patches = drain(&mut rx);
        assert!(!patches.contains(&Patch::ClockOnlyToggle { enabled: false }));
    }

    #[tokio::test]
    async fn news_arrival_shows_the_ticker_and_alternates() {
        let (mut ctl, mut rx, _news) = build(test_config());
        ctl.bootstrap(at(12, 30, 0));
        drain(&mut rx);
        assert_eq!(ctl.news_source, NewsSourceId::Rtve);

        ctl.handle_outcome(
            FetchOutcome::News { source: NewsSourceId::Rtve, result: Ok("T1  ///  ".into()) },
            at(12, 30, 10),
        );

        let patches = drain(&mut rx);
        assert_eq!(
            patches,
            vec![Patch::News(NewsPatch::Show {
                head: "rtve 12:30 | ".into(),
                titles: "T1  ///  ".into()
            })]
        );
        assert_eq!(ctl.news_source, NewsSourceId::Bbc);
    }

    #[tokio::test]
    async fn failed_news_cycle_still_alternates() {
        let (mut ctl, mut rx, _news) = build(test_config());
        ctl.bootstrap(at(12, 30, 0));
        drain(&mut rx);

        ctl.handle_outcome(
            FetchOutcome::News { source: NewsSourceId::Rtve, result: Err(FetchError::Timeout) },
            at(12, 30, 10),
        );
        assert!(drain(&mut rx).is_empty());
        assert_eq!(ctl.news_source, NewsSourceId::Bbc);
    }

    #[tokio::test]
    async fn period_news_fires_once_per_matching_minute() {
        let mut cfg = test_config();
        cfg.news.mode = NewsMode::Period;
        cfg.news.period_minutes = 15;
        let (mut ctl, mut rx, news) = build(cfg);
        ctl.bootstrap(at(12, 14, 58));
        drain(&mut rx);

        // Seconds inside a non-matching minute fetch nothing.
        ctl.handle_second(at(12, 14, 59));
        settle().await;
        assert_eq!(news.count(), 0);

        // Rollover into :15 fires exactly once.
        ctl.handle_second(at(12, 15, 0));
        settle().await;
        assert_eq!(news.count(), 1);

        // Further seconds within the same minute never refire.
        ctl.handle_second(at(12, 15, 1));
        ctl.handle_second(at(12, 15, 30));
        ctl.handle_second(at(12, 15, 59));
        settle().await;
        assert_eq!(news.count(), 1);

        // :16 is not a multiple of the period.
        ctl.handle_second(at(12, 16, 0));
        settle().await;
        assert_eq!(news.count(), 1);

        // The next matching minute fires again.
        ctl.handle_second(at(12, 30, 0));
        settle().await;
        assert_eq!(news.count(), 2);
    }

    #[tokio::test]
    async fn always_on_refetches_only_while_hidden() {
        let mut cfg = test_config();
        cfg.news.mode = NewsMode::AlwaysOn;
        cfg.news.show_secs = 2;
        let (mut ctl, mut rx, news) = build(cfg);
        ctl.bootstrap(at(9, 0, 58));
        drain(&mut rx);

        // Nothing showing: the minute rollover refetches.
        ctl.handle_second(at(9, 1, 0));
        settle().await;
        assert_eq!(news.count(), 1);

        // Titles arrive; while the ticker shows, rollovers are quiet.
        ctl.handle_outcome(
            FetchOutcome::News { source: NewsSourceId::Rtve, result: Ok("T1 | ".into()) },
            at(9, 1, 5),
        );
        ctl.handle_second(at(9, 2, 0));
        settle().await;
        assert_eq!(news.count(), 1);

        // Countdown expires, ticker hides, next rollover refetches.
        ctl.handle_second(at(9, 2, 1));
        assert!(drain(&mut rx).iter().any(|p| *p == Patch::News(NewsPatch::Hide)));
        ctl.handle_second(at(9, 3, 0));
        settle().await;
        assert_eq!(news.count(), 2);
    }

    #[tokio::test]
    async fn always_off_never_fetches_on_its_own() {
        let mut cfg = test_config();
        cfg.news.mode = NewsMode::AlwaysOff;
        let (mut ctl, mut rx, news) = build(cfg);
        ctl.bootstrap(at(23, 59, 58));
        drain(&mut rx);

        // Even midnight, the busiest rollover, fetches nothing.
        ctl.handle_second(
            NaiveDate::from_ymd_opt(2025, 8, 13).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        );
        settle().await;
        assert_eq!(news.count(), 0);

        // Explicit user selection still works.
        ctl.handle_action(UserAction::SelectNewsSource(NewsSourceId::Bbc));
        settle().await;
        assert_eq!(news.count(), 1);
    }

    #[tokio::test]
    async fn ticker_hides_when_the_countdown_expires() {
        let mut cfg = test_config();
        cfg.news.show_secs = 2;
        let (mut ctl, mut rx, _news) = build(cfg);
        ctl.bootstrap(at(12, 30, 0));
        ctl.handle_outcome(
            FetchOutcome::News { source: NewsSourceId::Bbc, result: Ok("T1 | ".into()) },
            at(12, 30, 10),
        );
        drain(&mut rx);

        ctl.handle_second(at(12, 30, 11));
        assert!(drain(&mut rx).iter().all(|p| p.group() != Group::News));

        ctl.handle_second(at(12, 30, 12));
        let patches = drain(&mut rx);
        assert!(patches.contains(&Patch::News(NewsPatch::Hide)));
    }

    #[tokio::test]
    async fn location_change_updates_header_and_resets_diffs() {
        let (mut ctl, mut rx, _news) = build(test_config());
        ctl.bootstrap(at(12, 0, 0));
        ctl.handle_outcome(weather_ok(0), at(12, 0, 5));
        drain(&mut rx);

        ctl.handle_action(UserAction::SelectLocation(1));
        let patches = drain(&mut rx);
        let header = patches.iter().find_map(|p| match p {
            Patch::Header(h) => Some(h.clone()),
            _ => None,
        });
        assert_eq!(header.expect("header emitted").location, "London");
        assert_eq!(ctl.snapshot.location_index, 1);

        // Identical data for the new location is re-emitted in full.
        ctl.handle_outcome(weather_ok(1), at(12, 0, 20));
        let patches = drain(&mut rx);
        assert!(patches.iter().any(|p| matches!(p, Patch::CurrentConditions(_))));
    }

    #[tokio::test]
    async fn settings_editor_close_requests_a_restart() {
        let (mut ctl, mut rx, _news) = build(test_config());
        ctl.bootstrap(at(12, 0, 0));
        ctl.handle_outcome(
            FetchOutcome::News { source: NewsSourceId::Rtve, result: Ok("T1 | ".into()) },
            at(12, 0, 5),
        );
        drain(&mut rx);

        ctl.handle_action(UserAction::OpenSettings);
        assert!(ctl.session.is_some());

        ctl.handle_second(at(12, 0, 6));
        match ctl.exit.take() {
            Some(Exit::Restart(cont)) => {
                assert_eq!(cont.location_index, 0);
                assert_eq!(cont.news_remaining, 300);
                // Alternation already moved past the fetched source.
                assert_eq!(cont.news_source, NewsSourceId::Bbc);
            }
            other => panic!("unexpected exit {other:?}"),
        }
    }

    #[tokio::test]
    async fn quit_action_sets_the_exit() {
        let (mut ctl, _rx, _news) = build(test_config());
        ctl.handle_action(UserAction::Quit);
        assert_eq!(ctl.exit, Some(Exit::Quit));
    }
}
