//! Shared domain model: the display [`Snapshot`] and the value types
//! exchanged with the embedding process (user actions, startup and
//! restart parameters).

use crate::news::NewsSourceId;

/// Number of daily forecast slots (including the current day).
pub const DAILY_SLOTS: usize = 4;

/// Number of hourly forecast slots.
pub const HOURLY_SLOTS: usize = 19;

/// Background code shown when no weather background applies.
pub const DEFAULT_BKG: &str = "99";

/// Icon code shown before the first successful fetch.
pub const DEFAULT_ICON: &str = "na";

pub const DEGREE_SIGN: &str = "º";

/// Calendar header line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    pub weekday: String,
    pub day: String,
    pub month: String,
    /// Attribution of the weather source.
    pub source: String,
    pub location: String,
}

/// Large clock digits plus the blinking separator state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClockFields {
    pub hour: String,
    pub minute: String,
    pub sep_on: bool,
}

/// Astronomical context: moon, zodiac, and the day/night boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct AstroFields {
    /// Moon phase name, e.g. "Waxing Gibbous".
    pub moon: String,
    pub sun_sign: String,
    /// Local "HH:MM" strings derived from the provider's timezone offset.
    pub sunrise: String,
    pub sunset: String,
    pub night: bool,
}

impl Default for AstroFields {
    fn default() -> Self {
        Self {
            moon: String::new(),
            sun_sign: String::new(),
            // Safe defaults until the first payload arrives.
            sunrise: "07:00".to_string(),
            sunset: "20:00".to_string(),
            night: false,
        }
    }
}

/// Current observed conditions, display-ready.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentFields {
    /// Whole-degree temperature without unit suffix.
    pub temp: String,
    /// Feels-like temperature including the degree sign.
    pub feels_like: String,
    pub icon: String,
    /// Weather-derived background code; the snapshot-level `bkg` field
    /// is what the renderer sees and may be the clock-only default.
    pub bkg: String,
    pub condition: String,
    pub wind_speed: String,
    pub wind_dir: String,
    pub pressure: String,
    pub humidity: String,
    pub uv: String,
    /// "HH:MM" of the last applied observation.
    pub updated: String,
}

impl Default for CurrentFields {
    fn default() -> Self {
        Self {
            temp: String::new(),
            feels_like: String::new(),
            icon: DEFAULT_ICON.to_string(),
            bkg: DEFAULT_BKG.to_string(),
            condition: String::new(),
            wind_speed: String::new(),
            wind_dir: String::new(),
            pressure: String::new(),
            humidity: String::new(),
            uv: String::new(),
            updated: String::new(),
        }
    }
}

/// Rain-probability emphasis for a daily slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RainLevel {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySlot {
    /// "Monday, 07" style label.
    pub day: String,
    pub icon: String,
    /// Rain probability in percent, rounded to multiples of five.
    pub rain: String,
    pub rain_level: RainLevel,
    pub temp_max: String,
    pub temp_min: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlySlot {
    pub time: String,
    pub temp: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsFields {
    /// "source HH:MM | " prefix shown before the headlines.
    pub head: String,
    pub titles: String,
    pub showing: bool,
}

/// The complete set of derived display values at a point in time.
///
/// Mutated only on the controller's single event-processing path; the
/// forecast arrays have fixed lengths and their slots are addressed by
/// stable index across updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Effective background code (weather-derived or clock-only default).
    pub bkg: String,
    pub header: HeaderFields,
    pub clock: ClockFields,
    pub astro: AstroFields,
    pub current: CurrentFields,
    pub alert: Option<String>,
    pub daily: [DailySlot; DAILY_SLOTS],
    pub hourly: [HourlySlot; HOURLY_SLOTS],
    pub news: NewsFields,
    pub clock_only: bool,
    pub location_index: usize,
}

impl Snapshot {
    pub fn new(location_index: usize) -> Self {
        Self {
            bkg: DEFAULT_BKG.to_string(),
            location_index,
            ..Self::default()
        }
    }
}

/// Single-token user commands accepted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    /// Zero-based index into the configured location list.
    SelectLocation(usize),
    SelectNewsSource(NewsSourceId),
    ToggleClockOnly,
    OpenSettings,
    ToggleHelp,
    Quit,
}

impl UserAction {
    /// Parse a one-character command token. Unknown tokens and
    /// out-of-range digits yield None and are ignored upstream.
    pub fn parse(token: char, location_count: usize) -> Option<Self> {
        match token.to_ascii_uppercase() {
            'A' => Some(UserAction::SelectNewsSource(NewsSourceId::Rtve)),
            'B' => Some(UserAction::SelectNewsSource(NewsSourceId::Bbc)),
            'C' => Some(UserAction::ToggleClockOnly),
            'S' => Some(UserAction::OpenSettings),
            'H' => Some(UserAction::ToggleHelp),
            'Q' => Some(UserAction::Quit),
            d @ '1'..='9' => {
                let index = d as usize - '1' as usize;
                (index < location_count).then_some(UserAction::SelectLocation(index))
            }
            _ => None,
        }
    }
}

/// State carried across a settings-editor restart so the relaunched
/// instance resumes where this one left off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    pub window_pos: Option<(i32, i32)>,
    pub location_index: usize,
    /// Seconds of news-ticker display remaining.
    pub news_remaining: u64,
    pub news_source: NewsSourceId,
}

/// Startup parameters; every field is independently defaultable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOptions {
    pub window_pos: Option<(i32, i32)>,
    pub location_index: usize,
    pub news_remaining: u64,
    pub news_source: Option<NewsSourceId>,
    pub show_help: bool,
}
