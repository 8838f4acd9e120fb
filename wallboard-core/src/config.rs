use std::{fs, path::Path, path::PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One configured weather location: display name plus the coordinate
/// query fragment passed verbatim to the provider ("lat=..&lon=..").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub query: String,
}

/// Measurement system for temperatures, wind, and pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    /// Provider wind speeds arrive in m/s; scale to km/h or mph.
    pub fn wind_scale(&self) -> f64 {
        match self {
            Units::Metric => 3.6,
            Units::Imperial => 1.0,
        }
    }

    pub fn wind_unit(&self) -> &'static str {
        match self {
            Units::Metric => "km/h",
            Units::Imperial => "mph",
        }
    }

    /// Provider pressure arrives in hPa; scale to mb or inHg.
    pub fn pressure_scale(&self) -> f64 {
        match self {
            Units::Metric => 1.0,
            Units::Imperial => 29.529_980_164_712 / 1000.0,
        }
    }

    pub fn pressure_unit(&self) -> &'static str {
        match self {
            Units::Metric => " mb",
            Units::Imperial => " \"Hg",
        }
    }

    /// High-wind alert threshold in display units.
    pub fn wind_high(&self) -> f64 {
        match self {
            Units::Metric => 60.0,
            Units::Imperial => 37.5,
        }
    }

    /// "Hot clear" temperature threshold in display units.
    pub fn temp_high(&self) -> f64 {
        match self {
            Units::Metric => 35.0,
            Units::Imperial => 95.0,
        }
    }

    /// "Cold clear" temperature threshold in display units.
    pub fn temp_low(&self) -> f64 {
        match self {
            Units::Metric => 4.0,
            Units::Imperial => 39.2,
        }
    }
}

/// When the news ticker refreshes on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsMode {
    AlwaysOn,
    #[default]
    Period,
    AlwaysOff,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub mode: NewsMode,

    /// Toggle between the two sources after each completed fetch cycle.
    pub alternate_sources: bool,

    /// Wall-clock minute multiple for `NewsMode::Period`.
    pub period_minutes: u32,

    /// How long the ticker stays up after the latest arrival, in seconds.
    pub show_secs: u64,

    /// Number of headlines gathered per fetch.
    pub count: usize,

    /// Separator inserted between headlines.
    pub separator: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            mode: NewsMode::Period,
            alternate_sources: true,
            period_minutes: 15,
            show_secs: 5 * 60,
            count: 5,
            separator: "  ///  ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Intervals {
    /// Weather poll period in minutes. Mind the provider's query limits.
    pub weather_minutes: u64,

    /// Per-request network timeout in seconds.
    pub fetch_timeout_secs: u64,

    /// Consecutive weather failures tolerated before clock-only fallback.
    pub err_max: u32,
}

impl Default for Intervals {
    fn default() -> Self {
        Self { weather_minutes: 15, fetch_timeout_secs: 20, err_max: 8 }
    }
}

/// Top-level configuration, read once at startup and immutable afterwards.
/// Changing it requires the settings-editor restart path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeatherMap API key.
    pub api_key: String,

    /// Ordered location list; digit commands 1..N select by position.
    pub locations: Vec<Location>,

    #[serde(default)]
    pub units: Units,

    /// Feed/provider language code, e.g. "en" or "es".
    #[serde(default = "default_lang")]
    pub lang: String,

    #[serde(default)]
    pub news: NewsConfig,

    #[serde(default)]
    pub intervals: Intervals,

    /// Command line launching the external settings editor, if any.
    #[serde(default)]
    pub settings_editor: Option<String>,
}

fn default_lang() -> String {
    "en".to_string()
}

impl Config {
    /// Load configuration from `path`, or from the platform config
    /// directory when no path is given. Missing or invalid configuration
    /// is fatal.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_file_path()?,
        };

        let contents = fs::read_to_string(&path)
            .map_err(|source| ConfigError::Io { path: path.clone(), source })?;

        let cfg: Config =
            toml::from_str(&contents).map_err(|source| ConfigError::Toml { path, source })?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let dirs =
            ProjectDirs::from("dev", "wallboard", "wallboard").ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("api_key must not be empty".into()));
        }
        if self.locations.is_empty() {
            return Err(ConfigError::Invalid("at least one location is required".into()));
        }
        if self.locations.len() > 9 {
            return Err(ConfigError::Invalid(
                "at most 9 locations are supported (selected by digit keys)".into(),
            ));
        }
        if self.news.period_minutes == 0 {
            return Err(ConfigError::Invalid("news.period_minutes must be at least 1".into()));
        }
        if self.intervals.weather_minutes == 0 {
            return Err(ConfigError::Invalid("intervals.weather_minutes must be at least 1".into()));
        }
        Ok(())
    }

    /// Location at `index`, clamped to the configured list.
    pub fn location(&self, index: usize) -> &Location {
        &self.locations[index.min(self.locations.len() - 1)]
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        api_key: "KEY".to_string(),
        locations: vec![
            Location { name: "Madrid".into(), query: "lat=40.41&lon=-3.70".into() },
            Location { name: "London".into(), query: "lat=51.50&lon=-0.12".into() },
        ],
        units: Units::Metric,
        lang: "en".to_string(),
        news: NewsConfig::default(),
        intervals: Intervals::default(),
        settings_editor: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_toml() {
        let cfg: Config = toml::from_str(
            r#"
            api_key = "abc"

            [[locations]]
            name = "Madrid"
            query = "lat=40.41&lon=-3.70"
            "#,
        )
        .expect("minimal config must parse");

        assert_eq!(cfg.units, Units::Metric);
        assert_eq!(cfg.lang, "en");
        assert_eq!(cfg.intervals.weather_minutes, 15);
        assert_eq!(cfg.intervals.err_max, 8);
        assert_eq!(cfg.news.mode, NewsMode::Period);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_locations_are_fatal() {
        let mut cfg = test_config();
        cfg.locations.clear();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("at least one location"));
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let mut cfg = test_config();
        cfg.api_key = " ".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_news_period_is_fatal() {
        let mut cfg = test_config();
        cfg.news.period_minutes = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unit_scales() {
        assert_eq!(Units::Metric.wind_scale(), 3.6);
        assert_eq!(Units::Imperial.wind_scale(), 1.0);
        assert_eq!(Units::Metric.wind_high(), 60.0);
        assert_eq!(Units::Imperial.temp_high(), 95.0);
    }

    #[test]
    fn location_index_is_clamped() {
        let cfg = test_config();
        assert_eq!(cfg.location(0).name, "Madrid");
        assert_eq!(cfg.location(17).name, "London");
    }
}
