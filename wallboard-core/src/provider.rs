//! Abstraction over weather data providers.
//!
//! The contract is structural: a provider either yields a parsed
//! [`WeatherReport`] or a [`FetchError`]; everything display-related is
//! derived later by the snapshot builder.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::FetchError;

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch the full report for a location query ("lat=..&lon=..").
    async fn fetch(&self, query: &str) -> Result<WeatherReport, FetchError>;
}

/// Parsed "one call" payload: current observation, daily and hourly
/// forecast entries, and optional provider alerts. Timestamps are unix
/// seconds; `timezone_offset` shifts them into the location's local time.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherReport {
    pub timezone_offset: i64,
    pub current: Observation,
    pub daily: Vec<DailyEntry>,
    pub hourly: Vec<HourlyEntry>,
    #[serde(default)]
    pub alerts: Vec<AlertEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Observation {
    pub dt: i64,
    pub sunrise: i64,
    pub sunset: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: f64,
    pub humidity: u8,
    pub uvi: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub weather: Vec<ConditionTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionTag {
    pub id: u32,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TempRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyEntry {
    pub dt: i64,
    pub temp: TempRange,
    /// Probability of precipitation, 0.0..=1.0.
    pub pop: f64,
    pub wind_speed: f64,
    pub uvi: f64,
    pub moon_phase: f64,
    pub weather: Vec<ConditionTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HourlyEntry {
    pub dt: i64,
    pub temp: f64,
    pub weather: Vec<ConditionTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertEntry {
    pub event: String,
    pub start: i64,
    pub end: i64,
}
