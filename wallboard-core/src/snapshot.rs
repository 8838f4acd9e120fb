//! Snapshot builder: turns a parsed weather payload into display fields.
//!
//! All derivation lives here so the controller only moves data around:
//! unit scaling, day/night icon selection, the hot/cold clear-sky
//! overrides, alert priority, and the fixed-length forecast arrays.

use chrono::{DateTime, NaiveDateTime};

use crate::config::Config;
use crate::lookup;
use crate::model::{DAILY_SLOTS, DEGREE_SIGN, HOURLY_SLOTS, RainLevel, Snapshot};
use crate::provider::WeatherReport;

/// Forecast UV index at or above this raises the high-UV alert.
const UV_HIGH: f64 = 8.0;

/// Rain-probability emphasis thresholds, in percent.
const RAIN_HIGH: i64 = 50;
const RAIN_MEDIUM: i64 = 20;

/// Apply a weather report to the snapshot. `now` is the local wall-clock
/// time at the moment of application; re-applying a cached report with a
/// later `now` re-derives every day/night-dependent field, which is how
/// the sunrise/sunset and midnight re-checks work.
pub fn apply_weather(snapshot: &mut Snapshot, report: &WeatherReport, now: NaiveDateTime, cfg: &Config) {
    let off = report.timezone_offset;
    let cc = &report.current;

    let sunrise = local_hm(cc.sunrise, off);
    let sunset = local_hm(cc.sunset, off);
    let hm = now.format("%H:%M").to_string();
    // Zero-padded "HH:MM" strings order the same way the times do.
    let night = sunset <= hm || sunrise > hm;

    let cond = cc.weather.first();
    let cond_id = cond.map_or(900, |c| c.id);
    let cond_icon = cond.map_or("", |c| c.icon.as_str());
    let description = cond.map_or_else(|| "Unknown".to_string(), |c| capitalize(&c.description));

    let mut icon = lookup::weather_icon(cond_id).to_string();
    let mut bkg = icon.clone();
    if night {
        // Provider icon "01n" -> background key "01".
        let prefix = &cond_icon[..cond_icon.len().saturating_sub(1)];
        bkg = lookup::night_background(prefix);
    } else if icon == "32" {
        // Clear sky: pick the hot or cold variant outside the comfort band.
        if cc.temp >= cfg.units.temp_high() {
            icon = "36".to_string();
            bkg = "36".to_string();
        } else if cc.temp <= cfg.units.temp_low() {
            bkg = "25".to_string();
        }
    }

    let current = &mut snapshot.current;
    current.temp = format!("{}", cc.temp.trunc() as i64);
    current.feels_like = format!("{}{DEGREE_SIGN}", cc.feels_like.trunc() as i64);
    current.icon = if night { lookup::night_icon(&icon) } else { icon };
    current.bkg = bkg;
    current.condition = description;
    current.wind_speed = format!("{:.0}", cc.wind_speed * cfg.units.wind_scale());
    current.wind_dir = lookup::wind_direction(cc.wind_deg).to_string();
    current.pressure =
        format!("{:.2}{}", cc.pressure * cfg.units.pressure_scale(), cfg.units.pressure_unit());
    current.humidity = format!("{}", cc.humidity);
    current.uv = lookup::uv_label(cc.uvi).to_string();
    current.updated = hm;

    snapshot.astro.sunrise = sunrise;
    snapshot.astro.sunset = sunset;
    snapshot.astro.night = night;
    snapshot.astro.sun_sign = lookup::sun_sign(now).to_string();
    snapshot.astro.moon = report
        .daily
        .first()
        .map_or_else(
            || lookup::moon_phase_name(lookup::moon_position(now)),
            |d| lookup::moon_phase_name(d.moon_phase),
        )
        .to_string();

    snapshot.alert = derive_alert(report, cfg);

    fill_daily(snapshot, report, now, cfg);
    fill_hourly(snapshot, report, cfg);
}

/// Highest-priority active alert, or None.
///
/// Priority: provider alert whose window covers now, then forecast high
/// wind, then forecast high UV.
fn derive_alert(report: &WeatherReport, cfg: &Config) -> Option<String> {
    let off = report.timezone_offset;
    let cc = &report.current;

    if let Some(alert) = report.alerts.first() {
        if alert.end > cc.dt {
            return Some(format!(
                "{} - {}: {}",
                local_hm(alert.start, off),
                local_hm(alert.end, off),
                alert.event
            ));
        }
    }

    let ff = report.daily.first()?;

    let wind = ff.wind_speed * cfg.units.wind_scale();
    if wind >= cfg.units.wind_high() {
        return Some(format!("High wind - {:.0} {}", wind, cfg.units.wind_unit()));
    }

    if ff.uvi >= UV_HIGH {
        return Some(format!("High UV {} - {}", lookup::uv_label(ff.uvi), ff.uvi));
    }

    None
}

fn fill_daily(snapshot: &mut Snapshot, report: &WeatherReport, now: NaiveDateTime, _cfg: &Config) {
    let off = report.timezone_offset;
    let today = now.date();

    let mut slot = 0;
    for entry in &report.daily {
        if slot >= DAILY_SLOTS {
            break;
        }
        let local = local_dt(entry.dt, off);
        if local.date() < today {
            continue;
        }

        let rain = ((entry.pop * 100.0 / 5.0).round() as i64) * 5;
        let out = &mut snapshot.daily[slot];
        out.day = local.format("%A, %d").to_string();
        out.icon = lookup::weather_icon(entry.weather.first().map_or(900, |c| c.id)).to_string();
        out.rain = format!("{rain}%");
        out.rain_level = if rain >= RAIN_HIGH {
            RainLevel::High
        } else if rain >= RAIN_MEDIUM {
            RainLevel::Medium
        } else {
            RainLevel::Low
        };
        out.temp_max = format!("{}{DEGREE_SIGN}", entry.temp.max.trunc() as i64);
        out.temp_min = format!("{}{DEGREE_SIGN}", entry.temp.min.trunc() as i64);
        slot += 1;
    }
}

fn fill_hourly(snapshot: &mut Snapshot, report: &WeatherReport, _cfg: &Config) {
    let off = report.timezone_offset;
    let observed = report.current.dt;

    let mut slot = 0;
    for entry in &report.hourly {
        if slot >= HOURLY_SLOTS {
            break;
        }
        if entry.dt <= observed {
            continue;
        }

        let mut icon =
            lookup::weather_icon(entry.weather.first().map_or(900, |c| c.id)).to_string();
        // The provider flags night-time entries with a trailing 'n'.
        if entry.weather.first().is_some_and(|c| c.icon.ends_with('n')) {
            icon = lookup::night_icon(&icon);
        }

        let out = &mut snapshot.hourly[slot];
        out.time = local_hm(entry.dt, off);
        out.temp = format!("{}{DEGREE_SIGN}", entry.temp.trunc() as i64);
        out.icon = icon;
        slot += 1;
    }
}

fn local_dt(ts: i64, offset: i64) -> NaiveDateTime {
    DateTime::from_timestamp(ts + offset, 0).map(|d| d.naive_utc()).unwrap_or_default()
}

fn local_hm(ts: i64, offset: i64) -> String {
    local_dt(ts, offset).format("%H:%M").to_string()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
