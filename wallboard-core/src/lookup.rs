//! Pure lookup and conversion helpers: provider condition codes to icon
//! codes, day/night variants, moon phase, sun sign and wind direction.
//!
//! Icon codes are the short numeric names of the bundled icon sets; "na"
//! is the catch-all for anything a provider invents that we don't know.

use chrono::{Datelike, NaiveDateTime};

/// Map an OpenWeatherMap condition id to an icon code.
///
/// See <https://openweathermap.org/weather-conditions#Weather-Condition-Codes-2>
pub fn weather_icon(code: u32) -> &'static str {
    match code {
        200..=212 | 230..=232 => "0",
        221 => "37",
        300 => "13",
        301 => "14",
        302 => "16",
        310 => "7",
        311 => "6",
        312 => "5",
        313 | 314 | 321 => "41",
        500 => "9",
        501 => "11",
        502 | 503 => "12",
        504 => "40",
        511 => "10",
        520..=522 | 531 => "39",
        600 => "13",
        601 => "14",
        602 => "16",
        611 => "18",
        612 => "8",
        613 => "10",
        615 => "6",
        616 => "5",
        620..=622 => "41",
        701 | 741 => "20",
        711 | 761 => "21",
        721 | 762 => "22",
        731 | 751 => "19",
        771 | 781 => "23",
        800 => "32",
        801 => "34",
        802 => "30",
        803 => "28",
        804 => "26",
        _ => "na",
    }
}

/// Night-time variant of a day icon; identity for icons without one.
pub fn night_icon(icon: &str) -> String {
    match icon {
        "28" => "27",
        "30" => "29",
        "32" => "33",
        "34" => "31",
        "36" => "33",
        "37" | "38" => "47",
        "39" => "45",
        "41" => "46",
        other => other,
    }
    .to_string()
}

/// Night-time background for a provider icon prefix ("01".."50").
pub fn night_background(prefix: &str) -> String {
    match prefix {
        "01" => "31",
        "02" => "33",
        "03" => "29",
        "04" => "27",
        "09" => "2",
        "10" => "45",
        "11" => "0",
        "13" => "46",
        "50" => "20",
        other => other,
    }
    .to_string()
}

/// Lunation fraction for a point in time, 0 = new moon.
///
/// Cf. <http://en.wikipedia.org/wiki/Lunar_phase#Lunar_phase_calculation>
pub fn moon_position(now: NaiveDateTime) -> f64 {
    let epoch = chrono::NaiveDate::from_ymd_opt(2001, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let diff = now - epoch;
    let days = diff.num_days() as f64 + (diff.num_seconds() % 86_400) as f64 / 86_400.0;
    let lunations = 0.204_397_31 + days * 0.033_863_192_69;
    lunations.rem_euclid(1.0)
}

/// Moon phase name from the provider's phase fraction (0 and 1 are new).
pub fn moon_phase_name(phase: f64) -> &'static str {
    if phase <= 0.0 {
        "New"
    } else if phase < 0.125 {
        "New Waxing"
    } else if phase < 0.25 {
        "Waxing Crescent"
    } else if phase == 0.25 {
        "First Quarter"
    } else if phase < 0.5 {
        "Waxing Gibbous"
    } else if phase == 0.5 {
        "Full"
    } else if phase < 0.75 {
        "Waning Gibbous"
    } else if phase == 0.75 {
        "Last Quarter"
    } else if phase <= 0.875 {
        "Waning Crescent"
    } else {
        "New Waning"
    }
}

/// Zodiac constellation for a date.
pub fn sun_sign(now: NaiveDateTime) -> &'static str {
    const BOUNDS: [u32; 13] = [
        119, 218, 320, 419, 520, 620, 722, 822, 922, 1022, 1121, 1221, 1231,
    ];
    const NAMES: [&str; 13] = [
        "Capricorn",
        "Aquarius",
        "Pisces",
        "Aries",
        "Taurus",
        "Gemini",
        "Cancer",
        "Leo",
        "Virgo",
        "Libra",
        "Scorpius",
        "Sagittarius",
        "Capricorn",
    ];

    let mdd = now.month() * 100 + now.day();
    for (bound, name) in BOUNDS.iter().zip(NAMES.iter()) {
        if mdd <= *bound {
            return name;
        }
    }
    "Capricorn"
}

/// Compass point for a wind bearing in degrees.
pub fn wind_direction(degrees: f64) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let index = ((degrees / 22.5) + 0.5) as usize;
    POINTS[index % 16]
}

/// Human label for a UV index value.
pub fn uv_label(uvi: f64) -> &'static str {
    match uvi as u32 {
        0..=2 => "Low",
        3..=5 => "Moderate",
        6..=7 => "High",
        8..=10 => "Very High",
        _ => "Extreme",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn clear_sky_maps_to_sunny_icon() {
        assert_eq!(weather_icon(800), "32");
        assert_eq!(weather_icon(804), "26");
        assert_eq!(weather_icon(999), "na");
    }

    #[test]
    fn night_variant_substituted_where_one_exists() {
        assert_eq!(night_icon("32"), "33");
        assert_eq!(night_icon("28"), "27");
        // no night variant: identity
        assert_eq!(night_icon("26"), "26");
    }

    #[test]
    fn moon_phase_boundaries() {
        assert_eq!(moon_phase_name(0.0), "New");
        assert_eq!(moon_phase_name(0.25), "First Quarter");
        assert_eq!(moon_phase_name(0.5), "Full");
        assert_eq!(moon_phase_name(0.75), "Last Quarter");
        assert_eq!(moon_phase_name(0.9), "New Waning");
    }

    #[test]
    fn moon_position_is_a_fraction() {
        let pos = moon_position(at(2026, 8, 27));
        assert!((0.0..1.0).contains(&pos));
    }

    #[test]
    fn sun_sign_by_date() {
        assert_eq!(sun_sign(at(2026, 1, 10)), "Capricorn");
        assert_eq!(sun_sign(at(2026, 8, 27)), "Virgo");
        assert_eq!(sun_sign(at(2026, 12, 25)), "Capricorn");
    }

    #[test]
    fn wind_direction_quadrants() {
        assert_eq!(wind_direction(0.0), "N");
        assert_eq!(wind_direction(90.0), "E");
        assert_eq!(wind_direction(180.0), "S");
        assert_eq!(wind_direction(270.0), "W");
        assert_eq!(wind_direction(359.0), "N");
    }

    #[test]
    fn uv_labels() {
        assert_eq!(uv_label(1.0), "Low");
        assert_eq!(uv_label(8.0), "Very High");
        assert_eq!(uv_label(11.5), "Extreme");
    }
}
