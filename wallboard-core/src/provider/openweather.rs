use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::Config;
use crate::error::FetchError;

use super::{WeatherProvider, WeatherReport};

const ONECALL_URL: &str = "https://api.openweathermap.org/data/2.5/onecall";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    http: Client,
    api_key: String,
    units: String,
    lang: String,
}

impl OpenWeatherProvider {
    pub fn new(cfg: &Config) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.intervals.fetch_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            units: cfg.units.as_str().to_string(),
            lang: cfg.lang.clone(),
        })
    }

    fn url(&self, query: &str) -> String {
        format!(
            "{ONECALL_URL}?{query}&units={}&lang={}&exclude=minutely&appid={}",
            self.units, self.lang, self.api_key
        )
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, query: &str) -> Result<WeatherReport, FetchError> {
        let res = self.http.get(self.url(query)).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Http { status: status.as_u16(), body: truncate_body(&body) });
        }

        let report: WeatherReport =
            serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        Ok(report)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
