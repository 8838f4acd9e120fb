use std::path::PathBuf;

use clap::Parser;
use wallboard_core::{NewsSourceId, StartOptions};

/// Top-level CLI struct.
///
/// The short flags double as the restart contract: a relaunch after the
/// settings editor closes passes `-x -y -l -n -s` so the new instance
/// resumes where the old one stopped.
#[derive(Debug, Parser)]
#[command(name = "wallboard", version, about = "Always-on weather and news wallboard")]
pub struct Cli {
    /// Window x position, restored across restarts.
    #[arg(short = 'x', allow_hyphen_values = true)]
    pub pos_x: Option<i32>,

    /// Window y position, restored across restarts.
    #[arg(short = 'y', allow_hyphen_values = true)]
    pub pos_y: Option<i32>,

    /// Zero-based index of the starting location.
    #[arg(short = 'l', default_value_t = 0)]
    pub location: usize,

    /// Seconds of news-ticker display to resume.
    #[arg(short = 'n', default_value_t = 0)]
    pub news_remaining: u64,

    /// Starting news source: "rtve" or "bbc".
    #[arg(short = 's')]
    pub news_source: Option<String>,

    /// Start with the help overlay visible.
    #[arg(long)]
    pub show_help: bool,

    /// Path to the configuration file (default: platform config dir).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn start_options(&self) -> anyhow::Result<StartOptions> {
        let news_source =
            self.news_source.as_deref().map(NewsSourceId::try_from).transpose()?;

        let window_pos = match (self.pos_x, self.pos_y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        };

        Ok(StartOptions {
            window_pos,
            location_index: self.location,
            news_remaining: self.news_remaining,
            news_source,
            show_help: self.show_help,
        })
    }
}
