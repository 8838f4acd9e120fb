//! Binary crate for the `wallboard` display.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and the restart contract
//! - Wiring the controller to stdin commands and the line renderer
//! - Relaunching itself after the settings editor closes

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wallboard_core::provider::openweather::OpenWeatherProvider;
use wallboard_core::{
    Config, Continuation, Controller, Exit, NewsClient, NewsSource, UserAction, WeatherProvider,
};

mod cli;
mod render;
mod settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Cli::parse();
    let options = args.start_options()?;

    let cfg = Arc::new(Config::load(args.config.as_deref())?);

    let provider: Arc<dyn WeatherProvider> = Arc::new(OpenWeatherProvider::new(&cfg)?);
    let news: Arc<dyn NewsSource> = Arc::new(NewsClient::new(&cfg)?);
    let editor = Box::new(settings::ProcessEditor::new(cfg.settings_editor.clone()));

    let (patch_tx, patch_rx) = mpsc::unbounded_channel();
    let renderer = tokio::spawn(render::run(patch_rx));

    let (controller, actions) = Controller::new(cfg.clone(), options, provider, news, editor, patch_tx);
    let input = tokio::spawn(read_actions(actions, cfg.locations.len()));

    let exit = controller.run().await;

    input.abort();
    // The controller dropped the patch sender; the renderer drains and ends.
    let _ = renderer.await;

    match exit {
        Exit::Quit => Ok(()),
        Exit::Restart(cont) => respawn(&args, cont),
    }
}

/// Read one-character commands from stdin, one per line.
async fn read_actions(actions: mpsc::Sender<UserAction>, location_count: usize) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let Some(token) = line.trim().chars().next() else {
            continue;
        };

        if token.eq_ignore_ascii_case(&'h') {
            print_help(location_count);
        }

        if let Some(action) = UserAction::parse(token, location_count) {
            if actions.send(action).await.is_err() {
                break;
            }
        }
    }
}

fn print_help(location_count: usize) {
    eprintln!("commands:");
    eprintln!("  1..{location_count}  select location");
    eprintln!("  a / b   fetch rtve / BBC headlines");
    eprintln!("  c       toggle clock-only view");
    eprintln!("  s       open the settings editor (restarts on close)");
    eprintln!("  h       this help");
    eprintln!("  q       quit");
}

/// Relaunch with the continuation flags and let this instance exit.
fn respawn(args: &cli::Cli, cont: Continuation) -> anyhow::Result<()> {
    let exe = std::env::current_exe().context("locating current executable")?;

    let mut cmd = std::process::Command::new(exe);
    if let Some((x, y)) = cont.window_pos {
        cmd.arg("-x").arg(x.to_string()).arg("-y").arg(y.to_string());
    }
    cmd.arg("-l").arg(cont.location_index.to_string());
    cmd.arg("-n").arg(cont.news_remaining.to_string());
    cmd.arg("-s").arg(cont.news_source.as_str());
    if let Some(path) = &args.config {
        cmd.arg("--config").arg(path);
    }

    info!("relaunching with updated configuration");
    cmd.spawn().context("relaunching after settings change")?;
    Ok(())
}
