//! Line-oriented renderer.
//!
//! Prints each patch as one labelled line; a graphical front end would
//! consume the same channel and update widgets instead.

use tokio::sync::mpsc;
use wallboard_core::{NewsPatch, Patch};

pub async fn run(mut patches: mpsc::UnboundedReceiver<Vec<Patch>>) {
    while let Some(batch) = patches.recv().await {
        for patch in batch {
            print_patch(&patch);
        }
    }
}

fn print_patch(patch: &Patch) {
    match patch {
        Patch::Background { bkg } => println!("background  {bkg}"),
        Patch::Header(h) => {
            println!("header      {}, {} {} - {} ({})", h.weekday, h.day, h.month, h.location, h.source);
        }
        Patch::Moon { phase } => println!("moon        {phase}"),
        Patch::SunSign { sign } => println!("sun sign    {sign}"),
        Patch::Separator { on } => {
            if *on {
                println!("clock       :");
            }
        }
        Patch::Time { hour, minute } => println!("time        {hour}:{minute}"),
        Patch::CurrentConditions(c) => {
            println!(
                "current     {}º (feels {}) {} | wind {} {} | {} | hum {}% | uv {} | at {}",
                c.temp, c.feels_like, c.condition, c.wind_speed, c.wind_dir, c.pressure,
                c.humidity, c.uv, c.updated
            );
        }
        Patch::Alert { text } => match text {
            Some(alert) => println!("alert       {alert}"),
            None => println!("alert       -"),
        },
        Patch::DailyForecast { slots } => {
            for (i, slot) in slots {
                println!(
                    "daily[{i}]    {} icon {} rain {} {} / {}",
                    slot.day, slot.icon, slot.rain, slot.temp_max, slot.temp_min
                );
            }
        }
        Patch::HourlyForecast { slots } => {
            for (i, slot) in slots {
                println!("hourly[{i:02}]  {} {} icon {}", slot.time, slot.temp, slot.icon);
            }
        }
        Patch::News(NewsPatch::Show { head, titles }) => println!("news        {head}{titles}"),
        Patch::News(NewsPatch::Hide) => println!("news        (hidden)"),
        Patch::ClockOnlyToggle { enabled } => {
            println!("clock-only  {}", if *enabled { "on" } else { "off" });
        }
    }
}
