//! Core library for the `wallboard` display.
//!
//! This crate defines:
//! - Configuration handling
//! - Abstraction over the weather provider and the news feeds
//! - The display snapshot, diff engine, and patch types
//! - The update orchestrator driving timers, fetches, and user actions
//!
//! It is used by `wallboard-app`, but can also be embedded by other
//! front ends: feed it user actions, render the patches it emits.

pub mod config;
pub mod controller;
pub mod editor;
pub mod error;
pub mod lookup;
pub mod model;
pub mod news;
pub mod patch;
pub mod provider;
pub mod snapshot;
pub mod state;
pub mod worker;

pub use config::{Config, NewsMode, Units};
pub use controller::{Controller, Exit};
pub use error::{ConfigError, FetchError};
pub use model::{Continuation, Snapshot, StartOptions, UserAction};
pub use news::{NewsClient, NewsSource, NewsSourceId};
pub use patch::{DiffEngine, Group, NewsPatch, Patch};
pub use provider::{WeatherProvider, WeatherReport};
