//! Settings-editor seam.
//!
//! Opening the settings hands off to an external editor process; the
//! controller only needs to know when the session ends so it can reload
//! the configuration. The traits keep the controller testable without
//! spawning processes.

/// A running editor session. Polled once per second by the controller.
pub trait SettingsSession: Send {
    /// True once the editor has exited (success or not).
    fn is_finished(&mut self) -> bool;
}

/// Launches editor sessions.
pub trait SettingsEditor: Send {
    fn open(&mut self) -> anyhow::Result<Box<dyn SettingsSession>>;
}
