//! External settings editor.
//!
//! The configured command is split on whitespace and spawned directly,
//! no shell involved. The controller polls the session once per second
//! and restarts the whole program when the editor exits.

use std::process::{Child, Command};

use anyhow::{Context, bail};
use tracing::warn;
use wallboard_core::editor::{SettingsEditor, SettingsSession};

pub struct ProcessEditor {
    command: Option<String>,
}

impl ProcessEditor {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

impl SettingsEditor for ProcessEditor {
    fn open(&mut self) -> anyhow::Result<Box<dyn SettingsSession>> {
        let Some(command) = self.command.as_deref() else {
            bail!("no settings editor configured; set `settings_editor` in the config file");
        };

        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            bail!("`settings_editor` command is empty");
        };

        let child = Command::new(program)
            .args(parts)
            .spawn()
            .with_context(|| format!("launching settings editor `{program}`"))?;

        Ok(Box::new(ProcessSession { child }))
    }
}

struct ProcessSession {
    child: Child,
}

impl SettingsSession for ProcessSession {
    fn is_finished(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(_)) => true,
            Ok(None) => false,
            Err(e) => {
                warn!("settings editor poll failed: {e}");
                true
            }
        }
    }
}
