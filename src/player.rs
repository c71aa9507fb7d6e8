use std::process::{Child, Command, Stdio};

use tracing::{debug, info};

use crate::error::{Error, Result};

/// External media player, launched with the selected movie's URL.
pub struct Player {
    command: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl Player {
    pub fn new(command: String, args: Vec<String>) -> Self {
        Self {
            command,
            args,
            child: None,
        }
    }

    /// Spawn the player on `url`. Output is nulled so it cannot pollute the
    /// TUI.
    pub fn play(&mut self, url: &str) -> Result<()> {
        let mut cmd = Command::new(&self.command);
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        for arg in &self.args {
            cmd.arg(arg);
        }
        cmd.arg(url);

        info!(command = %self.command, url, "Launching player");

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::PlayerNotFound(self.command.clone())
            } else {
                Error::PlayerLaunch(e.to_string())
            }
        })?;

        self.child = Some(child);
        Ok(())
    }

    /// Check if the player is still running.
    pub fn is_running(&mut self) -> bool {
        if let Some(ref mut child) = self.child {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(?status, "Player exited");
                    self.child = None;
                    false
                }
                Ok(None) => true,
                Err(_) => false,
            }
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_maps_to_player_not_found() {
        let mut player = Player::new("kino-no-such-player".to_string(), Vec::new());
        match player.play("http://example.com/stream") {
            Err(Error::PlayerNotFound(name)) => assert_eq!(name, "kino-no-such-player"),
            other => panic!("expected PlayerNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_not_running_without_launch() {
        let mut player = Player::new("mpv".to_string(), Vec::new());
        assert!(!player.is_running());
    }
}
