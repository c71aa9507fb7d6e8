use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// External scraper process, launched with the selected movie's URL and
/// expected to drop its result into a known output file.
pub struct Scraper {
    command: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl Scraper {
    pub fn new(command: String, args: Vec<String>) -> Self {
        Self {
            command,
            args,
            child: None,
        }
    }

    pub fn launch(&mut self, url: &str) -> Result<()> {
        let mut cmd = Command::new(&self.command);
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        for arg in &self.args {
            cmd.arg(arg);
        }
        cmd.arg(url);

        info!(command = %self.command, url, "Launching scraper");

        let child = cmd
            .spawn()
            .map_err(|e| Error::ScraperLaunch(e.to_string()))?;
        self.child = Some(child);
        Ok(())
    }

    /// Kill the child if it is still around. Used on timeout or user cancel.
    pub fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                debug!("Could not kill scraper: {}", e);
            }
            let _ = child.wait();
            warn!("Scraper cancelled");
        }
    }

    pub fn is_running(&mut self) -> bool {
        if let Some(ref mut child) = self.child {
            match child.try_wait() {
                Ok(Some(_)) => {
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

impl Drop for Scraper {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Pending,
    Ready(PathBuf),
    TimedOut,
}

/// Wait-for-output-file as a pure state machine: no sleeping, no
/// presentation. The driver calls `check` on its own tick until the file
/// shows up or the deadline passes.
#[derive(Debug)]
pub struct OutputPoll {
    path: PathBuf,
    deadline: Instant,
}

impl OutputPoll {
    pub fn new(path: PathBuf, timeout: Duration) -> Self {
        // stale output from a previous run must not satisfy this poll
        if path.exists() {
            let _ = std::fs::remove_file(&path);
        }

        Self {
            path,
            deadline: Instant::now() + timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn check(&self) -> PollOutcome {
        self.check_at(Instant::now())
    }

    fn check_at(&self, now: Instant) -> PollOutcome {
        if self.path.exists() {
            return PollOutcome::Ready(self.path.clone());
        }
        if now >= self.deadline {
            return PollOutcome::TimedOut;
        }
        PollOutcome::Pending
    }
}
