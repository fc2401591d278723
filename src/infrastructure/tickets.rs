//! Access ticket helpers
//!
//! Per-user access tickets are managed by two privileged helper scripts in
//! a configurable directory. Invocations are best-effort: exit codes and
//! output are logged, never interpreted, and a failure never aborts the
//! reconciliation pass.

use std::path::PathBuf;
use std::process::Command;
use tracing::{info, warn};

/// Script that establishes a user's access ticket
const REFRESH_SCRIPT: &str = "check_ticket.sh";

/// Script that revokes a user's access ticket
const REVOKE_SCRIPT: &str = "delete_ticket.sh";

/// Narrow view of the ticket helpers consumed by the reconciler
pub trait TicketManager {
    /// Re-establish `username`'s access ticket.
    fn refresh(&self, username: &str);

    /// Revoke `username`'s access ticket.
    fn revoke(&self, username: &str);
}

/// Ticket manager that shells out to the helper scripts with sudo
pub struct ScriptTicketManager {
    helper_dir: PathBuf,
    prefix: String,
}

impl ScriptTicketManager {
    pub fn new(helper_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            helper_dir: helper_dir.into(),
            prefix: prefix.into(),
        }
    }

    fn script_path(&self, script: &str) -> PathBuf {
        self.helper_dir.join(script)
    }

    fn run(&self, script: &str, username: &str) {
        let path = self.script_path(script);
        match Command::new("sudo")
            .arg(&path)
            .arg(username)
            .arg(&self.prefix)
            .status()
        {
            Ok(status) if !status.success() => {
                warn!(username, script, %status, "Ticket helper exited non-zero");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(username, script, error = %e, "Failed to run ticket helper");
            }
        }
    }
}

impl TicketManager for ScriptTicketManager {
    fn refresh(&self, username: &str) {
        info!(username, "Checking ticket");
        self.run(REFRESH_SCRIPT, username);
    }

    fn revoke(&self, username: &str) {
        info!(username, "Deleting ticket");
        self.run(REVOKE_SCRIPT, username);
    }
}
