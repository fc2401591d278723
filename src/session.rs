//! Session records returned by the session directory
//!
//! A session has no identity beyond its username for the duration of one
//! pass; records are fetched fresh every pass and never retained.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One user record as returned by `GET /api/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    /// Username
    pub name: String,
    /// Active-server indicator: the server's URL path when one is running,
    /// null or empty otherwise
    #[serde(default)]
    pub server: Option<String>,
    /// Timestamp of the last observed activity
    pub last_activity: DateTime<Utc>,
    /// Administrative accounts are exempt from the container-missing check
    #[serde(default)]
    pub admin: bool,
}

impl Session {
    /// Whether the directory believes this user has a running server.
    pub fn has_active_server(&self) -> bool {
        self.server.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Whether the session has been idle past `cull_limit`.
    pub fn is_idle(&self, cull_limit: DateTime<Utc>) -> bool {
        self.last_activity < cull_limit
    }
}

/// Outcome of classifying one session during a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullDecision {
    /// No active server; neither culled nor ticket-refreshed
    Ignored,
    /// Active and within the idle limit; ticket gets refreshed
    KeptActive,
    /// Marked for termination
    Cull,
}
