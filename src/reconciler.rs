//! Reconciliation pass
//!
//! One pass: fetch all sessions from the directory, classify each against
//! the cull policy, dispatch termination requests for the culled subset,
//! and repair ticket/record bookkeeping. No state survives between passes;
//! classification is recomputed from scratch every interval.

use chrono::{DateTime, Duration, Utc};
use futures::stream::FuturesOrdered;
use futures::StreamExt;
use tracing::{debug, error, info, warn};

use crate::config::{CullConfig, ProbeFailurePolicy};
use crate::error::{DirectoryError, Result};
use crate::infrastructure::container::ContainerRuntime;
use crate::infrastructure::directory::SessionDirectory;
use crate::infrastructure::storage::records::RecordStore;
use crate::infrastructure::tickets::TicketManager;
use crate::session::{CullDecision, Session};

/// Policy inputs for a reconciliation pass
#[derive(Debug, Clone)]
pub struct CullPolicy {
    /// Idle timeout; sessions inactive longer than this are culled
    pub timeout: Duration,
    /// Suppress ticket management (ephemeral/shared home directories)
    pub local_home: bool,
    /// What to do when the container probe itself fails
    pub probe_failure: ProbeFailurePolicy,
}

impl CullPolicy {
    pub fn from_config(cull: &CullConfig) -> Self {
        Self {
            timeout: Duration::seconds(cull.timeout_secs as i64),
            local_home: cull.local_home,
            probe_failure: cull.probe_failure,
        }
    }
}

/// Summary of one pass, for logging and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassOutcome {
    /// Sessions terminated this pass (termination issued, result handled),
    /// in the order terminations were issued
    pub culled: Vec<String>,
    /// Sessions kept active this pass
    pub kept_active: Vec<String>,
    /// Sessions with no active server
    pub ignored: usize,
    /// Subset of `culled` whose termination failed, with the HTTP status
    pub failed: Vec<(String, u16)>,
}

/// Drives one reconciliation pass over the external collaborators
pub struct Reconciler<D, C, T, R> {
    directory: D,
    runtime: C,
    tickets: T,
    records: R,
    policy: CullPolicy,
}

impl<D, C, T, R> Reconciler<D, C, T, R>
where
    D: SessionDirectory,
    C: ContainerRuntime,
    T: TicketManager,
    R: RecordStore,
{
    pub fn new(directory: D, runtime: C, tickets: T, records: R, policy: CullPolicy) -> Self {
        Self {
            directory,
            runtime,
            tickets,
            records,
            policy,
        }
    }

    /// Run one reconciliation pass against the current time.
    pub async fn run_once(&self) -> Result<PassOutcome> {
        self.run_at(Utc::now()).await
    }

    /// Run one pass with an explicit notion of "now".
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<PassOutcome> {
        let cull_limit = now - self.policy.timeout;
        let sessions = self.directory.list_sessions().await?;
        debug!(count = sessions.len(), "Fetched session listing");

        let mut outcome = PassOutcome::default();
        let mut pending = FuturesOrdered::new();

        for session in &sessions {
            match self.classify(session, cull_limit)? {
                CullDecision::Ignored => outcome.ignored += 1,
                CullDecision::KeptActive => {
                    debug!(
                        username = %session.name,
                        last_activity = %session.last_activity,
                        "Not culling, still active"
                    );
                    if !self.policy.local_home {
                        self.tickets.refresh(&session.name);
                    }
                    outcome.kept_active.push(session.name.clone());
                }
                CullDecision::Cull => {
                    info!(
                        username = %session.name,
                        last_activity = %session.last_activity,
                        "Culling session"
                    );
                    let name = session.name.clone();
                    pending.push_back(async move {
                        let result = self.directory.terminate(&name).await;
                        (name, result)
                    });
                }
            }
        }

        // Terminations were all dispatched above; consume results in issue
        // order. An HTTP-level failure repairs bookkeeping for that user
        // without disturbing the others; anything else aborts the pass.
        while let Some((name, result)) = pending.next().await {
            match result {
                Ok(()) => {}
                Err(DirectoryError::Http { status }) => {
                    error!(
                        username = %name,
                        status,
                        "Termination request failed, removing user record"
                    );
                    self.records.delete_record(&name)?;
                    outcome.failed.push((name.clone(), status));
                }
                Err(e) => return Err(e.into()),
            }
            debug!(username = %name, "Finished culling");
            if !self.policy.local_home {
                self.tickets.revoke(&name);
            }
            outcome.culled.push(name);
        }

        Ok(outcome)
    }

    /// Classify one session against the policy.
    ///
    /// Two independent cull triggers: idle-timeout expiry, and a safety
    /// check for sessions whose backing container has vanished while the
    /// directory still considers them live. The probe is evaluated lazily:
    /// sessions already past the idle limit, and admin sessions, are never
    /// probed.
    fn classify(&self, session: &Session, cull_limit: DateTime<Utc>) -> Result<CullDecision> {
        if !session.has_active_server() {
            return Ok(CullDecision::Ignored);
        }

        if session.is_idle(cull_limit) {
            return Ok(CullDecision::Cull);
        }

        if !session.admin && !self.container_backing(&session.name)? {
            return Ok(CullDecision::Cull);
        }

        Ok(CullDecision::KeptActive)
    }

    /// Probe for the session's container, applying the configured failure
    /// policy.
    fn container_backing(&self, username: &str) -> Result<bool> {
        match self.runtime.exists(username) {
            Ok(found) => Ok(found),
            Err(e) => match self.policy.probe_failure {
                ProbeFailurePolicy::Abort => Err(e.into()),
                ProbeFailurePolicy::AssumePresent => {
                    warn!(
                        username,
                        error = %e,
                        "Container probe failed, assuming container is present"
                    );
                    Ok(true)
                }
            },
        }
    }
}
