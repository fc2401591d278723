//! culld - idle session culler
//!
//! Periodically asks the session manager for its user list, culls sessions
//! idle beyond the configured timeout or whose backing container has
//! vanished, and repairs ticket and database bookkeeping for the culled
//! ones. Runs until interrupted.

use tracing::{error, info};

use culld::config::CullerConfig;
use culld::infrastructure::container::{ContainerRuntime, DockerCli};
use culld::infrastructure::directory::{HubClient, SessionDirectory};
use culld::infrastructure::storage::records::{RecordStore, SqliteRecordStore};
use culld::infrastructure::tickets::{ScriptTicketManager, TicketManager};
use culld::logging::init_logging;
use culld::reconciler::{CullPolicy, Reconciler};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = match CullerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    let directory = HubClient::new(
        config.directory.url.as_str(),
        config.directory.resolve_token(),
    );
    let runtime = DockerCli::new();
    let tickets = ScriptTicketManager::new(
        &config.tickets.helper_dir,
        config.tickets.prefix.as_str(),
    );
    let records = SqliteRecordStore::new(&config.store.db_path);
    let policy = CullPolicy::from_config(&config.cull);

    let reconciler = Reconciler::new(directory, runtime, tickets, records, policy);

    let interval = config.cull.interval();
    info!(
        interval_secs = interval.as_secs(),
        timeout_secs = config.cull.timeout_secs,
        local_home = config.cull.local_home,
        "Culling on a fixed interval"
    );

    // One pass before the timer is scheduled.
    run_pass(&reconciler).await;

    let start = tokio::time::Instant::now() + interval;
    let mut ticker = tokio::time::interval_at(start, interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => run_pass(&reconciler).await,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, exiting");
                break;
            }
        }
    }
}

/// Run one pass; a failed pass is logged and retried on the next tick.
async fn run_pass<D, C, T, R>(reconciler: &Reconciler<D, C, T, R>)
where
    D: SessionDirectory,
    C: ContainerRuntime,
    T: TicketManager,
    R: RecordStore,
{
    match reconciler.run_once().await {
        Ok(outcome) => {
            info!(
                culled = outcome.culled.len(),
                kept_active = outcome.kept_active.len(),
                ignored = outcome.ignored,
                failed = outcome.failed.len(),
                "Pass complete"
            );
        }
        Err(e) => {
            error!("Pass aborted: {e}");
        }
    }
}
