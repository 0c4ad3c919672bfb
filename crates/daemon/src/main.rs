#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! taskmirror daemon: polls a remote task server and publishes
//! filtered snapshots for downstream consumers.

use clap::Parser;
use taskmirror_core::config::{IdValue, SyncConfig, ALL_PROJECTS, DEFAULT_INTERVAL_SECS};
use taskmirror_sync::{Coordinator, MemoryRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod http;

#[derive(Parser, Debug)]
#[command(
    name = "taskmirror-daemon",
    version,
    about = "Mirror a remote task server into a local snapshot"
)]
struct Args {
    /// Remote base URL, e.g. https://tasks.example.com
    #[arg(long)]
    base_url: String,

    /// API token.
    #[arg(long, env = "TASKMIRROR_TOKEN", hide_env_values = true)]
    token: String,

    /// Poll interval in seconds.
    #[arg(long, default_value_t = DEFAULT_INTERVAL_SECS)]
    interval_seconds: u64,

    /// Accept invalid TLS certificates.
    #[arg(long, default_value_t = false)]
    insecure: bool,

    /// Project id to sync (repeatable). Omit to sync every project.
    #[arg(long = "project")]
    projects: Vec<String>,

    /// Drop completed tasks from the snapshot.
    #[arg(long, default_value_t = false)]
    hide_done: bool,

    /// Kanban project id. Together with --kanban-view-id this enables
    /// the kanban board.
    #[arg(long)]
    kanban_project_id: Option<String>,

    /// Kanban view id.
    #[arg(long)]
    kanban_view_id: Option<String>,

    /// Log level (env-filter syntax).
    #[arg(long, default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(args.log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SyncConfig {
        base_url: args.base_url,
        token: args.token,
        interval_secs: args.interval_seconds,
        strict_tls: !args.insecure,
        selected_projects: if args.projects.is_empty() {
            vec![ALL_PROJECTS.to_string()]
        } else {
            args.projects
        },
        hide_done: args.hide_done,
        kanban_project_id: args.kanban_project_id.map(IdValue::Str),
        kanban_view_id: args.kanban_view_id.map(IdValue::Str),
    };

    let client = http::HttpRemoteClient::new(&config)?;
    let mut coordinator = Coordinator::new(config, client, MemoryRegistry::new(), "default");

    let mut snapshots = coordinator.subscribe();
    let mut reload = coordinator.reload_signal();

    // The first refresh must fail loudly: nothing downstream can start
    // without an initial snapshot.
    let first = coordinator.refresh().await?;
    tracing::info!(
        projects = first.projects.len(),
        tasks = first.tasks.len(),
        kanban = first.kanban.is_some(),
        "initial snapshot ready"
    );

    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    let counts = snapshots
                        .borrow_and_update()
                        .as_ref()
                        .map(|s| (s.projects.len(), s.tasks.len()));
                    if let Some((projects, tasks)) = counts {
                        tracing::info!(projects, tasks, "snapshot updated");
                    }
                }
                changed = reload.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    let generation = *reload.borrow_and_update();
                    tracing::info!(generation, "downstream reload requested");
                }
            }
        }
    });

    tokio::select! {
        _ = coordinator.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested");
        }
    }
    Ok(())
}
