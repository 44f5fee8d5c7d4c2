#![forbid(unsafe_code)]

//! `oncall-relay` — on-call schedule and incident tracker binary.
//!
//! Bootstraps configuration, connects the `SQLite` store, starts the two
//! reconciliation jobs, and serves the HTTP transport until a shutdown
//! signal arrives.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use oncall_relay::api::{self, ApiState};
use oncall_relay::config::GlobalConfig;
use oncall_relay::jobs;
use oncall_relay::persistence::db;
use oncall_relay::persistence::incident_store::IncidentStore;
use oncall_relay::persistence::schedule_store::ScheduleStore;
use oncall_relay::persistence::user_store::UserStore;
use oncall_relay::slack::notifier::{Notifier, NullNotifier, SlackNotifier};
use oncall_relay::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "oncall-relay", about = "On-call schedule and incident tracker", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("oncall-relay server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    config.load_credentials();
    info!("configuration loaded");

    // ── Initialize database ─────────────────────────────
    let db = Arc::new(db::connect(&config.db_path).await?);
    info!("database connected");

    // ── Build notifier ──────────────────────────────────
    let notifier: Arc<dyn Notifier> = if config.notifications_enabled() {
        Arc::new(SlackNotifier::new(&config.slack)?)
    } else {
        info!("slack not configured; running without notifications");
        Arc::new(NullNotifier)
    };

    // ── Wire stores ─────────────────────────────────────
    let users = UserStore::new(Arc::clone(&db));
    let schedules = ScheduleStore::new(Arc::clone(&db), users.clone());
    let incidents = IncidentStore::new(
        Arc::clone(&db),
        users.clone(),
        schedules.clone(),
        Arc::clone(&notifier),
    );

    // ── Start reconciliation jobs ───────────────────────
    let ct = CancellationToken::new();
    let assign_handle = jobs::spawn_assign_task(
        schedules.clone(),
        incidents.clone(),
        config.assign_period(),
        ct.clone(),
    );
    let remind_handle = jobs::spawn_remind_task(
        incidents.clone(),
        Arc::clone(&notifier),
        config.remind_period(),
        ct.clone(),
    );
    info!("reconciliation jobs started");

    // ── Start HTTP transport ────────────────────────────
    let state = ApiState {
        users,
        schedules,
        incidents,
    };
    let http_ct = ct.clone();
    let http_port = config.http_port;
    let http_handle = tokio::spawn(async move {
        if let Err(err) = api::serve_http(state, http_port, http_ct).await {
            error!(%err, "http transport failed");
        }
    });
    info!("oncall-relay ready");

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();

    let _ = tokio::join!(http_handle, assign_handle, remind_handle);
    info!("oncall-relay shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
