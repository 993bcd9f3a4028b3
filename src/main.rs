//! ClinicDesk API - admin dashboard backend for a clinic or trade business
//!
//! Serves leads, follow-ups, appointments, calls, patients, campaigns and a
//! universal inbox over HTTP, aggregated from Google Sheets, Google Calendar,
//! Vapi and the Meta Graph API.

mod cli;
mod config;
mod defaults;
mod error;
mod handlers;
mod services;
mod types;

use std::fs::File;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::handlers::AppState;
use crate::services::inbox_watcher::{HttpMessageFeed, InboxWatcher};
use crate::services::lead_export::write_leads_csv;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| "./logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // Daily rotated file next to stdout
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "server.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,clinicdesk_api=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    let config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::ExportLeads { output } => export_leads(config, &output).await,
        Command::WatchInbox { url } => watch_inbox(config, &url).await,
        Command::CheckConfig => {
            check_config(&config);
            Ok(())
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting ClinicDesk API ({})", config.vertical.as_str());
    for (name, configured) in config.describe_upstreams() {
        if configured {
            info!("Upstream {}: configured", name);
        } else {
            warn!("Upstream {}: not configured", name);
        }
    }

    let state = AppState::from_config(&config)?;
    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}

async fn export_leads(config: Config, output: &Path) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let leads = handlers::leads::normalized_leads(&state)
        .await
        .context("Failed to load leads")?;

    let file = File::create(output).with_context(|| format!("Failed to create {}", output.display()))?;
    let count = write_leads_csv(&leads, file)?;
    info!("Exported {} leads to {}", count, output.display());
    Ok(())
}

async fn watch_inbox(config: Config, url: &str) -> Result<()> {
    let feed = Arc::new(HttpMessageFeed::new(url));
    let watcher = InboxWatcher::new(
        feed,
        Duration::from_secs(config.inbox_poll_secs),
        config.vertical,
        config.display_offset,
    );

    let superseded = watcher.superseded_ticks();
    let shutdown = CancellationToken::new();
    let (mut updates, handle) = watcher.spawn(shutdown.clone());
    info!("Watching inbox at {}", url);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                info!("Inbox update #{}: {} conversations", snapshot.seq, snapshot.conversations.len());
                for conversation in &snapshot.conversations {
                    info!(
                        "  [{}] {} ({}): {}",
                        conversation.platform.as_str(),
                        conversation.participant,
                        conversation.time,
                        conversation.last_message
                    );
                }
            }
        }
    }

    shutdown.cancel();
    handle.await.context("Inbox watcher task failed")?;
    let superseded = superseded.load(Ordering::Relaxed);
    if superseded > 0 {
        warn!("{} inbox polls were superseded before the feed answered", superseded);
    }
    Ok(())
}

fn check_config(config: &Config) {
    println!("vertical: {}", config.vertical.as_str());
    println!("port: {}", config.port);
    for (name, configured) in config.describe_upstreams() {
        println!("{:<16} {}", name, if configured { "configured" } else { "missing" });
    }
}
