// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mailtrace serve` command implementation.
//!
//! Wires the SQLite storage, SMTP mailer, and AI summarizer adapters into
//! the gateway and serves until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use mailtrace_config::model::MailtraceConfig;
use mailtrace_core::{Mailer, MailtraceError, StorageAdapter, Summarizer};
use mailtrace_gateway::{GatewayState, ServerConfig, start_server};
use mailtrace_smtp::SmtpMailer;
use mailtrace_storage::SqliteStorage;
use mailtrace_summarizer::OpenAiSummarizer;

/// Runs the `mailtrace serve` command.
pub async fn run_serve(config: MailtraceConfig) -> Result<(), MailtraceError> {
    init_tracing(&config.server.log_level);

    info!("starting mailtrace serve");

    // Storage first: migrations run on open, and a broken database should
    // fail startup rather than the first request.
    let storage: Arc<dyn StorageAdapter> = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    storage.health_check().await?;
    info!(path = %config.storage.database_path, "storage ready");

    let mailer: Arc<dyn Mailer> = {
        let mailer = SmtpMailer::new(&config.smtp).map_err(|e| {
            error!(error = %e, "failed to initialize SMTP mailer");
            eprintln!(
                "error: SMTP credentials required. Set smtp.username and smtp.password \
                 in mailtrace.toml or via MAILTRACE_SMTP_* environment variables."
            );
            e
        })?;
        Arc::new(mailer)
    };

    let summarizer: Arc<dyn Summarizer> = Arc::new(OpenAiSummarizer::new(&config.summarizer)?);

    let state = GatewayState {
        storage: storage.clone(),
        mailer,
        summarizer,
        base_url: config.server.base_url.clone(),
        start_time: Instant::now(),
    };

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    tokio::select! {
        result = start_server(&server_config, state) => result,
        _ = shutdown_signal() => {
            info!("shutdown signal received, checkpointing storage");
            storage.close().await?;
            Ok(())
        }
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies.
fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
