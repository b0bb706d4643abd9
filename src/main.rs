//! Tandem notification worker.
//!
//! # Usage
//!
//! ```bash
//! tandem-notify --redis-url redis://127.0.0.1:6379 --queue-key tandem:notify:queue
//! ```
//!
//! Environment variables can also be used:
//! - `TANDEM_REDIS_URL`: Redis connection URL
//! - `TANDEM_QUEUE_KEY`: list key carrying queued tasks
//! - `TANDEM_MAIL_ENDPOINT`: HTTP email API (delivery disabled when unset)
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use tandem_notify::config::Config;
use tandem_notify::dispatch::Dispatcher;
use tandem_notify::mailer::{DisabledMailer, HttpMailer, Mailer};
use tandem_notify::observability::tracing::init_tracing;
use tandem_notify::queue::TaskQueue;
use tandem_notify::store::{RedisStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();

    // Initialize tracing/logging
    init_tracing("tandem-notify");

    // Connect the shared backing store
    let store = RedisStore::connect(&config.redis_url)
        .await
        .with_context(|| format!("failed to connect to redis at {}", config.redis_url))?;
    let store: Arc<dyn Store> = Arc::new(store);

    // Select the mail transport once, at startup
    let mailer: Arc<dyn Mailer> = match &config.mail_endpoint {
        Some(endpoint) => {
            tracing::info!(endpoint = %endpoint, "using HTTP mail transport");
            Arc::new(HttpMailer::new(
                endpoint.clone(),
                config.mail_token.clone(),
                config.mail_from.clone(),
            ))
        }
        None => {
            tracing::warn!("no mail endpoint configured, outbound delivery disabled");
            Arc::new(DisabledMailer)
        }
    };

    let queue = TaskQueue::new(Arc::clone(&store), config.queue_key.clone());
    let dispatcher = Dispatcher::new(
        queue,
        mailer,
        Duration::from_secs(config.pop_timeout_secs),
        Duration::from_secs(config.retry_delay_secs),
    );

    // Cancellation fires on SIGINT/SIGTERM
    let cancel = CancellationToken::new();

    // Spawn signal handler task
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        // Wait for SIGTERM or SIGINT (Ctrl+C)
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating shutdown...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await.expect("failed to listen for ctrl+c");
            tracing::info!("Received Ctrl+C, initiating shutdown...");
        }

        cancel_on_signal.cancel();
    });

    // Run the consumer loop until cancelled
    dispatcher.run(cancel).await;

    tracing::info!("Notification worker shutdown complete");
    Ok(())
}
