//! Configuration parsing for the notification worker.
//!
//! Supports:
//! - CLI arguments via clap
//! - Environment variable overrides
//! - Sensible defaults for quick start

use clap::Parser;

/// Tandem notification pipeline worker.
#[derive(Parser, Debug, Clone)]
#[command(name = "tandem-notify")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Redis connection URL (queue, rate counters, credentials)
    #[arg(
        long,
        env = "TANDEM_REDIS_URL",
        default_value = "redis://127.0.0.1:6379"
    )]
    pub redis_url: String,

    /// Per-process node id for the ID generator (0..=1023)
    #[arg(long, env = "TANDEM_NODE_ID", default_value_t = 0)]
    pub node_id: i64,

    /// List key carrying queued notification tasks
    #[arg(long, env = "TANDEM_QUEUE_KEY", default_value = "tandem:notify:queue")]
    pub queue_key: String,

    /// Key prefix for per-recipient rate counters
    #[arg(
        long,
        env = "TANDEM_RATE_LIMIT_PREFIX",
        default_value = "tandem:notify:rl:"
    )]
    pub rate_limit_prefix: String,

    /// Sends allowed per recipient per window
    #[arg(long, env = "TANDEM_RATE_LIMIT_MAX", default_value_t = 5)]
    pub rate_limit_max: i64,

    /// Rate-limit window length in seconds
    #[arg(long, env = "TANDEM_RATE_LIMIT_WINDOW_SECS", default_value_t = 3600)]
    pub rate_limit_window_secs: u64,

    /// Bounded wait per queue pop, in seconds (also the shutdown latency)
    #[arg(long, env = "TANDEM_POP_TIMEOUT_SECS", default_value_t = 5)]
    pub pop_timeout_secs: u64,

    /// Backoff unit between delivery retries, in seconds
    #[arg(long, env = "TANDEM_RETRY_DELAY_SECS", default_value_t = 60)]
    pub retry_delay_secs: u64,

    /// HTTP email API send URL; outbound mail is disabled when unset
    #[arg(long, env = "TANDEM_MAIL_ENDPOINT")]
    pub mail_endpoint: Option<String>,

    /// Bearer token for the email API
    #[arg(long, env = "TANDEM_MAIL_TOKEN")]
    pub mail_token: Option<String>,

    /// Sender header for outbound mail
    #[arg(
        long,
        env = "TANDEM_MAIL_FROM",
        default_value = "Tandem <no-reply@tandem.app>"
    )]
    pub mail_from: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".into(),
            node_id: 0,
            queue_key: "tandem:notify:queue".into(),
            rate_limit_prefix: "tandem:notify:rl:".into(),
            rate_limit_max: 5,
            rate_limit_window_secs: 3600,
            pop_timeout_secs: 5,
            retry_delay_secs: 60,
            mail_endpoint: None,
            mail_token: None,
            mail_from: "Tandem <no-reply@tandem.app>".into(),
            log_level: "info".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.rate_limit_max, 5);
        assert_eq!(config.rate_limit_window_secs, 3600);
        assert_eq!(config.pop_timeout_secs, 5);
        assert!(config.mail_endpoint.is_none());
    }
}
