//! Tandem notification pipeline.
//!
//! The asynchronous half of the Tandem application: everything between "a
//! domain action wants to email someone" and "the message left the
//! building". Two load-bearing pieces:
//!
//! - [`idgen::EventIdGenerator`]: clock-ordered, collision-free 64-bit
//!   record ids, safe for concurrent callers within one process.
//! - the delivery queue: producers render and enqueue
//!   [`queue::NotificationTask`]s onto a durable list; the
//!   [`dispatch::Dispatcher`] pops tasks and delivers them, retrying with
//!   linear backoff, at-least-once, up to a bounded attempt count.
//!
//! Around them sit the per-recipient [`limiter::RateLimiter`], the
//! single-use [`credential::CredentialStore`] for verification codes and
//! reset tokens, and the [`notify::Notifier`] facade the domain layer
//! calls. All cross-process state lives behind the [`store::Store`] seam
//! (Redis in production, in-memory for tests and local runs).

pub mod config;
pub mod credential;
pub mod dispatch;
pub mod error;
pub mod idgen;
pub mod limiter;
pub mod mailer;
pub mod notify;
pub mod observability;
pub mod queue;
pub mod render;
pub mod store;

pub use config::Config;
pub use credential::{CredentialStore, Purpose};
pub use dispatch::Dispatcher;
pub use error::Error;
pub use idgen::EventIdGenerator;
pub use limiter::RateLimiter;
pub use mailer::{DisabledMailer, HttpMailer, MailError, Mailer};
pub use notify::{Notifier, SendOutcome};
pub use queue::{NotificationKind, NotificationTask, TaskQueue, MAX_RETRIES};
pub use store::{MemoryStore, RedisStore, Store, StoreError};
