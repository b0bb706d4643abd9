//! Clock-ordered 64-bit ID generation.
//!
//! Layout (most-significant bit unused):
//! `[timestamp since epoch : 41 bits][node id : 10 bits][sequence : 12 bits]`
//!
//! IDs minted by one generator instance are strictly increasing and never
//! reused, including across clock rollback and sequence exhaustion. One
//! instance per process; construct it explicitly and pass it by reference
//! rather than going through a process-wide global.

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::error::Error;

/// Reference instant for the timestamp field: 2024-01-01T00:00:00Z.
pub const EPOCH_MILLIS: i64 = 1_704_067_200_000;

const NODE_ID_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
const TIMESTAMP_SHIFT: u32 = NODE_ID_BITS + SEQUENCE_BITS;

/// Largest valid node id (10 bits).
pub const MAX_NODE_ID: i64 = (1 << NODE_ID_BITS) - 1;

const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;

/// Millisecond clock behind the generator.
///
/// Injectable so that rollback and same-millisecond rollover behavior can
/// be driven deterministically in tests.
pub trait Clock: Send + Sync {
    /// Current wall-clock time as milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Production clock reading [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

/// Generator state guarded as one critical section.
struct IdState {
    last_millis: i64,
    sequence: i64,
}

/// Thread-safe generator of clock-ordered 64-bit identifiers.
///
/// `next_id` is callable from any number of concurrent callers within one
/// process. Multi-process deployments must provision distinct node ids
/// externally; there is no cross-process coordination.
pub struct EventIdGenerator<C: Clock = SystemClock> {
    state: Mutex<IdState>,
    node_id: i64,
    clock: C,
}

impl EventIdGenerator<SystemClock> {
    /// Create a generator with the system clock.
    ///
    /// Fails iff `node_id` is outside `0..=1023`; there is no other failure
    /// mode and `next_id` is total once constructed.
    pub fn new(node_id: i64) -> Result<Self, Error> {
        Self::with_clock(node_id, SystemClock)
    }
}

impl<C: Clock> EventIdGenerator<C> {
    /// Create a generator with an explicit clock.
    pub fn with_clock(node_id: i64, clock: C) -> Result<Self, Error> {
        if !(0..=MAX_NODE_ID).contains(&node_id) {
            return Err(Error::InvalidNodeId(node_id));
        }
        Ok(Self {
            state: Mutex::new(IdState {
                last_millis: 0,
                sequence: 0,
            }),
            node_id,
            clock,
        })
    }

    /// The node id baked into every generated value.
    pub fn node_id(&self) -> i64 {
        self.node_id
    }

    /// Mint the next identifier.
    ///
    /// Strictly greater than every value this instance has returned before.
    /// Suspends the caller only while waiting out a clock rollback or a
    /// sequence rollover within the same millisecond; both waits happen
    /// inside the lock so no other caller can observe intermediate state.
    pub fn next_id(&self) -> i64 {
        let mut state = self.state.lock();

        let mut now = self.clamped_now();
        // Clock moved backward: wait until wall time catches up rather
        // than ever minting below an already-used timestamp.
        while now < state.last_millis {
            std::thread::yield_now();
            now = self.clamped_now();
        }

        if now == state.last_millis {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // 4096 ids minted this millisecond; spin to the next one.
                while now <= state.last_millis {
                    std::thread::yield_now();
                    now = self.clamped_now();
                }
            }
        } else {
            state.sequence = 0;
        }
        state.last_millis = now;

        ((now - EPOCH_MILLIS) << TIMESTAMP_SHIFT)
            | (self.node_id << SEQUENCE_BITS)
            | state.sequence
    }

    fn clamped_now(&self) -> i64 {
        self.clock.now_millis().max(EPOCH_MILLIS)
    }
}
