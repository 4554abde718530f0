//! Core generator implementation
//!
//! Split into modules for testability:
//! - `state` - Combined atomic state (timestamp + sequence)
//! - `wait` - Spin and backoff strategies
//! - `generate` - ID generation logic

mod generate;
pub(crate) mod state;
mod wait;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::clock::{Clock, SystemClock};
use crate::codec::Codec;
use crate::error::SnowError;
use crate::id::Id;
use crate::layout::Layout;
use crate::node::{self, NodeIdSource, ResolvedNode};

use state::State;
use wait::{sleep_until, spin_wait};

/// Snowflake ID generator for one node, with cache-line alignment.
///
/// All generation state lives in a single atomic word, so one instance can be
/// shared across threads (e.g. behind an `Arc`) and several independently
/// configured instances can coexist in a process.
#[derive(Debug)]
#[repr(align(64))]
pub struct Generator<C: Clock = SystemClock> {
    // === Hot path fields ===
    pub(crate) state: AtomicU64,
    node_prefix: i64,
    pub(crate) max_seq: i64,
    seq_bits: u8,
    ts_shift: u8,
    max_ts: i64,
    epoch: i64,
    clock: C,

    // === Cold path fields ===
    node_id: i64,
    source: NodeIdSource,
    layout: Layout,
    codec: Codec,
}

impl Generator<SystemClock> {
    /// Create with the standard layout and the system clock
    pub fn new(node_id: i64) -> Result<Self, SnowError> {
        Self::with_layout(node_id, Layout::standard())
    }

    /// Create with a custom layout and the system clock
    pub fn with_layout(node_id: i64, layout: Layout) -> Result<Self, SnowError> {
        Self::with_clock(node_id, layout, SystemClock)
    }

    /// Create with a node id derived from the host's primary IPv4 address.
    ///
    /// When no address is found the node id is 0; check
    /// [`Generator::node_source`] for [`NodeIdSource::Fallback`].
    pub fn from_host(layout: Layout, preferred_iface: &str) -> Result<Self, SnowError> {
        Self::from_resolved(node::resolve_node_id(preferred_iface), layout, SystemClock)
    }
}

impl<C: Clock> Generator<C> {
    /// Create with an explicit node id, layout and time source
    pub fn with_clock(node_id: i64, layout: Layout, clock: C) -> Result<Self, SnowError> {
        Self::from_resolved(ResolvedNode::explicit(node_id), layout, clock)
    }

    /// Create from an already resolved node id
    pub fn from_resolved(resolved: ResolvedNode, layout: Layout, clock: C) -> Result<Self, SnowError> {
        Self::validate_node_id(resolved.node_id, &layout)?;
        Self::validate_epoch(&layout, &clock)?;
        Ok(Self::build(resolved, layout, clock))
    }

    fn validate_node_id(node_id: i64, layout: &Layout) -> Result<(), SnowError> {
        let max = layout.max_node_id();
        if !(0..=max).contains(&node_id) {
            return Err(SnowError::InvalidNodeId { node_id, max });
        }
        Ok(())
    }

    fn validate_epoch(layout: &Layout, clock: &C) -> Result<(), SnowError> {
        let now = clock.unix_millis();
        let epoch = layout.epoch();
        if epoch > now {
            return Err(SnowError::EpochInFuture { epoch, now });
        }
        let elapsed = now - epoch;
        if elapsed > layout.max_timestamp() {
            return Err(SnowError::TimestampExhausted {
                elapsed,
                max: layout.max_timestamp(),
            });
        }
        Ok(())
    }

    pub(crate) fn build(resolved: ResolvedNode, layout: Layout, clock: C) -> Self {
        Self {
            // Nothing issued yet reads as (offset 0, sequence 0). Offset 0 is the
            // epoch itself, which validate_epoch only admits when the clock sits
            // exactly on it; the first ID then takes sequence 1.
            state: AtomicU64::new(0),
            node_prefix: resolved.node_id << layout.node_shift(),
            max_seq: layout.max_sequence(),
            seq_bits: layout.sequence_bits(),
            ts_shift: layout.time_shift(),
            max_ts: layout.max_timestamp(),
            epoch: layout.epoch(),
            clock,
            node_id: resolved.node_id,
            source: resolved.source,
            layout,
            codec: layout.codec(),
        }
    }

    #[inline(always)]
    pub const fn node_id(&self) -> i64 {
        self.node_id
    }

    /// Provenance of the node id; [`NodeIdSource::Fallback`] flags a collision risk
    #[inline(always)]
    pub const fn node_source(&self) -> NodeIdSource {
        self.source
    }

    #[inline(always)]
    pub const fn epoch(&self) -> i64 {
        self.epoch
    }

    #[inline(always)]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    #[inline(always)]
    pub const fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Sequence of the most recently issued ID
    pub fn step(&self) -> i64 {
        self.load_state().sequence()
    }

    /// Unix milliseconds of the most recently issued ID, the epoch before any
    pub fn last_timestamp(&self) -> i64 {
        self.load_state().timestamp() + self.epoch
    }

    /// Unix milliseconds at which `id` was created
    #[inline]
    pub fn time_of(&self, id: Id) -> i64 {
        self.codec.time_of(id)
    }

    #[inline]
    pub fn node_id_of(&self, id: Id) -> i64 {
        self.codec.node_id_of(id)
    }

    #[inline]
    pub fn step_of(&self, id: Id) -> i64 {
        self.codec.step_of(id)
    }

    /// (timestamp offset, node id, sequence)
    #[inline]
    pub fn decompose(&self, id: Id) -> (i64, i64, i64) {
        self.codec.decompose(id)
    }

    #[inline(always)]
    pub(crate) fn now_ms(&self) -> i64 {
        self.clock.unix_millis() - self.epoch
    }

    #[inline(always)]
    pub(crate) fn load_state(&self) -> State {
        State::unpack(self.state.load(Ordering::Acquire), self.seq_bits)
    }

    #[cfg(test)]
    pub(crate) fn store_state(&self, state: State) {
        self.state.store(state.pack(self.seq_bits), Ordering::Release);
    }

    /// Wait until the clock reaches `target`, returning the new offset
    pub(crate) fn wait_until(&self, target: i64, backoff_ms: u64) -> i64 {
        if let Some(now) = spin_wait(target, &self.layout, || self.now_ms()) {
            return now;
        }
        sleep_until(target, backoff_ms, || self.now_ms())
    }

    /// Callers keep `timestamp` within `max_ts`
    #[inline(always)]
    pub(crate) fn assemble_id(&self, timestamp: i64, sequence: i64) -> Id {
        Id::from_raw((timestamp << self.ts_shift) | self.node_prefix | sequence)
    }
}
