//! Bit layout of an ID: field widths, epoch and the derived shifts and masks

mod builder;

use thiserror::Error;

pub use builder::LayoutBuilder;
use builder::{
    DEFAULT_NODE_BITS, DEFAULT_SEQUENCE_BITS, DEFAULT_SPIN_ENABLED, DEFAULT_SPIN_LOOPS,
    DEFAULT_SPIN_YIELD_EVERY,
};

use crate::codec::Codec;

/// Twitter's Snowflake epoch, 2010-11-04T01:42:54.657Z
pub const TWITTER_EPOCH: i64 = 1_288_834_974_657;

/// Bits available below the sign bit
pub const ID_BITS: u8 = 63;

/// Node and sequence together may use everything but one timestamp bit
pub(crate) const MAX_FIELD_BITS: u8 = ID_BITS - 1;

/// Errors related to [`Layout`] validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A field was configured with zero bits
    #[error("{field} field must be at least one bit wide")]
    ZeroWidth { field: &'static str },
    /// Node and sequence leave no room for the timestamp
    #[error("node bits {node_bits} + sequence bits {sequence_bits} exceed 62 bits")]
    TooManyBits { node_bits: u8, sequence_bits: u8 },
    /// Epochs before 1970 are not representable
    #[error("epoch {epoch} must not be negative")]
    NegativeEpoch { epoch: i64 },
}

/// Immutable partition of a 63-bit positive integer into timestamp, node and
/// sequence fields, plus the epoch treated as timestamp zero.
///
/// Timestamp bits are whatever node and sequence leave over. Wait tuning for
/// the generator travels with the layout since both are fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    node_bits: u8,
    sequence_bits: u8,
    epoch: i64,
    time_shift: u8,
    node_shift: u8,
    timestamp_mask: i64,
    node_mask: i64,
    sequence_mask: i64,
    max_node_id: i64,
    spin_enabled: bool,
    spin_loops: u32,
    spin_yield_every: u32,
}

impl Layout {
    #[inline]
    const fn mask(bits: u8) -> i64 {
        (1i64 << bits) - 1
    }

    /// Caller guarantees widths are non-zero and sum to at most [`MAX_FIELD_BITS`]
    const fn new(node_bits: u8, sequence_bits: u8, epoch: i64) -> Self {
        let time_shift = node_bits + sequence_bits;
        let max_node_id = Self::mask(node_bits);
        Self {
            node_bits,
            sequence_bits,
            epoch,
            time_shift,
            node_shift: sequence_bits,
            timestamp_mask: Self::mask(ID_BITS - time_shift),
            node_mask: max_node_id << sequence_bits,
            sequence_mask: Self::mask(sequence_bits),
            max_node_id,
            spin_enabled: DEFAULT_SPIN_ENABLED,
            spin_loops: DEFAULT_SPIN_LOOPS,
            spin_yield_every: DEFAULT_SPIN_YIELD_EVERY,
        }
    }

    pub(crate) fn from_builder(b: LayoutBuilder) -> Self {
        let mut layout = Self::new(b.node_bits, b.sequence_bits, b.epoch);
        layout.spin_enabled = b.spin_enabled;
        layout.spin_loops = b.spin_loops;
        layout.spin_yield_every = b.spin_yield_every;
        layout
    }

    /// Create a new layout builder
    pub fn builder() -> LayoutBuilder {
        LayoutBuilder::new()
    }

    /// 41 timestamp bits, 10 node bits, 12 sequence bits from the Twitter epoch
    pub const fn standard() -> Self {
        Self::new(DEFAULT_NODE_BITS, DEFAULT_SEQUENCE_BITS, TWITTER_EPOCH)
    }

    /// 41 timestamp bits, 8 node bits, 14 sequence bits.
    ///
    /// Sized for node ids taken from the last octet of an IPv4 address, trading
    /// the unused node range for a deeper per-millisecond sequence.
    pub const fn host_octet() -> Self {
        Self::new(8, 14, TWITTER_EPOCH)
    }

    /// Codec bound to this layout
    #[inline]
    pub const fn codec(&self) -> Codec {
        Codec::new(*self)
    }

    #[inline(always)]
    pub const fn epoch(&self) -> i64 {
        self.epoch
    }

    #[inline(always)]
    pub const fn node_bits(&self) -> u8 {
        self.node_bits
    }

    #[inline(always)]
    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    #[inline(always)]
    pub const fn timestamp_bits(&self) -> u8 {
        ID_BITS - self.time_shift
    }

    #[inline(always)]
    pub const fn max_node_id(&self) -> i64 {
        self.max_node_id
    }

    #[inline(always)]
    pub const fn max_sequence(&self) -> i64 {
        self.sequence_mask
    }

    /// Largest millisecond offset from the epoch the timestamp field can hold
    #[inline(always)]
    pub const fn max_timestamp(&self) -> i64 {
        self.timestamp_mask
    }

    #[inline(always)]
    pub const fn spin_enabled(&self) -> bool {
        self.spin_enabled
    }

    #[inline(always)]
    pub const fn spin_loops(&self) -> u32 {
        self.spin_loops
    }

    #[inline(always)]
    pub const fn spin_yield_every(&self) -> u32 {
        self.spin_yield_every
    }

    #[inline(always)]
    pub(crate) const fn time_shift(&self) -> u8 {
        self.time_shift
    }

    #[inline(always)]
    pub(crate) const fn node_shift(&self) -> u8 {
        self.node_shift
    }

    /// Node mask positioned in place, not shifted down
    #[inline(always)]
    pub(crate) const fn node_mask(&self) -> i64 {
        self.node_mask
    }

    #[inline(always)]
    pub(crate) const fn sequence_mask(&self) -> i64 {
        self.sequence_mask
    }

    #[inline(always)]
    pub(crate) const fn timestamp_mask(&self) -> i64 {
        self.timestamp_mask
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_shifts_and_masks() {
        let layout = Layout::standard();
        assert_eq!(layout.time_shift(), 22);
        assert_eq!(layout.node_shift(), 12);
        assert_eq!(layout.timestamp_bits(), 41);
        assert_eq!(layout.sequence_mask(), 0xFFF);
        assert_eq!(layout.node_mask(), 0x3FF << 12);
        assert_eq!(layout.max_node_id(), 1023);
        assert_eq!(layout.max_timestamp(), (1i64 << 41) - 1);
        assert_eq!(layout.epoch(), TWITTER_EPOCH);
    }

    #[test]
    fn test_host_octet_fits_any_octet() {
        let layout = Layout::host_octet();
        assert_eq!(layout.max_node_id(), 255);
        assert_eq!(layout.max_sequence(), (1 << 14) - 1);
        assert_eq!(layout.timestamp_bits(), 41);
    }

    #[test]
    fn test_widest_layout_keeps_one_timestamp_bit() {
        let layout = Layout::builder()
            .node_bits(31)
            .sequence_bits(31)
            .build()
            .unwrap();
        assert_eq!(layout.timestamp_bits(), 1);
        assert_eq!(layout.max_timestamp(), 1);
    }
}
