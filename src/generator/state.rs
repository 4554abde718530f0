//! Combined atomic state for timestamp + sequence
//!
//! Packs the last timestamp offset and sequence into a single u64 for
//! lock-free CAS. The sequence occupies the low `sequence_bits` bits, so any
//! valid layout fits: the timestamp offset needs at most
//! `63 - node_bits - sequence_bits` bits.

/// Unpacked generator state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct State {
    timestamp: i64,
    sequence: i64,
}

impl State {
    #[inline(always)]
    pub const fn new(timestamp: i64, sequence: i64) -> Self {
        Self {
            timestamp,
            sequence,
        }
    }

    /// Last millisecond offset an ID was issued for
    #[inline(always)]
    pub const fn timestamp(self) -> i64 {
        self.timestamp
    }

    /// Last sequence issued within `timestamp`
    #[inline(always)]
    pub const fn sequence(self) -> i64 {
        self.sequence
    }

    /// Raw u64 value for atomic operations
    #[inline(always)]
    pub const fn pack(self, sequence_bits: u8) -> u64 {
        ((self.timestamp as u64) << sequence_bits) | (self.sequence as u64)
    }

    #[inline(always)]
    pub const fn unpack(raw: u64, sequence_bits: u8) -> Self {
        let mask = (1u64 << sequence_bits) - 1;
        Self {
            timestamp: (raw >> sequence_bits) as i64,
            sequence: (raw & mask) as i64,
        }
    }
}
