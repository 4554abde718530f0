use chrono::{DateTime, Utc};

use crate::id::Id;
use crate::layout::Layout;

/// Packs and unpacks the fields of an [`Id`] for one [`Layout`]
///
/// Encoding masks every field to its width, so out-of-range inputs are
/// truncated rather than rejected. Range checks belong to construction of the
/// [`Layout`] and the generator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Codec {
    layout: Layout,
}

impl Codec {
    pub const fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Pack a millisecond offset from the epoch, a node id and a sequence
    #[inline(always)]
    pub fn encode(&self, timestamp: i64, node_id: i64, sequence: i64) -> Id {
        let layout = &self.layout;
        Id::from_raw(
            ((timestamp & layout.timestamp_mask()) << layout.time_shift())
                | ((node_id << layout.node_shift()) & layout.node_mask())
                | (sequence & layout.sequence_mask()),
        )
    }

    /// Millisecond offset from the layout epoch
    #[inline(always)]
    pub fn timestamp(&self, id: Id) -> i64 {
        id.as_i64() >> self.layout.time_shift()
    }

    /// Creation time in milliseconds since the Unix epoch
    #[inline(always)]
    pub fn time_of(&self, id: Id) -> i64 {
        self.timestamp(id) + self.layout.epoch()
    }

    #[inline(always)]
    pub fn node_id_of(&self, id: Id) -> i64 {
        (id.as_i64() & self.layout.node_mask()) >> self.layout.node_shift()
    }

    #[inline(always)]
    pub fn step_of(&self, id: Id) -> i64 {
        id.as_i64() & self.layout.sequence_mask()
    }

    /// Split an ID into (timestamp offset, node id, sequence) in one pass
    #[inline]
    pub fn decompose(&self, id: Id) -> (i64, i64, i64) {
        (self.timestamp(id), self.node_id_of(id), self.step_of(id))
    }

    /// Creation time as a UTC datetime, `None` if out of chrono's range
    pub fn datetime_of(&self, id: Id) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time_of(id))
    }
}
