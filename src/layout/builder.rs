//! Layout builder with construction-time validation

use super::{Layout, LayoutError, MAX_FIELD_BITS};

/// Default configuration values
pub(super) const DEFAULT_NODE_BITS: u8 = 10;
pub(super) const DEFAULT_SEQUENCE_BITS: u8 = 12;
pub(super) const DEFAULT_SPIN_ENABLED: bool = true;
pub(super) const DEFAULT_SPIN_LOOPS: u32 = 64;
pub(super) const DEFAULT_SPIN_YIELD_EVERY: u32 = 16;

/// Builder for [`Layout`]
///
/// Nothing is checked until [`LayoutBuilder::build`], so setters can be chained
/// in any order.
#[derive(Debug, Clone)]
pub struct LayoutBuilder {
    pub(super) node_bits: u8,
    pub(super) sequence_bits: u8,
    pub(super) epoch: i64,
    pub(super) spin_enabled: bool,
    pub(super) spin_loops: u32,
    pub(super) spin_yield_every: u32,
}

impl LayoutBuilder {
    /// Create a builder preloaded with the standard layout
    pub fn new() -> Self {
        Self {
            node_bits: DEFAULT_NODE_BITS,
            sequence_bits: DEFAULT_SEQUENCE_BITS,
            epoch: super::TWITTER_EPOCH,
            spin_enabled: DEFAULT_SPIN_ENABLED,
            spin_loops: DEFAULT_SPIN_LOOPS,
            spin_yield_every: DEFAULT_SPIN_YIELD_EVERY,
        }
    }

    /// Set the width of the node field
    pub const fn node_bits(mut self, bits: u8) -> Self {
        self.node_bits = bits;
        self
    }

    /// Set the width of the per-millisecond sequence field
    pub const fn sequence_bits(mut self, bits: u8) -> Self {
        self.sequence_bits = bits;
        self
    }

    /// Set the epoch in milliseconds since the Unix epoch
    pub const fn epoch(mut self, epoch: i64) -> Self {
        self.epoch = epoch;
        self
    }

    /// Enable or disable micro spin before sleep while waiting on the clock
    pub const fn enable_spin(mut self, enable: bool) -> Self {
        self.spin_enabled = enable;
        self
    }

    /// Set number of spin loops attempted before falling back to sleep
    pub const fn spin_loops(mut self, loops: u32) -> Self {
        self.spin_loops = loops;
        self
    }

    /// Yield every N spin iterations; 0 disables yielding
    pub const fn spin_yield_every(mut self, n: u32) -> Self {
        self.spin_yield_every = n;
        self
    }

    /// Validate the field widths and epoch, then derive shifts and masks
    pub fn build(self) -> Result<Layout, LayoutError> {
        if self.node_bits == 0 {
            return Err(LayoutError::ZeroWidth { field: "node" });
        }
        if self.sequence_bits == 0 {
            return Err(LayoutError::ZeroWidth { field: "sequence" });
        }
        if u16::from(self.node_bits) + u16::from(self.sequence_bits) > u16::from(MAX_FIELD_BITS) {
            return Err(LayoutError::TooManyBits {
                node_bits: self.node_bits,
                sequence_bits: self.sequence_bits,
            });
        }
        if self.epoch < 0 {
            return Err(LayoutError::NegativeEpoch { epoch: self.epoch });
        }
        Ok(Layout::from_builder(self))
    }
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}
