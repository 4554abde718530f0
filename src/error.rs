use thiserror::Error;

use crate::layout::LayoutError;

/// Represents errors that can occur while building or driving a generator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnowError {
    /// Node ID does not fit in the layout's node field
    #[error("Node ID {node_id} is invalid. Allowed range is 0..={max}")]
    InvalidNodeId { node_id: i64, max: i64 },
    /// Clock moved backwards past the last issued timestamp
    #[error("Clock moved backwards. Refusing to generate id for {delta} milliseconds")]
    ClockMovedBackwards { delta: i64 },
    /// Layout epoch lies ahead of the current clock reading
    #[error("Epoch {epoch} is ahead of the current time {now}")]
    EpochInFuture { epoch: i64, now: i64 },
    /// Time since the epoch no longer fits the timestamp field
    #[error("{elapsed} milliseconds since epoch exceed the timestamp field maximum {max}")]
    TimestampExhausted { elapsed: i64, max: i64 },
    /// Layout failed validation
    #[error(transparent)]
    Layout(#[from] LayoutError),
}
