//! # snownode
//!
//! Snowflake-style 64-bit IDs for fleets of independent nodes.
//!
//! Every ID packs a millisecond timestamp, a node id and a per-millisecond
//! sequence into a positive `i64`:
//! - 📈 Time-sorted across nodes
//! - 🔄 Strictly increasing per node
//! - 🔒 Thread-safe, lock-free generation
//! - 🌐 Node id derived from the host's IPv4 address when not configured
//!
//! ```no_run
//! use snownode::Generator;
//!
//! let generator = Generator::new(7).unwrap();
//! let id = generator.generate();
//! assert_eq!(generator.node_id_of(id), 7);
//!
//! // Or use the process-wide default instance
//! let id = snownode::next();
//! println!("{id} created at {}", snownode::global::time_of(id));
//! ```

#![forbid(unsafe_code)]

pub mod clock;
mod codec;
mod error;
mod generator;
pub mod global;
mod id;
pub mod iface;
mod layout;
pub mod node;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use clock::{Clock, SystemClock};
pub use codec::Codec;
pub use error::SnowError;
pub use generator::Generator;
pub use global::next;
pub use id::Id;
pub use iface::{infer_host_ipv4, list_ifaces, Iface, IfaceError, ListMode, MatchMode};
pub use layout::{Layout, LayoutBuilder, LayoutError, ID_BITS, TWITTER_EPOCH};
pub use node::{resolve_node_id, NodeIdSource, ResolvedNode};
