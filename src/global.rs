//! Process-wide default generator
//!
//! Built lazily on first use with the standard layout and a node id taken from
//! the environment or, failing that, from the host's primary IPv4 address.
//! There is no way to reinitialize it; build a [`Generator`] directly when
//! different settings are needed.

use once_cell::sync::Lazy;

use crate::clock::SystemClock;
use crate::generator::Generator;
use crate::id::Id;
use crate::layout::Layout;
use crate::node::{self, NodeIdSource, ResolvedNode};

/// Explicit node id for the default generator
pub const NODE_ID_ENV: &str = "SNOWNODE_NODE_ID";

/// Preferred interface name used when resolving the node id from the host
pub const IFACE_ENV: &str = "SNOWNODE_IFACE";

/// Settings for the default generator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalConfig {
    pub node_id: Option<i64>,
    pub preferred_iface: String,
}

impl GlobalConfig {
    /// Read [`NODE_ID_ENV`] and [`IFACE_ENV`]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable node ids are logged and ignored
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let node_id = lookup(NODE_ID_ENV).and_then(|raw| match raw.trim().parse::<i64>() {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::warn!(value = %raw, error = %err, "ignoring invalid {NODE_ID_ENV}");
                None
            }
        });
        let preferred_iface = lookup(IFACE_ENV)
            .map(|name| name.trim().to_string())
            .unwrap_or_default();
        Self {
            node_id,
            preferred_iface,
        }
    }

    fn resolve(&self) -> ResolvedNode {
        match self.node_id {
            Some(id) => ResolvedNode::explicit(id),
            None => node::resolve_node_id(&self.preferred_iface),
        }
    }
}

static DEFAULT: Lazy<Generator> = Lazy::new(|| init(&GlobalConfig::from_env()));

pub(crate) fn init(config: &GlobalConfig) -> Generator {
    let layout = Layout::standard();
    match Generator::from_resolved(config.resolve(), layout, SystemClock) {
        Ok(generator) => {
            tracing::debug!(
                node_id = generator.node_id(),
                source = %generator.node_source(),
                "default generator initialized"
            );
            generator
        }
        Err(err) => {
            tracing::error!(error = %err, "invalid default generator settings, deriving node id from host");
            // A host-derived id is a single byte and always fits the standard layout
            let resolved = node::resolve_node_id(&config.preferred_iface);
            Generator::build(resolved, layout, SystemClock)
        }
    }
}

/// The default generator, initialized on first call
pub fn generator() -> &'static Generator {
    &DEFAULT
}

/// Generate a new ID from the default generator.
///
/// To help guarantee uniqueness keep the system clock accurate and never run
/// two nodes with the same node id.
pub fn next() -> Id {
    DEFAULT.generate()
}

/// Unix milliseconds at which `id` was created
pub fn time_of(id: Id) -> i64 {
    DEFAULT.time_of(id)
}

pub fn node_id_of(id: Id) -> i64 {
    DEFAULT.node_id_of(id)
}

pub fn step_of(id: Id) -> i64 {
    DEFAULT.step_of(id)
}

pub fn epoch() -> i64 {
    DEFAULT.epoch()
}

pub fn node_id() -> i64 {
    DEFAULT.node_id()
}

pub fn node_source() -> NodeIdSource {
    DEFAULT.node_source()
}

/// Sequence of the most recently issued ID
pub fn step() -> i64 {
    DEFAULT.step()
}

/// Unix milliseconds of the most recently issued ID
pub fn last_time() -> i64 {
    DEFAULT.last_timestamp()
}

pub fn layout() -> Layout {
    *DEFAULT.layout()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_from_lookup() {
        let config = GlobalConfig::from_lookup(lookup(&[(NODE_ID_ENV, " 17 "), (IFACE_ENV, "bond0")]));
        assert_eq!(config.node_id, Some(17));
        assert_eq!(config.preferred_iface, "bond0");
    }

    #[test]
    fn test_config_ignores_invalid_node_id() {
        let config = GlobalConfig::from_lookup(lookup(&[(NODE_ID_ENV, "seventeen")]));
        assert_eq!(config, GlobalConfig::default());
    }

    #[test]
    fn test_init_with_explicit_node_id() {
        let generator = init(&GlobalConfig {
            node_id: Some(513),
            preferred_iface: String::new(),
        });
        assert_eq!(generator.node_id(), 513);
        assert_eq!(generator.node_source(), NodeIdSource::Explicit);
        assert_eq!(generator.node_id_of(generator.generate()), 513);
    }

    #[test]
    fn test_init_with_out_of_range_node_id_uses_host() {
        let generator = init(&GlobalConfig {
            node_id: Some(4096),
            preferred_iface: String::new(),
        });
        assert_ne!(generator.node_source(), NodeIdSource::Explicit);
        assert!((0..=255).contains(&generator.node_id()));
    }

    #[test]
    fn test_default_instance_is_consistent() {
        let id = next();
        assert_eq!(node_id_of(id), node_id());
        assert!(time_of(id) >= epoch());
        assert!(last_time() >= time_of(id));
        assert_eq!(layout(), Layout::standard());
        assert!(std::ptr::eq(generator(), generator()));
    }
}
