//! Graph configuration.
//!
//! Chosen once when the graph is built and never changed afterwards.
//!
//! ```rust
//! use circuit_graph::{Graph, GraphConfig};
//!
//! let config = GraphConfig::from_json(r#"{ "auto_ascend": false }"#).unwrap();
//! assert_eq!(config.net_name_limit, 255);
//! let graph = Graph::with_config(config);
//! assert!(!graph.config().auto_ascend);
//! ```

use serde::{Deserialize, Serialize};

use crate::Result;

/// Longest net name downstream netlist tools accept.
pub const DEFAULT_NET_NAME_LIMIT: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Connect two parent interfaces once every one of their children is
    /// pairwise connected.
    pub auto_ascend: bool,

    /// Net names longer than this are truncated and end in `"..."`.
    pub net_name_limit: usize,

    /// Attach `has_single_end_partner` to every new two-ended direct link.
    pub single_end_partner: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            auto_ascend: true,
            net_name_limit: DEFAULT_NET_NAME_LIMIT,
            single_end_partner: true,
        }
    }
}

impl GraphConfig {
    /// Parse a configuration; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::default();
        assert!(config.auto_ascend);
        assert!(config.single_end_partner);
        assert_eq!(config.net_name_limit, 255);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GraphConfig::from_json(r#"{ "net_name_limit": 32 }"#).unwrap();
        assert_eq!(config.net_name_limit, 32);
        assert!(config.auto_ascend);
    }

    #[test]
    fn test_json_round_trip() {
        let config = GraphConfig {
            auto_ascend: false,
            net_name_limit: 64,
            single_end_partner: false,
        };
        let parsed = GraphConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(GraphConfig::from_json("{ not json").is_err());
    }
}
