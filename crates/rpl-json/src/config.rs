use rpl_binary::BinaryConfig;
use rpl_ledger::UnknownTypePolicy;
use serde::{Deserialize, Serialize};

use crate::error::BridgeResult;

/// Settings for the JSON bridge.
///
/// ```toml
/// unknown_types = "preserve"
///
/// [binary]
/// max_message_size = 1048576
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// What to do with transaction and entry type names that are not
    /// registered.
    pub unknown_types: UnknownTypePolicy,
    /// Size and nesting limits. `max_message_size` also bounds JSON text.
    pub binary: BinaryConfig,
}

impl BridgeConfig {
    /// Parse a TOML document; absent keys keep their defaults.
    pub fn from_toml_str(text: &str) -> BridgeResult<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpl_binary::config::DEFAULT_MAX_NESTING_DEPTH;
    use rpl_types::ErrorKind;

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(BridgeConfig::from_toml_str("").unwrap(), BridgeConfig::default());
    }

    #[test]
    fn toml_overrides() {
        let config = BridgeConfig::from_toml_str(
            r#"
            unknown_types = "preserve"

            [binary]
            max_message_size = 1048576
            "#,
        )
        .unwrap();
        assert_eq!(config.unknown_types, UnknownTypePolicy::Preserve);
        assert_eq!(config.binary.max_message_size, 1 << 20);
        assert_eq!(config.binary.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
    }

    #[test]
    fn bad_policy_is_rejected() {
        let err = BridgeConfig::from_toml_str("unknown_types = \"ignore\"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }
}
