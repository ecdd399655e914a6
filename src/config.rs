// Navigator configuration
//
// Settings are plain data with defaults so editors can send a partial JSON
// object and get sensible behavior for everything they leave out.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Lines scanned after a sub declaration for `@_` unpacking idioms
    pub signature_lookahead_lines: usize,
    /// Lifecycle hooks tried when `X->new` has no direct definition
    pub constructor_synonyms: Vec<String>,
    /// Imports that enable web route recognition
    pub web_framework_modules: Vec<String>,
    /// Total symbols kept across all cached documents
    pub max_cached_symbols: usize,
    /// Quiet period after the last edit before a re-scan runs
    pub rescan_quiet_interval_ms: u64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            signature_lookahead_lines: 4,
            constructor_synonyms: vec!["_init".to_string(), "BUILD".to_string()],
            web_framework_modules: vec![
                "Dancer".to_string(),
                "Dancer2".to_string(),
                "Mojolicious::Lite".to_string(),
            ],
            max_cached_symbols: 100_000,
            rescan_quiet_interval_ms: 500,
        }
    }
}

impl NavigatorConfig {
    /// Parse settings from a JSON object; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn rescan_quiet_interval(&self) -> Duration {
        Duration::from_millis(self.rescan_quiet_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NavigatorError;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            NavigatorConfig::from_json_str(r#"{"signature_lookahead_lines": 2}"#).unwrap();
        assert_eq!(config.signature_lookahead_lines, 2);
        assert_eq!(config.constructor_synonyms, vec!["_init", "BUILD"]);
        assert_eq!(config.max_cached_symbols, 100_000);
        assert_eq!(config.rescan_quiet_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_malformed_json_is_a_config_error() {
        let err = NavigatorConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, NavigatorError::Config(_)));
    }
}
