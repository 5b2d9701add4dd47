//! `ResolverConfig`: the knobs named in §4.6, read once from a
//! `HashMap<String, String>` at startup.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{Result, SentrySecError};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResolverConfig {
    pub timeout: Duration,
    pub retries_per_resolver: u32,
    pub load_balance: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries_per_resolver: 3,
            load_balance: false,
        }
    }
}

impl ResolverConfig {
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = map.get("resolver.timeout_secs") {
            let secs: u64 = raw.parse().map_err(|_| SentrySecError::InvalidConfigValue {
                key: "resolver.timeout_secs".to_string(),
                value: raw.clone(),
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = map.get("resolver.retries_per_resolver") {
            config.retries_per_resolver =
                raw.parse().map_err(|_| SentrySecError::InvalidConfigValue {
                    key: "resolver.retries_per_resolver".to_string(),
                    value: raw.clone(),
                })?;
        }

        if let Some(raw) = map.get("resolver.load_balance") {
            config.load_balance = raw.parse().map_err(|_| SentrySecError::InvalidConfigValue {
                key: "resolver.load_balance".to_string(),
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = ResolverConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.retries_per_resolver, 3);
        assert!(!config.load_balance);
    }

    #[test]
    fn parses_overrides_from_string_map() {
        let mut map = HashMap::new();
        map.insert("resolver.timeout_secs".to_string(), "5".to_string());
        map.insert("resolver.load_balance".to_string(), "true".to_string());

        let config = ResolverConfig::from_map(&map).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.load_balance);
        assert_eq!(config.retries_per_resolver, 3);
    }

    #[test]
    fn rejects_unparsable_value() {
        let mut map = HashMap::new();
        map.insert("resolver.retries_per_resolver".to_string(), "many".to_string());
        assert!(ResolverConfig::from_map(&map).is_err());
    }
}
