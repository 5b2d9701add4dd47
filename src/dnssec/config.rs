//! `ValidatorConfig`: the single knob the validator reads from the
//! `HashMap<String, String>` configuration map (§6, §9).

use std::collections::HashMap;

use crate::error::{Result, SentrySecError};

use super::verifier::DEFAULT_MAX_VALIDATE_RRSIGS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    pub max_validate_rrsigs: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_validate_rrsigs: DEFAULT_MAX_VALIDATE_RRSIGS,
        }
    }
}

impl ValidatorConfig {
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = map.get("dnsjava.dnssec.max_validate_rrsigs") {
            config.max_validate_rrsigs =
                raw.parse().map_err(|_| SentrySecError::InvalidConfigValue {
                    key: "dnsjava.dnssec.max_validate_rrsigs".to_string(),
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
    fn default_matches_spec() {
        assert_eq!(ValidatorConfig::default().max_validate_rrsigs, 8);
    }

    #[test]
    fn parses_override() {
        let mut map = HashMap::new();
        map.insert(
            "dnsjava.dnssec.max_validate_rrsigs".to_string(),
            "16".to_string(),
        );
        let config = ValidatorConfig::from_map(&map).unwrap();
        assert_eq!(config.max_validate_rrsigs, 16);
    }

    #[test]
    fn rejects_unparsable_value() {
        let mut map = HashMap::new();
        map.insert(
            "dnsjava.dnssec.max_validate_rrsigs".to_string(),
            "eight".to_string(),
        );
        assert!(ValidatorConfig::from_map(&map).is_err());
    }
}
