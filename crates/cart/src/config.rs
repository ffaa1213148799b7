//! Cart engine configuration.

use poscart_core::{DomainError, DomainResult};

pub const ENV_CLAMP_DIRECT_EDITS: &str = "POSCART_CLAMP_DIRECT_EDITS";
pub const ENV_HEAL_VARIANT_IDENTITY: &str = "POSCART_HEAL_VARIANT_IDENTITY";

/// Reconciliation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartConfig {
    /// Clamp quantities set through `set_quantity`/`update_line` to the
    /// line's stock ceiling. Off by default: only merges are clamped, and
    /// cashiers may override the displayed stock hint by hand.
    pub clamp_direct_edits: bool,
    /// Let a variant-less line adopt the variant key of a matching candidate
    /// instead of treating the two as distinct lines. Lines loaded from a
    /// saved order may lack the key that the variant picker supplies.
    pub heal_variant_identity: bool,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            clamp_direct_edits: false,
            heal_variant_identity: true,
        }
    }
}

impl CartConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_CLAMP_DIRECT_EDITS) {
            config.clamp_direct_edits = parse_flag(ENV_CLAMP_DIRECT_EDITS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_HEAL_VARIANT_IDENTITY) {
            config.heal_variant_identity = parse_flag(ENV_HEAL_VARIANT_IDENTITY, &raw)?;
        }
        Ok(config)
    }

    pub fn with_clamp_direct_edits(mut self, enabled: bool) -> Self {
        self.clamp_direct_edits = enabled;
        self
    }

    pub fn with_heal_variant_identity(mut self, enabled: bool) -> Self {
        self.heal_variant_identity = enabled;
        self
    }
}

fn parse_flag(key: &str, raw: &str) -> DomainResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(DomainError::validation(format!(
            "{key}: expected a boolean, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_keep_merge_only_clamping() {
        let config = CartConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CartConfig::default());
        assert!(!config.clamp_direct_edits);
        assert!(config.heal_variant_identity);
    }

    #[test]
    fn flags_are_read_case_insensitively() {
        let config = CartConfig::from_lookup(lookup_from(&[
            (ENV_CLAMP_DIRECT_EDITS, "YES"),
            (ENV_HEAL_VARIANT_IDENTITY, " off "),
        ]))
        .unwrap();
        assert!(config.clamp_direct_edits);
        assert!(!config.heal_variant_identity);
    }

    #[test]
    fn malformed_flag_is_a_validation_error() {
        let err = CartConfig::from_lookup(lookup_from(&[(ENV_CLAMP_DIRECT_EDITS, "maybe")]))
            .unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains(ENV_CLAMP_DIRECT_EDITS)),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
