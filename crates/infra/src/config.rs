//! Business-rule configuration.

use serde::Deserialize;

use farmops_core::Choice;
use farmops_livestock::MortalityPolicy;

pub const MORTALITY_POLICY_VAR: &str = "FARMOPS_MORTALITY_POLICY";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// How mortality beyond the current population is handled.
    pub mortality_policy: MortalityPolicy,
}

impl CoreConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset keys keep their defaults and
    /// unparseable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(MORTALITY_POLICY_VAR) {
            match MortalityPolicy::parse(&raw) {
                Some(policy) => config.mortality_policy = policy,
                None => tracing::warn!(
                    value = %raw,
                    expected = %MortalityPolicy::expected(),
                    "{MORTALITY_POLICY_VAR} not recognised; using default"
                ),
            }
        }

        config
    }

    pub fn with_mortality_policy(mut self, policy: MortalityPolicy) -> Self {
        self.mortality_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(value: Option<&'static str>) -> impl Fn(&str) -> Option<String> {
        move |key| {
            assert_eq!(key, MORTALITY_POLICY_VAR);
            value.map(str::to_string)
        }
    }

    #[test]
    fn defaults_to_clamp() {
        assert_eq!(CoreConfig::from_lookup(lookup(None)).mortality_policy, MortalityPolicy::Clamp);
    }

    #[test]
    fn policy_is_case_insensitive() {
        let config = CoreConfig::from_lookup(lookup(Some(" Reject ")));
        assert_eq!(config.mortality_policy, MortalityPolicy::Reject);
    }

    #[test]
    fn unknown_policy_falls_back_to_default() {
        let config = CoreConfig::from_lookup(lookup(Some("explode")));
        assert_eq!(config, CoreConfig::default());
    }

    #[test]
    fn deserializes_from_partial_document() {
        let config: CoreConfig = serde_json::from_str(r#"{"mortality_policy":"reject"}"#).unwrap();
        assert_eq!(config.mortality_policy, MortalityPolicy::Reject);

        let empty: CoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, CoreConfig::default());
    }
}
