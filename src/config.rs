//! Resolver configuration.
//!
//! Options are fixed when the provider is built. They can be set in code,
//! read from the environment, or (with the `config` feature) parsed from JSON.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};

/// Environment variable selecting [`SingletonSharing`].
pub const ENV_SINGLETON_SHARING: &str = "FERROUS_WIRE_SINGLETON_SHARING";
/// Environment variable overriding [`ResolverOptions::max_depth`].
pub const ENV_MAX_DEPTH: &str = "FERROUS_WIRE_MAX_DEPTH";

const DEFAULT_MAX_DEPTH: usize = 1024;

/// How singleton instances are keyed in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum SingletonSharing {
    /// One instance per `(contract, registration position)`.
    ///
    /// The same implementation registered under two contracts yields two
    /// independent singletons.
    #[default]
    PerContract,
    /// One instance per implementation type.
    ///
    /// Every contract served by the same implementation type shares a single
    /// instance. Once cached, that instance is also returned for per-request
    /// registrations of the implementation.
    PerImplementation,
}

impl std::str::FromStr for SingletonSharing {
    type Err = DiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-contract" | "contract" => Ok(SingletonSharing::PerContract),
            "per-implementation" | "implementation" => Ok(SingletonSharing::PerImplementation),
            other => Err(DiError::InvalidOptions(format!(
                "unknown singleton sharing '{other}', expected per-contract or per-implementation"
            ))),
        }
    }
}

/// Options applied to a [`ServiceProvider`](crate::ServiceProvider).
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{ResolverOptions, SingletonSharing};
///
/// let options = ResolverOptions::new()
///     .singleton_sharing(SingletonSharing::PerImplementation)
///     .max_depth(64);
///
/// assert_eq!(options.sharing(), SingletonSharing::PerImplementation);
/// assert_eq!(options.depth_limit(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ResolverOptions {
    singleton_sharing: SingletonSharing,
    max_depth: usize,
}

impl ResolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton_sharing(mut self, sharing: SingletonSharing) -> Self {
        self.singleton_sharing = sharing;
        self
    }

    /// Maximum number of nested resolutions in one call.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    pub fn sharing(&self) -> SingletonSharing {
        self.singleton_sharing
    }

    pub fn depth_limit(&self) -> usize {
        self.max_depth
    }

    /// Defaults overridden by `FERROUS_WIRE_SINGLETON_SHARING` and `FERROUS_WIRE_MAX_DEPTH`.
    pub fn from_env() -> DiResult<Self> {
        let mut options = Self::default();
        if let Ok(value) = env::var(ENV_SINGLETON_SHARING) {
            options.singleton_sharing = value.parse()?;
        }
        if let Ok(value) = env::var(ENV_MAX_DEPTH) {
            let depth = value
                .trim()
                .parse::<usize>()
                .map_err(|e| DiError::InvalidOptions(format!("{ENV_MAX_DEPTH}: {e}")))?;
            options = options.max_depth(depth);
        }
        Ok(options)
    }

    /// Parses options from JSON; missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> DiResult<Self> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| DiError::InvalidOptions(e.to_string()))?;
        let depth = options.max_depth;
        Ok(options.max_depth(depth))
    }
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            singleton_sharing: SingletonSharing::PerContract,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ResolverOptions::default();
        assert_eq!(options.sharing(), SingletonSharing::PerContract);
        assert_eq!(options.depth_limit(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn zero_depth_is_clamped() {
        assert_eq!(ResolverOptions::new().max_depth(0).depth_limit(), 1);
    }

    #[test]
    fn sharing_parses_both_spellings() {
        assert_eq!("per-implementation".parse::<SingletonSharing>().unwrap(), SingletonSharing::PerImplementation);
        assert_eq!(" Contract ".parse::<SingletonSharing>().unwrap(), SingletonSharing::PerContract);
        assert!("global".parse::<SingletonSharing>().is_err());
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_keeps_missing_fields_at_default() {
        let options = ResolverOptions::from_json(r#"{ "singleton_sharing": "per-implementation" }"#).unwrap();
        assert_eq!(options.sharing(), SingletonSharing::PerImplementation);
        assert_eq!(options.depth_limit(), DEFAULT_MAX_DEPTH);
    }
}
