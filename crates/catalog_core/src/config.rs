//! Process-wide fetch strategy selection.
//!
//! # Responsibility
//! - Parse the `USE_JOIN_FETCH` switch.
//! - Pin one strategy for the lifetime of the process.
//!
//! # Invariants
//! - Once pinned, the strategy never changes.
//! - Pinning again with the same strategy is idempotent; a different one is
//!   rejected.

use log::info;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Environment variable holding the join-fetch switch.
pub const USE_JOIN_FETCH_ENV: &str = "USE_JOIN_FETCH";

static FETCH_STRATEGY: OnceCell<FetchStrategy> = OnceCell::new();

/// How item reads resolve their owning category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// One combined statement joins each item with its category.
    #[default]
    JoinFetch,
    /// Items are read alone; categories are looked up afterwards.
    Deferred,
}

impl FetchStrategy {
    /// Interprets a raw `USE_JOIN_FETCH` value.
    ///
    /// `true` in any case selects `JoinFetch`; every other value selects
    /// `Deferred`. A missing value selects the default.
    pub fn from_flag(value: Option<&str>) -> Self {
        match value {
            None => Self::default(),
            Some(raw) if raw.trim().eq_ignore_ascii_case("true") => Self::JoinFetch,
            Some(_) => Self::Deferred,
        }
    }

    /// Reads `USE_JOIN_FETCH` from the process environment.
    pub fn from_env() -> Self {
        Self::from_flag(std::env::var(USE_JOIN_FETCH_ENV).ok().as_deref())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JoinFetch => "join",
            Self::Deferred => "deferred",
        }
    }
}

impl Display for FetchStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FetchStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "join" | "join_fetch" | "inline" => Ok(Self::JoinFetch),
            "deferred" | "lazy" => Ok(Self::Deferred),
            other => Err(format!(
                "unsupported fetch strategy `{other}`; expected join|deferred"
            )),
        }
    }
}

/// Pins the process-wide fetch strategy.
///
/// # Errors
/// - Returns an error when a different strategy is already pinned.
pub fn init_fetch_strategy(strategy: FetchStrategy) -> Result<(), String> {
    let pinned = *FETCH_STRATEGY.get_or_init(|| {
        info!("event=config_init module=config status=ok fetch_strategy={strategy}");
        strategy
    });
    if pinned != strategy {
        return Err(format!(
            "fetch strategy already pinned to `{pinned}`; refusing to switch to `{strategy}`"
        ));
    }
    Ok(())
}

/// Returns the pinned strategy, pinning it from the environment on first use.
pub fn fetch_strategy() -> FetchStrategy {
    *FETCH_STRATEGY.get_or_init(|| {
        let strategy = FetchStrategy::from_env();
        info!("event=config_init module=config status=ok source=env fetch_strategy={strategy}");
        strategy
    })
}

#[cfg(test)]
mod tests {
    use super::{fetch_strategy, init_fetch_strategy, FetchStrategy};

    #[test]
    fn flag_parsing_matches_case_insensitive_true() {
        assert_eq!(FetchStrategy::from_flag(None), FetchStrategy::JoinFetch);
        assert_eq!(
            FetchStrategy::from_flag(Some("TRUE")),
            FetchStrategy::JoinFetch
        );
        assert_eq!(
            FetchStrategy::from_flag(Some("false")),
            FetchStrategy::Deferred
        );
        assert_eq!(FetchStrategy::from_flag(Some("1")), FetchStrategy::Deferred);
    }

    #[test]
    fn strategy_names_parse() {
        assert_eq!("join".parse::<FetchStrategy>(), Ok(FetchStrategy::JoinFetch));
        assert_eq!(" Deferred ".parse::<FetchStrategy>(), Ok(FetchStrategy::Deferred));
        assert!("eager".parse::<FetchStrategy>().is_err());
    }

    #[test]
    fn pinned_strategy_is_stable() {
        let pinned = fetch_strategy();
        init_fetch_strategy(pinned).expect("same strategy should be idempotent");
        let other = match pinned {
            FetchStrategy::JoinFetch => FetchStrategy::Deferred,
            FetchStrategy::Deferred => FetchStrategy::JoinFetch,
        };
        let error = init_fetch_strategy(other).expect_err("switching must fail");
        assert!(error.contains("refusing to switch"));
        assert_eq!(fetch_strategy(), pinned);
    }
}
