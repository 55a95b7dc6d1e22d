use std::{path::Path, time::Duration};

use alloy::primitives::Address;
use serde::Deserialize;

use crate::{
    constants::{CLAIM_CONTRACT_ADDRESS, CONFIG_FILE_PATH, DEFAULT_GAS_LIMIT},
    policy::{ClaimPolicy, CycleDelay, ZeroBalance},
};

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    pub rpc_urls: Vec<String>,
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default = "default_claim_contract")]
    pub claim_contract: Address,
    #[serde(default)]
    pub explorer_url: Option<String>,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default)]
    pub policy: ClaimPolicy,
    #[serde(default)]
    pub on_zero_balance: ZeroBalance,
    #[serde(default)]
    pub cycle_delay: CycleDelay,
    #[serde(default = "default_tx_delay")]
    pub tx_delay_secs: u64,
    #[serde(default = "default_post_claim_delay")]
    pub post_claim_delay_secs: u64,
    #[serde(default = "default_read_failure_delay")]
    pub read_failure_delay_secs: u64,
    #[serde(default = "default_badge_ids")]
    pub badge_ids: Vec<u32>,
    #[serde(default = "default_badge_answer")]
    pub badge_answer: String,
}

/// Everything the claim loop needs to decide what to do and how long to wait.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    pub policy: ClaimPolicy,
    pub on_zero_balance: ZeroBalance,
    pub cycle_delay: CycleDelay,
    pub tx_delay_secs: u64,
    pub post_claim_delay_secs: u64,
    pub read_failure_delay_secs: u64,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            policy: ClaimPolicy::default(),
            on_zero_balance: ZeroBalance::default(),
            cycle_delay: CycleDelay::default(),
            tx_delay_secs: default_tx_delay(),
            post_claim_delay_secs: default_post_claim_delay(),
            read_failure_delay_secs: default_read_failure_delay(),
        }
    }
}

impl Schedule {
    pub fn tx_delay(&self) -> Duration {
        Duration::from_secs(self.tx_delay_secs)
    }

    pub fn post_claim_delay(&self) -> Duration {
        Duration::from_secs(self.post_claim_delay_secs)
    }

    pub fn read_failure_delay(&self) -> Duration {
        Duration::from_secs(self.read_failure_delay_secs)
    }
}

fn default_claim_contract() -> Address {
    CLAIM_CONTRACT_ADDRESS
}

fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

fn default_log_dir() -> String {
    "data".to_string()
}

fn default_tx_delay() -> u64 {
    5
}

fn default_post_claim_delay() -> u64 {
    10
}

fn default_read_failure_delay() -> u64 {
    60
}

fn default_badge_ids() -> Vec<u32> {
    vec![9, 8]
}

fn default_badge_answer() -> String {
    "7/DEPIN202409109049ZNODEAGENTsteganography".to_string()
}

impl Config {
    pub fn from_toml(cfg_str: &str) -> eyre::Result<Self> {
        let config: Self = toml::from_str(cfg_str)?;
        config.validate()?;
        Ok(config)
    }

    async fn read_from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let cfg_str = tokio::fs::read_to_string(path).await?;
        Self::from_toml(&cfg_str)
    }

    pub async fn read_default() -> eyre::Result<Self> {
        use eyre::WrapErr;

        Self::read_from_file(CONFIG_FILE_PATH)
            .await
            .wrap_err_with(|| format!("Failed to load config from {CONFIG_FILE_PATH}"))
    }

    pub fn schedule(&self) -> Schedule {
        Schedule {
            policy: self.policy,
            on_zero_balance: self.on_zero_balance,
            cycle_delay: self.cycle_delay,
            tx_delay_secs: self.tx_delay_secs,
            post_claim_delay_secs: self.post_claim_delay_secs,
            read_failure_delay_secs: self.read_failure_delay_secs,
        }
    }

    fn validate(&self) -> eyre::Result<()> {
        if self.rpc_urls.is_empty() {
            eyre::bail!("RPC_URLS must contain at least one endpoint");
        }

        if let ClaimPolicy::BalanceCapped { units_per_tx: 0 } = self.policy {
            eyre::bail!("POLICY.UNITS_PER_TX must be greater than zero");
        }

        if self.policy == ClaimPolicy::BadgeSequence && self.cycle_delay == CycleDelay::NextClaim {
            eyre::bail!("POLICY.KIND = \"badge-sequence\" requires CYCLE_DELAY.KIND = \"fixed\"");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_toml(r#"RPC_URLS = ["http://localhost:8545"]"#).unwrap();

        assert_eq!(config.claim_contract, CLAIM_CONTRACT_ADDRESS);
        assert_eq!(config.gas_limit, 300_000);
        assert_eq!(config.schedule(), Schedule::default());
        assert_eq!(config.badge_ids, vec![9, 8]);
        assert!(config.chain_id.is_none());
    }

    #[test]
    fn parses_policy_and_cycle_tables() {
        let config = Config::from_toml(
            r#"
            RPC_URLS = ["http://localhost:8545"]
            ON_ZERO_BALANCE = "recheck"
            TX_DELAY_SECS = 1

            [POLICY]
            KIND = "fixed-count"
            COUNT = 20

            [CYCLE_DELAY]
            KIND = "fixed"
            SECS = 43200
            "#,
        )
        .unwrap();

        assert_eq!(config.policy, ClaimPolicy::FixedCount { count: 20 });
        assert_eq!(config.cycle_delay, CycleDelay::Fixed { secs: 43200 });
        assert_eq!(config.on_zero_balance, ZeroBalance::Recheck);
        assert_eq!(config.schedule().tx_delay(), Duration::from_secs(1));
    }

    #[test]
    fn rejects_zero_units_per_tx() {
        let err = Config::from_toml(
            r#"
            RPC_URLS = ["http://localhost:8545"]
            POLICY = { KIND = "balance-capped", UNITS_PER_TX = 0 }
            "#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("UNITS_PER_TX"));
    }

    #[test]
    fn badge_sequence_needs_fixed_cycle_delay() {
        let err = Config::from_toml(
            r#"
            RPC_URLS = ["http://localhost:8545"]
            POLICY = { KIND = "badge-sequence" }
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("CYCLE_DELAY"));

        let config = Config::from_toml(
            r#"
            RPC_URLS = ["http://localhost:8545"]
            POLICY = { KIND = "badge-sequence" }
            CYCLE_DELAY = { KIND = "fixed", SECS = 86400 }
            "#,
        )
        .unwrap();
        assert_eq!(config.policy, ClaimPolicy::BadgeSequence);
    }

    #[test]
    fn rejects_empty_rpc_list() {
        assert!(Config::from_toml("RPC_URLS = []").is_err());
    }
}
