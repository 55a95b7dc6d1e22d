use alloy::primitives::U256;
use serde::Deserialize;

/// How many claim transactions a wallet gets per cycle.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "KIND", rename_all = "kebab-case")]
pub enum ClaimPolicy {
    /// Reads the claimable balance and sends `floor(claimable / units_per_tx)` claims.
    BalanceCapped {
        #[serde(rename = "UNITS_PER_TX")]
        units_per_tx: u64,
    },
    /// Sends `count` claims without looking at the balance; the contract rejects extras.
    FixedCount {
        #[serde(rename = "COUNT")]
        count: u64,
    },
    /// No chain writes, only the off-chain badge requests. Needs a fixed `CYCLE_DELAY`,
    /// every cycle posts all badge claims again.
    BadgeSequence,
}

impl Default for ClaimPolicy {
    fn default() -> Self {
        Self::BalanceCapped { units_per_tx: 1 }
    }
}

impl ClaimPolicy {
    pub fn reads_balance(&self) -> bool {
        matches!(self, Self::BalanceCapped { .. })
    }

    /// Number of attempts allowed for a claimable balance. `None` for the badge flow.
    pub fn attempts_for(&self, claimable: U256) -> Option<u64> {
        match *self {
            Self::BalanceCapped { units_per_tx } => {
                let attempts = claimable / U256::from(units_per_tx.max(1));
                Some(attempts.saturating_to::<u64>())
            }
            Self::FixedCount { count } => Some(count),
            Self::BadgeSequence => None,
        }
    }
}

/// What happens to a wallet with nothing claimable once its wait is over.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ZeroBalance {
    #[default]
    Advance,
    Recheck,
}

/// Wait inserted after every wallet has been processed.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(tag = "KIND", rename_all = "kebab-case")]
pub enum CycleDelay {
    /// Next-eligible delay of the first wallet.
    #[default]
    NextClaim,
    Fixed {
        #[serde(rename = "SECS")]
        secs: u64,
    },
}
