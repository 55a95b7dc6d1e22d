use std::{fmt, sync::Arc, time::Duration};

use alloy::{
    network::EthereumWallet,
    primitives::{Address, TxHash, U256},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;

use crate::clock::Clock;

#[derive(Clone)]
pub struct Account {
    pub wallet: Arc<EthereumWallet>,
    pub address: Address,
}

impl Account {
    pub fn new(signer: PrivateKeySigner) -> Self {
        let address = signer.address();
        Self {
            wallet: Arc::new(EthereumWallet::new(signer)),
            address,
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
}

/// Raw access to the claim contract. Every failure is an error here;
/// [`ChainClient`] decides how errors degrade.
#[async_trait]
pub trait ClaimContract: Send + Sync {
    async fn claimable_amount(&self, account: Address) -> eyre::Result<U256>;

    /// Unix timestamp from which the account may claim again.
    async fn next_claim_at(&self, account: Address) -> eyre::Result<u64>;

    /// Sends `claim()` and waits for one confirmation. A reverted transaction is an error.
    async fn claim(&self, account: &Account) -> eyre::Result<ClaimReceipt>;
}

/// Result of a chain interaction that never aborts the loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    /// A read failed; the value is unknown.
    Unavailable(String),
    /// A write failed or reverted.
    Failed(String),
}

impl<T> Outcome<T> {
    /// Collapses failures into `default`, the way the bot treats them in production.
    pub fn value_or(self, default: T) -> T {
        match self {
            Self::Success(value) => value,
            Self::Unavailable(_) | Self::Failed(_) => default,
        }
    }
}

pub struct ChainClient<C> {
    contract: C,
    clock: Arc<dyn Clock>,
}

impl<C: ClaimContract> ChainClient<C> {
    pub fn new(contract: C, clock: Arc<dyn Clock>) -> Self {
        Self { contract, clock }
    }

    pub async fn claimable_amount(&self, account: Address) -> Outcome<U256> {
        match self.contract.claimable_amount(account).await {
            Ok(amount) => {
                tracing::info!("Claimable amount for {account}: {amount}");
                Outcome::Success(amount)
            }
            Err(e) => {
                tracing::error!("Error fetching claimableAmount for {account}: {e}");
                Outcome::Unavailable(e.to_string())
            }
        }
    }

    /// Time left until the account is eligible again, zero when it already is.
    pub async fn next_claim_delay(&self, account: Address) -> Outcome<Duration> {
        match self.contract.next_claim_at(account).await {
            Ok(next_claim_at) => {
                let delay = Duration::from_secs(next_claim_at.saturating_sub(self.clock.now()));
                tracing::info!("Next claim delay for {account}: {} seconds", delay.as_secs());
                Outcome::Success(delay)
            }
            Err(e) => {
                tracing::error!("Error fetching sNextClaims for {account}: {e}");
                Outcome::Unavailable(e.to_string())
            }
        }
    }

    pub async fn submit_claim(&self, account: &Account) -> Outcome<ClaimReceipt> {
        match self.contract.claim(account).await {
            Ok(receipt) => Outcome::Success(receipt),
            Err(e) => {
                tracing::error!("Error executing claim for {}: {e}", account.address);
                Outcome::Failed(e.to_string())
            }
        }
    }
}
