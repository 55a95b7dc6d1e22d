use std::{marker::PhantomData, sync::Arc};

use alloy::{
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::{client::ClientBuilder, types::TransactionRequest},
    sol,
    sol_types::SolCall,
    transports::{
        http::Http,
        layers::{RetryBackoffLayer, RetryBackoffService},
        Transport,
    },
};
use async_trait::async_trait;
use rand::{seq::SliceRandom, thread_rng};
use reqwest::Client;

use RivalzClaim::claimCall;

use crate::chain::{Account, ClaimContract, ClaimReceipt};

sol! {
    #[sol(rpc)]
    contract RivalzClaim {
        function claim() external;
        function claimableAmount(address account) external view returns (uint256);
        function sNextClaims(address account) external view returns (uint256);
    }
}

/// Transport of every provider built by [`init_providers`].
pub type RpcTransport = RetryBackoffService<Http<Client>>;

pub fn init_providers(rpc_urls: &[String]) -> eyre::Result<Vec<Arc<impl Provider<RpcTransport>>>> {
    let retry_layer = RetryBackoffLayer::new(10, 2, 500);

    rpc_urls
        .iter()
        .map(|rpc_url| -> eyre::Result<_> {
            let client = ClientBuilder::default()
                .layer(retry_layer.clone())
                .transport(Http::<Client>::new(rpc_url.parse()?), false);

            Ok(Arc::new(
                ProviderBuilder::new()
                    .with_recommended_fillers()
                    .on_provider(RootProvider::new(client)),
            ))
        })
        .collect()
}

/// Claim contract reached over JSON-RPC, spreading calls over the configured providers.
pub struct RpcClaimContract<P, T> {
    providers: Vec<Arc<P>>,
    contract_address: Address,
    gas_limit: u64,
    chain_id: Option<u64>,
    _transport: PhantomData<fn() -> T>,
}

impl<P, T> RpcClaimContract<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    pub fn new(
        providers: Vec<Arc<P>>,
        contract_address: Address,
        gas_limit: u64,
        chain_id: Option<u64>,
    ) -> eyre::Result<Self> {
        if providers.is_empty() {
            eyre::bail!("At least one provider is required");
        }

        Ok(Self {
            providers,
            contract_address,
            gas_limit,
            chain_id,
            _transport: PhantomData,
        })
    }

    fn provider(&self) -> Arc<P> {
        // `new` guarantees at least one provider
        self.providers
            .choose(&mut thread_rng())
            .unwrap_or(&self.providers[0])
            .clone()
    }

    async fn send_claim(&self, provider: Arc<P>, account: &Account) -> eyre::Result<ClaimReceipt> {
        let eip1559_fees = provider.estimate_eip1559_fees(None).await?;
        let nonce = provider.get_transaction_count(account.address).await?;
        let chain_id = match self.chain_id {
            Some(chain_id) => chain_id,
            None => provider.get_chain_id().await?,
        };

        let tx_request = TransactionRequest::default()
            .with_max_fee_per_gas(eip1559_fees.max_fee_per_gas)
            .with_max_priority_fee_per_gas(eip1559_fees.max_priority_fee_per_gas)
            .with_to(self.contract_address)
            .with_value(U256::ZERO)
            .with_input(claimCall {}.abi_encode())
            .with_gas_limit(self.gas_limit.into())
            .with_nonce(nonce)
            .with_chain_id(chain_id)
            .with_from(account.address);

        let signed_transaction = tx_request.build(account.wallet.as_ref()).await?;
        let pending_tx = provider.send_tx_envelope(signed_transaction).await?;
        let receipt = pending_tx.get_receipt().await?;

        if !receipt.status() {
            eyre::bail!("Transaction {} reverted", receipt.transaction_hash);
        }

        Ok(ClaimReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl<P, T> ClaimContract for RpcClaimContract<P, T>
where
    P: Provider<T, Ethereum> + 'static,
    T: Transport + Clone,
{
    async fn claimable_amount(&self, account: Address) -> eyre::Result<U256> {
        let contract_instance = RivalzClaim::new(self.contract_address, self.provider());
        let amount = contract_instance.claimableAmount(account).call().await?._0;

        Ok(amount)
    }

    async fn next_claim_at(&self, account: Address) -> eyre::Result<u64> {
        let contract_instance = RivalzClaim::new(self.contract_address, self.provider());
        let next_claim_at = contract_instance.sNextClaims(account).call().await?._0;

        Ok(next_claim_at.saturating_to::<u64>())
    }

    async fn claim(&self, account: &Account) -> eyre::Result<ClaimReceipt> {
        tracing::info!("Claiming for {}", account.address);
        self.send_claim(self.provider(), account).await
    }
}
