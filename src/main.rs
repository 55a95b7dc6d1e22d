use std::sync::Arc;

use chain::ChainClient;
use claimer::ClaimLoop;
use clock::{Clock, SystemClock};
use config::Config;
use contract::{init_providers, RpcClaimContract, RpcTransport};
use logger::{init_logger, Journal, TracingJournal};
use notifier::HttpNotifier;
use utils::read_default_credentials;

mod chain;
mod claimer;
mod clock;
mod config;
mod constants;
mod contract;
mod logger;
#[cfg(test)]
mod mock;
mod notifier;
mod policy;
mod utils;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let config = Config::read_default().await?;

    let _guard = init_logger(&config.log_dir)?;

    let (accounts, bearer_token) = read_default_credentials().await?;
    tracing::info!("Loaded {} wallet(s)", accounts.len());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let journal: Arc<dyn Journal> = Arc::new(TracingJournal);

    let providers = init_providers(&config.rpc_urls)?;
    let contract = RpcClaimContract::<_, RpcTransport>::new(
        providers,
        config.claim_contract,
        config.gas_limit,
        config.chain_id,
    )?;

    let notifier = HttpNotifier::new(
        &bearer_token,
        config.proxy.as_deref(),
        config.badge_answer.clone(),
        config.badge_ids.clone(),
        journal.clone(),
        clock.clone(),
    )?;

    let claim_loop = ClaimLoop::new(
        accounts,
        ChainClient::new(contract, clock.clone()),
        notifier,
        journal,
        clock,
        config.schedule(),
        config.explorer_url.clone(),
    );

    claim_loop.run().await;

    Ok(())
}
