use std::{sync::Arc, time::Duration};

use alloy::primitives::{TxHash, U256};

use crate::{
    chain::{Account, ChainClient, ClaimContract, Outcome},
    clock::Clock,
    config::Schedule,
    logger::Journal,
    notifier::Notifier,
    policy::{ClaimPolicy, CycleDelay, ZeroBalance},
};

/// Where a wallet is within one pass of the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Check,
    Claim { attempts: u64 },
    Wait { delay: Duration, then: AfterWait },
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AfterWait {
    Check,
    Done,
}

pub struct ClaimLoop<C, N> {
    accounts: Vec<Account>,
    chain: ChainClient<C>,
    notifier: N,
    journal: Arc<dyn Journal>,
    clock: Arc<dyn Clock>,
    schedule: Schedule,
    explorer_url: Option<String>,
}

impl<C, N> ClaimLoop<C, N>
where
    C: ClaimContract,
    N: Notifier,
{
    pub fn new(
        accounts: Vec<Account>,
        chain: ChainClient<C>,
        notifier: N,
        journal: Arc<dyn Journal>,
        clock: Arc<dyn Clock>,
        schedule: Schedule,
        explorer_url: Option<String>,
    ) -> Self {
        Self {
            accounts,
            chain,
            notifier,
            journal,
            clock,
            schedule,
            explorer_url,
        }
    }

    /// Runs until the process is killed.
    pub async fn run(&self) {
        loop {
            self.run_cycle().await;
        }
    }

    /// Processes every wallet once, in order, then performs the inter-cycle wait.
    pub async fn run_cycle(&self) {
        for (i, account) in self.accounts.iter().enumerate() {
            tracing::info!(
                "Processing wallet {}/{}: {}",
                i + 1,
                self.accounts.len(),
                account.address
            );

            // Chain and HTTP failures are downgraded below this point, a wallet never aborts the cycle
            self.process_account(account).await;
        }

        let delay = self.cycle_delay().await;
        self.journal.record(
            "WAIT",
            &format!("Waiting for {} seconds until the next claim", delay.as_secs()),
        );
        self.clock.sleep(delay).await;
    }

    async fn process_account(&self, account: &Account) {
        let mut stage = Stage::Check;

        loop {
            stage = match stage {
                Stage::Check => self.check(account).await,
                Stage::Claim { attempts } => {
                    match self.schedule.policy {
                        ClaimPolicy::BadgeSequence => {
                            self.notifier.claim_badges(account.address).await;
                        }
                        _ => self.claim(account, attempts).await,
                    }
                    self.notifier.report_points(account.address).await;
                    Stage::Done
                }
                Stage::Wait { delay, then } => {
                    self.journal.record(
                        "WAIT",
                        &format!(
                            "No tokens available to claim for {}. Waiting for {} seconds",
                            account.address,
                            delay.as_secs()
                        ),
                    );
                    self.clock.sleep(delay).await;

                    match then {
                        AfterWait::Check => Stage::Check,
                        AfterWait::Done => Stage::Done,
                    }
                }
                Stage::Done => return,
            };
        }
    }

    async fn check(&self, account: &Account) -> Stage {
        let claimable = if self.schedule.policy.reads_balance() {
            self.chain
                .claimable_amount(account.address)
                .await
                .value_or(U256::ZERO)
        } else {
            U256::ZERO
        };

        match self.schedule.policy.attempts_for(claimable) {
            Some(0) => {
                let delay = self.next_claim_delay(account).await;

                match self.schedule.on_zero_balance {
                    ZeroBalance::Advance => Stage::Wait {
                        delay,
                        then: AfterWait::Done,
                    },
                    // an already-eligible wallet with nothing to claim would re-check without pause
                    ZeroBalance::Recheck => Stage::Wait {
                        delay: if delay.is_zero() {
                            self.schedule.read_failure_delay()
                        } else {
                            delay
                        },
                        then: AfterWait::Check,
                    },
                }
            }
            Some(attempts) => {
                tracing::info!("Claimable amount available: {claimable}, {attempts} claim(s) planned");
                Stage::Claim { attempts }
            }
            None => Stage::Claim { attempts: 0 },
        }
    }

    async fn claim(&self, account: &Account, attempts: u64) {
        for attempt in 1..=attempts {
            self.clock.sleep(self.schedule.tx_delay()).await;

            match self.chain.submit_claim(account).await {
                Outcome::Success(receipt) => {
                    self.journal.record(
                        "CLAIMED",
                        &format!(
                            "Transaction confirmed in block {}: {}",
                            receipt.block_number,
                            self.tx_link(receipt.tx_hash)
                        ),
                    );
                    self.clock.sleep(self.schedule.post_claim_delay()).await;
                    self.notifier
                        .sync_claim(account.address, receipt.tx_hash)
                        .await;
                }
                Outcome::Unavailable(reason) | Outcome::Failed(reason) => {
                    self.journal.record(
                        "CLAIM FAILED",
                        &format!("Attempt {attempt}/{attempts} for {}: {reason}", account.address),
                    );
                }
            }
        }
    }

    async fn next_claim_delay(&self, account: &Account) -> Duration {
        self.chain
            .next_claim_delay(account.address)
            .await
            .value_or(self.schedule.read_failure_delay())
    }

    async fn cycle_delay(&self) -> Duration {
        match self.schedule.cycle_delay {
            CycleDelay::Fixed { secs } => Duration::from_secs(secs),
            CycleDelay::NextClaim => match self.accounts.first() {
                Some(account) => self.next_claim_delay(account).await,
                None => self.schedule.read_failure_delay(),
            },
        }
    }

    fn tx_link(&self, tx_hash: TxHash) -> String {
        match &self.explorer_url {
            Some(explorer_url) => format!("{}/tx/{tx_hash}", explorer_url.trim_end_matches('/')),
            None => tx_hash.to_string(),
        }
    }
}
