//! In-memory stand-ins for the chain, the clock, the backend and the log file.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    str::FromStr,
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy::{
    primitives::{Address, TxHash, U256},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;

use crate::{
    chain::{Account, ClaimContract, ClaimReceipt},
    clock::Clock,
    logger::Journal,
    notifier::Notifier,
};

pub fn test_account(n: u8) -> Account {
    let signer = PrivateKeySigner::from_str(&format!("{:064x}", n)).unwrap();
    Account::new(signer)
}

pub struct FakeClock {
    now: Mutex<u64>,
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub fn at(now: u64) -> Self {
        Self {
            now: Mutex::new(now),
            sleeps: Mutex::new(vec![]),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> u64 {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        *self.now.lock().unwrap() += duration.as_secs();
        self.sleeps.lock().unwrap().push(duration);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContractCall {
    ClaimableAmount(Address),
    NextClaimAt(Address),
    Claim(Address),
}

#[derive(Default)]
struct ContractState {
    claimable: HashMap<Address, VecDeque<U256>>,
    next_claim_at: HashMap<Address, u64>,
    failing_reads: HashSet<Address>,
    failing_submits: HashSet<usize>,
    submits: usize,
    calls: Vec<ContractCall>,
}

/// Contract whose answers are scripted per address. Clones share state.
#[derive(Clone, Default)]
pub struct ScriptedContract {
    state: Arc<Mutex<ContractState>>,
}

impl ScriptedContract {
    /// Successive reads return successive values; the last one repeats.
    pub fn set_claimable(&self, address: Address, values: impl IntoIterator<Item = u64>) {
        self.state.lock().unwrap().claimable.insert(
            address,
            values.into_iter().map(U256::from).collect(),
        );
    }

    pub fn set_next_claim_at(&self, address: Address, timestamp: u64) {
        self.state
            .lock()
            .unwrap()
            .next_claim_at
            .insert(address, timestamp);
    }

    pub fn fail_reads(&self, address: Address) {
        self.state.lock().unwrap().failing_reads.insert(address);
    }

    /// 1-based submit attempts, counted across all accounts, that error out.
    pub fn fail_submit_attempts(&self, attempts: impl IntoIterator<Item = usize>) {
        self.state
            .lock()
            .unwrap()
            .failing_submits
            .extend(attempts);
    }

    pub fn calls(&self) -> Vec<ContractCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn submits_for(&self, address: Address) -> usize {
        self.calls()
            .into_iter()
            .filter(|call| *call == ContractCall::Claim(address))
            .count()
    }
}

#[async_trait]
impl ClaimContract for ScriptedContract {
    async fn claimable_amount(&self, account: Address) -> eyre::Result<U256> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ContractCall::ClaimableAmount(account));

        if state.failing_reads.contains(&account) {
            eyre::bail!("execution reverted");
        }

        let values = state.claimable.entry(account).or_default();
        let value = if values.len() > 1 {
            values.pop_front()
        } else {
            values.front().copied()
        };

        Ok(value.unwrap_or_default())
    }

    async fn next_claim_at(&self, account: Address) -> eyre::Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ContractCall::NextClaimAt(account));

        if state.failing_reads.contains(&account) {
            eyre::bail!("connection refused");
        }

        Ok(state.next_claim_at.get(&account).copied().unwrap_or_default())
    }

    async fn claim(&self, account: &Account) -> eyre::Result<ClaimReceipt> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ContractCall::Claim(account.address));
        state.submits += 1;

        if state.failing_submits.contains(&state.submits) {
            eyre::bail!("transaction reverted");
        }

        Ok(ClaimReceipt {
            tx_hash: TxHash::with_last_byte(state.submits as u8),
            block_number: 100 + state.submits as u64,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotifierCall {
    SyncClaim(Address, TxHash),
    ClaimBadges(Address),
    ReportPoints(Address),
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    calls: Arc<Mutex<Vec<NotifierCall>>>,
}

impl RecordingNotifier {
    pub fn calls(&self) -> Vec<NotifierCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn synced_hashes(&self) -> Vec<TxHash> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NotifierCall::SyncClaim(_, tx_hash) => Some(tx_hash),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn sync_claim(&self, address: Address, tx_hash: TxHash) {
        self.calls
            .lock()
            .unwrap()
            .push(NotifierCall::SyncClaim(address, tx_hash));
    }

    async fn claim_badges(&self, address: Address) {
        self.calls
            .lock()
            .unwrap()
            .push(NotifierCall::ClaimBadges(address));
    }

    async fn report_points(&self, address: Address) {
        self.calls
            .lock()
            .unwrap()
            .push(NotifierCall::ReportPoints(address));
    }
}

#[derive(Default)]
pub struct MemoryJournal {
    lines: Mutex<Vec<String>>,
}

impl MemoryJournal {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn lines_tagged(&self, tag: &str) -> Vec<String> {
        let prefix = format!("[{tag}] ");
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|line| line.starts_with(&prefix))
            .cloned()
            .collect()
    }
}

impl Journal for MemoryJournal {
    fn record(&self, tag: &str, message: &str) {
        self.lines.lock().unwrap().push(format!("[{tag}] {message}"));
    }
}
