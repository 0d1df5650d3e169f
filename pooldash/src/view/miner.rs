//! Miner lookup page.
//!
//! Unlike the other pages nothing is polled here: each submitted address
//! triggers exactly one fetch. The last successful lookup stays on screen
//! until a newer one succeeds.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::api_client::PoolApi;
use crate::api_client::types::{MinerSnapshot, WorkerSnapshot};
use crate::format::{format_amount, format_count, format_hashrate, format_timestamp};
use crate::tracing::prelude::*;

const AMOUNT_DECIMALS: usize = 8;

/// Result of a [`MinerLookup::search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Empty or whitespace-only input; nothing was fetched.
    Blank,
    /// A lookup was already in flight; this one was ignored.
    Busy,
    Loaded,
    /// The fetch failed; the previous result is still shown.
    Failed,
    /// The page was closed before or while fetching.
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinerModel {
    pub address: String,
    pub hashrate: String,
    pub shares_valid: String,
    pub shares_invalid: String,
    pub last_share: String,
    /// Unpaid balance per chain, sorted by chain.
    pub balances: Vec<AmountRow>,
    /// Total paid per chain, sorted by chain.
    pub paid: Vec<AmountRow>,
    pub workers: Vec<WorkerRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmountRow {
    pub chain: String,
    pub amount: String,
}

/// One worker, keyed by `name`.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerRow {
    pub name: String,
    pub hashrate: String,
    pub shares_valid: String,
    pub shares_invalid: String,
    pub last_share: String,
}

impl From<&WorkerSnapshot> for WorkerRow {
    fn from(worker: &WorkerSnapshot) -> Self {
        Self {
            name: worker.name.clone(),
            hashrate: format_hashrate(worker.hashrate),
            shares_valid: format_count(worker.shares_valid),
            shares_invalid: format_count(worker.shares_invalid),
            last_share: format_timestamp(&worker.last_share),
        }
    }
}

impl MinerModel {
    /// `address` is what was searched; used when the response omits it.
    pub fn build(address: &str, miner: &MinerSnapshot) -> Self {
        Self {
            address: if miner.address.is_empty() {
                address.to_string()
            } else {
                miner.address.clone()
            },
            hashrate: format_hashrate(miner.hashrate),
            shares_valid: format_count(miner.shares_valid),
            shares_invalid: format_count(miner.shares_invalid),
            last_share: format_timestamp(&miner.last_share),
            balances: amount_rows(&miner.balance),
            paid: amount_rows(&miner.paid),
            workers: miner.workers.iter().map(WorkerRow::from).collect(),
        }
    }
}

fn amount_rows(by_chain: &BTreeMap<String, f64>) -> Vec<AmountRow> {
    by_chain
        .iter()
        .map(|(chain, amount)| AmountRow {
            chain: chain.clone(),
            amount: format_amount(*amount, AMOUNT_DECIMALS),
        })
        .collect()
}

#[derive(Debug)]
struct LookupState {
    loading: bool,
    active: bool,
    /// Searched address and its snapshot.
    current: Option<(String, Arc<MinerSnapshot>)>,
}

/// Clears the loading flag when the search ends, however it ends.
struct LoadingGuard<'a>(&'a Mutex<LookupState>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().loading = false;
    }
}

/// State of the miner lookup page.
pub struct MinerLookup {
    api: Arc<dyn PoolApi>,
    state: Mutex<LookupState>,
}

impl MinerLookup {
    pub fn new(api: Arc<dyn PoolApi>) -> Self {
        Self {
            api,
            state: Mutex::new(LookupState {
                loading: false,
                active: true,
                current: None,
            }),
        }
    }

    /// Look up `address`, trimmed.
    pub async fn search(&self, address: &str) -> SearchOutcome {
        let address = address.trim();
        if address.is_empty() {
            return SearchOutcome::Blank;
        }

        let _guard = {
            let mut state = self.state.lock();
            if !state.active {
                return SearchOutcome::Closed;
            }
            if state.loading {
                debug!(address, "Lookup already in flight");
                return SearchOutcome::Busy;
            }
            state.loading = true;
            LoadingGuard(&self.state)
        };

        let result = self.api.miner_stats(address).await;

        let mut state = self.state.lock();
        if !state.active {
            return SearchOutcome::Closed;
        }
        match result {
            Ok(miner) => {
                state.current = Some((address.to_string(), Arc::new(miner)));
                SearchOutcome::Loaded
            }
            Err(e) => {
                warn!(address, error = %e, "Miner lookup failed");
                SearchOutcome::Failed
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Snapshot of the last successful lookup.
    pub fn snapshot(&self) -> Option<Arc<MinerSnapshot>> {
        self.state.lock().current.as_ref().map(|(_, s)| s.clone())
    }

    pub fn model(&self) -> Option<MinerModel> {
        let current = self.state.lock().current.clone();
        current.map(|(address, miner)| MinerModel::build(&address, &miner))
    }

    /// Leave the page. A lookup still in flight is discarded when it
    /// resolves.
    pub fn close(&self) {
        self.state.lock().active = false;
    }
}
