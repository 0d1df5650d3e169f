//! API data transfer objects.
//!
//! These mirror the JSON snapshots served by the pool API. Every snapshot
//! is immutable once received; pages replace them wholesale on each poll.
//! Fields the API may omit fall back to their defaults instead of failing
//! the whole response.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};

use crate::filter::ChainTagged;
use crate::status::{BlockStatus, PaymentStatus};

/// Treat an explicit JSON `null` like an absent field.
///
/// The pool API serializes unset lists and maps as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Pool-wide statistics.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolSnapshot {
    #[serde(deserialize_with = "null_as_default")]
    pub pool_name: String,
    /// Aggregate hashrate in hashes per second.
    pub hashrate: f64,
    pub miners: u64,
    pub workers: u64,
    pub blocks_found: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub last_block_time: String,
    /// Network difficulty by chain id. Not every id in `chains` is
    /// guaranteed an entry; use [`PoolSnapshot::difficulty_for`].
    #[serde(deserialize_with = "null_as_default")]
    pub network_difficulty: HashMap<String, f64>,
    pub pool_difficulty: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub sync_status: Vec<SyncStatus>,
    /// Chains the pool mines, in the pool's configured order.
    #[serde(deserialize_with = "null_as_default")]
    pub chains: Vec<String>,
    pub merged_mining: bool,
}

/// Network difficulty of a chain the pool reports mining.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChainDifficulty {
    Known(f64),
    /// Chain is listed but the API gave no difficulty for it.
    Unknown,
}

impl PoolSnapshot {
    pub fn difficulty_for(&self, chain: &str) -> ChainDifficulty {
        self.network_difficulty
            .get(chain)
            .copied()
            .map_or(ChainDifficulty::Unknown, ChainDifficulty::Known)
    }

    /// Difficulty of every listed chain, in `chains` order.
    pub fn chain_difficulties(&self) -> Vec<(&str, ChainDifficulty)> {
        self.chains
            .iter()
            .map(|chain| (chain.as_str(), self.difficulty_for(chain)))
            .collect()
    }
}

/// Node synchronization status for one chain.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncStatus {
    #[serde(deserialize_with = "null_as_default")]
    pub chain: String,
    pub blocks: u64,
    pub headers: u64,
    /// Percent synced. Estimates can overshoot 100; stored as reported.
    pub sync_progress: f64,
    pub is_syncing: bool,
    pub verification_progress: f64,
}

/// Statistics for a single miner address.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MinerSnapshot {
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    /// Hashrate in hashes per second.
    pub hashrate: f64,
    pub shares_valid: u64,
    pub shares_invalid: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub last_share: String,
    /// Unpaid balance by chain.
    #[serde(deserialize_with = "null_as_default")]
    pub balance: BTreeMap<String, f64>,
    /// Total paid out by chain.
    #[serde(deserialize_with = "null_as_default")]
    pub paid: BTreeMap<String, f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub workers: Vec<WorkerSnapshot>,
}

/// One worker of a miner. Names are unique within the miner.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSnapshot {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub hashrate: f64,
    pub shares_valid: u64,
    pub shares_invalid: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub last_share: String,
}

/// A block found by the pool.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockRecord {
    pub height: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub hash: String,
    #[serde(deserialize_with = "null_as_default")]
    pub chain: String,
    pub difficulty: f64,
    pub reward: f64,
    pub confirmations: i64,
    pub status: BlockStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub time: String,
    pub miner: Option<String>,
}

impl BlockRecord {
    /// Heights repeat across chains, so rows are keyed by both.
    pub fn key(&self) -> (&str, u64) {
        (&self.chain, self.height)
    }

    /// Finder's address, if the API knows it.
    pub fn miner(&self) -> Option<&str> {
        self.miner.as_deref().filter(|m| !m.is_empty())
    }
}

impl ChainTagged for BlockRecord {
    fn chain(&self) -> &str {
        &self.chain
    }
}

/// A payout to a miner.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PaymentRecord {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    pub amount: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub chain: String,
    /// Absent until the payment is broadcast.
    pub txid: Option<String>,
    #[serde(alias = "timestamp", deserialize_with = "null_as_default")]
    pub time: String,
    pub status: PaymentStatus,
}

impl PaymentRecord {
    pub fn txid(&self) -> Option<&str> {
        self.txid.as_deref().filter(|t| !t.is_empty())
    }
}

impl ChainTagged for PaymentRecord {
    fn chain(&self) -> &str {
        &self.chain
    }
}

/// `/config/chains` body. Deployed APIs answer with a bare array, an object
/// wrapping it, or `null` when no chain order is configured.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChainList {
    /// The pool has no chain order configured.
    Null,
    Bare(Vec<String>),
    Wrapped {
        #[serde(default, deserialize_with = "null_as_default")]
        chains: Vec<String>,
    },
}

impl ChainList {
    pub fn into_chains(self) -> Vec<String> {
        match self {
            ChainList::Null => Vec::new(),
            ChainList::Bare(chains) | ChainList::Wrapped { chains } => chains,
        }
    }
}
