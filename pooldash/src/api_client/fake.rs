//! In-memory [`PoolApi`] for page tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::PoolApi;
use super::types::{BlockRecord, MinerSnapshot, PaymentRecord, PoolSnapshot};
use crate::error::{Error, Result};

/// Each endpoint answers with its configured value, or fails while unset.
#[derive(Default)]
pub(crate) struct FakeApi {
    pub stats: Mutex<Option<PoolSnapshot>>,
    pub blocks: Mutex<Option<Vec<BlockRecord>>>,
    pub payments: Mutex<Option<Vec<PaymentRecord>>>,
    pub chains: Mutex<Option<Vec<String>>>,
    pub miners: Mutex<HashMap<String, MinerSnapshot>>,
    /// Artificial latency of miner lookups.
    pub miner_delay: Mutex<Duration>,
    /// Endpoint and argument of every call, in order.
    pub calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn answer<T: Clone>(&self, call: String, slot: &Mutex<Option<T>>) -> Result<T> {
        self.calls.lock().push(call.clone());
        slot.lock()
            .clone()
            .ok_or_else(|| Error::Other(format!("{call}: unavailable")))
    }
}

#[async_trait]
impl PoolApi for FakeApi {
    async fn pool_stats(&self) -> Result<PoolSnapshot> {
        self.answer("stats".into(), &self.stats)
    }

    async fn recent_blocks(&self, limit: u32) -> Result<Vec<BlockRecord>> {
        self.answer(format!("blocks?limit={limit}"), &self.blocks)
    }

    async fn recent_payments(&self, limit: u32) -> Result<Vec<PaymentRecord>> {
        self.answer(format!("payments?limit={limit}"), &self.payments)
    }

    async fn miner_stats(&self, address: &str) -> Result<MinerSnapshot> {
        self.calls.lock().push(format!("miner/{address}"));
        let delay = *self.miner_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.miners
            .lock()
            .get(address)
            .cloned()
            .ok_or_else(|| Error::Other(format!("miner {address}: unavailable")))
    }

    async fn chains(&self) -> Result<Vec<String>> {
        self.answer("chains".into(), &self.chains)
    }
}

pub(crate) fn block(height: u64, chain: &str) -> BlockRecord {
    BlockRecord {
        height,
        chain: chain.to_string(),
        hash: format!("{height:064x}"),
        ..Default::default()
    }
}

pub(crate) fn payment(id: u64, chain: &str) -> PaymentRecord {
    PaymentRecord {
        id,
        chain: chain.to_string(),
        address: format!("addr-{id}"),
        ..Default::default()
    }
}
