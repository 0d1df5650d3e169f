//! Block history page.

use std::sync::Arc;

use futures::future::BoxFuture;

use super::history::{HistoryRecord, HistoryState};
use crate::api_client::PoolApi;
use crate::api_client::types::BlockRecord;
use crate::error::Result;
use crate::format::{
    PLACEHOLDER_UNKNOWN, format_amount, format_number, format_timestamp, truncate_id, truncate_or,
};
use crate::status::Badge;

const HASH_CHARS: usize = 16;
const MINER_CHARS: usize = 12;
const REWARD_DECIMALS: usize = 2;

/// Block history, polled every 30 s and filterable by chain.
pub type BlocksState = HistoryState<BlockRecord>;

/// One rendered block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRow {
    pub chain: String,
    pub height: u64,
    pub hash: String,
    pub difficulty: String,
    pub reward: String,
    pub confirmations: i64,
    pub status: String,
    pub badge: Badge,
    pub miner: String,
    pub time: String,
}

impl BlockRow {
    /// Row key; heights alone collide across chains.
    pub fn key(&self) -> (&str, u64) {
        (&self.chain, self.height)
    }
}

impl From<&BlockRecord> for BlockRow {
    fn from(block: &BlockRecord) -> Self {
        Self {
            chain: block.chain.clone(),
            height: block.height,
            hash: truncate_id(&block.hash, HASH_CHARS),
            difficulty: format_number(block.difficulty),
            reward: format_amount(block.reward, REWARD_DECIMALS),
            confirmations: block.confirmations,
            status: block.status.as_str().to_string(),
            badge: block.status.badge(),
            miner: truncate_or(block.miner(), MINER_CHARS, PLACEHOLDER_UNKNOWN),
            time: format_timestamp(&block.time),
        }
    }
}

impl HistoryRecord for BlockRecord {
    type Row = BlockRow;

    const NAME: &'static str = "blocks";

    fn fetch(api: Arc<dyn PoolApi>, limit: u32) -> BoxFuture<'static, Result<Vec<Self>>> {
        Box::pin(async move { api.recent_blocks(limit).await })
    }

    fn row(&self) -> BlockRow {
        BlockRow::from(self)
    }
}
