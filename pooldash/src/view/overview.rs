//! Overview page: pool totals, merged-mining chains, node sync, and the
//! latest blocks.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::PageState;
use super::blocks::BlockRow;
use crate::api_client::PoolApi;
use crate::api_client::types::{BlockRecord, ChainDifficulty, PoolSnapshot, SyncStatus};
use crate::config::DashboardConfig;
use crate::format::{
    PLACEHOLDER_UNKNOWN, format_count, format_hashrate, format_number, format_percent,
    format_timestamp, progress_width,
};
use crate::poller::{DataPoller, PageUpdates};

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewModel {
    pub pool_name: String,
    pub hashrate: String,
    pub miners: String,
    pub workers: String,
    pub blocks_found: String,
    pub last_block: String,
    pub pool_difficulty: String,
    /// One entry per mined chain; `None` unless the pool merge-mines.
    pub merged_mining: Option<Vec<ChainDifficultyRow>>,
    pub sync: Vec<SyncRow>,
    pub recent_blocks: Vec<BlockRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainDifficultyRow {
    pub chain: String,
    /// Grouped difficulty, or "N/A" when the API gave none.
    pub difficulty: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncRow {
    pub chain: String,
    pub label: &'static str,
    pub is_syncing: bool,
    /// Progress bar fill, clamped to 0..=100.
    pub progress: f64,
    /// Progress as reported, e.g. "100.40%".
    pub progress_label: String,
    pub blocks: String,
}

impl From<&SyncStatus> for SyncRow {
    fn from(sync: &SyncStatus) -> Self {
        Self {
            chain: sync.chain.clone(),
            label: if sync.is_syncing { "Syncing..." } else { "Synced" },
            is_syncing: sync.is_syncing,
            progress: progress_width(sync.sync_progress),
            progress_label: format_percent(sync.sync_progress),
            blocks: format_count(sync.blocks),
        }
    }
}

impl OverviewModel {
    pub fn build(stats: &PoolSnapshot, blocks: &[BlockRecord]) -> Self {
        let merged_mining = stats.merged_mining.then(|| {
            stats
                .chain_difficulties()
                .into_iter()
                .map(|(chain, difficulty)| ChainDifficultyRow {
                    chain: chain.to_string(),
                    difficulty: match difficulty {
                        ChainDifficulty::Known(d) => format_number(d),
                        ChainDifficulty::Unknown => PLACEHOLDER_UNKNOWN.to_string(),
                    },
                })
                .collect()
        });

        Self {
            pool_name: stats.pool_name.clone(),
            hashrate: format_hashrate(stats.hashrate),
            miners: format_count(stats.miners),
            workers: format_count(stats.workers),
            blocks_found: format_count(stats.blocks_found),
            last_block: format_timestamp(&stats.last_block_time),
            pool_difficulty: format_number(stats.pool_difficulty),
            merged_mining,
            sync: stats.sync_status.iter().map(SyncRow::from).collect(),
            recent_blocks: blocks.iter().map(BlockRow::from).collect(),
        }
    }
}

/// State of the overview page.
pub struct OverviewState {
    stats: DataPoller<PoolSnapshot>,
    blocks: DataPoller<Vec<BlockRecord>>,
    cancel: CancellationToken,
}

impl OverviewState {
    /// Start polling stats and recent blocks. Must be called within a tokio
    /// runtime.
    pub fn start(api: Arc<dyn PoolApi>, config: &DashboardConfig) -> Self {
        let cancel = CancellationToken::new();

        let stats = {
            let api = api.clone();
            DataPoller::spawn("stats", config.overview_interval, cancel.child_token(), move || {
                let api = api.clone();
                async move { api.pool_stats().await }
            })
        };

        let limit = config.overview_block_limit;
        let blocks = DataPoller::spawn(
            "recent_blocks",
            config.overview_interval,
            cancel.child_token(),
            move || {
                let api = api.clone();
                async move { api.recent_blocks(limit).await }
            },
        );

        Self {
            stats,
            blocks,
            cancel,
        }
    }

    /// Loading until both stats and blocks have arrived once.
    pub fn model(&self) -> PageState<OverviewModel> {
        match (self.stats.latest(), self.blocks.latest()) {
            (Some(stats), Some(blocks)) => PageState::Ready(OverviewModel::build(&stats, &blocks)),
            _ => PageState::Loading,
        }
    }

    pub fn updates(&self) -> PageUpdates {
        PageUpdates::new().with(&self.stats).with(&self.blocks)
    }

    pub fn stop(&self) {
        self.stats.stop();
        self.blocks.stop();
        self.cancel.cancel();
    }
}
