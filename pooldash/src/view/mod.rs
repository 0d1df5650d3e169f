//! Per-page state holders.
//!
//! Each page owns the pollers it needs and derives a presentation model
//! from their latest snapshots on demand. Nothing is shared between pages;
//! constructing a page starts its pollers cold and dropping it (or calling
//! `stop`) tears them down.
//!
//! | Page | Sources | Cadence |
//! |------|---------|---------|
//! | [`OverviewState`] | pool stats, 10 recent blocks | 10 s |
//! | [`MinerLookup`] | miner stats, on demand | none |
//! | [`BlocksState`] | 50 recent blocks, chain list | 30 s |
//! | [`PaymentsState`] | 50 recent payments, chain list | 30 s |

mod blocks;
mod history;
mod miner;
mod overview;
mod payments;

pub use blocks::{BlockRow, BlocksState};
pub use history::{HistoryModel, HistoryRecord, HistoryState};
pub use miner::{AmountRow, MinerLookup, MinerModel, SearchOutcome, WorkerRow};
pub use overview::{ChainDifficultyRow, OverviewModel, OverviewState, SyncRow};
pub use payments::{PaymentRow, PaymentsState};

/// What a page shows.
///
/// A page is `Loading` only until its required data has arrived once.
/// After that it stays `Ready`, showing the last good snapshot through any
/// number of failed polls.
#[derive(Debug, Clone, PartialEq)]
pub enum PageState<M> {
    Loading,
    Ready(M),
}

impl<M> PageState<M> {
    pub fn is_loading(&self) -> bool {
        matches!(self, PageState::Loading)
    }

    pub fn ready(&self) -> Option<&M> {
        match self {
            PageState::Loading => None,
            PageState::Ready(model) => Some(model),
        }
    }
}
