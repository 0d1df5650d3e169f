//! Shared machinery of the block and payment history pages.
//!
//! Both pages poll a record list plus the configured chain list on the same
//! cadence and narrow the records with a user-selected chain filter. They
//! differ only in the record type and how a row is rendered.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use super::PageState;
use crate::api_client::PoolApi;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::filter::{ChainSelection, ChainTagged, filter_by_chain};
use crate::poller::{DataPoller, PageUpdates};

/// A record type listed on a history page.
pub trait HistoryRecord: ChainTagged + Clone + Send + Sync + 'static {
    /// Rendered table row.
    type Row;

    /// Poller name used in logs.
    const NAME: &'static str;

    /// Fetch the `limit` most recent records.
    fn fetch(api: Arc<dyn PoolApi>, limit: u32) -> BoxFuture<'static, Result<Vec<Self>>>;

    fn row(&self) -> Self::Row;
}

/// Model of a history page.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryModel<Row> {
    pub selection: ChainSelection,
    /// Chains offered by the filter, after the implicit "all".
    pub chain_options: Vec<String>,
    pub rows: Vec<Row>,
}

impl<Row> HistoryModel<Row> {
    pub fn build<R>(records: &[R], chains: &[String], selection: &ChainSelection) -> Self
    where
        R: HistoryRecord<Row = Row>,
    {
        Self {
            selection: selection.clone(),
            chain_options: chains.to_vec(),
            rows: filter_by_chain(records, selection)
                .iter()
                .map(HistoryRecord::row)
                .collect(),
        }
    }
}

/// State of a history page.
pub struct HistoryState<R: HistoryRecord> {
    records: DataPoller<Vec<R>>,
    chains: DataPoller<Vec<String>>,
    selection: ChainSelection,
    cancel: CancellationToken,
}

impl<R: HistoryRecord> HistoryState<R> {
    /// Start both pollers. Must be called within a tokio runtime.
    pub fn start(api: Arc<dyn PoolApi>, config: &DashboardConfig) -> Self {
        let cancel = CancellationToken::new();
        let limit = config.history_limit;

        let records = {
            let api = api.clone();
            DataPoller::spawn(R::NAME, config.history_interval, cancel.child_token(), move || {
                R::fetch(api.clone(), limit)
            })
        };

        let chains = DataPoller::spawn(
            "chains",
            config.history_interval,
            cancel.child_token(),
            move || {
                let api = api.clone();
                async move { api.chains().await }
            },
        );

        Self {
            records,
            chains,
            selection: ChainSelection::All,
            cancel,
        }
    }

    pub fn selection(&self) -> &ChainSelection {
        &self.selection
    }

    /// Change the chain filter. Takes effect on the next [`model`](Self::model).
    pub fn select_chain(&mut self, selection: ChainSelection) {
        self.selection = selection;
    }

    /// Loading until the record list has arrived once. The chain list is
    /// optional: until it arrives only "all" is offered.
    pub fn model(&self) -> PageState<HistoryModel<R::Row>> {
        let Some(records) = self.records.latest() else {
            return PageState::Loading;
        };
        let chains = self.chains.latest();
        let chains = chains.as_deref().map(Vec::as_slice).unwrap_or_default();

        PageState::Ready(HistoryModel::build(&records, chains, &self.selection))
    }

    pub fn updates(&self) -> PageUpdates {
        PageUpdates::new().with(&self.records).with(&self.chains)
    }

    /// Tear down both pollers.
    pub fn stop(&self) {
        self.records.stop();
        self.chains.stop();
        self.cancel.cancel();
    }
}
