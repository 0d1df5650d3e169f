//! Payment history page.

use std::sync::Arc;

use futures::future::BoxFuture;

use super::history::{HistoryRecord, HistoryState};
use crate::api_client::PoolApi;
use crate::api_client::types::PaymentRecord;
use crate::error::Result;
use crate::format::{PLACEHOLDER_PENDING, format_amount, format_timestamp, truncate_id, truncate_or};
use crate::status::Badge;

const ADDRESS_CHARS: usize = 12;
const TXID_CHARS: usize = 16;
const AMOUNT_DECIMALS: usize = 8;

/// Payment history, polled every 30 s and filterable by chain.
pub type PaymentsState = HistoryState<PaymentRecord>;

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRow {
    pub id: u64,
    pub chain: String,
    pub address: String,
    pub amount: String,
    /// Truncated transaction id, or "Pending" before broadcast.
    pub txid: String,
    pub status: String,
    pub badge: Badge,
    pub time: String,
}

impl From<&PaymentRecord> for PaymentRow {
    fn from(payment: &PaymentRecord) -> Self {
        Self {
            id: payment.id,
            chain: payment.chain.clone(),
            address: truncate_id(&payment.address, ADDRESS_CHARS),
            amount: format_amount(payment.amount, AMOUNT_DECIMALS),
            txid: truncate_or(payment.txid(), TXID_CHARS, PLACEHOLDER_PENDING),
            status: payment.status.as_str().to_string(),
            badge: payment.status.badge(),
            time: format_timestamp(&payment.time),
        }
    }
}

impl HistoryRecord for PaymentRecord {
    type Row = PaymentRow;

    const NAME: &'static str = "payments";

    fn fetch(api: Arc<dyn PoolApi>, limit: u32) -> BoxFuture<'static, Result<Vec<Self>>> {
        Box::pin(async move { api.recent_payments(limit).await })
    }

    fn row(&self) -> PaymentRow {
        PaymentRow::from(self)
    }
}
