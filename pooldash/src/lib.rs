//! Mining pool telemetry dashboard.
//!
//! Polls a pool statistics API and turns successive snapshots into stable,
//! presentation-ready page models. The pieces, bottom-up:
//!
//! - [`format`]: pure conversions from raw telemetry to display strings.
//! - [`status`]: block and payment status badges.
//! - [`filter`]: client-side chain filtering of block/payment lists.
//! - [`api_client`]: typed client for the pool API.
//! - [`poller`]: the periodic fetch task every polled page is built on.
//! - [`view`]: one state holder per page.

pub mod api_client;
pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod poller;
pub mod status;
pub mod tracing;
pub mod view;
