//! Command-line interface for pooldash.
//!
//! Renders the dashboard pages from a pool API as plain text, either once
//! or continuously until interrupted.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::time::{Instant, timeout_at};

use pooldash::api_client::{Client, PoolApi};
use pooldash::config::DashboardConfig;
use pooldash::filter::ChainSelection;
use pooldash::poller::PageUpdates;
use pooldash::status::Badge;
use pooldash::tracing::prelude::*;
use pooldash::view::{
    BlockRow, BlocksState, HistoryModel, MinerLookup, MinerModel, OverviewModel, OverviewState,
    PageState, PaymentRow, PaymentsState, SearchOutcome,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Mining pool dashboard", long_about = None)]
struct Args {
    /// Pool API base URL (default: $POOLDASH_API_URL or http://localhost:8001/api)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show pool totals, chain sync and recent blocks
    Overview,
    /// Look up a single miner
    Miner { address: String },
    /// Show recently found blocks
    Blocks {
        #[arg(long, default_value = "all")]
        chain: ChainSelection,
    },
    /// Show recent payments
    Payments {
        #[arg(long, default_value = "all")]
        chain: ChainSelection,
    },
    /// Keep a page open, re-rendering on every update until Ctrl-C
    Watch {
        #[arg(long, value_enum, default_value_t = Page::Overview)]
        page: Page,
        #[arg(long, default_value = "all")]
        chain: ChainSelection,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Page {
    Overview,
    Blocks,
    Payments,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    pooldash::tracing::init();

    let mut config = DashboardConfig::from_env();
    if let Some(url) = args.api_url {
        config = config.with_api_url(url);
    }
    let client = Client::from_config(&config).context("invalid API configuration")?;
    debug!(api_url = client.base_url(), "Using pool API");
    let api: Arc<dyn PoolApi> = Arc::new(client);

    match args.command {
        Command::Overview => cmd_overview(api, &config).await,
        Command::Miner { address } => cmd_miner(api, &address).await,
        Command::Blocks { chain } => cmd_blocks(api, &config, chain).await,
        Command::Payments { chain } => cmd_payments(api, &config, chain).await,
        Command::Watch { page, chain } => cmd_watch(api, &config, page, chain).await,
    }
}

/// Wait until `model` turns ready, giving up after `limit`.
async fn wait_ready<M>(
    updates: &mut PageUpdates,
    limit: Duration,
    model: impl Fn() -> PageState<M>,
) -> Result<M> {
    let deadline = Instant::now() + limit;
    loop {
        if let PageState::Ready(model) = model() {
            return Ok(model);
        }
        match timeout_at(deadline, updates.next()).await {
            Ok(true) => continue,
            Ok(false) => bail!("page stopped before any data arrived"),
            Err(_) => bail!("no data from the pool API within {:?}", limit),
        }
    }
}

/// One-shot pages wait for the first fetch plus one retry.
fn one_shot_limit(config: &DashboardConfig, interval: Duration) -> Duration {
    interval + config.request_timeout
}

async fn cmd_overview(api: Arc<dyn PoolApi>, config: &DashboardConfig) -> Result<()> {
    let page = OverviewState::start(api, config);
    let mut updates = page.updates();
    let limit = one_shot_limit(config, config.overview_interval);
    let model = wait_ready(&mut updates, limit, || page.model()).await;
    page.stop();
    print_overview(&model?);
    Ok(())
}

async fn cmd_miner(api: Arc<dyn PoolApi>, address: &str) -> Result<()> {
    let lookup = MinerLookup::new(api);
    match lookup.search(address).await {
        SearchOutcome::Loaded => {}
        SearchOutcome::Blank => bail!("miner address is empty"),
        SearchOutcome::Failed => bail!("lookup of {} failed", address.trim()),
        SearchOutcome::Busy | SearchOutcome::Closed => bail!("lookup was not performed"),
    }
    if let Some(model) = lookup.model() {
        print_miner(&model);
    }
    Ok(())
}

async fn cmd_blocks(
    api: Arc<dyn PoolApi>,
    config: &DashboardConfig,
    chain: ChainSelection,
) -> Result<()> {
    let mut page = BlocksState::start(api, config);
    page.select_chain(chain);
    let mut updates = page.updates();
    let limit = one_shot_limit(config, config.history_interval);
    let model = wait_ready(&mut updates, limit, || page.model()).await;
    page.stop();
    print_blocks(&model?);
    Ok(())
}

async fn cmd_payments(
    api: Arc<dyn PoolApi>,
    config: &DashboardConfig,
    chain: ChainSelection,
) -> Result<()> {
    let mut page = PaymentsState::start(api, config);
    page.select_chain(chain);
    let mut updates = page.updates();
    let limit = one_shot_limit(config, config.history_interval);
    let model = wait_ready(&mut updates, limit, || page.model()).await;
    page.stop();
    print_payments(&model?);
    Ok(())
}

async fn cmd_watch(
    api: Arc<dyn PoolApi>,
    config: &DashboardConfig,
    page: Page,
    chain: ChainSelection,
) -> Result<()> {
    info!(?page, "Watching; press Ctrl-C to exit");
    match page {
        Page::Overview => {
            let state = OverviewState::start(api, config);
            watch_loop(state.updates(), || {
                if let PageState::Ready(model) = state.model() {
                    print_overview(&model);
                }
            })
            .await;
            state.stop();
        }
        Page::Blocks => {
            let mut state = BlocksState::start(api, config);
            state.select_chain(chain);
            watch_loop(state.updates(), || {
                if let PageState::Ready(model) = state.model() {
                    print_blocks(&model);
                }
            })
            .await;
            state.stop();
        }
        Page::Payments => {
            let mut state = PaymentsState::start(api, config);
            state.select_chain(chain);
            watch_loop(state.updates(), || {
                if let PageState::Ready(model) = state.model() {
                    print_payments(&model);
                }
            })
            .await;
            state.stop();
        }
    }
    Ok(())
}

/// Re-render on every publish until Ctrl-C or the page goes away.
async fn watch_loop(mut updates: PageUpdates, render: impl Fn()) {
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            alive = updates.next() => {
                if !alive {
                    break;
                }
                render();
            }
        }
    }
}

fn badge_mark(badge: Badge) -> &'static str {
    match badge {
        Badge::Success => "+",
        Badge::Warning => "~",
        Badge::Neutral => " ",
    }
}

fn print_overview(model: &OverviewModel) {
    println!("Pool:        {}", model.pool_name);
    println!("Hashrate:    {}", model.hashrate);
    println!("Miners:      {}", model.miners);
    println!("Workers:     {}", model.workers);
    println!("Blocks:      {}", model.blocks_found);
    println!("Last block:  {}", model.last_block);
    println!("Difficulty:  {}", model.pool_difficulty);

    if let Some(chains) = &model.merged_mining {
        println!("Merged mining:");
        for chain in chains {
            println!("  - {:<12} {}", chain.chain, chain.difficulty);
        }
    }

    if !model.sync.is_empty() {
        println!("Node sync:");
        for sync in &model.sync {
            println!(
                "  - {:<12} {:<11} {:>8}  blocks {}",
                sync.chain, sync.label, sync.progress_label, sync.blocks
            );
        }
    }

    println!("Recent blocks:");
    print_block_rows(&model.recent_blocks);
}

fn print_block_rows(rows: &[BlockRow]) {
    if rows.is_empty() {
        println!("  (none)");
        return;
    }
    for row in rows {
        println!(
            "  {} {:<10} {:>9}  {:<19}  {:>14}  {:>8}  {:>5} conf  {:<10} {:<15}  {}",
            badge_mark(row.badge),
            row.chain,
            row.height,
            row.hash,
            row.difficulty,
            row.reward,
            row.confirmations,
            row.status,
            row.miner,
            row.time
        );
    }
}

fn print_chain_options(selection: &ChainSelection, options: &[String]) {
    println!("Chain: {} (available: all, {})", selection, options.join(", "));
}

fn print_blocks(model: &HistoryModel<BlockRow>) {
    print_chain_options(&model.selection, &model.chain_options);
    print_block_rows(&model.rows);
}

fn print_payments(model: &HistoryModel<PaymentRow>) {
    print_chain_options(&model.selection, &model.chain_options);
    if model.rows.is_empty() {
        println!("  (none)");
        return;
    }
    for row in &model.rows {
        println!(
            "  {} {:>6}  {:<10} {:<15}  {:>18}  {:<19}  {:<10} {}",
            badge_mark(row.badge),
            row.id,
            row.chain,
            row.address,
            row.amount,
            row.txid,
            row.status,
            row.time
        );
    }
}

fn print_miner(model: &MinerModel) {
    println!("Address:     {}", model.address);
    println!("Hashrate:    {}", model.hashrate);
    println!("Shares:      {} valid, {} invalid", model.shares_valid, model.shares_invalid);
    println!("Last share:  {}", model.last_share);

    if !model.balances.is_empty() {
        println!("Balance:");
        for row in &model.balances {
            println!("  - {:<12} {}", row.chain, row.amount);
        }
    }
    if !model.paid.is_empty() {
        println!("Paid:");
        for row in &model.paid {
            println!("  - {:<12} {}", row.chain, row.amount);
        }
    }

    if model.workers.is_empty() {
        println!("Workers: (none)");
    } else {
        println!("Workers:");
        for worker in &model.workers {
            println!(
                "  - {:<16} {:>14}  {} valid, {} invalid  last {}",
                worker.name,
                worker.hashrate,
                worker.shares_valid,
                worker.shares_invalid,
                worker.last_share
            );
        }
    }
}
