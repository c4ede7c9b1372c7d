//! FX Dashboard - Main Application Entry Point
//!
//! Headless dashboard: connects to the backend, follows its event stream
//! and takes line commands from stdin.

use std::error::Error;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use fx_engine::{
    init_logger, BackendClient, CommandError, CurrencyManager, CurrencyPair, DashboardBackend,
    DataStatus, EventFeed, JsonFileSelectionStore, LogView, ManagerConfig, ManagerHandle,
    ManagerSnapshot, Period, Side, SwitchOutcome, SystemClock, SETTINGS,
};

const HELP: &str = "commands: pair <FROM> <TO> | pick from|to <CODE> | confirm | cancel | swap \
                    | period <DAYS> | preload | status | quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logger();
    info!("FX Dashboard {}", fx_engine::VERSION);

    let client = BackendClient::from_settings(&SETTINGS)?;
    info!(url = %client.base_url(), "backend");

    let mut manager = CurrencyManager::new(
        ManagerConfig::from_settings(&SETTINGS),
        Arc::new(client.clone()),
        Arc::new(JsonFileSelectionStore::open_default()),
        Box::new(LogView::new()),
        Arc::new(SystemClock),
    );

    // A failed check keeps the stored selection
    match client.server_status().await {
        Ok(status) => {
            manager.reconcile_server_instance(&status.server_instance_id);
        }
        Err(e) => warn!(error = %e, "server status check failed"),
    }

    let (feed_tx, feed_rx) = mpsc::unbounded_channel();
    let feed = EventFeed::from_settings(&client, &SETTINGS)?.spawn(feed_tx);

    manager.start();
    let (handle, command_rx) = ManagerHandle::channel();
    let engine = tokio::spawn(manager.run(feed_rx, command_rx));

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match execute(&handle, &client, line.trim()).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("error: {e}"),
        }
    }

    drop(handle);
    feed.abort();
    let _ = engine.await;
    info!("FX Dashboard stopped");
    Ok(())
}

/// Run one command line. Returns false on quit.
async fn execute(
    handle: &ManagerHandle,
    client: &BackendClient,
    line: &str,
) -> Result<bool, CommandError> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    match parts.as_slice() {
        [] => {}
        ["pair", buy, sell] => {
            let pair = CurrencyPair::new(buy.to_uppercase(), sell.to_uppercase());
            report(handle.switch_pair(pair).await?);
        }
        ["pick", side, code] => match side.parse::<Side>() {
            Ok(side) => {
                handle.set_pending(side, code).await?;
                println!("pending {side} = {}, confirm to apply", code.to_uppercase());
            }
            Err(e) => println!("{e}"),
        },
        ["confirm"] => report(handle.confirm().await?),
        ["cancel"] => handle.cancel_pending().await?,
        ["swap"] => report(handle.swap().await?),
        ["period", days] => match days.parse::<u32>() {
            Ok(days) => {
                let dispatch = handle.select_period(Period(days)).await?;
                println!("period {days}: {dispatch:?}");
            }
            Err(_) => println!("invalid period: {days}"),
        },
        ["preload"] => println!("{:?}", handle.preload().await?),
        ["status"] => {
            print_status(&handle.snapshot().await?);
            match client.data_status().await {
                Ok(status) => print_data_status(&status),
                Err(e) => println!("data      unavailable ({e})"),
            }
        }
        ["quit"] | ["exit"] => return Ok(false),
        _ => println!("{HELP}"),
    }
    Ok(true)
}

fn report(outcome: SwitchOutcome) {
    match outcome {
        SwitchOutcome::Unchanged => println!("already showing this pair"),
        SwitchOutcome::Switched {
            pair,
            source,
            chart,
        } => println!("switched to {pair} ({source}): {chart:?}"),
    }
}

fn print_status(snapshot: &ManagerSnapshot) {
    println!("pair      {} ({}d)", snapshot.committed, snapshot.period);
    if snapshot.pending_from.is_some() || snapshot.pending_to.is_some() {
        println!(
            "pending   {} -> {}",
            snapshot.pending_from.as_deref().unwrap_or("-"),
            snapshot.pending_to.as_deref().unwrap_or("-")
        );
    }
    println!(
        "chart     {}{}",
        snapshot.chart_state,
        snapshot
            .chart_error
            .as_ref()
            .map(|e| format!(" ({e})"))
            .unwrap_or_default()
    );
    println!(
        "rate      {}{}",
        snapshot.rate_state,
        snapshot
            .rate_error
            .as_ref()
            .map(|e| format!(" ({e})"))
            .unwrap_or_default()
    );
    if let Some(rate) = &snapshot.latest_rate {
        println!("latest    {:.4} on {}", rate.rate, rate.date);
    }
    if snapshot.cooldown_remaining_ms > 0 {
        println!("cooldown  {}ms", snapshot.cooldown_remaining_ms);
    }

    let periods: Vec<String> = snapshot
        .period_buttons
        .iter()
        .map(|b| {
            let mark = if b.active {
                "*"
            } else if b.loading {
                "~"
            } else if b.cached {
                "+"
            } else {
                ""
            };
            format!("{}{}", b.period, mark)
        })
        .collect();
    println!("periods   {}", periods.join(" "));

    let cached: Vec<String> = snapshot.cached_pairs.iter().map(ToString::to_string).collect();
    println!("cache     {}", cached.join(", "));
    let history: Vec<String> = snapshot.history.iter().map(ToString::to_string).collect();
    println!("history   {}", history.join(", "));
}

fn print_data_status(status: &DataStatus) {
    match (&status.earliest_date, &status.latest_date) {
        (Some(earliest), Some(latest)) => println!(
            "data      {} records, {earliest} to {latest} ({} days)",
            status.total_records, status.data_span_days
        ),
        _ => println!("data      {} records", status.total_records),
    }
}
