//! Ferrywatch - watch ferry routes for price changes from the terminal.
//!
//! Each invocation runs one command against a fresh `AlertSync` store.

use std::io;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ferrywatch_core::utils::truncate_string;
use ferrywatch_core::{
    AlertPatch, AlertStatus, AlertSync, ApiClient, Config, QuickSave, SavedRoute,
};

// ============================================================================
// Constants
// ============================================================================

/// Directory for the optional rolling log file
const LOG_DIR_ENV: &str = "FERRYWATCH_LOG_DIR";

const LOG_FILE_PREFIX: &str = "ferrywatch.log";

/// Width of the route column in list output
const ROUTE_COLUMN_WIDTH: usize = 32;

#[derive(Debug, Parser)]
#[command(name = "ferrywatch", version, about = "Watch ferry routes for price changes")]
struct Cli {
    /// Guest identity (e.g. email) used when no token is configured
    #[arg(long, global = true)]
    identity: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List saved routes
    List {
        #[arg(long)]
        status: Option<AlertStatus>,
        /// Number of pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Check whether a route is watched
    Check { departure: String, arrival: String },
    /// Start watching a route
    Watch {
        departure: String,
        arrival: String,
        #[arg(long)]
        price: Option<f64>,
        /// First travel date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last travel date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Change an existing alert
    Update {
        alert_id: i64,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        target: Option<f64>,
        #[arg(long, action = ArgAction::Set)]
        notify_drop: Option<bool>,
        #[arg(long, action = ArgAction::Set)]
        notify_increase: Option<bool>,
    },
    /// Stop watching a route
    Unwatch {
        alert_id: i64,
        departure: String,
        arrival: String,
    },
    /// Pause notifications for an alert
    Pause { alert_id: i64 },
    /// Resume notifications for an alert
    Resume { alert_id: i64 },
    /// Show alert counters
    Stats,
}

/// Initialize the tracing subscriber for logging.
/// The returned guard must live until exit so buffered file logs are flushed.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = std::env::var(LOG_DIR_ENV).ok().filter(|d| !d.trim().is_empty());
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();
    let cli = Cli::parse();

    let config = Config::load()?;
    let identity = cli.identity.or_else(|| config.identity_hint.clone());

    let mut client = ApiClient::new(config.api_base_url())?;
    if let Some(token) = config.token.clone() {
        client.set_token(token);
    }
    let sync = AlertSync::new(client).with_per_page(config.per_page());
    info!(api = %config.api_base_url(), "ferrywatch starting");

    run(&sync, cli.command, identity.as_deref()).await
}

async fn run(sync: &AlertSync<ApiClient>, command: Command, identity: Option<&str>) -> Result<()> {
    match command {
        Command::List { status, pages } => {
            let mut view = sync.fetch_first_page(status).await?;
            for _ in 1..pages {
                if !view.has_more {
                    break;
                }
                view = sync.load_more(status).await?;
            }
            if view.items.is_empty() {
                println!("No saved routes.");
            }
            for route in &view.items {
                print_route(route);
            }
            println!(
                "\nShowing {} of {} (page {}{})",
                view.items.len(),
                view.total,
                view.page,
                if view.has_more { ", more available" } else { "" }
            );
        }
        Command::Check { departure, arrival } => {
            let entry = sync.check_route_saved(&departure, &arrival, identity).await?;
            match (entry.saved, entry.alert_id, entry.status) {
                (true, Some(id), Some(status)) => {
                    println!("{} → {}: watched (alert {}, {})", departure, arrival, id, status)
                }
                _ => println!("{} → {}: not watched", departure, arrival),
            }
        }
        Command::Watch {
            departure,
            arrival,
            price,
            from,
            to,
        } => {
            let mut request = QuickSave::new(departure, arrival).with_dates(from, to);
            if let Some(price) = price {
                request = request.with_price(price);
            }
            if let Some(identity) = identity {
                request = request.with_identity(identity);
            }
            let route = sync.quick_save(request).await?;
            println!("Watching {} (alert {})", route.route_label(), route.id);
            print_route(&route);
        }
        Command::Update {
            alert_id,
            from,
            to,
            target,
            notify_drop,
            notify_increase,
        } => {
            let patch = AlertPatch {
                date_from: from,
                date_to: to,
                notify_on_drop: notify_drop,
                notify_on_increase: notify_increase,
                target_price: target,
            };
            let route = sync.update(alert_id, patch, identity).await?;
            println!("Updated alert {}", route.id);
            print_route(&route);
        }
        Command::Unwatch {
            alert_id,
            departure,
            arrival,
        } => {
            sync.delete(alert_id, &departure, &arrival, identity).await?;
            println!("Stopped watching {} → {}", departure, arrival);
        }
        Command::Pause { alert_id } => {
            let route = sync.pause(alert_id).await?;
            println!("{}: {}", route.route_label(), route.status);
        }
        Command::Resume { alert_id } => {
            let route = sync.resume(alert_id).await?;
            println!("{}: {}", route.route_label(), route.status);
        }
        Command::Stats => {
            let stats = sync.refresh_stats().await?;
            println!("Total alerts:        {}", stats.total_alerts);
            println!("Active:              {}", stats.active_alerts);
            println!("Paused:              {}", stats.paused_alerts);
            println!("Routes with a drop:  {}", stats.routes_with_price_drops);
        }
    }
    Ok(())
}

fn print_route(route: &SavedRoute) {
    println!(
        "{:>6}  {:<width$}  {:<8}  {:<22}  {:>10}  {:>7}",
        route.id,
        truncate_string(&route.route_label(), ROUTE_COLUMN_WIDTH),
        route.status.as_str(),
        route.date_window_display(),
        route.price_display(),
        route.change_display(),
        width = ROUTE_COLUMN_WIDTH,
    );
}
