//! Transit Dashboard CLI
//!
//! Terminal front end for the dashboard:
//! - List routes and stops
//! - Show current load and forecast for a stop
//! - Show analytics for a route or stop
//! - Watch a stop, refreshing on an interval

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use transit_dashboard::chart::ChartSpec;
use transit_dashboard::config::{generate_default_config, Config, LoggingConfig};
use transit_dashboard::view::terminal;
use transit_dashboard::{
    ApiClient, ComponentTable, Dashboard, Id, MemoryDom, Tab, Topology, TransitApi, UiEvent,
    UiPhase,
};

#[derive(Parser)]
#[command(name = "transit-dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Passenger load dashboard for public transport")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: user config dir, then ./transit-dashboard.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL, overrides the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List routes
    Routes,

    /// List stops, all of them or those of one route
    Stops {
        #[arg(short, long)]
        route: Option<String>,
    },

    /// Current load and forecast for a stop
    Show {
        /// Route id (route-stop topology)
        #[arg(short, long)]
        route: Option<String>,
        #[arg(short, long)]
        stop: String,
    },

    /// Hourly statistics and peak hours
    Analytics {
        /// Route id (route-stop topology)
        #[arg(short, long)]
        route: Option<String>,
        /// Stop id; optional in the route-stop topology
        #[arg(short, long)]
        stop: Option<String>,
        /// Period in days (default: from config)
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Show a stop and refresh it until Ctrl-C
    Watch {
        #[arg(short, long)]
        route: Option<String>,
        #[arg(short, long)]
        stop: String,
        /// Refresh period in seconds (default: from config)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Check the backend health endpoint
    Health,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        return write_default_config(output.as_ref());
    }

    let mut config = Config::load_from(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    init_tracing(&config.logging);

    let api = ApiClient::new(config.client_config()).context("Failed to build HTTP client")?;
    tracing::debug!(base_url = %config.api.base_url, "Using backend");

    match cli.command {
        Commands::Routes => {
            let routes = api.routes().await.context("Failed to fetch routes")?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&routes)?),
                OutputFormat::Csv => write_csv(&routes)?,
                OutputFormat::Table => {
                    if routes.is_empty() {
                        println!("No routes");
                    }
                    println!("{:<10} {:<10} {}", "ID", "Number", "Name");
                    println!("{}", "-".repeat(50));
                    for route in &routes {
                        println!(
                            "{:<10} {:<10} {}",
                            route.id,
                            route.number,
                            route.name.as_deref().unwrap_or("-")
                        );
                    }
                }
            }
        }

        Commands::Stops { route } => {
            let route = route.map(Id::new);
            let stops = api
                .stops(route.as_ref())
                .await
                .context("Failed to fetch stops")?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stops)?),
                OutputFormat::Csv => write_csv(&stops)?,
                OutputFormat::Table => {
                    println!("{:<10} {}", "ID", "Name");
                    println!("{}", "-".repeat(40));
                    for stop in &stops {
                        println!("{:<10} {}", stop.id, stop.name);
                    }
                }
            }
        }

        Commands::Show { route, stop } => {
            let mut dashboard = Dashboard::new(api, config.components.clone(), config.dashboard_settings());
            let mut dom = MemoryDom::new();

            let phase = open_stop(&mut dashboard, &mut dom, route, stop).await?;
            print_live(&dom, dashboard.components(), cli.format)?;
            if phase != UiPhase::DataDisplayed {
                bail!("No current load to show");
            }
        }

        Commands::Analytics { route, stop, days } => {
            let mut dashboard = Dashboard::new(api, config.components.clone(), config.dashboard_settings());
            let mut dom = MemoryDom::new();

            dashboard.dispatch(UiEvent::Init, &mut dom).await;
            dashboard
                .dispatch(UiEvent::TabOpened(Tab::Analytics), &mut dom)
                .await;
            if let Some(route) = route {
                dashboard
                    .dispatch(UiEvent::AnalyticsRouteSelected(Some(Id::new(route))), &mut dom)
                    .await;
            }
            if let Some(stop) = stop {
                dashboard
                    .dispatch(UiEvent::AnalyticsStopSelected(Some(Id::new(stop))), &mut dom)
                    .await;
            }
            if let Some(days) = days {
                dashboard
                    .dispatch(UiEvent::PeriodChanged(days), &mut dom)
                    .await;
            }
            let phase = dashboard.dispatch(UiEvent::LoadAnalytics, &mut dom).await;

            print_analytics(&mut dom, dashboard.components(), cli.format)?;
            if phase != UiPhase::AnalyticsDisplayed {
                bail!("No analytics to show");
            }
        }

        Commands::Watch {
            route,
            stop,
            interval,
        } => {
            let period = interval
                .map(|secs| std::time::Duration::from_secs(secs.max(1)))
                .unwrap_or_else(|| config.poll_interval());
            let mut dashboard = Dashboard::new(api, config.components.clone(), config.dashboard_settings());
            let mut dom = MemoryDom::new();

            open_stop(&mut dashboard, &mut dom, route, stop).await?;
            print_live(&dom, dashboard.components(), cli.format)?;
            dom.drain_notifications();

            tracing::info!(period_secs = period.as_secs(), "Watching");
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        dashboard.dispatch(UiEvent::Refresh, &mut dom).await;
                        if cli.format == OutputFormat::Table {
                            println!("\n=== {} ===", chrono::Local::now().format("%d.%m.%Y, %H:%M:%S"));
                        }
                        print_live(&dom, dashboard.components(), cli.format)?;
                        dom.drain_notifications();
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Stopping watch");
                        break;
                    }
                }
            }
        }

        Commands::Health => match api.health().await {
            Ok(health) => match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&health)?),
                _ => println!("Backend status: {}", health.status),
            },
            Err(e) => {
                eprintln!("Cannot reach backend at {}", config.api.base_url);
                return Err(e).context("Health check failed");
            }
        },

        Commands::Config { output } => write_default_config(output.as_ref())?,
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("transit_dashboard={}", logging.level)));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries the dashboard output
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

/// Drive the dashboard to a displayed stop
async fn open_stop<A: TransitApi>(
    dashboard: &mut Dashboard<A>,
    dom: &mut MemoryDom,
    route: Option<String>,
    stop: String,
) -> Result<UiPhase> {
    dashboard.dispatch(UiEvent::Init, dom).await;

    match (dashboard.settings().topology, route) {
        (Topology::RouteStop, Some(route)) => {
            let route = Id::new(route);
            dashboard
                .dispatch(UiEvent::RouteSelected(Some(route.clone())), dom)
                .await;
            if dashboard.state().live.route() != Some(&route) {
                report_notifications(dom);
                bail!("Unknown route: {}", route);
            }
        }
        (Topology::RouteStop, None) => bail!("--route is required in the route-stop topology"),
        (Topology::StopOnly, Some(_)) => {
            tracing::warn!("--route is ignored in the stop-only topology");
        }
        (Topology::StopOnly, None) => {}
    }

    let stop = Id::new(stop);
    let phase = dashboard
        .dispatch(UiEvent::StopSelected(Some(stop.clone())), dom)
        .await;
    if dashboard.state().live.stop() != Some(&stop) {
        report_notifications(dom);
        bail!("Unknown stop: {}", stop);
    }
    Ok(phase)
}

fn report_notifications(dom: &mut MemoryDom) {
    for message in dom.drain_notifications() {
        eprintln!("! {}", message);
    }
}

fn print_live(dom: &MemoryDom, table: &ComponentTable, format: OutputFormat) -> Result<()> {
    for message in dom.notifications() {
        eprintln!("! {}", message);
    }

    let forecast = dom.charts_on(&table.forecast_chart).into_iter().next();
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&terminal::snapshot(dom, table))?
            );
        }
        OutputFormat::Csv => write_chart(forecast)?,
        OutputFormat::Table => {
            if let Some(panel) = terminal::render_current_load(dom, table) {
                print!("{}", panel);
            }
            if let Some(chart) = forecast {
                println!("\nПрогноз:");
                print!("{}", terminal::render_chart(chart));
            }
        }
    }
    Ok(())
}

fn print_analytics(dom: &mut MemoryDom, table: &ComponentTable, format: OutputFormat) -> Result<()> {
    report_notifications(dom);

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&terminal::snapshot(dom, table))?
            );
        }
        OutputFormat::Csv => {
            let visible = !dom.is_hidden(&table.analytics_results);
            let chart = dom.charts_on(&table.analytics_chart).into_iter().next();
            write_chart(chart.filter(|_| visible))?;
        }
        OutputFormat::Table => {
            if let Some(panel) = terminal::render_analytics(dom, table) {
                print!("{}", panel);
            }
        }
    }
    Ok(())
}

fn write_chart(chart: Option<&ChartSpec>) -> Result<()> {
    if let Some(chart) = chart {
        terminal::write_chart_csv(chart, io::stdout().lock()).context("Failed to write CSV")?;
    }
    Ok(())
}

fn write_csv<T: serde::Serialize>(rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout().lock());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_default_config(output: Option<&PathBuf>) -> Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)
                .with_context(|| format!("Failed to write {:?}", path))?;
            println!("Config written to {:?}", path);
        }
        None => {
            io::stdout().write_all(config.as_bytes())?;
        }
    }
    Ok(())
}
