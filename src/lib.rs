//! # Transit Dashboard
//!
//! Client side of a public-transport occupancy monitor: fetches current load,
//! forecasts, and historical analytics from a transit-load backend and projects
//! them onto a display surface.
//!
//! ## Modules
//!
//! - [`client`]: typed HTTP client for the backend
//! - [`state`]: selections, request sequencing, and UI phase
//! - [`view`]: the display surface and the binders that fill it
//! - [`chart`]: chart specs and the one-chart-per-canvas renderer
//! - [`dashboard`]: the event dispatcher tying it all together
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use transit_dashboard::{ApiClient, ClientConfig, ComponentTable, Dashboard,
//!     DashboardSettings, Id, MemoryDom, UiEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = ApiClient::new(ClientConfig::default())?;
//!     let mut dashboard = Dashboard::new(api, ComponentTable::default(), DashboardSettings::default());
//!     let mut dom = MemoryDom::new();
//!
//!     dashboard.dispatch(UiEvent::Init, &mut dom).await;
//!     dashboard.dispatch(UiEvent::RouteSelected(Some(Id::from(1))), &mut dom).await;
//!     dashboard.dispatch(UiEvent::StopSelected(Some(Id::from(10))), &mut dom).await;
//!
//!     println!("{:?}", dom.text("status-text"));
//!     Ok(())
//! }
//! ```

pub mod chart;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod state;
pub mod view;

// Re-export top-level types for convenience
pub use client::{
    ApiClient, ClientConfig, ClientError, ClientResult, CurrentLoad, ForecastPoint, Id,
    LoadStatistics, LoadTarget, PeakHours, Route, Stop, TransitApi,
};

pub use state::{Channel, RequestToken, Tab, Topology, UiPhase, ViewState};

pub use view::{ComponentTable, Fragment, MemoryDom, Surface};

pub use chart::{ChartHost, ChartRenderer, ChartSpec, LoadUnit};

pub use dashboard::{Dashboard, DashboardSettings, Outcome, UiEvent};

pub use config::{Config, ConfigError, LoggingConfig};
