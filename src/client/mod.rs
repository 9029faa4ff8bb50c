//! Transit Backend Client
//!
//! Read-only access to the transit-load backend.
//!
//! ## Endpoints
//!
//! - `GET /routes`
//! - `GET /{namespace}/routes/{route_id}/stops`, `GET /{namespace}/stops`
//! - `GET /{namespace}/current-load/{id}?stop_id=`
//! - `GET /{namespace}/forecast/{id}?stop_id=&hours=`
//! - `GET /analytics/load-statistics/{id}?stop_id=&days=`
//! - `GET /analytics/peak-hours/{id}?stop_id=&days=`
//!
//! Unset filters are left out of the query string.

mod error;
mod http;
mod types;

pub use error::{ClientError, ClientResult};
pub use http::{ApiClient, ClientConfig};
pub use types::{
    AnalyticsStatistic, BusObservation, CurrentLoad, ForecastPoint, Health, Id, LoadStatistics,
    LoadTarget, PeakHourEntry, PeakHours, Route, Stop,
};

use async_trait::async_trait;

/// The backend operations the dashboard consumes
#[async_trait]
pub trait TransitApi: Send + Sync {
    /// All routes
    async fn routes(&self) -> ClientResult<Vec<Route>>;

    /// Stops of a route, or every stop when `route_id` is `None`
    async fn stops(&self, route_id: Option<&Id>) -> ClientResult<Vec<Stop>>;

    /// Current load snapshot
    async fn current_load(&self, target: &LoadTarget) -> ClientResult<CurrentLoad>;

    /// Forecast for the next `hours` hours, in time order
    async fn forecast(&self, target: &LoadTarget, hours: u32) -> ClientResult<Vec<ForecastPoint>>;

    /// Hourly statistics for the last `days` days
    async fn load_statistics(&self, target: &LoadTarget, days: u32) -> ClientResult<LoadStatistics>;

    /// Peak hours for the last `days` days, busiest first
    async fn peak_hours(&self, target: &LoadTarget, days: u32) -> ClientResult<PeakHours>;
}
