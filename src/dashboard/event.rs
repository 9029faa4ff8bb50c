//! Dashboard events and dispatch outcomes

use crate::chart::LoadUnit;
use crate::client::Id;
use crate::state::{Tab, Topology};

/// User-driven input. `None` selections mean the placeholder was picked.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Page load: hide panels, fill the primary select
    Init,
    RouteSelected(Option<Id>),
    StopSelected(Option<Id>),
    TabOpened(Tab),
    AnalyticsRouteSelected(Option<Id>),
    AnalyticsStopSelected(Option<Id>),
    /// Analytics period in days
    PeriodChanged(u32),
    LoadAnalytics,
    /// Re-fetch current load and forecast for the current selection
    Refresh,
}

impl UiEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            UiEvent::Init => "init",
            UiEvent::RouteSelected(_) => "route_selected",
            UiEvent::StopSelected(_) => "stop_selected",
            UiEvent::TabOpened(_) => "tab_opened",
            UiEvent::AnalyticsRouteSelected(_) => "analytics_route_selected",
            UiEvent::AnalyticsStopSelected(_) => "analytics_stop_selected",
            UiEvent::PeriodChanged(_) => "period_changed",
            UiEvent::LoadAnalytics => "load_analytics",
            UiEvent::Refresh => "refresh",
        }
    }
}

/// What applying a response did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Data was written to the surface
    Rendered,
    /// Valid response with nothing to show
    Empty,
    /// The fetch failed
    Failed,
    /// A newer request superseded this one; nothing was written
    Stale,
}

/// Dashboard behavior knobs
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub topology: Topology,
    /// Forecast window
    pub forecast_hours: u32,
    /// Initial analytics period
    pub analytics_days: u32,
    pub forecast_unit: LoadUnit,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            topology: Topology::RouteStop,
            forecast_hours: 24,
            analytics_days: 7,
            forecast_unit: LoadUnit::Percentage,
        }
    }
}
