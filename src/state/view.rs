//! View state owned by the dashboard controller

use serde::Serialize;

use super::selection::{Selection, SelectionKind, Topology};
use super::sequence::RequestSequence;
use crate::chart::ChartRenderer;

/// Where the dashboard is in its user flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UiPhase {
    NoSelection,
    SelectedNoData,
    DataDisplayed,
    AnalyticsRequested,
    AnalyticsDisplayed,
}

/// Top-level panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Current,
    Forecast,
    Analytics,
}

/// Everything the dashboard remembers between events
#[derive(Debug)]
pub struct ViewState {
    /// Selection driving current load and forecast
    pub live: Selection,
    /// Selection driving analytics
    pub analytics: Selection,
    /// Analytics period in days
    pub analytics_days: u32,
    pub tab: Tab,
    pub phase: UiPhase,
    pub tokens: RequestSequence,
    pub charts: ChartRenderer,
}

impl ViewState {
    pub fn new(topology: Topology, analytics_days: u32) -> Self {
        Self {
            live: Selection::new(topology, SelectionKind::Live),
            analytics: Selection::new(topology, SelectionKind::Analytics),
            analytics_days,
            tab: Tab::default(),
            phase: UiPhase::NoSelection,
            tokens: RequestSequence::new(),
            charts: ChartRenderer::new(),
        }
    }

    /// Phase after the live selection changed without new data
    pub fn live_selection_phase(&self) -> UiPhase {
        let anything_selected = self.live.route().is_some() || self.live.stop().is_some();
        if anything_selected {
            UiPhase::SelectedNoData
        } else {
            UiPhase::NoSelection
        }
    }
}
