//! View surface
//!
//! The named elements the dashboard writes into, and the table that names
//! them.

use serde::Deserialize;

use super::fragment::Fragment;
use crate::state::SelectList;

/// Something that can show the dashboard: a DOM, a terminal, a test double
pub trait Surface {
    fn set_text(&mut self, target: &str, text: &str);

    /// Replace the element's class list
    fn set_class(&mut self, target: &str, class: &str);

    fn set_fragment(&mut self, target: &str, fragment: Fragment);

    fn set_hidden(&mut self, target: &str, hidden: bool);

    /// Replace a select element's options and value
    fn set_options(&mut self, target: &str, list: &SelectList);

    /// Blocking user notification
    fn notify(&mut self, message: &str);
}

/// Element ids, resolved once at start-up and handed to every binder
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComponentTable {
    pub route_select: String,
    pub stop_select: String,
    pub route_number: String,
    pub stop_name: String,
    pub people_count: String,
    pub load_percentage: String,
    pub updated_at: String,
    pub status_indicator: String,
    pub status_text: String,
    pub buses_list: String,
    pub current_load_panel: String,
    pub forecast_chart: String,
    pub analytics_route_select: String,
    pub analytics_stop_select: String,
    pub analytics_chart: String,
    pub analytics_notice: String,
    pub peak_hours_list: String,
    pub analytics_results: String,
}

impl Default for ComponentTable {
    fn default() -> Self {
        Self {
            route_select: "route-select".to_string(),
            stop_select: "stop-select".to_string(),
            route_number: "route-number".to_string(),
            stop_name: "stop-name".to_string(),
            people_count: "people-count".to_string(),
            load_percentage: "load-percentage".to_string(),
            updated_at: "updated-at".to_string(),
            status_indicator: "status-indicator".to_string(),
            status_text: "status-text".to_string(),
            buses_list: "buses-list".to_string(),
            current_load_panel: "current-load-info".to_string(),
            forecast_chart: "forecast-chart".to_string(),
            analytics_route_select: "analytics-route".to_string(),
            analytics_stop_select: "analytics-stop".to_string(),
            analytics_chart: "analytics-chart".to_string(),
            analytics_notice: "analytics-notice".to_string(),
            peak_hours_list: "peak-hours-list".to_string(),
            analytics_results: "analytics-results".to_string(),
        }
    }
}

impl ComponentTable {
    /// Panels that start hidden and are revealed by their first successful
    /// fetch
    pub fn panels(&self) -> [&str; 3] {
        [
            &self.current_load_panel,
            &self.analytics_results,
            &self.analytics_notice,
        ]
    }
}
