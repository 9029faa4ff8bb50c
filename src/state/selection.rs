//! Selection State
//!
//! Route/stop select lists and the rules tying them together.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::client::{Id, LoadTarget, Route, Stop};

/// How stops are chosen in a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    /// Route first, then one of the route's stops
    #[default]
    RouteStop,
    /// One flat list of stops, no routes
    StopOnly,
}

impl FromStr for Topology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "route-stop" | "route_stop" => Ok(Topology::RouteStop),
            "stop-only" | "stop_only" => Ok(Topology::StopOnly),
            other => Err(format!("unknown topology: {}", other)),
        }
    }
}

/// One entry of a select list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub value: Id,
    pub label: String,
}

/// A select element's options plus its current value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectList {
    placeholder: String,
    options: Vec<SelectOption>,
    selected: Option<Id>,
}

impl SelectList {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            options: Vec::new(),
            selected: None,
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn selected(&self) -> Option<&Id> {
        self.selected.as_ref()
    }

    pub fn contains(&self, value: &Id) -> bool {
        self.options.iter().any(|o| &o.value == value)
    }

    /// Replace every option. A selected value missing from the new list is
    /// dropped.
    pub fn replace(&mut self, options: Vec<SelectOption>) {
        self.options = options;
        if let Some(selected) = &self.selected {
            if !self.contains(selected) {
                self.selected = None;
            }
        }
    }

    /// Back to the placeholder alone
    pub fn clear(&mut self) {
        self.options.clear();
        self.selected = None;
    }

    /// Select a value. `None` (the placeholder) or a value not among the
    /// options leaves nothing selected.
    pub fn select(&mut self, value: Option<Id>) -> Option<&Id> {
        self.selected = value.filter(|v| self.contains(v));
        self.selected.as_ref()
    }
}

/// Which panel a selection drives; decides labels and whether a stop is
/// mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    /// Current load and forecast: a stop is required
    Live,
    /// Analytics: the stop is an optional filter in the route-stop topology
    Analytics,
}

/// Route and stop select lists for one panel
#[derive(Debug, Clone)]
pub struct Selection {
    topology: Topology,
    kind: SelectionKind,
    routes: SelectList,
    stops: SelectList,
}

impl Selection {
    pub fn new(topology: Topology, kind: SelectionKind) -> Self {
        let stop_placeholder = match (kind, topology) {
            (SelectionKind::Analytics, Topology::RouteStop) => "Все остановки",
            _ => "Выберите остановку",
        };

        Self {
            topology,
            kind,
            routes: SelectList::new("Выберите маршрут"),
            stops: SelectList::new(stop_placeholder),
        }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn routes(&self) -> &SelectList {
        &self.routes
    }

    pub fn stops(&self) -> &SelectList {
        &self.stops
    }

    pub fn route(&self) -> Option<&Id> {
        self.routes.selected()
    }

    pub fn stop(&self) -> Option<&Id> {
        self.stops.selected()
    }

    /// Populate the route list
    pub fn set_routes(&mut self, routes: &[Route]) {
        let options = routes
            .iter()
            .map(|route| SelectOption {
                value: route.id.clone(),
                label: self.route_label(route),
            })
            .collect();
        self.routes.replace(options);
    }

    fn route_label(&self, route: &Route) -> String {
        match (self.kind, route.name.as_deref()) {
            (SelectionKind::Live, Some(name)) if !name.is_empty() => {
                format!("Маршрут {} - {}", route.number, name)
            }
            _ => format!("Маршрут {}", route.number),
        }
    }

    /// Change the route. The stop list always empties: stops of the previous
    /// route no longer apply and the user has to pick again.
    ///
    /// Returns the route that is now selected.
    pub fn select_route(&mut self, route: Option<Id>) -> Option<Id> {
        self.stops.clear();
        self.routes.select(route).cloned()
    }

    /// Populate the stop list
    pub fn set_stops(&mut self, stops: &[Stop]) {
        let options = stops
            .iter()
            .map(|stop| SelectOption {
                value: stop.id.clone(),
                label: stop.name.clone(),
            })
            .collect();
        self.stops.replace(options);
    }

    /// Change the stop; returns the stop that is now selected
    pub fn select_stop(&mut self, stop: Option<Id>) -> Option<Id> {
        self.stops.select(stop).cloned()
    }

    /// The request target for the current selection, if it is complete
    pub fn load_target(&self) -> Option<LoadTarget> {
        match self.topology {
            Topology::StopOnly => self.stop().cloned().map(LoadTarget::stop),
            Topology::RouteStop => {
                let route = self.route()?.clone();
                match (self.kind, self.stop()) {
                    (_, Some(stop)) => Some(LoadTarget::route(route, Some(stop.clone()))),
                    (SelectionKind::Analytics, None) => Some(LoadTarget::route(route, None)),
                    (SelectionKind::Live, None) => None,
                }
            }
        }
    }
}
