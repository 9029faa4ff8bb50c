//! In-memory surface
//!
//! Records every write so the dashboard can run without a browser. The
//! terminal front end renders from it and the tests assert against it.

use serde::Serialize;
use std::collections::BTreeMap;

use super::fragment::Fragment;
use super::surface::Surface;
use crate::chart::{ChartHandle, ChartHost, ChartSpec};
use crate::state::SelectList;

/// State of one named element
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Element {
    pub text: Option<String>,
    pub class: Option<String>,
    pub fragment: Option<Fragment>,
    pub hidden: bool,
    pub options: Option<SelectList>,
}

/// A chart currently attached to a canvas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartInstance {
    pub canvas: String,
    pub spec: ChartSpec,
}

#[derive(Debug, Default, Serialize)]
pub struct MemoryDom {
    elements: BTreeMap<String, Element>,
    notifications: Vec<String>,
    charts: BTreeMap<ChartHandle, ChartInstance>,
    #[serde(skip)]
    next_chart: u64,
    #[serde(skip)]
    destroyed: usize,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    fn element_mut(&mut self, id: &str) -> &mut Element {
        self.elements.entry(id.to_string()).or_default()
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.element(id)?.text.as_deref()
    }

    pub fn class(&self, id: &str) -> Option<&str> {
        self.element(id)?.class.as_deref()
    }

    /// Whether `class` is one of the element's classes
    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.class(id)
            .map(|list| list.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn fragment(&self, id: &str) -> Option<&Fragment> {
        self.element(id)?.fragment.as_ref()
    }

    /// Elements never written to count as visible
    pub fn is_hidden(&self, id: &str) -> bool {
        self.element(id).map(|e| e.hidden).unwrap_or(false)
    }

    pub fn options(&self, id: &str) -> Option<&SelectList> {
        self.element(id)?.options.as_ref()
    }

    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    /// Take pending notifications, leaving none
    pub fn drain_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }

    /// Charts attached to `canvas`
    pub fn charts_on(&self, canvas: &str) -> Vec<&ChartSpec> {
        self.charts
            .values()
            .filter(|c| c.canvas == canvas)
            .map(|c| &c.spec)
            .collect()
    }

    pub fn chart_count(&self) -> usize {
        self.charts.len()
    }

    pub fn destroyed_charts(&self) -> usize {
        self.destroyed
    }
}

impl Surface for MemoryDom {
    fn set_text(&mut self, target: &str, text: &str) {
        self.element_mut(target).text = Some(text.to_string());
    }

    fn set_class(&mut self, target: &str, class: &str) {
        self.element_mut(target).class = Some(class.to_string());
    }

    fn set_fragment(&mut self, target: &str, fragment: Fragment) {
        self.element_mut(target).fragment = Some(fragment);
    }

    fn set_hidden(&mut self, target: &str, hidden: bool) {
        self.element_mut(target).hidden = hidden;
    }

    fn set_options(&mut self, target: &str, list: &SelectList) {
        self.element_mut(target).options = Some(list.clone());
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }
}

impl ChartHost for MemoryDom {
    fn create_chart(&mut self, canvas: &str, spec: ChartSpec) -> ChartHandle {
        self.next_chart += 1;
        let handle = ChartHandle::new(self.next_chart);
        self.charts.insert(
            handle,
            ChartInstance {
                canvas: canvas.to_string(),
                spec,
            },
        );
        handle
    }

    fn destroy_chart(&mut self, handle: ChartHandle) {
        if self.charts.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }
}
