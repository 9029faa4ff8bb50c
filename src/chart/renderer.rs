//! Chart lifecycle
//!
//! A canvas holds at most one chart. Re-rendering destroys the old instance
//! before the new one is created; skipping the destroy leaks the host's canvas
//! resources.

use serde::Serialize;
use std::collections::HashMap;

use super::ChartSpec;

/// Host-assigned identity of a live chart instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ChartHandle(u64);

impl ChartHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// The charting widget that actually draws
pub trait ChartHost {
    /// Create a chart on `canvas`
    fn create_chart(&mut self, canvas: &str, spec: ChartSpec) -> ChartHandle;

    /// Destroy a chart and release its canvas resources
    fn destroy_chart(&mut self, handle: ChartHandle);
}

/// Live chart handles, keyed by canvas id
#[derive(Debug, Default)]
pub struct ChartRenderer {
    live: HashMap<String, ChartHandle>,
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever chart is on `canvas` with a new one built from `spec`
    pub fn render<H: ChartHost + ?Sized>(
        &mut self,
        host: &mut H,
        canvas: &str,
        spec: ChartSpec,
    ) -> ChartHandle {
        if let Some(previous) = self.live.remove(canvas) {
            tracing::debug!(canvas, handle = previous.id(), "Destroying chart");
            host.destroy_chart(previous);
        }

        let handle = host.create_chart(canvas, spec);
        tracing::debug!(canvas, handle = handle.id(), "Created chart");
        self.live.insert(canvas.to_string(), handle);
        handle
    }

    /// Destroy the chart on `canvas`, if any. Returns whether one existed.
    pub fn clear<H: ChartHost + ?Sized>(&mut self, host: &mut H, canvas: &str) -> bool {
        match self.live.remove(canvas) {
            Some(handle) => {
                host.destroy_chart(handle);
                true
            }
            None => false,
        }
    }

    pub fn handle(&self, canvas: &str) -> Option<ChartHandle> {
        self.live.get(canvas).copied()
    }
}
