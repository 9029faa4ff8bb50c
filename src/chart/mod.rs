//! Chart Configuration
//!
//! Builds the two chart kinds the dashboard shows. The charts themselves are
//! drawn by an external [`ChartHost`]; this module only decides labels,
//! series, and axes.

mod renderer;

pub use renderer::{ChartHandle, ChartHost, ChartRenderer};

use serde::{Deserialize, Serialize};

use crate::client::{AnalyticsStatistic, ForecastPoint};
use crate::view::format::format_timestamp;

/// Upper bound of percentage axes
pub const PERCENT_MAX: f64 = 100.0;

/// Chart colors: (border, background)
const TEAL: (&str, &str) = ("rgb(75, 192, 192)", "rgba(75, 192, 192, 0.2)");
const RED: (&str, &str) = ("rgb(255, 99, 132)", "rgba(255, 99, 132, 0.2)");
const BLUE: (&str, &str) = ("rgb(54, 162, 235)", "rgba(54, 162, 235, 0.2)");
const ORANGE: (&str, &str) = ("rgb(255, 159, 64)", "rgba(255, 159, 64, 0.2)");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Forecast,
    Analytics,
}

/// Unit of forecast values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadUnit {
    /// Load percentage, 0..=100
    #[default]
    Percentage,
    /// Raw people count
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AxisId {
    /// Left axis, percentages
    #[serde(rename = "y")]
    Left,
    /// Right axis, counts
    #[serde(rename = "y1")]
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub id: AxisId,
    pub begin_at_zero: bool,
    pub max: Option<f64>,
}

impl Axis {
    fn percent(id: AxisId) -> Self {
        Self {
            id,
            begin_at_zero: true,
            max: Some(PERCENT_MAX),
        }
    }

    fn count(id: AxisId) -> Self {
        Self {
            id,
            begin_at_zero: true,
            max: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    /// One value per x label; `None` leaves a gap
    pub data: Vec<Option<f64>>,
    pub axis: AxisId,
    pub border_color: String,
    pub background_color: String,
}

impl Dataset {
    fn new(label: &str, data: Vec<Option<f64>>, axis: AxisId, colors: (&str, &str)) -> Self {
        Self {
            label: label.to_string(),
            data,
            axis,
            border_color: colors.0.to_string(),
            background_color: colors.1.to_string(),
        }
    }
}

/// Everything a chart host needs to draw one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub axes: Vec<Axis>,
}

impl ChartSpec {
    pub fn axis(&self, id: AxisId) -> Option<&Axis> {
        self.axes.iter().find(|a| a.id == id)
    }
}

/// Single-series line chart of predicted values
pub fn forecast_chart(points: &[ForecastPoint], unit: LoadUnit) -> ChartSpec {
    let (label, axis) = match unit {
        LoadUnit::Percentage => ("Прогноз загруженности (%)", Axis::percent(AxisId::Left)),
        LoadUnit::Count => ("Прогноз количества людей", Axis::count(AxisId::Left)),
    };

    ChartSpec {
        kind: ChartKind::Forecast,
        labels: points.iter().map(|p| format_timestamp(&p.forecast_time)).collect(),
        datasets: vec![Dataset::new(
            label,
            points.iter().map(|p| Some(p.predicted_load)).collect(),
            AxisId::Left,
            TEAL,
        )],
        axes: vec![axis],
    }
}

/// Dual-axis chart of hourly statistics.
///
/// Average load goes on the left percentage axis; average and maximum people
/// go on the right count axis. The maximum series only appears when the
/// backend reports it.
pub fn analytics_chart(statistics: &[AnalyticsStatistic]) -> ChartSpec {
    let mut datasets = vec![
        Dataset::new(
            "Средняя загруженность (%)",
            statistics.iter().map(|s| s.avg_load).collect(),
            AxisId::Left,
            RED,
        ),
        Dataset::new(
            "Среднее количество людей",
            statistics.iter().map(AnalyticsStatistic::average_people).collect(),
            AxisId::Right,
            BLUE,
        ),
    ];

    if statistics.iter().any(|s| s.max_people.is_some()) {
        datasets.push(Dataset::new(
            "Максимум людей",
            statistics.iter().map(|s| s.max_people).collect(),
            AxisId::Right,
            ORANGE,
        ));
    }

    ChartSpec {
        kind: ChartKind::Analytics,
        labels: statistics.iter().map(|s| format_timestamp(&s.timestamp)).collect(),
        datasets,
        axes: vec![Axis::percent(AxisId::Left), Axis::count(AxisId::Right)],
    }
}
