//! Terminal rendering
//!
//! Turns a [`MemoryDom`] into text for the CLI: the current-load panel, the
//! analytics panel, and charts as tables.

use serde::Serialize;
use std::fmt::Write as _;
use std::io;

use super::memory::MemoryDom;
use super::surface::ComponentTable;
use crate::chart::{AxisId, ChartSpec};

/// Serializable view of the panels, for `--format json`
#[derive(Debug, Serialize)]
pub struct PanelSnapshot<'a> {
    pub current_load: Option<CurrentLoadView<'a>>,
    pub forecast: Option<&'a ChartSpec>,
    pub analytics_notice: Option<&'a str>,
    pub analytics: Option<&'a ChartSpec>,
    pub peak_hours: Option<&'a super::Fragment>,
    pub notifications: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct CurrentLoadView<'a> {
    pub route_number: Option<&'a str>,
    pub stop_name: Option<&'a str>,
    pub people_count: Option<&'a str>,
    pub load_percentage: Option<&'a str>,
    pub status: Option<&'a str>,
    pub status_class: Option<&'a str>,
    pub updated_at: Option<&'a str>,
    pub buses: Option<&'a super::Fragment>,
}

/// Collect what is currently visible
pub fn snapshot<'a>(dom: &'a MemoryDom, table: &ComponentTable) -> PanelSnapshot<'a> {
    let current_load = (!dom.is_hidden(&table.current_load_panel)
        && dom.text(&table.people_count).is_some())
    .then(|| CurrentLoadView {
        route_number: dom.text(&table.route_number),
        stop_name: dom.text(&table.stop_name),
        people_count: dom.text(&table.people_count),
        load_percentage: dom.text(&table.load_percentage),
        status: dom.text(&table.status_text),
        status_class: dom.class(&table.status_indicator),
        updated_at: dom.text(&table.updated_at),
        buses: dom.fragment(&table.buses_list),
    });

    let results_visible = !dom.is_hidden(&table.analytics_results);

    PanelSnapshot {
        current_load,
        forecast: dom.charts_on(&table.forecast_chart).into_iter().next(),
        analytics_notice: (!dom.is_hidden(&table.analytics_notice))
            .then(|| dom.text(&table.analytics_notice))
            .flatten(),
        analytics: results_visible
            .then(|| dom.charts_on(&table.analytics_chart).into_iter().next())
            .flatten(),
        peak_hours: results_visible
            .then(|| dom.fragment(&table.peak_hours_list))
            .flatten(),
        notifications: dom.notifications(),
    }
}

/// Current-load panel as text; `None` while the panel is hidden
pub fn render_current_load(dom: &MemoryDom, table: &ComponentTable) -> Option<String> {
    let view = snapshot(dom, table).current_load?;
    let field = |value: Option<&str>| value.unwrap_or("-").to_string();

    let mut out = String::new();
    let _ = writeln!(out, "Маршрут:        {}", field(view.route_number));
    let _ = writeln!(out, "Остановка:      {}", field(view.stop_name));
    let _ = writeln!(out, "Людей:          {}", field(view.people_count));
    let _ = writeln!(out, "Загруженность:  {}%", field(view.load_percentage));
    let _ = writeln!(out, "Статус:         {}", field(view.status));
    let _ = writeln!(out, "Обновлено:      {}", field(view.updated_at));
    if let Some(buses) = view.buses {
        let _ = writeln!(out, "Автобусы:");
        let _ = writeln!(out, "{}", buses.to_text());
    }
    Some(out)
}

/// Analytics panel as text: notice, or chart plus peak hours
pub fn render_analytics(dom: &MemoryDom, table: &ComponentTable) -> Option<String> {
    let view = snapshot(dom, table);

    if let Some(notice) = view.analytics_notice {
        return Some(format!("{}\n", notice));
    }

    let chart = view.analytics?;
    let mut out = render_chart(chart);
    if let Some(peaks) = view.peak_hours {
        let _ = writeln!(out, "\nЧасы пик:");
        let _ = writeln!(out, "{}", peaks.to_text());
    }
    Some(out)
}

/// A chart as a table: one row per x label, one column per series
pub fn render_chart(spec: &ChartSpec) -> String {
    let mut out = String::new();

    for dataset in &spec.datasets {
        let axis = spec.axis(dataset.axis);
        let range = match axis.and_then(|a| a.max) {
            Some(max) => format!("0..{}", max),
            None => "0..".to_string(),
        };
        let side = match dataset.axis {
            AxisId::Left => "левая ось",
            AxisId::Right => "правая ось",
        };
        let _ = writeln!(out, "# {} ({}, {})", dataset.label, side, range);
    }

    let label_width = spec.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    for (row, label) in spec.labels.iter().enumerate() {
        let _ = write!(out, "{:<width$}", label, width = label_width);
        for dataset in &spec.datasets {
            match dataset.data.get(row).copied().flatten() {
                Some(value) => {
                    let _ = write!(out, "  {:>8.1}", value);
                }
                None => {
                    let _ = write!(out, "  {:>8}", "-");
                }
            }
        }
        out.push('\n');
    }

    out
}

/// Write a chart's series as CSV: a timestamp column plus one per series
pub fn write_chart_csv<W: io::Write>(spec: &ChartSpec, writer: W) -> csv::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["timestamp".to_string()];
    header.extend(spec.datasets.iter().map(|d| d.label.clone()));
    csv.write_record(&header)?;

    for (row, label) in spec.labels.iter().enumerate() {
        let mut record = vec![label.clone()];
        record.extend(spec.datasets.iter().map(|d| {
            d.data
                .get(row)
                .copied()
                .flatten()
                .map(|v| v.to_string())
                .unwrap_or_default()
        }));
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{analytics_chart, ChartHost};
    use crate::client::{AnalyticsStatistic, CurrentLoad};
    use crate::view::binder;

    fn stats() -> Vec<AnalyticsStatistic> {
        vec![
            AnalyticsStatistic {
                timestamp: "2024-03-05T08:00:00".into(),
                avg_load: Some(55.0),
                avg_people: Some(11.0),
                ..Default::default()
            },
            AnalyticsStatistic {
                timestamp: "2024-03-05T09:00:00".into(),
                avg_load: None,
                avg_people: Some(7.5),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_hidden_panel_renders_nothing() {
        let table = ComponentTable::default();
        let mut dom = MemoryDom::new();
        binder::hide_panels(&table, &mut dom);

        assert!(render_current_load(&dom, &table).is_none());
        assert!(render_analytics(&dom, &table).is_none());
    }

    #[test]
    fn test_current_load_text() {
        let table = ComponentTable::default();
        let mut dom = MemoryDom::new();
        let load = CurrentLoad {
            route_id: None,
            route_number: Some("5".into()),
            stop_id: None,
            stop_name: None,
            current_load: 8,
            load_percentage: Some(16.0),
            load_status: "free".into(),
            updated_at: "2024-03-05T14:07:09".into(),
            next_buses: Vec::new(),
        };
        binder::bind_current_load(&table, &mut dom, &load);

        let text = render_current_load(&dom, &table).unwrap();
        assert!(text.contains("Остановка:      Общая"));
        assert!(text.contains("Загруженность:  16.0%"));
        assert!(text.contains("Статус:         Свободно"));
        assert!(text.contains(binder::NO_BUSES));
    }

    #[test]
    fn test_chart_table_marks_gaps() {
        let text = render_chart(&analytics_chart(&stats()));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "# Средняя загруженность (%) (левая ось, 0..100)");
        assert_eq!(lines[1], "# Среднее количество людей (правая ось, 0..)");
        assert_eq!(lines.len(), 4);
        assert!(lines[3].starts_with("05.03.2024, 09:00:00"));
        assert!(lines[3].contains("       -"));
        assert!(lines[3].ends_with("7.5"));
    }

    #[test]
    fn test_chart_csv() {
        let mut out = Vec::new();
        write_chart_csv(&analytics_chart(&stats()), &mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("timestamp,Средняя загруженность (%),Среднее количество людей")
        );
        assert_eq!(lines.next(), Some("\"05.03.2024, 08:00:00\",55,11"));
        assert_eq!(lines.next(), Some("\"05.03.2024, 09:00:00\",,7.5"));
    }

    #[test]
    fn test_snapshot_serializes() {
        let table = ComponentTable::default();
        let mut dom = MemoryDom::new();
        binder::hide_panels(&table, &mut dom);
        dom.create_chart(&table.forecast_chart, analytics_chart(&stats()));

        let json = serde_json::to_value(snapshot(&dom, &table)).unwrap();
        assert!(json["current_load"].is_null());
        assert_eq!(json["forecast"]["kind"], "analytics");
        assert!(json["analytics"].is_null());
    }
}
