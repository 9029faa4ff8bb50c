//! View Binder
//!
//! Projects fetched payloads onto the surface through the component table.

use super::format::{format_percentage, format_timestamp};
use super::fragment::{Fragment, FragmentItem};
use super::surface::{ComponentTable, Surface};
use crate::client::{BusObservation, CurrentLoad, PeakHourEntry};
use crate::state::SelectList;

/// Peak-hour list length
pub const PEAK_HOURS_LIMIT: usize = 10;

pub const NO_BUSES: &str = "Нет данных об автобусах";
pub const NO_PEAK_HOURS: &str = "Нет данных о часах пик";
pub const NO_ANALYTICS: &str = "Нет данных за выбранный период";

/// Stop name the backend means when no stop filter was applied
const ALL_STOPS: &str = "Общая";

/// Human-readable label for a load status; unknown values pass through
pub fn status_label(status: &str) -> &str {
    match status {
        "free" => "Свободно",
        "medium" => "Средняя загрузка",
        "full" => "Заполнено",
        "crowded" => "Переполнено",
        other => other,
    }
}

/// Class list of a status indicator
pub fn status_class(status: &str) -> String {
    format!("status-indicator {}", status)
}

/// Fill the current-load panel and reveal it
pub fn bind_current_load<S: Surface + ?Sized>(
    table: &ComponentTable,
    surface: &mut S,
    load: &CurrentLoad,
) {
    let route_number = load.route_number.as_deref().unwrap_or("-");
    let stop_name = load.stop_name.as_deref().unwrap_or(ALL_STOPS);
    let percentage = load
        .load_percentage
        .map(format_percentage)
        .unwrap_or_else(|| "-".to_string());

    surface.set_text(&table.route_number, route_number);
    surface.set_text(&table.stop_name, stop_name);
    surface.set_text(&table.people_count, &load.current_load.to_string());
    surface.set_text(&table.load_percentage, &percentage);
    surface.set_text(&table.updated_at, &format_timestamp(&load.updated_at));

    surface.set_class(&table.status_indicator, &status_class(&load.load_status));
    surface.set_text(&table.status_text, status_label(&load.load_status));

    surface.set_fragment(&table.buses_list, buses_fragment(&load.next_buses));
    surface.set_hidden(&table.current_load_panel, false);
}

/// Bus cards, or the placeholder when there are none
pub fn buses_fragment(buses: &[BusObservation]) -> Fragment {
    if buses.is_empty() {
        return Fragment::Placeholder(NO_BUSES.to_string());
    }

    Fragment::Items(buses.iter().map(bus_item).collect())
}

fn bus_item(bus: &BusObservation) -> FragmentItem {
    let mut lines = Vec::new();

    if let Some(percentage) = bus.load_percentage {
        lines.push(format!("Загруженность: {}%", format_percentage(percentage)));
    }
    if let Some(confidence) = bus.confidence {
        lines.push(format!("Уверенность: {}%", format_percentage(confidence * 100.0)));
    }
    if let Some(people) = bus.current_load {
        let capacity = bus
            .max_capacity
            .map(|c| c.to_string())
            .unwrap_or_else(|| "?".to_string());
        lines.push(format!("Пассажиров: {}/{}", people, capacity));
    }
    if let Some(seen) = &bus.detection_time {
        lines.push(format!("Обнаружен: {}", format_timestamp(seen)));
    }

    FragmentItem {
        class: "bus-card".to_string(),
        heading: format!("Автобус {}", bus.vehicle_number),
        indicator: bus.load_status.clone(),
        lines,
    }
}

/// The first [`PEAK_HOURS_LIMIT`] entries in server order
pub fn peak_hours_fragment(peak_hours: &[PeakHourEntry]) -> Fragment {
    if peak_hours.is_empty() {
        return Fragment::Placeholder(NO_PEAK_HOURS.to_string());
    }

    let items = peak_hours
        .iter()
        .take(PEAK_HOURS_LIMIT)
        .map(|entry| FragmentItem {
            class: "peak-hour-item".to_string(),
            heading: format!("{}:00", entry.hour),
            indicator: None,
            lines: vec![format!(
                "Загруженность: {}% | Людей: {}",
                format_percentage(entry.average_load_percentage),
                format_percentage(entry.average_people_count)
            )],
        })
        .collect();

    Fragment::Items(items)
}

pub fn bind_peak_hours<S: Surface + ?Sized>(
    table: &ComponentTable,
    surface: &mut S,
    peak_hours: &[PeakHourEntry],
) {
    surface.set_fragment(&table.peak_hours_list, peak_hours_fragment(peak_hours));
}

/// Show the "no data for this period" notice, preferring the backend's wording
pub fn show_analytics_notice<S: Surface + ?Sized>(
    table: &ComponentTable,
    surface: &mut S,
    message: Option<&str>,
) {
    let message = message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(NO_ANALYTICS);
    surface.set_text(&table.analytics_notice, message);
    surface.set_hidden(&table.analytics_notice, false);
}

/// Hide everything a fresh analytics load will replace
pub fn reset_analytics<S: Surface + ?Sized>(table: &ComponentTable, surface: &mut S) {
    surface.set_hidden(&table.analytics_results, true);
    surface.set_hidden(&table.analytics_notice, true);
}

pub fn bind_select<S: Surface + ?Sized>(surface: &mut S, target: &str, list: &SelectList) {
    surface.set_options(target, list);
}

/// Initial visibility: every result panel starts hidden
pub fn hide_panels<S: Surface + ?Sized>(table: &ComponentTable, surface: &mut S) {
    for panel in table.panels() {
        surface.set_hidden(panel, true);
    }
}

/// Notification text for a failed fetch
pub fn failure_message(base: &str, status: Option<u16>) -> String {
    match status {
        Some(code) => format!("{} (HTTP {})", base, code),
        None => base.to_string(),
    }
}
