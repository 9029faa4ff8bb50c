//! Event Wiring
//!
//! [`Dashboard`] owns the view state and turns [`UiEvent`]s into backend
//! fetches and surface updates.
//!
//! Every fetch is stamped by the request sequence before it starts. The
//! `apply_*` methods check the stamp first, so a response that lost a race
//! with a newer selection is dropped without touching the surface.
//!
//! [`Dashboard::dispatch`] runs one event's fetches to completion before it
//! returns, so its own fetches never overlap. A host that runs fetches
//! concurrently drives the same path itself: [`Dashboard::begin`] for the
//! token, its own `TransitApi` call, then the matching `apply_*`.

mod event;

pub use event::{DashboardSettings, Outcome, UiEvent};

use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::chart::{self, ChartHost};
use crate::client::{
    ClientResult, CurrentLoad, ForecastPoint, Id, LoadStatistics, PeakHours, Route, Stop,
    TransitApi,
};
use crate::state::{Channel, RequestToken, Tab, Topology, UiPhase, ViewState};
use crate::view::binder;
use crate::view::{ComponentTable, Surface};

const ROUTES_FAILED: &str = "Не удалось загрузить маршруты";
const STOPS_FAILED: &str = "Не удалось загрузить остановки";
const LOAD_FAILED: &str = "Не удалось загрузить данные о загруженности";
const ANALYTICS_FAILED: &str = "Не удалось загрузить аналитику";
const SELECT_ROUTE: &str = "Выберите маршрут";
const SELECT_STOP: &str = "Выберите остановку";

pub struct Dashboard<A> {
    api: A,
    components: ComponentTable,
    settings: DashboardSettings,
    state: ViewState,
}

impl<A: TransitApi> Dashboard<A> {
    pub fn new(api: A, components: ComponentTable, settings: DashboardSettings) -> Self {
        let state = ViewState::new(settings.topology, settings.analytics_days);
        Self {
            api,
            components,
            settings,
            state,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn components(&self) -> &ComponentTable {
        &self.components
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn phase(&self) -> UiPhase {
        self.state.phase
    }

    /// Stamp a fetch on `channel`, superseding any earlier one. Pass the
    /// token to the matching `apply_*` once the response arrives.
    ///
    /// ```
    /// use transit_dashboard::{ApiClient, Channel, ClientConfig, ComponentTable, Dashboard,
    ///     DashboardSettings, MemoryDom, Outcome};
    ///
    /// let api = ApiClient::new(ClientConfig::default())?;
    /// let mut dashboard = Dashboard::new(api, ComponentTable::default(), DashboardSettings::default());
    /// let mut dom = MemoryDom::new();
    ///
    /// let older = dashboard.begin(Channel::Routes);
    /// let newer = dashboard.begin(Channel::Routes);
    ///
    /// assert_eq!(dashboard.apply_routes(older, Ok(Vec::new()), &mut dom), Outcome::Stale);
    /// assert_eq!(dashboard.apply_routes(newer, Ok(Vec::new()), &mut dom), Outcome::Empty);
    /// # Ok::<(), transit_dashboard::ClientError>(())
    /// ```
    pub fn begin(&mut self, channel: Channel) -> RequestToken {
        self.state.tokens.issue(channel)
    }

    /// Handle one event to completion and return the resulting phase
    pub async fn dispatch<U>(&mut self, event: UiEvent, ui: &mut U) -> UiPhase
    where
        U: Surface + ChartHost,
    {
        let span = tracing::info_span!(
            "dispatch",
            request_id = %Uuid::new_v4(),
            event = event.kind(),
        );

        self.handle(event, ui).instrument(span).await;
        self.state.phase
    }

    async fn handle<U>(&mut self, event: UiEvent, ui: &mut U)
    where
        U: Surface + ChartHost,
    {
        match event {
            UiEvent::Init => self.init(ui).await,
            UiEvent::RouteSelected(route) => self.route_selected(route, ui).await,
            UiEvent::StopSelected(stop) => self.stop_selected(stop, ui).await,
            UiEvent::TabOpened(tab) => self.tab_opened(tab, ui).await,
            UiEvent::AnalyticsRouteSelected(route) => {
                self.analytics_route_selected(route, ui).await
            }
            UiEvent::AnalyticsStopSelected(stop) => {
                self.state.analytics.select_stop(stop);
                self.bind_analytics_selects(ui);
            }
            UiEvent::PeriodChanged(days) => self.period_changed(days),
            UiEvent::LoadAnalytics => self.load_analytics(ui).await,
            UiEvent::Refresh => self.refresh_live(ui).await,
        }
    }

    async fn init<U>(&mut self, ui: &mut U)
    where
        U: Surface + ChartHost,
    {
        binder::hide_panels(&self.components, ui);
        self.state.phase = UiPhase::NoSelection;
        self.bind_live_selects(ui);
        self.bind_analytics_selects(ui);

        match self.settings.topology {
            Topology::RouteStop => {
                let token = self.begin(Channel::Routes);
                let result = self.api.routes().await;
                self.apply_routes(token, result, ui);
            }
            Topology::StopOnly => {
                let token = self.begin(Channel::Stops);
                let result = self.api.stops(None).await;
                self.apply_stops(token, result, ui);
            }
        }
    }

    async fn route_selected<U>(&mut self, route: Option<Id>, ui: &mut U)
    where
        U: Surface + ChartHost,
    {
        if self.settings.topology == Topology::StopOnly {
            warn!("Route selection ignored in stop-only topology");
            return;
        }

        let requested = route.clone();
        let selected = self.state.live.select_route(route);

        // Anything in flight for the old route is now stale
        self.state.tokens.invalidate(Channel::Stops);
        self.state.tokens.invalidate(Channel::CurrentLoad);
        self.state.tokens.invalidate(Channel::Forecast);
        self.bind_live_selects(ui);

        let Some(route_id) = selected else {
            if let Some(unknown) = requested {
                warn!(route_id = %unknown, "Unknown route selected");
            }
            self.state.phase = UiPhase::NoSelection;
            return;
        };

        self.state.phase = UiPhase::SelectedNoData;
        let token = self.begin(Channel::Stops);
        let result = self.api.stops(Some(&route_id)).await;
        self.apply_stops(token, result, ui);
    }

    async fn stop_selected<U>(&mut self, stop: Option<Id>, ui: &mut U)
    where
        U: Surface + ChartHost,
    {
        let requested = stop.clone();
        let selected = self.state.live.select_stop(stop);

        self.state.tokens.invalidate(Channel::CurrentLoad);
        self.state.tokens.invalidate(Channel::Forecast);
        self.bind_live_selects(ui);

        if selected.is_none() {
            if let Some(unknown) = requested {
                warn!(stop_id = %unknown, "Unknown stop selected");
            }
            self.state.phase = self.state.live_selection_phase();
            return;
        }

        self.state.phase = UiPhase::SelectedNoData;
        self.refresh_live(ui).await;
    }

    /// Current load, then forecast, for the live selection
    async fn refresh_live<U>(&mut self, ui: &mut U)
    where
        U: Surface + ChartHost,
    {
        let Some(target) = self.state.live.load_target() else {
            debug!("No complete selection, nothing to refresh");
            return;
        };

        let token = self.begin(Channel::CurrentLoad);
        let result = self.api.current_load(&target).await;
        self.apply_current_load(token, result, ui);

        let token = self.begin(Channel::Forecast);
        let result = self
            .api
            .forecast(&target, self.settings.forecast_hours)
            .await;
        self.apply_forecast(token, result, ui);
    }

    async fn tab_opened<U>(&mut self, tab: Tab, ui: &mut U)
    where
        U: Surface + ChartHost,
    {
        self.state.tab = tab;
        if tab != Tab::Analytics {
            return;
        }

        match self.settings.topology {
            Topology::RouteStop => {
                let token = self.begin(Channel::AnalyticsRoutes);
                let result = self.api.routes().await;
                self.apply_analytics_routes(token, result, ui);
            }
            Topology::StopOnly => {
                let token = self.begin(Channel::AnalyticsStops);
                let result = self.api.stops(None).await;
                self.apply_analytics_stops(token, result, ui);
            }
        }
    }

    async fn analytics_route_selected<U>(&mut self, route: Option<Id>, ui: &mut U)
    where
        U: Surface + ChartHost,
    {
        if self.settings.topology == Topology::StopOnly {
            warn!("Analytics route selection ignored in stop-only topology");
            return;
        }

        let selected = self.state.analytics.select_route(route);
        self.state.tokens.invalidate(Channel::AnalyticsStops);
        self.bind_analytics_selects(ui);

        let Some(route_id) = selected else {
            return;
        };

        let token = self.begin(Channel::AnalyticsStops);
        let result = self.api.stops(Some(&route_id)).await;
        self.apply_analytics_stops(token, result, ui);
    }

    fn period_changed(&mut self, days: u32) {
        if days == 0 {
            warn!("Ignoring empty analytics period");
            return;
        }
        self.state.analytics_days = days;
    }

    async fn load_analytics<U>(&mut self, ui: &mut U)
    where
        U: Surface + ChartHost,
    {
        let Some(target) = self.state.analytics.load_target() else {
            let prompt = match self.settings.topology {
                Topology::RouteStop => SELECT_ROUTE,
                Topology::StopOnly => SELECT_STOP,
            };
            ui.notify(prompt);
            return;
        };

        binder::reset_analytics(&self.components, ui);
        let previous = self.state.phase;
        self.state.phase = UiPhase::AnalyticsRequested;

        let days = self.state.analytics_days;
        let token = self.begin(Channel::Analytics);
        let result = self.api.load_statistics(&target, days).await;
        match self.apply_statistics(token, result, ui) {
            Outcome::Rendered => {}
            Outcome::Failed => {
                self.state.phase = previous;
                return;
            }
            Outcome::Empty | Outcome::Stale => return,
        }

        let result = self.api.peak_hours(&target, days).await;
        if self.apply_peak_hours(token, result, ui) == Outcome::Failed {
            self.state.phase = previous;
        }
    }

    fn accept(&self, token: RequestToken) -> bool {
        let current = self.state.tokens.is_current(token);
        if !current {
            debug!(
                channel = ?token.channel(),
                seq = token.seq(),
                "Dropping stale response"
            );
        }
        current
    }

    pub fn apply_routes<U: Surface + ?Sized>(
        &mut self,
        token: RequestToken,
        result: ClientResult<Vec<Route>>,
        ui: &mut U,
    ) -> Outcome {
        if !self.accept(token) {
            return Outcome::Stale;
        }

        match result {
            Ok(routes) => {
                debug!(count = routes.len(), "Routes loaded");
                self.state.live.set_routes(&routes);
                self.bind_live_selects(ui);
                if routes.is_empty() {
                    Outcome::Empty
                } else {
                    Outcome::Rendered
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to load routes");
                ui.notify(&binder::failure_message(ROUTES_FAILED, e.status()));
                Outcome::Failed
            }
        }
    }

    /// Live stop list. A failure is only surfaced when stops are the primary
    /// list (stop-only topology).
    pub fn apply_stops<U: Surface + ?Sized>(
        &mut self,
        token: RequestToken,
        result: ClientResult<Vec<Stop>>,
        ui: &mut U,
    ) -> Outcome {
        if !self.accept(token) {
            return Outcome::Stale;
        }

        match result {
            Ok(stops) => {
                debug!(count = stops.len(), "Stops loaded");
                self.state.live.set_stops(&stops);
                self.bind_live_selects(ui);
                if stops.is_empty() {
                    Outcome::Empty
                } else {
                    Outcome::Rendered
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to load stops");
                if self.settings.topology == Topology::StopOnly {
                    ui.notify(&binder::failure_message(STOPS_FAILED, e.status()));
                }
                Outcome::Failed
            }
        }
    }

    pub fn apply_current_load<U: Surface + ?Sized>(
        &mut self,
        token: RequestToken,
        result: ClientResult<CurrentLoad>,
        ui: &mut U,
    ) -> Outcome {
        if !self.accept(token) {
            return Outcome::Stale;
        }

        match result {
            Ok(load) => {
                binder::bind_current_load(&self.components, ui, &load);
                self.state.phase = UiPhase::DataDisplayed;
                info!(
                    status = %load.load_status,
                    people = load.current_load,
                    buses = load.next_buses.len(),
                    "Current load displayed"
                );
                Outcome::Rendered
            }
            Err(e) => {
                warn!(error = %e, "Failed to load current load");
                ui.notify(&binder::failure_message(LOAD_FAILED, e.status()));
                Outcome::Failed
            }
        }
    }

    /// Forecast failures are logged only; the previous chart stays up
    pub fn apply_forecast<H: ChartHost + ?Sized>(
        &mut self,
        token: RequestToken,
        result: ClientResult<Vec<ForecastPoint>>,
        host: &mut H,
    ) -> Outcome {
        if !self.accept(token) {
            return Outcome::Stale;
        }

        match result {
            Ok(points) if points.is_empty() => {
                debug!("Empty forecast");
                self.state.charts.clear(host, &self.components.forecast_chart);
                Outcome::Empty
            }
            Ok(points) => {
                let spec = chart::forecast_chart(&points, self.settings.forecast_unit);
                self.state
                    .charts
                    .render(host, &self.components.forecast_chart, spec);
                debug!(points = points.len(), "Forecast chart rendered");
                Outcome::Rendered
            }
            Err(e) => {
                warn!(error = %e, "Failed to load forecast");
                Outcome::Failed
            }
        }
    }

    pub fn apply_analytics_routes<U: Surface + ?Sized>(
        &mut self,
        token: RequestToken,
        result: ClientResult<Vec<Route>>,
        ui: &mut U,
    ) -> Outcome {
        if !self.accept(token) {
            return Outcome::Stale;
        }

        match result {
            Ok(routes) => {
                self.state.analytics.set_routes(&routes);
                self.bind_analytics_selects(ui);
                if routes.is_empty() {
                    Outcome::Empty
                } else {
                    Outcome::Rendered
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to load analytics routes");
                Outcome::Failed
            }
        }
    }

    pub fn apply_analytics_stops<U: Surface + ?Sized>(
        &mut self,
        token: RequestToken,
        result: ClientResult<Vec<Stop>>,
        ui: &mut U,
    ) -> Outcome {
        if !self.accept(token) {
            return Outcome::Stale;
        }

        match result {
            Ok(stops) => {
                self.state.analytics.set_stops(&stops);
                self.bind_analytics_selects(ui);
                if stops.is_empty() {
                    Outcome::Empty
                } else {
                    Outcome::Rendered
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to load analytics stops");
                Outcome::Failed
            }
        }
    }

    /// Statistics half of an analytics load. An empty period shows the
    /// notice and never reaches the chart renderer.
    pub fn apply_statistics<U>(
        &mut self,
        token: RequestToken,
        result: ClientResult<LoadStatistics>,
        ui: &mut U,
    ) -> Outcome
    where
        U: Surface + ChartHost + ?Sized,
    {
        if !self.accept(token) {
            return Outcome::Stale;
        }

        match result {
            Ok(stats) if stats.statistics.is_empty() => {
                info!("No analytics for the selected period");
                binder::show_analytics_notice(&self.components, ui, stats.message.as_deref());
                self.state.phase = UiPhase::AnalyticsDisplayed;
                Outcome::Empty
            }
            Ok(stats) => {
                let spec = chart::analytics_chart(&stats.statistics);
                self.state
                    .charts
                    .render(ui, &self.components.analytics_chart, spec);
                debug!(rows = stats.statistics.len(), "Analytics chart rendered");
                Outcome::Rendered
            }
            Err(e) => {
                warn!(error = %e, "Failed to load statistics");
                ui.notify(&binder::failure_message(ANALYTICS_FAILED, e.status()));
                Outcome::Failed
            }
        }
    }

    /// Peak-hours half of an analytics load; reveals the results panel
    pub fn apply_peak_hours<U: Surface + ?Sized>(
        &mut self,
        token: RequestToken,
        result: ClientResult<PeakHours>,
        ui: &mut U,
    ) -> Outcome {
        if !self.accept(token) {
            return Outcome::Stale;
        }

        match result {
            Ok(peaks) => {
                binder::bind_peak_hours(&self.components, ui, &peaks.peak_hours);
                ui.set_hidden(&self.components.analytics_results, false);
                self.state.phase = UiPhase::AnalyticsDisplayed;
                if peaks.peak_hours.is_empty() {
                    Outcome::Empty
                } else {
                    Outcome::Rendered
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to load peak hours");
                ui.notify(&binder::failure_message(ANALYTICS_FAILED, e.status()));
                Outcome::Failed
            }
        }
    }

    fn bind_live_selects<U: Surface + ?Sized>(&self, ui: &mut U) {
        if self.settings.topology == Topology::RouteStop {
            binder::bind_select(ui, &self.components.route_select, self.state.live.routes());
        }
        binder::bind_select(ui, &self.components.stop_select, self.state.live.stops());
    }

    fn bind_analytics_selects<U: Surface + ?Sized>(&self, ui: &mut U) {
        if self.settings.topology == Topology::RouteStop {
            binder::bind_select(
                ui,
                &self.components.analytics_route_select,
                self.state.analytics.routes(),
            );
        }
        binder::bind_select(
            ui,
            &self.components.analytics_stop_select,
            self.state.analytics.stops(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{AxisId, LoadUnit};
    use crate::client::{AnalyticsStatistic, ClientError, LoadTarget, PeakHourEntry};
    use crate::view::MemoryDom;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        routes: Vec<Route>,
        stops_by_route: HashMap<String, Vec<Stop>>,
        all_stops: Vec<Stop>,
        load: Option<CurrentLoad>,
        forecast: Vec<ForecastPoint>,
        statistics: LoadStatistics,
        peak_hours: Vec<PeakHourEntry>,
        fail_routes: bool,
        fail_stops: bool,
        fail_forecast: bool,
        fail_statistics: bool,
        fail_peak_hours: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn called(&self, prefix: &str) -> bool {
            self.calls().iter().any(|c| c.starts_with(prefix))
        }
    }

    fn describe(target: &LoadTarget) -> String {
        match &target.stop_id {
            Some(stop) => format!("{}?stop_id={}", target.id, stop),
            None => target.id.to_string(),
        }
    }

    fn unavailable() -> ClientError {
        ClientError::Status {
            status: 503,
            message: "Service Unavailable".into(),
        }
    }

    #[async_trait]
    impl TransitApi for FakeApi {
        async fn routes(&self) -> ClientResult<Vec<Route>> {
            self.record("routes".into());
            if self.fail_routes {
                return Err(unavailable());
            }
            Ok(self.routes.clone())
        }

        async fn stops(&self, route_id: Option<&Id>) -> ClientResult<Vec<Stop>> {
            match route_id {
                Some(id) => self.record(format!("stops {}", id)),
                None => self.record("stops".into()),
            }
            if self.fail_stops {
                return Err(unavailable());
            }
            Ok(match route_id {
                Some(id) => self
                    .stops_by_route
                    .get(id.as_str())
                    .cloned()
                    .unwrap_or_default(),
                None => self.all_stops.clone(),
            })
        }

        async fn current_load(&self, target: &LoadTarget) -> ClientResult<CurrentLoad> {
            self.record(format!("current_load {}", describe(target)));
            self.load.clone().ok_or_else(unavailable)
        }

        async fn forecast(
            &self,
            target: &LoadTarget,
            hours: u32,
        ) -> ClientResult<Vec<ForecastPoint>> {
            self.record(format!("forecast {} {}", describe(target), hours));
            if self.fail_forecast {
                return Err(unavailable());
            }
            Ok(self.forecast.clone())
        }

        async fn load_statistics(
            &self,
            target: &LoadTarget,
            days: u32,
        ) -> ClientResult<LoadStatistics> {
            self.record(format!("load_statistics {} {}", describe(target), days));
            if self.fail_statistics {
                return Err(unavailable());
            }
            Ok(self.statistics.clone())
        }

        async fn peak_hours(&self, target: &LoadTarget, days: u32) -> ClientResult<PeakHours> {
            self.record(format!("peak_hours {} {}", describe(target), days));
            if self.fail_peak_hours {
                return Err(unavailable());
            }
            Ok(PeakHours {
                peak_hours: self.peak_hours.clone(),
            })
        }
    }

    fn route(id: u64, number: &str) -> Route {
        Route {
            id: Id::from(id),
            number: number.into(),
            name: None,
        }
    }

    fn stop(id: u64, name: &str) -> Stop {
        Stop {
            id: Id::from(id),
            name: name.into(),
        }
    }

    fn free_load() -> CurrentLoad {
        CurrentLoad {
            route_id: Some(Id::from(1)),
            route_number: Some("5".into()),
            stop_id: Some(Id::from(10)),
            stop_name: Some("Центральная".into()),
            current_load: 5,
            load_percentage: Some(10.0),
            load_status: "free".into(),
            updated_at: "2024-03-05T14:07:09".into(),
            next_buses: Vec::new(),
        }
    }

    fn forecast(n: usize) -> Vec<ForecastPoint> {
        (0..n)
            .map(|h| ForecastPoint {
                forecast_time: format!("2024-03-05T{:02}:00:00", h),
                predicted_load: 20.0 + h as f64,
                confidence_interval_lower: None,
                confidence_interval_upper: None,
            })
            .collect()
    }

    fn backend() -> FakeApi {
        let mut stops_by_route = HashMap::new();
        stops_by_route.insert("1".to_string(), vec![stop(10, "Центральная"), stop(11, "Вокзал")]);
        stops_by_route.insert("2".to_string(), vec![stop(20, "Парк")]);

        FakeApi {
            routes: vec![route(1, "5"), route(2, "12")],
            stops_by_route,
            all_stops: vec![stop(3, "Площадь")],
            load: Some(free_load()),
            forecast: forecast(24),
            ..Default::default()
        }
    }

    fn dashboard(api: FakeApi) -> Dashboard<FakeApi> {
        Dashboard::new(api, ComponentTable::default(), DashboardSettings::default())
    }

    async fn select_live(dash: &mut Dashboard<FakeApi>, dom: &mut MemoryDom) -> UiPhase {
        dash.dispatch(UiEvent::Init, dom).await;
        dash.dispatch(UiEvent::RouteSelected(Some(Id::from(1))), dom)
            .await;
        dash.dispatch(UiEvent::StopSelected(Some(Id::from(10))), dom)
            .await
    }

    #[tokio::test]
    async fn test_init_fills_routes_and_hides_panels() {
        let mut dash = dashboard(backend());
        let mut dom = MemoryDom::new();

        let phase = dash.dispatch(UiEvent::Init, &mut dom).await;
        let table = dash.components().clone();

        assert_eq!(phase, UiPhase::NoSelection);
        for panel in table.panels() {
            assert!(dom.is_hidden(panel));
        }
        let routes = dom.options(&table.route_select).unwrap();
        assert_eq!(routes.placeholder(), "Выберите маршрут");
        assert_eq!(routes.options().len(), 2);
        assert!(dom.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_routes_failure_notifies() {
        let api = FakeApi {
            fail_routes: true,
            ..backend()
        };
        let mut dash = dashboard(api);
        let mut dom = MemoryDom::new();

        dash.dispatch(UiEvent::Init, &mut dom).await;

        assert_eq!(
            dom.notifications(),
            &["Не удалось загрузить маршруты (HTTP 503)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_free_stop_is_displayed() {
        let mut dash = dashboard(backend());
        let mut dom = MemoryDom::new();

        let phase = select_live(&mut dash, &mut dom).await;
        let table = dash.components().clone();

        assert_eq!(phase, UiPhase::DataDisplayed);
        assert!(!dom.is_hidden(&table.current_load_panel));
        assert!(dom.has_class(&table.status_indicator, "free"));
        assert_eq!(dom.text(&table.status_text), Some("Свободно"));
        assert_eq!(dom.text(&table.load_percentage), Some("10.0"));

        let calls = dash.api().calls();
        assert!(calls.contains(&"current_load 1?stop_id=10".to_string()));
        assert!(calls.contains(&"forecast 1?stop_id=10 24".to_string()));
    }

    #[tokio::test]
    async fn test_forecast_chart_has_one_point_per_entry() {
        let mut dash = dashboard(backend());
        let mut dom = MemoryDom::new();

        select_live(&mut dash, &mut dom).await;

        let charts = dom.charts_on(&dash.components().forecast_chart);
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].labels.len(), 24);
        assert_eq!(charts[0].datasets[0].data.len(), 24);
        assert_eq!(charts[0].axis(AxisId::Left).unwrap().max, Some(100.0));
    }

    #[tokio::test]
    async fn test_reselecting_keeps_one_chart_per_canvas() {
        let mut dash = dashboard(backend());
        let mut dom = MemoryDom::new();

        select_live(&mut dash, &mut dom).await;
        dash.dispatch(UiEvent::StopSelected(Some(Id::from(11))), &mut dom)
            .await;
        dash.dispatch(UiEvent::Refresh, &mut dom).await;

        assert_eq!(dom.charts_on(&dash.components().forecast_chart).len(), 1);
        assert_eq!(dom.chart_count(), 1);
        assert_eq!(dom.destroyed_charts(), 2);
    }

    #[tokio::test]
    async fn test_route_change_clears_stop() {
        let mut dash = dashboard(backend());
        let mut dom = MemoryDom::new();

        select_live(&mut dash, &mut dom).await;
        let phase = dash
            .dispatch(UiEvent::RouteSelected(Some(Id::from(2))), &mut dom)
            .await;

        assert_eq!(phase, UiPhase::SelectedNoData);
        assert_eq!(dash.state().live.stop(), None);
        let stops = dom.options(&dash.components().stop_select).unwrap();
        assert_eq!(stops.selected(), None);
        assert_eq!(stops.options().len(), 1);
        assert_eq!(stops.options()[0].label, "Парк");
    }

    #[tokio::test]
    async fn test_placeholder_route_returns_to_no_selection() {
        let mut dash = dashboard(backend());
        let mut dom = MemoryDom::new();

        select_live(&mut dash, &mut dom).await;
        let phase = dash.dispatch(UiEvent::RouteSelected(None), &mut dom).await;

        assert_eq!(phase, UiPhase::NoSelection);
        assert!(dom
            .options(&dash.components().stop_select)
            .unwrap()
            .options()
            .is_empty());
    }

    #[tokio::test]
    async fn test_stale_current_load_is_dropped() {
        let mut dash = dashboard(backend());
        let mut dom = MemoryDom::new();
        dash.dispatch(UiEvent::Init, &mut dom).await;

        let stale = dash.begin(Channel::CurrentLoad);
        let fresh = dash.begin(Channel::CurrentLoad);

        let outcome = dash.apply_current_load(stale, Ok(free_load()), &mut dom);
        assert_eq!(outcome, Outcome::Stale);
        assert_eq!(dom.text(&dash.components().people_count), None);

        let outcome = dash.apply_current_load(fresh, Ok(free_load()), &mut dom);
        assert_eq!(outcome, Outcome::Rendered);
        assert_eq!(dom.text(&dash.components().people_count), Some("5"));
    }

    #[tokio::test]
    async fn test_route_change_supersedes_inflight_load() {
        let mut dash = dashboard(backend());
        let mut dom = MemoryDom::new();
        select_live(&mut dash, &mut dom).await;

        let inflight = dash.begin(Channel::Forecast);
        dash.dispatch(UiEvent::RouteSelected(Some(Id::from(2))), &mut dom)
            .await;

        let outcome = dash.apply_forecast(inflight, Ok(forecast(3)), &mut dom);
        assert_eq!(outcome, Outcome::Stale);
        let charts = dom.charts_on(&dash.components().forecast_chart);
        assert_eq!(charts[0].labels.len(), 24);
    }

    #[tokio::test]
    async fn test_current_load_failure_notifies() {
        let api = FakeApi {
            load: None,
            ..backend()
        };
        let mut dash = dashboard(api);
        let mut dom = MemoryDom::new();

        let phase = select_live(&mut dash, &mut dom).await;

        assert_eq!(phase, UiPhase::SelectedNoData);
        assert!(dom.is_hidden(&dash.components().current_load_panel));
        assert_eq!(
            dom.notifications(),
            &["Не удалось загрузить данные о загруженности (HTTP 503)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_empty_forecast_clears_chart() {
        let mut dash = dashboard(backend());
        let mut dom = MemoryDom::new();
        select_live(&mut dash, &mut dom).await;

        let token = dash.begin(Channel::Forecast);
        let outcome = dash.apply_forecast(token, Ok(Vec::new()), &mut dom);

        assert_eq!(outcome, Outcome::Empty);
        assert!(dom.charts_on(&dash.components().forecast_chart).is_empty());
    }

    #[tokio::test]
    async fn test_empty_analytics_shows_notice_without_chart() {
        let mut dash = dashboard(backend());
        let mut dom = MemoryDom::new();

        dash.dispatch(UiEvent::Init, &mut dom).await;
        dash.dispatch(UiEvent::TabOpened(Tab::Analytics), &mut dom)
            .await;
        dash.dispatch(UiEvent::AnalyticsRouteSelected(Some(Id::from(1))), &mut dom)
            .await;
        let phase = dash.dispatch(UiEvent::LoadAnalytics, &mut dom).await;
        let table = dash.components().clone();

        assert_eq!(phase, UiPhase::AnalyticsDisplayed);
        assert_eq!(dom.text(&table.analytics_notice), Some(binder::NO_ANALYTICS));
        assert!(!dom.is_hidden(&table.analytics_notice));
        assert!(dom.is_hidden(&table.analytics_results));
        assert!(dom.charts_on(&table.analytics_chart).is_empty());
        assert!(!dash.api().called("peak_hours"));
    }

    #[tokio::test]
    async fn test_analytics_with_data() {
        let statistics = LoadStatistics {
            statistics: (8..11)
                .map(|h| AnalyticsStatistic {
                    timestamp: format!("2024-03-05T{:02}:00:00", h),
                    avg_load: Some(40.0),
                    avg_people: Some(8.0),
                    ..Default::default()
                })
                .collect(),
            message: None,
        };
        let peak_hours = (0..15)
            .map(|hour| PeakHourEntry {
                hour,
                average_load_percentage: 50.0,
                average_people_count: 10.0,
            })
            .collect();
        let api = FakeApi {
            statistics,
            peak_hours,
            ..backend()
        };
        let mut dash = dashboard(api);
        let mut dom = MemoryDom::new();

        dash.dispatch(UiEvent::Init, &mut dom).await;
        dash.dispatch(UiEvent::TabOpened(Tab::Analytics), &mut dom)
            .await;
        dash.dispatch(UiEvent::AnalyticsRouteSelected(Some(Id::from(1))), &mut dom)
            .await;
        dash.dispatch(UiEvent::AnalyticsStopSelected(Some(Id::from(11))), &mut dom)
            .await;
        dash.dispatch(UiEvent::PeriodChanged(30), &mut dom).await;
        let phase = dash.dispatch(UiEvent::LoadAnalytics, &mut dom).await;
        let table = dash.components().clone();

        assert_eq!(phase, UiPhase::AnalyticsDisplayed);
        assert!(!dom.is_hidden(&table.analytics_results));
        assert!(dom.is_hidden(&table.analytics_notice));

        let charts = dom.charts_on(&table.analytics_chart);
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].datasets.len(), 2);
        assert_eq!(charts[0].labels.len(), 3);

        let peaks = dom.fragment(&table.peak_hours_list).unwrap();
        assert_eq!(peaks.items().len(), binder::PEAK_HOURS_LIMIT);

        let calls = dash.api().calls();
        assert!(calls.contains(&"load_statistics 1?stop_id=11 30".to_string()));
        assert!(calls.contains(&"peak_hours 1?stop_id=11 30".to_string()));
    }

    #[tokio::test]
    async fn test_analytics_requires_route() {
        let mut dash = dashboard(backend());
        let mut dom = MemoryDom::new();

        dash.dispatch(UiEvent::Init, &mut dom).await;
        dash.dispatch(UiEvent::LoadAnalytics, &mut dom).await;

        assert_eq!(dom.notifications(), &["Выберите маршрут".to_string()]);
        assert!(!dash.api().called("load_statistics"));
    }

    #[tokio::test]
    async fn test_stop_only_topology() {
        let settings = DashboardSettings {
            topology: Topology::StopOnly,
            forecast_unit: LoadUnit::Count,
            forecast_hours: 12,
            ..Default::default()
        };
        let mut dash = Dashboard::new(backend(), ComponentTable::default(), settings);
        let mut dom = MemoryDom::new();

        dash.dispatch(UiEvent::Init, &mut dom).await;
        let phase = dash
            .dispatch(UiEvent::StopSelected(Some(Id::from(3))), &mut dom)
            .await;

        assert_eq!(phase, UiPhase::DataDisplayed);
        assert!(!dash.api().called("routes"));
        let calls = dash.api().calls();
        assert!(calls.contains(&"current_load 3".to_string()));
        assert!(calls.contains(&"forecast 3 12".to_string()));

        let charts = dom.charts_on(&dash.components().forecast_chart);
        assert_eq!(charts[0].axis(AxisId::Left).unwrap().max, None);
    }

    #[tokio::test]
    async fn test_forecast_failure_is_silent() {
        let api = FakeApi {
            fail_forecast: true,
            ..backend()
        };
        let mut dash = dashboard(api);
        let mut dom = MemoryDom::new();

        let phase = select_live(&mut dash, &mut dom).await;

        assert_eq!(phase, UiPhase::DataDisplayed);
        assert!(dash.api().called("forecast"));
        assert!(dom.notifications().is_empty());
        assert!(dom.charts_on(&dash.components().forecast_chart).is_empty());
    }

    #[tokio::test]
    async fn test_route_stops_failure_is_silent() {
        let api = FakeApi {
            fail_stops: true,
            ..backend()
        };
        let mut dash = dashboard(api);
        let mut dom = MemoryDom::new();

        dash.dispatch(UiEvent::Init, &mut dom).await;
        let phase = dash
            .dispatch(UiEvent::RouteSelected(Some(Id::from(1))), &mut dom)
            .await;

        assert_eq!(phase, UiPhase::SelectedNoData);
        assert!(dash.api().called("stops 1"));
        assert!(dom.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_stop_only_stops_failure_notifies() {
        let api = FakeApi {
            fail_stops: true,
            ..backend()
        };
        let settings = DashboardSettings {
            topology: Topology::StopOnly,
            ..Default::default()
        };
        let mut dash = Dashboard::new(api, ComponentTable::default(), settings);
        let mut dom = MemoryDom::new();

        dash.dispatch(UiEvent::Init, &mut dom).await;

        assert_eq!(
            dom.notifications(),
            &["Не удалось загрузить остановки (HTTP 503)".to_string()]
        );
    }

    fn busy_statistics() -> LoadStatistics {
        LoadStatistics {
            statistics: vec![AnalyticsStatistic {
                timestamp: "2024-03-05T08:00:00".into(),
                avg_load: Some(40.0),
                avg_people: Some(8.0),
                ..Default::default()
            }],
            message: None,
        }
    }

    async fn request_route_analytics(
        dash: &mut Dashboard<FakeApi>,
        dom: &mut MemoryDom,
    ) -> UiPhase {
        dash.dispatch(UiEvent::TabOpened(Tab::Analytics), dom).await;
        dash.dispatch(UiEvent::AnalyticsRouteSelected(Some(Id::from(1))), dom)
            .await;
        dash.dispatch(UiEvent::LoadAnalytics, dom).await
    }

    #[tokio::test]
    async fn test_statistics_failure_restores_phase() {
        let api = FakeApi {
            fail_statistics: true,
            ..backend()
        };
        let mut dash = dashboard(api);
        let mut dom = MemoryDom::new();

        select_live(&mut dash, &mut dom).await;
        let phase = request_route_analytics(&mut dash, &mut dom).await;

        assert_eq!(phase, UiPhase::DataDisplayed);
        assert_eq!(
            dom.notifications(),
            &["Не удалось загрузить аналитику (HTTP 503)".to_string()]
        );
        assert!(dom.is_hidden(&dash.components().analytics_results));
        assert!(!dash.api().called("peak_hours"));
    }

    #[tokio::test]
    async fn test_peak_hours_failure_keeps_results_hidden() {
        let api = FakeApi {
            statistics: busy_statistics(),
            fail_peak_hours: true,
            ..backend()
        };
        let mut dash = dashboard(api);
        let mut dom = MemoryDom::new();

        dash.dispatch(UiEvent::Init, &mut dom).await;
        let phase = request_route_analytics(&mut dash, &mut dom).await;

        assert_eq!(phase, UiPhase::NoSelection);
        assert!(dash.api().called("peak_hours 1 7"));
        assert_eq!(
            dom.notifications(),
            &["Не удалось загрузить аналитику (HTTP 503)".to_string()]
        );
        assert!(dom.is_hidden(&dash.components().analytics_results));
    }

    #[tokio::test]
    async fn test_stop_only_analytics() {
        let api = FakeApi {
            statistics: busy_statistics(),
            ..backend()
        };
        let settings = DashboardSettings {
            topology: Topology::StopOnly,
            ..Default::default()
        };
        let mut dash = Dashboard::new(api, ComponentTable::default(), settings);
        let mut dom = MemoryDom::new();

        dash.dispatch(UiEvent::Init, &mut dom).await;
        dash.dispatch(UiEvent::LoadAnalytics, &mut dom).await;
        assert_eq!(dom.notifications(), &["Выберите остановку".to_string()]);

        dash.dispatch(UiEvent::TabOpened(Tab::Analytics), &mut dom)
            .await;
        dash.dispatch(UiEvent::AnalyticsStopSelected(Some(Id::from(3))), &mut dom)
            .await;
        let phase = dash.dispatch(UiEvent::LoadAnalytics, &mut dom).await;

        assert_eq!(phase, UiPhase::AnalyticsDisplayed);
        assert!(!dom.is_hidden(&dash.components().analytics_results));
        let calls = dash.api().calls();
        assert_eq!(calls.iter().filter(|call| *call == "stops").count(), 2);
        assert!(calls.contains(&"load_statistics 3 7".to_string()));
        assert!(calls.contains(&"peak_hours 3 7".to_string()));
    }
}
