// Dashboard store - widget state machine, persistence hook and per-widget polling
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::Local;
use futures::future::join_all;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::application::api_client::{ApiClient, ApiError, ApiFetch};
use crate::domain::widget::{
    DashboardState, LayoutItem, Position, Size, Widget, WidgetConfig, WidgetDraft, WidgetPatch,
};
use crate::infrastructure::storage::{DashboardSnapshot, DashboardStorage};

/// Owns the dashboard state, saves `{widgets, layout}` after every mutation
/// and runs one polling task per widget.
///
/// Locks are never held across await points; every mutation is a synchronous
/// snapshot replacement.
pub struct DashboardStore {
    state: RwLock<DashboardState>,
    timers: Mutex<HashMap<Uuid, JoinHandle<()>>>,
    api: Arc<dyn ApiClient>,
    storage: DashboardStorage,
}

impl DashboardStore {
    /// Load the persisted snapshot (or start empty) and arm one polling timer
    /// per widget.
    pub async fn load(
        api: Arc<dyn ApiClient>,
        storage: DashboardStorage,
    ) -> anyhow::Result<Arc<Self>> {
        let state = match storage.load().await? {
            Some(snapshot) => DashboardState {
                widgets: snapshot.widgets,
                layout: snapshot.layout,
                is_loading: false,
                error: None,
            },
            None => DashboardState::default(),
        };

        let store = Arc::new(Self {
            state: RwLock::new(state),
            timers: Mutex::new(HashMap::new()),
            api,
            storage,
        });

        let schedules: Vec<(Uuid, u64)> = {
            let state = store.state.read().unwrap();
            state
                .widgets
                .iter()
                .map(|w| (w.id, w.refresh_interval))
                .collect()
        };
        for (id, interval) in schedules {
            store.arm_timer(id, interval);
        }

        Ok(store)
    }

    /// Snapshot of the current dashboard state.
    pub fn state(&self) -> DashboardState {
        self.state.read().unwrap().clone()
    }

    /// Materialize a draft into a widget with a fresh id and its default grid
    /// cell, then trigger its first refresh.
    ///
    /// Non-empty `selected_fields` and the interval floor are the caller's
    /// responsibility; the store does not reject drafts.
    pub async fn add_widget(self: &Arc<Self>, draft: WidgetDraft) -> Widget {
        let config = WidgetConfig::defaults_for(&draft.name);
        let widget = Widget {
            id: Uuid::new_v4(),
            name: draft.name,
            kind: draft.kind,
            api_url: draft.api_url,
            refresh_interval: draft.refresh_interval,
            selected_fields: draft.selected_fields,
            data: None,
            last_updated: now_timestamp(),
            last_error: None,
            position: Position::default(),
            size: Size::default(),
            config,
        };

        {
            let mut state = self.state.write().unwrap();
            state.widgets.push(widget.clone());
            state.layout.push(LayoutItem::default_cell(widget.id));
        }
        self.persist().await;

        self.arm_timer(widget.id, widget.refresh_interval);

        let store = Arc::clone(self);
        let id = widget.id;
        tokio::spawn(async move {
            store.refresh_widget(id).await;
        });

        widget
    }

    /// Remove the widget and its layout item together. Returns false when the
    /// id is unknown.
    pub async fn remove_widget(&self, id: Uuid) -> bool {
        let removed = {
            let mut state = self.state.write().unwrap();
            let before = state.widgets.len();
            state.widgets.retain(|w| w.id != id);
            state.layout.retain(|l| l.id != id);
            state.widgets.len() != before
        };

        if removed {
            self.disarm_timer(id);
            self.persist().await;
        }
        removed
    }

    /// Shallow-merge a partial update; no-op when the id is unknown. An
    /// interval change rearms the widget's timer with the new period.
    pub async fn update_widget(self: &Arc<Self>, id: Uuid, patch: WidgetPatch) -> Option<Widget> {
        let (updated, rearm) = {
            let mut state = self.state.write().unwrap();
            let widget = state.widgets.iter_mut().find(|w| w.id == id)?;
            let old_interval = widget.refresh_interval;
            widget.apply(patch);
            (widget.clone(), widget.refresh_interval != old_interval)
        };

        if rearm {
            self.arm_timer(id, updated.refresh_interval);
        }
        self.persist().await;
        Some(updated)
    }

    /// Replace the layout wholesale. No id validation against `widgets`.
    pub async fn update_layout(&self, layout: Vec<LayoutItem>) {
        self.state.write().unwrap().layout = layout;
        self.persist().await;
    }

    /// Fetch the widget's endpoint and merge the payload. Unknown ids are a
    /// silent no-op, as is a widget removed while the fetch was in flight. A
    /// failed fetch leaves the stored data untouched and only records the
    /// error on the widget.
    pub async fn refresh_widget(&self, id: Uuid) {
        let api_url = {
            let state = self.state.read().unwrap();
            match state.widgets.iter().find(|w| w.id == id) {
                Some(widget) => widget.api_url.clone(),
                None => return,
            }
        };

        match self.api.fetch_json(&api_url).await {
            Ok(ApiFetch { data, .. }) => {
                let merged = {
                    let mut state = self.state.write().unwrap();
                    match state.widgets.iter_mut().find(|w| w.id == id) {
                        Some(widget) => {
                            widget.data = Some(data);
                            widget.last_updated = now_timestamp();
                            widget.last_error = None;
                            true
                        }
                        None => false,
                    }
                };
                if merged {
                    self.persist().await;
                }
            }
            Err(err) => {
                tracing::warn!(widget = %id, "refresh failed: {err}");
                let recorded = {
                    let mut state = self.state.write().unwrap();
                    match state.widgets.iter_mut().find(|w| w.id == id) {
                        Some(widget) => {
                            widget.last_error = Some(err.to_string());
                            true
                        }
                        None => false,
                    }
                };
                if recorded {
                    self.persist().await;
                }
            }
        }
    }

    /// Refresh every widget concurrently and wait for the fan-out to settle.
    /// Partial failures neither abort the batch nor aggregate into an error.
    pub async fn refresh_all(&self) {
        let ids: Vec<Uuid> = {
            let state = self.state.read().unwrap();
            state.widgets.iter().map(|w| w.id).collect()
        };

        self.state.write().unwrap().is_loading = true;
        join_all(ids.into_iter().map(|id| self.refresh_widget(id))).await;
        self.state.write().unwrap().is_loading = false;
    }

    /// Connection test for the add-widget flow: fetch a URL without touching
    /// any widget.
    pub async fn probe(&self, url: &str) -> Result<ApiFetch, ApiError> {
        self.api.fetch_json(url).await
    }

    fn arm_timer(self: &Arc<Self>, id: Uuid, interval_secs: u64) {
        let period = Duration::from_secs(interval_secs.max(1));
        let store = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The immediate first tick; creation already triggers its own
            // initial refresh.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                store.refresh_widget(id).await;
            }
        });

        if let Some(previous) = self.timers.lock().unwrap().insert(id, handle) {
            previous.abort();
        }
    }

    fn disarm_timer(&self, id: Uuid) {
        if let Some(handle) = self.timers.lock().unwrap().remove(&id) {
            handle.abort();
        }
    }

    async fn persist(&self) {
        let snapshot = {
            let state = self.state.read().unwrap();
            DashboardSnapshot {
                widgets: state.widgets.clone(),
                layout: state.layout.clone(),
            }
        };
        if let Err(err) = self.storage.save(&snapshot).await {
            tracing::error!("failed to persist dashboard: {err:#}");
        }
    }
}

fn now_timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fields::extract_fields;
    use crate::domain::widget::WidgetKind;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::HashSet;

    #[derive(Default)]
    struct MockApiClient {
        responses: Mutex<HashMap<String, Result<Value, String>>>,
    }

    impl MockApiClient {
        fn respond(&self, url: &str, response: Result<Value, &str>) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), response.map_err(str::to_string));
        }
    }

    #[async_trait]
    impl ApiClient for MockApiClient {
        async fn fetch_json(&self, url: &str) -> Result<ApiFetch, ApiError> {
            match self.responses.lock().unwrap().get(url) {
                Some(Ok(data)) => Ok(ApiFetch {
                    fields: extract_fields(data),
                    data: data.clone(),
                }),
                Some(Err(message)) => Err(ApiError::Transport(message.clone())),
                None => Err(ApiError::Http(500)),
            }
        }
    }

    async fn test_store(api: Arc<MockApiClient>) -> (Arc<DashboardStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = DashboardStorage::new(dir.path());
        let store = DashboardStore::load(api, storage).await.unwrap();
        (store, dir)
    }

    fn draft(name: &str, url: &str) -> WidgetDraft {
        WidgetDraft {
            name: name.to_string(),
            kind: WidgetKind::Card,
            api_url: url.to_string(),
            refresh_interval: 30,
            selected_fields: vec!["price".to_string()],
        }
    }

    #[tokio::test]
    async fn test_add_widget_creates_lockstep_layout() {
        let api = Arc::new(MockApiClient::default());
        let (store, _dir) = test_store(api).await;

        let widget = store.add_widget(draft("BTC", "http://api.test/btc")).await;

        let state = store.state();
        assert_eq!(state.widgets.len(), 1);
        assert_eq!(state.layout.len(), 1);
        assert_eq!(state.layout[0].id, widget.id);
        assert_eq!((state.layout[0].w, state.layout[0].h), (6, 4));
        assert!(state.widgets[0].data.is_none());
        assert_eq!(state.widgets[0].config.title, "BTC");
    }

    #[tokio::test]
    async fn test_add_then_remove_leaves_state_empty() {
        let api = Arc::new(MockApiClient::default());
        let (store, _dir) = test_store(api).await;

        let widget = store.add_widget(draft("BTC", "http://api.test/btc")).await;
        assert!(store.remove_widget(widget.id).await);

        let state = store.state();
        assert!(state.widgets.is_empty());
        assert!(state.layout.is_empty());
        assert!(store.timers.lock().unwrap().is_empty());

        // The in-flight creation refresh must be a no-op on completion
        tokio::task::yield_now().await;
        assert!(store.state().widgets.is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_noop() {
        let api = Arc::new(MockApiClient::default());
        let (store, _dir) = test_store(api).await;

        assert!(!store.remove_widget(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_update_widget_merges_and_rearms() {
        let api = Arc::new(MockApiClient::default());
        let (store, _dir) = test_store(api).await;

        let widget = store.add_widget(draft("BTC", "http://api.test/btc")).await;
        let updated = store
            .update_widget(
                widget.id,
                WidgetPatch {
                    name: Some("Bitcoin".to_string()),
                    refresh_interval: Some(120),
                    ..WidgetPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Bitcoin");
        assert_eq!(updated.refresh_interval, 120);
        assert_eq!(updated.api_url, "http://api.test/btc");

        let missing = store
            .update_widget(Uuid::new_v4(), WidgetPatch::default())
            .await;
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_update_layout_replaces_wholesale() {
        let api = Arc::new(MockApiClient::default());
        let (store, _dir) = test_store(api).await;

        store.add_widget(draft("BTC", "http://api.test/btc")).await;
        let foreign = LayoutItem::default_cell(Uuid::new_v4());
        store.update_layout(vec![foreign.clone()]).await;

        // No validation against widgets by design
        assert_eq!(store.state().layout, vec![foreign]);
        assert_eq!(store.state().widgets.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_widget_merges_payload() {
        let api = Arc::new(MockApiClient::default());
        api.respond("http://api.test/btc", Ok(json!({"price": 67000})));
        let (store, _dir) = test_store(api).await;

        let widget = store.add_widget(draft("BTC", "http://api.test/btc")).await;
        store.refresh_widget(widget.id).await;

        let state = store.state();
        assert_eq!(state.widgets[0].data, Some(json!({"price": 67000})));
        assert!(!state.widgets[0].last_updated.is_empty());
        assert!(state.widgets[0].last_error.is_none());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_stale_data_and_records_error() {
        let api = Arc::new(MockApiClient::default());
        api.respond("http://api.test/btc", Ok(json!({"price": 67000})));
        let (store, _dir) = test_store(api.clone()).await;

        let widget = store.add_widget(draft("BTC", "http://api.test/btc")).await;
        store.refresh_widget(widget.id).await;

        api.respond("http://api.test/btc", Err("connection refused"));
        store.refresh_widget(widget.id).await;

        let state = store.state();
        assert_eq!(state.widgets[0].data, Some(json!({"price": 67000})));
        assert_eq!(
            state.widgets[0].last_error.as_deref(),
            Some("connection refused")
        );
        // Background failures never touch the dashboard-level error
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_refresh_unknown_id_is_noop() {
        let api = Arc::new(MockApiClient::default());
        let (store, _dir) = test_store(api).await;

        store.refresh_widget(Uuid::new_v4()).await;
        assert!(store.state().widgets.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_all_settles_partial_failures() {
        let api = Arc::new(MockApiClient::default());
        api.respond("http://api.test/ok", Ok(json!({"price": 1})));
        api.respond("http://api.test/bad", Err("boom"));
        let (store, _dir) = test_store(api).await;

        let ok = store.add_widget(draft("OK", "http://api.test/ok")).await;
        let bad = store.add_widget(draft("Bad", "http://api.test/bad")).await;

        store.refresh_all().await;

        let state = store.state();
        assert!(!state.is_loading);

        let ok_widget = state.widgets.iter().find(|w| w.id == ok.id).unwrap();
        let bad_widget = state.widgets.iter().find(|w| w.id == bad.id).unwrap();
        assert_eq!(ok_widget.data, Some(json!({"price": 1})));
        assert!(bad_widget.data.is_none());
        assert_eq!(bad_widget.last_error.as_deref(), Some("boom"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_refreshes_on_interval() {
        let api = Arc::new(MockApiClient::default());
        api.respond("http://api.test/btc", Ok(json!({"price": 1})));
        let (store, _dir) = test_store(api.clone()).await;

        let widget = store.add_widget(draft("BTC", "http://api.test/btc")).await;
        tokio::task::yield_now().await;

        api.respond("http://api.test/btc", Ok(json!({"price": 2})));
        tokio::time::sleep(Duration::from_secs(31)).await;
        tokio::task::yield_now().await;

        let state = store.state();
        assert_eq!(state.widgets[0].id, widget.id);
        assert_eq!(state.widgets[0].data, Some(json!({"price": 2})));
    }

    #[tokio::test]
    async fn test_persisted_round_trip_preserves_ids() {
        let api = Arc::new(MockApiClient::default());
        let dir = tempfile::tempdir().unwrap();

        let first = DashboardStore::load(api.clone(), DashboardStorage::new(dir.path()))
            .await
            .unwrap();
        first.add_widget(draft("BTC", "http://api.test/btc")).await;
        first.add_widget(draft("ETH", "http://api.test/eth")).await;
        let original: HashSet<Uuid> = first.state().widgets.iter().map(|w| w.id).collect();

        let second = DashboardStore::load(api, DashboardStorage::new(dir.path()))
            .await
            .unwrap();
        let state = second.state();

        let widgets: HashSet<Uuid> = state.widgets.iter().map(|w| w.id).collect();
        let layout: HashSet<Uuid> = state.layout.iter().map(|l| l.id).collect();
        assert_eq!(widgets, original);
        assert_eq!(layout, original);
        // Transient flags reset on reload
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }
}
