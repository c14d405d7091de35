// Application state for HTTP handlers
use std::sync::Arc;

use crate::application::dashboard_store::DashboardStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DashboardStore>,
}
