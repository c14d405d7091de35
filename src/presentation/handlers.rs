// HTTP request handlers
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

use crate::application::api_client::ApiFetch;
use crate::domain::view::{card_view, chart_view, table_view};
use crate::domain::widget::{
    LayoutItem, MIN_REFRESH_INTERVAL_SECS, WidgetDraft, WidgetKind, WidgetPatch,
};
use crate::presentation::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn unprocessable(message: impl Into<String>) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Full dashboard state
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store.state())
}

/// Create a widget from the add-widget flow input
pub async fn create_widget(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<WidgetDraft>,
) -> Response {
    if let Err(message) = validate_draft(&draft) {
        return unprocessable(message);
    }

    let widget = state.store.add_widget(draft).await;
    (StatusCode::CREATED, Json(widget)).into_response()
}

fn validate_draft(draft: &WidgetDraft) -> Result<(), String> {
    if draft.selected_fields.is_empty() {
        return Err("at least one field must be selected".to_string());
    }
    if draft.refresh_interval < MIN_REFRESH_INTERVAL_SECS {
        return Err(format!(
            "refresh interval must be at least {MIN_REFRESH_INTERVAL_SECS} seconds"
        ));
    }
    if Url::parse(&draft.api_url).is_err() {
        return Err("apiUrl is not a valid absolute URL".to_string());
    }
    Ok(())
}

/// Partial widget update
pub async fn update_widget(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<WidgetPatch>,
) -> Response {
    match state.store.update_widget(id, patch).await {
        Some(widget) => Json(widget).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Delete a widget and its layout item
pub async fn delete_widget(Path(id): Path<Uuid>, State(state): State<Arc<AppState>>) -> StatusCode {
    if state.store.remove_widget(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Shaped view of a widget's latest payload, per its kind
pub async fn widget_view(Path(id): Path<Uuid>, State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state.store.state();
    let Some(widget) = snapshot.widgets.iter().find(|w| w.id == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match widget.kind {
        WidgetKind::Card => Json(card_view(widget)).into_response(),
        WidgetKind::Table => Json(table_view(widget)).into_response(),
        WidgetKind::Chart => Json(chart_view(widget)).into_response(),
    }
}

/// Kick off a refresh for one widget without waiting for it
pub async fn refresh_widget(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    let store = state.store.clone();
    tokio::spawn(async move {
        store.refresh_widget(id).await;
    });
    StatusCode::ACCEPTED
}

/// Refresh every widget and wait for the batch to settle
pub async fn refresh_all(State(state): State<Arc<AppState>>) -> StatusCode {
    state.store.refresh_all().await;
    StatusCode::OK
}

/// Wholesale layout replacement from drag/resize events
pub async fn update_layout(
    State(state): State<Arc<AppState>>,
    Json(layout): Json<Vec<LayoutItem>>,
) -> StatusCode {
    state.store.update_layout(layout).await;
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
pub struct ConnectionTestRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Connection test for the add-widget flow; failures surface inline
pub async fn test_connection(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConnectionTestRequest>,
) -> Json<ConnectionTestResponse> {
    match state.store.probe(&request.url).await {
        Ok(ApiFetch { data, fields }) => Json(ConnectionTestResponse {
            success: true,
            data: Some(data),
            fields: Some(fields),
            error: None,
        }),
        Err(err) => Json(ConnectionTestResponse {
            success: false,
            data: None,
            fields: None,
            error: Some(err.to_string()),
        }),
    }
}
