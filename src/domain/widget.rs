// Widget domain model
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Floor for widget refresh intervals, enforced at the input surface.
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Card,
    Table,
    Chart,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub api_url: String,
    /// Polling period in seconds.
    pub refresh_interval: u64,
    /// Dotted field paths into whatever shape `data` has. Not validated
    /// against the current payload.
    pub selected_fields: Vec<String>,
    /// Last fetched payload, absent until the first successful refresh.
    #[serde(default)]
    pub data: Option<Value>,
    pub last_updated: String,
    /// Message of the most recent failed background refresh, cleared on the
    /// next success.
    #[serde(default)]
    pub last_error: Option<String>,
    pub position: Position,
    pub size: Size,
    pub config: WidgetConfig,
}

impl Widget {
    /// Shallow-merge a partial update into this widget.
    pub fn apply(&mut self, patch: WidgetPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(api_url) = patch.api_url {
            self.api_url = api_url;
        }
        if let Some(interval) = patch.refresh_interval {
            self.refresh_interval = interval;
        }
        if let Some(fields) = patch.selected_fields {
            self.selected_fields = fields;
        }
        if let Some(config) = patch.config {
            self.config = config;
        }
    }
}

/// Widget creation input surface. Position, size and config get fixed
/// defaults when the store materializes the widget.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub api_url: String,
    pub refresh_interval: u64,
    pub selected_fields: Vec<String>,
}

/// Partial widget update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<WidgetKind>,
    pub api_url: Option<String>,
    pub refresh_interval: Option<u64>,
    pub selected_fields: Option<Vec<String>>,
    pub config: Option<WidgetConfig>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 300,
            height: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub show_timestamp: bool,
    #[serde(default)]
    pub format_options: FormatOptions,
}

impl WidgetConfig {
    pub fn defaults_for(name: &str) -> Self {
        Self {
            title: name.to_string(),
            description: None,
            show_timestamp: true,
            format_options: FormatOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub percentage: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_places: Option<u8>,
}

/// Grid placement record, paired one-to-one with a widget by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutItem {
    pub id: Uuid,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_h: Option<u32>,
}

impl LayoutItem {
    /// Default grid cell assigned to a freshly created widget.
    pub fn default_cell(id: Uuid) -> Self {
        Self {
            id,
            x: 0,
            y: 0,
            w: 6,
            h: 4,
            min_w: Some(3),
            min_h: Some(2),
            max_w: None,
            max_h: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub widgets: Vec<Widget>,
    pub layout: Vec<LayoutItem>,
    #[serde(default)]
    pub is_loading: bool,
    #[serde(default)]
    pub error: Option<String>,
}
