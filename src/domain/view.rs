// View shaping - chart, table and card projections of a widget's payload
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use serde_json::Value;

use super::fields::{extract_field_value, field_display_name};
use super::format::format_value;
use super::widget::{Widget, WidgetKind};

/// Placeholder label axis until widgets carry real time series.
pub const CHART_LABELS: [&str; 6] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];

const DATASET_BORDER_COLOR: &str = "#22c55e";
const DATASET_BACKGROUND_COLOR: &str = "rgba(34, 197, 94, 0.1)";
const DATASET_TENSION: f64 = 0.4;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartView {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

impl ChartView {
    fn empty() -> Self {
        Self {
            labels: Vec::new(),
            datasets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    pub border_color: String,
    pub background_color: String,
    pub tension: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub total_items: usize,
    pub current_page: usize,
    pub items_per_page: usize,
}

impl TableView {
    fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            total_items: 0,
            current_page: 1,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub fields: Vec<CardField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardField {
    pub path: String,
    pub label: String,
    pub value: String,
}

/// Shape a chart widget's payload into one dataset over a fixed label axis.
///
/// Fields that resolve to a JSON number contribute their value; anything else
/// contributes a deterministic placeholder point.
pub fn chart_view(widget: &Widget) -> ChartView {
    if widget.kind != WidgetKind::Chart {
        return ChartView::empty();
    }
    let Some(data) = widget.data.as_ref() else {
        return ChartView::empty();
    };

    let points = widget
        .selected_fields
        .iter()
        .map(|field| {
            extract_field_value(data, field)
                .and_then(Value::as_f64)
                .unwrap_or_else(|| placeholder_point(field))
        })
        .collect();

    ChartView {
        labels: CHART_LABELS.iter().map(|label| (*label).to_string()).collect(),
        datasets: vec![ChartDataset {
            label: widget.name.clone(),
            data: points,
            border_color: DATASET_BORDER_COLOR.to_string(),
            background_color: DATASET_BACKGROUND_COLOR.to_string(),
            tension: DATASET_TENSION,
        }],
    }
}

// Stand-in value in [0, 100) for fields that do not resolve to a number on
// the current payload.
fn placeholder_point(field: &str) -> f64 {
    let mut hasher = DefaultHasher::new();
    field.hash(&mut hasher);
    (hasher.finish() % 10_000) as f64 / 100.0
}

/// Shape a table widget's payload into rows over the first array found in it.
pub fn table_view(widget: &Widget) -> TableView {
    if widget.kind != WidgetKind::Table {
        return TableView::empty();
    }
    let Some(data) = widget.data.as_ref() else {
        return TableView::empty();
    };
    let Some(items) = find_first_array(data) else {
        return TableView::empty();
    };
    if items.is_empty() {
        return TableView::empty();
    }

    let columns = widget.selected_fields.clone();
    let rows: Vec<Vec<Value>> = items
        .iter()
        .map(|item| {
            columns
                .iter()
                .map(|field| {
                    extract_field_value(item, field)
                        .cloned()
                        .unwrap_or(Value::Null)
                })
                .collect()
        })
        .collect();
    let total_items = rows.len();

    TableView {
        columns,
        rows,
        total_items,
        current_page: 1,
        items_per_page: DEFAULT_ITEMS_PER_PAGE,
    }
}

// Pre-order search over object keys in insertion order, stopping at the
// first array encountered.
fn find_first_array(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.values().find_map(find_first_array),
        _ => None,
    }
}

/// Shape a card widget into formatted display values, one per selected field.
pub fn card_view(widget: &Widget) -> CardView {
    if widget.kind != WidgetKind::Card {
        return CardView { fields: Vec::new() };
    }

    let fields = widget
        .selected_fields
        .iter()
        .map(|path| {
            let value = widget
                .data
                .as_ref()
                .and_then(|data| extract_field_value(data, path));
            CardField {
                path: path.clone(),
                label: field_display_name(path),
                value: format_value(value, &widget.config.format_options),
            }
        })
        .collect();

    CardView { fields }
}
