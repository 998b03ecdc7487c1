//! Service envelope → table paged result.
//!
//! Success and error results share one shape (`draw`, `data`,
//! `recordsFiltered`, `recordsTotal`, optional `error`); only the presence of
//! `error` marks a failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use dtodata_core::config::Settings;
use dtodata_core::id::DrawToken;

pub const NO_DATA_MESSAGE: &str = "No return data from server";

/// Result envelope returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "@odata.context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Total matching rows, requested via `$count=true`.
    #[serde(rename = "@odata.count", default)]
    pub count: Option<u64>,

    #[serde(default)]
    pub value: Vec<Value>,
}

impl Envelope {
    /// Reported count, or the returned row count when the service omitted it.
    pub fn total(&self) -> u64 {
        self.count.unwrap_or(self.value.len() as u64)
    }

    /// Parse a response body. Empty bodies, `null`, and anything that is not
    /// a JSON object yield `None`.
    pub fn from_body(body: &str) -> Option<Self> {
        let body = body.trim();
        if body.is_empty() {
            return None;
        }
        match serde_json::from_str::<Option<Envelope>>(body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, "malformed result envelope");
                None
            }
        }
    }
}

/// How rows are handed to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMode {
    Objects,
    Arrays,
}

impl RowMode {
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.use_objects {
            RowMode::Objects
        } else {
            RowMode::Arrays
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResult {
    pub draw: DrawToken,
    pub data: Vec<Value>,
    pub records_filtered: u64,
    pub records_total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableResult {
    /// Error-shaped result with a fresh draw token and no rows.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            draw: DrawToken::generate(),
            data: Vec::new(),
            records_filtered: 0,
            records_total: 0,
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

pub fn normalize(envelope: Envelope, draw: u64, mode: RowMode) -> TableResult {
    match mode {
        RowMode::Objects => to_objects(envelope, draw),
        RowMode::Arrays => to_arrays(envelope, draw),
    }
}

/// Rows pass through; both counts are the reported total.
pub fn to_objects(envelope: Envelope, draw: u64) -> TableResult {
    let total = envelope.total();
    TableResult {
        draw: DrawToken::Sequence(draw),
        data: envelope.value,
        records_filtered: total,
        records_total: total,
        error: None,
    }
}

/// Rows become positional arrays of their property values, in document order.
///
/// `recordsFiltered` is `ceil(total / rows returned)`: an approximate page
/// count rather than a row count. It is 0 when no rows came back.
pub fn to_arrays(envelope: Envelope, draw: u64) -> TableResult {
    let total = envelope.total();
    let returned = envelope.value.len() as u64;
    let records_filtered = if returned == 0 {
        0
    } else {
        total.div_ceil(returned)
    };

    TableResult {
        draw: DrawToken::Sequence(draw),
        data: envelope.value.into_iter().map(row_to_array).collect(),
        records_filtered,
        records_total: total,
        error: None,
    }
}

fn row_to_array(row: Value) -> Value {
    match row {
        Value::Object(fields) => Value::Array(fields.into_iter().map(|(_, v)| v).collect()),
        Value::Array(items) => Value::Array(items),
        other => Value::Array(vec![other]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(count: u64, rows: usize) -> Envelope {
        Envelope {
            context: None,
            count: Some(count),
            value: (0..rows)
                .map(|i| json!({"Id": i, "Name": format!("n{i}")}))
                .collect(),
        }
    }

    #[test]
    fn object_mode_passes_rows_through() {
        let r = normalize(envelope(42, 2), 5, RowMode::Objects);
        assert_eq!(r.draw, DrawToken::Sequence(5));
        assert_eq!(r.records_total, 42);
        assert_eq!(r.records_filtered, 42);
        assert_eq!(r.data[1], json!({"Id": 1, "Name": "n1"}));
        assert!(!r.is_error());
    }

    #[test]
    fn array_mode_filtered_is_rounded_up_page_count() {
        let r = normalize(envelope(100, 10), 1, RowMode::Arrays);
        assert_eq!(r.records_filtered, 10);
        assert_eq!(r.records_total, 100);

        let r = normalize(envelope(7, 3), 1, RowMode::Arrays);
        assert_eq!(r.records_filtered, 3);
    }

    #[test]
    fn array_mode_keeps_property_order() {
        let env: Envelope = serde_json::from_str(
            r#"{"@odata.count": 1, "value": [{"Zeta": 1, "Alpha": "a", "Mid": null}]}"#,
        )
        .unwrap();
        let r = normalize(env, 1, RowMode::Arrays);
        assert_eq!(r.data[0], json!([1, "a", null]));
    }

    #[test]
    fn array_mode_with_no_rows_reports_zero_filtered() {
        let r = normalize(envelope(9, 0), 1, RowMode::Arrays);
        assert_eq!(r.records_filtered, 0);
        assert_eq!(r.records_total, 9);
    }

    #[test]
    fn error_result_has_success_shape() {
        let r = TableResult::error(NO_DATA_MESSAGE);
        assert!(r.is_error());
        assert!(r.data.is_empty());
        assert_eq!(r.records_filtered, 0);
        assert_eq!(r.records_total, 0);
        assert_eq!(r.draw.sequence(), None);

        let v = serde_json::to_value(&r).unwrap();
        for key in ["draw", "data", "recordsFiltered", "recordsTotal", "error"] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
        let ok = serde_json::to_value(normalize(envelope(1, 1), 1, RowMode::Objects)).unwrap();
        assert!(ok.get("error").is_none());
    }

    #[test]
    fn body_parsing() {
        assert!(Envelope::from_body("").is_none());
        assert!(Envelope::from_body("null").is_none());
        assert!(Envelope::from_body("<html>").is_none());
        let env = Envelope::from_body(
            r#"{"@odata.context": "$metadata#People", "@odata.count": 3, "value": []}"#,
        )
        .unwrap();
        assert_eq!(env.total(), 3);
        assert_eq!(env.context.as_deref(), Some("$metadata#People"));
    }

    #[test]
    fn missing_count_falls_back_to_rows() {
        let env = Envelope::from_body(r#"{"value": [{"a": 1}, {"a": 2}]}"#).unwrap();
        assert_eq!(env.total(), 2);
    }
}
