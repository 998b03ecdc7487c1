//! Inbound table request (server-side processing wire shape) and the
//! transient snapshot the query builder consumes.

use serde::{Deserialize, Serialize};

use crate::column::ColumnData;

/// Page length meaning "fetch everything".
pub const FETCH_ALL: i64 = -1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchValue {
    pub value: String,
    pub regex: bool,
}

impl SearchValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            regex: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestColumn {
    /// `None` for columns without a data binding (e.g. action buttons).
    #[serde(default)]
    pub data: Option<ColumnData>,
    #[serde(default)]
    pub name: String,
    #[serde(default = "yes")]
    pub searchable: bool,
    #[serde(default = "yes")]
    pub orderable: bool,
    #[serde(default)]
    pub search: SearchValue,
}

fn yes() -> bool {
    true
}

impl RequestColumn {
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            data: Some(ColumnData::Field(name.into())),
            name: String::new(),
            searchable: true,
            orderable: true,
            search: SearchValue::default(),
        }
    }

    pub fn positional(index: u64, name: impl Into<String>) -> Self {
        Self {
            data: Some(ColumnData::Index(index)),
            name: name.into(),
            searchable: true,
            orderable: true,
            search: SearchValue::default(),
        }
    }

    pub fn searching(mut self, value: impl Into<String>) -> Self {
        self.search = SearchValue::new(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOrder {
    pub column: usize,
    pub dir: String,
}

impl RequestOrder {
    pub fn new(column: usize, dir: impl Into<String>) -> Self {
        Self {
            column,
            dir: dir.into(),
        }
    }
}

/// One data request fired by the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRequest {
    /// Sequence number echoed back in the result.
    pub draw: u64,
    pub columns: Vec<RequestColumn>,
    pub order: Vec<RequestOrder>,
    pub start: u64,
    /// Page length; `FETCH_ALL` disables paging.
    pub length: i64,
    /// Global free-text search.
    pub search: SearchValue,
}

impl Default for TableRequest {
    fn default() -> Self {
        Self {
            draw: 0,
            columns: Vec::new(),
            order: Vec::new(),
            start: 0,
            length: 10,
            search: SearchValue::default(),
        }
    }
}

/// State captured for building exactly one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSnapshot {
    /// Field names to select, in column order.
    pub select: Vec<String>,
    /// `"field dir"` pairs, in sort priority order.
    pub order: Vec<String>,
    /// Filter clauses: per-column first, global search last.
    pub filters: Vec<String>,
    pub start: u64,
    pub length: i64,
}

impl RequestSnapshot {
    pub fn is_fetch_all(&self) -> bool {
        self.length < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_server_side_request() {
        let json = r#"{
            "draw": 3,
            "columns": [
                {"data": "FirstName", "name": "", "searchable": true, "orderable": true,
                 "search": {"value": "", "regex": false}},
                {"data": 1, "name": "Age", "search": {"value": ">=21"}}
            ],
            "order": [{"column": 1, "dir": "desc"}],
            "start": 20,
            "length": 10,
            "search": {"value": "", "regex": false}
        }"#;
        let req: TableRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.draw, 3);
        assert_eq!(req.columns.len(), 2);
        assert_eq!(req.columns[1].data, Some(ColumnData::Index(1)));
        assert!(req.columns[1].searchable);
        assert_eq!(req.columns[1].search.value, ">=21");
        assert_eq!(req.order[0], RequestOrder::new(1, "desc"));
        assert_eq!(req.start, 20);
    }

    #[test]
    fn null_data_binding_deserializes() {
        let json = r#"{"columns": [
            {"data": "Name", "search": {"value": ""}},
            {"data": null, "name": "Actions", "searchable": false, "orderable": false}
        ]}"#;
        let req: TableRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.columns[0].data, Some(ColumnData::Field("Name".into())));
        assert_eq!(req.columns[1].data, None);
        assert_eq!(req.columns[1].name, "Actions");
    }

    #[test]
    fn negative_length_fetches_all() {
        let snap = RequestSnapshot {
            length: FETCH_ALL,
            ..Default::default()
        };
        assert!(snap.is_fetch_all());
    }
}
