//! Column metadata: what the host table declares, and the per-request
//! descriptor the query layer works from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::request::RequestColumn;

/// How a column is bound to the row data: by position or by field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnData {
    Index(u64),
    Field(String),
}

impl ColumnData {
    /// Positional bindings, including numeric strings such as `"2"`.
    pub fn as_index(&self) -> Option<u64> {
        match self {
            ColumnData::Index(i) => Some(*i),
            ColumnData::Field(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ColumnData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnData::Index(i) => write!(f, "{i}"),
            ColumnData::Field(s) => f.write_str(s),
        }
    }
}

/// Declared value type of a column, as far as literal rendering cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ValueType {
    /// `"number"` / `"numeric"`: rendered bare.
    Numeric,
    /// Anything else: rendered in single quotes.
    #[default]
    Text,
}

impl ValueType {
    pub fn from_declared(declared: &str) -> Self {
        match declared {
            "number" | "numeric" => ValueType::Numeric,
            _ => ValueType::Text,
        }
    }
}

/// Static column definition supplied by the host table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnConfig {
    pub data: Option<ColumnData>,
    pub name: Option<String>,
    /// Declared type; defaults to `"string"`.
    #[serde(rename = "type")]
    pub declared_type: Option<String>,
    /// Custom search function replacing the operator grammar, e.g. `contains`.
    pub search_method: Option<String>,
}

impl ColumnConfig {
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            data: Some(ColumnData::Field(name.into())),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, declared: impl Into<String>) -> Self {
        self.declared_type = Some(declared.into());
        self
    }

    pub fn with_search_method(mut self, method: impl Into<String>) -> Self {
        self.search_method = Some(method.into());
        self
    }

    pub fn value_type(&self) -> ValueType {
        self.declared_type
            .as_deref()
            .map(ValueType::from_declared)
            .unwrap_or_default()
    }
}

/// Per-request view of one column. Rebuilt for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub index: usize,
    pub field: String,
    pub value_type: ValueType,
    pub search_method: Option<String>,
    /// The column was bound by position rather than by field name.
    pub positional: bool,
}

impl ColumnDescriptor {
    /// Resolve the field name from the request column: field bindings use
    /// `data`; positional and unbound (`data: null`) columns use `name`.
    pub fn resolve(index: usize, column: &RequestColumn, config: Option<&ColumnConfig>) -> Self {
        let positional = column.data.as_ref().and_then(ColumnData::as_index).is_some();
        let field = match &column.data {
            Some(data) if !positional => data.to_string().trim().to_string(),
            _ => column.name.trim().to_string(),
        };

        Self {
            index,
            field,
            value_type: config.map(ColumnConfig::value_type).unwrap_or_default(),
            search_method: config
                .and_then(|c| c.search_method.as_deref())
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
            positional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::SearchValue;

    fn req_col(data: ColumnData, name: &str) -> RequestColumn {
        RequestColumn {
            data: Some(data),
            name: name.into(),
            searchable: true,
            orderable: true,
            search: SearchValue::default(),
        }
    }

    #[test]
    fn numeric_declared_types() {
        assert_eq!(ValueType::from_declared("number"), ValueType::Numeric);
        assert_eq!(ValueType::from_declared("numeric"), ValueType::Numeric);
        assert_eq!(ValueType::from_declared("string"), ValueType::Text);
        assert_eq!(ValueType::from_declared("date"), ValueType::Text);
        assert_eq!(ColumnConfig::default().value_type(), ValueType::Text);
    }

    #[test]
    fn field_binding_resolves_from_data() {
        let col = req_col(ColumnData::Field(" LastName ".into()), "ignored");
        let cfg = ColumnConfig::field("LastName").with_search_method("contains");
        let d = ColumnDescriptor::resolve(1, &col, Some(&cfg));
        assert_eq!(d.field, "LastName");
        assert!(!d.positional);
        assert_eq!(d.search_method.as_deref(), Some("contains"));
    }

    #[test]
    fn positional_binding_resolves_from_name() {
        let col = req_col(ColumnData::Index(2), " Age ");
        let cfg = ColumnConfig::default().with_type("numeric");
        let d = ColumnDescriptor::resolve(2, &col, Some(&cfg));
        assert_eq!(d.field, "Age");
        assert!(d.positional);
        assert_eq!(d.value_type, ValueType::Numeric);

        let numeric_string = req_col(ColumnData::Field("3".into()), "Id");
        assert!(ColumnDescriptor::resolve(3, &numeric_string, None).positional);
    }

    #[test]
    fn unbound_column_resolves_from_name() {
        let col = RequestColumn {
            data: None,
            ..req_col(ColumnData::Index(0), " Actions ")
        };
        let d = ColumnDescriptor::resolve(0, &col, None);
        assert_eq!(d.field, "Actions");
        assert!(!d.positional);
    }

    #[test]
    fn column_data_deserializes_untagged() {
        let idx: ColumnData = serde_json::from_str("4").unwrap();
        assert_eq!(idx, ColumnData::Index(4));
        let field: ColumnData = serde_json::from_str(r#""Name""#).unwrap();
        assert_eq!(field, ColumnData::Field("Name".into()));
    }
}
