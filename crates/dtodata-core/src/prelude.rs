//! Convenient re-exports for downstream crates.

pub use crate::column::{ColumnConfig, ColumnData, ColumnDescriptor, ValueType};
pub use crate::config::{SearchColumnsPlace, Settings, SettingsPatch, SettingsSource};
pub use crate::error::{Error, Result};
pub use crate::id::{DrawToken, TableId};
pub use crate::request::{RequestColumn, RequestOrder, RequestSnapshot, SearchValue, TableRequest};
