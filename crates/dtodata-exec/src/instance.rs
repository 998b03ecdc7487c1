//! One bound table: its settings, column definitions, and last query.

use std::fmt;
use std::sync::Arc;

use url::Url;

use dtodata_core::column::{ColumnConfig, ColumnDescriptor};
use dtodata_core::config::{Settings, SettingsPatch};
use dtodata_core::error::Result;
use dtodata_core::id::TableId;
use dtodata_core::request::{RequestSnapshot, TableRequest};
use dtodata_query::{column_clause, OperatorMap, QueryBuilder};

use crate::metrics::emit_span;
use crate::normalize::{normalize, Envelope, RowMode, TableResult, NO_DATA_MESSAGE};
use crate::transport::Transport;

/// Invoked with the instance after every successful fetch.
pub type Callback = Arc<dyn Fn(&Instance) + Send + Sync>;

pub struct Instance {
    id: TableId,
    settings: Settings,
    operators: OperatorMap,
    columns: Vec<ColumnConfig>,
    server_side: bool,
    callback: Option<Callback>,
    snapshot: RequestSnapshot,
    query: String,
    filter: String,
    records_total: u64,
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("settings", &self.settings)
            .field("server_side", &self.server_side)
            .field("has_callback", &self.callback.is_some())
            .field("query", &self.query)
            .field("records_total", &self.records_total)
            .finish()
    }
}

impl Instance {
    pub fn new(id: TableId, settings: Settings) -> Result<Self> {
        settings.validate()?;
        let operators = OperatorMap::from_settings(&settings)?;
        Ok(Self {
            id,
            settings,
            operators,
            columns: Vec::new(),
            server_side: true,
            callback: None,
            snapshot: RequestSnapshot::default(),
            query: String::new(),
            filter: String::new(),
            records_total: 0,
        })
    }

    pub fn id(&self) -> &TableId {
        &self.id
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply a settings update. Invalid updates leave the instance unchanged.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<()> {
        let mut next = self.settings.clone();
        patch.apply(&mut next)?;
        self.operators = OperatorMap::from_settings(&next)?;
        self.settings = next;
        Ok(())
    }

    pub fn operators(&self) -> &OperatorMap {
        &self.operators
    }

    pub fn server_side(&self) -> bool {
        self.server_side
    }

    /// Whether the table delegates paging to the service (default `true`).
    pub fn set_server_side(&mut self, enabled: bool) {
        self.server_side = enabled;
    }

    pub fn column_configs(&self) -> &[ColumnConfig] {
        &self.columns
    }

    /// Column definitions as declared by the host table, by position.
    pub fn set_column_configs(&mut self, columns: Vec<ColumnConfig>) {
        self.columns = columns;
    }

    pub fn set_callback(&mut self, callback: impl Fn(&Instance) + Send + Sync + 'static) {
        self.callback = Some(Arc::new(callback));
    }

    pub fn clear_callback(&mut self) {
        self.callback = None;
    }

    /// Query string (without base URL) from the last `query`/`fetch`.
    pub fn last_query(&self) -> &str {
        &self.query
    }

    /// `$filter=...` part of the last query, or empty.
    pub fn last_filter(&self) -> &str {
        &self.filter
    }

    /// Total count reported by the last successful fetch.
    pub fn records_total(&self) -> u64 {
        self.records_total
    }

    pub fn describe_columns(&self, request: &TableRequest) -> Vec<ColumnDescriptor> {
        request
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| ColumnDescriptor::resolve(i, col, self.columns.get(i)))
            .collect()
    }

    /// Capture select, order, filter and paging state for `request`.
    ///
    /// A column bound by position switches the instance to array rows.
    pub fn snapshot(&mut self, request: &TableRequest) -> RequestSnapshot {
        let columns = self.describe_columns(request);

        if self.settings.use_objects && columns.iter().any(|c| c.positional) {
            tracing::debug!(table = %self.id, "positional column binding, switching to array rows");
            self.settings.use_objects = false;
        }

        let mut filters = Vec::new();
        for (column, wire) in columns.iter().zip(&request.columns) {
            if column.field.is_empty() || !wire.searchable || wire.search.is_empty() {
                continue;
            }
            if let Some(clause) = column_clause(column, &wire.search.value, &self.operators) {
                filters.push(clause.trim().to_string());
            }
        }
        if !request.search.value.trim().is_empty() {
            filters.push(request.search.value.clone());
        }

        let order = request
            .order
            .iter()
            .filter_map(|o| {
                let column = columns.get(o.column).filter(|c| !c.field.is_empty())?;
                Some(format!("{} {}", column.field, o.dir.trim().to_lowercase()))
            })
            .collect();

        let snapshot = RequestSnapshot {
            select: columns
                .into_iter()
                .map(|c| c.field)
                .filter(|f| !f.is_empty())
                .collect(),
            order,
            filters,
            start: request.start,
            length: request.length,
        };
        self.snapshot = snapshot.clone();
        snapshot
    }

    /// Build the query for `request`, or only `$select`/`$orderby` from the
    /// last snapshot when there is none. Prefixes `<url>?` on request.
    pub fn query(&mut self, include_url: bool, request: Option<&TableRequest>) -> String {
        let query = match request {
            Some(request) => {
                let snapshot = self.snapshot(request);
                self.builder().build(&snapshot)
            }
            None => self.builder().projection(&self.snapshot),
        };

        self.query = query.to_query_string();
        self.filter = query.filter_param().unwrap_or_default();

        if include_url {
            query.with_base(&self.settings.url)
        } else {
            self.query.clone()
        }
    }

    fn builder(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(&self.settings).server_side(self.server_side)
    }

    /// Percent-encoded request URL for `request`.
    pub fn request_url(&mut self, request: &TableRequest) -> Result<Url> {
        let snapshot = self.snapshot(request);
        let query = self.builder().build(&snapshot);
        self.query = query.to_query_string();
        self.filter = query.filter_param().unwrap_or_default();
        query.request_url(&self.settings.url)
    }

    /// Run one data request end to end.
    ///
    /// Never fails: transport errors, non-success statuses and empty or
    /// malformed payloads all come back as `TableResult::error`.
    pub fn fetch(&mut self, request: &TableRequest, transport: &dyn Transport) -> TableResult {
        let url = match self.request_url(request) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(table = %self.id, error = %e, "cannot build request url");
                return TableResult::error(e.to_string());
            }
        };

        emit_span(
            "fetch",
            &[
                ("table", self.id.as_str().to_string()),
                ("draw", request.draw.to_string()),
                ("url", url.to_string()),
            ],
        );

        let response = match transport.get(&url) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(table = %self.id, error = %e, "transport failure");
                return TableResult::error(NO_DATA_MESSAGE);
            }
        };

        if !response.is_success() {
            tracing::warn!(table = %self.id, status = response.status, "non-success response");
            return TableResult::error(NO_DATA_MESSAGE);
        }

        let Some(envelope) = Envelope::from_body(&response.body) else {
            tracing::warn!(table = %self.id, "empty result payload");
            return TableResult::error(NO_DATA_MESSAGE);
        };

        self.records_total = envelope.total();
        let result = normalize(envelope, request.draw, RowMode::from_settings(&self.settings));

        if let Some(callback) = self.callback.clone() {
            callback(self);
        }

        result
    }
}
