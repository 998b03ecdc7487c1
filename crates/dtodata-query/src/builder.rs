//! Query assembly.
//!
//! Clause order is fixed so output is deterministic:
//! `$count=true&$format=json`, `$select`, `$orderby`, `$top`/`$skip`, `$filter`.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

use dtodata_core::config::Settings;
use dtodata_core::error::Result;
use dtodata_core::request::RequestSnapshot;

/// Escaped inside a clause value. `$`, `,`, `(`, `)` and `/` stay readable.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// One outbound query, clause by clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ODataQuery {
    pub select: Option<String>,
    pub order_by: Option<String>,
    pub top: Option<u64>,
    pub skip: Option<u64>,
    pub filter: Option<String>,
}

impl ODataQuery {
    /// The raw query string, no leading `?`.
    pub fn to_query_string(&self) -> String {
        self.to_string()
    }

    /// The `$filter=...` part alone, if any.
    pub fn filter_param(&self) -> Option<String> {
        self.filter.as_ref().map(|f| format!("$filter={f}"))
    }

    /// `<base>?<query>`, unencoded.
    pub fn with_base(&self, base: &str) -> String {
        format!("{base}?{self}")
    }

    /// Parse `base` and attach the query. Each clause value is
    /// percent-encoded on its own so `&`, `+`, `%` and `=` inside a filter
    /// literal reach the service unchanged. An existing query on `base` is
    /// kept in front.
    pub fn request_url(&self, base: &str) -> Result<Url> {
        let mut url = Url::parse(base.trim())?;
        let encoded = self.encoded();
        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
            _ => encoded,
        };
        url.set_query(Some(&query));
        Ok(url)
    }

    /// `name=value` pairs in the fixed clause order.
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("$count", "true".to_string()), ("$format", "json".to_string())];
        if let Some(select) = &self.select {
            params.push(("$select", select.clone()));
        }
        if let Some(order_by) = &self.order_by {
            params.push(("$orderby", order_by.clone()));
        }
        if let Some(top) = self.top {
            params.push(("$top", top.to_string()));
        }
        if let Some(skip) = self.skip {
            params.push(("$skip", skip.to_string()));
        }
        if let Some(filter) = &self.filter {
            params.push(("$filter", filter.clone()));
        }
        params
    }

    fn encoded(&self) -> String {
        self.params()
            .into_iter()
            .map(|(name, value)| format!("{name}={}", utf8_percent_encode(&value, QUERY_VALUE)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for ODataQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.params().into_iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

pub struct QueryBuilder<'a> {
    settings: &'a Settings,
    server_side: bool,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            server_side: false,
        }
    }

    /// Whether the table pages on the server; gates `$top`/`$skip`.
    pub fn server_side(mut self, enabled: bool) -> Self {
        self.server_side = enabled;
        self
    }

    /// Only the request-independent clauses: `$select` and `$orderby`.
    pub fn projection(&self, snapshot: &RequestSnapshot) -> ODataQuery {
        let select = (self.settings.query_select && !snapshot.select.is_empty())
            .then(|| snapshot.select.join(","));
        let order_by = (self.settings.query_order && !snapshot.order.is_empty())
            .then(|| snapshot.order.join(","));

        ODataQuery {
            select,
            order_by,
            ..ODataQuery::default()
        }
    }

    /// Full query for one table request.
    pub fn build(&self, snapshot: &RequestSnapshot) -> ODataQuery {
        let mut query = self.projection(snapshot);

        if self.server_side && !snapshot.is_fetch_all() {
            let length = snapshot.length.unsigned_abs();
            query.top = Some(length.saturating_mul(u64::from(self.settings.paging_cache)));
            query.skip = Some(snapshot.start);
        }

        if !snapshot.filters.is_empty() {
            query.filter = Some(snapshot.filters.join(" and "));
        }

        tracing::debug!(query = %query, "built odata query");
        query
    }
}
