//! Per-table adapter settings and the shapes they may arrive in.
//!
//! A table binds exactly one `Settings`. Hosts hand over a `SettingsSource`
//! (nothing, a bare URL, or a partial patch) which is resolved once at bind
//! time by merging it over fresh defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// UI comparison tokens, positionally paired with the canonical operators
/// `eq, ne, gt, ge, lt, le, has`.
pub const DEFAULT_OPERATOR_TOKENS: [&str; 7] = ["==", "!=", ">", ">=", "<", "<=", "has"];

/// Number of entries an operator token list must carry.
pub const OPERATOR_COUNT: usize = DEFAULT_OPERATOR_TOKENS.len();

/// Where the host renders the per-column search inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchColumnsPlace {
    #[default]
    Tfoot,
    Thead,
}

impl FromStr for SearchColumnsPlace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tfoot" => Ok(Self::Tfoot),
            "thead" => Ok(Self::Thead),
            other => Err(Error::Config(format!(
                "searchColumnsPlace must be 'tfoot' or 'thead', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for SearchColumnsPlace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tfoot => f.write_str("tfoot"),
            Self::Thead => f.write_str("thead"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Base URL the query string is appended to.
    pub url: String,

    /// Deliver rows as keyed objects (`true`) or positional arrays.
    pub use_objects: bool,

    /// Emit `$orderby`.
    pub query_order: bool,

    /// Emit `$select`.
    pub query_select: bool,

    /// Pages fetched per request; scales `$top`. Always >= 1.
    pub paging_cache: u32,

    /// Whether the host shows per-column search inputs.
    pub search_columns: bool,

    pub search_columns_place: SearchColumnsPlace,

    /// UI operator tokens, exactly `OPERATOR_COUNT` entries.
    pub map_operators: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: String::new(),
            use_objects: true,
            query_order: true,
            query_select: true,
            paging_cache: 1,
            search_columns: true,
            search_columns_place: SearchColumnsPlace::Tfoot,
            map_operators: DEFAULT_OPERATOR_TOKENS
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

impl Settings {
    /// Defaults pointed at `url`.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim().to_string(),
            ..Self::default()
        }
    }

    /// Check the invariants every bound settings object must hold.
    pub fn validate(&self) -> Result<()> {
        if self.paging_cache == 0 {
            return Err(Error::Config("pagingCache must be at least 1".into()));
        }
        validate_operator_tokens(&self.map_operators)
    }
}

fn validate_operator_tokens(tokens: &[String]) -> Result<()> {
    if tokens.len() != OPERATOR_COUNT {
        return Err(Error::Config(format!(
            "mapOperators must list exactly {} tokens, got {}",
            OPERATOR_COUNT,
            tokens.len()
        )));
    }
    if let Some(pos) = tokens.iter().position(|t| t.trim().is_empty()) {
        return Err(Error::Config(format!(
            "mapOperators entry {pos} is empty"
        )));
    }
    Ok(())
}

/// User-supplied overrides; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsPatch {
    pub url: Option<String>,
    pub use_objects: Option<bool>,
    pub query_order: Option<bool>,
    pub query_select: Option<bool>,
    pub paging_cache: Option<u32>,
    pub search_columns: Option<bool>,
    pub search_columns_place: Option<SearchColumnsPlace>,
    /// Replaces the whole token list; never merged entry by entry.
    pub map_operators: Option<Vec<String>>,
}

impl SettingsPatch {
    /// Read overrides from environment variables.
    ///
    /// Environment variables:
    /// - `DTODATA_URL`: base service url
    /// - `DTODATA_USE_OBJECTS`, `DTODATA_QUERY_ORDER`, `DTODATA_QUERY_SELECT`,
    ///   `DTODATA_SEARCH_COLUMNS`: `true` / `false`
    /// - `DTODATA_PAGING_CACHE`: pages per request
    /// - `DTODATA_SEARCH_COLUMNS_PLACE`: `tfoot` / `thead`
    /// - `DTODATA_MAP_OPERATORS`: comma-separated token list
    ///
    /// Values that fail to parse are ignored.
    pub fn from_env() -> Self {
        let mut patch = Self::default();

        if let Ok(s) = std::env::var("DTODATA_URL") {
            patch.url = Some(s);
        }

        patch.use_objects = env_parse("DTODATA_USE_OBJECTS");
        patch.query_order = env_parse("DTODATA_QUERY_ORDER");
        patch.query_select = env_parse("DTODATA_QUERY_SELECT");
        patch.paging_cache = env_parse("DTODATA_PAGING_CACHE");
        patch.search_columns = env_parse("DTODATA_SEARCH_COLUMNS");
        patch.search_columns_place = env_parse("DTODATA_SEARCH_COLUMNS_PLACE");

        if let Ok(s) = std::env::var("DTODATA_MAP_OPERATORS") {
            patch.map_operators = Some(s.split(',').map(|t| t.trim().to_string()).collect());
        }

        patch
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merge(mut self, other: SettingsPatch) -> Self {
        if other.url.is_some() {
            self.url = other.url;
        }
        if other.use_objects.is_some() {
            self.use_objects = other.use_objects;
        }
        if other.query_order.is_some() {
            self.query_order = other.query_order;
        }
        if other.query_select.is_some() {
            self.query_select = other.query_select;
        }
        if other.paging_cache.is_some() {
            self.paging_cache = other.paging_cache;
        }
        if other.search_columns.is_some() {
            self.search_columns = other.search_columns;
        }
        if other.search_columns_place.is_some() {
            self.search_columns_place = other.search_columns_place;
        }
        if other.map_operators.is_some() {
            self.map_operators = other.map_operators;
        }
        self
    }

    /// Apply onto `settings`. The target is left untouched if the result
    /// would be invalid.
    pub fn apply(&self, settings: &mut Settings) -> Result<()> {
        let mut next = settings.clone();

        if let Some(url) = &self.url {
            next.url = url.trim().to_string();
        }
        if let Some(v) = self.use_objects {
            next.use_objects = v;
        }
        if let Some(v) = self.query_order {
            next.query_order = v;
        }
        if let Some(v) = self.query_select {
            next.query_select = v;
        }
        if let Some(v) = self.paging_cache {
            next.paging_cache = v;
        }
        if let Some(v) = self.search_columns {
            next.search_columns = v;
        }
        if let Some(v) = self.search_columns_place {
            next.search_columns_place = v;
        }
        if let Some(tokens) = &self.map_operators {
            next.map_operators = tokens.clone();
        }

        next.validate()?;
        *settings = next;
        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// The shapes a table's adapter configuration may arrive in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SettingsSource {
    /// No configuration; the table is not wired to a service.
    #[default]
    None,
    /// Only a base URL; everything else defaults.
    UrlOnly(String),
    /// Partial settings merged over defaults.
    Full(SettingsPatch),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSource {
    Url(String),
    Full(SettingsPatch),
}

impl SettingsSource {
    fn from_raw(raw: Option<RawSource>) -> Self {
        match raw {
            None => SettingsSource::None,
            Some(RawSource::Url(url)) => SettingsSource::UrlOnly(url),
            Some(RawSource::Full(patch)) => SettingsSource::Full(patch),
        }
    }

    /// `null` → `None`, a string → `UrlOnly`, an object → `Full`.
    pub fn from_json_str(src: &str) -> Result<Self> {
        let raw: Option<RawSource> = serde_json::from_str(src)?;
        Ok(Self::from_raw(raw))
    }

    /// Same mapping as `from_json_str`, for YAML documents.
    pub fn from_yaml_str(src: &str) -> Result<Self> {
        let raw: Option<RawSource> = serde_yaml::from_str(src)?;
        Ok(Self::from_raw(raw))
    }

    /// Resolve into concrete settings. `None` stays unbound.
    pub fn resolve(&self) -> Result<Option<Settings>> {
        match self {
            SettingsSource::None => Ok(None),
            SettingsSource::UrlOnly(url) => Ok(Some(Settings::with_url(url.as_str()))),
            SettingsSource::Full(patch) => {
                let mut settings = Settings::default();
                patch.apply(&mut settings)?;
                Ok(Some(settings))
            }
        }
    }
}

impl From<&str> for SettingsSource {
    fn from(url: &str) -> Self {
        SettingsSource::UrlOnly(url.to_string())
    }
}

impl From<SettingsPatch> for SettingsSource {
    fn from(patch: SettingsPatch) -> Self {
        SettingsSource::Full(patch)
    }
}
