//! Table-level configuration.
//!
//! Every field has a default, and `#[serde(default)]` lets hosts pass partial
//! configuration. Malformed values are repaired by `sanitized` rather than
//! rejected.

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [10, 25, 50, 100];
pub const DEFAULT_EMPTY_MESSAGE: &str = "No data available";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub enabled: bool,
    #[serde(deserialize_with = "deserialize_page_size")]
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        PaginationConfig {
            enabled: true,
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
        }
    }
}

/// Feature switches and defaults for one table instance.
///
/// # Examples
///
/// ```
/// use tableview::TableConfig;
///
/// let config: TableConfig = serde_json::from_str(r#"{"selectable": true}"#).unwrap();
/// assert!(config.selectable);
/// assert!(config.searchable);
/// assert_eq!(config.pagination.page_size, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub searchable: bool,
    pub filterable: bool,
    pub sortable: bool,
    pub selectable: bool,
    pub exportable: bool,
    pub pagination: PaginationConfig,
    pub empty_message: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            searchable: true,
            filterable: true,
            sortable: true,
            selectable: false,
            exportable: true,
            pagination: PaginationConfig::default(),
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
        }
    }
}

impl TableConfig {
    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.pagination.page_size = page_size;
        self
    }

    pub fn without_pagination(mut self) -> Self {
        self.pagination.enabled = false;
        self
    }

    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    /// Repair values the engine cannot work with.
    pub fn sanitized(mut self) -> Self {
        if self.pagination.page_size == 0 {
            log::warn!(
                "page size 0 is invalid, falling back to {}",
                DEFAULT_PAGE_SIZE
            );
            self.pagination.page_size = DEFAULT_PAGE_SIZE;
        }
        self.pagination.page_size_options.retain(|&size| size > 0);
        self
    }
}

/// Read a page size from any signed integer. Zero and negative values fall
/// back to the default instead of failing the whole message.
pub fn deserialize_page_size<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let requested = i64::deserialize(deserializer)?;
    if requested <= 0 {
        log::warn!(
            "page size {} is invalid, falling back to {}",
            requested,
            DEFAULT_PAGE_SIZE
        );
        return Ok(DEFAULT_PAGE_SIZE);
    }
    Ok(usize::try_from(requested).unwrap_or(usize::MAX))
}

/// Page size to use for a requested value; zero falls back to the default.
pub fn effective_page_size(requested: usize) -> usize {
    if requested == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        requested
    }
}
