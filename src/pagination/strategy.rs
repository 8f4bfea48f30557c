//! Continuation strategies
//!
//! A strategy interprets payloads for the engine. Extraction never fails:
//! a payload of an unexpected shape yields no records and empty metadata.

use crate::error::{Error, Result};
use crate::types::{value_as_i64, JsonObject, JsonValue, PageResult, Payload, Record, RequestParams};

/// Per-API logic for reading pages and deciding how to continue
pub trait ContinuationStrategy: Send + Sync {
    /// Records of one page, in page order
    fn extract_data(&self, payload: &Payload) -> Vec<Record>;

    /// Pagination metadata of one page
    fn extract_metadata(&self, payload: &Payload) -> JsonValue;

    /// Whether another page should be requested after `page_count` pages
    fn should_continue(&self, metadata: &JsonValue, page_count: u64) -> bool;

    /// Parameters of the next request, or `None` to stop.
    ///
    /// Implementations must return a fresh set and keep every key they do
    /// not paginate on. An `Err` ends the stream and is not retried.
    fn next_page_params(
        &self,
        metadata: &JsonValue,
        current_params: &RequestParams,
        page_count: u64,
    ) -> Result<Option<RequestParams>>;

    /// Records and metadata of one payload
    fn page_result(&self, payload: &Payload) -> PageResult {
        PageResult {
            records: self.extract_data(payload),
            metadata: self.extract_metadata(payload),
        }
    }
}

/// Page-numbered pagination over `[metadata, records]` payloads.
///
/// This is the layout of the World Bank indicators API:
///
/// ```text
/// [ {"page": 1, "pages": 2, "per_page": 50, "total": 80}, [ {...}, {...} ] ]
/// ```
#[derive(Debug, Clone)]
pub struct PageNumberStrategy {
    /// Query parameter carrying the page number
    pub page_param: String,
    /// Metadata key of the current page
    pub page_key: String,
    /// Metadata key of the total page count
    pub pages_key: String,
}

impl Default for PageNumberStrategy {
    fn default() -> Self {
        Self {
            page_param: "page".to_string(),
            page_key: "page".to_string(),
            pages_key: "pages".to_string(),
        }
    }
}

impl PageNumberStrategy {
    /// Create the default strategy (`page` / `pages`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query parameter carrying the page number
    #[must_use]
    pub fn with_page_param(mut self, param: impl Into<String>) -> Self {
        self.page_param = param.into();
        self
    }

    /// Set the metadata keys for current page and total pages
    #[must_use]
    pub fn with_metadata_keys(mut self, page: impl Into<String>, pages: impl Into<String>) -> Self {
        self.page_key = page.into();
        self.pages_key = pages.into();
        self
    }

    fn metadata_object(metadata: &JsonValue) -> Option<&JsonObject> {
        metadata.as_object().filter(|m| !m.is_empty())
    }
}

impl ContinuationStrategy for PageNumberStrategy {
    fn extract_data(&self, payload: &Payload) -> Vec<Record> {
        match payload.as_array() {
            Some(parts) if parts.len() >= 2 => parts[1].as_array().cloned().unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn extract_metadata(&self, payload: &Payload) -> JsonValue {
        match payload.as_array() {
            Some(parts) if parts.len() >= 2 && parts[0].is_object() => parts[0].clone(),
            _ => JsonValue::Object(JsonObject::new()),
        }
    }

    fn should_continue(&self, metadata: &JsonValue, _page_count: u64) -> bool {
        let Some(meta) = Self::metadata_object(metadata) else {
            return false;
        };
        let page = meta.get(&self.page_key).and_then(value_as_i64).unwrap_or(1);
        let pages = meta.get(&self.pages_key).and_then(value_as_i64).unwrap_or(1);
        page < pages
    }

    fn next_page_params(
        &self,
        metadata: &JsonValue,
        current_params: &RequestParams,
        _page_count: u64,
    ) -> Result<Option<RequestParams>> {
        let Some(meta) = Self::metadata_object(metadata) else {
            return Ok(None);
        };

        let current_page = current_params
            .get_i64(&self.page_param)
            .or_else(|| meta.get(&self.page_key).and_then(value_as_i64))
            .unwrap_or(1);

        let next_page = current_page.checked_add(1).ok_or_else(|| {
            Error::pagination(format!("page number {current_page} cannot be incremented"))
        })?;

        let mut next = current_params.clone();
        next.insert(self.page_param.clone(), next_page);
        Ok(Some(next))
    }
}
