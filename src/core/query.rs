//! List parameters, pagination metadata and the API envelope
//!
//! These types are shared by both sides of the resource API: the HTTP data
//! source encodes [`ListParams`] into a query string and decodes
//! [`Envelope`]s, the server does the reverse.

use crate::core::entity::Resource;
use crate::core::error::TransportError;
use crate::core::filter::{DateRange, FilterKind, FilterSpec, FilterValue, FilterValues, NumericRange};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Maximum page size accepted by [`ListParams::limit`]
pub const MAX_LIMIT: usize = 100;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// Parameters of a list request
///
/// # Query string
/// ```text
/// GET /api/operators?page=2&limit=10&sortBy=name&sortOrder=desc&search=ali
///     &filters[status]=active
///     &filters[region]=Toshkent&filters[region]=Buxoro
///     &filters[createdAt][from]=2024-01-01&filters[price][max]=5000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    pub sort_by: Option<String>,

    pub sort_order: Option<SortOrder>,

    /// Free-text search term
    pub search: Option<String>,

    #[serde(default)]
    pub filters: FilterValues,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            sort_by: None,
            sort_order: None,
            search: None,
            filters: FilterValues::default(),
        }
    }
}

impl ListParams {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = Some(order);
        self
    }

    pub fn with_filters(mut self, filters: FilterValues) -> Self {
        self.filters = filters;
        self
    }

    /// Get page number, ensuring minimum of 1
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    /// Get limit, clamped to `1..=MAX_LIMIT`
    pub fn limit(&self) -> usize {
        self.limit.clamp(1, MAX_LIMIT)
    }

    /// Search term, or an empty string
    pub fn search_term(&self) -> &str {
        self.search.as_deref().unwrap_or("")
    }

    /// Encode as query pairs; inactive filters are omitted
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page().to_string()),
            ("limit".to_string(), self.limit().to_string()),
        ];
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy".to_string(), sort_by.clone()));
        }
        if let Some(order) = self.sort_order {
            pairs.push(("sortOrder".to_string(), order.as_str().to_string()));
        }
        if let Some(search) = self.search.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("search".to_string(), search.clone()));
        }
        for (id, value) in self.filters.active() {
            match value {
                FilterValue::Select(v) => pairs.push((format!("filters[{id}]"), v.clone())),
                FilterValue::Multi(set) => {
                    pairs.extend(set.iter().map(|v| (format!("filters[{id}]"), v.clone())));
                }
                FilterValue::DateRange(range) => {
                    push_bound(&mut pairs, id, "from", &range.from);
                    push_bound(&mut pairs, id, "to", &range.to);
                }
                FilterValue::NumericRange(range) => {
                    push_bound(&mut pairs, id, "min", &range.min);
                    push_bound(&mut pairs, id, "max", &range.max);
                }
            }
        }
        pairs
    }

    /// Decode query pairs
    ///
    /// Specs decide whether a single `filters[id]` value is a select or a
    /// one-member multiselect; without a spec, repeated keys become a set.
    /// Unknown keys and unparsable page/limit values fall back to defaults.
    pub fn from_query_pairs(pairs: &[(String, String)], specs: &[FilterSpec]) -> Self {
        let mut params = Self::default();
        let mut scalars: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut ranges: IndexMap<String, Vec<(String, String)>> = IndexMap::new();

        for (key, value) in pairs {
            match key.as_str() {
                "page" => params.page = value.trim().parse().unwrap_or(params.page),
                "limit" => params.limit = value.trim().parse().unwrap_or(params.limit),
                "sortBy" if !value.is_empty() => params.sort_by = Some(value.clone()),
                "sortOrder" => params.sort_order = SortOrder::parse(value),
                "search" if !value.is_empty() => params.search = Some(value.clone()),
                _ => match parse_filter_key(key) {
                    Some((id, None)) => scalars.entry(id).or_default().push(value.clone()),
                    Some((id, Some(bound))) => {
                        ranges.entry(id).or_default().push((bound, value.clone()))
                    }
                    None => tracing::trace!(key = %key, "ignoring unknown query parameter"),
                },
            }
        }

        for (id, values) in scalars {
            let kind = specs.iter().find(|s| s.id == id).map(|s| s.kind);
            let value = match (kind, values.len()) {
                (Some(FilterKind::Multiselect), _) | (None, 2..) => FilterValue::multi(values),
                _ => FilterValue::Select(values.into_iter().next().unwrap_or_default()),
            };
            params.filters.set(id, value);
        }

        for (id, bounds) in ranges {
            let numeric = bounds.iter().any(|(b, _)| b == "min" || b == "max");
            let bound = |name: &str| {
                bounds
                    .iter()
                    .find(|(b, _)| b == name)
                    .map(|(_, v)| v.clone())
            };
            let value = if numeric {
                FilterValue::NumericRange(NumericRange {
                    min: bound("min"),
                    max: bound("max"),
                })
            } else {
                FilterValue::DateRange(DateRange {
                    from: bound("from"),
                    to: bound("to"),
                })
            };
            params.filters.set(id, value);
        }

        params
    }
}

fn push_bound(pairs: &mut Vec<(String, String)>, id: &str, name: &str, bound: &Option<String>) {
    if let Some(b) = bound.as_ref().filter(|b| !b.trim().is_empty()) {
        pairs.push((format!("filters[{id}][{name}]"), b.clone()));
    }
}

/// Split `filters[id]` or `filters[id][bound]` into its parts
fn parse_filter_key(key: &str) -> Option<(String, Option<String>)> {
    let rest = key.strip_prefix("filters[")?;
    let (id, rest) = rest.split_once(']')?;
    if id.is_empty() {
        return None;
    }
    if rest.is_empty() {
        return Some((id.to_string(), None));
    }
    let bound = rest.strip_prefix('[')?.strip_suffix(']')?;
    match bound {
        "from" | "to" | "min" | "max" => Some((id.to_string(), Some(bound.to_string()))),
        _ => None,
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    #[serde(default)]
    pub has_next: bool,

    #[serde(default)]
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create pagination metadata from calculation
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let page = page.max(1);
        // Ensure limit is at least 1 to avoid division by zero
        let limit = limit.max(1);
        let total_pages = if total == 0 { 0 } else { total.div_ceil(limit) };
        let start = page.saturating_sub(1).saturating_mul(limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: start.saturating_add(limit) < total,
            has_prev: page > 1,
        }
    }
}

/// One page of a list result
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Cut one page out of an already filtered and sorted collection
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Page<T> {
    let pagination = PaginationMeta::new(page, limit, items.len());
    let start = pagination
        .page
        .saturating_sub(1)
        .saturating_mul(pagination.limit);
    let items = items
        .into_iter()
        .skip(start)
        .take(pagination.limit)
        .collect();
    Page { items, pagination }
}

/// Stable sort by a resource field; missing values sort last in both directions
pub fn sort_items<R: Resource>(items: &mut [R], field: &str, order: SortOrder) {
    items.sort_by(|a, b| {
        let (a, b) = (a.field_value(field), b.field_value(field));
        match (a.filter(|v| !v.is_null()), b.filter(|v| !v.is_null())) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => {
                let ordering = compare_values(&a, &b);
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            }
        }
    });
}

fn compare_values(a: &crate::core::field::FieldValue, b: &crate::core::field::FieldValue) -> Ordering {
    use crate::core::field::FieldValue;
    match (a, b) {
        (FieldValue::DateTime(a), FieldValue::DateTime(b)) => a.cmp(b),
        (FieldValue::Boolean(a), FieldValue::Boolean(b)) => a.cmp(b),
        (FieldValue::String(a), FieldValue::String(b)) => {
            a.to_lowercase().cmp(&b.to_lowercase())
        }
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.to_text().cmp(&b.to_text()),
        },
    }
}

/// Response envelope of the resource API
///
/// ```json
/// { "success": true, "data": [...], "pagination": {"page": 1, "limit": 20, "total": 2, "totalPages": 1} }
/// { "success": false, "error": "operator with id '99' not found" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            pagination: None,
        }
    }

    pub fn paged(data: T, pagination: PaginationMeta) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::ok(data)
        }
    }

    /// The envelope's data, or the transport error it reports
    pub fn into_data(self) -> Result<T, TransportError> {
        if !self.success {
            return Err(TransportError::Api {
                message: self.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        self.data.ok_or_else(|| TransportError::Decode {
            message: "successful response without data".to_string(),
        })
    }
}

/// Body of `POST {base}/bulk-delete`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

/// Outcome of a bulk delete: which ids were removed and which did not exist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteResult {
    pub deleted: Vec<String>,
    #[serde(default)]
    pub missing: Vec<String>,
}
