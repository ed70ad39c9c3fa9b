//! Declarative filters and the filter predicate evaluator
//!
//! A screen declares what can be filtered with a list of [`FilterSpec`]s and
//! keeps the current selection in [`FilterValues`]. [`FilterEngine`] reduces a
//! resource collection to its filtered view:
//!
//! ```text
//! items ──▶ search predicate ──AND──▶ one predicate per active filter ──▶ filtered view
//! ```
//!
//! The evaluator is a pure function of its inputs and preserves the relative
//! order of the surviving items. Malformed bounds never fail: an unparsable
//! date or number bound is simply not applied.

use crate::core::entity::Resource;
use crate::core::field::{FieldValue, parse_date, parse_timestamp};
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a filter is presented and evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    Select,
    Multiselect,
    DateRange,
    NumericRange,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Select => "select",
            FilterKind::Multiselect => "multiselect",
            FilterKind::DateRange => "date-range",
            FilterKind::NumericRange => "numeric-range",
        }
    }
}

/// One selectable option of a select or multiselect filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Declaration of one filterable dimension of a resource collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Unique key of the filter within a screen
    pub id: String,

    pub label: String,

    pub kind: FilterKind,

    /// Ordered options with unique values (select and multiselect only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FilterOption>,

    /// Resource field read by the filter; defaults to `id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl FilterSpec {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            options: Vec::new(),
            field: None,
        }
    }

    pub fn select(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, FilterKind::Select)
    }

    pub fn multiselect(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, FilterKind::Multiselect)
    }

    pub fn date_range(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, FilterKind::DateRange)
    }

    pub fn numeric_range(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, FilterKind::NumericRange)
    }

    /// Add an option (value, label)
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(FilterOption::new(value, label));
        self
    }

    /// Read a resource field whose name differs from the filter id
    pub fn on_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// The resource field this filter reads
    pub fn field(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.id)
    }
}

/// Inclusive date bounds as ISO strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// Inclusive numeric bounds as strings, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumericRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

/// Current value of one filter; the shape follows the filter kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Select(String),
    Multi(BTreeSet<String>),
    DateRange(DateRange),
    NumericRange(NumericRange),
}

impl FilterValue {
    pub fn select(value: impl Into<String>) -> Self {
        FilterValue::Select(value.into())
    }

    pub fn multi<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValue::Multi(values.into_iter().map(Into::into).collect())
    }

    pub fn date_range(from: Option<&str>, to: Option<&str>) -> Self {
        FilterValue::DateRange(DateRange {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
        })
    }

    pub fn numeric_range(min: Option<&str>, max: Option<&str>) -> Self {
        FilterValue::NumericRange(NumericRange {
            min: min.map(str::to_string),
            max: max.map(str::to_string),
        })
    }

    /// Whether the value restricts anything at all
    ///
    /// A scalar is active when non-empty, a set when it has members and a
    /// range when at least one bound is non-empty.
    pub fn is_active(&self) -> bool {
        match self {
            FilterValue::Select(v) => !v.is_empty(),
            FilterValue::Multi(set) => !set.is_empty(),
            FilterValue::DateRange(r) => non_empty(&r.from) || non_empty(&r.to),
            FilterValue::NumericRange(r) => non_empty(&r.min) || non_empty(&r.max),
        }
    }

    /// Whether the value's shape fits a filter kind
    pub fn fits(&self, kind: FilterKind) -> bool {
        matches!(
            (self, kind),
            (FilterValue::Select(_), FilterKind::Select)
                | (FilterValue::Multi(_), FilterKind::Multiselect)
                | (FilterValue::DateRange(_), FilterKind::DateRange)
                | (FilterValue::NumericRange(_), FilterKind::NumericRange)
        )
    }
}

fn non_empty(bound: &Option<String>) -> bool {
    bound.as_deref().is_some_and(|b| !b.trim().is_empty())
}

/// Mapping from filter id to its current value, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterValues(IndexMap<String, FilterValue>);

impl FilterValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, id: impl Into<String>, value: FilterValue) -> Self {
        self.set(id, value);
        self
    }

    pub fn set(&mut self, id: impl Into<String>, value: FilterValue) {
        self.0.insert(id.into(), value);
    }

    pub fn get(&self, id: &str) -> Option<&FilterValue> {
        self.0.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<FilterValue> {
        self.0.shift_remove(id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.0.iter()
    }

    /// Entries that actually restrict the view
    pub fn active(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.0.iter().filter(|(_, v)| v.is_active())
    }

    pub fn has_active(&self) -> bool {
        self.active().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Pure evaluator reducing a collection to its filtered view
///
/// Holds the static configuration of a screen: the filter specs (used to map
/// a filter id to a resource field) and the fields matched by free-text
/// search. Values whose id has no spec read the field named like the id.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    specs: Vec<FilterSpec>,
    search_fields: Vec<String>,
}

impl FilterEngine {
    pub fn new(specs: Vec<FilterSpec>, search_fields: Vec<String>) -> Self {
        Self {
            specs,
            search_fields,
        }
    }

    /// Engine configured with a resource's default search fields
    pub fn for_resource<R: Resource>(specs: Vec<FilterSpec>) -> Self {
        let search_fields = R::search_fields().iter().map(|f| f.to_string()).collect();
        Self::new(specs, search_fields)
    }

    pub fn specs(&self) -> &[FilterSpec] {
        &self.specs
    }

    pub fn spec(&self, id: &str) -> Option<&FilterSpec> {
        self.specs.iter().find(|s| s.id == id)
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    /// Produce the filtered view, preserving relative order
    pub fn apply<R: Resource>(
        &self,
        items: &[R],
        search_term: &str,
        values: &FilterValues,
    ) -> Vec<R> {
        let term = search_term.to_lowercase();
        let active: Vec<(&str, Predicate)> = values
            .active()
            .map(|(id, value)| {
                let field = self.spec(id).map(FilterSpec::field).unwrap_or(id.as_str());
                (field, Predicate::compile(value))
            })
            .collect();

        items
            .iter()
            .filter(|item| {
                self.matches_search(*item, &term)
                    && active.iter().all(|(field, predicate)| predicate.test(*item, field))
            })
            .cloned()
            .collect()
    }

    /// Whether a single item passes the search term and every active filter
    pub fn matches<R: Resource>(
        &self,
        item: &R,
        search_term: &str,
        values: &FilterValues,
    ) -> bool {
        let term = search_term.to_lowercase();
        self.matches_search(item, &term)
            && values.active().all(|(id, value)| {
                let field = self.spec(id).map(FilterSpec::field).unwrap_or(id.as_str());
                Predicate::compile(value).test(item, field)
            })
    }

    fn matches_search<R: Resource>(&self, item: &R, lowered_term: &str) -> bool {
        if lowered_term.is_empty() {
            return true;
        }
        self.search_fields.iter().any(|field| {
            item.field_value(field)
                .and_then(|v| v.to_text())
                .is_some_and(|text| text.to_lowercase().contains(lowered_term))
        })
    }
}

/// A filter value with its bounds parsed once per evaluation
enum Predicate<'a> {
    Equals(&'a str),
    OneOf(&'a BTreeSet<String>),
    Between {
        from: Option<DateTime<Utc>>,
        to: Option<DateBound>,
    },
    Within {
        min: Option<f64>,
        max: Option<f64>,
    },
}

/// Upper date bound: a date-only bound includes the whole day
enum DateBound {
    Day(NaiveDate),
    Instant(DateTime<Utc>),
}

impl<'a> Predicate<'a> {
    fn compile(value: &'a FilterValue) -> Self {
        match value {
            FilterValue::Select(v) => Predicate::Equals(v),
            FilterValue::Multi(set) => Predicate::OneOf(set),
            FilterValue::DateRange(range) => Predicate::Between {
                from: range.from.as_deref().and_then(parse_timestamp),
                to: range.to.as_deref().and_then(|raw| {
                    parse_date(raw)
                        .map(DateBound::Day)
                        .or_else(|| parse_timestamp(raw).map(DateBound::Instant))
                }),
            },
            FilterValue::NumericRange(range) => Predicate::Within {
                min: range.min.as_deref().and_then(parse_number),
                max: range.max.as_deref().and_then(parse_number),
            },
        }
    }

    fn test<R: Resource>(&self, item: &R, field: &str) -> bool {
        let value = item.field_value(field).unwrap_or(FieldValue::Null);
        match self {
            Predicate::Equals(expected) => value.to_text().is_some_and(|text| text == *expected),
            Predicate::OneOf(set) => value.to_text().is_some_and(|text| set.contains(&text)),
            Predicate::Between { from: None, to: None } => true,
            Predicate::Between { from, to } => {
                let Some(at) = value.as_datetime() else {
                    return false;
                };
                let after_from = from.is_none_or(|from| at >= from);
                let before_to = match to {
                    None => true,
                    Some(DateBound::Day(day)) => at.date_naive() <= *day,
                    Some(DateBound::Instant(instant)) => at <= *instant,
                };
                after_from && before_to
            }
            Predicate::Within { min: None, max: None } => true,
            Predicate::Within { min, max } => {
                let Some(n) = value.as_number() else {
                    return false;
                };
                min.is_none_or(|min| n >= min) && max.is_none_or(|max| n <= max)
            }
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
