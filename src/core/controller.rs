//! In-memory resource list controller
//!
//! Owns a resource collection together with the screen state around it
//! (search term, filter values, staged delete) and derives the filtered view
//! on demand:
//!
//! ```text
//! create / update / remove ──▶ items ──┐
//! set_search_term ───────────▶ term ───┼──▶ FilterEngine::apply ──▶ filtered view ──▶ page
//! set_filter ────────────────▶ values ─┘
//! ```

use crate::core::entity::Resource;
use crate::core::error::{ConsoleError, ConsoleResult, ResourceError};
use crate::core::events::{ConsoleEvent, EventBus, ResourceEvent};
use crate::core::filter::{FilterEngine, FilterSpec, FilterValue, FilterValues};
use crate::core::query::{BulkDeleteResult, ListParams, Page, paginate, sort_items};
use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

/// Synchronous CRUD controller over one resource collection
///
/// Items keep their insertion order; ids are unique. Every mutation is
/// all-or-nothing: a rejected call leaves the collection untouched.
#[derive(Debug, Clone)]
pub struct ResourceController<R: Resource> {
    items: Vec<R>,
    search_term: String,
    filter_values: FilterValues,
    pending_delete: Option<String>,
    engine: FilterEngine,
    bus: Option<EventBus>,
}

impl<R: Resource> ResourceController<R> {
    /// Empty controller filtering with `specs` and the resource's search fields
    pub fn new(specs: Vec<FilterSpec>) -> Self {
        Self::with_engine(FilterEngine::for_resource::<R>(specs))
    }

    pub fn with_engine(engine: FilterEngine) -> Self {
        Self {
            items: Vec::new(),
            search_term: String::new(),
            filter_values: FilterValues::new(),
            pending_delete: None,
            engine,
            bus: None,
        }
    }

    /// Seed the collection; a duplicate id is rejected
    pub fn with_items(mut self, items: impl IntoIterator<Item = R>) -> ConsoleResult<Self> {
        for item in items {
            self.insert(item)?;
        }
        Ok(self)
    }

    /// Publish mutations on an event bus
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn engine(&self) -> &FilterEngine {
        &self.engine
    }

    // === Queries ===

    /// Every item, in insertion order
    pub fn list(&self) -> &[R] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items passing the current search term and filters, in insertion order
    pub fn filtered_list(&self) -> Vec<R> {
        self.engine
            .apply(&self.items, &self.search_term, &self.filter_values)
    }

    /// One page of the filtered view
    pub fn page(&self, page: usize, limit: usize) -> Page<R> {
        paginate(self.filtered_list(), page, limit)
    }

    /// Answer a list request without touching the screen state
    ///
    /// Search and filters come from `params`; the result is sorted when
    /// `params.sort_by` is set, then paginated.
    pub fn query(&self, params: &ListParams) -> Page<R> {
        let mut items = self
            .engine
            .apply(&self.items, params.search_term(), &params.filters);
        if let Some(field) = &params.sort_by {
            sort_items(&mut items, field, params.sort_order.unwrap_or_default());
        }
        paginate(items, params.page(), params.limit())
    }

    // === Search and filters ===

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn filter_values(&self) -> &FilterValues {
        &self.filter_values
    }

    /// Set one filter; an inactive value removes it
    pub fn set_filter(&mut self, filter_id: impl Into<String>, value: FilterValue) {
        let filter_id = filter_id.into();
        if value.is_active() {
            self.filter_values.set(filter_id, value);
        } else {
            self.filter_values.remove(&filter_id);
        }
    }

    /// Replace every filter value (e.g. from a [`FilterPanel`](crate::core::filter_panel::FilterPanel))
    pub fn set_filters(&mut self, values: FilterValues) {
        self.filter_values = values;
    }

    pub fn clear_filters(&mut self) {
        self.filter_values.clear();
    }

    // === Mutations ===

    /// Validate a form and append the new resource under a fresh id
    pub fn create(&mut self, form: R::Form) -> ConsoleResult<R> {
        R::validate(&form)?;

        let mut id = Uuid::new_v4().to_string();
        while self.get(&id).is_some() {
            id = Uuid::new_v4().to_string();
        }

        let item = R::from_form(id, Utc::now(), form);
        tracing::debug!(resource = R::resource_name(), id = %item.id(), "resource created");
        self.items.push(item.clone());
        self.publish_item(&item, |resource, id, data| ResourceEvent::Created {
            resource,
            id,
            data,
        });
        Ok(item)
    }

    /// Replace every field of an existing resource except `id` and `created_at`
    pub fn update(&mut self, id: &str, form: R::Form) -> ConsoleResult<R> {
        let index = self.position(id)?;
        R::validate(&form)?;

        let current = &self.items[index];
        let item = R::from_form(current.id().to_string(), current.created_at(), form);
        self.items[index] = item.clone();
        tracing::debug!(resource = R::resource_name(), id = %id, "resource updated");
        self.publish_item(&item, |resource, id, data| ResourceEvent::Updated {
            resource,
            id,
            data,
        });
        Ok(item)
    }

    /// Remove a resource
    pub fn remove(&mut self, id: &str) -> ConsoleResult<R> {
        let index = self.position(id)?;
        let removed = self.items.remove(index);
        if self.pending_delete.as_deref() == Some(id) {
            self.pending_delete = None;
        }
        tracing::debug!(resource = R::resource_name(), id = %id, "resource removed");
        self.publish(ResourceEvent::Deleted {
            resource: R::resource_name().to_string(),
            id: id.to_string(),
        });
        Ok(removed)
    }

    /// Remove every resource whose id is listed; unknown ids are reported as missing
    pub fn bulk_remove<S: AsRef<str>>(&mut self, ids: &[S]) -> BulkDeleteResult {
        let mut requested = Vec::new();
        let mut seen = HashSet::new();
        for id in ids {
            let id = id.as_ref();
            if seen.insert(id) {
                requested.push(id);
            }
        }

        let present: HashSet<&str> = self.items.iter().map(|item| item.id()).collect();
        let (deleted, missing): (Vec<&str>, Vec<&str>) =
            requested.into_iter().partition(|id| present.contains(id));
        let result = BulkDeleteResult {
            deleted: deleted.into_iter().map(str::to_string).collect(),
            missing: missing.into_iter().map(str::to_string).collect(),
        };

        let doomed: HashSet<&str> = result.deleted.iter().map(String::as_str).collect();
        self.items.retain(|item| !doomed.contains(item.id()));
        if self
            .pending_delete
            .as_deref()
            .is_some_and(|pending| doomed.contains(pending))
        {
            self.pending_delete = None;
        }

        tracing::debug!(
            resource = R::resource_name(),
            deleted = result.deleted.len(),
            missing = result.missing.len(),
            "bulk remove"
        );
        if !result.deleted.is_empty() {
            self.publish(ResourceEvent::BulkDeleted {
                resource: R::resource_name().to_string(),
                ids: result.deleted.clone(),
            });
        }
        result
    }

    // === Staged delete ===

    /// Mark a resource as the pending delete target
    pub fn request_delete(&mut self, id: &str) -> ConsoleResult<&R> {
        let index = self.position(id)?;
        self.pending_delete = Some(id.to_string());
        Ok(&self.items[index])
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn pending_delete(&self) -> Option<&R> {
        self.pending_delete.as_deref().and_then(|id| self.get(id))
    }

    /// Remove the pending delete target
    pub fn confirm_delete(&mut self) -> ConsoleResult<R> {
        let id = self.pending_delete.take().ok_or(ConsoleError::NothingPending)?;
        self.remove(&id)
    }

    // === Internals ===

    /// Insert a resource as-is, keeping its id
    pub(crate) fn insert(&mut self, item: R) -> ConsoleResult<()> {
        if self.get(item.id()).is_some() {
            return Err(ResourceError::AlreadyExists {
                resource: R::resource_name().to_string(),
                id: item.id().to_string(),
            }
            .into());
        }
        self.items.push(item);
        Ok(())
    }

    fn position(&self, id: &str) -> ConsoleResult<usize> {
        self.items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| ConsoleError::not_found(R::resource_name(), id))
    }

    fn publish_item(
        &self,
        item: &R,
        event: impl FnOnce(String, String, serde_json::Value) -> ResourceEvent,
    ) {
        if self.bus.is_some() {
            let data = serde_json::to_value(item).unwrap_or_default();
            self.publish(event(
                R::resource_name().to_string(),
                item.id().to_string(),
                data,
            ));
        }
    }

    fn publish(&self, event: ResourceEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(ConsoleEvent::Resource(event));
        }
    }
}
