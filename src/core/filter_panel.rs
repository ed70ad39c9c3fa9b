//! Filter panel value store

use crate::core::error::{ConsoleResult, ValidationError};
use crate::core::events::{ConsoleEvent, EventBus, FilterChange};
use crate::core::filter::{FilterSpec, FilterValue, FilterValues};

/// Owns the current [`FilterValues`] of a list of specs
///
/// Every change is recorded as a [`FilterChange`] (`filter_id`, new value)
/// that callers drain with [`take_changes`](Self::take_changes) and that is
/// also published on the attached [`EventBus`], if any.
#[derive(Debug, Clone, Default)]
pub struct FilterPanel {
    specs: Vec<FilterSpec>,
    values: FilterValues,
    changes: Vec<FilterChange>,
    bus: Option<EventBus>,
}

impl FilterPanel {
    pub fn new(specs: Vec<FilterSpec>) -> Self {
        Self {
            specs,
            ..Self::default()
        }
    }

    /// Publish changes on an event bus
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn specs(&self) -> &[FilterSpec] {
        &self.specs
    }

    pub fn values(&self) -> &FilterValues {
        &self.values
    }

    pub fn value(&self, filter_id: &str) -> Option<&FilterValue> {
        self.values.get(filter_id)
    }

    /// Set a filter value
    ///
    /// The value must fit the kind of the filter's spec. Setting an inactive
    /// value (empty string, empty set, range without bounds) clears the filter.
    pub fn set(&mut self, filter_id: &str, value: FilterValue) -> ConsoleResult<()> {
        let spec = self.spec(filter_id)?;
        if !value.fits(spec.kind) {
            return Err(ValidationError::FilterKindMismatch {
                filter_id: filter_id.to_string(),
                expected: spec.kind.as_str(),
            }
            .into());
        }

        if !value.is_active() {
            self.clear(filter_id)?;
            return Ok(());
        }

        tracing::debug!(filter = %filter_id, ?value, "filter changed");
        self.values.set(filter_id, value.clone());
        self.emit(FilterChange::new(filter_id, Some(value)));
        Ok(())
    }

    pub fn set_select(&mut self, filter_id: &str, value: impl Into<String>) -> ConsoleResult<()> {
        self.set(filter_id, FilterValue::Select(value.into()))
    }

    /// Add an option to a multiselect, or remove it when already selected
    pub fn toggle_option(&mut self, filter_id: &str, option: &str) -> ConsoleResult<()> {
        let mut selected = match self.values.get(filter_id) {
            Some(FilterValue::Multi(set)) => set.clone(),
            _ => Default::default(),
        };
        if !selected.remove(option) {
            selected.insert(option.to_string());
        }
        self.set(filter_id, FilterValue::Multi(selected))
    }

    pub fn set_date_range(
        &mut self,
        filter_id: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> ConsoleResult<()> {
        self.set(filter_id, FilterValue::date_range(from, to))
    }

    pub fn set_numeric_range(
        &mut self,
        filter_id: &str,
        min: Option<&str>,
        max: Option<&str>,
    ) -> ConsoleResult<()> {
        self.set(filter_id, FilterValue::numeric_range(min, max))
    }

    /// Clear one filter
    pub fn clear(&mut self, filter_id: &str) -> ConsoleResult<()> {
        self.spec(filter_id)?;
        if self.values.remove(filter_id).is_some() {
            tracing::debug!(filter = %filter_id, "filter cleared");
            self.emit(FilterChange::new(filter_id, None));
        }
        Ok(())
    }

    /// Clear every filter
    pub fn reset(&mut self) {
        let cleared: Vec<String> = self.values.iter().map(|(id, _)| id.clone()).collect();
        self.values.clear();
        for id in cleared {
            self.emit(FilterChange::new(id, None));
        }
    }

    pub fn has_active_filters(&self) -> bool {
        self.values.has_active()
    }

    pub fn active_count(&self) -> usize {
        self.values.active().count()
    }

    /// Drain the changes recorded since the last call
    pub fn take_changes(&mut self) -> Vec<FilterChange> {
        std::mem::take(&mut self.changes)
    }

    fn spec(&self, filter_id: &str) -> ConsoleResult<&FilterSpec> {
        self.specs
            .iter()
            .find(|s| s.id == filter_id)
            .ok_or_else(|| {
                ValidationError::UnknownFilter {
                    filter_id: filter_id.to_string(),
                }
                .into()
            })
    }

    fn emit(&mut self, change: FilterChange) {
        if let Some(bus) = &self.bus {
            bus.publish(ConsoleEvent::Filter(change.clone()));
        }
        self.changes.push(change);
    }
}
