//! Form validation
//!
//! Forms declare field rules with `validator::Validate` derives. The console
//! adds the rules every resource shares (a non-blank name and a status from
//! the allowed list) through the JSON validators in [`validators`], and
//! collects everything into one [`ValidationError::FieldErrors`] so the
//! caller can mark every offending field at once.

pub mod validators;

use crate::core::error::{ConsoleResult, FieldValidationError, ValidationError};
use serde::Serialize;
use serde_json::Value;
use validator::Validate;

type FieldRule = Box<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;

/// Ordered set of `(field, rule)` checks applied to a serialized form
#[derive(Default)]
pub struct FormRules {
    rules: Vec<(&'static str, FieldRule)>,
}

impl FormRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule for a field
    pub fn rule(
        mut self,
        field: &'static str,
        rule: impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.rules.push((field, Box::new(rule)));
        self
    }

    /// The rules shared by every resource form
    pub fn common(statuses: &'static [&'static str]) -> Self {
        Self::new()
            .rule("name", validators::required())
            .rule("name", validators::not_blank())
            .rule("status", validators::required())
            .rule("status", validators::in_list(statuses))
    }

    fn check(&self, payload: &Value, errors: &mut Vec<FieldValidationError>) {
        for (field, rule) in &self.rules {
            if errors.iter().any(|e| e.field == *field) {
                continue;
            }
            let value = payload.get(*field).unwrap_or(&Value::Null);
            if let Err(message) = rule(*field, value) {
                errors.push(FieldValidationError::new(*field, message));
            }
        }
    }
}

/// Validate a form against its derived rules plus the shared rules
///
/// Returns every invalid field, sorted by field name. At most one error is
/// reported per field.
pub fn validate_form<F>(form: &F, rules: &FormRules) -> ConsoleResult<()>
where
    F: Validate + Serialize,
{
    let payload = serde_json::to_value(form)?;
    let mut errors = Vec::new();
    rules.check(&payload, &mut errors);

    if let Err(derived) = form.validate() {
        for (field, field_errors) in derived.field_errors() {
            let field = field.to_string();
            if errors.iter().any(|e| e.field == field) {
                continue;
            }
            if let Some(first) = field_errors.iter().next() {
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("'{}' failed the '{}' check", field, first.code));
                errors.push(FieldValidationError::new(field, message));
            }
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    errors.sort_by(|a, b| a.field.cmp(&b.field));
    tracing::debug!(fields = ?errors.iter().map(|e| e.field.as_str()).collect::<Vec<_>>(), "form rejected");
    Err(ValidationError::FieldErrors(errors).into())
}
