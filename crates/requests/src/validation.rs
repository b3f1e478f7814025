//! Field-scoped validation errors and the rule helpers handlers build them with.
//!
//! Rules never short-circuit: each helper checks one thing, records a failure,
//! and returns, so a handler that calls every rule reports every violation in a
//! single round trip.

use serde::{Deserialize, Serialize};

use farmops_core::Choice;

/// One `(field, message)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub error: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            error: error.into(),
        }
    }
}

/// Ordered list of field errors.
///
/// Insertion order is preserved and nothing is deduplicated: the same field may
/// carry several errors, and several fields may fail in one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, error: impl Into<String>) {
        self.0.push(FieldError::new(field, error));
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Messages recorded against `field`, in insertion order.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.error.as_str())
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }

    /// Record `error` against `field` when `failed` holds.
    pub fn check(&mut self, failed: bool, field: &str, error: impl Into<String>) {
        if failed {
            self.push(field, error);
        }
    }

    /// Required text with an upper length bound (in characters).
    pub fn require_text(&mut self, field: &str, value: &str, max_len: usize) {
        if value.trim().is_empty() {
            self.push(field, format!("{field} is required"));
        } else if value.chars().count() > max_len {
            self.push(field, format!("{field} must be at most {max_len} characters"));
        }
    }

    /// Optional text: when present it must satisfy `require_text`.
    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max_len: usize) {
        if let Some(value) = value {
            self.require_text(field, value, max_len);
        }
    }

    /// Optional free-form text: only the length bound applies.
    pub fn max_len(&mut self, field: &str, value: Option<&str>, max_len: usize) {
        if let Some(value) = value {
            if value.chars().count() > max_len {
                self.push(field, format!("{field} must be at most {max_len} characters"));
            }
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) {
        let Some(value) = value else {
            return;
        };
        if value.chars().count() > 100 {
            self.push(field, format!("{field} must be at most 100 characters"));
        }
        let (local, domain) = value.split_once('@').unwrap_or(("", ""));
        if local.is_empty() || domain.is_empty() {
            self.push(field, format!("{field} must be a valid email address"));
        }
    }

    /// Strictly positive number.
    pub fn positive(&mut self, field: &str, value: f64) {
        if !value.is_finite() {
            self.push(field, format!("{field} must be a finite number"));
        } else if value <= 0.0 {
            self.push(field, format!("{field} must be greater than zero"));
        }
    }

    /// Zero or more.
    pub fn non_negative(&mut self, field: &str, value: f64) {
        if !value.is_finite() {
            self.push(field, format!("{field} must be a finite number"));
        } else if value < 0.0 {
            self.push(field, format!("{field} must not be negative"));
        }
    }

    pub fn positive_count(&mut self, field: &str, value: u64) {
        if value == 0 {
            self.push(field, format!("{field} must be greater than zero"));
        }
    }

    /// Case-insensitive membership in a closed enum. Returns the parsed value so
    /// later cross-field rules can use it.
    pub fn choice<C: Choice>(&mut self, field: &str, value: &str) -> Option<C> {
        let parsed = C::parse(value);
        if parsed.is_none() {
            self.push(
                field,
                format!("'{value}' is not a valid {field}; expected one of: {}", C::expected()),
            );
        }
        parsed
    }

    /// Referential existence check result.
    pub fn exists(&mut self, field: &str, kind: &str, found: bool) {
        if !found {
            self.push(field, format!("{kind} does not exist"));
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<FieldError> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
