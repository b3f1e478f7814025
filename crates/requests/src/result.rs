//! Uniform success/failure envelope returned for every request.

use serde::Serialize;

use farmops_core::ExecutionError;

use crate::validation::ValidationErrors;

/// Why a request failed.
///
/// The façade branches on this (400 / 404 / 409 / 500), never on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    NotFound,
    Conflict,
    Cancelled,
    Internal,
}

impl From<&ExecutionError> for FailureKind {
    fn from(value: &ExecutionError) -> Self {
        match value {
            ExecutionError::NotFound { .. } => FailureKind::NotFound,
            ExecutionError::Conflict(_) => FailureKind::Conflict,
            ExecutionError::Cancelled => FailureKind::Cancelled,
            ExecutionError::Internal(_) => FailureKind::Internal,
        }
    }
}

/// Result of one request.
///
/// Invariants:
/// - `value` is present iff `is_success`.
/// - `message` is empty on success.
/// - `failure` is present iff `!is_success`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResult<T> {
    is_success: bool,
    message: String,
    validation_errors: ValidationErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<FailureKind>,
}

impl<T> RequestResult<T> {
    pub fn success(value: T) -> Self {
        Self {
            is_success: true,
            message: String::new(),
            validation_errors: ValidationErrors::new(),
            value: Some(value),
            failure: None,
        }
    }

    /// Failure carrying every validation error reported for the request.
    pub fn invalid(errors: ValidationErrors) -> Self {
        Self {
            is_success: false,
            message: "One or more validation errors occurred.".to_string(),
            validation_errors: errors,
            value: None,
            failure: Some(FailureKind::Validation),
        }
    }

    pub fn fault(err: &ExecutionError) -> Self {
        Self {
            is_success: false,
            message: err.to_string(),
            validation_errors: ValidationErrors::new(),
            value: None,
            failure: Some(FailureKind::from(err)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.is_success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn validation_errors(&self) -> &ValidationErrors {
        &self.validation_errors
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RequestResult<U> {
        RequestResult {
            is_success: self.is_success,
            message: self.message,
            validation_errors: self.validation_errors,
            value: self.value.map(f),
            failure: self.failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_has_value_and_empty_message() {
        let result = RequestResult::success(5);
        assert!(result.is_success());
        assert_eq!(result.value(), Some(&5));
        assert!(result.message().is_empty());
        assert!(result.failure().is_none());
    }

    #[test]
    fn invalid_keeps_every_error_and_no_value() {
        let mut errors = ValidationErrors::new();
        errors.push("name", "name is required");
        errors.push("unit_price", "unit_price must be greater than zero");
        let result: RequestResult<()> = RequestResult::invalid(errors);

        assert!(!result.is_success());
        assert!(result.value().is_none());
        assert_eq!(result.validation_errors().len(), 2);
        assert_eq!(result.failure(), Some(FailureKind::Validation));
    }

    #[test]
    fn fault_is_typed_by_execution_error() {
        let result: RequestResult<()> =
            RequestResult::fault(&ExecutionError::not_found("batch", "b-1"));
        assert_eq!(result.failure(), Some(FailureKind::NotFound));
        assert_eq!(result.message(), "batch 'b-1' was not found");

        let result: RequestResult<()> = RequestResult::fault(&ExecutionError::conflict("stale"));
        assert_eq!(result.failure(), Some(FailureKind::Conflict));
    }

    #[test]
    fn serializes_with_facade_field_names() {
        let result = RequestResult::success("ok");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "isSuccess": true,
                "message": "",
                "validationErrors": [],
                "value": "ok",
            })
        );
    }
}
