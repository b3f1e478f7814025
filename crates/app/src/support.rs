//! Helpers shared by the handler modules.

use farmops_core::{Choice, ExecResult, ExecutionError};
use farmops_infra::{Stored, Tracking};
use farmops_requests::ValidationErrors;

use crate::scope::AppScope;

pub(crate) const NAME_MAX: usize = 100;
pub(crate) const DESCRIPTION_MAX: usize = 200;
pub(crate) const NOTES_MAX: usize = 500;
pub(crate) const PHONE_MAX: usize = 20;

/// Load an aggregate for modification. A missing row is a typed fault: by
/// the time `execute` runs, validation has already seen it exist.
pub(crate) async fn load<E: Stored>(scope: &AppScope, id: &E::Id) -> ExecResult<E> {
    E::repository(scope.uow())
        .get_by_id(id, Tracking::Tracked)
        .await?
        .ok_or_else(|| ExecutionError::not_found(E::KIND, id))
}

/// Read-only lookup for validation.
pub(crate) async fn peek<E: Stored>(scope: &AppScope, id: &E::Id) -> ExecResult<Option<E>> {
    Ok(E::repository(scope.uow())
        .get_by_id(id, Tracking::NoTracking)
        .await?)
}

/// Record a field error when `id` is set but names nothing.
pub(crate) async fn check_reference<E: Stored>(
    errors: &mut ValidationErrors,
    scope: &AppScope,
    field: &str,
    id: Option<&E::Id>,
) -> ExecResult<()> {
    if let Some(id) = id {
        let found = E::repository(scope.uow()).exists(id).await?;
        errors.exists(field, E::KIND, found);
    }
    Ok(())
}

pub(crate) fn contact_rules(errors: &mut ValidationErrors, phone: Option<&str>, email: Option<&str>) {
    errors.max_len("phone", phone, PHONE_MAX);
    errors.email("email", email);
}

/// Parse a value `validate` already accepted.
pub(crate) fn parse_choice<C: Choice>(field: &str, value: &str) -> ExecResult<C> {
    C::parse(value).ok_or_else(|| ExecutionError::internal(format!("unvalidated {field} '{value}'")))
}
