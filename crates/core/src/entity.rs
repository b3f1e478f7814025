//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Everything the persistence gateway stores is an `Entity`; the gateway keys
/// rows by `Id` and uses `KIND` in diagnostics ("batch", "product", ...).
pub trait Entity: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    /// Short, stable name of the entity kind.
    const KIND: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
