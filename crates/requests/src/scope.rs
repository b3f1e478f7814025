use tokio_util::sync::CancellationToken;

/// Collaborators available to one request and to nothing else.
///
/// A scope lives exactly as long as one `Mediator::send` call. Anything
/// request-scoped (a unit-of-work, staged writes) hangs off the scope so two
/// concurrent requests never share it.
pub trait RequestScope: Send + Sync + 'static {
    /// Cooperative cancellation signal for this request.
    fn cancellation(&self) -> &CancellationToken;
}

/// Builds a fresh scope for every request.
pub trait ScopeFactory: Send + Sync + 'static {
    type Scope: RequestScope;

    fn create_scope(&self, cancel: CancellationToken) -> Self::Scope;
}
