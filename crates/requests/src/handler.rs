use async_trait::async_trait;
use tracing::{debug, warn};

use farmops_core::{ExecResult, ExecutionError};

use crate::result::RequestResult;
use crate::scope::RequestScope;
use crate::validation::ValidationErrors;

/// A typed request (command or query) and the value it produces on success.
///
/// Requests are owned data: they cross the mediator boundary as `Box<dyn Any>`
/// and may be moved onto other tasks.
pub trait Request: Send + Sync + 'static {
    type Output: Send + 'static;
}

/// Output type of handler `H` running in scope `S`.
pub type OutputOf<H, S> = <<H as RequestHandler<S>>::Args as Request>::Output;

/// Two-phase request handler.
///
/// - `validate` inspects the arguments (and may read related aggregates to check
///   they exist) and returns **every** problem it finds. It must not write.
/// - `execute` runs only when `validate` returned no errors.
///
/// Handlers implement both phases; they never call them directly. The ordering
/// is enforced by [`Handle::handle`], which every handler gets through a blanket
/// impl and which cannot be re-implemented.
#[async_trait]
pub trait RequestHandler<S: RequestScope>: Send + Sync + 'static {
    type Args: Request;

    /// Collect field errors. An `Err` is a fault (e.g. the store is unreachable),
    /// not bad input.
    async fn validate(&self, args: &Self::Args, scope: &S) -> ExecResult<ValidationErrors>;

    async fn execute(&self, args: Self::Args, scope: &S) -> ExecResult<OutputOf<Self, S>>;
}

/// Validate-then-execute orchestration.
///
/// Implemented for every `RequestHandler` by the blanket impl below; the
/// coherence rules reject any second implementation, so the ordering cannot be
/// overridden per handler.
#[async_trait]
pub trait Handle<S: RequestScope>: RequestHandler<S> {
    async fn handle(&self, args: Self::Args, scope: &S) -> RequestResult<OutputOf<Self, S>>;
}

#[async_trait]
impl<S, H> Handle<S> for H
where
    S: RequestScope,
    H: RequestHandler<S>,
{
    async fn handle(&self, args: H::Args, scope: &S) -> RequestResult<OutputOf<H, S>> {
        let request = short_type_name::<H::Args>();

        if scope.cancellation().is_cancelled() {
            return RequestResult::fault(&ExecutionError::Cancelled);
        }

        let errors = match self.validate(&args, scope).await {
            Ok(errors) => errors,
            Err(err) => {
                warn!(request, error = %err, "validation aborted");
                return RequestResult::fault(&err);
            }
        };

        if !errors.is_empty() {
            debug!(request, errors = errors.len(), "request rejected by validation");
            return RequestResult::invalid(errors);
        }

        if scope.cancellation().is_cancelled() {
            return RequestResult::fault(&ExecutionError::Cancelled);
        }

        match self.execute(args, scope).await {
            Ok(value) => RequestResult::success(value),
            Err(err) => {
                warn!(request, error = %err, "request execution failed");
                RequestResult::fault(&err)
            }
        }
    }
}

/// `farmops_app::batches::CreateBatch` → `CreateBatch`.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::result::FailureKind;

    pub struct TestScope {
        pub cancel: CancellationToken,
    }

    impl RequestScope for TestScope {
        fn cancellation(&self) -> &CancellationToken {
            &self.cancel
        }
    }

    #[derive(Debug)]
    pub struct Rename {
        pub name: String,
    }

    impl Request for Rename {
        type Output = String;
    }

    #[derive(Default)]
    pub struct Calls {
        pub validated: AtomicUsize,
        pub executed: AtomicUsize,
    }

    pub struct RenameHandler {
        pub calls: Arc<Calls>,
    }

    #[async_trait]
    impl RequestHandler<TestScope> for RenameHandler {
        type Args = Rename;

        async fn validate(&self, args: &Rename, _scope: &TestScope) -> ExecResult<ValidationErrors> {
            self.calls.validated.fetch_add(1, Ordering::SeqCst);
            let mut errors = ValidationErrors::new();
            errors.require_text("name", &args.name, 5);
            errors.check(args.name.contains('!'), "name", "name must not contain '!'");
            Ok(errors)
        }

        async fn execute(&self, args: Rename, _scope: &TestScope) -> ExecResult<String> {
            self.calls.executed.fetch_add(1, Ordering::SeqCst);
            if args.name == "gone" {
                return Err(ExecutionError::not_found("thing", "gone"));
            }
            Ok(args.name.to_uppercase())
        }
    }

    fn scope() -> TestScope {
        TestScope {
            cancel: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn execute_runs_after_clean_validation() {
        let calls = Arc::new(Calls::default());
        let handler = RenameHandler { calls: calls.clone() };

        let result = handler.handle(Rename { name: "hen".into() }, &scope()).await;

        assert!(result.is_success());
        assert_eq!(result.value().map(String::as_str), Some("HEN"));
        assert_eq!(calls.validated.load(Ordering::SeqCst), 1);
        assert_eq!(calls.executed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn execute_never_runs_when_validation_fails() {
        let calls = Arc::new(Calls::default());
        let handler = RenameHandler { calls: calls.clone() };

        let result = handler.handle(Rename { name: "rooster!".into() }, &scope()).await;

        assert!(!result.is_success());
        assert_eq!(result.failure(), Some(FailureKind::Validation));
        // Both problems on the same field are reported.
        assert_eq!(result.validation_errors().for_field("name").count(), 2);
        assert_eq!(calls.executed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn execution_faults_are_typed() {
        let calls = Arc::new(Calls::default());
        let handler = RenameHandler { calls };

        let result = handler.handle(Rename { name: "gone".into() }, &scope()).await;

        assert_eq!(result.failure(), Some(FailureKind::NotFound));
        assert!(result.validation_errors().is_empty());
    }

    #[tokio::test]
    async fn cancelled_scope_skips_both_phases() {
        let calls = Arc::new(Calls::default());
        let handler = RenameHandler { calls: calls.clone() };
        let scope = scope();
        scope.cancel.cancel();

        let result = handler.handle(Rename { name: "hen".into() }, &scope).await;

        assert_eq!(result.failure(), Some(FailureKind::Cancelled));
        assert_eq!(calls.validated.load(Ordering::SeqCst), 0);
        assert_eq!(calls.executed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn short_type_name_strips_path_and_generics() {
        assert_eq!(short_type_name::<Rename>(), "Rename");
        assert_eq!(short_type_name::<Vec<Rename>>(), "Vec");
    }
}
