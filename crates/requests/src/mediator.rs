//! Typed request routing.
//!
//! The mediator owns one handler per request type and a `ScopeFactory`. Each
//! `send` builds a fresh scope, runs the handler's validate/execute pipeline
//! inside it, and drops the scope when the call returns.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::handler::{short_type_name, Handle, Request, RequestHandler};
use crate::result::RequestResult;
use crate::scope::{RequestScope, ScopeFactory};

/// Wiring faults. These are programming/configuration errors, never domain
/// failures, and are not folded into a `RequestResult`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediatorError {
    #[error("no handler registered for request `{0}`")]
    HandlerNotRegistered(&'static str),

    #[error("more than one handler registered for request `{0}`")]
    DuplicateHandler(&'static str),

    #[error("handler for `{0}` exchanged a value of the wrong type")]
    TypeMismatch(&'static str),
}

type AnyBox = Box<dyn Any + Send>;

#[async_trait]
trait ErasedHandler<S: RequestScope>: Send + Sync {
    async fn handle_erased(&self, args: AnyBox, scope: &S) -> Result<AnyBox, MediatorError>;
}

struct Registered<H>(H);

#[async_trait]
impl<S, H> ErasedHandler<S> for Registered<H>
where
    S: RequestScope,
    H: RequestHandler<S>,
{
    async fn handle_erased(&self, args: AnyBox, scope: &S) -> Result<AnyBox, MediatorError> {
        let args = args
            .downcast::<H::Args>()
            .map_err(|_| MediatorError::TypeMismatch(std::any::type_name::<H::Args>()))?;
        let result = self.0.handle(*args, scope).await;
        Ok(Box::new(result))
    }
}

struct Entry<S: RequestScope> {
    request: &'static str,
    handler: Arc<dyn ErasedHandler<S>>,
}

pub struct Mediator<F: ScopeFactory> {
    factory: F,
    handlers: HashMap<TypeId, Entry<F::Scope>>,
}

impl<F: ScopeFactory> Mediator<F> {
    pub fn builder(factory: F) -> MediatorBuilder<F> {
        MediatorBuilder {
            factory,
            handlers: Vec::new(),
        }
    }

    /// Send a request with a fresh, never-cancelled token.
    pub async fn send<A: Request>(&self, args: A) -> Result<RequestResult<A::Output>, MediatorError> {
        self.send_with_cancellation(args, CancellationToken::new())
            .await
    }

    /// Send a request; `cancel` is checked at every I/O boundary of the call.
    pub async fn send_with_cancellation<A: Request>(
        &self,
        args: A,
        cancel: CancellationToken,
    ) -> Result<RequestResult<A::Output>, MediatorError> {
        let request = short_type_name::<A>();
        let entry = self
            .handlers
            .get(&TypeId::of::<A>())
            .ok_or(MediatorError::HandlerNotRegistered(std::any::type_name::<A>()))?;

        let scope = self.factory.create_scope(cancel);
        let span = tracing::info_span!("request", request);
        let output = entry
            .handler
            .handle_erased(Box::new(args), &scope)
            .instrument(span)
            .await?;

        output
            .downcast::<RequestResult<A::Output>>()
            .map(|boxed| *boxed)
            .map_err(|_| MediatorError::TypeMismatch(entry.request))
    }
}

pub struct MediatorBuilder<F: ScopeFactory> {
    factory: F,
    handlers: Vec<(TypeId, Entry<F::Scope>)>,
}

impl<F: ScopeFactory> MediatorBuilder<F> {
    pub fn register<H>(mut self, handler: H) -> Self
    where
        H: RequestHandler<F::Scope>,
    {
        self.handlers.push((
            TypeId::of::<H::Args>(),
            Entry {
                request: std::any::type_name::<H::Args>(),
                handler: Arc::new(Registered(handler)),
            },
        ));
        self
    }

    pub fn build(self) -> Result<Mediator<F>, MediatorError> {
        let mut handlers = HashMap::with_capacity(self.handlers.len());
        for (type_id, entry) in self.handlers {
            let request = entry.request;
            if handlers.insert(type_id, entry).is_some() {
                return Err(MediatorError::DuplicateHandler(request));
            }
        }
        Ok(Mediator {
            factory: self.factory,
            handlers,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::handler::tests::{Calls, Rename, RenameHandler, TestScope};
    use crate::result::FailureKind;

    #[derive(Default)]
    struct CountingFactory {
        scopes: AtomicUsize,
    }

    impl ScopeFactory for Arc<CountingFactory> {
        type Scope = TestScope;

        fn create_scope(&self, cancel: CancellationToken) -> TestScope {
            self.scopes.fetch_add(1, Ordering::SeqCst);
            TestScope { cancel }
        }
    }

    #[derive(Debug)]
    struct Unrouted;

    impl Request for Unrouted {
        type Output = ();
    }

    fn mediator(calls: Arc<Calls>, factory: Arc<CountingFactory>) -> Mediator<Arc<CountingFactory>> {
        Mediator::builder(factory)
            .register(RenameHandler { calls })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn send_routes_to_registered_handler() {
        let calls = Arc::new(Calls::default());
        let mediator = mediator(calls.clone(), Arc::default());

        let result = mediator.send(Rename { name: "duck".into() }).await.unwrap();

        assert!(result.is_success());
        assert_eq!(result.into_value(), Some("DUCK".to_string()));
    }

    #[tokio::test]
    async fn every_send_gets_a_fresh_scope() {
        let factory = Arc::new(CountingFactory::default());
        let mediator = mediator(Arc::default(), factory.clone());

        mediator.send(Rename { name: "a".into() }).await.unwrap();
        mediator.send(Rename { name: "b".into() }).await.unwrap();

        assert_eq!(factory.scopes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unregistered_request_is_a_configuration_error() {
        let mediator = mediator(Arc::default(), Arc::default());

        let err = mediator.send(Unrouted).await.unwrap_err();

        assert!(matches!(err, MediatorError::HandlerNotRegistered(name) if name.ends_with("Unrouted")));
    }

    #[tokio::test]
    async fn cancellation_token_reaches_the_handler() {
        let calls = Arc::new(Calls::default());
        let mediator = mediator(calls.clone(), Arc::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = mediator
            .send_with_cancellation(Rename { name: "goose".into() }, cancel)
            .await
            .unwrap();

        assert_eq!(result.failure(), Some(FailureKind::Cancelled));
        assert_eq!(calls.executed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let err = Mediator::builder(Arc::new(CountingFactory::default()))
            .register(RenameHandler { calls: Arc::default() })
            .register(RenameHandler { calls: Arc::default() })
            .build()
            .err();

        assert!(matches!(err, Some(MediatorError::DuplicateHandler(_))));
    }
}
