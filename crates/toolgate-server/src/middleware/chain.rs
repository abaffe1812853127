//! Priority-ordered middleware chain.
//!
//! Interceptors are registered with a numeric priority; lower values run
//! first, i.e. sit further out in the tower stack. Equal priorities keep
//! registration order. The chain is assembled once at startup.

use axum::{extract::Request, response::IntoResponse, routing::Route, Router};
use std::convert::Infallible;
use std::fmt;
use tower::{Layer, Service};

type ApplyFn = Box<dyn FnOnce(Router) -> Router + Send>;

struct Interceptor {
    name: &'static str,
    priority: u16,
    apply: ApplyFn,
}

/// Ordered set of interceptors wrapped around the application router.
#[derive(Default)]
pub struct MiddlewareChain {
    interceptors: Vec<Interceptor>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tower layer under `name` with the given priority.
    pub fn register<L>(mut self, name: &'static str, priority: u16, layer: L) -> Self
    where
        L: Layer<Route> + Clone + Send + 'static,
        L::Service: Service<Request> + Clone + Send + 'static,
        <L::Service as Service<Request>>::Response: IntoResponse + 'static,
        <L::Service as Service<Request>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        self.interceptors.push(Interceptor {
            name,
            priority,
            apply: Box::new(move |router: Router| router.layer(layer)),
        });
        self
    }

    /// Interceptor names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.ordered().map(|i| i.name).collect()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Wrap `router` so that interceptors execute in priority order.
    pub fn apply(mut self, router: Router) -> Router {
        self.interceptors.sort_by_key(|i| i.priority);
        // The last layer applied is the outermost, so apply in reverse.
        self.interceptors
            .into_iter()
            .rev()
            .fold(router, |router, interceptor| (interceptor.apply)(router))
    }

    fn ordered(&self) -> impl Iterator<Item = &Interceptor> {
        let mut refs: Vec<&Interceptor> = self.interceptors.iter().collect();
        refs.sort_by_key(|i| i.priority);
        refs.into_iter()
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.ordered().map(|i| (i.priority, i.name)))
            .finish()
    }
}
