//! # Function-backed subscriber (`SubscriberFn`)
//!
//! [`SubscriberFn`] wraps a closure `F: Fn(Arc<M>) -> Fut`, producing a fresh future per
//! message. Shared state goes into an `Arc<...>` captured by the closure.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use fanbus::{Subscribe, SubscriberFn};
//!
//! let printer = SubscriberFn::arc("printer", |msg: Arc<String>| async move {
//!     println!("got {msg}");
//! });
//! assert_eq!(Subscribe::<String>::name(printer.as_ref()), "printer");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::subscribers::Subscribe;

/// Closure-backed subscriber.
pub struct SubscriberFn<M, F> {
    name: Cow<'static, str>,
    capacity: Option<usize>,
    f: F,
    _msg: PhantomData<fn(Arc<M>)>,
}

impl<M, F> SubscriberFn<M, F> {
    /// Creates a new function-backed subscriber.
    ///
    /// Prefer [`SubscriberFn::arc`] when you immediately pass it to `Bus::subscribe`.
    pub fn new<Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(Arc<M>) -> Fut,
    {
        Self {
            name: name.into(),
            capacity: None,
            f,
            _msg: PhantomData,
        }
    }

    /// Creates the subscriber and returns it as a shared handle.
    pub fn arc<Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self>
    where
        F: Fn(Arc<M>) -> Fut,
    {
        Arc::new(Self::new(name, f))
    }

    /// Overrides the bus-wide subscriber queue capacity for this subscriber.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

#[async_trait]
impl<M, F, Fut> Subscribe<M> for SubscriberFn<M, F>
where
    M: Send + Sync + 'static,
    F: Fn(Arc<M>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn on_message(&self, msg: Arc<M>) {
        (self.f)(msg).await
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn queue_capacity(&self) -> Option<usize> {
        self.capacity
    }
}
