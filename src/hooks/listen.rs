//! # Listener trait and function-backed listener.
//!
//! [`Listen`] is the struct-friendly way to write a promise-mode handler: a
//! stable [`name`](Listen::name) (used as subscriber id) and an async
//! [`handle`](Listen::handle). [`ListenFn`] wraps a closure returning a future,
//! producing a fresh future per event.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use mountbus::{EmitEvent, HandlerResult, Listen};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Listen for Audit {
//!     fn name(&self) -> &str { "audit" }
//!
//!     async fn handle(&self, event: EmitEvent) -> HandlerResult {
//!         // write audit record...
//!         let _ = event;
//!         Ok(None)
//!     }
//! }
//!
//! let _listener: Arc<dyn Listen> = Arc::new(Audit);
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerResult;
use crate::events::EmitEvent;

/// # Asynchronous event listener.
///
/// Registered through [`Emitter::listen`](crate::Emitter::listen) in promise mode.
#[async_trait]
pub trait Listen: Send + Sync + 'static {
    /// Stable name, used as subscriber id.
    fn name(&self) -> &str;

    /// Handles one event. `Ok(Some(_))` or `Err(_)` wins the dispatch race.
    async fn handle(&self, event: EmitEvent) -> HandlerResult;
}

/// Function-backed listener.
#[derive(Debug)]
pub struct ListenFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ListenFn<F> {
    /// Creates a new function-backed listener.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the listener and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Listen for ListenFn<F>
where
    F: Fn(EmitEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: EmitEvent) -> HandlerResult {
        (self.f)(event).await
    }
}
