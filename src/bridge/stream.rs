use std::sync::Arc;

use serde_json::Value;

/// Callback receiving each value produced by a stream.
pub type OnValue = Arc<dyn Fn(Value) + Send + Sync>;

/// Handle returned by [`ValueStream::subscribe`].
pub trait Subscription: Send + Sync {
    /// Stops delivery to this subscriber. Idempotent.
    fn unsubscribe(&self);

    /// Returns true once [`unsubscribe`](Self::unsubscribe) has been called.
    fn is_closed(&self) -> bool;
}

/// A source of values over time.
pub trait ValueStream: Send + Sync {
    /// Starts delivering values to `on_value`.
    fn subscribe(&self, on_value: OnValue) -> Box<dyn Subscription>;

    /// Latest value, for streams that keep one.
    fn current(&self) -> Option<Value> {
        None
    }
}

impl<S: ValueStream + ?Sized> ValueStream for Arc<S> {
    fn subscribe(&self, on_value: OnValue) -> Box<dyn Subscription> {
        (**self).subscribe(on_value)
    }

    fn current(&self) -> Option<Value> {
        (**self).current()
    }
}
