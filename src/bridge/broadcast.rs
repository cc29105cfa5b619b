//! # Broadcast-channel stream.
//!
//! [`BroadcastStream`] wraps [`tokio::sync::broadcast`]. Every subscription owns
//! a receiver (created at subscribe time, so nothing sent afterwards is missed)
//! and a listener task that forwards values until its token is cancelled.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits on subscribers.
//! - **Bounded capacity**: slow listeners observe `Lagged(n)`, log it and continue.
//! - **Runtime required**: subscribing outside a tokio runtime yields a closed
//!   subscription and a warning.
//! - Dropping the subscription handle does not stop the listener; call
//!   [`Subscription::unsubscribe`].

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use serde_json::Value;

use super::stream::{OnValue, Subscription, ValueStream};

/// Stream backed by a bounded broadcast channel. Cloning shares the channel.
#[derive(Clone, Debug)]
pub struct BroadcastStream {
    tx: broadcast::Sender<Value>,
}

impl BroadcastStream {
    /// Creates a stream with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Value>(capacity.max(1));
        Self { tx }
    }

    /// Sends `value` to every active listener; returns how many received it.
    pub fn publish(&self, value: Value) -> usize {
        self.tx.send(value).unwrap_or(0)
    }

    /// Number of active listeners.
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl ValueStream for BroadcastStream {
    fn subscribe(&self, on_value: OnValue) -> Box<dyn Subscription> {
        let token = CancellationToken::new();

        let Ok(rt) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("broadcast stream subscribed outside a tokio runtime");
            token.cancel();
            return Box::new(ListenerSubscription { token });
        };

        let mut rx = self.tx.subscribe();
        let stop = token.clone();
        rt.spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(value) => on_value(value),
                        Err(broadcast::error::RecvError::Closed) => break,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "broadcast stream listener lagged");
                        }
                    }
                }
            }
        });

        Box::new(ListenerSubscription { token })
    }
}

struct ListenerSubscription {
    token: CancellationToken,
}

impl Subscription for ListenerSubscription {
    fn unsubscribe(&self) {
        self.token.cancel();
    }

    fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_listener_forwards_until_unsubscribed() {
        let stream = BroadcastStream::new(8);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sub = stream.subscribe(Arc::new(move |v| {
            let _ = tx.send(v);
        }));

        assert_eq!(stream.publish(json!(1)), 1);
        assert_eq!(rx.recv().await, Some(json!(1)));

        sub.unsubscribe();
        assert!(sub.is_closed());
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(stream.listener_count(), 0);
        assert_eq!(stream.publish(json!(2)), 0);
    }

    #[test]
    fn test_subscribe_without_runtime_is_closed() {
        let stream = BroadcastStream::new(1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = stream.subscribe(Arc::new(move |v| sink.lock().push(v)));

        assert!(sub.is_closed());
        assert_eq!(stream.publish(json!(1)), 0);
        assert!(seen.lock().is_empty());
    }
}
