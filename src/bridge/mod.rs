//! # Value streams feeding the bus.
//!
//! A [`ValueStream`] is anything that can push JSON values to a callback and
//! hand back a [`Subscription`]. Two sources ship with the crate:
//! - [`Subject`]: synchronous multicast, optionally replaying its latest value;
//! - [`BroadcastStream`]: a `tokio::sync::broadcast` channel drained by one
//!   spawned listener per subscription.
//!
//! ## Architecture
//! ```text
//! Subject / BroadcastStream ──value──► StreamBridge ──► emit + async_emit ──► "stream:<uuid>"
//!                                          │                                       ▲
//!                                          └─ .on(handler) ────────────────────────┘
//!
//! bind_stream(bus, "price", handler, stream)          (caller-chosen service, sync hook)
//! bind_stream_promise(bus, "quote", handler, stream)  (caller-chosen service, async hook)
//! ```

mod broadcast;
mod stream;
mod stream_bridge;
mod subject;

pub use broadcast::BroadcastStream;
pub use stream::{OnValue, Subscription, ValueStream};
pub use stream_bridge::{bind_stream, bind_stream_promise, StreamBridge};
pub use subject::Subject;
