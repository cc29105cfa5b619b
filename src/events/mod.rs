//! Event payloads and dispatch modes.
//!
//! ## Contents
//! - [`EmitEvent`] the value every handler receives (`params` + optional `callback_id`)
//! - [`EmitMode`] how a handler is registered and how an emit is dispatched

mod event;
mod mode;

pub use event::EmitEvent;
pub use mode::EmitMode;
