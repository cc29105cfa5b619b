//! Error types surfaced by dispatch.
//!
//! [`EmitError`] covers everything a caller can observe through a completion
//! channel (callback argument, future output, or `Err` from a sync emit).
//!
//! Two situations are deliberately **not** errors:
//! - emitting to a service with no handlers (dispatch resolves to `Ok(None)`);
//! - entering the `Unknown` phase (logged, phase left unchanged).
//!
//! Like the rest of the crate, helper methods (`as_label`, `as_message`) exist
//! for logs.

use serde_json::Value;
use thiserror::Error;

/// Outcome of a single handler or of a whole dispatch.
///
/// - `Ok(Some(v))`: a handler produced a result (bails the chain / wins the race)
/// - `Ok(None)`: no handler produced a result
/// - `Err(e)`: a handler reported failure (also bails / wins)
pub type HandlerResult = Result<Option<Value>, EmitError>;

/// # Errors produced while dispatching events.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmitError {
    /// A handler explicitly reported failure.
    #[error("{message}")]
    Handler {
        /// Message supplied by the handler.
        message: String,
    },

    /// An async handler panicked; converted into a failed outcome.
    #[error("handler for `{service}` panicked: {info}")]
    Panicked {
        /// Service the handler was registered on.
        service: String,
        /// Panic payload rendered as text.
        info: String,
    },

    /// A deferred future-style emit was discarded before `DidMount` fired:
    /// a later buffered call to the same service replaced it, or the registry
    /// was reset while it was still buffered.
    #[error("deferred emit to `{service}` was discarded before mount")]
    Abandoned {
        /// Service the deferred call targeted.
        service: String,
    },

    /// Async dispatch had to suspend but no tokio runtime was available.
    #[error("no tokio runtime available to drive `{service}`")]
    NoRuntime {
        /// Service being dispatched.
        service: String,
    },
}

impl EmitError {
    /// Shorthand for [`EmitError::Handler`].
    ///
    /// # Example
    /// ```
    /// use mountbus::EmitError;
    ///
    /// let err = EmitError::handler("params is not valid");
    /// assert_eq!(err.to_string(), "params is not valid");
    /// ```
    pub fn handler(message: impl Into<String>) -> Self {
        EmitError::Handler {
            message: message.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EmitError::Handler { .. } => "handler_failed",
            EmitError::Panicked { .. } => "handler_panicked",
            EmitError::Abandoned { .. } => "emit_abandoned",
            EmitError::NoRuntime { .. } => "no_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EmitError::Handler { message } => format!("handler: {message}"),
            EmitError::Panicked { service, info } => {
                format!("panic in `{service}`: {info}")
            }
            EmitError::Abandoned { service } => format!("abandoned: {service}"),
            EmitError::NoRuntime { service } => format!("no runtime: {service}"),
        }
    }

    /// Builds a [`EmitError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(service: &str, payload: &(dyn std::any::Any + Send)) -> Self {
        let info = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        EmitError::Panicked {
            service: service.to_string(),
            info,
        }
    }
}
