use crate::core::{config::Config, emitter::Emitter, lifecycle::LifecyclePhase};
use crate::hooks::Handler;

/// Builder for constructing an [`Emitter`] with lifecycle handlers in place.
///
/// Handlers added here are tapped before the emitter is handed out, so they
/// observe the very first transition.
pub struct EmitterBuilder {
    cfg: Config,
    phase_handlers: Vec<(LifecyclePhase, String, Handler)>,
}

impl EmitterBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            phase_handlers: Vec::new(),
        }
    }

    /// Adds a lifecycle handler (see [`Emitter::on_phase`]).
    pub fn on_phase(
        mut self,
        phase: LifecyclePhase,
        subscriber_id: impl Into<String>,
        handler: Handler,
    ) -> Self {
        self.phase_handlers.push((phase, subscriber_id.into(), handler));
        self
    }

    /// Builds the emitter. Starts in phase `Unknown`.
    pub fn build(self) -> Emitter {
        let emitter = Emitter::new(self.cfg);
        for (phase, id, handler) in self.phase_handlers {
            if !emitter.on_phase(phase, &id, handler) {
                tracing::warn!(%phase, subscriber_id = %id, "lifecycle handler skipped");
            }
        }
        emitter
    }
}
