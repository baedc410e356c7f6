//! Grabber wrapper that reports every claim and reaction through `tracing`.
use tracing::trace;

use crate::event::{Event, Gesture};
use crate::grabber::Grabber;

/// Wraps a grabber and logs its `track`/`interact` calls at `trace` level.
pub struct Traced<G> {
    label: String,
    inner: G,
}

impl<G: Grabber> Traced<G> {
    pub fn new(label: impl Into<String>, inner: G) -> Self {
        Self {
            label: label.into(),
            inner,
        }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    pub fn into_inner(self) -> G {
        self.inner
    }
}

impl<G: Grabber> Grabber for Traced<G> {
    fn track(&self, event: &Event) -> bool {
        let claimed = self.inner.track(event);
        trace!(grabber = %self.label, shortcut = %event.shortcut(), claimed, "track");
        claimed
    }

    fn interact(&mut self, event: &Event) {
        trace!(
            grabber = %self.label,
            shortcut = %event.shortcut(),
            fired = event.fired(),
            flushed = event.flushed(),
            "interact"
        );
        self.inner.interact(event);
    }
}
