use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// One fully rendered view of a panel. Owned by exactly one [`Panel`].
#[derive(Debug)]
pub struct Frame {
    generation: u64,
    rendered_at: DateTime<Utc>,
    body: String,
}

impl Frame {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    fn release(self, panel: &str) {
        debug!(panel = %panel, generation = self.generation, "Releasing frame");
    }
}

/// A dashboard view with replace-on-update semantics.
///
/// A successful refresh releases the current frame and renders a new one
/// from scratch. A failed refresh leaves the current frame in place.
#[derive(Debug)]
pub struct Panel {
    name: &'static str,
    generation: u64,
    current: Option<Frame>,
}

impl Panel {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            generation: 0,
            current: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn current(&self) -> Option<&Frame> {
        self.current.as_ref()
    }

    /// Release the current frame, if any, and install `body` as the new one.
    pub fn replace(&mut self, body: String) -> &Frame {
        if let Some(old) = self.current.take() {
            old.release(self.name);
        }
        self.generation += 1;
        self.current.insert(Frame {
            generation: self.generation,
            rendered_at: Utc::now(),
            body,
        })
    }

    /// Apply the outcome of a fetch. Returns the new frame when one was
    /// rendered, `None` when the fetch failed and the stale frame was kept.
    pub fn apply<T>(
        &mut self,
        outcome: anyhow::Result<T>,
        render: impl FnOnce(&T) -> String,
    ) -> Option<&Frame> {
        match outcome {
            Ok(data) => Some(self.replace(render(&data))),
            Err(e) => {
                warn!(
                    panel = %self.name,
                    stale_generation = ?self.current.as_ref().map(|f| f.generation),
                    error = %format!("{e:#}"),
                    "Refresh failed; keeping last rendered state"
                );
                None
            }
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-- refreshed {} --", self.rendered_at.format("%H:%M:%S"))?;
        f.write_str(&self.body)
    }
}
