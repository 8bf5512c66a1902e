//! Image description creation handshake
//!
//! `create` on a parametric creator answers asynchronously with `ready` or
//! `failed`. The commit path has nothing useful to do until one of them
//! arrives, so it pumps the target's queue on the calling thread:
//!
//! ```text
//! create_parametric ──> dispatch_pending ──> roundtrip ──> roundtrip ... ──> outcome
//! ```
//!
//! There is no timeout: the protocol has no way to cancel a pending
//! description, and a compositor that never answers stalls the present call.

use tracing::{debug, trace};

use super::{DescriptionId, EventSink, ProtocolEvent, ProtocolQueue, Result};

/// How a description creation request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionOutcome {
    /// The description can be set on a surface
    Ready {
        /// Compositor-side identity of the description
        identity: u32,
    },
    /// The compositor refused the description
    Failed {
        /// Protocol failure cause
        cause: u32,
        /// Compositor supplied reason
        reason: String,
    },
}

/// One in-flight description creation, waiting for its outcome
#[derive(Debug)]
pub struct PendingDescription {
    id: DescriptionId,
    outcome: Option<DescriptionOutcome>,
}

impl PendingDescription {
    /// Start waiting for `id`
    pub fn new(id: DescriptionId) -> Self {
        Self { id, outcome: None }
    }

    /// Description being waited on
    pub fn id(&self) -> DescriptionId {
        self.id
    }

    /// Whether `ready` or `failed` has been seen
    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }

    /// Take the outcome once resolved
    pub fn take(&mut self) -> Option<DescriptionOutcome> {
        self.outcome.take()
    }
}

impl EventSink for PendingDescription {
    fn handle(&mut self, event: ProtocolEvent) {
        match event {
            ProtocolEvent::DescriptionReady { id, identity } if id == self.id => {
                self.outcome = Some(DescriptionOutcome::Ready { identity });
            }
            ProtocolEvent::DescriptionFailed { id, cause, reason } if id == self.id => {
                self.outcome = Some(DescriptionOutcome::Failed { cause, reason });
            }
            other => trace!(?other, "Ignoring event while waiting for image description"),
        }
    }
}

/// Block until the compositor answers for `id`
///
/// Only a transport error from the queue ends the wait early.
pub fn wait_for_description(
    queue: &mut dyn ProtocolQueue,
    id: DescriptionId,
) -> Result<DescriptionOutcome> {
    let mut pending = PendingDescription::new(id);
    queue.dispatch_pending(&mut pending)?;

    let mut roundtrips = 0u64;
    loop {
        if let Some(outcome) = pending.take() {
            debug!(%id, roundtrips, "Image description resolved");
            return Ok(outcome);
        }
        queue.roundtrip(&mut pending)?;
        roundtrips += 1;
    }
}
