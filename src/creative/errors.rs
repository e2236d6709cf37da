use std::time::Duration;

use thiserror::Error;

use crate::link::LinkError;

/// Failures surfaced by the creative controller.
#[derive(Debug, Error)]
pub enum CreativeError {
    /// Slot index outside the inventory window.
    #[error("invalid slot {0}: expected 0..=44")]
    InvalidSlot(i32),

    /// A mutation of this slot is already awaiting resolution.
    #[error("setting slot {slot} cancelled: a previous set on slot {slot} is still pending")]
    Conflict { slot: usize },

    /// The host contradicted an unacknowledged request. The optimistic local
    /// write is left in place.
    #[error("server rejected setting slot {slot}")]
    Rejected { slot: usize },

    /// No matching acknowledgment arrived in time.
    #[error("setting slot {slot} timed out after {waited:?}")]
    Timeout { slot: usize, waited: Duration },

    /// The outbound request could not be queued.
    #[error("link error: {0}")]
    Link(#[from] LinkError),

    /// An event source went away while waiting on it.
    #[error("event source closed while waiting")]
    Closed,
}
