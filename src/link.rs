//! Outbound side of the connection to the remote host.
//!
//! The creative controller only needs two things from a connection: a way to
//! send a typed request and a synchronous capability query. Anything that can
//! do both (a real protocol client, the in-process simulator, a test double)
//! implements [`RemoteLink`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::item::WireSlot;

/// Negotiated protocol capabilities the controller branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// The host does not acknowledge `set creative slot` requests; the client
    /// applies them locally and watches for contradictions instead.
    NoAckOnCreativeSetSlot,
}

/// Requests sent to the remote host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboundPacket {
    SetCreativeSlot { slot: i16, item: WireSlot },
}

impl OutboundPacket {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundPacket::SetCreativeSlot { .. } => "set_creative_slot",
        }
    }

    /// Serialize for transports that carry raw frames.
    pub fn encode(&self) -> Result<Vec<u8>, LinkError> {
        bincode::serialize(self).map_err(LinkError::from)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, LinkError> {
        bincode::deserialize(bytes).map_err(LinkError::from)
    }
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("connection closed")]
    Closed,

    #[error("packet encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("item id {id} does not fit the wire encoding")]
    UnencodableItem { id: u32 },
}

/// A bidirectional connection as seen by the controller.
pub trait RemoteLink: Send + Sync {
    /// Queue a request for delivery. Must not block.
    fn send(&self, packet: OutboundPacket) -> Result<(), LinkError>;

    /// Whether the remote host negotiated `feature`.
    fn supports_feature(&self, feature: Feature) -> bool;
}
