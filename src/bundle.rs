use serde::{Deserialize, Serialize};

use crate::{message::Message, NodeId, Result};

/// Bundle is a wrapper around the actual message
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Bundle {
    /// The participant that sent this message.
    pub initiator: NodeId,
    /// This is the actual message
    pub message: Message,
}

impl Bundle {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// A bundle waiting to be delivered to `recipient` by the transport.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Outgoing {
    pub recipient: NodeId,
    pub bundle: Bundle,
}
