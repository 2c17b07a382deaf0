//! Ben-Or randomized binary consensus.
//!
//! Each [`Participant`] proposes a binary value, then rounds of proposals and votes
//! are exchanged until every correct participant finalizes the same value.
//! Up to `f` of the `n` participants may crash or stay silent.
//!
//! The participant is a pure state machine: it returns the bundles it wants delivered
//! and leaves the transport to its host. The [`node`] module hosts participants as
//! tokio actors on an in-memory network.

pub mod broadcaster;
pub mod bundle;
pub mod coin;
pub mod config;
pub mod error;
pub mod message;
pub mod node;
pub mod participant;
pub mod tally;

pub use crate::broadcaster::Broadcaster;
pub use crate::bundle::{Bundle, Outgoing};
pub use crate::coin::{Coin, RandomCoin};
pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::message::{Estimate, Kind, Message, Value};
pub use crate::participant::{Liveness, Participant, Progress, State};
pub use crate::tally::{Count, Tally};

pub type NodeId = usize;
pub type Round = u64;
