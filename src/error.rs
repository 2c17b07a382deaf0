use core::fmt::Debug;
use thiserror::Error;

use crate::{NodeId, Round};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: n = {n}, f = {f} (we need n > 2f)")]
    InvalidConfig { n: usize, f: usize },
    #[error("Invalid message from {sender}: {reason}")]
    InvalidMessage { sender: NodeId, reason: String },
    #[error("Failed to encode with bincode")]
    Encoding(#[from] bincode::Error),
    #[error("Both values reached the decision threshold in round {round}: zeros = {zeros}, ones = {ones} (threshold {threshold})")]
    ConflictingDecision {
        round: Round,
        zeros: usize,
        ones: usize,
        threshold: usize,
    },
    #[error("Participant {0} has already started")]
    AlreadyStarted(NodeId),
    #[error("Node {id} is not part of this network of {n} nodes")]
    UnknownNode { id: NodeId, n: usize },
    #[error("Expected one entry per node ({expected}), got {got}")]
    WrongNodeCount { expected: usize, got: usize },
    #[error("Node {0} is unavailable")]
    NodeUnavailable(NodeId),
}

pub type Result<T> = std::result::Result<T, Error>;
