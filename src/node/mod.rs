//! Hosts participants as tokio actors.
//!
//! Each node owns one [`Participant`] and processes its inbox one input at a time,
//! so the participant's state is never touched concurrently. Peer bundles and
//! lifecycle commands share that inbox.
//!
//! Every node keeps a sender to every inbox, its own included, so an actor never
//! sees its inbox close: it runs until it is shut down, halts on a safety
//! violation, or its [`NodeHandle`] is dropped.

mod cluster;
mod network;
mod readiness;

pub use self::cluster::Cluster;
pub use self::network::{Input, Network};
pub use self::readiness::Readiness;

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::participant::{Liveness, Participant, State};
use crate::{Error, NodeId, Result};

pub struct Node {
    participant: Participant,
    network: Network,
    inbox: mpsc::UnboundedReceiver<Input>,
    readiness: Readiness,
}

impl Node {
    pub fn new(
        participant: Participant,
        network: Network,
        inbox: mpsc::UnboundedReceiver<Input>,
        readiness: Readiness,
    ) -> Self {
        Self {
            participant,
            network,
            inbox,
            readiness,
        }
    }

    /// Runs the node on the current tokio runtime.
    pub fn spawn(self) -> NodeHandle {
        let id = self.participant.id();
        let network = self.network.clone();
        let readiness = self.readiness.clone();
        let task = tokio::spawn(self.run());
        NodeHandle {
            id,
            network,
            readiness,
            task: Some(task),
        }
    }

    async fn run(mut self) -> Result<()> {
        let id = self.participant.id();
        self.readiness.set_ready(id);

        while let Some(input) = self.inbox.recv().await {
            let res = match input {
                Input::Bytes(bytes) => self.participant.handle_bytes(&bytes),
                Input::Start => self.participant.start(),
                Input::Stop => {
                    self.participant.stop();
                    Ok(vec![])
                }
                Input::Shutdown => break,
                Input::State(reply) => {
                    let _ = reply.send(self.participant.state());
                    Ok(vec![])
                }
                Input::Status(reply) => {
                    let _ = reply.send(self.participant.liveness());
                    Ok(vec![])
                }
            };

            match res {
                Ok(outgoings) => self.network.deliver(outgoings),
                Err(err @ Error::ConflictingDecision { .. }) => {
                    error!("[BENOR-{}] safety violated, halting: {}", id, err);
                    return Err(err);
                }
                Err(err) => warn!("[BENOR-{}] rejected input: {}", id, err),
            }
        }

        info!("[BENOR-{}] shut down", id);
        Ok(())
    }
}

/// The lifecycle surface of a running node.
#[derive(Debug)]
pub struct NodeHandle {
    id: NodeId,
    network: Network,
    readiness: Readiness,
    task: Option<JoinHandle<Result<()>>>,
}

impl NodeHandle {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Waits until every node is listening, then starts the protocol on this node.
    pub async fn start(&self) -> Result<()> {
        self.readiness.wait_all().await;
        self.network.send(self.id, Input::Start)
    }

    pub fn stop(&self) -> Result<()> {
        self.network.send(self.id, Input::Stop)
    }

    /// Asks the actor to exit once it has processed everything queued before.
    /// Follow with [`NodeHandle::join`] to wait for it.
    pub fn shutdown(&self) -> Result<()> {
        self.network.send(self.id, Input::Shutdown)
    }

    pub async fn state(&self) -> Result<State> {
        let (tx, rx) = oneshot::channel();
        self.network.send(self.id, Input::State(tx))?;
        rx.await.map_err(|_| Error::NodeUnavailable(self.id))
    }

    pub async fn status(&self) -> Result<Liveness> {
        let (tx, rx) = oneshot::channel();
        self.network.send(self.id, Input::Status(tx))?;
        rx.await.map_err(|_| Error::NodeUnavailable(self.id))
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Waits for the actor to exit and returns the error that halted it, if any.
    pub async fn join(mut self) -> Result<()> {
        match self.task.take() {
            Some(task) => task.await.map_err(|_| Error::NodeUnavailable(self.id))?,
            None => Ok(()),
        }
    }
}

impl Drop for NodeHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("[BENOR-{}] handle dropped, aborting actor", self.id);
            task.abort();
        }
    }
}
