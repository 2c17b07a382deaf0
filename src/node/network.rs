use std::sync::Arc;

use log::{trace, warn};
use tokio::sync::{mpsc, oneshot};

use crate::bundle::Outgoing;
use crate::participant::{Liveness, State};
use crate::{Error, NodeId, Result};

/// Everything a node actor consumes, in the order it arrived.
#[derive(Debug)]
pub enum Input {
    /// An encoded `Bundle` from a peer.
    Bytes(Vec<u8>),
    Start,
    /// Kills the participant. The actor keeps answering queries.
    Stop,
    /// Ends the actor and drops its inbox.
    Shutdown,
    State(oneshot::Sender<State>),
    Status(oneshot::Sender<Liveness>),
}

/// In-memory point-to-point transport between the nodes of one process.
///
/// Sends are fire-and-forget: nothing is acknowledged or retried, and a message
/// to a node that is gone is dropped.
#[derive(Debug, Clone)]
pub struct Network {
    peers: Arc<Vec<mpsc::UnboundedSender<Input>>>,
}

impl Network {
    pub fn new(n: usize) -> (Self, Vec<mpsc::UnboundedReceiver<Input>>) {
        let (peers, inboxes) = (0..n).map(|_| mpsc::unbounded_channel()).unzip();
        (
            Self {
                peers: Arc::new(peers),
            },
            inboxes,
        )
    }

    pub fn size(&self) -> usize {
        self.peers.len()
    }

    pub fn send(&self, recipient: NodeId, input: Input) -> Result<()> {
        let peer = self.peers.get(recipient).ok_or(Error::UnknownNode {
            id: recipient,
            n: self.size(),
        })?;
        peer.send(input)
            .map_err(|_| Error::NodeUnavailable(recipient))
    }

    /// Encodes and ships every outgoing bundle. Undeliverable bundles are logged and dropped.
    pub fn deliver(&self, outgoings: Vec<Outgoing>) {
        for Outgoing { recipient, bundle } in outgoings {
            let bytes = match bundle.to_bytes() {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!("failed to encode bundle for {}: {}", recipient, err);
                    continue;
                }
            };
            if let Err(err) = self.send(recipient, Input::Bytes(bytes)) {
                trace!("dropping bundle from {}: {}", bundle.initiator, err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::Bundle;
    use crate::message::{Message, Value};

    #[tokio::test]
    async fn test_deliver_encodes_bundles() {
        let (network, mut inboxes) = Network::new(2);
        let bundle = Bundle {
            initiator: 0,
            message: Message::propose(1, Value::One),
        };
        network.deliver(vec![Outgoing {
            recipient: 1,
            bundle: bundle.clone(),
        }]);

        match inboxes[1].recv().await {
            Some(Input::Bytes(bytes)) => assert_eq!(Bundle::from_bytes(&bytes).unwrap(), bundle),
            other => panic!("unexpected input {:?}", other),
        }
        assert!(inboxes[0].try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_to_unknown_or_closed_node() {
        let (network, mut inboxes) = Network::new(2);
        assert!(matches!(
            network.send(5, Input::Start),
            Err(Error::UnknownNode { id: 5, n: 2 })
        ));

        drop(inboxes.remove(1));
        assert!(matches!(
            network.send(1, Input::Start),
            Err(Error::NodeUnavailable(1))
        ));
    }
}
