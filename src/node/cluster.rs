use log::{debug, info};

use super::{Network, Node, NodeHandle, Readiness};
use crate::coin::{Coin, RandomCoin};
use crate::message::Value;
use crate::participant::{Participant, State};
use crate::{Config, Error, NodeId, Result};

/// A full set of `n` nodes wired to one in-memory network.
///
/// Dropping the cluster aborts every node, use [`Cluster::shutdown`] to let them finish.
#[derive(Debug)]
pub struct Cluster {
    config: Config,
    nodes: Vec<NodeHandle>,
}

impl Cluster {
    /// Spawns one node per initial value. Must be called from inside a tokio runtime.
    pub fn launch(config: Config, initial_values: &[Value], faulty: &[bool]) -> Result<Self> {
        Self::launch_with_coins(config, initial_values, faulty, |_| {
            RandomCoin::from_entropy()
        })
    }

    pub fn launch_with_coins<C, F>(
        config: Config,
        initial_values: &[Value],
        faulty: &[bool],
        mut coin: F,
    ) -> Result<Self>
    where
        C: Coin + Send + 'static,
        F: FnMut(NodeId) -> C,
    {
        for got in [initial_values.len(), faulty.len()] {
            if got != config.n() {
                return Err(Error::WrongNodeCount {
                    expected: config.n(),
                    got,
                });
            }
        }

        let (network, inboxes) = Network::new(config.n());
        let readiness = Readiness::new(config.n());

        let nodes = inboxes
            .into_iter()
            .enumerate()
            .map(|(id, inbox)| {
                let participant =
                    Participant::new(id, config, initial_values[id], faulty[id])?
                        .with_coin(coin(id));
                Ok(Node::new(participant, network.clone(), inbox, readiness.clone()).spawn())
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "launched {} nodes tolerating {} faults",
            config.n(),
            config.f()
        );
        Ok(Self { config, nodes })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeHandle> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[NodeHandle] {
        &self.nodes
    }

    pub async fn start_all(&self) -> Result<()> {
        for node in self.nodes.iter() {
            node.start().await?;
        }
        Ok(())
    }

    pub fn stop_all(&self) -> Result<()> {
        self.nodes.iter().try_for_each(NodeHandle::stop)
    }

    /// Shuts every node down and waits for all of them to exit.
    /// Returns the first error that halted a node, if any.
    pub async fn shutdown(self) -> Result<()> {
        for node in self.nodes.iter() {
            if let Err(err) = node.shutdown() {
                debug!("node {} already exited: {}", node.id(), err);
            }
        }

        let mut res = Ok(());
        for node in self.nodes {
            let joined = node.join().await;
            if res.is_ok() {
                res = joined;
            }
        }
        res
    }

    pub async fn states(&self) -> Result<Vec<State>> {
        let mut states = Vec::with_capacity(self.nodes.len());
        for node in self.nodes.iter() {
            states.push(node.state().await?);
        }
        Ok(states)
    }
}
