use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;
use tokio::sync::watch;

use crate::NodeId;

/// Barrier telling whether every node of the network is listening.
///
/// Nodes register themselves with `set_ready` once their inbox is being polled,
/// nobody should send its first proposal before `wait_all` returns.
#[derive(Debug, Clone)]
pub struct Readiness {
    n: usize,
    tx: Arc<watch::Sender<BTreeSet<NodeId>>>,
    rx: watch::Receiver<BTreeSet<NodeId>>,
}

impl Readiness {
    pub fn new(n: usize) -> Self {
        let (tx, rx) = watch::channel(BTreeSet::new());
        Self {
            n,
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn set_ready(&self, id: NodeId) {
        debug!("[BENOR-{}] ready", id);
        self.tx.send_modify(|ready| {
            ready.insert(id);
        });
    }

    pub fn is_all_ready(&self) -> bool {
        self.rx.borrow().len() >= self.n
    }

    pub async fn wait_all(&self) {
        let mut rx = self.rx.clone();
        while rx.borrow_and_update().len() < self.n {
            // we hold the sender, so the channel can't close under us
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_all_returns_once_everyone_registered() {
        let readiness = Readiness::new(3);
        assert!(!readiness.is_all_ready());

        let waiter = {
            let readiness = readiness.clone();
            tokio::spawn(async move { readiness.wait_all().await })
        };

        readiness.set_ready(0);
        readiness.set_ready(2);
        readiness.set_ready(2);
        assert!(!readiness.is_all_ready());
        readiness.set_ready(1);

        waiter.await.unwrap();
        assert!(readiness.is_all_ready());
    }
}
