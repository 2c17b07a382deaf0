use crate::{
    bundle::{Bundle, Outgoing},
    message::Message,
    NodeId,
};

// Broadcaster collects the messages a participant wants to send.
// Nothing leaves until the caller takes the outgoings and hands them to a transport.
#[derive(Debug)]
pub struct Broadcaster {
    self_id: NodeId,
    n: usize,
    outgoings: Vec<Outgoing>,
}

impl Broadcaster {
    pub fn new(self_id: NodeId, n: usize) -> Self {
        Self {
            self_id,
            n,
            outgoings: Vec::new(),
        }
    }

    pub fn send_to(&mut self, message: Message, recipient: NodeId) {
        let bundle = self.make_bundle(message);
        self.outgoings.push(Outgoing { recipient, bundle });
    }

    // broadcast addresses `message` to every participant, ourselves included.
    pub fn broadcast(&mut self, message: Message) {
        for recipient in 0..self.n {
            self.send_to(message, recipient);
        }
    }

    fn make_bundle(&self, message: Message) -> Bundle {
        Bundle {
            initiator: self.self_id,
            message,
        }
    }

    pub fn take_outgoings(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.outgoings)
    }

    #[cfg(test)]
    pub fn has_broadcast_message(&self, msg: &Message) -> bool {
        (0..self.n).all(|to| self.has_direct_message(&to, msg))
    }

    #[cfg(test)]
    pub fn has_direct_message(&self, to: &NodeId, msg: &Message) -> bool {
        self.outgoings
            .iter()
            .any(|out| &out.bundle.message == msg && &out.recipient == to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Value;

    #[test]
    fn test_broadcast_reaches_every_participant_including_self() {
        let mut broadcaster = Broadcaster::new(2, 4);
        let msg = Message::propose(1, Value::One);
        broadcaster.broadcast(msg);

        assert!(broadcaster.has_broadcast_message(&msg));
        let outgoings = broadcaster.take_outgoings();
        assert_eq!(
            outgoings.iter().map(|o| o.recipient).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        assert!(outgoings.iter().all(|o| o.bundle.initiator == 2));
        assert!(broadcaster.take_outgoings().is_empty());
    }
}
