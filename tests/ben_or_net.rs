use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rand::prelude::StdRng;
use rand::Rng;
use sn_ben_or::{
    Config, NodeId, Outgoing, Participant, Progress, RandomCoin, Result, Round, Value,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub dest: NodeId,
    pub bytes: Vec<u8>,
}

/// A simulated network: participants exchange bincode-encoded bundles through one
/// queue whose delivery order the test controls.
pub struct Net {
    pub procs: Vec<Participant>,
    pub queue: VecDeque<Packet>,
    pub delivered: usize,
}

impl Net {
    pub fn new(
        config: Config,
        initial_values: &[Value],
        faulty: &BTreeSet<NodeId>,
        seed: u64,
    ) -> Result<Self> {
        let procs = initial_values
            .iter()
            .enumerate()
            .map(|(id, value)| {
                Ok(
                    Participant::new(id, config, *value, faulty.contains(&id))?
                        .with_coin(RandomCoin::seeded(seed.wrapping_add(id as u64))),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            procs,
            queue: Default::default(),
            delivered: 0,
        })
    }

    pub fn start_all(&mut self) -> Result<()> {
        for id in 0..self.procs.len() {
            let outgoings = self.procs[id].start()?;
            self.enqueue(outgoings)?;
        }
        Ok(())
    }

    pub fn enqueue(&mut self, outgoings: Vec<Outgoing>) -> Result<()> {
        for Outgoing { recipient, bundle } in outgoings {
            self.queue.push_back(Packet {
                dest: recipient,
                bytes: bundle.to_bytes()?,
            });
        }
        Ok(())
    }

    fn deliver(&mut self, packet: Packet) -> Result<()> {
        self.delivered += 1;
        let outgoings = self.procs[packet.dest].handle_bytes(&packet.bytes)?;
        self.enqueue(outgoings)
    }

    /// Delivers in the order packets were sent. Returns false once the queue is empty.
    pub fn deliver_next(&mut self) -> Result<bool> {
        match self.queue.pop_front() {
            Some(packet) => self.deliver(packet).map(|_| true),
            None => Ok(false),
        }
    }

    /// Delivers any queued packet, chosen by `rng`.
    pub fn deliver_random(&mut self, rng: &mut StdRng) -> Result<bool> {
        if self.queue.is_empty() {
            return Ok(false);
        }
        let index = rng.gen_range(0, self.queue.len());
        match self.queue.remove(index) {
            Some(packet) => self.deliver(packet).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn drain_fifo(&mut self, max_round: Round) -> Result<()> {
        while self.max_round() <= max_round && self.deliver_next()? {}
        Ok(())
    }

    pub fn drain_random(&mut self, rng: &mut StdRng, max_round: Round) -> Result<()> {
        while self.max_round() <= max_round && self.deliver_random(rng)? {}
        Ok(())
    }

    pub fn max_round(&self) -> Round {
        self.procs
            .iter()
            .filter_map(Participant::round)
            .max()
            .unwrap_or_default()
    }

    pub fn decisions(&self) -> BTreeMap<NodeId, Value> {
        self.procs
            .iter()
            .filter_map(|p| p.decided_value().map(|v| (p.id(), v)))
            .collect()
    }

    pub fn honest(&self) -> impl Iterator<Item = &Participant> {
        self.procs.iter().filter(|p| !p.is_faulty())
    }

    pub fn all_honest_finalized(&self) -> bool {
        self.honest()
            .all(|p| p.state().decided == Progress::Finalized)
    }

    /// Asserts that every participant that finalized picked the same value.
    pub fn assert_agreement(&self) {
        let decided = BTreeSet::from_iter(self.decisions().into_values());
        assert!(decided.len() <= 1, "participants disagree: {:?}", self.decisions());
    }
}
