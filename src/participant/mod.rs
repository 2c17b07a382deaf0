use log::{debug, error, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::broadcaster::Broadcaster;
use crate::bundle::{Bundle, Outgoing};
use crate::coin::{Coin, RandomCoin};
use crate::message::{Estimate, Kind, Message, Value};
use crate::tally::{Count, Tally};
use crate::{Config, Error, NodeId, Result, Round};

// State transition
//
// +-------------+  start  +-------------+  f+1 matching votes  +-------------+
// | Not started | ------> | In progress | -------------------> |  Finalized  |
// +-------------+         +-------------+                      +-------------+
//                           |        ^
//                           +--------+
//                         next round
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Progress {
    NotStarted,
    InProgress,
    Finalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Liveness {
    Live,
    Faulty,
}

/// A snapshot of a participant, as seen by whoever supervises it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub decided: Progress,
    pub value: Option<Value>,
    pub round: Option<Round>,
    pub killed: bool,
}

impl State {
    pub fn is_finalized(&self) -> bool {
        self.decided == Progress::Finalized
    }
}

/// One Ben-Or participant.
///
/// Every handler runs to completion and returns the bundles it wants sent,
/// the participant never talks to the network itself.
pub struct Participant {
    id: NodeId,
    config: Config,
    initial_value: Value,
    faulty: bool,
    killed: bool,
    value: Option<Value>,
    decided: Progress,
    round: Option<Round>,
    tally: Tally,
    coin: Box<dyn Coin + Send>,
    broadcaster: Broadcaster,
}

impl Participant {
    pub fn new(id: NodeId, config: Config, initial_value: Value, faulty: bool) -> Result<Self> {
        if id >= config.n() {
            return Err(Error::UnknownNode { id, n: config.n() });
        }

        Ok(Self {
            id,
            config,
            initial_value,
            faulty,
            killed: false,
            value: None,
            decided: Progress::NotStarted,
            round: None,
            tally: Tally::new(&config),
            coin: Box::new(RandomCoin::from_entropy()),
            broadcaster: Broadcaster::new(id, config.n()),
        })
    }

    /// Replaces the tie-break coin.
    pub fn with_coin(mut self, coin: impl Coin + Send + 'static) -> Self {
        self.coin = Box::new(coin);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_faulty(&self) -> bool {
        self.faulty
    }

    pub fn round(&self) -> Option<Round> {
        self.round
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn decided_value(&self) -> Option<Value> {
        match self.decided {
            Progress::Finalized => self.value,
            _ => None,
        }
    }

    pub fn state(&self) -> State {
        State {
            decided: self.decided,
            value: self.value,
            round: self.round,
            killed: self.killed,
        }
    }

    pub fn liveness(&self) -> Liveness {
        if self.faulty {
            Liveness::Faulty
        } else {
            Liveness::Live
        }
    }

    /// Stop signal. From now on every inbound message is discarded.
    pub fn stop(&mut self) {
        info!("[BENOR-{}] stopped", self.id);
        self.killed = true;
    }

    /// Enters round 1 with our initial value and proposes it to everyone.
    pub fn start(&mut self) -> Result<Vec<Outgoing>> {
        if self.faulty {
            info!("[BENOR-{}] faulty, staying silent", self.id);
            return Ok(vec![]);
        }
        if self.killed {
            debug!("[BENOR-{}] killed before start, ignoring", self.id);
            return Ok(vec![]);
        }
        if self.decided != Progress::NotStarted {
            return Err(Error::AlreadyStarted(self.id));
        }

        info!("[BENOR-{}] starting with {:?}", self.id, self.initial_value);
        self.round = Some(1);
        self.value = Some(self.initial_value);
        self.decided = Progress::InProgress;
        self.broadcaster.broadcast(Message::propose(1, self.initial_value));

        Ok(self.broadcaster.take_outgoings())
    }

    pub fn handle_bytes(&mut self, bytes: &[u8]) -> Result<Vec<Outgoing>> {
        if self.is_inert() {
            return Ok(vec![]);
        }
        let bundle = Bundle::from_bytes(bytes)?;
        self.handle_bundle(bundle)
    }

    pub fn handle_bundle(&mut self, bundle: Bundle) -> Result<Vec<Outgoing>> {
        self.handle_message(bundle.initiator, bundle.message)
    }

    // handle_message processes the message `msg` received from `sender`
    pub fn handle_message(&mut self, sender: NodeId, msg: Message) -> Result<Vec<Outgoing>> {
        if self.is_inert() {
            trace!(
                "[BENOR-{}] discarding {} from {}",
                self.id,
                msg.kind_str(),
                sender
            );
            return Ok(vec![]);
        }

        if sender >= self.config.n() {
            return Err(Error::InvalidMessage {
                sender,
                reason: format!("sender is not one of the {} participants", self.config.n()),
            });
        }
        msg.validate(sender)?;

        debug!(
            "[BENOR-{}] received {} {:?} for round {} from {}",
            self.id,
            msg.kind_str(),
            msg.value,
            msg.round,
            sender
        );

        if self.tally.record(msg.round, msg.value, msg.kind) {
            match msg.kind {
                Kind::Propose => self.on_proposal_quorum(msg.round),
                Kind::Vote => self.on_vote_quorum(msg.round)?,
            }
        }

        Ok(self.broadcaster.take_outgoings())
    }

    fn is_inert(&self) -> bool {
        self.faulty || self.killed || self.decided == Progress::Finalized
    }

    fn on_proposal_quorum(&mut self, round: Round) {
        let count = self.tally.count(round, Kind::Propose);
        let tentative = if self.config.is_majority(count.zeros) {
            Estimate::zero()
        } else if self.config.is_majority(count.ones) {
            Estimate::one()
        } else {
            Estimate::Ambiguous
        };

        info!(
            "[BENOR-{}] proposal quorum in round {} ({:?}), voting {:?}",
            self.id, round, count, tentative
        );
        self.broadcaster.broadcast(Message::vote(round, tentative));
    }

    fn on_vote_quorum(&mut self, round: Round) -> Result<()> {
        let count = self.tally.count(round, Kind::Vote);
        let threshold = self.config.decision_threshold();

        match (count.zeros >= threshold, count.ones >= threshold) {
            (true, true) => {
                error!(
                    "[BENOR-{}] both values reached {} votes in round {}: {:?}",
                    self.id, threshold, round, count
                );
                Err(Error::ConflictingDecision {
                    round,
                    zeros: count.zeros,
                    ones: count.ones,
                    threshold,
                })
            }
            (true, false) => {
                self.finalize(round, Value::Zero);
                Ok(())
            }
            (false, true) => {
                self.finalize(round, Value::One);
                Ok(())
            }
            (false, false) => {
                self.advance(round, &count);
                Ok(())
            }
        }
    }

    fn finalize(&mut self, round: Round, value: Value) {
        info!("[BENOR-{}] decided {:?} in round {}", self.id, value, round);
        self.value = Some(value);
        self.decided = Progress::Finalized;
    }

    // advance moves to the round after `round`, carrying the majority of its votes
    // (or a coin toss on a tie) as our next proposal.
    fn advance(&mut self, round: Round, count: &Count) {
        // validated messages never carry Round::MAX
        let next_round = round + 1;
        if matches!(self.round, Some(current) if current >= next_round) {
            warn!(
                "[BENOR-{}] vote quorum for round {} arrived while in round {:?}, ignoring",
                self.id, round, self.round
            );
            return;
        }

        let next_value = match count.leader() {
            Some(value) => value,
            None => {
                let value = self.coin.toss();
                debug!(
                    "[BENOR-{}] votes tied in round {}, coin says {:?}",
                    self.id, round, value
                );
                value
            }
        };

        info!(
            "[BENOR-{}] no decision in round {} ({:?}), proposing {:?} for round {}",
            self.id, round, count, next_value, next_round
        );
        self.round = Some(next_round);
        self.value = Some(next_value);
        self.decided = Progress::InProgress;
        self.tally.retain_from(round);
        self.broadcaster.broadcast(Message::propose(next_round, next_value));
    }
}
