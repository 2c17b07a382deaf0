use std::collections::BTreeMap;

use log::{trace, warn};

use crate::{
    message::{Estimate, Kind, Value},
    Config, Round,
};

/// Occurrences of each payload among the messages of one round and kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Count {
    pub zeros: usize,
    pub ones: usize,
    pub ambiguous: usize,
}

impl Count {
    pub fn of<'a>(values: impl IntoIterator<Item = &'a Estimate>) -> Self {
        let mut count = Count::default();
        for value in values {
            match value {
                Estimate::Value(Value::Zero) => count.zeros += 1,
                Estimate::Value(Value::One) => count.ones += 1,
                Estimate::Ambiguous => count.ambiguous += 1,
            }
        }
        count
    }

    /// The value with strictly more occurrences, `None` on a tie.
    pub fn leader(&self) -> Option<Value> {
        match self.zeros.cmp(&self.ones) {
            std::cmp::Ordering::Greater => Some(Value::Zero),
            std::cmp::Ordering::Less => Some(Value::One),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn total(&self) -> usize {
        self.zeros + self.ones + self.ambiguous
    }
}

/// Round-indexed tallies of received proposals and votes.
///
/// Values are raw arrivals: a sender is not deduplicated.
/// `record` reports the moment a round first collects `quorum` messages of a kind,
/// and only that moment.
#[derive(Debug)]
pub struct Tally {
    n: usize,
    quorum: usize,
    // rounds below this have been pruned
    floor: Round,
    proposals: BTreeMap<Round, Vec<Estimate>>,
    votes: BTreeMap<Round, Vec<Estimate>>,
}

impl Tally {
    pub fn new(config: &Config) -> Self {
        Self {
            n: config.n(),
            quorum: config.quorum(),
            floor: 1,
            proposals: Default::default(),
            votes: Default::default(),
        }
    }

    /// Appends `value` to the `(round, kind)` tally.
    /// Returns true if and only if this arrival brought the tally to quorum.
    pub fn record(&mut self, round: Round, value: Estimate, kind: Kind) -> bool {
        if round < self.floor {
            trace!("dropping stale {:?} for pruned round {}", kind, round);
            return false;
        }

        let (n, quorum) = (self.n, self.quorum);
        let values = self.log_mut(kind).entry(round).or_default();
        values.push(value);

        if values.len() > n {
            warn!(
                "{:?} tally for round {} holds {} messages, more than the {} participants",
                kind,
                round,
                values.len(),
                n
            );
        }

        values.len() == quorum
    }

    pub fn count(&self, round: Round, kind: Kind) -> Count {
        self.log(kind)
            .get(&round)
            .map(Count::of)
            .unwrap_or_default()
    }

    pub fn len(&self, round: Round, kind: Kind) -> usize {
        self.log(kind).get(&round).map(Vec::len).unwrap_or_default()
    }

    /// Drops every tally older than `round`. Later arrivals for those rounds are ignored.
    pub fn retain_from(&mut self, round: Round) {
        if round <= self.floor {
            return;
        }
        self.floor = round;
        self.proposals = self.proposals.split_off(&round);
        self.votes = self.votes.split_off(&round);
    }

    pub fn oldest_round(&self) -> Option<Round> {
        let p = self.proposals.keys().next();
        let v = self.votes.keys().next();
        p.into_iter().chain(v).min().copied()
    }

    fn log(&self, kind: Kind) -> &BTreeMap<Round, Vec<Estimate>> {
        match kind {
            Kind::Propose => &self.proposals,
            Kind::Vote => &self.votes,
        }
    }

    fn log_mut(&mut self, kind: Kind) -> &mut BTreeMap<Round, Vec<Estimate>> {
        match kind {
            Kind::Propose => &mut self.proposals,
            Kind::Vote => &mut self.votes,
        }
    }
}
