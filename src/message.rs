use serde::{Deserialize, Serialize};

use crate::{Error, NodeId, Result, Round};

/// A binary consensus value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Value {
    Zero,
    One,
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        if b {
            Value::One
        } else {
            Value::Zero
        }
    }
}

impl From<Value> for u8 {
    fn from(v: Value) -> Self {
        match v {
            Value::Zero => 0,
            Value::One => 1,
        }
    }
}

/// The payload of a message. `Ambiguous` means no value reached the
/// proposal majority, it is only meaningful in votes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum Estimate {
    Value(Value),
    Ambiguous,
}

impl Estimate {
    pub fn one() -> Self {
        Self::Value(Value::One)
    }

    pub fn zero() -> Self {
        Self::Value(Value::Zero)
    }
}

impl From<Value> for Estimate {
    fn from(v: Value) -> Self {
        Estimate::Value(v)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Kind {
    Propose,
    Vote,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub round: Round,
    pub value: Estimate,
    pub kind: Kind,
}

impl Message {
    pub fn propose(round: Round, value: Value) -> Self {
        Self {
            round,
            value: value.into(),
            kind: Kind::Propose,
        }
    }

    pub fn vote(round: Round, value: Estimate) -> Self {
        Self {
            round,
            value,
            kind: Kind::Vote,
        }
    }

    pub fn kind_str(&self) -> &str {
        match self.kind {
            Kind::Propose => "propose",
            Kind::Vote => "vote",
        }
    }

    /// Checks the fields that the type system can't: rounds lie in `1..Round::MAX`
    /// (there must be a round after every round) and proposals always carry a binary value.
    pub fn validate(&self, sender: NodeId) -> Result<()> {
        if self.round == 0 {
            return Err(Error::InvalidMessage {
                sender,
                reason: "rounds are numbered from 1".to_string(),
            });
        }
        if self.round == Round::MAX {
            return Err(Error::InvalidMessage {
                sender,
                reason: format!("round {} has no successor", self.round),
            });
        }
        if self.kind == Kind::Propose && self.value == Estimate::Ambiguous {
            return Err(Error::InvalidMessage {
                sender,
                reason: format!("ambiguous proposal in round {}", self.round),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_round_zero() {
        let msg = Message::vote(0, Estimate::one());
        assert!(matches!(
            msg.validate(3),
            Err(Error::InvalidMessage { sender: 3, .. })
        ));
    }

    #[test]
    fn test_reject_last_round() {
        assert!(matches!(
            Message::vote(Round::MAX, Estimate::Ambiguous).validate(1),
            Err(Error::InvalidMessage { sender: 1, .. })
        ));
        assert!(Message::vote(Round::MAX - 1, Estimate::Ambiguous)
            .validate(1)
            .is_ok());
    }

    #[test]
    fn test_reject_ambiguous_proposal() {
        let msg = Message {
            round: 2,
            value: Estimate::Ambiguous,
            kind: Kind::Propose,
        };
        assert!(msg.validate(0).is_err());
        assert!(Message::vote(2, Estimate::Ambiguous).validate(0).is_ok());
    }

    #[test]
    fn test_value_from_bool() {
        assert_eq!(Value::from(true), Value::One);
        assert_eq!(u8::from(Value::from(false)), 0);
    }
}
