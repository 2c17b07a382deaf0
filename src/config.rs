use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Parameters shared by every participant of one protocol instance.
///
/// There are `n` participants, at most `f` of which may crash or stay silent.
/// The protocol is only sound for `n > 2f`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    n: usize,
    f: usize,
}

impl Config {
    pub fn new(n: usize, f: usize) -> Result<Self> {
        if n == 0 || f.checked_mul(2).map_or(true, |twice| n <= twice) {
            return Err(Error::InvalidConfig { n, f });
        }
        Ok(Self { n, f })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn f(&self) -> usize {
        self.f
    }

    /// The number of same-kind messages of a round we wait for: $n - f$.
    pub fn quorum(&self) -> usize {
        self.n - self.f
    }

    /// The number of matching votes needed to finalize a value: $f + 1$.
    pub fn decision_threshold(&self) -> usize {
        self.f + 1
    }

    /// Strict majority of all `n` participants.
    pub fn is_majority(&self, count: usize) -> bool {
        2 * count > self.n
    }
}
