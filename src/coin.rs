use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::message::Value;

/// Source of the random tie-break used when the votes of a round are split evenly.
pub trait Coin {
    fn toss(&mut self) -> Value;
}

/// A fair coin backed by any random number generator.
#[derive(Debug, Clone)]
pub struct RandomCoin<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomCoin<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomCoin<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Coin for RandomCoin<R> {
    fn toss(&mut self) -> Value {
        self.rng.gen::<bool>().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_coins_agree() {
        let mut a = RandomCoin::seeded(7);
        let mut b = RandomCoin::seeded(7);
        for _ in 0..32 {
            assert_eq!(a.toss(), b.toss());
        }
    }

    #[test]
    fn test_coin_lands_on_both_sides() {
        let mut coin = RandomCoin::seeded(0);
        let ones = (0..1000).filter(|_| coin.toss() == Value::One).count();
        assert!(ones > 400 && ones < 600, "ones = {}", ones);
    }
}
