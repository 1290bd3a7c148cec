//! Injected uniform random source for the probabilistic guards

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

pub trait RandomSource: Send {
    /// Uniform draw in [0, 1).
    fn draw(&mut self) -> f64;
}

impl RandomSource for StdRng {
    fn draw(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Seeded generator when a seed is given, OS entropy otherwise.
pub fn from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Always returns the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedDraw(pub f64);

impl RandomSource for FixedDraw {
    fn draw(&mut self) -> f64 {
        self.0
    }
}

/// Replays a fixed sequence, then repeats `fallback`.
#[derive(Debug, Clone)]
pub struct ScriptedDraws {
    draws: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedDraws {
    pub fn new(draws: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            fallback,
        }
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedDraws {
    fn draw(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_draws_repeat() {
        let mut a = from_seed(Some(7));
        let mut b = from_seed(Some(7));
        for _ in 0..16 {
            let x = a.draw();
            assert!((0.0..1.0).contains(&x));
            assert_eq!(x, b.draw());
        }
    }

    #[test]
    fn scripted_draws_fall_back() {
        let mut s = ScriptedDraws::new([0.9, 0.1], 0.5);
        assert_eq!(s.draw(), 0.9);
        assert_eq!(s.draw(), 0.1);
        assert_eq!(s.remaining(), 0);
        assert_eq!(s.draw(), 0.5);
    }
}
