//! # Random Primitives
//!
//! Percentage-chance tests and bounded integer draws built on a single
//! unit-interval source.
//!
//! Every random decision in the engine goes through [`RandomSource`], which
//! only has to produce floats in `[0, 1)`. The helper methods derive chances,
//! inclusive and half-open integer ranges, die rolls and index picks from that
//! one primitive, so a test can script the exact outcome of every draw with
//! [`ScriptedRandom`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::fmt::Debug;

/// Source of uniformly distributed unit values.
pub trait RandomSource: Debug {
    /// Returns the next value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Rolls a percentage chance.
    ///
    /// # Panics
    ///
    /// Panics if `percent` is outside `0..=100`. An out-of-range probability
    /// is a caller defect, never a runtime condition.
    ///
    /// # Examples
    ///
    /// ```
    /// use gloomcrawl::{RandomSource, ScriptedRandom};
    ///
    /// let mut rng = ScriptedRandom::new(vec![0.10, 0.90]);
    /// assert!(rng.chance(25));
    /// assert!(!rng.chance(25));
    /// ```
    fn chance(&mut self, percent: u32) -> bool {
        assert!(
            percent <= 100,
            "chance must be between 0 and 100, got {percent}"
        );
        self.next_unit() * 100.0 < percent as f64
    }

    /// Draws an integer in `min..=max`.
    fn int_inclusive(&mut self, min: u32, max: u32) -> u32 {
        assert!(min <= max, "inverted range {min}..={max}");
        let span = (max - min + 1) as f64;
        min + ((self.next_unit() * span).floor() as u32).min(max - min)
    }

    /// Draws an integer in `min..max`. Returns `min` when the range is empty.
    fn between(&mut self, min: u32, max: u32) -> u32 {
        assert!(min <= max, "min must be less than or equal to max ({min} > {max})");
        if min == max {
            // Still consume a draw so scripted sequences stay aligned.
            let _ = self.next_unit();
            return min;
        }
        let span = (max - min) as f64;
        min + ((self.next_unit() * span).floor() as u32).min(max - min - 1)
    }

    /// Rolls a die with the given number of sides, returning `1..=sides`.
    fn roll(&mut self, sides: u32) -> u32 {
        self.int_inclusive(1, sides)
    }

    /// Picks an index into a collection of `len` elements.
    fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot pick from an empty collection");
        ((self.next_unit() * len as f64).floor() as usize).min(len - 1)
    }
}

/// Seeded random source used for real runs.
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: StdRng,
    seed: u64,
}

impl GameRng {
    /// Creates a new source from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Creates a source with a random seed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Gets the seed used to create this source.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for GameRng {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Random source replaying a fixed list of unit values.
///
/// Once the script runs out, every further draw returns the fallback value
/// (by default just below 1.0, which fails every chance and picks the top of
/// every range).
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: VecDeque<f64>,
    fallback: f64,
    consumed: usize,
}

impl ScriptedRandom {
    /// A unit value that passes any non-zero chance.
    pub const PASS: f64 = 0.0;
    /// A unit value that fails any chance below 100.
    pub const FAIL: f64 = 0.999;

    /// Creates a scripted source.
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values: values.into(),
            fallback: Self::FAIL,
            consumed: 0,
        }
    }

    /// Replaces the value returned after the script is exhausted.
    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    /// Appends more values to the script.
    pub fn push(&mut self, values: impl IntoIterator<Item = f64>) {
        self.values.extend(values);
    }

    /// Number of values drawn so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of scripted values not yet drawn.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// The unit value that makes `roll(sides)` return `face`.
    pub fn face(face: u32, sides: u32) -> f64 {
        (face as f64 - 0.5) / sides as f64
    }

    /// The unit value that makes `int_inclusive(min, max)` or
    /// `between(min, max + 1)` return `value`.
    pub fn value_in(value: u32, min: u32, max: u32) -> f64 {
        (value - min) as f64 / (max - min + 1) as f64 + 0.5 / (max - min + 1) as f64
    }

    /// The unit value that makes `index(len)` return `index`.
    pub fn pick(index: usize, len: usize) -> f64 {
        (index as f64 + 0.5) / len as f64
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        self.consumed += 1;
        self.values.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chance_boundaries() {
        let mut rng = ScriptedRandom::new(vec![0.0, 0.0, 0.999, 0.25, 0.2499]);
        assert!(!rng.chance(0));
        assert!(rng.chance(100));
        assert!(rng.chance(100));
        assert!(!rng.chance(25));
        assert!(rng.chance(25));
    }

    #[test]
    #[should_panic(expected = "chance must be between 0 and 100")]
    fn test_chance_out_of_range_panics() {
        let mut rng = ScriptedRandom::new(vec![0.5]);
        rng.chance(101);
    }

    #[test]
    #[should_panic]
    fn test_between_inverted_bounds_panics() {
        let mut rng = ScriptedRandom::new(vec![0.5]);
        rng.between(5, 3);
    }

    #[test]
    fn test_int_inclusive_covers_both_ends() {
        let mut rng = ScriptedRandom::new(vec![0.0, 0.999]);
        assert_eq!(rng.int_inclusive(3, 7), 3);
        assert_eq!(rng.int_inclusive(3, 7), 7);
    }

    #[test]
    fn test_between_is_half_open() {
        let mut rng = ScriptedRandom::new(vec![0.0, 0.999, 0.5]);
        assert_eq!(rng.between(25, 35), 25);
        assert_eq!(rng.between(25, 35), 34);
        assert_eq!(rng.between(2, 3), 2);
    }

    #[test]
    fn test_scripted_helpers_round_trip() {
        let mut rng = ScriptedRandom::new(vec![
            ScriptedRandom::face(10, 20),
            ScriptedRandom::face(1, 6),
            ScriptedRandom::value_in(42, 40, 49),
            ScriptedRandom::pick(2, 4),
        ]);
        assert_eq!(rng.roll(20), 10);
        assert_eq!(rng.roll(6), 1);
        assert_eq!(rng.between(40, 50), 42);
        assert_eq!(rng.index(4), 2);
        assert_eq!(rng.consumed(), 4);
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn test_scripted_fallback() {
        let mut rng = ScriptedRandom::new(vec![]).with_fallback(ScriptedRandom::PASS);
        assert!(rng.chance(1));
        assert_eq!(rng.roll(20), 1);
    }

    #[test]
    fn test_game_rng_stays_in_range() {
        let mut rng = GameRng::new(12345);
        assert_eq!(rng.seed(), 12345);
        for _ in 0..1000 {
            let roll = rng.roll(20);
            assert!((1..=20).contains(&roll));
            let value = rng.between(7, 12);
            assert!((7..12).contains(&value));
        }
    }

    #[test]
    fn test_game_rng_is_reproducible() {
        let mut a = GameRng::new(99);
        let mut b = GameRng::new(99);
        for _ in 0..32 {
            assert_eq!(a.next_unit(), b.next_unit());
        }
    }
}
