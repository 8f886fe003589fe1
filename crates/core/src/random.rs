//! Uniform choice primitive shared by every randomized decision in a request.
//!
//! Phrase sampling, type-noun selection, randomized default limits, fallback
//! intent selection and suggestion-template shuffling all go through
//! [`Chooser::choose_index`], so tests can swap in a deterministic source.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait Chooser: Send {
    /// Returns an index in `0..len`. Callers never pass `len == 0`.
    fn choose_index(&mut self, len: usize) -> usize;
}

/// Picks one element of a list.
pub fn pick<'a, T>(chooser: &mut dyn Chooser, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(chooser.choose_index(items.len()))
}

/// Picks one of a fixed set of candidates given inline.
pub fn pick_of<T, const N: usize>(chooser: &mut dyn Chooser, candidates: [T; N]) -> Option<T> {
    if N == 0 {
        return None;
    }
    let index = chooser.choose_index(N);
    candidates.into_iter().nth(index)
}

/// Uniform integer in `low..=high`.
pub fn between(chooser: &mut dyn Chooser, low: u32, high: u32) -> u32 {
    if high <= low {
        return low;
    }
    let span = (high - low) as usize + 1;
    low + chooser.choose_index(span) as u32
}

/// Fisher-Yates shuffle.
pub fn shuffle<T>(chooser: &mut dyn Chooser, items: &mut [T]) {
    for upper in (1..items.len()).rev() {
        let swap_with = chooser.choose_index(upper + 1);
        items.swap(upper, swap_with);
    }
}

/// Production source backed by a seedable PRNG.
#[derive(Debug)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl Chooser for RandomSource {
    fn choose_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

/// Always takes the first candidate.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstChoice;

impl Chooser for FirstChoice {
    fn choose_index(&mut self, _len: usize) -> usize {
        0
    }
}

/// Replays a fixed script of indices (each reduced modulo the candidate
/// count), then keeps choosing the first candidate.
#[derive(Clone, Debug, Default)]
pub struct ScriptedChoice {
    script: VecDeque<usize>,
}

impl ScriptedChoice {
    pub fn new(script: impl IntoIterator<Item = usize>) -> Self {
        Self { script: script.into_iter().collect() }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Chooser for ScriptedChoice {
    fn choose_index(&mut self, len: usize) -> usize {
        match (self.script.pop_front(), len) {
            (_, 0) => 0,
            (Some(index), len) => index % len,
            (None, _) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{between, pick, pick_of, shuffle, Chooser, FirstChoice, RandomSource, ScriptedChoice};

    #[test]
    fn pick_uses_the_chosen_index() {
        let mut chooser = ScriptedChoice::new([2]);
        assert_eq!(pick(&mut chooser, &["a", "b", "c"]), Some(&"c"));
        assert_eq!(pick::<&str>(&mut chooser, &[]), None);
    }

    #[test]
    fn pick_of_handles_inline_candidates() {
        let mut chooser = ScriptedChoice::new([1]);
        assert_eq!(pick_of(&mut chooser, ["rock", "paper", "scissors"]), Some("paper"));
        assert_eq!(pick_of(&mut FirstChoice, ["only"]), Some("only"));
    }

    #[test]
    fn between_is_inclusive_on_both_ends() {
        assert_eq!(between(&mut FirstChoice, 3, 7), 3);
        assert_eq!(between(&mut ScriptedChoice::new([4]), 3, 7), 7);
        assert_eq!(between(&mut FirstChoice, 6, 6), 6);
    }

    #[test]
    fn scripted_choice_wraps_and_then_defaults() {
        let mut chooser = ScriptedChoice::new([5]);
        assert_eq!(chooser.choose_index(3), 2);
        assert_eq!(chooser.remaining(), 0);
        assert_eq!(chooser.choose_index(3), 0);
    }

    #[test]
    fn seeded_sources_are_reproducible() {
        let mut first = RandomSource::seeded(42);
        let mut second = RandomSource::seeded(42);
        let left: Vec<usize> = (0..16).map(|_| first.choose_index(10)).collect();
        let right: Vec<usize> = (0..16).map(|_| second.choose_index(10)).collect();
        assert_eq!(left, right);
        assert!(left.iter().all(|index| *index < 10));
    }

    #[test]
    fn shuffle_keeps_every_element() {
        let mut items = [1, 2, 3, 4, 5, 6, 7];
        shuffle(&mut RandomSource::seeded(7), &mut items);
        let mut sorted = items;
        sorted.sort_unstable();
        assert_eq!(sorted, [1, 2, 3, 4, 5, 6, 7]);
    }
}
