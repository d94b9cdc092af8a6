//! Deterministic example-driven values for generated mock implementations.
//!
//! The mock back-end fills response fields from their `field_examples`
//! annotations. Without a seed the first example is always chosen, so output
//! is deterministic; with a seed, examples are picked by a seeded RNG — still
//! reproducible for a given seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Value source for a generated mock implementation.
#[derive(Debug)]
pub struct Mock {
    rng: Option<StdRng>,
}

impl Mock {
    /// Deterministic mock: always the first example, zero values elsewhere.
    #[must_use]
    pub fn deterministic() -> Self {
        Self { rng: None }
    }

    /// Seeded mock: examples are picked pseudo-randomly but reproducibly.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }

    fn pick<'a>(&mut self, examples: &[&'a str]) -> Option<&'a str> {
        if examples.is_empty() {
            return None;
        }
        match &mut self.rng {
            None => Some(examples[0]),
            Some(rng) => Some(examples[rng.gen_range(0..examples.len())]),
        }
    }

    /// A string value drawn from the examples, empty when none exist.
    pub fn string(&mut self, examples: &[&str]) -> String {
        self.pick(examples).unwrap_or_default().to_string()
    }

    /// A parsed value drawn from the examples, zero/default when none parse.
    pub fn parsed<T>(&mut self, examples: &[&str]) -> T
    where
        T: std::str::FromStr + Default,
    {
        self.pick(examples)
            .and_then(|e| e.parse().ok())
            .unwrap_or_default()
    }
}

impl Default for Mock {
    fn default() -> Self {
        Self::deterministic()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn deterministic_takes_first_example() {
        let mut mock = Mock::deterministic();
        assert_eq!(mock.string(&["alpha", "beta"]), "alpha");
        assert_eq!(mock.string(&["alpha", "beta"]), "alpha");
    }

    #[test]
    fn no_examples_yields_zero_values() {
        let mut mock = Mock::deterministic();
        assert_eq!(mock.string(&[]), "");
        assert_eq!(mock.parsed::<i64>(&[]), 0);
        assert!(!mock.parsed::<bool>(&[]));
    }

    #[test]
    fn parsed_values_come_from_examples() {
        let mut mock = Mock::deterministic();
        assert_eq!(mock.parsed::<i32>(&["150", "200"]), 150);
        assert!((mock.parsed::<f64>(&["150.5"]) - 150.5).abs() < f64::EPSILON);
        assert!(mock.parsed::<bool>(&["true"]));
    }

    #[test]
    fn unparseable_example_falls_back_to_default() {
        let mut mock = Mock::deterministic();
        assert_eq!(mock.parsed::<i32>(&["not-a-number"]), 0);
    }

    #[test]
    fn same_seed_same_sequence() {
        let examples = ["a", "b", "c", "d", "e"];
        let mut first = Mock::seeded(42);
        let mut second = Mock::seeded(42);
        for _ in 0..16 {
            assert_eq!(first.string(&examples), second.string(&examples));
        }
    }

    #[test]
    fn seeded_picks_stay_within_examples() {
        let examples = ["a", "b"];
        let mut mock = Mock::seeded(7);
        for _ in 0..16 {
            let picked = mock.string(&examples);
            assert!(examples.contains(&picked.as_str()));
        }
    }
}
