//! # Probing Strategies
//!
//! Collision resolution for [`OpenAddressingTable`](super::OpenAddressingTable). A strategy answers two
//! questions for the table:
//!
//! - **Where to look next**: `offset(x)` is added to a key's home bucket on the `x`-th probe attempt.
//! - **Which capacities are usable**: `legalize` and `grow` only hand out capacities for which the probe
//!   sequence is a permutation of every slot, so a walk of `capacity` probes always reaches every bucket.
//!
//! | Strategy                  | `offset(x)`     | Legal capacity            |
//! |---------------------------|-----------------|---------------------------|
//! | `Linear { constant: c }`  | `c * x`         | `gcd(capacity, c) == 1`   |
//! | `Quadratic`               | `(x * x + x)/2` | power of two              |

use num_integer::Integer;

/// Linear probing step used when none is specified.
pub const DEFAULT_LINEAR_CONSTANT: usize = 17;

/// The strategy used for collision resolution in open addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbingStrategy {
    /// Linear probing: slot = (home + constant * x) mod capacity.
    /// Capacities are kept coprime with `constant`.
    Linear { constant: usize },
    /// Quadratic probing on triangular numbers: slot = (home + (x^2 + x) / 2) mod capacity.
    /// Capacities are kept at powers of two.
    Quadratic,
}

impl Default for ProbingStrategy {
    fn default() -> Self {
        ProbingStrategy::Linear {
            constant: DEFAULT_LINEAR_CONSTANT,
        }
    }
}

impl ProbingStrategy {
    /// Linear probing with the given step.
    pub fn linear(constant: usize) -> Self {
        ProbingStrategy::Linear { constant }
    }

    /// Distance from the home bucket on probe attempt `attempt` (attempt 0 is the home bucket itself).
    ///
    /// # Panics
    /// Panics on arithmetic overflow for attempts far beyond any realistic capacity.
    pub fn offset(&self, attempt: usize) -> usize {
        match *self {
            ProbingStrategy::Linear { constant } => constant * attempt,
            ProbingStrategy::Quadratic => (attempt * attempt + attempt) >> 1,
        }
    }

    /// `offset(attempt) mod capacity`, computed without overflow.
    fn offset_mod(&self, attempt: usize, capacity: usize) -> usize {
        let x = attempt as u128;
        let m = capacity as u128;
        let r = match *self {
            ProbingStrategy::Linear { constant } => (constant as u128 % m) * (x % m) % m,
            ProbingStrategy::Quadratic => ((x * x + x) >> 1) % m,
        };
        r as usize
    }

    /// Whether a table of `capacity` slots can be fully searched with this strategy.
    pub fn is_legal(&self, capacity: usize) -> bool {
        match *self {
            ProbingStrategy::Linear { constant } => capacity > 0 && capacity.gcd(&constant) == 1,
            ProbingStrategy::Quadratic => capacity.is_power_of_two(),
        }
    }

    /// Smallest legal capacity that is `>= requested`.
    ///
    /// # Panics
    /// Panics if a linear constant is zero or if no legal capacity fits in `usize`.
    pub fn legalize(&self, requested: usize) -> usize {
        match *self {
            ProbingStrategy::Linear { constant } => {
                assert!(constant != 0, "linear probing constant must be non-zero");
                let mut capacity = requested.max(1);
                while capacity.gcd(&constant) != 1 {
                    capacity = capacity.checked_add(1).expect("capacity overflow");
                }
                capacity
            }
            ProbingStrategy::Quadratic => requested
                .max(1)
                .checked_next_power_of_two()
                .expect("capacity overflow"),
        }
    }

    /// The legal capacity a full table of `capacity` slots grows into.
    ///
    /// Linear probing grows to `legalize(2 * capacity + 1)`; quadratic probing to the next power of two
    /// strictly above `capacity`.
    pub fn grow(&self, capacity: usize) -> usize {
        let requested = match *self {
            ProbingStrategy::Linear { .. } => capacity.checked_mul(2).and_then(|c| c.checked_add(1)),
            ProbingStrategy::Quadratic => capacity.checked_add(1),
        };
        self.legalize(requested.expect("capacity overflow"))
    }

    /// Probe sequence for a key whose home bucket is `home` in a table of `capacity` slots.
    pub fn probe_sequence(&self, home: usize, capacity: usize) -> ProbeSequence {
        ProbeSequence {
            strategy: *self,
            home,
            capacity,
            attempt: 0,
        }
    }
}

/// Slot indices visited by a probe walk, home bucket first.
///
/// The sequence is exactly `capacity` long. Over a legal capacity it is a permutation of
/// `0..capacity`, so exhausting it means every slot has been looked at once.
#[derive(Debug, Clone)]
pub struct ProbeSequence {
    strategy: ProbingStrategy,
    home: usize,
    capacity: usize,
    attempt: usize,
}

impl Iterator for ProbeSequence {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.attempt >= self.capacity {
            return None;
        }
        let offset = self.strategy.offset_mod(self.attempt, self.capacity);
        self.attempt += 1;
        // home < capacity and offset < capacity, so the sum cannot overflow for any
        // capacity a Vec can hold
        Some((self.home + offset) % self.capacity)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.capacity.saturating_sub(self.attempt);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ProbeSequence {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_offsets() {
        let linear = ProbingStrategy::linear(17);
        assert_eq!(linear.offset(0), 0);
        assert_eq!(linear.offset(1), 17);
        assert_eq!(linear.offset(3), 51);

        let quadratic = ProbingStrategy::Quadratic;
        let triangular: Vec<usize> = (0..6).map(|x| quadratic.offset(x)).collect();
        assert_eq!(triangular, vec![0, 1, 3, 6, 10, 15]);
    }

    #[test]
    fn test_linear_legalize_is_coprime() {
        let linear = ProbingStrategy::linear(6);
        // 8, 9 and 10 all share a factor with 6
        assert_eq!(linear.legalize(8), 11);
        assert_eq!(linear.legalize(7), 7);

        let default = ProbingStrategy::default();
        assert_eq!(default, ProbingStrategy::Linear { constant: 17 });
        assert_eq!(default.legalize(17), 18);
        assert_eq!(default.legalize(34), 35);
        for n in 1..500 {
            let cap = default.legalize(n);
            assert!(cap >= n);
            assert!(default.is_legal(cap));
        }
    }

    #[test]
    fn test_quadratic_legalize_is_power_of_two() {
        let quadratic = ProbingStrategy::Quadratic;
        assert_eq!(quadratic.legalize(7), 8);
        assert_eq!(quadratic.legalize(8), 8);
        assert_eq!(quadratic.legalize(9), 16);
        assert!(!quadratic.is_legal(12));
        assert!(quadratic.is_legal(64));
    }

    #[test]
    fn test_grow() {
        assert_eq!(ProbingStrategy::default().grow(7), 15);
        // 2 * 16 + 1 = 33 shares no factor with 17
        assert_eq!(ProbingStrategy::default().grow(16), 33);
        // 2 * 8 + 1 = 17 is a multiple of the constant
        assert_eq!(ProbingStrategy::default().grow(8), 18);
        assert_eq!(ProbingStrategy::Quadratic.grow(8), 16);
        assert_eq!(ProbingStrategy::Quadratic.grow(16), 32);
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn test_zero_linear_constant_panics() {
        ProbingStrategy::linear(0).legalize(8);
    }

    #[test]
    fn test_probe_sequence_matches_offsets() {
        let strategy = ProbingStrategy::linear(17);
        let visited: Vec<usize> = strategy.probe_sequence(3, 7).collect();
        let expected: Vec<usize> = (0..7).map(|x| (3 + strategy.offset(x)) % 7).collect();
        assert_eq!(visited, expected);
    }

    #[test]
    fn test_probe_sequence_covers_legal_capacities() {
        for strategy in [
            ProbingStrategy::linear(17),
            ProbingStrategy::linear(6),
            ProbingStrategy::Quadratic,
        ] {
            let mut capacity = strategy.legalize(7);
            for _ in 0..6 {
                for home in [0, 1, capacity / 2, capacity - 1] {
                    let seq = strategy.probe_sequence(home, capacity);
                    assert_eq!(seq.len(), capacity);
                    let seen: HashSet<usize> = seq.collect();
                    assert_eq!(seen.len(), capacity, "{strategy:?} at capacity {capacity}");
                }
                capacity = strategy.grow(capacity);
            }
        }
    }

    #[test]
    fn test_probe_sequence_large_constant() {
        // the constant would overflow `offset` but the sequence reduces it first
        let strategy = ProbingStrategy::linear(usize::MAX);
        let capacity = strategy.legalize(10);
        let seen: HashSet<usize> = strategy.probe_sequence(0, capacity).collect();
        assert_eq!(seen.len(), capacity);
    }
}
