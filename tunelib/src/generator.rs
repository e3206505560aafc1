use std::fmt;
use rand::Rng;
use crate::cache_spec::{CacheSpec, Field};
use crate::config::{FieldRange, GenerationBounds};
use crate::error::GenerationError;
use crate::feasibility::Feasibility;

/// How a candidate was produced
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Strategy {
    /// A single field of the incumbent nudged up or down
    Permute,
    /// A fresh uniform draw from the whole space
    Random,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Permute => write!(f, "permutation"),
            Strategy::Random => write!(f, "random restart"),
        }
    }
}

/// Produces feasible candidates, either from scratch or near an existing spec
///
/// Both operations are generate and test loops over [`Feasibility`], capped at
/// `bounds.max_attempts` draws
pub struct CandidateGenerator<R: Rng> {
    feasibility: Feasibility,
    bounds: GenerationBounds,
    rng: R,
}

impl<R: Rng> CandidateGenerator<R> {
    pub fn new(feasibility: Feasibility, bounds: GenerationBounds, rng: R) -> Self {
        Self { feasibility, bounds, rng }
    }

    pub fn feasibility(&self) -> &Feasibility {
        &self.feasibility
    }

    /// Flips a fair coin between the two strategies
    pub fn pick_strategy(&mut self) -> Strategy {
        if self.rng.gen_bool(0.5) {
            Strategy::Permute
        } else {
            Strategy::Random
        }
    }

    pub fn generate(&mut self, strategy: Strategy, base: &CacheSpec) -> Result<CacheSpec, GenerationError> {
        match strategy {
            Strategy::Permute => self.permute(base),
            Strategy::Random => self.random_candidate(),
        }
    }

    /// Draws every field uniformly from its range until the result is feasible
    pub fn random_candidate(&mut self) -> Result<CacheSpec, GenerationError> {
        let bounds = self.bounds;
        for _ in 0..bounds.max_attempts {
            let candidate = CacheSpec {
                c1: self.draw(bounds.capacity),
                b1: self.draw(bounds.block),
                s1: self.draw(bounds.set),
                c2: self.draw(bounds.capacity),
                b2: self.draw(bounds.block),
                s2: self.draw(bounds.set),
                k: self.draw(bounds.policy),
            };
            if self.feasibility.is_valid(&candidate) {
                return Ok(candidate);
            }
        }
        Err(GenerationError::NoFeasibleCandidate { strategy: Strategy::Random, attempts: bounds.max_attempts })
    }

    /// Moves one field of `base` by a small random step until the result is feasible
    ///
    /// Every attempt starts again from `base`, so an accepted candidate differs from it in exactly
    /// one field. A step that would leave the permutation range is dropped and the attempt counts
    /// as a miss, which keeps the walk away from the edges of the space.
    pub fn permute(&mut self, base: &CacheSpec) -> Result<CacheSpec, GenerationError> {
        let bounds = self.bounds;
        for _ in 0..bounds.max_attempts {
            let field = Field::ALL[self.rng.gen_range(0..Field::ALL.len())];
            let step = self.rng.gen_range(1..=bounds.max_step.max(1));
            let current = base.get(field);
            let moved = if self.rng.gen_bool(0.5) {
                current.checked_add(step)
            } else {
                current.checked_sub(step)
            };
            let Some(value) = moved.filter(|v| bounds.permute.contains(*v)) else {
                continue;
            };
            let candidate = base.with(field, value);
            if self.feasibility.is_valid(&candidate) {
                return Ok(candidate);
            }
        }
        Err(GenerationError::NoFeasibleCandidate { strategy: Strategy::Permute, attempts: bounds.max_attempts })
    }

    fn draw(&mut self, range: FieldRange) -> u32 {
        if range.max <= range.min {
            return range.min;
        }
        self.rng.gen_range(range.min..=range.max)
    }
}
