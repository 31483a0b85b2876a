//! Sources of peg deflections.
//!
//! The simulator never touches an ambient random stream; callers hand it a
//! [`BounceSource`]. Production code wraps a real RNG in [`RandomBounces`],
//! tests script exact sequences with [`ScriptedBounces`].

use rand::Rng;

use crate::types::Step;

pub trait BounceSource {
    /// Draw the next deflection. Left and right must be equally likely for a fair board.
    fn next_step(&mut self) -> Step;
}

/// Fair coin flips drawn from any `rand` generator
#[derive(Debug, Clone)]
pub struct RandomBounces<R> {
    rng: R,
}

impl<R: Rng> RandomBounces<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: Rng> BounceSource for RandomBounces<R> {
    fn next_step(&mut self) -> Step {
        if self.rng.gen_bool(0.5) {
            Step::Right
        } else {
            Step::Left
        }
    }
}

/// Replays a fixed step sequence, wrapping around when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedBounces {
    steps: Vec<Step>,
    cursor: usize,
}

impl ScriptedBounces {
    /// # Panics
    /// If `steps` is empty.
    pub fn new(steps: Vec<Step>) -> Self {
        assert!(!steps.is_empty(), "ScriptedBounces needs at least one step");
        Self { steps, cursor: 0 }
    }

    pub fn constant(step: Step) -> Self {
        Self::new(vec![step])
    }
}

impl BounceSource for ScriptedBounces {
    fn next_step(&mut self) -> Step {
        let step = self.steps[self.cursor];
        self.cursor = (self.cursor + 1) % self.steps.len();
        step
    }
}
