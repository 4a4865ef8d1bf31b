//! # Dice
//!
//! Inclusive random-integer source used for every roll the engine makes.

use rand::rngs::StdRng;
use rand::Rng;
use std::collections::VecDeque;

/// Random integers in an inclusive range.
pub trait Dice {
    /// Rolls a value in `low..=high`. Returns `low` when `high <= low`.
    fn between(&mut self, low: i32, high: i32) -> i32;
}

impl Dice for StdRng {
    fn between(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            low
        } else {
            self.gen_range(low..=high)
        }
    }
}

/// Replays a fixed sequence of rolls.
///
/// Each roll is clamped into the requested range. Once the script runs out
/// every roll returns the low end of the range.
///
/// # Examples
///
/// ```
/// use overworld_encounters::{Dice, ScriptedDice};
///
/// let mut dice = ScriptedDice::new([80, 500]);
/// assert_eq!(dice.between(1, 100), 80);
/// assert_eq!(dice.between(1, 100), 100);
/// assert_eq!(dice.between(1, 100), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<i32>,
    consumed: usize,
}

impl ScriptedDice {
    /// Creates dice that replay `rolls` in order.
    pub fn new(rolls: impl IntoIterator<Item = i32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Number of rolls made so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of scripted rolls not yet used.
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl Dice for ScriptedDice {
    fn between(&mut self, low: i32, high: i32) -> i32 {
        self.consumed += 1;
        match self.rolls.pop_front() {
            Some(roll) if high > low => roll.clamp(low, high),
            _ => low,
        }
    }
}
