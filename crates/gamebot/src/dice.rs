//! Dice rolls in `XdY[+Z]` notation.

use derive_getters::Getters;
use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, instrument};

/// Most dice a single expression may roll.
pub const MAX_DICE: u32 = 100;

/// Most faces a single die may have.
pub const MAX_SIDES: u32 = 1_000;

/// Largest modifier magnitude.
pub const MAX_MODIFIER: i64 = 1_000_000;

/// Why a dice expression was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DiceError {
    /// Not of the form `XdY`, `XdY+Z` or `XdY-Z`.
    #[display("Invalid dice format {:?}. Example: `2d6` or `1d20+5`.", _0)]
    Format(String),
    /// Zero dice or zero-sided dice.
    #[display("Number of dice and die type must be greater than 0.")]
    NonPositive,
    /// More dice, faces or modifier than a roll allows.
    #[display(
        "At most {} dice of up to {} sides, with a modifier within ±{}.",
        MAX_DICE,
        MAX_SIDES,
        MAX_MODIFIER
    )]
    TooLarge,
}

impl std::error::Error for DiceError {}

/// A parsed dice expression.
///
/// Only built by parsing, so every field is within the `MAX_*` bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Getters)]
pub struct DiceSpec {
    /// How many dice to roll.
    count: u32,
    /// Faces per die.
    sides: u32,
    /// Added to the sum of the rolls.
    modifier: i64,
}

/// Outcome of rolling a [`DiceSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct DiceRoll {
    /// Individual die results, each in `1..=sides`.
    rolls: Vec<u32>,
    /// Modifier applied.
    modifier: i64,
    /// Sum of rolls plus modifier.
    total: i64,
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Roll: {:?}, Total: {}", self.rolls, self.total)
    }
}

impl FromStr for DiceSpec {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let format_err = || DiceError::Format(s.to_string());

        let (count, rest) = lowered.split_once('d').ok_or_else(format_err)?;
        let (sides, modifier) = if let Some((sides, m)) = rest.split_once('+') {
            (sides, m.parse::<i64>().map_err(|_| format_err())?)
        } else if let Some((sides, m)) = rest.split_once('-') {
            let m = m.parse::<i64>().map_err(|_| format_err())?;
            (sides, m.checked_neg().ok_or(DiceError::TooLarge)?)
        } else {
            (rest, 0)
        };

        let count: u32 = count.parse().map_err(|_| format_err())?;
        let sides: u32 = sides.parse().map_err(|_| format_err())?;
        if count == 0 || sides == 0 {
            return Err(DiceError::NonPositive);
        }
        if count > MAX_DICE
            || sides > MAX_SIDES
            || !(-MAX_MODIFIER..=MAX_MODIFIER).contains(&modifier)
        {
            debug!(count, sides, modifier, "Dice expression out of range");
            return Err(DiceError::TooLarge);
        }

        Ok(Self {
            count,
            sides,
            modifier,
        })
    }
}

impl DiceSpec {
    /// Rolls every die once. The parse bounds keep the total far inside
    /// `i64`.
    #[instrument(skip(rng))]
    pub fn roll(&self, rng: &mut impl Rng) -> DiceRoll {
        let rolls: Vec<u32> = (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides))
            .collect();
        let sum: i64 = rolls.iter().map(|r| i64::from(*r)).sum();
        let total = sum.saturating_add(self.modifier);
        debug!(?rolls, total, "Dice rolled");
        DiceRoll {
            rolls,
            modifier: self.modifier,
            total,
        }
    }
}
