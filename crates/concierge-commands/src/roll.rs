//! Dice rolling.

use crate::framework::{Context, Error};
use rand::Rng;
use std::str::FromStr;
use thiserror::Error;

/// Most dice per roll.
pub const MAX_DICE: u32 = 100;

/// Most sides per die.
pub const MAX_SIDES: u32 = 1000;

/// Problems with a dice expression.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DiceError {
    /// Not of the form `NdM`.
    #[error("Use the format `NdM`, for example `2d6`.")]
    Format,
    /// Dice count out of range.
    #[error("You can roll between 1 and 100 dice.")]
    Count,
    /// Side count out of range.
    #[error("Dice need between 2 and 1000 sides.")]
    Sides,
}

/// A parsed `NdM` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceSpec {
    /// Number of dice.
    pub count: u32,
    /// Sides per die.
    pub sides: u32,
}

impl Default for DiceSpec {
    fn default() -> Self {
        Self { count: 1, sides: 6 }
    }
}

impl FromStr for DiceSpec {
    type Err = DiceError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let lower = input.trim().to_ascii_lowercase();
        let (count, sides) = lower.split_once('d').ok_or(DiceError::Format)?;

        let count = if count.is_empty() {
            1
        } else {
            count.parse::<u32>().map_err(|_| DiceError::Format)?
        };
        let sides = sides.parse::<u32>().map_err(|_| DiceError::Format)?;

        if !(1..=MAX_DICE).contains(&count) {
            return Err(DiceError::Count);
        }
        if !(2..=MAX_SIDES).contains(&sides) {
            return Err(DiceError::Sides);
        }
        Ok(Self { count, sides })
    }
}

impl DiceSpec {
    /// Rolls every die.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u32> {
        (0..self.count).map(|_| rng.gen_range(1..=self.sides)).collect()
    }
}

/// Text reply for a finished roll.
#[must_use]
pub fn describe_roll(spec: DiceSpec, rolls: &[u32]) -> String {
    let total: u32 = rolls.iter().sum();
    if rolls.len() == 1 {
        return format!("🎲 You rolled **{total}** (d{})", spec.sides);
    }

    let faces: Vec<String> = rolls.iter().map(ToString::to_string).collect();
    format!(
        "🎲 {}d{}: [{}] = **{total}**",
        spec.count,
        spec.sides,
        faces.join(", ")
    )
}

/// Rolls dice, `1d6` by default.
#[poise::command(prefix_command, slash_command)]
pub async fn roll(
    ctx: Context<'_>,
    #[description = "Dice to roll, like 2d6"] dice: Option<String>,
) -> Result<(), Error> {
    let spec = match dice.as_deref().map(str::parse::<DiceSpec>) {
        None => DiceSpec::default(),
        Some(Ok(spec)) => spec,
        Some(Err(e)) => {
            ctx.say(e.to_string()).await?;
            return Ok(());
        }
    };

    let rolls = spec.roll(&mut rand::thread_rng());
    ctx.say(describe_roll(spec, &rolls)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse() {
        assert_eq!("2d6".parse(), Ok(DiceSpec { count: 2, sides: 6 }));
        assert_eq!("d20".parse(), Ok(DiceSpec { count: 1, sides: 20 }));
        assert_eq!(" 3D8 ".parse(), Ok(DiceSpec { count: 3, sides: 8 }));
    }

    #[test]
    fn test_parse_bounds() {
        assert_eq!("0d6".parse::<DiceSpec>(), Err(DiceError::Count));
        assert_eq!("101d6".parse::<DiceSpec>(), Err(DiceError::Count));
        assert_eq!("1d1".parse::<DiceSpec>(), Err(DiceError::Sides));
        assert_eq!("1d1001".parse::<DiceSpec>(), Err(DiceError::Sides));
        assert_eq!("six".parse::<DiceSpec>(), Err(DiceError::Format));
        assert_eq!("2d".parse::<DiceSpec>(), Err(DiceError::Format));
    }

    #[test]
    fn test_rolls_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let spec = DiceSpec { count: 50, sides: 4 };
        let rolls = spec.roll(&mut rng);
        assert_eq!(rolls.len(), 50);
        assert!(rolls.iter().all(|r| (1..=4).contains(r)));
    }

    #[test]
    fn test_describe_roll() {
        assert_eq!(
            describe_roll(DiceSpec::default(), &[4]),
            "🎲 You rolled **4** (d6)"
        );
        assert_eq!(
            describe_roll(DiceSpec { count: 2, sides: 6 }, &[3, 5]),
            "🎲 2d6: [3, 5] = **8**"
        );
    }
}
