//! Weighted recipe outputs.

use crate::context::ItemStack;
use interactio_core::Identifier;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One thing a recipe can produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CraftOutput {
    /// An item stack dropped at the crafting position.
    Item(ItemStack),
    /// A block placed at the crafting position.
    Block(Identifier),
    /// A fluid placed at the crafting position.
    Fluid(Identifier),
}

impl CraftOutput {
    /// Whether applying this output puts something into the world grid.
    pub fn places_in_world(&self) -> bool {
        matches!(self, Self::Block(_) | Self::Fluid(_))
    }
}

/// Weighted distribution of outputs, rolled once per craft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedOutput {
    entries: Vec<(CraftOutput, u32)>,
    /// Weight of rolling nothing at all.
    #[serde(default)]
    pub empty_weight: u32,
    /// Number of independent rolls per craft.
    #[serde(default = "default_rolls")]
    pub rolls: u32,
    /// Whether one entry may be picked at most once per craft.
    #[serde(default)]
    pub unique: bool,
}

fn default_rolls() -> u32 {
    1
}

impl WeightedOutput {
    /// Always produce exactly `output`.
    pub fn single(output: CraftOutput) -> Self {
        Self::weighted(vec![(output, 1)])
    }

    /// Pick one of the weighted entries per roll.
    pub fn weighted(entries: Vec<(CraftOutput, u32)>) -> Self {
        Self {
            entries,
            empty_weight: 0,
            rolls: 1,
            unique: false,
        }
    }

    /// Set the weight of rolling nothing.
    pub fn with_empty_weight(mut self, weight: u32) -> Self {
        self.empty_weight = weight;
        self
    }

    /// Set the number of rolls.
    pub fn with_rolls(mut self, rolls: u32) -> Self {
        self.rolls = rolls;
        self
    }

    /// Forbid picking the same entry twice in one craft.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// The weighted entries.
    pub fn entries(&self) -> &[(CraftOutput, u32)] {
        &self.entries
    }

    /// Whether any entry could place a block or fluid.
    pub fn can_place_in_world(&self) -> bool {
        self.entries.iter().any(|(output, _)| output.places_in_world())
    }

    /// Sum of every entry weight plus `empty_weight`, or `None` if it
    /// does not fit in a `u32`.
    pub fn total_weight(&self) -> Option<u32> {
        self.entries
            .iter()
            .try_fold(self.empty_weight, |total, (_, weight)| total.checked_add(*weight))
    }

    /// Roll the distribution.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<CraftOutput> {
        let mut picked = Vec::new();
        let mut taken = vec![false; self.entries.len()];
        let empty_weight = u64::from(self.empty_weight);

        for _ in 0..self.rolls {
            let available: u64 = self
                .entries
                .iter()
                .zip(&taken)
                .filter(|(_, taken)| !**taken)
                .map(|((_, weight), _)| u64::from(*weight))
                .sum();
            let total = available + empty_weight;
            if total == 0 {
                break;
            }

            let mut ticket = rng.gen_range(0..total);
            if ticket < empty_weight {
                continue;
            }
            ticket -= empty_weight;

            for (index, (output, weight)) in self.entries.iter().enumerate() {
                if taken[index] {
                    continue;
                }
                let weight = u64::from(*weight);
                if ticket < weight {
                    picked.push(output.clone());
                    if self.unique {
                        taken[index] = true;
                    }
                    break;
                }
                ticket -= weight;
            }
        }

        picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    #[test]
    fn single_output_always_rolls() {
        let output = WeightedOutput::single(CraftOutput::Block(id("gravel")));
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..16 {
            assert_eq!(output.roll(&mut rng), vec![CraftOutput::Block(id("gravel"))]);
        }
    }

    #[test]
    fn empty_weight_only_yields_nothing() {
        let output = WeightedOutput::weighted(vec![(CraftOutput::Block(id("gravel")), 0)])
            .with_empty_weight(5);
        let mut rng = StdRng::seed_from_u64(2);
        assert!(output.roll(&mut rng).is_empty());
    }

    #[test]
    fn unique_rolls_never_repeat() {
        let output = WeightedOutput::weighted(vec![
            (CraftOutput::Block(id("sand")), 3),
            (CraftOutput::Block(id("gravel")), 1),
        ])
        .with_rolls(5)
        .unique();
        let mut rng = StdRng::seed_from_u64(3);
        let rolled = output.roll(&mut rng);
        assert_eq!(rolled.len(), 2);
        assert_ne!(rolled[0], rolled[1]);
    }

    #[test]
    fn total_weight_detects_overflow() {
        let fits = WeightedOutput::weighted(vec![
            (CraftOutput::Block(id("sand")), 3),
            (CraftOutput::Block(id("gravel")), 1),
        ])
        .with_empty_weight(2);
        assert_eq!(fits.total_weight(), Some(6));

        let huge = WeightedOutput::weighted(vec![
            (CraftOutput::Block(id("sand")), u32::MAX),
            (CraftOutput::Block(id("gravel")), 2),
        ]);
        assert_eq!(huge.total_weight(), None);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(huge.roll(&mut rng).len(), 1);
    }

    #[test]
    fn rolls_respect_count() {
        let output = WeightedOutput::single(CraftOutput::Item(ItemStack::new(id("flint"), 1)))
            .with_rolls(3);
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(output.roll(&mut rng).len(), 3);
    }
}
