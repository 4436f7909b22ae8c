//! Seasonal yield bonus, injected as data instead of a global random source.

use std::hash::Hasher;

use crate::config::ConfigError;
use crate::fixed::{Fixed64, f64_to_fixed64, scale_quantity};
use crate::resource::{Resource, ResourceMap};
use crate::rng::SimRng;
use crate::sim::StateHash;

/// On-disk / builder form of a seasonal bonus.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BonusConfig {
    pub seed: u64,
    /// Probability in `[0, 1]` that a firing recipe gets the bonus.
    pub chance: f64,
    /// Output multiplier applied on a hit; at least 1.
    pub multiplier: f64,
}

impl BonusConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.chance.is_finite() || !(0.0..=1.0).contains(&self.chance) {
            return Err(ConfigError::InvalidBonus {
                field: "chance",
                value: self.chance,
            });
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ConfigError::InvalidBonus {
                field: "multiplier",
                value: self.multiplier,
            });
        }
        Ok(())
    }
}

/// Extra yield a facility may receive when a recipe fires.
///
/// Dispatches via enum match. `None` never touches a batch, which keeps the
/// plain production rules exact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum YieldBonus {
    #[default]
    None,
    Seasonal {
        rng: SimRng,
        chance: Fixed64,
        multiplier: Fixed64,
    },
}

impl YieldBonus {
    pub fn from_config(config: Option<&BonusConfig>) -> Self {
        match config {
            None => YieldBonus::None,
            Some(c) => YieldBonus::Seasonal {
                rng: SimRng::new(c.seed),
                chance: f64_to_fixed64(c.chance),
                multiplier: f64_to_fixed64(c.multiplier),
            },
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, YieldBonus::Seasonal { .. })
    }

    /// Roll once for a firing recipe. On a hit every entry of `batch` is
    /// multiplied and floored. `Err(kind)` means a quantity overflowed.
    pub fn apply<K: Resource>(&mut self, batch: ResourceMap<K>) -> Result<ResourceMap<K>, K> {
        let YieldBonus::Seasonal {
            rng,
            chance,
            multiplier,
        } = self
        else {
            return Ok(batch);
        };
        if !rng.chance(*chance) {
            return Ok(batch);
        }
        batch
            .into_iter()
            .map(|(kind, qty)| scale_quantity(qty, *multiplier).map(|q| (kind, q)).ok_or(kind))
            .collect()
    }

    pub(crate) fn hash_into(&self, hash: &mut StateHash) {
        match self {
            YieldBonus::None => hash.write_u8(0),
            YieldBonus::Seasonal { rng, .. } => {
                hash.write_u8(1);
                hash.write_u64(rng.state());
            }
        }
    }
}
