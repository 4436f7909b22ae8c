//! Serde data file structs for facility definitions.
//!
//! These structs define the on-disk format for production facilities. They
//! are deserialized from RON, JSON, or TOML data files and then turned into
//! validated [`FacilityConfig`]s through [`FacilityBuilder`].
//!
//! `K` is the building's resource enum. Serde maps its variant names to tags,
//! so `(Wheat, 10)` in RON or `["Wheat", 10]` in JSON/TOML names
//! `Good::Wheat` directly.

use citywork_core::bonus::BonusConfig;
use citywork_core::config::{ConfigError, FacilityBuilder, FacilityConfig};
use citywork_core::recipe::CyclePolicy;
use citywork_core::resource::{Quantity, Resource};
use citywork_core::workforce::EfficiencyCurve;
use serde::Deserialize;

// ===========================================================================
// Facility
// ===========================================================================

/// A facility definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct FacilityData<K> {
    pub name: String,
    pub materials: StorageData<K>,
    pub products: StorageData<K>,
    pub workforce: WorkforceData,
    pub recipes: Vec<RecipeData<K>>,
    #[serde(default)]
    pub cycle_policy: CyclePolicy,
    #[serde(default)]
    pub bonus: Option<BonusData>,
}

/// One of the two storages: how much it holds and which kinds belong in it.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageData<K> {
    pub capacity: Quantity,
    pub kinds: Vec<K>,
}

/// Staffing limit and efficiency curve. The curve defaults to 0.4 / 0.6.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkforceData {
    pub max: u32,
    #[serde(default = "default_base_floor")]
    pub base_floor: f64,
    #[serde(default = "default_scale_per_worker")]
    pub scale_per_worker: f64,
}

fn default_base_floor() -> f64 {
    EfficiencyCurve::default().base_floor
}

fn default_scale_per_worker() -> f64 {
    EfficiencyCurve::default().scale_per_worker
}

/// A recipe definition. Entries use the short tuple form `(Kind, quantity)`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData<K> {
    pub name: String,
    #[serde(default = "Vec::new")]
    pub inputs: Vec<(K, Quantity)>,
    pub outputs: Vec<(K, Quantity)>,
    #[serde(default = "default_cycle_time")]
    pub cycle_time: u32,
}

fn default_cycle_time() -> u32 {
    1
}

/// Seasonal yield bonus.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BonusData {
    #[serde(default)]
    pub seed: u64,
    pub chance: f64,
    pub multiplier: f64,
}

// ===========================================================================
// Conversion
// ===========================================================================

impl<K: Resource> FacilityData<K> {
    /// Validate and convert into an engine configuration.
    pub fn into_config(self) -> Result<FacilityConfig<K>, ConfigError> {
        let mut builder = FacilityBuilder::new(self.name)
            .material_capacity(self.materials.capacity)
            .product_capacity(self.products.capacity)
            .materials(self.materials.kinds)
            .products(self.products.kinds)
            .workforce(
                self.workforce.max,
                EfficiencyCurve::new(self.workforce.base_floor, self.workforce.scale_per_worker),
            )
            .cycle_policy(self.cycle_policy);
        for recipe in self.recipes {
            builder = builder.recipe(recipe.name, recipe.inputs, recipe.outputs, recipe.cycle_time);
        }
        if let Some(bonus) = self.bonus {
            builder = builder.bonus(BonusConfig {
                seed: bonus.seed,
                chance: bonus.chance,
                multiplier: bonus.multiplier,
            });
        }
        builder.build()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
