//! Facility configuration: the declarative description of one building type.
//!
//! Each building type is just a [`FacilityConfig`] value. The
//! [`FacilityBuilder`] collects the pieces and validates them in one place;
//! a config that fails validation can never be turned into a facility.

use std::collections::{BTreeSet, HashSet};

use crate::bonus::BonusConfig;
use crate::recipe::{CyclePolicy, Recipe};
use crate::resource::{Quantity, Resource};
use crate::workforce::EfficiencyCurve;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons a facility configuration is rejected at construction time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{storage} storage capacity must be greater than zero")]
    ZeroCapacity { storage: &'static str },
    #[error("maximum workforce must be greater than zero")]
    ZeroWorkforce,
    #[error("efficiency curve field {field} is not finite: {value}")]
    InvalidCurve { field: &'static str, value: f64 },
    #[error("facility has no recipes")]
    EmptyRecipeList,
    #[error("duplicate recipe name: {0}")]
    DuplicateRecipe(String),
    #[error("recipe {0} has no outputs")]
    EmptyOutputs(String),
    #[error("recipe {recipe} lists {kind} with quantity zero")]
    ZeroQuantity { recipe: String, kind: String },
    #[error("recipe {recipe} lists {kind} more than once")]
    DuplicateEntry { recipe: String, kind: String },
    #[error("recipe {recipe} consumes undeclared resource {kind}")]
    UndeclaredInput { recipe: String, kind: String },
    #[error("recipe {recipe} produces {kind}, which is not a declared product")]
    UndeclaredOutput { recipe: String, kind: String },
    #[error("{0} is declared as both a material and a product")]
    OverlappingKind(String),
    #[error("recipe {0} has a cycle time of zero")]
    ZeroCycleTime(String),
    #[error("bonus field {field} is out of range: {value}")]
    InvalidBonus { field: &'static str, value: f64 },
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Everything needed to construct a production facility.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FacilityConfig<K: Resource> {
    pub name: String,
    pub material_capacity: Quantity,
    pub product_capacity: Quantity,
    /// Kinds the input storage accepts.
    pub materials: BTreeSet<K>,
    /// Kinds recipes may produce; they live in the output storage.
    pub products: BTreeSet<K>,
    pub max_workforce: u32,
    pub curve: EfficiencyCurve,
    /// Run order within a tick.
    pub recipes: Vec<Recipe<K>>,
    pub cycle_policy: CyclePolicy,
    pub bonus: Option<BonusConfig>,
}

impl<K: Resource> FacilityConfig<K> {
    /// Check every structural rule. Recipes are already individually valid
    /// (see [`Recipe::new`]); this checks them against the facility.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.material_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                storage: "material",
            });
        }
        if self.product_capacity == 0 {
            return Err(ConfigError::ZeroCapacity { storage: "product" });
        }
        if self.max_workforce == 0 {
            return Err(ConfigError::ZeroWorkforce);
        }
        self.curve.validate()?;
        if let Some(bonus) = &self.bonus {
            bonus.validate()?;
        }

        if let Some(kind) = self.materials.intersection(&self.products).next() {
            return Err(ConfigError::OverlappingKind(format!("{kind:?}")));
        }

        if self.recipes.is_empty() {
            return Err(ConfigError::EmptyRecipeList);
        }

        let mut names = HashSet::new();
        for recipe in &self.recipes {
            if !names.insert(recipe.name()) {
                return Err(ConfigError::DuplicateRecipe(recipe.name().to_string()));
            }
            for kind in recipe.inputs().keys() {
                if !self.materials.contains(kind) && !self.products.contains(kind) {
                    return Err(ConfigError::UndeclaredInput {
                        recipe: recipe.name().to_string(),
                        kind: format!("{kind:?}"),
                    });
                }
            }
            for kind in recipe.outputs().keys() {
                if !self.products.contains(kind) {
                    return Err(ConfigError::UndeclaredOutput {
                        recipe: recipe.name().to_string(),
                        kind: format!("{kind:?}"),
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Fluent builder for [`FacilityConfig`].
///
/// Recipe errors are held until [`FacilityBuilder::build`] so a whole table
/// can be written as one chain.
#[derive(Debug)]
pub struct FacilityBuilder<K: Resource> {
    name: String,
    material_capacity: Quantity,
    product_capacity: Quantity,
    materials: BTreeSet<K>,
    products: BTreeSet<K>,
    max_workforce: u32,
    curve: EfficiencyCurve,
    recipes: Vec<Result<Recipe<K>, ConfigError>>,
    cycle_policy: CyclePolicy,
    bonus: Option<BonusConfig>,
}

impl<K: Resource> FacilityBuilder<K> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            material_capacity: 0,
            product_capacity: 0,
            materials: BTreeSet::new(),
            products: BTreeSet::new(),
            max_workforce: 0,
            curve: EfficiencyCurve::default(),
            recipes: Vec::new(),
            cycle_policy: CyclePolicy::default(),
            bonus: None,
        }
    }

    pub fn material_capacity(mut self, capacity: Quantity) -> Self {
        self.material_capacity = capacity;
        self
    }

    pub fn product_capacity(mut self, capacity: Quantity) -> Self {
        self.product_capacity = capacity;
        self
    }

    pub fn materials(mut self, kinds: impl IntoIterator<Item = K>) -> Self {
        self.materials.extend(kinds);
        self
    }

    pub fn products(mut self, kinds: impl IntoIterator<Item = K>) -> Self {
        self.products.extend(kinds);
        self
    }

    pub fn workforce(mut self, max: u32, curve: EfficiencyCurve) -> Self {
        self.max_workforce = max;
        self.curve = curve;
        self
    }

    /// Append a recipe to the run order.
    pub fn recipe(
        mut self,
        name: impl Into<String>,
        inputs: impl IntoIterator<Item = (K, Quantity)>,
        outputs: impl IntoIterator<Item = (K, Quantity)>,
        cycle_time: u32,
    ) -> Self {
        self.recipes
            .push(Recipe::new(name, inputs, outputs, cycle_time));
        self
    }

    /// Append an already-built recipe to the run order.
    pub fn with_recipe(mut self, recipe: Recipe<K>) -> Self {
        self.recipes.push(Ok(recipe));
        self
    }

    pub fn cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }

    pub fn bonus(mut self, bonus: BonusConfig) -> Self {
        self.bonus = Some(bonus);
        self
    }

    /// Finalize, surfacing the first recipe error or validation failure.
    pub fn build(self) -> Result<FacilityConfig<K>, ConfigError> {
        let recipes = self.recipes.into_iter().collect::<Result<Vec<_>, _>>()?;
        let config = FacilityConfig {
            name: self.name,
            material_capacity: self.material_capacity,
            product_capacity: self.product_capacity,
            materials: self.materials,
            products: self.products,
            max_workforce: self.max_workforce,
            curve: self.curve,
            recipes,
            cycle_policy: self.cycle_policy,
            bonus: self.bonus,
        };
        config.validate()?;
        Ok(config)
    }
}
