use crate::config::ConfigError;
use crate::resource::{Quantity, Resource, ResourceMap, quantity_of};

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// A named conversion rule: one batch of inputs becomes one batch of outputs.
///
/// Immutable once built. Running a recipe never involves randomness; the
/// same pool always yields the same outputs and the same pool mutation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Recipe<K: Resource> {
    name: String,
    inputs: ResourceMap<K>,
    outputs: ResourceMap<K>,
    /// Ticks one cycle should take. Only consulted under [`CyclePolicy::Gated`].
    cycle_time: u32,
}

impl<K: Resource> Recipe<K> {
    /// Build a recipe from `(kind, quantity)` lists.
    ///
    /// Rejects empty outputs, zero quantities, a kind listed twice on the
    /// same side, and a zero cycle time.
    pub fn new(
        name: impl Into<String>,
        inputs: impl IntoIterator<Item = (K, Quantity)>,
        outputs: impl IntoIterator<Item = (K, Quantity)>,
        cycle_time: u32,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        let inputs = collect_entries(&name, inputs)?;
        let outputs = collect_entries(&name, outputs)?;
        if outputs.is_empty() {
            return Err(ConfigError::EmptyOutputs(name));
        }
        if cycle_time == 0 {
            return Err(ConfigError::ZeroCycleTime(name));
        }
        Ok(Self {
            name,
            inputs,
            outputs,
            cycle_time,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &ResourceMap<K> {
        &self.inputs
    }

    pub fn outputs(&self) -> &ResourceMap<K> {
        &self.outputs
    }

    pub fn cycle_time(&self) -> u32 {
        self.cycle_time
    }

    /// True iff the pool holds at least the required quantity of every input.
    pub fn can_run(&self, pool: &ResourceMap<K>) -> bool {
        self.inputs
            .iter()
            .all(|(&kind, &need)| quantity_of(pool, kind) >= need)
    }

    /// Consume one batch of inputs from `pool` and return a fresh copy of the
    /// outputs. When the inputs are not all present the pool is untouched and
    /// the returned map is empty.
    pub fn run(&self, pool: &mut ResourceMap<K>) -> ResourceMap<K> {
        if !self.can_run(pool) {
            return ResourceMap::new();
        }
        for (&kind, &need) in &self.inputs {
            if let Some(held) = pool.get_mut(&kind) {
                *held -= need;
                if *held == 0 {
                    pool.remove(&kind);
                }
            }
        }
        self.outputs.clone()
    }
}

fn collect_entries<K: Resource>(
    recipe: &str,
    entries: impl IntoIterator<Item = (K, Quantity)>,
) -> Result<ResourceMap<K>, ConfigError> {
    let mut map = ResourceMap::new();
    for (kind, quantity) in entries {
        if quantity == 0 {
            return Err(ConfigError::ZeroQuantity {
                recipe: recipe.to_string(),
                kind: format!("{kind:?}"),
            });
        }
        if map.insert(kind, quantity).is_some() {
            return Err(ConfigError::DuplicateEntry {
                recipe: recipe.to_string(),
                kind: format!("{kind:?}"),
            });
        }
    }
    Ok(map)
}

// ---------------------------------------------------------------------------
// Cycle policy
// ---------------------------------------------------------------------------

/// Whether a recipe's `cycle_time` throttles how often it fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Every tick processes one full batch; `cycle_time` is metadata only.
    #[default]
    EveryTick,
    /// A recipe fires at most once per `cycle_time` ticks.
    Gated,
}

/// Per-recipe progress under [`CyclePolicy::Gated`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub struct RecipeState {
    pub progress: u32,
}

impl RecipeState {
    /// Count one tick toward the next cycle, holding at `cycle_time`.
    pub fn advance(&mut self, cycle_time: u32) {
        self.progress = self.progress.saturating_add(1).min(cycle_time);
    }

    pub fn is_due(&self, cycle_time: u32) -> bool {
        self.progress >= cycle_time
    }

    pub fn reset(&mut self) {
        self.progress = 0;
    }
}

// ===========================================================================
// Tests
// ===========================================================================
