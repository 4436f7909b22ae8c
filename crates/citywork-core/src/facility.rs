//! The production facility and its per-tick orchestration.
//!
//! # Tick pipeline
//!
//! Each call to [`ProductionFacility::run_tick`] runs:
//!
//! 1. **Gate** -- zero efficiency returns at once; nothing is touched.
//! 2. **Seed** -- materials and products are copied into one working pool.
//! 3. **Recipe pass** -- recipes run in configured order against the pool.
//!    Each firing batch is (optionally) bonus-multiplied, scaled by
//!    efficiency and floored, then merged back into the pool so later
//!    recipes in the same tick can consume it.
//! 4. **Materials commit** -- the input storage becomes the pool restricted
//!    to material kinds.
//! 5. **Products commit** -- net product changes are applied to the output
//!    storage; additions beyond free capacity are discarded and reported as
//!    [`OverflowNotice`]s.
//!
//! Steps 2-5 run against staged copies. The facility only swaps them in when
//! the whole pass succeeds, so an internal fault leaves it exactly as it was.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use tracing::{debug, error, trace, warn};

use crate::bonus::YieldBonus;
use crate::config::{ConfigError, FacilityConfig};
use crate::recipe::{CyclePolicy, Recipe, RecipeState};
use crate::report::{FacilityReport, OverflowNotice, TickFault, TickReport, TickStatus};
use crate::resource::{Quantity, Resource, ResourceMap, merge_into, quantity_of};
use crate::sim::StateHash;
use crate::storage::Storage;
use crate::workforce::Workforce;

/// A building that turns materials into products through an ordered list of
/// recipes, once per tick.
#[derive(Debug, Clone)]
pub struct ProductionFacility<K: Resource> {
    name: String,
    materials: Storage<K>,
    products: Storage<K>,
    material_kinds: BTreeSet<K>,
    product_kinds: BTreeSet<K>,
    recipes: Vec<Recipe<K>>,
    recipe_states: Vec<RecipeState>,
    cycle_policy: CyclePolicy,
    workforce: Workforce,
    bonus: YieldBonus,
}

/// Everything a successful pass would change, held until commit.
struct StagedTick<K: Resource> {
    materials: Storage<K>,
    products: Storage<K>,
    recipe_states: Vec<RecipeState>,
    bonus: YieldBonus,
    fired: Vec<usize>,
    consumed: ResourceMap<K>,
    produced: ResourceMap<K>,
    overflow: Vec<OverflowNotice<K>>,
}

fn overflow_fault<K: Resource>(kind: K) -> TickFault {
    TickFault::QuantityOverflow {
        kind: format!("{kind:?}"),
    }
}

/// Scale every entry by `efficiency` and floor; entries that reach zero are
/// dropped.
fn scale_batch<K: Resource>(batch: ResourceMap<K>, efficiency: f64) -> ResourceMap<K> {
    batch
        .into_iter()
        .filter_map(|(kind, qty)| {
            let scaled = (f64::from(qty) * efficiency).floor();
            // efficiency <= 1, so the scaled value never exceeds qty.
            (scaled >= 1.0).then(|| (kind, scaled as Quantity))
        })
        .collect()
}

impl<K: Resource> ProductionFacility<K> {
    /// Build a facility from a configuration, failing fast if it is malformed.
    /// The facility starts empty and unstaffed.
    pub fn new(config: FacilityConfig<K>) -> Result<Self, ConfigError> {
        config.validate()?;
        let workforce = Workforce::new(config.max_workforce, config.curve)?;
        let bonus = YieldBonus::from_config(config.bonus.as_ref());
        let recipe_states = vec![RecipeState::default(); config.recipes.len()];

        Ok(Self {
            name: config.name,
            materials: Storage::new(config.material_capacity),
            products: Storage::new(config.product_capacity),
            material_kinds: config.materials,
            product_kinds: config.products,
            recipes: config.recipes,
            recipe_states,
            cycle_policy: config.cycle_policy,
            workforce,
            bonus,
        })
    }

    /// Replace the yield bonus source.
    pub fn with_bonus(mut self, bonus: YieldBonus) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn recipes(&self) -> &[Recipe<K>] {
        &self.recipes
    }

    pub fn recipe_states(&self) -> &[RecipeState] {
        &self.recipe_states
    }

    pub fn cycle_policy(&self) -> CyclePolicy {
        self.cycle_policy
    }

    pub fn materials(&self) -> &Storage<K> {
        &self.materials
    }

    pub fn products(&self) -> &Storage<K> {
        &self.products
    }

    pub fn workforce(&self) -> &Workforce {
        &self.workforce
    }

    pub fn efficiency(&self) -> f64 {
        self.workforce.efficiency()
    }

    // -----------------------------------------------------------------------
    // Boundary operations
    // -----------------------------------------------------------------------

    /// Deliver raw material. False (and no change) if the kind is not a
    /// declared material or the input storage cannot take all of it.
    #[must_use = "false means the delivery had no effect"]
    pub fn add_raw_material(&mut self, kind: K, amount: Quantity) -> bool {
        if !self.material_kinds.contains(&kind) {
            trace!(target: "citywork::facility", facility = %self.name, kind = ?kind, "rejected undeclared material");
            return false;
        }
        self.materials.try_add(kind, amount)
    }

    /// Take finished product out. False (and no change) if not enough is held.
    #[must_use = "false means nothing was taken"]
    pub fn consume_product(&mut self, kind: K, amount: Quantity) -> bool {
        self.products.try_remove(kind, amount)
    }

    pub fn material_snapshot(&self) -> ResourceMap<K> {
        self.materials.snapshot()
    }

    pub fn product_snapshot(&self) -> ResourceMap<K> {
        self.products.snapshot()
    }

    /// Assign workers, clamped to the configured maximum.
    pub fn set_workforce(&mut self, count: u32) {
        self.workforce.set_assigned(count);
    }

    pub fn report(&self) -> FacilityReport {
        FacilityReport {
            name: self.name.clone(),
            workforce: self.workforce.assigned(),
            max_workforce: self.workforce.max(),
            efficiency: self.efficiency(),
            material_total: self.materials.total(),
            material_capacity: self.materials.capacity(),
            product_total: self.products.total(),
            product_capacity: self.products.capacity(),
            recipe_count: self.recipes.len(),
            bonus_active: self.bonus.is_active(),
        }
    }

    /// Hash of all mutable state: storages, recipe progress, staffing and
    /// the bonus generator.
    pub fn state_hash(&self) -> u64 {
        let mut hash = StateHash::new();
        for storage in [&self.materials, &self.products] {
            hash.write_usize(storage.contents().len());
            for (kind, &qty) in storage.contents() {
                kind.hash(&mut hash);
                hash.write_u32(qty);
            }
        }
        for state in &self.recipe_states {
            hash.write_u32(state.progress);
        }
        hash.write_u32(self.workforce.assigned());
        self.bonus.hash_into(&mut hash);
        hash.finish()
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Run one production pass. Never fails: overflow is reported, and an
    /// internal fault rolls the facility back to its pre-tick state.
    pub fn run_tick(&mut self) -> TickReport<K> {
        let efficiency = self.efficiency();
        if efficiency <= 0.0 {
            debug!(target: "citywork::facility", facility = %self.name, "no workforce, tick skipped");
            return TickReport::idle(efficiency);
        }

        match self.plan_tick(efficiency) {
            Ok(staged) => self.commit(staged, efficiency),
            Err(fault) => {
                error!(target: "citywork::facility", facility = %self.name, %fault, "tick rolled back");
                TickReport {
                    status: TickStatus::RolledBack(fault),
                    ..TickReport::idle(efficiency)
                }
            }
        }
    }

    fn plan_tick(&self, efficiency: f64) -> Result<StagedTick<K>, TickFault> {
        let mut pool = self.materials.snapshot();
        merge_into(&mut pool, self.products.contents()).map_err(overflow_fault)?;

        let mut recipe_states = self.recipe_states.clone();
        let mut bonus = self.bonus.clone();
        let mut fired = Vec::new();
        let mut consumed = ResourceMap::new();
        let mut produced = ResourceMap::new();

        for (index, recipe) in self.recipes.iter().enumerate() {
            if self.cycle_policy == CyclePolicy::Gated {
                let state = &mut recipe_states[index];
                state.advance(recipe.cycle_time());
                if !state.is_due(recipe.cycle_time()) {
                    continue;
                }
            }

            if !recipe.can_run(&pool) {
                debug!(target: "citywork::facility", facility = %self.name, recipe = recipe.name(), "inputs missing, recipe skipped");
                continue;
            }

            merge_into(&mut consumed, recipe.inputs()).map_err(overflow_fault)?;
            let raw = recipe.run(&mut pool);
            if self.cycle_policy == CyclePolicy::Gated {
                recipe_states[index].reset();
            }
            fired.push(index);

            let boosted = bonus.apply(raw).map_err(overflow_fault)?;
            let batch = scale_batch(boosted, efficiency);
            merge_into(&mut produced, &batch).map_err(overflow_fault)?;
            merge_into(&mut pool, &batch).map_err(overflow_fault)?;
        }

        let mut materials = self.materials.clone();
        materials.replace_contents(
            pool.iter()
                .filter(|&(kind, _)| self.material_kinds.contains(kind) && !self.product_kinds.contains(kind))
                .map(|(&kind, &qty)| (kind, qty))
                .collect(),
        );

        let mut products = self.products.clone();
        let overflow = self.commit_products(&mut products, &consumed, &produced)?;

        Ok(StagedTick {
            materials,
            products,
            recipe_states,
            bonus,
            fired,
            consumed,
            produced,
            overflow,
        })
    }

    /// Apply net product changes: what recipes drew from the pool comes off
    /// first, then new output goes on until the storage is full.
    fn commit_products(
        &self,
        products: &mut Storage<K>,
        consumed: &ResourceMap<K>,
        produced: &ResourceMap<K>,
    ) -> Result<Vec<OverflowNotice<K>>, TickFault> {
        let mut additions = Vec::new();
        for &kind in &self.product_kinds {
            let made = i64::from(quantity_of(produced, kind));
            let used = i64::from(quantity_of(consumed, kind));
            match made - used {
                net if net < 0 => {
                    // The pool never goes negative, so the stock covers it.
                    if !products.try_remove(kind, (-net) as Quantity) {
                        return Err(TickFault::LedgerMismatch {
                            kind: format!("{kind:?}"),
                        });
                    }
                }
                net if net > 0 => additions.push((kind, net as Quantity)),
                _ => {}
            }
        }

        let mut overflow = Vec::new();
        for (kind, qty) in additions {
            let stored = qty.min(products.free());
            if stored > 0 && !products.try_add(kind, stored) {
                return Err(TickFault::LedgerMismatch {
                    kind: format!("{kind:?}"),
                });
            }
            let lost = qty - stored;
            if lost > 0 {
                warn!(target: "citywork::facility", facility = %self.name, kind = ?kind, lost, "output storage full, production discarded");
                overflow.push(OverflowNotice { kind, lost });
            }
        }
        Ok(overflow)
    }

    fn commit(&mut self, staged: StagedTick<K>, efficiency: f64) -> TickReport<K> {
        self.materials = staged.materials;
        self.products = staged.products;
        self.recipe_states = staged.recipe_states;
        self.bonus = staged.bonus;

        debug!(
            target: "citywork::facility",
            facility = %self.name,
            fired = staged.fired.len(),
            overflow = staged.overflow.len(),
            "tick committed"
        );

        TickReport {
            status: TickStatus::Completed,
            efficiency,
            fired: staged.fired,
            consumed: staged.consumed,
            produced: staged.produced,
            overflow: staged.overflow,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
