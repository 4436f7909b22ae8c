//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available everywhere tests run (via the `test-utils` feature).

use crate::config::{FacilityBuilder, FacilityConfig};
use crate::facility::ProductionFacility;
use crate::resource::{Quantity, Resource};
use crate::workforce::EfficiencyCurve;

// ===========================================================================
// Resource kinds
// ===========================================================================

/// Every good the test buildings deal in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Good {
    Wheat,
    Water,
    Flour,
    Bread,
    Grapes,
    Must,
    Wine,
}

/// Recipe order for [`two_stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOrder {
    /// Grind before bake: flour is baked the tick it is made.
    ProducerFirst,
    /// Bake before grind: flour waits a tick in output storage.
    ConsumerFirst,
}

// ===========================================================================
// Configurations
// ===========================================================================

/// 0.4 floor, 0.6 per-worker scale.
pub fn curve() -> EfficiencyCurve {
    EfficiencyCurve::new(0.4, 0.6)
}

/// `{Wheat:10} -> {Bread:12}`, ten workers.
pub fn bakery(material_capacity: Quantity, product_capacity: Quantity) -> FacilityConfig<Good> {
    FacilityBuilder::new("bakery")
        .material_capacity(material_capacity)
        .product_capacity(product_capacity)
        .materials([Good::Wheat])
        .products([Good::Bread])
        .workforce(10, curve())
        .recipe("bake", [(Good::Wheat, 10)], [(Good::Bread, 12)], 1)
        .build()
        .expect("bakery config is valid")
}

/// `grind {Wheat:10} -> {Flour:5}` and `bake {Flour:5} -> {Bread:6}`, ten
/// workers, in the given order.
pub fn two_stage(
    order: ChainOrder,
    material_capacity: Quantity,
    product_capacity: Quantity,
) -> FacilityConfig<Good> {
    let builder = FacilityBuilder::new("mill bakery")
        .material_capacity(material_capacity)
        .product_capacity(product_capacity)
        .materials([Good::Wheat])
        .products([Good::Flour, Good::Bread])
        .workforce(10, curve());
    let grind = |b: FacilityBuilder<Good>| b.recipe("grind", [(Good::Wheat, 10)], [(Good::Flour, 5)], 1);
    let bake = |b: FacilityBuilder<Good>| b.recipe("bake", [(Good::Flour, 5)], [(Good::Bread, 6)], 1);
    let builder = match order {
        ChainOrder::ProducerFirst => bake(grind(builder)),
        ChainOrder::ConsumerFirst => grind(bake(builder)),
    };
    builder.build().expect("two-stage config is valid")
}

/// `press {Grapes:4} -> {Must:2}` then `age {Must:2, Water:1} -> {Wine:1}`,
/// eight workers.
pub fn winery(material_capacity: Quantity, product_capacity: Quantity) -> FacilityConfig<Good> {
    FacilityBuilder::new("winery")
        .material_capacity(material_capacity)
        .product_capacity(product_capacity)
        .materials([Good::Grapes, Good::Water])
        .products([Good::Must, Good::Wine])
        .workforce(8, curve())
        .recipe("press", [(Good::Grapes, 4)], [(Good::Must, 2)], 1)
        .recipe("age", [(Good::Must, 2), (Good::Water, 1)], [(Good::Wine, 1)], 1)
        .build()
        .expect("winery config is valid")
}

// ===========================================================================
// Facilities
// ===========================================================================

/// Build a facility and assign `workers`.
pub fn staffed<K: Resource>(config: FacilityConfig<K>, workers: u32) -> ProductionFacility<K> {
    let mut facility = ProductionFacility::new(config).expect("facility config is valid");
    facility.set_workforce(workers);
    facility
}

/// Deliver raw materials, panicking if any delivery is refused.
pub fn stock<K: Resource>(facility: &mut ProductionFacility<K>, deliveries: &[(K, Quantity)]) {
    for &(kind, amount) in deliveries {
        assert!(
            facility.add_raw_material(kind, amount),
            "delivery of {amount} {kind:?} refused"
        );
    }
}

/// A fully staffed bakery holding `wheat`, for benchmarks.
pub fn busy_bakery(wheat: Quantity) -> ProductionFacility<Good> {
    let mut facility = staffed(bakery(wheat.max(10), wheat.max(10)), 10);
    stock(&mut facility, &[(Good::Wheat, wheat)]);
    facility
}
