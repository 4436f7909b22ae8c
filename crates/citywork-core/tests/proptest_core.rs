//! Property-based tests for the Citywork core engine.
//!
//! Uses proptest to generate random delivery, staffing, pickup and tick
//! sequences, then verify storage invariants and determinism hold.

use citywork_core::facility::ProductionFacility;
use citywork_core::storage::Storage;
use citywork_core::test_utils::*;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

#[derive(Debug, Clone)]
enum Op {
    Deliver(Good, u32),
    Collect(Good, u32),
    Staff(u32),
    Tick,
}

fn arb_good() -> impl Strategy<Value = Good> {
    prop_oneof![
        Just(Good::Wheat),
        Just(Good::Water),
        Just(Good::Flour),
        Just(Good::Bread),
        Just(Good::Grapes),
        Just(Good::Must),
        Just(Good::Wine),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (arb_good(), 0..40u32).prop_map(|(g, q)| Op::Deliver(g, q)),
        1 => (arb_good(), 0..20u32).prop_map(|(g, q)| Op::Collect(g, q)),
        1 => (0..15u32).prop_map(Op::Staff),
        4 => Just(Op::Tick),
    ]
}

/// One of the test buildings with random capacities.
fn arb_facility() -> impl Strategy<Value = ProductionFacility<Good>> {
    (0..4u8, 1..120u32, 1..60u32).prop_map(|(kind, materials, products)| {
        let config = match kind {
            0 => bakery(materials, products),
            1 => two_stage(ChainOrder::ProducerFirst, materials, products),
            2 => two_stage(ChainOrder::ConsumerFirst, materials, products),
            _ => winery(materials, products),
        };
        staffed(config, 0)
    })
}

fn apply(facility: &mut ProductionFacility<Good>, op: &Op) {
    match *op {
        Op::Deliver(good, qty) => {
            let _ = facility.add_raw_material(good, qty);
        }
        Op::Collect(good, qty) => {
            let _ = facility.consume_product(good, qty);
        }
        Op::Staff(n) => facility.set_workforce(n),
        Op::Tick => {
            facility.run_tick();
        }
    }
}

fn assert_within_capacity(facility: &ProductionFacility<Good>) {
    let report = facility.report();
    assert!(report.material_total <= report.material_capacity);
    assert!(report.product_total <= report.product_capacity);
    assert!(facility.material_snapshot().values().all(|&q| q > 0));
    assert!(facility.product_snapshot().values().all(|&q| q > 0));
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn storage_never_exceeds_capacity(
        capacity in 1..200u32,
        ops in proptest::collection::vec((any::<bool>(), arb_good(), 0..80u32), 0..60),
    ) {
        let mut storage = Storage::new(capacity);
        for (add, good, qty) in ops {
            let before = storage.clone();
            let accepted = if add {
                storage.try_add(good, qty)
            } else {
                storage.try_remove(good, qty)
            };
            prop_assert!(storage.total() <= capacity);
            if !accepted {
                prop_assert_eq!(&storage, &before);
            }
        }
    }

    #[test]
    fn facility_invariants_hold_under_random_ops(
        mut facility in arb_facility(),
        ops in proptest::collection::vec(arb_op(), 0..80),
    ) {
        for op in &ops {
            apply(&mut facility, op);
            assert_within_capacity(&facility);
        }
    }

    #[test]
    fn unstaffed_ticks_change_nothing(
        mut facility in arb_facility(),
        deliveries in proptest::collection::vec((arb_good(), 0..40u32), 0..10),
        ticks in 1..10usize,
    ) {
        for (good, qty) in deliveries {
            let _ = facility.add_raw_material(good, qty);
        }
        let hash = facility.state_hash();
        let materials = facility.material_snapshot();
        for _ in 0..ticks {
            facility.run_tick();
        }
        prop_assert_eq!(facility.state_hash(), hash);
        prop_assert_eq!(facility.material_snapshot(), materials);
        prop_assert!(facility.product_snapshot().is_empty());
    }

    #[test]
    fn replaying_ops_is_deterministic(
        facility in arb_facility(),
        ops in proptest::collection::vec(arb_op(), 0..60),
    ) {
        let mut a = facility.clone();
        let mut b = facility;
        for op in &ops {
            apply(&mut a, op);
            apply(&mut b, op);
        }
        prop_assert_eq!(a.state_hash(), b.state_hash());
        prop_assert_eq!(a.product_snapshot(), b.product_snapshot());
    }
}
