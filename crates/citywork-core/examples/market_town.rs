//! Market town example: a bakery and a winery ticked by one scheduler.
//!
//! A carter delivers wheat, grapes and water every tick and hauls bread
//! away every third tick. After each step the facility reports are printed.
//!
//! Run with: `cargo run -p citywork-core --example market_town`

use citywork_core::config::FacilityBuilder;
use citywork_core::facility::ProductionFacility;
use citywork_core::scheduler::Scheduler;
use citywork_core::workforce::EfficiencyCurve;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Bakery {
    Wheat,
    Flour,
    Bread,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Winery {
    Grapes,
    Water,
    Must,
    Wine,
}

fn main() {
    let curve = EfficiencyCurve::new(0.4, 0.6);

    // --- Step 1: Describe the buildings ---

    let bakery = FacilityBuilder::new("bakery")
        .material_capacity(60)
        .product_capacity(40)
        .materials([Bakery::Wheat])
        .products([Bakery::Flour, Bakery::Bread])
        .workforce(6, curve)
        .recipe("grind", [(Bakery::Wheat, 10)], [(Bakery::Flour, 5)], 1)
        .recipe("bake", [(Bakery::Flour, 5)], [(Bakery::Bread, 6)], 1)
        .build()
        .expect("bakery config is valid");

    let winery = FacilityBuilder::new("winery")
        .material_capacity(40)
        .product_capacity(20)
        .materials([Winery::Grapes, Winery::Water])
        .products([Winery::Must, Winery::Wine])
        .workforce(4, curve)
        .recipe("press", [(Winery::Grapes, 4)], [(Winery::Must, 2)], 1)
        .recipe("age", [(Winery::Must, 2), (Winery::Water, 1)], [(Winery::Wine, 1)], 1)
        .build()
        .expect("winery config is valid");

    // --- Step 2: Staff them and hand them to the scheduler ---

    let mut town = Scheduler::new();
    let mut bakery = ProductionFacility::new(bakery).expect("bakery builds");
    bakery.set_workforce(4);
    let bakery_id = town.register(bakery);

    let mut winery = ProductionFacility::new(winery).expect("winery builds");
    winery.set_workforce(4);
    let winery_id = town.register(winery);

    // --- Step 3: Run ---

    let mut bread_sold = 0;
    for tick in 1..=9 {
        if let Some(bakery) = town.facility_mut::<Bakery>(bakery_id) {
            let _ = bakery.add_raw_material(Bakery::Wheat, 10);
        }
        if let Some(winery) = town.facility_mut::<Winery>(winery_id) {
            let _ = winery.add_raw_material(Winery::Grapes, 4);
            let _ = winery.add_raw_material(Winery::Water, 1);
        }

        for (id, summary) in town.step() {
            let label = town.tickable(id).map(|t| t.label().to_string()).unwrap_or_default();
            println!(
                "tick {tick:>2} {label:<8} fired={} produced={} lost={}",
                summary.recipes_fired, summary.units_produced, summary.units_lost
            );
        }

        if tick % 3 == 0 {
            if let Some(bakery) = town.facility_mut::<Bakery>(bakery_id) {
                let bread = bakery.products().quantity(Bakery::Bread);
                if bakery.consume_product(Bakery::Bread, bread) {
                    bread_sold += bread;
                }
            }
        }
    }

    // --- Step 4: Report ---

    for (_, report) in town.reports() {
        println!(
            "{}: {}/{} workers, efficiency {:.2}, materials {}/{}, products {}/{}",
            report.name,
            report.workforce,
            report.max_workforce,
            report.efficiency,
            report.material_total,
            report.material_capacity,
            report.product_total,
            report.product_capacity,
        );
    }
    println!("bread sold: {bread_sold}");
}
