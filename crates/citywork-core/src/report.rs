//! What a facility tells the outside world: per-tick results and status reports.

use crate::resource::{Quantity, Resource, ResourceMap};

// ---------------------------------------------------------------------------
// Tick results
// ---------------------------------------------------------------------------

/// Produced units that did not fit in the output storage and were discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct OverflowNotice<K: Resource> {
    pub kind: K,
    pub lost: Quantity,
}

/// An internal fault that aborted a tick. The facility was restored to its
/// pre-tick state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, thiserror::Error)]
pub enum TickFault {
    #[error("quantity of {kind} overflowed during the tick")]
    QuantityOverflow { kind: String },
    #[error("product ledger for {kind} did not balance")]
    LedgerMismatch { kind: String },
}

/// How a tick ended.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub enum TickStatus {
    /// Efficiency was zero; nothing was touched.
    #[default]
    Idle,
    /// The pass ran and was committed.
    Completed,
    /// The pass faulted and every change was discarded.
    RolledBack(TickFault),
}

/// Everything that happened during one `run_tick`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TickReport<K: Resource> {
    pub status: TickStatus,
    pub efficiency: f64,
    /// Indices into the recipe list, in firing order.
    pub fired: Vec<usize>,
    /// Inputs drawn from the pool, summed over recipes.
    pub consumed: ResourceMap<K>,
    /// Scaled outputs, summed over recipes (before overflow truncation).
    pub produced: ResourceMap<K>,
    pub overflow: Vec<OverflowNotice<K>>,
}

impl<K: Resource> TickReport<K> {
    pub(crate) fn idle(efficiency: f64) -> Self {
        Self {
            status: TickStatus::Idle,
            efficiency,
            fired: Vec::new(),
            consumed: ResourceMap::new(),
            produced: ResourceMap::new(),
            overflow: Vec::new(),
        }
    }

    /// Total units discarded by the overflow policy.
    pub fn units_lost(&self) -> u64 {
        self.overflow.iter().map(|n| u64::from(n.lost)).sum()
    }

    /// Kind-erased summary for the scheduler.
    pub fn summary(&self) -> TickSummary {
        TickSummary {
            status: self.status.clone(),
            recipes_fired: self.fired.len(),
            units_produced: self.produced.values().map(|&q| u64::from(q)).sum(),
            units_lost: self.units_lost(),
        }
    }
}

/// [`TickReport`] without the resource type, so facilities of different
/// building types can be ticked side by side.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct TickSummary {
    pub status: TickStatus,
    pub recipes_fired: usize,
    pub units_produced: u64,
    pub units_lost: u64,
}

// ---------------------------------------------------------------------------
// Status report
// ---------------------------------------------------------------------------

/// Read-only status for reporting and UI collaborators.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FacilityReport {
    pub name: String,
    pub workforce: u32,
    pub max_workforce: u32,
    pub efficiency: f64,
    pub material_total: Quantity,
    pub material_capacity: Quantity,
    pub product_total: Quantity,
    pub product_capacity: Quantity,
    pub recipe_count: usize,
    pub bonus_active: bool,
}

impl FacilityReport {
    /// Fraction of product capacity in use.
    pub fn product_fill(&self) -> f64 {
        f64::from(self.product_total) / f64::from(self.product_capacity.max(1))
    }
}
