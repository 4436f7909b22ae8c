//! Drives many facilities once per simulation step.
//!
//! Facilities of different building types use different resource enums, so
//! the scheduler stores them behind the object-safe [`Tickable`] trait and
//! hands typed access back out through `Any` downcasts.

use std::any::Any;

use slotmap::SlotMap;
use tracing::{info, trace};

use crate::facility::ProductionFacility;
use crate::id::FacilityId;
use crate::report::{FacilityReport, TickStatus, TickSummary};
use crate::resource::Resource;
use crate::sim::SimState;

// ---------------------------------------------------------------------------
// Tickable trait
// ---------------------------------------------------------------------------

/// Anything the scheduler can tick.
pub trait Tickable: Send + std::fmt::Debug {
    /// Human-readable name, used in logs.
    fn label(&self) -> &str;

    /// Run one production pass.
    fn tick(&mut self) -> TickSummary;

    fn report(&self) -> FacilityReport;

    fn state_hash(&self) -> u64;

    /// Downcast to `&dyn Any` for typed access to the concrete facility.
    fn as_any(&self) -> &dyn Any;

    /// Downcast to `&mut dyn Any` for typed access to the concrete facility.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<K: Resource> Tickable for ProductionFacility<K> {
    fn label(&self) -> &str {
        self.name()
    }

    fn tick(&mut self) -> TickSummary {
        self.run_tick().summary()
    }

    fn report(&self) -> FacilityReport {
        ProductionFacility::report(self)
    }

    fn state_hash(&self) -> u64 {
        ProductionFacility::state_hash(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Owns a set of facilities and ticks them in registration order.
#[derive(Debug, Default)]
pub struct Scheduler {
    facilities: SlotMap<FacilityId, Box<dyn Tickable>>,
    order: Vec<FacilityId>,
    sim_state: SimState,
    paused: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a facility. It ticks after every facility already
    /// registered.
    pub fn register(&mut self, facility: impl Tickable + 'static) -> FacilityId {
        let label = facility.label().to_string();
        let id = self.facilities.insert(Box::new(facility));
        self.order.push(id);
        info!(target: "citywork::scheduler", facility = %label, ?id, "facility registered");
        id
    }

    /// Drop a facility. False if the id is unknown or already removed.
    pub fn remove(&mut self, id: FacilityId) -> bool {
        let Some(facility) = self.facilities.remove(id) else {
            return false;
        };
        self.order.retain(|&other| other != id);
        info!(target: "citywork::scheduler", facility = %facility.label(), ?id, "facility removed");
        true
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    pub fn contains(&self, id: FacilityId) -> bool {
        self.facilities.contains_key(id)
    }

    /// Ids in tick order.
    pub fn ids(&self) -> &[FacilityId] {
        &self.order
    }

    pub fn sim_state(&self) -> &SimState {
        &self.sim_state
    }

    pub fn tickable(&self, id: FacilityId) -> Option<&dyn Tickable> {
        self.facilities.get(id).map(|f| f.as_ref())
    }

    /// Typed access. `None` if the id is unknown or the facility uses a
    /// different resource type.
    pub fn facility<K: Resource>(&self, id: FacilityId) -> Option<&ProductionFacility<K>> {
        self.facilities.get(id)?.as_any().downcast_ref()
    }

    /// Typed mutable access, for logistics delivering materials or hauling
    /// products between steps.
    pub fn facility_mut<K: Resource>(&mut self, id: FacilityId) -> Option<&mut ProductionFacility<K>> {
        self.facilities.get_mut(id)?.as_any_mut().downcast_mut()
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Tick every facility once. Results come back in registration order.
    /// A paused scheduler does nothing and returns an empty list.
    pub fn step(&mut self) -> Vec<(FacilityId, TickSummary)> {
        if self.paused {
            return Vec::new();
        }
        let results = self.tick_all();
        self.sim_state.tick += 1;

        trace!(
            target: "citywork::scheduler",
            tick = self.sim_state.tick,
            facilities = results.len(),
            rolled_back = results
                .iter()
                .filter(|(_, s)| matches!(s.status, TickStatus::RolledBack(_)))
                .count(),
            "step complete"
        );
        results
    }

    #[cfg(not(feature = "parallel"))]
    fn tick_all(&mut self) -> Vec<(FacilityId, TickSummary)> {
        let mut results = Vec::with_capacity(self.order.len());
        for &id in &self.order {
            if let Some(facility) = self.facilities.get_mut(id) {
                results.push((id, facility.tick()));
            }
        }
        results
    }

    #[cfg(feature = "parallel")]
    fn tick_all(&mut self) -> Vec<(FacilityId, TickSummary)> {
        use rayon::prelude::*;
        use slotmap::SecondaryMap;

        let mut entries: Vec<(FacilityId, &mut Box<dyn Tickable>)> = self.facilities.iter_mut().collect();
        let mut summaries: SecondaryMap<FacilityId, TickSummary> = entries
            .par_iter_mut()
            .map(|(id, facility)| (*id, facility.tick()))
            .collect::<Vec<_>>()
            .into_iter()
            .collect();
        self.order
            .iter()
            .filter_map(|&id| summaries.remove(id).map(|summary| (id, summary)))
            .collect()
    }

    /// Status of every facility, in registration order.
    pub fn reports(&self) -> Vec<(FacilityId, FacilityReport)> {
        self.order
            .iter()
            .filter_map(|&id| self.facilities.get(id).map(|f| (id, f.report())))
            .collect()
    }

    /// Combined hash over every facility, in registration order.
    pub fn state_hash(&self) -> u64 {
        use std::hash::Hasher;

        let mut hash = crate::sim::StateHash::new();
        hash.write_u64(self.sim_state.tick);
        for &id in &self.order {
            if let Some(facility) = self.facilities.get(id) {
                hash.write_u64(facility.state_hash());
            }
        }
        hash.finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
