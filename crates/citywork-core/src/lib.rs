//! Citywork Core -- the production pipeline engine for city-building sims.
//!
//! A [`facility::ProductionFacility`] owns two bounded storages (raw
//! materials and finished products), a staffing level, and an ordered list of
//! recipes. Once per simulation tick it runs every recipe in order against a
//! shared working pool, so intermediate products can feed later recipes in
//! the same tick, then scales output by workforce efficiency and commits it
//! under a discard-on-overflow policy.
//!
//! # Tick Pipeline
//!
//! 1. **Gate** -- zero efficiency skips the tick untouched.
//! 2. **Seed** -- materials and products are merged into one pool.
//! 3. **Recipes** -- run in order; scaled output is merged back into the pool.
//! 4. **Materials** -- the input storage takes the material remainder.
//! 5. **Products** -- net output is committed; what does not fit is reported.
//!
//! Ticks are atomic: an internal fault rolls the facility back.
//!
//! # Key Types
//!
//! - [`facility::ProductionFacility`] -- the per-building engine.
//! - [`config::FacilityBuilder`] -- validated construction of a
//!   [`config::FacilityConfig`].
//! - [`storage::Storage`] -- capacity-bounded resource container.
//! - [`recipe::Recipe`] -- a named input -> output conversion rule.
//! - [`workforce::Workforce`] -- staffing and the efficiency curve.
//! - [`bonus::YieldBonus`] -- deterministic seasonal yield bonus.
//! - [`scheduler::Scheduler`] -- ticks many facilities in registration order.
//! - [`report`] -- tick results, overflow notices, and status reports.

pub mod bonus;
pub mod config;
pub mod facility;
pub mod fixed;
pub mod id;
pub mod recipe;
pub mod report;
pub mod resource;
pub mod rng;
pub mod scheduler;
pub mod sim;
pub mod storage;
pub mod workforce;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ConfigError, FacilityBuilder, FacilityConfig};
pub use facility::ProductionFacility;
pub use report::{FacilityReport, OverflowNotice, TickReport, TickStatus, TickSummary};
pub use resource::{Quantity, Resource, ResourceMap};
pub use scheduler::{Scheduler, Tickable};
