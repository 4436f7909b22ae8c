//! Citywork Data -- loads facility definitions from RON, TOML, or JSON files.
//!
//! A file holds either one facility ([`load_facility`]) or a catalog of them
//! ([`load_catalog`]). Every definition is validated into a
//! [`citywork_core::config::FacilityConfig`] before it is returned.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, Format, load_catalog, load_facility};
pub use schema::{BonusData, FacilityData, RecipeData, StorageData, WorkforceData};
