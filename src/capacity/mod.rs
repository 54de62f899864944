//! Capacity module.
//!
//! Power and workforce bookkeeping for sovereignty upgrades: the upgrade
//! catalog, the pure validator, and the per-system ledger whose edits are
//! only committed once validated.

pub mod types;
pub mod catalog;
pub mod validator;
pub mod ledger;

// Re-export key types and functions for easier access
pub use types::{CapacityError, CapacityReport, CapacitySummary, Resource, Upgrade};
pub use catalog::UpgradeCatalog;
pub use validator::{capacity_added, check_addition, check_removal, evaluate};
pub use ledger::{Preset, SystemUpgrades};
