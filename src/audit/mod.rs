//! The backup audit: compartment enumeration, backup collection, the orphan
//! rule and the run that ties them together.

mod backups;
mod classifier;
mod compartments;
mod orchestrator;
#[cfg(test)]
pub(crate) mod test_utils;

pub use backups::{collect_backups, list_available_backups};
pub use classifier::{format_orphan_line, is_orphan};
pub use compartments::{CompartmentFilter, list_compartments};
pub use orchestrator::{CRITICAL_SUMMARY, ScanOrchestrator, ScanOutcome, ScanReport};
