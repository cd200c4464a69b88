//! The list of covered counties and its durable FIPS form.

mod action;
mod county;
mod coverage;
mod reconciler;

pub use action::SelectionAction;
pub use county::SelectedCounty;
pub use coverage::{CoverageStore, MemoryStore, PersistedCoverage};
pub use reconciler::{CountySelectionReconciler, HydrationGate};
