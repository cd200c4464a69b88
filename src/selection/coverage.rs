use std::collections::BTreeSet;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::county::Fips;

/// The durable form of a selection: the FIPS codes of covered counties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCoverage {
    pub operating_counties: BTreeSet<Fips>,
}

impl PersistedCoverage {
    /// Keep the codes that are valid FIPS, dropping the rest.
    pub fn from_codes<'a>(codes: impl IntoIterator<Item = &'a str>) -> Self {
        let operating_counties = codes.into_iter()
            .filter_map(|code| {
                let fips = Fips::parse(code);
                if fips.is_none() { tracing::debug!(code, "dropping invalid FIPS code") }
                fips
            })
            .collect();
        Self { operating_counties }
    }

    #[inline] pub fn len(&self) -> usize { self.operating_counties.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.operating_counties.is_empty() }
}

/// Where the profile's operating counties are stored.
pub trait CoverageStore {
    fn get_fips(&self) -> Result<PersistedCoverage>;

    fn set_fips(&mut self, coverage: &PersistedCoverage) -> Result<()>;
}

/// In-memory store, for tests and headless drivers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    coverage: PersistedCoverage,
    writes: usize,
}

impl MemoryStore {
    pub fn new(coverage: PersistedCoverage) -> Self { Self { coverage, writes: 0 } }

    /// Number of successful `set_fips` calls.
    #[inline] pub fn writes(&self) -> usize { self.writes }
}

impl CoverageStore for MemoryStore {
    fn get_fips(&self) -> Result<PersistedCoverage> { Ok(self.coverage.clone()) }

    fn set_fips(&mut self, coverage: &PersistedCoverage) -> Result<()> {
        self.coverage = coverage.clone();
        self.writes += 1;
        Ok(())
    }
}
