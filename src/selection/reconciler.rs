use std::collections::BTreeSet;

use ahash::AHashSet;

use hexgrid::CellId;

use crate::county::{GeoId, GeometryIndex};

use super::{PersistedCoverage, SelectedCounty, SelectionAction};

/// Whether persisted coverage has been merged in yet. Hydration happens at
/// most once per reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HydrationGate {
    #[default]
    Pending,
    Done,
}

/// The authoritative list of selected counties.
///
/// Folds picker emissions, zone edits and removals into the list, and merges
/// persisted coverage once the dataset is available without undoing
/// anything the user has already done.
#[derive(Debug, Clone, Default)]
pub struct CountySelectionReconciler {
    counties: Vec<SelectedCounty>,
    gate: HydrationGate,
    interacted: bool,
}

impl CountySelectionReconciler {
    pub fn new() -> Self { Self::default() }

    #[inline] pub fn counties(&self) -> &[SelectedCounty] { &self.counties }

    #[inline] pub fn gate(&self) -> HydrationGate { self.gate }

    #[inline] pub fn has_interacted(&self) -> bool { self.interacted }

    pub fn get(&self, geo_id: &GeoId) -> Option<&SelectedCounty> {
        self.counties.iter().find(|c| &c.geo_id == geo_id)
    }

    #[inline] pub fn contains(&self, geo_id: &GeoId) -> bool { self.get(geo_id).is_some() }

    /// Apply a user action. Returns `true` if the list changed.
    pub fn apply(&mut self, action: SelectionAction) -> bool {
        self.interacted = true;
        match action {
            SelectionAction::Clear => {
                let changed = !self.counties.is_empty();
                self.counties.clear();
                changed
            }
            SelectionAction::Toggle(county) => {
                if let Some(pos) = self.counties.iter().position(|c| c.geo_id == county.geo_id) {
                    self.counties.remove(pos);
                } else {
                    self.counties.push(SelectedCounty { zone: BTreeSet::new(), ..county });
                }
                true
            }
            SelectionAction::Replace(list) => {
                let mut seen = AHashSet::with_capacity(list.len());
                let next: Vec<SelectedCounty> = list.into_iter()
                    .filter(|c| seen.insert(c.geo_id.clone()))
                    .collect();
                let changed = next != self.counties;
                self.counties = next;
                changed
            }
        }
    }

    /// Apply a raw picker emission, whose length decides its meaning.
    pub fn apply_emitted(&mut self, emitted: Vec<SelectedCounty>) -> bool {
        self.apply(SelectionAction::from_emitted(emitted))
    }

    /// Set the zone of a selected county. Unknown counties are ignored.
    pub fn update_zones(&mut self, geo_id: &GeoId, zones: &[CellId]) -> bool {
        self.interacted = true;
        let Some(county) = self.counties.iter_mut().find(|c| &c.geo_id == geo_id) else {
            tracing::debug!(%geo_id, "zone update for unselected county");
            return false
        };
        county.zone = zones.iter().copied().collect();
        true
    }

    pub fn remove(&mut self, geo_id: &GeoId) -> bool {
        self.interacted = true;
        let before = self.counties.len();
        self.counties.retain(|c| &c.geo_id != geo_id);
        self.counties.len() != before
    }

    /// Merge persisted coverage, once. Codes the dataset does not know are
    /// dropped. Before the user has touched anything, the persisted order
    /// leads; afterwards, persisted counties are only appended if missing.
    /// Existing entries are never removed or overwritten.
    pub fn hydrate(&mut self, index: &GeometryIndex, persisted: &PersistedCoverage) -> bool {
        if self.gate == HydrationGate::Done { return false }
        self.gate = HydrationGate::Done;

        let hydrated: Vec<SelectedCounty> = persisted.operating_counties.iter()
            .filter_map(|fips| {
                let feature = index.get_by_fips(fips);
                if feature.is_none() { tracing::debug!(%fips, "persisted county not in dataset") }
                feature
            })
            .map(|feature| SelectedCounty::from_feature(feature))
            .collect();

        tracing::debug!(persisted = persisted.len(), hydrated = hydrated.len(), interacted = self.interacted, "hydrating selection");

        let before = self.counties.clone();
        if self.interacted {
            for county in hydrated {
                if !self.contains(&county.geo_id) { self.counties.push(county) }
            }
        } else {
            let mut existing = std::mem::take(&mut self.counties);
            let mut merged = Vec::with_capacity(hydrated.len() + existing.len());
            for county in hydrated {
                match existing.iter().position(|c| c.geo_id == county.geo_id) {
                    Some(pos) => merged.push(existing.remove(pos)),
                    None => merged.push(county),
                }
            }
            merged.extend(existing);
            self.counties = merged;
        }

        self.counties != before
    }

    /// Record a failed dataset load. The selection is left as is and
    /// hydration may be retried.
    pub fn hydrate_failed(&mut self, error: &anyhow::Error) {
        tracing::warn!(error = %error, "county dataset unavailable; keeping current selection");
    }

    /// The durable form of the selection. Counties whose GEO_ID has no FIPS
    /// form are left out.
    pub fn to_persisted(&self) -> PersistedCoverage {
        PersistedCoverage { operating_counties: self.counties.iter().filter_map(SelectedCounty::fips).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn county(fips: &str) -> SelectedCounty {
        SelectedCounty {
            geo_id: GeoId::from(format!("0500000US{fips}")),
            name: format!("C{fips}").into(),
            state: fips[..2].into(),
            zone: BTreeSet::new(),
        }
    }

    fn geo_ids(r: &CountySelectionReconciler) -> Vec<&str> {
        r.counties().iter().map(|c| c.geo_id.as_str()).collect()
    }

    #[test]
    fn toggle_add_resets_zone() {
        let mut r = CountySelectionReconciler::new();
        let mut a = county("17001");
        a.zone.insert(CellId(4));
        r.apply(SelectionAction::Toggle(a));
        assert!(r.counties()[0].zone.is_empty());
    }

    #[test]
    fn replace_dedupes_keeping_first() {
        let mut r = CountySelectionReconciler::new();
        let mut first = county("17001");
        first.zone.insert(CellId(1));
        r.apply(SelectionAction::Replace(vec![first, county("17003"), county("17001")]));
        assert_eq!(geo_ids(&r), ["0500000US17001", "0500000US17003"]);
        assert_eq!(r.counties()[0].zone.len(), 1);
    }

    #[test]
    fn zone_updates_and_removal() {
        let mut r = CountySelectionReconciler::new();
        r.apply_emitted(vec![county("17001"), county("17003")]);
        let a = GeoId::from("0500000US17001");
        assert!(r.update_zones(&a, &[CellId(9), CellId(2), CellId(9)]));
        assert_eq!(r.get(&a).unwrap().zone.iter().copied().collect::<Vec<_>>(), [CellId(2), CellId(9)]);
        assert!(!r.update_zones(&GeoId::from("0500000US99999"), &[CellId(1)]));
        assert!(r.remove(&a));
        assert!(!r.remove(&a));
        assert_eq!(geo_ids(&r), ["0500000US17003"]);
    }

    #[test]
    fn persisted_form_uses_fips() {
        let mut r = CountySelectionReconciler::new();
        r.apply_emitted(vec![county("17001"), county("06037")]);
        r.apply_emitted(vec![SelectedCounty { geo_id: GeoId::from("bogus"), ..county("17003") }]);
        let persisted = r.to_persisted();
        assert_eq!(persisted.operating_counties.iter().map(|f| f.as_str()).collect::<Vec<_>>(), ["06037", "17001"]);
    }

    #[test]
    fn failure_keeps_gate_pending() {
        let mut r = CountySelectionReconciler::new();
        r.apply_emitted(vec![county("17001")]);
        r.hydrate_failed(&anyhow::anyhow!("network down"));
        assert_eq!(r.gate(), HydrationGate::Pending);
        assert_eq!(r.counties().len(), 1);
    }
}
