use std::sync::Arc;

use hexgrid::GridError;

use crate::county::CountyFeature;

use super::{BuildStep, BuildTask, GridCell, GridKey, HexGridBuilder, IdleHost, IdleTicket, SharedGridCache};

/// Outcome of [`IncrementalScheduler::request`].
#[derive(Debug, Clone)]
pub enum GridRequest {
    /// The grid was cached; no work was scheduled.
    Ready(Arc<[GridCell]>),
    /// A build is running and will finish in a later idle slot.
    Scheduled,
}

/// Something [`IncrementalScheduler::on_idle`] wants its owner to apply.
#[derive(Debug, Clone)]
pub enum BuildEvent {
    Completed { key: GridKey, cells: Arc<[GridCell]> },
    Failed { key: GridKey, error: GridError },
}

#[derive(Debug)]
struct Job {
    task: BuildTask,
    ticket: IdleTicket,
}

/// Runs at most one grid build at a time, one batch per idle slot.
///
/// Starting a build for a different key cancels the running one, and a slot
/// whose ticket does not belong to the running build is ignored, so a
/// result is only ever reported for the key it was started for.
#[derive(Debug)]
pub struct IncrementalScheduler {
    cache: SharedGridCache,
    batch_size: usize,
    job: Option<Job>,
}

impl IncrementalScheduler {
    pub fn new(cache: SharedGridCache, batch_size: usize) -> Self {
        Self { cache, batch_size, job: None }
    }

    #[inline] pub fn cache(&self) -> &SharedGridCache { &self.cache }

    #[inline] pub fn is_running(&self) -> bool { self.job.is_some() }

    /// Key of the running build, if any.
    pub fn running(&self) -> Option<&GridKey> { self.job.as_ref().map(|job| job.task.key()) }

    /// Ask for the grid of `county` built by `builder`. Cache hits return at
    /// once; otherwise a build is scheduled unless the same one is running.
    pub fn request(&mut self, host: &mut dyn IdleHost, county: Arc<CountyFeature>, builder: HexGridBuilder) -> GridRequest {
        let key = builder.key(&county.geo_id);

        if self.running() == Some(&key) { return GridRequest::Scheduled }
        self.cancel(host);

        if let Some(cells) = self.cache.borrow().get(&key) {
            tracing::trace!(county = %key.county, "grid cache hit");
            return GridRequest::Ready(cells)
        }

        tracing::debug!(county = %key.county, grid_size = key.grid_size, clip = key.clip_edges, "scheduling grid build");
        let task = BuildTask::new(county, builder, self.batch_size);
        let ticket = host.request_idle();
        self.job = Some(Job { task, ticket });
        GridRequest::Scheduled
    }

    /// Cancel the running build, withdrawing its idle slot.
    pub fn cancel(&mut self, host: &mut dyn IdleHost) {
        if let Some(job) = self.job.take() {
            tracing::debug!(county = %job.task.key().county, "cancelling grid build");
            job.task.cancel();
            host.cancel_idle(job.ticket);
        }
    }

    /// Run one batch if `ticket` belongs to the running build.
    pub fn on_idle(&mut self, host: &mut dyn IdleHost, ticket: IdleTicket) -> Option<BuildEvent> {
        let Some(job) = self.job.as_mut() else { return None };
        if job.ticket != ticket {
            tracing::trace!(?ticket, "ignoring stale idle slot");
            return None
        }

        match job.task.step() {
            BuildStep::Pending => {
                job.ticket = host.request_idle();
                None
            }
            BuildStep::Complete(cells) => {
                let key = job.task.key().clone();
                self.job = None;
                self.cache.borrow_mut().insert(key.clone(), cells.clone());
                Some(BuildEvent::Completed { key, cells })
            }
            BuildStep::Failed(error) => {
                let key = job.task.key().clone();
                self.job = None;
                tracing::debug!(county = %key.county, %error, "grid build failed");
                Some(BuildEvent::Failed { key, error })
            }
            BuildStep::Cancelled => {
                self.job = None;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, polygon};

    use crate::{county::GeoId, grid::{GridCache, IdleQueue}};

    use super::*;

    fn county(geo_id: &str, x0: f64) -> Arc<CountyFeature> {
        Arc::new(CountyFeature {
            geo_id: GeoId::from(geo_id),
            state: "17".into(),
            county: geo_id[geo_id.len() - 3..].into(),
            name: "Test".into(),
            geometry: MultiPolygon::new(vec![polygon![
                (x: x0, y: 40.0), (x: x0 + 0.5, y: 40.0), (x: x0 + 0.5, y: 40.4), (x: x0, y: 40.4), (x: x0, y: 40.0),
            ]]),
        })
    }

    fn drain(scheduler: &mut IncrementalScheduler, queue: &mut IdleQueue) -> Vec<BuildEvent> {
        let mut events = Vec::new();
        while let Some(ticket) = queue.pop() {
            events.extend(scheduler.on_idle(queue, ticket));
        }
        events
    }

    #[test]
    fn completes_and_caches() {
        let cache = GridCache::shared();
        let mut scheduler = IncrementalScheduler::new(cache.clone(), 10);
        let mut queue = IdleQueue::new();
        let builder = HexGridBuilder::new(10, true);
        let a = county("0500000US17001", -88.5);

        assert!(matches!(scheduler.request(&mut queue, a.clone(), builder), GridRequest::Scheduled));
        assert!(cache.borrow().is_empty());

        let events = drain(&mut scheduler, &mut queue);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], BuildEvent::Completed { key, .. } if key.county == a.geo_id));
        assert_eq!(cache.borrow().len(), 1);
        assert!(!scheduler.is_running());

        // Second request is served from the cache without touching the host.
        assert!(matches!(scheduler.request(&mut queue, a, builder), GridRequest::Ready(_)));
        assert!(queue.is_empty());
    }

    #[test]
    fn switching_county_discards_the_old_build() {
        let cache = GridCache::shared();
        let mut scheduler = IncrementalScheduler::new(cache.clone(), 5);
        let mut queue = IdleQueue::new();
        let builder = HexGridBuilder::new(10, true);
        let a = county("0500000US17001", -88.5);
        let b = county("0500000US17003", -87.5);

        scheduler.request(&mut queue, a.clone(), builder);
        let first = queue.pop().unwrap();
        assert!(scheduler.on_idle(&mut queue, first).is_none());

        scheduler.request(&mut queue, b.clone(), builder);
        let events = drain(&mut scheduler, &mut queue);

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], BuildEvent::Completed { key, .. } if key.county == b.geo_id));
        assert!(!cache.borrow().contains(&builder.key(&a.geo_id)));
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut scheduler = IncrementalScheduler::new(GridCache::shared(), 5);
        let mut queue = IdleQueue::new();
        scheduler.request(&mut queue, county("0500000US17001", -88.5), HexGridBuilder::new(10, true));
        assert!(scheduler.on_idle(&mut queue, IdleTicket(12345)).is_none());
        assert!(scheduler.is_running());
    }

    #[test]
    fn same_request_does_not_restart() {
        let mut scheduler = IncrementalScheduler::new(GridCache::shared(), 5);
        let mut queue = IdleQueue::new();
        let a = county("0500000US17001", -88.5);
        let builder = HexGridBuilder::new(10, true);
        scheduler.request(&mut queue, a.clone(), builder);
        scheduler.request(&mut queue, a, builder);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn failure_is_reported_and_not_cached() {
        let cache = GridCache::shared();
        let mut scheduler = IncrementalScheduler::new(cache.clone(), 5);
        let mut queue = IdleQueue::new();
        scheduler.request(&mut queue, county("0500000US17001", -88.5), HexGridBuilder::new(0, true));
        let events = drain(&mut scheduler, &mut queue);
        assert!(matches!(&events[..], [BuildEvent::Failed { error: GridError::ZeroGridSize, .. }]));
        assert!(cache.borrow().is_empty());
    }
}
