//! Directory load use case: sequential, cache-first thumbnail materialization.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

use crate::application::dto::{ImageOrigin, LoadProgress, LoadReport, LoadSnapshot};
use crate::application::services::{CacheTier, TieredImageCache};
use crate::domain::entities::{DirEntry, LoadSlot, LoadedImage};
use crate::domain::errors::LoadError;
use crate::domain::ports::{PathResolverPort, ThumbnailGeneratorPort};

#[derive(Debug, Default)]
struct LoadState {
    generation: u64,
    slots: Vec<LoadSlot>,
    completed: usize,
    errors: Vec<String>,
}

impl LoadState {
    fn progress(&self) -> LoadProgress {
        LoadProgress {
            generation: self.generation,
            completed: self.completed,
            total: self.slots.len(),
            failed: self.errors.len(),
        }
    }
}

/// Materializes a directory's images one at a time, in input order.
///
/// Each call to [`execute`](Self::execute) starts a new generation and
/// resets the observable results. A run whose generation is no longer
/// current stops and its pending result is discarded.
pub struct LoadDirectoryUseCase {
    resolver: Arc<dyn PathResolverPort>,
    cache: Arc<TieredImageCache>,
    generator: Arc<dyn ThumbnailGeneratorPort>,
    pacing: Duration,
    generation: AtomicU64,
    state: RwLock<LoadState>,
    progress_tx: watch::Sender<LoadProgress>,
}

impl std::fmt::Debug for LoadDirectoryUseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadDirectoryUseCase")
            .field("pacing", &self.pacing)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl LoadDirectoryUseCase {
    /// Creates the use case without inter-item pacing.
    #[must_use]
    pub fn new(
        resolver: Arc<dyn PathResolverPort>,
        cache: Arc<TieredImageCache>,
        generator: Arc<dyn ThumbnailGeneratorPort>,
    ) -> Self {
        let (progress_tx, _) = watch::channel(LoadProgress::default());
        Self {
            resolver,
            cache,
            generator,
            pacing: Duration::ZERO,
            generation: AtomicU64::new(0),
            state: RwLock::new(LoadState::default()),
            progress_tx,
        }
    }

    /// Sets the delay between items. Zero only yields to the scheduler.
    #[must_use]
    pub const fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Receives progress updates for whichever load is current.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoadProgress> {
        self.progress_tx.subscribe()
    }

    /// Generation token of the most recently started load.
    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Copies the current load's results.
    pub async fn snapshot(&self) -> LoadSnapshot {
        let state = self.state.read().await;
        LoadSnapshot {
            generation: state.generation,
            slots: state.slots.clone(),
            completed: state.completed,
            errors: state.errors.clone(),
        }
    }

    /// Loads `entries`, which must already be filtered to image files.
    ///
    /// Item failures are recorded and never abort the run.
    pub async fn execute(&self, entries: &[DirEntry]) -> LoadReport {
        let generation = self.begin(entries.len()).await;
        let mut report = LoadReport::new(generation, entries.len());
        info!(generation, total = entries.len(), "Starting directory load");

        for (index, entry) in entries.iter().enumerate() {
            if !self.is_current(generation) {
                report.superseded = true;
                break;
            }

            let url = self.resolver.resolve(&entry.path);
            let outcome = self.materialize(&url).await;

            let (slot, origin) = match outcome {
                Ok((image, origin)) => (LoadSlot::Loaded(image), Some(origin)),
                Err(e) => {
                    warn!(url = %url, error = %e, "Failed to load image");
                    (LoadSlot::Failed, None)
                }
            };

            if !self.commit(generation, index, slot, &url).await {
                report.superseded = true;
                break;
            }

            report.completed += 1;
            match origin {
                Some(origin) => report.record(origin),
                None => report.failed.push(url),
            }

            self.pace().await;
        }

        if report.superseded {
            debug!(generation, completed = report.completed, "Directory load superseded");
        } else {
            info!(
                generation,
                loaded = report.loaded(),
                failed = report.failed.len(),
                from_session = report.from_session,
                from_durable = report.from_durable,
                generated = report.generated,
                "Directory load complete"
            );
        }

        report
    }

    async fn begin(&self, total: usize) -> u64 {
        let mut state = self.state.write().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *state = LoadState {
            generation,
            slots: vec![LoadSlot::Pending; total],
            completed: 0,
            errors: Vec::new(),
        };
        self.progress_tx.send_replace(state.progress());
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn materialize(&self, url: &str) -> Result<(Arc<LoadedImage>, ImageOrigin), LoadError> {
        if let Some(hit) = self.cache.lookup(url).await {
            let origin = match hit.tier {
                CacheTier::Session => ImageOrigin::Session,
                CacheTier::Durable => ImageOrigin::Durable,
            };
            return Ok((hit.image, origin));
        }

        let image = Arc::new(self.generator.generate(url).await?);
        self.cache.store(url, image.clone()).await;
        Ok((image, ImageOrigin::Generated))
    }

    /// Writes one slot if `generation` is still current. Returns false otherwise.
    async fn commit(&self, generation: u64, index: usize, slot: LoadSlot, url: &str) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return false;
        }

        if slot.is_failed() {
            state.errors.push(url.to_string());
        }
        if let Some(target) = state.slots.get_mut(index) {
            *target = slot;
        }
        state.completed += 1;
        self.progress_tx.send_replace(state.progress());
        true
    }

    async fn pace(&self) {
        if self.pacing.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.pacing).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::DurableThumbnailCache;
    use crate::domain::ports::ImageCachePort;
    use crate::domain::ports::mocks::{MockThumbnailGenerator, MockThumbnailStore};
    use crate::infrastructure::image::SessionImageCache;
    use std::path::Path;

    struct TestResolver;

    impl PathResolverPort for TestResolver {
        fn resolve(&self, path: &Path) -> String {
            format!("file://{}", path.display())
        }
    }

    struct Harness {
        use_case: Arc<LoadDirectoryUseCase>,
        generator: Arc<MockThumbnailGenerator>,
        session: Arc<SessionImageCache>,
        store: Arc<MockThumbnailStore>,
    }

    fn harness(generator: MockThumbnailGenerator) -> Harness {
        harness_with_store(generator, MockThumbnailStore::new())
    }

    fn harness_with_store(generator: MockThumbnailGenerator, store: MockThumbnailStore) -> Harness {
        let generator = Arc::new(generator);
        let session = Arc::new(SessionImageCache::new());
        let store = Arc::new(store);
        let cache = Arc::new(TieredImageCache::new(
            session.clone(),
            Some(DurableThumbnailCache::with_defaults(store.clone())),
        ));
        let use_case = Arc::new(LoadDirectoryUseCase::new(
            Arc::new(TestResolver),
            cache,
            generator.clone(),
        ));
        Harness {
            use_case,
            generator,
            session,
            store,
        }
    }

    fn entries(paths: &[&str]) -> Vec<DirEntry> {
        paths.iter().map(|p| DirEntry::file(*p)).collect()
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_index_order() {
        let h = harness(MockThumbnailGenerator::new().failing_on("file:///p/b.jpg"));

        let report = h
            .use_case
            .execute(&entries(&["/p/a.jpg", "/p/b.jpg", "/p/c.jpg"]))
            .await;

        let snapshot = h.use_case.snapshot().await;
        assert!(snapshot.slots[0].is_loaded());
        assert!(snapshot.slots[1].is_failed());
        assert!(snapshot.slots[2].is_loaded());
        assert_eq!(snapshot.errors, vec!["file:///p/b.jpg".to_string()]);
        assert_eq!(snapshot.completed, 3);
        assert_eq!(
            snapshot.slots[2].image().unwrap().url(),
            "file:///p/c.jpg"
        );

        assert_eq!(report.generated, 2);
        assert_eq!(report.failed, vec!["file:///p/b.jpg".to_string()]);
        assert!(!report.superseded);
    }

    #[tokio::test]
    async fn test_second_run_is_served_from_session() {
        let h = harness(MockThumbnailGenerator::new());
        let input = entries(&["/p/a.jpg", "/p/b.jpg"]);

        h.use_case.execute(&input).await;
        let report = h.use_case.execute(&input).await;

        assert_eq!(report.from_session, 2);
        assert_eq!(report.generated, 0);
        assert_eq!(h.generator.calls().len(), 2);
        assert_eq!(h.use_case.current_generation(), 2);
    }

    #[tokio::test]
    async fn test_durable_entries_skip_generation() {
        let h = harness(MockThumbnailGenerator::new());
        let durable = DurableThumbnailCache::with_defaults(h.store.clone());
        let payload = crate::domain::entities::fixtures::payload_with_len(64);
        durable.set("file:///p/a.jpg", payload).await.unwrap();

        let report = h.use_case.execute(&entries(&["/p/a.jpg"])).await;

        assert_eq!(report.from_durable, 1);
        assert!(h.generator.calls().is_empty());
        assert!(h.session.get("file:///p/a.jpg").await.is_some());
    }

    #[tokio::test]
    async fn test_generated_images_are_persisted() {
        let h = harness(MockThumbnailGenerator::new());

        h.use_case.execute(&entries(&["/p/a.jpg"])).await;

        assert!(h.store.contains("file:///p/a.jpg"));
        assert!(h.session.get("file:///p/a.jpg").await.is_some());
    }

    #[tokio::test]
    async fn test_unavailable_store_does_not_change_outcome() {
        let h = harness_with_store(MockThumbnailGenerator::new(), MockThumbnailStore::failing());

        let report = h.use_case.execute(&entries(&["/p/a.jpg", "/p/b.jpg"])).await;

        assert_eq!(report.generated, 2);
        assert!(report.failed.is_empty());
        assert_eq!(h.use_case.snapshot().await.loaded_count(), 2);
    }

    #[tokio::test]
    async fn test_newer_load_discards_stale_results() {
        let h = harness(
            MockThumbnailGenerator::new().delayed_on("slow", Duration::from_millis(100)),
        );
        let first_entries = entries(&["/a/slow.jpg", "/a/two.jpg"]);
        let use_case = h.use_case.clone();
        let first = tokio::spawn(async move { use_case.execute(&first_entries).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = h.use_case.execute(&entries(&["/b/one.jpg"])).await;
        let first = first.await.unwrap();

        assert!(first.superseded);
        assert_eq!(first.completed, 0);
        assert!(!second.superseded);

        let snapshot = h.use_case.snapshot().await;
        assert_eq!(snapshot.generation, second.generation);
        assert_eq!(snapshot.total(), 1);
        assert_eq!(
            snapshot.slots[0].image().unwrap().url(),
            "file:///b/one.jpg"
        );
        assert!(!h.generator.calls().contains(&"file:///a/two.jpg".to_string()));
    }

    #[tokio::test]
    async fn test_progress_is_published() {
        let h = harness(MockThumbnailGenerator::new().failing_on("file:///p/b.jpg"));
        let rx = h.use_case.subscribe();

        h.use_case
            .execute(&entries(&["/p/a.jpg", "/p/b.jpg"]))
            .await;

        let progress = *rx.borrow();
        assert_eq!(progress.completed, 2);
        assert_eq!(progress.total, 2);
        assert_eq!(progress.failed, 1);
        assert!(progress.is_complete());
    }

    #[tokio::test]
    async fn test_empty_load_resets_previous_results() {
        let h = harness(MockThumbnailGenerator::new());
        h.use_case.execute(&entries(&["/p/a.jpg"])).await;

        let report = h.use_case.execute(&[]).await;

        assert_eq!(report.total, 0);
        let snapshot = h.use_case.snapshot().await;
        assert!(snapshot.slots.is_empty());
        assert_eq!(snapshot.completed, 0);
    }

    #[tokio::test]
    async fn test_pacing_delay_is_applied() {
        let h = harness(MockThumbnailGenerator::new());
        let use_case = LoadDirectoryUseCase::new(
            Arc::new(TestResolver),
            Arc::new(TieredImageCache::session_only(h.session.clone())),
            h.generator.clone(),
        )
        .with_pacing(Duration::from_millis(10));

        let started = std::time::Instant::now();
        use_case.execute(&entries(&["/p/a.jpg", "/p/b.jpg"])).await;

        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
