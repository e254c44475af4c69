// src/pipeline/collect.rs

//! Collection driver.
//!
//! Orchestrates search pagination, enrichment, and incremental flushing
//! in a bounded loop until the target record count is reached or every
//! API key is exhausted. The loop bound caps worst-case runtime even
//! under pervasive dedup misses.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::models::{Config, VideoRecord};
use crate::services::{CollectionCursor, DedupStore, KeyRotator, SearchPaginator, StatsFetcher};
use crate::storage::CsvSink;
use crate::utils::log;

/// Why the collection loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The configured target record count was reached.
    TargetReached,
    /// Every API key hit its quota.
    QuotaExhausted,
    /// The safety bound on iterations ran out before the target.
    IterationLimit,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::TargetReached => "target reached",
            Termination::QuotaExhausted => "all API keys exhausted",
            Termination::IterationLimit => "iteration limit reached",
        }
    }
}

/// Summary of a collection run.
#[derive(Debug)]
pub struct CollectOutcome {
    /// Records accepted (deduplicated) during this run.
    pub accepted: usize,
    /// Periodic flushes performed before the terminal flush.
    pub periodic_flushes: usize,
    /// API key switches observed.
    pub key_switches: usize,
    pub termination: Termination,
}

/// Owns all mutable collection state for the duration of one run.
///
/// Nothing here persists across runs; only records written to the sink do.
pub struct CollectionDriver {
    config: Config,
    paginator: SearchPaginator,
    fetcher: StatsFetcher,
    sink: CsvSink,
    keys: KeyRotator,
    dedup: DedupStore,
    buffer: Vec<VideoRecord>,
    accepted: usize,
    flushed_marks: usize,
    periodic_flushes: usize,
}

impl CollectionDriver {
    /// Build a driver, seeding the dedup store from the existing sink.
    pub fn new(config: &Config) -> Result<Self> {
        let sink = CsvSink::new(&config.paths.output_file);
        let existing = sink.existing_ids()?;
        if !existing.is_empty() {
            log::info(&format!(
                "Loaded {} existing records from {:?}",
                existing.len(),
                sink.path()
            ));
        }
        let mut dedup = DedupStore::new();
        dedup.seed(existing);

        Ok(Self {
            paginator: SearchPaginator::new(config)?,
            fetcher: StatsFetcher::new(config)?,
            keys: KeyRotator::new(config.api.keys.clone())?,
            sink,
            dedup,
            buffer: Vec::new(),
            accepted: 0,
            flushed_marks: 0,
            periodic_flushes: 0,
            config: config.clone(),
        })
    }

    /// Build a driver against overridden endpoint URLs (used by tests).
    pub fn with_endpoints(config: &Config, search_url: &str, videos_url: &str) -> Result<Self> {
        let mut driver = Self::new(config)?;
        driver.paginator = driver.paginator.with_endpoint(search_url);
        driver.fetcher = driver.fetcher.with_endpoint(videos_url);
        Ok(driver)
    }

    /// Run the collection loop to one of its terminal states.
    ///
    /// Buffered records are flushed once more on every terminal path.
    pub async fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<CollectOutcome> {
        let target = self.config.collection.target_count;
        let page_size = self.config.api.page_size.max(1);
        let max_iterations = (target / page_size).max(1) * self.config.collection.safety_factor;

        let mut cursor = CollectionCursor::default();
        let mut termination = Termination::IterationLimit;

        for _ in 0..max_iterations {
            match self.step(rng, &mut cursor).await {
                Ok(()) => {}
                Err(error) if error.is_quota_exhausted() => {
                    termination = Termination::QuotaExhausted;
                    break;
                }
                // Persistence and retry-cap failures surface unmasked,
                // but not before salvaging what the buffer already holds.
                Err(error) => {
                    if let Err(flush_error) = self.sink.append(&mut self.buffer) {
                        log::error(&format!(
                            "Flush on the failure path also failed: {flush_error}"
                        ));
                    }
                    return Err(error);
                }
            }

            if self.accepted >= target {
                termination = Termination::TargetReached;
                break;
            }

            if self.config.api.page_delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(
                    self.config.api.page_delay_ms,
                ))
                .await;
            }
        }

        self.sink.append(&mut self.buffer)?;
        log::success(&format!(
            "Collection stopped: {} ({} records accepted)",
            termination.as_str(),
            self.accepted
        ));

        Ok(CollectOutcome {
            accepted: self.accepted,
            periodic_flushes: self.periodic_flushes,
            key_switches: self.keys.switches(),
            termination,
        })
    }

    /// One iteration: fetch a page, enrich it, maybe flush.
    async fn step<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        cursor: &mut CollectionCursor,
    ) -> Result<()> {
        let mut records = self
            .paginator
            .next_page(rng, &mut self.keys, &mut self.dedup, cursor)
            .await?;
        if records.is_empty() {
            return Ok(());
        }

        let ids: Vec<String> = records.iter().map(|r| r.video_id.clone()).collect();
        let stats = self.fetcher.fetch(&mut self.keys, &ids).await?;
        for record in &mut records {
            if let Some(s) = stats.get(&record.video_id) {
                record.apply_stats(s);
            }
        }

        self.accepted += records.len();
        self.buffer.extend(records);

        // Flush whenever the accepted count crosses a save-interval mark,
        // bounding both memory growth and crash loss to one interval.
        let marks = self.accepted / self.config.collection.save_interval;
        if marks > self.flushed_marks {
            self.flushed_marks = marks;
            self.sink.append(&mut self.buffer)?;
            self.periodic_flushes += 1;
            log::info(&format!("Collected {} records so far", self.accepted));
        }

        Ok(())
    }
}

/// Run the collector from configuration.
pub async fn run_collect(config: &Config) -> Result<()> {
    log::header("tubepulse: collecting non-trending videos");
    config.validate()?;

    let mut driver = CollectionDriver::new(config)?;
    let mut rng = StdRng::from_os_rng();
    let outcome = driver.run(&mut rng).await?;

    log::summary(
        "Collection run",
        &[
            ("Accepted records", outcome.accepted.to_string()),
            ("Periodic flushes", outcome.periodic_flushes.to_string()),
            ("Key switches", outcome.key_switches.to_string()),
            ("Stopped because", outcome.termination.as_str().to_string()),
            ("Output", config.paths.output_file.clone()),
        ],
    );

    Ok(())
}
