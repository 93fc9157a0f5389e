//src/enrich.rs

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, RwLock};

use crate::error::{EnrichError, LookupError};
use crate::types::{Hit, HitAnnotation};

/// External collaborator that fetches descriptive text for a hit's id.
/// `force` asks the collaborator to bypass whatever cache it keeps.
pub trait HitLookup: Send + Sync {
    fn lookup(&self, hit: &Hit, force: bool) -> Result<HitAnnotation, LookupError>;
}

#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Only the first `max_hits` hits, in report order, are looked up.
    pub max_hits: usize,
    pub force: bool,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            max_hits: 10,
            force: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    pub attempted: usize,
    pub enriched: usize,
    pub failed: usize,
}

/// Hits shared between the parser's owner and the enrichment thread.
///
/// Each slot holds an immutable snapshot; the enricher replaces a whole
/// slot at once, so a reader never sees a half-updated hit.
#[derive(Clone, Default)]
pub struct SharedHits {
    slots: Arc<RwLock<Vec<Arc<Hit>>>>,
}

impl SharedHits {
    pub fn new(hits: Vec<Hit>) -> Self {
        Self {
            slots: Arc::new(RwLock::new(hits.into_iter().map(Arc::new).collect())),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<Arc<Hit>> {
        self.slots.read().get(idx).cloned()
    }

    pub fn find(&self, id: &str) -> Option<Arc<Hit>> {
        self.slots.read().iter().find(|h| h.id == id).cloned()
    }

    pub fn snapshot(&self) -> Vec<Arc<Hit>> {
        self.slots.read().clone()
    }

    fn publish(&self, idx: usize, hit: Hit) {
        let mut slots = self.slots.write();
        if let Some(slot) = slots.get_mut(idx) {
            *slot = Arc::new(hit);
        }
    }
}

#[derive(Default)]
struct Completion {
    summary: Mutex<Option<EnrichSummary>>,
    cond: Condvar,
}

impl Completion {
    fn finish(&self, summary: EnrichSummary) {
        *self.summary.lock() = Some(summary);
        self.cond.notify_all();
    }
}

/// Signals the end of one enrichment run even if the lookup panics.
struct FinishOnDrop {
    completion: Arc<Completion>,
    summary: EnrichSummary,
}

impl Drop for FinishOnDrop {
    fn drop(&mut self) {
        self.completion.finish(std::mem::take(&mut self.summary));
    }
}

/// Completion signal for a background enrichment run. Dropping it does not
/// stop the run.
pub struct EnrichmentHandle {
    completion: Arc<Completion>,
}

impl EnrichmentHandle {
    pub fn is_complete(&self) -> bool {
        self.completion.summary.lock().is_some()
    }

    /// Blocks until the run ends. A lookup that never returns blocks forever.
    pub fn wait(&self) -> EnrichSummary {
        let mut summary = self.completion.summary.lock();
        while summary.is_none() {
            self.completion.cond.wait(&mut summary);
        }
        summary.clone().unwrap_or_default()
    }

    /// Like `wait`, giving up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<EnrichSummary> {
        let mut summary = self.completion.summary.lock();
        if summary.is_none() {
            self.completion.cond.wait_for(&mut summary, timeout);
        }
        summary.clone()
    }
}

pub struct HitEnricher<L> {
    lookup: Arc<L>,
    config: EnrichConfig,
}

impl<L: HitLookup + 'static> HitEnricher<L> {
    pub fn new(lookup: L, config: EnrichConfig) -> Self {
        Self {
            lookup: Arc::new(lookup),
            config,
        }
    }

    /// Starts one background run over `hits`. The caller keeps reading
    /// `hits` freely; updated snapshots appear as lookups finish.
    pub fn enrich(&self, hits: &SharedHits) -> Result<EnrichmentHandle, EnrichError> {
        let completion = Arc::new(Completion::default());
        let handle = EnrichmentHandle {
            completion: Arc::clone(&completion),
        };

        let lookup = Arc::clone(&self.lookup);
        let hits = hits.clone();
        let config = self.config.clone();

        thread::Builder::new()
            .name("hit-enricher".to_string())
            .spawn(move || {
                let mut guard = FinishOnDrop {
                    completion,
                    summary: EnrichSummary::default(),
                };
                enrich_into(lookup.as_ref(), &hits, &config, &mut guard.summary);
            })?;

        Ok(handle)
    }
}

/// Synchronous enrichment of the first `config.max_hits` hits.
pub fn enrich_hits<L: HitLookup + ?Sized>(
    lookup: &L,
    hits: &SharedHits,
    config: &EnrichConfig,
) -> EnrichSummary {
    let mut summary = EnrichSummary::default();
    enrich_into(lookup, hits, config, &mut summary);
    summary
}

fn enrich_into<L: HitLookup + ?Sized>(
    lookup: &L,
    hits: &SharedHits,
    config: &EnrichConfig,
    summary: &mut EnrichSummary,
) {
    let max = hits.len().min(config.max_hits);

    for idx in 0..max {
        let Some(snapshot) = hits.get(idx) else {
            break;
        };
        summary.attempted += 1;

        match lookup.lookup(&snapshot, config.force) {
            Ok(annotation) => {
                let mut updated = Hit::clone(&snapshot);
                updated.annotation = Some(annotation);
                hits.publish(idx, updated);
                summary.enriched += 1;
            }
            Err(e) => {
                log::debug!("Enrichment skipped: {e}");
                summary.failed += 1;
            }
        }
    }

    log::info!(
        "Enriched {} of {} hits ({} lookups failed)",
        summary.enriched,
        summary.attempted,
        summary.failed
    );
}
