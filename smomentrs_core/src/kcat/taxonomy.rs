//! Taxonomic ranking of organisms
//!
//! Lineages are ordered nearest first (species, genus, family, ...). The distance of an
//! organism to a base organism is the position, in the base's lineage, of the nearest taxon
//! both share.
use std::path::Path;
use std::thread;
use std::time::Duration;

use indexmap::IndexMap;
use thiserror::Error;

use crate::cache::KeyValueCache;
use crate::io::project::{read_json_file, ProjectDataError};

/// Taxa of an organism, nearest first
pub type Lineage = Vec<String>;

/// Number of organisms sent to a [`TaxonomySource`] in one query
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Distance of every organism in `lineages` to `base`
///
/// Organisms sharing no taxon with the base are left out, callers rank them after all others.
/// The base organism itself has distance 0. If `base` has no known lineage the result is empty.
pub fn taxonomic_distances(base: &str, lineages: &IndexMap<String, Lineage>) -> IndexMap<String, usize> {
    let Some(base_lineage) = lineages.get(base) else {
        return IndexMap::new();
    };
    let mut rank: IndexMap<&str, usize> = IndexMap::new();
    for (position, taxon) in base_lineage.iter().enumerate() {
        rank.entry(taxon.as_str()).or_insert(position);
    }

    lineages
        .iter()
        .filter_map(|(organism, lineage)| {
            lineage
                .iter()
                .find_map(|taxon| rank.get(taxon.as_str()).copied())
                .map(|distance| (organism.clone(), distance))
        })
        .collect()
}

/// Provides lineages for organisms, organisms without a known lineage are left out
pub trait TaxonomyProvider {
    fn lineages(&mut self, organisms: &[String]) -> IndexMap<String, Lineage>;
}

/// A (possibly remote) service answering batched lineage queries
pub trait TaxonomySource {
    /// Query the lineages of a batch of organisms, unknown organisms are left out
    fn query(&mut self, organisms: &[String]) -> Result<IndexMap<String, Lineage>, TaxonomyError>;
}

/// Lineages known ahead of time, typically read from a JSON file `{organism: [taxa...]}`
#[derive(Clone, Debug, Default)]
pub struct StaticTaxonomy {
    lineages: IndexMap<String, Lineage>,
}

impl StaticTaxonomy {
    pub fn new(lineages: IndexMap<String, Lineage>) -> Self {
        StaticTaxonomy { lineages }
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, TaxonomyError> {
        Ok(StaticTaxonomy::new(read_json_file(path)?))
    }
}

impl TaxonomySource for StaticTaxonomy {
    fn query(&mut self, organisms: &[String]) -> Result<IndexMap<String, Lineage>, TaxonomyError> {
        Ok(self.lineages(organisms))
    }
}

impl TaxonomyProvider for StaticTaxonomy {
    fn lineages(&mut self, organisms: &[String]) -> IndexMap<String, Lineage> {
        organisms
            .iter()
            .filter_map(|o| self.lineages.get(o).map(|l| (o.clone(), l.clone())))
            .collect()
    }
}

/// Bounded retries with exponential backoff
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub backoff_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(10),
            backoff_factor: 2,
        }
    }
}

/// A [`TaxonomySource`] behind a cache
///
/// Every queried organism is cached, including organisms the source does not know (stored as
/// `None`), so no organism is ever queried twice. A batch whose query still fails after all
/// retries is treated as having no known lineages and is not cached.
pub struct CachedTaxonomy<S, C> {
    source: S,
    cache: C,
    retry: RetryPolicy,
    batch_size: usize,
}

impl<S, C> CachedTaxonomy<S, C>
where
    S: TaxonomySource,
    C: KeyValueCache<Option<Lineage>>,
{
    pub fn new(source: S, cache: C) -> Self {
        CachedTaxonomy {
            source,
            cache,
            retry: RetryPolicy::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    fn query_with_retry(&mut self, batch: &[String]) -> Result<IndexMap<String, Lineage>, TaxonomyError> {
        let mut backoff = self.retry.initial_backoff;
        let mut attempt = 1;
        loop {
            match self.source.query(batch) {
                Ok(found) => return Ok(found),
                Err(err) if attempt < self.retry.max_attempts => {
                    log::warn!(
                        "Taxonomy query failed (attempt {} of {}): {}, retrying in {:?}",
                        attempt,
                        self.retry.max_attempts,
                        err,
                        backoff
                    );
                    thread::sleep(backoff);
                    backoff *= self.retry.backoff_factor;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl<S, C> TaxonomyProvider for CachedTaxonomy<S, C>
where
    S: TaxonomySource,
    C: KeyValueCache<Option<Lineage>>,
{
    fn lineages(&mut self, organisms: &[String]) -> IndexMap<String, Lineage> {
        let mut result = IndexMap::new();
        let mut missing = Vec::new();
        for organism in organisms {
            match self.cache.get(organism) {
                Some(Some(lineage)) => {
                    result.insert(organism.clone(), lineage);
                }
                Some(None) => {}
                None => missing.push(organism.clone()),
            }
        }

        let batch_size = self.batch_size;
        for batch in missing.chunks(batch_size) {
            let found = match self.query_with_retry(batch) {
                Ok(found) => found,
                Err(err) => {
                    log::warn!(
                        "Giving up on the taxonomy of {} organisms after {} attempts: {}",
                        batch.len(),
                        self.retry.max_attempts,
                        err
                    );
                    continue;
                }
            };
            for organism in batch {
                let lineage = found.get(organism).cloned();
                if lineage.is_none() {
                    log::warn!("No taxonomy found for {}", organism);
                }
                if let Err(err) = self.cache.put(organism, lineage.clone()) {
                    log::warn!("Unable to cache the taxonomy of {}: {}", organism, err);
                }
                if let Some(lineage) = lineage {
                    result.insert(organism.clone(), lineage);
                }
            }
        }
        result
    }
}

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Taxonomy query failed: {0}")]
    Query(String),
    #[error("Unable to read taxonomy data")]
    ProjectData(#[from] ProjectDataError),
}
