use std::collections::HashMap;

use crate::aggregate;
use crate::error::Result;
use crate::filter::{filter, FilterSpec};
use crate::models::{AggregateResult, SkillRecord, SortKey};

/// Aggregates keyed by the serialized filter and sort key. Entries are only
/// dropped through [`ResultCache::clear`].
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<String, AggregateResult>,
}

impl ResultCache {
    pub fn key(spec: &FilterSpec, sort_key: SortKey) -> String {
        format!("{}|{}", spec.cache_key(), sort_key)
    }

    pub fn get(&self, key: &str) -> Option<&AggregateResult> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, result: AggregateResult) {
        self.entries.insert(key, result);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Dashboard state for one viewer: the dataset snapshot, the current
/// selection and the results computed for it so far.
#[derive(Debug)]
pub struct Session<'a> {
    dataset: &'a [SkillRecord],
    filter: FilterSpec,
    sort_key: SortKey,
    cache: ResultCache,
}

impl<'a> Session<'a> {
    pub fn new(dataset: &'a [SkillRecord]) -> Self {
        Self {
            dataset,
            filter: FilterSpec::default(),
            sort_key: SortKey::default(),
            cache: ResultCache::default(),
        }
    }

    pub fn with_sort_key(mut self, sort_key: SortKey) -> Self {
        self.sort_key = sort_key;
        self
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn set_filter(&mut self, spec: FilterSpec) {
        self.filter = spec;
    }

    pub fn set_sort_key(&mut self, sort_key: SortKey) {
        self.sort_key = sort_key;
    }

    pub fn selection(&self) -> Vec<&'a SkillRecord> {
        filter(self.dataset, &self.filter)
    }

    /// Aggregate for the current selection, served from the cache when the
    /// same filter and sort key were seen before.
    pub fn aggregate(&mut self) -> Result<AggregateResult> {
        let key = ResultCache::key(&self.filter, self.sort_key);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(%key, "aggregate cache hit");
            return Ok(hit.clone());
        }

        let result = aggregate::summarize(&self.selection(), self.sort_key)?;
        self.cache.insert(key, result.clone());
        Ok(result)
    }

    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}
