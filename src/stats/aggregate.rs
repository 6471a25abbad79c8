//! Per-entity, per-tag value frequency accumulation.

use std::collections::HashMap;

use crate::ocr::parse::FrameReading;

/// Observed value -> occurrence count for one tag.
pub type ValueCounts = HashMap<u32, u32>;

/// Entity name -> tag -> value frequency buckets, built up one accepted
/// frame at a time.
#[derive(Debug, Default)]
pub struct FrequencyTable {
    entities: HashMap<String, HashMap<String, ValueCounts>>,
}

impl FrequencyTable {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HashMap<String, ValueCounts>)> {
        self.entities.iter().map(|(name, tags)| (name.as_str(), tags))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Value counts for one (entity, tag) bucket, if observed.
    pub fn counts(&self, entity: &str, tag: &str) -> Option<&ValueCounts> {
        self.entities.get(entity)?.get(tag)
    }

    /// Adds another table's counts into this one. Bucket-wise addition is
    /// commutative and associative, so tables built by partitioned workers
    /// combine into exactly the table a single pass would have produced.
    pub fn merge(&mut self, other: FrequencyTable) {
        for (entity, tags) in other.entities {
            let dst_tags = self.entities.entry(entity).or_default();
            for (tag, counts) in tags {
                let dst_counts = dst_tags.entry(tag).or_default();
                for (value, n) in counts {
                    *dst_counts.entry(value).or_insert(0) += n;
                }
            }
        }
    }
}

/// Accumulates frame readings, dropping frames that did not yield enough
/// candidate pairs to be trustworthy.
#[derive(Debug)]
pub struct Aggregator {
    min_pairs: usize,
    table: FrequencyTable,
}

impl Aggregator {
    pub fn new(min_pairs: usize) -> Self {
        Self {
            min_pairs,
            table: FrequencyTable::default(),
        }
    }

    /// Records one frame. A frame with fewer than `min_pairs` candidates
    /// is discarded whole and leaves the table untouched (returns false).
    /// Once a frame passes the gate, every one of its candidates is
    /// counted; the gate is frame-level, never per-candidate.
    pub fn record(&mut self, reading: &FrameReading) -> bool {
        if reading.candidates.len() < self.min_pairs {
            return false;
        }

        let tags = self
            .table
            .entities
            .entry(reading.entity.clone())
            .or_default();
        for candidate in &reading.candidates {
            let counts = tags.entry(candidate.tag.clone()).or_default();
            *counts.entry(candidate.value).or_insert(0) += 1;
        }
        true
    }

    pub fn into_table(self) -> FrequencyTable {
        self.table
    }
}
