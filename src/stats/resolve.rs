//! Majority-vote reduction of the frequency table.

use std::collections::BTreeMap;

use super::aggregate::{FrequencyTable, ValueCounts};

/// Final resolved values: entity -> tag -> value. BTreeMap so the
/// serialized output is stable across runs.
pub type ResultTable = BTreeMap<String, BTreeMap<String, u32>>;

/// Reduces every (entity, tag) bucket to its most frequent value.
///
/// A tie on the top count goes to the smallest value, which makes the
/// result independent of observation order. A tag whose winning count is
/// below `min_evidence` is omitted entirely; absence in the output means
/// "not enough clean frames", never "measured as zero". Entities left
/// with no surviving tag stay in the table as empty entries unless
/// `keep_empty` is false.
pub fn resolve(table: &FrequencyTable, min_evidence: u32, keep_empty: bool) -> ResultTable {
    let mut result = ResultTable::new();

    for (entity, tags) in table.iter() {
        let mut resolved = BTreeMap::new();
        for (tag, counts) in tags {
            if let Some((value, count)) = majority(counts) {
                if count >= min_evidence {
                    resolved.insert(tag.clone(), value);
                }
            }
        }
        if !resolved.is_empty() || keep_empty {
            result.insert(entity.to_string(), resolved);
        }
    }

    result
}

/// The highest-count (value, count) in a bucket; ties broken by the
/// smallest value.
fn majority(counts: &ValueCounts) -> Option<(u32, u32)> {
    counts
        .iter()
        .map(|(&value, &count)| (value, count))
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::parse::{Candidate, FrameReading};
    use crate::stats::aggregate::Aggregator;

    fn table_with(pairs: &[(&str, &str, u32, u32)]) -> FrequencyTable {
        // (entity, tag, value, repetitions)
        let mut agg = Aggregator::new(1);
        for &(entity, tag, value, reps) in pairs {
            for _ in 0..reps {
                agg.record(&FrameReading {
                    entity: entity.to_string(),
                    candidates: vec![Candidate {
                        tag: tag.to_string(),
                        value,
                    }],
                });
            }
        }
        agg.into_table()
    }

    #[test]
    fn test_majority_value_wins() {
        let table = table_with(&[("Wraith", "Kills", 12, 5), ("Wraith", "Kills", 13, 1)]);
        let result = resolve(&table, 3, true);
        assert_eq!(result["Wraith"]["Kills"], 12);
    }

    #[test]
    fn test_insufficient_evidence_omits_tag() {
        let table = table_with(&[("Wraith", "Kills", 12, 2)]);
        let result = resolve(&table, 3, true);
        assert!(!result["Wraith"].contains_key("Kills"));
    }

    #[test]
    fn test_tie_breaks_to_smallest_value() {
        let table = table_with(&[("Wraith", "Kills", 7, 3), ("Wraith", "Kills", 5, 3)]);
        let result = resolve(&table, 3, true);
        assert_eq!(result["Wraith"]["Kills"], 5);
    }

    #[test]
    fn test_empty_entity_kept_by_default() {
        let table = table_with(&[("Wraith", "Kills", 12, 1)]);
        let result = resolve(&table, 3, true);
        assert!(result.contains_key("Wraith"));
        assert!(result["Wraith"].is_empty());
    }

    #[test]
    fn test_empty_entity_pruned_when_configured() {
        let table = table_with(&[("Wraith", "Kills", 12, 1)]);
        let result = resolve(&table, 3, false);
        assert!(!result.contains_key("Wraith"));
    }

    #[test]
    fn test_tags_resolved_independently() {
        let table = table_with(&[
            ("Wraith", "Kills", 12, 4),
            ("Wraith", "Damage", 340, 2),
            ("Wraith", "Assists", 7, 3),
        ]);
        let result = resolve(&table, 3, true);
        assert_eq!(result["Wraith"]["Kills"], 12);
        assert_eq!(result["Wraith"]["Assists"], 7);
        // Damage only saw 2 frames of evidence
        assert!(!result["Wraith"].contains_key("Damage"));
    }

    #[test]
    fn test_empty_table_resolves_empty() {
        let table = FrequencyTable::default();
        assert!(resolve(&table, 3, true).is_empty());
    }
}
