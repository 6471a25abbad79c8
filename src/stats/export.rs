//! JSON export for resolved results.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::resolve::ResultTable;

/// Writes the result table to a JSON file.
///
/// The output is pretty-printed for human readability. A key absent from
/// an entity's mapping means the tag lacked evidence, not that its value
/// was zero.
pub fn write_results(results: &ResultTable, output_path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(results).context("Failed to serialize results to JSON")?;

    let mut file = File::create(output_path)
        .context(format!("Failed to create output file: {}", output_path.display()))?;

    file.write_all(json.as_bytes())
        .context("Failed to write results")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn test_write_results() {
        let mut results = ResultTable::new();
        let mut tags = BTreeMap::new();
        tags.insert("Kills".to_string(), 12u32);
        tags.insert("Damage".to_string(), 340u32);
        results.insert("Wraith".to_string(), tags);
        results.insert("Pathfinder".to_string(), BTreeMap::new());

        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_results(&results, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"Wraith\""));
        assert!(content.contains("\"Kills\": 12"));
        // empty entity serializes as an empty object, not null
        assert!(content.contains("\"Pathfinder\": {}"));
    }

    #[test]
    fn test_write_results_bad_path_errors() {
        let results = ResultTable::new();
        assert!(write_results(&results, Path::new("/nonexistent/dir/out.json")).is_err());
    }
}
