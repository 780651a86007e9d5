//! Results persistence and report loading

use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::BenchmarkResult;

/// Folder-name timestamp format of a benchmark run
pub const RUN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Create `results_dir/<run_id>/` and return it
pub fn create_run_folder<P: AsRef<Path>>(results_dir: P, run_id: &str) -> io::Result<PathBuf> {
    let folder = results_dir.as_ref().join(run_id);
    std::fs::create_dir_all(&folder)?;
    Ok(folder)
}

/// Write the run's records as pretty-printed JSON
pub fn write_results<P: AsRef<Path>>(path: P, results: &[BenchmarkResult]) -> io::Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(results)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, json)
}

/// Metadata of one persisted benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Folder name, e.g. "2025-11-04-09-30-00"
    pub timestamp: String,
    pub status: String,
    pub created_at: Option<String>,
}

/// Enumerate persisted runs, newest first. A run is any folder under
/// `results_dir` containing a `results.json`.
pub fn list_runs<P: AsRef<Path>>(results_dir: P) -> Vec<RunMetadata> {
    let Ok(entries) = std::fs::read_dir(results_dir.as_ref()) else {
        return Vec::new();
    };

    let mut runs: Vec<RunMetadata> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && path.join("results.json").is_file())
        .filter_map(|path| {
            let timestamp = path.file_name()?.to_str()?.to_string();
            let created_at = format_timestamp(&timestamp);
            Some(RunMetadata {
                timestamp,
                status: "completed".to_string(),
                created_at,
            })
        })
        .collect();

    runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    runs
}

/// Load every record of one run
pub fn load_run<P: AsRef<Path>>(results_dir: P, timestamp: &str) -> io::Result<Vec<BenchmarkResult>> {
    let path = results_dir.as_ref().join(timestamp).join("results.json");
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Load a single record of one run by position
pub fn load_result<P: AsRef<Path>>(
    results_dir: P,
    timestamp: &str,
    index: usize,
) -> io::Result<Option<BenchmarkResult>> {
    let mut results = load_run(results_dir, timestamp)?;
    if index < results.len() {
        Ok(Some(results.swap_remove(index)))
    } else {
        Ok(None)
    }
}

/// Render a folder-name timestamp human-readable, or `None` when the folder
/// name is not a run timestamp
pub fn format_timestamp(timestamp: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(timestamp, RUN_TIMESTAMP_FORMAT)
        .ok()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Aggregate figures for one model pipeline
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelSummary {
    pub documents: usize,
    pub failures: usize,
    pub scored: usize,
    pub mean_accuracy: Option<f64>,
    pub total_cost: Option<f64>,
}

/// Aggregate results per model pipeline, in first-seen order
pub fn summarize(results: &[BenchmarkResult]) -> IndexMap<String, ModelSummary> {
    let mut accuracy_sums: IndexMap<String, f64> = IndexMap::new();
    let mut summaries: IndexMap<String, ModelSummary> = IndexMap::new();

    for result in results {
        let label = result.model_label();
        let summary = summaries.entry(label.clone()).or_default();
        summary.documents += 1;
        if result.error.is_some() {
            summary.failures += 1;
        }
        if let Some(score) = result.json_accuracy {
            summary.scored += 1;
            *accuracy_sums.entry(label.clone()).or_insert(0.0) += score;
        }
        if let Some(usage) = &result.usage {
            let cost: f64 = [&usage.ocr, &usage.extraction]
                .into_iter()
                .flatten()
                .filter_map(|u| u.total_cost)
                .sum();
            if cost > 0.0 {
                *summary.total_cost.get_or_insert(0.0) += cost;
            }
        }
    }

    for (label, summary) in summaries.iter_mut() {
        if summary.scored > 0 {
            summary.mean_accuracy = Some(accuracy_sums[label] / summary.scored as f64);
        }
    }

    summaries
}

/// Print a console report of the run
pub fn print_summary(results: &[BenchmarkResult]) {
    println!("\n=== OCR Benchmark Results ===\n");
    println!("Records: {}\n", results.len());
    println!(
        "{:<45} {:>6} {:>8} {:>10} {:>10}",
        "Model", "docs", "errors", "accuracy", "cost"
    );
    println!("{:-<82}", "");

    for (label, summary) in summarize(results) {
        let accuracy = summary
            .mean_accuracy
            .map(|a| format!("{:.4}", a))
            .unwrap_or_else(|| "-".to_string());
        let cost = summary
            .total_cost
            .map(|c| format!("${:.4}", c))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<45} {:>6} {:>8} {:>10} {:>10}",
            label, summary.documents, summary.failures, accuracy, cost
        );
    }

    println!("\n{:=<82}", "");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::config::ModelSpec;
    use crate::dataset::Document;

    fn result(ocr: &str, score: Option<f64>, error: Option<&str>) -> BenchmarkResult {
        let spec = ModelSpec {
            ocr: ocr.to_string(),
            extraction: Some(ocr.to_string()),
            direct_image_extraction: false,
        };
        let doc: Document = serde_json::from_value(json!({
            "imageUrl": "doc.png",
            "jsonSchema": {},
            "trueJsonOutput": {},
            "trueMarkdownOutput": "",
        }))
        .unwrap();

        let mut record = BenchmarkResult::new(&spec, &doc);
        record.json_accuracy = score;
        record.error = error.map(str::to_string);
        record
    }

    #[test]
    fn write_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let folder = create_run_folder(dir.path(), "2025-11-04-09-30-00").unwrap();
        let results = vec![result("gpt-4o", Some(0.75), None)];

        write_results(folder.join("results.json"), &results).unwrap();

        let loaded = load_run(dir.path(), "2025-11-04-09-30-00").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].json_accuracy, Some(0.75));
        assert_eq!(loaded[0].ocr_model, "gpt-4o");

        let single = load_result(dir.path(), "2025-11-04-09-30-00", 0).unwrap();
        assert!(single.is_some());
        let missing = load_result(dir.path(), "2025-11-04-09-30-00", 5).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn runs_list_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        for run_id in ["2025-11-01-10-00-00", "2025-11-03-10-00-00", "2025-11-02-10-00-00"] {
            let folder = create_run_folder(dir.path(), run_id).unwrap();
            write_results(folder.join("results.json"), &[]).unwrap();
        }
        // folder without results.json is not a run
        std::fs::create_dir(dir.path().join("scratch")).unwrap();

        let runs = list_runs(dir.path());
        let timestamps: Vec<&str> = runs.iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(
            timestamps,
            ["2025-11-03-10-00-00", "2025-11-02-10-00-00", "2025-11-01-10-00-00"]
        );
        assert_eq!(runs[0].created_at.as_deref(), Some("2025-11-03 10:00:00"));
    }

    #[test]
    fn timestamps_format_or_pass() {
        assert_eq!(
            format_timestamp("2025-11-04-09-30-00").as_deref(),
            Some("2025-11-04 09:30:00")
        );
        assert_eq!(format_timestamp("not-a-timestamp"), None);
    }

    #[test]
    fn summaries_aggregate_per_model() {
        let results = vec![
            result("gpt-4o", Some(1.0), None),
            result("gpt-4o", Some(0.5), None),
            result("gpt-4o", None, Some("timeout")),
            result("gemini-2.0-flash-001", Some(0.8), None),
        ];

        let summaries = summarize(&results);
        assert_eq!(summaries.len(), 2);

        let gpt = &summaries["gpt-4o -> gpt-4o"];
        assert_eq!(gpt.documents, 3);
        assert_eq!(gpt.failures, 1);
        assert_eq!(gpt.scored, 2);
        assert_eq!(gpt.mean_accuracy, Some(0.75));

        let gemini = &summaries["gemini-2.0-flash-001 -> gemini-2.0-flash-001"];
        assert_eq!(gemini.documents, 1);
        assert_eq!(gemini.mean_accuracy, Some(0.8));
    }
}
