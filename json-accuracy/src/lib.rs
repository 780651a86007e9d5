//! Structural JSON comparison and accuracy scoring.
//!
//! Compares a predicted JSON value against a ground-truth value and produces
//! a normalized accuracy score together with two diff encodings: a compact
//! diff used for change counting and a full diff meant for display.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//!
//! let actual = json!({"total": 41.90, "items": [{"sku": "A1", "qty": 2}]});
//! let predicted = json!({"total": 41.90, "items": [{"sku": "A1", "qty": 3}]});
//!
//! let result = json_accuracy::calculate_json_accuracy(&actual, &predicted, false);
//! assert_eq!(result.score, 0.6667);
//! assert_eq!(result.json_diff_stats.modifications, 1);
//! ```

mod count;
mod diff;

pub use count::{count_changes, count_total_fields, DiffStats};
pub use diff::{diff_values, uppercase_strings, DiffMode};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of scoring a predicted value against ground truth.
///
/// Field names serialize in camelCase so persisted results keep the shape
/// downstream report tooling reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyResult {
    /// `1 - changes/totalFields`, clamped to `[0, 1]`, rounded to 4 decimals.
    pub score: f64,
    /// Compact diff; `{}` when the values match.
    pub json_diff: Value,
    /// Full (display-oriented) diff; `{}` when the values match.
    pub full_json_diff: Value,
    pub json_diff_stats: DiffStats,
    /// Leaf-field count of the ground-truth value, the score denominator.
    pub total_fields: u64,
}

/// Score `predicted` against `actual`.
///
/// With `ignore_cases` set, every string leaf on both sides is uppercased
/// before diffing and field counting. Total over well-formed JSON values:
/// type mismatches are scored as modifications, never reported as errors.
pub fn calculate_json_accuracy(
    actual: &Value,
    predicted: &Value,
    ignore_cases: bool,
) -> AccuracyResult {
    let (actual, predicted) = if ignore_cases {
        (uppercase_strings(actual), uppercase_strings(predicted))
    } else {
        (actual.clone(), predicted.clone())
    };

    let full_diff = diff_values(&actual, &predicted, DiffMode::Full);
    let compact_diff = diff_values(&actual, &predicted, DiffMode::Compact);
    let total_fields = count_total_fields(&actual);

    if diff::is_empty_diff(&compact_diff) {
        return AccuracyResult {
            score: 1.0,
            json_diff: Value::Object(Map::new()),
            full_json_diff: Value::Object(Map::new()),
            json_diff_stats: DiffStats::default(),
            total_fields,
        };
    }

    let stats = count_changes(&compact_diff);
    let score = if total_fields == 0 {
        if stats.total > 0 {
            0.0
        } else {
            1.0
        }
    } else {
        (1.0 - stats.total as f64 / total_fields as f64).max(0.0)
    };

    AccuracyResult {
        score: round4(score),
        json_diff: compact_diff,
        full_json_diff: full_diff,
        json_diff_stats: stats,
        total_fields,
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
