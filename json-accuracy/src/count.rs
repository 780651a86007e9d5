//! Change counting over compact diffs and leaf-field counting over values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tally of changes found in a compact diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub additions: u64,
    pub deletions: u64,
    pub modifications: u64,
    pub total: u64,
}

/// Walk a compact diff and tally additions, deletions and modifications.
pub fn count_changes(diff: &Value) -> DiffStats {
    let mut stats = DiffStats::default();
    traverse(diff, &mut stats);
    stats.total = stats.additions + stats.deletions + stats.modifications;
    stats
}

fn traverse(node: &Value, stats: &mut DiffStats) {
    match node {
        Value::Array(entries) => {
            for entry in entries {
                let Value::Array(pair) = entry else { continue };
                if pair.len() != 2 {
                    continue;
                }
                let op = pair[0].as_str();
                let element = &pair[1];
                match (op, element) {
                    // An added or deleted record counts all of its leaf
                    // fields, not just one.
                    (Some("+"), Value::Object(_)) => {
                        stats.additions += count_total_fields(element)
                    }
                    (Some("-"), Value::Object(_)) => {
                        stats.deletions += count_total_fields(element)
                    }
                    (Some("~"), Value::Object(_)) => traverse(element, stats),
                    (Some("+"), _) => stats.additions += 1,
                    (Some("-"), _) => stats.deletions += 1,
                    (Some("~"), _) => stats.modifications += 1,
                    _ => {}
                }
            }
        }
        Value::Object(map) => {
            if let Some(weight) = modification_weight(map) {
                stats.modifications += weight;
                return;
            }
            for (key, value) in map {
                if key.ends_with("__deleted") {
                    stats.deletions += leaf_weight(value);
                } else if key.ends_with("__added") {
                    stats.additions += leaf_weight(value);
                } else if let Value::Object(child) = value {
                    if let Some(weight) = modification_weight(child) {
                        stats.modifications += weight;
                    } else {
                        traverse(value, stats);
                    }
                } else if value.is_array() {
                    traverse(value, stats);
                }
            }
        }
        _ => {}
    }
}

/// Weight of a `{"__old", "__new"}` modification box, or `None` when the
/// object is not a box. A null-to-value transition is weighed by the new
/// side, everything else by the old side, with a floor of 1 so scalar
/// replacements still count as one change.
fn modification_weight(map: &Map<String, Value>) -> Option<u64> {
    if !(map.contains_key("__old") && map.contains_key("__new")) {
        return None;
    }
    let old = map.get("__old").unwrap_or(&Value::Null);
    let new = map.get("__new").unwrap_or(&Value::Null);
    let fields = if old.is_null() && !new.is_null() {
        count_total_fields(new)
    } else {
        count_total_fields(old)
    };
    Some(fields.max(1))
}

fn leaf_weight(value: &Value) -> u64 {
    match value {
        Value::Object(_) | Value::Array(_) => count_total_fields(value),
        _ => 1,
    }
}

/// Count the leaf fields of a plain JSON value (not a diff).
///
/// Scalars and nulls under an object key count 1; non-object list elements
/// count 1 each (a nested list inside a list is a single leaf); object
/// elements recurse; keys containing the reserved `__` marker are skipped;
/// containers themselves are never counted.
pub fn count_total_fields(value: &Value) -> u64 {
    let mut count = 0;
    walk(value, &mut count);
    count
}

fn walk(value: &Value, count: &mut u64) {
    match value {
        Value::Array(items) => walk_items(items, count),
        Value::Object(map) => {
            for (key, v) in map {
                if key.contains("__") {
                    continue;
                }
                match v {
                    Value::Array(items) => walk_items(items, count),
                    Value::Object(_) => walk(v, count),
                    _ => *count += 1,
                }
            }
        }
        _ => {}
    }
}

fn walk_items(items: &[Value], count: &mut u64) {
    for item in items {
        if item.is_object() {
            walk(item, count);
        } else {
            *count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counts_scalar_and_nested_leaves() {
        assert_eq!(
            count_total_fields(&json!({"a": 1, "b": {"c": 2, "d": [3, {"e": 4}]}})),
            4
        );
        assert_eq!(
            count_total_fields(&json!({"a": [1, 2, 3], "b": "test", "c": true})),
            5
        );
        assert_eq!(
            count_total_fields(&json!({"a": [{"b": 1}, {"c": 2}], "d": "test", "e": true})),
            4
        );
        assert_eq!(
            count_total_fields(&json!({"a": null, "b": {"c": null}, "d": "test"})),
            3
        );
    }

    #[test]
    fn marker_keys_are_skipped() {
        assert_eq!(
            count_total_fields(&json!({
                "a": 1,
                "b__deleted": true,
                "c__added": "test",
                "d": {"e": 2},
            })),
            2
        );
    }

    #[test]
    fn nested_list_inside_list_counts_one() {
        assert_eq!(count_total_fields(&json!({"a": [[1, 2], 3]})), 2);
    }

    #[test]
    fn scalars_and_empty_containers_count_zero() {
        assert_eq!(count_total_fields(&json!(42)), 0);
        assert_eq!(count_total_fields(&json!({})), 0);
        assert_eq!(count_total_fields(&json!([])), 0);
        assert_eq!(count_total_fields(&Value::Null), 0);
    }

    #[test]
    fn scalar_modification_counts_one() {
        let diff = json!({"a": {"__old": 1, "__new": 2}});
        let stats = count_changes(&diff);
        assert_eq!(stats.modifications, 1);
        assert_eq!(stats.total, 1);
    }

    #[test]
    fn collapsed_list_counts_old_leaf_fields() {
        let diff = json!({"b": {"__old": [1, 2, 3], "__new": null}});
        let stats = count_changes(&diff);
        assert_eq!(stats.modifications, 3);
    }

    #[test]
    fn null_to_value_counts_new_leaf_fields() {
        let diff = json!({"c": {"__old": null, "__new": {"d": 2, "e": 3}}});
        let stats = count_changes(&diff);
        assert_eq!(stats.modifications, 2);
    }

    #[test]
    fn null_to_scalar_floors_at_one() {
        let diff = json!({"c": {"__old": null, "__new": 2}});
        let stats = count_changes(&diff);
        assert_eq!(stats.modifications, 1);
    }

    #[test]
    fn suffix_keys_weigh_by_leaf_count() {
        let diff = json!({
            "plain__added": 7,
            "record__deleted": {"x": 1, "y": 2},
        });
        let stats = count_changes(&diff);
        assert_eq!(stats.additions, 1);
        assert_eq!(stats.deletions, 2);
        assert_eq!(stats.total, 3);
    }

    #[test]
    fn list_entries_count_by_op() {
        let diff = json!([
            ["+", 4],
            ["-", {"x": 1, "y": 2}],
            ["~", {"c": {"__old": 2, "__new": 9}}],
        ]);
        let stats = count_changes(&diff);
        assert_eq!(stats.additions, 1);
        assert_eq!(stats.deletions, 2);
        assert_eq!(stats.modifications, 1);
        assert_eq!(stats.total, 4);
    }

    #[test]
    fn nested_list_diff_entry_counts_one_modification() {
        // a child list diff is not an object, so the entry itself weighs 1
        let diff = json!([["~", [["+", 5]]]]);
        let stats = count_changes(&diff);
        assert_eq!(stats.modifications, 1);
        assert_eq!(stats.additions, 0);
    }

    #[test]
    fn empty_diff_counts_nothing() {
        assert_eq!(count_changes(&json!({})), DiffStats::default());
        assert_eq!(count_changes(&json!([])), DiffStats::default());
    }
}
