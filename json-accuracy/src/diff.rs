//! Recursive structural diff over JSON values.

use serde_json::{json, Map, Value};

/// Output encoding produced by [`diff_values`].
///
/// Both encodings carry the same information; one recursion emits either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffMode {
    /// Counting-optimized: suffix-tagged keys (`key__added`, `key__deleted`),
    /// `{"__old", "__new"}` boxes, and `[op, value]` list entries.
    Compact,
    /// Display-oriented: explicit `{"__op": ..}` / `{"op": ..}` tag objects.
    Full,
}

/// Recursively uppercase every string leaf. Containers are walked; other
/// leaves pass through unchanged.
pub fn uppercase_strings(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.to_uppercase()),
        Value::Array(items) => Value::Array(items.iter().map(uppercase_strings).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), uppercase_strings(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Diff two JSON values positioned at the same conceptual path.
///
/// An empty object or empty array result means "no difference at or below
/// this node". Object keys are visited in lexicographic order (the map is
/// BTreeMap-backed), so repeated runs agree byte for byte.
pub fn diff_values(a: &Value, b: &Value, mode: DiffMode) -> Value {
    match (a, b) {
        (Value::Null, Value::Null) => Value::Object(Map::new()),
        (Value::Object(ma), Value::Object(mb)) => diff_objects(ma, mb, mode),
        (Value::Array(la), Value::Array(lb)) => diff_arrays(la, lb, mode),
        // Primitive pairs, and any container/non-container or object/array
        // mismatch: unequal values become a whole-value modification.
        _ => {
            if a == b {
                Value::Object(Map::new())
            } else {
                modification(a, b, mode)
            }
        }
    }
}

/// True when a diff node carries no changes.
pub(crate) fn is_empty_diff(diff: &Value) -> bool {
    match diff {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn modification(old: &Value, new: &Value, mode: DiffMode) -> Value {
    match mode {
        DiffMode::Compact => json!({"__old": old, "__new": new}),
        DiffMode::Full => json!({"__op": "~", "__old": old, "__new": new}),
    }
}

fn diff_objects(a: &Map<String, Value>, b: &Map<String, Value>, mode: DiffMode) -> Value {
    let mut result = Map::new();

    let mut keys: Vec<&String> = a.keys().chain(b.keys()).collect();
    keys.sort();
    keys.dedup();

    for key in keys {
        match (a.get(key), b.get(key)) {
            (Some(va), None) => {
                match mode {
                    DiffMode::Compact => result.insert(format!("{key}__deleted"), va.clone()),
                    DiffMode::Full => result.insert(key.clone(), json!({"__op": "-", "__old": va})),
                };
            }
            (None, Some(vb)) => {
                match mode {
                    DiffMode::Compact => result.insert(format!("{key}__added"), vb.clone()),
                    DiffMode::Full => result.insert(key.clone(), json!({"__op": "+", "__new": vb})),
                };
            }
            (Some(va), Some(vb)) => {
                let both_objects = va.is_object() && vb.is_object();
                let both_arrays = va.is_array() && vb.is_array();
                if both_objects || both_arrays {
                    let child = diff_values(va, vb, mode);
                    if !is_empty_diff(&child) {
                        match mode {
                            DiffMode::Compact => result.insert(key.clone(), child),
                            DiffMode::Full => {
                                result.insert(key.clone(), json!({"__op": "~", "diff": child}))
                            }
                        };
                    }
                } else if va != vb {
                    result.insert(key.clone(), modification(va, vb, mode));
                }
            }
            (None, None) => unreachable!("key came from the union of both maps"),
        }
    }

    Value::Object(result)
}

fn diff_arrays(a: &[Value], b: &[Value], mode: DiffMode) -> Value {
    let all_objects =
        a.iter().all(Value::is_object) && b.iter().all(Value::is_object);

    // Same-length lists of objects: greedy first-fit multiset match, so
    // reordered arrays of records compare equal. First-fit is deliberate;
    // optimal matching would change scores on ambiguous inputs.
    if a.len() == b.len() && all_objects {
        let mut pool: Vec<&Value> = b.iter().collect();
        let mut matched = true;
        for va in a {
            match pool
                .iter()
                .position(|vb| is_empty_diff(&diff_values(va, vb, DiffMode::Compact)))
            {
                Some(idx) => {
                    pool.remove(idx);
                }
                None => {
                    matched = false;
                    break;
                }
            }
        }
        if matched && pool.is_empty() {
            return Value::Array(Vec::new());
        }
    }

    if !all_objects {
        if a == b {
            return Value::Array(Vec::new());
        }
        if a.len() == b.len() {
            // No element correspondence can be established; penalize as a
            // modification of the whole list so changes count per field.
            return match mode {
                DiffMode::Compact => json!({"__old": a, "__new": b}),
                DiffMode::Full => json!({"__op": "~", "__old": a, "__new": b}),
            };
        }
        // Mismatched lengths fall through to index-wise comparison so
        // additions and deletions are attributed per slot.
    }

    let mut result = Vec::new();
    for i in 0..a.len().max(b.len()) {
        match (a.get(i), b.get(i)) {
            (Some(va), None) => result.push(match mode {
                DiffMode::Compact => json!(["-", va]),
                DiffMode::Full => json!({"op": "-", "value": va}),
            }),
            (None, Some(vb)) => result.push(match mode {
                DiffMode::Compact => json!(["+", vb]),
                DiffMode::Full => json!({"op": "+", "value": vb}),
            }),
            (Some(va), Some(vb)) => {
                let both_objects = va.is_object() && vb.is_object();
                let both_arrays = va.is_array() && vb.is_array();
                if both_objects || both_arrays {
                    let child = diff_values(va, vb, mode);
                    if !is_empty_diff(&child) {
                        result.push(match mode {
                            DiffMode::Compact => json!(["~", child]),
                            DiffMode::Full => json!({"op": "~", "diff": child}),
                        });
                    }
                } else if va != vb {
                    result.push(match mode {
                        DiffMode::Compact => json!(["~", {"__old": va, "__new": vb}]),
                        DiffMode::Full => json!({"op": "~", "value": {"__old": va, "__new": vb}}),
                    });
                }
            }
            (None, None) => unreachable!("index bounded by the longer list"),
        }
    }
    Value::Array(result)
}
