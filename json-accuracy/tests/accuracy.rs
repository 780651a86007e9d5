//! End-to-end scoring fixtures.
//!
//! These cases pin the exact scoring behavior: change attribution for
//! additions, deletions and modifications, order-insensitive matching for
//! arrays of records, null-transition weighting, and the score rounding.

use json_accuracy::{calculate_json_accuracy, count_total_fields};
use serde_json::{json, Value};

fn score(actual: Value, predicted: Value) -> f64 {
    calculate_json_accuracy(&actual, &predicted, false).score
}

#[test]
fn identical_json() {
    let v = json!({"a": 1, "b": {"x": "foo"}});
    let res = calculate_json_accuracy(&v, &v, false);
    assert_eq!(res.score, 1.0);
    assert_eq!(res.json_diff, json!({}));
    assert_eq!(res.json_diff_stats.total, 0);
}

#[test]
fn addition() {
    let res = calculate_json_accuracy(&json!({"a": 1}), &json!({"a": 1, "b": 2}), false);
    assert_eq!(res.json_diff["b__added"], json!(2));
    assert_eq!(res.json_diff_stats.additions, 1);
    // 1 addition against 1 total field
    assert_eq!(res.score, 0.0);
}

#[test]
fn modification() {
    let res = calculate_json_accuracy(
        &json!({"a": 1, "b": {"x": 1}}),
        &json!({"a": 2, "b": {"x": 1}}),
        false,
    );
    assert_eq!(res.json_diff["a"]["__old"], json!(1));
    assert_eq!(res.json_diff["a"]["__new"], json!(2));
    // total fields = 2 (a and b.x), 1 modification
    assert_eq!(res.score, 0.5);
}

#[test]
fn list_diffs() {
    let res = calculate_json_accuracy(&json!({"arr": [1, 2]}), &json!({"arr": [1, 3, 4]}), false);
    assert_eq!(
        res.json_diff["arr"],
        json!([["~", {"__old": 2, "__new": 3}], ["+", 4]])
    );
    assert_eq!(res.json_diff_stats.additions, 1);
    assert_eq!(res.json_diff_stats.modifications, 1);
    assert_eq!(res.score, 0.0);
}

#[test]
fn count_total_fields_examples() {
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
    assert_eq!(
        count_total_fields(&json!({"a": 1, "b__deleted": true, "c__added": "test", "d": {"e": 2}})),
        2
    );
}

#[test]
fn flat_and_nested_modifications() {
    assert_eq!(score(json!({"a": 1, "b": 2}), json!({"a": 1, "b": 3})), 0.5);

    assert_eq!(
        score(
            json!({"a": 1, "b": {"c": 2, "d": 4, "e": 4}}),
            json!({"a": 1, "b": {"c": 2, "d": 4, "e": 5}}),
        ),
        0.75
    );

    // one scalar changed plus a same-length primitive list boxed whole
    assert_eq!(
        score(
            json!({"a": 1, "b": [{"c": 2, "d": 4, "e": 4, "f": [2, 9]}]}),
            json!({"a": 1, "b": [{"c": 2, "d": 4, "e": 5, "f": [2, 3]}]}),
        ),
        0.5
    );
}

#[test]
fn array_order_does_not_matter_for_records() {
    let actual = json!({
        "a": 1,
        "b": [
            {"c": 1, "d": 2},
            {"c": 3, "d": 4},
        ],
    });
    let predicted = json!({
        "a": 1,
        "b": [
            {"c": 3, "d": 4},
            {"c": 1, "d": 2},
        ],
    });
    assert_eq!(score(actual, predicted), 1.0);
}

#[test]
fn collapsed_primitive_list_penalized_by_length() {
    assert_eq!(
        score(json!({"a": 1, "b": [1, 2, 3]}), json!({"a": 1, "b": null})),
        0.25
    );
}

#[test]
fn collapsed_record_list_penalized_by_leaf_count() {
    assert_eq!(
        score(
            json!({"a": 1, "b": [{"c": 1, "d": 1}, {"c": 2}, {"c": 3, "e": 4}]}),
            json!({"a": 1, "b": null}),
        ),
        0.1667
    );
}

#[test]
fn collapsed_nested_object() {
    assert_eq!(
        score(
            json!({"a": 1, "b": {"c": 1, "d": {"e": 1, "f": 2}}}),
            json!({"a": 1, "b": {"c": 1, "d": null}}),
        ),
        0.5
    );
}

#[test]
fn null_transitions() {
    // null -> scalar counts one
    assert_eq!(
        score(json!({"a": [{"b": 1, "c": null}]}), json!({"a": [{"b": 1, "c": 2}]})),
        0.5
    );

    // null -> object counts the new side's leaves
    assert_eq!(
        score(
            json!({"a": [{"b": 1, "c": null, "f": 4}]}),
            json!({"a": [{"b": 1, "c": {"d": 2}, "f": 4}]}),
        ),
        0.6667
    );
    assert_eq!(
        score(
            json!({"a": [{"b": 1, "c": null, "f": 4}]}),
            json!({"a": [{"b": 1, "c": {"d": 2, "e": 3}, "f": 4}]}),
        ),
        0.3333
    );

    // null -> list counts the new side's entries
    assert_eq!(
        score(
            json!({"a": [{"b": 1, "c": null, "f": 4}]}),
            json!({"a": [{"b": 1, "c": [3], "f": 4}]}),
        ),
        0.6667
    );

    // value -> null counts the old side
    assert_eq!(
        score(json!({"a": [{"b": 1, "c": 2}]}), json!({"a": [{"b": 1, "c": null}]})),
        0.5
    );
    assert_eq!(
        score(
            json!({"a": [{"b": 1, "c": {"d": 2}}]}),
            json!({"a": [{"b": 1, "c": null}]}),
        ),
        0.5
    );
    assert_eq!(
        score(
            json!({"a": [{"b": 1, "c": {"d": 2, "e": 3}}]}),
            json!({"a": [{"b": 1, "c": null}]}),
        ),
        0.3333
    );
    assert_eq!(
        score(
            json!({"a": [{"b": 1, "c": [3, 2]}]}),
            json!({"a": [{"b": 1, "c": null}]}),
        ),
        0.3333
    );
}

#[test]
fn swapping_sides_swaps_direction_but_keeps_detection() {
    let a = json!({"a": 1, "b": {"x": "old"}});
    let b = json!({"a": 1, "b": {"x": "new"}});

    let forward = calculate_json_accuracy(&a, &b, false);
    let backward = calculate_json_accuracy(&b, &a, false);

    assert_eq!(forward.json_diff["b"]["x"]["__old"], json!("old"));
    assert_eq!(forward.json_diff["b"]["x"]["__new"], json!("new"));
    assert_eq!(backward.json_diff["b"]["x"]["__old"], json!("new"));
    assert_eq!(backward.json_diff["b"]["x"]["__new"], json!("old"));

    // denominator comes from the first argument only
    assert_eq!(forward.total_fields, 2);
    assert_eq!(backward.total_fields, 2);
}

#[test]
fn compact_and_full_diffs_agree_on_emptiness() {
    let cases = [
        (json!({"a": 1}), json!({"a": 1})),
        (json!({"a": 1}), json!({"a": 2})),
        (json!({"a": [{"b": 1}]}), json!({"a": [{"b": 1}]})),
        (json!({"a": [1, 2]}), json!({"a": [2, 1]})),
        (json!({}), json!({"x": 1})),
    ];
    for (actual, predicted) in cases {
        let res = calculate_json_accuracy(&actual, &predicted, false);
        assert_eq!(
            res.json_diff == json!({}),
            res.full_json_diff == json!({}),
            "diff emptiness must agree for {actual} vs {predicted}"
        );
    }
}

#[test]
fn zero_field_denominator() {
    assert_eq!(score(json!({}), json!({})), 1.0);
    assert_eq!(score(json!({}), json!({"x": 1})), 0.0);
}

#[test]
fn case_insensitive_mode() {
    let actual = json!({"name": "Acme Corp", "city": "Berlin"});
    let predicted = json!({"name": "ACME CORP", "city": "berlin"});

    let relaxed = calculate_json_accuracy(&actual, &predicted, true);
    assert_eq!(relaxed.score, 1.0);

    let strict = calculate_json_accuracy(&actual, &predicted, false);
    assert_eq!(strict.score, 0.0);
    assert_eq!(strict.json_diff_stats.modifications, 2);
}
