use proptest::prelude::*;
use serde_json::{Value as Json, json};

// Field names are drawn from a small pool so unions overlap often.
const FIELDS: &[&str] = &["class", "rank", "surface", "oneway", "bridge", "tunnel", ""];

const COMPARISON_OPS: &[&str] = &[
    "==", "!=", ">", "<", ">=", "<=", "in", "!in", "at", "!has", "index-of", "slice",
    "global-state", "get", "has", "length", "case", "match", "coalesce",
];

const LOGICAL_OPS: &[&str] = &["all", "any", "none"];

/// Attribute names for policy checks, including prefix-rule cases.
pub const ATTRIBUTES: &[&str] = &[
    "class", "rank", "population", "oneway", "name", "name:en", "name_de", "ref", "ref:colour",
    "refuge", "kind",
];

/// A JSON literal operand.
pub fn arb_literal() -> impl Strategy<Value = Json> {
    let leaf = prop_oneof![
        Just(Json::Null),
        any::<bool>().prop_map(Json::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e6_f64..1.0e6).prop_map(|f| json!(f)),
        "[a-z]{0,8}".prop_map(Json::String),
    ];
    leaf.prop_recursive(2, 8, 3, |inner| {
        prop::collection::vec(inner, 0..3).prop_map(Json::Array)
    })
}

/// A comparison filter document and the field it names.
pub fn arb_comparison() -> impl Strategy<Value = (Json, &'static str)> {
    (
        prop::sample::select(COMPARISON_OPS),
        prop::sample::select(FIELDS),
        prop::collection::vec(arb_literal(), 0..4),
    )
        .prop_map(|(op, field, literals)| {
            let mut doc = vec![json!(op), json!(field)];
            doc.extend(literals);
            (Json::Array(doc), field)
        })
}

/// A filter document of bounded depth, mixing comparisons and logical nodes.
pub fn arb_filter() -> impl Strategy<Value = Json> {
    arb_comparison()
        .prop_map(|(doc, _)| doc)
        .prop_recursive(4, 32, 4, |inner| {
            (
                prop::sample::select(LOGICAL_OPS),
                prop::collection::vec(inner, 0..4),
            )
                .prop_map(|(op, children)| {
                    let mut doc = vec![json!(op)];
                    doc.extend(children);
                    Json::Array(doc)
                })
        })
}

/// Every non-empty field named by comparisons in `doc`, walking the JSON directly.
pub fn expected_fields(doc: &Json, out: &mut Vec<String>) {
    let Some(items) = doc.as_array() else {
        return;
    };
    match items.first().and_then(Json::as_str) {
        Some(op) if LOGICAL_OPS.contains(&op) => {
            for child in &items[1..] {
                expected_fields(child, out);
            }
        }
        Some(_) => {
            if let Some(field) = items.get(1).and_then(Json::as_str) {
                if !field.is_empty() && !out.iter().any(|f| f == field) {
                    out.push(field.to_owned());
                }
            }
        }
        None => {}
    }
}

/// A style document whose layers use the given filters.
pub fn style_with_filters(filters: &[Json]) -> String {
    let layers: Vec<Json> = filters
        .iter()
        .enumerate()
        .map(|(i, filter)| json!({"id": format!("layer-{i}"), "source-layer": "roads", "filter": filter}))
        .collect();
    json!({ "version": 8, "layers": layers }).to_string()
}
