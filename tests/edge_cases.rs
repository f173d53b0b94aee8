use tinytiles::parse::{FilterError, StyleError, parse_filter_str, parse_style};
use tinytiles::rewrite::{rewrite_metadata_json, rewrite_tile};
use tinytiles::tile::{self, Coord, Feature, Geometry, Layer};
use tinytiles::{ComparisonOp, KeepPatterns, Literal, Predicate, RetentionPolicy, StyleModel};

fn roads_policy() -> RetentionPolicy {
    let style = StyleModel::from_json(
        r#"{"layers": [{"id": "roads", "source-layer": "roads", "filter": ["==", "class", "motorway"]}]}"#,
    )
    .unwrap();
    RetentionPolicy::new(&style, KeepPatterns::default())
}

// -- Filter grammar ----------------------------------------------------------

#[test]
fn non_array_filters_are_rejected() {
    for (input, kind) in [("{}", "object"), ("\"==\"", "string"), ("42", "number"), ("null", "null")] {
        let err = parse_filter_str(input).unwrap_err();
        assert!(
            matches!(err, FilterError::NotAnArray { found } if found == kind),
            "{input}: {err}"
        );
    }
}

#[test]
fn empty_filter_is_rejected() {
    assert!(matches!(parse_filter_str("[]"), Err(FilterError::Empty)));
}

#[test]
fn operator_must_be_a_string() {
    assert!(matches!(
        parse_filter_str(r#"[1, "class"]"#),
        Err(FilterError::OperatorNotString { found: "number" })
    ));
}

#[test]
fn comparison_needs_a_string_field() {
    assert!(matches!(
        parse_filter_str(r#"["=="]"#),
        Err(FilterError::MissingField { op: ComparisonOp::Eq })
    ));
    assert!(matches!(
        parse_filter_str(r#"["==", 3, 3]"#),
        Err(FilterError::FieldNotString { op: ComparisonOp::Eq, found: "number" })
    ));
}

#[test]
fn family_is_chosen_by_name_not_shape() {
    // expression-style operand in field position is not unwrapped
    let err = parse_filter_str(r#"["==", ["get", "class"], "motorway"]"#).unwrap_err();
    assert!(matches!(err, FilterError::FieldNotString { found: "array", .. }));

    // a nested filter after a comparison operator is just a literal
    let filter = parse_filter_str(r#"["match", "class", ["==", "x", 1], true]"#).unwrap();
    match filter {
        Predicate::Comparison { values, .. } => {
            assert!(values[0].is_compound());
            assert_eq!(values[1], Literal::Bool(true));
        }
        other => panic!("expected a comparison, got {other}"),
    }
}

#[test]
fn empty_logical_node_is_valid() {
    let filter = parse_filter_str(r#"["all"]"#).unwrap();
    assert!(filter.fields().is_empty());
    assert_eq!(filter.depth(), 1);
}

#[test]
fn deep_nesting_reports_root_cause() {
    let err = parse_filter_str(r#"["all", ["any", ["none", ["==", 1]]]]"#).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        FilterError::FieldNotString { found: "number", .. }
    ));
}

#[test]
fn malformed_json_is_a_filter_error() {
    assert!(matches!(parse_filter_str("[\"==\","), Err(FilterError::Json(_))));
}

// -- Style documents ---------------------------------------------------------

#[test]
fn style_must_be_json() {
    assert!(matches!(parse_style("not json"), Err(StyleError::Json(_))));
}

#[test]
fn layer_without_id_is_malformed() {
    assert!(parse_style(r#"{"layers": [{"source-layer": "roads"}]}"#).is_err());
}

#[test]
fn filterless_layer_still_contributes_source_layer() {
    let style = parse_style(r#"{"layers": [{"id": "w", "source-layer": "water"}]}"#).unwrap();
    assert!(style.source_layers().contains("water"));
    assert!(style.fields().is_empty());
}

#[test]
fn empty_style_keeps_only_prefixed_attributes() {
    let style = parse_style(r#"{"layers": []}"#).unwrap();
    let mut policy = RetentionPolicy::new(&style, KeepPatterns::default());
    assert!(!policy.should_keep_layer("roads"));
    assert!(policy.should_keep_attribute("name_int"));
    assert!(policy.should_keep_attribute("reflen"));
    assert!(!policy.should_keep_attribute("class"));
}

// -- Override patterns -------------------------------------------------------

#[test]
fn invalid_override_pattern_fails_up_front() {
    let err = KeepPatterns::new(Some("(unclosed"), None).unwrap_err();
    assert_eq!(err.option, "keep-layers");
    assert_eq!(err.pattern, "(unclosed");

    let err = KeepPatterns::new(None, Some("[")).unwrap_err();
    assert_eq!(err.option, "keep-attributes");
}

#[test]
fn override_patterns_are_unanchored() {
    let style = StyleModel::new(vec![]);
    let mut policy = RetentionPolicy::new(&style, KeepPatterns::new(Some("water"), None).unwrap());
    assert!(policy.should_keep_layer("waterway"));
    assert!(policy.should_keep_layer("water_name"));
    assert!(!policy.should_keep_layer("landuse"));
}

#[test]
fn empty_override_means_unset() {
    let style = StyleModel::new(vec![]);
    let mut policy = RetentionPolicy::new(&style, KeepPatterns::new(Some(""), Some("")).unwrap());
    assert!(!policy.should_keep_layer("anything"));
    assert!(!policy.should_keep_attribute("anything"));
}

// -- Rewriting ---------------------------------------------------------------

#[test]
fn tile_with_only_dropped_layers_encodes_empty() {
    let bytes = tile::encode(
        &[Layer::new(
            "water",
            vec![Feature::new(Geometry::Points(vec![Coord::new(1.0, 1.0)]))],
        )],
        false,
    )
    .unwrap();
    let mut policy = roads_policy();
    let out = rewrite_tile(&bytes, false, &mut policy).unwrap();
    assert!(tile::decode(&out, false).unwrap().is_empty());
    assert!(policy.drops().layers.contains("water"));
}

#[test]
fn feature_clipped_away_is_dropped() {
    let bytes = tile::encode(
        &[Layer::new(
            "roads",
            vec![
                Feature::new(Geometry::Points(vec![Coord::new(9000.0, 9000.0)])),
                Feature::new(Geometry::Points(vec![Coord::new(10.0, 10.0)])),
            ],
        )],
        false,
    )
    .unwrap();
    let out = rewrite_tile(&bytes, false, &mut roads_policy()).unwrap();
    let layers = tile::decode(&out, false).unwrap();
    assert_eq!(layers[0].features.len(), 1);
}

#[test]
fn compression_mismatch_is_a_codec_error() {
    let bytes = tile::encode(&[Layer::new("roads", vec![])], false).unwrap();
    assert!(rewrite_tile(&bytes, true, &mut roads_policy()).is_err());
}

#[test]
fn schema_without_vector_layers_passes_through() {
    let out = rewrite_metadata_json(r#"{"generator": "x"}"#, &mut roads_policy()).unwrap();
    assert_eq!(out, r#"{"generator":"x"}"#);
}
