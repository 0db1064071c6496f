//! Tests for the discretisation control file and the per-variable binning.

use std::io::Cursor;

use categorical_bayes::{
    discretisation::{DiscretisationSettings, Method, discretise},
    errors::ParseError,
    matrix::NamedMatrix,
};

fn sample_matrix(body: &str) -> NamedMatrix<String> {
    NamedMatrix::<String>::from_reader(Cursor::new(body), "samples").unwrap()
}

#[test]
fn test_control_file_parse_and_lookup() {
    let settings = DiscretisationSettings::from_json(
        r#"{
            "Expression": { "method": "threshold", "threshold": 0.5 },
            "Age": { "method": "bracketMedians", "buckets": 3 },
            "Genotype": { "method": "none" }
        }"#,
    )
    .unwrap();

    assert_eq!(settings.method_for("Expression").unwrap(), Method::Threshold(0.5));
    assert_eq!(settings.method_for("Age").unwrap(), Method::BracketMedians(3));
    assert_eq!(settings.method_for("Genotype").unwrap(), Method::None);
    // Variables without an entry keep their raw labels.
    assert_eq!(settings.method_for("Unlisted").unwrap(), Method::None);
}

#[test]
fn test_unknown_method_is_rejected() {
    let settings =
        DiscretisationSettings::from_json(r#"{ "X": { "method": "fourier" } }"#).unwrap();

    assert!(matches!(settings.method_for("X"), Err(ParseError::UnknownMethod(name)) if name == "fourier"));
}

#[test]
fn test_missing_parameter_is_rejected() {
    let settings =
        DiscretisationSettings::from_json(r#"{ "X": { "method": "threshold" } }"#).unwrap();

    assert!(matches!(
        settings.method_for("X"),
        Err(ParseError::MissingParameter { parameter: "threshold", .. })
    ));
}

#[test]
fn test_zero_buckets_are_rejected() {
    let settings = DiscretisationSettings::from_json(
        r#"{ "X": { "method": "bracketMedians", "buckets": 0 } }"#,
    )
    .unwrap();

    assert!(matches!(
        settings.method_for("X"),
        Err(ParseError::InvalidParameter { parameter: "buckets", .. })
    ));
}

#[test]
fn test_malformed_json_is_rejected() {
    assert!(matches!(
        DiscretisationSettings::from_json("{ not json"),
        Err(ParseError::Control(_))
    ));
}

#[test]
fn test_threshold_binning() {
    let raw = sample_matrix("s1 s2 s3 s4\nX 0.1 0.9 0.5 NA\n");
    let settings = DiscretisationSettings::from_json(
        r#"{ "X": { "method": "threshold", "threshold": 0.5 } }"#,
    )
    .unwrap();

    let binned = discretise(&raw, &settings).unwrap();
    assert_eq!(binned.row(0), &["0", "1", "0", "NA"]);
}

#[test]
fn test_none_keeps_raw_labels() {
    let raw = sample_matrix("s1 s2 s3\nX b a NA\n");
    let settings = DiscretisationSettings::default();

    let binned = discretise(&raw, &settings).unwrap();
    assert_eq!(binned.row(0), &["b", "a", "NA"]);
}

#[test]
fn test_rounding_methods() {
    let raw = sample_matrix("s1 s2 s3\nX 1.2 1.8 -0.4\n");

    let ceil = DiscretisationSettings::from_json(r#"{ "X": { "method": "ceil" } }"#).unwrap();
    assert_eq!(discretise(&raw, &ceil).unwrap().row(0), &["2", "2", "0"]);

    let floor = DiscretisationSettings::from_json(r#"{ "X": { "method": "floor" } }"#).unwrap();
    assert_eq!(discretise(&raw, &floor).unwrap().row(0), &["1", "1", "-1"]);

    let round = DiscretisationSettings::from_json(r#"{ "X": { "method": "round" } }"#).unwrap();
    assert_eq!(discretise(&raw, &round).unwrap().row(0), &["1", "2", "0"]);
}

#[test]
fn test_unparsable_cells_discretise_to_na() {
    let raw = sample_matrix("s1 s2\nX high 1.0\n");
    let settings = DiscretisationSettings::from_json(
        r#"{ "X": { "method": "threshold", "threshold": 0.0 } }"#,
    )
    .unwrap();

    let binned = discretise(&raw, &settings).unwrap();
    assert_eq!(binned.row(0), &["NA", "1"]);
}

#[test]
fn test_bracket_medians_splits_into_equal_count_brackets() {
    let raw = sample_matrix("s1 s2 s3 s4 s5 s6\nX 1 2 3 4 5 6\n");
    let settings = DiscretisationSettings::from_json(
        r#"{ "X": { "method": "bracketMedians", "buckets": 2 } }"#,
    )
    .unwrap();

    let binned = discretise(&raw, &settings).unwrap();
    assert_eq!(binned.row(0), &["0", "0", "0", "1", "1", "1"]);
}

#[test]
fn test_z_score_binning() {
    // Mean 3, deviation 2: bins split below 1 and above 5.
    let raw = sample_matrix("s1 s2 s3 s4\nX 0.0 3.0 6.0 3.0\n");
    let settings =
        DiscretisationSettings::from_json(r#"{ "X": { "method": "z-score" } }"#).unwrap();

    let binned = discretise(&raw, &settings).unwrap();
    assert_eq!(binned.row(0), &["0", "1", "2", "1"]);
}

#[test]
fn test_constant_variable_collapses_to_the_middle_z_bin() {
    let raw = sample_matrix("s1 s2\nX 2.0 2.0\n");
    let settings =
        DiscretisationSettings::from_json(r#"{ "X": { "method": "z-score" } }"#).unwrap();

    let binned = discretise(&raw, &settings).unwrap();
    assert_eq!(binned.row(0), &["1", "1"]);
}
