//! Tests for the named 2-D container and the sample-matrix parser.

use std::io::Cursor;

use categorical_bayes::{
    errors::ParseError,
    matrix::{MatrixError, NamedMatrix},
};

#[test]
fn test_cells_are_row_major() {
    let mut matrix = NamedMatrix::new(2, 3, 0u32);
    matrix.set(0, 2, 7);
    matrix.set(1, 0, 9);

    assert_eq!(*matrix.get(0, 2), 7);
    assert_eq!(*matrix.get(1, 0), 9);
    assert_eq!(matrix.row(0), &[0, 0, 7]);
    assert_eq!(matrix.row(1), &[9, 0, 0]);
}

#[test]
fn test_name_lookup_returns_indices() {
    let mut matrix = NamedMatrix::new(2, 2, 0u32);
    matrix.set_row_names(vec!["a".to_owned(), "b".to_owned()]).unwrap();
    matrix.set_col_names(vec!["x".to_owned(), "y".to_owned()]).unwrap();

    assert_eq!(matrix.row_index("b"), Some(1));
    assert_eq!(matrix.col_index("x"), Some(0));
    assert_eq!(matrix.row_index("missing"), None);
}

#[test]
fn test_name_count_mismatch_is_rejected() {
    let mut matrix = NamedMatrix::new(2, 2, 0u32);
    let result = matrix.set_row_names(vec!["only".to_owned()]);

    assert_eq!(
        result,
        Err(MatrixError::NameCountMismatch { axis: "row", expected: 2, actual: 1 })
    );
}

#[test]
fn test_duplicate_names_are_rejected() {
    let mut matrix = NamedMatrix::new(2, 2, 0u32);
    let result = matrix.set_row_names(vec!["twice".to_owned(), "twice".to_owned()]);

    assert_eq!(result, Err(MatrixError::DuplicateName("twice".to_owned())));
}

#[test]
fn test_row_sum() {
    let mut matrix = NamedMatrix::new(1, 3, 0u32);
    matrix.set(0, 0, 1);
    matrix.set(0, 1, 2);
    matrix.set(0, 2, 3);

    assert_eq!(matrix.row_sum(0), 6);
}

#[test]
fn test_resize_drops_names() {
    let mut matrix = NamedMatrix::new(1, 1, 0u8);
    matrix.set_row_names(vec!["a".to_owned()]).unwrap();
    matrix.resize(3, 3, 1);

    assert_eq!(matrix.row_count(), 3);
    assert_eq!(matrix.col_count(), 3);
    assert!(matrix.row_names().is_empty());
    assert_eq!(*matrix.get(2, 2), 1);
}

#[test]
fn test_sample_parse() {
    let input = "s1 s2 s3\nDifficulty 0.1 0.9 NA\nGrade 1 2 3\n";
    let matrix = NamedMatrix::<String>::from_reader(Cursor::new(input), "samples").unwrap();

    assert_eq!(matrix.row_count(), 2);
    assert_eq!(matrix.col_count(), 3);
    assert_eq!(matrix.row_names(), &["Difficulty".to_owned(), "Grade".to_owned()]);
    assert_eq!(matrix.col_names(), &["s1".to_owned(), "s2".to_owned(), "s3".to_owned()]);
    assert_eq!(matrix.get(0, 2), "NA");
    assert_eq!(matrix.get(1, 1), "2");
}

#[test]
fn test_sample_parse_skips_blank_lines() {
    let input = "s1 s2\n\nA 1 2\n\nB 3 4\n";
    let matrix = NamedMatrix::<String>::from_reader(Cursor::new(input), "samples").unwrap();

    assert_eq!(matrix.row_count(), 2);
    assert_eq!(matrix.get(1, 0), "3");
}

#[test]
fn test_sample_parse_rejects_short_rows() {
    let input = "s1 s2 s3\nA 1 2\n";
    let result = NamedMatrix::<String>::from_reader(Cursor::new(input), "samples");

    assert!(matches!(result, Err(ParseError::MalformedLine { kind: "sample", line: 2, .. })));
}
