//! Tests for the TGF, NA and SIF topology readers.

use std::{fs, path::PathBuf};

use categorical_bayes::{
    errors::{NetworkError, ParseError},
    network::Network,
};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const STUDENT_TGF: &str = "\
1 Difficulty
2 Intelligence
3 Grade
4 SAT
5 Letter
#
1 3
2 3
2 4
3 5
";

#[test]
fn test_tgf_load_builds_the_student_topology() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "student.tgf", STUDENT_TGF);

    let mut network = Network::new();
    network.read_network(&path).unwrap();

    assert_eq!(network.node_count(), 5);
    let grade = network.get_index("Grade").unwrap();
    let difficulty = network.get_index("Difficulty").unwrap();
    let intelligence = network.get_index("Intelligence").unwrap();
    let letter = network.get_index("Letter").unwrap();
    assert_eq!(network.node(grade).parents(), &[difficulty, intelligence]);
    assert_eq!(network.node(letter).parents(), &[grade]);
}

#[test]
fn test_tgf_identifiers_need_not_be_dense() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "sparse.tgf", "10 a\n30 b\n20 c\n#\n10 30\n30 20\n");

    let mut network = Network::new();
    network.read_network(&path).unwrap();

    let a = network.get_index("a").unwrap();
    let b = network.get_index("b").unwrap();
    let c = network.get_index("c").unwrap();
    assert_eq!((a, b, c), (0, 1, 2));
    assert_eq!(network.node(c).parents(), &[b]);
}

#[test]
fn test_tgf_without_edges_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "noedges.tgf", "1 a\n2 b\n#\n");

    let mut network = Network::new();
    assert!(matches!(network.read_network(&path), Err(ParseError::NoEdges)));
}

#[test]
fn test_tgf_cycle_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "cycle.tgf", "1 a\n2 b\n3 c\n#\n1 2\n2 3\n3 1\n");

    let mut network = Network::new();
    assert!(matches!(
        network.read_network(&path),
        Err(ParseError::Network(NetworkError::CycleDetected))
    ));
}

#[test]
fn test_tgf_malformed_node_line_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bad.tgf", "1 a\nnot-an-id b\n#\n1 2\n");

    let mut network = Network::new();
    assert!(matches!(
        network.read_network(&path),
        Err(ParseError::MalformedLine { kind: "tgf", line: 2, .. })
    ));
}

#[test]
fn test_na_and_sif_load() {
    let dir = TempDir::new().unwrap();
    let na = write_file(
        &dir,
        "student.na",
        "Node unknown Name\n1 = Difficulty\n2 = Intelligence\n3 = Grade\n4 = SAT\n5 = Letter\n",
    );
    let sif = write_file(&dir, "student.sif", "1 -> 3\n2 -> 3\n2 -> 4\n3 -> 5\n");

    let mut network = Network::new();
    network.read_network(&na).unwrap();
    assert_eq!(network.node_count(), 5);

    network.read_network(&sif).unwrap();
    let grade = network.get_index("Grade").unwrap();
    assert_eq!(
        network.node(grade).parents(),
        &[network.get_index("Difficulty").unwrap(), network.get_index("Intelligence").unwrap()]
    );
}

#[test]
fn test_sif_without_prior_na_load_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "orphan.sif", "1 -> 2\n");

    let mut network = Network::new();
    assert!(matches!(network.read_network(&path), Err(ParseError::MissingNodeFile)));
}

#[test]
fn test_unknown_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "model.xml", "<nope/>");

    let mut network = Network::new();
    assert!(matches!(network.read_network(&path), Err(ParseError::UnknownExtension(_))));
}

#[test]
fn test_unregistered_edge_identifier_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "dangling.tgf", "1 a\n2 b\n#\n1 9\n");

    let mut network = Network::new();
    assert!(matches!(
        network.read_network(&path),
        Err(ParseError::Network(NetworkError::OriginalIdNotFound(9)))
    ));
}
