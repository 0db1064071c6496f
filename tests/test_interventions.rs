//! Tests for the do-operator: CPT pinning, backup round-trips and the twin
//! network used for counterfactual queries.

mod common;

use categorical_bayes::{
    interventions::{do_intervention, reverse_do_intervention},
    matrix::NamedMatrix,
    probability::ProbabilityHandler,
};
use common::{DIFFICULTY, GRADE, INTELLIGENCE, LETTER, student_network};

const SCENARIO_TOLERANCE: f64 = 1e-6;

#[test]
fn test_do_severs_incoming_edges_and_pins_the_cpt() {
    let mut network = student_network();
    do_intervention(&mut network, "Grade", "g2").unwrap();

    let grade = network.node(GRADE);
    assert!(!grade.has_parents());
    assert_eq!(grade.probabilities().row_count(), 1);
    assert_eq!(grade.probabilities().row(0), &[0.0, 1.0, 0.0]);
    assert_eq!(network.parents_from_adjacency(GRADE), Vec::<usize>::new());

    // Downstream inference sees the clamp.
    let handler = ProbabilityHandler::new(&network);
    let letter = handler.total_probability(LETTER, 1).unwrap();
    assert!((letter - 0.6).abs() < SCENARIO_TOLERANCE, "P(l1 | do g2) = {letter}");
}

#[test]
fn test_clamping_upstream_nodes_matches_the_textbook_value() {
    let mut network = student_network();
    do_intervention(&mut network, "Intelligence", "i0").unwrap();
    do_intervention(&mut network, "Letter", "l1").unwrap();

    let handler = ProbabilityHandler::new(&network);
    let g1 = handler.total_probability(GRADE, 0).unwrap();
    // Letter has no children, so this equals P(g1 | i0) = 0.2.
    assert!((g1 - 0.2).abs() < SCENARIO_TOLERANCE, "P(g1 | do i0, do l1) = {g1}");
}

#[test]
fn test_do_and_reverse_restore_the_network_bit_identically() {
    let mut network = student_network();
    let adjacency = network.adjacency().clone();
    let tables: Vec<NamedMatrix<f64>> =
        network.nodes().iter().map(|node| node.probabilities().clone()).collect();

    do_intervention(&mut network, "Difficulty", "d1").unwrap();
    reverse_do_intervention(&mut network, "Difficulty").unwrap();

    assert_eq!(network.adjacency(), &adjacency);
    for (node, table) in network.nodes().iter().zip(&tables) {
        assert_eq!(node.probabilities(), table, "CPT of `{}` changed", node.name());
    }
    assert!(!network.has_backup());
}

#[test]
fn test_nested_interventions_share_one_backup() {
    let mut network = student_network();
    let adjacency = network.adjacency().clone();
    let grade_table = network.node(GRADE).probabilities().clone();
    let letter_table = network.node(LETTER).probabilities().clone();

    do_intervention(&mut network, "Grade", "g1").unwrap();
    do_intervention(&mut network, "Letter", "l0").unwrap();
    assert!(network.has_backup());

    reverse_do_intervention(&mut network, "Letter").unwrap();
    reverse_do_intervention(&mut network, "Grade").unwrap();

    assert_eq!(network.adjacency(), &adjacency);
    assert_eq!(network.node(GRADE).probabilities(), &grade_table);
    assert_eq!(network.node(GRADE).parents(), &[DIFFICULTY, INTELLIGENCE]);
    assert_eq!(network.node(LETTER).probabilities(), &letter_table);
    assert_eq!(network.node(LETTER).parents(), &[GRADE]);
}

#[test]
fn test_reverse_without_intervention_is_harmless() {
    let mut network = student_network();
    let table = network.node(GRADE).probabilities().clone();

    reverse_do_intervention(&mut network, "Grade").unwrap();
    assert_eq!(network.node(GRADE).probabilities(), &table);
}

#[test]
fn test_unknown_names_are_rejected() {
    let mut network = student_network();

    assert!(do_intervention(&mut network, "Nope", "x").is_err());
    assert!(do_intervention(&mut network, "Grade", "g9").is_err());
    assert!(reverse_do_intervention(&mut network, "Nope").is_err());
}

#[test]
fn test_twin_intervention_leaves_the_factual_side_untouched() {
    let mut network = student_network();
    network.create_twin_network();
    let twin_letter = network.get_index("Letter*").unwrap();

    do_intervention(&mut network, "Grade*", "g1").unwrap();

    let handler = ProbabilityHandler::new(&network);
    // Counterfactual: had the grade been g1, the letter follows P(l | g1).
    let counterfactual = handler.total_probability(twin_letter, 1).unwrap();
    assert!((counterfactual - 0.9).abs() < SCENARIO_TOLERANCE);

    // Factual side: P(l1) marginalizes the untouched Grade.
    let factual = handler.total_probability(LETTER, 1).unwrap();
    assert!((factual - 0.51632).abs() < SCENARIO_TOLERANCE, "P(l1) = {factual}");

    network.remove_twin_nodes();
    assert_eq!(network.node_count(), 5);
}
