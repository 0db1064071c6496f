#![allow(dead_code)]
//! Shared fixtures: the classical five-node student network. Observation
//! counts are chosen so that Laplace-smoothed training reproduces the
//! textbook CPTs exactly, which lets tests assert both trained values and
//! intervention round-trips on the same network.

use categorical_bayes::{data_factory, network::Network, trainer};

/// Dense identifier of the `Difficulty` node.
pub const DIFFICULTY: usize = 0;
/// Dense identifier of the `Intelligence` node.
pub const INTELLIGENCE: usize = 1;
/// Dense identifier of the `Grade` node.
pub const GRADE: usize = 2;
/// Dense identifier of the `SAT` node.
pub const SAT: usize = 3;
/// Dense identifier of the `Letter` node.
pub const LETTER: usize = 4;

/// Builds the student network
/// (`Difficulty -> Grade <- Intelligence -> SAT`, `Grade -> Letter`)
/// with trained CPTs:
///
/// * `P(d0) = 0.6`, `P(i0) = 0.7`
/// * `P(g | d, i)` rows `(d0,i0) = (0.3, 0.4, 0.3)`,
///   `(d0,i1) = (0.9, 0.08, 0.02)`, `(d1,i0) = (0.05, 0.25, 0.7)`,
///   `(d1,i1) = (0.5, 0.3, 0.2)`
/// * `P(s | i)` rows `(0.95, 0.05)` and `(0.2, 0.8)`
/// * `P(l | g)` rows `(0.1, 0.9)`, `(0.4, 0.6)` and `(0.95, 0.05)`
pub fn student_network() -> Network {
    let mut network = Network::new();
    let names =
        [(0, "Difficulty"), (1, "Intelligence"), (2, "Grade"), (3, "SAT"), (4, "Letter")];
    for (original, name) in names {
        network.add_node(original, name).unwrap();
    }
    network.init_adjacency();
    network.add_edge(DIFFICULTY, GRADE).unwrap();
    network.add_edge(INTELLIGENCE, GRADE).unwrap();
    network.add_edge(INTELLIGENCE, SAT).unwrap();
    network.add_edge(GRADE, LETTER).unwrap();
    network.cycle_check().unwrap();

    set_alphabet(&mut network, DIFFICULTY, &["d0", "d1"]);
    set_alphabet(&mut network, INTELLIGENCE, &["i0", "i1"]);
    set_alphabet(&mut network, GRADE, &["g1", "g2", "g3"]);
    set_alphabet(&mut network, SAT, &["s0", "s1"]);
    set_alphabet(&mut network, LETTER, &["l0", "l1"]);

    data_factory::init_count_tables(&mut network).unwrap();

    set_counts(&mut network, DIFFICULTY, &[&[5, 3]]);
    set_counts(&mut network, INTELLIGENCE, &[&[6, 2]]);
    // Rows are (Difficulty, Intelligence) combinations: 2 * d + i.
    set_counts(&mut network, GRADE, &[&[2, 3, 2], &[44, 3, 0], &[0, 4, 13], &[4, 2, 1]]);
    set_counts(&mut network, SAT, &[&[18, 0], &[1, 7]]);
    set_counts(&mut network, LETTER, &[&[0, 8], &[3, 5], &[18, 0]]);

    trainer::train(&mut network).unwrap();
    network
}

/// Installs a value alphabet on one node.
pub fn set_alphabet(network: &mut Network, id: usize, labels: &[&str]) {
    network
        .node_mut(id)
        .set_value_names(labels.iter().map(|label| (*label).to_owned()).collect());
}

/// Overwrites one node's observation counts, row by row.
pub fn set_counts(network: &mut Network, id: usize, rows: &[&[u32]]) {
    for (row, counts) in rows.iter().enumerate() {
        for (col, &count) in counts.iter().enumerate() {
            network.node_mut(id).observations_mut().set(row, col, count);
        }
    }
}
