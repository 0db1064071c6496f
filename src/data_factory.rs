//! Submodule binding a discretised sample matrix to the network: it derives
//! each node's value alphabet from its sample row, sizes the per-node count
//! tables over the parent combinations and fills them from the samples.
//!
//! Samples where one of a node's parents is missing (`NA`) are skipped for
//! that node's count table; the non-NA parent alphabet is what the
//! mixed-radix row addressing is defined over. Missing observations of the
//! node itself land in its `NA` column.

use log::debug;

use crate::{
    errors::NetworkError,
    matrix::{NA, NamedMatrix},
    network::Network,
};

/// Binds a discretised sample matrix to the network: alphabets, factors,
/// count tables and counts. Rows of `samples` are variables named like the
/// nodes, columns are samples.
///
/// # Errors
///
/// * If a node has no sample row of the same name.
pub fn bind_samples(
    network: &mut Network,
    samples: &NamedMatrix<String>,
) -> Result<(), NetworkError> {
    assign_alphabets(network, samples)?;
    init_count_tables(network)?;
    fill_counts(network, samples)?;
    Ok(())
}

/// Derives every node's value alphabet from its sample row: the distinct
/// observed labels sorted (numerically where they all parse as integers),
/// with `NA` appended last when missing cells exist.
///
/// # Errors
///
/// * If a node has no sample row of the same name.
pub fn assign_alphabets(
    network: &mut Network,
    samples: &NamedMatrix<String>,
) -> Result<(), NetworkError> {
    for id in 0..network.node_count() {
        let name = network.node(id).name().to_owned();
        let row = samples
            .row_index(&name)
            .ok_or_else(|| NetworkError::MissingSampleRow(name.clone()))?;

        let mut labels: Vec<String> = Vec::new();
        let mut has_missing = false;
        for cell in samples.row(row) {
            if cell == NA {
                has_missing = true;
            } else if !labels.contains(cell) {
                labels.push(cell.clone());
            }
        }
        sort_labels(&mut labels);
        if has_missing {
            labels.push(NA.to_owned());
        }
        debug!("alphabet of `{name}`: {labels:?}");
        network.node_mut(id).set_value_names(labels);
    }
    Ok(())
}

/// Computes every node's mixed-radix factors and installs zeroed count and
/// probability tables of the right shape, with value labels on the column
/// axis and the parent configuration on the row axis (`-` for root nodes).
///
/// # Errors
///
/// * If a table shape disagrees with the node alphabets.
pub fn init_count_tables(network: &mut Network) -> Result<(), NetworkError> {
    network.compute_all_factors();
    for id in 0..network.node_count() {
        let node = network.node(id);
        let rows = node.cpt_row_count();
        let row_names = row_labels(network, id, rows);
        let col_names = node.value_names().to_vec();
        let non_na = node.value_count_excluding_na();

        let mut observations = NamedMatrix::new(rows, col_names.len(), 0u32);
        // Parent configurations are distinct by construction, labels too.
        let _ = observations.set_row_names(row_names.clone());
        let _ = observations.set_col_names(col_names.clone());

        let mut probabilities = NamedMatrix::new(rows, non_na, 0.0);
        let _ = probabilities.set_row_names(row_names);
        let _ = probabilities.set_col_names(col_names[..non_na].to_vec());

        let node = network.node_mut(id);
        node.set_observations(observations)?;
        node.set_probabilities(probabilities)?;
    }
    Ok(())
}

/// One label per CPT row: the comma-joined parent value labels encoded by
/// that row, or `-` for a root node.
fn row_labels(network: &Network, id: usize, rows: usize) -> Vec<String> {
    let node = network.node(id);
    if !node.has_parents() {
        return vec!["-".to_owned()];
    }
    (0..rows)
        .map(|row| {
            let labels: Vec<&str> = node
                .parents()
                .iter()
                .enumerate()
                .map(|(position, &parent)| {
                    let digit = node.parent_value_in_row(row, position);
                    network.node(parent).values_excluding_na()[digit].as_str()
                })
                .collect();
            labels.join(",")
        })
        .collect()
}

/// Fills the count tables from the samples: every sample column increments
/// at most one cell per node.
fn fill_counts(network: &mut Network, samples: &NamedMatrix<String>) -> Result<(), NetworkError> {
    let node_count = network.node_count();
    let sample_count = samples.col_count();

    // Per node and sample: the column in the count table (NA included), and
    // the non-NA digit used when the node acts as a parent.
    let mut value_cols: Vec<Vec<usize>> = Vec::with_capacity(node_count);
    let mut parent_digits: Vec<Vec<Option<usize>>> = Vec::with_capacity(node_count);
    for id in 0..node_count {
        let node = network.node(id);
        let row = samples
            .row_index(node.name())
            .ok_or_else(|| NetworkError::MissingSampleRow(node.name().to_owned()))?;
        let mut cols = Vec::with_capacity(sample_count);
        let mut digits = Vec::with_capacity(sample_count);
        for cell in samples.row(row) {
            let position = node
                .value_names()
                .iter()
                .position(|label| label == cell)
                .ok_or_else(|| NetworkError::ValueNotFound {
                    node: node.name().to_owned(),
                    value: cell.clone(),
                })?;
            cols.push(position);
            digits.push((position < node.value_count_excluding_na()).then_some(position));
        }
        value_cols.push(cols);
        parent_digits.push(digits);
    }

    let mut skipped = 0usize;
    for id in 0..node_count {
        let parents = network.node(id).parents().to_vec();
        for sample in 0..sample_count {
            let digits: Option<Vec<usize>> =
                parents.iter().map(|&parent| parent_digits[parent][sample]).collect();
            let Some(digits) = digits else {
                skipped += 1;
                continue;
            };
            let row = network.node(id).encode_row(&digits);
            let col = value_cols[id][sample];
            let node = network.node_mut(id);
            let count = *node.observations().get(row, col);
            node.observations_mut().set(row, col, count + 1);
        }
    }
    debug!("bound {sample_count} samples to {node_count} nodes ({skipped} skipped for NA parents)");
    Ok(())
}

/// Sorts labels numerically when every label parses as an integer, and
/// lexicographically otherwise.
fn sort_labels(labels: &mut [String]) {
    let numeric: Option<Vec<i64>> =
        labels.iter().map(|label| label.parse::<i64>().ok()).collect();
    match numeric {
        Some(_) => labels.sort_by_key(|label| label.parse::<i64>().unwrap_or(i64::MAX)),
        None => labels.sort(),
    }
}
