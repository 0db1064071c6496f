//! Submodule providing the maximum-likelihood CPT trainer with Laplace
//! smoothing: each CPT row is the row of observation counts, one pseudocount
//! added per non-NA cell, normalized over the non-NA columns. Rows without
//! any observed data come out uniform, and counts in the `NA` column enter
//! neither numerator nor denominator.

use log::debug;

use crate::{errors::NetworkError, matrix::NamedMatrix, network::Network, node::Node};

/// Re-estimates the CPT of every node from its observation counts.
///
/// # Errors
///
/// * If a count table disagrees with its node's factors or alphabet.
pub fn train(network: &mut Network) -> Result<(), NetworkError> {
    for node in network.nodes_mut() {
        train_node(node)?;
    }
    debug!("trained {} conditional probability tables", network.node_count());
    Ok(())
}

/// Re-estimates one node's CPT from its observation counts. The table shape
/// is rebuilt from the count table, which also restores a CPT that an
/// intervention had pinned. Nodes that never got a count table are left
/// alone.
///
/// # Errors
///
/// * If the count table disagrees with the node's factors or alphabet.
pub fn train_node(node: &mut Node) -> Result<(), NetworkError> {
    let observations = node.observations();
    if observations.row_count() == 0 {
        return Ok(());
    }
    let rows = observations.row_count();
    let non_na = node.value_count_excluding_na();

    let mut probabilities = NamedMatrix::new(rows, non_na, 0.0);
    // The count table carried valid axis names already.
    let _ = probabilities.set_row_names(observations.row_names().to_vec());
    let _ = probabilities.set_col_names(node.values_excluding_na().to_vec());

    for row in 0..rows {
        let observed: u32 = observations.row(row)[..non_na].iter().sum();
        let denominator = f64::from(observed) + non_na as f64;
        for col in 0..non_na {
            let smoothed = f64::from(*observations.get(row, col)) + 1.0;
            probabilities.set(row, col, smoothed / denominator);
        }
    }

    node.set_probabilities(probabilities)
}
