//! Submodule providing Pearl's do-operator as mutating graph surgery: an
//! intervention severs a node's incoming edges and pins its CPT to the
//! chosen value; the reverse operation restores the adjacency snapshot and
//! re-estimates the CPT from the untouched observation counts.
//!
//! The adjacency snapshot is singular per network and taken on the first
//! intervention after creation or restore; nested interventions only
//! overwrite CPTs.

use log::debug;

use crate::{
    errors::{InferenceError, NetworkError},
    network::Network,
    trainer::train_node,
};

/// Applies `do(node = value)` by name.
///
/// # Errors
///
/// * If the node or value name is unknown.
pub fn do_intervention(
    network: &mut Network,
    node_name: &str,
    value_name: &str,
) -> Result<(), InferenceError> {
    let id = network.get_index(node_name)?;
    let value = network.node(id).value_index(value_name)?;
    do_intervention_by_id(network, id, value)
}

/// Applies `do(node = value)` by dense identifier and value index: snapshots
/// the adjacency when no snapshot exists, severs every incoming edge of the
/// node and pins its CPT to the chosen value.
///
/// # Errors
///
/// * If the identifier or value index is out of range.
pub fn do_intervention_by_id(
    network: &mut Network,
    id: usize,
    value: usize,
) -> Result<(), InferenceError> {
    check_target(network, id, value)?;
    if !network.has_backup() {
        network.create_backup();
    }

    debug!("do({} = {})", network.node(id).name(), network.node(id).values_excluding_na()[value]);

    // Twins live outside the adjacency matrix; their incoming edges exist
    // only as parent lists.
    if id < network.adjacency().col_count() {
        for row in 0..network.adjacency().row_count() {
            if *network.adjacency().get(row, id) == 1 {
                network.remove_edge(row, id)?;
            }
        }
    }
    network.cut_parents(id);
    network.compute_factors(id);
    network.node_mut(id).pin_probability(value);
    Ok(())
}

/// Reverses an intervention by name.
///
/// # Errors
///
/// * If the node name is unknown.
pub fn reverse_do_intervention(
    network: &mut Network,
    node_name: &str,
) -> Result<(), InferenceError> {
    let id = network.get_index(node_name)?;
    reverse_do_intervention_by_id(network, id)
}

/// Reverses an intervention by dense identifier: restores the adjacency
/// snapshot when one is held (consuming it), resynchronizes every node's
/// parents and factors from adjacency, and re-estimates the node's CPT from
/// its observation counts.
///
/// A twin node's severed parent edges are not recorded in the adjacency
/// snapshot and stay severed; counterfactual callers discard the twin
/// extension after the query instead.
///
/// # Errors
///
/// * If the identifier is out of range.
pub fn reverse_do_intervention_by_id(
    network: &mut Network,
    id: usize,
) -> Result<(), InferenceError> {
    if id >= network.node_count() {
        return Err(NetworkError::IdNotFound(id).into());
    }

    if network.load_backup() {
        network.assign_parents();
        network.compute_all_factors();
    } else {
        network.compute_factors(id);
    }
    debug!("reversed intervention on `{}`", network.node(id).name());
    train_node(network.node_mut(id))?;
    Ok(())
}

fn check_target(network: &Network, id: usize, value: usize) -> Result<(), InferenceError> {
    if id >= network.node_count() {
        return Err(NetworkError::IdNotFound(id).into());
    }
    let node = network.node(id);
    let size = node.value_count_excluding_na();
    if value >= size {
        return Err(InferenceError::OutOfDomain { node: node.name().to_owned(), value, size });
    }
    Ok(())
}
