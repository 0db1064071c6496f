//! The executable query plan: query, evidence, intervention and argmax
//! clauses resolved to dense identifiers and value indices, plus the
//! dispatch into the inference kernel.

use hashbrown::HashMap;

use crate::{
    errors::InferenceError,
    interventions::{do_intervention_by_id, reverse_do_intervention_by_id},
    network::Network,
    probability::ProbabilityHandler,
};

#[derive(Debug, Default)]
/// A parsed query, ready to run against a network. Execution applies the
/// interventions on a fresh snapshot, dispatches MAP search, conditional or
/// joint inference, and reverses the interventions again, also when the
/// inference step failed.
pub struct QueryExecuter {
    pub(crate) query_nodes: Vec<usize>,
    pub(crate) query_assignment: HashMap<usize, usize>,
    pub(crate) condition_nodes: Vec<usize>,
    pub(crate) condition_assignment: HashMap<usize, usize>,
    pub(crate) intervention_nodes: Vec<usize>,
    pub(crate) intervention_assignment: HashMap<usize, usize>,
    pub(crate) argmax_nodes: Vec<usize>,
}

impl QueryExecuter {
    /// Dense identifiers of the queried nodes.
    pub fn query_nodes(&self) -> &[usize] {
        &self.query_nodes
    }

    /// Dense identifiers of the evidence nodes.
    pub fn condition_nodes(&self) -> &[usize] {
        &self.condition_nodes
    }

    /// Dense identifiers of the intervened nodes.
    pub fn intervention_nodes(&self) -> &[usize] {
        &self.intervention_nodes
    }

    /// Dense identifiers of the argmax nodes.
    pub fn argmax_nodes(&self) -> &[usize] {
        &self.argmax_nodes
    }

    /// Runs the plan. Returns the probability and, for an argmax query, the
    /// value labels of the best assignment (empty otherwise).
    ///
    /// # Errors
    ///
    /// * If an intervention target or a value index is out of range.
    /// * If the evidence has zero mass.
    pub fn execute(&self, network: &mut Network) -> Result<(f64, Vec<String>), InferenceError> {
        for &id in &self.intervention_nodes {
            let Some(&value) = self.intervention_assignment.get(&id) else {
                continue;
            };
            do_intervention_by_id(network, id, value)?;
        }

        let outcome = self.dispatch(network);

        for &id in self.intervention_nodes.iter().rev() {
            reverse_do_intervention_by_id(network, id)?;
        }
        outcome
    }

    fn dispatch(&self, network: &Network) -> Result<(f64, Vec<String>), InferenceError> {
        let handler = ProbabilityHandler::new(network);
        if !self.argmax_nodes.is_empty() {
            let (probability, digits) = handler.max_search(&self.argmax_nodes)?;
            let labels = self
                .argmax_nodes
                .iter()
                .zip(&digits)
                .map(|(&id, &digit)| network.node(id).values_excluding_na()[digit].clone())
                .collect();
            Ok((probability, labels))
        } else if !self.condition_nodes.is_empty() {
            let probability = handler.conditional_probability(
                &self.query_nodes,
                &self.condition_nodes,
                &self.query_assignment,
                &self.condition_assignment,
            )?;
            Ok((probability, Vec::new()))
        } else {
            let probability =
                handler.joint_probability(&self.query_nodes, &self.query_assignment)?;
            Ok((probability, Vec::new()))
        }
    }
}
