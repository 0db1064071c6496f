//! Submodule providing [`ProbabilityHandler`], the inference kernel: total
//! (marginal), joint and conditional probabilities plus MAP search, computed
//! by elimination over the topological order with plain `f64` products.

use core::cell::RefCell;

use hashbrown::HashMap;

use crate::{
    errors::{InferenceError, NetworkError},
    network::Network,
};

/// A borrow-only inference view over a [`Network`]. Total-probability
/// results are memoized for the lifetime of the handler, so a handler must
/// not outlive a round of CPT mutations; the query executer constructs a
/// fresh one per query.
pub struct ProbabilityHandler<'a> {
    network: &'a Network,
    totals: RefCell<HashMap<(usize, usize), f64>>,
}

impl<'a> ProbabilityHandler<'a> {
    /// Creates a handler over the given network.
    pub fn new(network: &'a Network) -> Self {
        Self { network, totals: RefCell::new(HashMap::new()) }
    }

    /// `P(X = x)`: the marginal probability of one node value, obtained by
    /// summing the CPT column over every parent configuration weighted by
    /// the parents' own total probabilities. Root nodes read their single
    /// CPT row directly.
    ///
    /// # Errors
    ///
    /// * If the node or value index is out of range.
    pub fn total_probability(&self, node_id: usize, value: usize) -> Result<f64, InferenceError> {
        self.check_value(node_id, value)?;
        if let Some(&memoized) = self.totals.borrow().get(&(node_id, value)) {
            return Ok(memoized);
        }

        let node = self.network.node(node_id);
        let total = if !node.has_parents() {
            node.probability(0, value)
        } else {
            let mut sum = 0.0;
            for row in 0..node.cpt_row_count() {
                let mut weight = 1.0;
                for (position, &parent) in node.parents().iter().enumerate() {
                    let digit = node.parent_value_in_row(row, position);
                    weight *= self.total_probability(parent, digit)?;
                }
                sum += node.probability(row, value) * weight;
            }
            sum
        };

        self.totals.borrow_mut().insert((node_id, value), total);
        Ok(total)
    }

    /// `P(and_i X_i = x_i)`: the joint probability of the assignment over
    /// `nodes`, marginalizing every unassigned ancestor. Entries of
    /// `assignment` outside `nodes` act as evidence baked into the product.
    ///
    /// The enumeration set is the union of `nodes`, the assigned nodes and
    /// all their ancestors; its free members are branched over their full
    /// non-NA alphabets with a mixed-radix odometer while the product of
    /// `P(n | pa(n))` is accumulated in topological order.
    ///
    /// # Errors
    ///
    /// * If a node or value index is out of range.
    pub fn joint_probability(
        &self,
        nodes: &[usize],
        assignment: &HashMap<usize, usize>,
    ) -> Result<f64, InferenceError> {
        for (&id, &value) in assignment {
            self.check_value(id, value)?;
        }
        for &id in nodes {
            if id >= self.network.node_count() {
                return Err(NetworkError::IdNotFound(id).into());
            }
        }

        let in_set = self.ancestral_closure(nodes.iter().chain(assignment.keys()).copied());
        let order: Vec<usize> = self
            .network
            .topological_order()
            .map_err(InferenceError::from)?
            .into_iter()
            .filter(|&id| in_set[id])
            .collect();

        let free: Vec<usize> = order.iter().copied().filter(|id| !assignment.contains_key(id)).collect();
        let radices: Vec<usize> =
            free.iter().map(|&id| self.network.node(id).value_count_excluding_na()).collect();

        let mut values = vec![0usize; self.network.node_count()];
        for (&id, &value) in assignment {
            values[id] = value;
        }

        let mut sum = 0.0;
        let mut odometer = Odometer::new(radices);
        while let Some(digits) = odometer.next_combination() {
            for (&id, &digit) in free.iter().zip(digits) {
                values[id] = digit;
            }
            let mut product = 1.0;
            for &id in &order {
                let node = self.network.node(id);
                let row: usize = node
                    .parents()
                    .iter()
                    .zip(node.factors())
                    .map(|(&parent, &factor)| values[parent] * factor)
                    .sum();
                product *= node.probability(row, values[id]);
            }
            sum += product;
        }
        Ok(sum)
    }

    /// `P(num = num_assign | den = den_assign)`, computed as the quotient of
    /// the merged joint over the denominator joint.
    ///
    /// # Errors
    ///
    /// * [`InferenceError::DegenerateCondition`] when the denominator has
    ///   zero mass.
    /// * If a node or value index is out of range.
    pub fn conditional_probability(
        &self,
        num_nodes: &[usize],
        den_nodes: &[usize],
        num_assignment: &HashMap<usize, usize>,
        den_assignment: &HashMap<usize, usize>,
    ) -> Result<f64, InferenceError> {
        let mut merged = num_assignment.clone();
        for (&id, &value) in den_assignment {
            merged.insert(id, value);
        }
        let mut union: Vec<usize> = num_nodes.to_vec();
        for &id in den_nodes {
            if !union.contains(&id) {
                union.push(id);
            }
        }

        let numerator = self.joint_probability(&union, &merged)?;
        let denominator = self.joint_probability(den_nodes, den_assignment)?;
        if denominator == 0.0 {
            return Err(InferenceError::DegenerateCondition);
        }
        Ok(numerator / denominator)
    }

    /// MAP search: enumerates every joint assignment over `nodes` and
    /// returns the most probable one with its probability. Ties resolve to
    /// the lexicographically smallest value-index vector.
    ///
    /// # Errors
    ///
    /// * If a node index is out of range.
    pub fn max_search(&self, nodes: &[usize]) -> Result<(f64, Vec<usize>), InferenceError> {
        let radices: Vec<usize> = nodes
            .iter()
            .map(|&id| {
                if id >= self.network.node_count() {
                    return Err(InferenceError::from(NetworkError::IdNotFound(id)));
                }
                Ok(self.network.node(id).value_count_excluding_na())
            })
            .collect::<Result<_, _>>()?;

        let mut best_probability = f64::NEG_INFINITY;
        let mut best_assignment = Vec::new();
        let mut assignment = HashMap::new();
        let mut odometer = Odometer::new(radices);
        while let Some(digits) = odometer.next_combination() {
            assignment.clear();
            for (&id, &digit) in nodes.iter().zip(digits) {
                assignment.insert(id, digit);
            }
            let probability = self.joint_probability(nodes, &assignment)?;
            // Strict comparison keeps the lexicographically first maximum.
            if probability > best_probability {
                best_probability = probability;
                best_assignment = digits.to_vec();
            }
        }
        Ok((best_probability, best_assignment))
    }

    /// Marks `seeds` and all their ancestors over the parent relation.
    fn ancestral_closure(&self, seeds: impl Iterator<Item = usize>) -> Vec<bool> {
        let mut in_set = vec![false; self.network.node_count()];
        let mut stack: Vec<usize> = seeds.collect();
        while let Some(id) = stack.pop() {
            if in_set[id] {
                continue;
            }
            in_set[id] = true;
            stack.extend(self.network.node(id).parents().iter().copied());
        }
        in_set
    }

    fn check_value(&self, node_id: usize, value: usize) -> Result<(), InferenceError> {
        if node_id >= self.network.node_count() {
            return Err(NetworkError::IdNotFound(node_id).into());
        }
        let node = self.network.node(node_id);
        let size = node.value_count_excluding_na();
        if value >= size {
            return Err(InferenceError::OutOfDomain {
                node: node.name().to_owned(),
                value,
                size,
            });
        }
        Ok(())
    }
}

/// Mixed-radix odometer enumerating every digit vector below the given
/// radices in lexicographic order. Empty radices yield exactly the empty
/// combination; a zero radix yields none.
struct Odometer {
    radices: Vec<usize>,
    digits: Vec<usize>,
    started: bool,
    exhausted: bool,
}

impl Odometer {
    fn new(radices: Vec<usize>) -> Self {
        let exhausted = radices.iter().any(|&radix| radix == 0);
        let digits = vec![0; radices.len()];
        Self { radices, digits, started: false, exhausted }
    }

    /// The next digit vector, or `None` once all combinations were yielded.
    fn next_combination(&mut self) -> Option<&[usize]> {
        if self.exhausted {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(&self.digits);
        }
        // Increment from the least significant (rightmost) position.
        for position in (0..self.digits.len()).rev() {
            self.digits[position] += 1;
            if self.digits[position] < self.radices[position] {
                return Some(&self.digits);
            }
            self.digits[position] = 0;
        }
        self.exhausted = true;
        None
    }
}
