//! Submodule providing [`Node`], one categorical random variable of the
//! network: its value alphabet, parent list, observation counts, conditional
//! probability table and the mixed-radix factors that address CPT rows.
//!
//! A CPT row corresponds to one combination of parent values. With parents
//! `p_0, .., p_{k-1}` of non-NA cardinalities `r_0, .., r_{k-1}` the factors
//! are built right to left (`factor[k-1] = 1`,
//! `factor[i] = factor[i+1] * r_{i+1}`), so that a concrete parent
//! assignment `(v_0, .., v_{k-1})` maps to row `sum(factor[i] * v_i)` and
//! back by successive division and remainder. Decoded rows are memoized
//! behind interior mutability; the cache is invisible to callers and dropped
//! whenever parents or alphabets change.

use core::cell::RefCell;

use hashbrown::HashMap;

use crate::{
    errors::NetworkError,
    matrix::{NA, NamedMatrix},
};

#[derive(Debug)]
/// One categorical variable of a Bayesian network.
pub struct Node {
    id: usize,
    name: String,
    value_names: Vec<String>,
    parents: Vec<usize>,
    factors: Vec<usize>,
    cpt_rows: usize,
    observations: NamedMatrix<u32>,
    probabilities: NamedMatrix<f64>,
    decoded_rows: RefCell<HashMap<usize, Vec<usize>>>,
}

impl Node {
    /// Creates a node with an empty alphabet and no parents.
    pub fn new(id: usize, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            value_names: Vec::new(),
            parents: Vec::new(),
            factors: Vec::new(),
            cpt_rows: 1,
            observations: NamedMatrix::new(0, 0, 0),
            probabilities: NamedMatrix::new(0, 0, 0.0),
            decoded_rows: RefCell::new(HashMap::new()),
        }
    }

    /// Dense identifier of the node.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Unique name of the node.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered category labels, with the `NA` sentinel last when present.
    pub fn value_names(&self) -> &[String] {
        &self.value_names
    }

    /// Category labels without the trailing `NA` sentinel.
    pub fn values_excluding_na(&self) -> &[String] {
        &self.value_names[..self.value_count_excluding_na()]
    }

    /// Number of categories without the `NA` sentinel.
    pub fn value_count_excluding_na(&self) -> usize {
        if self.value_names.last().is_some_and(|name| name == NA) {
            self.value_names.len() - 1
        } else {
            self.value_names.len()
        }
    }

    /// Index of the non-NA value with the given label.
    ///
    /// # Errors
    ///
    /// * If no non-NA value carries that label.
    pub fn value_index(&self, label: &str) -> Result<usize, NetworkError> {
        self.values_excluding_na().iter().position(|name| name == label).ok_or_else(|| {
            NetworkError::ValueNotFound { node: self.name.clone(), value: label.to_owned() }
        })
    }

    /// Replaces the value alphabet. Any existing count table, CPT and decode
    /// cache are dropped, as their columns no longer line up.
    pub fn set_value_names(&mut self, names: Vec<String>) {
        self.value_names = names;
        self.observations = NamedMatrix::new(0, 0, 0);
        self.probabilities = NamedMatrix::new(0, 0, 0.0);
        self.decoded_rows.borrow_mut().clear();
    }

    /// Ordered parent identifiers. The order is the CPT parent-axis order.
    pub fn parents(&self) -> &[usize] {
        &self.parents
    }

    /// True when the node has at least one parent.
    pub fn has_parents(&self) -> bool {
        !self.parents.is_empty()
    }

    /// Replaces the parent list and drops the decode cache. The mixed-radix
    /// factors are stale afterwards until recomputed.
    pub fn set_parents(&mut self, parents: Vec<usize>) {
        self.parents = parents;
        self.decoded_rows.borrow_mut().clear();
    }

    /// Mixed-radix weights, one per parent.
    pub fn factors(&self) -> &[usize] {
        &self.factors
    }

    /// Rebuilds the mixed-radix factors from the parents' non-NA
    /// cardinalities, in parent order. A node without parents keeps a single
    /// CPT row.
    pub fn set_factors_from_radices(&mut self, radices: &[usize]) {
        debug_assert_eq!(radices.len(), self.parents.len());
        self.factors = vec![1; radices.len()];
        let mut factor = 1;
        for position in (0..radices.len()).rev() {
            self.factors[position] = factor;
            factor *= radices[position];
        }
        self.cpt_rows = factor;
        self.decoded_rows.borrow_mut().clear();
    }

    /// Number of CPT rows implied by the current factors.
    pub fn cpt_row_count(&self) -> usize {
        self.cpt_rows
    }

    /// Encodes a concrete parent assignment (one value index per parent, in
    /// parent order) into its CPT row.
    pub fn encode_row(&self, values: &[usize]) -> usize {
        debug_assert_eq!(values.len(), self.factors.len());
        values.iter().zip(&self.factors).map(|(value, factor)| value * factor).sum()
    }

    /// Value index of the `position`-th parent within the parent assignment
    /// encoded by `row`. Decoded digit vectors are memoized per row.
    ///
    /// # Panics
    ///
    /// Panics if `position` is not a valid parent position.
    pub fn parent_value_in_row(&self, row: usize, position: usize) -> usize {
        let mut cache = self.decoded_rows.borrow_mut();
        let digits = cache.entry(row).or_insert_with(|| {
            let mut digits = Vec::with_capacity(self.factors.len());
            let mut rest = row;
            for &factor in &self.factors {
                digits.push(rest / factor);
                rest %= factor;
            }
            digits
        });
        digits[position]
    }

    /// Drops the memoized row decompositions.
    pub fn clear_decode_cache(&self) {
        self.decoded_rows.borrow_mut().clear();
    }

    /// Observation counts, one row per parent combination, one column per
    /// value label (the `NA` column included when present).
    pub fn observations(&self) -> &NamedMatrix<u32> {
        &self.observations
    }

    /// Mutable access to the observation counts.
    pub fn observations_mut(&mut self) -> &mut NamedMatrix<u32> {
        &mut self.observations
    }

    /// Installs an observation count table.
    ///
    /// # Errors
    ///
    /// * If the table shape disagrees with the factors or the alphabet.
    pub fn set_observations(&mut self, observations: NamedMatrix<u32>) -> Result<(), NetworkError> {
        if observations.row_count() != self.cpt_rows
            || observations.col_count() != self.value_names.len()
        {
            return Err(NetworkError::ShapeMismatch {
                node: self.name.clone(),
                expected: self.cpt_rows,
                actual: observations.row_count(),
            });
        }
        self.observations = observations;
        Ok(())
    }

    /// The conditional probability table, `NA` column excluded.
    pub fn probabilities(&self) -> &NamedMatrix<f64> {
        &self.probabilities
    }

    /// Installs a conditional probability table.
    ///
    /// # Errors
    ///
    /// * If the table shape disagrees with the factors or the alphabet.
    pub fn set_probabilities(&mut self, probabilities: NamedMatrix<f64>) -> Result<(), NetworkError> {
        if probabilities.row_count() != self.cpt_rows
            || probabilities.col_count() != self.value_count_excluding_na()
        {
            return Err(NetworkError::ShapeMismatch {
                node: self.name.clone(),
                expected: self.cpt_rows,
                actual: probabilities.row_count(),
            });
        }
        self.probabilities = probabilities;
        Ok(())
    }

    /// `P(node = value[col] | parent assignment encoded by row)`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of bounds.
    pub fn probability(&self, row: usize, col: usize) -> f64 {
        *self.probabilities.get(row, col)
    }

    /// Collapses the CPT to a single deterministic row with probability one
    /// on `value`. Used by the do-operator after the incoming edges were
    /// severed; the observation counts stay untouched so the original CPT
    /// can be re-estimated later.
    pub fn pin_probability(&mut self, value: usize) {
        let cols = self.value_count_excluding_na();
        debug_assert!(value < cols);
        let mut pinned = NamedMatrix::new(1, cols, 0.0);
        pinned.set(0, value, 1.0);
        // Name errors are impossible here: one row, unique value labels.
        let _ = pinned.set_row_names(vec!["-".to_owned()]);
        let _ = pinned.set_col_names(self.values_excluding_na().to_vec());
        self.factors.clear();
        self.cpt_rows = 1;
        self.probabilities = pinned;
        self.decoded_rows.borrow_mut().clear();
    }

    /// Builds the counterfactual twin of this node: same alphabet, counts,
    /// factors and CPT under the name `<name>*`, with the given identifier
    /// and remapped parent list. The twin starts with an empty decode cache.
    pub fn twin(&self, id: usize, parents: Vec<usize>) -> Self {
        Self {
            id,
            name: format!("{}*", self.name),
            value_names: self.value_names.clone(),
            parents,
            factors: self.factors.clone(),
            cpt_rows: self.cpt_rows,
            observations: self.observations.clone(),
            probabilities: self.probabilities.clone(),
            decoded_rows: RefCell::new(HashMap::new()),
        }
    }
}
