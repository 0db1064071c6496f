//! Submodule providing [`Network`], the directed acyclic graph of
//! categorical variables: node registry, dense adjacency matrix, structure
//! backup for interventions and the counterfactual twin extension.
//!
//! Adjacency is stored as `adjacency[parent][child] = 1`; the parents of a
//! node are enumerated by scanning its column. The per-node parent lists are
//! the source of truth for inference and are resynchronized from adjacency
//! whenever adjacency is mutated, except inside [`Network::cut_parents`],
//! which intentionally desyncs within a backup/restore pair.

pub mod io;

use bitvec::vec::BitVec;
use hashbrown::HashMap;

use crate::{errors::NetworkError, matrix::NamedMatrix, node::Node};

#[derive(Debug, Default)]
/// A DAG of [`Node`]s with dense identifiers in `[0, N)`.
pub struct Network {
    nodes: Vec<Node>,
    adjacency: NamedMatrix<u8>,
    name_to_id: HashMap<String, usize>,
    /// `(original id, dense id)` pairs sorted by original id.
    dense_ids: Vec<(usize, usize)>,
    backup: Option<NamedMatrix<u8>>,
    twin_start: Option<usize>,
    twin_ids: Vec<Option<usize>>,
}

impl Network {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes, twins included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes, indexed by dense identifier.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable access to all nodes.
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// The node with the given dense identifier.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds.
    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    /// Mutable access to the node with the given dense identifier.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds.
    pub fn node_mut(&mut self, id: usize) -> &mut Node {
        &mut self.nodes[id]
    }

    /// The adjacency matrix, `adjacency[parent][child] = 1`.
    pub fn adjacency(&self) -> &NamedMatrix<u8> {
        &self.adjacency
    }

    /// Registers a node under a fresh dense identifier and returns it.
    ///
    /// # Errors
    ///
    /// * If the name or the original identifier is already registered.
    pub fn add_node(&mut self, original_id: usize, name: &str) -> Result<usize, NetworkError> {
        if self.name_to_id.contains_key(name) {
            return Err(NetworkError::DuplicateNode(name.to_owned()));
        }
        let position = match self.dense_ids.binary_search_by_key(&original_id, |pair| pair.0) {
            Ok(_) => return Err(NetworkError::DuplicateNode(original_id.to_string())),
            Err(position) => position,
        };
        let dense = self.nodes.len();
        self.dense_ids.insert(position, (original_id, dense));
        self.name_to_id.insert(name.to_owned(), dense);
        self.nodes.push(Node::new(dense, name));
        Ok(dense)
    }

    /// Sizes the adjacency matrix to the current node count and labels its
    /// axes with the node names. Called once all topology nodes are known.
    pub fn init_adjacency(&mut self) {
        let names: Vec<String> = self.nodes.iter().map(|node| node.name().to_owned()).collect();
        self.adjacency.resize(self.nodes.len(), self.nodes.len(), 0);
        // Node names are unique by construction.
        let _ = self.adjacency.set_row_names(names.clone());
        let _ = self.adjacency.set_col_names(names);
    }

    /// Dense identifier for an original identifier from a topology file,
    /// resolved by lower-bound binary search over the sorted remap table.
    ///
    /// # Errors
    ///
    /// * If the original identifier was never registered.
    pub fn dense_id(&self, original_id: usize) -> Result<usize, NetworkError> {
        self.dense_ids
            .binary_search_by_key(&original_id, |pair| pair.0)
            .map(|position| self.dense_ids[position].1)
            .map_err(|_| NetworkError::OriginalIdNotFound(original_id))
    }

    /// Dense identifier of the node with the given name.
    ///
    /// # Errors
    ///
    /// * If no node carries that name.
    pub fn get_index(&self, name: &str) -> Result<usize, NetworkError> {
        self.name_to_id
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::NodeNotFound(name.to_owned()))
    }

    /// True when a node with the given name is registered.
    pub fn has_node(&self, name: &str) -> bool {
        self.name_to_id.contains_key(name)
    }

    /// True when the named node has a non-NA value with the given label.
    pub fn has_value(&self, node_name: &str, value_name: &str) -> bool {
        self.get_index(node_name)
            .is_ok_and(|id| self.nodes[id].value_index(value_name).is_ok())
    }

    /// Sets the adjacency bit for `parent -> child` and refreshes the
    /// child's parent list from its adjacency column.
    ///
    /// # Errors
    ///
    /// * If either identifier lies outside the adjacency matrix.
    pub fn add_edge(&mut self, parent: usize, child: usize) -> Result<(), NetworkError> {
        self.check_edge_ids(parent, child)?;
        self.adjacency.set(parent, child, 1);
        let parents = self.parents_from_adjacency(child);
        self.nodes[child].set_parents(parents);
        Ok(())
    }

    /// Clears the adjacency bit for `parent -> child` and refreshes the
    /// child's parent list.
    ///
    /// # Errors
    ///
    /// * If either identifier lies outside the adjacency matrix.
    pub fn remove_edge(&mut self, parent: usize, child: usize) -> Result<(), NetworkError> {
        self.check_edge_ids(parent, child)?;
        self.adjacency.set(parent, child, 0);
        let parents = self.parents_from_adjacency(child);
        self.nodes[child].set_parents(parents);
        Ok(())
    }

    fn check_edge_ids(&self, parent: usize, child: usize) -> Result<(), NetworkError> {
        let bound = self.adjacency.row_count();
        for id in [parent, child] {
            if id >= bound {
                return Err(NetworkError::IdNotFound(id));
            }
        }
        Ok(())
    }

    /// Parent identifiers of `child` read off the adjacency column, in
    /// ascending order.
    pub fn parents_from_adjacency(&self, child: usize) -> Vec<usize> {
        (0..self.adjacency.row_count())
            .filter(|&row| *self.adjacency.get(row, child) == 1)
            .collect()
    }

    /// Child identifiers of `parent` read off the adjacency row.
    pub fn children_from_adjacency(&self, parent: usize) -> Vec<usize> {
        (0..self.adjacency.col_count())
            .filter(|&col| *self.adjacency.get(parent, col) == 1)
            .collect()
    }

    /// Refreshes every topology node's parent list from adjacency. Twin
    /// nodes keep their remapped lists.
    pub fn assign_parents(&mut self) {
        for id in 0..self.adjacency.col_count() {
            let parents = self.parents_from_adjacency(id);
            self.nodes[id].set_parents(parents);
        }
    }

    /// Clears the node's parent list without touching adjacency. Only
    /// meaningful inside a backup/restore pair.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds.
    pub fn cut_parents(&mut self, id: usize) {
        self.nodes[id].set_parents(Vec::new());
    }

    /// Recomputes the mixed-radix factors of one node from its parents'
    /// non-NA cardinalities.
    ///
    /// # Panics
    ///
    /// Panics if `id` or one of its parents is out of bounds.
    pub fn compute_factors(&mut self, id: usize) {
        let radices: Vec<usize> = self.nodes[id]
            .parents()
            .iter()
            .map(|&parent| self.nodes[parent].value_count_excluding_na())
            .collect();
        self.nodes[id].set_factors_from_radices(&radices);
    }

    /// Recomputes the mixed-radix factors of every node.
    pub fn compute_all_factors(&mut self) {
        for id in 0..self.nodes.len() {
            self.compute_factors(id);
        }
    }

    /// Checks the parent relation for cycles with an iterative depth-first
    /// search: any edge reaching a node on the current DFS path is a back
    /// edge and rejects the graph.
    ///
    /// # Errors
    ///
    /// * [`NetworkError::CycleDetected`] if the parent relation is cyclic.
    pub fn cycle_check(&self) -> Result<(), NetworkError> {
        let n = self.nodes.len();
        let mut visited: BitVec = BitVec::repeat(false, n);
        let mut on_path: BitVec = BitVec::repeat(false, n);

        // DFS stack entries: (node, parent snapshot, next-parent index).
        let mut dfs_stack: Vec<(usize, Vec<usize>, usize)> = Vec::new();

        for start in 0..n {
            if visited[start] {
                continue;
            }
            visited.set(start, true);
            on_path.set(start, true);
            dfs_stack.push((start, self.nodes[start].parents().to_vec(), 0));

            loop {
                if dfs_stack.is_empty() {
                    break;
                }
                let top_idx = dfs_stack.last().unwrap().2;
                let top_len = dfs_stack.last().unwrap().1.len();

                if top_idx < top_len {
                    let parent = dfs_stack.last().unwrap().1[top_idx];
                    dfs_stack.last_mut().unwrap().2 += 1;

                    if on_path[parent] {
                        return Err(NetworkError::CycleDetected);
                    }
                    if !visited[parent] {
                        visited.set(parent, true);
                        on_path.set(parent, true);
                        dfs_stack.push((parent, self.nodes[parent].parents().to_vec(), 0));
                    }
                } else {
                    let (node, _, _) = dfs_stack.pop().unwrap();
                    on_path.set(node, false);
                }
            }
        }

        Ok(())
    }

    /// Topological order of all nodes (twins included) over the parent
    /// relation, parents before children, via Kahn's algorithm.
    ///
    /// # Errors
    ///
    /// * [`NetworkError::CycleDetected`] if the parent relation is cyclic.
    pub fn topological_order(&self) -> Result<Vec<usize>, NetworkError> {
        let n = self.nodes.len();
        let mut in_degree = vec![0usize; n];
        let mut children = vec![Vec::new(); n];
        for node in &self.nodes {
            in_degree[node.id()] = node.parents().len();
            for &parent in node.parents() {
                children[parent].push(node.id());
            }
        }

        let mut order = Vec::with_capacity(n);
        let mut frontier: Vec<usize> =
            (0..n).filter(|&id| in_degree[id] == 0).collect();
        let mut temporary_frontier = Vec::new();

        while !frontier.is_empty() {
            for id in frontier.drain(..) {
                order.push(id);
                temporary_frontier.extend(children[id].iter().copied().filter(|&child| {
                    in_degree[child] -= 1;
                    in_degree[child] == 0
                }));
            }
            core::mem::swap(&mut frontier, &mut temporary_frontier);
        }

        if order.len() != n {
            return Err(NetworkError::CycleDetected);
        }
        Ok(order)
    }

    /// Snapshots the adjacency matrix. Overwrites any previous snapshot.
    pub fn create_backup(&mut self) {
        self.backup = Some(self.adjacency.clone());
    }

    /// Restores the adjacency matrix from the snapshot, consuming it.
    /// Returns whether a snapshot was present.
    pub fn load_backup(&mut self) -> bool {
        match self.backup.take() {
            Some(backup) => {
                self.adjacency = backup;
                true
            }
            None => false,
        }
    }

    /// True when an adjacency snapshot is held.
    pub fn has_backup(&self) -> bool {
        self.backup.is_some()
    }

    /// Appends a counterfactual twin for every node with at least one
    /// parent. Twins carry the original name suffixed with `*`; their parent
    /// edges are redirected to fellow twins where those exist and stay on
    /// the originals otherwise. Records the twin boundary and the
    /// original-to-twin identifier map.
    pub fn create_twin_network(&mut self) {
        let twin_start = self.nodes.len();
        self.twin_start = Some(twin_start);
        self.twin_ids = vec![None; twin_start];

        let duplicated: Vec<usize> = self
            .nodes
            .iter()
            .filter(|node| node.has_parents())
            .map(Node::id)
            .collect();
        for (offset, &id) in duplicated.iter().enumerate() {
            self.twin_ids[id] = Some(twin_start + offset);
        }

        for &id in &duplicated {
            let twin_id = self.twin_ids[id].unwrap();
            let parents: Vec<usize> = self.nodes[id]
                .parents()
                .iter()
                .map(|&parent| self.twin_ids[parent].unwrap_or(parent))
                .collect();
            let twin = self.nodes[id].twin(twin_id, parents);
            self.name_to_id.insert(twin.name().to_owned(), twin_id);
            self.nodes.push(twin);
        }
    }

    /// First twin identifier, when a twin network exists.
    pub fn twin_start(&self) -> Option<usize> {
        self.twin_start
    }

    /// Twin identifier of an original node, when it was duplicated.
    pub fn twin_id(&self, original: usize) -> Option<usize> {
        self.twin_ids.get(original).copied().flatten()
    }

    /// Removes the twin extension wholesale, dropping the twins' name
    /// registrations.
    pub fn remove_twin_nodes(&mut self) {
        let Some(twin_start) = self.twin_start.take() else {
            return;
        };
        for node in &self.nodes[twin_start..] {
            self.name_to_id.remove(node.name());
        }
        self.nodes.truncate(twin_start);
        self.twin_ids.clear();
    }

    /// Drops all nodes, adjacency, registries and snapshots. Used by the
    /// loaders before reading a fresh topology.
    pub(crate) fn reset_topology(&mut self) {
        self.nodes.clear();
        self.adjacency.resize(0, 0, 0);
        self.name_to_id.clear();
        self.dense_ids.clear();
        self.backup = None;
        self.twin_start = None;
        self.twin_ids.clear();
    }
}
