//! Working copy of a [`Graph`] for random edge contraction.
//!
//! A [`Multigraph`] tracks, for every live (super)node, the multiplicity of
//! parallel edges to each neighbor and the original vertices it has absorbed.
//! [`Multigraph::contract`] is the only method that changes adjacency, so the
//! invariants below hold between any two calls:
//!
//! - multiplicities are symmetric and at least 1, and there are no self-loops;
//! - the edge list holds exactly one canonical pair per adjacent pair;
//! - the contraction records of the live nodes partition the original vertices;
//! - live multiplicity plus discarded self-loops equals the original edge count.

use fxhash::FxHashMap;
use itertools::Itertools;
use rand::Rng;

use crate::graph::{canonical, Graph, VertexId};

type Edge = (VertexId, VertexId);

/// Distinct adjacent pairs, with O(1) insert, remove and uniform pick.
#[derive(Debug, Clone, Default)]
struct EdgeList {
    pairs: Vec<Edge>,
    positions: FxHashMap<Edge, usize>,
}

impl EdgeList {
    fn len(&self) -> usize {
        self.pairs.len()
    }

    fn contains(&self, edge: &Edge) -> bool {
        self.positions.contains_key(edge)
    }

    fn insert(&mut self, edge: Edge) -> bool {
        if self.positions.contains_key(&edge) {
            return false;
        }

        self.positions.insert(edge, self.pairs.len());
        self.pairs.push(edge);
        true
    }

    fn remove(&mut self, edge: &Edge) -> bool {
        let Some(i) = self.positions.remove(edge) else {
            return false;
        };

        self.pairs.swap_remove(i);
        if let Some(&moved) = self.pairs.get(i) {
            self.positions.insert(moved, i);
        }
        true
    }

    fn pick(&self, rng: &mut impl Rng) -> Option<Edge> {
        if self.pairs.is_empty() {
            None
        } else {
            Some(self.pairs[rng.gen_range(0..self.pairs.len())])
        }
    }
}

#[derive(Debug, Clone)]
pub struct Multigraph {
    adjacency: FxHashMap<VertexId, FxHashMap<VertexId, usize>>,
    edges: EdgeList,
    records: FxHashMap<VertexId, Vec<VertexId>>,
    original_vertices: usize,
    original_edges: usize,
    discarded: usize,
}

impl Multigraph {
    pub fn from_graph(graph: &Graph) -> Self {
        let mut adjacency = FxHashMap::default();
        let mut records = FxHashMap::default();
        for v in graph.vertices() {
            adjacency.insert(v, graph.neighbors(v).map(|w| (w, 1)).collect());
            records.insert(v, vec![v]);
        }

        let mut edges = EdgeList::default();
        for &edge in graph.edges() {
            edges.insert(edge);
        }

        Self {
            adjacency,
            edges,
            records,
            original_vertices: graph.num_vertices(),
            original_edges: graph.num_edges(),
            discarded: 0,
        }
    }

    /// Live (super)nodes
    pub fn num_vertices(&self) -> usize {
        self.adjacency.len()
    }

    /// Distinct adjacent pairs, ignoring multiplicity
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn multiplicity(&self, a: VertexId, b: VertexId) -> usize {
        self.adjacency
            .get(&a)
            .and_then(|neighbors| neighbors.get(&b))
            .copied()
            .unwrap_or(0)
    }

    /// Parallel edges still present, counted once each
    pub fn total_multiplicity(&self) -> usize {
        self.adjacency
            .values()
            .flat_map(|neighbors| neighbors.values())
            .sum::<usize>()
            / 2
    }

    /// Parallel edges dropped because their endpoints were merged
    pub fn discarded_self_loops(&self) -> usize {
        self.discarded
    }

    pub fn supernodes(&self) -> Vec<VertexId> {
        self.adjacency.keys().copied().sorted().collect()
    }

    /// Original vertices absorbed into `v`, or `None` if `v` is not live
    pub fn record(&self, v: VertexId) -> Option<&[VertexId]> {
        self.records.get(&v).map(Vec::as_slice)
    }

    /// The realized cut once exactly two supernodes remain
    pub fn cut_size(&self) -> Option<usize> {
        let supernodes = self.supernodes();
        match supernodes[..] {
            [a, b] => Some(self.multiplicity(a, b)),
            _ => None,
        }
    }

    /// Merges `a` and `b`, which must be adjacent, into one supernode and
    /// returns its identity (the smaller of the two ids).
    pub fn contract(&mut self, a: VertexId, b: VertexId) -> VertexId {
        let (keep, fold) = canonical(a, b);
        debug_assert!(keep != fold, "cannot contract {keep} with itself");
        debug_assert!(
            self.edges.contains(&(keep, fold)),
            "cannot contract non-adjacent {keep} and {fold}"
        );

        let mut folded = self.adjacency.remove(&fold).unwrap_or_default();
        let loops = folded.remove(&keep).unwrap_or(0);
        self.edges.remove(&(keep, fold));
        self.discarded += loops;

        if let Some(neighbors) = self.adjacency.get_mut(&keep) {
            let removed = neighbors.remove(&fold);
            debug_assert_eq!(removed, Some(loops), "asymmetric {keep}-{fold}");
        }

        for (w, m) in folded {
            if let Some(neighbors) = self.adjacency.get_mut(&w) {
                let removed = neighbors.remove(&fold);
                debug_assert_eq!(removed, Some(m), "asymmetric {fold}-{w}");
                *neighbors.entry(keep).or_insert(0) += m;
            }
            *self
                .adjacency
                .entry(keep)
                .or_default()
                .entry(w)
                .or_insert(0) += m;

            self.edges.remove(&canonical(fold, w));
            self.edges.insert(canonical(keep, w));
        }

        let absorbed = self.records.remove(&fold).unwrap_or_default();
        self.records.entry(keep).or_default().extend(absorbed);

        keep
    }

    /// Contracts one edge, picked uniformly among distinct adjacent pairs.
    ///
    /// Returns `None` when there is no edge left to contract.
    pub fn contract_random(&mut self, rng: &mut impl Rng) -> Option<VertexId> {
        let (a, b) = self.edges.pick(rng)?;
        Some(self.contract(a, b))
    }

    /// Contracts random edges until at most `k` supernodes remain, or the
    /// graph runs out of edges (when it is disconnected). Returns the number
    /// of contractions performed.
    pub fn contract_to(&mut self, k: usize, rng: &mut impl Rng) -> usize {
        let mut steps = 0;
        while self.num_vertices() > k.max(1) {
            if self.contract_random(rng).is_none() {
                break;
            }
            steps += 1;
        }
        steps
    }

    /// Full consistency check, linear in the size of the graph.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut pairs = 0;
        for (&v, neighbors) in &self.adjacency {
            for (&w, &m) in neighbors {
                if w == v {
                    return Err(format!("self-loop on {v}"));
                }
                if m == 0 {
                    return Err(format!("zero multiplicity {v}-{w}"));
                }
                if self.multiplicity(w, v) != m {
                    return Err(format!("asymmetric multiplicity {v}-{w}"));
                }
                if !self.edges.contains(&canonical(v, w)) {
                    return Err(format!("edge {v}-{w} missing from edge list"));
                }
                pairs += 1;
            }
        }

        if pairs != 2 * self.edges.len() {
            return Err(format!(
                "edge list has {} pairs, adjacency has {}",
                self.edges.len(),
                pairs / 2
            ));
        }
        for (i, edge) in self.edges.pairs.iter().enumerate() {
            if self.edges.positions.get(edge) != Some(&i) {
                return Err(format!("edge list position of {edge:?} is stale"));
            }
        }

        if self.records.len() != self.adjacency.len()
            || self.records.keys().any(|v| !self.adjacency.contains_key(v))
        {
            return Err("contraction records do not match live vertices".to_string());
        }
        let mut covered = vec![false; self.original_vertices];
        for &v in self.records.values().flatten() {
            match covered.get_mut(v) {
                Some(seen) if !*seen => *seen = true,
                Some(_) => return Err(format!("vertex {v} recorded twice")),
                None => return Err(format!("unknown vertex {v} recorded")),
            }
        }
        if let Some(missing) = covered.iter().position(|seen| !seen) {
            return Err(format!("vertex {missing} not recorded"));
        }

        if self.total_multiplicity() + self.discarded != self.original_edges {
            return Err(format!(
                "multiplicity {} + discarded {} != original edges {}",
                self.total_multiplicity(),
                self.discarded,
                self.original_edges
            ));
        }

        Ok(())
    }
}
