//! The wiring diagram as an immutable undirected graph.
//!
//! Vertex names are interned into dense [`VertexId`]s in order of first
//! appearance. The graph itself never changes after [`GraphBuilder::build`];
//! the randomized search works on its own copies (see
//! [`crate::contraction::Multigraph`]).

use std::collections::BTreeSet;

use fxhash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};

pub type VertexId = usize;

/// Unordered pair in `(min, max)` order
pub fn canonical(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    (a.min(b), a.max(b))
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    names: Vec<String>,
    index: FxHashMap<String, VertexId>,
    adjacency: Vec<FxHashSet<VertexId>>,
    edges: Vec<(VertexId, VertexId)>,
}

impl Graph {
    pub fn num_vertices(&self) -> usize {
        self.names.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn name(&self, v: VertexId) -> &str {
        &self.names[v]
    }

    pub fn id(&self, name: &str) -> Option<VertexId> {
        self.index.get(name).copied()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> {
        0..self.names.len()
    }

    pub fn vertex_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.adjacency[v].iter().copied()
    }

    pub fn degree(&self, v: VertexId) -> usize {
        self.adjacency[v].len()
    }

    /// Every edge once, as canonical pairs, in order of first declaration
    pub fn edges(&self) -> &[(VertexId, VertexId)] {
        &self.edges
    }

    /// Number of edges with exactly one endpoint in `side`.
    ///
    /// Names not present in the graph are ignored.
    pub fn crossing_edges(&self, side: &BTreeSet<String>) -> usize {
        let inside = side
            .iter()
            .filter_map(|name| self.id(name))
            .collect::<FxHashSet<_>>();

        self.edges
            .iter()
            .filter(|(a, b)| inside.contains(a) != inside.contains(b))
            .count()
    }
}

#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: Graph,
    seen: FxHashSet<(VertexId, VertexId)>,
    declarations: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, name: &str) -> VertexId {
        if let Some(&id) = self.graph.index.get(name) {
            return id;
        }

        let id = self.graph.names.len();
        self.graph.names.push(name.to_string());
        self.graph.index.insert(name.to_string(), id);
        self.graph.adjacency.push(FxHashSet::default());
        id
    }

    /// Records `vertex` as adjacent to each of `neighbors`, symmetrically.
    ///
    /// Repeated declarations for the same vertex union their neighbor sets.
    /// Declarations are numbered from 1, and that number is what a
    /// [`Error::SelfLoop`] reports.
    pub fn declare<'a>(
        &mut self,
        vertex: &str,
        neighbors: impl IntoIterator<Item = &'a str>,
    ) -> Result<()> {
        self.declarations += 1;
        let v = self.intern(vertex);

        for neighbor in neighbors {
            if neighbor == vertex {
                return Err(Error::SelfLoop {
                    line_number: self.declarations,
                    vertex: vertex.to_string(),
                });
            }

            let w = self.intern(neighbor);
            self.graph.adjacency[v].insert(w);
            self.graph.adjacency[w].insert(v);

            let edge = canonical(v, w);
            if self.seen.insert(edge) {
                self.graph.edges.push(edge);
            }
        }

        Ok(())
    }

    pub fn build(self) -> Graph {
        self.graph
    }
}
