// crates/pgsolve-core/src/game.rs

//! Read-only game interface and the dense CSR-backed implementation.
//!
//! Engines only ever see a [`GameView`]: vertex count, priorities (stored
//! in non-decreasing order), owners, in/out adjacency, and a per-vertex
//! `disabled` mask. [`DenseGame`] is the canonical implementation with
//! both adjacency directions in CSR form.

use crate::bitset::VertexSet;
use crate::error::SolveError;
use crate::types::{Player, Priority, Vertex};

/// Read-only view of a parity game.
///
/// **Contract:** `priority` is non-decreasing in the vertex id, every
/// adjacency slice contains in-range ids, and `ins`/`outs` are transposes
/// of each other. [`DenseGame`] establishes all three at construction.
pub trait GameView {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Priority of `v`.
    fn priority(&self, v: Vertex) -> Priority;

    /// Owner of `v`.
    fn owner(&self, v: Vertex) -> Player;

    /// Successors of `v`, in edge order.
    fn outs(&self, v: Vertex) -> &[Vertex];

    /// Predecessors of `v`, in edge order.
    fn ins(&self, v: Vertex) -> &[Vertex];

    /// Whether `v` is masked out of the game.
    fn is_disabled(&self, v: Vertex) -> bool;

    /// Number of vertices not masked out.
    fn enabled_count(&self) -> usize {
        (0..self.vertex_count() as Vertex)
            .filter(|&v| !self.is_disabled(v))
            .count()
    }

    /// Highest priority among enabled vertices, or `None` if all are
    /// disabled. Priorities are sorted, so this is the priority of the
    /// highest enabled vertex id.
    fn max_priority(&self) -> Option<Priority> {
        (0..self.vertex_count() as Vertex)
            .rev()
            .find(|&v| !self.is_disabled(v))
            .map(|v| self.priority(v))
    }
}

/// Dense parity game with CSR adjacency in both directions.
#[derive(Clone, Debug)]
pub struct DenseGame {
    priorities: Vec<Priority>,
    owners: Vec<Player>,
    out_index: Vec<u32>,
    out_edges: Vec<Vertex>,
    in_index: Vec<u32>,
    in_edges: Vec<Vertex>,
    disabled: VertexSet,
}

impl DenseGame {
    /// Build a game from per-vertex successor lists.
    ///
    /// Validates that priorities are non-decreasing and every edge target
    /// is in range. Predecessor lists are derived here.
    pub fn from_successors(
        priorities: Vec<Priority>,
        owners: Vec<Player>,
        successors: Vec<Vec<Vertex>>,
    ) -> Result<Self, SolveError> {
        let n = priorities.len();
        if owners.len() != n || successors.len() != n {
            return Err(SolveError::MalformedGame(format!(
                "mismatched lengths: {} priorities, {} owners, {} successor lists",
                n,
                owners.len(),
                successors.len()
            )));
        }
        for w in priorities.windows(2) {
            if w[0] > w[1] {
                return Err(SolveError::MalformedGame(
                    "priorities are not sorted in non-decreasing order".into(),
                ));
            }
        }

        let mut out_index = Vec::with_capacity(n + 1);
        let mut out_edges = Vec::new();
        out_index.push(0);
        for (v, succs) in successors.iter().enumerate() {
            for &to in succs {
                if to as usize >= n {
                    return Err(SolveError::MalformedGame(format!(
                        "edge {v} -> {to} leaves the vertex range [0, {n})"
                    )));
                }
                out_edges.push(to);
            }
            out_index.push(out_edges.len() as u32);
        }

        // Transpose with a counting pass so predecessor order is by source id.
        let mut in_counts = vec![0u32; n];
        for &to in &out_edges {
            in_counts[to as usize] += 1;
        }
        let mut in_index = Vec::with_capacity(n + 1);
        in_index.push(0u32);
        for c in &in_counts {
            in_index.push(in_index.last().copied().unwrap_or(0) + c);
        }
        let mut cursor: Vec<u32> = in_index[..n].to_vec();
        let mut in_edges = vec![0 as Vertex; out_edges.len()];
        for v in 0..n {
            for &to in &out_edges[out_index[v] as usize..out_index[v + 1] as usize] {
                in_edges[cursor[to as usize] as usize] = v as Vertex;
                cursor[to as usize] += 1;
            }
        }

        Ok(Self {
            priorities,
            owners,
            out_index,
            out_edges,
            in_index,
            in_edges,
            disabled: VertexSet::new(n),
        })
    }

    /// Mask `v` out of the game.
    pub fn disable(&mut self, v: Vertex) {
        self.disabled.set(v);
    }

    /// The current disabled mask.
    #[must_use]
    pub fn disabled(&self) -> &VertexSet {
        &self.disabled
    }
}

impl GameView for DenseGame {
    fn vertex_count(&self) -> usize {
        self.priorities.len()
    }

    fn priority(&self, v: Vertex) -> Priority {
        self.priorities[v as usize]
    }

    fn owner(&self, v: Vertex) -> Player {
        self.owners[v as usize]
    }

    fn outs(&self, v: Vertex) -> &[Vertex] {
        &self.out_edges[self.out_index[v as usize] as usize..self.out_index[v as usize + 1] as usize]
    }

    fn ins(&self, v: Vertex) -> &[Vertex] {
        &self.in_edges[self.in_index[v as usize] as usize..self.in_index[v as usize + 1] as usize]
    }

    fn is_disabled(&self, v: Vertex) -> bool {
        self.disabled.test(v)
    }
}
