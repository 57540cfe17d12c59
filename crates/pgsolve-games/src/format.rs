// crates/pgsolve-games/src/format.rs

//! Raw game records as they appear in game files, and the reindexing that
//! puts vertices into the non-decreasing priority order the engines
//! require.
//!
//! Files may list vertices in any order; the solver interface demands
//! priority-sorted ids. [`RawGame::reindex`] sorts (stably, so equal
//! priorities keep file order), rewrites the edges, and keeps the
//! permutation so solutions can be reported against the original ids.

use anyhow::{anyhow, Result};
use pgsolve_core::{DenseGame, Player, Priority, Solution, Vertex};

/// One vertex record as parsed from a game file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawVertex {
    /// Priority of the vertex.
    pub priority: Priority,
    /// Owning player.
    pub owner: Player,
    /// Successor ids (file numbering).
    pub successors: Vec<Vertex>,
    /// Optional label carried through from the file.
    pub name: Option<String>,
}

/// A parity game in file numbering, not yet priority-sorted.
#[derive(Clone, Debug, Default)]
pub struct RawGame {
    /// Vertex records, indexed by file id.
    pub vertices: Vec<RawVertex>,
}

/// A priority-sorted game plus the translation back to file ids.
#[derive(Debug)]
pub struct Reindexed {
    /// The solver-ready game.
    pub game: DenseGame,
    /// `original[new_id]` is the file id the vertex had.
    pub original: Vec<Vertex>,
}

impl RawGame {
    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the game has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Sort vertices by priority (stable) and build the solver game.
    ///
    /// Duplicate edges are collapsed; dangling edges are rejected here so
    /// the solver only ever sees well-formed adjacency.
    pub fn reindex(&self) -> Result<Reindexed> {
        let n = self.vertices.len();
        let mut order: Vec<Vertex> = (0..n as Vertex).collect();
        order.sort_by_key(|&v| self.vertices[v as usize].priority);

        // new_id[file_id] inverts the order permutation.
        let mut new_id = vec![0 as Vertex; n];
        for (new, &old) in order.iter().enumerate() {
            new_id[old as usize] = new as Vertex;
        }

        let mut priorities = Vec::with_capacity(n);
        let mut owners = Vec::with_capacity(n);
        let mut successors = Vec::with_capacity(n);
        for &old in &order {
            let rv = &self.vertices[old as usize];
            let mut succs: Vec<Vertex> = Vec::with_capacity(rv.successors.len());
            for &to in &rv.successors {
                if to as usize >= n {
                    return Err(anyhow!(
                        "vertex {old} has an edge to {to}, outside [0, {n})"
                    ));
                }
                succs.push(new_id[to as usize]);
            }
            succs.sort_unstable();
            succs.dedup();
            priorities.push(rv.priority);
            owners.push(rv.owner);
            successors.push(succs);
        }

        let game = DenseGame::from_successors(priorities, owners, successors)?;
        Ok(Reindexed {
            game,
            original: order,
        })
    }
}

impl Reindexed {
    /// Translate a solution on the sorted game back to file numbering.
    #[must_use]
    pub fn to_original(&self, s: &Solution) -> Solution {
        let n = self.original.len();
        let mut out = Solution::new(s.engine, n);
        out.meta = s.meta.clone();
        for new in 0..n as Vertex {
            let old = self.original[new as usize];
            out.winners[old as usize] = s.winners[new as usize];
            out.strategies[old as usize] = s.strategies[new as usize]
                .map(|t| self.original[t as usize]);
        }
        out
    }
}
