// crates/pgsolve-core/src/solution.rs

//! Solver sink trait and the `Solution` artifact.
//!
//! Engines emit one `(vertex, winner, strategy)` decision per enabled
//! vertex through [`SolverSink`]. [`Solution`] is the canonical collecting
//! sink and the serialized boundary towards the CLI and the verifier.
//!
//! **Invariants**
//! - A strategy is only reported for vertices owned by their winner, and
//!   always names a successor of the vertex.
//! - Disabled vertices receive no decision and stay `None`.

use crate::engine::EngineKind;
use crate::types::{Player, Vertex};
use serde::{Deserialize, Serialize};

/// Receiver of per-vertex solving decisions.
pub trait SolverSink {
    /// Record that `winner` wins `v`, moving to `strategy` when `v` is
    /// owned by the winner (`None` for opponent-owned vertices).
    fn resolve(&mut self, v: Vertex, winner: Player, strategy: Option<Vertex>);
}

/// Per-vertex winners and positional strategies for one solved game.
///
/// The `meta` field is free-form JSON intended for diagnostics or light
/// telemetry (lift counts, recursion depth). Avoid parsing it in critical
/// paths; promote values into typed fields if they start to matter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Solution {
    /// Engine that produced the decisions.
    pub engine: EngineKind,
    /// Winner per vertex; `None` for vertices never decided (disabled).
    pub winners: Vec<Option<Player>>,
    /// Strategy per vertex; `Some` only where the owner wins.
    pub strategies: Vec<Option<Vertex>>,
    /// Free-form metadata for debugging/observability.
    #[serde(default)]
    pub meta: serde_json::Value,
}

impl Solution {
    /// Undecided solution for an `n`-vertex game.
    #[must_use]
    pub fn new(engine: EngineKind, n: usize) -> Self {
        Self {
            engine,
            winners: vec![None; n],
            strategies: vec![None; n],
            meta: serde_json::Value::Null,
        }
    }

    /// Number of vertices the solution ranges over.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.winners.len()
    }

    /// Whether the solution ranges over zero vertices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }

    /// Winner of `v`, if decided.
    #[inline]
    #[must_use]
    pub fn winner(&self, v: Vertex) -> Option<Player> {
        self.winners[v as usize]
    }

    /// Strategy of `v`, if any.
    #[inline]
    #[must_use]
    pub fn strategy(&self, v: Vertex) -> Option<Vertex> {
        self.strategies[v as usize]
    }

    /// Vertices won by `pl`.
    #[must_use]
    pub fn region(&self, pl: Player) -> Vec<Vertex> {
        self.winners
            .iter()
            .enumerate()
            .filter_map(|(v, w)| (*w == Some(pl)).then_some(v as Vertex))
            .collect()
    }
}

impl SolverSink for Solution {
    fn resolve(&mut self, v: Vertex, winner: Player, strategy: Option<Vertex>) {
        self.winners[v as usize] = Some(winner);
        self.strategies[v as usize] = strategy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_decisions() {
        let mut s = Solution::new(EngineKind::Spm, 3);
        s.resolve(0, Player::Even, Some(1));
        s.resolve(2, Player::Odd, None);
        assert_eq!(s.winner(0), Some(Player::Even));
        assert_eq!(s.strategy(0), Some(1));
        assert_eq!(s.winner(1), None);
        assert_eq!(s.region(Player::Odd), vec![2]);
    }

    #[test]
    fn serde_roundtrip_json() {
        let mut s = Solution::new(EngineKind::Zlk, 2);
        s.resolve(0, Player::Odd, None);
        s.meta = serde_json::json!({"lifts": 12});

        let ser = serde_json::to_vec(&s).expect("serialize");
        let de: Solution = serde_json::from_slice(&ser).expect("deserialize");
        assert_eq!(de.engine, EngineKind::Zlk);
        assert_eq!(de.winners, s.winners);
        assert!(de.meta.get("lifts").is_some());
    }
}
