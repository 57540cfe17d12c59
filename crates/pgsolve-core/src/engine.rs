// crates/pgsolve-core/src/engine.rs

//! Engine abstraction and the validating solver façade.
//!
//! Implementors provide a *stateless* API (associated functions) that take
//! a game view and a sink. This keeps the call surface stable across the
//! CLI and tests, and lets callers pick an engine as a type parameter:
//! `GameSolver::<SmallProgressMeasures>::solve(&game)`.
//!
//! ## Contracts implementors should uphold
//! - Emit exactly one decision per enabled vertex, none for disabled ones.
//! - Reported strategies must name enabled successors and only appear on
//!   vertices owned by their winner.
//! - Return `Err` instead of panicking for every internal fault.

use crate::error::SolveError;
use crate::game::GameView;
use crate::solution::{Solution, SolverSink};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use tracing::debug;

/// Which engine produced a solution.
///
/// Marked `#[non_exhaustive]`; unknown serialized variants decode as
/// [`EngineKind::Unknown`] so older consumers keep reading newer files.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Small-progress-measures lifting engine.
    Spm,
    /// Universal-tree-directed McNaughton–Zielonka engine.
    Zlk,
    /// Catch-all for newer/unknown engines when deserializing.
    #[serde(other)]
    Unknown,
}

/// Minimal engine API the rest of the system depends on.
pub trait Engine {
    /// Identifier stamped into produced [`Solution`]s.
    const KIND: EngineKind;

    /// Solve `game`, emitting one decision per enabled vertex into `sink`.
    fn solve<G: GameView, S: SolverSink>(game: &G, sink: &mut S) -> Result<(), SolveError>;
}

/// Façade that validates the game interface contract before delegating to
/// an engine, and collects the result into a [`Solution`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GameSolver<E: Engine> {
    engine: PhantomData<E>,
}

impl<E: Engine> GameSolver<E> {
    /// Validate `game`, run the engine, and return the collected solution.
    pub fn solve<G: GameView>(game: &G) -> Result<Solution, SolveError> {
        Self::validate(game)?;
        debug!(
            engine = ?E::KIND,
            vertices = game.vertex_count(),
            enabled = game.enabled_count(),
            "solving"
        );
        let mut solution = Solution::new(E::KIND, game.vertex_count());
        E::solve(game, &mut solution)?;
        Ok(solution)
    }

    /// Validate `game` and run the engine against a caller-provided sink.
    pub fn solve_into<G: GameView, S: SolverSink>(
        game: &G,
        sink: &mut S,
    ) -> Result<(), SolveError> {
        Self::validate(game)?;
        E::solve(game, sink)
    }

    /// Check the [`GameView`] contract the engines rely on.
    ///
    /// - at least one enabled vertex,
    /// - priorities non-decreasing in the vertex id,
    /// - every enabled vertex has at least one enabled successor
    ///   (parity games are games on total graphs).
    fn validate<G: GameView>(game: &G) -> Result<(), SolveError> {
        let n = game.vertex_count();
        if game.enabled_count() == 0 {
            return Err(SolveError::EmptyGame);
        }
        for v in 1..n {
            if game.priority(v as u32 - 1) > game.priority(v as u32) {
                return Err(SolveError::MalformedGame(
                    "priorities are not sorted in non-decreasing order".into(),
                ));
            }
        }
        for v in 0..n as u32 {
            if game.is_disabled(v) {
                continue;
            }
            if !game.outs(v).iter().any(|&to| !game.is_disabled(to)) {
                return Err(SolveError::MalformedGame(format!(
                    "enabled vertex {v} has no enabled successor"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::DenseGame;
    use crate::types::Player;

    struct Nop;
    impl Engine for Nop {
        const KIND: EngineKind = EngineKind::Unknown;
        fn solve<G: GameView, S: SolverSink>(_: &G, _: &mut S) -> Result<(), SolveError> {
            Ok(())
        }
    }

    #[test]
    fn empty_game_faults() {
        let mut g = DenseGame::from_successors(
            vec![0],
            vec![Player::Even],
            vec![vec![0]],
        )
        .expect("valid game");
        g.disable(0);
        assert!(matches!(
            GameSolver::<Nop>::solve(&g),
            Err(SolveError::EmptyGame)
        ));
    }

    #[test]
    fn dead_end_after_disabling_faults() {
        let mut g = DenseGame::from_successors(
            vec![0, 1],
            vec![Player::Even, Player::Odd],
            vec![vec![1], vec![1]],
        )
        .expect("valid game");
        g.disable(1);
        assert!(matches!(
            GameSolver::<Nop>::solve(&g),
            Err(SolveError::MalformedGame(_))
        ));
    }

    #[test]
    fn unknown_engine_kind_tolerated_in_serde() {
        let de: EngineKind = serde_json::from_str("\"tangram\"").expect("deserialize");
        assert_eq!(de, EngineKind::Unknown);
    }
}
