// crates/pgsolve-core/src/error.rs

//! Fault taxonomy shared by the engines.
//!
//! None of these are caught or retried internally: a fault aborts the run
//! and the sink is left in its pre-run state. `LogicFault` in particular
//! always indicates an implementation bug, never bad input.

use thiserror::Error;

/// Faults surfaced by the solving engines and their supporting structures.
#[derive(Debug, Error)]
pub enum SolveError {
    /// Internal invariant violation (e.g. measure dichotomy failure at
    /// termination, child not found in the tree arena, release of an
    /// already-free slot, `step_up` at a tree root).
    #[error("logic fault: {0}")]
    LogicFault(String),

    /// Universal-tree navigation was asked to move beyond its configured
    /// depth.
    #[error("tree bounds fault: {0}")]
    TreeBounds(String),

    /// `solve` was called on a game with no enabled vertices.
    #[error("empty game: no enabled vertices")]
    EmptyGame,

    /// The game violates the interface contract (unsorted priorities,
    /// dangling edges, an enabled vertex without an enabled successor).
    #[error("malformed game: {0}")]
    MalformedGame(String),
}
