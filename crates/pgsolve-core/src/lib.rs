//! pgsolve-core — core types, game interface, and the solver façade.
//!
//! This crate defines the **stable boundary** used across pgsolve crates:
//! - canonical data types (`Player`, `VertexSet`, `IntQueue`, …),
//! - the read-only [`GameView`] interface engines consume,
//! - the [`SolverSink`] decisions flow into and the [`Solution`] artifact,
//! - JSON/CBOR/CSV solution I/O, and
//! - the **engine-agnostic** solving façade.
//!
//! ```no_run
//! use pgsolve_core::{DenseGame, Engine, GameSolver, Solution};
//! # struct Spm;
//! # impl Engine for Spm {
//! #   const KIND: pgsolve_core::EngineKind = pgsolve_core::EngineKind::Spm;
//! #   fn solve<G: pgsolve_core::GameView, S: pgsolve_core::SolverSink>(
//! #       _g: &G, _s: &mut S) -> Result<(), pgsolve_core::SolveError> { unimplemented!() }
//! # }
//! # let game: DenseGame = unimplemented!();
//! // Validate the game, run the engine, collect a solution:
//! // let solution = GameSolver::<Spm>::solve(&game)?;
//! # Ok::<(), pgsolve_core::SolveError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::doc_markdown
)]

/// Fixed-width bit vector over game vertices.
pub mod bitset;
/// Engine trait, engine identifiers, and the validating solver façade.
pub mod engine;
/// Fault taxonomy shared by the engines.
pub mod error;
/// Read-only game interface and the dense CSR-backed implementation.
pub mod game;
/// JSON/CBOR/CSV helpers for solution artifacts.
pub mod io;
/// Bounded circular index queue.
pub mod queue;
/// Solver sink trait and the `Solution` artifact.
pub mod solution;
/// Canonical scalar types shared across the workspace.
pub mod types;

// ---- Re-exports for workspace compatibility ----
pub use bitset::VertexSet;
pub use engine::{Engine, EngineKind, GameSolver};
pub use error::SolveError;
pub use game::{DenseGame, GameView};
pub use queue::IntQueue;
pub use solution::{Solution, SolverSink};
pub use types::{Player, Priority, Vertex};

/// Commonly-used items for quick imports.
///
/// ```rust
/// use pgsolve_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        bitset::VertexSet, engine::Engine, engine::GameSolver, game::DenseGame, game::GameView,
        solution::Solution, solution::SolverSink, types::*,
    };
}
