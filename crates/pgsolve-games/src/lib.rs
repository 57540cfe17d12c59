// crates/pgsolve-games/src/lib.rs

//! Parity-game inputs and outputs around the core solver: the pgsolver
//! text format, priority reindexing, a deterministic random generator,
//! and an engine-independent solution verifier.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation
)]

/// Raw (unsorted) game records and the priority-order reindexing.
pub mod format;
/// Seeded random game generation.
pub mod generator;
/// pgsolver-format text reading and writing.
pub mod io;
/// Engine-independent solution checking.
pub mod verify;

pub use format::{RawGame, RawVertex, Reindexed};
pub use generator::random_game;
pub use verify::verify_solution;
