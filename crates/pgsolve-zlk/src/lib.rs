// crates/pgsolve-zlk/src/lib.rs

//! McNaughton–Zielonka engine with universal-tree navigation.
//!
//! The classical recursion — attract to the highest priority, solve the
//! rest, re-attract the opponent's winnings, iterate — runs on an explicit
//! frame stack with staged re-entry, so native stack depth stays flat on
//! large games. Recursion depth and sibling branching are walked on a pair
//! of Strahler universal ordered trees (one per player) held in a
//! garbage-collected arena; the per-vertex tree mappings double as
//! diagnostics the CLI can dump.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation
)]

mod recursion;

pub use recursion::{UniversalZielonka, ZlkSolver};
