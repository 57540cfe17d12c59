// crates/pgsolve-spm/src/lib.rs

//! Small-progress-measures engine.
//!
//! Assigns every vertex a lexicographic measure per player and lifts
//! measures towards a least fixed point; a component saturating to Top
//! decides the vertex. The engine keeps **both** players' measures in one
//! interleaved vector (even indices belong to Even's lattice, odd indices
//! to Odd's), so one run decides winners and positional strategies for
//! both players at once.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

mod lifting;

pub use lifting::SmallProgressMeasures;
