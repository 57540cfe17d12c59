// crates/pgsolve-utree/src/lib.rs

//! Universal ordered trees backing the Zielonka engine's recursion bound.
//!
//! - [`arena`]: a fixed-slab slot pool holding one ordered tree per player,
//!   with reference counting via per-slot vertex membership bitsets and a
//!   mark-free garbage collector.
//! - [`agent`]: per-player navigation heads (`init` / `step_up` /
//!   `step_down` / `step_left` / `step_right`) and the vertex-to-node
//!   mapping table with BOT/MID/TOP signs.
//! - [`render`]: diagnostics only — mapping CSV and an HTML/SVG picture of
//!   the two trees.
//!
//! The arena is the sole owner of tree nodes; nodes refer to each other by
//! slot id, and membership changes propagate to ancestors by an explicit
//! walk up the parent chain. Slot ids are stable until released.

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

/// Navigation heads and vertex mapping over the arena.
pub mod agent;
/// Slot pool, ordered-tree nodes, and garbage collection.
pub mod arena;
/// Mapping CSV and tree pictures (diagnostics only).
pub mod render;

pub use agent::TreeAgent;
pub use arena::{Arena, SlotId};

use std::fmt;

/// Tag attached to a vertex-to-node mapping, distinguishing attractor
/// layers anchored at the same tree location.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sign {
    /// The frame's target set itself.
    Mid = 0,
    /// The surrounding attractor layer below the target set.
    Bot = 1,
    /// Vertices that must be handled again further up the tree.
    Top = 2,
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mid => write!(f, "mid"),
            Self::Bot => write!(f, "bot"),
            Self::Top => write!(f, "top"),
        }
    }
}
