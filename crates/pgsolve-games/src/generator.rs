// crates/pgsolve-games/src/generator.rs

//! Tiny, deterministic game generator used by the CLI `generate`
//! subcommand, the cross-engine tests, and the benches.
//!
//! The goal is to have *reproducible* inputs without shipping game files:
//! the RNG is `StdRng` seeded explicitly, so a `(n, max_priority,
//! out-degree band, seed)` tuple always produces the same game.

use crate::format::{RawGame, RawVertex, Reindexed};
use anyhow::{ensure, Result};
use pgsolve_core::{DenseGame, Player, Priority, Vertex};
use rand::{rngs::StdRng, Rng as _, SeedableRng};

/// Generate a random game in file numbering (priorities unsorted).
///
/// Every vertex gets a priority in `[0, max_priority]`, a random owner,
/// and between `min_out` and `max_out` distinct successors. One vertex of
/// priority `max_priority` is always present so the advertised maximum is
/// honest.
pub fn random_raw_game(
    n: usize,
    max_priority: Priority,
    min_out: usize,
    max_out: usize,
    seed: u64,
) -> Result<RawGame> {
    ensure!(n > 0, "game must have at least one vertex");
    ensure!(
        (1..=n).contains(&min_out) && min_out <= max_out,
        "out-degree band {min_out}..={max_out} invalid for {n} vertices"
    );
    let max_out = max_out.min(n);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut vertices = Vec::with_capacity(n);
    for v in 0..n {
        let priority = if v == 0 {
            max_priority
        } else {
            rng.random_range(0..=max_priority)
        };
        let owner = if rng.random_bool(0.5) {
            Player::Even
        } else {
            Player::Odd
        };

        let degree = rng.random_range(min_out..=max_out);
        let mut successors: Vec<Vertex> = Vec::with_capacity(degree);
        while successors.len() < degree {
            let to = rng.random_range(0..n as Vertex);
            if !successors.contains(&to) {
                successors.push(to);
            }
        }

        vertices.push(RawVertex {
            priority,
            owner,
            successors,
            name: None,
        });
    }
    Ok(RawGame { vertices })
}

/// Generate a solver-ready (priority-sorted) random game.
pub fn random_game(
    n: usize,
    max_priority: Priority,
    min_out: usize,
    max_out: usize,
    seed: u64,
) -> Result<DenseGame> {
    let Reindexed { game, .. } =
        random_raw_game(n, max_priority, min_out, max_out, seed)?.reindex()?;
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgsolve_core::GameView;

    #[test]
    fn generation_is_deterministic() {
        let a = random_raw_game(40, 5, 1, 3, 7).expect("generate");
        let b = random_raw_game(40, 5, 1, 3, 7).expect("generate");
        assert_eq!(a.vertices, b.vertices);
        let c = random_raw_game(40, 5, 1, 3, 8).expect("generate");
        assert_ne!(a.vertices, c.vertices);
    }

    #[test]
    fn generated_games_are_well_formed() {
        let g = random_game(60, 6, 1, 4, 123).expect("generate");
        assert_eq!(g.vertex_count(), 60);
        assert_eq!(g.max_priority(), Some(6));
        for v in 0..60 {
            assert!(!g.outs(v).is_empty());
        }
        for v in 1..60 {
            assert!(g.priority(v - 1) <= g.priority(v));
        }
    }
}
