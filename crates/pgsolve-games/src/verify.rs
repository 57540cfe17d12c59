// crates/pgsolve-games/src/verify.rs

//! Engine-independent solution checking.
//!
//! A solution is accepted when:
//! 1. every enabled vertex is decided and strategies are sane — reported
//!    only on vertices their winner owns, along real enabled edges that
//!    stay inside the winning region;
//! 2. each region is a trap for the loser — losing-owned vertices cannot
//!    escape, winning-owned vertices follow their strategy inward;
//! 3. the restricted region graph (winner vertices follow the strategy,
//!    loser vertices keep all region edges) has no cycle whose maximum
//!    priority favours the loser. Checked per opposing priority, top
//!    down, with an SCC sweep over the `≤ p` induced subgraph.

use anyhow::{anyhow, bail, ensure, Result};
use pgsolve_core::{GameView, Player, Priority, Solution, Vertex};

/// Check `s` against `game`; `Ok(())` iff the solution is valid.
pub fn verify_solution<G: GameView>(game: &G, s: &Solution) -> Result<()> {
    let n = game.vertex_count();
    ensure!(
        s.len() == n,
        "solution covers {} vertices, game has {n}",
        s.len()
    );

    for v in 0..n as Vertex {
        if game.is_disabled(v) {
            ensure!(
                s.winner(v).is_none(),
                "disabled vertex {v} carries a decision"
            );
            continue;
        }
        let w = s.winner(v).ok_or_else(|| anyhow!("vertex {v} undecided"))?;
        match s.strategy(v) {
            Some(t) => {
                ensure!(
                    game.owner(v) == w,
                    "strategy on vertex {v}, which its winner does not own"
                );
                ensure!(game.outs(v).contains(&t), "strategy {v} -> {t} is no edge");
                ensure!(
                    !game.is_disabled(t),
                    "strategy {v} -> {t} leads to a disabled vertex"
                );
                ensure!(
                    s.winner(t) == Some(w),
                    "strategy {v} -> {t} leaves the winning region"
                );
            }
            None => ensure!(
                game.owner(v) != w,
                "vertex {v} is won by its owner but has no strategy"
            ),
        }
        if game.owner(v) != w {
            for &t in game.outs(v) {
                if game.is_disabled(t) {
                    continue;
                }
                ensure!(
                    s.winner(t) == Some(w),
                    "vertex {v} lets the loser escape via {t}"
                );
            }
        }
    }

    for w in [Player::Even, Player::Odd] {
        check_region_cycles(game, s, w)?;
    }
    Ok(())
}

/// No cycle in `w`'s restricted region graph may be dominated by an
/// opposing priority.
fn check_region_cycles<G: GameView>(game: &G, s: &Solution, w: Player) -> Result<()> {
    let n = game.vertex_count();
    let mut in_region = vec![false; n];
    for v in 0..n as Vertex {
        if !game.is_disabled(v) && s.winner(v) == Some(w) {
            in_region[v as usize] = true;
        }
    }

    // Restricted adjacency: strategy edge for the winner's vertices, all
    // surviving region edges for the loser's.
    let mut radj: Vec<Vec<Vertex>> = vec![Vec::new(); n];
    for v in 0..n as Vertex {
        if !in_region[v as usize] {
            continue;
        }
        if game.owner(v) == w {
            if let Some(t) = s.strategy(v) {
                radj[v as usize].push(t);
            }
        } else {
            for &t in game.outs(v) {
                if !game.is_disabled(t) && in_region[t as usize] {
                    radj[v as usize].push(t);
                }
            }
        }
    }

    let bad = w.opponent();
    let mut prios: Vec<Priority> = (0..n as Vertex)
        .filter(|&v| in_region[v as usize])
        .map(|v| game.priority(v))
        .filter(|&p| bad.likes(p))
        .collect();
    prios.sort_unstable();
    prios.dedup();

    for &p in prios.iter().rev() {
        if let Some(v) = cyclic_vertex_at(game, &radj, &in_region, p) {
            bail!("region of {w} admits a cycle dominated by priority {p} (vertex {v})");
        }
    }
    Ok(())
}

/// Tarjan over the induced subgraph `priority ≤ p`; returns a priority-`p`
/// vertex sitting on a cycle, if any.
fn cyclic_vertex_at<G: GameView>(
    game: &G,
    radj: &[Vec<Vertex>],
    in_region: &[bool],
    p: Priority,
) -> Option<Vertex> {
    let n = radj.len();
    let inside = |v: Vertex| in_region[v as usize] && game.priority(v) <= p;

    let mut index = vec![-1i32; n];
    let mut low = vec![0i32; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<Vertex> = Vec::new();
    let mut call: Vec<(Vertex, usize)> = Vec::new();
    let mut next = 0i32;

    for root in 0..n as Vertex {
        if !inside(root) || index[root as usize] >= 0 {
            continue;
        }
        index[root as usize] = next;
        low[root as usize] = next;
        next += 1;
        stack.push(root);
        on_stack[root as usize] = true;
        call.push((root, 0));

        while let Some(top) = call.last_mut() {
            let v = top.0;
            if top.1 < radj[v as usize].len() {
                let t = radj[v as usize][top.1];
                top.1 += 1;
                if !inside(t) {
                    continue;
                }
                if index[t as usize] < 0 {
                    index[t as usize] = next;
                    low[t as usize] = next;
                    next += 1;
                    stack.push(t);
                    on_stack[t as usize] = true;
                    call.push((t, 0));
                } else if on_stack[t as usize] {
                    low[v as usize] = low[v as usize].min(index[t as usize]);
                }
            } else {
                call.pop();
                if let Some(parent) = call.last_mut() {
                    let u = parent.0;
                    low[u as usize] = low[u as usize].min(low[v as usize]);
                }
                if low[v as usize] == index[v as usize] {
                    let mut component = Vec::new();
                    while let Some(x) = stack.pop() {
                        on_stack[x as usize] = false;
                        component.push(x);
                        if x == v {
                            break;
                        }
                    }
                    let cyclic = component.len() >= 2
                        || radj[v as usize].iter().any(|&t| t == v);
                    if cyclic {
                        if let Some(&x) =
                            component.iter().find(|&&x| game.priority(x) == p)
                        {
                            return Some(x);
                        }
                    }
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgsolve_core::{DenseGame, EngineKind, SolverSink};

    fn split_cycle() -> DenseGame {
        DenseGame::from_successors(
            vec![0, 1],
            vec![Player::Even, Player::Odd],
            vec![vec![1], vec![0]],
        )
        .expect("valid game")
    }

    #[test]
    fn accepts_a_correct_solution() {
        let g = split_cycle();
        let mut s = Solution::new(EngineKind::Spm, 2);
        s.resolve(0, Player::Odd, None);
        s.resolve(1, Player::Odd, Some(0));
        verify_solution(&g, &s).expect("valid solution");
    }

    #[test]
    fn rejects_cycle_with_opposing_parity() {
        // Claiming Even wins the 0⇄1 cycle fails: its dominating priority
        // is 1.
        let g = split_cycle();
        let mut s = Solution::new(EngineKind::Spm, 2);
        s.resolve(0, Player::Even, Some(1));
        s.resolve(1, Player::Even, None);
        let err = verify_solution(&g, &s).expect_err("cycle parity");
        assert!(err.to_string().contains("priority 1"));
    }

    #[test]
    fn rejects_strategy_leaving_the_region() {
        let g = split_cycle();
        let mut s = Solution::new(EngineKind::Spm, 2);
        s.resolve(0, Player::Even, Some(1));
        s.resolve(1, Player::Odd, Some(0));
        assert!(verify_solution(&g, &s).is_err());
    }

    #[test]
    fn rejects_undecided_vertices() {
        let g = split_cycle();
        let mut s = Solution::new(EngineKind::Spm, 2);
        s.resolve(0, Player::Odd, None);
        assert!(verify_solution(&g, &s).is_err());
    }

    #[test]
    fn rejects_missing_strategy_on_owned_win() {
        let g = split_cycle();
        let mut s = Solution::new(EngineKind::Spm, 2);
        s.resolve(0, Player::Odd, None);
        s.resolve(1, Player::Odd, None);
        let err = verify_solution(&g, &s).expect_err("strategy required");
        assert!(err.to_string().contains("no strategy"));
    }

    #[test]
    fn self_loop_cycle_is_detected() {
        // Vertex 1 self-loops with priority 1; claiming it for Even fails.
        let g = DenseGame::from_successors(
            vec![0, 1],
            vec![Player::Even, Player::Odd],
            vec![vec![0], vec![1]],
        )
        .expect("valid game");
        let mut s = Solution::new(EngineKind::Spm, 2);
        s.resolve(0, Player::Even, Some(0));
        s.resolve(1, Player::Even, None);
        assert!(verify_solution(&g, &s).is_err());
    }
}
