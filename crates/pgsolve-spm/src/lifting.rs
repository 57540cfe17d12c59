// crates/pgsolve-spm/src/lifting.rs

//! The lifting engine: lattice arithmetic, single-vertex lifts, and the
//! predecessor-driven work loop with a periodic stability sweep.
//!
//! Measure layout: `pms[k·v + i]` is coordinate `i` of vertex `v`'s
//! measure, `k = max priority + 1`. Even coordinates form Even's measure,
//! odd coordinates Odd's. Coordinate `pl` doubles as the Top marker for
//! player `pl` (`-1`). `counts[i]` bounds coordinate `i`: the number of
//! enabled priority-`i` vertices whose same-parity component is not yet
//! Top. A component saturating to Top at `v` means that player pumps its
//! own parity beyond any bound there, i.e. **wins** `v`.

use pgsolve_core::{
    Engine, EngineKind, GameView, IntQueue, Player, SolveError, SolverSink, Vertex, VertexSet,
};
use tracing::{debug, trace};

/// Small-progress-measures engine selector.
///
/// ```no_run
/// use pgsolve_core::{DenseGame, GameSolver};
/// use pgsolve_spm::SmallProgressMeasures;
/// # let game: DenseGame = unimplemented!();
/// let solution = GameSolver::<SmallProgressMeasures>::solve(&game)?;
/// # Ok::<(), pgsolve_core::SolveError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SmallProgressMeasures;

impl Engine for SmallProgressMeasures {
    const KIND: EngineKind = EngineKind::Spm;

    fn solve<G: GameView, S: SolverSink>(game: &G, sink: &mut S) -> Result<(), SolveError> {
        let mut lifter = Lifter::new(game)?;
        lifter.run(sink)
    }
}

/// Top marker inside a measure component.
const TOP: i32 = -1;

struct Lifter<'a, G: GameView> {
    game: &'a G,
    n: usize,
    k: usize,
    pms: Vec<i32>,
    strategy: Vec<Option<Vertex>>,
    counts: Vec<i32>,
    tmp: Vec<i32>,
    best: Vec<i32>,
    dirty: VertexSet,
    todo: IntQueue,
    unstable: VertexSet,
    lift_count: u64,
    lift_attempt: u64,
}

impl<'a, G: GameView> Lifter<'a, G> {
    fn new(game: &'a G) -> Result<Self, SolveError> {
        let n = game.vertex_count();
        let max_prio = game.max_priority().ok_or(SolveError::EmptyGame)?;
        let k = (max_prio as usize + 1).max(2);

        let mut counts = vec![0i32; k];
        for v in 0..n as Vertex {
            if !game.is_disabled(v) {
                counts[game.priority(v) as usize] += 1;
            }
        }

        Ok(Self {
            game,
            n,
            k,
            pms: vec![0; k * n],
            strategy: vec![None; n],
            counts,
            tmp: vec![0; k],
            best: vec![0; k],
            dirty: VertexSet::new(n),
            todo: IntQueue::new(n),
            unstable: VertexSet::new(n),
            lift_count: 0,
            lift_attempt: 0,
        })
    }

    fn todo_push(&mut self, v: Vertex) {
        if !self.dirty.test(v) {
            self.dirty.set(v);
            self.todo.push(v);
        }
    }

    fn todo_pop(&mut self) -> Option<Vertex> {
        let v = self.todo.pop()?;
        self.dirty.reset(v);
        Some(v)
    }

    /// Measure `src`'s successor must advance to at vertex priority `d`
    /// for player `pl`: zero the coordinates below `d`, then ripple-add
    /// through the `pl`-parity coordinates with a carry seeded at `d`
    /// itself when `d` has `pl`'s parity. A carry escaping the top
    /// coordinate saturates the component to Top.
    fn prog(counts: &[i32], dst: &mut [i32], src: &[i32], d: usize, pl: usize) {
        if src[pl] == TOP {
            dst[pl] = TOP;
            return;
        }
        let k = counts.len();
        let mut i = pl;
        while i < d {
            dst[i] = 0;
            i += 2;
        }
        let mut carry = i32::from(d == i);
        while i < k {
            let v = src[i] + carry;
            if v > counts[i] {
                dst[i] = 0;
                carry = 1;
            } else {
                dst[i] = v;
                carry = 0;
            }
            i += 2;
        }
        if carry != 0 {
            dst[pl] = TOP;
        }
    }

    /// Truncated less-than on `pl`'s coordinates from the topmost down to
    /// `d` inclusive. Top dominates every non-Top; two Tops compare equal.
    /// Coordinates beyond their (possibly shrunk) bound have been retired
    /// and compare equal.
    fn pm_less(counts: &[i32], a: &[i32], b: &[i32], d: usize, pl: usize) -> bool {
        if b[pl] == TOP {
            return a[pl] != TOP;
        }
        if a[pl] == TOP {
            return false;
        }
        let k = counts.len();
        let start = if k % 2 == pl { k - 2 } else { k - 1 };
        let mut i = start as isize;
        while i >= d as isize {
            let x = i as usize;
            if a[x] != b[x] {
                if a[x] > counts[x] && b[x] > counts[x] {
                    return false;
                }
                return a[x] < b[x];
            }
            i -= 2;
        }
        false
    }

    /// Copy `pl`-parity coordinates of `src` into `dst`.
    fn pm_copy(dst: &mut [i32], src: &[i32], pl: usize) {
        let mut i = pl;
        while i < src.len() {
            dst[i] = src[i];
            i += 2;
        }
    }

    /// Whether `node`'s measure for `pl` can strictly increase: max over
    /// successors when `pl` owns the node, min otherwise.
    fn canlift(&mut self, node: Vertex, pl: usize) -> bool {
        let game = self.game;
        let k = self.k;
        let base = k * node as usize;
        if self.pms[base + pl] == TOP {
            return false;
        }
        let d = game.priority(node) as usize;

        if game.owner(node).index() == pl {
            for &to in game.outs(node) {
                if game.is_disabled(to) {
                    continue;
                }
                Self::prog(
                    &self.counts,
                    &mut self.tmp,
                    &self.pms[k * to as usize..k * to as usize + k],
                    d,
                    pl,
                );
                if Self::pm_less(&self.counts, &self.pms[base..base + k], &self.tmp, d, pl) {
                    return true;
                }
            }
            false
        } else {
            let mut best_to = None;
            for &to in game.outs(node) {
                if game.is_disabled(to) {
                    continue;
                }
                Self::prog(
                    &self.counts,
                    &mut self.tmp,
                    &self.pms[k * to as usize..k * to as usize + k],
                    d,
                    pl,
                );
                if best_to.is_none()
                    || Self::pm_less(&self.counts, &self.tmp, &self.best, d, pl)
                {
                    self.best.copy_from_slice(&self.tmp);
                    best_to = Some(to);
                }
            }
            // All successors disabled: nothing to lift against.
            if best_to.is_none() {
                return false;
            }
            Self::pm_less(&self.counts, &self.pms[base..base + k], &self.best, d, pl)
        }
    }

    /// Lift `node` for both players at once. With `target` set, the
    /// maximising side only re-examines that one successor (the edge that
    /// just rose), and the minimising side re-runs only when the target
    /// sits on the recorded strategy edge. Returns whether any coordinate
    /// changed; maintains `counts` when a component reaches Top.
    fn lift(&mut self, node: Vertex, target: Option<Vertex>) -> bool {
        let game = self.game;
        let k = self.k;
        let base = k * node as usize;

        if self.pms[base] == TOP && self.pms[base + 1] == TOP {
            return false;
        }
        self.lift_attempt += 1;

        let pl_max = game.owner(node).index();
        let pl_min = 1 - pl_max;
        let d = game.priority(node) as usize;

        // Changed-component markers, indexed by measure component.
        let mut changed: [Option<Vertex>; 2] = [None, None];

        // Maximise the owner's component.
        if self.pms[base + pl_max] != TOP {
            if let Some(t) = target {
                Self::prog(
                    &self.counts,
                    &mut self.tmp,
                    &self.pms[k * t as usize..k * t as usize + k],
                    d,
                    pl_max,
                );
                if Self::pm_less(&self.counts, &self.pms[base..base + k], &self.tmp, d, pl_max) {
                    Self::pm_copy(&mut self.pms[base..base + k], &self.tmp, pl_max);
                    changed[pl_max] = Some(t);
                }
            } else {
                for &to in game.outs(node) {
                    if game.is_disabled(to) {
                        continue;
                    }
                    Self::prog(
                        &self.counts,
                        &mut self.tmp,
                        &self.pms[k * to as usize..k * to as usize + k],
                        d,
                        pl_max,
                    );
                    if Self::pm_less(&self.counts, &self.pms[base..base + k], &self.tmp, d, pl_max)
                    {
                        Self::pm_copy(&mut self.pms[base..base + k], &self.tmp, pl_max);
                        changed[pl_max] = Some(to);
                    }
                }
            }
        }

        // Minimise the opponent's component; its minimiser is the owner's
        // strategy edge for that lattice.
        if self.pms[base + pl_min] != TOP
            && (target.is_none() || target == self.strategy[node as usize])
        {
            let mut best_to = None;
            for &to in game.outs(node) {
                if game.is_disabled(to) {
                    continue;
                }
                Self::prog(
                    &self.counts,
                    &mut self.tmp,
                    &self.pms[k * to as usize..k * to as usize + k],
                    d,
                    pl_min,
                );
                if best_to.is_none()
                    || Self::pm_less(&self.counts, &self.tmp, &self.best, d, pl_min)
                {
                    self.best.copy_from_slice(&self.tmp);
                    best_to = Some(to);
                }
            }
            // Sometimes only the strategy moves while the minimum stays put.
            self.strategy[node as usize] = best_to;
            if Self::pm_less(&self.counts, &self.pms[base..base + k], &self.best, d, pl_min) {
                Self::pm_copy(&mut self.pms[base..base + k], &self.best, pl_min);
                changed[pl_min] = best_to;
            }
        }

        if changed[0].is_none() && changed[1].is_none() {
            return false;
        }

        // A component that just saturated retires one vertex of its parity
        // from the coordinate bound: Top vertices join no winning cycle.
        if changed[0].is_some() && self.pms[base] == TOP && d % 2 == 0 {
            self.counts[d] -= 1;
        }
        if changed[1].is_some() && self.pms[base + 1] == TOP && d % 2 == 1 {
            self.counts[d] -= 1;
        }
        debug_assert!(d < self.counts.len() && self.counts[d] >= 0);

        self.lift_count += 1;
        true
    }

    /// Stability sweep for player `pl`: find vertices whose `pl`-measure
    /// is unstable (Top already, or liftable), propagate instability
    /// backwards (an opponent-owned predecessor stays stable only while
    /// its minimum over stable successors would not improve on it), then
    /// declare the opposite component Top on every vertex that remained
    /// stable, and reschedule it. This breaks the livelock where one
    /// player's region has stabilised but the opponent's measures keep
    /// inching upwards.
    fn update(&mut self, pl: usize) {
        let game = self.game;
        let k = self.k;
        let mut q = IntQueue::new(self.n);

        self.unstable.reset_all();
        for v in 0..self.n as Vertex {
            if game.is_disabled(v) {
                continue;
            }
            if self.pms[k * v as usize + pl] == TOP || self.canlift(v, pl) {
                self.unstable.set(v);
                q.push(v);
            }
        }

        while let Some(nv) = q.pop() {
            for &m in game.ins(nv) {
                if game.is_disabled(m) || self.unstable.test(m) {
                    continue;
                }
                if game.owner(m).index() != pl {
                    let d = game.priority(m) as usize;
                    let mut best_to = None;
                    for &to in game.outs(m) {
                        if game.is_disabled(to) || self.unstable.test(to) {
                            continue;
                        }
                        Self::prog(
                            &self.counts,
                            &mut self.tmp,
                            &self.pms[k * to as usize..k * to as usize + k],
                            d,
                            pl,
                        );
                        if best_to.is_none()
                            || Self::pm_less(&self.counts, &self.tmp, &self.best, d, pl)
                        {
                            self.best.copy_from_slice(&self.tmp);
                            best_to = Some(to);
                        }
                    }
                    let m_base = k * m as usize;
                    if best_to.is_some()
                        && !Self::pm_less(
                            &self.counts,
                            &self.pms[m_base..m_base + k],
                            &self.best,
                            d,
                            pl,
                        )
                    {
                        continue;
                    }
                }
                self.unstable.set(m);
                q.push(m);
            }
        }

        let mut retired = 0usize;
        for v in 0..self.n as Vertex {
            if game.is_disabled(v) {
                continue;
            }
            let base = k * v as usize;
            if !self.unstable.test(v) && self.pms[base + 1 - pl] != TOP {
                let d = game.priority(v) as usize;
                if d % 2 != pl {
                    self.counts[d] -= 1;
                }
                self.pms[base + 1 - pl] = TOP;
                self.todo_push(v);
                retired += 1;
            }
        }
        trace!(pl, retired, "stability sweep");
    }

    /// Initialisation pass, work loop, and final emission.
    fn run<S: SolverSink>(&mut self, sink: &mut S) -> Result<(), SolveError> {
        let game = self.game;

        for v in (0..self.n as Vertex).rev() {
            if !game.is_disabled(v) && self.lift(v, None) {
                for &from in game.ins(v) {
                    if !game.is_disabled(from) && self.lift(from, Some(v)) {
                        self.todo_push(from);
                    }
                }
            }
        }

        let mut last_update = 0u64;
        while let Some(nv) = self.todo_pop() {
            for &from in game.ins(nv) {
                if !game.is_disabled(from) && self.lift(from, Some(nv)) {
                    self.todo_push(from);
                }
            }
            if last_update + 10 * (self.n as u64) < self.lift_count {
                last_update = self.lift_count;
                self.update(0);
                self.update(1);
            }
        }

        debug!(
            lifts = self.lift_count,
            attempts = self.lift_attempt,
            "progress measures stable"
        );

        for v in 0..self.n as Vertex {
            if game.is_disabled(v) {
                continue;
            }
            let base = self.k * v as usize;
            let even_top = self.pms[base] == TOP;
            let odd_top = self.pms[base + 1] == TOP;
            if even_top == odd_top {
                return Err(SolveError::LogicFault(format!(
                    "measure dichotomy violated at vertex {v}"
                )));
            }
            let winner = if even_top { Player::Even } else { Player::Odd };
            let strat = if game.owner(v) == winner {
                self.strategy[v as usize]
            } else {
                None
            };
            sink.resolve(v, winner, strat);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgsolve_core::{DenseGame, GameSolver, Solution};

    fn game(
        priorities: Vec<u32>,
        owners: Vec<Player>,
        successors: Vec<Vec<Vertex>>,
    ) -> DenseGame {
        DenseGame::from_successors(priorities, owners, successors).expect("valid game")
    }

    fn solve(g: &DenseGame) -> Solution {
        GameSolver::<SmallProgressMeasures>::solve(g).expect("solve")
    }

    #[test]
    fn self_loop_priority_zero_won_by_even() {
        let g = game(vec![0], vec![Player::Even], vec![vec![0]]);
        let s = solve(&g);
        assert_eq!(s.winner(0), Some(Player::Even));
        assert_eq!(s.strategy(0), Some(0));
    }

    #[test]
    fn self_loop_priority_one_won_by_odd() {
        let g = game(vec![1], vec![Player::Even], vec![vec![0]]);
        let s = solve(&g);
        assert_eq!(s.winner(0), Some(Player::Odd));
        assert_eq!(s.strategy(0), None);
    }

    #[test]
    fn two_cycle_highest_priority_decides() {
        let g = game(
            vec![0, 1],
            vec![Player::Even, Player::Even],
            vec![vec![1], vec![0]],
        );
        let s = solve(&g);
        assert_eq!(s.winner(0), Some(Player::Odd));
        assert_eq!(s.winner(1), Some(Player::Odd));
        assert_eq!(s.strategy(0), None);
        assert_eq!(s.strategy(1), None);
    }

    #[test]
    fn two_cycle_split_ownership() {
        let g = game(
            vec![0, 1],
            vec![Player::Even, Player::Odd],
            vec![vec![1], vec![0]],
        );
        let s = solve(&g);
        assert_eq!(s.winner(0), Some(Player::Odd));
        assert_eq!(s.winner(1), Some(Player::Odd));
        // Odd owns vertex 1 and wins it; its strategy follows the cycle.
        assert_eq!(s.strategy(1), Some(0));
        assert_eq!(s.strategy(0), None);
    }

    #[test]
    fn ladder_forces_even_priority() {
        // 0 (prio 1) ⇄ 1 (prio 2), with 2 (prio 3) feeding into the cycle.
        // The recurring maximum is 2, so Even wins everywhere.
        let g = game(
            vec![1, 2, 3],
            vec![Player::Odd, Player::Even, Player::Even],
            vec![vec![1], vec![0], vec![1]],
        );
        let s = solve(&g);
        for v in 0..3 {
            assert_eq!(s.winner(v), Some(Player::Even), "vertex {v}");
        }
        assert_eq!(s.strategy(1), Some(0));
        assert_eq!(s.strategy(2), Some(1));
        assert_eq!(s.strategy(0), None);
    }

    #[test]
    fn disconnected_components_solve_independently() {
        // Component A: the all-Even 2-cycle with priorities {0, 1} (Odd
        // wins). Component B: the ladder (Even wins). Priorities stay
        // globally sorted.
        let g = game(
            vec![0, 1, 1, 2, 3],
            vec![
                Player::Even,
                Player::Even,
                Player::Odd,
                Player::Even,
                Player::Even,
            ],
            vec![vec![1], vec![0], vec![3], vec![2], vec![3]],
        );
        let s = solve(&g);
        assert_eq!(s.winner(0), Some(Player::Odd));
        assert_eq!(s.winner(1), Some(Player::Odd));
        assert_eq!(s.winner(2), Some(Player::Even));
        assert_eq!(s.winner(3), Some(Player::Even));
        assert_eq!(s.winner(4), Some(Player::Even));
    }

    #[test]
    fn strategies_point_at_enabled_successors() {
        let g = game(
            vec![0, 1, 2, 2],
            vec![Player::Even, Player::Odd, Player::Even, Player::Odd],
            vec![vec![1, 2], vec![0, 3], vec![2, 0], vec![1, 3]],
        );
        let s = solve(&g);
        for v in 0..4u32 {
            if let Some(t) = s.strategy(v) {
                assert!(g.outs(v).contains(&t), "strategy {v} -> {t} is no edge");
                assert_eq!(s.winner(v), Some(g.owner(v)), "strategy on losing vertex");
            }
        }
    }

    #[test]
    fn disabled_vertices_get_no_decision() {
        let mut g = game(
            vec![0, 1, 2],
            vec![Player::Even, Player::Odd, Player::Even],
            vec![vec![0, 1], vec![2], vec![2]],
        );
        g.disable(1);
        let s = solve(&g);
        assert_eq!(s.winner(0), Some(Player::Even));
        assert_eq!(s.winner(1), None);
        assert_eq!(s.winner(2), Some(Player::Even));
    }

    #[test]
    fn solved_game_is_a_fixed_point() {
        let g = game(
            vec![0, 1, 1, 2],
            vec![Player::Even, Player::Odd, Player::Even, Player::Odd],
            vec![vec![1], vec![0, 2], vec![3], vec![2, 0]],
        );
        let mut lifter = Lifter::new(&g).expect("lifter");
        let mut sink = Solution::new(EngineKind::Spm, 4);
        lifter.run(&mut sink).expect("run");

        // No lift can succeed on the final measures for either player.
        for v in 0..4 {
            for pl in 0..2 {
                assert!(!lifter.canlift(v, pl), "vertex {v} still liftable for {pl}");
            }
        }
    }

    #[test]
    fn coordinate_bounds_shrink_monotonically() {
        let g = game(
            vec![0, 1, 2, 3],
            vec![Player::Odd, Player::Even, Player::Odd, Player::Even],
            vec![vec![1], vec![0, 2], vec![3, 1], vec![2]],
        );
        let mut lifter = Lifter::new(&g).expect("lifter");
        let initial = lifter.counts.clone();
        let mut sink = Solution::new(EngineKind::Spm, 4);
        lifter.run(&mut sink).expect("run");
        for (i, (&before, &after)) in initial.iter().zip(&lifter.counts).enumerate() {
            assert!(after <= before, "counts[{i}] grew");
            assert!(after >= 0, "counts[{i}] went negative");
        }
    }
}
