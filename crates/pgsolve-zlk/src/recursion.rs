// crates/pgsolve-zlk/src/recursion.rs

//! The staged recursion and its attractor primitive.
//!
//! **Frame lifecycle.** A frame owns its subgame bitset, its target set
//! (vertices of the frame's priority bound), and the target's attractor.
//! Stage 0 attracts the targets and descends into the remainder. Stage 1
//! receives the child's result `ao` — the region the opponent wins in the
//! remainder. While `ao` is non-empty the frame absorbs its attractor out
//! of the subgame, takes a right step on the stepped-down tree, re-attracts
//! the surviving targets, and descends again; stage 2 is reached only once
//! the opponent comes back empty-handed. Stage 2 fixes the targets'
//! strategies, anchors the frame's claim on the player's tree, steps the
//! opponent tree back up, and hands the whole remaining subgame to the
//! parent as its `ao`.
//!
//! **Tree pairing.** Pushing a child steps the pushing frame's own tree
//! down; the child's stage 2 steps that tree up again. The tree a frame's
//! parent descended for it moves right once per opponent round.

use pgsolve_core::{
    Engine, EngineKind, GameView, IntQueue, Player, SolveError, SolverSink, Vertex, VertexSet,
};
use pgsolve_utree::{Sign, SlotId, TreeAgent};
use tracing::{debug, trace};

/// Universal-tree-directed Zielonka engine selector.
///
/// ```no_run
/// use pgsolve_core::{DenseGame, GameSolver};
/// use pgsolve_zlk::UniversalZielonka;
/// # let game: DenseGame = unimplemented!();
/// let solution = GameSolver::<UniversalZielonka>::solve(&game)?;
/// # Ok::<(), pgsolve_core::SolveError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct UniversalZielonka;

impl Engine for UniversalZielonka {
    const KIND: EngineKind = EngineKind::Zlk;

    fn solve<G: GameView, S: SolverSink>(game: &G, sink: &mut S) -> Result<(), SolveError> {
        let mut solver = ZlkSolver::new(game)?;
        solver.run(sink)
    }
}

struct Frame {
    /// Priority bound of this frame.
    d: u32,
    /// Recursion depth (root = 0).
    depth: u32,
    /// Re-entry point: 0 descend, 1 handle child result, 2 ascend.
    stage: u8,
    /// Current subgame; shrinks only when opponent regions are absorbed.
    sub: VertexSet,
    /// Enabled vertices of priority `d` still in `sub`.
    target: Vec<Vertex>,
    /// Attractor of `target` within `sub`.
    attr: VertexSet,
    /// Child result: the region the opponent wins in the remainder.
    ao: VertexSet,
    /// Tree heads when this frame was entered (diagnostics).
    even: SlotId,
    odd: SlotId,
}

/// Stateful engine; kept public so callers can reach the tree agent for
/// mapping dumps and renders after a run.
pub struct ZlkSolver<'a, G: GameView> {
    game: &'a G,
    n: usize,
    winning: Vec<Option<Player>>,
    strategy: Vec<Option<Vertex>>,
    agent: TreeAgent,
    stack: Vec<Frame>,
    queue: IntQueue,
    queued: VertexSet,
    counters: Vec<i32>,
    rounds: u64,
}

impl<'a, G: GameView> ZlkSolver<'a, G> {
    /// Build a solver for `game`; faults on a fully disabled game.
    pub fn new(game: &'a G) -> Result<Self, SolveError> {
        let n = game.vertex_count();
        let max_prio = game.max_priority().ok_or(SolveError::EmptyGame)?;
        Ok(Self {
            game,
            n,
            winning: vec![None; n],
            strategy: vec![None; n],
            agent: TreeAgent::new(n, max_prio),
            stack: Vec::new(),
            queue: IntQueue::new(n),
            queued: VertexSet::new(n),
            counters: vec![-1; n],
            rounds: 0,
        })
    }

    /// The universal-tree agent (diagnostics: mappings, renders).
    #[must_use]
    pub fn agent(&self) -> &TreeAgent {
        &self.agent
    }

    /// Drive the stack to empty and emit one decision per enabled vertex.
    pub fn run<S: SolverSink>(&mut self, sink: &mut S) -> Result<(), SolveError> {
        let game = self.game;
        let max_prio = game
            .max_priority()
            .ok_or(SolveError::EmptyGame)?;

        self.agent.init(Player::Even);
        self.agent.init(Player::Odd);

        // The initial frame plays parity(max_prio); the tree its virtual
        // parent would have descended is the opponent's.
        let first = Player::of_priority(max_prio);
        self.agent.step_down(first.opponent())?;

        let mut sub = VertexSet::new(self.n);
        for v in 0..self.n as Vertex {
            if !game.is_disabled(v) {
                sub.set(v);
            }
        }
        self.stack.push(Frame {
            d: max_prio,
            depth: 0,
            stage: 0,
            sub,
            target: Vec::new(),
            attr: VertexSet::new(self.n),
            ao: VertexSet::new(self.n),
            even: self.agent.head(Player::Even),
            odd: self.agent.head(Player::Odd),
        });

        while let Some(frame) = self.stack.pop() {
            match frame.stage {
                0 => self.descend(frame)?,
                1 => self.resume(frame)?,
                _ => self.ascend(frame)?,
            }
        }

        self.agent.collect();
        debug!(rounds = self.rounds, "recursion finished");

        for v in 0..self.n as Vertex {
            if game.is_disabled(v) {
                continue;
            }
            let winner = self.winning[v as usize].ok_or_else(|| {
                SolveError::LogicFault(format!("vertex {v} left undecided"))
            })?;
            let strat = if game.owner(v) == winner {
                self.strategy[v as usize]
            } else {
                None
            };
            sink.resolve(v, winner, strat);
        }
        Ok(())
    }

    /// Stage 0: collect targets, attract them, descend into the rest.
    fn descend(&mut self, mut frame: Frame) -> Result<(), SolveError> {
        self.rounds += 1;
        trace!(
            d = frame.d,
            depth = frame.depth,
            even = frame.even,
            odd = frame.odd,
            size = frame.sub.count(),
            "enter subgame"
        );
        let pl = Player::of_priority(frame.d);
        let game = self.game;
        frame.target = frame
            .sub
            .iter()
            .filter(|&v| game.priority(v) == frame.d)
            .collect();
        frame.attr.reset_all();
        self.attract(pl, &frame.target, &frame.sub, &mut frame.attr, true);
        self.push_child_or_ascend(frame)
    }

    /// Stage 1: the child handed back `ao`. Non-empty: absorb its
    /// attractor, advance the tree sideways, re-attract the surviving
    /// targets, and descend again. Empty: the opponent is exhausted.
    fn resume(&mut self, mut frame: Frame) -> Result<(), SolveError> {
        if !frame.ao.any() {
            frame.stage = 2;
            return self.ascend(frame);
        }
        self.rounds += 1;
        let pl = Player::of_priority(frame.d);
        let opp = pl.opponent();

        let seeds: Vec<Vertex> = frame.ao.iter().collect();
        self.attract(opp, &seeds, &frame.sub, &mut frame.ao, false);

        // Vertices dragged in beyond the child's own claim must be
        // revisited further up the tree.
        let mut dragged = frame.ao.clone();
        for &s in &seeds {
            dragged.reset(s);
        }
        self.agent.map_set(opp, Sign::Top, &dragged);
        self.agent.step_right(opp)?;

        frame.sub -= &frame.ao;
        frame.ao.reset_all();
        frame.target.retain(|&v| frame.sub.test(v));
        frame.attr.reset_all();
        self.attract(pl, &frame.target, &frame.sub, &mut frame.attr, true);
        self.push_child_or_ascend(frame)
    }

    /// Push a fresh child on `sub - attr` when it is non-empty; otherwise
    /// the opponent wins nothing below and the frame completes.
    fn push_child_or_ascend(&mut self, mut frame: Frame) -> Result<(), SolveError> {
        let pl = Player::of_priority(frame.d);
        let mut rest = frame.sub.clone();
        rest -= &frame.attr;
        if rest.any() {
            debug_assert!(frame.d > 0, "remainder below priority bound 0");
            self.agent.step_down(pl)?;
            let child = Frame {
                d: frame.d - 1,
                depth: frame.depth + 1,
                stage: 0,
                sub: rest,
                target: Vec::new(),
                attr: VertexSet::new(self.n),
                ao: VertexSet::new(self.n),
                even: self.agent.head(Player::Even),
                odd: self.agent.head(Player::Odd),
            };
            frame.stage = 1;
            self.stack.push(frame);
            self.stack.push(child);
            Ok(())
        } else {
            frame.stage = 2;
            self.ascend(frame)
        }
    }

    /// Stage 2: the whole remaining subgame belongs to the frame's
    /// player. Fix target strategies, anchor the claim on the tree, step
    /// the entry tree up, and return the subgame to the parent.
    fn ascend(&mut self, mut frame: Frame) -> Result<(), SolveError> {
        let game = self.game;
        let pl = Player::of_priority(frame.d);

        for &v in &frame.target {
            if game.owner(v) != pl {
                continue;
            }
            for &to in game.outs(v) {
                if frame.sub.test(to) {
                    self.strategy[v as usize] = Some(to);
                    break;
                }
            }
        }

        for &v in &frame.target {
            frame.attr.reset(v);
        }
        self.agent.map_slice(pl, Sign::Mid, &frame.target);
        self.agent.map_set(pl, Sign::Bot, &frame.attr);
        self.agent.step_up(pl.opponent())?;

        trace!(
            d = frame.d,
            depth = frame.depth,
            claim = frame.sub.count(),
            "leave subgame"
        );
        if let Some(parent) = self.stack.last_mut() {
            parent.ao = frame.sub;
        }
        Ok(())
    }

    /// Attractor of `seeds` for `pl` within `sub`, accumulated into
    /// `into` (which may already hold the seeds). Worklist over
    /// predecessors with an in-queue bitset; opponent-owned vertices carry
    /// an outstanding-edge counter and are forced once it hits zero.
    /// Attracted `pl`-vertices point their strategy at the absorbing
    /// successor; forced opponent vertices get none. Seeds are claimed for
    /// `pl`; their strategies reset only when `reset_seed_strategy` is set
    /// (target seeds get theirs in stage 2, opponent-round seeds keep the
    /// child's).
    fn attract(
        &mut self,
        pl: Player,
        seeds: &[Vertex],
        sub: &VertexSet,
        into: &mut VertexSet,
        reset_seed_strategy: bool,
    ) {
        let game = self.game;
        self.counters.fill(-1);
        self.queued.reset_all();
        self.queue.clear();

        for &s in seeds {
            if self.queued.test(s) {
                continue;
            }
            self.winning[s as usize] = Some(pl);
            if reset_seed_strategy {
                self.strategy[s as usize] = None;
            }
            self.queued.set(s);
            self.queue.push(s);
        }

        while let Some(cur) = self.queue.pop() {
            into.set(cur);
            self.queued.reset(cur);
            for &from in game.ins(cur) {
                if !sub.test(from) || into.test(from) || self.queued.test(from) {
                    continue;
                }
                if game.owner(from) == pl {
                    self.winning[from as usize] = Some(pl);
                    self.strategy[from as usize] = Some(cur);
                    self.queued.set(from);
                    self.queue.push(from);
                } else {
                    // First visit counts the surviving out-edges, minus
                    // the successor that was just absorbed; later visits
                    // decrement. Zero means every escape is gone.
                    let c = if self.counters[from as usize] < 0 {
                        let mut count = -1i32;
                        for &to in game.outs(from) {
                            if sub.test(to) {
                                count += 1;
                            }
                        }
                        count
                    } else {
                        self.counters[from as usize] - 1
                    };
                    if c == 0 {
                        self.winning[from as usize] = Some(pl);
                        self.strategy[from as usize] = None;
                        self.queued.set(from);
                        self.queue.push(from);
                    } else {
                        self.counters[from as usize] = c;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgsolve_core::{DenseGame, GameSolver, Solution};
    use pgsolve_utree::Arena;

    fn game(
        priorities: Vec<u32>,
        owners: Vec<Player>,
        successors: Vec<Vec<Vertex>>,
    ) -> DenseGame {
        DenseGame::from_successors(priorities, owners, successors).expect("valid game")
    }

    fn solve(g: &DenseGame) -> Solution {
        GameSolver::<UniversalZielonka>::solve(g).expect("solve")
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
        assert_eq!(s.strategy(1), Some(0));
        assert_eq!(s.strategy(0), None);
    }

    #[test]
    fn ladder_forces_even_priority() {
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
    fn heads_return_to_the_roots() {
        // Every step down is paired with a step up, so both heads finish
        // back at their roots whatever the recursion did in between.
        let g = game(
            vec![0, 1, 2, 3, 4],
            vec![
                Player::Even,
                Player::Odd,
                Player::Even,
                Player::Odd,
                Player::Even,
            ],
            vec![vec![1, 2], vec![0], vec![3, 0], vec![2, 4], vec![1]],
        );
        let mut solver = ZlkSolver::new(&g).expect("solver");
        let mut sink = Solution::new(EngineKind::Zlk, 5);
        solver.run(&mut sink).expect("run");
        assert_eq!(solver.agent().head(Player::Even), Arena::root(Player::Even));
        assert_eq!(solver.agent().head(Player::Odd), Arena::root(Player::Odd));
        for v in 0..5 {
            assert!(sink.winner(v).is_some());
        }
    }

    #[test]
    fn opponent_round_absorbs_inner_dominion() {
        // Vertex 2 (priority 2) feeds a cycle 0⇄1 dominated by priority 1:
        // the first descent claims 2 for Even, the child hands the Odd
        // cycle back, and the opponent round strips everything.
        let g = game(
            vec![0, 1, 2],
            vec![Player::Even, Player::Even, Player::Even],
            vec![vec![1], vec![0], vec![0]],
        );
        let s = solve(&g);
        assert_eq!(s.winner(0), Some(Player::Odd));
        assert_eq!(s.winner(1), Some(Player::Odd));
        assert_eq!(s.winner(2), Some(Player::Odd));
    }
}
