// crates/pgsolve-utree/src/agent.rs

//! Navigation heads and the vertex-to-node mapping table.
//!
//! One head per player points at the currently focused tree node. The
//! engine moves heads with `step_*` and anchors vertex sets at the focused
//! node with a [`Sign`]. Each `(vertex, player)` pair is mapped to exactly
//! one node of that player's tree; the node's members bitset and every
//! ancestor's carry the vertex, which is what garbage collection counts.

use crate::arena::{Arena, SlotId};
use crate::Sign;
use pgsolve_core::{Player, Priority, SolveError, Vertex, VertexSet};

#[derive(Clone, Copy, Debug)]
struct Mapping {
    slot: SlotId,
    sign: Sign,
}

/// Per-player tree heads plus the vertex mapping over an [`Arena`].
#[derive(Debug)]
pub struct TreeAgent {
    arena: Arena,
    heads: [SlotId; 2],
    map: Vec<Mapping>,
    n: usize,
}

impl TreeAgent {
    /// Agent over `n` vertices for games of maximal priority `max_prio`.
    ///
    /// The pool starts at `max(4n, 4(max_prio + 1))` slots. Each root sits
    /// at level `max_prio` when the parity matches the owning player, one
    /// level above otherwise, so levels stay parity-aligned per tree.
    #[must_use]
    pub fn new(n: usize, max_prio: Priority) -> Self {
        let k = max_prio as usize + 1;
        let pool = (4 * n).max(4 * k);
        let root_level = |pl: usize| -> i32 {
            if max_prio as usize % 2 == pl {
                max_prio as i32
            } else {
                max_prio as i32 + 1
            }
        };
        let arena = Arena::new(n, pool, [root_level(0), root_level(1)]);
        let heads = [Arena::root(Player::Even), Arena::root(Player::Odd)];
        // Entry 2v+pl belongs to player pl; point it at that player's root.
        let map = (0..2 * n)
            .map(|i| Mapping {
                slot: heads[i % 2],
                sign: Sign::Mid,
            })
            .collect();
        Self {
            arena,
            heads,
            map,
            n,
        }
    }

    /// Reset `pl`'s head to its root and map every vertex there with sign
    /// MID, clearing any previous anchors. Returns the root slot.
    pub fn init(&mut self, pl: Player) -> SlotId {
        let root = Arena::root(pl);
        self.heads[pl.index()] = root;
        for v in 0..self.n as Vertex {
            let old = self.map[Self::key(v, pl)].slot;
            if old != root {
                self.arena.clear_member(old, v);
            }
            self.map[Self::key(v, pl)] = Mapping {
                slot: root,
                sign: Sign::Mid,
            };
            self.arena.add_member(root, v);
        }
        root
    }

    #[inline]
    fn key(v: Vertex, pl: Player) -> usize {
        2 * v as usize + pl.index()
    }

    /// Currently focused node of `pl`'s tree.
    #[inline]
    #[must_use]
    pub fn head(&self, pl: Player) -> SlotId {
        self.heads[pl.index()]
    }

    /// Borrow the underlying arena (diagnostics, tests).
    #[inline]
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Move `pl`'s head to its parent; logic fault at the root.
    pub fn step_up(&mut self, pl: Player) -> Result<SlotId, SolveError> {
        let head = self.head(pl);
        let parent = self.arena.slot(head).parent.ok_or_else(|| {
            SolveError::LogicFault(format!("step up at the root of the {pl} tree"))
        })?;
        self.heads[pl.index()] = parent;
        Ok(parent)
    }

    /// Move `pl`'s head to its leftmost child, creating it lazily.
    pub fn step_down(&mut self, pl: Player) -> Result<SlotId, SolveError> {
        let kid = self.arena.child_down(self.head(pl), self.heads)?;
        self.heads[pl.index()] = kid;
        Ok(kid)
    }

    /// Move `pl`'s head to its right sibling, creating it lazily.
    pub fn step_right(&mut self, pl: Player) -> Result<SlotId, SolveError> {
        let kid = self.arena.sibling_right(self.head(pl), self.heads)?;
        self.heads[pl.index()] = kid;
        Ok(kid)
    }

    /// Move `pl`'s head to its left sibling; bounds fault at the leftmost.
    pub fn step_left(&mut self, pl: Player) -> Result<SlotId, SolveError> {
        let kid = self.arena.sibling_left(self.head(pl))?;
        self.heads[pl.index()] = kid;
        Ok(kid)
    }

    /// Anchor every vertex of `vs` at `pl`'s head with `sign`, clearing
    /// their previous anchors in this tree.
    pub fn map_set(&mut self, pl: Player, sign: Sign, vs: &VertexSet) {
        for v in vs.iter() {
            self.remap(v, pl, sign);
        }
    }

    /// Anchor the listed vertices at `pl`'s head with `sign`.
    pub fn map_slice(&mut self, pl: Player, sign: Sign, vs: &[Vertex]) {
        for &v in vs {
            self.remap(v, pl, sign);
        }
    }

    fn remap(&mut self, v: Vertex, pl: Player, sign: Sign) {
        let head = self.head(pl);
        let old = self.map[Self::key(v, pl)].slot;
        if old != head {
            self.arena.clear_member(old, v);
            self.arena.add_member(head, v);
        }
        self.map[Self::key(v, pl)] = Mapping { slot: head, sign };
    }

    /// Where `v` is anchored in `pl`'s tree, and with what sign.
    #[must_use]
    pub fn mapping(&self, v: Vertex, pl: Player) -> (SlotId, Sign) {
        let m = self.map[Self::key(v, pl)];
        (m.slot, m.sign)
    }

    /// Run a garbage-collection sweep against the current heads.
    pub fn collect(&mut self) {
        self.arena.collect(self.heads);
    }

    /// Path signature of a slot: the root prints `e`/`o`, each step down
    /// appends the sibling index, e.g. `o,0,2`.
    #[must_use]
    pub fn signature(&self, slot: SlotId) -> String {
        let mut reprs = Vec::new();
        let mut cur = slot;
        loop {
            let s = self.arena.slot(cur);
            match s.parent {
                Some(p) => {
                    reprs.push(s.repr.unwrap_or(0));
                    cur = p;
                }
                None => break,
            }
        }
        let mut out = String::from(match self.arena.slot(cur).parity {
            Player::Even => "e",
            Player::Odd => "o",
        });
        for r in reprs.into_iter().rev() {
            out.push(',');
            out.push_str(&r.to_string());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> TreeAgent {
        let mut a = TreeAgent::new(6, 3);
        a.init(Player::Even);
        a.init(Player::Odd);
        a
    }

    #[test]
    fn roots_have_parity_aligned_levels() {
        let a = agent();
        // max_prio 3: odd root at 3, even root bumped to 4.
        assert_eq!(a.arena().slot(a.head(Player::Even)).level, 4);
        assert_eq!(a.arena().slot(a.head(Player::Odd)).level, 3);
    }

    #[test]
    fn init_maps_everything_mid() {
        let a = agent();
        for v in 0..6 {
            let (slot, sign) = a.mapping(v, Player::Odd);
            assert_eq!(slot, Arena::root(Player::Odd));
            assert_eq!(sign, Sign::Mid);
        }
        assert_eq!(a.arena().slot(Arena::root(Player::Odd)).members.count(), 6);
    }

    #[test]
    fn remapping_moves_membership() {
        let mut a = agent();
        a.step_down(Player::Even).expect("down");
        let mut vs = VertexSet::new(6);
        vs.set(2);
        vs.set(4);
        a.map_set(Player::Even, Sign::Top, &vs);

        let head = a.head(Player::Even);
        let (slot, sign) = a.mapping(2, Player::Even);
        assert_eq!((slot, sign), (head, Sign::Top));
        // The root keeps the bits as an ancestor, the old anchor lost none
        // it should keep: exactly the remapped vertices moved.
        assert!(a.arena().slot(head).members.test(2));
        assert!(a.arena().slot(head).members.test(4));
        assert!(!a.arena().slot(head).members.test(3));
        assert_eq!(a.arena().slot(Arena::root(Player::Even)).members.count(), 6);

        // Remap again at another node: previous anchors are cleared.
        a.step_right(Player::Even).expect("right");
        a.map_slice(Player::Even, Sign::Bot, &[2, 4]);
        assert!(!a.arena().slot(head).members.test(2));
        let (slot2, sign2) = a.mapping(4, Player::Even);
        assert_eq!(slot2, a.head(Player::Even));
        assert_eq!(sign2, Sign::Bot);
    }

    #[test]
    fn remap_with_same_sign_updates_sign_only() {
        let mut a = agent();
        a.step_down(Player::Odd).expect("down");
        a.map_slice(Player::Odd, Sign::Mid, &[1]);
        a.map_slice(Player::Odd, Sign::Top, &[1]);
        let (slot, sign) = a.mapping(1, Player::Odd);
        assert_eq!(slot, a.head(Player::Odd));
        assert_eq!(sign, Sign::Top);
        assert_eq!(a.arena().slot(slot).members.count(), 1);
    }

    #[test]
    fn step_up_at_root_faults() {
        let mut a = agent();
        assert!(matches!(
            a.step_up(Player::Even),
            Err(SolveError::LogicFault(_))
        ));
    }

    #[test]
    fn signatures_spell_the_path() {
        let mut a = agent();
        a.step_down(Player::Odd).expect("down");
        a.step_right(Player::Odd).expect("right");
        a.step_down(Player::Odd).expect("down");
        assert_eq!(a.signature(a.head(Player::Odd)), "o,1,0");
        assert_eq!(a.signature(Arena::root(Player::Even)), "e");
        a.step_left(Player::Odd).map(|_| ()).unwrap_err();
    }
}
