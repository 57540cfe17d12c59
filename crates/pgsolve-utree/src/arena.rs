// crates/pgsolve-utree/src/arena.rs

//! Slot pool for universal-tree nodes, with bitset reference counts and a
//! sweep-style garbage collector.
//!
//! Every node lives in a fixed slab slot; parent/kid links are slot ids.
//! A slot's `members` bitset records which game vertices are mapped into
//! its subtree, so `members[s] ⊇ members[kid]` for every kid — membership
//! updates walk the parent chain explicitly rather than recursing through
//! overloaded operators.
//!
//! Slots 0 and 1 hold the Even and Odd roots and are never reclaimed.

use pgsolve_core::{IntQueue, Player, SolveError, Vertex, VertexSet};
use tracing::trace;

/// Index of a slot in the arena.
pub type SlotId = u32;

/// One ordered-tree node.
#[derive(Clone, Debug)]
pub struct Slot {
    /// Which player's tree this node belongs to.
    pub parity: Player,
    /// Tree level; children sit two levels below their parent.
    pub level: i32,
    /// Parent slot; `None` for roots.
    pub parent: Option<SlotId>,
    /// Ordered child slots, leftmost first.
    pub kids: Vec<SlotId>,
    /// Sibling index under the parent; `None` marks an unused slot.
    pub repr: Option<u32>,
    /// Vertices mapped into this node's subtree.
    pub members: VertexSet,
}

impl Slot {
    fn unused(n: usize) -> Self {
        Self {
            parity: Player::Even,
            level: 0,
            parent: None,
            kids: Vec::new(),
            repr: None,
            members: VertexSet::new(n),
        }
    }

    /// Whether the slot currently holds no node.
    #[inline]
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.repr.is_none()
    }
}

/// Fixed-slab pool of tree nodes with a free list.
#[derive(Debug)]
pub struct Arena {
    n: usize,
    slots: Vec<Slot>,
    free: IntQueue,
    collections: u32,
}

impl Arena {
    /// Pool with `pool_size` slots over `n` game vertices. The two roots
    /// are installed at slots 0 (Even) and 1 (Odd) with the given levels.
    #[must_use]
    pub fn new(n: usize, pool_size: usize, root_levels: [i32; 2]) -> Self {
        let pool_size = pool_size.max(4);
        let mut slots = Vec::with_capacity(pool_size);
        for pl in 0..2 {
            slots.push(Slot {
                parity: Player::from_index(pl),
                level: root_levels[pl],
                parent: None,
                kids: Vec::new(),
                repr: Some(0),
                members: VertexSet::new(n),
            });
        }
        for _ in 2..pool_size {
            slots.push(Slot::unused(n));
        }
        let mut free = IntQueue::new(pool_size);
        for id in 2..pool_size {
            free.push(id as SlotId);
        }
        Self {
            n,
            slots,
            free,
            collections: 0,
        }
    }

    /// Borrow a slot.
    #[inline]
    #[must_use]
    pub fn slot(&self, id: SlotId) -> &Slot {
        &self.slots[id as usize]
    }

    /// Number of slots in the pool (free or not).
    #[inline]
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.slots.len()
    }

    /// How many times the collector has run.
    #[inline]
    #[must_use]
    pub fn collections(&self) -> u32 {
        self.collections
    }

    /// Root slot of `pl`'s tree.
    #[inline]
    #[must_use]
    pub fn root(pl: Player) -> SlotId {
        pl.index() as SlotId
    }

    /// Whether `anc` lies on the parent chain of `id` (inclusive).
    #[must_use]
    pub fn is_ancestor(&self, anc: SlotId, id: SlotId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == anc {
                return true;
            }
            cur = self.slots[c as usize].parent;
        }
        false
    }

    /// Take a slot from the free list, collecting garbage when it runs dry
    /// and doubling the pool when collection yields nothing.
    fn alloc(&mut self, heads: [SlotId; 2]) -> SlotId {
        if self.free.is_empty() {
            self.collect(heads);
        }
        if self.free.is_empty() {
            let old = self.slots.len();
            let grown = old * 2;
            trace!(old, grown, "tree arena pool exhausted, doubling");
            self.slots.resize_with(grown, || Slot::unused(self.n));
            self.free.resize(grown);
            for id in old..grown {
                self.free.push(id as SlotId);
            }
        }
        self.free.pop().unwrap_or_else(|| unreachable!("free list refilled above"))
    }

    /// Leftmost child of `id`, created lazily two levels down.
    pub fn child_down(&mut self, id: SlotId, heads: [SlotId; 2]) -> Result<SlotId, SolveError> {
        if self.slots[id as usize].level < 0 {
            return Err(SolveError::TreeBounds(format!(
                "step down from slot {id} at level {}",
                self.slots[id as usize].level
            )));
        }
        if let Some(&first) = self.slots[id as usize].kids.first() {
            return Ok(first);
        }
        let kid = self.alloc(heads);
        let (parity, level) = {
            let p = &self.slots[id as usize];
            (p.parity, p.level - 2)
        };
        self.slots[kid as usize] = Slot {
            parity,
            level,
            parent: Some(id),
            kids: Vec::new(),
            repr: Some(0),
            members: VertexSet::new(self.n),
        };
        self.slots[id as usize].kids.push(kid);
        Ok(kid)
    }

    /// Right sibling of `id`, created lazily with the next sibling index.
    pub fn sibling_right(&mut self, id: SlotId, heads: [SlotId; 2]) -> Result<SlotId, SolveError> {
        let parent = self.slots[id as usize]
            .parent
            .ok_or_else(|| SolveError::LogicFault("step right at a tree root".into()))?;
        let pos = self.kid_position(parent, id)?;
        if pos + 1 < self.slots[parent as usize].kids.len() {
            return Ok(self.slots[parent as usize].kids[pos + 1]);
        }
        let repr = self.slots[id as usize]
            .repr
            .map_or(0, |r| r + 1);
        let kid = self.alloc(heads);
        let (parity, level) = {
            let s = &self.slots[id as usize];
            (s.parity, s.level)
        };
        self.slots[kid as usize] = Slot {
            parity,
            level,
            parent: Some(parent),
            kids: Vec::new(),
            repr: Some(repr),
            members: VertexSet::new(self.n),
        };
        self.slots[parent as usize].kids.push(kid);
        Ok(kid)
    }

    /// Left sibling of `id`; faults at the leftmost child.
    pub fn sibling_left(&self, id: SlotId) -> Result<SlotId, SolveError> {
        let parent = self.slots[id as usize]
            .parent
            .ok_or_else(|| SolveError::LogicFault("step left at a tree root".into()))?;
        let pos = self.kid_position(parent, id)?;
        if pos == 0 {
            return Err(SolveError::TreeBounds(
                "no left sibling of the leftmost child".into(),
            ));
        }
        Ok(self.slots[parent as usize].kids[pos - 1])
    }

    fn kid_position(&self, parent: SlotId, id: SlotId) -> Result<usize, SolveError> {
        self.slots[parent as usize]
            .kids
            .iter()
            .position(|&k| k == id)
            .ok_or_else(|| {
                SolveError::LogicFault(format!(
                    "slot {id} not found among the kids of its parent {parent}"
                ))
            })
    }

    /// Set bit `v` in `slot`'s members and all its ancestors'.
    pub fn add_member(&mut self, slot: SlotId, v: Vertex) {
        let mut cur = Some(slot);
        while let Some(c) = cur {
            self.slots[c as usize].members.set(v);
            cur = self.slots[c as usize].parent;
        }
    }

    /// Clear bit `v` in `slot`'s members and all its ancestors'.
    ///
    /// Sound because each `(vertex, player)` pair is mapped to exactly one
    /// node of that player's tree at a time.
    pub fn clear_member(&mut self, slot: SlotId, v: Vertex) {
        let mut cur = Some(slot);
        while let Some(c) = cur {
            self.slots[c as usize].members.reset(v);
            cur = self.slots[c as usize].parent;
        }
    }

    /// Release `id` and its whole subtree back to the free list.
    ///
    /// The slot is detached from its parent's kid list (located by sibling
    /// index); the subtree is freed iteratively.
    pub fn release(&mut self, id: SlotId) -> Result<(), SolveError> {
        if self.slots[id as usize].is_free() {
            return Err(SolveError::LogicFault(format!(
                "release of already-free slot {id}"
            )));
        }
        let parent = self.slots[id as usize]
            .parent
            .ok_or_else(|| SolveError::LogicFault(format!("release of root slot {id}")))?;
        let pos = self.kid_position(parent, id)?;
        self.slots[parent as usize].kids.remove(pos);

        let mut stack = vec![id];
        while let Some(s) = stack.pop() {
            debug_assert_eq!(self.slots[s as usize].members.count(), 0);
            stack.extend(self.slots[s as usize].kids.drain(..));
            self.slots[s as usize].repr = None;
            self.slots[s as usize].parent = None;
            self.slots[s as usize].members.reset_all();
            self.free.push(s);
        }
        Ok(())
    }

    /// Sweep the pool from the highest slot downwards, releasing every
    /// node that is not a head, not an ancestor of a head, and has no
    /// members. Roots are never candidates.
    pub fn collect(&mut self, heads: [SlotId; 2]) {
        self.collections += 1;
        let mut released = 0usize;
        for id in (2..self.slots.len() as SlotId).rev() {
            if self.slots[id as usize].is_free() {
                continue;
            }
            if heads.contains(&id) {
                continue;
            }
            if self.is_ancestor(id, heads[0]) || self.is_ancestor(id, heads[1]) {
                continue;
            }
            if self.slots[id as usize].members.count() > 0 {
                continue;
            }
            // Preconditions established above; release cannot fault here.
            if self.release(id).is_ok() {
                released += 1;
            }
        }
        trace!(sweep = self.collections, released, "tree arena collection");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> Arena {
        Arena::new(8, 8, [4, 3])
    }

    #[test]
    fn roots_are_installed() {
        let a = arena();
        assert_eq!(Arena::root(Player::Even), 0);
        assert_eq!(a.slot(0).level, 4);
        assert_eq!(a.slot(1).level, 3);
        assert!(!a.slot(0).is_free());
        assert!(a.slot(2).is_free());
    }

    #[test]
    fn lazy_children_and_siblings() {
        let mut a = arena();
        let heads = [0, 1];
        let c0 = a.child_down(0, heads).expect("child");
        assert_eq!(a.slot(c0).level, 2);
        assert_eq!(a.slot(c0).repr, Some(0));
        // Second step down returns the same child.
        assert_eq!(a.child_down(0, heads).expect("child"), c0);

        let c1 = a.sibling_right(c0, heads).expect("sibling");
        assert_eq!(a.slot(c1).repr, Some(1));
        assert_eq!(a.slot(c1).level, 2);
        assert_eq!(a.sibling_left(c1).expect("left"), c0);
        assert!(matches!(
            a.sibling_left(c0),
            Err(SolveError::TreeBounds(_))
        ));
    }

    #[test]
    fn membership_propagates_to_ancestors() {
        let mut a = arena();
        let heads = [0, 1];
        let c = a.child_down(0, heads).expect("child");
        let g = a.child_down(c, heads).expect("grandchild");
        a.add_member(g, 5);
        assert!(a.slot(g).members.test(5));
        assert!(a.slot(c).members.test(5));
        assert!(a.slot(0).members.test(5));
        a.clear_member(g, 5);
        assert_eq!(a.slot(0).members.count(), 0);
    }

    #[test]
    fn collect_spares_heads_ancestors_and_members() {
        let mut a = arena();
        let heads = [0, 1];
        let c = a.child_down(0, heads).expect("child");
        let g = a.child_down(c, heads).expect("grandchild");
        let s = a.sibling_right(c, heads).expect("sibling");
        a.add_member(s, 3);

        // Head sits at `g`: `c` is an ancestor, `s` has a member.
        a.collect([g, 1]);
        assert!(!a.slot(c).is_free());
        assert!(!a.slot(g).is_free());
        assert!(!a.slot(s).is_free());

        // Drop the member and move the head away: both become garbage.
        a.clear_member(s, 3);
        a.collect([0, 1]);
        assert!(a.slot(c).is_free());
        assert!(a.slot(g).is_free());
        assert!(a.slot(s).is_free());
        assert!(!a.slot(0).is_free(), "roots are never reclaimed");
    }

    #[test]
    fn release_subtree_and_double_release_faults() {
        let mut a = arena();
        let heads = [0, 1];
        let c = a.child_down(0, heads).expect("child");
        let _g = a.child_down(c, heads).expect("grandchild");
        a.release(c).expect("release");
        assert!(a.slot(c).is_free());
        assert!(a.slot(0).kids.is_empty());
        assert!(matches!(a.release(c), Err(SolveError::LogicFault(_))));
    }

    #[test]
    fn pool_doubles_when_collection_finds_nothing() {
        let mut a = arena();
        let heads = [0, 1];
        // Chain enough children off the even root to exhaust 8 slots; all
        // stay ancestors of the head so nothing is collectable.
        let mut cur = 0;
        for _ in 0..8 {
            cur = a.child_down(cur, [cur, 1]).expect("child");
        }
        assert!(a.pool_size() >= 16);
        assert!(a.collections() >= 1);
    }

    #[test]
    fn step_down_below_floor_faults() {
        let mut a = Arena::new(4, 8, [0, 1]);
        let heads = [0, 1];
        let c = a.child_down(0, heads).expect("child at level -2");
        assert_eq!(a.slot(c).level, -2);
        assert!(matches!(
            a.child_down(c, heads),
            Err(SolveError::TreeBounds(_))
        ));
    }
}
