//! Generational stable index with masked views
//!
//! A fixed-capacity pool of slots. Each slot carries a generation counter and
//! a category [`Mask`]; handles stay meaningful across removal and reuse
//! because a stale handle fails the generation check before any lookup.
//!
//! Views are declarative mask filters. The allocator keeps every registered
//! view's member list in sync on create/remove, sorted ascending by index so
//! iteration order is stable.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::error::IndexError;

/// Identifies a logical entity: slot index plus the generation it was issued at.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    pub index: u32,
    pub generation: u32,
}

impl Handle {
    /// Placeholder handle that is never valid.
    pub const NULL: Self = Self {
        index: u32::MAX,
        generation: u32::MAX,
    };

    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Category bitset attached to a slot
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mask(pub u16);

impl Mask {
    pub const EMPTY: Self = Self(0);

    /// True when every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: Mask) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }
}

impl BitOr for Mask {
    type Output = Mask;

    fn bitor(self, rhs: Mask) -> Mask {
        Mask(self.0 | rhs.0)
    }
}

impl BitOrAssign for Mask {
    fn bitor_assign(&mut self, rhs: Mask) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Mask {
    type Output = Mask;

    fn bitand(self, rhs: Mask) -> Mask {
        Mask(self.0 & rhs.0)
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mask({:#06b})", self.0)
    }
}

/// Key of a registered view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(usize);

/// Sorted set of in-use indices whose mask contains `filter`
#[derive(Debug, Clone)]
pub struct View {
    filter: Mask,
    members: Vec<u32>,
}

impl View {
    fn with_capacity(filter: Mask, capacity: usize) -> Self {
        Self {
            filter,
            members: Vec::with_capacity(capacity),
        }
    }

    pub fn filter(&self) -> Mask {
        self.filter
    }

    /// Member indices, strictly ascending.
    pub fn members(&self) -> &[u32] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, index: u32) -> bool {
        self.members.binary_search(&index).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.members.iter().copied()
    }

    /// Insertion-sort position scanning from the tail. Views are sized to
    /// the slot capacity up front, so this never reallocates.
    fn insert(&mut self, index: u32) {
        let mut pos = self.members.len();
        while pos > 0 && self.members[pos - 1] > index {
            pos -= 1;
        }
        debug_assert!(pos == 0 || self.members[pos - 1] != index);
        self.members.insert(pos, index);
    }

    fn remove(&mut self, index: u32) -> Result<(), IndexError> {
        match self.members.binary_search(&index) {
            Ok(pos) => {
                self.members.remove(pos);
                Ok(())
            }
            Err(_) => Err(IndexError::ViewConsistency {
                view_mask: self.filter,
                index,
            }),
        }
    }
}

/// The slot allocator
#[derive(Debug, Clone)]
pub struct StableIndex {
    /// Free indices, kept descending so `pop` yields the lowest.
    free: Vec<u32>,
    generations: Box<[u32]>,
    masks: Box<[Mask]>,
    in_use: Box<[bool]>,
    /// Slots whose generation ran out; never handed out again.
    retired: usize,
    views: Vec<View>,
    max_views: usize,
}

impl StableIndex {
    /// Allocate all slot and view storage up front.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` does not fit in a `u32` index.
    pub fn new(capacity: usize, max_views: usize) -> Self {
        assert!(
            capacity < u32::MAX as usize,
            "capacity must leave u32::MAX free for Handle::NULL"
        );

        Self {
            free: (0..capacity as u32).rev().collect(),
            generations: vec![0; capacity].into_boxed_slice(),
            masks: vec![Mask::EMPTY; capacity].into_boxed_slice(),
            in_use: vec![false; capacity].into_boxed_slice(),
            retired: 0,
            views: Vec::with_capacity(max_views),
            max_views,
        }
    }

    pub fn capacity(&self) -> usize {
        self.generations.len()
    }

    /// Number of slots currently in use
    pub fn len(&self) -> usize {
        self.capacity() - self.free.len() - self.retired
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining_capacity(&self) -> usize {
        self.free.len()
    }

    /// Register a view over `filter`. Slots already in use that match are
    /// added immediately.
    pub fn add_view(&mut self, filter: Mask) -> Result<ViewId, IndexError> {
        if self.views.len() >= self.max_views {
            log::warn!(
                "Reached view capacity ({}), cannot add {:?}",
                self.max_views,
                filter
            );
            return Err(IndexError::ViewCapacityExhausted {
                max_views: self.max_views,
            });
        }

        let mut view = View::with_capacity(filter, self.capacity());
        for (slot, mask) in self.masks.iter().enumerate() {
            if self.in_use[slot] && mask.contains(filter) {
                view.members.push(slot as u32);
            }
        }

        self.views.push(view);
        Ok(ViewId(self.views.len() - 1))
    }

    /// First registered view whose filter equals `filter`.
    pub fn find_view(&self, filter: Mask) -> Option<ViewId> {
        self.views.iter().position(|v| v.filter == filter).map(ViewId)
    }

    pub fn view(&self, id: ViewId) -> &View {
        &self.views[id.0]
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// Take the lowest free slot, tag it with `mask` and enter it into every
    /// matching view.
    pub fn create(&mut self, mask: Mask) -> Result<Handle, IndexError> {
        let Some(index) = self.free.pop() else {
            log::warn!("Reached maximum slot count ({})", self.capacity());
            return Err(IndexError::CapacityExhausted {
                capacity: self.capacity(),
            });
        };

        let slot = index as usize;
        self.masks[slot] = mask;
        self.in_use[slot] = true;

        for view in &mut self.views {
            if mask.contains(view.filter) {
                view.insert(index);
            }
        }

        log::trace!("create {:?} -> {}v{}", mask, index, self.generations[slot]);
        Ok(Handle::new(index, self.generations[slot]))
    }

    /// Release `handle`'s slot: bump its generation, drop it from every view
    /// and return it to the free pool. A slot whose generation reaches
    /// `u32::MAX` is retired instead, so old handles can never match again.
    pub fn remove(&mut self, handle: Handle) -> Result<(), IndexError> {
        if !self.is_valid(handle) {
            log::warn!("Tried to remove stale handle {}", handle);
            return Err(IndexError::StaleHandle(handle));
        }

        let slot = handle.index as usize;
        let mask = self.masks[slot];

        let generation = self.generations[slot].saturating_add(1);
        self.generations[slot] = generation;
        self.masks[slot] = Mask::EMPTY;
        self.in_use[slot] = false;

        for view in &mut self.views {
            if mask.contains(view.filter) {
                if let Err(e) = view.remove(handle.index) {
                    log::error!("{}", e);
                    debug_assert!(false, "{}", e);
                }
            }
        }

        if generation == u32::MAX {
            log::warn!("Slot {} ran out of generations, retiring it", handle.index);
            self.retired += 1;
        } else {
            let pos = self.free.partition_point(|&f| f > handle.index);
            self.free.insert(pos, handle.index);
        }

        log::trace!("remove {}", handle);
        Ok(())
    }

    /// O(1): in range, in use, and same generation.
    #[inline]
    pub fn is_valid(&self, handle: Handle) -> bool {
        let slot = handle.index as usize;
        slot < self.capacity()
            && self.in_use[slot]
            && self.generations[slot] == handle.generation
    }

    /// Current generation of a slot, in use or not.
    pub fn generation(&self, index: u32) -> Option<u32> {
        self.generations.get(index as usize).copied()
    }

    /// Mask of an in-use slot.
    pub fn mask(&self, index: u32) -> Option<Mask> {
        let slot = index as usize;
        (slot < self.capacity() && self.in_use[slot]).then(|| self.masks[slot])
    }
}
