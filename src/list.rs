//! Arena-backed doubly linked recency lists.
//!
//! All three generations of a cache link their nodes through one
//! [`NodeArena`]. A node is a fixed slot addressed by index with explicit
//! `prev`/`next` indices, so moving an entry from one generation to another is
//! an unlink followed by a push on a different [`Ring`]; the entry itself never
//! moves and its [`EntryId`] stays valid.
//!
//! Released slots go on a free list and are handed out again by the next
//! allocation. Each slot carries a stamp that is bumped on release, so an
//! `EntryId` captured before the release no longer resolves.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

/// Sentinel index meaning "no node".
const NIL: usize = usize::MAX;

/// A stable handle to a resident cache entry.
///
/// Handles stay valid while the entry moves between generations and become
/// stale once the entry is evicted or removed, even if its slot is reused by
/// a later insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId {
    index: usize,
    stamp: u32,
}

impl EntryId {
    /// Slot index inside the node arena.
    #[inline]
    pub fn index(self) -> usize {
        self.index
    }
}

struct Node<T> {
    value: Option<T>,
    prev: usize,
    next: usize,
    stamp: u32,
}

/// Slot storage shared by every [`Ring`] of a cache, with a free list of
/// released slots.
pub(crate) struct NodeArena<T> {
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> NodeArena<T> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value` in a recycled slot if one is free, otherwise in a new one.
    /// The node is not linked into any ring yet.
    pub(crate) fn alloc(&mut self, value: T) -> EntryId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let node = &mut self.nodes[index];
            node.value = Some(value);
            node.prev = NIL;
            node.next = NIL;
            return EntryId {
                index,
                stamp: node.stamp,
            };
        }
        self.nodes.push(Node {
            value: Some(value),
            prev: NIL,
            next: NIL,
            stamp: 0,
        });
        EntryId {
            index: self.nodes.len() - 1,
            stamp: 0,
        }
    }

    /// Takes the value out of a slot and puts the slot on the free list.
    ///
    /// The node must already be unlinked from its ring.
    pub(crate) fn release(&mut self, index: usize) -> Option<T> {
        let node = self.nodes.get_mut(index)?;
        let value = node.value.take()?;
        node.stamp = node.stamp.wrapping_add(1);
        node.prev = NIL;
        node.next = NIL;
        self.free.push(index);
        self.len -= 1;
        Some(value)
    }

    /// Resolves a handle to its slot index, or `None` if the handle is stale.
    #[inline]
    pub(crate) fn resolve(&self, id: EntryId) -> Option<usize> {
        let node = self.nodes.get(id.index)?;
        (node.stamp == id.stamp && node.value.is_some()).then_some(id.index)
    }

    /// Current handle for an occupied slot.
    #[inline]
    pub(crate) fn id_at(&self, index: usize) -> EntryId {
        EntryId {
            index,
            stamp: self.nodes[index].stamp,
        }
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.nodes.get(index).and_then(|node| node.value.as_ref())
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.nodes.get_mut(index).and_then(|node| node.value.as_mut())
    }

    /// Number of occupied slots.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Number of released slots waiting for reuse.
    #[inline]
    pub(crate) fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Releases every slot. Stamps are bumped so outstanding handles go stale.
    pub(crate) fn clear(&mut self) {
        self.free.clear();
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if node.value.take().is_some() {
                node.stamp = node.stamp.wrapping_add(1);
            }
            node.prev = NIL;
            node.next = NIL;
            self.free.push(index);
        }
        self.len = 0;
    }

    /// Mutable access to every occupied slot, in slot order.
    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.nodes.iter_mut().filter_map(|node| node.value.as_mut())
    }
}

impl<T> fmt::Debug for NodeArena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeArena")
            .field("len", &self.len)
            .field("slots", &self.nodes.len())
            .field("free", &self.free.len())
            .finish()
    }
}

/// One recency list threaded through a [`NodeArena`]. The head is the most
/// recently used node, the tail the least recently used.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ring {
    head: usize,
    tail: usize,
    len: usize,
}

impl Ring {
    pub(crate) const fn new() -> Self {
        Self {
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the least recently used node.
    #[inline]
    pub(crate) fn lru(&self) -> Option<usize> {
        (self.tail != NIL).then_some(self.tail)
    }

    /// Links an unlinked node at the MRU end.
    pub(crate) fn push_front<T>(&mut self, arena: &mut NodeArena<T>, index: usize) {
        let old_head = self.head;
        {
            let node = &mut arena.nodes[index];
            node.prev = NIL;
            node.next = old_head;
        }
        if old_head == NIL {
            self.tail = index;
        } else {
            arena.nodes[old_head].prev = index;
        }
        self.head = index;
        self.len += 1;
    }

    /// Unlinks a node that belongs to this ring. The slot stays occupied.
    pub(crate) fn unlink<T>(&mut self, arena: &mut NodeArena<T>, index: usize) {
        let (prev, next) = {
            let node = &arena.nodes[index];
            (node.prev, node.next)
        };
        if prev == NIL {
            self.head = next;
        } else {
            arena.nodes[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            arena.nodes[next].prev = prev;
        }
        let node = &mut arena.nodes[index];
        node.prev = NIL;
        node.next = NIL;
        self.len -= 1;
    }

    /// Unlinks and returns the LRU node index.
    pub(crate) fn pop_lru<T>(&mut self, arena: &mut NodeArena<T>) -> Option<usize> {
        let index = self.lru()?;
        self.unlink(arena, index);
        Some(index)
    }

    pub(crate) fn move_to_front<T>(&mut self, arena: &mut NodeArena<T>, index: usize) {
        if self.head == index {
            return;
        }
        self.unlink(arena, index);
        self.push_front(arena, index);
    }

    pub(crate) fn clear(&mut self) {
        *self = Ring::new();
    }

    /// Walks from the LRU end to the MRU end.
    pub(crate) fn iter<'a, T>(&self, arena: &'a NodeArena<T>) -> RingIter<'a, T> {
        RingIter {
            arena,
            cursor: self.tail,
            remaining: self.len,
            towards_mru: true,
        }
    }

    /// Walks from the MRU end to the LRU end.
    pub(crate) fn iter_mru<'a, T>(&self, arena: &'a NodeArena<T>) -> RingIter<'a, T> {
        RingIter {
            arena,
            cursor: self.head,
            remaining: self.len,
            towards_mru: false,
        }
    }
}

/// Iterator over `(slot index, value)` pairs of one ring.
pub(crate) struct RingIter<'a, T> {
    arena: &'a NodeArena<T>,
    cursor: usize,
    remaining: usize,
    towards_mru: bool,
}

impl<'a, T> Iterator for RingIter<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let index = self.cursor;
        let node = &self.arena.nodes[index];
        self.cursor = if self.towards_mru {
            node.prev
        } else {
            node.next
        };
        self.remaining = self.remaining.saturating_sub(1);
        node.value.as_ref().map(|value| (index, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for RingIter<'_, T> {}
