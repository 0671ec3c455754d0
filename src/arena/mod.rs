//! Zone arena used for parse nodes.
//!
//! Elements are bump-allocated into fixed-capacity zones and addressed by
//! [`Handle`]s. Nothing is freed individually; [`Arena::reset`] or dropping
//! the arena releases every zone at once.

use std::mem;
use std::ops::{Index, IndexMut};

use crate::constants::ZONE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    zone: u32,
    slot: u32,
}

impl Handle {
    pub fn zone(self) -> usize {
        self.zone as usize
    }

    pub fn slot(self) -> usize {
        self.slot as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    zone: u32,
    start: u32,
    len: u32,
}

impl Span {
    pub fn len(self) -> usize {
        self.len as usize
    }

    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    pub fn zone(self) -> usize {
        self.zone as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaStats {
    pub zones: usize,
    pub slots_reserved: usize,
    pub slots_used: usize,
    pub bytes_reserved: usize,
}

#[derive(Debug)]
struct Zone<T> {
    items: Vec<T>,
    capacity: usize,
    next: Option<usize>,
}

impl<T> Zone<T> {
    fn has_room(&self, slots: usize) -> bool {
        self.items.len() + slots <= self.capacity
    }
}

#[derive(Debug)]
pub struct Arena<T> {
    zones: Vec<Zone<T>>,
    head: Option<usize>,
    zone_slots: usize,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::with_zone_size(ZONE_SIZE)
    }

    /// `zone_size` is in bytes and is rounded down to whole elements, with a
    /// floor of one element per zone.
    pub fn with_zone_size(zone_size: usize) -> Self {
        let element = mem::size_of::<T>().max(1);
        Self {
            zones: Vec::new(),
            head: None,
            zone_slots: (zone_size / element).max(1),
        }
    }

    pub fn zone_slots(&self) -> usize {
        self.zone_slots
    }

    pub fn alloc(&mut self, value: T) -> Handle {
        let zone = match self.head {
            Some(head) if self.zones[head].has_room(1) => head,
            _ => self.open_zone(1),
        };
        let items = &mut self.zones[zone].items;
        let slot = items.len();
        items.push(value);
        Handle {
            zone: zone as u32,
            slot: slot as u32,
        }
    }

    /// Allocate a contiguous run. A run larger than a default zone gets a
    /// dedicated zone linked behind the head so the head keeps serving small
    /// allocations.
    pub fn alloc_extend<I>(&mut self, iter: I) -> Span
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let iter = iter.into_iter();
        let wanted = iter.len();
        if wanted == 0 {
            return Span {
                zone: 0,
                start: 0,
                len: 0,
            };
        }
        let zone = match self.head {
            Some(head) if self.zones[head].has_room(wanted) => head,
            _ => self.open_zone(wanted),
        };
        let items = &mut self.zones[zone].items;
        let start = items.len();
        items.extend(iter);
        Span {
            zone: zone as u32,
            start: start as u32,
            len: (items.len() - start) as u32,
        }
    }

    fn open_zone(&mut self, slots: usize) -> usize {
        let dedicated = slots > self.zone_slots;
        let capacity = slots.max(self.zone_slots);
        let index = self.zones.len();

        let next = match self.head {
            Some(head) if dedicated => {
                let next = self.zones[head].next;
                self.zones[head].next = Some(index);
                next
            }
            head => {
                self.head = Some(index);
                head
            }
        };

        tracing::trace!(zone = index, capacity, dedicated, "arena opened zone");

        self.zones.push(Zone {
            items: Vec::with_capacity(capacity),
            capacity,
            next,
        });
        index
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.zones
            .get(handle.zone())
            .and_then(|zone| zone.items.get(handle.slot()))
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.zones
            .get_mut(handle.zone())
            .and_then(|zone| zone.items.get_mut(handle.slot()))
    }

    pub fn slice(&self, span: Span) -> &[T] {
        if span.is_empty() {
            return &[];
        }
        let start = span.start as usize;
        let end = start + span.len();
        self.zones
            .get(span.zone())
            .and_then(|zone| zone.items.get(start..end))
            .unwrap_or(&[])
    }

    /// Release every zone. Handles issued before the reset must not be used
    /// afterwards; the borrow checker enforces this for parsed documents.
    pub fn reset(&mut self) {
        if !self.zones.is_empty() {
            tracing::trace!(zones = self.zones.len(), "arena reset");
        }
        self.zones.clear();
        self.head = None;
    }

    pub fn len(&self) -> usize {
        self.chain().map(|zone| zone.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> ArenaStats {
        let mut stats = ArenaStats::default();
        for zone in self.chain() {
            stats.zones += 1;
            stats.slots_reserved += zone.capacity;
            stats.slots_used += zone.items.len();
        }
        stats.bytes_reserved = stats.slots_reserved * mem::size_of::<T>();
        stats
    }

    /// Zone indices starting at the head, in link order.
    pub fn zone_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.zones.len());
        let mut cursor = self.head;
        while let Some(index) = cursor {
            order.push(index);
            cursor = self.zones[index].next;
        }
        order
    }

    fn chain(&self) -> impl Iterator<Item = &Zone<T>> {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let index = cursor?;
            let zone = &self.zones[index];
            cursor = zone.next;
            Some(zone)
        })
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Handle> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &T {
        &self.zones[handle.zone()].items[handle.slot()]
    }
}

impl<T> IndexMut<Handle> for Arena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut T {
        &mut self.zones[handle.zone()].items[handle.slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_bump_within_zone() {
        let mut arena: Arena<u64> = Arena::with_zone_size(64);
        assert_eq!(arena.zone_slots(), 8);

        let handles: Vec<Handle> = (0..8).map(|n| arena.alloc(n)).collect();
        assert!(handles.iter().all(|handle| handle.zone() == 0));
        assert_eq!(handles[7].slot(), 7);
        assert_eq!(arena.stats().zones, 1);

        let next = arena.alloc(8);
        assert_eq!(next.zone(), 1);
        assert_eq!(arena.zone_order(), vec![1, 0]);
        assert_eq!(arena[handles[3]], 3);
        assert_eq!(arena[next], 8);
    }

    #[rstest::rstest]
    fn test_oversized_run_links_behind_head() {
        let mut arena: Arena<u64> = Arena::with_zone_size(64);
        let small = arena.alloc(1);

        let big = arena.alloc_extend((0..20u64).collect::<Vec<_>>());
        assert_eq!(big.len(), 20);
        assert_ne!(big.zone(), small.zone());
        assert_eq!(arena.zone_order(), vec![0, 1]);
        assert_eq!(arena.slice(big)[19], 19);

        let after = arena.alloc(2);
        assert_eq!(after.zone(), small.zone());
        assert_eq!(after.slot(), 1);
    }

    #[rstest::rstest]
    fn test_oversized_run_into_empty_arena_becomes_head() {
        let mut arena: Arena<u64> = Arena::with_zone_size(64);
        let big = arena.alloc_extend(vec![7u64; 12]);
        assert_eq!(arena.zone_order(), vec![big.zone()]);

        // the dedicated zone is full, so small allocations open a default zone
        let small = arena.alloc(1);
        assert_ne!(small.zone(), big.zone());
        assert_eq!(arena.zone_order(), vec![1, 0]);
        assert_eq!(arena.stats().slots_reserved, 12 + 8);
    }

    #[rstest::rstest]
    fn test_run_that_fits_default_zone_is_prepended() {
        let mut arena: Arena<u64> = Arena::with_zone_size(64);
        arena.alloc_extend((0..6u64).collect::<Vec<_>>());
        let run = arena.alloc_extend((0..4u64).collect::<Vec<_>>());
        assert_eq!(run.zone(), 1);
        assert_eq!(arena.zone_order(), vec![1, 0]);
        assert_eq!(arena.slice(run), &[0, 1, 2, 3]);
    }

    #[rstest::rstest]
    fn test_empty_run() {
        let mut arena: Arena<u64> = Arena::new();
        let span = arena.alloc_extend(Vec::new());
        assert!(span.is_empty());
        assert!(arena.slice(span).is_empty());
        assert_eq!(arena.stats().zones, 0);
    }

    #[rstest::rstest]
    fn test_reset_is_idempotent() {
        let mut arena: Arena<String> = Arena::new();
        arena.reset();
        let handle = arena.alloc("x".to_string());
        assert_eq!(arena.len(), 1);

        arena.reset();
        arena.reset();
        assert!(arena.is_empty());
        assert_eq!(arena.stats(), ArenaStats::default());
        assert!(arena.get(handle).is_none());

        let again = arena.alloc("y".to_string());
        assert_eq!(arena[again], "y");
    }

    #[rstest::rstest]
    fn test_get_mut_and_stats() {
        let mut arena: Arena<u32> = Arena::with_zone_size(16);
        let handle = arena.alloc(1);
        *arena.get_mut(handle).unwrap() = 5;
        arena[handle] += 1;
        assert_eq!(arena.get(handle), Some(&6));

        for n in 0..5 {
            arena.alloc(n);
        }
        let stats = arena.stats();
        assert_eq!(stats.zones, 2);
        assert_eq!(stats.slots_used, 6);
        assert_eq!(stats.slots_reserved, 8);
        assert_eq!(stats.bytes_reserved, 32);
    }

    #[rstest::rstest]
    fn test_zero_sized_elements() {
        let mut arena: Arena<()> = Arena::with_zone_size(2);
        arena.alloc(());
        arena.alloc(());
        arena.alloc(());
        assert_eq!(arena.stats().zones, 2);
    }
}
