use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Typed handle into an [`Arena`].
pub trait SlotId: Copy + Eq {
    fn from_raw(raw: u32) -> Self;
    fn raw(self) -> u32;
}

/// Slot storage with a free list. Removed slots are recycled in LIFO
/// order, so raw indices are reused; ids must not be held across a
/// remove of the object they point at.
pub struct Arena<I, T> {
    slots: Vec<Option<T>>,
    free: Vec<u32>,
    len: usize,
    _id: PhantomData<I>,
}

impl<I: SlotId, T> Arena<I, T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            _id: PhantomData,
        }
    }

    pub fn insert(&mut self, value: T) -> I {
        self.len += 1;
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot as usize] = Some(value);
                I::from_raw(slot)
            }
            None => {
                self.slots.push(Some(value));
                I::from_raw((self.slots.len() - 1) as u32)
            }
        }
    }

    /// Panics if `id` does not refer to a live slot.
    pub fn remove(&mut self, id: I) -> T {
        let slot = id.raw() as usize;
        let value = self
            .slots
            .get_mut(slot)
            .and_then(Option::take)
            .unwrap_or_else(|| panic!("removed an id that is not present in the arena"));
        self.free.push(id.raw());
        self.len -= 1;
        value
    }

    pub fn contains(&self, id: I) -> bool {
        matches!(self.slots.get(id.raw() as usize), Some(Some(_)))
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.slots.get(id.raw() as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots.get_mut(id.raw() as usize).and_then(Option::as_mut)
    }

    /// Distinct mutable borrows of two live slots. Panics if the ids are
    /// equal or either is dead.
    pub fn get2_mut(&mut self, a: I, b: I) -> (&mut T, &mut T) {
        assert!(a != b, "cannot borrow the same slot twice");
        let (low, high, swapped) = if a.raw() < b.raw() {
            (a.raw() as usize, b.raw() as usize, false)
        } else {
            (b.raw() as usize, a.raw() as usize, true)
        };
        let (head, tail) = self.slots.split_at_mut(high);
        let low_ref = head[low]
            .as_mut()
            .unwrap_or_else(|| panic!("stale id passed to the arena"));
        let high_ref = tail[0]
            .as_mut()
            .unwrap_or_else(|| panic!("stale id passed to the arena"));
        if swapped {
            (high_ref, low_ref)
        } else {
            (low_ref, high_ref)
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, value)| value.as_ref().map(|v| (I::from_raw(slot as u32), v)))
    }
}

impl<I: SlotId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: SlotId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        self.get(id)
            .unwrap_or_else(|| panic!("stale id passed to the arena"))
    }
}

impl<I: SlotId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        self.get_mut(id)
            .unwrap_or_else(|| panic!("stale id passed to the arena"))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    struct TestId(u32);

    impl SlotId for TestId {
        fn from_raw(raw: u32) -> Self {
            TestId(raw)
        }
        fn raw(self) -> u32 {
            self.0
        }
    }

    #[test]
    fn test_insert_remove_recycles_slots() {
        let mut arena: Arena<TestId, &str> = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.remove(a), "a");
        assert!(!arena.contains(a));
        let c = arena.insert("c");
        assert_eq!(c, a); // freed slot reused
        assert_eq!(arena[b], "b");
        assert_eq!(arena[c], "c");
    }

    #[test]
    fn test_get2_mut() {
        let mut arena: Arena<TestId, i32> = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        let (ra, rb) = arena.get2_mut(b, a);
        *ra += 10;
        *rb += 20;
        assert_eq!(arena[a], 21);
        assert_eq!(arena[b], 12);
    }

    #[test]
    #[should_panic]
    fn test_remove_stale_id_panics() {
        let mut arena: Arena<TestId, i32> = Arena::new();
        let a = arena.insert(1);
        arena.remove(a);
        arena.remove(a);
    }
}
