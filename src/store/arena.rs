//! Generational slot arena shared by the store implementations.
//!
//! Every value lives in a numbered slot. A slot keeps a generation counter that
//! is bumped whenever its value is removed, so a [`Handle`] taken before the
//! removal no longer matches the slot and is rejected by [`Arena::get`] and
//! friends, even after the slot is reused. Generations are 64-bit, so a slot
//! would need 2^64 reuses before an old handle could match it again.

use std::ops::{Index, IndexMut};

use super::Handle;

#[cfg(test)]
thread_local! {
    /// Slots visited by `many_mut` on this thread.
    pub(crate) static SLOTS_TOUCHED: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

#[derive(Clone)]
enum Slot<T> {
    Occupied { generation: u64, value: T },
    Vacant { generation: u64 },
}

impl<T> Slot<T> {
    const fn generation(&self) -> u64 {
        match self {
            Self::Occupied { generation, .. } | Self::Vacant { generation } => *generation,
        }
    }
}

/// Slot storage with stable indices and generation-checked handles.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    length: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            length: 0,
        }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.length
    }

    /// Stores `value` in a free slot (or a new one) and returns its handle.
    pub(crate) fn insert(&mut self, value: T) -> Handle {
        self.length += 1;
        if let Some(index) = self.free.pop() {
            let generation = self.slots[index].generation();
            self.slots[index] = Slot::Occupied { generation, value };
            Handle::new(index, generation)
        } else {
            let index = self.slots.len();
            self.slots.push(Slot::Occupied {
                generation: 0,
                value,
            });
            Handle::new(index, 0)
        }
    }

    /// Removes the value named by `handle`, bumping the slot generation.
    pub(crate) fn remove(&mut self, handle: Handle) -> Option<T> {
        if !self.contains(handle) {
            return None;
        }
        let index = handle.index();
        let next_generation = handle.generation().wrapping_add(1);
        let slot = std::mem::replace(
            &mut self.slots[index],
            Slot::Vacant {
                generation: next_generation,
            },
        );
        self.free.push(index);
        self.length -= 1;
        match slot {
            Slot::Occupied { value, .. } => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    pub(crate) fn contains(&self, handle: Handle) -> bool {
        matches!(
            self.slots.get(handle.index()),
            Some(Slot::Occupied { generation, .. }) if *generation == handle.generation()
        )
    }

    pub(crate) fn get(&self, handle: Handle) -> Option<&T> {
        match self.slots.get(handle.index()) {
            Some(Slot::Occupied { generation, value }) if *generation == handle.generation() => {
                Some(value)
            }
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        match self.slots.get_mut(handle.index()) {
            Some(Slot::Occupied { generation, value }) if *generation == handle.generation() => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Returns the current handle of an occupied slot.
    pub(crate) fn handle_at(&self, index: usize) -> Option<Handle> {
        match self.slots.get(index) {
            Some(Slot::Occupied { generation, .. }) => Some(Handle::new(index, *generation)),
            _ => None,
        }
    }

    /// Empties every slot. All outstanding handles become stale.
    pub(crate) fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let generation = match slot {
                Slot::Occupied { generation, .. } => generation.wrapping_add(1),
                Slot::Vacant { generation } => *generation,
            };
            *slot = Slot::Vacant { generation };
            self.free.push(index);
        }
        self.length = 0;
    }

    /// Borrows the values named by `handles` mutably, in the order given.
    ///
    /// Stale handles and repeated handles are skipped. Only the named slots are
    /// touched: O(k log k) for k handles, independent of the arena size.
    pub(crate) fn many_mut(&mut self, handles: &[Handle]) -> Vec<&mut T> {
        // (slot index, requested position), first request wins on repeats.
        let mut wanted: Vec<(usize, usize)> = handles
            .iter()
            .enumerate()
            .filter(|(_, handle)| self.contains(**handle))
            .map(|(position, handle)| (handle.index(), position))
            .collect();
        wanted.sort_unstable();
        wanted.dedup_by_key(|(index, _)| *index);

        let mut picked: Vec<(usize, &mut T)> = Vec::with_capacity(wanted.len());
        let mut rest: &mut [Slot<T>] = &mut self.slots;
        let mut offset = 0;
        for (index, position) in wanted {
            let (_, tail) = std::mem::take(&mut rest).split_at_mut(index - offset);
            let Some((slot, tail)) = tail.split_first_mut() else {
                break;
            };
            rest = tail;
            offset = index + 1;
            #[cfg(test)]
            SLOTS_TOUCHED.with(|touched| touched.set(touched.get() + 1));
            if let Slot::Occupied { value, .. } = slot {
                picked.push((position, value));
            }
        }

        picked.sort_unstable_by_key(|(position, _)| *position);
        picked.into_iter().map(|(_, value)| value).collect()
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw slot access used for internal links. Panics on a vacant slot.
impl<T> Index<usize> for Arena<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match &self.slots[index] {
            Slot::Occupied { value, .. } => value,
            Slot::Vacant { .. } => panic!("arena link points at vacant slot {index}"),
        }
    }
}

impl<T> IndexMut<usize> for Arena<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match &mut self.slots[index] {
            Slot::Occupied { value, .. } => value,
            Slot::Vacant { .. } => panic!("arena link points at vacant slot {index}"),
        }
    }
}
