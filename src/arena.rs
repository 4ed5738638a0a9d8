//! Slot storage with stable ids.
//!
//! Commands hold ids rather than positions in a list, so undoing one command
//! never shifts the entities another command refers to. Ids are allocated by
//! the owner of the arena and are never reused; a removed entity can be put
//! back into exactly the slot it came from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// A typed index into an [`Arena`].
pub trait SlotKey: Copy {
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

macro_rules! slot_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub usize);

        impl SlotKey for $name {
            fn from_index(index: usize) -> Self {
                Self(index)
            }

            fn index(self) -> usize {
                self.0
            }
        }
    };
}

slot_key!(
    /// Stable handle to a committed stroke.
    StrokeId
);
slot_key!(
    /// Stable handle to a text annotation.
    TextId
);

/// Hands out monotonically increasing ids for one arena.
#[derive(Debug, Clone)]
pub struct IdAllocator<K> {
    next: usize,
    _key: PhantomData<K>,
}

impl<K: SlotKey> IdAllocator<K> {
    pub fn new() -> Self {
        Self {
            next: 0,
            _key: PhantomData,
        }
    }

    pub fn allocate(&mut self) -> K {
        let id = K::from_index(self.next);
        self.next += 1;
        id
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct Arena<K, T> {
    slots: Vec<Option<T>>,
    #[serde(skip)]
    _key: PhantomData<K>,
}

impl<K, T: fmt::Debug> fmt::Debug for Arena<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.slots
                    .iter()
                    .enumerate()
                    .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v))),
            )
            .finish()
    }
}

impl<K, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            _key: PhantomData,
        }
    }
}

impl<K: SlotKey, T> Arena<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `value` into the slot for `id`, returning what was there.
    pub fn insert(&mut self, id: K, value: T) -> Option<T> {
        let index = id.index();
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index].replace(value)
    }

    pub fn remove(&mut self, id: K) -> Option<T> {
        let removed = self.slots.get_mut(id.index()).and_then(Option::take);
        // insert-then-remove must leave the arena equal to what it was
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
        removed
    }

    pub fn get(&self, id: K) -> Option<&T> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: K) -> Option<&mut T> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: K) -> bool {
        self.get(id).is_some()
    }

    /// Occupied slots in id order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (K::from_index(i), v)))
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
