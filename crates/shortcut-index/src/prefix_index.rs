use std::collections::{BTreeMap, HashMap};

use slab::Slab;

use crate::models::{Shortcut, ShortcutId};

/// Stable address of a shortcut inside a [`PrefixIndex`]. Invalidated by removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShortcutHandle(usize);

#[derive(Debug)]
struct Slot {
    key: String,
    seq: u64,
    shortcut: Shortcut,
}

/// Shortcuts addressed two ways: ordered by lower-cased text (duplicates
/// allowed, insertion order among equal keys) and by id.
///
/// Both views hold arena handles and change together on every mutation.
#[derive(Debug, Default)]
pub struct PrefixIndex {
    slots: Slab<Slot>,
    by_key: BTreeMap<(String, u64), usize>,
    by_id: HashMap<ShortcutId, usize>,
    next_seq: u64,
}

impl PrefixIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_shortcuts(shortcuts: impl IntoIterator<Item = Shortcut>) -> Self {
        let mut index = Self::new();
        for shortcut in shortcuts {
            index.insert(shortcut);
        }
        index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Files `shortcut` under its lower-cased text. The id must not be present.
    pub fn insert(&mut self, shortcut: Shortcut) -> ShortcutHandle {
        debug_assert!(
            !self.by_id.contains_key(&shortcut.id),
            "duplicate shortcut id {}",
            shortcut.id
        );
        if let Some(existing) = self.find(&shortcut.id) {
            self.remove(existing);
        }

        let key = shortcut.index_key();
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = shortcut.id;
        let slot = self.slots.insert(Slot {
            key: key.clone(),
            seq,
            shortcut,
        });
        self.by_key.insert((key, seq), slot);
        self.by_id.insert(id, slot);
        ShortcutHandle(slot)
    }

    /// Replaces the shortcut with the same id, re-filing it under its new text.
    pub fn upsert(&mut self, shortcut: Shortcut) -> ShortcutHandle {
        if let Some(existing) = self.find(&shortcut.id) {
            self.remove(existing);
        }
        self.insert(shortcut)
    }

    pub fn remove(&mut self, handle: ShortcutHandle) -> Option<Shortcut> {
        let slot = self.slots.try_remove(handle.0)?;
        self.by_key.remove(&(slot.key, slot.seq));
        self.by_id.remove(&slot.shortcut.id);
        Some(slot.shortcut)
    }

    pub fn remove_by_id(&mut self, id: &ShortcutId) -> Option<Shortcut> {
        let handle = self.find(id)?;
        self.remove(handle)
    }

    #[must_use]
    pub fn find(&self, id: &ShortcutId) -> Option<ShortcutHandle> {
        self.by_id.get(id).copied().map(ShortcutHandle)
    }

    #[must_use]
    pub fn get(&self, handle: ShortcutHandle) -> Option<&Shortcut> {
        self.slots.get(handle.0).map(|slot| &slot.shortcut)
    }

    #[must_use]
    pub fn get_by_id(&self, id: &ShortcutId) -> Option<&Shortcut> {
        self.find(id).and_then(|handle| self.get(handle))
    }

    /// Entries whose key starts with `prefix`, in key order. `prefix` is
    /// compared as given; callers lower-case it.
    pub fn prefix_scan<'a, 'p>(
        &'a self,
        prefix: &'p str,
    ) -> impl Iterator<Item = (&'a str, &'a Shortcut)> + use<'a, 'p> {
        self.by_key
            .range((prefix.to_string(), 0)..)
            .take_while(move |((key, _), _)| key.starts_with(prefix))
            .filter_map(move |((key, _), slot)| {
                self.slots
                    .get(*slot)
                    .map(|entry| (key.as_str(), &entry.shortcut))
            })
    }

    /// All entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Shortcut)> + '_ {
        self.by_key.iter().filter_map(move |((key, _), slot)| {
            self.slots
                .get(*slot)
                .map(|entry| (key.as_str(), &entry.shortcut))
        })
    }

    /// Removes every shortcut for which `remove` returns true and returns them.
    pub fn remove_where(&mut self, mut remove: impl FnMut(&Shortcut) -> bool) -> Vec<Shortcut> {
        let doomed = self
            .slots
            .iter()
            .filter(|(_, slot)| remove(&slot.shortcut))
            .map(|(slot, _)| ShortcutHandle(slot))
            .collect::<Vec<_>>();
        doomed
            .into_iter()
            .filter_map(|handle| self.remove(handle))
            .collect()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.by_key.clear();
        self.by_id.clear();
    }
}
