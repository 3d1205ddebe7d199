//! Per-category entry store.
//!
//! Entries live in a slot arena and are threaded onto an index-linked doubly
//! linked list, giving O(1) insert, removal and move-to-most-recent without
//! pointer chasing.
//!
//! ```text
//!   head (oldest) ─► [slot 3] ◄──► [slot 0] ◄──► [slot 5] ◄── tail (newest)
//! ```
//!
//! List order is insertion order, except that LRU categories move an entry to
//! the tail on every hit, which turns the list into access order.

use crate::cache::entry::Entry;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SlotId(usize);

#[derive(Debug)]
struct Node<V> {
    entry: Entry<V>,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Per-category counters kept alongside the entries.
#[derive(Debug, Default, Clone, Copy)]
pub struct StoreCounters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug)]
pub struct CategoryStore<V> {
    slots: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    index: HashMap<String, SlotId>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    protected: HashSet<String>,
    size_bytes: u64,
    pub counters: StoreCounters,
}

impl<V> Default for CategoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CategoryStore<V> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            protected: HashSet::new(),
            size_bytes: 0,
            counters: StoreCounters::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn protected_len(&self) -> usize {
        self.protected.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn is_protected(&self, key: &str) -> bool {
        self.protected.contains(key)
    }

    pub fn protected_keys(&self) -> impl Iterator<Item = &String> {
        self.protected.iter()
    }

    fn node(&self, id: SlotId) -> Option<&Node<V>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: SlotId) -> Option<&mut Node<V>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn get(&self, key: &str) -> Option<&Entry<V>> {
        let id = *self.index.get(key)?;
        self.node(id).map(|n| &n.entry)
    }

    /// Oldest entry in list order.
    pub fn front(&self) -> Option<&Entry<V>> {
        self.head.and_then(|id| self.node(id)).map(|n| &n.entry)
    }

    /// Iterates entries from oldest to newest in list order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter { store: self, current: self.head }
    }

    /// Appends a new entry at the tail. An existing entry under the same key is removed and returned first.
    pub fn push_back(&mut self, entry: Entry<V>) -> Option<Entry<V>> {
        let replaced = self.remove(&entry.key);
        let key = entry.key.clone();
        let size = entry.size_bytes;
        let hot = entry.is_hot;
        let node = Node { entry, prev: self.tail, next: None };
        let id = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                SlotId(idx)
            }
            None => {
                self.slots.push(Some(node));
                SlotId(self.slots.len() - 1)
            }
        };
        match self.tail {
            Some(tail) => {
                if let Some(n) = self.node_mut(tail) {
                    n.next = Some(id);
                }
            }
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        if hot {
            self.protected.insert(key.clone());
        }
        self.index.insert(key, id);
        self.size_bytes = self.size_bytes.saturating_add(size);
        replaced
    }

    /// Unlinks and frees the entry, dropping its accounting and protection.
    pub fn remove(&mut self, key: &str) -> Option<Entry<V>> {
        let id = self.index.remove(key)?;
        self.detach(id);
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        self.protected.remove(key);
        self.size_bytes = self.size_bytes.saturating_sub(node.entry.size_bytes);
        Some(node.entry)
    }

    /// Records a hit and returns the updated entry. Moves it to the tail when `reorder` is set.
    pub fn record_access(&mut self, key: &str, now: DateTime<Utc>, reorder: bool) -> Option<&Entry<V>> {
        let id = *self.index.get(key)?;
        if reorder && self.tail != Some(id) {
            self.detach(id);
            self.attach_back(id);
        }
        let node = self.node_mut(id)?;
        node.entry.mark_accessed(now);
        Some(&node.entry)
    }

    /// Marks the entry hot and protected. Returns false if the key is absent.
    pub fn protect(&mut self, key: &str) -> bool {
        let Some(&id) = self.index.get(key) else { return false };
        if let Some(node) = self.node_mut(id) {
            node.entry.is_hot = true;
        }
        self.protected.insert(key.to_string());
        true
    }

    /// Clears hot status. Returns true if the key was protected.
    pub fn unprotect(&mut self, key: &str) -> bool {
        if let Some(&id) = self.index.get(key) {
            if let Some(node) = self.node_mut(id) {
                node.entry.is_hot = false;
            }
        }
        self.protected.remove(key)
    }

    /// Removes every entry; returns the number of entries and bytes dropped.
    pub fn clear(&mut self) -> (usize, u64) {
        let dropped = (self.index.len(), self.size_bytes);
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.protected.clear();
        self.head = None;
        self.tail = None;
        self.size_bytes = 0;
        dropped
    }

    fn detach(&mut self, id: SlotId) {
        let Some((prev, next)) = self.node(id).map(|n| (n.prev, n.next)) else { return };
        match prev {
            Some(p) => {
                if let Some(n) = self.node_mut(p) {
                    n.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(nx) => {
                if let Some(n) = self.node_mut(nx) {
                    n.prev = prev;
                }
            }
            None => self.tail = prev,
        }
        if let Some(n) = self.node_mut(id) {
            n.prev = None;
            n.next = None;
        }
    }

    fn attach_back(&mut self, id: SlotId) {
        let old_tail = self.tail;
        if let Some(n) = self.node_mut(id) {
            n.prev = old_tail;
            n.next = None;
        }
        match old_tail {
            Some(t) => {
                if let Some(n) = self.node_mut(t) {
                    n.next = Some(id);
                }
            }
            None => self.head = Some(id),
        }
        self.tail = Some(id);
    }

    /// Checks size accounting, list/index agreement and the protected ⊆ hot rule.
    pub fn validate_invariants(&self) -> Result<(), String> {
        let mut count = 0usize;
        let mut bytes = 0u64;
        for entry in self.iter() {
            count += 1;
            bytes += entry.size_bytes;
            if !self.index.contains_key(&entry.key) {
                return Err(format!("listed key {} missing from index", entry.key));
            }
        }
        if count != self.index.len() {
            return Err(format!("list has {count} entries, index has {}", self.index.len()));
        }
        if bytes != self.size_bytes {
            return Err(format!("entries sum to {bytes} bytes, store reports {}", self.size_bytes));
        }
        for key in &self.protected {
            match self.get(key) {
                Some(e) if e.is_hot => {}
                Some(_) => return Err(format!("protected key {key} is not hot")),
                None => return Err(format!("protected key {key} is not stored")),
            }
        }
        Ok(())
    }
}

pub struct Iter<'a, V> {
    store: &'a CategoryStore<V>,
    current: Option<SlotId>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a Entry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.store.node(self.current?)?;
        self.current = node.next;
        Some(&node.entry)
    }
}
