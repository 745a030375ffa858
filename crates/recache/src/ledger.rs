//! Recency ledger: a doubly-linked chain over an arena of slots.
//!
//! Entries are addressed by stable `usize` handles into the arena; `prev` and
//! `next` are slot indices, never references, so splicing is plain index
//! arithmetic. Freed slots are recycled through a free list.

/// One stored key/value pair plus its links in the chain.
struct Entry<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
    linked: bool,
}

/// Doubly-linked chain ordered by recency of use.
///
/// `head` is the most-recently-used end, `tail` the least-recently-used end
/// and therefore the eviction candidate. All structural updates are O(1).
///
/// An entry's slot stays allocated while it is detached from the chain, so a
/// handle remains valid across a `remove`/`prepend` splice. Handles are only
/// invalidated by `release`.
pub struct UsageLedger<K, V> {
    slots: Vec<Option<Entry<K, V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<K, V> UsageLedger<K, V> {
    /// Create an empty ledger with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Store a pair in a fresh or recycled slot, detached from the chain.
    pub fn alloc(&mut self, key: K, value: V) -> usize {
        let entry = Entry {
            key,
            value,
            prev: None,
            next: None,
            linked: false,
        };
        match self.free.pop() {
            Some(handle) => {
                self.slots[handle] = Some(entry);
                handle
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        }
    }

    /// Free a detached slot, returning its pair.
    ///
    /// # Panics
    /// Panics if the slot is vacant or the entry is still linked.
    pub fn release(&mut self, handle: usize) -> (K, V) {
        assert!(
            !self.slot(handle).linked,
            "cannot release ledger entry {} while it is linked",
            handle
        );
        self.free.push(handle);
        match self.slots[handle].take() {
            Some(entry) => (entry.key, entry.value),
            None => unreachable!("slot occupancy checked above"),
        }
    }

    /// Link a detached entry at the most-recently-used end.
    ///
    /// # Panics
    /// Panics if the slot is vacant or the entry is already linked.
    pub fn prepend(&mut self, handle: usize) {
        let old_head = self.head;
        {
            let entry = self.slot_mut(handle);
            assert!(
                !entry.linked,
                "cannot prepend ledger entry {}, it is already linked",
                handle
            );
            entry.prev = None;
            entry.next = old_head;
            entry.linked = true;
        }

        if let Some(head) = old_head {
            self.slot_mut(head).prev = Some(handle);
        }
        self.head = Some(handle);
        if self.tail.is_none() {
            self.tail = Some(handle);
        }
        self.len += 1;
    }

    /// Detach a linked entry from the chain without freeing its slot.
    ///
    /// Handles all four positions (sole element, head, tail, interior) by
    /// redirecting the neighbour links or the chain ends as appropriate.
    ///
    /// # Panics
    /// Panics if the slot is vacant or the entry is not linked.
    pub fn remove(&mut self, handle: usize) {
        let (prev, next) = {
            let entry = self.slot_mut(handle);
            assert!(
                entry.linked,
                "cannot remove ledger entry {}, it is not linked",
                handle
            );
            let links = (entry.prev, entry.next);
            entry.prev = None;
            entry.next = None;
            entry.linked = false;
            links
        };

        match prev {
            Some(prev_handle) => self.slot_mut(prev_handle).next = next,
            None => self.head = next,
        }
        match next {
            Some(next_handle) => self.slot_mut(next_handle).prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    /// Move a linked entry to the most-recently-used end.
    pub fn promote(&mut self, handle: usize) {
        if self.head == Some(handle) {
            return; // Already most recent
        }
        self.remove(handle);
        self.prepend(handle);
    }

    /// Handle of the most-recently-used entry.
    pub fn head(&self) -> Option<usize> {
        self.head
    }

    /// Handle of the least-recently-used entry.
    pub fn tail(&self) -> Option<usize> {
        self.tail
    }

    /// Number of linked entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Key stored at `handle`.
    pub fn key(&self, handle: usize) -> &K {
        &self.slot(handle).key
    }

    /// Value stored at `handle`.
    pub fn value(&self, handle: usize) -> &V {
        &self.slot(handle).value
    }

    /// Mutable value stored at `handle`.
    pub fn value_mut(&mut self, handle: usize) -> &mut V {
        &mut self.slot_mut(handle).value
    }

    /// Drop all entries and recycled slots.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Traverse the chain from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            ledger: self,
            cursor: self.head,
        }
    }

    fn slot(&self, handle: usize) -> &Entry<K, V> {
        match self.slots.get(handle) {
            Some(Some(entry)) => entry,
            _ => panic!("ledger slot {} is vacant", handle),
        }
    }

    fn slot_mut(&mut self, handle: usize) -> &mut Entry<K, V> {
        match self.slots.get_mut(handle) {
            Some(Some(entry)) => entry,
            _ => panic!("ledger slot {} is vacant", handle),
        }
    }
}

/// Iterator over `(key, value)` pairs from most to least recently used.
pub struct Iter<'a, K, V> {
    ledger: &'a UsageLedger<K, V>,
    cursor: Option<usize>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor?;
        let entry = self.ledger.slot(handle);
        self.cursor = entry.next;
        Some((&entry.key, &entry.value))
    }
}
