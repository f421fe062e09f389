//! Bounded least-recently-used store of document inventories.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::document::{ContentHash, DocumentIdentity, DocumentImageInventory};

/// Default number of documents kept.
pub const DEFAULT_CAPACITY: usize = 10;

/// Millisecond clock used for recency.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

#[derive(Debug)]
struct Entry {
    inventory: Rc<DocumentImageInventory>,
    last_used: u64,
    seq: u64,
}

/// Inventory cache keyed by document fingerprint.
///
/// Holds at most `capacity` entries. Inserting a new key into a full cache
/// evicts the entry with the oldest `last_used`, ties going to the entry
/// inserted first.
#[derive(Debug)]
pub struct InventoryCache<C: Clock = SystemClock> {
    entries: HashMap<ContentHash, Entry>,
    capacity: usize,
    clock: C,
    next_seq: u64,
}

impl InventoryCache<SystemClock> {
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, SystemClock)
    }
}

impl Default for InventoryCache<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<C: Clock> InventoryCache<C> {
    pub fn with_clock(capacity: usize, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            clock,
            next_seq: 0,
        }
    }

    /// Look up the inventory for `identity`, marking it as just used.
    ///
    /// An entry captured at a different modification time is stale: it is
    /// evicted and the lookup misses. Identities without a cache key always
    /// miss.
    pub fn get(&mut self, identity: &DocumentIdentity) -> Option<Rc<DocumentImageInventory>> {
        let key = identity.cache_key()?;
        let entry = self.entries.get_mut(&key)?;
        if entry.inventory.identity.modified_at != identity.modified_at {
            tracing::debug!(key = %key, "cached inventory is stale");
            self.entries.remove(&key);
            return None;
        }
        entry.last_used = self.clock.now_ms();
        tracing::debug!(key = %key, "inventory cache hit");
        Some(Rc::clone(&entry.inventory))
    }

    /// Store an inventory under its document identity.
    ///
    /// Evicts the least recently used entry when full. Inventories whose
    /// identity has no cache key are not stored.
    pub fn put(&mut self, inventory: Rc<DocumentImageInventory>) {
        let Some(key) = inventory.identity.cache_key() else {
            return;
        };
        let now = self.clock.now_ms();
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.inventory = inventory;
            entry.last_used = now;
            return;
        }

        if self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| (entry.last_used, entry.seq))
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                tracing::debug!(key = %oldest, "evicting cached inventory");
                self.entries.remove(&oldest);
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            key,
            Entry {
                inventory,
                last_used: now,
                seq,
            },
        );
    }

    /// Fetch the inventory for `identity`, building and storing it on a miss.
    pub fn get_or_build(
        &mut self,
        identity: &DocumentIdentity,
        build: impl FnOnce(u64) -> DocumentImageInventory,
    ) -> Rc<DocumentImageInventory> {
        if let Some(inventory) = self.get(identity) {
            return inventory;
        }
        tracing::debug!(path = %identity.path, "inventory cache miss");
        let inventory = Rc::new(build(self.clock.now_ms()));
        self.put(Rc::clone(&inventory));
        inventory
    }

    pub fn contains(&self, identity: &DocumentIdentity) -> bool {
        identity
            .cache_key()
            .is_some_and(|key| self.entries.contains_key(&key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
