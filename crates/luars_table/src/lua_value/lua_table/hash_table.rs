use std::collections::HashMap;

use ahash::RandomState;

use crate::LuaValue;
use crate::lua_value::lua_table::value_array::LuaValueArray;

/// Hash part of a table: an insertion-ordered map.
///
/// Entries live in a slab of nodes threaded into a doubly linked list (the
/// enumeration order); `index` maps each key to its node. Removing a key
/// leaves a tombstone (nil value) in place so a traversal positioned on it can
/// still find its successor. Tombstones are purged lazily when new keys arrive;
/// setting a removed key again appends it as a fresh entry.
pub struct LuaHashTable {
    nodes: Vec<Node>,
    free: Vec<usize>,
    index: HashMap<LuaValue, usize, RandomState>,
    head: usize,
    tail: usize,
    live: usize,
    dead: usize,
}

struct Node {
    key: LuaValue,
    /// nil marks a tombstone
    value: LuaValue,
    prev: usize,
    next: usize,
}

/// End-of-list marker for node links
const NO_NODE: usize = usize::MAX;

impl LuaHashTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            index: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            head: NO_NODE,
            tail: NO_NODE,
            live: 0,
            dead: 0,
        }
    }

    /// Number of live entries
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[inline]
    pub fn get(&self, key: &LuaValue) -> Option<&LuaValue> {
        let &idx = self.index.get(key)?;
        let value = &self.nodes[idx].value;
        if value.is_nil() { None } else { Some(value) }
    }

    #[inline]
    pub fn contains_key(&self, key: &LuaValue) -> bool {
        self.get(key).is_some()
    }

    /// Insert or overwrite. A nil value removes the key.
    pub fn set(&mut self, key: LuaValue, value: LuaValue) {
        if value.is_nil() {
            self.remove(&key);
            return;
        }

        if let Some(&idx) = self.index.get(&key) {
            if !self.nodes[idx].value.is_nil() {
                self.nodes[idx].value = value;
                return;
            }
            // a removed key comes back as a new entry at the end
            self.unlink(idx);
            self.dead -= 1;
        }

        if self.dead > 0 && self.dead >= self.live {
            self.purge_dead();
        }

        let node = Node {
            key: key.clone(),
            value,
            prev: self.tail,
            next: NO_NODE,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        if self.tail == NO_NODE {
            self.head = idx;
        } else {
            self.nodes[self.tail].next = idx;
        }
        self.tail = idx;
        self.index.insert(key, idx);
        self.live += 1;
    }

    /// Remove `key`, returning its old value. No-op if absent.
    pub fn remove(&mut self, key: &LuaValue) -> Option<LuaValue> {
        let &idx = self.index.get(key)?;
        let node = &mut self.nodes[idx];
        if node.value.is_nil() {
            return None;
        }
        self.live -= 1;
        self.dead += 1;
        Some(std::mem::take(&mut node.value))
    }

    /// Whether integer `key`, about to be set to a non-nil value, may go into
    /// the array part: every index between the continuous prefix and `key`
    /// must already be occupied, either in the array or here.
    pub fn can_promote(&self, key: i64, array: &LuaValueArray) -> bool {
        if array.is_empty() {
            return key == 1;
        }

        let bound = array.continuous_len() as i64;
        let mut i = key - 1;
        while i > bound {
            if !array.contains_key(i) && !self.contains_key(&LuaValue::integer(i)) {
                return false;
            }
            i -= 1;
        }
        true
    }

    /// First live entry in enumeration order
    pub fn first(&self) -> Option<(LuaValue, LuaValue)> {
        self.live_from(self.head)
    }

    /// Live entry following `key`. A key unknown to the index (never stored, or
    /// already purged) restarts from the front.
    pub fn next(&self, key: &LuaValue) -> Option<(LuaValue, LuaValue)> {
        match self.index.get(key) {
            Some(&idx) => self.live_from(self.nodes[idx].next),
            None => self.first(),
        }
    }

    /// Live entries in enumeration order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            table: self,
            cursor: self.head,
        }
    }

    fn live_from(&self, mut idx: usize) -> Option<(LuaValue, LuaValue)> {
        while idx != NO_NODE {
            let node = &self.nodes[idx];
            if !node.value.is_nil() {
                return Some((node.key.clone(), node.value.clone()));
            }
            idx = node.next;
        }
        None
    }

    /// Unlink every tombstone and return its node to the free list
    fn purge_dead(&mut self) {
        tracing::debug!(dead = self.dead, live = self.live, "purging hash tombstones");
        let mut idx = self.head;
        while idx != NO_NODE {
            let next = self.nodes[idx].next;
            if self.nodes[idx].value.is_nil() {
                self.unlink(idx);
            }
            idx = next;
        }
        self.dead = 0;
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = &self.nodes[idx];
            (node.prev, node.next)
        };
        if prev == NO_NODE {
            self.head = next;
        } else {
            self.nodes[prev].next = next;
        }
        if next == NO_NODE {
            self.tail = prev;
        } else {
            self.nodes[next].prev = prev;
        }

        let key = std::mem::take(&mut self.nodes[idx].key);
        self.index.remove(&key);
        self.nodes[idx].prev = NO_NODE;
        self.nodes[idx].next = NO_NODE;
        self.free.push(idx);
    }
}

pub struct Iter<'a> {
    table: &'a LuaHashTable,
    cursor: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a LuaValue, &'a LuaValue);

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor != NO_NODE {
            let node = &self.table.nodes[self.cursor];
            self.cursor = node.next;
            if !node.value.is_nil() {
                return Some((&node.key, &node.value));
            }
        }
        None
    }
}
