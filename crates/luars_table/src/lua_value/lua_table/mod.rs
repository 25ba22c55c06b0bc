// LuaTable - hybrid array + ordered hash table
mod hash_table;
mod value_array;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use smol_str::SmolStr;

use crate::lua_value::lua_value::{LuaValue, TablePtr};
use crate::lua_vm::{LuaError, LuaResult};

pub use hash_table::LuaHashTable;
pub use value_array::LuaValueArray;

/// A Lua table.
///
/// Integer keys `1..=array.len()` live in the array part; every other key
/// (non-positive integers, integers past the array, non-integer keys) lives in
/// the hash part. A key is never in both.
pub struct LuaTable {
    meta: Option<Weak<RefCell<LuaTable>>>,

    array: LuaValueArray,
    hash: LuaHashTable,
}

impl LuaTable {
    /// Create an empty table with capacity hints for both parts
    pub fn new(asize: usize, hsize: usize) -> Self {
        Self {
            meta: None,
            array: LuaValueArray::new(asize),
            hash: LuaHashTable::new(hsize),
        }
    }

    // ============ Metatable ============

    #[inline(always)]
    pub fn has_metatable(&self) -> bool {
        self.get_metatable().is_some()
    }

    pub fn get_metatable(&self) -> Option<TablePtr> {
        self.meta.as_ref().and_then(Weak::upgrade)
    }

    pub fn set_metatable(&mut self, metatable: Option<&TablePtr>) {
        self.meta = metatable.map(Rc::downgrade);
    }

    // ============ Length ============

    /// The `#` border, without `__len`
    pub fn len(&self) -> usize {
        self.array.border()
    }

    pub fn is_empty(&self) -> bool {
        self.array.max_n() == 0 && self.hash.is_empty()
    }

    /// Largest positive integer key held by the array part
    pub fn max_n(&self) -> usize {
        self.array.max_n()
    }

    /// Physical size of the array part, holes included
    pub fn array_len(&self) -> usize {
        self.array.len()
    }

    /// Live entries in the hash part
    pub fn hash_len(&self) -> usize {
        self.hash.len()
    }

    // ============ Sequence operations ============

    /// Store `value` at the first free border position. Nil is ignored.
    pub fn append(&mut self, value: LuaValue) {
        if value.is_nil() {
            return;
        }
        let key = self.array.append_position();
        if key <= self.array.len() {
            self.array.set_slot(key, value);
        } else {
            self.hash.remove(&LuaValue::integer(key as i64));
            self.array.push(value);
        }
        self.absorb_hash_tail();
    }

    /// Insert `value` at `pos`, shifting later elements up by one.
    /// Positions past the array, or non-positive ones, become plain keyed sets.
    pub fn insert(&mut self, pos: i64, value: LuaValue) {
        let len = self.array.len() as i64;
        if pos <= 0 || pos > len {
            self.raw_set_int(pos, value);
            return;
        }
        if self.array.insert_shift(pos as usize, value) {
            // the slot that just opened at the tail overrides any hashed key there
            self.hash.remove(&LuaValue::integer(len + 1));
        }
        self.absorb_hash_tail();
    }

    /// Remove the element at `pos` (1-based), shifting later elements down.
    /// `pos <= 0` removes the last slot. Out of range returns nil and does nothing.
    pub fn remove(&mut self, pos: i64) -> LuaValue {
        let len = self.array.len();
        if len == 0 {
            return LuaValue::nil();
        }
        let key = if pos <= 0 {
            len
        } else if pos as u64 > len as u64 {
            return LuaValue::nil();
        } else {
            pos as usize
        };
        self.array.remove_shift(key)
    }

    /// Shorthand for `remove(0)`
    pub fn pop(&mut self) -> LuaValue {
        self.remove(0)
    }

    // ============ Raw access ============

    /// Set without `__newindex`. Fails only for nil and NaN keys.
    pub fn raw_set(&mut self, key: &LuaValue, value: LuaValue) -> LuaResult<()> {
        match key {
            LuaValue::Nil => Err(LuaError::IndexIsNil),
            LuaValue::Float(n) if n.is_nan() => Err(LuaError::IndexIsNaN),
            _ => {
                match key.as_integer() {
                    Some(i) => self.raw_set_int(i, value),
                    None => self.hash_set(key.clone(), value),
                }
                Ok(())
            }
        }
    }

    /// Get without `__index`; nil when absent
    pub fn raw_get(&self, key: &LuaValue) -> LuaValue {
        match key.as_integer() {
            Some(i) => self.raw_get_int(i),
            None => self.hash_get(key),
        }
    }

    pub fn raw_set_int(&mut self, key: i64, value: LuaValue) {
        if key < 1 {
            self.hash_set(LuaValue::integer(key), value);
            return;
        }

        let len = self.array.len();
        if key as u64 <= len as u64 {
            self.array.set_slot(key as usize, value);
            self.absorb_hash_tail();
            return;
        }

        if value.is_nil() {
            self.hash.remove(&LuaValue::integer(key));
            return;
        }

        if !self.hash.can_promote(key, &self.array) {
            self.hash.set(LuaValue::integer(key), value);
            return;
        }

        self.promote(key, value);
    }

    pub fn raw_get_int(&self, key: i64) -> LuaValue {
        if key >= 1 && key as u64 <= self.array.len() as u64 {
            return self.array.array[(key - 1) as usize].clone();
        }
        self.hash_get(&LuaValue::integer(key))
    }

    pub fn raw_set_string(&mut self, key: &str, value: LuaValue) {
        self.hash_set(LuaValue::String(SmolStr::new(key)), value);
    }

    pub fn raw_get_string(&self, key: &str) -> LuaValue {
        self.hash_get(&LuaValue::String(SmolStr::new(key)))
    }

    /// Set a key expected to live in the hash part. Integer-valued keys still
    /// go through `raw_set_int`, so a key never sits in both parts.
    pub fn raw_set_hash(&mut self, key: LuaValue, value: LuaValue) {
        match key.as_integer() {
            Some(i) => self.raw_set_int(i, value),
            None => self.hash_set(key, value),
        }
    }

    pub fn raw_get_hash(&self, key: &LuaValue) -> LuaValue {
        match key.as_integer() {
            Some(i) => self.raw_get_int(i),
            None => self.hash_get(key),
        }
    }

    fn hash_set(&mut self, key: LuaValue, value: LuaValue) {
        if value.is_nil() {
            self.hash.remove(&key);
        } else {
            self.hash.set(key, value);
        }
    }

    fn hash_get(&self, key: &LuaValue) -> LuaValue {
        self.hash.get(key).cloned().unwrap_or_default()
    }

    // ============ Traversal ============

    /// Visit every entry: array part in key order, then the hash part
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&LuaValue, &LuaValue),
    {
        for (i, v) in self.array.iter() {
            f(&LuaValue::integer(i), v);
        }
        for (k, v) in self.hash.iter() {
            f(k, v);
        }
    }

    /// Stateless cursor behind `next`. `None` ends the traversal.
    ///
    /// Feeding back each returned key visits every key present at the start
    /// exactly once, array part first. The key just returned may be removed
    /// before the following call.
    pub fn next(&self, input_key: &LuaValue) -> Option<(LuaValue, LuaValue)> {
        if input_key.is_nil() {
            return self.array.next_from(0).or_else(|| self.hash.first());
        }

        if let Some(key) = input_key.as_integer() {
            if key >= 1 && key as u64 <= self.array.len() as u64 {
                let idx = key as usize;
                if idx < self.array.continuous_len() {
                    return Some((LuaValue::integer(key + 1), self.array.array[idx].clone()));
                }
                return self.array.next_from(idx).or_else(|| self.hash.first());
            }
        }

        self.hash.next(input_key)
    }

    /// Collect a full `next` traversal
    pub fn iter_all(&self) -> Vec<(LuaValue, LuaValue)> {
        let mut result = Vec::with_capacity(self.array.len() + self.hash.len());
        let mut key = LuaValue::nil();
        while let Some((k, v)) = self.next(&key) {
            key = k.clone();
            result.push((k, v));
        }
        result
    }

    // ============ Array/hash migration ============

    /// Move `key` and the hashed keys between the array tail and `key` into the array
    fn promote(&mut self, key: i64, value: LuaValue) {
        let start = self.array.len() as i64 + 1;
        for i in start..key {
            let v = self.hash.remove(&LuaValue::integer(i)).unwrap_or_default();
            self.array.push(v);
        }
        self.hash.remove(&LuaValue::integer(key));
        self.array.push(value);
        let extended = self.absorb_hash_tail();
        tracing::trace!(key, pulled = key - start, extended, "promoted hash keys into array");
    }

    /// Pull keys `len+1, len+2, ...` out of the hash while they exist and the
    /// array has no holes. Returns how many moved.
    fn absorb_hash_tail(&mut self) -> usize {
        let mut moved = 0;
        while self.array.is_dense() && !self.hash.is_empty() {
            let next = LuaValue::integer(self.array.len() as i64 + 1);
            match self.hash.remove(&next) {
                Some(v) => {
                    self.array.push(v);
                    moved += 1;
                }
                None => break,
            }
        }
        moved
    }
}

impl std::fmt::Debug for LuaTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "table(array={}, hash={})",
            self.array.len(),
            self.hash.len()
        )
    }
}

impl Default for LuaTable {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
