use crate::LuaValue;

/// Array part of a table: slot `i` holds integer key `i + 1`.
///
/// Invariant: `continuous_len <= array.len()` and `array[..continuous_len]`
/// holds no nil. Slots past the continuous prefix may be holes.
pub struct LuaValueArray {
    pub(crate) array: Vec<LuaValue>,
    continuous_len: usize,
}

impl LuaValueArray {
    pub fn new(capacity: usize) -> Self {
        Self {
            array: Vec::with_capacity(capacity),
            continuous_len: 0,
        }
    }

    /// Physical length, holes included
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.array.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    #[inline(always)]
    pub fn continuous_len(&self) -> usize {
        self.continuous_len
    }

    /// True when the array has no holes at all
    #[inline(always)]
    pub fn is_dense(&self) -> bool {
        self.continuous_len == self.array.len()
    }

    #[inline(always)]
    pub fn contains_key(&self, key: i64) -> bool {
        self.get(key).is_some()
    }

    /// Value at 1-based `key`, `None` for holes and out-of-range keys
    #[inline(always)]
    pub fn get(&self, key: i64) -> Option<&LuaValue> {
        if key < 1 {
            return None;
        }
        match self.array.get((key - 1) as usize) {
            Some(v) if !v.is_nil() => Some(v),
            _ => None,
        }
    }

    /// A border: scanning from the tail, the first slot that is non-nil while its
    /// successor is nil (or absent).
    pub fn border(&self) -> usize {
        if self.is_dense() {
            return self.array.len();
        }
        let mut prev_nil = true;
        for i in (0..self.array.len()).rev() {
            let v = &self.array[i];
            if prev_nil && !v.is_nil() {
                return i + 1;
            }
            prev_nil = v.is_nil();
        }
        0
    }

    /// Highest 1-based index holding a non-nil value
    pub fn max_n(&self) -> usize {
        self.array
            .iter()
            .rposition(|v| !v.is_nil())
            .map_or(0, |i| i + 1)
    }

    /// Overwrite an in-bounds slot (1-based). Nil punches a hole.
    pub fn set_slot(&mut self, key: usize, value: LuaValue) {
        let idx = key - 1;
        if value.is_nil() {
            self.array[idx] = value;
            if key <= self.continuous_len {
                self.continuous_len = idx;
            }
            return;
        }
        self.array[idx] = value;
        if idx == self.continuous_len {
            self.extend_continuous();
        }
    }

    /// Grow by one slot at the tail
    pub fn push(&mut self, value: LuaValue) {
        self.array.push(value);
        self.extend_continuous();
    }

    /// Where an append should land: one past the last slot when the tail is
    /// occupied (or the array is empty), otherwise the first hole right after
    /// the trailing non-nil run. Returns a 1-based key.
    pub fn append_position(&self) -> usize {
        match self.array.last() {
            None => 1,
            Some(last) if !last.is_nil() => self.array.len() + 1,
            Some(_) => self.max_n() + 1,
        }
    }

    /// Shift slots `key..` right by one and place `value` at `key` (1-based, in
    /// bounds). A trailing hole absorbs the shift; otherwise the array grows by
    /// one slot. Returns whether it grew.
    pub fn insert_shift(&mut self, key: usize, value: LuaValue) -> bool {
        let idx = key - 1;
        let is_nil = value.is_nil();
        self.array.insert(idx, value);
        if idx <= self.continuous_len {
            if is_nil {
                self.continuous_len = idx;
            } else {
                self.continuous_len += 1;
            }
        }
        let grew = match self.array.last() {
            Some(last) if last.is_nil() => {
                self.array.pop();
                false
            }
            _ => true,
        };
        self.extend_continuous();
        grew
    }

    /// Remove the slot at 1-based `key`, shifting later slots left. Returns the
    /// old value (nil if it was a hole).
    pub fn remove_shift(&mut self, key: usize) -> LuaValue {
        let idx = key - 1;
        let old = self.array.remove(idx);
        if idx < self.continuous_len {
            self.continuous_len -= 1;
        }
        self.extend_continuous();
        old
    }

    /// Grow the continuous prefix over any non-nil slots following it
    pub fn extend_continuous(&mut self) {
        while self.continuous_len < self.array.len() && !self.array[self.continuous_len].is_nil() {
            self.continuous_len += 1;
        }
    }

    /// First non-nil slot at or after 0-based `idx`, as `(key, value)`
    pub fn next_from(&self, idx: usize) -> Option<(LuaValue, LuaValue)> {
        self.array
            .iter()
            .enumerate()
            .skip(idx)
            .find(|(_, v)| !v.is_nil())
            .map(|(i, v)| (LuaValue::integer(i as i64 + 1), v.clone()))
    }

    /// Non-nil slots in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (i64, &LuaValue)> {
        self.array
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nil())
            .map(|(i, v)| (i as i64 + 1, v))
    }
}
