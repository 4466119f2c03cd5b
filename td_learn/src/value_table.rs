use crate::board::StateKey;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

// Room for one mark's decision states plus its afterstates.
const TABLE_CAPACITY: usize = 8_192;

/// Value estimates for one player, keyed by canonical board.
#[derive(Clone, Debug, Default)]
pub struct ValueTable {
    values: HashMap<StateKey, f64>,
}

impl Deref for ValueTable {
    type Target = HashMap<StateKey, f64>;
    fn deref(&self) -> &<Self as Deref>::Target {
        &self.values
    }
}

impl DerefMut for ValueTable {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.values
    }
}

impl ValueTable {
    pub fn new() -> Self {
        ValueTable {
            values: HashMap::with_capacity(TABLE_CAPACITY),
        }
    }

    /// Returns the stored value, inserting `init()` first if the key is new.
    pub fn get_or_insert_with<F>(&mut self, key: StateKey, init: F) -> f64
    where
        F: FnOnce() -> f64,
    {
        *self.values.entry(key).or_insert_with(init)
    }

    /// Moves the estimate for `key` by `delta`. Unknown keys are left alone.
    pub fn adjust(&mut self, key: StateKey, delta: f64) {
        if let Some(value) = self.values.get_mut(&key) {
            *value += delta;
        }
    }

    /// All entries ordered by key.
    pub fn sorted(&self) -> Vec<(StateKey, f64)> {
        let mut entries: Vec<(StateKey, f64)> =
            self.values.iter().map(|(key, value)| (*key, *value)).collect();
        entries.sort_by_key(|(key, _)| *key);
        entries
    }
}
