use near_sdk::near;
use near_sdk::store::{IterableMap, LookupMap};

use crate::record::{HtlcId, HtlcRecord};

/// Dual-key arena of HTLC records: a sequence-keyed table owning the
/// records, plus a digest index mapping content ids to sequence keys.
#[near(serializers = [borsh])]
pub struct HtlcStore {
    records: IterableMap<u64, HtlcRecord>,
    by_id: LookupMap<HtlcId, u64>,
    next_key: u64,
}

impl HtlcStore {
    pub fn new() -> Self {
        Self {
            records: IterableMap::new(b"r"),
            by_id: LookupMap::new(b"i"),
            next_key: 0,
        }
    }

    /// Stores a freshly built record under the next sequence key and
    /// indexes its id. Keys are strictly increasing and never reused.
    pub fn insert(&mut self, mut record: HtlcRecord) -> u64 {
        let key = self.next_key;
        self.next_key += 1;
        record.key = key;
        self.by_id.insert(record.id, key);
        self.records.insert(key, record);
        key
    }

    pub fn get(&self, key: u64) -> Option<&HtlcRecord> {
        self.records.get(&key)
    }

    pub fn get_by_id(&self, id: &HtlcId) -> Option<&HtlcRecord> {
        self.by_id.get(id).and_then(|key| self.records.get(key))
    }

    pub fn contains_id(&self, id: &HtlcId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Applies `mutate` to the record at `key` in place. Returns false
    /// when the key is absent. Records are never deleted, so settled
    /// records stay readable for audit.
    pub fn update(&mut self, key: u64, mutate: impl FnOnce(&mut HtlcRecord)) -> bool {
        match self.records.get_mut(&key) {
            Some(record) => {
                mutate(record);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> u32 {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for HtlcStore {
    fn default() -> Self {
        Self::new()
    }
}
