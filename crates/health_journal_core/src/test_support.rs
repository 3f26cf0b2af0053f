//! In-memory fakes of every storage port, for unit tests.

use crate::catalog::Registry;
use crate::domain::{DailyRecord, DateKey};
use crate::ports::{CatalogStore, DiaryStore, KindMap, PortError, PortResult, RecordRepository};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

pub fn date(s: &str) -> DateKey {
    s.parse().unwrap()
}

#[derive(Default)]
pub struct MemoryStore {
    registries: Mutex<HashMap<Registry, KindMap>>,
    records: Mutex<BTreeMap<DateKey, DailyRecord>>,
    diary: Mutex<BTreeMap<DateKey, String>>,
    corrupt: Mutex<BTreeSet<DateKey>>,
    corrupt_registries: Mutex<BTreeSet<Registry>>,
    corrupt_diary: Mutex<bool>,
}

fn corrupt_error(key: impl ToString) -> PortError {
    PortError::Corrupt {
        key: key.to_string(),
        message: "expected value at line 1 column 1".to_string(),
    }
}

impl MemoryStore {
    pub fn put_record(&self, date: DateKey, record: &DailyRecord) {
        RecordRepository::put(self, date, record).unwrap();
    }

    pub fn put_diary(&self, date: DateKey, text: &str) {
        DiaryStore::put(self, date, text).unwrap();
    }

    /// Makes every later read of `date` fail as corrupt.
    pub fn corrupt(&self, date: DateKey) {
        self.corrupt.lock().unwrap().insert(date);
    }

    /// Makes every later load of `registry` fail as corrupt.
    pub fn corrupt_registry(&self, registry: Registry) {
        self.corrupt_registries.lock().unwrap().insert(registry);
    }

    /// Makes every later diary read fail as corrupt.
    pub fn corrupt_diary(&self) {
        *self.corrupt_diary.lock().unwrap() = true;
    }

    fn diary_is_corrupt(&self) -> bool {
        *self.corrupt_diary.lock().unwrap()
    }
}

impl CatalogStore for MemoryStore {
    fn load_registry(&self, registry: Registry) -> PortResult<Option<KindMap>> {
        if self.corrupt_registries.lock().unwrap().contains(&registry) {
            return Err(corrupt_error(registry));
        }
        Ok(self.registries.lock().unwrap().get(&registry).cloned())
    }

    fn save_registry(&self, registry: Registry, kinds: &KindMap) -> PortResult<()> {
        self.registries.lock().unwrap().insert(registry, kinds.clone());
        Ok(())
    }
}

impl RecordRepository for MemoryStore {
    fn get(&self, date: DateKey) -> PortResult<Option<DailyRecord>> {
        if self.corrupt.lock().unwrap().contains(&date) {
            return Err(corrupt_error(date));
        }
        Ok(self.records.lock().unwrap().get(&date).cloned())
    }

    fn put(&self, date: DateKey, record: &DailyRecord) -> PortResult<()> {
        self.records.lock().unwrap().insert(date, record.clone());
        Ok(())
    }

    fn dates(&self) -> PortResult<Vec<DateKey>> {
        Ok(self.records.lock().unwrap().keys().copied().collect())
    }
}

impl DiaryStore for MemoryStore {
    fn get(&self, date: DateKey) -> PortResult<Option<String>> {
        if self.diary_is_corrupt() {
            return Err(corrupt_error("diary"));
        }
        Ok(self.diary.lock().unwrap().get(&date).cloned())
    }

    fn put(&self, date: DateKey, text: &str) -> PortResult<()> {
        self.diary.lock().unwrap().insert(date, text.to_string());
        Ok(())
    }

    fn get_all(&self) -> PortResult<BTreeMap<DateKey, String>> {
        if self.diary_is_corrupt() {
            return Err(corrupt_error("diary"));
        }
        Ok(self.diary.lock().unwrap().clone())
    }
}
