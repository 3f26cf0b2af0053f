//! crates/health_journal_core/src/journal.rs
//!
//! The `Journal` bundles the loaded catalog with the three storage ports and is the
//! single entry point the outer layers use.

use crate::aggregator::{build_matrix, WeeklyMatrix};
use crate::catalog::{Catalog, Registry};
use crate::domain::{DailyRecord, DateKey, MetricKindDescriptor, PAIN_MAX};
use crate::ports::{CatalogStore, DiaryStore, PortError, PortResult, RecordRepository};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct Journal {
    catalog: Catalog,
    catalog_store: Arc<dyn CatalogStore>,
    records: Arc<dyn RecordRepository>,
    diary: Arc<dyn DiaryStore>,
}

impl Journal {
    /// Loads (and on first use seeds) the catalog, then wraps the stores.
    pub fn open(
        catalog_store: Arc<dyn CatalogStore>,
        records: Arc<dyn RecordRepository>,
        diary: Arc<dyn DiaryStore>,
    ) -> Self {
        let catalog = Catalog::load(catalog_store.as_ref());
        Self {
            catalog,
            catalog_store,
            records,
            diary,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn register_kind(
        &mut self,
        registry: Registry,
        name: &str,
        descriptor: MetricKindDescriptor,
    ) -> PortResult<()> {
        self.catalog
            .register(self.catalog_store.as_ref(), registry, name, descriptor)
    }

    // --- Daily Records ---

    pub fn record(&self, date: DateKey) -> PortResult<Option<DailyRecord>> {
        self.records.get(date)
    }

    /// Replaces the whole record for `date`.
    pub fn save_record(&self, date: DateKey, record: &DailyRecord) -> PortResult<()> {
        if record.pain > PAIN_MAX {
            return Err(PortError::Invalid(format!(
                "pain level {} is above {}",
                record.pain, PAIN_MAX
            )));
        }
        self.records.put(date, record)
    }

    pub fn recorded_dates(&self) -> PortResult<Vec<DateKey>> {
        self.records.dates()
    }

    // --- Diary ---

    pub fn diary_entry(&self, date: DateKey) -> PortResult<Option<String>> {
        self.diary.get(date)
    }

    pub fn save_diary_entry(&self, date: DateKey, text: &str) -> PortResult<()> {
        self.diary.put(date, text)
    }

    pub fn diary_entries(&self) -> PortResult<BTreeMap<DateKey, String>> {
        self.diary.get_all()
    }

    // --- Reporting ---

    pub fn weekly_matrix(&self, end: DateKey, days: usize) -> WeeklyMatrix {
        build_matrix(&self.catalog, self.records.as_ref(), self.diary.as_ref(), end, days)
    }
}
