//! crates/health_journal_core/src/ports.rs
//!
//! Defines the storage contracts (traits) for the journal's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of where and how catalogs, records and diary text are persisted.

use crate::catalog::Registry;
use crate::domain::{DailyRecord, DateKey, MetricKindDescriptor};
use std::collections::BTreeMap;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the storage backend (e.g., file system, parser).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Stored document {key} is corrupt: {message}")]
    Corrupt { key: String, message: String },
    #[error("Invalid definition: {0}")]
    Invalid(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// One registry's contents: kind name to descriptor.
pub type KindMap = BTreeMap<String, MetricKindDescriptor>;

//=========================================================================================
// Storage Ports (Traits)
//=========================================================================================

pub trait CatalogStore: Send + Sync {
    /// Loads a registry, or `None` when it has never been persisted.
    fn load_registry(&self, registry: Registry) -> PortResult<Option<KindMap>>;

    /// Persists the full contents of a registry.
    fn save_registry(&self, registry: Registry, kinds: &KindMap) -> PortResult<()>;
}

pub trait RecordRepository: Send + Sync {
    /// Absence is `Ok(None)`; an unreadable document is `PortError::Corrupt`.
    fn get(&self, date: DateKey) -> PortResult<Option<DailyRecord>>;

    /// Replaces the whole record for `date`. A later `get` sees either the old or
    /// the new record, never a mix.
    fn put(&self, date: DateKey, record: &DailyRecord) -> PortResult<()>;

    /// Every date that currently has a record, oldest first.
    fn dates(&self) -> PortResult<Vec<DateKey>>;
}

pub trait DiaryStore: Send + Sync {
    fn get(&self, date: DateKey) -> PortResult<Option<String>>;

    /// Last write wins.
    fn put(&self, date: DateKey, text: &str) -> PortResult<()>;

    fn get_all(&self) -> PortResult<BTreeMap<DateKey, String>>;
}
