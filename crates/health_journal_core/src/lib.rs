pub mod aggregator;
pub mod catalog;
pub mod domain;
pub mod journal;
pub mod ports;
pub mod resolver;

#[cfg(test)]
mod test_support;

pub use aggregator::{build_matrix, Cell, MatrixRow, MatrixWarning, RowKey, WeeklyMatrix};
pub use catalog::{Catalog, Registry};
pub use domain::{
    DailyRecord, DateKey, ExerciseEntry, FieldValue, MetricKindDescriptor, NumericUnit,
};
pub use journal::Journal;
pub use ports::{CatalogStore, DiaryStore, KindMap, PortError, PortResult, RecordRepository};
pub use resolver::{resolve, ValidationError};
