//! crates/health_journal_core/src/aggregator.rs
//!
//! Merges sparse daily records and diary entries into a dense per-field, per-day
//! matrix. Rows only ever come from data observed inside the window, never from the
//! catalog, so a kind nobody entered that week produces no row.

use crate::catalog::{Catalog, Registry};
use crate::domain::{format_pain, DailyRecord, DateKey};
use crate::ports::{DiaryStore, RecordRepository};
use chrono::Days;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::warn;

/// Placeholder for a scalar or text cell with no data behind it.
pub const ABSENT: &str = "N/A";
/// Placeholder for a date without a diary entry.
pub const NO_DIARY_ENTRY: &str = "No entry";

//=========================================================================================
// Matrix Types
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExercisePart {
    Repeats,
    Sets,
}

/// Identifies one matrix row. The derived order is the display order: the three
/// fixed rows, then exercises, time-based activities and medications, each by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowKey {
    Mood,
    Pain,
    Meditation,
    Exercise { name: String, part: ExercisePart },
    Time(String),
    Medication(String),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Mood => f.write_str("Mood"),
            RowKey::Pain => f.write_str("Pain"),
            RowKey::Meditation => f.write_str("Meditation"),
            RowKey::Exercise { name, part } => {
                let part = match part {
                    ExercisePart::Repeats => "Repeats",
                    ExercisePart::Sets => "Sets",
                };
                write!(f, "Exercise: {} ({})", name, part)
            }
            RowKey::Time(name) => write!(f, "Time: {}", name),
            RowKey::Medication(name) => write!(f, "Medication: {} (Doses)", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Count(u32),
    Text(String),
}

impl Cell {
    fn absent() -> Self {
        Cell::Text(ABSENT.to_string())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Count(n) => write!(f, "{}", n),
            Cell::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRow {
    pub key: RowKey,
    /// One cell per window date, in window order.
    pub cells: Vec<Cell>,
}

/// Data that could not be read; the matrix was built without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixWarning {
    /// The day's column holds placeholders.
    Record { date: DateKey, message: String },
    /// Every diary cell holds the placeholder.
    Diary { message: String },
}

impl fmt::Display for MatrixWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixWarning::Record { date, message } => write!(f, "{} skipped ({})", date, message),
            MatrixWarning::Diary { message } => {
                write!(f, "diary entries unavailable ({})", message)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyMatrix {
    /// Oldest first.
    pub dates: Vec<DateKey>,
    pub rows: Vec<MatrixRow>,
    /// One diary cell per window date.
    pub diary: Vec<String>,
    pub warnings: Vec<MatrixWarning>,
}

impl WeeklyMatrix {
    pub fn row(&self, key: &RowKey) -> Option<&MatrixRow> {
        self.rows.iter().find(|row| &row.key == key)
    }

    /// `Field` followed by each window date.
    pub fn header(&self) -> Vec<String> {
        std::iter::once("Field".to_string())
            .chain(self.dates.iter().map(|d| d.to_string()))
            .collect()
    }

    /// Every row as strings, label first, ending with the `Diary` row.
    pub fn body(&self) -> Vec<Vec<String>> {
        let mut body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                std::iter::once(row.key.to_string())
                    .chain(row.cells.iter().map(|c| c.to_string()))
                    .collect()
            })
            .collect();
        body.push(
            std::iter::once("Diary".to_string())
                .chain(self.diary.iter().cloned())
                .collect(),
        );
        body
    }
}

//=========================================================================================
// Building
//=========================================================================================

/// The `days` consecutive dates ending at `end`, oldest first.
pub fn date_window(end: DateKey, days: usize) -> Vec<DateKey> {
    (0..days as u64)
        .rev()
        .filter_map(|back| end.checked_sub_days(Days::new(back)))
        .collect()
}

/// Builds the dense matrix for the `days` dates ending at `end`.
///
/// A day whose record cannot be read is treated as absent and reported in
/// `WeeklyMatrix::warnings`; the remaining days are still aggregated. The diary is
/// read once, and an unreadable diary is a single warning.
pub fn build_matrix(
    catalog: &Catalog,
    records: &dyn RecordRepository,
    diary: &dyn DiaryStore,
    end: DateKey,
    days: usize,
) -> WeeklyMatrix {
    let dates = date_window(end, days);
    let mut warnings = Vec::new();

    let diary_entries = match diary.get_all() {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Skipping unreadable diary");
            warnings.push(MatrixWarning::Diary { message: e.to_string() });
            BTreeMap::new()
        }
    };
    let diary_cells: Vec<String> = dates
        .iter()
        .map(|date| {
            diary_entries
                .get(date)
                .cloned()
                .unwrap_or_else(|| NO_DIARY_ENTRY.to_string())
        })
        .collect();

    let day_records: Vec<Option<DailyRecord>> = dates
        .iter()
        .map(|&date| match records.get(date) {
            Ok(record) => record,
            Err(e) => {
                warn!(%date, error = %e, "Skipping unreadable daily record");
                warnings.push(MatrixWarning::Record { date, message: e.to_string() });
                None
            }
        })
        .collect();

    // First pass: the row set is the union of what was observed.
    let mut keys: BTreeSet<RowKey> = [RowKey::Mood, RowKey::Pain, RowKey::Meditation]
        .into_iter()
        .collect();
    for record in day_records.iter().flatten() {
        for name in record.exercises.keys() {
            keys.insert(RowKey::Exercise { name: name.clone(), part: ExercisePart::Repeats });
            keys.insert(RowKey::Exercise { name: name.clone(), part: ExercisePart::Sets });
        }
        keys.extend(record.time_based.keys().cloned().map(RowKey::Time));
        keys.extend(record.medications.keys().cloned().map(RowKey::Medication));
    }

    // Second pass: fill every cell.
    let rows = keys
        .into_iter()
        .map(|key| {
            let cells = day_records
                .iter()
                .map(|record| match record {
                    Some(record) => cell_for(catalog, record, &key),
                    None => placeholder(&key),
                })
                .collect();
            MatrixRow { key, cells }
        })
        .collect();

    WeeklyMatrix {
        dates,
        rows,
        diary: diary_cells,
        warnings,
    }
}

fn placeholder(key: &RowKey) -> Cell {
    match key {
        RowKey::Exercise { .. } | RowKey::Medication(_) => Cell::Count(0),
        _ => Cell::absent(),
    }
}

fn cell_for(catalog: &Catalog, record: &DailyRecord, key: &RowKey) -> Cell {
    match key {
        RowKey::Mood => Cell::Text(record.mood.clone()),
        RowKey::Pain => Cell::Text(format_pain(record.pain)),
        RowKey::Meditation => Cell::Text(if record.meditation { "Yes" } else { "No" }.to_string()),
        RowKey::Exercise { name, part } => {
            let entry = record.exercises.get(name).copied().unwrap_or_default();
            Cell::Count(match part {
                ExercisePart::Repeats => entry.repeats,
                ExercisePart::Sets => entry.sets,
            })
        }
        RowKey::Time(name) => match record.time_based.get(name) {
            Some(&value) => Cell::Text(format_activity(catalog, name, value)),
            None => Cell::absent(),
        },
        RowKey::Medication(name) => Cell::Count(record.medications.get(name).copied().unwrap_or(0)),
    }
}

/// Formats with the kind's current catalog definition; an unknown kind shows the bare value.
pub fn format_activity(catalog: &Catalog, name: &str, value: f64) -> String {
    match catalog.get(Registry::TimeActivity, name) {
        Some(descriptor) => descriptor.format_activity_value(value),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExerciseEntry, MetricKindDescriptor, NumericUnit};
    use crate::test_support::{date, MemoryStore};

    fn end() -> DateKey {
        date("2024-03-07")
    }

    fn build(catalog: &Catalog, store: &MemoryStore) -> WeeklyMatrix {
        build_matrix(catalog, store, store, end(), 7)
    }

    #[test]
    fn window_is_oldest_first_and_ends_inclusive() {
        let window = date_window(end(), 7);
        assert_eq!(window.len(), 7);
        assert_eq!(window[0], date("2024-03-01"));
        assert_eq!(window[6], end());
        assert!(date_window(end(), 0).is_empty());
    }

    #[test]
    fn window_crosses_month_boundaries() {
        let window = date_window(date("2024-03-02"), 3);
        assert_eq!(window, vec![date("2024-02-29"), date("2024-03-01"), date("2024-03-02")]);
    }

    #[test]
    fn empty_repository_yields_fixed_rows_only() {
        let matrix = build(&Catalog::with_defaults(), &MemoryStore::default());

        let labels: Vec<String> = matrix.rows.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(labels, vec!["Mood", "Pain", "Meditation"]);
        for row in &matrix.rows {
            assert!(row.cells.iter().all(|c| c == &Cell::Text(ABSENT.to_string())));
        }
        assert_eq!(matrix.diary, vec![NO_DIARY_ENTRY.to_string(); 7]);
        assert!(matrix.warnings.is_empty());
    }

    #[test]
    fn single_day_exercise_is_padded_with_zeros() {
        let store = MemoryStore::default();
        let mut record = DailyRecord::default();
        record
            .exercises
            .insert("Pushups".to_string(), ExerciseEntry { repeats: 10, sets: 2 });
        store.put_record(date("2024-03-03"), &record);

        let matrix = build(&Catalog::with_defaults(), &store);

        let repeats = matrix
            .row(&RowKey::Exercise { name: "Pushups".to_string(), part: ExercisePart::Repeats })
            .unwrap();
        assert_eq!(repeats.key.to_string(), "Exercise: Pushups (Repeats)");
        let counts: Vec<Cell> = [0, 0, 10, 0, 0, 0, 0].into_iter().map(Cell::Count).collect();
        assert_eq!(repeats.cells, counts);

        let sets = matrix
            .row(&RowKey::Exercise { name: "Pushups".to_string(), part: ExercisePart::Sets })
            .unwrap();
        assert_eq!(sets.cells[2], Cell::Count(2));
        assert_eq!(sets.cells[3], Cell::Count(0));
    }

    #[test]
    fn rows_are_the_union_across_the_window_in_fixed_order() {
        let store = MemoryStore::default();
        let mut monday = DailyRecord::default();
        monday.time_based.insert("Piano".to_string(), 20.0);
        monday.medications.insert("Aspirin".to_string(), 1);
        store.put_record(date("2024-03-04"), &monday);

        let mut friday = DailyRecord::default();
        friday.time_based.insert("Driving".to_string(), 35.0);
        friday
            .exercises
            .insert("Grip Rotation (500g)".to_string(), ExerciseEntry { repeats: 10, sets: 1 });
        store.put_record(date("2024-03-06"), &friday);

        // Outside the window: must not contribute a row.
        let mut old = DailyRecord::default();
        old.medications.insert("Ibuprofen".to_string(), 2);
        store.put_record(date("2024-02-20"), &old);

        let matrix = build(&Catalog::with_defaults(), &store);
        let labels: Vec<String> = matrix.rows.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(
            labels,
            vec![
                "Mood",
                "Pain",
                "Meditation",
                "Exercise: Grip Rotation (500g) (Repeats)",
                "Exercise: Grip Rotation (500g) (Sets)",
                "Time: Driving",
                "Time: Piano",
                "Medication: Aspirin (Doses)",
            ]
        );

        let piano = matrix.row(&RowKey::Time("Piano".to_string())).unwrap();
        assert_eq!(piano.cells[3], Cell::Text("20 minutes".to_string()));
        assert_eq!(piano.cells[5], Cell::Text(ABSENT.to_string()));
        let aspirin = matrix.row(&RowKey::Medication("Aspirin".to_string())).unwrap();
        assert_eq!(aspirin.cells[3], Cell::Count(1));
        assert_eq!(aspirin.cells[5], Cell::Count(0));
    }

    #[test]
    fn pain_and_fixed_rows_render_from_present_records() {
        let store = MemoryStore::default();
        let record = DailyRecord {
            mood: "Calm".to_string(),
            pain: 7,
            meditation: true,
            ..Default::default()
        };
        store.put_record(end(), &record);

        let matrix = build(&Catalog::with_defaults(), &store);
        let severe = "7 - Severe burning in fingers and cubital tunnels, sensitive forearms";
        assert_eq!(matrix.row(&RowKey::Pain).unwrap().cells[6], Cell::Text(severe.to_string()));
        assert_eq!(matrix.row(&RowKey::Mood).unwrap().cells[6], Cell::Text("Calm".to_string()));
        let meditation = matrix.row(&RowKey::Meditation).unwrap();
        assert_eq!(meditation.cells[6], Cell::Text("Yes".to_string()));
        assert_eq!(meditation.cells[0], Cell::Text(ABSENT.to_string()));
    }

    #[test]
    fn diary_entries_fill_their_column() {
        let store = MemoryStore::default();
        store.put_diary(date("2024-03-05"), "Slept well");

        let matrix = build(&Catalog::with_defaults(), &store);
        assert_eq!(matrix.diary[4], "Slept well");
        assert_eq!(matrix.diary[0], NO_DIARY_ENTRY);
        let body = matrix.body();
        assert_eq!(body.last().unwrap()[0], "Diary");
        assert_eq!(body.last().unwrap()[5], "Slept well");
        assert_eq!(matrix.header()[1], "2024-03-01");
    }

    #[test]
    fn units_follow_the_current_catalog() {
        let store = MemoryStore::default();
        let mut record = DailyRecord::default();
        record.time_based.insert("Cycling".to_string(), 12.5);
        record.time_based.insert("Stretched".to_string(), 1.0);
        record.time_based.insert("Focus".to_string(), 4.0);
        record.time_based.insert("Forgotten".to_string(), 3.0);
        store.put_record(end(), &record);

        let mut catalog = Catalog::with_defaults();
        let kinds = [
            ("Cycling", MetricKindDescriptor::Numeric { unit: NumericUnit::Kilometers }),
            ("Stretched", MetricKindDescriptor::Boolean),
            ("Focus", MetricKindDescriptor::Scale { min: 1, max: 5 }),
        ];
        for (name, descriptor) in kinds {
            catalog.register(&store, Registry::TimeActivity, name, descriptor).unwrap();
        }

        let matrix = build(&catalog, &store);
        let cell = |name: &str| {
            matrix.row(&RowKey::Time(name.to_string())).unwrap().cells[6].clone()
        };
        assert_eq!(cell("Cycling"), Cell::Text("12.5 kilometers".to_string()));
        assert_eq!(cell("Stretched"), Cell::Text("Yes".to_string()));
        assert_eq!(cell("Focus"), Cell::Text("4/5".to_string()));
        assert_eq!(cell("Forgotten"), Cell::Text("3".to_string()));
    }

    #[test]
    fn corrupt_day_is_skipped_with_a_warning() {
        let store = MemoryStore::default();
        let mut good = DailyRecord::default();
        good.medications.insert("Aspirin".to_string(), 2);
        store.put_record(date("2024-03-02"), &good);
        store.corrupt(date("2024-03-04"));

        let matrix = build(&Catalog::with_defaults(), &store);
        assert_eq!(matrix.warnings.len(), 1);
        assert!(matches!(
            &matrix.warnings[0],
            MatrixWarning::Record { date: skipped, .. } if *skipped == date("2024-03-04")
        ));
        let aspirin = matrix.row(&RowKey::Medication("Aspirin".to_string())).unwrap();
        assert_eq!(aspirin.cells[1], Cell::Count(2));
        assert_eq!(aspirin.cells[3], Cell::Count(0));
        assert_eq!(matrix.row(&RowKey::Mood).unwrap().cells[3], Cell::Text(ABSENT.to_string()));
    }

    #[test]
    fn unreadable_diary_is_one_warning() {
        let store = MemoryStore::default();
        store.put_record(date("2024-03-05"), &DailyRecord::default());
        store.corrupt_diary();

        let matrix = build(&Catalog::with_defaults(), &store);
        assert_eq!(matrix.warnings.len(), 1);
        assert!(matches!(matrix.warnings[0], MatrixWarning::Diary { .. }));
        assert!(matrix.warnings[0].to_string().starts_with("diary entries unavailable"));
        assert!(matrix.diary.iter().all(|cell| cell == NO_DIARY_ENTRY));
        assert_eq!(matrix.dates.len(), 7);
    }

    #[test]
    fn building_twice_is_idempotent() {
        let store = MemoryStore::default();
        let mut record = DailyRecord::default();
        record.time_based.insert("Guitar".to_string(), 15.0);
        store.put_record(date("2024-03-06"), &record);
        store.put_diary(date("2024-03-06"), "Practised scales");

        let catalog = Catalog::with_defaults();
        assert_eq!(build(&catalog, &store), build(&catalog, &store));
    }
}
