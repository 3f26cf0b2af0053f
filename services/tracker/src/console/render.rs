//! services/tracker/src/console/render.rs
//!
//! Plain-text rendering of single days, the weekly matrix and the diary.

use health_journal_core::aggregator::{format_activity, WeeklyMatrix};
use health_journal_core::catalog::Catalog;
use health_journal_core::domain::{format_pain, DailyRecord, DateKey};
use std::collections::BTreeMap;

/// Longest cell the weekly table prints before eliding the rest.
const MAX_CELL: usize = 40;

/// Renders rows as a bordered grid. The first row is the header.
pub fn grid(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; columns];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let border: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+";

    let mut out = String::new();
    out.push_str(&border);
    out.push('\n');
    for row in rows {
        for (i, width) in widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            let pad = width - cell.chars().count();
            out.push_str(&format!("| {}{} ", cell, " ".repeat(pad)));
        }
        out.push_str("|\n");
        out.push_str(&border);
        out.push('\n');
    }
    out
}

fn clip(cell: &str) -> String {
    let single_line = cell.replace('\n', " / ");
    if single_line.chars().count() <= MAX_CELL {
        single_line
    } else {
        let kept: String = single_line.chars().take(MAX_CELL - 3).collect();
        format!("{}...", kept)
    }
}

/// The weekly view: header, one line per field, the diary row, then any warnings.
pub fn weekly(matrix: &WeeklyMatrix) -> String {
    let mut rows = vec![matrix.header()];
    rows.extend(
        matrix
            .body()
            .into_iter()
            .map(|row| row.iter().map(|cell| clip(cell)).collect::<Vec<String>>()),
    );
    let mut out = grid(&rows);
    for warning in &matrix.warnings {
        out.push_str(&format!("Warning: {}\n", warning));
    }
    out
}

/// One day's record in sections, followed by its diary entry when there is one.
pub fn day(catalog: &Catalog, date: DateKey, record: &DailyRecord, diary: Option<&str>) -> String {
    let mut out = format!("\n=== {} ===\n", date);

    out.push_str("\nMood & Meditation:\n");
    out.push_str(&grid(&[
        vec!["Mood".to_string(), record.mood.clone()],
        vec![
            "Meditation".to_string(),
            if record.meditation { "Yes" } else { "No" }.to_string(),
        ],
        vec!["Pain".to_string(), format_pain(record.pain)],
    ]));

    if !record.exercises.is_empty() {
        out.push_str("\nExercises:\n");
        let mut rows = vec![vec![
            "Exercise".to_string(),
            "Repeats".to_string(),
            "Sets".to_string(),
        ]];
        rows.extend(record.exercises.iter().map(|(name, e)| {
            vec![name.clone(), e.repeats.to_string(), e.sets.to_string()]
        }));
        out.push_str(&grid(&rows));
    }

    if !record.time_based.is_empty() {
        out.push_str("\nTime-based Activities:\n");
        let mut rows = vec![vec!["Activity".to_string(), "Value".to_string()]];
        rows.extend(
            record
                .time_based
                .iter()
                .map(|(name, value)| vec![name.clone(), format_activity(catalog, name, *value)]),
        );
        out.push_str(&grid(&rows));
    }

    if !record.medications.is_empty() {
        out.push_str("\nMedications:\n");
        let mut rows = vec![vec!["Medication".to_string(), "Doses".to_string()]];
        rows.extend(
            record
                .medications
                .iter()
                .map(|(name, doses)| vec![name.clone(), doses.to_string()]),
        );
        out.push_str(&grid(&rows));
    }

    if let Some(entry) = diary.filter(|e| !e.is_empty()) {
        out.push_str(&format!("\nDiary:\n{}\n", entry));
    }
    out
}

pub fn diary(entries: &BTreeMap<DateKey, String>) -> String {
    let mut out = String::from("\nAll Diary Entries:\n------------------\n");
    if entries.is_empty() {
        out.push_str("No diary entries found\n");
        return out;
    }
    for (date, text) in entries {
        out.push_str(&format!("\nDate: {}\nEntry: {}\n", date, text));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_journal_core::domain::ExerciseEntry;

    #[test]
    fn grid_pads_every_column() {
        let table = grid(&[
            vec!["Field".to_string(), "Value".to_string()],
            vec!["Pain".to_string(), "3".to_string()],
        ]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "+-------+-------+");
        assert_eq!(lines[1], "| Field | Value |");
        assert_eq!(lines[3], "| Pain  | 3     |");
    }

    #[test]
    fn long_cells_are_clipped() {
        let long = "x".repeat(100);
        let clipped = clip(&long);
        assert_eq!(clipped.chars().count(), MAX_CELL);
        assert!(clipped.ends_with("..."));
        assert_eq!(clip("two\nlines"), "two / lines");
    }

    #[test]
    fn day_lists_sections_with_units() {
        let mut record = DailyRecord {
            mood: "Okay".to_string(),
            pain: 2,
            ..Default::default()
        };
        record
            .exercises
            .insert("Grip Rotation (500g)".to_string(), ExerciseEntry { repeats: 10, sets: 1 });
        record.time_based.insert("Total Computer Use".to_string(), 6.5);

        let text = day(
            &Catalog::with_defaults(),
            "2024-01-02".parse().unwrap(),
            &record,
            Some("Quiet day"),
        );
        assert!(text.contains("=== 2024-01-02 ==="));
        assert!(text.contains("2 - Mild burning, goes away within an hour"));
        assert!(text.contains("| Grip Rotation (500g) | 10      | 1    |"));
        assert!(text.contains("6.5 hours"));
        assert!(!text.contains("Medications:"));
        assert!(text.ends_with("Diary:\nQuiet day\n"));
    }

    #[test]
    fn empty_diary_says_so() {
        assert!(diary(&BTreeMap::new()).contains("No diary entries found"));
    }
}
