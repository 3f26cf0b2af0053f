//! services/tracker/src/console/history.rs
//!
//! Every recorded day, oldest first, each printed with the day view.

use crate::console::render;
use crate::error::TrackerError;
use health_journal_core::journal::Journal;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::warn;

/// Writes every stored day to `out`. Unreadable days and an unreadable diary are
/// reported inline and skipped.
pub fn write_history<W: Write>(journal: &Journal, out: &mut W) -> Result<(), TrackerError> {
    let dates = journal.recorded_dates()?;
    if dates.is_empty() {
        writeln!(out, "No daily data found.")?;
        return Ok(());
    }

    let diary = match journal.diary_entries() {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Skipping unreadable diary");
            writeln!(out, "Warning: diary entries unavailable ({})", e)?;
            BTreeMap::new()
        }
    };

    for date in dates {
        match journal.record(date) {
            Ok(Some(record)) => {
                let entry = diary.get(&date).map(String::as_str);
                write!(out, "{}", render::day(journal.catalog(), date, &record, entry))?;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(%date, error = %e, "Skipping unreadable daily record");
                writeln!(out, "\nWarning: could not read {} ({})", date, e)?;
            }
        }
    }
    Ok(())
}
