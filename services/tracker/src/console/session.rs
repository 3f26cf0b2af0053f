//! services/tracker/src/console/session.rs
//!
//! The menu-driven conversation: collecting a day, registering kinds, reviewing the
//! diary and the weekly summary.

use crate::console::prompter::Prompter;
use crate::console::render;
use crate::error::TrackerError;
use chrono::NaiveDate;
use health_journal_core::catalog::Registry;
use health_journal_core::domain::{
    pain_description, DailyRecord, DateKey, ExerciseEntry, FieldValue, MetricKindDescriptor,
    NumericUnit, PAIN_MAX,
};
use health_journal_core::journal::Journal;
use health_journal_core::ports::PortError;
use health_journal_core::resolver::resolve;
use std::io::{BufRead, Write};
use tracing::{info, warn};

const MENU: &str = "\nOptions:
 1 - Enter daily data
 2 - Add new exercise
 3 - Add new time-based activity
 4 - Add/Manage medications
 5 - Modify past/future date
 6 - View all diary entries
 7 - View weekly summary
 8 - Exit";

pub struct Session<R, W> {
    journal: Journal,
    prompter: Prompter<R, W>,
    today: DateKey,
    summary_days: usize,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(
        journal: Journal,
        prompter: Prompter<R, W>,
        today: DateKey,
        summary_days: usize,
    ) -> Self {
        Self {
            journal,
            prompter,
            today,
            summary_days,
        }
    }

    /// Hands back the journal and the prompter once the session is over.
    pub fn into_parts(self) -> (Journal, Prompter<R, W>) {
        (self.journal, self.prompter)
    }

    /// Runs the menu until the user exits or input ends. Storage failures are
    /// reported and the menu continues.
    pub fn run(&mut self) -> Result<(), TrackerError> {
        let unreadable: Vec<Registry> = self.journal.catalog().unreadable().collect();
        for registry in unreadable {
            self.prompter.say(format!(
                "Warning: the {} registry could not be read; using the built-in kinds.",
                registry
            ))?;
        }
        if let Err(e) = self.show_day(self.today) {
            warn!(error = %e, "Could not display today's record");
        }
        loop {
            match self.menu_once() {
                Ok(true) => {}
                Ok(false) => break,
                Err(TrackerError::InputClosed) => break,
                Err(TrackerError::Port(e)) => {
                    warn!(error = %e, "Storage operation failed");
                    self.prompter.say(format!("Error: {}", e))?;
                }
                Err(e) => return Err(e),
            }
        }
        self.prompter.say("Goodbye!")
    }

    /// Handles one menu choice; `false` means exit.
    fn menu_once(&mut self) -> Result<bool, TrackerError> {
        self.prompter.say(MENU)?;
        let choice = self.prompter.ask("Select option (1-8): ")?;
        match choice.trim() {
            "1" => self.enter_today()?,
            "2" => self.add_exercise()?,
            "3" => self.add_activity()?,
            "4" => self.manage_medications()?,
            "5" => self.modify_date()?,
            "6" => self.view_diary()?,
            "7" => self.view_weekly()?,
            "8" => return Ok(false),
            _ => self.prompter.say("Invalid option. Please select 1-8.")?,
        }
        Ok(true)
    }

    //=====================================================================================
    // Daily Entry
    //=====================================================================================

    fn enter_today(&mut self) -> Result<(), TrackerError> {
        let today = self.today;
        let existing = self.journal.record(today)?;
        if existing.is_some() {
            let question = format!("Data already exists for {}. Overwrite?", today);
            if !self.prompter.yes_no(&question, Some(false))? {
                return self.prompter.say("Keeping existing data. Returning to menu.");
            }
        }
        self.collect_day(today, existing.as_ref())
    }

    fn modify_date(&mut self) -> Result<(), TrackerError> {
        loop {
            let raw = self
                .prompter
                .ask("\nEnter date to modify (YYYY-MM-DD) or 'm' to return to menu: ")?;
            let raw = raw.trim();
            if raw.eq_ignore_ascii_case("m") {
                return Ok(());
            }
            let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") else {
                self.prompter.say("Invalid date format. Please use YYYY-MM-DD.")?;
                continue;
            };

            let existing = match self.journal.record(date) {
                Ok(Some(record)) => record,
                Ok(None) => {
                    let question = format!("No data found for {}. Create new entry?", date);
                    if !self.prompter.yes_no(&question, Some(true))? {
                        continue;
                    }
                    DailyRecord::default()
                }
                Err(e) => {
                    self.prompter.say(format!("Error: {}", e))?;
                    continue;
                }
            };

            self.prompter.say(format!("\nModifying data for {}:", date))?;
            self.collect_day(date, Some(&existing))?;
        }
    }

    /// Prompts for every field of `date`, using `existing` for the fallbacks, then
    /// replaces the stored record and diary entry.
    fn collect_day(
        &mut self,
        date: DateKey,
        existing: Option<&DailyRecord>,
    ) -> Result<(), TrackerError> {
        let catalog = self.journal.catalog().clone();
        let mut record = DailyRecord::default();

        self.prompter.say("\nEnter exercise data (repeats and sets, e.g. '10 1'):")?;
        for (name, descriptor) in catalog.get_all(Registry::Exercise) {
            let previous = existing
                .and_then(|r| r.exercises.get(name))
                .map(|e| FieldValue::Counted { repeats: e.repeats, sets: e.sets });
            let label = format!("{} (repeats sets)", name);
            if let FieldValue::Counted { repeats, sets } =
                self.prompter.field(&label, descriptor, previous, None)?
            {
                record.exercises.insert(name.clone(), ExerciseEntry { repeats, sets });
            }
        }

        let previous = existing.map(|r| FieldValue::Flag(r.meditation));
        if let FieldValue::Flag(done) =
            self.prompter
                .field("Meditation (yes/no)", &MetricKindDescriptor::Boolean, previous, None)?
        {
            record.meditation = done;
        }

        let previous_mood = existing.map(|r| r.mood.clone()).filter(|m| !m.is_empty());
        let mood_prompt = match &previous_mood {
            Some(mood) => format!("Mood [{}]: ", mood),
            None => "Mood: ".to_string(),
        };
        let mood = self.prompter.ask(&mood_prompt)?.trim().to_string();
        record.mood = if mood.is_empty() {
            previous_mood.unwrap_or_default()
        } else {
            mood
        };

        record.pain = self.prompt_pain(existing.map(|r| r.pain))?;

        if !catalog.get_all(Registry::TimeActivity).is_empty() {
            self.prompter.say("\nEnter time-based activity data:")?;
        }
        for (name, descriptor) in catalog.get_all(Registry::TimeActivity) {
            let previous = existing
                .and_then(|r| r.time_based.get(name))
                .map(|v| FieldValue::from_activity_value(descriptor, *v));
            let (label, default) = match descriptor {
                MetricKindDescriptor::Boolean => {
                    (format!("{} (yes/no)", name), Some(FieldValue::Flag(false)))
                }
                MetricKindDescriptor::Scale { min, max } => (
                    format!("{} (scale {}-{})", name, min, max),
                    Some(FieldValue::Level(0)),
                ),
                other => (format!("{} ({})", name, other.type_label()), None),
            };
            let value = self.prompter.field(&label, descriptor, previous, default)?;
            if let Some(stored) = value.to_activity_value() {
                record.time_based.insert(name.clone(), stored);
            }
        }

        let previous_entry = match self.journal.diary_entry(date) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(%date, error = %e, "Could not read the previous diary entry");
                None
            }
        };
        self.prompter.say(
            "\nDiary entry (finish with an empty line; \
             an empty first line keeps the previous entry):",
        )?;
        if let Some(entry) = previous_entry.as_deref().filter(|e| !e.is_empty()) {
            self.prompter.say(format!("[Previous entry:]\n{}", entry))?;
        }
        let lines = self.prompter.multiline()?;
        let entry = if lines.is_empty() {
            previous_entry.clone().unwrap_or_default()
        } else {
            lines.join("\n")
        };

        let medications = catalog.get_all(Registry::Medication);
        if !medications.is_empty() {
            self.prompter.say("\nEnter medication doses taken today:")?;
        }
        for (name, descriptor) in medications {
            let previous = existing
                .and_then(|r| r.medications.get(name))
                .map(|doses| FieldValue::Level(i64::from(*doses)));
            let label = match descriptor {
                MetricKindDescriptor::Scale { min, max } => format!("{} ({}-{})", name, min, max),
                other => format!("{} ({})", name, other.type_label()),
            };
            if let FieldValue::Level(doses) =
                self.prompter.field(&label, descriptor, previous, Some(FieldValue::Level(0)))?
            {
                let doses = u32::try_from(doses).map_err(|_| {
                    TrackerError::Internal(format!("{} doses of {} out of range", doses, name))
                })?;
                record.medications.insert(name.clone(), doses);
            }
        }

        if let Err(e) = self.journal.save_record(date, &record) {
            self.report_unsaved_entry(date, &entry)?;
            return Err(e.into());
        }
        info!(%date, "Saved daily record");
        self.prompter.say(format!("\nData saved for {}.", date))?;

        let mut shown_entry = Some(entry.as_str());
        if !entry.is_empty() || previous_entry.is_some() {
            if let Err(e) = self.journal.save_diary_entry(date, &entry) {
                warn!(%date, error = %e, "Could not save diary entry");
                self.prompter.say(format!("Error: {}", e))?;
                self.report_unsaved_entry(date, &entry)?;
                shown_entry = previous_entry.as_deref();
            }
        }
        self.prompter.say(render::day(&catalog, date, &record, shown_entry))
    }

    /// Echoes a diary entry that was typed but not stored, so it can be copied out.
    fn report_unsaved_entry(&mut self, date: DateKey, entry: &str) -> Result<(), TrackerError> {
        if entry.is_empty() {
            return Ok(());
        }
        self.prompter.say(format!(
            "The diary entry for {} was NOT saved. Your text was:\n{}",
            date, entry
        ))
    }

    fn prompt_pain(&mut self, previous: Option<u8>) -> Result<u8, TrackerError> {
        self.prompter.say(format!("\nNeuropathic Pain Scale (0-{}):", PAIN_MAX))?;
        for level in 0..=PAIN_MAX {
            if let Some(text) = pain_description(level) {
                self.prompter.say(format!("{}: {}", level, text))?;
            }
        }
        let scale = MetricKindDescriptor::Scale {
            min: 0,
            max: i64::from(PAIN_MAX),
        };
        let previous = previous.map(|p| FieldValue::Level(i64::from(p)));
        match self
            .prompter
            .field("Enter pain level (0-10)", &scale, previous, Some(FieldValue::Level(0)))?
        {
            FieldValue::Level(level) => u8::try_from(level)
                .map_err(|_| TrackerError::Internal(format!("pain level {} out of range", level))),
            other => Err(TrackerError::Internal(format!(
                "expected a pain level, resolved {:?}",
                other
            ))),
        }
    }

    //=====================================================================================
    // Catalog Management
    //=====================================================================================

    fn add_exercise(&mut self) -> Result<(), TrackerError> {
        self.prompter.say("\nAdd new exercise")?;
        loop {
            let name = self.prompter.ask("Enter exercise name (or blank to cancel): ")?;
            let name = name.trim();
            if name.is_empty() {
                return self.prompter.say("Cancelled adding new exercise.");
            }
            if self.journal.catalog().get(Registry::Exercise, name).is_some() {
                self.prompter.say("Exercise already exists.")?;
                continue;
            }

            let blank = MetricKindDescriptor::Counted { repeats: 0, sets: 0 };
            let (repeats, sets) = loop {
                let raw = self.prompter.ask("Enter default repeats and sets (e.g. '10 1'): ")?;
                match resolve(&blank, None, Some(raw.as_str()), None) {
                    Ok(FieldValue::Counted { repeats, sets }) if !raw.trim().is_empty() => {
                        break (repeats, sets)
                    }
                    _ => self
                        .prompter
                        .say("Invalid input, please enter two numbers separated by a space.")?,
                }
            };

            let descriptor = MetricKindDescriptor::Counted { repeats, sets };
            return self.register(Registry::Exercise, name, descriptor, "Exercise");
        }
    }

    fn add_activity(&mut self) -> Result<(), TrackerError> {
        self.prompter.say("\nAdd new time-based activity")?;
        loop {
            let name = self.prompter.ask("Enter activity name (or blank to cancel): ")?;
            let name = name.trim();
            if name.is_empty() {
                return self.prompter.say("Cancelled adding new time-based activity.");
            }
            if self.journal.catalog().get(Registry::TimeActivity, name).is_some() {
                self.prompter.say("Activity already exists.")?;
                continue;
            }

            let descriptor = loop {
                let kind = self
                    .prompter
                    .ask("Enter type (minutes, hours, yes/no, scale, kilometers): ")?;
                match kind.trim().to_lowercase().as_str() {
                    "minutes" => break numeric(NumericUnit::Minutes),
                    "hours" => break numeric(NumericUnit::Hours),
                    "kilometers" => break numeric(NumericUnit::Kilometers),
                    "yes/no" => break MetricKindDescriptor::Boolean,
                    "scale" => break self.prompt_scale_range()?,
                    _ => self.prompter.say(
                        "Invalid type. Please enter one of: \
                         minutes, hours, yes/no, scale, kilometers.",
                    )?,
                }
            };

            return self.register(Registry::TimeActivity, name, descriptor, "Time-based activity");
        }
    }

    fn prompt_scale_range(&mut self) -> Result<MetricKindDescriptor, TrackerError> {
        loop {
            let min = self.prompter.ask("Enter scale minimum integer value: ")?;
            let max = self.prompter.ask("Enter scale maximum integer value: ")?;
            match (min.trim().parse::<i64>(), max.trim().parse::<i64>()) {
                (Ok(min), Ok(max)) if min < max => {
                    return Ok(MetricKindDescriptor::Scale { min, max })
                }
                (Ok(_), Ok(_)) => self.prompter.say("Minimum must be less than maximum.")?,
                _ => self.prompter.say("Please enter valid integers.")?,
            }
        }
    }

    fn manage_medications(&mut self) -> Result<(), TrackerError> {
        let listing: Vec<String> = self
            .journal
            .catalog()
            .get_all(Registry::Medication)
            .iter()
            .map(|(name, descriptor)| match descriptor {
                MetricKindDescriptor::Scale { max, .. } => {
                    format!("- {} ({} doses/day)", name, max)
                }
                other => format!("- {} ({})", name, other.type_label()),
            })
            .collect();
        self.prompter.say("\nCurrent Medications:")?;
        if listing.is_empty() {
            self.prompter.say("(none)")?;
        }
        for line in listing {
            self.prompter.say(line)?;
        }

        if !self.prompter.yes_no("\nAdd new medication?", Some(false))? {
            return Ok(());
        }
        self.prompter.say("\nAdd New Medication:")?;
        let name = loop {
            let name = self.prompter.ask("Medication name: ")?;
            let name = name.trim().to_string();
            if !name.is_empty() {
                break name;
            }
            self.prompter.say("Please enter a medication name.")?;
        };
        let doses = loop {
            let raw = self.prompter.ask("Doses per day: ")?;
            match raw.trim().parse::<u32>() {
                Ok(doses) if doses > 0 => break doses,
                _ => self.prompter.say("Please enter a positive number.")?,
            }
        };
        self.register(Registry::Medication, &name, MetricKindDescriptor::doses(doses), "Medication")
    }

    /// Registers a kind; a duplicate is reported and otherwise ignored.
    fn register(
        &mut self,
        registry: Registry,
        name: &str,
        descriptor: MetricKindDescriptor,
        noun: &str,
    ) -> Result<(), TrackerError> {
        match self.journal.register_kind(registry, name, descriptor) {
            Ok(()) => self.prompter.say(format!("{} '{}' added.", noun, name)),
            Err(PortError::AlreadyExists(what)) => {
                self.prompter.say(format!("Already exists: {}. Nothing changed.", what))
            }
            Err(PortError::Invalid(why)) => self.prompter.say(format!("Not added: {}.", why)),
            Err(e) => Err(e.into()),
        }
    }

    //=====================================================================================
    // Review
    //=====================================================================================

    fn show_day(&mut self, date: DateKey) -> Result<(), TrackerError> {
        if let Some(record) = self.journal.record(date)? {
            let entry = self.journal.diary_entry(date).unwrap_or_default();
            let text = render::day(self.journal.catalog(), date, &record, entry.as_deref());
            self.prompter.say(text)?;
        }
        Ok(())
    }

    fn view_diary(&mut self) -> Result<(), TrackerError> {
        let entries = self.journal.diary_entries()?;
        self.prompter.say(render::diary(&entries))
    }

    fn view_weekly(&mut self) -> Result<(), TrackerError> {
        let matrix = self.journal.weekly_matrix(self.today, self.summary_days);
        self.prompter.say(format!(
            "\nSummary for {} to {}:",
            matrix.dates.first().map(ToString::to_string).unwrap_or_default(),
            matrix.dates.last().map(ToString::to_string).unwrap_or_default()
        ))?;
        self.prompter.say(render::weekly(&matrix))
    }
}

fn numeric(unit: NumericUnit) -> MetricKindDescriptor {
    MetricKindDescriptor::Numeric { unit }
}
