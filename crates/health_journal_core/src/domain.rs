//! crates/health_journal_core/src/domain.rs
//!
//! Defines the pure, core data structures for the journal.
//! These types are independent of any storage location or serialization format.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

/// Every record, diary entry and weekly column is keyed by a calendar date.
pub type DateKey = NaiveDate;

//=========================================================================================
// Metric Kind Descriptors
//=========================================================================================

/// Unit carried by an open-ended numeric activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericUnit {
    Minutes,
    Hours,
    Kilometers,
}

impl NumericUnit {
    pub fn label(&self) -> &'static str {
        match self {
            NumericUnit::Minutes => "minutes",
            NumericUnit::Hours => "hours",
            NumericUnit::Kilometers => "kilometers",
        }
    }
}

impl fmt::Display for NumericUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The type contract of a catalog-registered kind.
///
/// A descriptor decides how raw input is validated, which default applies when the
/// input is blank, and how a stored value is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKindDescriptor {
    /// An exercise: the pair is the default used when nothing was entered before.
    Counted { repeats: u32, sets: u32 },
    /// A non-negative real amount with no upper bound.
    Numeric { unit: NumericUnit },
    /// Yes/no, stored as 0/1.
    Boolean,
    /// A bounded integer, `min..=max`.
    Scale { min: i64, max: i64 },
}

impl MetricKindDescriptor {
    /// The descriptor a medication kind resolves through: `0..=per_day` doses.
    pub fn doses(per_day: u32) -> Self {
        MetricKindDescriptor::Scale {
            min: 0,
            max: i64::from(per_day),
        }
    }

    /// Short label shown next to prompts and used as the persisted `type` name.
    pub fn type_label(&self) -> &'static str {
        match self {
            MetricKindDescriptor::Counted { .. } => "repeats sets",
            MetricKindDescriptor::Numeric { unit } => unit.label(),
            MetricKindDescriptor::Boolean => "yes/no",
            MetricKindDescriptor::Scale { .. } => "scale",
        }
    }

    /// Formats a stored time-based value according to this descriptor.
    pub fn format_activity_value(&self, value: f64) -> String {
        match self {
            MetricKindDescriptor::Numeric { unit } => format!("{} {}", value, unit),
            MetricKindDescriptor::Boolean => {
                if value != 0.0 {
                    "Yes".to_string()
                } else {
                    "No".to_string()
                }
            }
            MetricKindDescriptor::Scale { max, .. } => format!("{}/{}", value.round() as i64, max),
            MetricKindDescriptor::Counted { .. } => value.to_string(),
        }
    }
}

//=========================================================================================
// Resolved Field Values
//=========================================================================================

/// A validated value produced by the field resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Counted { repeats: u32, sets: u32 },
    Number(f64),
    Flag(bool),
    Level(i64),
}

impl FieldValue {
    /// The number a time-based activity stores for this value.
    /// Counted values have no time-based representation.
    pub fn to_activity_value(&self) -> Option<f64> {
        match *self {
            FieldValue::Number(n) => Some(n),
            FieldValue::Flag(b) => Some(if b { 1.0 } else { 0.0 }),
            FieldValue::Level(l) => Some(l as f64),
            FieldValue::Counted { .. } => None,
        }
    }

    /// Reinterprets a stored time-based number under `descriptor`.
    pub fn from_activity_value(descriptor: &MetricKindDescriptor, value: f64) -> Self {
        match descriptor {
            MetricKindDescriptor::Boolean => FieldValue::Flag(value != 0.0),
            MetricKindDescriptor::Scale { .. } => FieldValue::Level(value.round() as i64),
            _ => FieldValue::Number(value),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Counted { repeats, sets } => write!(f, "{} {}", repeats, sets),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Flag(true) => f.write_str("yes"),
            FieldValue::Flag(false) => f.write_str("no"),
            FieldValue::Level(l) => write!(f, "{}", l),
        }
    }
}

//=========================================================================================
// Daily Record
//=========================================================================================

/// Repeats and sets performed for one exercise on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExerciseEntry {
    pub repeats: u32,
    pub sets: u32,
}

/// Everything tracked for a single calendar date.
///
/// The diary entry for the same date lives in the diary store, not here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailyRecord {
    pub mood: String,
    pub pain: u8,
    pub meditation: bool,
    pub exercises: BTreeMap<String, ExerciseEntry>,
    /// Time-based activities; booleans are 0/1 and scales are whole numbers.
    pub time_based: BTreeMap<String, f64>,
    pub medications: BTreeMap<String, u32>,
}

//=========================================================================================
// Pain Scale
//=========================================================================================

pub const PAIN_MAX: u8 = 10;

const PAIN_SCALE: [&str; 11] = [
    "No pain",
    "Very mild burning or tingling, fades quickly",
    "Mild burning, goes away within an hour",
    "Noticeable burning in fingers, nerve warning sensation",
    "Moderate burning, may last several hours",
    "Strong burning, forearms mildly aching",
    "Persistent burning, nerve irritation ongoing",
    "Severe burning in fingers and cubital tunnels, sensitive forearms",
    "Very severe burning, painful, causes nervousness and worry",
    "Extreme burning, panic, anger, distress, difficulty coping",
    "Worst possible pain, overwhelming distress, persistent next day",
];

/// Description of a neuropathic pain level, `None` above the scale.
pub fn pain_description(level: u8) -> Option<&'static str> {
    PAIN_SCALE.get(usize::from(level)).copied()
}

/// `"7 - Severe burning ..."`; a level off the scale renders as the bare number.
pub fn format_pain(level: u8) -> String {
    match pain_description(level) {
        Some(text) => format!("{} - {}", level, text),
        None => level.to_string(),
    }
}
