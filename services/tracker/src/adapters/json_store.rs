//! services/tracker/src/adapters/json_store.rs
//!
//! This module contains the JSON file adapter, the concrete implementation of the
//! `CatalogStore`, `RecordRepository` and `DiaryStore` ports from the `core` crate.
//! Catalogs live in one file per registry, daily records in one file per date, and
//! the diary in a single date-keyed document.

use chrono::NaiveDate;
use health_journal_core::catalog::Registry;
use health_journal_core::domain::{
    DailyRecord, DateKey, ExerciseEntry, MetricKindDescriptor, NumericUnit,
};
use health_journal_core::ports::{
    CatalogStore, DiaryStore, KindMap, PortError, PortResult, RecordRepository,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const DIARY_FILE: &str = "diary_entries.json";
const DATE_FORMAT: &str = "%Y-%m-%d";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A file-backed adapter that implements every storage port.
#[derive(Clone, Debug)]
pub struct JsonStore {
    data_dir: PathBuf,
    catalog_dir: PathBuf,
}

impl JsonStore {
    /// Creates a new `JsonStore`. Nothing is touched on disk until first use.
    pub fn new(data_dir: impl Into<PathBuf>, catalog_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            catalog_dir: catalog_dir.into(),
        }
    }

    /// Creates the data and catalog directories when missing.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(&self.catalog_dir)
    }

    pub fn record_path(&self, date: DateKey) -> PathBuf {
        self.data_dir.join(format!("{}.json", date.format(DATE_FORMAT)))
    }

    pub fn diary_path(&self) -> PathBuf {
        self.data_dir.join(DIARY_FILE)
    }

    pub fn registry_path(&self, registry: Registry) -> PathBuf {
        let file = match registry {
            Registry::Exercise => "exercises.json",
            Registry::TimeActivity => "time_activities.json",
            Registry::Medication => "medications.json",
        };
        self.catalog_dir.join(file)
    }

    /// The diary document as stored, including keys that are not dates.
    fn load_raw_diary(&self) -> PortResult<BTreeMap<String, String>> {
        Ok(read_document(&self.diary_path())?.unwrap_or_default())
    }

    fn load_diary(&self) -> PortResult<BTreeMap<DateKey, String>> {
        let mut entries = BTreeMap::new();
        for (key, text) in self.load_raw_diary()? {
            match NaiveDate::parse_from_str(&key, DATE_FORMAT) {
                Ok(date) => {
                    entries.insert(date, text);
                }
                Err(_) => warn!(key = %key, "Ignoring diary entry with an invalid date key"),
            }
        }
        Ok(entries)
    }
}

//=========================================================================================
// File Helpers
//=========================================================================================

fn read_document<T: DeserializeOwned>(path: &Path) -> PortResult<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(PortError::Unexpected(format!(
                "failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| PortError::Corrupt {
            key: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Writes to a sibling temporary file and renames it over `path`, so readers only
/// ever see a complete document.
fn write_document<T: Serialize>(path: &Path, value: &T) -> PortResult<()> {
    let unexpected = |e: std::io::Error| {
        PortError::Unexpected(format!("failed to write {}: {}", path.display(), e))
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(unexpected)?;
    }
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, json).map_err(unexpected)?;
    fs::rename(&tmp, path).map_err(unexpected)?;

    debug!(path = %path.display(), "Wrote document");
    Ok(())
}

//=========================================================================================
// "Impure" Document Structs
//=========================================================================================

#[derive(Serialize, Deserialize)]
struct ExerciseKindDocument {
    repeats: u32,
    sets: u32,
}

#[derive(Serialize, Deserialize)]
struct ScaleRangeDocument {
    min: i64,
    max: i64,
}

#[derive(Serialize, Deserialize)]
struct ActivityKindDocument {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale_range: Option<ScaleRangeDocument>,
}

impl ActivityKindDocument {
    fn from_domain(descriptor: &MetricKindDescriptor) -> PortResult<Self> {
        let scale_range = match *descriptor {
            MetricKindDescriptor::Scale { min, max } => Some(ScaleRangeDocument { min, max }),
            MetricKindDescriptor::Counted { .. } => {
                return Err(PortError::Invalid(
                    "time-based activities cannot be counted".to_string(),
                ))
            }
            _ => None,
        };
        Ok(Self {
            kind: descriptor.type_label().to_string(),
            scale_range,
        })
    }

    fn to_domain(self, name: &str) -> PortResult<MetricKindDescriptor> {
        match self.kind.as_str() {
            "minutes" => Ok(MetricKindDescriptor::Numeric { unit: NumericUnit::Minutes }),
            "hours" => Ok(MetricKindDescriptor::Numeric { unit: NumericUnit::Hours }),
            "kilometers" => Ok(MetricKindDescriptor::Numeric { unit: NumericUnit::Kilometers }),
            "yes/no" => Ok(MetricKindDescriptor::Boolean),
            // A scale saved without a range reads as 0-10.
            "scale" => {
                let range = self.scale_range.unwrap_or(ScaleRangeDocument { min: 0, max: 10 });
                Ok(MetricKindDescriptor::Scale { min: range.min, max: range.max })
            }
            other => Err(PortError::Corrupt {
                key: name.to_string(),
                message: format!("unknown activity type '{}'", other),
            }),
        }
    }
}

type ActivityKindsDocument = BTreeMap<String, ActivityKindDocument>;

#[derive(Serialize, Deserialize)]
struct MedicationKindDocument {
    doses_per_day: u32,
}

/// `medications.json` is name-keyed; older files hold `{"medications": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum MedicationsDocument {
    Named(BTreeMap<String, MedicationKindDocument>),
    Listed { medications: Vec<ListedMedicationDocument> },
}

#[derive(Deserialize)]
struct ListedMedicationDocument {
    name: String,
    doses_per_day: u32,
}

impl MedicationsDocument {
    fn to_domain(self) -> KindMap {
        match self {
            MedicationsDocument::Named(docs) => docs
                .into_iter()
                .map(|(name, d)| (name, MetricKindDescriptor::doses(d.doses_per_day)))
                .collect(),
            MedicationsDocument::Listed { medications } => medications
                .into_iter()
                .map(|d| (d.name, MetricKindDescriptor::doses(d.doses_per_day)))
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ExerciseEntryDocument {
    repeats: u32,
    sets: u32,
}

#[derive(Serialize, Deserialize)]
struct DailyRecordDocument {
    #[serde(default, deserialize_with = "lenient_text")]
    mood: String,
    #[serde(default)]
    pain: u8,
    #[serde(default, deserialize_with = "lenient_flag")]
    meditation: bool,
    #[serde(default)]
    exercises: BTreeMap<String, ExerciseEntryDocument>,
    #[serde(default)]
    time_based: BTreeMap<String, f64>,
    #[serde(default)]
    medications: BTreeMap<String, u32>,
}

impl DailyRecordDocument {
    fn from_domain(record: &DailyRecord) -> Self {
        Self {
            mood: record.mood.clone(),
            pain: record.pain,
            meditation: record.meditation,
            exercises: record
                .exercises
                .iter()
                .map(|(name, e)| {
                    (
                        name.clone(),
                        ExerciseEntryDocument {
                            repeats: e.repeats,
                            sets: e.sets,
                        },
                    )
                })
                .collect(),
            time_based: record.time_based.clone(),
            medications: record.medications.clone(),
        }
    }

    fn to_domain(self) -> DailyRecord {
        DailyRecord {
            mood: self.mood,
            pain: self.pain,
            meditation: self.meditation,
            exercises: self
                .exercises
                .into_iter()
                .map(|(name, e)| {
                    (
                        name,
                        ExerciseEntry {
                            repeats: e.repeats,
                            sets: e.sets,
                        },
                    )
                })
                .collect(),
            time_based: self.time_based,
            medications: self.medications,
        }
    }
}

/// Older files hold `meditation` as 0/1.
fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(f64),
    }
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Number(n) => n != 0.0,
    })
}

/// Older files may hold a number where the mood text belongs.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Text(String),
        Number(serde_json::Number),
    }
    Ok(match Text::deserialize(deserializer)? {
        Text::Text(s) => s,
        Text::Number(n) => n.to_string(),
    })
}

//=========================================================================================
// Port Implementations
//=========================================================================================

impl CatalogStore for JsonStore {
    fn load_registry(&self, registry: Registry) -> PortResult<Option<KindMap>> {
        let path = self.registry_path(registry);
        let kinds: Option<KindMap> = match registry {
            Registry::Exercise => {
                let docs: Option<BTreeMap<String, ExerciseKindDocument>> = read_document(&path)?;
                docs.map(|docs| {
                    docs.into_iter()
                        .map(|(name, d)| {
                            let descriptor = MetricKindDescriptor::Counted {
                                repeats: d.repeats,
                                sets: d.sets,
                            };
                            (name, descriptor)
                        })
                        .collect()
                })
            }
            Registry::TimeActivity => match read_document::<ActivityKindsDocument>(&path)? {
                Some(docs) => Some(
                    docs.into_iter()
                        .map(|(name, d)| {
                            let descriptor = d.to_domain(&name)?;
                            Ok((name, descriptor))
                        })
                        .collect::<PortResult<KindMap>>()?,
                ),
                None => None,
            },
            Registry::Medication => {
                read_document::<MedicationsDocument>(&path)?.map(MedicationsDocument::to_domain)
            }
        };
        Ok(kinds)
    }

    fn save_registry(&self, registry: Registry, kinds: &KindMap) -> PortResult<()> {
        let path = self.registry_path(registry);
        match registry {
            Registry::Exercise => {
                let docs = kinds
                    .iter()
                    .map(|(name, descriptor)| match *descriptor {
                        MetricKindDescriptor::Counted { repeats, sets } => {
                            Ok((name.clone(), ExerciseKindDocument { repeats, sets }))
                        }
                        _ => Err(PortError::Invalid(format!(
                            "exercise '{}' must be counted",
                            name
                        ))),
                    })
                    .collect::<PortResult<BTreeMap<_, _>>>()?;
                write_document(&path, &docs)
            }
            Registry::TimeActivity => {
                let docs = kinds
                    .iter()
                    .map(|(name, descriptor)| {
                        Ok((name.clone(), ActivityKindDocument::from_domain(descriptor)?))
                    })
                    .collect::<PortResult<BTreeMap<_, _>>>()?;
                write_document(&path, &docs)
            }
            Registry::Medication => {
                let docs = kinds
                    .iter()
                    .map(|(name, descriptor)| match *descriptor {
                        MetricKindDescriptor::Scale { min: 0, max } if max > 0 => Ok((
                            name.clone(),
                            MedicationKindDocument {
                                doses_per_day: u32::try_from(max)
                                    .map_err(|e| PortError::Invalid(e.to_string()))?,
                            },
                        )),
                        _ => Err(PortError::Invalid(format!(
                            "medication '{}' must have a positive dose count",
                            name
                        ))),
                    })
                    .collect::<PortResult<BTreeMap<_, _>>>()?;
                write_document(&path, &docs)
            }
        }
    }
}

impl RecordRepository for JsonStore {
    fn get(&self, date: DateKey) -> PortResult<Option<DailyRecord>> {
        let document: Option<DailyRecordDocument> = read_document(&self.record_path(date))?;
        Ok(document.map(DailyRecordDocument::to_domain))
    }

    fn put(&self, date: DateKey, record: &DailyRecord) -> PortResult<()> {
        write_document(&self.record_path(date), &DailyRecordDocument::from_domain(record))
    }

    fn dates(&self) -> PortResult<Vec<DateKey>> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PortError::Unexpected(e.to_string())),
        };
        let mut dates: Vec<DateKey> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let stem = name.strip_suffix(".json")?;
                NaiveDate::parse_from_str(stem, DATE_FORMAT).ok()
            })
            .collect();
        dates.sort();
        Ok(dates)
    }
}

impl DiaryStore for JsonStore {
    fn get(&self, date: DateKey) -> PortResult<Option<String>> {
        Ok(self.load_diary()?.remove(&date))
    }

    fn put(&self, date: DateKey, text: &str) -> PortResult<()> {
        // Keys that are not dates are carried over untouched.
        let mut raw = self.load_raw_diary()?;
        raw.retain(|key, _| {
            NaiveDate::parse_from_str(key, DATE_FORMAT).map_or(true, |d| d != date)
        });
        raw.insert(date.format(DATE_FORMAT).to_string(), text.to_string());
        write_document(&self.diary_path(), &raw)
    }

    fn get_all(&self) -> PortResult<BTreeMap<DateKey, String>> {
        self.load_diary()
    }
}
