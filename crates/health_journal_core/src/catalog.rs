//! crates/health_journal_core/src/catalog.rs
//!
//! The three open-ended registries of trackable kinds (exercises, time-based
//! activities, medications). A `Catalog` is an explicit value handed to the resolver
//! and the aggregator; it is loaded once through a `CatalogStore` and written back
//! immediately whenever a kind is registered.

use crate::domain::{MetricKindDescriptor, NumericUnit};
use crate::ports::{CatalogStore, KindMap, PortError, PortResult};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{info, warn};

/// Names one of the three registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Registry {
    Exercise,
    TimeActivity,
    Medication,
}

impl Registry {
    pub const ALL: [Registry; 3] = [
        Registry::Exercise,
        Registry::TimeActivity,
        Registry::Medication,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Registry::Exercise => "exercise",
            Registry::TimeActivity => "time-based activity",
            Registry::Medication => "medication",
        }
    }

    /// Checks that `descriptor` is a shape this registry can hold.
    pub fn validate(&self, descriptor: &MetricKindDescriptor) -> PortResult<()> {
        match (self, descriptor) {
            (Registry::Exercise, MetricKindDescriptor::Counted { .. }) => Ok(()),
            (Registry::TimeActivity, MetricKindDescriptor::Numeric { .. })
            | (Registry::TimeActivity, MetricKindDescriptor::Boolean) => Ok(()),
            (Registry::TimeActivity, MetricKindDescriptor::Scale { min, max }) => {
                if min < max {
                    Ok(())
                } else {
                    Err(PortError::Invalid(format!(
                        "scale minimum {} must be less than maximum {}",
                        min, max
                    )))
                }
            }
            (Registry::Medication, MetricKindDescriptor::Scale { min: 0, max }) if *max > 0 => {
                if *max <= i64::from(u32::MAX) {
                    Ok(())
                } else {
                    Err(PortError::Invalid(format!("{} doses per day is too many", max)))
                }
            }
            (Registry::Medication, MetricKindDescriptor::Scale { min: 0, .. }) => Err(
                PortError::Invalid("doses per day must be a positive number".to_string()),
            ),
            (registry, other) => Err(PortError::Invalid(format!(
                "a {} cannot be tracked as {}",
                registry.label(),
                other.type_label()
            ))),
        }
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const DEFAULT_EXERCISES: [&str; 6] = [
    "Scapula pull (3 secs)",
    "Shoulder Shrug (downward arm extension)",
    "Grip Rotation (500g)",
    "Thoracic ext w/ foam roller",
    "Wall Roller Shoulder Flexion",
    "Diagonal Cervical Neck Tilt (RHS)",
];

const DEFAULT_ACTIVITIES: [(&str, NumericUnit); 5] = [
    ("Driving", NumericUnit::Minutes),
    ("Guitar", NumericUnit::Minutes),
    ("Piano", NumericUnit::Minutes),
    ("Computer Training", NumericUnit::Minutes),
    ("Total Computer Use", NumericUnit::Hours),
];

/// The built-in kinds a registry is seeded with the first time it is used.
pub fn default_kinds(registry: Registry) -> KindMap {
    match registry {
        Registry::Exercise => DEFAULT_EXERCISES
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    MetricKindDescriptor::Counted { repeats: 10, sets: 1 },
                )
            })
            .collect(),
        Registry::TimeActivity => DEFAULT_ACTIVITIES
            .iter()
            .map(|(name, unit)| (name.to_string(), MetricKindDescriptor::Numeric { unit: *unit }))
            .collect(),
        Registry::Medication => KindMap::new(),
    }
}

//=========================================================================================
// Catalog
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    exercises: KindMap,
    activities: KindMap,
    medications: KindMap,
    /// Registries whose stored document could not be read; they hold the built-ins.
    unreadable: BTreeSet<Registry>,
}

impl Catalog {
    /// A catalog holding only the built-in kinds. Nothing is persisted.
    pub fn with_defaults() -> Self {
        Self {
            exercises: default_kinds(Registry::Exercise),
            activities: default_kinds(Registry::TimeActivity),
            medications: default_kinds(Registry::Medication),
            unreadable: BTreeSet::new(),
        }
    }

    /// Loads every registry from `store`, seeding and persisting the built-in
    /// kinds for any registry that has never been saved.
    ///
    /// A registry that cannot be read falls back to its built-ins in memory and is
    /// left untouched on disk; see [`Catalog::unreadable`].
    pub fn load(store: &dyn CatalogStore) -> Self {
        let mut catalog = Self::default();
        for registry in Registry::ALL {
            let kinds = match store.load_registry(registry) {
                Ok(Some(kinds)) => kinds,
                Ok(None) => {
                    let seeded = default_kinds(registry);
                    match store.save_registry(registry, &seeded) {
                        Ok(()) => info!(%registry, kinds = seeded.len(), "Seeded built-in kinds"),
                        Err(e) => warn!(%registry, error = %e, "Could not persist built-in kinds"),
                    }
                    seeded
                }
                Err(e) => {
                    warn!(%registry, error = %e, "Registry unreadable, using built-in kinds");
                    catalog.unreadable.insert(registry);
                    default_kinds(registry)
                }
            };
            *catalog.kinds_mut(registry) = kinds;
        }
        catalog
    }

    /// Registries that failed to load. Registering into one is refused so the
    /// stored document is never overwritten with the fallback.
    pub fn unreadable(&self) -> impl Iterator<Item = Registry> + '_ {
        self.unreadable.iter().copied()
    }

    pub fn get_all(&self, registry: Registry) -> &KindMap {
        match registry {
            Registry::Exercise => &self.exercises,
            Registry::TimeActivity => &self.activities,
            Registry::Medication => &self.medications,
        }
    }

    pub fn get(&self, registry: Registry, name: &str) -> Option<&MetricKindDescriptor> {
        self.get_all(registry).get(name)
    }

    /// Adds a kind and persists its registry before returning.
    ///
    /// A duplicate name is reported as `PortError::AlreadyExists` and changes nothing.
    /// The in-memory catalog only changes once the store accepted the write.
    pub fn register(
        &mut self,
        store: &dyn CatalogStore,
        registry: Registry,
        name: &str,
        descriptor: MetricKindDescriptor,
    ) -> PortResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PortError::Invalid(format!("{} name must not be blank", registry)));
        }
        if self.unreadable.contains(&registry) {
            return Err(PortError::Invalid(format!(
                "{} registry could not be read; repair it before adding kinds",
                registry
            )));
        }
        if self.get_all(registry).contains_key(name) {
            return Err(PortError::AlreadyExists(format!("{} '{}'", registry, name)));
        }
        registry.validate(&descriptor)?;

        let mut updated = self.get_all(registry).clone();
        updated.insert(name.to_string(), descriptor);
        store.save_registry(registry, &updated)?;
        *self.kinds_mut(registry) = updated;

        info!(%registry, kind_name = name, kind = descriptor.type_label(), "Registered new kind");
        Ok(())
    }

    fn kinds_mut(&mut self, registry: Registry) -> &mut KindMap {
        match registry {
            Registry::Exercise => &mut self.exercises,
            Registry::TimeActivity => &mut self.activities,
            Registry::Medication => &mut self.medications,
        }
    }
}
