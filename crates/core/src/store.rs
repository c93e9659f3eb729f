//! Facility storage
//!
//! [`FacilityStore`] is the storage collaborator the analyzer reads
//! candidates from. Every read, update and delete takes a [`Scope`]:
//! an owner-scoped caller sees its own facilities plus the shared
//! (unowned) ones, and can only modify its own. Facilities outside the
//! scope are reported as not found.
//!
//! [`MemoryStore`] is the reference implementation: an id-ordered table
//! behind a `RwLock`, persisted as a JSON array snapshot.
//!
//! # Example
//!
//! ```rust
//! use urbancover_core::store::{FacilityStore, MemoryStore, Scope};
//! use urbancover_coverage::{NewFacility, OwnerTag};
//!
//! let store = MemoryStore::new();
//! let alice = Scope::Owner(OwnerTag::new("alice"));
//!
//! let clinic = store.insert(&alice, NewFacility::point("Clinic", "hospital", 12.97, 77.59))?;
//! assert_eq!(clinic.owner, Some(OwnerTag::new("alice")));
//!
//! let bob = Scope::Owner(OwnerTag::new("bob"));
//! assert!(store.get(&bob, clinic.id).is_err());
//! # Ok::<(), urbancover_core::Error>(())
//! ```

use crate::error::{Error, ErrorCode, Result, ResultExt};
use crate::validation::{validate_new_facility, validate_update};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use urbancover_coverage::{category_key, Facility, FacilityId, FacilityUpdate, NewFacility, OwnerTag};

/// Visibility of a caller over the facility table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    /// Unrestricted access
    #[default]
    All,
    /// Own facilities plus shared ones for reads, own facilities for writes
    Owner(OwnerTag),
}

impl Scope {
    /// Owner tag of the caller, if scoped
    pub fn owner(&self) -> Option<&OwnerTag> {
        match self {
            Self::All => None,
            Self::Owner(tag) => Some(tag),
        }
    }

    /// True if the facility is visible to this scope
    pub fn can_read(&self, facility: &Facility) -> bool {
        match self {
            Self::All => true,
            Self::Owner(tag) => facility.owner.as_ref().is_none_or(|owner| owner == tag),
        }
    }

    /// True if this scope may update or delete the facility
    pub fn can_write(&self, facility: &Facility) -> bool {
        match self {
            Self::All => true,
            Self::Owner(tag) => facility.owner.as_ref() == Some(tag),
        }
    }
}

/// A record refused during import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRecord {
    /// Position of the record in the submitted batch
    pub index: usize,
    pub reason: String,
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Facilities created, in submission order
    pub added: Vec<FacilityId>,
    /// Records skipped because an identical facility already exists
    pub duplicates: usize,
    pub rejected: Vec<RejectedRecord>,
}

impl ImportSummary {
    /// Number of records examined
    pub fn total(&self) -> usize {
        self.added.len() + self.duplicates + self.rejected.len()
    }
}

/// Identity used for import deduplication: category plus effective point
type DedupeKey = (String, u64, u64);

fn dedupe_key(category: &str, geometry: &urbancover_geo::Geometry) -> Option<DedupeKey> {
    geometry
        .effective_point()
        .map(|p| (category_key(category), p.latitude.to_bits(), p.longitude.to_bits()))
}

/// Storage collaborator for facilities
pub trait FacilityStore: Send + Sync {
    /// Validate and store a facility. An owner scope stamps its tag.
    fn insert(&self, scope: &Scope, facility: NewFacility) -> Result<Facility>;

    /// Fetch one facility visible to the scope
    fn get(&self, scope: &Scope, id: FacilityId) -> Result<Facility>;

    /// Overwrite fields of a facility the scope owns
    fn update(&self, scope: &Scope, id: FacilityId, update: FacilityUpdate) -> Result<Facility>;

    /// Remove a facility the scope owns, returning it
    fn delete(&self, scope: &Scope, id: FacilityId) -> Result<Facility>;

    /// Every facility visible to the scope, in id order
    fn list(&self, scope: &Scope) -> Result<Vec<Facility>>;

    /// Bulk insert. Invalid records are rejected one by one; with `dedupe`
    /// records matching a visible facility (same category and effective
    /// point) or an earlier record of the batch are skipped.
    fn import(&self, scope: &Scope, records: Vec<NewFacility>, dedupe: bool) -> Result<ImportSummary> {
        self.import_with_progress(scope, records, dedupe, &mut || {})
    }

    /// [`import`](Self::import) calling `progress` once per record processed
    fn import_with_progress(
        &self,
        scope: &Scope,
        records: Vec<NewFacility>,
        dedupe: bool,
        progress: &mut dyn FnMut(),
    ) -> Result<ImportSummary> {
        let mut seen: HashSet<DedupeKey> = if dedupe {
            self.list(scope)?
                .iter()
                .filter_map(|f| dedupe_key(&f.category, &f.geometry))
                .collect()
        } else {
            HashSet::new()
        };

        let mut summary = ImportSummary::default();
        for (index, record) in records.into_iter().enumerate() {
            progress();

            if let Err(err) = validate_new_facility(&record).to_result() {
                summary.rejected.push(RejectedRecord {
                    index,
                    reason: err.message,
                });
                continue;
            }

            if dedupe {
                if let Some(key) = dedupe_key(&record.category, &record.geometry) {
                    if !seen.insert(key) {
                        summary.duplicates += 1;
                        continue;
                    }
                }
            }

            summary.added.push(self.insert(scope, record)?.id);
        }

        tracing::info!(
            added = summary.added.len(),
            duplicates = summary.duplicates,
            rejected = summary.rejected.len(),
            "Import finished"
        );
        Ok(summary)
    }
}

/// In-memory facility table with JSON snapshots
#[derive(Debug)]
pub struct MemoryStore {
    facilities: RwLock<BTreeMap<FacilityId, Facility>>,
    next_id: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store; ids start at 1
    pub fn new() -> Self {
        Self {
            facilities: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Store seeded with existing facilities. Ids must be unique.
    pub fn from_facilities(facilities: impl IntoIterator<Item = Facility>) -> Result<Self> {
        let mut table = BTreeMap::new();
        for facility in facilities {
            let id = facility.id;
            if table.insert(id, facility).is_some() {
                return Err(Error::new(
                    ErrorCode::SnapshotCorrupt,
                    format!("Duplicate facility id {}", id),
                ));
            }
        }
        let next = table.keys().next_back().map_or(1, |id| id.0 + 1);
        Ok(Self {
            facilities: RwLock::new(table),
            next_id: AtomicU64::new(next),
        })
    }

    /// Load a snapshot written by [`save_json`](Self::save_json).
    /// A missing file yields an empty store.
    pub fn load_json(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "No snapshot found, starting empty");
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let facilities: Vec<Facility> = serde_json::from_str(&content).map_err(|e| {
            Error::new(ErrorCode::SnapshotCorrupt, format!("Unreadable facility snapshot: {}", e))
                .with_context(format!("In {}", path.display()))
                .with_suggestion("Restore the file from a backup or remove it to start empty")
                .with_source(e)
        })?;

        let store = Self::from_facilities(facilities).context(format!("In {}", path.display()))?;
        tracing::debug!(path = %path.display(), count = store.len(), "Snapshot loaded");
        Ok(store)
    }

    /// Write the whole table as a JSON array, replacing the file atomically.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = {
            let guard = self.facilities.read().map_err(|_| Error::lock_poisoned())?;
            let facilities: Vec<&Facility> = guard.values().collect();
            serde_json::to_string_pretty(&facilities)
                .map_err(|e| Error::storage(format!("Failed to serialize snapshot: {}", e)).with_source(e))?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;

        tracing::debug!(path = %path.display(), "Snapshot saved");
        Ok(())
    }

    /// Number of stored facilities regardless of scope
    pub fn len(&self) -> usize {
        self.facilities.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// True if no facility is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FacilityStore for MemoryStore {
    fn insert(&self, scope: &Scope, mut facility: NewFacility) -> Result<Facility> {
        if let Some(tag) = scope.owner() {
            facility.owner = Some(tag.clone());
        }
        validate_new_facility(&facility).to_result()?;

        let id = FacilityId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let facility = Facility::from_new(id, facility);

        let mut guard = self.facilities.write().map_err(|_| Error::lock_poisoned())?;
        guard.insert(id, facility.clone());

        tracing::info!(%id, category = %facility.category, "Facility added");
        Ok(facility)
    }

    fn get(&self, scope: &Scope, id: FacilityId) -> Result<Facility> {
        let guard = self.facilities.read().map_err(|_| Error::lock_poisoned())?;
        guard
            .get(&id)
            .filter(|f| scope.can_read(f))
            .cloned()
            .ok_or_else(|| Error::facility_not_found(id))
    }

    fn update(&self, scope: &Scope, id: FacilityId, update: FacilityUpdate) -> Result<Facility> {
        validate_update(&update).to_result()?;

        let mut guard = self.facilities.write().map_err(|_| Error::lock_poisoned())?;
        let facility = guard
            .get_mut(&id)
            .filter(|f| scope.can_write(f))
            .ok_or_else(|| Error::facility_not_found(id))?;
        update.apply(facility);

        tracing::info!(%id, "Facility updated");
        Ok(facility.clone())
    }

    fn delete(&self, scope: &Scope, id: FacilityId) -> Result<Facility> {
        let mut guard = self.facilities.write().map_err(|_| Error::lock_poisoned())?;
        if !guard.get(&id).is_some_and(|f| scope.can_write(f)) {
            return Err(Error::facility_not_found(id));
        }
        let removed = guard.remove(&id).ok_or_else(|| Error::facility_not_found(id))?;

        tracing::info!(%id, "Facility removed");
        Ok(removed)
    }

    fn list(&self, scope: &Scope) -> Result<Vec<Facility>> {
        let guard = self.facilities.read().map_err(|_| Error::lock_poisoned())?;
        Ok(guard.values().filter(|f| scope.can_read(f)).cloned().collect())
    }
}
