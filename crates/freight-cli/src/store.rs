//! # Shipment State Files
//!
//! One pretty-printed JSON file per shipment, named `<uuid>.json`, inside the
//! configured state directory. File names are derived from parsed
//! [`ShipmentId`]s only, so user input never reaches the filesystem path.
//!
//! ## Concurrent writers
//!
//! [`ShipmentStore::update`] holds an exclusive `fd-lock` on `<uuid>.lock`
//! across load, mutate and write, so concurrent `freight` processes touching
//! the same shipment serialize instead of overwriting each other.
//! [`ShipmentStore::replace`] refuses to write unless the file still holds
//! the state the caller read, and fails with [`FreightError::Conflict`]
//! otherwise. Writes go to a temporary sibling and are renamed into place.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use fd_lock::RwLock;

use freight_core::{FreightError, ShipmentId};
use freight_workflow::Shipment;

/// File-backed shipment store.
#[derive(Debug, Clone)]
pub struct ShipmentStore {
    dir: PathBuf,
}

impl ShipmentStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The state directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &ShipmentId) -> PathBuf {
        self.dir.join(format!("{}.json", id.key()))
    }

    fn lock_path_for(&self, id: &ShipmentId) -> PathBuf {
        self.dir.join(format!("{}.lock", id.key()))
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(FreightError::from)
            .with_context(|| format!("failed to create state directory: {}", self.dir.display()))
    }

    /// Persist a new shipment. Fails if one with the same id exists.
    pub fn insert(&self, shipment: &Shipment) -> Result<()> {
        self.ensure_dir()?;
        let path = self.path_for(&shipment.id);
        let file = OpenOptions::new().write(true).create_new(true).open(&path);
        match file {
            Ok(file) => {
                drop(file);
                self.write(shipment)
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                bail!("shipment already exists: {}", shipment.id)
            }
            Err(e) => Err(FreightError::from(e))
                .with_context(|| format!("failed to create {}", path.display())),
        }
    }

    /// Load a shipment by id.
    pub fn load(&self, id: &ShipmentId) -> Result<Shipment> {
        let path = self.path_for(id);
        if !path.exists() {
            bail!("shipment not found: {id}");
        }
        let content = std::fs::read_to_string(&path)
            .map_err(FreightError::from)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .map_err(FreightError::from)
            .with_context(|| format!("corrupt shipment state file: {}", path.display()))
    }

    /// Overwrite `expected` with `updated`.
    ///
    /// Fails with [`FreightError::Conflict`] if the file no longer holds
    /// `expected`, leaving the newer state on disk untouched.
    pub fn replace(&self, expected: &Shipment, updated: &Shipment) -> Result<()> {
        let current = self.load(&updated.id)?;
        if current != *expected {
            tracing::warn!(
                shipment = %updated.id,
                on_disk = %current.status,
                on_disk_transitions = current.transitions.len(),
                "refusing to overwrite concurrently modified shipment"
            );
            return Err(FreightError::Conflict(format!(
                "{} was modified since it was read (now at {}, {} transitions)",
                updated.id,
                current.status,
                current.transitions.len()
            ))
            .into());
        }
        self.write(updated)
    }

    /// Load, mutate, and save a shipment under its exclusive lock.
    ///
    /// The state file is rewritten only if `mutate` changed the shipment.
    /// An error from `mutate` aborts without writing.
    pub fn update<T, F>(&self, id: &ShipmentId, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut Shipment) -> Result<T, FreightError>,
    {
        if !self.path_for(id).exists() {
            bail!("shipment not found: {id}");
        }
        let mut lock = RwLock::new(self.open_lock_file(id)?);
        let _guard = lock
            .write()
            .map_err(FreightError::from)
            .with_context(|| format!("failed to lock shipment {id}"))?;

        let original = self.load(id)?;
        let mut shipment = original.clone();
        let outcome = mutate(&mut shipment)?;
        if shipment != original {
            self.replace(&original, &shipment)?;
        }
        Ok(outcome)
    }

    fn open_lock_file(&self, id: &ShipmentId) -> Result<File> {
        self.ensure_dir()?;
        let path = self.lock_path_for(id);
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(FreightError::from)
            .with_context(|| format!("failed to open lock file {}", path.display()))
    }

    fn write(&self, shipment: &Shipment) -> Result<()> {
        self.ensure_dir()?;
        let path = self.path_for(&shipment.id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(shipment).map_err(FreightError::from)?;
        std::fs::write(&tmp, json)
            .map_err(FreightError::from)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .map_err(FreightError::from)
            .with_context(|| format!("failed to replace {}", path.display()))
    }

    /// All readable shipments, ordered by creation time.
    ///
    /// Unreadable or corrupt files are skipped with a warning.
    pub fn list(&self) -> Result<Vec<Shipment>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut shipments = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(FreightError::from)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(
                        dir = %self.dir.display(),
                        error = %e,
                        "failed to read directory entry while listing shipments"
                    );
                    continue;
                }
            };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = std::fs::read_to_string(&path)
                .map_err(FreightError::from)
                .and_then(|c| serde_json::from_str::<Shipment>(&c).map_err(FreightError::from));
            match parsed {
                Ok(s) => shipments.push(s),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "skipping unreadable shipment state file"
                    );
                }
            }
        }
        shipments.sort_by_key(|s| (s.created_at, s.id));
        Ok(shipments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freight_workflow::{DocumentType, ShipmentStatus};

    #[test]
    fn test_insert_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ShipmentStore::new(dir.path().join("shipments"));
        let shipment = Shipment::new("BL-001");
        store.insert(&shipment).unwrap();

        let loaded = store.load(&shipment.id).unwrap();
        assert_eq!(loaded, shipment);
        assert_eq!(loaded.status, ShipmentStatus::ColetaCotacaoSolicitada);
    }

    #[test]
    fn test_insert_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = ShipmentStore::new(dir.path());
        let shipment = Shipment::new("BL-002");
        store.insert(&shipment).unwrap();
        let err = store.insert(&shipment).unwrap_err();
        assert!(err.to_string().starts_with("shipment already exists"));
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ShipmentStore::new(dir.path());
        let err = store.load(&ShipmentId::new()).unwrap_err();
        assert!(err.to_string().starts_with("shipment not found"));
    }

    #[test]
    fn test_load_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ShipmentStore::new(dir.path());
        let id = ShipmentId::new();
        std::fs::write(dir.path().join(format!("{}.json", id.key())), "{not json").unwrap();

        let err = store.load(&id).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FreightError>(),
            Some(FreightError::Serialization(_))
        ));
    }

    #[test]
    fn test_replace_with_current_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = ShipmentStore::new(dir.path());
        let original = Shipment::new("BL-003");
        store.insert(&original).unwrap();

        let mut shipment = original.clone();
        shipment.advance("fatura").unwrap();
        store.replace(&original, &shipment).unwrap();
        assert_eq!(
            store.load(&shipment.id).unwrap().status,
            ShipmentStatus::ColetaFaturaRecebida
        );
    }

    #[test]
    fn test_replace_from_stale_copy_is_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let store = ShipmentStore::new(dir.path());
        let created = Shipment::new("BL-004");
        store.insert(&created).unwrap();

        // Two commands read the same state.
        let read_a = store.load(&created.id).unwrap();
        let read_b = store.load(&created.id).unwrap();

        let mut advanced = read_a.clone();
        advanced.advance("fatura").unwrap();
        store.replace(&read_a, &advanced).unwrap();

        let mut attached = read_b.clone();
        attached.attach_document(DocumentType::BlOriginal);
        let err = store.replace(&read_b, &attached).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FreightError>(),
            Some(FreightError::Conflict(_))
        ));

        let on_disk = store.load(&created.id).unwrap();
        assert_eq!(on_disk.status, ShipmentStatus::ColetaFaturaRecebida);
        assert_eq!(on_disk.transitions.len(), 1);
        assert!(on_disk.documents.is_empty());
    }

    #[test]
    fn test_update_writes_only_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let store = ShipmentStore::new(dir.path());
        let shipment = Shipment::new("BL-005");
        store.insert(&shipment).unwrap();

        let attached = store
            .update(&shipment.id, |s| Ok(s.attach_document(DocumentType::BlOriginal)))
            .unwrap();
        assert!(attached);

        let again = store
            .update(&shipment.id, |s| Ok(s.attach_document(DocumentType::BlOriginal)))
            .unwrap();
        assert!(!again);
        assert_eq!(store.load(&shipment.id).unwrap().documents.len(), 1);
    }

    #[test]
    fn test_update_error_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = ShipmentStore::new(dir.path());
        let shipment = Shipment::new("BL-006");
        store.insert(&shipment).unwrap();

        let result: Result<()> = store.update(&shipment.id, |s| {
            s.attach_document(DocumentType::Pod);
            Err(FreightError::Validation("rejected".into()))
        });
        assert!(result.is_err());
        assert!(store.load(&shipment.id).unwrap().documents.is_empty());
    }

    #[test]
    fn test_update_missing_shipment() {
        let dir = tempfile::tempdir().unwrap();
        let store = ShipmentStore::new(dir.path());
        let err = store.update(&ShipmentId::new(), |_| Ok(())).unwrap_err();
        assert!(err.to_string().starts_with("shipment not found"));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = ShipmentStore::new(dir.path());
        let mut shipment = Shipment::new("BL-007");
        for doc in freight_workflow::Phase::Coleta.required_document_list() {
            shipment.attach_document(*doc);
        }
        store.insert(&shipment).unwrap();
        let id = shipment.id;

        let advancing = {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..4 {
                    store.update(&id, |s| Ok(s.advance("step").is_ok())).unwrap();
                }
            })
        };
        let attaching = {
            let store = store.clone();
            std::thread::spawn(move || {
                for doc in [
                    DocumentType::BlCarimbado,
                    DocumentType::PackingList,
                    DocumentType::FaturaComercial,
                ] {
                    store.update(&id, |s| Ok(s.attach_document(doc))).unwrap();
                }
            })
        };
        advancing.join().unwrap();
        attaching.join().unwrap();

        let on_disk = store.load(&id).unwrap();
        assert_eq!(on_disk.status, ShipmentStatus::ColetaConcluida);
        assert_eq!(on_disk.transitions.len(), 4);
        assert_eq!(on_disk.documents.len(), 8);
    }

    #[test]
    fn test_list_skips_corrupt_and_lock_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ShipmentStore::new(dir.path());
        let a = Shipment::new("A");
        store.insert(&a).unwrap();
        store.insert(&Shipment::new("B")).unwrap();
        store.update(&a.id, |s| Ok(s.advance("step").is_ok())).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ShipmentStore::new(dir.path().join("absent"));
        assert!(store.list().unwrap().is_empty());
    }
}
