//! Media library persistence.
//!
//! A [`Library`] is a directory-backed store of managed images. Each
//! resource has an integer id, a source file, and a durable metadata record.
//! Content is namespaced per id — derived names carry no resource identity,
//! so two resources with the same net edit state (or the same imported
//! basename) must never share a path:
//!
//! ```text
//! <root>/
//! ├── meta/
//! │   ├── 1.json              # flat EditMeta record + source filename
//! │   └── 2.json
//! └── files/
//!     ├── 1/
//!     │   ├── dawn.jpg        # imported source, never overwritten
//!     │   └── rotate-90.jpg   # edited variants, addressed by derived name
//!     └── 2/
//!         └── dusk.jpg
//! ```
//!
//! Records are pretty-printed JSON, written via a temp file in the same
//! directory followed by a rename, so a crashed write never leaves a
//! half-written record behind. Variants are staged the same way by the
//! pipeline before the record is rewritten.

use crate::meta::EditMeta;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("resource {0} not found")]
    NotFound(u64),
    #[error("not an importable image file: {0}")]
    NotImportable(PathBuf),
}

/// Persisted state of one managed resource: which file it currently points
/// at, plus the flat edit metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Filename (within `files/`) of the resource's current content.
    pub source_file: String,
    #[serde(flatten)]
    pub meta: EditMeta,
}

/// Directory-backed media library.
#[derive(Debug, Clone)]
pub struct Library {
    root: PathBuf,
}

impl Library {
    /// Open an existing library rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the library directory layout (idempotent) and open it.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let library = Self::open(root);
        std::fs::create_dir_all(library.meta_dir())?;
        std::fs::create_dir_all(library.files_dir())?;
        Ok(library)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files_dir(&self) -> PathBuf {
        self.root.join("files")
    }

    /// Directory holding one resource's content files (the imported source
    /// and all its variants).
    pub fn resource_dir(&self, id: u64) -> PathBuf {
        self.files_dir().join(id.to_string())
    }

    fn meta_dir(&self) -> PathBuf {
        self.root.join("meta")
    }

    fn record_path(&self, id: u64) -> PathBuf {
        self.meta_dir().join(format!("{id}.json"))
    }

    /// Bring a file under library management: copy it into the resource's
    /// own directory under `files/` and create an identity metadata record.
    /// Returns the new id.
    pub fn import(&self, source: &Path) -> Result<(u64, ResourceRecord), StoreError> {
        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StoreError::NotImportable(source.to_path_buf()))?;
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| StoreError::NotImportable(source.to_path_buf()))?;
        if !source.is_file() {
            return Err(StoreError::NotImportable(source.to_path_buf()));
        }

        std::fs::create_dir_all(self.meta_dir())?;
        let id = self.claim_next_id()?;
        let dir = self.resource_dir(id);
        std::fs::create_dir_all(&dir)?;
        std::fs::copy(source, dir.join(file_name))?;

        let record = ResourceRecord {
            source_file: file_name.to_string(),
            meta: EditMeta::for_source(stem),
        };
        self.save_record(id, &record)?;
        Ok((id, record))
    }

    /// Load a resource's record. `NotFound` if the id has no record.
    pub fn load_record(&self, id: u64) -> Result<ResourceRecord, StoreError> {
        let path = self.record_path(id);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    /// Persist a resource's record via temp file + rename.
    pub fn save_record(&self, id: u64, record: &ResourceRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(record)?;
        let path = self.record_path(id);
        let staging = self.meta_dir().join(format!(".{id}.json.tmp"));
        std::fs::write(&staging, json)?;
        std::fs::rename(&staging, &path)?;
        Ok(())
    }

    /// Path of the resource's current content file.
    pub fn source_path(&self, id: u64, record: &ResourceRecord) -> PathBuf {
        self.resource_dir(id).join(&record.source_file)
    }

    /// Filename a variant of this resource gets: the derived name plus the
    /// source file's extension.
    pub fn variant_file_name(&self, record: &ResourceRecord, derived: &str) -> String {
        match Path::new(&record.source_file)
            .extension()
            .and_then(|e| e.to_str())
        {
            Some(ext) => format!("{derived}.{ext}"),
            None => derived.to_string(),
        }
    }

    /// All resource ids, ascending.
    pub fn list_ids(&self) -> Result<Vec<u64>, StoreError> {
        let mut ids = Vec::new();
        let entries = match std::fs::read_dir(self.meta_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(stem) = Path::new(&name).file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Ok(id) = stem.parse::<u64>() {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Mint the next id by reserving its record file with `create_new`.
    /// Two concurrent imports racing for the same id see exactly one
    /// `create_new` succeed; the loser re-reads and takes the next one. The
    /// reserved (empty) file is overwritten by `save_record` before
    /// `import` returns.
    fn claim_next_id(&self) -> Result<u64, StoreError> {
        loop {
            let id = self.list_ids()?.last().copied().unwrap_or(0) + 1;
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.record_path(id))
            {
                Ok(_) => return Ok(id),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn library_with_image(tmp: &TempDir, name: &str) -> (Library, u64) {
        let library = Library::init(tmp.path().join("lib")).unwrap();
        let source = tmp.path().join(name);
        fs::write(&source, b"fake image bytes").unwrap();
        let (id, _) = library.import(&source).unwrap();
        (library, id)
    }

    #[test]
    fn import_copies_file_and_creates_identity_record() {
        let tmp = TempDir::new().unwrap();
        let (library, id) = library_with_image(&tmp, "dawn.jpg");

        assert_eq!(id, 1);
        let record = library.load_record(id).unwrap();
        assert_eq!(record.source_file, "dawn.jpg");
        assert_eq!(record.meta, EditMeta::for_source("dawn"));
        assert!(library.source_path(id, &record).exists());
    }

    #[test]
    fn ids_are_sequential() {
        let tmp = TempDir::new().unwrap();
        let library = Library::init(tmp.path().join("lib")).unwrap();
        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            let source = tmp.path().join(name);
            fs::write(&source, b"x").unwrap();
            library.import(&source).unwrap();
        }
        assert_eq!(library.list_ids().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_basenames_do_not_collide() {
        let tmp = TempDir::new().unwrap();
        let library = Library::init(tmp.path().join("lib")).unwrap();
        let first = tmp.path().join("one").join("dawn.jpg");
        let second = tmp.path().join("two").join("dawn.jpg");
        for (path, bytes) in [(&first, &b"first bytes"[..]), (&second, &b"second bytes"[..])] {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, bytes).unwrap();
        }

        let (id_a, record_a) = library.import(&first).unwrap();
        let (id_b, record_b) = library.import(&second).unwrap();

        // Same basename, separate content
        assert_ne!(
            library.source_path(id_a, &record_a),
            library.source_path(id_b, &record_b)
        );
        assert_eq!(
            fs::read(library.source_path(id_a, &record_a)).unwrap(),
            b"first bytes"
        );
        assert_eq!(
            fs::read(library.source_path(id_b, &record_b)).unwrap(),
            b"second bytes"
        );
    }

    #[test]
    fn concurrent_imports_mint_unique_ids() {
        let tmp = TempDir::new().unwrap();
        let library = Library::init(tmp.path().join("lib")).unwrap();
        let sources: Vec<_> = (0..8)
            .map(|n| {
                let path = tmp.path().join(format!("img-{n}.jpg"));
                fs::write(&path, b"x").unwrap();
                path
            })
            .collect();

        let mut ids: Vec<u64> = std::thread::scope(|scope| {
            let library = &library;
            let handles: Vec<_> = sources
                .iter()
                .map(|source| scope.spawn(move || library.import(source).unwrap().0))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(library.list_ids().unwrap(), ids);
    }

    #[test]
    fn load_record_missing_id_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let library = Library::init(tmp.path().join("lib")).unwrap();
        assert!(matches!(
            library.load_record(42),
            Err(StoreError::NotFound(42))
        ));
    }

    #[test]
    fn import_rejects_missing_file() {
        let tmp = TempDir::new().unwrap();
        let library = Library::init(tmp.path().join("lib")).unwrap();
        let result = library.import(&tmp.path().join("nope.jpg"));
        assert!(matches!(result, Err(StoreError::NotImportable(_))));
    }

    #[test]
    fn record_round_trips_with_flat_meta_layout() {
        let tmp = TempDir::new().unwrap();
        let (library, id) = library_with_image(&tmp, "dawn.jpg");

        let mut record = library.load_record(id).unwrap();
        record.meta.rotation = 90;
        record.meta.flip_vertical = true;
        library.save_record(id, &record).unwrap();

        // Flat layout on disk
        let raw = fs::read_to_string(library.root().join("meta/1.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["source_file"], "dawn.jpg");
        assert_eq!(json["rotation"], 90);
        assert_eq!(json["flip_vertical"], true);

        assert_eq!(library.load_record(id).unwrap(), record);
    }

    #[test]
    fn save_record_leaves_no_staging_files() {
        let tmp = TempDir::new().unwrap();
        let (library, id) = library_with_image(&tmp, "dawn.jpg");
        let record = library.load_record(id).unwrap();
        library.save_record(id, &record).unwrap();

        let leftovers: Vec<_> = fs::read_dir(library.root().join("meta"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn variant_file_name_keeps_source_extension() {
        let tmp = TempDir::new().unwrap();
        let (library, id) = library_with_image(&tmp, "dawn.jpg");
        let record = library.load_record(id).unwrap();
        assert_eq!(
            library.variant_file_name(&record, "rotate-90"),
            "rotate-90.jpg"
        );
    }
}
