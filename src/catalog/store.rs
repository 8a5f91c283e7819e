use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::descriptions::DescriptionTable;
use crate::core::feature::FeatureSequence;
use crate::core::types::EntryId;
use crate::parsing::features::parse_features_file;
use crate::parsing::ParseError;
use crate::utils::validation::{check_feature_limit, validate_entry_id, validate_features};

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Corpus I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed feature file {}: {source}", path.display())]
    LoadError {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Invalid entry file name {}: {message}", path.display())]
    InvalidFileName { path: PathBuf, message: String },

    #[error("Entry {0} has no features")]
    EmptyEntry(EntryId),

    #[error("Invalid entry {id}: {message}")]
    InvalidEntry { id: EntryId, message: String },

    #[error("Duplicate entry identifier: {0}")]
    DuplicateId(EntryId),

    #[error("Failed to decode corpus snapshot: {0}")]
    SnapshotError(#[from] bincode::Error),
}

/// Snapshot format version for compatibility checking
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// File extension of stored entry files
pub const ENTRY_EXTENSION: &str = "json";

/// One reference sketch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub id: EntryId,
    pub features: FeatureSequence,
    #[serde(default)]
    pub description: Option<String>,
}

impl CorpusEntry {
    pub fn new(id: impl Into<String>, features: FeatureSequence) -> Self {
        Self {
            id: EntryId::new(id),
            features,
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Serializable snapshot format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusSnapshot {
    pub version: String,
    pub created_at: String,
    pub entries: Vec<CorpusEntry>,
}

/// Reference sketches in load order, indexed by identifier
#[derive(Debug, Default)]
pub struct CorpusIndex {
    entries: Vec<CorpusEntry>,

    /// Index: entry ID -> index in entries vec
    id_to_index: HashMap<EntryId, usize>,
}

impl CorpusIndex {
    /// Create an empty corpus
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a corpus directory or snapshot file
    ///
    /// # Errors
    ///
    /// Returns the errors of [`CorpusIndex::load_dir`] or [`CorpusIndex::load_snapshot`].
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        if path.is_dir() {
            Self::load_dir(path)
        } else {
            Self::load_snapshot(path)
        }
    }

    /// Load every `*.json` entry file in a directory.
    ///
    /// Entries are loaded in file name order; the identifier is the file name without its
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::Io` if the directory cannot be read,
    /// `CorpusError::LoadError` for a malformed entry file, or
    /// `CorpusError::InvalidFileName` / `CorpusError::DuplicateId` for bad identifiers.
    pub fn load_dir(dir: &Path) -> Result<Self, CorpusError> {
        let mut paths = Vec::new();
        for dir_entry in std::fs::read_dir(dir)? {
            let path = dir_entry?.path();
            let is_entry = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(ENTRY_EXTENSION));
            if is_entry {
                paths.push(path);
            } else {
                debug!("Skipping non-entry path {}", path.display());
            }
        }
        paths.sort();

        let mut corpus = Self::new();
        for path in paths {
            let id = entry_id_from_path(&path)?;
            let features = parse_features_file(&path).map_err(|source| CorpusError::LoadError {
                path: path.clone(),
                source,
            })?;
            debug!(id = %id, features = features.len(), "loaded entry");
            corpus.add_entry(CorpusEntry {
                id,
                features,
                description: None,
            })?;
        }

        info!("Loaded {} corpus entries from {}", corpus.len(), dir.display());
        Ok(corpus)
    }

    /// Load a gzip-compressed binary snapshot
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::Io` if the file cannot be opened,
    /// `CorpusError::SnapshotError` if it cannot be decoded, or the validation errors
    /// of [`CorpusIndex::add_entry`].
    pub fn load_snapshot(path: &Path) -> Result<Self, CorpusError> {
        let file = std::fs::File::open(path)?;
        let snapshot: CorpusSnapshot =
            bincode::deserialize_from(GzDecoder::new(BufReader::new(file)))?;

        // Version check (warn but don't fail)
        if snapshot.version != SNAPSHOT_VERSION {
            warn!(
                "Corpus snapshot version mismatch (expected {}, found {})",
                SNAPSHOT_VERSION, snapshot.version
            );
        }

        let mut corpus = Self::new();
        for entry in snapshot.entries {
            corpus.add_entry(entry)?;
        }

        info!(
            "Loaded {} corpus entries from snapshot {} (created {})",
            corpus.len(),
            path.display(),
            snapshot.created_at
        );
        Ok(corpus)
    }

    /// Write the corpus as a gzip-compressed binary snapshot
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::Io` on I/O failure or
    /// `CorpusError::SnapshotError` if encoding fails.
    pub fn write_snapshot(&self, path: &Path) -> Result<(), CorpusError> {
        let snapshot = CorpusSnapshot {
            version: SNAPSHOT_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            entries: self.entries.clone(),
        };

        let file = std::fs::File::create(path)?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        bincode::serialize_into(&mut encoder, &snapshot)?;
        encoder.finish()?.flush()?;
        Ok(())
    }

    /// Add an entry at the end of the load order.
    ///
    /// Every load path goes through here, so directory and snapshot entries get the same
    /// identifier, size and coordinate checks.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::EmptyEntry` if the entry has no features,
    /// `CorpusError::InvalidEntry` for a bad identifier, too many features or an
    /// out-of-range coordinate, or `CorpusError::DuplicateId` if its identifier is
    /// already present.
    pub fn add_entry(&mut self, entry: CorpusEntry) -> Result<(), CorpusError> {
        if entry.features.is_empty() {
            return Err(CorpusError::EmptyEntry(entry.id));
        }
        let invalid = |message: String| CorpusError::InvalidEntry {
            id: entry.id.clone(),
            message,
        };
        validate_entry_id(entry.id.as_str()).map_err(|e| invalid(e.to_string()))?;
        if let Some(message) = check_feature_limit(entry.features.len()) {
            return Err(invalid(message));
        }
        validate_features(entry.features.as_slice()).map_err(|e| invalid(e.to_string()))?;

        if self.id_to_index.contains_key(&entry.id) {
            return Err(CorpusError::DuplicateId(entry.id));
        }

        self.id_to_index.insert(entry.id.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Fill entry descriptions from a lookup table; returns how many were found.
    ///
    /// Entries missing from the table keep their current description.
    pub fn attach_descriptions(&mut self, table: &DescriptionTable) -> usize {
        let mut attached = 0;
        for entry in &mut self.entries {
            match table.lookup(&entry.id) {
                Ok(description) => {
                    entry.description = Some(description.to_string());
                    attached += 1;
                }
                Err(e) => debug!("{e}"),
            }
        }
        attached
    }

    /// All entries in load order
    pub fn all_entries(&self) -> std::slice::Iter<'_, CorpusEntry> {
        self.entries.iter()
    }

    /// All entries in load order, as a slice
    #[must_use]
    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    /// Get an entry by ID
    #[must_use]
    pub fn get(&self, id: &EntryId) -> Option<&CorpusEntry> {
        self.id_to_index.get(id).map(|&idx| &self.entries[idx])
    }

    /// Number of entries in the corpus
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the corpus is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Identifier of an entry file: its name without the last extension
fn entry_id_from_path(path: &Path) -> Result<EntryId, CorpusError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CorpusError::InvalidFileName {
            path: path.to_path_buf(),
            message: "file name is not valid UTF-8".to_string(),
        })?;

    validate_entry_id(stem).map_err(|e| CorpusError::InvalidFileName {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::feature::Feature;
    use crate::core::types::DirectionCode;
    use tempfile::tempdir;

    fn write_entry(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_load_dir_sorted_by_name() {
        let dir = tempdir().unwrap();
        write_entry(dir.path(), "house.json", r#"[["r", 0, 0], ["u", 1, 1]]"#);
        write_entry(dir.path(), "cat.json", r#"[["h", 3, 4]]"#);
        write_entry(dir.path(), "notes.txt", "ignored");

        let corpus = CorpusIndex::load_dir(dir.path()).unwrap();
        assert_eq!(corpus.len(), 2);
        let ids: Vec<&str> = corpus.all_entries().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["cat", "house"]);
        assert_eq!(
            corpus.get(&EntryId::new("house")).unwrap().features.len(),
            2
        );
    }

    #[test]
    fn test_identifier_strips_last_extension_only() {
        let dir = tempdir().unwrap();
        write_entry(dir.path(), "tree.v2.json", r#"[["d", 0, 0]]"#);
        let corpus = CorpusIndex::load_dir(dir.path()).unwrap();
        assert!(corpus.get(&EntryId::new("tree.v2")).is_some());
    }

    #[test]
    fn test_malformed_entry_fails_load() {
        let dir = tempdir().unwrap();
        write_entry(dir.path(), "good.json", r#"[["r", 0, 0]]"#);
        write_entry(dir.path(), "bad.json", r#"[["q", 0, 0]]"#);

        let err = CorpusIndex::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, CorpusError::LoadError { .. }));
    }

    #[test]
    fn test_empty_entry_fails_load() {
        let dir = tempdir().unwrap();
        write_entry(dir.path(), "empty.json", "[]");
        assert!(CorpusIndex::load_dir(dir.path()).is_err());
    }

    #[test]
    fn test_add_entry_rejects_duplicates_and_empty() {
        let mut corpus = CorpusIndex::new();
        let features = FeatureSequence::new(vec![Feature::new(DirectionCode::Dot, 0.0, 0.0)]);
        corpus
            .add_entry(CorpusEntry::new("a", features.clone()))
            .unwrap();

        let dup = corpus.add_entry(CorpusEntry::new("a", features));
        assert!(matches!(dup, Err(CorpusError::DuplicateId(_))));

        let empty = corpus.add_entry(CorpusEntry::new("b", FeatureSequence::default()));
        assert!(matches!(empty, Err(CorpusError::EmptyEntry(_))));
        assert_eq!(corpus.len(), 1);
    }

    #[test]
    fn test_attach_descriptions() {
        let mut corpus = CorpusIndex::new();
        let features = FeatureSequence::new(vec![Feature::new(DirectionCode::Dot, 0.0, 0.0)]);
        corpus
            .add_entry(CorpusEntry::new("cat", features.clone()))
            .unwrap();
        corpus.add_entry(CorpusEntry::new("dog", features)).unwrap();

        let table = DescriptionTable::parse("cat a sleeping cat\n");
        assert_eq!(corpus.attach_descriptions(&table), 1);
        assert_eq!(
            corpus.get(&EntryId::new("cat")).unwrap().description.as_deref(),
            Some("a sleeping cat")
        );
        assert!(corpus.get(&EntryId::new("dog")).unwrap().description.is_none());
    }

    #[test]
    fn test_snapshot_preserves_entries() {
        let dir = tempdir().unwrap();
        let mut corpus = CorpusIndex::new();
        corpus
            .add_entry(
                CorpusEntry::new(
                    "b",
                    FeatureSequence::new(vec![
                        Feature::new(DirectionCode::Right, 1.5, 2.0),
                        Feature::new(DirectionCode::DiagC, -3.0, 4.25),
                    ]),
                )
                .with_description("second"),
            )
            .unwrap();
        corpus
            .add_entry(CorpusEntry::new(
                "a",
                FeatureSequence::new(vec![Feature::new(DirectionCode::Dot, 0.0, 0.0)]),
            ))
            .unwrap();

        let path = dir.path().join("corpus.bin");
        corpus.write_snapshot(&path).unwrap();

        let loaded = CorpusIndex::load(&path).unwrap();
        assert_eq!(loaded.entries(), corpus.entries());
    }

    fn write_raw_snapshot(path: &Path, entries: Vec<CorpusEntry>) {
        let snapshot = CorpusSnapshot {
            version: SNAPSHOT_VERSION.to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            entries,
        };
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        bincode::serialize_into(&mut encoder, &snapshot).unwrap();
        std::fs::write(path, encoder.finish().unwrap()).unwrap();
    }

    #[test]
    fn test_snapshot_entries_are_validated() {
        let dir = tempdir().unwrap();
        let dot = FeatureSequence::new(vec![Feature::new(DirectionCode::Dot, 0.0, 0.0)]);

        let bad_id = dir.path().join("bad_id.bin");
        write_raw_snapshot(&bad_id, vec![CorpusEntry::new("../escape", dot.clone())]);
        assert!(matches!(
            CorpusIndex::load(&bad_id),
            Err(CorpusError::InvalidEntry { .. })
        ));

        let nan = dir.path().join("nan.bin");
        write_raw_snapshot(
            &nan,
            vec![CorpusEntry::new(
                "nan",
                FeatureSequence::new(vec![Feature::new(DirectionCode::Right, f64::NAN, 0.0)]),
            )],
        );
        assert!(matches!(
            CorpusIndex::load(&nan),
            Err(CorpusError::InvalidEntry { .. })
        ));

        let oversized = dir.path().join("oversized.bin");
        let many: FeatureSequence = (0..=crate::utils::validation::MAX_FEATURES)
            .map(|_| Feature::new(DirectionCode::Dot, 0.0, 0.0))
            .collect();
        write_raw_snapshot(&oversized, vec![CorpusEntry::new("many", many)]);
        assert!(matches!(
            CorpusIndex::load(&oversized),
            Err(CorpusError::InvalidEntry { .. })
        ));

        let good = dir.path().join("good.bin");
        write_raw_snapshot(&good, vec![CorpusEntry::new("fine", dot)]);
        assert_eq!(CorpusIndex::load(&good).unwrap().len(), 1);
    }

    #[test]
    fn test_add_entry_rejects_huge_coordinates() {
        let mut corpus = CorpusIndex::new();
        let huge = FeatureSequence::new(vec![
            Feature::new(DirectionCode::Right, 0.0, 1e308),
            Feature::new(DirectionCode::Right, 0.0, -1e308),
        ]);
        let err = corpus.add_entry(CorpusEntry::new("huge", huge)).unwrap_err();
        assert!(matches!(err, CorpusError::InvalidEntry { .. }));
        assert!(corpus.is_empty());
    }

    #[test]
    fn test_corrupt_snapshot_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.bin");
        std::fs::write(&path, b"definitely not gzip").unwrap();
        assert!(CorpusIndex::load(&path).is_err());
    }
}
