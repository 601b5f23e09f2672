//! The in-memory catalog and its backing file.
//!
//! Memory is the authority: every mutation is applied to the in-memory list first and then
//! flushed to the backing file. A failed flush is logged and leaves the catalog [dirty][d], it
//! never rolls back the mutation.
//!
//! [d]: Catalog::dirty

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use log::{info, trace, warn};

use crate::{
    file::FormatFile,
    format::{Format, Json, Reader, Writer},
    record::Record,
    Error,
};

/// Outcome of [`Catalog::load`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    /// The backing file was read and the catalog holds its records.
    Loaded,
    /// The backing file was missing or unreadable, the catalog is empty.
    NotLoaded,
}

/// Ordered collection of [`Record`]s with unique identifiers, mirrored to a backing file.
#[derive(Debug)]
pub struct Catalog {
    path: PathBuf,
    records: Vec<Record>,
    dirty: bool,
}

impl Catalog {
    /// Creates an empty catalog bound to `path` without touching the filesystem.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
            dirty: false,
        }
    }

    /// Creates a catalog bound to `path` and loads any records already stored there.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let mut catalog = Self::new(path);
        catalog.load();
        catalog
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the in-memory records with the content of the backing file.
    ///
    /// A missing file and a file that cannot be read or parsed both leave the catalog empty and
    /// return [`LoadStatus::NotLoaded`]; the latter also logs a warning.
    pub fn load(&mut self) -> LoadStatus {
        self.records.clear();
        self.dirty = false;

        if !self.path.exists() {
            info!(
                "No catalog file at '{}' - starting with an empty catalog",
                self.path.display()
            );
            return LoadStatus::NotLoaded;
        }

        match FormatFile::<Json>::open(&self.path).and_then(|mut file| file.read_records()) {
            Ok(records) => {
                trace!(
                    "Loaded {} records from '{}'",
                    records.len(),
                    self.path.display()
                );
                self.records = records;
                LoadStatus::Loaded
            }
            Err(err) => {
                warn!(
                    "Catalog file '{}' could not be loaded, starting with an empty catalog: {err}",
                    self.path.display()
                );
                LoadStatus::NotLoaded
            }
        }
    }

    /// Overwrites the backing file with every record in the catalog.
    ///
    /// # Errors
    ///
    /// An [`ErrorKind::Persistence`][crate::ErrorKind::Persistence] error is returned when the
    /// file cannot be created or written.
    pub fn save(&mut self) -> Result<(), Error> {
        trace!(
            "Writing {} records as {} to '{}'",
            self.records.len(),
            Json::name(),
            self.path.display()
        );
        FormatFile::<Json>::create(&self.path)?.write_records(&self.records)?;
        self.dirty = false;
        Ok(())
    }

    /// Returns true when the last mutation has not reached the backing file.
    #[must_use]
    pub const fn dirty(&self) -> bool {
        self.dirty
    }

    fn flush(&mut self) {
        self.dirty = true;
        if let Err(err) = self.save() {
            warn!("Catalog changed in memory but was not saved: {err}");
        }
    }

    /// Adds a manually entered record.
    ///
    /// Returns false without changing anything when any field is empty after trimming or when
    /// the identifier is already in the catalog.
    pub fn add_manual(&mut self, record: Record) -> bool {
        if !record.is_complete() {
            warn!("Title, author and ISBN are all required: '{record}' was not added");
            return false;
        }

        self.insert(record)
    }

    /// Appends a record whose fields are already known to be valid, returning false when the
    /// identifier is already in the catalog.
    pub fn insert(&mut self, record: Record) -> bool {
        if self.contains(record.identifier()) {
            warn!(
                "A book with the ISBN '{}' is already in the catalog",
                record.identifier()
            );
            return false;
        }

        info!("Added {record}");
        self.records.push(record);
        self.flush();
        true
    }

    /// Removes the record with `identifier`, returning whether one was removed.
    pub fn remove(&mut self, identifier: &str) -> bool {
        let Some(index) = self
            .records
            .iter()
            .position(|r| r.identifier() == identifier)
        else {
            info!("No book with the ISBN '{identifier}' in the catalog");
            return false;
        };

        let record = self.records.remove(index);
        info!("Removed {record}");
        self.flush();
        true
    }

    /// Returns true if a record has `identifier`.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.find(identifier).is_some()
    }

    /// The record with `identifier`, if there is one.
    #[must_use]
    pub fn find(&self, identifier: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.identifier() == identifier)
    }

    /// Records whose title or author contains `query`, ignoring case, in catalog order.
    ///
    /// An empty query matches every record.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Record> {
        let query = query.to_lowercase();
        self.records.iter().filter(|r| r.matches(&query)).collect()
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Number of records per author, using the exact author string as the key.
    #[must_use]
    pub fn author_statistics(&self) -> HashMap<String, usize> {
        let mut authors = HashMap::new();
        for record in &self.records {
            *authors.entry(record.author().to_owned()).or_insert(0) += 1;
        }
        authors
    }

    /// Removes every record and persists the empty catalog.
    pub fn clear(&mut self) -> bool {
        self.records.clear();
        info!("Removed all books from the catalog");
        self.flush();
        true
    }
}
