//! The [`Library`] service that front ends use to work with a catalog.

use std::{
    cmp::Reverse,
    collections::HashMap,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use log::trace;

use crate::{
    api::{open_library::Resolver, Client},
    config::Config,
    record::Record,
    store::Catalog,
    Error, ErrorKind,
};

/// Counts describing the content of a catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Total number of records.
    pub count: usize,
    /// Number of records per exact author string.
    pub author_counts: HashMap<String, usize>,
}

impl Statistics {
    /// The `n` authors with the most records, ties broken by name.
    #[must_use]
    pub fn top_authors(&self, n: usize) -> Vec<(&str, usize)> {
        let mut authors: Vec<_> = self
            .author_counts
            .iter()
            .map(|(author, count)| (author.as_str(), *count))
            .collect();
        authors.sort_by_key(|&(author, count)| (Reverse(count), author));
        authors.truncate(n);
        authors
    }
}

/// A catalog together with the resolver used to add books to it by ISBN.
///
/// Mutations are serialized by a single lock while reads may run concurrently, so a `Library`
/// can be shared between threads behind an [`Arc`][std::sync::Arc].
///
/// # Examples
///
/// ```no_run
/// use shelf::{Config, Library};
///
/// let library = Library::open(&Config::default());
/// let record = library.add_by_identifier("978-0441013593")?;
/// println!("{record}");
/// # Ok::<(), shelf::Error>(())
/// ```
pub struct Library<C: Client = reqwest::blocking::Client> {
    catalog: RwLock<Catalog>,
    resolver: Resolver<C>,
}

impl Library {
    /// Opens the catalog stored at [`Config::data_file`], using the API at [`Config::api_base`].
    #[must_use]
    pub fn open(config: &Config) -> Self {
        Self::with_resolver(
            Catalog::open(&config.data_file),
            Resolver::with_base_url(config.api_base.as_str()),
        )
    }
}

impl<C: Client> Library<C> {
    /// Combines an existing catalog and resolver.
    pub fn with_resolver(catalog: Catalog, resolver: Resolver<C>) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            resolver,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.catalog.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The resolver used by [`Library::add_by_identifier`].
    pub const fn resolver(&self) -> &Resolver<C> {
        &self.resolver
    }

    /// Every record in insertion order.
    #[must_use]
    pub fn list_all(&self) -> Vec<Record> {
        self.read().records().to_vec()
    }

    /// Looks up `identifier` with the resolver and adds the resulting record.
    ///
    /// The catalog is not locked while the remote lookup runs. The duplicate check is repeated
    /// when the record is inserted so two callers adding the same identifier cannot both succeed.
    ///
    /// # Errors
    ///
    /// Any error from [`Resolver::resolve`], or [`ErrorKind::DuplicateIdentifier`] when another
    /// caller added the identifier while the lookup was running.
    pub fn add_by_identifier(&self, identifier: &str) -> Result<Record, Error> {
        let record = self
            .resolver
            .resolve(identifier, |isbn| self.read().contains(isbn))?;

        if self.write().insert(record.clone()) {
            Ok(record)
        } else {
            Err(Error::new(
                ErrorKind::DuplicateIdentifier,
                "The book was added by someone else during the lookup",
            )
            .for_identifier(record.identifier()))
        }
    }

    /// Adds a record from values entered by hand.
    ///
    /// Returns false when a value is blank or the identifier is already in the catalog.
    pub fn add_manual(&self, title: &str, author: &str, identifier: &str) -> bool {
        self.write()
            .add_manual(Record::new(title, author, identifier))
    }

    /// Removes the record with `identifier`, returning whether there was one.
    pub fn remove_by_identifier(&self, identifier: &str) -> bool {
        self.write().remove(identifier)
    }

    /// The record with `identifier`, if there is one.
    #[must_use]
    pub fn find(&self, identifier: &str) -> Option<Record> {
        self.read().find(identifier).cloned()
    }

    /// Records whose title or author contains `query`, ignoring case.
    ///
    /// An empty query matches every record.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Record> {
        trace!("Searching the catalog for '{query}'");
        self.read().search(query).into_iter().cloned().collect()
    }

    /// Number of records in total and per author.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        let catalog = self.read();
        Statistics {
            count: catalog.count(),
            author_counts: catalog.author_statistics(),
        }
    }

    /// Removes every record.
    pub fn clear(&self) -> bool {
        self.write().clear()
    }

    /// Returns true when the backing file holds the current state of the catalog.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        !self.read().dirty()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Barrier},
        thread,
    };

    use assert_fs::{fixture::PathChild, TempDir};

    use super::{Library, Statistics};
    use crate::{
        api::{impl_json_producer, open_library::Resolver, MockClient, Producer},
        record::Record,
        store::Catalog,
        Error, ErrorKind,
    };

    impl_json_producer! {
        BookProducer => |url| match url {
            "https://openlibrary.test/isbn/000.json" => {
                Err(Error::new(ErrorKind::NotFound, "Not found"))
            }
            "https://openlibrary.test/authors/OL1A.json" => Ok(r#"{"name": "X"}"#.to_owned()),
            _ => Ok(r#"{"title": "T", "authors": [{"key": "/authors/OL1A"}]}"#.to_owned()),
        },
    }

    fn library<P: Producer + Sync>(dir: &TempDir) -> Library<MockClient<P>> {
        Library::with_resolver(
            Catalog::open(dir.child("library.json").path()),
            Resolver::with_client(MockClient::default(), "https://openlibrary.test"),
        )
    }

    #[test]
    fn add_manual_then_find() {
        let dir = TempDir::new().unwrap();
        let library = library::<BookProducer>(&dir);

        assert!(library.add_manual("Dune", "Frank Herbert", "978-0441013593"));
        assert_eq!(1, library.statistics().count);
        assert_eq!(
            Some(Record::new("Dune", "Frank Herbert", "978-0441013593")),
            library.find("978-0441013593")
        );
        assert!(library.is_persisted());
    }

    #[test]
    fn add_manual_duplicate_keeps_count() {
        let dir = TempDir::new().unwrap();
        let library = library::<BookProducer>(&dir);
        library.add_manual("Dune", "Frank Herbert", "978-0441013593");

        assert!(!library.add_manual("X", "Y", "978-0441013593"));
        assert_eq!(1, library.statistics().count);
    }

    #[test]
    fn add_by_identifier_resolves_author_and_persists() {
        let dir = TempDir::new().unwrap();
        let library = library::<BookProducer>(&dir);

        let record = library.add_by_identifier("42").unwrap();

        assert_eq!(Record::new("T", "X", "42"), record);
        assert_eq!(vec![record], library.list_all());

        let reloaded = Catalog::open(dir.child("library.json").path());
        assert_eq!(library.list_all(), reloaded.records());
    }

    #[test]
    fn add_by_identifier_not_found_leaves_catalog_unchanged() {
        let dir = TempDir::new().unwrap();
        let library = library::<BookProducer>(&dir);

        let err = library.add_by_identifier("000").unwrap_err();

        assert_eq!(ErrorKind::NotFound, err.kind());
        assert_eq!(Some("000"), err.identifier());
        assert!(library.list_all().is_empty());
        assert!(!dir.child("library.json").path().exists());
    }

    #[test]
    fn add_by_identifier_duplicate_makes_no_request() {
        let dir = TempDir::new().unwrap();
        let library = library::<BookProducer>(&dir);
        library.add_manual("Dune", "Frank Herbert", "42");

        let err = library.add_by_identifier(" 42 ").unwrap_err();

        assert_eq!(ErrorKind::DuplicateIdentifier, err.kind());
        assert!(library.resolver().client().urls().is_empty());
        assert_eq!(1, library.statistics().count);
    }

    #[test]
    fn concurrent_adds_of_same_identifier_insert_once() {
        let dir = TempDir::new().unwrap();
        let library = Arc::new(library::<BookProducer>(&dir));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let library = Arc::clone(&library);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    if i % 2 == 0 {
                        library.add_by_identifier("42").is_ok()
                    } else {
                        library.add_manual("Manual", "Someone", "42")
                    }
                })
            })
            .collect();

        let added = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|added| *added)
            .count();

        assert_eq!(1, added);
        assert_eq!(1, library.statistics().count);
    }

    #[test]
    fn remove_and_remove_again() {
        let dir = TempDir::new().unwrap();
        let library = library::<BookProducer>(&dir);
        library.add_manual("Dune", "Frank Herbert", "42");

        assert!(library.remove_by_identifier("42"));
        assert!(!library.remove_by_identifier("42"));
        assert!(library.find("42").is_none());
    }

    #[test]
    fn search_returns_only_matching_author() {
        let dir = TempDir::new().unwrap();
        let library = library::<BookProducer>(&dir);
        library.add_manual("1984", "George Orwell", "1");
        library.add_manual("Harry Potter", "J.K. Rowling", "2");

        assert_eq!(
            vec![Record::new("1984", "George Orwell", "1")],
            library.search("orwell")
        );
    }

    #[test]
    fn statistics_and_clear() {
        let dir = TempDir::new().unwrap();
        let library = library::<BookProducer>(&dir);
        library.add_manual("1984", "George Orwell", "1");
        library.add_manual("Animal Farm", "George Orwell", "2");
        library.add_manual("Harry Potter", "J.K. Rowling", "3");

        let stats = library.statistics();
        assert_eq!(3, stats.count);
        assert_eq!(Some(&2), stats.author_counts.get("George Orwell"));

        assert!(library.clear());
        assert_eq!(Statistics::default(), library.statistics());
    }

    #[test]
    fn top_authors_sorted_by_count_then_name() {
        let stats = Statistics {
            count: 6,
            author_counts: [("B", 2), ("A", 2), ("C", 1), ("D", 1)]
                .into_iter()
                .map(|(author, count)| (author.to_owned(), count))
                .collect(),
        };

        assert_eq!(vec![("A", 2), ("B", 2), ("C", 1)], stats.top_authors(3));
        assert_eq!(4, stats.top_authors(10).len());
    }
}
