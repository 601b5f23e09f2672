//! Builds a [`Record`] from an ISBN using the [Open Library](https://openlibrary.org) API.
//!
//! The edition resource supplies the title and a list of authors. Each author is either given
//! inline with a name or only as a reference key to a separate author resource, which then needs
//! its own request. Authors that cannot be resolved are replaced by a placeholder so that a
//! single broken author never stops a book from being added.

use std::{
    thread::{self, ScopedJoinHandle},
    time::Duration,
};

use log::{info, trace, warn};
use serde::Deserialize;

use super::Client;
use crate::{record::Record, Error, ErrorKind};

/// Base URL of the public Open Library API.
pub const OPEN_LIBRARY_URL: &str = "https://openlibrary.org";

const EDITION_TIMEOUT: Duration = Duration::from_secs(10);
const AUTHOR_TIMEOUT: Duration = Duration::from_secs(5);

/// Author value when the edition has no `authors` field.
pub const UNKNOWN_AUTHOR: &str = "Unknown";
/// Author value when the edition has an `authors` field with no entries.
pub const NO_AUTHOR_INFO: &str = "Unknown (no author information)";
/// Placeholder when an author resource has no name or a blank one.
pub const AUTHOR_DETAIL_MISSING: &str = "Unknown Author (no detail)";
/// Placeholder when an author resource could not be fetched.
pub const AUTHOR_API_ERROR: &str = "Unknown Author (API error)";
/// Placeholder when an author resource is not valid JSON.
pub const AUTHOR_JSON_ERROR: &str = "Unknown Author (JSON error)";
/// Placeholder for an author entry with neither a usable name nor a key.
pub const AUTHOR_INVALID_FORMAT: &str = "Unknown Author (invalid format)";

/// Placeholder when an author resource request returned a non-success `status`.
#[must_use]
pub fn author_status_placeholder(status: u16) -> String {
    format!("Unknown Author (API status code: {status})")
}

/// Looks up books by ISBN and normalizes their authors into a single display value.
pub struct Resolver<C: Client = reqwest::blocking::Client> {
    client: C,
    base_url: String,
}

impl<C: Client> Default for Resolver<C> {
    fn default() -> Self {
        Self::with_base_url(OPEN_LIBRARY_URL)
    }
}

impl<C: Client> Resolver<C> {
    /// Creates a resolver for an Open Library compatible API hosted at `base_url`.
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self::with_client(C::default(), base_url)
    }

    /// Creates a resolver using an existing `client`.
    pub fn with_client<S: Into<String>>(client: C, base_url: S) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    /// The client used for every lookup.
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Resolves `identifier` into a new [`Record`].
    ///
    /// `identifier` is trimmed first. `exists` is asked whether the catalog already holds the
    /// identifier before any request is made.
    ///
    /// # Errors
    ///
    /// Every error carries the trimmed identifier, the kind tells why the lookup failed:
    /// - [`ErrorKind::InvalidInput`] when the identifier is empty,
    /// - [`ErrorKind::DuplicateIdentifier`] when `exists` returns true,
    /// - [`ErrorKind::NotFound`] when the API has no book for the identifier,
    /// - [`ErrorKind::IncompleteData`] when the book has no title,
    /// - [`ErrorKind::Upstream`], [`ErrorKind::Network`], [`ErrorKind::Parse`] or
    ///   [`ErrorKind::Unknown`] when the edition request itself fails.
    pub fn resolve<F>(&self, identifier: &str, exists: F) -> Result<Record, Error>
    where
        F: FnOnce(&str) -> bool,
    {
        let identifier = identifier.trim();

        if identifier.is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput, "ISBN cannot be empty")
                .for_identifier(identifier));
        }

        if exists(identifier) {
            return Err(Error::new(
                ErrorKind::DuplicateIdentifier,
                "A book with this ISBN is already in the catalog",
            )
            .for_identifier(identifier));
        }

        self.fetch_record(identifier)
            .map_err(|e| e.for_identifier(identifier))
    }

    fn fetch_record(&self, isbn: &str) -> Result<Record, Error> {
        info!("Searching for ISBN '{isbn}' using the Open Library API");
        let url = format!("{}/isbn/{isbn}.json", self.base_url);

        let Edition { title, authors } = self.client.get_json(&url, EDITION_TIMEOUT)?;
        trace!("Request was successful");

        let title = title
            .filter(|title| !title.trim().is_empty())
            .ok_or_else(|| Error::new(ErrorKind::IncompleteData, "The book has no title"))?;

        let author = match authors {
            None => UNKNOWN_AUTHOR.to_owned(),
            Some(authors) if authors.is_empty() => NO_AUTHOR_INFO.to_owned(),
            Some(authors) => self.author_names(authors)?,
        };

        Ok(Record::new(title, author, isbn))
    }

    /// Resolves every author entry and joins the names in the order the entries were given.
    ///
    /// Author resources are requested concurrently.
    fn author_names(&self, authors: Vec<AuthorRef>) -> Result<String, Error> {
        let names = thread::scope(|scope| {
            let slots: Vec<Slot<'_>> = authors
                .into_iter()
                .map(|author| match author {
                    AuthorRef::Inline { name, .. } if !name.trim().is_empty() => {
                        Slot::Ready(name)
                    }
                    AuthorRef::Inline { key: Some(key), .. } | AuthorRef::Reference { key } => {
                        Slot::Pending(scope.spawn(move || self.author_name(&key)))
                    }
                    AuthorRef::Inline { key: None, .. } => {
                        warn!("Author entry has a blank name and no key");
                        Slot::Ready(AUTHOR_INVALID_FORMAT.to_owned())
                    }
                    AuthorRef::Malformed(entry) => {
                        warn!("Author entry {entry} has neither a name nor a key");
                        Slot::Ready(AUTHOR_INVALID_FORMAT.to_owned())
                    }
                })
                .collect();

            // join every handle before checking results so no panicked thread is left behind
            slots
                .into_iter()
                .map(|slot| match slot {
                    Slot::Ready(name) => Ok(name),
                    Slot::Pending(handle) => handle.join().map_err(|_| {
                        Error::new(ErrorKind::Unknown, "Author lookup stopped unexpectedly")
                    }),
                })
                .collect::<Vec<_>>()
        });

        let names = names.into_iter().collect::<Result<Vec<_>, _>>()?;

        if names.is_empty() {
            Ok(NO_AUTHOR_INFO.to_owned())
        } else {
            Ok(names.join(", "))
        }
    }

    fn author_name(&self, key: &str) -> String {
        trace!("Fetching author detail for '{key}'");
        let url = format!("{}{key}.json", self.base_url);

        match self.client.get_json::<Author>(&url, AUTHOR_TIMEOUT) {
            Ok(Author { name: Some(name) }) if !name.trim().is_empty() => name,
            Ok(Author { .. }) => {
                warn!("Author '{key}' has no name");
                AUTHOR_DETAIL_MISSING.to_owned()
            }
            Err(err) => {
                warn!("Author lookup for '{key}' failed: {err}");
                match err.kind() {
                    ErrorKind::NotFound => {
                        author_status_placeholder(reqwest::StatusCode::NOT_FOUND.as_u16())
                    }
                    ErrorKind::Upstream(status) => author_status_placeholder(status),
                    ErrorKind::Parse => AUTHOR_JSON_ERROR.to_owned(),
                    _ => AUTHOR_API_ERROR.to_owned(),
                }
            }
        }
    }
}

enum Slot<'scope> {
    Ready(String),
    Pending(ScopedJoinHandle<'scope, String>),
}

/// Edition resource, only the fields needed for a [`Record`].
#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct Edition {
    title: Option<String>,
    authors: Option<Vec<AuthorRef>>,
}

/// A single entry of an edition's `authors` list, decided once when the response is decoded.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
#[serde(untagged)]
enum AuthorRef {
    Inline {
        name: String,
        #[serde(default)]
        key: Option<String>,
    },
    Reference { key: String },
    Malformed(serde_json::Value),
}

/// Author resource.
#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct Author {
    name: Option<String>,
}
