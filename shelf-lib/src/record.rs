//! The [`Record`] type, a single entry of the catalog.

use serde::{Deserialize, Serialize};

/// One book in the catalog.
///
/// A `Record` is never changed once it has been added to a catalog, so only read access to its
/// fields is provided. Construction does no validation; callers that enforce business rules check
/// [`Record::is_complete`] themselves.
///
/// The identifier is stored under the `isbn` key in the structured representation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    title: String,
    author: String,
    #[serde(rename = "isbn")]
    identifier: String,
}

impl Record {
    /// Creates a new record from its three fields.
    pub fn new<T, A, I>(title: T, author: A, identifier: I) -> Self
    where
        T: Into<String>,
        A: Into<String>,
        I: Into<String>,
    {
        Self {
            title: title.into(),
            author: author.into(),
            identifier: identifier.into(),
        }
    }

    /// Title of the book.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Display name of the author(s), a comma separated list when there is more than one.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Unique identifier of the book, usually an ISBN.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns true when none of the fields are empty or only whitespace.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.title, &self.author, &self.identifier]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    /// Case-insensitive substring match against the title or the author.
    ///
    /// `query` is expected to already be lowercase.
    pub(crate) fn matches(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(query) || self.author.to_lowercase().contains(query)
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} by {} (ID: {})",
            self.title, self.author, self.identifier
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Record;

    #[test]
    fn display_format() {
        let record = Record::new("1984", "George Orwell", "978-0451524935");
        assert_eq!(
            "1984 by George Orwell (ID: 978-0451524935)",
            record.to_string()
        );
    }

    #[test]
    fn identifier_is_serialized_under_isbn_key() {
        let record = Record::new("1984", "George Orwell", "978-0451524935");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(
            serde_json::json!({
                "title": "1984",
                "author": "George Orwell",
                "isbn": "978-0451524935",
            }),
            value
        );
    }

    #[test]
    fn whitespace_only_field_is_incomplete() {
        assert!(Record::new("Dune", "Frank Herbert", "978-0441013593").is_complete());
        assert!(!Record::new("Dune", "   ", "978-0441013593").is_complete());
        assert!(!Record::new("", "Frank Herbert", "978-0441013593").is_complete());
        assert!(!Record::new("Dune", "Frank Herbert", "\t").is_complete());
    }

    #[test]
    fn matches_title_or_author_ignoring_case() {
        let record = Record::new("Animal Farm", "George Orwell", "1");

        assert!(record.matches("orwell"));
        assert!(record.matches("farm"));
        assert!(record.matches(""));
        assert!(!record.matches("rowling"));
    }
}
