pub(crate) type DynError = Box<dyn std::error::Error + Send + Sync>;

/// The Errors that may occur when calling the shelf functions.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    identifier: Option<String>,
    source: Option<DynError>,
}

/// Types of errors that make up an [`Error`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// An identifier or a required record field was empty.
    InvalidInput,
    /// A record with the same identifier is already in the catalog.
    DuplicateIdentifier,
    /// The remote service has no resource for the identifier.
    NotFound,
    /// The remote resource is missing the mandatory title.
    IncompleteData,
    /// The remote service answered with an unexpected status code.
    Upstream(u16),
    /// The remote service could not be reached, including timeouts.
    Network,
    /// A response or file could not be decoded into the expected structure.
    Parse,
    /// The backing file could not be read or written.
    Persistence,
    /// Anything that does not fit the other kinds.
    Unknown,
}

impl Error {
    /// Creates a new [`Error`] based on the [`ErrorKind`] and message to describe the error.
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            kind,
            message: Some(message.into()),
            identifier: None,
            source: None,
        }
    }

    /// Wraps an existing error as the source of [`Error`].
    pub fn wrap<E>(kind: ErrorKind, source: E) -> Self
    where
        E: Into<DynError>,
    {
        Self {
            kind,
            message: None,
            identifier: None,
            source: Some(source.into()),
        }
    }

    /// Wraps an existing error as the source of [`Error`] with a message giving context.
    pub fn wrap_with<E, S>(kind: ErrorKind, source: E, message: S) -> Self
    where
        E: Into<DynError>,
        S: Into<String>,
    {
        Self {
            kind,
            message: Some(message.into()),
            identifier: None,
            source: Some(source.into()),
        }
    }

    /// Attaches the identifier of the record the failed operation was acting on.
    #[must_use]
    pub fn for_identifier<S: Into<String>>(mut self, identifier: S) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Returns the kind of error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the identifier the error relates to, if there is one.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ErrorKind::InvalidInput => f.write_str("Invalid input")?,
            ErrorKind::DuplicateIdentifier => f.write_str("Duplicate identifier")?,
            ErrorKind::NotFound => f.write_str("Not found")?,
            ErrorKind::IncompleteData => f.write_str("Incomplete data")?,
            ErrorKind::Upstream(status) => write!(f, "Upstream error (status {status})")?,
            ErrorKind::Network => f.write_str("Network error")?,
            ErrorKind::Parse => f.write_str("Parse error")?,
            ErrorKind::Persistence => f.write_str("Persistence error")?,
            ErrorKind::Unknown => f.write_str("Unknown error")?,
        };

        if let Some(identifier) = &self.identifier {
            write!(f, " for ISBN '{identifier}'")?;
        }

        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }

        if let Some(cause) = &self.source {
            write!(f, ": caused by {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| &**e as _)
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};

    #[test]
    fn display_includes_identifier_and_message() {
        let err = Error::new(ErrorKind::NotFound, "No book found").for_identifier("000");

        assert_eq!("Not found for ISBN '000': No book found", err.to_string());
        assert_eq!(Some("000"), err.identifier());
    }

    #[test]
    fn upstream_display_carries_status_code() {
        let err = Error::new(ErrorKind::Upstream(503), "Service unavailable");

        assert_eq!(ErrorKind::Upstream(503), err.kind());
        assert!(err.to_string().contains("status 503"));
    }

    #[test]
    fn wrapped_source_is_exposed() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::wrap_with(ErrorKind::Persistence, io, "Cannot write library.json");

        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().ends_with("caused by denied"));
    }
}
