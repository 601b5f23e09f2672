//! Contains traits and implementions of the [`Format`], [`Reader`], and [`Writer`] trait.
//!
//! A [`Format`] is the textual representation of a catalog that is kept in the backing file.

mod json;

use crate::{record::Record, Error};
pub use json::Json;

/// A textual representation that can be parsed into and composed from a list of [`Record`]s.
///
/// Formats are promises at the type level about what a [`String`] (or similar) represents.
pub trait Format {
    /// Construct a new type using a [`String`] input.
    ///
    /// This function should not panic or fail as creating a [`Format`] is a type promise about
    /// what the [`String`] represents.
    fn new(val: String) -> Self;

    /// Parses this [`Format`] into the records it represents, in the order they appear.
    ///
    /// # Errors
    ///
    /// Will return [`Err`] if it's not possible to parse this [`Format`] to records.
    fn parse(self) -> Result<Vec<Record>, Error>;

    /// Composes a list of [`Record`]s to this [`Format`].
    ///
    /// This function should not fail as every [`Record`] must be representable by every
    /// [`Format`].
    fn compose(records: &[Record]) -> Self;

    /// Composes a single [`Record`] to a [`String`].
    ///
    /// Used by [`Format::compose`] for each record, and on its own to exchange one record.
    fn compose_record(record: &Record) -> String;

    /// Parses a single [`Record`] previously produced by [`Format::compose_record`].
    ///
    /// Used by [`Format::parse`] for each record, and on its own to exchange one record.
    ///
    /// # Errors
    ///
    /// Will return [`Err`] if `text` does not represent a record in this format.
    fn parse_record(text: &str) -> Result<Record, Error>;

    /// The current [`Format`] in a raw [`String`].
    fn raw(self) -> String;

    /// The display name of the format.
    fn name() -> &'static str;
}

/// A trait for objects which are [`Format`]-oriented sinks.
///
/// Writers have a default implemention of [`Writer::write_records`] using the [`Writer::write`]
/// method.
pub trait Writer {
    /// The format associated with the writer.
    type Format: Format;

    /// Write a format into this writer.
    ///
    /// # Errors
    ///
    /// The call to write should only return an [`Err`] when writing to the writer cannot be
    /// completed.
    fn write(&mut self, format: Self::Format) -> Result<(), Error>;

    /// Write records into this writer using [`Format::compose`] from the [`Writer::Format`]
    /// associated type.
    ///
    /// # Errors
    ///
    /// The call to write should only return an [`Err`] when writing to the writer cannot be
    /// completed.
    fn write_records(&mut self, records: &[Record]) -> Result<(), Error> {
        let format = Self::Format::compose(records);
        self.write(format)
    }
}

/// The [`Reader`] trait allows for reading a [`Format`] from a source.
///
/// Readers have a default implemention of [`Reader::read_records`] using the [`Reader::read`]
/// method.
pub trait Reader {
    /// The format associated with the reader.
    type Format: Format;

    /// Pull some bytes from this reader in order to produce a [`Reader::Format`] instance.
    ///
    /// # Errors
    /// If this method encounters any form of error making it unable to read the bytes in order to
    /// create the format.
    fn read(&mut self) -> Result<Self::Format, Error>;

    /// Read bytes from this reader using [`Reader::read`] and then parse using [`Format::parse`]
    /// with the associated [`Reader::Format`] type.
    ///
    /// # Errors
    /// This will return [`Err`] if there is an error from [`Reader::read`] or an error when parsing
    /// using [`Format::parse`].
    fn read_records(&mut self) -> Result<Vec<Record>, Error> {
        let format = self.read()?;
        format.parse()
    }
}
