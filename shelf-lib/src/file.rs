//! Format supporting Filesystem operations.
//!
//! This module contains basic methods for opening/creating the backing file of a catalog and
//! provides a type to read and write a [`Format`] from that file.

use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, Write},
    marker::PhantomData,
    path::Path,
};

use crate::{
    format::{Format, Reader, Writer},
    Error, ErrorKind,
};

/// A reference to an open file on the filesystem which should have the textual content that
/// matches the generic [`Format`].
///
/// `FormatFile`s are automatically closed when they go out of scope. Errors detected on closing are
/// ignored by the implementation of `Drop`.
#[allow(clippy::module_name_repetitions)]
pub struct FormatFile<F: Format> {
    file: File,
    _format: PhantomData<F>,
}

impl<F: Format> FormatFile<F> {
    fn new(file: File) -> Self {
        Self {
            file,
            _format: PhantomData,
        }
    }

    /// Attempts to open an existing format file for reading.
    ///
    /// # Errors
    /// This function will return an error if `path` does not already exist or the user lacks
    /// permissions to open the file.
    ///
    /// # Examples
    /// ```no_run
    /// use shelf::{
    ///     file::FormatFile,
    ///     format::{Json, Reader},
    /// };
    ///
    /// fn main() -> Result<(), shelf::Error> {
    ///     let mut f = FormatFile::<Json>::open("library.json")?;
    ///     let records = f.read_records()?;
    ///     Ok(())
    /// }
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        OpenOptions::new()
            .read(true)
            .open(path)
            .map(Self::new)
            .map_err(|e| {
                Error::wrap_with(
                    ErrorKind::Persistence,
                    e,
                    format!("Failed to open the '{}' file for reading", path.display()),
                )
            })
    }

    /// Opens a format file in read and write mode, creating it when it does not exist.
    ///
    /// Existing content is left in place until the next [`Writer::write`], which replaces it.
    ///
    /// # Errors
    /// This function will return an error if the user lacks permissions to open or create the
    /// file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)
            .map(Self::new)
            .map_err(|e| {
                Error::wrap_with(
                    ErrorKind::Persistence,
                    e,
                    format!(
                        "Failed to create and open the '{}' file for reading and writing",
                        path.display()
                    ),
                )
            })
    }
}

impl<F: Format> Reader for FormatFile<F> {
    type Format = F;

    fn read(&mut self) -> Result<Self::Format, Error> {
        read_file_to_string(&mut self.file).map(F::new)
    }
}

fn read_file_to_string(file: &mut File) -> Result<String, Error> {
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::wrap_with(ErrorKind::Persistence, e, "Cannot read contents of file"))
        .map(move |bytes| {
            log::trace!("{bytes} read from the file");
            content
        })
}

impl<F: Format> Writer for FormatFile<F> {
    type Format = F;

    fn write(&mut self, format: F) -> Result<(), Error> {
        fn overrwrite_file_from_start(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
            // Rewind the cursor back to the start of the file to write over the contents and set
            // the length of the file to be equal to bytes so that existing data is removed
            file.rewind()?;
            file.set_len(bytes.len() as u64)?;
            file.write_all(bytes)?;
            file.flush()
        }

        let bytes = format.raw().into_bytes();
        log::trace!("overwriting file with {} bytes", bytes.len());
        overrwrite_file_from_start(&mut self.file, &bytes)
            .map_err(|e| Error::wrap_with(ErrorKind::Persistence, e, "Cannot write to file"))
    }
}
