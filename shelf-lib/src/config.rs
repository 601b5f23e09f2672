use std::path::PathBuf;

use crate::api::open_library::OPEN_LIBRARY_URL;

/// Default name of the backing file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "library.json";

/// Settings needed to open a [`Library`][crate::Library].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Path of the JSON file the catalog is stored in.
    pub data_file: PathBuf,
    /// Base URL of the Open Library compatible API used to look up books.
    pub api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            api_base: OPEN_LIBRARY_URL.to_owned(),
        }
    }
}

impl Config {
    /// Default settings with a different backing file.
    pub fn with_data_file<P: Into<PathBuf>>(data_file: P) -> Self {
        Self {
            data_file: data_file.into(),
            ..Self::default()
        }
    }
}
