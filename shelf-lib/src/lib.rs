#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![warn(missing_docs, rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]
#![doc = include_str!("../README.md")]

pub mod api;
mod config;
mod error;
pub mod file;
pub mod format;
mod library;
mod record;
pub mod store;

pub use api::open_library::Resolver;
pub use config::{Config, DEFAULT_DATA_FILE};
pub use error::{Error, ErrorKind};
pub use library::{Library, Statistics};
pub use record::Record;
