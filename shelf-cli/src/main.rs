#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![allow(clippy::as_conversions, clippy::mod_module_files)]

use std::{error, path::PathBuf, process};

mod commands;
mod interact;

use commands::Commands;

use shelf::{api::open_library::OPEN_LIBRARY_URL, Config, Library, DEFAULT_DATA_FILE};

use clap::{Args, Parser};
use log::{trace, warn};

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{}", err);
        process::exit(2);
    }
}

fn try_main() -> Result<(), Box<dyn error::Error>> {
    let Cli {
        command,
        global_opts:
            GlobalOpts {
                file,
                api_url,
                interact,
                verbosity,
                quiet,
            },
    } = Cli::parse();

    setup_errlog(verbosity as usize, quiet)?;

    // `quiet` and `interact` cannot be set at the same time
    let interact = !quiet && interact;

    if interact {
        trace!("Interact mode enabled");
    }

    let config = Config {
        data_file: file.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
        api_base: api_url.unwrap_or_else(|| OPEN_LIBRARY_URL.to_owned()),
    };
    trace!("Opening the catalog at '{}'", config.data_file.display());
    let library = Library::open(&config);

    let command_res = command.execute(&library, interact);

    if !library.is_persisted() {
        warn!(
            "Changes were kept in memory but could not be saved to '{}'",
            config.data_file.display()
        );
    }

    let message = command_res?;
    if !quiet {
        println!("{message}");
    }
    Ok(())
}

fn setup_errlog(verbosity: usize, quiet: bool) -> Result<(), Box<dyn error::Error>> {
    // if quiet then ignore verbosity but still show errors
    let verbosity = if quiet { 0 } else { verbosity + 1 };

    stderrlog::new().verbosity(verbosity).init()?;
    Ok(())
}

#[derive(Parser)]
#[clap(name = "shelf")]
#[clap(about = "Keep a catalog of your books, looking them up by ISBN from the terminal")]
#[clap(version, author)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(flatten)]
    global_opts: GlobalOpts,
}

#[derive(Debug, Args)]
struct GlobalOpts {
    /// The JSON file the catalog is kept in [default: library.json]
    #[clap(short, long, parse(from_os_str), global = true)]
    file: Option<PathBuf>,

    /// Base URL of the Open Library compatible API [default: https://openlibrary.org]
    #[clap(long, global = true)]
    api_url: Option<String>,

    /// Enables interactive mode, which asks for confirmation before removing books.
    #[clap(short, long, global = true)]
    interact: bool,

    /// How chatty the program is when performing commands
    ///
    /// The number of times this flag is used will increase how chatty
    /// the program is.
    #[clap(short, long, parse(from_occurrences), global = true)]
    verbosity: u8,

    /// Prevents the program from writing to stdout, errors will still be printed to stderr.
    #[clap(short, long, global = true)]
    quiet: bool,
}
