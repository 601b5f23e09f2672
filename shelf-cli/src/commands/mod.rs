use std::fmt::Write;

use crate::interact;

use shelf::{api::Client, Library, Record};

use clap::Subcommand;
use eyre::eyre;
use log::trace;

const TOP_AUTHORS: usize = 3;

#[derive(Subcommand)]
#[non_exhaustive]
pub enum Commands {
    /// Look up a book by ISBN using the Open Library API and add it to the catalog
    #[clap(arg_required_else_help = true)]
    Add {
        /// The ISBN of the book to add
        isbn: String,
    },

    /// Add a book manually
    ///
    /// Any value not given as an option is asked for interactively.
    New {
        /// Title of the book
        #[clap(short, long)]
        title: Option<String>,
        /// Author(s) of the book
        #[clap(short, long)]
        author: Option<String>,
        /// ISBN of the book
        #[clap(long)]
        isbn: Option<String>,
    },

    /// Remove a book from the catalog using its ISBN
    ///
    /// Asks for confirmation first when the `interact` flag is set using `-i` or `--interact`.
    #[clap(arg_required_else_help = true)]
    Rm {
        /// The ISBN of the book to remove
        isbn: String,
    },

    /// List every book in the catalog
    List,

    /// Show the book with the given ISBN
    #[clap(arg_required_else_help = true)]
    Find {
        /// The ISBN of the book to show
        isbn: String,
    },

    /// Search books whose title or author contains the query, ignoring case
    #[clap(arg_required_else_help = true)]
    Search {
        /// Text to look for in titles and authors
        query: String,
    },

    /// Show the number of books and the authors with the most books
    Stats,

    /// Remove every book from the catalog
    Clear,
}

impl Commands {
    pub fn execute<C: Client>(
        self,
        library: &Library<C>,
        interact: bool,
    ) -> Result<String, Box<dyn std::error::Error>> {
        match self {
            Commands::Add { isbn } => {
                let record = library.add_by_identifier(&isbn)?;
                Ok(format!("Book added: {record}"))
            }
            Commands::New {
                title,
                author,
                isbn,
            } => {
                let title = interact::value_or_input(title, "Title")?;
                let author = interact::value_or_input(author, "Author")?;
                let isbn = interact::value_or_input(isbn, "ISBN")?;
                let (title, author, isbn) = (title.trim(), author.trim(), isbn.trim());

                if title.is_empty() || author.is_empty() || isbn.is_empty() {
                    return Err(eyre!("Title, author and ISBN cannot be empty").into());
                }

                if library.add_manual(title, author, isbn) {
                    Ok(format!("Book added: {}", Record::new(title, author, isbn)))
                } else {
                    Err(eyre!("A book with the ISBN '{isbn}' is already in the catalog").into())
                }
            }
            Commands::Rm { isbn } => {
                let isbn = isbn.trim();
                trace!("Checking the catalog for a book with this ISBN..");
                let Some(record) = library.find(isbn) else {
                    return Err(eyre!("No book found with the ISBN of '{isbn}'").into());
                };

                if interact && !interact::user_confirm(&format!("Remove {record}?"))? {
                    return Ok("Removal cancelled".to_owned());
                }

                if library.remove_by_identifier(isbn) {
                    Ok(format!("Book removed: {record}"))
                } else {
                    Err(eyre!("No book found with the ISBN of '{isbn}'").into())
                }
            }
            Commands::List => {
                let records = library.list_all();
                if records.is_empty() {
                    Ok("There are no books in the catalog yet".to_owned())
                } else {
                    Ok(numbered(&records))
                }
            }
            Commands::Find { isbn } => Ok(library.find(isbn.trim()).map_or_else(
                || format!("No book found with the ISBN of '{}'", isbn.trim()),
                |record| record.to_string(),
            )),
            Commands::Search { query } => {
                let query = query.trim();
                if query.is_empty() {
                    return Err(eyre!("Search query cannot be empty").into());
                }

                let records = library.search(query);
                if records.is_empty() {
                    Ok(format!("No books found for '{query}'"))
                } else {
                    Ok(format!(
                        "{} books found for '{query}':\n{}",
                        records.len(),
                        numbered(&records)
                    ))
                }
            }
            Commands::Stats => {
                let stats = library.statistics();
                let mut message = format!("Total number of books: {}", stats.count);
                if stats.count > 0 {
                    write!(
                        message,
                        "\nNumber of different authors: {}\nAuthors with the most books:",
                        stats.author_counts.len()
                    )?;
                    for (i, (author, count)) in stats.top_authors(TOP_AUTHORS).iter().enumerate()
                    {
                        write!(message, "\n  {}. {author}: {count}", i + 1)?;
                    }
                }
                Ok(message)
            }
            Commands::Clear => {
                if interact && !interact::user_confirm("Remove every book from the catalog?")? {
                    return Ok("Clear cancelled".to_owned());
                }

                library.clear();
                Ok("All books removed from the catalog".to_owned())
            }
        }
    }
}

fn numbered(records: &[Record]) -> String {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| format!("{}. {record}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn numbered_starts_at_one() {
    let records = [
        Record::new("1984", "George Orwell", "1"),
        Record::new("Dune", "Frank Herbert", "2"),
    ];

    assert_eq!(
        "1. 1984 by George Orwell (ID: 1)\n2. Dune by Frank Herbert (ID: 2)",
        numbered(&records)
    );
}
