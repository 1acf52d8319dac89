use anyhow::{Context, Result};
use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use book_catalog_server::book::{normalize_isbn, Book, BookUpdate};
use book_catalog_server::catalog_store::{
    CatalogStore, JsonFileBookPersistence, DEFAULT_DATA_FILE_NAME,
};
use book_catalog_server::metadata::{
    MetadataFetcher, OpenLibraryClient, DEFAULT_LOOKUP_TIMEOUT_SEC, OPEN_LIBRARY_BASE_URL,
};

use rustyline::{
    completion::Completer,
    highlight::Highlighter,
    history::FileHistory,
    validate::Validator,
    CompletionType, Config, Editor, Helper,
};

fn get_styles() -> Styles {
    Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(styles=get_styles())]
struct CliArgs {
    /// Catalog JSON file. When omitted, the closest library.json walking up
    /// from the current directory is used, or a new one is created here.
    #[clap(value_parser = parse_path)]
    pub path: Option<PathBuf>,

    /// Base URL of the Open Library compatible metadata service.
    #[clap(long, default_value = OPEN_LIBRARY_BASE_URL)]
    pub lookup_base_url: String,

    /// Timeout in seconds for each metadata request.
    #[clap(long, default_value_t = DEFAULT_LOOKUP_TIMEOUT_SEC)]
    pub lookup_timeout_sec: u64,
}

#[derive(Parser)]
#[command(styles=get_styles(),name = "")]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Looks up a book by ISBN on the metadata service and adds it.
    AddIsbn { isbn: String },

    /// Adds a book with the given details.
    AddManual {
        title: String,
        author: String,
        isbn: String,
    },

    /// Shows all books in insertion order.
    List,

    /// Shows the book with the given ISBN.
    Find { isbn: String },

    /// Shows books whose title, author or ISBN contains the query.
    Search { query: String },

    /// Changes the given fields of a book, the others are left untouched.
    Update {
        isbn: String,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        author: Option<String>,
        #[clap(long = "new-isbn")]
        new_isbn: Option<String>,
    },

    /// Deletes a book. Nothing is deleted without --yes.
    Delete {
        isbn: String,
        #[clap(long)]
        yes: bool,
    },

    /// Removes every book. Nothing is deleted without --yes.
    Clear {
        #[clap(long)]
        yes: bool,
    },

    /// Shows catalog statistics.
    Stats,

    /// Shows the path of the current catalog file.
    Where,

    /// Close this program.
    Exit,
}

#[derive(Debug, PartialEq)]
enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

const PROMPT: &str = ">> ";

struct Session<'a> {
    catalog_store: &'a mut CatalogStore,
    metadata_fetcher: &'a dyn MetadataFetcher,
    runtime: &'a Runtime,
}

fn print_books(books: &[Book]) {
    if books.is_empty() {
        println!("No books found.");
        return;
    }
    for (index, book) in books.iter().enumerate() {
        println!("{}. {}", index + 1, book);
    }
}

fn add_by_isbn(session: &mut Session, isbn: &str) -> CommandExecutionResult {
    let isbn = normalize_isbn(isbn.trim());
    if isbn.is_empty() {
        return CommandExecutionResult::Error("ISBN cannot be empty.".to_string());
    }
    if session.catalog_store.contains(&isbn) {
        return CommandExecutionResult::Error(format!("Book with ISBN {} already exists.", isbn));
    }

    println!("Searching for ISBN {}...", isbn);
    let fetched = session
        .runtime
        .block_on(session.metadata_fetcher.fetch(&isbn));
    let book = match fetched {
        Ok(book) => book,
        Err(err) => {
            return CommandExecutionResult::Error(format!(
                "Could not find book with ISBN {}: {}",
                isbn, err
            ))
        }
    };

    match session.catalog_store.add(book) {
        Ok(book) => {
            println!("Added: {}", book);
            CommandExecutionResult::Ok
        }
        Err(err) => CommandExecutionResult::Error(err.to_string()),
    }
}

fn execute_command(line: String, session: &mut Session) -> CommandExecutionResult {
    if line.is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(&line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    match cli {
        Ok(cli) => {
            println!("{} {}", PROMPT, &line);
            match cli.command {
                InnerCommand::AddIsbn { isbn } => return add_by_isbn(session, &isbn),
                InnerCommand::AddManual {
                    title,
                    author,
                    isbn,
                } => match session.catalog_store.add(Book::new(title, author, isbn)) {
                    Ok(book) => println!("Added: {}", book),
                    Err(err) => return CommandExecutionResult::Error(err.to_string()),
                },
                InnerCommand::List => print_books(&session.catalog_store.list()),
                InnerCommand::Find { isbn } => match session.catalog_store.find(&isbn) {
                    Some(book) => println!("{}", book),
                    None => {
                        return CommandExecutionResult::Error(format!(
                            "Book with ISBN {} not found.",
                            isbn
                        ))
                    }
                },
                InnerCommand::Search { query } => {
                    print_books(&session.catalog_store.search(query.trim()))
                }
                InnerCommand::Update {
                    isbn,
                    title,
                    author,
                    new_isbn,
                } => {
                    let update = BookUpdate {
                        title,
                        author,
                        isbn: new_isbn,
                    };
                    match session.catalog_store.update(&isbn, update) {
                        Ok(book) => println!("Updated: {}", book),
                        Err(err) => return CommandExecutionResult::Error(err.to_string()),
                    }
                }
                InnerCommand::Delete { isbn, yes } => {
                    let Some(book) = session.catalog_store.find(&isbn).cloned() else {
                        return CommandExecutionResult::Error(format!(
                            "Book with ISBN {} not found.",
                            isbn
                        ));
                    };
                    if !yes {
                        println!("Would delete: {}", book);
                        println!("Run again with --yes to confirm.");
                    } else if session.catalog_store.remove(&isbn) {
                        println!("Deleted: {}", book);
                    }
                }
                InnerCommand::Clear { yes } => {
                    let count = session.catalog_store.len();
                    if !yes {
                        println!("Would delete all {} books.", count);
                        println!("Run again with --yes to confirm.");
                    } else {
                        session.catalog_store.clear();
                        println!("Deleted {} books.", count);
                    }
                }
                InnerCommand::Stats => {
                    let stats = session.catalog_store.stats();
                    println!("Total books: {}", stats.total_books);
                    println!("Unique authors: {}", stats.unique_authors);
                    if !stats.top_authors.is_empty() {
                        println!("\nTop authors:");
                        for entry in stats.top_authors.iter() {
                            println!("  {}: {} book(s)", entry.author, entry.count);
                        }
                    }
                }
                InnerCommand::Where => {
                    println!("{}", session.catalog_store.location());
                }
                InnerCommand::Exit => return CommandExecutionResult::Exit,
            }
        }

        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
        }
    }
    CommandExecutionResult::Ok
}

#[derive(rustyline_derive::Hinter)]
struct MyHelper {
    commands_names: Vec<String>,
}

impl MyHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        MyHelper { commands_names }
    }
}

impl Completer for MyHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(" ") {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .map(|c| c.to_string())
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for MyHelper {}
impl Validator for MyHelper {}
impl Helper for MyHelper {}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let data_file_path = match cli_args.path {
        Some(path) => path,
        None => JsonFileBookPersistence::infer_path()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE_NAME)),
    };
    let mut catalog_store =
        CatalogStore::load(Box::new(JsonFileBookPersistence::new(data_file_path)));
    let metadata_fetcher =
        OpenLibraryClient::new(&cli_args.lookup_base_url, cli_args.lookup_timeout_sec)?;
    let runtime = Runtime::new().context("Failed to start async runtime")?;

    let mut session = Session {
        catalog_store: &mut catalog_store,
        metadata_fetcher: &metadata_fetcher,
        runtime: &runtime,
    };

    InnerCli::command().print_long_help()?;

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::<MyHelper, FileHistory>::with_config(config)?;

    let helper = MyHelper::new();
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(PROMPT);

        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(line, &mut session) {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => {
                        break;
                    }
                    CommandExecutionResult::Error(err) => {
                        eprintln!("Error: {}", err);
                        continue;
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                println!("Error: {:?}", e);
                break;
            }
        }
    }
    Ok(())
}
