// src/bin/cli.rs

//! Library Management Console CLI
//!
//! Local execution entry point for librarians.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use lms_console::{
    commands::{self, BookChanges, ReaderChanges},
    error::{AppError, Result},
    models::{Backend, Book, Config, LoginRequest, Reader, ReaderStatus, SignupRequest},
    services::LibraryService,
    session::Session,
    storage,
    utils::console,
};

/// lms - Library Management Console
#[derive(Parser, Debug)]
#[command(name = "lms", version, about = "Administrative console for a library")]
struct Cli {
    /// Path to storage directory containing config.toml
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Use the local JSON store instead of the LMS API
    #[arg(long)]
    local: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an admin account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        gender: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },

    /// Log in as an admin
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// End the current session
    Logout,

    /// Show the logged-in admin
    Profile,

    /// Library statistics and top picks
    Dashboard,

    /// Manage the catalog
    #[command(subcommand)]
    Books(BooksCommand),

    /// Manage readers
    #[command(subcommand)]
    Readers(ReadersCommand),

    /// Lend a book to a reader
    Borrow {
        #[arg(long)]
        isbn: String,
        #[arg(long)]
        reader: u64,
    },

    /// Take a book back from a reader
    Return {
        #[arg(long)]
        isbn: String,
        #[arg(long)]
        reader: u64,
    },

    /// Show the transaction log
    Transactions {
        /// Filter by reader id or ISBN
        #[arg(long)]
        search: Option<String>,
    },

    /// Show overdue loans and fines
    Overdue,

    /// Show one reader's outstanding loans
    Loans {
        #[arg(long)]
        reader: u64,
    },

    /// Validate configuration files
    Validate,

    /// Show backend and session info
    Info,
}

#[derive(Subcommand, Debug)]
enum BooksCommand {
    /// List books
    List {
        /// Filter by title, author or ISBN
        #[arg(long)]
        search: Option<String>,
        /// Sort column: title, author, category, price, count
        #[arg(long)]
        sort: Option<String>,
    },
    /// Add a book
    Add(BookArgs),
    /// Update a book; only the given fields change
    Update {
        /// ISBN of the book to update
        isbn: String,
        #[command(flatten)]
        changes: BookChangeArgs,
    },
    /// Remove a book
    Remove { isbn: String },
}

#[derive(Args, Debug)]
struct BookArgs {
    #[arg(long)]
    isbn: String,
    #[arg(long)]
    title: String,
    #[arg(long)]
    author: String,
    #[arg(long)]
    category: String,
    #[arg(long, default_value_t = 1)]
    count: u32,
    #[arg(long, default_value_t = 0.0)]
    price: f64,
    #[arg(long)]
    cover_url: Option<String>,
}

#[derive(Args, Debug)]
struct BookChangeArgs {
    /// New ISBN
    #[arg(long)]
    new_isbn: Option<String>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    count: Option<u32>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    cover_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ReadersCommand {
    /// List readers
    List {
        /// Filter by name or id
        #[arg(long)]
        search: Option<String>,
    },
    /// Register a reader; the id is assigned automatically
    Add(ReaderArgs),
    /// Update a reader; only the given fields change
    Update {
        id: u64,
        #[command(flatten)]
        changes: ReaderChangeArgs,
    },
    /// Delete a reader
    Remove { id: u64 },
}

#[derive(Args, Debug)]
struct ReaderArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    gender: String,
    #[arg(long)]
    age: u32,
}

#[derive(Args, Debug)]
struct ReaderChangeArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    age: Option<u32>,
    /// active or inactive
    #[arg(long)]
    status: Option<String>,
}

impl From<BookArgs> for Book {
    fn from(args: BookArgs) -> Self {
        Book {
            book_id: None,
            isbn: args.isbn,
            title: args.title,
            author: args.author,
            category: args.category,
            count: args.count,
            price: args.price,
            cover_url: args.cover_url,
        }
    }
}

impl From<BookChangeArgs> for BookChanges {
    fn from(args: BookChangeArgs) -> Self {
        BookChanges {
            isbn: args.new_isbn,
            title: args.title,
            author: args.author,
            category: args.category,
            count: args.count,
            price: args.price,
            cover_url: args.cover_url,
        }
    }
}

impl From<ReaderArgs> for Reader {
    fn from(args: ReaderArgs) -> Self {
        Reader {
            reader_id: 0,
            name: args.name,
            email: args.email,
            phone_no: args.phone,
            gender: args.gender,
            age: args.age,
            status: ReaderStatus::Active,
        }
    }
}

impl TryFrom<ReaderChangeArgs> for ReaderChanges {
    type Error = AppError;

    fn try_from(args: ReaderChangeArgs) -> Result<Self> {
        let status = args
            .status
            .map(|raw| {
                ReaderStatus::parse(&raw).ok_or_else(|| {
                    AppError::validation(format!("unknown status '{raw}' (active, inactive)"))
                })
            })
            .transpose()?;
        Ok(ReaderChanges {
            name: args.name,
            email: args.email,
            phone_no: args.phone,
            gender: args.gender,
            age: args.age,
            status,
        })
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        console::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let mut config = Config::load_or_default(&config_path).with_env_overrides();
    if cli.local {
        config.storage.backend = Backend::Local;
    }
    console::init(&config.logging);
    log::debug!("Loaded configuration from {}", cli.storage_dir.display());

    if let Command::Validate = cli.command {
        return commands::run_validate(&config);
    }

    let data_dir = config.data_dir(&cli.storage_dir);
    let storage = storage::from_config(&config, &data_dir)?;
    let service = LibraryService::new(storage, config.loan_policy());
    let currency = config.policy.currency.as_str();
    let today = Utc::now();

    match cli.command {
        Command::Signup {
            name,
            email,
            gender,
            phone,
            password,
            confirm_password,
        } => {
            let request = SignupRequest {
                name,
                email,
                gender,
                phone_number: phone,
                password,
                confirm_password,
            };
            commands::run_signup(&service, &request).await?;
        }

        Command::Login { email, password } => {
            commands::run_login(&service, &data_dir, &LoginRequest { email, password }).await?;
        }

        Command::Logout => commands::run_logout(&data_dir).await?,

        Command::Profile => commands::run_profile(&data_dir).await?,

        Command::Info => commands::run_info(&service, &data_dir).await?,

        Command::Validate => commands::run_validate(&config)?,

        command => {
            let session = Session::require(&data_dir).await?;
            log::debug!("Acting as {}", session.admin.email);
            run_managed(command, &service, today, currency).await?;
        }
    }

    Ok(())
}

/// Commands that need a logged-in admin.
async fn run_managed(
    command: Command,
    service: &LibraryService,
    today: chrono::DateTime<Utc>,
    currency: &str,
) -> Result<()> {
    match command {
        Command::Dashboard => commands::run_dashboard(service, today, currency).await,

        Command::Books(books) => match books {
            BooksCommand::List { search, sort } => {
                commands::run_list_books(service, search.as_deref(), sort.as_deref()).await
            }
            BooksCommand::Add(args) => commands::run_add_book(service, args.into()).await,
            BooksCommand::Update { isbn, changes } => {
                commands::run_update_book(service, &isbn, changes.into()).await
            }
            BooksCommand::Remove { isbn } => commands::run_remove_book(service, &isbn).await,
        },

        Command::Readers(readers) => match readers {
            ReadersCommand::List { search } => {
                commands::run_list_readers(service, search.as_deref()).await
            }
            ReadersCommand::Add(args) => commands::run_add_reader(service, args.into()).await,
            ReadersCommand::Update { id, changes } => {
                commands::run_update_reader(service, id, changes.try_into()?).await
            }
            ReadersCommand::Remove { id } => commands::run_delete_reader(service, id).await,
        },

        Command::Borrow { isbn, reader } => commands::run_borrow(service, &isbn, reader).await,

        Command::Return { isbn, reader } => {
            commands::run_return(service, &isbn, reader, today, currency).await
        }

        Command::Transactions { search } => {
            commands::run_transactions(service, search.as_deref()).await
        }

        Command::Overdue => commands::run_overdue(service, today, currency).await,

        Command::Loans { reader } => {
            commands::run_reader_loans(service, reader, today, currency).await
        }

        other => Err(AppError::config(format!("{other:?} does not need a session"))),
    }
}
