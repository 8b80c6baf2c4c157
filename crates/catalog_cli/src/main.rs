//! Operator CLI for the catalog core.
//!
//! # Responsibility
//! - Seed a database file with deterministic data.
//! - Run list/get operations under either fetch strategy and print JSON.
//!
//! Exit codes: 2 invalid input, 3 not found, 4 key conflict, 1 anything else.

use catalog_core::{
    default_log_level, fetch_strategy, init_fetch_strategy, init_logging, open_db, seed_catalog,
    Catalog, CategoryId, DbError, ErrorKind, FetchStrategy, ItemId, PageRequest, RepoError,
    SeedPlan, DEFAULT_PAGE_SIZE,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "catalog", version, about = "Inspect and seed a SQLite product catalog")]
struct Cli {
    /// Directory for rolling log files; logging stays off when omitted
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill an empty database with generated categories and items
    Seed(SeedArgs),
    /// List categories ordered by id
    Categories(PageArgs),
    /// List items, optionally restricted to one category
    Items(ItemsArgs),
    /// Show one item with its category
    Item(ItemArgs),
}

#[derive(Args, Debug)]
struct DbArgs {
    /// SQLite database file; created and migrated when missing
    #[arg(long = "db")]
    path: PathBuf,
}

#[derive(Args, Debug)]
struct SeedArgs {
    #[command(flatten)]
    db: DbArgs,
    #[arg(long, default_value_t = SeedPlan::default().categories)]
    categories: u32,
    #[arg(long, default_value_t = SeedPlan::default().items_per_category)]
    items_per_category: u32,
    /// RNG seed; the same seed reproduces the same data
    #[arg(long, default_value_t = SeedPlan::default().seed)]
    seed: u64,
}

#[derive(Args, Debug)]
struct PageArgs {
    #[command(flatten)]
    db: DbArgs,
    /// Zero-based page index
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    page: i64,
    #[arg(long, default_value_t = i64::from(DEFAULT_PAGE_SIZE), allow_negative_numbers = true)]
    size: i64,
}

#[derive(Args, Debug)]
struct ItemsArgs {
    #[command(flatten)]
    paging: PageArgs,
    /// Only items of this category; a missing category is an error
    #[arg(long)]
    category: Option<CategoryId>,
    /// join|deferred; defaults to the USE_JOIN_FETCH setting
    #[arg(long)]
    fetch: Option<FetchStrategy>,
}

#[derive(Args, Debug)]
struct ItemArgs {
    #[command(flatten)]
    db: DbArgs,
    id: ItemId,
    /// join|deferred; defaults to the USE_JOIN_FETCH setting
    #[arg(long)]
    fetch: Option<FetchStrategy>,
}

/// Terminal failure carrying the process exit code.
#[derive(Debug)]
struct Failure {
    code: u8,
    message: String,
}

impl Failure {
    fn usage(message: impl Into<String>) -> Self {
        Self {
            code: 2,
            message: message.into(),
        }
    }

    fn other(message: impl Into<String>) -> Self {
        Self {
            code: 1,
            message: message.into(),
        }
    }
}

impl From<DbError> for Failure {
    fn from(err: DbError) -> Self {
        Self::other(err.to_string())
    }
}

impl From<RepoError> for Failure {
    fn from(err: RepoError) -> Self {
        let code = match err.kind() {
            ErrorKind::ValidationFailed => 2,
            ErrorKind::NotFound => 3,
            ErrorKind::DuplicateKey | ErrorKind::ForeignKeyMissing => 4,
            ErrorKind::Unexpected => 1,
        };
        Self {
            code,
            message: err.to_string(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("error: {}", failure.message);
            ExitCode::from(failure.code)
        }
    }
}

fn run(cli: Cli) -> Result<(), Failure> {
    if let Some(log_dir) = &cli.log_dir {
        start_logging(log_dir, cli.log_level.as_deref())?;
    }

    match cli.command {
        Command::Seed(args) => {
            let conn = open_db(&args.db.path)?;
            let plan = SeedPlan {
                categories: args.categories,
                items_per_category: args.items_per_category,
                seed: args.seed,
            };
            let report = seed_catalog(&conn, &plan)?;
            info!(
                "event=cli_seed module=cli status=ok categories={} items={}",
                report.categories, report.items
            );
            print_json(&report)
        }
        Command::Categories(args) => {
            let request = page_request(&args)?;
            let conn = open_db(&args.db.path)?;
            let catalog = Catalog::new(&conn, fetch_strategy())?;
            print_json(&catalog.list_categories(request)?)
        }
        Command::Items(args) => {
            let request = page_request(&args.paging)?;
            let strategy = resolve_strategy(args.fetch)?;
            let conn = open_db(&args.paging.db.path)?;
            let catalog = Catalog::new(&conn, strategy)?;
            let page = match args.category {
                Some(category_id) => catalog.list_items_by_category(category_id, request)?,
                None => catalog.list_items(None, request)?,
            };
            print_json(&page)
        }
        Command::Item(args) => {
            let strategy = resolve_strategy(args.fetch)?;
            let conn = open_db(&args.db.path)?;
            let catalog = Catalog::new(&conn, strategy)?;
            print_json(&catalog.get_item(args.id)?)
        }
    }
}

fn start_logging(log_dir: &Path, level: Option<&str>) -> Result<(), Failure> {
    let absolute = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|err| Failure::other(format!("cannot resolve log directory: {err}")))?
            .join(log_dir)
    };
    init_logging(effective_log_level(level), &absolute.to_string_lossy())
        .map_err(|err| Failure::usage(err.to_string()))
}

fn effective_log_level(requested: Option<&str>) -> &str {
    requested.unwrap_or(default_log_level())
}

/// Pins the process-wide strategy when `--fetch` is given.
fn resolve_strategy(requested: Option<FetchStrategy>) -> Result<FetchStrategy, Failure> {
    match requested {
        Some(strategy) => {
            init_fetch_strategy(strategy).map_err(Failure::usage)?;
            Ok(strategy)
        }
        None => Ok(fetch_strategy()),
    }
}

fn page_request(args: &PageArgs) -> Result<PageRequest, Failure> {
    PageRequest::new(args.page, args.size).map_err(|err| Failure::usage(err.to_string()))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Failure> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| Failure::other(format!("failed to render JSON: {err}")))?;
    println!("{rendered}");
    Ok(())
}
