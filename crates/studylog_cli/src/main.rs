//! `studylog` command-line driver.
//!
//! # Responsibility
//! - Pick the storage backend once at startup from configuration.
//! - Forward each subcommand to the core services with an explicit owner.
//! - Print results as JSON on stdout and failures as JSON on stderr.
//!
//! The memory backend keeps nothing between invocations.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde_json::{json, Value};
use studylog_core::{
    core_version, init_logging, open_db, BackendKind, EditRequest, ItemRepository, ItemStore,
    MemoryItemRepository, MemoryOwnerRepository, OwnerRepository, SqliteItemRepository,
    SqliteOwnerRepository, StoreError, StudylogConfig,
};

#[derive(Debug, Parser)]
#[command(name = "studylog")]
#[command(about = "Study item tracker", version)]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured backend (sqlite|memory).
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// Overrides the configured SQLite database path.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Authenticated owner identity the command acts as.
    #[arg(long, global = true)]
    owner: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Registers the owner under a public user name.
    Register { user_name: String },
    /// Shows the owner's profile.
    Whoami {
        #[arg(long, default_value = "")]
        display_name: String,
    },
    /// Records a login for the owner.
    Login,
    /// Disables the owner.
    Disable,
    /// Adds an item and prints its id.
    Add { text: String },
    Get { id: String },
    List {
        #[arg(long, default_value_t = false)]
        review_only: bool,
        /// Only items last reviewed at least this long ago, e.g. `24h`.
        #[arg(long)]
        due: Option<String>,
    },
    /// Lists another owner's items by user name, with private fields hidden.
    Public { user_name: String },
    Edit(EditArgs),
    /// Copies an item into the owner's (or `--to`'s) partition.
    Copy {
        id: String,
        #[arg(long)]
        to: Option<String>,
    },
    Delete { id: String },
}

#[derive(Debug, Args)]
struct EditArgs {
    id: String,
    /// Field to change: memo|tag|is_review|is_input|reviewed_at.
    #[arg(long)]
    kind: String,
    #[arg(long)]
    memo: Option<String>,
    #[arg(long)]
    tag: Option<String>,
    #[arg(long)]
    is_review: Option<bool>,
    #[arg(long)]
    is_input: Option<bool>,
    /// Always applied; defaults to the current value.
    #[arg(long)]
    count: Option<i64>,
    /// Always applied; defaults to the current value.
    #[arg(long)]
    priority: Option<i64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli).and_then(|value| emit_json(&value)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", error_json(&err));
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<Value> {
    let mut config = StudylogConfig::load(cli.config.as_deref()).context("failed to load config")?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level(), log_dir).context("failed to initialize logging")?;
    }
    info!(
        "event=cli_start module=cli status=ok backend={} core_version={}",
        config.backend,
        core_version()
    );

    let owner = cli.owner.as_deref();
    match config.backend {
        BackendKind::Sqlite => {
            let conn = open_db(&config.db_path).with_context(|| {
                format!("failed to open database `{}`", config.db_path.display())
            })?;
            let store = ItemStore::new(
                SqliteItemRepository::try_new(&conn)?,
                SqliteOwnerRepository::try_new(&conn)?,
            );
            run(&store, owner, cli.command)
        }
        BackendKind::Memory => {
            let store = ItemStore::new(MemoryItemRepository::new(), MemoryOwnerRepository::new());
            run(&store, owner, cli.command)
        }
    }
}

fn run<I, O>(store: &ItemStore<I, O>, owner: Option<&str>, command: Command) -> Result<Value>
where
    I: ItemRepository,
    O: OwnerRepository,
{
    let require_owner = || owner.ok_or_else(|| anyhow!("--owner is required for this command"));
    let directory = store.directory();

    let value = match command {
        Command::Register { user_name } => {
            serde_json::to_value(directory.register(require_owner()?, &user_name)?)?
        }
        Command::Whoami { display_name } => {
            serde_json::to_value(directory.profile(require_owner()?, &display_name)?)?
        }
        Command::Login => serde_json::to_value(directory.record_login(require_owner()?)?)?,
        Command::Disable => {
            let owner_id = require_owner()?;
            directory.disable(owner_id)?;
            json!({ "owner_id": owner_id, "disabled": true })
        }
        Command::Add { text } => json!({ "id": store.add(require_owner()?, &text)? }),
        Command::Get { id } => serde_json::to_value(store.get(&id, require_owner()?)?)?,
        Command::List { review_only, due } => {
            items_json(store.list(require_owner()?, review_only, due.as_deref())?)?
        }
        Command::Public { user_name } => items_json(store.list_public_by_user_name(&user_name)?)?,
        Command::Edit(args) => {
            let owner_id = require_owner()?;
            let request = EditRequest {
                kind: args.kind,
                memo: args.memo.unwrap_or_default(),
                tag: args.tag.unwrap_or_default(),
                is_review: args.is_review.unwrap_or_default(),
                is_input: args.is_input.unwrap_or_default(),
                ..EditRequest::default()
            };
            // Omitted counters keep the stored values.
            let mut patch = request.into_patch()?;
            patch.count = args.count;
            patch.priority = args.priority;
            serde_json::to_value(store.edit(&args.id, owner_id, &patch)?)?
        }
        Command::Copy { id, to } => {
            let source_owner = require_owner()?;
            let dest_owner = to.as_deref().unwrap_or(source_owner);
            json!({ "id": store.copy(&id, source_owner, dest_owner)? })
        }
        Command::Delete { id } => {
            store.delete(&id, require_owner()?)?;
            json!({ "deleted": id })
        }
    };
    Ok(value)
}

fn items_json(items: Vec<studylog_core::Item>) -> Result<Value> {
    Ok(json!({
        "count": items.len(),
        "items": serde_json::to_value(items)?,
    }))
}

fn emit_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn error_json(err: &anyhow::Error) -> Value {
    let code = err
        .downcast_ref::<StoreError>()
        .map_or("internal", StoreError::code);
    json!({ "error": { "code": code, "message": format!("{err:#}") } })
}
