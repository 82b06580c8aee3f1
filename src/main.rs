use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use runvault_record::Record;
use runvault_service::{ListRequest, ResultService};
use runvault_store::SqliteStore;

/// Runvault - a store and query service for result records
#[derive(Parser)]
#[command(name = "runvault")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the database file (default: ~/.runvault/results.db)
  #[arg(long, global = true)]
  db: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Create a record from JSON on stdin
  Create,

  /// Fetch a record by name
  Get {
    /// The record name
    name: String,
  },

  /// Update a record from JSON on stdin
  Update {
    /// The record name
    name: String,

    /// Field path to merge (repeatable); omit for a full replacement
    #[arg(long = "field-path")]
    field_paths: Vec<String>,
  },

  /// Delete a record by name
  Delete {
    /// The record name
    name: String,
  },

  /// List records matching a filter
  List {
    /// Boolean filter expression; empty matches everything
    #[arg(long, default_value = "")]
    filter: String,

    /// Records per page
    #[arg(long)]
    page_size: Option<u32>,

    /// Continuation token from a previous list call
    #[arg(long)]
    page_token: Option<String>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let db_path = match cli.db {
    Some(path) => path,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".runvault")
      .join("results.db"),
  };

  let Some(command) = cli.command else {
    println!("runvault - use --help to see available commands");
    return Ok(());
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run(command, db_path).await })
}

async fn run(command: Commands, db_path: PathBuf) -> Result<()> {
  if let Some(parent) = db_path.parent() {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create data directory: {}", parent.display()))?;
  }

  let store = SqliteStore::connect(&db_path)
    .await
    .with_context(|| format!("failed to open database: {}", db_path.display()))?;
  store.migrate().await.context("failed to run migrations")?;
  let service = ResultService::new(store);

  match command {
    Commands::Create => {
      let record = read_record_from_stdin()?;
      let created = service.create(record).await?;
      println!("{}", serde_json::to_string_pretty(&created)?);
    }
    Commands::Get { name } => {
      let record = service.get(&name).await?;
      println!("{}", serde_json::to_string_pretty(&record)?);
    }
    Commands::Update { name, field_paths } => {
      let record = read_record_from_stdin()?;
      let paths = if field_paths.is_empty() {
        None
      } else {
        Some(field_paths.as_slice())
      };
      let updated = service.update(&name, record, paths).await?;
      println!("{}", serde_json::to_string_pretty(&updated)?);
    }
    Commands::Delete { name } => {
      service.delete(&name).await?;
      eprintln!("Deleted {name}");
    }
    Commands::List {
      filter,
      page_size,
      page_token,
    } => {
      let cancel = CancellationToken::new();
      let response = service
        .list(
          &ListRequest {
            filter,
            page_size,
            page_token,
          },
          &cancel,
        )
        .await?;
      println!("{}", serde_json::to_string_pretty(&response.records)?);
      if let Some(token) = response.next_page_token {
        eprintln!("Next page token: {token}");
      }
    }
  }

  Ok(())
}

fn read_record_from_stdin() -> Result<Record> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    // No stdin pipe, use an empty record
    return Ok(Record::default());
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read record from stdin")?;

  if input.trim().is_empty() {
    Ok(Record::default())
  } else {
    serde_json::from_str(&input).context("failed to parse record JSON from stdin")
  }
}
