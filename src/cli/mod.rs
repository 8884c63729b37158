//! CLI commands for mmduck.
//!
//! A terminal front end over [`ShortcutService`]: manage the stored shortcuts,
//! run them, or serve JSON requests over stdio.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::config::{application_name, ConfigStore, ShortcutDraft, ShortcutPatch, ShortcutType};
use crate::dispatch::ShortcutService;
use crate::executor::{ExecutionEngine, ExecutionResult};

#[derive(Parser)]
#[command(name = "mmduck")]
#[command(about = "Run and manage dock shortcuts", long_about = None)]
pub struct Cli {
    /// Shortcut file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List shortcuts
    List {
        /// Include disabled shortcuts
        #[arg(long)]
        all: bool,
    },

    /// Show one shortcut
    Show { id: String },

    /// Add a shortcut
    Add(AddArgs),

    /// Change fields of a shortcut
    Update(UpdateArgs),

    /// Delete a shortcut
    Delete { id: String },

    /// Enable or disable a shortcut
    Toggle { id: String },

    /// Restore the default shortcuts
    Reset,

    /// Run a stored shortcut
    Exec { id: String },

    /// Run a command without storing it
    Run {
        /// application, url, script or other
        #[arg(value_name = "TYPE")]
        kind: ShortcutType,
        command: String,
    },

    /// Answer JSON requests on stdin, one per line
    Serve,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub icon: Option<String>,

    /// application, url, script or other
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<ShortcutType>,

    #[arg(long)]
    pub command: Option<String>,

    /// Add the shortcut disabled
    #[arg(long)]
    pub disabled: bool,

    /// Application bundle to take the title and command from
    #[arg(long, value_name = "PATH")]
    pub app: Option<PathBuf>,
}

#[derive(Args)]
pub struct UpdateArgs {
    pub id: String,

    /// Rename the shortcut
    #[arg(long)]
    pub new_id: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub icon: Option<String>,

    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<ShortcutType>,

    #[arg(long)]
    pub command: Option<String>,

    #[arg(long)]
    pub enabled: Option<bool>,
}

impl AddArgs {
    fn into_draft(self) -> anyhow::Result<ShortcutDraft> {
        let mut draft = ShortcutDraft {
            id: self.id,
            title: self.title,
            icon: self.icon,
            kind: self.kind,
            command: self.command,
            enabled: self.disabled.then_some(false),
        };

        if let Some(path) = self.app {
            let name = application_name(&path)
                .with_context(|| format!("Cannot derive an application name from {}", path.display()))?;
            draft.title.get_or_insert(name);
            draft
                .command
                .get_or_insert_with(|| path.to_string_lossy().into_owned());
            draft.kind.get_or_insert(ShortcutType::Application);
        }

        Ok(draft)
    }
}

impl From<UpdateArgs> for ShortcutPatch {
    fn from(args: UpdateArgs) -> Self {
        ShortcutPatch {
            id: args.new_id,
            title: args.title,
            icon: args.icon,
            kind: args.kind,
            command: args.command,
            enabled: args.enabled,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(ok: bool, action: &str) -> bool {
    if ok {
        println!("{} succeeded", action);
    } else {
        eprintln!("{} failed", action);
    }
    ok
}

fn print_result(result: &ExecutionResult) -> anyhow::Result<bool> {
    print_json(result)?;
    Ok(result.success)
}

/// Run the CLI. Returns whether the requested operation succeeded.
pub async fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();

    let store = match cli.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::open_default(),
    };
    tracing::debug!(path = %store.path().display(), "Using shortcut file");
    let service = ShortcutService::new(store, ExecutionEngine::current());

    match cli.command {
        Commands::List { all } => {
            let shortcuts = if all {
                service.get_all_shortcuts()
            } else {
                service.get_shortcuts()
            };
            print_json(&shortcuts)?;
            Ok(true)
        }
        Commands::Show { id } => match service.get_shortcut(&id) {
            Some(shortcut) => {
                print_json(&shortcut)?;
                Ok(true)
            }
            None => {
                eprintln!("shortcut not found: {}", id);
                Ok(false)
            }
        },
        Commands::Add(args) => Ok(report(service.add_shortcut(args.into_draft()?), "Add")),
        Commands::Update(args) => {
            let id = args.id.clone();
            Ok(report(service.update_shortcut(&id, args.into()), "Update"))
        }
        Commands::Delete { id } => Ok(report(service.delete_shortcut(&id), "Delete")),
        Commands::Toggle { id } => Ok(report(service.toggle_shortcut(&id), "Toggle")),
        Commands::Reset => Ok(report(service.reset_to_default(), "Reset")),
        Commands::Exec { id } => print_result(&service.execute_shortcut(&id).await),
        Commands::Run { kind, command } => {
            let engine = ExecutionEngine::current();
            print_result(&engine.execute(&command, kind).await)
        }
        Commands::Serve => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            service
                .serve(stdin, tokio::io::stdout())
                .await
                .context("stdio transport failed")?;
            Ok(true)
        }
    }
}
