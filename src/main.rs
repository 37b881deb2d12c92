//! # tasklane
//!
//! A small to-do manager for the terminal. Tasks have a title, a description,
//! an optional due date, a completion flag and an archive flag.
//!
//! ## Modes
//!
//! *   **Demo mode** (default): tasks live in a local JSON file, seeded with a
//!     few sample tasks on first run or whenever the file can't be read.
//! *   **Server mode** (`--server`): tasks live behind an HTTP task API
//!     (`GET /tasks`, `POST /tasks`, `PUT /tasks/{id}`) at `API_URL`.
//!
//! "Deleting" a task archives it; `remove` erases it from demo storage.
//!
//! ## Usage
//!
//! ```bash
//! # Interactive UI
//! tasklane
//!
//! # Add, list, tick off and archive
//! tasklane add "Buy milk" --description "2 litres" --due 2025-12-01
//! tasklane list
//! tasklane complete task-1733011200000
//! tasklane delete task-1733011200000
//!
//! # Against a server
//! API_URL=http://localhost:8888 tasklane --server list
//! ```
//!
//! ## TUI Key Bindings
//!
//! *   `q`: Quit
//! *   `a`: Add task (title, description, due date)
//! *   `Space`: Toggle done
//! *   `d`: Archive / restore selected task
//! *   `x`: Remove selected task (demo mode)
//! *   `n` / `e` / `t`: Edit title / description / due date
//! *   `v`: Show / hide archived tasks
//! *   `r`: Reload
//! *   `Esc`: Dismiss error
//!
//! ## Configuration
//!
//! *   `TASKS_DB` / `--db`: demo storage file (default `~/.local/share/tasklane/tasks.json`)
//! *   `API_URL` / `--api-url`: server base URL
//! *   `TASKS_API_TIMEOUT`: request timeout in seconds (default 30)
//! *   `TASKS_LOG` / `--log-file`: log file; the TUI logs next to the storage file by default
//! *   `RUST_LOG`: log filter

use std::io;
use std::path::PathBuf;
use anyhow::{anyhow, bail, Context};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tasklane::commands::*;
use tasklane::config::{Config, ConfigInput};
use tasklane::tui::run_tui;
use tasklane::{logging, LocalStore, Mode, RemoteStore, TaskSession, TaskStore};

#[derive(Parser)]
#[command(name = "tasklane")]
#[command(about = "Simple to-do manager with local or server storage", long_about = None)]
struct Cli {
    /// Use the remote task API instead of local demo storage
    #[arg(long, global = true)]
    server: bool,
    /// Base URL of the task API
    #[arg(long, global = true, env = "API_URL")]
    api_url: Option<String>,
    /// Demo storage file
    #[arg(long, global = true, env = "TASKS_DB")]
    db: Option<PathBuf>,
    /// Request timeout in seconds for server mode
    #[arg(long, global = true, env = "TASKS_API_TIMEOUT")]
    timeout: Option<u64>,
    /// Write logs to this file
    #[arg(long, global = true, env = "TASKS_LOG")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Longer description
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// Due date, YYYY-MM-DD or RFC 3339
        #[arg(short, long)]
        due: Option<String>,
    },
    /// List tasks
    List {
        /// Include archived tasks
        #[arg(short, long)]
        all: bool,
        /// Show only archived tasks
        #[arg(long, conflicts_with = "all")]
        archived: bool,
    },
    /// Show a single task
    Show {
        id: String,
    },
    /// Toggle a task between done and pending
    Complete {
        id: String,
    },
    /// Archive a task (run again to restore it)
    Delete {
        id: String,
    },
    /// Permanently remove a task (demo mode only)
    Remove {
        id: String,
    },
    /// Edit a task
    Edit {
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// New due date
        #[arg(short, long)]
        due: Option<String>,
        /// Remove the due date
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
    },
    /// Reset demo storage to the sample tasks
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Commands::Ui);
    if let Commands::Completions { shell } = command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "tasklane", &mut io::stdout());
        return Ok(());
    }

    let config = Config::resolve(ConfigInput {
        server: cli.server,
        db_path: cli.db,
        api_url: cli.api_url,
        timeout_secs: cli.timeout,
        log_file: cli.log_file,
    })?;

    let log_file = match command {
        Commands::Ui => Some(config.tui_log_file()),
        _ => config.log_file.clone(),
    };
    logging::init(log_file.as_deref()).context("failed to open log file")?;
    tracing::debug!(mode = ?config.mode, "starting");

    if let Commands::Reset { force } = command {
        if config.mode == Mode::Server {
            bail!("reset only applies to demo storage");
        }
        cmd_reset(&mut LocalStore::new(&config.db_path), force).context("failed to reset storage")?;
        return Ok(());
    }

    match config.mode {
        Mode::Demo => dispatch(TaskSession::open(LocalStore::new(&config.db_path)), command),
        Mode::Server => {
            let url = config.api_url.as_deref().unwrap_or_default();
            let store = RemoteStore::new(url, config.timeout)?;
            dispatch(TaskSession::open(store), command)
        }
    }
}

fn dispatch<S: TaskStore>(mut session: TaskSession<S>, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Add { title, description, due } => { cmd_add(&mut session, title, description, due, false); }
        Commands::List { all, archived } => cmd_list(&session, all, archived),
        Commands::Show { id } => cmd_show(&session, &id),
        Commands::Complete { id } => { cmd_complete(&mut session, &id, false); }
        Commands::Delete { id } => { cmd_delete(&mut session, &id, false); }
        Commands::Remove { id } => { cmd_remove(&mut session, &id, false); }
        Commands::Edit { id, title, description, due, clear_due } => { cmd_edit(&mut session, &id, title, description, due, clear_due, false); }
        Commands::Ui => run_tui(session).map_err(|e| anyhow!("error running TUI: {}", e))?,
        Commands::Reset { .. } | Commands::Completions { .. } => {}
    }
    Ok(())
}
