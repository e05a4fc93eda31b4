//! tasklist CLI entry point.
//!
//! Thin orchestrator over `tasklist-core`: parses a verb, opens one
//! session per repository call, renders the returned values, and maps
//! outcomes to exit codes. Exit code 2 signals not-found, validation
//! failure, or a declined delete confirmation; 1 signals storage
//! failures.

mod prompts;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tasklist_core::{
    repository, DeleteOutcome, SortKey, StorageEngine, Task, TaskError, TaskId, TaskPatch,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tasklist", about = "A simple todo list in the CLI", version)]
struct Cli {
    /// Enable debug messages
    #[arg(long, global = true)]
    debug: bool,

    /// Path to the task database (defaults to the user data dir)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new task
    Create {
        /// Title of the task
        title: String,
        /// Description of the task
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a task
    Delete {
        /// Id of the task to delete
        id: TaskId,
        /// Ask for confirmation before deleting the task
        #[arg(short, long)]
        interactive: bool,
    },
    /// Mark a task as completed
    Complete {
        /// Id of the task to mark as completed
        id: TaskId,
    },
    /// List all current tasks
    List {
        /// Sort the task table
        #[arg(short, long, value_enum, default_value = "id")]
        sort: SortArg,
        /// Reverse the task table
        #[arg(short, long)]
        reversed: bool,
    },
    /// Edit a task (interactive when no field flag is given)
    Edit(EditArgs),
}

#[derive(Args)]
struct EditArgs {
    /// Id of the task to edit
    id: TaskId,
    /// New title value
    #[arg(short, long)]
    title: Option<String>,
    /// New description value
    #[arg(short, long)]
    description: Option<String>,
    /// Mark the task as completed
    #[arg(short, long, conflicts_with = "incomplete")]
    completed: bool,
    /// Mark the task as incomplete
    #[arg(short, long)]
    incomplete: bool,
}

impl EditArgs {
    /// An absent flag means "leave the field unchanged"; only an
    /// explicit `-c`/`-i` sets the completion field, so flag-absent
    /// and false stay distinct.
    fn into_patch(self) -> TaskPatch {
        TaskPatch {
            title: self.title,
            description: self.description,
            completed: if self.completed {
                Some(true)
            } else if self.incomplete {
                Some(false)
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Id,
    Title,
    Completed,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Id => SortKey::Id,
            SortArg::Title => SortKey::Title,
            SortArg::Completed => SortKey::Completed,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            match err {
                TaskError::Validation(_) | TaskError::NotFound(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_db_path() -> tasklist_core::Result<PathBuf> {
    if let Ok(path) = std::env::var("TASKLIST_DB") {
        return Ok(PathBuf::from(path));
    }
    let base = dirs::data_dir().ok_or_else(|| {
        TaskError::StorageInit("no user data directory available; pass --db".into())
    })?;
    Ok(base.join("tasklist").join("tasks.db"))
}

fn run(cli: Cli) -> tasklist_core::Result<ExitCode> {
    let db_path = match cli.db {
        Some(path) => path,
        None => default_db_path()?,
    };
    tracing::debug!(path = %db_path.display(), "opening task database");
    let mut engine = StorageEngine::open(&db_path)?;

    match cli.command {
        Command::Create { title, description } => {
            let mut session = engine.session()?;
            let task = repository::create(&mut session, &title, description.as_deref())?;
            render::task_detail(&task, "created successfully");
            Ok(ExitCode::SUCCESS)
        }
        Command::Delete { id, interactive } => {
            let mut session = engine.session()?;
            let mut ask = |task: &Task| {
                prompts::confirm(&format!(
                    "Do you want to delete task {} \"{}\"?",
                    task.id, task.title
                ))
            };
            let confirm: Option<&mut dyn FnMut(&Task) -> bool> =
                if interactive { Some(&mut ask) } else { None };
            match repository::delete(&mut session, id, confirm)? {
                DeleteOutcome::Deleted(task) => {
                    render::task_detail(&task, "deleted successfully");
                    Ok(ExitCode::SUCCESS)
                }
                DeleteOutcome::Cancelled(task) => {
                    println!("Deletion of task {} cancelled", task.id);
                    Ok(ExitCode::from(2))
                }
            }
        }
        Command::Complete { id } => {
            let mut session = engine.session()?;
            let task = repository::complete(&mut session, id)?;
            render::task_detail(&task, "marked as completed");
            Ok(ExitCode::SUCCESS)
        }
        Command::List { sort, reversed } => {
            let session = engine.session()?;
            let tasks = repository::list_all(&session, sort.into(), reversed)?;
            render::task_table(&tasks);
            Ok(ExitCode::SUCCESS)
        }
        Command::Edit(args) => {
            let id = args.id;
            let patch = args.into_patch();
            if patch.is_empty() {
                interactive_edit(&mut engine, id)
            } else {
                let mut session = engine.session()?;
                let task = repository::update(&mut session, id, patch)?;
                render::task_detail(&task, "edited successfully");
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Multi-round edit: one independent update per round, each in its
/// own session and transaction, until the operator declines another
/// change.
fn interactive_edit(engine: &mut StorageEngine, id: TaskId) -> tasklist_core::Result<ExitCode> {
    {
        let session = engine.session()?;
        let task = repository::get_by_id(&session, id)?;
        render::task_detail(&task, "selected for editing");
    }

    loop {
        let Some(field) = prompts::choose_field() else {
            break;
        };
        let patch = match field {
            prompts::EditField::Title => TaskPatch {
                title: Some(prompts::prompt_value("title")),
                ..TaskPatch::default()
            },
            prompts::EditField::Description => TaskPatch {
                description: Some(prompts::prompt_value("description")),
                ..TaskPatch::default()
            },
            prompts::EditField::Complete => TaskPatch::completed(true),
            prompts::EditField::Incomplete => TaskPatch::completed(false),
        };

        let mut session = engine.session()?;
        let task = repository::update(&mut session, id, patch)?;
        render::task_detail(&task, "edited successfully");

        if !prompts::confirm("Would you like to make another change?") {
            break;
        }
    }

    Ok(ExitCode::SUCCESS)
}
