mod cli;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use cli::{Cli, Command};
use kanban::board::BoardState;
use kanban::model::{Record, Status, Task, TaskId};
use kanban::store::{JsonFileStore, TaskStore};
use kanban::subgoal::SubgoalScope;
use kanban::view::{self, CategoryFilter, GroupBy};
use kanban::{fixtures, output, tui};

const DEFAULT_DB: &str = "db.json";

fn init_file_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .init();

    Ok(())
}

fn open_store(db: Option<PathBuf>) -> Result<JsonFileStore> {
    let path = db.unwrap_or_else(|| PathBuf::from(DEFAULT_DB));
    JsonFileStore::open(&path).with_context(|| format!("failed to open {}", path.display()))
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Board {
            subgoals,
            group_by,
            poll_interval,
            log_file,
        } => {
            if let Some(path) = &log_file {
                init_file_logging(path)?;
            }
            let scope = SubgoalScope::parse(&subgoals)?;
            let group_by = GroupBy::parse(&group_by)?;

            let (tasks, store) = match cli.db {
                Some(path) => {
                    let store = JsonFileStore::open(&path)
                        .with_context(|| format!("failed to open {}", path.display()))?;
                    (store.board_tasks(), Some(store))
                }
                None => (fixtures::tasks(), None),
            };
            let mut board = BoardState::new(tasks).with_subgoal_scope(scope);
            board.group_by = group_by;
            tui::run(board, store, poll_interval)?;
        }

        Command::List {
            filter,
            json,
            board,
            group_by,
        } => {
            // Script output goes to stdout; diagnostics honor RUST_LOG.
            env_logger::init();
            let store = open_store(cli.db)?;
            let filter = filter
                .as_deref()
                .map_or(CategoryFilter::All, CategoryFilter::parse);
            if json {
                let records: Vec<Record> = store
                    .list_tasks()
                    .into_iter()
                    .filter(|r| filter.matches(&Task::from_record(r)))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if board {
                let mut state = BoardState::new(store.board_tasks());
                state.filter = filter;
                state.group_by = GroupBy::parse(&group_by)?;
                print!("{}", output::format_board(&view::build_board(&state)));
            } else {
                let tasks = store.board_tasks();
                let visible: Vec<Task> = view::filtered_tasks(&tasks, &filter)
                    .into_iter()
                    .cloned()
                    .collect();
                print!("{}", output::format_task_list(&visible));
            }
        }

        Command::Add {
            title,
            status,
            category,
            assignee,
            points,
        } => {
            env_logger::init();
            let status = Status::parse(&status)?;
            let mut store = open_store(cli.db)?;
            let task = Task {
                id: TaskId::new(""),
                title: title.clone(),
                status,
                category,
                assignee,
                story_points: points,
            };
            let record = store.create_task(task.to_fields())?;
            let id = record.get("id").and_then(Value::as_str).unwrap_or_default();
            println!("{id}");
            eprintln!("Added task '{title}'");
        }

        Command::Move {
            id,
            status,
            assignee,
        } => {
            env_logger::init();
            let status = Status::parse(&status)?;
            let mut store = open_store(cli.db)?;
            let mut fields = Record::new();
            fields.insert("status".into(), Value::String(status.as_str().into()));
            if let Some(assignee) = assignee {
                fields.insert("assignee".into(), Value::String(assignee));
            }
            store.update_task(&TaskId::new(id.as_str()), fields)?;
            eprintln!("Moved '{id}' to {status}");
        }

        Command::Rm { id } => {
            env_logger::init();
            let mut store = open_store(cli.db)?;
            store.delete_task(&TaskId::new(id.as_str()))?;
            eprintln!("Removed task '{id}'");
        }
    }

    Ok(())
}
