use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kanban", about = "Kanban task board backed by a JSON file")]
pub struct Cli {
    /// Path to the JSON task store [default: db.json; the board runs on
    /// seed data when omitted]
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Interactive board
    Board {
        /// Subgoal checklists: one shared list, or one per task
        #[arg(long, default_value = "shared")]
        subgoals: String,
        /// Row grouping (assignee, category)
        #[arg(long, default_value = "assignee")]
        group_by: String,
        /// Key poll interval in milliseconds
        #[arg(long, default_value_t = 1000)]
        poll_interval: u64,
        /// Write logs to this file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// List tasks
    List {
        /// Only tasks in this category ("All" for every task)
        #[arg(long)]
        filter: Option<String>,
        /// Print the stored records as JSON
        #[arg(long, conflicts_with = "board")]
        json: bool,
        /// Print the tasks laid out as board rows
        #[arg(long)]
        board: bool,
        /// Row grouping for --board: "assignee" or "category"
        #[arg(long, default_value = "assignee")]
        group_by: String,
    },

    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Task status (todo, doing, review, done)
        #[arg(short, long, default_value = "todo")]
        status: String,
        /// Task category
        #[arg(short, long, default_value = "")]
        category: String,
        /// Assignee code
        #[arg(short, long, default_value = "")]
        assignee: String,
        /// Story points
        #[arg(short, long, default_value_t = 0)]
        points: u32,
    },

    /// Move a task to another status
    Move {
        /// Task id
        id: String,
        /// New status (todo, doing, review, done)
        status: String,
        /// Reassign the task as well
        #[arg(short, long)]
        assignee: Option<String>,
    },

    /// Remove a task
    Rm {
        /// Task id
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_board_takes_group_by() {
        let cli = Cli::try_parse_from(["kanban", "list", "--board", "--group-by", "category"]).unwrap();
        match cli.command {
            Command::List {
                board, group_by, json, ..
            } => {
                assert!(board);
                assert!(!json);
                assert_eq!(group_by, "category");
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn list_board_and_json_conflict() {
        assert!(Cli::try_parse_from(["kanban", "list", "--board", "--json"]).is_err());
    }
}
