//! Derived views over the board state.
//!
//! Everything here is recomputed from scratch after each state change.

use std::collections::{BTreeSet, HashMap};

use crate::board::BoardState;
use crate::fixtures;
use crate::model::{Status, Subgoal, SubgoalStatus, Task};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    pub fn parse(s: &str) -> Self {
        if s == "All" {
            Self::All
        } else {
            Self::Category(s.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => "All",
            Self::Category(c) => c,
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Category(c) => task.category == *c,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GroupBy {
    #[default]
    Assignee,
    Category,
}

impl GroupBy {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "assignee" => Ok(Self::Assignee),
            "category" => Ok(Self::Category),
            _ => anyhow::bail!("invalid group-by '{s}': must be assignee or category"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assignee => "assignee",
            Self::Category => "category",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Assignee => Self::Category,
            Self::Category => Self::Assignee,
        }
    }

    /// The field of `task` this mode groups on.
    pub fn value_of(self, task: &Task) -> &str {
        match self {
            Self::Assignee => &task.assignee,
            Self::Category => &task.category,
        }
    }
}

/// Maps assignee codes to display names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssigneeDirectory(HashMap<String, String>);

impl AssigneeDirectory {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(code, name)| (code.to_string(), name.to_string()))
                .collect(),
        )
    }

    /// Display name for `code`; unknown codes have an empty name.
    pub fn display_name(&self, code: &str) -> &str {
        self.0.get(code).map_or("", String::as_str)
    }
}

pub fn filtered_tasks<'a>(tasks: &'a [Task], filter: &CategoryFilter) -> Vec<&'a Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}

/// Sorted unique group values. Assignee rows sort by display name, then code.
pub fn group_values(tasks: &[&Task], group_by: GroupBy, directory: &AssigneeDirectory) -> Vec<String> {
    let unique: BTreeSet<&str> = tasks.iter().map(|t| group_by.value_of(t)).collect();
    let mut values: Vec<String> = unique.into_iter().map(str::to_string).collect();
    if group_by == GroupBy::Assignee {
        values.sort_by(|a, b| {
            directory
                .display_name(a)
                .cmp(directory.display_name(b))
                .then_with(|| a.cmp(b))
        });
    }
    values
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column<'a> {
    pub status: Status,
    pub tasks: Vec<&'a Task>,
}

impl Column<'_> {
    /// Totals are widened so any number of maximal cards still adds up.
    pub fn points(&self) -> u64 {
        self.tasks.iter().map(|t| u64::from(t.story_points)).sum()
    }
}

/// One column per status, each holding the tasks of `value` in list order.
pub fn columns<'a>(tasks: &[&'a Task], group_by: GroupBy, value: &str) -> Vec<Column<'a>> {
    Status::ALL
        .iter()
        .map(|&status| Column {
            status,
            tasks: tasks
                .iter()
                .copied()
                .filter(|t| t.status == status && group_by.value_of(t) == value)
                .collect(),
        })
        .collect()
}

/// Percentage of done subgoals, rounded to the nearest integer.
pub fn completion_percent(items: &[Subgoal]) -> u32 {
    if items.is_empty() {
        return 0;
    }
    let done = items
        .iter()
        .filter(|s| s.status == SubgoalStatus::Done)
        .count();
    (100.0 * done as f64 / items.len() as f64).round() as u32
}

/// "All" followed by every known category, sorted.
pub fn filter_options(tasks: &[Task]) -> Vec<CategoryFilter> {
    let categories: BTreeSet<&str> = fixtures::CATEGORIES
        .iter()
        .copied()
        .chain(tasks.iter().map(|t| t.category.as_str()))
        .filter(|c| !c.is_empty())
        .collect();
    std::iter::once(CategoryFilter::All)
        .chain(categories.into_iter().map(|c| CategoryFilter::Category(c.to_string())))
        .collect()
}

/// Header text for a row.
pub fn row_label(group_by: GroupBy, value: &str, directory: &AssigneeDirectory) -> String {
    if value.is_empty() {
        return match group_by {
            GroupBy::Assignee => "Unassigned".to_string(),
            GroupBy::Category => "Uncategorized".to_string(),
        };
    }
    match group_by {
        GroupBy::Assignee => match directory.display_name(value) {
            "" => value.to_string(),
            name => format!("{name} ({value})"),
        },
        GroupBy::Category => value.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView<'a> {
    pub key: String,
    pub label: String,
    pub collapsed: bool,
    pub columns: Vec<Column<'a>>,
}

impl RowView<'_> {
    pub fn points(&self) -> u64 {
        self.columns.iter().map(Column::points).sum()
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView<'a> {
    pub rows: Vec<RowView<'a>>,
    /// Story points per status, in column order.
    pub status_points: [u64; 4],
    pub filter_options: Vec<CategoryFilter>,
}

pub fn build_board(state: &BoardState) -> BoardView<'_> {
    let visible = filtered_tasks(&state.tasks, &state.filter);
    let rows = group_values(&visible, state.group_by, &state.assignees)
        .into_iter()
        .map(|key| RowView {
            label: row_label(state.group_by, &key, &state.assignees),
            collapsed: state.collapsed.contains(&key),
            columns: columns(&visible, state.group_by, &key),
            key,
        })
        .collect();

    let mut status_points = [0; 4];
    for task in &visible {
        status_points[task.status.index()] += u64::from(task.story_points);
    }

    BoardView {
        rows,
        status_points,
        filter_options: filter_options(&state.tasks),
    }
}
