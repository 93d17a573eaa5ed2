//! Board state and the reducer that mutates it.
//!
//! All user intents arrive as [`Action`]s. `apply` mutates in place and
//! reports the task-level [`Change`] a store-backed board has to mirror;
//! [`reduce`] is the pure `(state, action) -> state` form.

use std::collections::HashSet;

use serde_json::Value;

use crate::fixtures;
use crate::model::{clamp_points, Record, Status, Task, TaskId};
use crate::subgoal::{SubgoalAction, SubgoalBook, SubgoalScope};
use crate::view::{AssigneeDirectory, CategoryFilter, GroupBy};

pub const NEW_TASK_TITLE: &str = "New Task";

/// Per-card interaction mode. At most one card is in a mode at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CardMode {
    #[default]
    Idle,
    /// Inline title editing with the uncommitted text.
    Editing { id: TaskId, buffer: String },
    /// Story-point increment/decrement controls revealed.
    AdjustingPoints(TaskId),
}

impl CardMode {
    pub fn task(&self) -> Option<&TaskId> {
        match self {
            Self::Idle => None,
            Self::Editing { id, .. } | Self::AdjustingPoints(id) => Some(id),
        }
    }
}

/// Inline title editing of a subgoal inside the open modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubgoalEdit {
    pub id: u64,
    pub buffer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Drop a card into a cell: new status, and a new assignee when rows
    /// are grouped by assignee.
    MoveTask {
        id: TaskId,
        status: Status,
        group_value: Option<String>,
    },
    SetStoryPoints { id: TaskId, value: i64 },
    IncrementPoints(TaskId),
    DecrementPoints(TaskId),
    RenameTask { id: TaskId, title: String },
    BeginEdit(TaskId),
    BeginSubgoalEdit(u64),
    EditInput(char),
    EditBackspace,
    CommitEdit,
    CancelEdit,
    BeginAdjust(TaskId),
    EndAdjust,
    AddTask,
    DeleteTask(TaskId),
    ToggleCollapse(String),
    SetFilter(CategoryFilter),
    SetGroupBy(GroupBy),
    OpenSubgoals(TaskId),
    CloseSubgoals,
    Subgoal(SubgoalAction),
    ReplaceTasks(Vec<Task>),
}

/// A task-level mutation, as the store sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Created(Task),
    Updated { id: TaskId, fields: Record },
    Deleted(TaskId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    pub tasks: Vec<Task>,
    pub filter: CategoryFilter,
    pub group_by: GroupBy,
    pub collapsed: HashSet<String>,
    pub card_mode: CardMode,
    pub subgoal_modal: Option<TaskId>,
    pub subgoal_edit: Option<SubgoalEdit>,
    pub subgoals: SubgoalBook,
    pub assignees: AssigneeDirectory,
}

impl BoardState {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            filter: CategoryFilter::All,
            group_by: GroupBy::Assignee,
            collapsed: HashSet::new(),
            card_mode: CardMode::Idle,
            subgoal_modal: None,
            subgoal_edit: None,
            subgoals: SubgoalBook::default(),
            assignees: fixtures::assignees(),
        }
    }

    pub fn with_subgoal_scope(mut self, scope: SubgoalScope) -> Self {
        self.subgoals = SubgoalBook::new(scope);
        self
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    fn task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == *id)
    }

    /// Apply `action`, returning the change a store has to mirror, if any.
    pub fn apply(&mut self, action: Action) -> Option<Change> {
        match action {
            Action::MoveTask {
                id,
                status,
                group_value,
            } => self.move_task(&id, status, group_value),
            Action::SetStoryPoints { id, value } => self.set_points(&id, |_| clamp_points(value)),
            Action::IncrementPoints(id) => self.set_points(&id, |p| p.saturating_add(1)),
            // Guarded before subtracting: a decrement at zero changes nothing.
            Action::DecrementPoints(id) => self.set_points(&id, |p| if p == 0 { 0 } else { p - 1 }),
            Action::RenameTask { id, title } => self.rename(&id, title),
            Action::BeginEdit(id) => {
                if let Some(task) = self.task(&id) {
                    let buffer = task.title.clone();
                    self.card_mode = CardMode::Editing { id, buffer };
                }
                None
            }
            Action::BeginSubgoalEdit(subgoal) => {
                if let Some(task) = &self.subgoal_modal {
                    let list = self.subgoals.list_for(task);
                    if let Some(item) = list.items.iter().find(|s| s.id == subgoal) {
                        self.subgoal_edit = Some(SubgoalEdit {
                            id: subgoal,
                            buffer: item.title.clone(),
                        });
                    }
                }
                None
            }
            Action::EditInput(c) => {
                if let Some(buffer) = self.edit_buffer_mut() {
                    buffer.push(c);
                }
                None
            }
            Action::EditBackspace => {
                if let Some(buffer) = self.edit_buffer_mut() {
                    buffer.pop();
                }
                None
            }
            Action::CommitEdit => self.commit_edit(),
            Action::CancelEdit => {
                if self.subgoal_edit.take().is_none() {
                    if let CardMode::Editing { .. } = self.card_mode {
                        self.card_mode = CardMode::Idle;
                    }
                }
                None
            }
            Action::BeginAdjust(id) => {
                if self.task(&id).is_some() {
                    self.card_mode = CardMode::AdjustingPoints(id);
                }
                None
            }
            Action::EndAdjust => {
                if let CardMode::AdjustingPoints(_) = self.card_mode {
                    self.card_mode = CardMode::Idle;
                }
                None
            }
            Action::AddTask => Some(self.add_task()),
            Action::DeleteTask(id) => self.delete_task(&id),
            Action::ToggleCollapse(key) => {
                if !self.collapsed.remove(&key) {
                    self.collapsed.insert(key);
                }
                None
            }
            Action::SetFilter(filter) => {
                self.filter = filter;
                None
            }
            Action::SetGroupBy(group_by) => {
                if group_by != self.group_by {
                    self.group_by = group_by;
                    self.collapsed.clear();
                }
                None
            }
            Action::OpenSubgoals(id) => {
                if self.task(&id).is_some() {
                    self.subgoal_modal = Some(id);
                    self.subgoal_edit = None;
                }
                None
            }
            Action::CloseSubgoals => {
                self.subgoal_modal = None;
                self.subgoal_edit = None;
                None
            }
            Action::Subgoal(action) => {
                if let Some(task) = self.subgoal_modal.clone() {
                    if let Some(added) = self.subgoals.list_for_mut(&task).apply(action) {
                        self.subgoal_edit = Some(SubgoalEdit {
                            id: added,
                            buffer: crate::subgoal::NEW_SUBGOAL_TITLE.to_string(),
                        });
                    }
                }
                None
            }
            Action::ReplaceTasks(tasks) => {
                self.tasks = tasks;
                self.drop_dangling_modes();
                None
            }
        }
    }

    fn move_task(&mut self, id: &TaskId, status: Status, group_value: Option<String>) -> Option<Change> {
        let group_by = self.group_by;
        let task = self.task_mut(id)?;
        let mut fields = Record::new();
        if task.status != status {
            task.status = status;
            fields.insert("status".into(), Value::String(status.as_str().into()));
        }
        if group_by == GroupBy::Assignee {
            if let Some(assignee) = group_value {
                if task.assignee != assignee {
                    fields.insert("assignee".into(), Value::String(assignee.clone()));
                    task.assignee = assignee;
                }
            }
        }
        if fields.is_empty() {
            return None;
        }
        Some(Change::Updated {
            id: id.clone(),
            fields,
        })
    }

    fn set_points(&mut self, id: &TaskId, next: impl FnOnce(u32) -> u32) -> Option<Change> {
        let task = self.task_mut(id)?;
        let value = next(task.story_points);
        if value == task.story_points {
            return None;
        }
        task.story_points = value;
        let mut fields = Record::new();
        fields.insert("storyPoints".into(), Value::from(value));
        Some(Change::Updated {
            id: id.clone(),
            fields,
        })
    }

    fn rename(&mut self, id: &TaskId, title: String) -> Option<Change> {
        if let CardMode::Editing { .. } = self.card_mode {
            self.card_mode = CardMode::Idle;
        }
        let task = self.task_mut(id)?;
        if task.title == title {
            return None;
        }
        task.title = title.clone();
        let mut fields = Record::new();
        fields.insert("title".into(), Value::String(title));
        Some(Change::Updated {
            id: id.clone(),
            fields,
        })
    }

    fn edit_buffer_mut(&mut self) -> Option<&mut String> {
        if let Some(edit) = &mut self.subgoal_edit {
            return Some(&mut edit.buffer);
        }
        match &mut self.card_mode {
            CardMode::Editing { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    fn commit_edit(&mut self) -> Option<Change> {
        if let Some(edit) = self.subgoal_edit.take() {
            if let Some(task) = self.subgoal_modal.clone() {
                self.subgoals.list_for_mut(&task).rename(edit.id, &edit.buffer);
            }
            return None;
        }
        match std::mem::take(&mut self.card_mode) {
            CardMode::Editing { id, buffer } => self.rename(&id, buffer),
            other => {
                self.card_mode = other;
                None
            }
        }
    }

    fn add_task(&mut self) -> Change {
        let id = TaskId::next_sequential(self.tasks.iter().map(|t| &t.id));
        let category = match &self.filter {
            CategoryFilter::Category(c) => c.clone(),
            CategoryFilter::All => String::new(),
        };
        let task = Task {
            id: id.clone(),
            title: NEW_TASK_TITLE.to_string(),
            status: Status::Todo,
            category,
            assignee: String::new(),
            story_points: 0,
        };
        self.tasks.push(task.clone());
        self.card_mode = CardMode::Editing {
            id,
            buffer: NEW_TASK_TITLE.to_string(),
        };
        Change::Created(task)
    }

    fn delete_task(&mut self, id: &TaskId) -> Option<Change> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != *id);
        if self.tasks.len() == before {
            return None;
        }
        self.subgoals.forget(id);
        self.drop_dangling_modes();
        Some(Change::Deleted(id.clone()))
    }

    /// Swap a task's id after the store assigned its own.
    pub fn rekey(&mut self, from: &TaskId, to: TaskId) {
        if let Some(task) = self.task_mut(from) {
            task.id = to.clone();
        }
        match &mut self.card_mode {
            CardMode::Editing { id, .. } | CardMode::AdjustingPoints(id) if id == from => {
                *id = to.clone();
            }
            _ => {}
        }
        if self.subgoal_modal.as_ref() == Some(from) {
            self.subgoal_modal = Some(to);
        }
    }

    fn drop_dangling_modes(&mut self) {
        if let Some(id) = self.card_mode.task() {
            if self.task(id).is_none() {
                self.card_mode = CardMode::Idle;
            }
        }
        if let Some(id) = &self.subgoal_modal {
            if self.task(id).is_none() {
                self.subgoal_modal = None;
                self.subgoal_edit = None;
            }
        }
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new(fixtures::tasks())
    }
}

/// Pure transition function over owned board state.
pub fn reduce(mut state: BoardState, action: Action) -> BoardState {
    state.apply(action);
    state
}
