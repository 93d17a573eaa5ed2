//! Subgoal checklists opened from a task card.

use std::collections::HashMap;

use crate::fixtures;
use crate::model::{next_numeric_id, Subgoal, SubgoalStatus, TaskId};

pub const NEW_SUBGOAL_TITLE: &str = "New Subgoal";

/// How checklists relate to the task that opens them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubgoalScope {
    /// One checklist shared by every task.
    #[default]
    Shared,
    /// An independent checklist per task, each seeded from the fixture list.
    PerTask,
}

impl SubgoalScope {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "shared" => Ok(Self::Shared),
            "per-task" => Ok(Self::PerTask),
            _ => anyhow::bail!("invalid subgoal scope '{s}': must be shared or per-task"),
        }
    }
}

/// Mutations on one checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubgoalAction {
    Add,
    Rename { id: u64, title: String },
    SetStatus { id: u64, status: SubgoalStatus },
    CycleStatus(u64),
    Delete(u64),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubgoalList {
    pub items: Vec<Subgoal>,
}

impl SubgoalList {
    pub fn new(items: Vec<Subgoal>) -> Self {
        Self { items }
    }

    /// Append a fresh "New Subgoal" entry and return its id.
    pub fn add(&mut self) -> u64 {
        let id = next_numeric_id(self.items.iter().map(|s| s.id));
        self.items.push(Subgoal {
            id,
            title: NEW_SUBGOAL_TITLE.to_string(),
            status: SubgoalStatus::Todo,
        });
        id
    }

    pub fn rename(&mut self, id: u64, title: &str) {
        if let Some(item) = self.items.iter_mut().find(|s| s.id == id) {
            item.title = title.to_string();
        }
    }

    pub fn set_status(&mut self, id: u64, status: SubgoalStatus) {
        if let Some(item) = self.items.iter_mut().find(|s| s.id == id) {
            item.status = status;
        }
    }

    pub fn delete(&mut self, id: u64) {
        self.items.retain(|s| s.id != id);
    }

    /// Apply an action, returning the id of a newly added entry.
    pub fn apply(&mut self, action: SubgoalAction) -> Option<u64> {
        match action {
            SubgoalAction::Add => return Some(self.add()),
            SubgoalAction::Rename { id, title } => self.rename(id, &title),
            SubgoalAction::SetStatus { id, status } => self.set_status(id, status),
            SubgoalAction::CycleStatus(id) => {
                if let Some(status) = self.items.iter().find(|s| s.id == id).map(|s| s.status) {
                    self.set_status(id, status.cycle());
                }
            }
            SubgoalAction::Delete(id) => self.delete(id),
        }
        None
    }

    pub fn done_count(&self) -> usize {
        self.items
            .iter()
            .filter(|s| s.status == SubgoalStatus::Done)
            .count()
    }
}

/// All checklists the board knows about, resolved according to the scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubgoalBook {
    scope: SubgoalScope,
    shared: SubgoalList,
    per_task: HashMap<TaskId, SubgoalList>,
}

impl SubgoalBook {
    pub fn new(scope: SubgoalScope) -> Self {
        Self {
            scope,
            shared: fixtures::subgoals(),
            per_task: HashMap::new(),
        }
    }

    pub fn scope(&self) -> SubgoalScope {
        self.scope
    }

    /// The checklist shown for `task`, without creating it.
    pub fn list_for(&self, task: &TaskId) -> SubgoalList {
        match self.scope {
            SubgoalScope::Shared => self.shared.clone(),
            SubgoalScope::PerTask => self
                .per_task
                .get(task)
                .cloned()
                .unwrap_or_else(fixtures::subgoals),
        }
    }

    pub fn list_for_mut(&mut self, task: &TaskId) -> &mut SubgoalList {
        match self.scope {
            SubgoalScope::Shared => &mut self.shared,
            SubgoalScope::PerTask => self
                .per_task
                .entry(task.clone())
                .or_insert_with(fixtures::subgoals),
        }
    }

    /// Drop the per-task checklist of a deleted task.
    pub fn forget(&mut self, task: &TaskId) {
        self.per_task.remove(task);
    }
}

impl Default for SubgoalBook {
    fn default() -> Self {
        Self::new(SubgoalScope::default())
    }
}
