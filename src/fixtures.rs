//! Seed data for boards that run without a store.

use crate::model::{Status, Subgoal, SubgoalStatus, Task, TaskId};
use crate::subgoal::SubgoalList;
use crate::view::AssigneeDirectory;

/// Categories offered by the filter selector before any task exists.
pub const CATEGORIES: [&str; 4] = ["Frontend", "Backend", "DevOps", "Testing"];

fn task(id: &str, title: &str, status: Status, category: &str, assignee: &str, points: u32) -> Task {
    Task {
        id: TaskId::from(id),
        title: title.to_string(),
        status,
        category: category.to_string(),
        assignee: assignee.to_string(),
        story_points: points,
    }
}

pub fn tasks() -> Vec<Task> {
    vec![
        task("1", "Design login page", Status::Todo, "Frontend", "AM", 3),
        task("2", "Set up CI pipeline", Status::Doing, "DevOps", "JL", 5),
        task("3", "REST endpoints for tasks", Status::Doing, "Backend", "SK", 8),
        task("4", "Board drag and drop", Status::Review, "Frontend", "AM", 5),
        task("5", "Write API tests", Status::Todo, "Testing", "PR", 2),
        task("6", "Deploy application in dev", Status::Done, "DevOps", "JL", 3),
        task("7", "Story point counters", Status::Todo, "Frontend", "SK", 1),
    ]
}

pub fn subgoals() -> SubgoalList {
    let item = |id, title: &str, status| Subgoal {
        id,
        title: title.to_string(),
        status,
    };
    SubgoalList::new(vec![
        item(1, "Deploy", SubgoalStatus::Todo),
        item(2, "Test it", SubgoalStatus::Todo),
        item(3, "Subgoal Label", SubgoalStatus::Done),
        item(4, "Subgoal Label", SubgoalStatus::Done),
    ])
}

pub fn assignees() -> AssigneeDirectory {
    AssigneeDirectory::from_pairs([
        ("AM", "Alice Martin"),
        ("JL", "Jonas Lee"),
        ("SK", "Sara Kowalski"),
        ("PR", "Priya Rao"),
    ])
}
