//! Drag-and-drop as two capability roles.
//!
//! A [`Draggable`] hands out a payload naming itself; a [`DropTarget`]
//! decides whether it accepts a payload and which board action a drop turns
//! into. Nothing is transferred between the two except the payload.

use crate::board::Action;
use crate::model::{Status, Task, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    Task(TaskId),
}

pub trait Draggable {
    fn drag_payload(&self) -> DragPayload;
}

pub trait DropTarget {
    fn accepts(&self, payload: &DragPayload) -> bool;

    /// The action a drop of `payload` triggers, or `None` if refused.
    fn on_drop(&self, payload: DragPayload) -> Option<Action>;
}

impl Draggable for Task {
    fn drag_payload(&self) -> DragPayload {
        DragPayload::Task(self.id.clone())
    }
}

/// One board cell: a status column within a group row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub status: Status,
    pub group_value: String,
}

impl DropTarget for Cell {
    fn accepts(&self, payload: &DragPayload) -> bool {
        matches!(payload, DragPayload::Task(_))
    }

    fn on_drop(&self, payload: DragPayload) -> Option<Action> {
        if !self.accepts(&payload) {
            return None;
        }
        let DragPayload::Task(id) = payload;
        Some(Action::MoveTask {
            id,
            status: self.status,
            group_value: Some(self.group_value.clone()),
        })
    }
}
