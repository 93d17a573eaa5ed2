use crate::board::{Action, BoardState};
use crate::dnd::{Cell, DragPayload, Draggable, DropTarget};
use crate::model::{Status, TaskId};
use crate::store::{JsonFileStore, TaskStore};
use crate::sync;
use crate::view::{build_board, BoardView, CategoryFilter};

/// Selected position on the board grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
    pub card: usize,
}

pub struct App {
    pub board: BoardState,
    pub store: Option<JsonFileStore>,
    pub cursor: Cursor,
    pub drag: Option<DragPayload>,
    pub subgoal_cursor: usize,
    pub show_help: bool,
    pub error: Option<String>,
}

impl App {
    pub fn new(board: BoardState, store: Option<JsonFileStore>) -> Self {
        Self {
            board,
            store,
            cursor: Cursor::default(),
            drag: None,
            subgoal_cursor: 0,
            show_help: false,
            error: None,
        }
    }

    pub fn view(&self) -> BoardView<'_> {
        build_board(&self.board)
    }

    /// Apply an action and mirror its change into the store, if any.
    pub fn dispatch(&mut self, action: Action) {
        let Some(change) = self.board.apply(action) else {
            return;
        };
        if let Some(store) = &mut self.store {
            if let Err(e) = sync::push_change(store, &mut self.board, change) {
                log::warn!("store write failed: {e}");
                self.error = Some(e.to_string());
            }
        }
    }

    /// Re-read the store after an external write.
    pub fn refresh(&mut self) {
        let Some(store) = &mut self.store else {
            return;
        };
        match store.reload() {
            Ok(()) => {
                let tasks = store.board_tasks();
                self.board.apply(Action::ReplaceTasks(tasks));
                self.clamp_cursor();
            }
            Err(e) => {
                log::warn!("store reload failed: {e}");
                self.error = Some(e.to_string());
            }
        }
    }

    fn cell_len(view: &BoardView, cursor: Cursor) -> usize {
        view.rows
            .get(cursor.row)
            .filter(|r| !r.collapsed)
            .and_then(|r| r.columns.get(cursor.col))
            .map_or(0, |c| c.tasks.len())
    }

    pub fn clamp_cursor(&mut self) {
        let view = self.view();
        let mut cursor = self.cursor;
        if view.rows.is_empty() {
            cursor = Cursor {
                col: cursor.col,
                ..Cursor::default()
            };
        } else if cursor.row >= view.rows.len() {
            cursor.row = view.rows.len() - 1;
        }
        cursor.col = cursor.col.min(Status::ALL.len() - 1);
        let len = Self::cell_len(&view, cursor);
        cursor.card = cursor.card.min(len.saturating_sub(1));
        self.cursor = cursor;
    }

    pub fn move_left(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
            self.clamp_cursor();
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor.col + 1 < Status::ALL.len() {
            self.cursor.col += 1;
            self.clamp_cursor();
        }
    }

    pub fn move_down(&mut self) {
        let view = self.view();
        let len = Self::cell_len(&view, self.cursor);
        let mut cursor = self.cursor;
        if cursor.card + 1 < len {
            cursor.card += 1;
        } else if cursor.row + 1 < view.rows.len() {
            cursor.row += 1;
            cursor.card = 0;
        }
        self.cursor = cursor;
    }

    pub fn move_up(&mut self) {
        let view = self.view();
        let mut cursor = self.cursor;
        if cursor.card > 0 {
            cursor.card -= 1;
        } else if cursor.row > 0 {
            cursor.row -= 1;
            cursor.card = Self::cell_len(&view, cursor).saturating_sub(1);
        }
        self.cursor = cursor;
    }

    /// The task under the cursor.
    pub fn selected_task(&self) -> Option<TaskId> {
        let view = self.view();
        view.rows
            .get(self.cursor.row)
            .filter(|r| !r.collapsed)
            .and_then(|r| r.columns.get(self.cursor.col))
            .and_then(|c| c.tasks.get(self.cursor.card))
            .map(|t| t.id.clone())
    }

    /// The group key of the row under the cursor.
    pub fn selected_row_key(&self) -> Option<String> {
        self.view().rows.get(self.cursor.row).map(|r| r.key.clone())
    }

    /// The drop target under the cursor.
    pub fn selected_cell(&self) -> Option<Cell> {
        let key = self.selected_row_key()?;
        Some(Cell {
            status: Status::ALL[self.cursor.col],
            group_value: key,
        })
    }

    pub fn toggle_collapse(&mut self) {
        if let Some(key) = self.selected_row_key() {
            self.dispatch(Action::ToggleCollapse(key));
            self.clamp_cursor();
        }
    }

    pub fn pick_up(&mut self) {
        let view = self.view();
        let payload = view
            .rows
            .get(self.cursor.row)
            .filter(|r| !r.collapsed)
            .and_then(|r| r.columns.get(self.cursor.col))
            .and_then(|c| c.tasks.get(self.cursor.card))
            .map(|task| task.drag_payload());
        self.drag = payload;
    }

    pub fn drop_here(&mut self) {
        let Some(payload) = self.drag.take() else {
            return;
        };
        let Some(cell) = self.selected_cell() else {
            return;
        };
        if let Some(action) = cell.on_drop(payload.clone()) {
            self.dispatch(action);
            self.focus(&payload);
        }
    }

    /// Put the cursor on the card carrying `payload`, if visible.
    fn focus(&mut self, payload: &DragPayload) {
        let DragPayload::Task(id) = payload;
        let view = self.view();
        let found = view.rows.iter().enumerate().find_map(|(r, row)| {
            row.columns.iter().enumerate().find_map(|(c, col)| {
                col.tasks
                    .iter()
                    .position(|t| t.id == *id)
                    .map(|card| Cursor { row: r, col: c, card })
            })
        });
        if let Some(cursor) = found {
            self.cursor = cursor;
        } else {
            self.clamp_cursor();
        }
    }

    pub fn add_task(&mut self) {
        self.dispatch(Action::AddTask);
        if let Some(id) = self.board.card_mode.task().cloned() {
            self.focus(&DragPayload::Task(id));
        }
    }

    pub fn cycle_filter(&mut self) {
        let options = self.view().filter_options;
        let current = options
            .iter()
            .position(|f| *f == self.board.filter)
            .unwrap_or(0);
        let next = options
            .get(current + 1)
            .cloned()
            .unwrap_or(CategoryFilter::All);
        self.dispatch(Action::SetFilter(next));
        self.clamp_cursor();
    }

    pub fn toggle_group_by(&mut self) {
        self.dispatch(Action::SetGroupBy(self.board.group_by.toggle()));
        self.cursor = Cursor {
            col: self.cursor.col,
            ..Cursor::default()
        };
        self.clamp_cursor();
    }

    pub fn subgoal_count(&self) -> usize {
        self.board
            .subgoal_modal
            .as_ref()
            .map_or(0, |id| self.board.subgoals.list_for(id).items.len())
    }

    /// Id of the subgoal under the modal cursor.
    pub fn selected_subgoal(&self) -> Option<u64> {
        let id = self.board.subgoal_modal.as_ref()?;
        self.board
            .subgoals
            .list_for(id)
            .items
            .get(self.subgoal_cursor)
            .map(|s| s.id)
    }

    pub fn clamp_subgoal_cursor(&mut self) {
        self.subgoal_cursor = self
            .subgoal_cursor
            .min(self.subgoal_count().saturating_sub(1));
    }
}
