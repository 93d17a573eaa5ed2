use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::App;
use crate::board::{Action, CardMode};
use crate::subgoal::SubgoalAction;

pub enum KeyAction {
    Quit,
    /// Re-read the store.
    Refresh,
    Continue,
}

/// Handle a key press. Modal layers take precedence in order: help,
/// inline editing, the subgoal modal, a card being dragged, the points
/// controls, and finally board navigation.
pub fn handle_key(app: &mut App, key: KeyEvent) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }

    if app.show_help {
        if matches!(
            key.code,
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc
        ) {
            app.show_help = false;
        }
        return KeyAction::Continue;
    }

    if app.board.subgoal_edit.is_some() || matches!(app.board.card_mode, CardMode::Editing { .. }) {
        handle_edit_key(app, key);
        return KeyAction::Continue;
    }

    if app.board.subgoal_modal.is_some() {
        handle_subgoal_key(app, key);
        return KeyAction::Continue;
    }

    if app.drag.is_some() {
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => app.move_left(),
            KeyCode::Char('l') | KeyCode::Right => app.move_right(),
            KeyCode::Char('j') | KeyCode::Down => app.move_down(),
            KeyCode::Char('k') | KeyCode::Up => app.move_up(),
            KeyCode::Enter | KeyCode::Char('m') => app.drop_here(),
            KeyCode::Esc => app.drag = None,
            _ => {}
        }
        return KeyAction::Continue;
    }

    if let CardMode::AdjustingPoints(id) = app.board.card_mode.clone() {
        match key.code {
            KeyCode::Char('+') | KeyCode::Char('=') => {
                app.dispatch(Action::IncrementPoints(id));
                return KeyAction::Continue;
            }
            KeyCode::Char('-') | KeyCode::Char('_') => {
                app.dispatch(Action::DecrementPoints(id));
                return KeyAction::Continue;
            }
            KeyCode::Esc | KeyCode::Char('p') => {
                app.dispatch(Action::EndAdjust);
                return KeyAction::Continue;
            }
            // Any other key closes the controls and acts as usual.
            _ => app.dispatch(Action::EndAdjust),
        }
    }

    app.error = None;
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
        KeyCode::Char('h') | KeyCode::Left => app.move_left(),
        KeyCode::Char('l') | KeyCode::Right => app.move_right(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char(' ') => app.toggle_collapse(),
        KeyCode::Char('m') => app.pick_up(),
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(id) = app.selected_task() {
                app.dispatch(Action::BeginEdit(id));
            }
        }
        KeyCode::Char('p') => {
            if let Some(id) = app.selected_task() {
                app.dispatch(Action::BeginAdjust(id));
            }
        }
        KeyCode::Char('a') => app.add_task(),
        KeyCode::Char('d') => {
            if let Some(id) = app.selected_task() {
                app.dispatch(Action::DeleteTask(id));
                app.clamp_cursor();
            }
        }
        KeyCode::Char('s') => {
            if let Some(id) = app.selected_task() {
                app.subgoal_cursor = 0;
                app.dispatch(Action::OpenSubgoals(id));
            }
        }
        KeyCode::Char('f') => app.cycle_filter(),
        KeyCode::Char('g') => app.toggle_group_by(),
        KeyCode::Char('r') => return KeyAction::Refresh,
        KeyCode::Char('?') => app.show_help = true,
        _ => {}
    }
    KeyAction::Continue
}

fn handle_edit_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.dispatch(Action::CommitEdit),
        KeyCode::Esc => app.dispatch(Action::CancelEdit),
        KeyCode::Backspace => app.dispatch(Action::EditBackspace),
        KeyCode::Char(c) => app.dispatch(Action::EditInput(c)),
        _ => {}
    }
}

fn handle_subgoal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.dispatch(Action::CloseSubgoals),
        KeyCode::Char('j') | KeyCode::Down => {
            if app.subgoal_cursor + 1 < app.subgoal_count() {
                app.subgoal_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.subgoal_cursor = app.subgoal_cursor.saturating_sub(1);
        }
        KeyCode::Char('a') => {
            app.dispatch(Action::Subgoal(SubgoalAction::Add));
            app.subgoal_cursor = app.subgoal_count().saturating_sub(1);
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(id) = app.selected_subgoal() {
                app.dispatch(Action::BeginSubgoalEdit(id));
            }
        }
        KeyCode::Char(' ') | KeyCode::Char('s') => {
            if let Some(id) = app.selected_subgoal() {
                app.dispatch(Action::Subgoal(SubgoalAction::CycleStatus(id)));
            }
        }
        KeyCode::Char('d') => {
            if let Some(id) = app.selected_subgoal() {
                app.dispatch(Action::Subgoal(SubgoalAction::Delete(id)));
                app.clamp_subgoal_cursor();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardState;
    use crate::model::{Status, SubgoalStatus, Task, TaskId};

    fn make_task(id: &str, status: Status, assignee: &str) -> Task {
        Task {
            id: TaskId::from(id),
            title: format!("task {id}"),
            status,
            category: "Backend".into(),
            assignee: assignee.into(),
            story_points: 1,
        }
    }

    fn app() -> App {
        App::new(
            BoardState::new(vec![
                make_task("1", Status::Todo, "AM"),
                make_task("2", Status::Doing, "JL"),
            ]),
            None,
        )
    }

    fn press(app: &mut App, code: KeyCode) -> KeyAction {
        handle_key(app, KeyEvent::from(code))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn handle_key_quit() {
        let mut app = app();
        assert!(matches!(press(&mut app, KeyCode::Char('q')), KeyAction::Quit));
    }

    #[test]
    fn handle_key_ctrl_c_quits_from_edit_mode() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(handle_key(&mut app, key), KeyAction::Quit));
    }

    #[test]
    fn handle_key_refresh() {
        let mut app = app();
        assert!(matches!(press(&mut app, KeyCode::Char('r')), KeyAction::Refresh));
    }

    #[test]
    fn handle_key_help_swallows_keys_until_closed() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        assert!(matches!(press(&mut app, KeyCode::Char('q')), KeyAction::Continue));
        assert!(!app.show_help);
    }

    #[test]
    fn handle_key_edit_types_into_title() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        // 'q' is text while editing, not quit.
        type_str(&mut app, "q!");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.board.tasks[0].title, "task 1q");
        assert_eq!(app.board.card_mode, CardMode::Idle);
    }

    #[test]
    fn handle_key_escape_cancels_edit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, "xyz");
        assert!(matches!(press(&mut app, KeyCode::Esc), KeyAction::Continue));
        assert_eq!(app.board.tasks[0].title, "task 1");
    }

    #[test]
    fn handle_key_points_controls() {
        let mut app = app();
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char('+'));
        press(&mut app, KeyCode::Char('+'));
        assert_eq!(app.board.tasks[0].story_points, 3);
        for _ in 0..5 {
            press(&mut app, KeyCode::Char('-'));
        }
        assert_eq!(app.board.tasks[0].story_points, 0);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.board.card_mode, CardMode::Idle);
    }

    #[test]
    fn handle_key_other_key_closes_points_controls_and_acts() {
        let mut app = app();
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.board.card_mode, CardMode::Idle);
        assert_eq!(app.cursor.col, 1);
    }

    #[test]
    fn handle_key_drag_and_drop() {
        let mut app = app();
        press(&mut app, KeyCode::Char('m'));
        assert!(app.drag.is_some());
        // Quit is not available mid-drag.
        assert!(matches!(press(&mut app, KeyCode::Char('q')), KeyAction::Continue));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.board.tasks[0].status, Status::Done);
        assert_eq!(app.board.tasks[0].assignee, "AM");
    }

    #[test]
    fn handle_key_escape_cancels_drag() {
        let mut app = app();
        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Esc);
        assert!(app.drag.is_none());
        assert_eq!(app.board.tasks[0].status, Status::Todo);
    }

    #[test]
    fn handle_key_delete_removes_selected_card() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.board.tasks.len(), 1);
        assert_eq!(app.board.tasks[0].id.as_str(), "2");
    }

    #[test]
    fn handle_key_group_and_filter() {
        let mut app = app();
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.board.group_by, crate::view::GroupBy::Category);
        press(&mut app, KeyCode::Char('f'));
        assert_ne!(app.board.filter, crate::view::CategoryFilter::All);
    }

    #[test]
    fn handle_key_subgoal_modal() {
        let mut app = app();
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.board.subgoal_modal, Some(TaskId::from("1")));

        // Cycle the first subgoal: todo -> doing.
        press(&mut app, KeyCode::Char(' '));
        let id = TaskId::from("1");
        assert_eq!(
            app.board.subgoals.list_for(&id).items[0].status,
            SubgoalStatus::Doing
        );

        // Add enters edit mode on the new item.
        press(&mut app, KeyCode::Char('a'));
        assert!(app.board.subgoal_edit.is_some());
        type_str(&mut app, " A");
        press(&mut app, KeyCode::Enter);
        let list = app.board.subgoals.list_for(&id);
        assert_eq!(list.items.last().unwrap().title, "New Subgoal A");
        assert_eq!(app.subgoal_cursor, list.items.len() - 1);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.board.subgoals.list_for(&id).items.len(), 4);

        press(&mut app, KeyCode::Esc);
        assert!(app.board.subgoal_modal.is_none());
    }
}
