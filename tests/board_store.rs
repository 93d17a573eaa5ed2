//! A store-backed board session: edits made through the reducer land in the
//! JSON file and come back unchanged on the next start.

use kanban::board::{Action, BoardState};
use kanban::dnd::{Cell, Draggable, DropTarget};
use kanban::model::{Status, TaskId};
use kanban::output;
use kanban::store::{JsonFileStore, TaskStore};
use kanban::sync;
use kanban::view::{build_board, CategoryFilter, GroupBy};

fn dispatch(store: &mut JsonFileStore, board: &mut BoardState, action: Action) {
    if let Some(change) = board.apply(action) {
        sync::push_change(store, board, change).unwrap();
    }
}

#[test]
fn session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");

    let mut store = JsonFileStore::open(&path).unwrap();
    let mut board = BoardState::new(store.board_tasks());
    assert!(board.tasks.is_empty());

    dispatch(&mut store, &mut board, Action::SetFilter(CategoryFilter::parse("Backend")));
    dispatch(&mut store, &mut board, Action::AddTask);
    for _ in 0.."New Task".len() {
        dispatch(&mut store, &mut board, Action::EditBackspace);
    }
    for c in "Persist tasks".chars() {
        dispatch(&mut store, &mut board, Action::EditInput(c));
    }
    dispatch(&mut store, &mut board, Action::CommitEdit);

    let id = board.tasks[0].id.clone();
    // The store chose the id; the local sequential one is gone.
    assert_ne!(id, TaskId::from("0"));

    let target = Cell {
        status: Status::Review,
        group_value: "SK".into(),
    };
    let moved = target.on_drop(board.tasks[0].drag_payload()).unwrap();
    dispatch(&mut store, &mut board, moved);
    dispatch(&mut store, &mut board, Action::IncrementPoints(id.clone()));
    dispatch(&mut store, &mut board, Action::IncrementPoints(id.clone()));
    dispatch(&mut store, &mut board, Action::DecrementPoints(id.clone()));

    drop(store);
    let reopened = JsonFileStore::open(&path).unwrap();
    let mut restarted = BoardState::new(reopened.board_tasks());
    assert_eq!(restarted.tasks, board.tasks);

    let task = &restarted.tasks[0];
    assert_eq!(task.title, "Persist tasks");
    assert_eq!(task.status, Status::Review);
    assert_eq!(task.assignee, "SK");
    assert_eq!(task.category, "Backend");
    assert_eq!(task.story_points, 1);

    restarted.group_by = GroupBy::Category;
    let text = output::format_board(&build_board(&restarted));
    assert_eq!(text, "Backend (1 pts)\n  Review  Persist tasks\n");
}

#[test]
fn records_keep_unknown_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    std::fs::write(
        &path,
        r#"{"tasks":[{"id":"abc","title":"Imported","status":"doing","storyPoints":4,"priority":"high"}]}"#,
    )
    .unwrap();

    let mut store = JsonFileStore::open(&path).unwrap();
    let mut board = BoardState::new(store.board_tasks());
    dispatch(
        &mut store,
        &mut board,
        Action::MoveTask {
            id: TaskId::from("abc"),
            status: Status::Done,
            group_value: None,
        },
    );

    let records = JsonFileStore::open(&path).unwrap().list_tasks();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["status"], "done");
    assert_eq!(records[0]["priority"], "high");
}

#[test]
fn filtered_board_listing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    std::fs::write(
        &path,
        r#"{"tasks":[
            {"id":"1","title":"API","status":"todo","category":"Backend","assignee":"SK","storyPoints":3},
            {"id":"2","title":"Styles","status":"done","category":"Frontend","assignee":"SK","storyPoints":2},
            {"id":"3","title":"Schema","status":"doing","category":"Backend","storyPoints":1}
        ]}"#,
    )
    .unwrap();

    let store = JsonFileStore::open(&path).unwrap();
    let mut board = BoardState::new(store.board_tasks());
    board.filter = CategoryFilter::parse("Backend");
    let text = output::format_board(&build_board(&board));
    assert!(text.contains("API"));
    assert!(text.contains("Schema"));
    assert!(!text.contains("Styles"));
}
