use crate::model::Task;
use crate::view::BoardView;

pub fn format_task_list(tasks: &[Task]) -> String {
    let mut out = String::new();
    for task in tasks {
        let owner = match (task.assignee.is_empty(), task.category.is_empty()) {
            (false, false) => format!(" ({}, {})", task.assignee, task.category),
            (false, true) => format!(" ({})", task.assignee),
            (true, false) => format!(" ({})", task.category),
            (true, true) => String::new(),
        };
        out.push_str(&format!(
            "{} {} [{}] {}{}  {} pts\n",
            task.status.icon(),
            task.id,
            task.status,
            task.title,
            owner,
            task.story_points
        ));
    }
    out
}

/// Plain-text rendition of the board: one block per row, one line per
/// non-empty column.
pub fn format_board(view: &BoardView) -> String {
    let mut out = String::new();
    for row in &view.rows {
        out.push_str(&format!("{} ({} pts)\n", row.label, row.points()));
        if row.collapsed {
            continue;
        }
        for column in row.columns.iter().filter(|c| !c.tasks.is_empty()) {
            let titles: Vec<&str> = column.tasks.iter().map(|t| t.title.as_str()).collect();
            out.push_str(&format!(
                "  {:<7} {}\n",
                column.status.label(),
                titles.join(", ")
            ));
        }
    }
    out
}
