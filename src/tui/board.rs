use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph};

use super::app::App;
use crate::board::CardMode;
use crate::dnd::DragPayload;
use crate::model::{Status, SubgoalStatus, Task};
use crate::view::{completion_percent, BoardView, GroupBy, RowView};

pub fn status_color(status: Status) -> Color {
    match status {
        Status::Todo => Color::Red,
        Status::Doing => Color::Yellow,
        Status::Review => Color::Blue,
        Status::Done => Color::Green,
    }
}

pub fn subgoal_color(status: SubgoalStatus) -> Color {
    match status {
        SubgoalStatus::Todo => Color::Red,
        SubgoalStatus::Doing => Color::Yellow,
        SubgoalStatus::Done => Color::Green,
    }
}

/// Center a `width` x `height` rect within `area`, clamped to fit.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

pub fn render(frame: &mut Frame, app: &App) {
    let view = app.view();
    let [title, headers, body, legend, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_title(frame, app, title);
    render_column_headers(frame, &view, headers);
    render_rows(frame, app, &view, body);
    render_legend(frame, legend);
    render_status_line(frame, app, status);

    if app.board.subgoal_modal.is_some() {
        render_subgoals(frame, app);
    }
    if app.show_help {
        render_help(frame);
    }
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" Kanban ", Style::default().bold().reversed()),
        Span::raw("  filter: "),
        Span::styled(app.board.filter.label().to_string(), Style::default().fg(Color::Cyan)),
        Span::raw("  group: "),
        Span::styled(app.board.group_by.as_str(), Style::default().fg(Color::Cyan)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn column_areas(area: Rect) -> [Rect; 4] {
    Layout::horizontal([Constraint::Ratio(1, 4); 4]).areas(area)
}

fn render_column_headers(frame: &mut Frame, view: &BoardView, area: Rect) {
    for (status, area) in Status::ALL.into_iter().zip(column_areas(area)) {
        let color = status_color(status);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));
        let text = Line::from(vec![
            Span::styled(status.label(), Style::default().fg(color).bold()),
            Span::raw(format!("  {} pts", view.status_points[status.index()])),
        ]);
        frame.render_widget(Paragraph::new(text).block(block), area);
    }
}

fn row_height(row: &RowView) -> u16 {
    if row.collapsed {
        return 1;
    }
    let cards = row.columns.iter().map(|c| c.tasks.len()).max().unwrap_or(0);
    1 + cards.max(1) as u16
}

/// First row to draw so the cursor row stays on screen.
fn first_visible_row(heights: &[u16], cursor_row: usize, available: u16) -> usize {
    let mut first = 0;
    let last = cursor_row.min(heights.len().saturating_sub(1));
    while first < last && heights[first..=last].iter().sum::<u16>() > available {
        first += 1;
    }
    first
}

fn render_rows(frame: &mut Frame, app: &App, view: &BoardView, area: Rect) {
    if view.rows.is_empty() {
        let hint = Paragraph::new("No tasks. Press 'a' to add one.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, area);
        return;
    }

    let heights: Vec<u16> = view.rows.iter().map(row_height).collect();
    let first = first_visible_row(&heights, app.cursor.row, area.height);

    let mut y = area.y;
    for (index, row) in view.rows.iter().enumerate().skip(first) {
        let bottom = area.y + area.height;
        if y >= bottom {
            break;
        }
        let height = heights[index].min(bottom - y);
        let row_area = Rect::new(area.x, y, area.width, height);
        render_row(frame, app, index, row, row_area);
        y += height;
    }
}

fn render_row(frame: &mut Frame, app: &App, index: usize, row: &RowView, area: Rect) {
    let indicator = if row.collapsed { "> " } else { "v " };
    let mut header = vec![
        Span::raw(indicator),
        Span::styled(row.label.clone(), Style::default().bold()),
        Span::styled(
            format!("  {} pts", row.points()),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if row.collapsed {
        header.push(Span::styled(
            format!("  ({} cards)", row.task_count()),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let header_style = if index == app.cursor.row && row.collapsed {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    };
    frame.render_widget(
        Paragraph::new(Line::from(header)).style(header_style),
        Rect::new(area.x, area.y, area.width, 1),
    );

    if row.collapsed || area.height < 2 {
        return;
    }
    let cards = Rect::new(area.x, area.y + 1, area.width, area.height - 1);
    for (col, (column, cell)) in row.columns.iter().zip(column_areas(cards)).enumerate() {
        let selected_cell = index == app.cursor.row && col == app.cursor.col;
        let mut items: Vec<ListItem> = column
            .tasks
            .iter()
            .enumerate()
            .map(|(i, task)| {
                let item = ListItem::new(card_line(app, task));
                if selected_cell && i == app.cursor.card {
                    item.style(Style::default().bg(Color::DarkGray))
                } else {
                    item
                }
            })
            .collect();
        // An empty cell still needs a visible cursor, e.g. as a drop target.
        if items.is_empty() && selected_cell {
            let marker = if app.drag.is_some() { " drop here " } else { " " };
            items.push(ListItem::new(marker).style(Style::default().bg(Color::DarkGray)));
        }
        frame.render_widget(List::new(items), cell);
    }
}

fn card_line(app: &App, task: &Task) -> Line<'static> {
    let dragged = matches!(&app.drag, Some(DragPayload::Task(id)) if *id == task.id);
    let meta = match app.board.group_by {
        GroupBy::Assignee => task.category.clone(),
        GroupBy::Category => task.assignee.clone(),
    };
    let title_style = if dragged {
        Style::default().italic().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let mut spans = match &app.board.card_mode {
        CardMode::Editing { id, buffer } if *id == task.id => vec![Span::styled(
            format!("{buffer}_"),
            Style::default().fg(Color::Yellow),
        )],
        _ => vec![Span::styled(task.title.clone(), title_style)],
    };
    if !meta.is_empty() {
        spans.push(Span::styled(
            format!(" {meta}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    match &app.board.card_mode {
        CardMode::AdjustingPoints(id) if *id == task.id => spans.push(Span::styled(
            format!(" [-] {} [+]", task.story_points),
            Style::default().fg(Color::Yellow).bold(),
        )),
        _ => spans.push(Span::styled(
            format!(" {}", task.story_points),
            Style::default().fg(Color::Magenta),
        )),
    }
    Line::from(spans)
}

fn render_legend(frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for status in Status::ALL {
        spans.push(Span::styled("■ ", Style::default().fg(status_color(status))));
        spans.push(Span::raw(format!("{}  ", status.label())));
    }
    spans.push(Span::styled("?: help", Style::default().fg(Color::DarkGray)));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(err) = &app.error {
        Line::from(Span::styled(format!(" {err}"), Style::default().fg(Color::Red)))
    } else if let Some(DragPayload::Task(id)) = &app.drag {
        let title = app.board.task(id).map_or("", |t| t.title.as_str());
        Line::from(Span::styled(
            format!(" moving '{title}': arrows to pick a cell, Enter to drop, Esc to cancel"),
            Style::default().fg(Color::Cyan),
        ))
    } else {
        let hint = match app.board.card_mode {
            CardMode::Editing { .. } => " editing: Enter to save, Esc to cancel",
            CardMode::AdjustingPoints(_) => " points: + / - to adjust, Esc when done",
            CardMode::Idle => " m: move  e: edit  p: points  a: add  s: subgoals  q: quit",
        };
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_subgoals(frame: &mut Frame, app: &App) {
    let Some(task_id) = &app.board.subgoal_modal else {
        return;
    };
    let list = app.board.subgoals.list_for(task_id);
    let task_title = app.board.task(task_id).map_or("", |t| t.title.as_str());

    let term = frame.area();
    let width = 60.min(term.width.saturating_sub(4));
    let height = (list.items.len() as u16 + 6).min(term.height.saturating_sub(2));
    let area = centered_rect(width, height, term);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Subgoals: {task_title} "))
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [items_area, _, gauge_area, hint_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let items: Vec<ListItem> = list
        .items
        .iter()
        .enumerate()
        .map(|(i, subgoal)| {
            let color = subgoal_color(subgoal.status);
            let title = match &app.board.subgoal_edit {
                Some(edit) if edit.id == subgoal.id => Span::styled(
                    format!("{}_", edit.buffer),
                    Style::default().fg(Color::Yellow),
                ),
                _ => Span::raw(subgoal.title.clone()),
            };
            let line = Line::from(vec![
                Span::styled("● ", Style::default().fg(color)),
                title,
                Span::styled(format!("  {}", subgoal.status.label()), Style::default().fg(color)),
            ]);
            let item = ListItem::new(line);
            if i == app.subgoal_cursor {
                item.style(Style::default().bg(Color::DarkGray))
            } else {
                item
            }
        })
        .collect();
    frame.render_widget(List::new(items), items_area);

    let percent = completion_percent(&list.items);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .percent(percent as u16)
        .label(format!("{percent}% complete"));
    frame.render_widget(gauge, gauge_area);

    let hint = Line::from(Span::styled(
        "a: add  e: rename  space: status  d: delete  Esc: close",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(hint), hint_area);
}

fn render_help(frame: &mut Frame) {
    let bindings = [
        ("h/l     ", "Move between columns"),
        ("j/k     ", "Move between cards and rows"),
        ("Space   ", "Collapse/expand row"),
        ("m       ", "Pick up card (Enter drops, Esc cancels)"),
        ("e/Enter ", "Edit title"),
        ("p       ", "Adjust story points (+/-)"),
        ("a       ", "Add task"),
        ("d       ", "Delete task"),
        ("s       ", "Open subgoals"),
        ("f       ", "Cycle category filter"),
        ("g       ", "Toggle grouping"),
        ("r       ", "Reload from store"),
        ("q/Esc   ", "Quit"),
    ];

    let term = frame.area();
    let width = 56.min(term.width.saturating_sub(4));
    let height = (bindings.len() as u16 + 2).min(term.height.saturating_sub(2));
    let area = centered_rect(width, height, term);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = bindings
        .iter()
        .map(|(key, text)| {
            Line::from(vec![
                Span::styled(*key, Style::default().fg(Color::Cyan)),
                Span::raw(*text),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}
