use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use todo_core::{EditMode, Task};

use crate::app::{App, Focus};

pub fn draw(frame: &mut Frame, app: &App) {
    let view = app.view();
    if view.is_loading() {
        frame.render_widget(
            Paragraph::new("Loading...").block(Block::default().title("Todo List").borders(Borders::ALL)),
            frame.area(),
        );
        return;
    }

    let banner_height = if view.banner().is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(banner_height),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    if let Some(message) = view.banner() {
        let banner = Paragraph::new(message)
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Error").borders(Borders::ALL));
        frame.render_widget(banner, chunks[0]);
    }

    draw_draft(frame, app, chunks[1]);

    let sections = view.sections();
    let active_len = sections.active.len();

    let active: Vec<ListItem> = sections
        .active
        .iter()
        .enumerate()
        .map(|(i, task)| active_item(app, task, i == app.selected()))
        .collect();
    frame.render_widget(
        task_list(active, "Active Tasks".to_string(), "No active tasks"),
        chunks[2],
    );

    let completed: Vec<ListItem> = sections
        .completed
        .iter()
        .enumerate()
        .map(|(i, task)| completed_item(task, active_len + i == app.selected()))
        .collect();
    frame.render_widget(
        task_list(
            completed,
            format!("Completed Tasks ({})", view.completed_count()),
            "No completed tasks",
        ),
        chunks[3],
    );

    frame.render_widget(
        Paragraph::new(help(app)).style(Style::default().fg(Color::DarkGray)),
        chunks[4],
    );
}

fn draw_draft(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus() == Focus::Draft && app.view().editing_id().is_none();
    let draft = app.view().draft();
    let text = if draft.is_empty() && !focused {
        Span::styled("What needs to be done?", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(draft)
    };
    let input = Paragraph::new(Line::from(text)).block(
        Block::default()
            .title("New task")
            .borders(Borders::ALL)
            .border_style(if focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            }),
    );
    frame.render_widget(input, area);

    if focused {
        let x = cursor_x(area, draft);
        frame.set_cursor_position((x, area.y + 1));
    }
}

/// Column just past `draft` inside the bordered input, clamped to the box.
fn cursor_x(area: Rect, draft: &str) -> u16 {
    let width = u16::try_from(Span::raw(draft).width()).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(width)
        .min(area.right().saturating_sub(2))
}

fn task_list<'a>(items: Vec<ListItem<'a>>, title: String, empty: &'a str) -> List<'a> {
    let items = if items.is_empty() {
        vec![ListItem::new(Span::styled(empty, Style::default().fg(Color::DarkGray)))]
    } else {
        items
    };
    List::new(items).block(Block::default().title(title).borders(Borders::ALL))
}

fn active_item<'a>(app: &'a App, task: &'a Task, selected: bool) -> ListItem<'a> {
    let title = match app.view().edit_mode() {
        EditMode::Editing { id, buffer } if *id == task.id => Span::styled(
            format!("{buffer}_"),
            Style::default().fg(Color::Yellow),
        ),
        _ => Span::styled(task.title.as_str(), Style::default().fg(Color::White)),
    };
    let mut spans = vec![Span::raw("[ ] "), title];
    spans.extend(timestamps(task));
    item(spans, selected)
}

fn completed_item(task: &Task, selected: bool) -> ListItem<'_> {
    let mut spans = vec![
        Span::styled("[x] ", Style::default().fg(Color::Green)),
        Span::styled(
            task.title.as_str(),
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::CROSSED_OUT),
        ),
        Span::styled(" Completed", Style::default().fg(Color::Green)),
    ];
    spans.extend(timestamps(task));
    item(spans, selected)
}

fn timestamps(task: &Task) -> Vec<Span<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = Vec::new();
    if let Some(created) = &task.created_at {
        spans.push(Span::styled(format!("  Created: {created}"), dim));
    }
    if let Some(updated) = task.edited_at() {
        spans.push(Span::styled(format!(" • Updated: {updated}"), dim));
    }
    spans
}

fn item(spans: Vec<Span<'_>>, selected: bool) -> ListItem<'_> {
    let line = Line::from(spans);
    if selected {
        ListItem::new(line).style(Style::default().add_modifier(Modifier::REVERSED))
    } else {
        ListItem::new(line)
    }
}

fn help(app: &App) -> &'static str {
    if app.view().editing_id().is_some() {
        "enter save · esc cancel"
    } else if app.focus() == Focus::Draft {
        "enter add · esc back to list"
    } else {
        "a add · enter/e edit · space toggle · d delete · j/k move · q quit"
    }
}
