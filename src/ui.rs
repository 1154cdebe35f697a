use std::io;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};

use crate::app::{App, Focus, FormRow, DRAFT_ROWS, EDIT_ROWS};
use crate::task::{Status, Task, TaskField};
use crate::worker::Worker;

/// Fetches once, then loops: draw, wait up to one tick for a key, apply
/// whatever requests completed in the meantime.
pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    worker: &Worker,
    tick_rate: Duration,
) -> io::Result<()> {
    worker.dispatch(app.board.fetch_tasks());
    loop {
        terminal.draw(|f| draw(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(request) = app.handle_key(key) {
                        worker.dispatch(request);
                    }
                }
            }
        }
        if app.should_quit {
            return Ok(());
        }

        worker.pump(&mut app.board);
        app.sync_focus();
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(1),
            Constraint::Length(DRAFT_ROWS.len() as u16 + 2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    f.render_widget(
        Line::from(Span::styled(
            " Task Manager",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        chunks[0],
    );
    draw_draft_form(f, app, chunks[1]);
    draw_columns(f, app, chunks[2]);
    f.render_widget(help_line(app.focus), chunks[3]);
}

fn draw_draft_form(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Draft;
    let lines: Vec<Line> = DRAFT_ROWS
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let active = focused && app.draft_row == i;
            match row {
                FormRow::Field(field) => field_line(*field, app.board.draft.field(*field), active),
                _ => button_line(&[("Create Task", active)]),
            }
        })
        .collect();

    let form = Paragraph::new(lines).block(
        Block::default()
            .title("Add New Task")
            .borders(Borders::ALL)
            .border_style(focus_border(focused)),
    );
    f.render_widget(form, area);
}

fn draw_columns(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(25); Status::ALL.len()])
        .split(area);
    let today = Local::now().date_naive();
    let board = &app.board;

    for (i, status) in Status::ALL.iter().enumerate() {
        let items: Vec<ListItem> = board
            .get_tasks_by_status(*status)
            .into_iter()
            .map(|task| match board.editing.as_ref() {
                Some(snapshot) if snapshot.id == task.id => {
                    ListItem::new(edit_card(snapshot, app))
                }
                _ => ListItem::new(task_card(task, today)),
            })
            .collect();

        let column_selected = board.selected_status == i;
        let list = List::new(items)
            .block(
                Block::default()
                    .title(status.label())
                    .borders(Borders::ALL)
                    .border_style(focus_border(column_selected && app.focus == Focus::Board)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow));

        let mut state = ListState::default();
        if column_selected && app.focus == Focus::Board {
            state.select(Some(board.selected_task));
        }
        f.render_stateful_widget(list, chunks[i], &mut state);
    }
}

fn task_card(task: &Task, today: NaiveDate) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            task.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(task.field(TaskField::Description).to_string()),
        Line::from(vec![
            Span::styled("Status: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(task.status.clone()),
        ]),
    ];
    if let Some(due) = task.due_date_label() {
        let style = if task.is_overdue(today) {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled("Due Date: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(due.to_string(), style),
        ]));
    }
    lines.push(Line::raw(""));
    lines
}

fn edit_card(snapshot: &Task, app: &App) -> Vec<Line<'static>> {
    let focused = app.focus == Focus::Edit;
    let active = |row: usize| focused && app.edit_row == row;
    let mut lines: Vec<Line> = EDIT_ROWS
        .iter()
        .enumerate()
        .filter_map(|(i, row)| match row {
            FormRow::Field(field) => Some(field_line(*field, snapshot.field(*field), active(i))),
            _ => None,
        })
        .collect();
    let save = EDIT_ROWS.len() - 2;
    lines.push(button_line(&[
        ("Save", active(save)),
        ("Delete", active(save + 1)),
    ]));
    lines.push(Line::raw(""));
    lines
}

fn field_line(field: TaskField, value: &str, active: bool) -> Line<'static> {
    let label = match field {
        TaskField::Title => "Title:       ",
        TaskField::Description => "Description: ",
        TaskField::Status => "Status:      ",
        TaskField::DueDate => "Due Date:    ",
    };
    let mut spans = vec![Span::raw(label)];
    if value.is_empty() && field == TaskField::DueDate {
        spans.push(Span::styled(
            "YYYY-MM-DD",
            Style::default().fg(Color::DarkGray),
        ));
    } else if field == TaskField::Status {
        spans.push(Span::raw(format!("< {value} >")));
    } else {
        spans.push(Span::raw(value.to_string()));
    }
    if active {
        spans.push(Span::styled(" ", Style::default().bg(Color::White)));
        Line::from(spans).style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan))
    } else {
        Line::from(spans)
    }
}

fn button_line(buttons: &[(&'static str, bool)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (label, active) in buttons {
        let style = if *active {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!("[ {label} ]"), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn focus_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn help_line(focus: Focus) -> Line<'static> {
    let keys: &[(&str, &str)] = match focus {
        Focus::Board => &[
            ("q", "quit"),
            ("←/→", "column"),
            ("↑/↓", "task"),
            ("e", "edit"),
            ("n", "new task"),
        ],
        Focus::Draft | Focus::Edit => &[
            ("Esc", "back"),
            ("Tab", "next field"),
            ("←/→", "status"),
            ("Enter", "activate"),
            ("Ctrl+S", "submit"),
        ],
    };
    let mut spans = Vec::new();
    for (key, action) in keys {
        spans.push(Span::styled(
            format!(" {key}"),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {action} ")));
    }
    Line::from(spans)
}
