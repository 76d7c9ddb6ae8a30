//! Screen rendering. Pure functions of the app state; all mutation happens
//! in the app's key/event handlers.

use quiz::QuestionResult;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table};
use ratatui::Frame;
use session::{Feedback, SessionStatus};

use crate::app::{App, Screen};

pub fn render(frame: &mut Frame, app: &App) {
    match app.screen {
        Screen::Setup => render_setup(frame, app),
        Screen::Drill => render_drill(frame, app),
        Screen::History => render_history(frame, app),
    }
}

fn render_setup(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let title = Paragraph::new("quickdrill")
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let lines: Vec<Line> = app
        .setup
        .rows()
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let style = if i == app.setup.field {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(
                format!("{label:<22} < {value} >"),
                style,
            ))
        })
        .collect();
    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Session setup"),
    );
    frame.render_widget(form, chunks[1]);

    let mut footer = Vec::new();
    if let Some(ref message) = app.status_message {
        footer.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    footer.push(Line::from(Span::styled(
        "Up/Down select   Left/Right adjust   Enter start   h history   q quit",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(Paragraph::new(footer), chunks[2]);
}

fn render_drill(frame: &mut Frame, app: &App) {
    match app.snapshot.status {
        SessionStatus::Finished => render_summary(frame, app),
        SessionStatus::Active => render_question(frame, app),
        // Loading, or a just-aborted session about to bounce back to setup.
        _ => {
            let loading = Paragraph::new("Loading question...")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(loading, centered(frame.area(), 40, 3));
        }
    }
}

fn render_question(frame: &mut Frame, app: &App) {
    let snap = &app.snapshot;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let header = Paragraph::new(format!(
        "Question {}/{}    Score {}    Streak {}",
        snap.question_count + 1,
        snap.total_questions,
        snap.score,
        snap.streak
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let ratio = if snap.time_per_question == 0 {
        0.0
    } else {
        f64::from(snap.time_left) / f64::from(snap.time_per_question)
    };
    let gauge_color = if ratio > 0.5 {
        Color::Green
    } else if ratio > 0.25 {
        Color::Yellow
    } else {
        Color::Red
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Time"))
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{}s", snap.time_left));
    frame.render_widget(gauge, chunks[1]);

    let label = app.question_label().unwrap_or_default();
    let question = Paragraph::new(format!("{label} = ?"))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(question, chunks[2]);

    render_options(frame, app, chunks[3]);

    let hint = match snap.feedback {
        Feedback::None => Line::from(Span::styled(
            "1-3 answer   Left/Right + Enter answer   Esc quit",
            Style::default().fg(Color::DarkGray),
        )),
        Feedback::Correct => Line::from(Span::styled(
            "Correct!",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Feedback::Wrong => Line::from(Span::styled(
            "Wrong",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Feedback::TimedOut => Line::from(Span::styled(
            "Time's up!",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
    };
    frame.render_widget(
        Paragraph::new(hint).alignment(Alignment::Center),
        chunks[4],
    );
}

fn render_options(frame: &mut Frame, app: &App, area: Rect) {
    let Some(question) = app.snapshot.question.as_ref() else {
        return;
    };
    let count = question.options.len().max(1) as u32;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, count); count as usize])
        .split(area);

    for (i, option) in question.options.iter().enumerate() {
        let chosen = i == app.selected_option;
        let style = match app.snapshot.feedback {
            Feedback::Correct if chosen => Style::default().fg(Color::Green),
            Feedback::Wrong if chosen => Style::default().fg(Color::Red),
            Feedback::TimedOut => Style::default().fg(Color::DarkGray),
            _ if chosen => Style::default().fg(Color::Yellow),
            _ => Style::default(),
        };
        let card = Paragraph::new(option.to_string())
            .style(style.add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(style)
                    .title(format!("{}", i + 1)),
            );
        frame.render_widget(card, columns[i]);
    }
}

fn render_summary(frame: &mut Frame, app: &App) {
    let snap = &app.snapshot;
    let lines = vec![
        Line::from(Span::styled(
            "Session complete",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "Score: {}/{}",
            snap.score, snap.total_questions
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter setup   r play again   q quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let summary = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(summary, centered(frame.area(), 44, 7));
}

fn render_history(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let title = Paragraph::new("Performance history")
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    // Most recent first.
    let rows: Vec<Row> = app
        .history_entries
        .iter()
        .rev()
        .map(|entry| {
            let result_style = match entry.result {
                QuestionResult::Correct => Style::default().fg(Color::Green),
                QuestionResult::Wrong => Style::default().fg(Color::Red),
                QuestionResult::TimedOut => Style::default().fg(Color::Yellow),
            };
            Row::new(vec![
                Cell::from(entry.question.clone()),
                Cell::from(Span::styled(entry.result.to_string(), result_style)),
                Cell::from(format!("{}s", entry.time_taken_secs)),
                Cell::from(entry.recorded_at.format("%Y-%m-%d %H:%M").to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(17),
        ],
    )
    .header(
        Row::new(vec!["Question", "Result", "Time", "When"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(table, chunks[1]);

    let help = Paragraph::new(Span::styled(
        "c clear   Esc back",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(help, chunks[2]);
}

/// A centered rect of at most the given size inside `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
