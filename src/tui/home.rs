use super::input::render_input_box;
use super::layout;
use super::state::{App, HomeState};
use super::theme::PINK;
use super::Command;
use crate::nav::Location;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const ASCII_LOGO: &str = r#"
   _        ___  _    _
  /_\  _ _ |   \(_)__| |_ _ _ ___
 / _ \| ' \| |) | (_-<  _| '_/ _ \
/_/ \_\_||_|___/|_/__/\__|_| \___/"#;

pub fn open(app: &mut App) {
    app.home = HomeState::new();
}

pub fn handle_home_key(key: KeyEvent, app: &mut App) -> Option<Command> {
    if !app.home.editing {
        if matches!(key.code, KeyCode::Char('/') | KeyCode::Enter) {
            app.home.editing = true;
        }
        return None;
    }
    match key.code {
        KeyCode::Esc => app.home.editing = false,
        KeyCode::Enter => {
            let query = app.home.input.content().trim().to_string();
            if !query.is_empty() {
                return Some(Command::Navigate(Location::search(&query)));
            }
        }
        _ => {
            app.home.input.handle_key(key);
        }
    }
    None
}

pub fn render_home(f: &mut Frame, app: &App) {
    let area = f.area();
    let chunks = layout::main_layout(area);

    layout::render_header(f, &app.page_title(), chunks.header);
    layout::render_banner(f, app, chunks.banner);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(chunks.content).inner(Margin {
        horizontal: 1,
        vertical: 0,
    });
    f.render_widget(block, chunks.content);

    let mut lines: Vec<Line> = Vec::new();
    for logo_line in ASCII_LOGO.lines() {
        lines.push(Line::from(Span::styled(
            logo_line.to_string(),
            Style::default().fg(PINK).add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));

    lines.push(heading(app.label("index.overview")));
    lines.push(Line::from(""));
    if !app.environment_available() {
        lines.push(info_line(&app.t("index.status_unknown")));
    } else if app.status_loaded {
        let installed = app.status.installed_count().to_string();
        let updates = app.status.update_count().to_string();
        lines.push(info_line(&app.t_with("index.installed_count", &[("count", installed.as_str())])));
        lines.push(info_line(&app.t_with("index.updates_count", &[("count", updates.as_str())])));
    } else {
        lines.push(info_line(&app.t("common.loading")));
    }
    lines.push(Line::from(""));

    lines.push(heading(app.label("index.shortcuts")));
    lines.push(Line::from(""));
    lines.push(shortcut_line("/", app.label("nav.search")));
    lines.push(shortcut_line("I", app.label("nav.installed")));
    lines.push(shortcut_line("U", app.label("nav.updates")));
    lines.push(shortcut_line("R", app.label("nav.recommended")));
    lines.push(shortcut_line("C", app.label("nav.settings")));
    lines.push(shortcut_line("q", app.label("nav.quit")));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("andistro-center v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::DarkGray),
    )));

    // search box on top, the rest centered below it
    let content_height = lines.len() as u16;
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(content_height),
            Constraint::Min(0),
        ])
        .split(inner);

    render_input_box(
        f,
        &app.home.input,
        app.label("index.search_label"),
        app.home.editing,
        vertical[0],
    );
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), vertical[2]);

    let hint = if app.home.editing {
        "footer.search_editing"
    } else {
        "footer.home"
    };
    layout::render_footer(f, app, hint, chunks.footer);
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

fn info_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().fg(Color::White)))
}

/// "  X  description"
fn shortcut_line(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {key}  "),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{:<24}", desc), Style::default().fg(Color::White)),
    ])
}
