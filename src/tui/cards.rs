//! One card renderer for every package list page

use super::layout::render_scrollbar;
use super::state::{App, AppEvent, CardList, LoadState};
use super::theme::{ACTION, BLUE, BRIGHT_WHITE, DESC_DIM, DIM, PINK, SEL_BG, WARN};
use crate::daemon::{Daemon, PackageRecord};
use crate::describe::truncate_description;
use crate::error::DaemonError;
use crate::nav::Page;
use crate::status::{CardState, PackageAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Rows per card: title, description, actions, tooltip/spacing
pub const CARD_HEIGHT: usize = 4;

/// What a key on the list asked for
#[derive(Debug, Clone, PartialEq)]
pub enum CardCommand {
    OpenDetails(String),
    Action(PackageAction, String),
}

// ========== keys ==========

pub fn handle_list_key(key: KeyEvent, list: &mut CardList, term_height: u16) -> Option<CardCommand> {
    let page = (super::layout::visible_content_height(term_height) / CARD_HEIGHT).max(1) as isize;
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => list.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => list.select_next(),
        KeyCode::PageUp => list.select_by(-page),
        KeyCode::PageDown => list.select_by(page),
        KeyCode::Home => list.selected = 0,
        KeyCode::End => list.selected = list.len().saturating_sub(1),
        KeyCode::Enter => {
            return list
                .selected_record()
                .map(|record| CardCommand::OpenDetails(record.name.clone()));
        }
        KeyCode::Char(c) => {
            let action = PackageAction::from_hotkey(c)?;
            return list
                .selected_record()
                .map(|record| CardCommand::Action(action, record.name.clone()));
        }
        _ => {}
    }
    None
}

// ========== actions ==========

/// Sends one action to the daemon. Update re-installs the package.
pub async fn run_action(daemon: &dyn Daemon, action: PackageAction, pkg: &str) -> Result<(), DaemonError> {
    match action {
        PackageAction::Install | PackageAction::Update => daemon.install(pkg).await.map(|_| ()),
        PackageAction::Remove => daemon.remove(pkg).await.map(|_| ()),
        PackageAction::Open => daemon.open(pkg).await.map(|_| ()),
    }
}

pub fn spawn_action(daemon: Arc<dyn Daemon>, action: PackageAction, pkg: String, tx: &mpsc::Sender<AppEvent>) {
    log::info!("{:?} {}", action, pkg);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = run_action(daemon.as_ref(), action, &pkg)
            .await
            .map_err(|e| e.to_string());
        let _ = tx.send(AppEvent::ActionFinished { pkg, action, result }).await;
    });
}

// ========== rendering ==========

/// Text on the card's second row
fn card_description(app: &App, record: &PackageRecord) -> String {
    if let (Some(current), Some(new)) = (&record.current_version, &record.new_version) {
        return app.t_with("common.version_change", &[("current", current.as_str()), ("new", new.as_str())]);
    }
    let limit = app.config.list_description_limit;
    if let Some(text) = app.list.descriptions.get(&record.name) {
        return truncate_description(text, limit);
    }
    let own = record.description_text().trim();
    if !own.is_empty() {
        return truncate_description(own, limit);
    }
    if app.page() == Page::Recommended {
        app.t("common.loading")
    } else {
        app.t("common.no_description")
    }
}

pub fn action_spans(app: &App, record: &PackageRecord, selected: bool) -> (Vec<Span<'static>>, Option<String>) {
    let state = app.card_state(&record.name);
    let busy = app.busy_action(&record.name);
    let mut spans = vec![Span::raw("    ")];
    let mut tooltip = None;

    // sets still unknown: offer nothing rather than a guess
    if app.status_pending() && busy.is_none() {
        spans.push(Span::styled(
            app.t("common.checking_status"),
            Style::default().fg(DIM).add_modifier(Modifier::ITALIC),
        ));
        return (spans, tooltip);
    }

    for button in state.buttons() {
        let (text, style) = if busy == Some(button.action) {
            (
                app.t(button.action.progress_key()),
                Style::default().fg(WARN).add_modifier(Modifier::ITALIC),
            )
        } else {
            let label = format!("{} {}", button.action.hotkey(), app.t(button.action.label_key()));
            let style = if button.enabled && busy.is_none() {
                Style::default().fg(ACTION).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DIM)
            };
            (label, style)
        };
        spans.push(Span::styled(format!("[{}]", text), style));
        spans.push(Span::raw(" "));

        if selected && !button.enabled {
            tooltip = button.tooltip_key.map(|key| app.t(key));
        }
    }
    (spans, tooltip)
}

/// Lines of one card, highlighted when selected
pub fn card_lines(app: &App, record: &PackageRecord, selected: bool) -> Vec<Line<'static>> {
    let bg = if selected { SEL_BG } else { Color::Reset };
    let marker = if selected { "▸ " } else { "  " };

    let mut title = vec![
        Span::styled(marker, Style::default().fg(PINK).bg(bg)),
        Span::styled(
            record.title().to_string(),
            Style::default()
                .fg(if selected { BRIGHT_WHITE } else { PINK })
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if record.title() != record.name {
        title.push(Span::styled(format!("  {}", record.name), Style::default().fg(BLUE).bg(bg)));
    }
    if !app.status_pending() && app.card_state(&record.name) == CardState::InstalledWithUpdate {
        title.push(Span::styled(
            format!("  ● {}", app.t("detalhes.update_available")),
            Style::default().fg(WARN).bg(bg),
        ));
    }

    let desc_color = if selected { DESC_DIM } else { DIM };
    let description = Line::from(Span::styled(
        format!("    {}", card_description(app, record)),
        Style::default().fg(desc_color),
    ));

    let (actions, tooltip) = action_spans(app, record, selected);
    let hint = match tooltip {
        Some(text) => Line::from(Span::styled(format!("    {}", text), Style::default().fg(WARN))),
        None => Line::from(""),
    };

    vec![Line::from(title), description, Line::from(actions), hint]
}

/// Lines of the whole list plus the first line of each card
fn list_lines(app: &App) -> (Vec<Line<'static>>, Vec<usize>) {
    let mut lines = Vec::new();
    let mut starts = Vec::new();
    let mut index = 0;
    for section in &app.list.sections {
        if let Some(key) = section.title_key {
            lines.push(Line::from(Span::styled(
                format!("── {} ──", app.t(key)),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
        }
        for record in &section.records {
            starts.push(lines.len());
            lines.extend(card_lines(app, record, index == app.list.selected));
            index += 1;
        }
    }
    (lines, starts)
}

/// Renders the list, or the page's loading / empty / error text
pub fn render_card_list(f: &mut Frame, app: &App, title: &str, messages: &ListMessages, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area).inner(Margin {
        horizontal: 1,
        vertical: 0,
    });
    f.render_widget(block, area);

    let notice = match &app.list.load {
        LoadState::Loading => Some((app.t(messages.loading), DIM)),
        LoadState::Failed(_) => Some((app.t(messages.error), WARN)),
        LoadState::Unavailable => Some((app.t(messages.unavailable), WARN)),
        LoadState::Loaded if app.list.is_empty() => Some((app.t(messages.empty), DIM)),
        LoadState::Loaded => None,
    };
    if let Some((text, color)) = notice {
        f.render_widget(Paragraph::new(Span::styled(text, Style::default().fg(color))), inner);
        return;
    }

    let (lines, starts) = list_lines(app);
    let visible = inner.height as usize;
    let selected_start = starts.get(app.list.selected).copied().unwrap_or(0);
    let selected_end = selected_start + CARD_HEIGHT;
    // keep the whole selected card (and its section heading) in view
    let scroll = if selected_end > visible {
        selected_end - visible
    } else {
        0
    };

    let total = lines.len();
    let shown: Vec<Line> = lines.into_iter().skip(scroll).take(visible).collect();
    f.render_widget(Paragraph::new(shown), inner);

    if total > visible {
        render_scrollbar(f, total, scroll, area);
    }
}

/// Page-specific texts for the non-list states
pub struct ListMessages {
    pub loading: &'static str,
    pub empty: &'static str,
    pub error: &'static str,
    pub unavailable: &'static str,
}
