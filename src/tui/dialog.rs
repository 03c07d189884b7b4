//! Blocking notice and confirmation dialogs

use super::state::{App, Modal, NoticeKind};
use super::theme::{ACTION, WARN};
use crate::status::PackageAction;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// While a dialog is open it takes every key. Returns the action to send
/// when a confirmation was accepted.
pub fn handle_dialog_key(key: KeyEvent, app: &mut App) -> Option<(PackageAction, String)> {
    match app.modal {
        Some(Modal::Notice { .. }) => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                app.dismiss_modal();
            }
            None
        }
        Some(Modal::Confirm { .. }) => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_modal(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.dismiss_modal();
                None
            }
            _ => None,
        },
        None => None,
    }
}

/// Rect of `width` x `height` centered in `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height.min(area.height)),
            Constraint::Min(0),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width.min(area.width)),
            Constraint::Min(0),
        ])
        .split(vertical[1])[1]
}

pub fn render_dialog(f: &mut Frame, app: &App) {
    let Some(modal) = &app.modal else {
        return;
    };
    let (title, message, color, hint) = match modal {
        Modal::Notice { kind, message } => {
            let (title, color) = match kind {
                NoticeKind::Success => (app.t("notice.success"), ACTION),
                NoticeKind::Failure => (app.t("notice.failure"), WARN),
            };
            (title, message, color, app.label("notice.dismiss"))
        }
        Modal::Confirm { message, .. } => (
            app.t("notice.confirm"),
            message,
            Color::Yellow,
            app.label("notice.confirm_hint"),
        ),
    };

    let area = centered(f.area(), 60, 7);
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color).add_modifier(Modifier::BOLD));
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.clone(), Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(Span::styled(hint.to_string(), Style::default().fg(Color::DarkGray))),
    ];
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
