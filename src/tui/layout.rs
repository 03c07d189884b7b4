use super::state::App;
use super::theme::WARN;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

/// Page areas: header(3) + banner(1) + content + footer(3)
pub struct PageLayout {
    pub header: Rect,
    pub banner: Rect,
    pub content: Rect,
    pub footer: Rect,
}

pub fn main_layout(area: Rect) -> PageLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);
    PageLayout {
        header: chunks[0],
        banner: chunks[1],
        content: chunks[2],
        footer: chunks[3],
    }
}

pub fn render_header(f: &mut Frame, title: &str, area: Rect) {
    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(header, area);
}

/// Footer with key hints; a pending flash message replaces them
pub fn render_footer(f: &mut Frame, app: &App, hint_key: &str, area: Rect) {
    let (text, color) = match &app.flash {
        Some(flash) => (flash.as_str(), WARN),
        None => (app.label(hint_key), Color::Green),
    };
    let footer = Paragraph::new(format!(" {}", text))
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);
    f.render_widget(footer, area);
}

/// Environment line under the header
pub fn render_banner(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.environment {
        None => Line::from(Span::styled(
            app.label("banner.checking").to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        Some(env) if env.available => {
            let distro = env.distro.as_deref().unwrap_or("AnDistro");
            Line::from(Span::styled(
                app.t_with("banner.andistro", &[("distro", distro)]),
                Style::default().fg(Color::DarkGray),
            ))
        }
        Some(_) => Line::from(Span::styled(
            app.label("banner.not_andistro").to_string(),
            Style::default().fg(WARN).add_modifier(Modifier::BOLD),
        )),
    };
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

/// Bordered, wrapped text with a scrollbar when it overflows
pub fn render_scrollable_content(
    f: &mut Frame,
    title: &str,
    lines: Vec<Line<'static>>,
    scroll_offset: usize,
    area: Rect,
) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let padded = inner.inner(Margin {
        horizontal: 1,
        vertical: 0,
    });

    let total_lines = lines.len();
    let visible_height = padded.height as usize;
    let max_scroll = total_lines.saturating_sub(visible_height);
    let actual_scroll = scroll_offset.min(max_scroll);

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(actual_scroll)
        .take(visible_height)
        .collect();

    f.render_widget(Paragraph::new(visible).wrap(Wrap { trim: false }), padded);

    if total_lines > visible_height {
        render_scrollbar(f, total_lines, actual_scroll, area);
    }
}

pub fn render_scrollbar(f: &mut Frame, total: usize, position: usize, area: Rect) {
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"));
    let mut state = ScrollbarState::new(total).position(position);
    f.render_stateful_widget(
        scrollbar,
        area.inner(Margin {
            horizontal: 0,
            vertical: 1,
        }),
        &mut state,
    );
}

/// Rows left for content (total height minus header, banner, footer and borders)
pub fn visible_content_height(term_height: u16) -> usize {
    term_height.saturating_sub(9) as usize
}
