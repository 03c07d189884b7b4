use super::input::{str_delete_back, str_delete_forward, str_insert_char};
use super::layout;
use super::state::{App, SettingsItem};
use super::theme::{BLUE, BRIGHT_WHITE, DIM, PINK, SEL_BG};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

pub fn open(app: &mut App) {
    app.build_settings_items();
}

pub fn handle_settings_key(key: KeyEvent, app: &mut App) {
    if app.settings.editing {
        handle_editing_key(key, app);
    } else {
        handle_browsing_key(key, app);
    }
}

fn handle_browsing_key(key: KeyEvent, app: &mut App) {
    let total = app.settings_focusable_count();
    match key.code {
        KeyCode::Up => {
            app.settings.selected = app.settings.selected.saturating_sub(1);
            app.settings.message = None;
        }
        KeyCode::Down => {
            if app.settings.selected + 1 < total {
                app.settings.selected += 1;
            }
            app.settings.message = None;
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.settings.message = None;
            app.activate_settings_item();
        }
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => app.save_settings(),
        _ => {}
    }
}

fn handle_editing_key(key: KeyEvent, app: &mut App) {
    let state = &mut app.settings;
    match key.code {
        KeyCode::Esc => state.editing = false,
        KeyCode::Enter => app.confirm_settings_edit(),
        KeyCode::Backspace => str_delete_back(&mut state.edit_buffer, &mut state.edit_cursor),
        KeyCode::Delete => str_delete_forward(&mut state.edit_buffer, &mut state.edit_cursor),
        KeyCode::Left => state.edit_cursor = state.edit_cursor.saturating_sub(1),
        KeyCode::Right => {
            if state.edit_cursor < state.edit_buffer.chars().count() {
                state.edit_cursor += 1;
            }
        }
        KeyCode::Home => state.edit_cursor = 0,
        KeyCode::End => state.edit_cursor = state.edit_buffer.chars().count(),
        KeyCode::Char(c) => str_insert_char(&mut state.edit_buffer, &mut state.edit_cursor, c),
        _ => {}
    }
}

pub fn render_settings(f: &mut Frame, app: &App) {
    let chunks = layout::main_layout(f.area());

    layout::render_header(f, &format!("⚙  {}", app.page_title()), chunks.header);
    layout::render_banner(f, app, chunks.banner);

    let content_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let content_inner = content_block.inner(chunks.content);
    f.render_widget(content_block, chunks.content);

    let padded = content_inner.inner(Margin {
        horizontal: 2,
        vertical: 1,
    });
    if padded.height >= 3 {
        render_items(f, app, padded);
    }

    let hint_key = if app.settings.editing {
        "footer.settings_editing"
    } else {
        "footer.settings"
    };

    // a save/edit message is shown in front of the key hints
    if let Some(msg) = &app.settings.message {
        let msg_color = if msg.starts_with('✗') { Color::Red } else { Color::Green };
        let footer_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let footer_inner = footer_block.inner(chunks.footer);
        f.render_widget(footer_block, chunks.footer);
        let para = Paragraph::new(Line::from(vec![
            Span::styled(format!(" {} | ", msg), Style::default().fg(msg_color)),
            Span::styled(app.label(hint_key).to_string(), Style::default().fg(Color::DarkGray)),
        ]));
        f.render_widget(para, footer_inner);
    } else {
        layout::render_footer(f, app, hint_key, chunks.footer);
    }
}

fn item_label(app: &App, item: &SettingsItem) -> Option<String> {
    match item {
        SettingsItem::Section(_) => None,
        SettingsItem::Language(_) => Some(app.t("settings.language")),
        SettingsItem::TextEdit { label_key, .. } => Some(app.t(label_key)),
    }
}

fn render_items(f: &mut Frame, app: &App, area: Rect) {
    let items = &app.settings.items;

    // labels are padded to the widest one
    let max_label_width = items
        .iter()
        .filter_map(|item| item_label(app, item))
        .map(|label| UnicodeWidthStr::width(label.as_str()))
        .max()
        .unwrap_or(10);

    let visible_height = area.height as usize;
    let mut lines: Vec<Line> = Vec::new();
    let mut focusable_idx = 0;

    for (i, item) in items.iter().enumerate() {
        let label = match (item, item_label(app, item)) {
            (SettingsItem::Section(key), _) => {
                if i > 0 {
                    lines.push(Line::from(""));
                }
                lines.push(Line::from(Span::styled(
                    format!("── {} ──", app.t(key)),
                    Style::default().fg(PINK).add_modifier(Modifier::BOLD),
                )));
                continue;
            }
            (_, Some(label)) => label,
            (_, None) => continue,
        };

        let is_selected = focusable_idx == app.settings.selected;
        let padding = max_label_width.saturating_sub(UnicodeWidthStr::width(label.as_str()));
        let label_padded = format!(" {}:{} ", label, " ".repeat(padding));
        let bg = if is_selected {
            Style::default().bg(SEL_BG)
        } else {
            Style::default()
        };

        match item {
            SettingsItem::Language(lang) => {
                lines.push(Line::from(vec![
                    Span::styled(label_padded, bg.fg(BLUE).add_modifier(Modifier::BOLD)),
                    Span::styled(
                        format!("◀ {} ▶", lang.native_name()),
                        bg.fg(BRIGHT_WHITE).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("  {}", lang.code()), bg.fg(DIM)),
                ]));
            }
            SettingsItem::TextEdit { .. } if is_selected && app.settings.editing => {
                let buf = &app.settings.edit_buffer;
                let cursor_pos = app.settings.edit_cursor;
                let before: String = buf.chars().take(cursor_pos).collect();
                let cursor_char: String = buf.chars().skip(cursor_pos).take(1).collect();
                let after: String = buf.chars().skip(cursor_pos + 1).collect();
                let cursor_display = if cursor_char.is_empty() {
                    " ".to_string()
                } else {
                    cursor_char
                };

                lines.push(Line::from(vec![
                    Span::styled(label_padded, bg.fg(BLUE).add_modifier(Modifier::BOLD)),
                    Span::styled(before, bg.fg(BRIGHT_WHITE)),
                    Span::styled(cursor_display, Style::default().fg(Color::Black).bg(Color::Yellow)),
                    Span::styled(after, bg.fg(BRIGHT_WHITE)),
                ]));
            }
            SettingsItem::TextEdit { value, .. } => {
                let (display_value, value_color) = if value.is_empty() {
                    ("-".to_string(), DIM)
                } else {
                    (value.clone(), if is_selected { BRIGHT_WHITE } else { Color::White })
                };
                let value_style = if is_selected {
                    bg.fg(value_color).add_modifier(Modifier::BOLD)
                } else {
                    bg.fg(value_color)
                };
                lines.push(Line::from(vec![
                    Span::styled(label_padded, bg.fg(BLUE)),
                    Span::styled(display_value, value_style),
                ]));
            }
            SettingsItem::Section(_) => {}
        }
        focusable_idx += 1;
    }

    let total_lines = lines.len();
    let scroll = if total_lines > visible_height {
        let selected_line = find_selected_line(items, app.settings.selected);
        if selected_line >= visible_height {
            selected_line.saturating_sub(visible_height / 2)
        } else {
            0
        }
    } else {
        0
    };

    let visible_lines: Vec<Line> = lines.into_iter().skip(scroll).take(visible_height).collect();
    f.render_widget(Paragraph::new(visible_lines), area);

    if total_lines > visible_height {
        layout::render_scrollbar(f, total_lines, scroll, area);
    }
}

/// Rendered row of the selected item
fn find_selected_line(items: &[SettingsItem], selected: usize) -> usize {
    let mut line = 0;
    let mut focusable_idx = 0;

    for (i, item) in items.iter().enumerate() {
        match item {
            SettingsItem::Section(_) => {
                if i > 0 {
                    line += 1;
                }
                line += 1;
            }
            _ => {
                if focusable_idx == selected {
                    return line;
                }
                line += 1;
                focusable_idx += 1;
            }
        }
    }
    line
}
