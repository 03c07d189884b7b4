use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Single-line text field, cursor counted in chars
#[derive(Debug, Clone)]
pub struct InputBox {
    content: String,
    cursor: usize,
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            content: String::new(),
            cursor: 0,
        }
    }

    pub fn with_content(text: &str) -> Self {
        Self {
            content: text.to_string(),
            cursor: text.chars().count(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor_pos(&self) -> usize {
        self.cursor
    }

    /// Applies an editing key. Returns false for keys the field ignores.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let len = self.content.chars().count();
        match key.code {
            KeyCode::Char(c) => str_insert_char(&mut self.content, &mut self.cursor, c),
            KeyCode::Backspace => str_delete_back(&mut self.content, &mut self.cursor),
            KeyCode::Delete => str_delete_forward(&mut self.content, &mut self.cursor),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right if self.cursor < len => self.cursor += 1,
            KeyCode::Right => {}
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len,
            _ => return false,
        }
        true
    }
}

pub fn render_input_box(f: &mut Frame, input: &InputBox, label: &str, focused: bool, area: Rect) {
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let chars: Vec<char> = input.content().chars().collect();
    let cursor_pos = input.cursor_pos().min(chars.len());
    let before: String = chars[..cursor_pos].iter().collect();
    let cursor_char = chars
        .get(cursor_pos)
        .map(|c| c.to_string())
        .unwrap_or_else(|| " ".to_string());
    let after: String = chars.iter().skip(cursor_pos + 1).collect();

    let mut spans = vec![
        Span::styled(
            format!("{label} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(before, Style::default().fg(Color::White)),
    ];

    if focused {
        spans.push(Span::styled(
            cursor_char,
            Style::default().fg(Color::Black).bg(Color::White),
        ));
    } else {
        spans.push(Span::styled(cursor_char, Style::default().fg(Color::White)));
    }
    spans.push(Span::styled(after, Style::default().fg(Color::White)));

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

// ===== shared text editing helpers =====

/// Char index to byte index, UTF-8 safe
pub fn char_to_byte(s: &str, char_pos: usize) -> usize {
    s.char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn str_insert_char(s: &mut String, cursor: &mut usize, c: char) {
    let byte_pos = char_to_byte(s, *cursor);
    s.insert(byte_pos, c);
    *cursor += 1;
}

/// Backspace
pub fn str_delete_back(s: &mut String, cursor: &mut usize) {
    if *cursor > 0 {
        *cursor -= 1;
        let byte_pos = char_to_byte(s, *cursor);
        let next_byte_pos = char_to_byte(s, *cursor + 1);
        s.drain(byte_pos..next_byte_pos);
    }
}

/// Delete
pub fn str_delete_forward(s: &mut String, cursor: &mut usize) {
    if *cursor < s.chars().count() {
        let byte_pos = char_to_byte(s, *cursor);
        let next_byte_pos = char_to_byte(s, *cursor + 1);
        s.drain(byte_pos..next_byte_pos);
    }
}
