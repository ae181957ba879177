//! Single-line text field over `tui_input::Input`.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tui_input::{Input, InputRequest};

use crate::theme;

/// Apply an editing key to `input`. Returns false for keys it ignores.
pub fn handle_key(input: &mut Input, key: KeyEvent) -> bool {
    let request = match key.code {
        KeyCode::Char(c) => InputRequest::InsertChar(c),
        KeyCode::Backspace => InputRequest::DeletePrevChar,
        KeyCode::Delete => InputRequest::DeleteNextChar,
        KeyCode::Left => InputRequest::GoToPrevChar,
        KeyCode::Right => InputRequest::GoToNextChar,
        KeyCode::Home => InputRequest::GoToStart,
        KeyCode::End => InputRequest::GoToEnd,
        _ => return false,
    };
    input.handle(request);
    true
}

/// Render `label: value` with the terminal cursor placed in the value.
pub fn render(frame: &mut Frame, area: Rect, label: &str, input: &Input) {
    let prefix = format!("{label}: ");
    let prefix_width = u16::try_from(prefix.chars().count()).unwrap_or(u16::MAX);
    let room = usize::from(area.width.saturating_sub(prefix_width).saturating_sub(1));
    let scroll = input.visual_scroll(room);

    let line = Line::from(vec![
        Span::styled(prefix, theme::key_hint()),
        Span::styled(
            input.value().chars().skip(scroll).collect::<String>(),
            Style::default().fg(theme::NEON_CYAN),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    let cursor = input.visual_cursor().saturating_sub(scroll);
    let cursor = u16::try_from(cursor).unwrap_or(u16::MAX);
    frame.set_cursor_position(Position::new(
        area.x.saturating_add(prefix_width).saturating_add(cursor),
        area.y,
    ));
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn edits_apply_at_cursor() {
        let mut input = Input::new("Clone of Base".into());
        assert!(handle_key(&mut input, key(KeyCode::Backspace)));
        assert!(handle_key(&mut input, key(KeyCode::Char('X'))));
        assert_eq!(input.value(), "Clone of BasX");

        assert!(handle_key(&mut input, key(KeyCode::Home)));
        assert!(handle_key(&mut input, key(KeyCode::Char('>'))));
        assert_eq!(input.value(), ">Clone of BasX");
    }

    #[test]
    fn ignores_navigation_it_does_not_own() {
        let mut input = Input::default();
        assert!(!handle_key(&mut input, key(KeyCode::Enter)));
        assert!(!handle_key(&mut input, key(KeyCode::Esc)));
    }
}
