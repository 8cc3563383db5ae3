use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{char_to_byte_index, App, Field, FocusPane, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_api_key_input {
        handle_api_key_input(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_api_key_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_api_key_input(),
        KeyCode::Enter => {
            if app.api_key_input.trim().is_empty() {
                app.cancel_api_key_input();
            } else {
                app.submit_api_key();
            }
        }
        KeyCode::Backspace => {
            if app.api_key_input_cursor > 0 {
                app.api_key_input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.api_key_input, app.api_key_input_cursor);
                app.api_key_input.remove(byte_pos);
            }
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.api_key_input, app.api_key_input_cursor);
            app.api_key_input.insert(byte_pos, c);
            app.api_key_input_cursor += 1;
        }
        KeyCode::Left => {
            app.api_key_input_cursor = app.api_key_input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.api_key_input.chars().count();
            app.api_key_input_cursor = (app.api_key_input_cursor + 1).min(char_count);
        }
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.request_generation();
        }
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Tab | KeyCode::Down => {
            app.input_mode = InputMode::Normal;
            app.next_field();
        }
        KeyCode::Backspace => app.delete_topic_char_before_cursor(),
        KeyCode::Delete => app.delete_topic_char_at_cursor(),
        KeyCode::Left => app.move_topic_cursor(-1),
        KeyCode::Right => app.move_topic_cursor(1),
        KeyCode::Home => app.topic_cursor = 0,
        KeyCode::End => app.topic_cursor_to_end(),
        KeyCode::Char(c) => app.insert_topic_char(c),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }

        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::Form => FocusPane::Output,
                FocusPane::Output => FocusPane::Form,
            };
        }

        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::Form => app.next_field(),
            FocusPane::Output => app.scroll_down(),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::Form => app.prev_field(),
            FocusPane::Output => app.scroll_up(),
        },
        KeyCode::Char('l') | KeyCode::Right if app.focus == FocusPane::Form => {
            app.adjust_field(1);
        }
        KeyCode::Char('h') | KeyCode::Left if app.focus == FocusPane::Form => {
            app.adjust_field(-1);
        }
        KeyCode::Char(' ') if app.focus == FocusPane::Form && app.field == Field::Tldr => {
            app.adjust_field(1);
        }

        KeyCode::Enter => {
            if app.focus == FocusPane::Form && app.field == Field::Topic {
                start_editing(app);
            } else {
                app.request_generation();
            }
        }
        KeyCode::Char('i') | KeyCode::Char('/') => start_editing(app),
        KeyCode::Char('g') => app.request_generation(),
        KeyCode::Char('s') => app.download(),
        KeyCode::Char('K') => app.open_api_key_input(),

        _ => {}
    }
}

fn start_editing(app: &mut App) {
    app.focus = FocusPane::Form;
    app.field = Field::Topic;
    app.input_mode = InputMode::Editing;
    app.topic_cursor_to_end();
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => {
            for _ in 0..3 {
                app.scroll_down();
            }
        }
        MouseEventKind::ScrollUp => {
            for _ in 0..3 {
                app.scroll_up();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::app_with;
    use tempfile::TempDir;

    fn press(app: &mut App, code: KeyCode) {
        let key = KeyEvent::new(code, KeyModifiers::NONE);
        handle_event(app, AppEvent::Key(key)).unwrap();
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_typing_then_enter_starts_generation() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(Some("# Post"), &dir);

        type_str(&mut app, "Rust tips");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.topic_input, "Rust tips");
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.generating);
    }

    #[test]
    fn test_q_while_editing_is_text() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(None, &dir);
        type_str(&mut app, "q");
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_sidebar_controls() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(None, &dir);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.field, Field::Temperature);

        press(&mut app, KeyCode::Right);
        assert_eq!(app.temperature, 0.8);

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.word_count, 1300);

        for _ in 0..3 {
            press(&mut app, KeyCode::Char('j'));
        }
        assert_eq!(app.field, Field::Tldr);
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.include_tldr);
    }

    #[test]
    fn test_empty_topic_generate_only_warns() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(Some("# Post"), &dir);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('g'));
        assert!(!app.generating);
        assert!(app.status.is_some());
    }

    #[test]
    fn test_api_key_popup_escape_cancels() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = app_with(None, &dir);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('K'));
        assert!(app.show_api_key_input);

        type_str(&mut app, "abc");
        assert_eq!(app.api_key_input, "abc");
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_api_key_input);
        assert!(app.api_key_input.is_empty());
    }
}
