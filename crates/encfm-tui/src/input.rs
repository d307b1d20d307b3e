//! Keyboard input routing.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use encfm_core::Charset;

use crate::app::{App, AppMode};

/// Routes one key press according to the current [`AppMode`].
pub fn handle_key(app: &mut App, key: KeyEvent) {
    match app.mode().clone() {
        AppMode::Browse => handle_browse(app, key),
        AppMode::PathInput(input) => handle_path_input(app, key, input),
        AppMode::EncodingSelect { selected } => handle_encoding_select(app, key, selected),
        AppMode::ConfirmConvert { target } => handle_confirm(app, key, target),
        AppMode::Report => handle_report(app, key),
    }
}

fn handle_browse(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Up | KeyCode::Char('k') => app.cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => app.cursor_down(),
        KeyCode::Home | KeyCode::Char('g') => app.cursor_top(),
        KeyCode::End | KeyCode::Char('G') => app.cursor_bottom(),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.activate(),
        KeyCode::Left | KeyCode::Char('h') => app.collapse_current(),
        KeyCode::Char(' ') => app.toggle_mark(),
        KeyCode::Char('p') => app.open_path_input(),
        KeyCode::Char('c') => app.begin_convert(),
        KeyCode::Char('r') => app.refresh(),
        _ => {}
    }
}

fn handle_path_input(app: &mut App, key: KeyEvent, mut input: String) {
    match key.code {
        KeyCode::Esc => app.set_mode(AppMode::Browse),
        KeyCode::Enter => app.apply_path_input(),
        KeyCode::Backspace => {
            input.pop();
            app.set_mode(AppMode::PathInput(input));
        }
        KeyCode::Char(c) => {
            input.push(c);
            app.set_mode(AppMode::PathInput(input));
        }
        _ => {}
    }
}

fn handle_encoding_select(app: &mut App, key: KeyEvent, selected: usize) {
    match key.code {
        KeyCode::Esc => app.set_mode(AppMode::Browse),
        KeyCode::Up | KeyCode::Char('k') => {
            let selected = selected.checked_sub(1).unwrap_or(Charset::ALL.len() - 1);
            app.set_mode(AppMode::EncodingSelect { selected });
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let selected = (selected + 1) % Charset::ALL.len();
            app.set_mode(AppMode::EncodingSelect { selected });
        }
        KeyCode::Enter => app.pick_encoding(Charset::ALL[selected]),
        _ => {}
    }
}

fn handle_confirm(app: &mut App, key: KeyEvent, target: Charset) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.run_convert(target),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.set_mode(AppMode::Browse);
        }
        _ => {}
    }
}

fn handle_report(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.set_mode(AppMode::Browse),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;
    use encfm_core::Config;
    use std::fs;
    use tempfile::TempDir;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_one_file() -> (TempDir, App) {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "hello").unwrap();
        let app = App::new(tmp.path(), Config::default()).unwrap();
        (tmp, app)
    }

    #[test]
    fn q_quits_in_browse() {
        let (_tmp, mut app) = app_with_one_file();
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(app.should_quit());
    }

    #[test]
    fn space_marks_and_c_opens_picker() {
        let (_tmp, mut app) = app_with_one_file();
        handle_key(&mut app, press(KeyCode::Char(' ')));
        handle_key(&mut app, press(KeyCode::Char('c')));
        assert!(matches!(app.mode(), AppMode::EncodingSelect { .. }));
    }

    #[test]
    fn picker_wraps_around() {
        let (_tmp, mut app) = app_with_one_file();
        app.set_mode(AppMode::EncodingSelect { selected: 0 });

        handle_key(&mut app, press(KeyCode::Up));
        assert_eq!(
            app.mode(),
            &AppMode::EncodingSelect {
                selected: Charset::ALL.len() - 1
            }
        );

        handle_key(&mut app, press(KeyCode::Down));
        assert_eq!(app.mode(), &AppMode::EncodingSelect { selected: 0 });
    }

    #[test]
    fn picker_enter_asks_for_confirmation() {
        let (_tmp, mut app) = app_with_one_file();
        handle_key(&mut app, press(KeyCode::Char(' ')));
        handle_key(&mut app, press(KeyCode::Char('c')));
        handle_key(&mut app, press(KeyCode::Enter));
        assert!(matches!(app.mode(), AppMode::ConfirmConvert { .. }));
    }

    #[test]
    fn confirm_n_cancels() {
        let (_tmp, mut app) = app_with_one_file();
        app.set_mode(AppMode::ConfirmConvert {
            target: Charset::Utf8,
        });
        handle_key(&mut app, press(KeyCode::Char('n')));
        assert_eq!(app.mode(), &AppMode::Browse);
    }

    #[test]
    fn confirm_y_converts_and_shows_report() {
        let (_tmp, mut app) = app_with_one_file();
        handle_key(&mut app, press(KeyCode::Char(' ')));
        app.set_mode(AppMode::ConfirmConvert {
            target: Charset::Utf8,
        });
        handle_key(&mut app, press(KeyCode::Char('y')));
        assert_eq!(app.mode(), &AppMode::Report);
        assert!(app.report().is_some());
    }

    #[test]
    fn path_input_edits_and_escapes() {
        let (_tmp, mut app) = app_with_one_file();
        app.set_mode(AppMode::PathInput("/tm".to_string()));

        handle_key(&mut app, press(KeyCode::Char('p')));
        assert_eq!(app.mode(), &AppMode::PathInput("/tmp".to_string()));

        handle_key(&mut app, press(KeyCode::Backspace));
        assert_eq!(app.mode(), &AppMode::PathInput("/tm".to_string()));

        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.mode(), &AppMode::Browse);
    }
}
