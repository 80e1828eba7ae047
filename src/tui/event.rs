//! Event loop with crossterm for terminal input handling.
//!
//! Polls for keyboard events at the tick rate and separates input handling
//! from rendering.
//!
//! Key bindings:
//! - Tab: cycle focus panel
//! - Ctrl+1/2/3: direct panel focus (overview/editor/results)
//! - Ctrl+Enter: execute query from editor
//! - Ctrl+S: toggle the sample dataset
//! - Ctrl+R: reload the current source
//! - Esc: return to editor
//! - q (outside the editor), Ctrl+C, Ctrl+Q: quit
//! - Editor panel: text editing (arrows, insert, backspace, etc.)

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use super::app::{AppState, FocusPanel};

/// Events produced by the event loop.
#[derive(Debug)]
pub enum AppEvent {
    /// Terminal key press.
    Key(KeyEvent),
    /// Tick (render frame).
    Tick,
    /// Quit requested.
    Quit,
    /// Window resize.
    Resize(u16, u16),
}

/// Poll for the next event with the given timeout.
/// Returns AppEvent::Tick if no event is available within the timeout.
pub fn poll_event(tick_rate: Duration) -> std::io::Result<AppEvent> {
    if event::poll(tick_rate)? {
        match event::read()? {
            Event::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && (key.code == KeyCode::Char('c') || key.code == KeyCode::Char('q'))
                {
                    return Ok(AppEvent::Quit);
                }
                Ok(AppEvent::Key(key))
            }
            Event::Resize(w, h) => Ok(AppEvent::Resize(w, h)),
            _ => Ok(AppEvent::Tick),
        }
    } else {
        Ok(AppEvent::Tick)
    }
}

/// Handle a key event against the application state.
/// Returns true if the event was consumed.
pub fn handle_key(key: &KeyEvent, app: &mut AppState) -> bool {
    let has_ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global bindings (work regardless of focused panel)

    if has_ctrl && key.code == KeyCode::Enter {
        app.run_query();
        return true;
    }

    if has_ctrl {
        match key.code {
            KeyCode::Char('1') => {
                app.focus = FocusPanel::Overview;
                return true;
            }
            KeyCode::Char('2') => {
                app.focus = FocusPanel::Editor;
                return true;
            }
            KeyCode::Char('3') => {
                app.focus = FocusPanel::Results;
                return true;
            }
            KeyCode::Char('s') => {
                app.toggle_sample();
                return true;
            }
            KeyCode::Char('r') => {
                app.refresh();
                return true;
            }
            _ => {}
        }
    }

    if key.code == KeyCode::Tab {
        app.cycle_focus();
        return true;
    }

    if key.code == KeyCode::Esc {
        app.focus = FocusPanel::Editor;
        return true;
    }

    // 'q' quits everywhere except the editor, where it types.
    if key.code == KeyCode::Char('q') && app.focus != FocusPanel::Editor {
        app.running = false;
        return true;
    }

    match app.focus {
        FocusPanel::Editor => handle_editor_key(key, app),
        FocusPanel::Results => handle_results_key(key, app),
        FocusPanel::Overview => false,
    }
}

/// Handle key events when the editor panel is focused.
fn handle_editor_key(key: &KeyEvent, app: &mut AppState) -> bool {
    match key.code {
        KeyCode::Char(ch) => {
            app.editor_state.insert_char(ch);
            true
        }
        KeyCode::Enter => {
            app.editor_state.insert_newline();
            true
        }
        KeyCode::Backspace => {
            app.editor_state.backspace();
            true
        }
        KeyCode::Delete => {
            app.editor_state.delete_char();
            true
        }
        KeyCode::Left => {
            app.editor_state.move_left();
            true
        }
        KeyCode::Right => {
            app.editor_state.move_right();
            true
        }
        KeyCode::Up => {
            app.editor_state.move_up();
            true
        }
        KeyCode::Down => {
            app.editor_state.move_down();
            true
        }
        KeyCode::Home => {
            app.editor_state.move_home();
            true
        }
        KeyCode::End => {
            app.editor_state.move_end();
            true
        }
        _ => false,
    }
}

/// Handle key events when the results panel is focused.
fn handle_results_key(key: &KeyEvent, app: &mut AppState) -> bool {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            app.results_scroll_down();
            true
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.results_scroll_up();
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SourceSpec;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn make_key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    fn make_app() -> AppState {
        AppState::new(SourceSpec::default(), "thermal")
    }

    #[test]
    fn test_tab_cycles_focus() {
        let mut app = make_app();
        assert_eq!(app.focus, FocusPanel::Editor);
        assert!(handle_key(&make_key(KeyCode::Tab, KeyModifiers::empty()), &mut app));
        assert_eq!(app.focus, FocusPanel::Results);
    }

    #[test]
    fn test_esc_returns_to_editor() {
        let mut app = make_app();
        app.focus = FocusPanel::Results;
        assert!(handle_key(&make_key(KeyCode::Esc, KeyModifiers::empty()), &mut app));
        assert_eq!(app.focus, FocusPanel::Editor);
    }

    #[test]
    fn test_ctrl_digits_focus_panels() {
        let mut app = make_app();
        assert!(handle_key(&make_key(KeyCode::Char('1'), KeyModifiers::CONTROL), &mut app));
        assert_eq!(app.focus, FocusPanel::Overview);
        assert!(handle_key(&make_key(KeyCode::Char('3'), KeyModifiers::CONTROL), &mut app));
        assert_eq!(app.focus, FocusPanel::Results);
        assert!(handle_key(&make_key(KeyCode::Char('2'), KeyModifiers::CONTROL), &mut app));
        assert_eq!(app.focus, FocusPanel::Editor);
    }

    #[test]
    fn test_ctrl_s_toggles_sample() {
        let mut app = make_app();
        assert!(!app.source.use_sample);
        assert!(handle_key(&make_key(KeyCode::Char('s'), KeyModifiers::CONTROL), &mut app));
        assert!(app.source.use_sample);
    }

    #[test]
    fn test_editor_char_input() {
        let mut app = make_app();
        app.editor_state.set_text("");
        assert!(handle_key(&make_key(KeyCode::Char('S'), KeyModifiers::empty()), &mut app));
        assert_eq!(app.editor_state.text(), "S");
    }

    #[test]
    fn test_editor_enter_inserts_newline() {
        let mut app = make_app();
        app.editor_state.set_text("X");
        assert!(handle_key(&make_key(KeyCode::Enter, KeyModifiers::empty()), &mut app));
        assert_eq!(app.editor_state.lines.len(), 2);
    }

    #[test]
    fn test_q_in_editor_types_not_quits() {
        let mut app = make_app();
        app.editor_state.set_text("");
        assert!(handle_key(&make_key(KeyCode::Char('q'), KeyModifiers::empty()), &mut app));
        assert_eq!(app.editor_state.text(), "q");
        assert!(app.running);
    }

    #[test]
    fn test_q_outside_editor_quits() {
        let mut app = make_app();
        app.focus = FocusPanel::Overview;
        assert!(handle_key(&make_key(KeyCode::Char('q'), KeyModifiers::empty()), &mut app));
        assert!(!app.running);
    }

    #[test]
    fn test_results_scroll_keys() {
        let mut app = make_app();
        app.focus = FocusPanel::Results;
        app.set_result(crate::sql::QueryResult {
            columns: vec!["a".into()],
            rows: vec![vec!["1".into()], vec!["2".into()]],
            row_count: 2,
        });
        assert!(handle_key(&make_key(KeyCode::Down, KeyModifiers::empty()), &mut app));
        assert_eq!(app.results_offset, 1);
        assert!(handle_key(&make_key(KeyCode::Up, KeyModifiers::empty()), &mut app));
        assert_eq!(app.results_offset, 0);
    }

    #[test]
    fn test_unhandled_key_in_overview() {
        let mut app = make_app();
        app.focus = FocusPanel::Overview;
        assert!(!handle_key(&make_key(KeyCode::Char('x'), KeyModifiers::empty()), &mut app));
    }
}
