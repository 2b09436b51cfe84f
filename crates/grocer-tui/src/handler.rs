use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use grocer_core::{Keystroke, KeystrokeOutcome, SubmitOutcome, ViewSurface};

use crate::app::App;
use crate::tui::AppEvent;

const MOUSE_SCROLL_LINES: i32 = 3;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if matches!(key.code, KeyCode::PageUp | KeyCode::PageDown) {
        let delta = if key.code == KeyCode::PageUp { -page(app) } else { page(app) };
        app.view_mut().scroll_by(delta);
        return;
    }

    if app.view().is_input_focused() {
        handle_input_key(app, key);
    } else {
        handle_browse_key(app, key);
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.view_mut().blur_input(),
        KeyCode::Enter => {
            // Shift+Enter rarely reaches a terminal app; accept Alt+Enter too
            let line_break = key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);
            match app.controller.handle_keystroke(Keystroke::Enter { line_break }) {
                KeystrokeOutcome::InsertNewline => edit(app, |view| view.insert_char('\n')),
                KeystrokeOutcome::Submit(SubmitOutcome::Started(pending)) => {
                    app.start_request(pending);
                }
                KeystrokeOutcome::Submit(SubmitOutcome::Blocked) => {
                    tracing::debug!("enter ignored while waiting for reply");
                }
                KeystrokeOutcome::Submit(SubmitOutcome::Ignored) | KeystrokeOutcome::PassThrough => {}
            }
        }
        KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            edit(app, |view| view.insert_char('\n'));
        }
        KeyCode::Backspace => edit(app, |view| view.backspace()),
        KeyCode::Delete => edit(app, |view| view.delete()),
        KeyCode::Left => app.view_mut().cursor_left(),
        KeyCode::Right => app.view_mut().cursor_right(),
        KeyCode::Home => app.view_mut().cursor_home(),
        KeyCode::End => app.view_mut().cursor_end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            edit(app, |view| view.insert_char(c));
        }
        _ => {}
    }
}

/// Keys while the input is not focused: scroll the conversation.
fn handle_browse_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Enter | KeyCode::Tab => app.view_mut().focus_input(),
        KeyCode::Char('j') | KeyCode::Down => app.view_mut().scroll_by(1),
        KeyCode::Char('k') | KeyCode::Up => app.view_mut().scroll_by(-1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half = page(app) / 2;
            app.view_mut().scroll_by(half);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half = page(app) / 2;
            app.view_mut().scroll_by(-half);
        }
        KeyCode::Char('g') | KeyCode::Home => app.view_mut().scroll_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.view_mut().scroll_to_bottom(),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.view_mut().scroll_by(MOUSE_SCROLL_LINES),
        MouseEventKind::ScrollUp => app.view_mut().scroll_by(-MOUSE_SCROLL_LINES),
        _ => {}
    }
}

/// Apply an edit to the input and let the controller resize it.
fn edit(app: &mut App, change: impl FnOnce(&mut crate::view::TerminalView)) {
    change(app.view_mut());
    app.controller.input_changed();
}

fn page(app: &App) -> i32 {
    i32::from(app.view().scroll.viewport.max(1))
}
