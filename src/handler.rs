use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;
use wrap_context::arg_context;

use crate::{app::App, form_model::FormKey, types::FocusDirection};

#[rustfmt::skip]
/// Handles the key events and updates the state of [`App`].
pub fn handle_key_events(key_event: KeyEvent, app: &mut App) -> anyhow::Result<()> {
    match key_event.code {
        // Exit application on `Ctrl-C` or `Ctrl-Q`, plain letters go to the focused field
        KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Char('q') | KeyCode::Char('Q')
            if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            app.quit();
        }
        KeyCode::Tab => {
            app.focus_move(FocusDirection::Next);
        }
        KeyCode::BackTab => {
            app.focus_move(FocusDirection::Prev);
        }
        KeyCode::Char(c) if !key_event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            arg_context!(app.key(FormKey::Char(c)))?;
        }
        KeyCode::Backspace => {
            arg_context!(app.key(FormKey::Backspace))?;
        }
        KeyCode::Up => {
            arg_context!(app.key(FormKey::Up))?;
        }
        KeyCode::Down => {
            arg_context!(app.key(FormKey::Down))?;
        }
        KeyCode::Enter => {
            arg_context!(app.key(FormKey::Enter))?;
        }
        KeyCode::Esc => {
            arg_context!(app.key(FormKey::Escape))?;
        }
        _ => {}
    }

    anyhow::Ok(())
}

/// Left presses are pointer-downs, any motion drives hover
pub fn handle_mouse_events(mouse_event: MouseEvent, app: &mut App) -> anyhow::Result<bool> {
    let position = Position::new(mouse_event.column, mouse_event.row);

    let redraw = match mouse_event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            arg_context!(app.pointer_down(position))?;
            true
        }
        MouseEventKind::Moved | MouseEventKind::Drag(_) => app.pointer_move(position),
        _ => false,
    };

    anyhow::Ok(redraw)
}
