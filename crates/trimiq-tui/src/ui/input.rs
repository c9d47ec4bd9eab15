//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. On the editor page, key presses become the
//! element events a browser would deliver.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use trimiq_core::Page;

use crate::app::{
    can_add_email_char, can_add_password_char, can_add_path_char, can_add_prompt_char, start_path,
    App, AppState, EditorFocus, LoginFocus, RegisterFocus,
};

/// Handle a key press. Returns `true` when the app should exit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    if let AppState::PickingFile(_) = app.state {
        handle_picker_input(app, key);
        return Ok(false);
    }

    if matches!(app.state, AppState::EditingPrompt) {
        handle_prompt_input(app, key);
        return Ok(false);
    }

    match app.page {
        Page::Login => handle_login_input(app, key).await,
        Page::Register => handle_register_input(app, key).await,
        Page::Editor => {
            handle_editor_input(app, key);
            Ok(false)
        }
        Page::Other(_) => {
            match key.code {
                KeyCode::Char('e') | KeyCode::Enter => app.navigate(start_path()),
                KeyCode::Char('q') | KeyCode::Esc => app.state = AppState::ConfirmingQuit,
                _ => {}
            }
            Ok(false)
        }
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = app.login_focus.prev();
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password => app.login_focus = LoginFocus::Button,
            LoginFocus::Button => {
                // On failure login_error is set and the page stays
                let _ = app.attempt_login().await;
            }
            LoginFocus::RegisterLink => app.go_to(&Page::Register),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button | LoginFocus::RegisterLink => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_email.chars().count(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button | LoginFocus::RegisterLink => {}
        },
        _ => {}
    }
    Ok(false)
}

async fn handle_register_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => app.go_to(&Page::Login),
        KeyCode::Down | KeyCode::Tab => {
            app.register_focus = app.register_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.register_focus = app.register_focus.prev();
        }
        KeyCode::Enter => match app.register_focus {
            RegisterFocus::Button => {
                let _ = app.attempt_register().await;
            }
            RegisterFocus::LoginLink => app.go_to(&Page::Login),
            focus => app.register_focus = focus.next(),
        },
        KeyCode::Backspace => {
            if let Some(field) = register_field(app) {
                field.pop();
            }
        }
        KeyCode::Char(c) => {
            let accept = match app.register_focus {
                RegisterFocus::Username => {
                    can_add_email_char(app.register_username.chars().count(), c)
                }
                RegisterFocus::Email => can_add_email_char(app.register_email.chars().count(), c),
                RegisterFocus::Password => {
                    can_add_password_char(app.register_password.chars().count(), c)
                }
                RegisterFocus::Button | RegisterFocus::LoginLink => false,
            };
            if accept {
                if let Some(field) = register_field(app) {
                    field.push(c);
                }
            }
        }
        _ => {}
    }
    Ok(false)
}

/// The text field behind the focused register control
fn register_field(app: &mut App) -> Option<&mut String> {
    match app.register_focus {
        RegisterFocus::Username => Some(&mut app.register_username),
        RegisterFocus::Email => Some(&mut app.register_email),
        RegisterFocus::Password => Some(&mut app.register_password),
        RegisterFocus::Button | RegisterFocus::LoginLink => None,
    }
}

fn handle_editor_input(app: &mut App, key: KeyEvent) {
    if !app.is_editor_ready() {
        return;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('r') => {
            // Reloading the page refetches the balance
            app.navigate(start_path());
        }
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => {
            app.editor_focus = app.editor_focus.next();
        }
        KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => {
            app.editor_focus = app.editor_focus.prev();
        }
        KeyCode::Right if app.editor_focus == EditorFocus::Resolution => {
            app.editor_state.resolution = app.editor_state.resolution.next();
        }
        KeyCode::Left if app.editor_focus == EditorFocus::Resolution => {
            // Three resolutions: two steps forward is one back
            app.editor_state.resolution = app.editor_state.resolution.next().next();
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.activate_focused();
        }
        KeyCode::Esc => {
            app.editor_state.notice = None;
            app.status_message = None;
        }
        _ => {}
    }
}

fn handle_picker_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_picker(),
        KeyCode::Enter => app.submit_picker(),
        KeyCode::Backspace => {
            app.picker_input.pop();
        }
        KeyCode::Char(c) => {
            if can_add_path_char(app.picker_input.chars().count(), c) {
                app.picker_input.push(c);
            }
        }
        _ => {}
    }
}

fn handle_prompt_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.editor_state.text_prompt.pop();
        }
        KeyCode::Char(c) => {
            if can_add_prompt_char(app.editor_state.text_prompt.chars().count(), c) {
                app.editor_state.text_prompt.push(c);
            }
        }
        _ => {}
    }
}
