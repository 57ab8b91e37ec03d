//! Keyboard input handling for the TUI.
//!
//! Overlays are checked first, in the order they stack on screen; only
//! when none is open do global keys and per-tab keys apply.

use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use silamba_core::models::AdPosition;

use crate::app::{
    can_add_password_char, can_add_path_char, can_add_username_char, App, AppState, Focus,
    LoginFocus, Page, Tab, PAGE_SCROLL_SIZE,
};

const HOME_SLOTS: [AdPosition; 3] = [AdPosition::HomeTop, AdPosition::HomeMiddle, AdPosition::HomeBottom];
const CATEGORY_SLOTS: [AdPosition; 2] = [AdPosition::CategoryTop, AdPosition::CategoryBottom];

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => return handle_login_input(app, key),
        AppState::EditingForm => return handle_form_input(app, key),
        AppState::UploadingImage => return handle_upload_input(app, key),
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
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
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_pending_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingRedirect => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_redirect(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_redirect(),
                _ => {}
            }
            return Ok(false);
        }
        AppState::ShowingOffer => {
            match key.code {
                KeyCode::Enter => {
                    let link = app
                        .offer_popup
                        .banner()
                        .filter(|b| b.has_cta())
                        .map(|b| (b.title.clone(), b.cta_link.clone()));
                    app.dismiss_offer();
                    if let Some((label, url)) = link {
                        app.open_link(&label, &url);
                    }
                }
                KeyCode::Esc | KeyCode::Char('x') | KeyCode::Char('q') => app.dismiss_offer(),
                _ => {}
            }
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('1') => app.switch_tab(Tab::Home),
        KeyCode::Char('2') => app.switch_tab(Tab::Categories),
        KeyCode::Char('3') => app.switch_tab(Tab::Occasions),
        KeyCode::Char('4') => app.switch_tab(Tab::Offers),
        KeyCode::Char('5') => app.switch_tab(Tab::Admin),
        KeyCode::Left => app.switch_tab(app.current_tab.prev()),
        KeyCode::Right => app.switch_tab(app.current_tab.next()),
        KeyCode::Char('r') => app.refresh_all_background(),
        KeyCode::Char('u') => app.force_refresh(),
        KeyCode::Char('x') => app.floating_ad.close(),
        KeyCode::Char('i') => app.page = Some(Page::About),
        KeyCode::Char('c') => app.page = Some(Page::Contact),
        KeyCode::Esc if app.page.is_some() => app.close_page(),
        KeyCode::Tab if app.current_tab == Tab::Categories => {
            app.focus = match app.focus {
                Focus::List => Focus::Detail,
                Focus::Detail => Focus::List,
            };
        }
        KeyCode::Esc => {
            app.focus = Focus::List;
            app.status_message = None;
        }
        _ if app.page.is_some() => {}
        _ => match app.current_tab {
            Tab::Home => handle_home_input(app, key),
            Tab::Categories => handle_categories_input(app, key),
            Tab::Occasions | Tab::Offers => handle_list_input(app, key),
            Tab::Admin => handle_admin_input(app, key),
        },
    }

    Ok(false)
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => app.cancel_login(),
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => app.attempt_login(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.len(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.len(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_form_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('u') => app.start_upload(),
            KeyCode::Char('s') => app.submit_form(),
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Enter => app.submit_form(),
        KeyCode::Left | KeyCode::Right => {
            let forward = key.code == KeyCode::Right;
            app.cycle_form_category(forward);
            if let Some(form) = app.form.as_mut() {
                form.cycle_choice(forward);
            }
        }
        _ => {
            let Some(form) = app.form.as_mut() else {
                return Ok(false);
            };
            match key.code {
                KeyCode::Tab | KeyCode::Down => form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Char(c) if !c.is_control() => form.input_char(c),
                _ => {}
            }
        }
    }
    Ok(false)
}

fn handle_upload_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => app.cancel_upload(),
        KeyCode::Enter => {
            if !app.upload_path.trim().is_empty() {
                app.submit_upload();
            }
        }
        KeyCode::Backspace => {
            app.upload_path.pop();
        }
        KeyCode::Char(c) => {
            if can_add_path_char(app.upload_path.len(), c) {
                app.upload_path.push(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_home_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Char('[') => app.next_banner(false),
        KeyCode::Char('l') | KeyCode::Char(']') => app.next_banner(true),
        KeyCode::Enter => app.activate_selection(),
        KeyCode::Char('a') => open_first_ad(app, &HOME_SLOTS),
        KeyCode::Char('f') => {
            if app.floating_ad.is_visible(Instant::now()) {
                open_first_ad(app, &[AdPosition::Floating]);
            }
        }
        _ => {}
    }
}

fn handle_categories_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('a') => open_first_ad(app, &CATEGORY_SLOTS),
        _ => handle_list_input(app, key),
    }
}

/// Follow the ad showing in the first filled slot of `slots`.
fn open_first_ad(app: &mut App, slots: &[AdPosition]) {
    let ad = slots
        .iter()
        .find_map(|position| app.slot_ad(*position))
        .map(|(ad, _, _)| (ad.title.clone(), ad.redirect_link.clone()));
    if let Some((label, url)) = ad {
        app.open_link(&label, &url);
    }
}

fn handle_list_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::Home => app.move_selection(isize::MIN / 2),
        KeyCode::End => app.move_selection(isize::MAX / 2),
        KeyCode::Enter => app.activate_selection(),
        _ => {}
    }
}

fn handle_admin_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('[') => app.cycle_admin_collection(false),
        KeyCode::Char(']') => app.cycle_admin_collection(true),
        KeyCode::Char('t') => app.toggle_selected_ad(),
        KeyCode::Char('n') | KeyCode::Char('a') => app.open_new_form(),
        KeyCode::Char('e') => app.open_edit_form(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('L') => app.logout(),
        _ => handle_list_input(app, key),
    }
}
