//! Pure state transitions: (Screen, Action) → Transition.
//!
//! This is the core logic of the TUI. Fully testable without a terminal.
//! Each screen defines which actions it accepts. Unhandled actions
//! return the current screen unchanged (no-op).

use std::time::Instant;

use crate::review::ReviewSession;
use crate::types::User;

use super::state::{Action, App, Context, Effect, Field, LoginForm, Screen, Transition};

/// Pure state transition function.
///
/// Given the current screen, an action, and read-only context, produces
/// the next transition. The effects boundary interprets the result.
pub fn update(screen: Screen, action: &Action, ctx: &Context<'_>) -> Transition {
    match screen {
        Screen::Loading => update_loading(action),
        Screen::Login(form) => update_login(form, action),
        Screen::Home => update_home(action, ctx),
        Screen::Learn(session) => update_learn(session, action, ctx.now),
    }
}

/// Route on an auth-state change from the identity provider.
///
/// Signed in: leave Loading/Login for Home, stay put elsewhere.
/// Signed out: back to an empty Login from anywhere; the dashboard
/// summary belongs to the previous user and is dropped.
pub fn handle_auth_changed(app: &mut App, user: Option<User>) {
    match &user {
        Some(u) => {
            tracing::debug!(uid = %u.uid, "auth: signed in");
            if matches!(app.screen, Screen::Loading | Screen::Login(_)) {
                app.screen = Screen::Home;
            }
        }
        None => {
            tracing::debug!("auth: signed out");
            app.last_stats = None;
            if !matches!(app.screen, Screen::Login(_)) {
                app.screen = Screen::login();
            }
        }
    }
    app.notice = None;
    app.user = user;
}

/// Fire a due celebration timer on the learn screen.
pub fn handle_tick(app: &mut App, now: Instant) {
    if let Screen::Learn(session) = &mut app.screen {
        session.tick(now);
    }
}

// ============================================================================
// PER-SCREEN HANDLERS
// ============================================================================

/// Loading: only Quit is meaningful.
fn update_loading(action: &Action) -> Transition {
    match action {
        Action::Quit => Transition::Quit,
        _ => Transition::Screen(Screen::Loading),
    }
}

/// Login: text entry, field switching, sign-in / sign-up.
fn update_login(mut form: LoginForm, action: &Action) -> Transition {
    match action {
        Action::Input(c) => {
            form.focused_mut().push(*c);
            Transition::Screen(Screen::Login(form))
        }
        Action::Backspace => {
            form.focused_mut().pop();
            Transition::Screen(Screen::Login(form))
        }
        Action::NextField => {
            form.focus = match form.focus {
                Field::Email => Field::Password,
                Field::Password => Field::Email,
            };
            Transition::Screen(Screen::Login(form))
        }
        Action::Enter => {
            form.error = None;
            Transition::Effect(Effect::SignIn(form))
        }
        Action::CreateAccount => {
            form.error = None;
            Transition::Effect(Effect::SignUp(form))
        }
        Action::Back => {
            form.error = None;
            Transition::Screen(Screen::Login(form))
        }
        Action::Quit => Transition::Quit,
        _ => Transition::Screen(Screen::Login(form)),
    }
}

/// Home: start learning, sign out, quit.
fn update_home(action: &Action, ctx: &Context<'_>) -> Transition {
    match action {
        Action::Learn | Action::Enter => Transition::Screen(Screen::learn(ctx.deck, ctx.review)),
        Action::SignOut => Transition::Effect(Effect::SignOut),
        Action::Quit => Transition::Quit,
        _ => Transition::Screen(Screen::Home),
    }
}

/// Learn: drive the review session; Back closes it.
fn update_learn(mut session: ReviewSession, action: &Action, now: Instant) -> Transition {
    match action {
        Action::KnowIt => {
            session.know_it(now);
        }
        Action::ShowDefinition => {
            session.dont_know_it();
        }
        Action::Continue => {
            session.continue_after_reveal();
        }
        Action::Skip => {
            session.skip();
        }
        Action::Enter => {
            // Primary button: "I know this" while presenting, "Continue" once revealed
            if session.cursor().revealed {
                session.continue_after_reveal();
            } else {
                session.know_it(now);
            }
        }
        Action::Back => {
            let stats = session.stats();
            // Session (and any pending timer) is dropped here
            return Transition::Effect(Effect::FinishSession(stats));
        }
        Action::Quit => return Transition::Quit,
        _ => {}
    }
    Transition::Screen(Screen::Learn(session))
}

// ============================================================================
// TESTS
// ============================================================================
