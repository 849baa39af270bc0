//! TUI effects boundary: event loop, terminal lifecycle, key mapping.
//!
//! This is the only TUI module with side effects. It wires the pure
//! layers (state, update, view) to the real terminal via crossterm and
//! ratatui, and to the identity provider.
//!
//! Architecture: two producers feed a single mpsc channel.
//! - Key reader thread: forwards crossterm key events
//! - Identity subscription: forwards auth-state changes
//!
//! The loop blocks on the channel, but never past the pending
//! celebration deadline; on timeout it ticks the review session.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::deck::Deck;
use crate::identity::{AuthError, IdentityProvider};
use crate::stats::SessionStats;
use crate::types::ReviewConfig;

use super::state::{Action, App, AppEvent, Effect, KeyMode, LoginForm, Screen, Transition};
use super::update::{handle_auth_changed, handle_tick, update};
use super::view::render;

// ============================================================================
// KEY MAPPING
// ============================================================================

/// Map a crossterm key event to a semantic Action.
///
/// In text mode printable keys are typed; in command mode they are
/// shortcuts. Returns None for keys that don't map to any action.
pub fn map_key(key: KeyEvent, mode: KeyMode) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Ctrl+C always quits
    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Enter => return Some(Action::Enter),
        KeyCode::Esc => return Some(Action::Back),
        _ => {}
    }

    match mode {
        KeyMode::Text => match key.code {
            KeyCode::Char('n') if ctrl => Some(Action::CreateAccount),
            KeyCode::Char(c) if !ctrl => Some(Action::Input(c)),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                Some(Action::NextField)
            }
            _ => None,
        },
        KeyMode::Command => match key.code {
            // Review
            KeyCode::Char('y') | KeyCode::Char('k') => Some(Action::KnowIt),
            KeyCode::Char('n') | KeyCode::Char('d') | KeyCode::Char('?') => {
                Some(Action::ShowDefinition)
            }
            KeyCode::Char('c') => Some(Action::Continue),
            KeyCode::Char('s') | KeyCode::Right => Some(Action::Skip),

            // Navigation
            KeyCode::Char('l') => Some(Action::Learn),
            KeyCode::Char('o') => Some(Action::SignOut),
            KeyCode::Char('q') => Some(Action::Quit),

            _ => None,
        },
    }
}

// ============================================================================
// TERMINAL LIFECYCLE
// ============================================================================

/// Set up the terminal for TUI mode.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Install a panic hook that restores the terminal before printing the panic.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Best-effort terminal restoration
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

// ============================================================================
// PRODUCERS
// ============================================================================

/// Spawn a thread that reads crossterm events and forwards key presses.
fn spawn_key_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        loop {
            match event::read() {
                // Windows reports releases too
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    if tx.send(AppEvent::Key(key)).is_err() {
                        break; // receiver dropped, TUI is shutting down
                    }
                }
                Ok(_) => {} // ignore mouse, resize, etc.
                Err(_) => break,
            }
        }
    });
}

// ============================================================================
// EVENT LOOP
// ============================================================================

/// Run the TUI until the user quits.
///
/// Subscribes to `provider` for routing; the first callback moves the
/// app out of Loading. The subscription is removed before returning.
/// Returns the summary of the last learn session, if there was one.
pub fn run<P: IdentityProvider>(
    deck: Deck,
    review: ReviewConfig,
    provider: &mut P,
) -> io::Result<Option<SessionStats>> {
    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let mut app = App::new(deck, review);

    let (tx, rx) = mpsc::channel::<AppEvent>();

    spawn_key_reader(tx.clone());
    let auth_tx = tx;
    let subscription = provider.subscribe(Box::new(move |user| {
        // Best-effort: if the receiver is gone the loop has exited
        let _ = auth_tx.send(AppEvent::AuthChanged(user.cloned()));
    }));

    let result = event_loop(&mut terminal, &mut app, &rx, provider);

    provider.unsubscribe(subscription);
    let summary = match &app.screen {
        Screen::Learn(session) => Some(session.stats()),
        _ => app.last_stats,
    };
    // Drop the screen (and any live review session) before the terminal
    app.screen = Screen::Loading;
    restore_terminal()?;
    result.map(|()| summary)
}

fn event_loop<P: IdentityProvider>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    rx: &mpsc::Receiver<AppEvent>,
    provider: &mut P,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        let deadline = match &app.screen {
            Screen::Learn(session) => session.pending_deadline(),
            _ => None,
        };

        let event = match deadline {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                match rx.recv_timeout(wait) {
                    Ok(e) => e,
                    Err(RecvTimeoutError::Timeout) => {
                        handle_tick(app, Instant::now());
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => return Ok(()),
                }
            }
            None => match rx.recv() {
                Ok(e) => e,
                Err(_) => return Ok(()), // all senders dropped
            },
        };

        match event {
            AppEvent::Key(key) => {
                let Some(action) = map_key(key, app.screen.key_mode()) else {
                    continue;
                };
                let now = Instant::now();
                // A late tick must land before the key that follows it
                handle_tick(app, now);

                let screen = std::mem::take(&mut app.screen);
                let transition = update(screen, &action, &app.context(now));

                match transition {
                    Transition::Screen(new_screen) => app.screen = new_screen,
                    Transition::Quit => app.should_quit = true,
                    Transition::Effect(effect) => handle_effect(effect, app, provider),
                }
            }
            AppEvent::AuthChanged(user) => handle_auth_changed(app, user),
        }
    }
}

// ============================================================================
// EFFECT HANDLING
// ============================================================================

/// Handle a side effect requested by a pure transition.
///
/// Auth successes do not route here: the provider notifies the
/// subscription, and `handle_auth_changed` moves the screen.
fn handle_effect<P: IdentityProvider>(effect: Effect, app: &mut App, provider: &mut P) {
    app.notice = None;
    match effect {
        Effect::SignIn(form) => {
            let result = provider.sign_in(&form.email, &form.password);
            app.screen = Screen::Login(after_auth_attempt(form, result.err()));
        }
        Effect::SignUp(form) => {
            let result = provider.sign_up(&form.email, &form.password);
            app.screen = Screen::Login(after_auth_attempt(form, result.err()));
        }
        Effect::SignOut => {
            app.screen = Screen::Home;
            if let Err(e) = provider.sign_out() {
                tracing::error!(error = %e, "sign-out failed");
                app.notice = Some(e.to_string());
            }
        }
        Effect::FinishSession(stats) => {
            tracing::info!(
                learned = stats.learned,
                total_correct = stats.total_correct,
                "learn session closed"
            );
            app.last_stats = Some(stats);
            app.screen = Screen::Home;
        }
    }
}

/// Form to show after a sign-in/up attempt: error text on failure,
/// password cleared either way.
fn after_auth_attempt(form: LoginForm, error: Option<AuthError>) -> LoginForm {
    LoginForm {
        password: String::new(),
        error: error.map(|e| e.to_string()),
        ..form
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::LocalIdentityProvider;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn ctrl_c_maps_to_quit_in_both_modes() {
        let k = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(k, KeyMode::Command), Some(Action::Quit));
        assert_eq!(map_key(k, KeyMode::Text), Some(Action::Quit));
    }

    #[test]
    fn letters_are_typed_in_text_mode() {
        assert_eq!(map_key(key(KeyCode::Char('q')), KeyMode::Text), Some(Action::Input('q')));
        assert_eq!(map_key(key(KeyCode::Char('@')), KeyMode::Text), Some(Action::Input('@')));
    }

    #[test]
    fn ctrl_n_creates_account() {
        let k = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL);
        assert_eq!(map_key(k, KeyMode::Text), Some(Action::CreateAccount));
    }

    #[test]
    fn review_keys_in_command_mode() {
        assert_eq!(map_key(key(KeyCode::Char('y')), KeyMode::Command), Some(Action::KnowIt));
        assert_eq!(
            map_key(key(KeyCode::Char('n')), KeyMode::Command),
            Some(Action::ShowDefinition)
        );
        assert_eq!(map_key(key(KeyCode::Char('s')), KeyMode::Command), Some(Action::Skip));
        assert_eq!(map_key(key(KeyCode::Right), KeyMode::Command), Some(Action::Skip));
        assert_eq!(map_key(key(KeyCode::Char('c')), KeyMode::Command), Some(Action::Continue));
    }

    #[test]
    fn enter_and_esc_are_mode_independent() {
        for mode in [KeyMode::Text, KeyMode::Command] {
            assert_eq!(map_key(key(KeyCode::Enter), mode), Some(Action::Enter));
            assert_eq!(map_key(key(KeyCode::Esc), mode), Some(Action::Back));
        }
    }

    #[test]
    fn tab_switches_field() {
        assert_eq!(map_key(key(KeyCode::Tab), KeyMode::Text), Some(Action::NextField));
    }

    #[test]
    fn unmapped_key_returns_none() {
        assert_eq!(map_key(key(KeyCode::Char('z')), KeyMode::Command), None);
        assert_eq!(map_key(key(KeyCode::F(5)), KeyMode::Text), None);
    }

    #[test]
    fn failed_sign_in_keeps_email_and_shows_error() {
        let mut provider = LocalIdentityProvider::in_memory();
        let mut app = App::new(Deck::builtin(), ReviewConfig::default());
        let form = LoginForm {
            email: "ada@example.com".into(),
            password: "nope-nope".into(),
            ..LoginForm::default()
        };

        handle_effect(Effect::SignIn(form), &mut app, &mut provider);

        match &app.screen {
            Screen::Login(form) => {
                assert_eq!(form.email, "ada@example.com");
                assert!(form.password.is_empty());
                assert_eq!(
                    form.error.as_deref(),
                    Some(AuthError::InvalidCredential.to_string().as_str())
                );
            }
            other => panic!("Expected Login, got {other:?}"),
        }
    }

    #[test]
    fn successful_sign_up_clears_error() {
        let mut provider = LocalIdentityProvider::in_memory();
        let mut app = App::new(Deck::builtin(), ReviewConfig::default());
        let form = LoginForm {
            email: "ada@example.com".into(),
            password: "lovelace".into(),
            error: Some("stale".into()),
            ..LoginForm::default()
        };

        handle_effect(Effect::SignUp(form), &mut app, &mut provider);

        assert!(provider.current_user().is_some());
        match &app.screen {
            Screen::Login(form) => assert!(form.error.is_none()),
            other => panic!("Expected Login, got {other:?}"),
        }
    }

    #[test]
    fn failed_sign_out_stays_home_with_notice() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join("store");
        let mut provider = LocalIdentityProvider::open(&dir.join("accounts.json")).unwrap();
        provider.sign_up("ada@example.com", "lovelace").unwrap();
        std::fs::remove_dir_all(&dir).unwrap();
        std::fs::write(&dir, "not a directory").unwrap();

        let mut app = App::new(Deck::builtin(), ReviewConfig::default());
        handle_effect(Effect::SignOut, &mut app, &mut provider);

        assert_eq!(app.screen, Screen::Home);
        assert!(provider.current_user().is_some());
        let notice = app.notice.as_deref().unwrap_or_default();
        assert!(notice.starts_with("Account storage failed"), "notice: {notice}");
    }

    #[test]
    fn finish_session_returns_home_with_stats() {
        let mut provider = LocalIdentityProvider::in_memory();
        let mut app = App::new(Deck::builtin(), ReviewConfig::default());
        let stats = SessionStats {
            learned: 1,
            deck_size: 5,
            ..SessionStats::default()
        };

        handle_effect(Effect::FinishSession(stats), &mut app, &mut provider);

        assert_eq!(app.screen, Screen::Home);
        assert_eq!(app.last_stats, Some(stats));
    }
}
