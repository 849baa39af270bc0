//! TUI state algebra: pure types, zero effects.
//!
//! These types define the whole TUI state space. The transition function
//! (`update`) and the rendering layer (`view`) both program against them.
//!
//! Design principle: Screen variants carry per-screen state (the login
//! form, the live review session). Data that outlives a screen (the
//! signed-in user, the deck, the last session summary) lives in App.

use std::time::Instant;

use crossterm::event::KeyEvent;

use crate::deck::Deck;
use crate::review::ReviewSession;
use crate::stats::SessionStats;
use crate::types::{ReviewConfig, User};

// ============================================================================
// APP EVENTS
// ============================================================================

/// Everything the event loop can receive from its channel.
///
/// Two producers feed a single mpsc channel:
/// - A key reader thread sends `Key` variants
/// - The identity provider's subscription sends `AuthChanged`
///
/// Celebration timeouts are not events: the loop waits with a timeout
/// derived from the session's pending deadline and ticks on expiry.
#[derive(Debug)]
pub enum AppEvent {
    /// A terminal key event from the crossterm reader thread.
    Key(KeyEvent),
    /// Signed-in user changed (or was reported for the first time).
    AuthChanged(Option<User>),
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

/// Top-level TUI model.
#[derive(Debug)]
pub struct App {
    pub screen: Screen,

    /// Current user, as last reported by the identity provider.
    pub user: Option<User>,

    pub deck: Deck,
    pub review: ReviewConfig,

    /// Summary of the most recent learn session, shown on Home.
    /// Cleared on sign-out.
    pub last_stats: Option<SessionStats>,

    /// Identity failure outside the login form (e.g. sign-out), shown
    /// on Home until the next auth change or effect.
    pub notice: Option<String>,

    /// Set to true when the app should exit on the next tick.
    pub should_quit: bool,
}

// ============================================================================
// SCREENS
// ============================================================================

/// The current TUI screen.
#[derive(Debug, Default, PartialEq)]
pub enum Screen {
    /// Waiting for the first auth callback.
    #[default]
    Loading,

    /// Email/password form.
    Login(LoginForm),

    /// Dashboard for the signed-in user.
    Home,

    /// Flashcard review. Dropping this screen drops the session and any
    /// pending celebration with it.
    Learn(ReviewSession),
}

/// Which login field receives typed characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Field {
    #[default]
    Email,
    Password,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: Field,
    /// Last auth failure, shown under the form.
    pub error: Option<String>,
}

/// How raw keys should be interpreted on a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// Printable keys are commands.
    Command,
    /// Printable keys are typed into a field.
    Text,
}

impl Screen {
    pub fn key_mode(&self) -> KeyMode {
        match self {
            Screen::Login(_) => KeyMode::Text,
            _ => KeyMode::Command,
        }
    }
}

// ============================================================================
// ACTIONS
// ============================================================================

/// Semantic user action, decoupled from raw key events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Typed character (text mode).
    Input(char),
    Backspace,
    /// Switch login field.
    NextField,
    /// Contextual confirm: sign in, start learning, know it / continue.
    Enter,
    /// Create an account from the login form.
    CreateAccount,
    /// Open the learn screen.
    Learn,
    SignOut,
    /// "I know this word".
    KnowIt,
    /// "Show definition".
    ShowDefinition,
    /// Continue after a revealed card.
    Continue,
    /// Skip to the next word.
    Skip,
    /// Leave the current screen / dismiss an error.
    Back,
    /// Quit the application.
    Quit,
}

// ============================================================================
// TRANSITIONS
// ============================================================================

/// Result of a pure state transition.
///
/// Follows the Elm/TEA pattern: pure code describes WHAT should happen,
/// the effects boundary decides HOW.
#[derive(Debug, PartialEq)]
pub enum Transition {
    /// Render this screen (may be the same or a different screen).
    Screen(Screen),
    /// Quit the application.
    Quit,
    /// Execute a side effect.
    Effect(Effect),
}

/// Side effect requested by a pure transition.
#[derive(Debug, PartialEq)]
pub enum Effect {
    /// Sign in with the form's credentials. The form comes back on failure.
    SignIn(LoginForm),
    /// Create an account with the form's credentials.
    SignUp(LoginForm),
    SignOut,
    /// The learn screen closed; keep its summary for the dashboard.
    FinishSession(SessionStats),
}

/// Read-only inputs to `update` besides the screen itself.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub deck: &'a Deck,
    pub review: ReviewConfig,
    pub now: Instant,
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

impl App {
    /// Create an App waiting for its first auth callback.
    pub fn new(deck: Deck, review: ReviewConfig) -> Self {
        App {
            screen: Screen::Loading,
            user: None,
            deck,
            review,
            last_stats: None,
            notice: None,
            should_quit: false,
        }
    }

    pub fn context(&self, now: Instant) -> Context<'_> {
        Context {
            deck: &self.deck,
            review: self.review,
            now,
        }
    }
}

impl Screen {
    /// Empty login form with focus on email.
    pub fn login() -> Self {
        Screen::Login(LoginForm::default())
    }

    /// Fresh review session over `deck`.
    pub fn learn(deck: &Deck, review: ReviewConfig) -> Self {
        Screen::Learn(ReviewSession::new(deck.clone(), review))
    }
}

impl LoginForm {
    /// The field that has focus.
    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
