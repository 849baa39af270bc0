//! Pure rendering: map App state to ratatui widget trees.
//!
//! Each screen has a dedicated render function. The main `render()`
//! dispatches based on the current Screen variant. Widget-building
//! functions are pure (state in, widgets out); the only effect is
//! Frame::render_widget() which writes to the terminal buffer.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, LineGauge, Paragraph, Wrap};

use crate::review::ReviewSession;

use super::state::{App, Field, LoginForm, Screen};
use super::theme;

// ============================================================================
// DISPATCH
// ============================================================================

/// Render the current screen to the terminal frame.
pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Common layout: title bar at top, content in middle, help at bottom
    let chunks = Layout::vertical([
        Constraint::Length(1), // title
        Constraint::Min(0),    // content
        Constraint::Length(1), // help
    ])
    .split(area);

    frame.render_widget(render_title(&app.screen), chunks[0]);
    frame.render_widget(render_help(&app.screen), chunks[2]);

    let content_area = chunks[1];

    match &app.screen {
        Screen::Loading => render_loading(frame, content_area),
        Screen::Login(form) => render_login(form, frame, content_area),
        Screen::Home => render_home(app, frame, content_area),
        Screen::Learn(session) => render_learn(session, frame, content_area),
    }
}

// ============================================================================
// SHARED LAYOUT
// ============================================================================

fn render_title(screen: &Screen) -> Paragraph<'static> {
    let title_text = match screen {
        Screen::Loading | Screen::Login(_) => "Vocab Retention",
        Screen::Home => "Home",
        Screen::Learn(_) => "Learn",
    };

    Paragraph::new(Line::from(vec![Span::styled(title_text, theme::STYLE_TITLE)]))
}

fn render_help(screen: &Screen) -> Paragraph<'static> {
    let help_text = match screen {
        Screen::Loading => "^C quit",
        Screen::Login(_) => "[Tab] switch field  [Enter] sign in  [^N] create account  [Esc] clear  ^C quit",
        Screen::Home => "[l] learn  [o] log out  [q] quit",
        Screen::Learn(session) => {
            if session.cursor().celebrating {
                ""
            } else if session.cursor().revealed {
                "[Enter/c] continue  [s] skip  [Esc] home"
            } else {
                "[y/Enter] I know this  [n] show definition  [s] skip  [Esc] home"
            }
        }
    };

    Paragraph::new(Span::styled(help_text, theme::STYLE_HELP))
}

// ============================================================================
// SCREEN: LOADING
// ============================================================================

fn render_loading(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("  Checking session...", theme::STYLE_INTERACTIVE)),
    ]);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// SCREEN: LOGIN
// ============================================================================

fn render_login(form: &LoginForm, frame: &mut Frame, area: Rect) {
    let masked = "•".repeat(form.password.chars().count());

    let field = |label: &'static str, value: String, focused: bool| {
        let style = if focused {
            theme::STYLE_FOCUSED
        } else {
            theme::STYLE_IMPORTANT
        };
        Line::from(vec![
            Span::styled(format!("  {:<10}", label), theme::STYLE_DIM),
            Span::styled(format!(" {:<32}", value), style),
        ])
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Vocab Retention", theme::STYLE_ACCENT)),
        Line::from(Span::styled("  ═══════════════", theme::STYLE_DIM)),
        Line::from(""),
        field("Email", form.email.clone(), form.focus == Field::Email),
        Line::from(""),
        field("Password", masked, form.focus == Field::Password),
        Line::from(""),
    ];

    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            theme::STYLE_DANGER,
        )));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::styled("  [Enter] ", theme::STYLE_INTERACTIVE),
        Span::raw("Sign In    "),
        Span::styled("[^N] ", theme::STYLE_INTERACTIVE),
        Span::raw("Create Account"),
    ]));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

// ============================================================================
// SCREEN: HOME
// ============================================================================

fn render_home(app: &App, frame: &mut Frame, area: Rect) {
    let (name, email) = match &app.user {
        Some(u) => (u.display_name().to_string(), u.email.clone()),
        None => ("there".to_string(), "Unknown".to_string()),
    };
    let stats = app.last_stats.unwrap_or_default();

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  Welcome back, {}!", name), theme::STYLE_ACCENT)),
        Line::from(vec![
            Span::styled("  Logged in as: ", theme::STYLE_DIM),
            Span::styled(email, theme::STYLE_IMPORTANT),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Last session", theme::STYLE_TITLE)),
        Line::from(Span::styled("  ────────────", theme::STYLE_DIM)),
        stat_line("Words learned", format!("{} / {}", stats.learned, stats.deck_size)),
        stat_line("In progress", stats.learning.to_string()),
        stat_line("Total correct", stats.total_correct.to_string()),
        stat_line(
            "Best streak",
            format!("{} (current {})", stats.best_streak, stats.current_streak),
        ),
        Line::from(""),
    ];

    if let Some(notice) = &app.notice {
        lines.push(Line::from(Span::styled(format!("  {}", notice), theme::STYLE_DANGER)));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::styled("  [l] ", theme::STYLE_INTERACTIVE),
        Span::raw("Start learning    "),
        Span::styled("[o] ", theme::STYLE_INTERACTIVE),
        Span::raw("Log out"),
    ]));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("    {:<15}", label), theme::STYLE_DIM),
        Span::styled(value, theme::STYLE_IMPORTANT),
    ])
}

// ============================================================================
// SCREEN: LEARN
// ============================================================================

fn render_learn(session: &ReviewSession, frame: &mut Frame, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // position label
        Constraint::Length(1), // deck gauge
        Constraint::Length(1), // spacer
        Constraint::Min(0),    // card
    ])
    .split(area);

    let cursor = session.cursor();
    let deck_len = session.deck().len();
    let position = cursor.current_index + 1;

    frame.render_widget(
        Paragraph::new(Span::styled(format!("{}/{}", position, deck_len), theme::STYLE_ACCENT)),
        chunks[0],
    );
    frame.render_widget(
        Gauge::default()
            .gauge_style(theme::STYLE_PROGRESS)
            .ratio(position as f64 / deck_len as f64)
            .label(""),
        chunks[1],
    );

    if cursor.celebrating {
        render_celebration(frame, chunks[3]);
    } else {
        render_card(session, frame, chunks[3]);
    }
}

fn render_celebration(frame: &mut Frame, area: Rect) {
    let banner = Paragraph::new(vec![
        Line::from(""),
        Line::from("✓"),
        Line::from("Word Learned!"),
        Line::from("Great job!"),
    ])
    .alignment(Alignment::Center)
    .style(theme::STYLE_BANNER)
    .block(Block::default().borders(Borders::ALL).border_style(theme::STYLE_SAFE));
    frame.render_widget(banner, area);
}

fn render_card(session: &ReviewSession, frame: &mut Frame, area: Rect) {
    let card = session.current_card();
    let cursor = session.cursor();
    let correct = session.current_correct_count();
    let threshold = session.config().learned_threshold;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::STYLE_DIM);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // badges
        Constraint::Length(1), // spacer
        Constraint::Length(1), // word
        Constraint::Length(1), // card progress gauge
        Constraint::Length(1), // card progress label
        Constraint::Min(0),    // definition / actions
    ])
    .split(inner);

    let badges = Line::from(vec![
        Span::styled(
            format!(" {} ", card.difficulty),
            theme::difficulty_style(card.difficulty),
        ),
        Span::raw("  "),
        Span::styled(format!(" {} ", card.category), theme::STYLE_ACCENT),
    ]);
    frame.render_widget(Paragraph::new(badges), chunks[0]);

    frame.render_widget(
        Paragraph::new(Span::styled(card.word.clone(), theme::STYLE_WORD))
            .alignment(Alignment::Center),
        chunks[2],
    );

    if correct > 0 {
        frame.render_widget(
            LineGauge::default()
                .filled_style(theme::STYLE_CARD_PROGRESS)
                .unfilled_style(theme::STYLE_DIM)
                .ratio(session.current_fraction())
                .label(""),
            chunks[3],
        );
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("{} / {} correct", correct, threshold),
                theme::STYLE_DIM,
            ))
            .alignment(Alignment::Center),
            chunks[4],
        );
    }

    let mut lines = Vec::new();
    if cursor.revealed {
        lines.push(Line::from(Span::styled("Definition", theme::STYLE_ACCENT)));
        lines.push(Line::from(card.definition.clone()));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Example", theme::STYLE_WARNING)));
        lines.push(Line::from(Span::styled(
            format!("\"{}\"", card.example),
            theme::STYLE_EXAMPLE,
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("[Enter] ", theme::STYLE_INTERACTIVE),
            Span::styled("Continue ›", theme::STYLE_ACCENT),
        ]));
    } else {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("[y] ", theme::STYLE_INTERACTIVE),
            Span::styled("✓ I Know This Word", theme::STYLE_SAFE),
        ]));
        lines.push(Line::from(vec![
            Span::styled("[n] ", theme::STYLE_INTERACTIVE),
            Span::raw("? Show Definition"),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[s] ", theme::STYLE_INTERACTIVE),
        Span::styled("Skip to next word", theme::STYLE_DIM),
    ]));

    let body = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(body, chunks[5]);
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Deck;
    use crate::stats::SessionStats;
    use crate::types::{ReviewConfig, User};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::time::Instant;

    fn make_terminal() -> Terminal<TestBackend> {
        let backend = TestBackend::new(90, 30);
        Terminal::new(backend).unwrap()
    }

    fn rendered(app: &App) -> String {
        let mut terminal = make_terminal();
        terminal
            .draw(|frame| render(app, frame))
            .expect("render should not panic");
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol().to_string())
            .collect()
    }

    fn app() -> App {
        App::new(Deck::builtin(), ReviewConfig::default())
    }

    fn learn_app() -> (App, ReviewSession) {
        let app = app();
        let session = ReviewSession::new(app.deck.clone(), app.review);
        (app, session)
    }

    #[test]
    fn loading_screen_renders() {
        assert!(rendered(&app()).contains("Checking session"));
    }

    #[test]
    fn login_masks_password_and_shows_error() {
        let mut app = app();
        app.screen = Screen::Login(LoginForm {
            email: "ada@example.com".into(),
            password: "hunter22".into(),
            focus: Field::Password,
            error: Some("Invalid email or password.".into()),
        });
        let content = rendered(&app);
        assert!(content.contains("ada@example.com"));
        assert!(!content.contains("hunter22"));
        assert!(content.contains("Invalid email or password."));
    }

    #[test]
    fn home_shows_display_name_and_stats() {
        let mut app = app();
        app.user = Some(User {
            uid: "u1".into(),
            email: "ada@example.com".into(),
        });
        app.screen = Screen::Home;
        app.last_stats = Some(SessionStats {
            deck_size: 5,
            learned: 2,
            ..SessionStats::default()
        });
        let content = rendered(&app);
        assert!(content.contains("Welcome back, ada!"));
        assert!(content.contains("2 / 5"));
    }

    #[test]
    fn home_shows_identity_notice() {
        let mut app = app();
        app.screen = Screen::Home;
        app.notice = Some("Account storage failed: disk full".into());
        let content = rendered(&app);
        assert!(content.contains("Account storage failed: disk full"));
    }

    #[test]
    fn learn_hides_definition_until_revealed() {
        let (mut app, mut session) = learn_app();
        app.screen = Screen::Learn(ReviewSession::new(app.deck.clone(), app.review));
        let content = rendered(&app);
        assert!(content.contains("Catalyst"));
        assert!(content.contains("1/5"));
        assert!(!content.contains("speeds up a process"));

        session.dont_know_it();
        app.screen = Screen::Learn(session);
        let content = rendered(&app);
        assert!(content.contains("speeds up a process"));
        assert!(content.contains("Continue"));
    }

    #[test]
    fn learn_shows_per_card_progress_after_first_correct() {
        let (mut app, mut session) = learn_app();
        // Single lap so catalyst comes back around with one correct answer
        session.know_it(Instant::now());
        for _ in 1..app.deck.len() {
            session.skip();
        }
        app.screen = Screen::Learn(session);
        assert!(rendered(&app).contains("1 / 3 correct"));
    }

    #[test]
    fn celebration_banner_replaces_card() {
        let (mut app, _) = learn_app();
        let review = ReviewConfig {
            learned_threshold: 1,
            ..ReviewConfig::default()
        };
        let mut session = ReviewSession::new(app.deck.clone(), review);
        session.know_it(Instant::now());
        app.screen = Screen::Learn(session);

        let content = rendered(&app);
        assert!(content.contains("Word Learned!"));
        assert!(!content.contains("Show Definition"));
    }
}
