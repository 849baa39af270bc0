//! TUI color semantics and style constants.
//!
//! Pure data, consumed by the rendering layer.
//!
//! Color semantics:
//! - Green: "know it", learned, success banner
//! - Orange: accent (deck position, continue)
//! - Yellow/Red: difficulty tiers, errors
//! - Cyan: keybinding hints
//! - Dim: de-emphasized text

use ratatui::style::{Color, Modifier, Style};

use crate::types::Difficulty;

// ============================================================================
// PALETTE
// ============================================================================

const ORANGE: Color = Color::Rgb(249, 115, 22);

// ============================================================================
// SEMANTIC STYLES
// ============================================================================

/// Success / learned: green.
pub const STYLE_SAFE: Style = Style::new().fg(Color::Green);

/// Warning / attention: yellow.
pub const STYLE_WARNING: Style = Style::new().fg(Color::Yellow);

/// Errors: red.
pub const STYLE_DANGER: Style = Style::new().fg(Color::Red);

/// Keybinding hint: cyan.
pub const STYLE_INTERACTIVE: Style = Style::new().fg(Color::Cyan);

/// De-emphasized text: dark gray.
pub const STYLE_DIM: Style = Style::new().fg(Color::DarkGray);

/// Important text: bold.
pub const STYLE_IMPORTANT: Style = Style::new().add_modifier(Modifier::BOLD);

/// Accent color for progress and headings.
pub const STYLE_ACCENT: Style = Style::new().fg(ORANGE).add_modifier(Modifier::BOLD);

// ============================================================================
// UI ELEMENT STYLES
// ============================================================================

/// Title bar / header.
pub const STYLE_TITLE: Style = Style::new().fg(Color::White).add_modifier(Modifier::BOLD);

/// The vocabulary word itself.
pub const STYLE_WORD: Style = Style::new()
    .fg(Color::White)
    .add_modifier(Modifier::BOLD.union(Modifier::UNDERLINED));

/// Example sentence.
pub const STYLE_EXAMPLE: Style = Style::new().fg(Color::Gray).add_modifier(Modifier::ITALIC);

/// Focused input field.
pub const STYLE_FOCUSED: Style = Style::new().fg(Color::Black).bg(Color::Cyan);

/// Deck position gauge.
pub const STYLE_PROGRESS: Style = Style::new().fg(ORANGE);

/// Per-card correct-count gauge.
pub const STYLE_CARD_PROGRESS: Style = Style::new().fg(Color::Green);

/// Celebration banner.
pub const STYLE_BANNER: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Green)
    .add_modifier(Modifier::BOLD);

/// Footer / help line.
pub const STYLE_HELP: Style = Style::new().fg(Color::DarkGray);

/// Badge style for a difficulty tier.
pub fn difficulty_style(difficulty: Difficulty) -> Style {
    match difficulty {
        Difficulty::Beginner => STYLE_SAFE,
        Difficulty::Intermediate => STYLE_WARNING,
        Difficulty::Advanced => STYLE_DANGER,
    }
}

// ============================================================================
// TESTS
// ============================================================================
