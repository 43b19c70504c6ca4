//! Element styles for the chat window.
//!
//! Overrides come from config as space-separated tokens: `fg=<color>`,
//! `bg=<color>` and modifiers (`bold`, `italic`, `dim`, `underlined`,
//! `reversed`). Colors use ratatui's names, indexes or `#rrggbb`.

use flowchat_core::StyleOverrides;
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub bot_message: Style,
    pub user_message: Style,
    pub error_message: Style,
    pub send_icon: Style,
    pub send_button: Style,
    pub input: Style,
    pub input_container: Style,
    pub chat_window: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bot_message: Style::default().fg(Color::Yellow),
            user_message: Style::default().fg(Color::Cyan),
            error_message: Style::default().fg(Color::Red),
            send_icon: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            send_button: Style::default().bg(Color::DarkGray),
            input: Style::default().fg(Color::Cyan),
            input_container: Style::default().fg(Color::Yellow),
            chat_window: Style::default().fg(Color::Cyan),
        }
    }
}

impl Theme {
    pub fn from_overrides(overrides: &StyleOverrides) -> Self {
        let base = Self::default();
        let apply = |style: Style, spec: &Option<String>| match spec {
            Some(spec) => style.patch(parse_style(spec)),
            None => style,
        };

        Self {
            bot_message: apply(base.bot_message, &overrides.bot_message),
            user_message: apply(base.user_message, &overrides.user_message),
            error_message: apply(base.error_message, &overrides.error_message),
            send_icon: apply(base.send_icon, &overrides.send_icon),
            send_button: apply(base.send_button, &overrides.send_button),
            input: apply(base.input, &overrides.input),
            input_container: apply(base.input_container, &overrides.input_container),
            chat_window: apply(base.chat_window, &overrides.chat_window),
        }
    }
}

pub fn parse_style(spec: &str) -> Style {
    let mut style = Style::default();

    for token in spec.split_whitespace() {
        let token = token.to_lowercase();
        if let Some(color) = token.strip_prefix("fg=") {
            match color.parse::<Color>() {
                Ok(color) => style = style.fg(color),
                Err(_) => tracing::warn!(%color, "unknown foreground color"),
            }
        } else if let Some(color) = token.strip_prefix("bg=") {
            match color.parse::<Color>() {
                Ok(color) => style = style.bg(color),
                Err(_) => tracing::warn!(%color, "unknown background color"),
            }
        } else {
            match parse_modifier(&token) {
                Some(modifier) => style = style.add_modifier(modifier),
                None => tracing::warn!(%token, "unknown style token"),
            }
        }
    }

    style
}

fn parse_modifier(token: &str) -> Option<Modifier> {
    let modifier = match token {
        "bold" => Modifier::BOLD,
        "dim" => Modifier::DIM,
        "italic" => Modifier::ITALIC,
        "underlined" | "underline" => Modifier::UNDERLINED,
        "reversed" => Modifier::REVERSED,
        "crossed" => Modifier::CROSSED_OUT,
        _ => return None,
    };
    Some(modifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colors_and_modifiers() {
        let style = parse_style("fg=white bg=blue bold italic");
        assert_eq!(style.fg, Some(Color::White));
        assert_eq!(style.bg, Some(Color::Blue));
        assert!(style.add_modifier.contains(Modifier::BOLD | Modifier::ITALIC));
    }

    #[test]
    fn test_unknown_tokens_ignored() {
        let style = parse_style("fg=notacolor sparkle");
        assert_eq!(style, Style::default());
    }

    #[test]
    fn test_overrides_patch_defaults() {
        let overrides = StyleOverrides {
            error_message: Some("bg=black underlined".to_string()),
            ..StyleOverrides::default()
        };
        let theme = Theme::from_overrides(&overrides);
        assert_eq!(theme.error_message.fg, Some(Color::Red));
        assert_eq!(theme.error_message.bg, Some(Color::Black));
        assert_eq!(theme.bot_message, Theme::default().bot_message);
    }
}
