use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::App;
use crate::tui::WindowEvent;

const SCROLL_STEP: u16 = 3;

pub fn handle_event(app: &mut App, event: WindowEvent) {
    match event {
        WindowEvent::Key(key) => handle_key(app, key),
        WindowEvent::Mouse(mouse) => handle_mouse(app, mouse),
        WindowEvent::Paste(text) if app.open => app.insert_str(&text),
        WindowEvent::Paste(_) => {}
        WindowEvent::Resize => {
            if app.follow_latest {
                app.scroll_to_bottom();
            }
        }
        WindowEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Esc plays the trigger button
    if key.code == KeyCode::Esc {
        app.toggle_open();
        return;
    }

    if !app.open {
        match key.code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Enter => app.toggle_open(),
            _ => {}
        }
        return;
    }

    let suggestions_active =
        app.conversation.suggestions_visible() && app.conversation.input().is_empty();

    match key.code {
        KeyCode::Enter => {
            if !(suggestions_active && app.choose_highlighted_suggestion()) {
                app.submit();
            }
        }
        KeyCode::Tab | KeyCode::Down if suggestions_active => app.suggestion_next(),
        KeyCode::BackTab | KeyCode::Up if suggestions_active => app.suggestion_prev(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(app.chat_height.max(1)),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(1)),
        KeyCode::Backspace => app.delete_before_cursor(),
        KeyCode::Delete => app.delete_at_cursor(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if !app.open {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(SCROLL_STEP),
        MouseEventKind::ScrollDown => app.scroll_down(SCROLL_STEP),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_config;

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, WindowEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = App::new(test_config()).unwrap();
        handle_event(
            &mut app,
            WindowEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn test_esc_toggles_window_and_closed_window_ignores_typing() {
        let mut app = App::new(test_config()).unwrap();
        press(&mut app, KeyCode::Esc);
        assert!(!app.open);

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.conversation.input(), "");

        press(&mut app, KeyCode::Enter);
        assert!(app.open);
    }

    #[test]
    fn test_blank_enter_with_no_suggestions_does_nothing() {
        let mut config = test_config();
        config.suggested_questions.clear();
        let mut app = App::new(config).unwrap();
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);
        assert!(app.conversation.messages().is_empty());
        assert!(app.exchange_task.is_none());
    }

    #[tokio::test]
    async fn test_enter_picks_highlighted_suggestion() {
        let mut app = App::new(test_config()).unwrap();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.conversation.messages()[0].text, "Second question");
        assert!(!app.conversation.suggestions_visible());
        assert!(app.exchange_task.is_some());
    }

    #[tokio::test]
    async fn test_typed_text_is_sent_on_enter() {
        let mut app = App::new(test_config()).unwrap();
        for c in "hi".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.conversation.messages()[0].text, "hi");
        assert!(app.conversation.messages()[1].is_pending());
        // suggestions never come back once the conversation has started
        assert!(!app.conversation.suggestions_visible());
    }

    #[test]
    fn test_paste_inserts_text() {
        let mut app = App::new(test_config()).unwrap();
        handle_event(&mut app, WindowEvent::Paste("pasted\n".to_string()));
        assert_eq!(app.conversation.input(), "pasted");
    }
}
