use anyhow::Result;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

use flowchat_core::{
    Conversation, FlowRequest, FlowResponse, HttpTransport, Transport, TransportError, WidgetConfig,
};

use crate::theme::Theme;

type ExchangeTask = JoinHandle<Result<FlowResponse, TransportError>>;

pub struct App {
    pub should_quit: bool,
    /// Window shown; closed leaves only the trigger button
    pub open: bool,

    pub config: WidgetConfig,
    pub theme: Theme,
    pub conversation: Conversation,
    pub transport: HttpTransport,
    pub exchange_task: Option<ExchangeTask>,

    // Input state
    pub cursor: usize, // cursor position in chars
    pub notice: Option<String>,

    // Message list state
    pub scroll: u16,
    pub follow_latest: bool,
    pub chat_height: u16, // inner height of the message area, set during render
    pub chat_width: u16,  // inner width, for wrap calculations

    pub suggestion_state: ListState,

    // 0-2 for ellipsis animation
    pub animation_frame: u8,
}

impl App {
    pub fn new(config: WidgetConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(&config)?;
        let conversation = Conversation::new(&config);
        let theme = Theme::from_overrides(&config.styles);

        let mut suggestion_state = ListState::default();
        if !config.suggested_questions.is_empty() {
            suggestion_state.select(Some(0));
        }

        Ok(Self {
            should_quit: false,
            open: true,
            config,
            theme,
            conversation,
            transport,
            exchange_task: None,
            cursor: 0,
            notice: None,
            scroll: 0,
            follow_latest: true,
            chat_height: 0,
            chat_width: 0,
            suggestion_state,
            animation_frame: 0,
        })
    }

    pub fn toggle_open(&mut self) {
        self.open = !self.open;
    }

    /// Send the current input, as the send button or Enter does
    pub fn submit(&mut self) {
        // input is disabled while a reply is pending
        if self.conversation.is_sending() {
            return;
        }
        let outcome = self.conversation.begin_send();
        self.dispatch(outcome);
    }

    /// Pick the suggestion with the given 1-based id and send it right away
    pub fn choose_suggestion(&mut self, id: u32) {
        let outcome = self.conversation.choose_suggestion(id);
        self.dispatch(outcome);
    }

    pub fn choose_highlighted_suggestion(&mut self) -> bool {
        if !self.conversation.suggestions_visible() {
            return false;
        }
        let Some(index) = self.suggestion_state.selected() else {
            return false;
        };
        if index >= self.conversation.suggestions().all().len() {
            return false;
        }
        // the dispatcher addresses suggestions by 1-based position
        match u32::try_from(index + 1) {
            Ok(id) => {
                self.choose_suggestion(id);
                true
            }
            Err(_) => false,
        }
    }

    fn dispatch(&mut self, outcome: flowchat_core::error::Result<Option<FlowRequest>>) {
        match outcome {
            Ok(Some(request)) => {
                self.notice = None;
                self.cursor = 0;
                self.spawn_exchange(request);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "send rejected");
                self.notice = Some(e.to_string());
            }
        }
    }

    fn spawn_exchange(&mut self, request: FlowRequest) {
        let transport = self.transport.clone();
        self.exchange_task = Some(tokio::spawn(async move {
            transport.send_message(&request).await
        }));
        self.follow_latest = true;
        self.scroll_to_bottom();
    }

    /// Settle the conversation once the background request has finished
    pub async fn poll_exchange(&mut self) {
        let finished = self
            .exchange_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        if let Some(task) = self.exchange_task.take() {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => Err(TransportError::Aborted(e.to_string())),
            };
            self.conversation.settle(outcome);
            self.follow_latest = true;
            self.scroll_to_bottom();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.conversation.is_sending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Input editing
    pub fn insert_char(&mut self, c: char) {
        if self.conversation.is_sending() {
            return;
        }
        let byte_pos = char_to_byte_index(self.conversation.input(), self.cursor);
        self.conversation.input_mut().insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| !c.is_control()) {
            self.insert_char(c);
        }
    }

    pub fn delete_before_cursor(&mut self) {
        if self.conversation.is_sending() || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte_pos = char_to_byte_index(self.conversation.input(), self.cursor);
        self.conversation.input_mut().remove(byte_pos);
    }

    pub fn delete_at_cursor(&mut self) {
        if self.conversation.is_sending() {
            return;
        }
        if self.cursor < self.input_len() {
            let byte_pos = char_to_byte_index(self.conversation.input(), self.cursor);
            self.conversation.input_mut().remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input_len());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input_len();
    }

    fn input_len(&self) -> usize {
        self.conversation.input().chars().count()
    }

    // Suggestion highlight
    pub fn suggestion_next(&mut self) {
        let len = self.conversation.suggestions().all().len();
        if len == 0 {
            return;
        }
        let i = self.suggestion_state.selected().map_or(0, |i| (i + 1) % len);
        self.suggestion_state.select(Some(i));
    }

    pub fn suggestion_prev(&mut self) {
        let len = self.conversation.suggestions().all().len();
        if len == 0 {
            return;
        }
        let i = self
            .suggestion_state
            .selected()
            .map_or(0, |i| if i == 0 { len - 1 } else { i - 1 });
        self.suggestion_state.select(Some(i));
    }

    // Message list scrolling
    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_latest = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.max_scroll();
        self.scroll = (self.scroll + lines).min(max);
        self.follow_latest = self.scroll >= max;
    }

    /// Keep the newest message in view
    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    fn max_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };
        self.total_chat_lines().saturating_sub(visible_height)
    }

    /// Rendered line count of the message list at the current width
    pub fn total_chat_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total: usize = 0;
        for message in self.conversation.messages() {
            total += 1; // sender label
            if message.text.is_empty() {
                total += 1;
            }
            for line in message.text.lines() {
                let char_count = line.chars().count();
                total += char_count.max(1).div_ceil(wrap_width);
            }
            total += 1; // blank line after message
        }
        u16::try_from(total).unwrap_or(u16::MAX)
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flowchat_core::Suggestion;

    /// Address of a port that was just released, so sends fail with a network error
    fn unreachable_host() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    pub(crate) fn test_config() -> WidgetConfig {
        WidgetConfig {
            host_url: unreachable_host(),
            flow_id: "flow".to_string(),
            suggested_questions: vec![
                Suggestion { id: 1, text: "First question".to_string() },
                Suggestion { id: 2, text: "Second question".to_string() },
            ],
            ..WidgetConfig::default()
        }
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("abc", 10), 3);
    }

    #[test]
    fn test_input_editing_is_utf8_safe() {
        let mut app = App::new(test_config()).unwrap();
        app.insert_str("héy");
        app.cursor_left();
        app.delete_before_cursor();
        assert_eq!(app.conversation.input(), "hy");
        app.cursor_home();
        app.delete_at_cursor();
        assert_eq!(app.conversation.input(), "y");
        app.cursor_end();
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn test_suggestion_highlight_wraps() {
        let mut app = App::new(test_config()).unwrap();
        assert_eq!(app.suggestion_state.selected(), Some(0));
        app.suggestion_prev();
        assert_eq!(app.suggestion_state.selected(), Some(1));
        app.suggestion_next();
        assert_eq!(app.suggestion_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_submit_spawns_exchange_and_blocks_input() {
        let mut app = App::new(test_config()).unwrap();
        app.insert_str("hello");
        app.submit();

        assert!(app.exchange_task.is_some());
        assert!(app.conversation.is_sending());
        assert_eq!(app.conversation.messages().len(), 2);
        assert_eq!(app.cursor, 0);

        app.insert_char('x');
        assert_eq!(app.conversation.input(), "");
    }

    #[tokio::test]
    async fn test_failed_exchange_settles_with_error() {
        let mut app = App::new(test_config()).unwrap();
        app.insert_str("hello");
        app.submit();

        if let Some(task) = app.exchange_task.as_ref() {
            while !task.is_finished() {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }
        }
        app.poll_exchange().await;

        let last = app.conversation.last_message().unwrap();
        assert!(last.is_error);
        assert!(!app.conversation.is_sending());
        assert!(app.exchange_task.is_none());
    }

    #[tokio::test]
    async fn test_highlighted_row_sends_that_row() {
        let mut config = test_config();
        // ids out of step with positions; the highlighted row still decides
        config.suggested_questions = vec![
            Suggestion { id: 2, text: "A".to_string() },
            Suggestion { id: 1, text: "B".to_string() },
        ];
        let mut app = App::new(config).unwrap();

        assert!(app.choose_highlighted_suggestion());
        assert_eq!(app.conversation.messages()[0].text, "A");
    }

    #[tokio::test]
    async fn test_lone_suggestion_can_be_picked() {
        let mut config = test_config();
        config.suggested_questions = vec![Suggestion { id: 7, text: "Only".to_string() }];
        let mut app = App::new(config).unwrap();

        assert!(app.choose_highlighted_suggestion());
        assert_eq!(app.conversation.messages().len(), 2);
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_total_chat_lines_wraps_long_text() {
        let mut app = App::new(test_config()).unwrap();
        app.chat_width = 10;
        app.conversation.set_input("a".repeat(25));
        app.conversation.begin_send().unwrap();
        // outbound: label + 3 wrapped + blank; pending: label + empty + blank
        assert_eq!(app.total_chat_lines(), 8);
    }
}
