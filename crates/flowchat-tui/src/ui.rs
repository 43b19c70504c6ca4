use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use flowchat_core::{Direction, Message};

use crate::app::App;
use crate::layout;

const MAX_SUGGESTION_ROWS: u16 = 5;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    if app.open {
        render_window(app, frame, area);
    } else {
        render_trigger(app, frame, area);
    }
}

/// Closed state: a small button in the anchor corner
fn render_trigger(app: &App, frame: &mut Frame, area: Rect) {
    let label = format!(" {} (Enter) ", app.config.window_title);
    let width = u16::try_from(label.chars().count() + 2).unwrap_or(u16::MAX);
    let button = layout::anchored(area, app.config.position, width, 3);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.chat_window);
    frame.render_widget(Paragraph::new(label).bold().block(block), button);
}

fn render_window(app: &mut App, frame: &mut Frame, area: Rect) {
    let (width, height) = layout::window_size(app.config.width, app.config.height, area);
    let window = layout::anchored(area, app.config.position, width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.chat_window)
        .title(Span::styled(
            format!(" {} ", app.config.window_title),
            app.theme.chat_window.add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(window);
    frame.render_widget(Clear, window);
    frame.render_widget(block, window);

    let suggestions_height = if app.conversation.suggestions_visible() {
        let rows = u16::try_from(app.conversation.suggestions().all().len()).unwrap_or(u16::MAX);
        rows.min(MAX_SUGGESTION_ROWS) + 2 // +2 for borders
    } else {
        0
    };

    let [header_area, chat_area, suggestions_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(suggestions_height),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(inner);

    render_header(app, frame, header_area);
    render_messages(app, frame, chat_area);
    if suggestions_height > 0 {
        render_suggestions(app, frame, suggestions_area);
    }
    render_input(app, frame, input_area);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("Powered by ", Style::default().fg(Color::DarkGray)),
        Span::styled("flowchat", Style::default().fg(Color::DarkGray).bold()),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(footer, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let dot_color = if app.config.online { Color::Green } else { Color::DarkGray };
    let mut spans = vec![
        Span::styled(" ● ", Style::default().fg(dot_color)),
        Span::styled(app.config.status_message(), Style::default().fg(Color::Gray)),
    ];
    if let Some(notice) = &app.notice {
        spans.push(Span::styled(format!("  {notice}"), Style::default().fg(Color::Red)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_messages(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store dimensions for scroll calculations
    app.chat_height = area.height;
    app.chat_width = area.width;
    if app.follow_latest {
        app.scroll_to_bottom();
    }

    let messages = app.conversation.messages();
    let text = if messages.is_empty() && !app.conversation.suggestions_visible() {
        Text::from(Span::styled(
            "Say hello to get started...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();
        for message in messages {
            push_message_lines(app, message, &mut lines);
        }
        Text::from(lines)
    };

    let chat = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(chat, area);
}

fn push_message_lines<'a>(app: &App, message: &'a Message, lines: &mut Vec<Line<'a>>) {
    let (label, style, alignment) = match message.direction {
        Direction::Outbound => ("You", app.theme.user_message, Alignment::Right),
        Direction::Inbound => ("Bot", app.theme.bot_message, Alignment::Left),
    };
    let body_style = if message.is_error {
        app.theme.error_message
    } else {
        style
    };

    lines.push(Line::from(Span::styled(label, style.add_modifier(Modifier::BOLD))).alignment(alignment));

    if message.is_pending() {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat(usize::from(app.animation_frame) + 1);
        lines.push(Line::from(Span::styled(
            dots,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    } else if message.text.is_empty() {
        lines.push(Line::default());
    } else {
        for line in message.text.lines() {
            lines.push(Line::from(Span::styled(line, body_style)).alignment(alignment));
        }
    }
    lines.push(Line::default());
}

fn render_suggestions(app: &mut App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = app
        .conversation
        .suggestions()
        .all()
        .iter()
        .map(|s| ListItem::new(format!(" {}. {} ", s.id, s.text)))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Suggestions (Tab, Enter) ");

    let list = List::new(items)
        .block(block)
        .highlight_style(app.theme.user_message.add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.suggestion_state);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let [field_area, button_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(5)]).areas(area);

    let sending = app.conversation.is_sending();
    let container_style = if sending {
        app.theme.input_container.add_modifier(Modifier::DIM)
    } else {
        app.theme.input_container
    };
    let field_block = Block::default()
        .borders(Borders::ALL)
        .border_style(container_style);

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = field_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;
    let scroll_offset = if inner_width == 0 || cursor_pos < inner_width {
        0
    } else {
        cursor_pos - inner_width + 1
    };

    let input = app.conversation.input();
    let field = if input.is_empty() {
        Paragraph::new(Span::styled(
            app.conversation.placeholder(),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    } else {
        let visible_text: String = input.chars().skip(scroll_offset).take(inner_width).collect();
        Paragraph::new(visible_text).style(app.theme.input)
    };
    frame.render_widget(field.block(field_block), field_area);

    let icon = if sending { " … " } else { " ➤ " };
    let button = Paragraph::new(Span::styled(icon, app.theme.send_icon))
        .style(app.theme.send_button)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(container_style));
    frame.render_widget(button, button_area);

    // Input is disabled while sending, so no cursor
    if !sending {
        let cursor_x = u16::try_from(cursor_pos - scroll_offset).unwrap_or(0);
        frame.set_cursor_position((field_area.x + cursor_x + 1, field_area.y + 1));
    }
}
