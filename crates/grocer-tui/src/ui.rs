use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use grocer_core::{ChatMessage, GroupRole, MessageContent, Node, Sender};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::App;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let input_rows = app.view().input_height().saturating_add(2);

    // Main layout: header, conversation, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_rows),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" 🛒 Grocer Genie ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.endpoint().to_string(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = !app.view().is_input_focused();
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Chat ");

    let inner_width = usize::from(area.width.saturating_sub(2));
    let inner_height = area.height.saturating_sub(2);

    let lines: Vec<Line<'static>> = if app.view().entries().is_empty() {
        vec![Line::from(Span::styled(
            "Ask me to plan your meals for the week...",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        let frame_idx = app.animation_frame;
        app.view()
            .entries()
            .iter()
            .flat_map(|entry| message_lines(&entry.message, frame_idx))
            .collect()
    };

    // One entry per screen row, so the row count is exact
    let rows: Vec<Line<'static>> = lines
        .into_iter()
        .flat_map(|line| wrap_line(line, inner_width))
        .collect();
    let total = clamp_u16(rows.len());
    app.view_mut().update_scroll(total, inner_height);
    let offset = app.view().scroll.offset;

    let chat = Paragraph::new(Text::from(rows))
        .block(block)
        .scroll((offset, 0));
    frame.render_widget(chat, area);

    if total > inner_height {
        let mut state = ScrollbarState::new(usize::from(total.saturating_sub(inner_height)))
            .position(usize::from(offset));
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut state,
        );
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let view = app.view();
    let (border_color, title) = if !view.is_submit_enabled() {
        (Color::DarkGray, " Waiting for reply... ")
    } else if view.is_input_focused() {
        (Color::Yellow, " Message (Enter to send, Shift+Enter for new line) ")
    } else {
        (Color::Gray, " Message (i to type) ")
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let inner_width = usize::from(area.width.saturating_sub(2));
    let inner_height = usize::from(area.height.saturating_sub(2)).max(1);

    // Keep the cursor inside the box
    let (row, col) = view.cursor_row_col();
    let scroll_y = row.saturating_sub(inner_height - 1);
    let scroll_x = if inner_width > 0 && col >= inner_width {
        col - inner_width + 1
    } else {
        0
    };

    let input = Paragraph::new(view.input().to_string())
        .style(Style::default().fg(Color::Cyan))
        .block(block)
        .scroll((clamp_u16(scroll_y), clamp_u16(scroll_x)));
    frame.render_widget(input, area);

    if view.is_input_focused() {
        frame.set_cursor_position((
            area.x + 1 + clamp_u16(col - scroll_x),
            area.y + 1 + clamp_u16(row - scroll_y),
        ));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = if app.view().is_input_focused() {
        " Enter send | Shift/Alt+Enter newline | Esc browse | PgUp/PgDn scroll | Ctrl-C quit"
    } else {
        " i type | j/k scroll | g/G top/bottom | q quit"
    };

    let status = if app.controller.is_sending() {
        Span::styled("Sending ", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("Ready ", Style::default().fg(Color::Green))
    };

    let [hints_area, status_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(8),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(Color::DarkGray))),
        hints_area,
    );
    frame.render_widget(Paragraph::new(Line::from(status).right_aligned()), status_area);
}

fn clamp_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Wrap a styled line at word boundaries to fit `width` columns.
/// Words wider than a row are split by character. Whitespace at a break
/// point is dropped; leading indentation is kept.
fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    if line.width() <= width {
        return vec![line];
    }

    let mut rows = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0;

    for span in &line.spans {
        for (piece, blank) in split_words(&span.content) {
            let piece_width = piece.width();
            if current_width + piece_width <= width {
                current.push(Span::styled(piece.to_string(), span.style));
                current_width += piece_width;
                continue;
            }

            // Doesn't fit, start a new row
            if current_width > 0 {
                rows.push(Line::from(std::mem::take(&mut current)));
                current_width = 0;
            }
            if blank {
                continue;
            }

            let mut chunk = String::new();
            for ch in piece.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if current_width + ch_width > width && current_width > 0 {
                    rows.push(Line::from(Span::styled(std::mem::take(&mut chunk), span.style)));
                    current_width = 0;
                }
                chunk.push(ch);
                current_width += ch_width;
            }
            if !chunk.is_empty() {
                current.push(Span::styled(chunk, span.style));
            }
        }
    }

    if !current.is_empty() || rows.is_empty() {
        rows.push(Line::from(current));
    }
    rows
}

/// Split into alternating runs of whitespace and non-whitespace.
fn split_words(text: &str) -> Vec<(&str, bool)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut run: Option<bool> = None;

    for (idx, ch) in text.char_indices() {
        let blank = ch.is_whitespace();
        if let Some(prev) = run {
            if prev != blank {
                pieces.push((&text[start..idx], prev));
                start = idx;
            }
        }
        run = Some(blank);
    }
    if let Some(prev) = run {
        pieces.push((&text[start..], prev));
    }
    pieces
}

/// Lines for one chat message: sender label, body, blank separator.
fn message_lines(message: &ChatMessage, animation_frame: u8) -> Vec<Line<'static>> {
    let mut lines = vec![sender_label(message.sender)];

    match &message.content {
        MessageContent::Text(text) => {
            push_text(&mut lines, text.as_deref().unwrap_or(""), Style::default())
        }
        MessageContent::Node(node) => node_lines(node, &mut lines),
        MessageContent::Typing => {
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat(usize::from(animation_frame) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }
    }

    lines.push(Line::default());
    lines
}

fn sender_label(sender: Sender) -> Line<'static> {
    match sender {
        Sender::User => Line::from(Span::styled(
            "You:",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Sender::Bot => Line::from(Span::styled(
            "Genie:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    }
}

/// Literal text, one line per source line. Empty text still takes a row.
fn push_text(lines: &mut Vec<Line<'static>>, text: &str, style: Style) {
    if text.is_empty() {
        lines.push(Line::default());
        return;
    }
    for line in text.lines() {
        lines.push(Line::from(Span::styled(line.to_string(), style)));
    }
}

fn node_lines(node: &Node, lines: &mut Vec<Line<'static>>) {
    match node {
        Node::Group { role, children } => {
            if matches!(role, GroupRole::RecipeCard | GroupRole::ShoppingList) {
                lines.push(Line::default());
            }
            for child in children {
                node_lines(child, lines);
            }
        }
        Node::Heading { level, text } => {
            let style = if *level <= 3 {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            push_text(lines, text, style);
        }
        Node::Paragraph(text) => push_text(lines, text, Style::default()),
        Node::Strong(text) => {
            lines.push(Line::default());
            push_text(
                lines,
                text,
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            );
        }
        Node::Image(image) => {
            if !image.hidden {
                lines.push(Line::from(vec![
                    Span::raw("🖼  "),
                    Span::styled(
                        image.src.clone(),
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::UNDERLINED),
                    ),
                ]));
            }
        }
        Node::List(items) => {
            for item in items {
                lines.push(Line::from(format!("  • {}", item.replace('\n', " "))));
            }
        }
    }
}
