use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use lynk_chat_core::{BackendStatus, LineKind, RenderedLine, Sender};
use crate::app::App;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, log, input row, footer
    let [header_area, log_area, input_row, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_log(app, frame, log_area);
    render_input_row(app, frame, input_row);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let (status_text, status_color) = match app.backend_status {
        BackendStatus::Unknown => ("checking", Color::Gray),
        BackendStatus::Online => ("online", Color::Green),
        BackendStatus::Offline => ("offline", Color::Red),
    };

    let mut spans = vec![
        Span::styled(" Lynk Feature Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.controller.base_url().to_string(), Style::default().fg(Color::White)),
        Span::raw(" "),
        Span::styled(format!("● {}", status_text), Style::default().fg(status_color)),
    ];

    if app.is_waiting() {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        spans.push(Span::styled(
            format!("  Waiting{} ({})", dots, app.pending.len()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ));
    }

    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        format!("v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::Gray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn styled_line(line: RenderedLine) -> Line<'static> {
    match line.kind {
        LineKind::Label(Sender::User) => Line::from(Span::styled(
            line.text,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        LineKind::Label(Sender::Bot) => Line::from(Span::styled(
            line.text,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        LineKind::Block => Line::from(Span::styled(line.text, Style::default().fg(Color::Green))),
        LineKind::Body(_) | LineKind::Blank => Line::from(line.text),
    }
}

fn render_log(app: &mut App, frame: &mut Frame, area: Rect) {
    app.log_area = Some(area);

    // Inner size minus borders
    let width = area.width.saturating_sub(2) as usize;
    let height = area.height.saturating_sub(2) as usize;
    app.log.set_viewport(width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Conversation ");

    // Only the visible window is handed to ratatui
    let lines: Vec<Line> = app
        .log
        .visible_lines(app.log.scroll(), height)
        .into_iter()
        .map(styled_line)
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);

    let max_scroll = app.log.max_scroll();
    if max_scroll > 0 {
        let mut state = ScrollbarState::new(max_scroll).position(app.log.scroll());
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut state,
        );
    }
}

fn render_input_row(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_area, send_area, reset_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(10),
        Constraint::Length(11),
    ])
    .areas(area);

    app.send_button = Some(send_area);
    app.reset_button = Some(reset_area);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Message ");

    // Horizontal scrolling keeps the cursor visible
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, input_area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));

    let send_style = if app.input.trim().is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Green).bold()
    };
    let send = Paragraph::new("Send")
        .alignment(Alignment::Center)
        .style(send_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(send, send_area);

    let reset = Paragraph::new("Reset")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Magenta).bold())
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(reset, reset_area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" Ctrl+R ", key_style),
        Span::styled(" reset ", label_style),
        Span::styled(" ↑/↓ PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Ctrl+Y ", key_style),
        Span::styled(" copy YAML ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ];

    if let Some(notice) = &app.notice {
        hints.push(Span::raw("  "));
        hints.push(Span::styled(notice.clone(), Style::default().fg(Color::Yellow)));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}
