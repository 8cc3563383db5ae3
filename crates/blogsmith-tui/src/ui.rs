use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use blogsmith_core::export;
use blogsmith_core::request::{TEMPERATURE_MAX, WORD_COUNT_MAX, WORD_COUNT_MIN};

use crate::app::{App, Field, FocusPane, InputMode, StatusKind};

const SIDEBAR_WIDTH: u16 = 38;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    spans
}

/// Render generated markdown as terminal lines: headings, list bullets,
/// rules, quotes, and inline bold.
pub fn render_markdown(text: &str) -> Vec<Line<'static>> {
    text.lines().map(render_markdown_line).collect()
}

fn render_markdown_line(line: &str) -> Line<'static> {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];

    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&level) && trimmed[level..].starts_with(' ') {
        let heading = trimmed[level..].trim().replace("**", "");
        let style = match level {
            1 => Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            2 => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            _ => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        };
        return Line::from(Span::styled(heading, style));
    }

    if matches!(trimmed, "---" | "***" | "___") {
        return Line::from(Span::styled(
            "─".repeat(40),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .or_else(|| trimmed.strip_prefix("+ "))
    {
        let mut spans = vec![
            Span::raw(indent.to_string()),
            Span::styled("• ", Style::default().fg(Color::Yellow)),
        ];
        spans.extend(parse_markdown_line(rest));
        return Line::from(spans);
    }

    if let Some(rest) = trimmed.strip_prefix('>') {
        return Line::from(vec![
            Span::styled("│ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                rest.trim_start().to_string(),
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            ),
        ]);
    }

    let spans = parse_markdown_line(line);
    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// Height of the wrapped output at `width`, counted the way it is drawn.
fn rendered_line_count(text: &Text<'_>, width: u16) -> u16 {
    let count = Paragraph::new(text.clone())
        .wrap(Wrap { trim: false })
        .line_count(width.max(1));
    count.min(u16::MAX as usize) as u16
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [sidebar_area, main_area] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .areas(body_area);

    render_header(frame, header_area);
    render_sidebar(app, frame, sidebar_area);
    render_main(app, frame, main_area);
    render_footer(app, frame, footer_area);

    if app.show_api_key_input {
        render_api_key_input(app, frame, area);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" 📝 Blog Generator ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn slider(fraction: f32, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    format!("{}{}", "■".repeat(filled), "□".repeat(width - filled))
}

fn field_value(app: &App, field: Field) -> String {
    match field {
        Field::Topic => String::new(),
        Field::Temperature => format!(
            "{} {:.1}",
            slider(app.temperature / TEMPERATURE_MAX, 10),
            app.temperature
        ),
        Field::WordCount => {
            let fraction = app.word_count.saturating_sub(WORD_COUNT_MIN) as f32
                / (WORD_COUNT_MAX - WORD_COUNT_MIN) as f32;
            format!("{} {}", slider(fraction, 10), app.word_count)
        }
        Field::Tone => format!("‹ {} ›", app.tone.as_str()),
        Field::Language => format!("‹ {} ›", app.language.as_str()),
        Field::Tldr => {
            if app.include_tldr {
                "[x]".to_string()
            } else {
                "[ ]".to_string()
            }
        }
        Field::Emoji => format!("‹ {} ›", app.emoji.as_str()),
    }
}

fn render_sidebar(app: &App, frame: &mut Frame, area: Rect) {
    let form_focused = app.focus == FocusPane::Form && app.input_mode == InputMode::Normal;
    let border_color = if form_focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" ⚙ Blog Settings ");

    let key_status = match app.key_source {
        Some(source) => Span::styled(
            format!("API key: {}", source.description()),
            Style::default().fg(Color::Green),
        ),
        None => Span::styled(
            "API key: not set (K to enter)",
            Style::default().fg(Color::Yellow),
        ),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Using Model: ", Style::default().add_modifier(Modifier::ITALIC)),
            Span::raw(app.model.clone()),
        ]),
        Line::from(key_status),
        Line::default(),
    ];

    for field in Field::all().into_iter().skip(1) {
        let selected = form_focused && app.field == field;
        let label_style = if selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let value_style = if selected {
            Style::default().bg(Color::Blue).fg(Color::White)
        } else {
            Style::default()
        };

        let marker = if selected { "> " } else { "  " };
        lines.push(Line::from(Span::styled(
            format!("{marker}{}", field.label()),
            label_style,
        )));
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(field_value(app, field), value_style),
        ]));
        lines.push(Line::default());
    }

    let sidebar = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(sidebar, area);
}

fn render_main(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_area, status_area, output_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    render_topic_input(app, frame, input_area);
    render_status(app, frame, status_area);
    render_output(app, frame, output_area);
}

fn render_topic_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let selected = editing || (app.focus == FocusPane::Form && app.field == Field::Topic);
    let border_color = if editing {
        Color::Yellow
    } else if selected {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" 📌 Enter your blog topic ");

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 || app.topic_cursor < inner_width {
        0
    } else {
        app.topic_cursor - inner_width + 1
    };

    let input = if app.topic_input.is_empty() && !editing {
        Paragraph::new("e.g. The Future of AI in Education")
            .style(Style::default().fg(Color::DarkGray))
    } else {
        let visible: String = app
            .topic_input
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Paragraph::new(visible).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(block), area);

    if editing && !app.show_api_key_input {
        let cursor_x = (app.topic_cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let line = match &app.status {
        Some(status) => {
            let (prefix, color) = match status.kind {
                StatusKind::Info => (" ✔ ", Color::Green),
                StatusKind::Warning => (" ⚠ ", Color::Yellow),
                StatusKind::Error => (" ✖ ", Color::Red),
            };
            Line::from(Span::styled(
                format!("{prefix}{}", status.text),
                Style::default().fg(color),
            ))
        }
        None if app.session.has_content() => Line::from(Span::styled(
            format!(" 📥 s: download as {}", export::file_name(&app.topic_input)),
            Style::default().fg(Color::DarkGray),
        )),
        None => Line::default(),
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn render_output(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Output;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Blog ");

    app.output_height = area.height.saturating_sub(2);

    let text = if app.generating {
        Text::from(Line::from(Span::styled(
            "✨ Crafting your blog... please wait...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )))
    } else if app.session.has_content() {
        Text::from(render_markdown(app.session.content()))
    } else {
        Text::from(vec![
            Line::from(vec![
                Span::raw("Create "),
                Span::styled(
                    "beautiful, ready-to-upload blog posts",
                    Style::default().add_modifier(Modifier::ITALIC),
                ),
                Span::raw(" instantly using your AI model."),
            ]),
            Line::default(),
            Line::from(Span::styled(
                "Type a topic, tune the settings, then press Enter to generate.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::default(),
            Line::from(Span::styled(
                "💡 Tip: set GEMINI_API_KEY or press K to enter your Gemini API key.",
                Style::default().fg(Color::DarkGray),
            )),
        ])
    };

    app.output_lines = rendered_line_count(&text, area.width.saturating_sub(2));

    let output = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.output_scroll, 0));

    frame.render_widget(output, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " TOPIC ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if app.show_api_key_input {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" save key ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" cancel ", label_style),
        ]
    } else {
        match (app.input_mode, app.focus) {
            (InputMode::Editing, _) => vec![
                Span::styled(" Enter ", key_style),
                Span::styled(" generate ", label_style),
                Span::styled(" Tab ", key_style),
                Span::styled(" settings ", label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" stop typing ", label_style),
            ],
            (InputMode::Normal, FocusPane::Form) => vec![
                Span::styled(" j/k ", key_style),
                Span::styled(" field ", label_style),
                Span::styled(" h/l ", key_style),
                Span::styled(" change ", label_style),
                Span::styled(" i ", key_style),
                Span::styled(" topic ", label_style),
                Span::styled(" g ", key_style),
                Span::styled(" generate ", label_style),
                Span::styled(" s ", key_style),
                Span::styled(" download ", label_style),
                Span::styled(" Tab ", key_style),
                Span::styled(" blog ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ],
            (InputMode::Normal, FocusPane::Output) => vec![
                Span::styled(" j/k ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" ^d/^u ", key_style),
                Span::styled(" page ", label_style),
                Span::styled(" s ", key_style),
                Span::styled(" download ", label_style),
                Span::styled(" Tab ", key_style),
                Span::styled(" settings ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ],
        }
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

/// One-row strip `offset` rows into `inner`, if the popup is tall enough.
fn popup_row(inner: Rect, offset: u16) -> Option<Rect> {
    (offset < inner.height).then(|| Rect::new(inner.x, inner.y + offset, inner.width, 1))
}

fn render_api_key_input(app: &App, frame: &mut Frame, area: Rect) {
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 7;

    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height).intersection(area);
    if popup_area.is_empty() {
        return;
    }

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Enter Gemini API Key ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    if let Some(row) = popup_row(inner, 0) {
        let instructions =
            Paragraph::new("Paste your API key below. Press Enter to save, Esc to cancel.")
                .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(instructions, row);
    }

    let char_count = app.api_key_input.chars().count();

    if let Some(input_area) = popup_row(inner, 2) {
        // Only the last four characters are ever drawn
        let display_text = if char_count <= 4 {
            "*".repeat(char_count)
        } else {
            let masked_len = char_count - 4;
            let last_four: String = app.api_key_input.chars().skip(masked_len).collect();
            format!("{}...{}", "*".repeat(masked_len.min(20)), last_four)
        };

        frame.render_widget(
            Paragraph::new(display_text).style(Style::default().fg(Color::Cyan)),
            input_area,
        );

        let cursor_x = app.api_key_input_cursor.min(input_area.width as usize) as u16;
        frame.set_cursor_position((input_area.x + cursor_x, input_area.y));
    }

    if let Some(row) = popup_row(inner, 4) {
        let status = Paragraph::new(format!("{char_count} characters"))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(status, row);
    }
}
