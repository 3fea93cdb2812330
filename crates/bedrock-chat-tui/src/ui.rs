use std::time::Instant;

use bedrock_chat_core::{
    Block as DocBlock, ChatRole, CodeBlock, CodeBlockId, DisplayMode, Entry, InlineStyle, Run,
};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode};

/// Colours for one display mode
struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    accent: Color,
    user: Color,
    assistant: Color,
    error: Color,
    code_bg: Color,
    code_fg: Color,
    border: Color,
}

impl Palette {
    fn for_mode(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Light => Self {
                bg: Color::Rgb(255, 255, 255),
                fg: Color::Rgb(33, 37, 41),
                muted: Color::DarkGray,
                accent: Color::Blue,
                user: Color::Rgb(0, 102, 204),
                assistant: Color::Magenta,
                error: Color::Red,
                code_bg: Color::Rgb(244, 244, 244),
                code_fg: Color::Rgb(33, 37, 41),
                border: Color::Gray,
            },
            DisplayMode::Dark => Self {
                bg: Color::Rgb(24, 24, 27),
                fg: Color::Rgb(230, 230, 230),
                muted: Color::Gray,
                accent: Color::Cyan,
                user: Color::Cyan,
                assistant: Color::Yellow,
                error: Color::LightRed,
                code_bg: Color::Rgb(40, 42, 54),
                code_fg: Color::Rgb(230, 230, 230),
                border: Color::DarkGray,
            },
        }
    }

    fn run_style(&self, style: InlineStyle) -> Style {
        let mut out = Style::default();
        if style.bold || style.heading {
            out = out.add_modifier(Modifier::BOLD);
        }
        if style.heading {
            out = out.fg(self.accent);
        }
        if style.italic {
            out = out.add_modifier(Modifier::ITALIC);
        }
        if style.strikethrough {
            out = out.add_modifier(Modifier::CROSSED_OUT);
        }
        if style.code {
            out = out.fg(self.code_fg).bg(self.code_bg);
        }
        if style.link {
            out = out.fg(self.accent).add_modifier(Modifier::UNDERLINED);
        }
        out
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let palette = Palette::for_mode(app.display_mode());

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
        area,
    );

    // Main layout: header, chat, selected file, input, footer
    let [header_area, chat_area, file_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area, &palette);
    render_file_line(app, frame, file_area, &palette);
    render_input(app, frame, input_area, &palette);
    render_footer(app, frame, footer_area, &palette);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Bedrock Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" "),
        Span::styled(
            format!("[t] {}", app.display_mode().toggle_label()),
            Style::default().fg(Color::White),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn role_header(label: &'static str, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn prose_line(runs: &[Run], palette: &Palette) -> Line<'static> {
    if runs.is_empty() {
        return Line::default();
    }
    Line::from(
        runs.iter()
            .map(|run| Span::styled(run.text.clone(), palette.run_style(run.style)))
            .collect::<Vec<_>>(),
    )
}

/// Framed code panel with the copy control in its top border
fn code_panel(
    block: &CodeBlock,
    label: &str,
    selected: bool,
    width: usize,
    palette: &Palette,
    lines: &mut Vec<Line<'static>>,
) {
    let border = if selected {
        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.border)
    };
    let control = if selected {
        Style::default().fg(palette.bg).bg(palette.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.muted)
    };

    let left = format!("┌─ {} ", block.language.as_deref().unwrap_or("code"));
    let right = format!("[{label}]");
    let fill = width.saturating_sub(left.chars().count() + right.chars().count() + 3);
    lines.push(Line::from(vec![
        Span::styled(format!("{left}{} ", "─".repeat(fill)), border),
        Span::styled(right, control),
        Span::styled(" ─", border),
    ]));

    let code_style = Style::default().fg(palette.code_fg).bg(palette.code_bg);
    for code_line in block.lines() {
        lines.push(Line::from(vec![
            Span::styled("│ ", border),
            Span::styled(code_line.to_string(), code_style),
        ]));
    }

    lines.push(Line::from(Span::styled(
        format!("└{}", "─".repeat(width.saturating_sub(1))),
        border,
    )));
}

/// Rows a line occupies when drawn with the chat's word wrapping
fn wrapped_height(line: &Line<'static>, width: u16) -> usize {
    Paragraph::new(line.clone())
        .wrap(Wrap { trim: false })
        .line_count(width.max(1))
        .max(1)
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(" Chat ");
    let inner = chat_block.inner(area);

    // Store chat height for scroll calculations
    app.chat_height = inner.height;
    let width = inner.width.max(1) as usize;
    let now = Instant::now();

    let mut lines: Vec<Line<'static>> = Vec::new();
    // Line index where the selected code panel starts
    let mut selected_start = None;

    for (entry_idx, entry) in app.controller.conversation().entries().iter().enumerate() {
        match entry {
            Entry::Message(message) if message.role == ChatRole::User => {
                lines.push(role_header("You:", palette.user));
                // User text is shown verbatim
                for text_line in message.content.split('\n') {
                    lines.push(Line::from(text_line.to_string()));
                }
            }
            Entry::Message(message) => {
                lines.push(role_header("Assistant:", palette.assistant));
                let Some(Some(document)) = app.documents.get(entry_idx) else {
                    for text_line in message.content.split('\n') {
                        lines.push(Line::from(text_line.to_string()));
                    }
                    lines.push(Line::default());
                    continue;
                };
                let mut block_idx = 0;
                for block in &document.blocks {
                    match block {
                        DocBlock::Prose(prose) => {
                            lines.extend(prose.iter().map(|runs| prose_line(runs, palette)));
                        }
                        DocBlock::Code(code) => {
                            let id = CodeBlockId {
                                entry: entry_idx,
                                block: block_idx,
                            };
                            let selected = app.selected_block == Some(id);
                            if selected {
                                selected_start = Some(lines.len());
                            }
                            let label = app.copy_feedback.label(id, now);
                            code_panel(code, label, selected, width, palette, &mut lines);
                            block_idx += 1;
                        }
                    }
                }
            }
            Entry::Failed { error } => {
                lines.push(Line::from(vec![
                    Span::styled(
                        "Error: ",
                        Style::default().fg(palette.error).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(error.clone(), Style::default().fg(palette.error)),
                ]));
            }
        }
        lines.push(Line::default());
    }

    if app.is_waiting() {
        lines.push(role_header("Assistant:", palette.assistant));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
        )));
    }

    // Rows each line takes once word-wrapped, for scrolling
    let heights: Vec<usize> = lines
        .iter()
        .map(|line| wrapped_height(line, inner.width))
        .collect();
    let total: usize = heights.iter().sum();
    app.max_scroll = total.saturating_sub(inner.height as usize).min(u16::MAX as usize) as u16;

    if app.scroll_to_selected {
        app.scroll_to_selected = false;
        if let Some(start) = selected_start {
            let offset: usize = heights[..start].iter().sum();
            app.scroll = (offset.min(u16::MAX as usize) as u16).min(app.max_scroll);
        }
    } else if app.follow {
        app.scroll = app.max_scroll;
    } else {
        app.scroll = app.scroll.min(app.max_scroll);
    }

    let chat_text = if lines.is_empty() {
        Text::from(Span::styled(
            "Type a message, or press Esc then o to choose an image or PDF...",
            Style::default().fg(palette.muted),
        ))
    } else {
        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));

    frame.render_widget(chat, area);
}

fn format_size(bytes: usize) -> String {
    match bytes {
        b if b < 1024 => format!("{b} B"),
        b if b < 1024 * 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        b => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
    }
}

fn render_file_line(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let line = match &app.controller.input().file {
        Some(file) => Line::from(vec![
            Span::styled(" File: ", Style::default().fg(palette.accent).bold()),
            Span::raw(file.name.clone()),
            Span::styled(
                format!(" ({}, {})", file.mime, format_size(file.bytes.len())),
                Style::default().fg(palette.muted),
            ),
        ]),
        None => Line::from(Span::styled(
            " No file selected",
            Style::default().fg(palette.muted),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let (title, text, cursor_pos) = match app.input_mode {
        InputMode::FilePath => (
            " Open file (image or PDF) ".to_string(),
            app.file_path_input.as_str(),
            app.file_path_input.chars().count(),
        ),
        _ => {
            let queued = app.controller.queued_len();
            let title = if queued > 0 {
                format!(" Message ({queued} queued) ")
            } else {
                " Message ".to_string()
            };
            (title, app.draft(), app.cursor)
        }
    };

    let border_color = match app.input_mode {
        InputMode::Normal => palette.border,
        InputMode::Editing | InputMode::FilePath => Color::Yellow,
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };
    let visible_text: String = text.chars().skip(scroll_offset).take(inner_width).collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(palette.user))
        .block(input_block);
    frame.render_widget(input, area);

    if app.input_mode != InputMode::Normal {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + 1 + cursor_x, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" EDIT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
        InputMode::FilePath => (" FILE ", Style::default().bg(Color::Magenta).fg(Color::White)),
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];

    if let Some(notice) = &app.notice {
        let color = if notice.is_error { palette.error } else { palette.fg };
        spans.push(Span::styled(notice.text.clone(), Style::default().fg(color)));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
        return;
    }

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints: &[(&str, &str)] = match app.input_mode {
        InputMode::Normal => &[
            (" i ", " message "),
            (" o ", " file "),
            (" u ", " upload "),
            (" x ", " clear "),
            (" Tab ", " code "),
            (" y ", " copy "),
            (" j/k ", " scroll "),
            (" t ", " theme "),
            (" q ", " quit "),
        ],
        InputMode::Editing => &[(" Enter ", " send "), (" Esc ", " normal ")],
        InputMode::FilePath => &[(" Enter ", " load "), (" Esc ", " cancel ")],
    };
    for (key, label) in hints {
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::styled(*label, label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
