//! Markdown model for assistant replies
//!
//! Replies are parsed with pulldown-cmark into a flat list of [`Block`]s:
//! runs of styled prose lines, and fenced code blocks that the view draws in
//! their own panel with a copy control. Paragraphs are not separated by blank
//! lines.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// Inline styling of a run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub code: bool,
    pub link: bool,
    pub heading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub style: InlineStyle,
}

/// A fenced code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: Option<String>,
    /// Raw block text as parsed, including its trailing newline
    pub code: String,
}

impl CodeBlock {
    /// The text placed on the clipboard: the block as written, minus one trailing newline
    pub fn copy_text(&self) -> &str {
        self.code.strip_suffix('\n').unwrap_or(&self.code)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.copy_text().split('\n')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Prose lines, each a sequence of styled runs
    Prose(Vec<Vec<Run>>),
    Code(CodeBlock),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn parse(content: &str) -> Self {
        let mut builder = Builder::default();
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;
        for event in Parser::new_ext(content, options) {
            builder.event(event);
        }
        builder.finish()
    }

    pub fn code_blocks(&self) -> impl Iterator<Item = &CodeBlock> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Code(code) => Some(code),
            Block::Prose(_) => None,
        })
    }
}

enum CodeState {
    Fenced { language: Option<String>, code: String },
    Indented,
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    lines: Vec<Vec<Run>>,
    line: Vec<Run>,
    style: InlineStyle,
    code: Option<CodeState>,
    // One entry per open list: the next item number, or None for bullets
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    link_urls: Vec<String>,
    table_cell: usize,
}

impl Builder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(text) => {
                let style = InlineStyle {
                    code: true,
                    ..self.style
                };
                self.push_run(&text, style);
            }
            Event::Html(text) => self.html_lines(&text),
            Event::InlineHtml(text) => self.text(&text),
            Event::SoftBreak => self.push_run(" ", self.style),
            Event::HardBreak => self.break_line(),
            Event::Rule => {
                self.break_line();
                self.push_run("───", InlineStyle::default());
                self.break_line();
            }
            Event::TaskListMarker(done) => {
                self.push_run(if done { "[x] " } else { "[ ] " }, InlineStyle::default());
            }
            Event::FootnoteReference(label) => {
                self.push_run(&format!("[{label}]"), self.style);
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                self.flush_prose();
                let language = info
                    .split_whitespace()
                    .next()
                    .map(str::to_string);
                self.code = Some(CodeState::Fenced {
                    language,
                    code: String::new(),
                });
            }
            Tag::CodeBlock(CodeBlockKind::Indented) => {
                self.break_line();
                self.code = Some(CodeState::Indented);
            }
            Tag::Heading { .. } => {
                self.break_line();
                self.style.heading = true;
                self.style.bold = true;
            }
            Tag::Emphasis => self.style.italic = true,
            Tag::Strong => self.style.bold = true,
            Tag::Strikethrough => self.style.strikethrough = true,
            Tag::Link { dest_url, .. } => {
                self.style.link = true;
                self.link_urls.push(dest_url.to_string());
            }
            Tag::BlockQuote => {
                self.break_line();
                self.quote_depth += 1;
            }
            Tag::List(start) => {
                self.break_line();
                self.lists.push(start);
            }
            Tag::Item => {
                self.break_line();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.push_run(&format!("{}{marker}", "  ".repeat(depth)), InlineStyle::default());
            }
            Tag::HtmlBlock => self.break_line(),
            Tag::TableRow | Tag::TableHead => {
                self.break_line();
                self.table_cell = 0;
            }
            Tag::TableCell => {
                if self.table_cell > 0 {
                    self.push_run(" | ", InlineStyle::default());
                }
                self.table_cell += 1;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::CodeBlock => match self.code.take() {
                Some(CodeState::Fenced { language, code }) => {
                    self.blocks.push(Block::Code(CodeBlock { language, code }));
                }
                Some(CodeState::Indented) | None => self.break_line(),
            },
            TagEnd::Paragraph => self.break_line(),
            TagEnd::Heading(_) => {
                self.style.heading = false;
                self.style.bold = false;
                self.break_line();
            }
            TagEnd::Emphasis => self.style.italic = false,
            TagEnd::Strong => self.style.bold = false,
            TagEnd::Strikethrough => self.style.strikethrough = false,
            TagEnd::Link => {
                self.style.link = false;
                if let Some(url) = self.link_urls.pop() {
                    if !url.is_empty() {
                        self.push_run(&format!(" ({url})"), InlineStyle::default());
                    }
                }
            }
            TagEnd::BlockQuote => {
                self.break_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::List(_) => {
                self.break_line();
                self.lists.pop();
            }
            TagEnd::Item | TagEnd::TableRow | TagEnd::TableHead | TagEnd::HtmlBlock => {
                self.break_line()
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(CodeState::Fenced { code, .. }) = &mut self.code {
            code.push_str(text);
            return;
        }
        if matches!(self.code, Some(CodeState::Indented)) {
            let style = InlineStyle {
                code: true,
                ..InlineStyle::default()
            };
            let text = text.strip_suffix('\n').unwrap_or(text);
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    self.break_line();
                }
                self.push_run(line, style);
            }
            self.break_line();
            return;
        }
        self.push_run(text, self.style);
    }

    /// Raw HTML blocks are shown as written, one line per source line
    fn html_lines(&mut self, text: &str) {
        let text = text.strip_suffix('\n').unwrap_or(text);
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.break_line();
            }
            self.push_run(line, InlineStyle::default());
        }
        self.break_line();
    }

    fn push_run(&mut self, text: &str, style: InlineStyle) {
        if text.is_empty() {
            return;
        }
        if self.line.is_empty() && self.quote_depth > 0 {
            self.line.push(Run {
                text: "│ ".repeat(self.quote_depth),
                style: InlineStyle::default(),
            });
        }
        match self.line.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.line.push(Run {
                text: text.to_string(),
                style,
            }),
        }
    }

    fn break_line(&mut self) {
        if !self.line.is_empty() {
            self.lines.push(std::mem::take(&mut self.line));
        }
    }

    fn flush_prose(&mut self) {
        self.break_line();
        if !self.lines.is_empty() {
            self.blocks.push(Block::Prose(std::mem::take(&mut self.lines)));
        }
    }

    fn finish(mut self) -> Document {
        if let Some(CodeState::Fenced { language, code }) = self.code.take() {
            self.blocks.push(Block::Code(CodeBlock { language, code }));
        }
        self.flush_prose();
        Document {
            blocks: self.blocks,
        }
    }
}
