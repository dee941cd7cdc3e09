use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RichLineKind {
    Heading(u8),
    Paragraph,
    Bullet,
    Quote,
    Code,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichSpan {
    pub text: String,
    pub strong: bool,
    pub emphasis: bool,
    pub code: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichLine {
    pub kind: RichLineKind,
    pub spans: Vec<RichSpan>,
}

impl RichLine {
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// Line-oriented markdown preview for rich text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichPreview {
    pub lines: Vec<RichLine>,
}

impl RichPreview {
    pub fn parse(source: &str) -> Self {
        let mut builder = PreviewBuilder::default();
        for event in Parser::new(source) {
            builder.push(event);
        }
        builder.finish()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Default)]
struct PreviewBuilder {
    lines: Vec<RichLine>,
    current: Option<RichLine>,
    kind_stack: Vec<RichLineKind>,
    strong: usize,
    emphasis: usize,
}

impl PreviewBuilder {
    fn push(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.kind_stack.push(RichLineKind::Heading(heading_level(level)));
            }
            Event::Start(Tag::Item) => self.kind_stack.push(RichLineKind::Bullet),
            Event::Start(Tag::BlockQuote(..)) => self.kind_stack.push(RichLineKind::Quote),
            Event::Start(Tag::CodeBlock(_)) => self.kind_stack.push(RichLineKind::Code),
            Event::Start(Tag::Strong) => self.strong += 1,
            Event::Start(Tag::Emphasis) => self.emphasis += 1,
            Event::End(TagEnd::Heading(_))
            | Event::End(TagEnd::Item)
            | Event::End(TagEnd::BlockQuote(..))
            | Event::End(TagEnd::CodeBlock) => {
                self.flush();
                self.kind_stack.pop();
            }
            Event::End(TagEnd::Paragraph) => self.flush(),
            Event::End(TagEnd::Strong) => self.strong = self.strong.saturating_sub(1),
            Event::End(TagEnd::Emphasis) => self.emphasis = self.emphasis.saturating_sub(1),
            Event::Text(text) => {
                if self.current_kind() == RichLineKind::Code {
                    let mut lines = text.split('\n').peekable();
                    while let Some(line) = lines.next() {
                        if lines.peek().is_none() && line.is_empty() {
                            break;
                        }
                        self.append(line, false);
                        self.flush();
                    }
                } else {
                    self.append(&text, false);
                }
            }
            Event::Code(text) => self.append(&text, true),
            Event::SoftBreak => self.append(" ", false),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines.push(RichLine {
                    kind: RichLineKind::Paragraph,
                    spans: vec![RichSpan {
                        text: "───".to_string(),
                        ..RichSpan::default()
                    }],
                });
            }
            _ => {}
        }
    }

    fn current_kind(&self) -> RichLineKind {
        self.kind_stack
            .last()
            .copied()
            .unwrap_or(RichLineKind::Paragraph)
    }

    fn append(&mut self, text: &str, code: bool) {
        let kind = self.current_kind();
        let strong = self.strong > 0;
        let emphasis = self.emphasis > 0;
        let line = self.current.get_or_insert_with(|| RichLine {
            kind,
            spans: Vec::new(),
        });
        line.spans.push(RichSpan {
            text: text.to_string(),
            strong,
            emphasis,
            code: code || kind == RichLineKind::Code,
        });
    }

    fn flush(&mut self) {
        if let Some(line) = self.current.take() {
            self.lines.push(line);
        }
    }

    fn finish(mut self) -> RichPreview {
        self.flush();
        RichPreview { lines: self.lines }
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
