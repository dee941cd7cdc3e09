use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use textwrap::wrap;

use crate::form::{
    Control, InputKind, OptionsStatus, RichLine, RichLineKind, RichPreview, RichSpan, Widget,
};

const INDENT: &str = "   ";

/// Lines for one control: label, value, description and error.
pub(crate) fn control_lines(control: &Control, focused: bool, width: u16) -> Vec<Line<'static>> {
    let width = (width as usize).saturating_sub(INDENT.len()).max(8);
    let mut lines = vec![label_line(control, focused)];
    lines.extend(value_lines(control, focused, width));

    if let Some(description) = &control.description {
        let style = Style::default().fg(Color::DarkGray);
        lines.extend(wrapped(description, width, style));
    }
    if let Some(error) = &control.error {
        let style = Style::default().fg(Color::Red);
        lines.extend(wrapped(&format!("✗ {error}"), width, style));
    }
    lines
}

fn label_line(control: &Control, focused: bool) -> Line<'static> {
    let marker = if focused { "» " } else { "  " };
    let mut style = Style::default().add_modifier(Modifier::BOLD);
    style = match (focused, control.disabled) {
        (_, true) => style.fg(Color::DarkGray),
        (true, false) => style.fg(Color::Yellow),
        (false, false) => style.fg(Color::Cyan),
    };
    let mut label = control.label.clone();
    if control.required {
        label.push_str(" *");
    }
    let mut spans = vec![Span::raw(marker), Span::styled(label, style)];
    if control.is_loading() {
        spans.push(Span::styled(" (loading…)", Style::default().fg(Color::DarkGray)));
    } else if control.disabled {
        spans.push(Span::styled(" (read-only)", Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

fn value_lines(control: &Control, focused: bool, width: usize) -> Vec<Line<'static>> {
    let plain = Style::default();
    match &control.widget {
        Widget::Input { text, kind, .. } => {
            let fallback = match kind {
                InputKind::Date => Some("YYYY-MM-DD"),
                _ => None,
            };
            text_or_placeholder(text, control.placeholder.as_deref().or(fallback), width)
        }
        Widget::Secret {
            display, revealed, ..
        } => {
            let mut spans = vec![Span::raw(INDENT), Span::raw(display.clone())];
            if focused {
                let hint = if *revealed { "  Ctrl+R hide" } else { "  Ctrl+R show" };
                spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
            }
            vec![Line::from(spans)]
        }
        Widget::TextArea { lines, max_length } => {
            let text = lines.join("\n");
            let mut out = text_or_placeholder(&text, control.placeholder.as_deref(), width);
            if let Some(max) = max_length {
                let used = text.chars().count();
                out.push(indented(
                    format!("{used}/{max}"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            out
        }
        Widget::RichText { source, preview } => {
            let mut out = text_or_placeholder(source, control.placeholder.as_deref(), width);
            if focused && !preview.is_empty() {
                out.push(indented(
                    "Preview".to_string(),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::UNDERLINED),
                ));
                out.extend(preview_lines(preview));
            }
            out
        }
        Widget::Number {
            text, min, max, ..
        } => {
            let mut spans = vec![Span::raw(INDENT), Span::styled(format!("‹ {text} ›"), plain)];
            let range = match (min, max) {
                (Some(min), Some(max)) => Some(format!("  {min}..{max}")),
                (Some(min), None) => Some(format!("  ≥ {min}")),
                (None, Some(max)) => Some(format!("  ≤ {max}")),
                (None, None) => None,
            };
            if let Some(range) = range {
                spans.push(Span::styled(range, Style::default().fg(Color::DarkGray)));
            }
            vec![Line::from(spans)]
        }
        Widget::Toggle { on, style } => {
            let color = if *on { Color::Green } else { Color::Gray };
            vec![indented(style.label(*on).to_string(), Style::default().fg(color))]
        }
        Widget::Choice { status, .. } => match status {
            OptionsStatus::Empty => vec![muted("No options available")],
            OptionsStatus::Loading => vec![muted("Loading…")],
            OptionsStatus::Ready => {
                let summary = control.summary();
                if summary.is_empty() {
                    vec![muted(control.placeholder.as_deref().unwrap_or("Enter to choose"))]
                } else {
                    vec![indented(format!("{summary} ▾"), plain)]
                }
            }
        },
        Widget::MultiChoice {
            options,
            status,
            roles,
        } => match status {
            OptionsStatus::Empty => vec![muted("No options available")],
            OptionsStatus::Loading => vec![muted("Loading…")],
            OptionsStatus::Ready if *roles => {
                // Role pickers list every option with its own box.
                let row = options
                    .iter()
                    .map(|option| {
                        format!("[{}] {}", if option.selected { "x" } else { " " }, option.label)
                    })
                    .collect::<Vec<_>>()
                    .join("  ");
                wrapped(&row, width, plain)
            }
            OptionsStatus::Ready => {
                let summary = control.summary();
                if summary.is_empty() {
                    vec![muted("Enter to choose")]
                } else {
                    wrapped(&summary, width, plain)
                }
            }
        },
    }
}

fn text_or_placeholder(text: &str, placeholder: Option<&str>, width: usize) -> Vec<Line<'static>> {
    if text.is_empty() {
        return vec![muted(placeholder.unwrap_or(""))];
    }
    text.split('\n')
        .flat_map(|line| wrapped(line, width, Style::default()))
        .collect()
}

fn preview_lines(preview: &RichPreview) -> Vec<Line<'static>> {
    preview.lines.iter().map(preview_line).collect()
}

fn preview_line(line: &RichLine) -> Line<'static> {
    let (prefix, base) = match line.kind {
        RichLineKind::Heading(level) => (
            format!("{} ", "#".repeat(level as usize)),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        RichLineKind::Bullet => ("• ".to_string(), Style::default()),
        RichLineKind::Quote => ("│ ".to_string(), Style::default().fg(Color::Gray)),
        RichLineKind::Code => (String::new(), Style::default().fg(Color::LightBlue)),
        RichLineKind::Paragraph => (String::new(), Style::default()),
    };
    let mut spans = vec![Span::raw(INDENT), Span::styled(prefix, base)];
    spans.extend(line.spans.iter().map(|span| styled_span(span, base)));
    Line::from(spans)
}

fn styled_span(span: &RichSpan, base: Style) -> Span<'static> {
    let mut style = base;
    if span.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if span.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if span.code {
        style = style.fg(Color::LightBlue);
    }
    Span::styled(span.text.clone(), style)
}

fn wrapped(text: &str, width: usize, style: Style) -> Vec<Line<'static>> {
    let segments = wrap(text, width);
    if segments.is_empty() {
        return vec![indented(String::new(), style)];
    }
    segments
        .into_iter()
        .map(|segment| indented(segment.into_owned(), style))
        .collect()
}

fn indented(text: String, style: Style) -> Line<'static> {
    Line::from(vec![Span::raw(INDENT), Span::styled(text, style)])
}

fn muted(text: &str) -> Line<'static> {
    indented(
        text.to_string(),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )
}
