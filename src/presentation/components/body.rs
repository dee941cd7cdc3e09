use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{super::view::UiContext, controls::control_lines, tabstrip::render_tab_strip};

pub fn render_body(frame: &mut Frame<'_>, area: Rect, ctx: &UiContext<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    render_tab_strip(
        frame,
        chunks[0],
        ctx.tabs,
        ctx.active_tab,
        ctx.title.unwrap_or("Form"),
    );

    let fields_area = chunks[1];
    let Some(tab) = ctx.tab else {
        let placeholder = Paragraph::new("No tab selected").block(Block::default().borders(Borders::ALL));
        frame.render_widget(placeholder, fields_area);
        return;
    };

    let width = fields_area.width.saturating_sub(2);
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut focus_span: Option<(usize, usize)> = None;

    if let Some(error) = ctx.form_error {
        lines.push(Line::from(Span::styled(
            format!("✗ {error}"),
            Style::default().fg(Color::Red),
        )));
        lines.push(Line::default());
    }

    for section in &tab.sections {
        let heading = match &section.icon {
            Some(icon) => format!("{icon} {}", section.title),
            None => section.title.clone(),
        };
        lines.push(Line::from(Span::styled(
            heading,
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )));
        if let Some(description) = &section.description {
            lines.push(Line::from(Span::styled(
                description.clone(),
                Style::default().fg(Color::DarkGray),
            )));
        }
        for control in &section.controls {
            let focused = ctx.focus == Some(control.name.as_str());
            let start = lines.len();
            lines.extend(control_lines(control, focused, width));
            if focused {
                focus_span = Some((start, lines.len()));
            }
        }
        lines.push(Line::default());
    }

    if tab.sections.is_empty() {
        lines.push(Line::from(Span::styled(
            "Nothing to edit on this tab",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let viewport = fields_area.height.saturating_sub(2) as usize;
    let offset = scroll_offset(focus_span, viewport);
    let paragraph = Paragraph::new(lines)
        .block(Block::default().title(tab.label.clone()).borders(Borders::ALL))
        .scroll((offset as u16, 0));
    frame.render_widget(paragraph, fields_area);
}

/// First visible line so the focused control fits, top-aligned when it cannot.
fn scroll_offset(focus: Option<(usize, usize)>, viewport: usize) -> usize {
    let Some((start, end)) = focus else {
        return 0;
    };
    if viewport == 0 || end <= viewport {
        return 0;
    }
    (end - viewport).min(start)
}
