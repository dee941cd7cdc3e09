use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use super::super::view::{ButtonView, UiContext};

pub fn render_footer(frame: &mut Frame<'_>, area: Rect, ctx: &UiContext<'_>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let mut buttons: Vec<Span<'static>> = Vec::new();
    for button in ctx.buttons {
        buttons.push(button_span(button));
        buttons.push(Span::raw(" "));
    }
    buttons.push(Span::styled(
        format!("[ {} (Ctrl+Q) ]", ctx.cancel_label),
        Style::default().fg(Color::Gray),
    ));
    frame.render_widget(Paragraph::new(Line::from(buttons)), rows[0]);

    let mut status = ctx.status_message.to_string();
    if ctx.dirty {
        status.push_str(" • unsaved changes");
    }
    let badge = if ctx.error_count > 0 {
        Span::styled(
            format!("[! {}]", ctx.error_count),
            Style::default().fg(Color::Red).bg(Color::Black),
        )
    } else {
        Span::styled("[ok]", Style::default().fg(Color::Green))
    };
    let status_line = Line::from(vec![badge, Span::raw(" "), Span::raw(status)]);
    frame.render_widget(Paragraph::new(status_line), rows[1]);

    if let Some(help) = ctx.help {
        let help_widget = Paragraph::new(help.to_string())
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(help_widget, rows[2]);
    }
}

fn button_span(button: &ButtonView) -> Span<'static> {
    let text = if button.state.loading {
        format!("[ {}… ]", button.label)
    } else {
        format!("[ {} ({}) ]", button.label, button.shortcut)
    };
    let style = if button.state.loading {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::SLOW_BLINK)
    } else if button.state.disabled {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };
    Span::styled(text, style)
}
