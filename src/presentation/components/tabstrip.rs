use std::ops::Range;

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Tabs},
};
use unicode_width::UnicodeWidthStr;

use crate::form::TabSummary;

const LEFT_CHEVRON: &str = "≪";
const RIGHT_CHEVRON: &str = "≫";
// Tabs pads each title with one column per side and draws a one-column divider.
const TAB_CHROME: usize = 3;

pub(crate) fn render_tab_strip(
    frame: &mut Frame<'_>,
    area: Rect,
    tabs: &[TabSummary],
    selected: usize,
    title: &str,
) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    if tabs.is_empty() {
        frame.render_widget(block, area);
        return;
    }

    let widths: Vec<usize> = tabs.iter().map(|tab| label_width(tab) + TAB_CHROME).collect();
    let selected = selected.min(tabs.len() - 1);
    let available = area.width.saturating_sub(2) as usize;
    let window = visible_window(&widths, selected, available);

    let chevron = Style::default().fg(Color::DarkGray);
    let badge = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
    let titles: Vec<Line<'static>> = window
        .clone()
        .map(|index| {
            let tab = &tabs[index];
            let mut spans = Vec::new();
            if index == window.start && window.start > 0 {
                spans.push(Span::styled(format!("{LEFT_CHEVRON} "), chevron));
            }
            spans.push(Span::raw(tab_text(tab)));
            if tab.error_count > 0 {
                spans.push(Span::styled(format!(" ●{}", tab.error_count), badge));
            }
            if index + 1 == window.end && window.end < tabs.len() {
                spans.push(Span::styled(format!(" {RIGHT_CHEVRON}"), chevron));
            }
            Line::from(spans)
        })
        .collect();

    let strip = Tabs::new(titles)
        .block(block)
        .select(selected - window.start)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(strip, area);
}

fn tab_text(tab: &TabSummary) -> String {
    match &tab.icon {
        Some(icon) => format!("{icon} {}", tab.label),
        None => tab.label.clone(),
    }
}

fn label_width(tab: &TabSummary) -> usize {
    let badge = if tab.error_count > 0 {
        2 + tab.error_count.to_string().len()
    } else {
        0
    };
    UnicodeWidthStr::width(tab_text(tab).as_str()) + badge
}

/// Largest run of tabs around `selected` that fits in `available` columns.
/// Grows rightwards first so the next tab is previewed; always keeps `selected`.
fn visible_window(widths: &[usize], selected: usize, available: usize) -> Range<usize> {
    if widths.is_empty() {
        return 0..0;
    }
    let total: usize = widths.iter().sum();
    if total <= available {
        return 0..widths.len();
    }
    // Room for both chevrons once the strip overflows.
    let budget = available.saturating_sub(4);
    let (mut start, mut end) = (selected, selected + 1);
    let mut used = widths[selected];
    loop {
        let grew_right = end < widths.len() && used + widths[end] <= budget;
        if grew_right {
            used += widths[end];
            end += 1;
        }
        let grew_left = start > 0 && used + widths[start - 1] <= budget;
        if grew_left {
            start -= 1;
            used += widths[start];
        }
        if !grew_right && !grew_left {
            return start..end;
        }
    }
}
