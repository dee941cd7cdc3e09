use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};
use unicode_width::UnicodeWidthStr;

use super::super::view::PopupRender;

pub fn render_popup(frame: &mut Frame<'_>, popup: &PopupRender<'_>) {
    if popup.options.is_empty() {
        return;
    }
    let marker = if popup.multi { 4 } else { 0 };
    let widest = popup
        .options
        .iter()
        .map(|option| UnicodeWidthStr::width(option.as_str()) + marker)
        .chain(std::iter::once(UnicodeWidthStr::width(popup.title)))
        .max()
        .unwrap_or(10) as u16;
    let screen = frame.area();
    let width = widest
        .saturating_add(6)
        .min(screen.width.saturating_sub(2).max(1));
    let height = (popup.options.len() as u16)
        .saturating_add(2)
        .min(screen.height)
        .max(3);
    let area = centered(screen, width, height);
    frame.render_widget(Clear, area);

    let items: Vec<ListItem<'static>> = popup
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            if popup.multi {
                let checked = popup.marks.get(index).copied().unwrap_or(false);
                ListItem::new(format!("[{}] {option}", if checked { "x" } else { " " }))
            } else {
                ListItem::new(option.clone())
            }
        })
        .collect();
    let mut state = ListState::default();
    state.select(Some(popup.selected.min(popup.options.len() - 1)));

    let hint = if popup.multi {
        " Space toggle • Enter done "
    } else {
        " Enter choose • Esc close "
    };
    let list = List::new(items)
        .block(
            Block::default()
                .title(popup.title.to_string())
                .title_bottom(hint)
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");

    frame.render_stateful_widget(list, area, &mut state);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}
