use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use silamba_core::models::Resource;

use super::{field_line, panel, placeholder};
use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let block = panel(format!(" Occasions ({}) ", app.occasions.len()), true);
    if app.occasions.is_empty() {
        let lines = placeholder(
            app.loading.contains(&Resource::Occasions),
            app.errors.get(&Resource::Occasions),
            Resource::Occasions.empty_message(),
        );
        frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);
    } else {
        let items: Vec<ListItem> = app
            .occasions
            .iter()
            .enumerate()
            .map(|(i, occasion)| {
                let style = if i == app.occasion_selection {
                    styles::selected_style()
                } else {
                    styles::list_item_style()
                };
                ListItem::new(format!("  {}", occasion.name)).style(style)
            })
            .collect();
        let mut state = ListState::default();
        state.select(Some(app.occasion_selection));
        frame.render_stateful_widget(List::new(items).block(block), chunks[0], &mut state);
    }

    let Some(occasion) = app.occasions.get(app.occasion_selection) else {
        frame.render_widget(
            Paragraph::new("").block(panel(" Details ".to_string(), false)),
            chunks[1],
        );
        return;
    };

    let mut lines = vec![field_line("Image", &occasion.image)];
    if let Some(ref slug) = occasion.slug {
        lines.push(field_line("Page", &format!("/occasion/{}", slug)));
    }
    match occasion.outbound_link() {
        Some(link) => lines.push(field_line("Link", link)),
        None => lines.push(Line::from(Span::styled("No link set", styles::muted_style()))),
    }
    if !occasion.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(occasion.description.clone()));
    }

    let paragraph = Paragraph::new(lines)
        .block(panel(format!(" {} ", occasion.name), false))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, chunks[1]);
}
