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
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let offers = app.visible_offers();
    let block = panel(format!(" Special Offers ({}) ", offers.len()), true);
    if offers.is_empty() {
        let lines = placeholder(
            app.loading.contains(&Resource::Offers),
            app.errors.get(&Resource::Offers),
            Resource::Offers.empty_message(),
        );
        frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);
        frame.render_widget(
            Paragraph::new("").block(panel(" Details ".to_string(), false)),
            chunks[1],
        );
        return;
    }

    let items: Vec<ListItem> = offers
        .iter()
        .enumerate()
        .map(|(i, offer)| {
            let style = if i == app.offer_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:<10}", offer.discount), styles::highlight_style()),
                Span::styled(format!(" {}", offer.title), style),
            ]))
        })
        .collect();
    let mut state = ListState::default();
    state.select(Some(app.offer_selection));
    frame.render_stateful_widget(List::new(items).block(block), chunks[0], &mut state);

    let Some(offer) = offers.get(app.offer_selection) else {
        return;
    };
    let mut lines = vec![
        Line::from(Span::styled(format!(" {} ", offer.discount), styles::promo_style())),
        Line::from(""),
        field_line("Code", offer.code_display()),
    ];
    if !offer.link.is_empty() {
        lines.push(field_line("Link", &offer.link));
    }
    if !offer.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(offer.description.clone()));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Enter opens the deal", styles::muted_style())));

    let paragraph = Paragraph::new(lines)
        .block(panel(format!(" {} ", offer.title), false))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, chunks[1]);
}
