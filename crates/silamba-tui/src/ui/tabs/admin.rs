//! Admin console: one table per catalog collection.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use silamba_core::models::{orphaned_subcategories, Collection, Resource};
use silamba_core::utils::truncate_string;

use super::{panel, placeholder};
use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if !app.session.is_authenticated() {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled("  Admin access required", styles::highlight_style())),
            Line::from(Span::styled("  Press 5 to log in", styles::muted_style())),
        ];
        frame.render_widget(Paragraph::new(lines).block(panel(" Admin ".to_string(), false)), area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(30)])
        .split(area);

    render_collections(frame, app, chunks[0]);
    render_records(frame, app, chunks[1]);
}

fn collection_len(app: &App, collection: Collection) -> usize {
    match collection {
        Collection::Remote(Resource::Banners) => app.banners.len(),
        Collection::Remote(Resource::Categories) => app.categories.len(),
        Collection::Remote(Resource::SubCategories) => app.subcategories.len(),
        Collection::Remote(Resource::Occasions) => app.occasions.len(),
        Collection::Remote(Resource::Offers) => app.offers.len(),
        Collection::Advertisements => app.advertisements.len(),
    }
}

fn render_collections(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = Collection::ALL
        .iter()
        .map(|collection| {
            let label = format!(
                " {:<15}{:>3}",
                collection.display_name(),
                collection_len(app, *collection)
            );
            if *collection == app.admin_collection {
                Line::from(Span::styled(label, styles::selected_style()))
            } else {
                Line::from(Span::styled(label, styles::list_item_style()))
            }
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).block(panel(" Collections [ ] ".to_string(), false)),
        area,
    );
}

fn render_records(frame: &mut Frame, app: &App, area: Rect) {
    let collection = app.admin_collection;
    let rows = app.admin_rows();
    let title = format!(" {} ({}) ", collection.display_name(), rows.len());

    let orphans = if collection == Collection::Remote(Resource::SubCategories) {
        orphaned_subcategories(&app.categories, &app.subcategories).len()
    } else {
        0
    };

    let (list_area, footer_area) = if orphans > 0 {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);
        (split[0], Some(split[1]))
    } else {
        (area, None)
    };

    if rows.is_empty() {
        let (loading, error) = match collection.resource() {
            Some(resource) => (app.loading.contains(&resource), app.errors.get(&resource)),
            None => (false, None),
        };
        let lines = placeholder(loading, error, collection.empty_message());
        frame.render_widget(Paragraph::new(lines).block(panel(title, true)), list_area);
    } else {
        let label_width = (list_area.width as usize / 2).saturating_sub(2);
        let items: Vec<ListItem> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let style = if i == app.admin_selection {
                    styles::selected_style()
                } else {
                    styles::list_item_style()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!(" {:<width$}", truncate_string(&row.label, label_width), width = label_width),
                        style,
                    ),
                    Span::styled(format!(" {}", row.detail), styles::muted_style()),
                ]))
            })
            .collect();

        let mut state = ListState::default();
        state.select(Some(app.admin_selection));
        frame.render_stateful_widget(List::new(items).block(panel(title, true)), list_area, &mut state);
    }

    if let Some(footer) = footer_area {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {} sub-categories point at a missing category", orphans),
                styles::error_style(),
            )),
            footer,
        );
    }
}
