use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use silamba_core::models::{AdPosition, Resource};
use silamba_core::utils::truncate_string;

use super::{field_line, panel, placeholder, render_ad_strip, AD_STRIP_HEIGHT};
use crate::app::{App, Focus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let top = app.slot_ad(AdPosition::CategoryTop).is_some();
    let bottom = app.slot_ad(AdPosition::CategoryBottom).is_some();
    let strip = |shown: bool| Constraint::Length(if shown { AD_STRIP_HEIGHT } else { 0 });
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([strip(top), Constraint::Min(5), strip(bottom)])
        .split(area);

    if top {
        render_ad_strip(frame, app, AdPosition::CategoryTop, rows[0]);
    }
    if bottom {
        render_ad_strip(frame, app, AdPosition::CategoryBottom, rows[2]);
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[1]);

    render_category_list(frame, app, chunks[0]);
    render_category_page(frame, app, chunks[1]);
}

fn render_category_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::List;
    let block = panel(format!(" Categories ({}) ", app.categories.len()), focused);

    if app.categories.is_empty() {
        let lines = placeholder(
            app.loading.contains(&Resource::Categories),
            app.errors.get(&Resource::Categories),
            Resource::Categories.empty_message(),
        );
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let width = (area.width as usize).saturating_sub(6);
    let items: Vec<ListItem> = app
        .categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let star = if category.is_featured() { "★ " } else { "  " };
            let style = if i == app.category_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(format!("{}{}", star, truncate_string(&category.name, width))).style(style)
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.category_selection));
    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

fn render_category_page(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Detail;
    let Some(category) = app.selected_category() else {
        let lines = vec![Line::from(Span::styled(
            "Select a category from the list",
            styles::muted_style(),
        ))];
        frame.render_widget(
            Paragraph::new(lines).block(panel(" No Category Selected ".to_string(), focused)),
            area,
        );
        return;
    };

    let mut lines = vec![field_line("Header", category.header_image())];
    if let Some(ref slug) = category.slug {
        lines.push(field_line("Page", &format!("/category/{}", slug)));
    }
    if !category.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(category.description.clone()));
    }
    lines.push(Line::from(""));

    let subcategories = app.selected_subcategories();
    lines.push(Line::from(Span::styled(
        format!("Sub-categories ({})", subcategories.len()),
        styles::title_style(),
    )));
    lines.push(Line::from(""));

    if subcategories.is_empty() {
        lines.extend(placeholder(
            app.loading.contains(&Resource::SubCategories),
            app.errors.get(&Resource::SubCategories),
            Resource::SubCategories.empty_message(),
        ));
    }
    for (i, sub) in subcategories.iter().enumerate() {
        let style = if focused && i == app.subcategory_selection {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        let mut spans = vec![Span::styled(format!("  {}", sub.name), style)];
        if let Some(ref price) = sub.price {
            spans.push(Span::styled(format!("  {}", price), styles::highlight_style()));
        }
        if let Some(ref description) = sub.description {
            spans.push(Span::styled(
                format!("  {}", truncate_string(description, 40)),
                styles::muted_style(),
            ));
        }
        lines.push(Line::from(spans));
    }

    if focused && !subcategories.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Enter opens the product page",
            styles::muted_style(),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(panel(format!(" {} ", category.name), focused))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
