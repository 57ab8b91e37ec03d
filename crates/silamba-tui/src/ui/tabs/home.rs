use std::time::Instant;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use silamba_core::models::{AdPosition, Resource};
use silamba_core::present::featured_categories;
use silamba_core::utils::truncate_string;

use super::{panel, placeholder, render_ad_strip, AD_STRIP_HEIGHT};
use crate::app::App;
use crate::ui::styles;

enum Section {
    Ad(AdPosition),
    Hero,
    Lower,
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let has_ad = |position| app.slot_ad(position).is_some();
    let mut sections = Vec::new();
    if has_ad(AdPosition::HomeTop) {
        sections.push((Section::Ad(AdPosition::HomeTop), Constraint::Length(AD_STRIP_HEIGHT)));
    }
    sections.push((Section::Hero, Constraint::Length(9)));
    if has_ad(AdPosition::HomeMiddle) {
        sections.push((Section::Ad(AdPosition::HomeMiddle), Constraint::Length(AD_STRIP_HEIGHT)));
    }
    sections.push((Section::Lower, Constraint::Min(5)));
    if has_ad(AdPosition::HomeBottom) {
        sections.push((Section::Ad(AdPosition::HomeBottom), Constraint::Length(AD_STRIP_HEIGHT)));
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(sections.iter().map(|(_, c)| *c).collect::<Vec<_>>())
        .split(area);

    for ((section, _), row) in sections.iter().zip(rows.iter()) {
        match section {
            Section::Ad(position) => render_ad_strip(frame, app, *position, *row),
            Section::Hero => render_hero(frame, app, *row),
            Section::Lower => {
                let halves = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(*row);
                render_featured(frame, app, halves[0]);
                render_offer_strip(frame, app, halves[1]);
            }
        }
    }

    if app.floating_ad.is_visible(Instant::now()) {
        render_floating_ad(frame, app, area);
    }
}

fn render_hero(frame: &mut Frame, app: &App, area: Rect) {
    let banners = app.active_banner_list();
    let content = match app.banner_carousel.current(&banners) {
        Some(banner) => {
            let mut lines = vec![
                Line::from(""),
                Line::from(Span::styled(format!("  {}", banner.title), styles::title_style())),
            ];
            if !banner.subtitle.is_empty() {
                lines.push(Line::from(format!("  {}", banner.subtitle)));
            }
            lines.push(Line::from(Span::styled(
                format!("  {}", banner.image_for(area.width < 80)),
                styles::muted_style(),
            )));
            lines.push(Line::from(""));
            if banner.has_cta() {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(format!(" {} ", banner.cta_text), styles::promo_style()),
                    Span::styled("  Enter", styles::help_key_style()),
                ]));
            }

            // Position dots
            let dots: Vec<Span> = (0..banners.len())
                .map(|i| {
                    if i == app.banner_carousel.index() {
                        Span::styled("● ", styles::highlight_style())
                    } else {
                        Span::styled("○ ", styles::muted_style())
                    }
                })
                .collect();
            if banners.len() > 1 {
                let mut dot_line = vec![Span::raw("  ")];
                dot_line.extend(dots);
                dot_line.push(Span::styled(" h/l", styles::muted_style()));
                lines.push(Line::from(dot_line));
            }
            lines
        }
        None => placeholder(
            app.loading.contains(&Resource::Banners),
            app.errors.get(&Resource::Banners),
            Resource::Banners.empty_message(),
        ),
    };

    let paragraph = Paragraph::new(content)
        .block(panel(" Welcome ".to_string(), true))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_featured(frame: &mut Frame, app: &App, area: Rect) {
    let featured = featured_categories(&app.categories);
    let lines: Vec<Line> = if featured.is_empty() {
        placeholder(
            app.loading.contains(&Resource::Categories),
            app.errors.get(&Resource::Categories),
            "No featured categories",
        )
    } else {
        featured
            .iter()
            .map(|c| {
                Line::from(vec![
                    Span::styled("  ★ ", styles::highlight_style()),
                    Span::raw(c.name.clone()),
                    Span::styled(
                        format!("  {}", truncate_string(&c.description, 40)),
                        styles::muted_style(),
                    ),
                ])
            })
            .collect()
    };

    let title = format!(" Featured ({}) ", featured.len());
    frame.render_widget(Paragraph::new(lines).block(panel(title, false)), area);
}

fn render_offer_strip(frame: &mut Frame, app: &App, area: Rect) {
    let offers = app.visible_offers();
    let lines: Vec<Line> = if offers.is_empty() {
        placeholder(
            app.loading.contains(&Resource::Offers),
            app.errors.get(&Resource::Offers),
            "No offers right now",
        )
    } else {
        offers
            .iter()
            .map(|o| {
                Line::from(vec![
                    Span::styled(format!(" {} ", o.discount), styles::promo_style()),
                    Span::raw(format!(" {}", o.title)),
                ])
            })
            .collect()
    };

    frame.render_widget(
        Paragraph::new(lines).block(panel(" Special Offers ".to_string(), false)),
        area,
    );
}

fn render_floating_ad(frame: &mut Frame, app: &App, area: Rect) {
    let Some((ad, _, _)) = app.slot_ad(AdPosition::Floating) else {
        return;
    };
    let width = 36.min(area.width);
    let height = 5.min(area.height);
    let rect = Rect::new(
        area.x + area.width - width,
        area.y + area.height - height,
        width,
        height,
    );
    frame.render_widget(Clear, rect);

    let lines = vec![
        Line::from(Span::styled(
            truncate_string(&ad.title, (width as usize).saturating_sub(2)),
            styles::highlight_style(),
        )),
        Line::from(Span::styled("[f] open  [x] close", styles::muted_style())),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(panel(" Ad ".to_string(), true)),
        rect,
    );
}
