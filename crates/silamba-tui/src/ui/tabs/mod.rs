//! Per-tab content rendering.

pub mod admin;
pub mod catalog;
pub mod home;
pub mod occasions;
pub mod offers;
pub mod pages;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use silamba_core::models::AdPosition;
use silamba_core::utils::truncate_string;

use crate::app::App;
use crate::ui::styles;

/// Height of a one-line ad strip with its border.
pub(crate) const AD_STRIP_HEIGHT: u16 = 3;

/// Bordered panel with the shared title and focus styling.
pub(crate) fn panel(title: String, focused: bool) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused))
}

/// Placeholder shown while a collection is loading or empty.
pub(crate) fn placeholder(loading: bool, error: Option<&String>, empty: &str) -> Vec<Line<'static>> {
    if let Some(error) = error {
        return vec![Line::from(Span::styled(
            format!("Error: {}", error),
            styles::error_style(),
        ))];
    }
    let text = if loading { "Loading..." } else { empty };
    vec![Line::from(Span::styled(text.to_string(), styles::muted_style()))]
}

/// Label/value line used in detail panels.
pub(crate) fn field_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<14}", label), styles::highlight_style()),
        Span::raw(value.to_string()),
    ])
}

/// One-line strip showing the ad rotated into `position`.
pub(crate) fn render_ad_strip(frame: &mut Frame, app: &App, position: AdPosition, area: Rect) {
    let Some((ad, place, count)) = app.slot_ad(position) else {
        return;
    };
    let mut spans = vec![
        Span::styled(" AD ", styles::promo_style()),
        Span::raw(" "),
        Span::styled(ad.title.clone(), styles::highlight_style()),
        Span::styled(
            format!("  {}", truncate_string(&ad.description, 60)),
            styles::muted_style(),
        ),
    ];
    let hint = if count > 1 {
        format!("  [a] open  {}/{}", place, count)
    } else {
        "  [a] open".to_string()
    };
    spans.push(Span::styled(hint, styles::muted_style()));
    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(panel(String::new(), false)),
        area,
    );
}
