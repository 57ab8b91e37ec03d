//! Full-screen pages that sit outside the tab bar.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::{field_line, panel};
use crate::app::Page;
use crate::ui::styles;

const STORY: [&str; 2] = [
    "Established in 2000, Silamba Colour Lab & Studio has been a trusted name in photography \
     in Dindigul, near the bus stand.",
    "From weddings and corporate events to personal shoots, every moment is preserved with \
     artistic integrity.",
];

const SERVICES: [(&str, &str); 3] = [
    (
        "Photography",
        "Wedding, event, candid, pre/post-wedding shoots captured with creativity and precision.",
    ),
    (
        "Corporate & Event Shoots",
        "Professional coverage for conferences, seminars, and business events.",
    ),
    (
        "Personalized Photo Gifts",
        "Transforming memories into lasting keepsakes with custom engraving and gift items.",
    ),
];

const CONTACT: [(&str, &str); 4] = [
    ("Location", "7, Thiruvalluvar Salai, Opp Bus Stand, Dindigul-624001"),
    ("Phone", "+91 97904 97138"),
    ("Email", "silambacolourlab@gmail.com"),
    ("Hours", "Mon - Sun: 10:00 AM - 8:00 PM"),
];

pub fn render(frame: &mut Frame, page: &Page, area: Rect) {
    let (title, lines) = match page {
        Page::About => (" About us ", about_lines()),
        Page::Contact => (" Contact ", contact_lines()),
        Page::NotFound { title, path } => (" 404 ", not_found_lines(title, path)),
    };
    let paragraph = Paragraph::new(lines)
        .block(panel(title.to_string(), true))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn about_lines() -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Our Story", styles::title_style())),
    ];
    lines.extend(STORY.iter().map(|text| Line::from(format!("  {}", text))));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  What we do", styles::title_style())));
    for (name, text) in SERVICES {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}: ", name), styles::highlight_style()),
            Span::raw(text),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(back_hint());
    lines
}

fn contact_lines() -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];
    lines.extend(CONTACT.iter().map(|(label, value)| field_line(label, value)));
    lines.push(Line::from(""));
    lines.push(back_hint());
    lines
}

fn not_found_lines(title: &str, path: &str) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", title), styles::error_style())),
        Line::from(Span::styled(
            format!("  Nothing lives at {}", path),
            styles::muted_style(),
        )),
        Line::from(""),
        back_hint(),
    ]
}

fn back_hint() -> Line<'static> {
    Line::from(Span::styled(
        "  Press Esc or 1 to go back to Home",
        styles::muted_style(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_contact_lists_phone_and_email() {
        let rendered = text(&contact_lines());
        assert!(rendered.contains("+91 97904 97138"));
        assert!(rendered.contains("silambacolourlab@gmail.com"));
    }

    #[test]
    fn test_not_found_names_the_path() {
        let rendered = text(&not_found_lines("Category Not Found", "/category/x"));
        assert!(rendered.contains("Category Not Found"));
        assert!(rendered.contains("/category/x"));
    }
}
