use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use silamba_core::forms::FieldKind;
use silamba_core::models::Collection;
use silamba_core::present::ToastKind;

use crate::app::{App, AppState, LoginFocus, Tab};

use super::styles;
use super::tabs::{admin, catalog, home, occasions, offers, pages};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::EditingForm => render_form_overlay(frame, app),
        AppState::UploadingImage => {
            render_form_overlay(frame, app);
            render_upload_overlay(frame, app);
        }
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        AppState::ConfirmingRedirect => render_redirect_overlay(frame, app),
        AppState::ShowingOffer => render_offer_overlay(frame, app),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Silamba Colour Lab";
    let route = app.current_route().path();
    let help_hint = "[?] Help";
    let used = title.len() + route.len() + help_hint.len() + 6;

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::styled(format!("  {}", route), styles::muted_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        if *tab == app.current_tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    if app.session.is_authenticated() {
        let user = format!("admin: {}", app.session.username().unwrap_or("admin"));
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let padding = (area.width as usize).saturating_sub(used + user.len() + 2);
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(user, styles::success_style()));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(page) = &app.page {
        pages::render(frame, page, area);
        return;
    }
    match app.current_tab {
        Tab::Home => home::render(frame, app, area),
        Tab::Categories => catalog::render(frame, app, area),
        Tab::Occasions => occasions::render(frame, app, area),
        Tab::Offers => offers::render(frame, app, area),
        Tab::Admin => admin::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.current_tab {
        _ if app.page.is_some() => "[Esc] back | [q]uit",
        Tab::Admin if app.admin_collection == Collection::Advertisements => {
            "[n]ew [e]dit [d]elete [t]oggle | [q]uit"
        }
        Tab::Admin => "[n]ew [e]dit [d]elete | [u]pdate | [q]uit",
        _ => "[i]about [c]ontact | [u]pdate | [q]uit",
    };

    let (left_text, left_style) = if let Some(ref toast) = app.toast {
        let style = match toast.kind {
            ToastKind::Success => styles::success_style(),
            ToastKind::Error => styles::error_style(),
        };
        (format!(" {} ", toast.message), style)
    } else if let Some(ref msg) = app.status_message {
        (format!(" {} ", msg), styles::muted_style())
    } else if !app.loading.is_empty() {
        (" Loading... ".to_string(), styles::muted_style())
    } else {
        (format!(" Updated {} ", app.cache_age()), styles::muted_style())
    };

    let right_text = format!(" {} ", shortcuts);
    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn overlay_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default())
}

fn help_line(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc.to_string(), styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 31, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");
    let help_text = vec![
        Line::from(Span::styled("  Silamba Colour Lab", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-5", "Switch tabs"),
        help_line("←/→", "Prev/next tab"),
        help_line("Tab", "Categories ↔ sub-categories"),
        help_line("↑/↓", "Navigate list"),
        help_line("Enter", "Open link / drill down"),
        help_line("Esc", "Go back"),
        help_line("i / c", "About / contact page"),
        Line::from(""),
        Line::from(Span::styled(" Home", styles::highlight_style())),
        help_line("h/l", "Previous/next banner"),
        help_line("a", "Open the ad on this page"),
        help_line("f / x", "Open / close the floating ad"),
        Line::from(""),
        Line::from(Span::styled(" Admin", styles::highlight_style())),
        help_line("[ / ]", "Switch collection"),
        help_line("n / e / d", "New, edit, delete record"),
        help_line("t", "Show/hide the selected ad"),
        help_line("Ctrl+U", "Upload image into the field"),
        help_line("L", "Log out"),
        Line::from(""),
        help_line("r / u", "Refetch / clear cache and update"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    frame.render_widget(Paragraph::new(help_text).block(overlay_block(" Help ")), area);
}

fn input_style(focused: bool) -> Style {
    if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    }
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 11 } else { 9 };
    let area = centered_rect_fixed(46, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("      Admin Portal", styles::title_style())),
        Line::from(""),
    ];

    let username_focused = app.login_focus == LoginFocus::Username;
    let cursor = if username_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Username: [", styles::muted_style()),
        Span::styled(
            format!("{:<16}{}", app.login_username, cursor),
            input_style(username_focused),
        ),
        Span::styled("]", styles::muted_style()),
    ]));

    let password_focused = app.login_focus == LoginFocus::Password;
    let masked = "*".repeat(app.login_password.len().min(16));
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(format!("{:<16}{}", masked, cursor), input_style(password_focused)),
        Span::styled("]", styles::muted_style()),
    ]));

    let button_focused = app.login_focus == LoginFocus::Button;
    let label = if button_focused { " ▶ Login ◀ " } else { "   Login   " };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("            ["),
        Span::styled(label, input_style(button_focused)),
        Span::raw("]"),
    ]));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    frame.render_widget(Paragraph::new(lines).block(overlay_block(" Login ")), area);
}

fn render_form_overlay(frame: &mut Frame, app: &App) {
    let Some(form) = app.form.as_ref() else {
        return;
    };
    let fields = form.fields();
    let extra = if app.form_error.is_some() { 2 } else { 0 };
    let height = fields.len() as u16 + 6 + extra;
    let area = centered_rect_fixed(72, height, frame.area());
    frame.render_widget(Clear, area);

    let value_width = (area.width as usize).saturating_sub(24);
    let mut lines = vec![Line::from("")];
    for (i, spec) in fields.iter().enumerate() {
        let focused = i == form.focus();
        let marker = if spec.required { "*" } else { " " };
        let raw = form.value_at(i);
        let value = match spec.kind {
            FieldKind::Text => {
                let cursor = if focused { "▌" } else { "" };
                format!("{}{}", tail(raw, value_width.saturating_sub(1)), cursor)
            }
            FieldKind::Toggle => (if raw == "true" { "[x]" } else { "[ ]" }).to_string(),
            FieldKind::CategoryRef => {
                let name = app.category_name(raw).unwrap_or("(choose)");
                format!("◀ {} ▶", name)
            }
            FieldKind::Choice(_) => format!("◀ {} ▶", raw),
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {}{:<18} ", marker, spec.label), styles::muted_style()),
            Span::styled(value, input_style(focused)),
        ]));
    }

    if let Some(ref error) = app.form_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" Enter", styles::help_key_style()),
        Span::styled(" save  ", styles::muted_style()),
        Span::styled("Ctrl+U", styles::help_key_style()),
        Span::styled(" upload image  ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" cancel", styles::muted_style()),
    ]));

    let title = format!(" {} ", form.title());
    frame.render_widget(Paragraph::new(lines).block(overlay_block(&title)), area);
}

/// Last `max` characters of `s`, so the cursor end stays visible.
fn tail(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        s.to_string()
    } else {
        s.chars().skip(count - max).collect()
    }
}

fn render_upload_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(64, 7, frame.area());
    frame.render_widget(Clear, area);

    let width = (area.width as usize).saturating_sub(6);
    let lines = vec![
        Line::from(Span::styled(" Local image path:", styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(
            format!(" {}▌", tail(&app.upload_path, width)),
            styles::selected_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Enter", styles::help_key_style()),
            Span::styled(" upload  ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" back", styles::muted_style()),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(overlay_block(" Upload Image ")), area);
}

fn yes_no_line(yes: &str, no: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled("   Press ", styles::muted_style()),
        Span::styled("[Y]", styles::help_key_style()),
        Span::styled(format!(" to {}, ", yes), styles::muted_style()),
        Span::styled("[N]", styles::help_key_style()),
        Span::styled(format!(" to {}", no), styles::muted_style()),
    ])
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        yes_no_line("quit", "cancel"),
    ];

    frame.render_widget(Paragraph::new(lines).block(overlay_block(" Quit ")), area);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let Some(prompt) = app.confirm_delete.prompt() else {
        return;
    };
    let area = centered_rect_fixed(56, 8, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!(" {}", prompt), styles::highlight_style())),
        Line::from(""),
        yes_no_line("delete", "keep it"),
    ];

    let paragraph = Paragraph::new(lines)
        .block(overlay_block(" Delete "))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_redirect_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(60, 9, frame.area());
    frame.render_widget(Clear, area);

    let label = app.redirect.label().unwrap_or_default();
    let url = app.redirect.url().unwrap_or_default();
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" You are leaving for \"{}\"", label),
            styles::highlight_style(),
        )),
        Line::from(Span::styled(format!(" {}", url), styles::muted_style())),
        Line::from(""),
        yes_no_line("continue", "stay"),
    ];

    let paragraph = Paragraph::new(lines)
        .block(overlay_block(" External Link "))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_offer_overlay(frame: &mut Frame, app: &App) {
    let Some(banner) = app.offer_popup.banner() else {
        return;
    };
    let area = centered_rect_fixed(56, 10, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", banner.title), styles::title_style())),
    ];
    if !banner.subtitle.is_empty() {
        lines.push(Line::from(format!("  {}", banner.subtitle)));
    }
    lines.push(Line::from(""));
    if banner.has_cta() {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format!(" {} ", banner.cta_text), styles::promo_style()),
            Span::styled("  Enter", styles::help_key_style()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Esc", styles::help_key_style()),
        Span::styled(" to close", styles::muted_style()),
    ]));

    let paragraph = Paragraph::new(lines)
        .block(overlay_block(" Special Offer "))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
