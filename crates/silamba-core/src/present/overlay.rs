use std::time::{Duration, Instant};

use crate::models::Banner;

use super::filters::offer_popup_banner;
use super::session::{SessionFlags, BANNER_SHOWN_FLAG};

/// Delay between the promo banner arriving and the popup opening.
pub const OFFER_POPUP_DELAY: Duration = Duration::from_secs(1);

/// A floating advertisement hides itself after this long.
pub const FLOATING_AD_LIFETIME: Duration = Duration::from_secs(30);

pub const TOAST_LIFETIME: Duration = Duration::from_secs(3);

/// Once-per-session promo popup.
///
/// Whether it was already seen lives only in `SessionFlags`, so clearing
/// the flags lets the same popup arm again.
#[derive(Debug, Clone, Default)]
pub struct OfferPopup {
    banner: Option<Banner>,
    opens_at: Option<Instant>,
    open: bool,
}

impl OfferPopup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the popup for `banner` unless it is inactive, already
    /// scheduled, or was dismissed earlier this session.
    pub fn arm(&mut self, banner: Option<&Banner>, flags: &SessionFlags, now: Instant) {
        if self.banner.is_some() || flags.was_shown(BANNER_SHOWN_FLAG) {
            return;
        }
        if let Some(banner) = offer_popup_banner(banner) {
            self.banner = Some(banner.clone());
            self.opens_at = Some(now + OFFER_POPUP_DELAY);
        }
    }

    /// Open the popup once its delay has passed. Returns true on the tick
    /// that opens it.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.opens_at {
            Some(at) if now >= at => {
                self.opens_at = None;
                self.open = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn banner(&self) -> Option<&Banner> {
        if self.open {
            self.banner.as_ref()
        } else {
            None
        }
    }

    pub fn dismiss(&mut self, flags: &SessionFlags) {
        self.open = false;
        self.opens_at = None;
        self.banner = None;
        flags.mark_shown(BANNER_SHOWN_FLAG);
    }
}

/// Visibility of the floating advertisement slot.
#[derive(Debug, Clone, Copy)]
pub struct FloatingAd {
    hides_at: Instant,
    closed: bool,
}

impl FloatingAd {
    pub fn new(now: Instant) -> Self {
        Self {
            hides_at: now + FLOATING_AD_LIFETIME,
            closed: false,
        }
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        !self.closed && now < self.hides_at
    }

    pub fn close(&mut self) {
        self.closed = true;
    }
}

/// Confirm-before-leaving modal for outbound links.
#[derive(Debug, Clone, Default)]
pub struct RedirectPrompt {
    pending: Option<(String, String)>,
}

impl RedirectPrompt {
    pub fn open(&mut self, label: impl Into<String>, url: impl Into<String>) {
        self.pending = Some((label.into(), url.into()));
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn label(&self) -> Option<&str> {
        self.pending.as_ref().map(|(label, _)| label.as_str())
    }

    pub fn url(&self) -> Option<&str> {
        self.pending.as_ref().map(|(_, url)| url.as_str())
    }

    /// Close the prompt and hand back the URL to open.
    pub fn confirm(&mut self) -> Option<String> {
        self.pending.take().map(|(_, url)| url)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Short-lived notification shown after an admin action.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    expires_at: Instant,
}

impl Toast {
    pub fn success(message: impl Into<String>, now: Instant) -> Self {
        Self::new(message, ToastKind::Success, now)
    }

    pub fn error(message: impl Into<String>, now: Instant) -> Self {
        Self::new(message, ToastKind::Error, now)
    }

    fn new(message: impl Into<String>, kind: ToastKind, now: Instant) -> Self {
        Self {
            message: message.into(),
            kind,
            expires_at: now + TOAST_LIFETIME,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
