//! Ephemeral presentation state for the storefront.
//!
//! Nothing here touches the network. Timed behavior is driven by a
//! caller-supplied `Instant` so the TUI tick loop and tests share one clock.

pub mod carousel;
pub mod filters;
pub mod overlay;
pub mod session;

pub use carousel::{Autoplay, Carousel, AD_ROTATION_INTERVAL, BANNER_AUTOPLAY_INTERVAL};
pub use filters::{
    active_banners, active_offers, ads_at, featured_categories, offer_popup_banner,
    subcategories_for,
};
pub use overlay::{
    FloatingAd, OfferPopup, RedirectPrompt, Toast, ToastKind, FLOATING_AD_LIFETIME,
    OFFER_POPUP_DELAY, TOAST_LIFETIME,
};
pub use session::{SessionFlags, BANNER_SHOWN_FLAG};
