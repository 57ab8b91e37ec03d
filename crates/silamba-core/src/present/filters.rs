use crate::models::{AdPosition, Advertisement, Banner, Category, Offer, SubCategory};

pub fn active_banners(banners: &[Banner]) -> Vec<&Banner> {
    banners.iter().filter(|b| b.is_active).collect()
}

pub fn active_offers(offers: &[Offer]) -> Vec<&Offer> {
    offers.iter().filter(|o| o.is_active).collect()
}

/// Active advertisements placed in `position`, in stored order.
pub fn ads_at(ads: &[Advertisement], position: AdPosition) -> Vec<&Advertisement> {
    ads.iter()
        .filter(|ad| ad.active && ad.position == position)
        .collect()
}

pub fn subcategories_for<'a>(subs: &'a [SubCategory], category_id: &str) -> Vec<&'a SubCategory> {
    subs.iter().filter(|s| s.belongs_to(category_id)).collect()
}

pub fn featured_categories(categories: &[Category]) -> Vec<&Category> {
    categories.iter().filter(|c| c.is_featured()).collect()
}

/// The promo banner for the once-per-session popup, if it is switched on.
pub fn offer_popup_banner(banner: Option<&Banner>) -> Option<&Banner> {
    banner.filter(|b| b.is_active)
}
