use serde::{Deserialize, Serialize};

use super::{Identified, Record, Resource};

/// Homepage banner. Legacy documents use `imageDesktop`, `imageMobile`
/// and `active`; those names are accepted on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(alias = "imageDesktop", default)]
    pub image: String,
    #[serde(
        rename = "mobileImage",
        alias = "imageMobile",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub mobile_image: Option<String>,
    #[serde(rename = "ctaText", default)]
    pub cta_text: String,
    #[serde(rename = "ctaLink", default)]
    pub cta_link: String,
    #[serde(rename = "isActive", alias = "active", default)]
    pub is_active: bool,
}

impl Banner {
    /// Artwork for the given viewport, falling back to the desktop image.
    pub fn image_for(&self, mobile: bool) -> &str {
        match self.mobile_image {
            Some(ref m) if mobile && !m.is_empty() => m,
            _ => &self.image,
        }
    }

    pub fn has_cta(&self) -> bool {
        !self.cta_text.is_empty() && !self.cta_link.is_empty()
    }
}

impl Record for Banner {
    const RESOURCE: Resource = Resource::Banners;
}

impl Identified for Banner {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn label(&self) -> &str {
        &self.title
    }
}
