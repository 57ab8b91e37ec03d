use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::models::{Advertisement, Banner, Category, Occasion};

/// The full studio data set as persisted under one storage key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudioDocument {
    pub banners: Vec<Banner>,
    pub categories: Vec<Category>,
    pub occasions: Vec<Occasion>,
    pub advertisements: Vec<Advertisement>,
}

impl StudioDocument {
    /// Decode a document that already passed the schema check, record by
    /// record. Unreadable records are logged and skipped; the count of
    /// skipped records is returned alongside.
    pub fn from_value_lenient(value: &Value) -> (Self, usize) {
        let mut skipped = 0;
        let document = StudioDocument {
            banners: decode_records(value, "banners", &mut skipped),
            categories: decode_records(value, "categories", &mut skipped),
            occasions: decode_records(value, "occasions", &mut skipped),
            advertisements: decode_records(value, "advertisements", &mut skipped),
        };
        (document, skipped)
    }

    /// Fill derived fields older documents lack: a category's header
    /// image defaults to its card image.
    pub fn normalize(&mut self) {
        for category in &mut self.categories {
            if category.header_image.as_deref().map_or(true, str::is_empty) && !category.image.is_empty() {
                category.header_image = Some(category.image.clone());
            }
        }
    }

    pub fn category_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.matches_slug(slug))
    }

    pub fn occasion_by_slug(&self, slug: &str) -> Option<&Occasion> {
        self.occasions
            .iter()
            .find(|o| o.slug.as_deref() == Some(slug))
    }

    /// Replace the ad with the same id, or append it. An ad without an id
    /// is given a fresh one. Returns the id stored.
    pub fn upsert_advertisement(&mut self, mut ad: Advertisement) -> String {
        if ad.id.is_empty() {
            ad.id = Uuid::new_v4().to_string();
        }
        let id = ad.id.clone();
        match self.advertisements.iter_mut().find(|a| a.id == id) {
            Some(existing) => *existing = ad,
            None => self.advertisements.push(ad),
        }
        id
    }

    pub fn remove_advertisement(&mut self, id: &str) -> bool {
        let before = self.advertisements.len();
        self.advertisements.retain(|a| a.id != id);
        self.advertisements.len() != before
    }

    /// Flip an ad between shown and hidden. Returns the new state.
    pub fn toggle_advertisement(&mut self, id: &str) -> Option<bool> {
        let ad = self.advertisements.iter_mut().find(|a| a.id == id)?;
        ad.active = !ad.active;
        Some(ad.active)
    }
}

fn decode_records<T: DeserializeOwned>(value: &Value, field: &str, skipped: &mut usize) -> Vec<T> {
    let Some(items) = value.get(field).and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                let id = item.get("id").and_then(Value::as_str).unwrap_or("?");
                warn!(field, id, error = %e, "Skipping unreadable record");
                *skipped += 1;
                None
            }
        })
        .collect()
}

/// Bundled document used when nothing valid is persisted.
pub fn default_document() -> StudioDocument {
    let mut document = StudioDocument {
        banners: vec![Banner {
            id: "fallback-1".to_string(),
            title: "Welcome to Our Studio".to_string(),
            subtitle: "Professional photography services".to_string(),
            image: "https://images.pexels.com/photos/1264210/pexels-photo-1264210.jpeg?auto=compress&cs=tinysrgb&w=1920&h=1080&fit=crop".to_string(),
            mobile_image: Some("https://images.pexels.com/photos/1264210/pexels-photo-1264210.jpeg?auto=compress&cs=tinysrgb&w=768&h=1024&fit=crop".to_string()),
            is_active: true,
            ..Default::default()
        }],
        categories: vec![Category {
            id: "fallback-1".to_string(),
            name: "Photography Services".to_string(),
            description: "Professional photography for all occasions".to_string(),
            slug: Some("services".to_string()),
            image: "https://images.pexels.com/photos/415829/pexels-photo-415829.jpeg?auto=compress&cs=tinysrgb&w=600&h=400&fit=crop".to_string(),
            ..Default::default()
        }],
        occasions: Vec::new(),
        advertisements: Vec::new(),
    };
    document.normalize();
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_is_normalized() {
        let doc = default_document();
        assert_eq!(doc.banners.len(), 1);
        let services = doc.category_by_slug("services").expect("bundled category");
        assert_eq!(services.header_image(), services.image);
        assert_eq!(services.header_image.as_deref(), Some(services.image.as_str()));
        assert!(doc.occasion_by_slug("weddings").is_none());
    }

    #[test]
    fn test_normalize_keeps_explicit_header_image() {
        let mut doc = StudioDocument {
            categories: vec![Category {
                id: "c".to_string(),
                name: "Albums".to_string(),
                image: "card.jpg".to_string(),
                header_image: Some("header.jpg".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        doc.normalize();
        assert_eq!(doc.categories[0].header_image(), "header.jpg");
    }

    #[test]
    fn test_lenient_decode_skips_only_bad_records() {
        let value = serde_json::json!({
            "banners": [],
            "categories": [
                {"id": "c1", "name": "Albums", "image": "a.jpg"},
                {"id": 7}
            ],
            "occasions": [],
            "advertisements": [
                {"id": "ad1", "title": "Side", "position": "sidebar"},
                {"id": "ad2", "title": "Top", "position": "home-top"}
            ]
        });
        let (doc, skipped) = StudioDocument::from_value_lenient(&value);
        assert_eq!(skipped, 2);
        assert_eq!(doc.categories.len(), 1);
        assert_eq!(doc.categories[0].name, "Albums");
        assert_eq!(doc.advertisements.len(), 1);
        assert_eq!(doc.advertisements[0].id, "ad2");
    }

    #[test]
    fn test_advertisement_edits() {
        let mut doc = StudioDocument::default();
        let id = doc.upsert_advertisement(Advertisement {
            title: "Frames sale".to_string(),
            active: true,
            ..Default::default()
        });
        assert!(!id.is_empty());
        assert_eq!(doc.advertisements.len(), 1);

        let mut edited = doc.advertisements[0].clone();
        edited.title = "Frames sale ends Sunday".to_string();
        assert_eq!(doc.upsert_advertisement(edited), id);
        assert_eq!(doc.advertisements.len(), 1);
        assert_eq!(doc.advertisements[0].title, "Frames sale ends Sunday");

        assert_eq!(doc.toggle_advertisement(&id), Some(false));
        assert_eq!(doc.toggle_advertisement("missing"), None);
        assert!(doc.remove_advertisement(&id));
        assert!(!doc.remove_advertisement(&id));
        assert!(doc.advertisements.is_empty());
    }
}
