//! Product catalog: categories and the sub-categories listed under them.
//!
//! The REST server stores sub-categories in their own collection and
//! points at the parent through `categoryId`. The legacy document embeds
//! them inside each category instead; both shapes deserialize here.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Identified, Record, Resource};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "isFeatured", default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(rename = "headerImage", default, skip_serializing_if = "Option::is_none")]
    pub header_image: Option<String>,
    /// Embedded children (legacy document shape only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<SubCategory>,
}

impl Category {
    pub fn is_featured(&self) -> bool {
        self.is_featured.unwrap_or(false)
    }

    /// Image for the category page header, defaulting to the card image.
    pub fn header_image(&self) -> &str {
        match self.header_image {
            Some(ref h) if !h.is_empty() => h,
            _ => &self.image,
        }
    }

    pub fn matches_slug(&self, slug: &str) -> bool {
        self.slug.as_deref() == Some(slug)
    }
}

impl Record for Category {
    const RESOURCE: Resource = Resource::Categories;
}

impl Identified for Category {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn label(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubCategory {
    #[serde(default)]
    pub id: String,
    /// Weak reference to the parent category; empty when embedded.
    #[serde(rename = "categoryId", default, skip_serializing_if = "String::is_empty")]
    pub category_id: String,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub image: String,
    #[serde(rename = "externalUrl", alias = "redirectLink", default)]
    pub external_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

impl SubCategory {
    pub fn belongs_to(&self, category_id: &str) -> bool {
        self.category_id == category_id
    }
}

impl Record for SubCategory {
    const RESOURCE: Resource = Resource::SubCategories;
}

impl Identified for SubCategory {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// Sub-categories whose parent no longer exists.
///
/// Deleting a category leaves its children in place; admin views list
/// them so they can be reassigned or removed by hand.
pub fn orphaned_subcategories<'a>(
    categories: &[Category],
    subcategories: &'a [SubCategory],
) -> Vec<&'a SubCategory> {
    let known: HashSet<&str> = categories.iter().map(|c| c.id.as_str()).collect();
    subcategories
        .iter()
        .filter(|s| !known.contains(s.category_id.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(id: &str, category_id: &str) -> SubCategory {
        SubCategory {
            id: id.to_string(),
            category_id: category_id.to_string(),
            name: format!("Item {}", id),
            external_url: "https://photoland.in/p".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_legacy_category_with_embedded_subcategories() {
        let json = r#"{
            "id": "c1",
            "title": "Photo Frames",
            "description": "Wooden and acrylic frames",
            "slug": "photo-frames",
            "image": "https://x/frames.jpg",
            "subcategories": [
                {"id": "s1", "title": "Wall Frames", "description": "", "image": "https://x/w.jpg", "redirectLink": "https://photoland.in/wall"}
            ]
        }"#;
        let category: Category = serde_json::from_str(json).expect("legacy category should parse");
        assert_eq!(category.name, "Photo Frames");
        assert!(category.matches_slug("photo-frames"));
        assert_eq!(category.header_image(), "https://x/frames.jpg");
        assert_eq!(category.subcategories.len(), 1);
        assert_eq!(category.subcategories[0].external_url, "https://photoland.in/wall");
        assert!(category.subcategories[0].category_id.is_empty());
    }

    #[test]
    fn test_parse_server_subcategory() {
        let json = r#"{"id":"a","categoryId":"1","name":"Classic Album","image":"https://x/a.jpg","externalUrl":"https://photoland.in/a","price":"₹499"}"#;
        let parsed: SubCategory = serde_json::from_str(json).expect("sub-category should parse");
        assert!(parsed.belongs_to("1"));
        assert_eq!(parsed.price.as_deref(), Some("₹499"));
        assert_eq!(parsed.description, None);
    }

    #[test]
    fn test_orphaned_subcategories_after_category_delete() {
        let categories = vec![Category {
            id: "1".to_string(),
            name: "Photo Frames".to_string(),
            ..Default::default()
        }];
        let subs = vec![sub("a", "1"), sub("b", "2")];
        let orphans = orphaned_subcategories(&categories, &subs);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].id, "b");
    }
}
