use serde::{Deserialize, Serialize};

use super::{Identified, Record, Resource};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Free-form label such as "50% OFF".
    #[serde(default)]
    pub discount: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(rename = "isActive", alias = "active", default)]
    pub is_active: bool,
}

impl Offer {
    pub fn code_display(&self) -> &str {
        self.code
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or("No code required")
    }
}

impl Record for Offer {
    const RESOURCE: Resource = Resource::Offers;
}

impl Identified for Offer {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_code_is_not_serialized() {
        let offer = Offer {
            id: "x".to_string(),
            title: "Summer Sale".to_string(),
            image: "https://x/y.jpg".to_string(),
            is_active: true,
            ..Default::default()
        };
        let value = serde_json::to_value(&offer).expect("offer serializes");
        assert!(value.get("code").is_none());
        assert_eq!(offer.code_display(), "No code required");
    }
}
