use std::fmt;

use serde::{Deserialize, Serialize};

use super::Identified;

/// Fixed placement slots for advertisements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdPosition {
    HomeTop,
    #[default]
    HomeMiddle,
    HomeBottom,
    CategoryTop,
    CategoryBottom,
    Floating,
}

impl AdPosition {
    pub const ALL: [AdPosition; 6] = [
        AdPosition::HomeTop,
        AdPosition::HomeMiddle,
        AdPosition::HomeBottom,
        AdPosition::CategoryTop,
        AdPosition::CategoryBottom,
        AdPosition::Floating,
    ];

    /// Wire names of every slot, in `ALL` order.
    pub const NAMES: [&'static str; 6] = [
        "home-top",
        "home-middle",
        "home-bottom",
        "category-top",
        "category-bottom",
        "floating",
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdPosition::HomeTop => "home-top",
            AdPosition::HomeMiddle => "home-middle",
            AdPosition::HomeBottom => "home-bottom",
            AdPosition::CategoryTop => "category-top",
            AdPosition::CategoryBottom => "category-bottom",
            AdPosition::Floating => "floating",
        }
    }
}

impl fmt::Display for AdPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placement ad. Only the legacy local document carries these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Advertisement {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(rename = "redirectLink", default)]
    pub redirect_link: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub position: AdPosition,
}

impl Identified for Advertisement {
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
    fn test_position_wire_names() {
        for position in AdPosition::ALL {
            let json = serde_json::to_string(&position).expect("position serializes");
            assert_eq!(json, format!("\"{}\"", position.as_str()));
        }
        let ad: Advertisement = serde_json::from_str(
            r#"{"id":"ad1","title":"Wedding Packages","image":"x","redirectLink":"https://x","active":true,"position":"floating"}"#,
        )
        .expect("ad should parse");
        assert_eq!(ad.position, AdPosition::Floating);
    }

    #[test]
    fn test_names_match_positions() {
        for (position, name) in AdPosition::ALL.iter().zip(AdPosition::NAMES) {
            assert_eq!(position.as_str(), name);
            assert_eq!(AdPosition::from_name(name), Some(*position));
        }
        assert_eq!(AdPosition::from_name("sidebar"), None);
    }
}
