use serde::{Deserialize, Serialize};

use super::{Identified, Record, Resource};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Occasion {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(
        rename = "redirectLink",
        alias = "link",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub redirect_link: Option<String>,
}

impl Occasion {
    /// Outbound link, if one is set and non-empty.
    pub fn outbound_link(&self) -> Option<&str> {
        self.redirect_link.as_deref().filter(|l| !l.is_empty())
    }
}

impl Record for Occasion {
    const RESOURCE: Resource = Resource::Occasions;
}

impl Identified for Occasion {
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
