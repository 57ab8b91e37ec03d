use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// One of the REST collections exposed by the catalog server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Banners,
    Categories,
    SubCategories,
    Occasions,
    Offers,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Banners,
        Resource::Categories,
        Resource::SubCategories,
        Resource::Occasions,
        Resource::Offers,
    ];

    /// Path segment of the collection endpoint (`/banners`, ...).
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Banners => "banners",
            Resource::Categories => "categories",
            Resource::SubCategories => "subcategories",
            Resource::Occasions => "occasions",
            Resource::Offers => "offers",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_matches('/');
        Self::ALL.into_iter().find(|r| r.path() == path)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Resource::Banners => "Banners",
            Resource::Categories => "Categories",
            Resource::SubCategories => "Sub-categories",
            Resource::Occasions => "Occasions",
            Resource::Offers => "Offers",
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            Resource::Banners => "banner",
            Resource::Categories => "category",
            Resource::SubCategories => "sub-category",
            Resource::Occasions => "occasion",
            Resource::Offers => "offer",
        }
    }

    /// Text shown in place of an empty collection.
    pub fn empty_message(&self) -> &'static str {
        match self {
            Resource::Banners => "No banners yet",
            Resource::Categories => "No categories yet",
            Resource::SubCategories => "No sub-categories found",
            Resource::Occasions => "No occasions yet",
            Resource::Offers => "No offers yet",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Anything the admin console edits: one of the REST collections, or
/// the placement ads kept in the local studio document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Remote(Resource),
    Advertisements,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Remote(Resource::Banners),
        Collection::Remote(Resource::Categories),
        Collection::Remote(Resource::SubCategories),
        Collection::Remote(Resource::Occasions),
        Collection::Remote(Resource::Offers),
        Collection::Advertisements,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Collection::Remote(resource) => resource.path(),
            Collection::Advertisements => "advertisements",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_matches('/');
        Self::ALL.into_iter().find(|c| c.path() == path)
    }

    /// The REST collection behind this one, if any.
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Collection::Remote(resource) => Some(*resource),
            Collection::Advertisements => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Collection::Remote(resource) => resource.display_name(),
            Collection::Advertisements => "Advertisements",
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            Collection::Remote(resource) => resource.singular(),
            Collection::Advertisements => "advertisement",
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            Collection::Remote(resource) => resource.empty_message(),
            Collection::Advertisements => "No advertisements yet",
        }
    }
}

impl From<Resource> for Collection {
    fn from(resource: Resource) -> Self {
        Collection::Remote(resource)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A record with a string id and a display label.
pub trait Identified {
    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Human-readable name used in lists and notifications.
    fn label(&self) -> &str;
}

/// A record stored in one of the REST collections.
pub trait Record: Identified + Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const RESOURCE: Resource;
}

/// Generate a client-side id for records the server does not number.
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}
