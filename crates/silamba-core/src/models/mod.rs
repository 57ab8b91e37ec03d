//! Data models for the studio catalog.
//!
//! All records are flat and serialize with the camelCase field names used
//! by the REST server and by the legacy local document:
//!
//! - `Banner`: Hero/promo banner with desktop and mobile artwork
//! - `Category`, `SubCategory`: Product catalog tree
//! - `Occasion`: Seasonal occasions with an outbound link
//! - `Offer`: Homepage deals with optional coupon code
//! - `Advertisement`: Placement-slot ads (legacy document only)

pub mod advertisement;
pub mod banner;
pub mod catalog;
pub mod occasion;
pub mod offer;
pub mod resource;

pub use advertisement::{AdPosition, Advertisement};
pub use banner::Banner;
pub use catalog::{orphaned_subcategories, Category, SubCategory};
pub use occasion::Occasion;
pub use offer::Offer;
pub use resource::{new_record_id, Collection, Identified, Record, Resource};
