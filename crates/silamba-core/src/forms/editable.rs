use serde::Serialize;

use crate::models::{
    AdPosition, Advertisement, Banner, Category, Collection, Identified, Occasion, Offer, Resource,
    SubCategory,
};
use crate::utils::slugify;

use super::field::{flag_text, FieldSpec, FieldValues};

/// A record that can be edited through a `RecordForm`.
///
/// `apply_fields` writes the form's values onto an existing record, so
/// fields the form does not show (nested subcategories, legacy extras)
/// survive an edit.
pub trait Editable: Identified + Serialize + Clone + Default + Send + 'static {
    const COLLECTION: Collection;

    const FIELDS: &'static [FieldSpec];

    fn field_value(&self, key: &str) -> String;

    fn apply_fields(&mut self, values: &FieldValues);
}

impl Editable for Banner {
    const COLLECTION: Collection = Collection::Remote(Resource::Banners);

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("title", "Title").required(),
        FieldSpec::text("subtitle", "Subtitle"),
        FieldSpec::text("image", "Image URL").required(),
        FieldSpec::text("mobileImage", "Mobile Image URL"),
        FieldSpec::text("ctaText", "Button Text"),
        FieldSpec::text("ctaLink", "Button Link"),
        FieldSpec::toggle("isActive", "Active", true),
    ];

    fn field_value(&self, key: &str) -> String {
        match key {
            "title" => self.title.clone(),
            "subtitle" => self.subtitle.clone(),
            "image" => self.image.clone(),
            "mobileImage" => self.mobile_image.clone().unwrap_or_default(),
            "ctaText" => self.cta_text.clone(),
            "ctaLink" => self.cta_link.clone(),
            "isActive" => flag_text(self.is_active),
            _ => String::new(),
        }
    }

    fn apply_fields(&mut self, values: &FieldValues) {
        self.title = values.text("title");
        self.subtitle = values.text("subtitle");
        self.image = values.text("image");
        self.mobile_image = values.optional("mobileImage");
        self.cta_text = values.text("ctaText");
        self.cta_link = values.text("ctaLink");
        self.is_active = values.flag("isActive");
    }
}

impl Editable for Category {
    const COLLECTION: Collection = Collection::Remote(Resource::Categories);

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("name", "Name").required(),
        FieldSpec::text("image", "Image URL").required(),
        FieldSpec::text("description", "Description"),
        FieldSpec::text("headerImage", "Header Image URL"),
        FieldSpec::text("slug", "Slug"),
        FieldSpec::toggle("isFeatured", "Featured", false),
    ];

    fn field_value(&self, key: &str) -> String {
        match key {
            "name" => self.name.clone(),
            "image" => self.image.clone(),
            "description" => self.description.clone(),
            "headerImage" => self.header_image.clone().unwrap_or_default(),
            "slug" => self.slug.clone().unwrap_or_default(),
            "isFeatured" => flag_text(self.is_featured()),
            _ => String::new(),
        }
    }

    fn apply_fields(&mut self, values: &FieldValues) {
        self.name = values.text("name");
        self.image = values.text("image");
        self.description = values.text("description");
        self.header_image = values.optional("headerImage");
        self.slug = values
            .optional("slug")
            .or_else(|| Some(slugify(&self.name)).filter(|s| !s.is_empty()));
        self.is_featured = Some(values.flag("isFeatured"));
    }
}

impl Editable for SubCategory {
    const COLLECTION: Collection = Collection::Remote(Resource::SubCategories);

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::category("categoryId", "Parent Category"),
        FieldSpec::text("name", "Name").required(),
        FieldSpec::text("externalUrl", "External Redirect URL").required(),
        FieldSpec::text("image", "Image URL").required(),
        FieldSpec::text("description", "Description"),
        FieldSpec::text("price", "Starting Price"),
    ];

    fn field_value(&self, key: &str) -> String {
        match key {
            "categoryId" => self.category_id.clone(),
            "name" => self.name.clone(),
            "externalUrl" => self.external_url.clone(),
            "image" => self.image.clone(),
            "description" => self.description.clone().unwrap_or_default(),
            "price" => self.price.clone().unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn apply_fields(&mut self, values: &FieldValues) {
        self.category_id = values.text("categoryId");
        self.name = values.text("name");
        self.external_url = values.text("externalUrl");
        self.image = values.text("image");
        self.description = values.optional("description");
        self.price = values.optional("price");
    }
}

impl Editable for Occasion {
    const COLLECTION: Collection = Collection::Remote(Resource::Occasions);

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("name", "Name").required(),
        FieldSpec::text("image", "Image URL").required(),
        FieldSpec::text("description", "Description"),
        FieldSpec::text("slug", "Slug"),
        FieldSpec::text("redirectLink", "Redirect Link"),
    ];

    fn field_value(&self, key: &str) -> String {
        match key {
            "name" => self.name.clone(),
            "image" => self.image.clone(),
            "description" => self.description.clone(),
            "slug" => self.slug.clone().unwrap_or_default(),
            "redirectLink" => self.redirect_link.clone().unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn apply_fields(&mut self, values: &FieldValues) {
        self.name = values.text("name");
        self.image = values.text("image");
        self.description = values.text("description");
        self.slug = values
            .optional("slug")
            .or_else(|| Some(slugify(&self.name)).filter(|s| !s.is_empty()));
        self.redirect_link = values.optional("redirectLink");
    }
}

impl Editable for Offer {
    const COLLECTION: Collection = Collection::Remote(Resource::Offers);

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("title", "Title").required(),
        FieldSpec::text("discount", "Discount Text"),
        FieldSpec::text("description", "Description"),
        FieldSpec::text("image", "Image URL").required(),
        FieldSpec::text("link", "Link"),
        FieldSpec::text("code", "Coupon Code"),
        FieldSpec::toggle("isActive", "Offer Active", true),
    ];

    fn field_value(&self, key: &str) -> String {
        match key {
            "title" => self.title.clone(),
            "discount" => self.discount.clone(),
            "description" => self.description.clone(),
            "image" => self.image.clone(),
            "link" => self.link.clone(),
            "code" => self.code.clone().unwrap_or_default(),
            "isActive" => flag_text(self.is_active),
            _ => String::new(),
        }
    }

    fn apply_fields(&mut self, values: &FieldValues) {
        self.title = values.text("title");
        self.discount = values.text("discount");
        self.description = values.text("description");
        self.image = values.text("image");
        self.link = values.text("link");
        self.code = values.optional("code");
        self.is_active = values.flag("isActive");
    }
}

impl Editable for Advertisement {
    const COLLECTION: Collection = Collection::Advertisements;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("title", "Advertisement Title").required(),
        FieldSpec::text("description", "Description"),
        FieldSpec::text("image", "Image URL"),
        FieldSpec::text("redirectLink", "Redirect Link"),
        FieldSpec::choice("position", "Position", &AdPosition::NAMES, "home-middle"),
        FieldSpec::toggle("active", "Active", true),
    ];

    fn field_value(&self, key: &str) -> String {
        match key {
            "title" => self.title.clone(),
            "description" => self.description.clone(),
            "image" => self.image.clone(),
            "redirectLink" => self.redirect_link.clone(),
            "position" => self.position.as_str().to_string(),
            "active" => flag_text(self.active),
            _ => String::new(),
        }
    }

    fn apply_fields(&mut self, values: &FieldValues) {
        self.title = values.text("title");
        self.description = values.text("description");
        self.image = values.text("image");
        self.redirect_link = values.text("redirectLink");
        self.position = AdPosition::from_name(values.get("position")).unwrap_or_default();
        self.active = values.flag("active");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values_of<T: Editable>(record: &T) -> FieldValues {
        let mut values = FieldValues::blank(T::FIELDS);
        for spec in T::FIELDS {
            values.set(spec.key, record.field_value(spec.key));
        }
        values
    }

    #[test]
    fn test_category_edit_keeps_nested_subcategories() {
        let mut category = Category {
            id: "c1".to_string(),
            name: "Albums".to_string(),
            image: "a.jpg".to_string(),
            subcategories: vec![SubCategory {
                id: "s1".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut values = values_of(&category);
        values.set("name", "Wedding Albums");
        category.apply_fields(&values);

        assert_eq!(category.name, "Wedding Albums");
        assert_eq!(category.subcategories.len(), 1);
        assert_eq!(category.slug.as_deref(), Some("wedding-albums"));
    }

    #[test]
    fn test_every_form_declares_unique_keys() {
        fn check(fields: &[FieldSpec]) {
            for (i, a) in fields.iter().enumerate() {
                assert!(fields[i + 1..].iter().all(|b| b.key != a.key), "duplicate {}", a.key);
            }
        }
        check(Banner::FIELDS);
        check(Category::FIELDS);
        check(SubCategory::FIELDS);
        check(Occasion::FIELDS);
        check(Offer::FIELDS);
        check(Advertisement::FIELDS);
    }

    #[test]
    fn test_advertisement_edit_keeps_id_and_reads_position() {
        let mut ad = Advertisement {
            id: "ad1".to_string(),
            title: "Wedding Packages".to_string(),
            position: AdPosition::Floating,
            active: true,
            ..Default::default()
        };
        let mut values = values_of(&ad);
        assert_eq!(values.get("position"), "floating");
        values.set("position", "category-top");
        values.set("active", "false");
        ad.apply_fields(&values);

        assert_eq!(ad.id, "ad1");
        assert_eq!(ad.position, AdPosition::CategoryTop);
        assert!(!ad.active);
    }

    #[test]
    fn test_subcategory_requires_parent_and_link() {
        let required: Vec<&str> = SubCategory::FIELDS
            .iter()
            .filter(|f| f.required)
            .map(|f| f.key)
            .collect();
        assert_eq!(required, vec!["categoryId", "name", "externalUrl", "image"]);
    }
}
