//! Route table for the storefront and the admin area.

use std::fmt;

use crate::models::Collection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Category { slug: String },
    SubCategories { category_id: String },
    Occasion { slug: String },
    Products,
    About,
    Contact,
    AdminLogin,
    AdminDashboard,
    Admin(Collection),
    NotFound(String),
}

impl Route {
    /// Parse a path. Query strings, fragments and trailing slashes are
    /// ignored; anything unrecognised is `NotFound`.
    pub fn parse(path: &str) -> Route {
        let clean = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let segments: Vec<&str> = clean.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["category", slug] => Route::Category {
                slug: slug.to_string(),
            },
            ["subcategories", category_id] => Route::SubCategories {
                category_id: category_id.to_string(),
            },
            ["occasion", slug] => Route::Occasion {
                slug: slug.to_string(),
            },
            ["products"] => Route::Products,
            ["about"] => Route::About,
            ["contact"] => Route::Contact,
            ["admin", "login"] | ["cms", "login"] => Route::AdminLogin,
            ["admin"] | ["admin", "dashboard"] | ["cms"] => Route::AdminDashboard,
            ["admin", name] => match Collection::from_path(name) {
                Some(collection) => Route::Admin(collection),
                None => Route::NotFound(path.to_string()),
            },
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Category { slug } => format!("/category/{}", slug),
            Route::SubCategories { category_id } => format!("/subcategories/{}", category_id),
            Route::Occasion { slug } => format!("/occasion/{}", slug),
            Route::Products => "/products".to_string(),
            Route::About => "/about".to_string(),
            Route::Contact => "/contact".to_string(),
            Route::AdminLogin => "/admin/login".to_string(),
            Route::AdminDashboard => "/admin".to_string(),
            Route::Admin(collection) => format!("/admin/{}", collection.path()),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Admin pages other than the login page need a signed-in admin.
    pub fn requires_admin(&self) -> bool {
        matches!(self, Route::AdminDashboard | Route::Admin(_))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Resource;

    #[test]
    fn test_storefront_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(
            Route::parse("/category/photo-frames"),
            Route::Category {
                slug: "photo-frames".to_string()
            }
        );
        assert_eq!(
            Route::parse("/subcategories/1?ref=home"),
            Route::SubCategories {
                category_id: "1".to_string()
            }
        );
        assert_eq!(Route::parse("/about/"), Route::About);
    }

    #[test]
    fn test_admin_routes_and_guard() {
        assert_eq!(
            Route::parse("/admin/offers"),
            Route::Admin(Collection::Remote(Resource::Offers))
        );
        assert_eq!(
            Route::parse("/admin/advertisements"),
            Route::Admin(Collection::Advertisements)
        );
        assert_eq!(Route::parse("/admin/dashboard"), Route::AdminDashboard);
        assert!(Route::parse("/admin/subcategories").requires_admin());
        assert!(!Route::AdminLogin.requires_admin());
        assert!(!Route::Home.requires_admin());
    }

    #[test]
    fn test_unknown_paths() {
        assert_eq!(
            Route::parse("/admin/coupons"),
            Route::NotFound("/admin/coupons".to_string())
        );
        assert!(matches!(Route::parse("/category"), Route::NotFound(_)));
        assert!(matches!(Route::parse("/a/b/c"), Route::NotFound(_)));
    }

    #[test]
    fn test_path_renders_back() {
        for path in ["/", "/category/albums", "/occasion/diwali", "/admin/banners", "/admin"] {
            assert_eq!(Route::parse(path).path(), path);
        }
    }
}
