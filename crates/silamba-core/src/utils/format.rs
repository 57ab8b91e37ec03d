/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Uppercase the first character.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build a URL slug from a title: lowercase ASCII alphanumerics joined by
/// single dashes, with no leading or trailing dash.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("₹₹₹₹₹", 4), "₹...");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("sub-category"), "Sub-category");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Photo Frames"), "photo-frames");
        assert_eq!(slugify("  Wedding & Engagement!! "), "wedding-engagement");
        assert_eq!(slugify("Albums 2024"), "albums-2024");
        assert_eq!(slugify("---"), "");
    }
}
