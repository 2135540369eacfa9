//! Endpoint categories
//!
//! A category is the first segment of a path template with any path
//! parameter removed: `/users/{id}/posts` belongs to `users`.

/// Compute the category of a path template.
///
/// Returns an empty string for templates without a literal first segment,
/// such as `/` or `/{tenant}/status`.
#[must_use]
pub fn category_of(path: &str) -> &str {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let first_segment = trimmed.split('/').next().unwrap_or("");
    first_segment
        .split_once('{')
        .map_or(first_segment, |(head, _)| head)
}

/// Case-insensitive category comparison used by endpoint filters
#[must_use]
pub fn matches_category(path: &str, category: &str) -> bool {
    let own = category_of(path);
    !own.is_empty() && own.to_lowercase() == category.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_of() {
        assert_eq!(category_of("/users"), "users");
        assert_eq!(category_of("/users/{id}"), "users");
        assert_eq!(category_of("/users/{id}/posts"), "users");
        assert_eq!(category_of("users/{id}"), "users");
        assert_eq!(category_of("/v1{version}/items"), "v1");
        assert_eq!(category_of("/{tenant}/status"), "");
        assert_eq!(category_of("/"), "");
        assert_eq!(category_of(""), "");
    }

    #[test]
    fn test_matches_category() {
        assert!(matches_category("/users/{id}", "users"));
        assert!(matches_category("/users/{id}", "Users"));
        assert!(matches_category("/Users", "USERS"));
        assert!(!matches_category("/orders", "users"));
        assert!(!matches_category("/usersettings", "users"));
        assert!(!matches_category("/", ""));
    }
}
