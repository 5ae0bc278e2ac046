//! Display categories derived from storage-path structure.

use crate::domain::posts::Post;

pub const GENERAL_CATEGORY: &str = "general";

/// Derive a category label from the path layout. Ordered, first match wins:
///
/// 1. `articles/projects/<cat>/…`
/// 2. `articles/countries/<cat>/…`
/// 3. `articles/guides/<cat>/…`
/// 4. `articles/<cat>/…`
///
/// Anything else is `"general"`.
pub fn derive_category(post: &Post) -> &str {
    let path = post.original_file_path.as_str();
    let segments: Vec<&str> = path.split('/').collect();

    if path.starts_with("articles/projects/") && segments.len() > 3 {
        segments[2]
    } else if path.starts_with("articles/countries/") && segments.len() > 2 {
        segments[2]
    } else if path.starts_with("articles/guides/") && segments.len() > 3 {
        segments[2]
    } else if path.starts_with("articles/") && segments.len() > 2 {
        segments[1]
    } else {
        GENERAL_CATEGORY
    }
}

/// Return a copy of the post with `frontmatter.category` filled in from the
/// path when absent. An explicit category is never replaced, which makes the
/// operation idempotent.
pub fn with_category(post: &Post) -> Post {
    let mut copy = post.clone();
    if copy.frontmatter.category.is_none() {
        copy.frontmatter.category = Some(derive_category(post).to_string());
    }
    copy
}
