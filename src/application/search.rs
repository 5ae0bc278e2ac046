//! Search and tag-filter logic.

use std::sync::Arc;

use crate::domain::classify::is_project;
use crate::domain::posts::Post;
use crate::infra::content::{ContentError, ContentRepo, SearchHit};

/// Minimum query length before the autocomplete endpoint talks to the
/// content service at all.
pub const AUTOCOMPLETE_MIN_CHARS: usize = 2;

/// Rating figures shown on project cards when the service has none yet.
const DEFAULT_RATING: f64 = 4.5;
const DEFAULT_REVIEW_COUNT: u32 = 12;

/// Whether a post matches a free-text tag query.
///
/// Intentionally loose: case-insensitive substring containment over the tags
/// array, category, type, title, name, and the full plain-text body, so
/// "veget" matches a `vegetarian` tag and "cat" matches "category". Tokenized
/// matching is the content service's job; this filter backs the tag pages.
pub fn matches_tag(post: &Post, tag: &str) -> bool {
    let needle = tag.to_lowercase();
    if needle.is_empty() {
        return false;
    }

    let contains = |field: Option<&str>| {
        field.is_some_and(|value| value.to_lowercase().contains(&needle))
    };

    post.frontmatter
        .tags
        .iter()
        .any(|t| t.to_lowercase().contains(&needle))
        || contains(post.frontmatter.category.as_deref())
        || contains(post.frontmatter.kind.as_deref())
        || contains(post.title.as_deref())
        || contains(post.frontmatter.title.as_deref())
        || contains(post.frontmatter.name.as_deref())
        || contains(post.plain.as_deref())
}

/// Turn a raw search hit into a display-ready post: resolve the title
/// fallback chain onto the record, and give project hits placeholder rating
/// figures when the service returned none.
fn normalize_hit(hit: SearchHit) -> Post {
    let mut post = hit.post;
    if post.title.is_none() {
        post.title = Some(post.display_title().to_string());
    }
    if is_project(&post) {
        post.rating = post.rating.or(Some(DEFAULT_RATING));
        post.review_count = post.review_count.or(Some(DEFAULT_REVIEW_COUNT));
        post.avg_rating = post.avg_rating.or(post.rating);
    }
    post
}

/// Full-text search over the content service, with the short-circuits the
/// routes rely on applied before any network call.
#[derive(Clone)]
pub struct SearchService {
    content: Arc<dyn ContentRepo>,
}

impl SearchService {
    pub fn new(content: Arc<dyn ContentRepo>) -> Self {
        Self { content }
    }

    /// Full-text search. An empty (or all-whitespace) query returns no hits
    /// without calling the service.
    pub async fn search(&self, query: &str) -> Result<Vec<Post>, ContentError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let hits = self.content.search_posts(query).await?;
        Ok(hits.into_iter().map(normalize_hit).collect())
    }

    /// Suggestion strings for the search box. Queries shorter than
    /// [`AUTOCOMPLETE_MIN_CHARS`] short-circuit to an empty list.
    pub async fn autocomplete(&self, query: &str) -> Result<Vec<String>, ContentError> {
        let query = query.trim();
        if query.chars().count() < AUTOCOMPLETE_MIN_CHARS {
            return Ok(Vec::new());
        }
        self.content.search_autocomplete(query).await
    }
}
