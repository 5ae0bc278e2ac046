use async_trait::async_trait;

use crate::domain::feed::sort_posts;
use crate::domain::posts::Post;

use super::{ContentError, ContentRepo, SearchHit};

/// In-process content backend over a fixed set of posts.
///
/// Backs integration tests and demo deployments that run without the hosted
/// service. Search is a plain case-insensitive substring scan, which is
/// enough to exercise every route.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentRepo {
    posts: Vec<Post>,
}

impl MemoryContentRepo {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    /// The built-in demo working set, used when no hosted project is
    /// configured.
    pub fn demo() -> Self {
        Self::new(demo_posts())
    }

    fn matches_query(post: &Post, needle: &str) -> bool {
        let title = post.display_title().to_lowercase();
        if title.contains(needle) {
            return true;
        }
        post.plain
            .as_deref()
            .is_some_and(|body| body.to_lowercase().contains(needle))
    }
}

#[async_trait]
impl ContentRepo for MemoryContentRepo {
    async fn get_all_posts(&self) -> Result<Vec<Post>, ContentError> {
        Ok(self.posts.clone())
    }

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>, ContentError> {
        Ok(self.posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn get_similar_posts_by_hash(
        &self,
        hash: &str,
        limit: usize,
    ) -> Result<Vec<Post>, ContentError> {
        let others: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| p.hash.as_deref() != Some(hash))
            .cloned()
            .collect();
        let mut ordered = sort_posts(others);
        ordered.truncate(limit);
        Ok(ordered)
    }

    async fn search_posts(&self, query: &str) -> Result<Vec<SearchHit>, ContentError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .posts
            .iter()
            .filter(|p| Self::matches_query(p, &needle))
            .cloned()
            .map(|post| SearchHit { post })
            .collect())
    }

    async fn search_autocomplete(&self, query: &str) -> Result<Vec<String>, ContentError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut suggestions = Vec::new();
        for post in &self.posts {
            let title = post.display_title();
            if title.to_lowercase().contains(&needle) && !suggestions.iter().any(|s| s == title) {
                suggestions.push(title.to_string());
            }
            for tag in &post.frontmatter.tags {
                if tag.to_lowercase().contains(&needle) && !suggestions.iter().any(|s| s == tag) {
                    suggestions.push(tag.clone());
                }
            }
        }
        Ok(suggestions)
    }
}

fn demo_post(
    slug: &str,
    path: &str,
    title: &str,
    date: &str,
    body: &str,
    tags: &[&str],
) -> Post {
    let mut post = Post {
        slug: slug.into(),
        original_file_path: path.into(),
        title: Some(title.into()),
        plain: Some(body.into()),
        first_paragraph_text: Some(body.into()),
        html: Some(format!("<p>{body}</p>")),
        hash: Some(format!("demo-{slug}")),
        ..Post::default()
    };
    post.frontmatter.date = Some(date.into());
    post.frontmatter.tags = tags.iter().map(|t| t.to_string()).collect();
    post
}

/// A small fixed working set covering every feed shape: yeared projects,
/// a guide, an article, a featured post, and a hidden one.
pub fn demo_posts() -> Vec<Post> {
    use crate::domain::posts::YearValue;

    let mut harbor = demo_post(
        "harbor-nights",
        "projects/2024/harbor-nights.md",
        "Harbor Nights",
        "2024-05-12",
        "Six weeks on the night shift with the pilots of a container port.",
        &["harbor", "night", "work"],
    );
    harbor.frontmatter.year = Some(YearValue::Number(2024));
    harbor.frontmatter.featured = true;

    let mut floodline = demo_post(
        "floodline",
        "projects/2024/floodline.md",
        "Floodline",
        "2024-02-03",
        "Returning to the same river towns one year after the water left.",
        &["climate", "river"],
    );
    floodline.frontmatter.year = Some(YearValue::Text("2024".into()));

    let mut last_ferry = demo_post(
        "last-ferry",
        "projects/2023/last-ferry.md",
        "The Last Ferry",
        "2023-09-18",
        "A commuter line closes after eighty years of island crossings.",
        &["transport", "island"],
    );
    last_ferry.frontmatter.year = Some(YearValue::Number(2023));

    let guide = demo_post(
        "reading-contact-sheets",
        "articles/guides/craft/reading-contact-sheets.md",
        "Reading Contact Sheets",
        "2024-03-22",
        "What a full contact sheet tells you that the selects never will.",
        &["craft", "editing"],
    );

    let article = demo_post(
        "caption-ethics",
        "articles/history/caption-ethics.md",
        "A Short History of Caption Ethics",
        "2023-11-02",
        "How newsroom caption standards hardened after the wire era.",
        &["ethics", "history"],
    );

    let mut hidden = demo_post(
        "embargoed-essay",
        "articles/history/embargoed-essay.md",
        "Embargoed Essay",
        "2024-01-15",
        "Held back until the subjects clear publication.",
        &[],
    );
    hidden.frontmatter.public = false;

    vec![harbor, floodline, last_ferry, guide, article, hidden]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(slug: &str, title: &str, body: &str, hash: &str) -> Post {
        Post {
            slug: slug.into(),
            title: Some(title.into()),
            plain: Some(body.into()),
            hash: Some(hash.into()),
            ..Post::default()
        }
    }

    #[tokio::test]
    async fn slug_lookup_distinguishes_hit_from_miss() {
        let repo = MemoryContentRepo::new(vec![post("a", "Alpha", "", "h1")]);
        assert!(repo.get_post_by_slug("a").await.unwrap().is_some());
        assert!(repo.get_post_by_slug("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn similar_posts_exclude_the_source_and_honor_the_limit() {
        let repo = MemoryContentRepo::new(vec![
            post("a", "Alpha", "", "h1"),
            post("b", "Beta", "", "h2"),
            post("c", "Gamma", "", "h3"),
        ]);
        let similar = repo.get_similar_posts_by_hash("h1", 1).await.unwrap();
        assert_eq!(similar.len(), 1);
        assert_ne!(similar[0].slug, "a");
    }

    #[tokio::test]
    async fn search_scans_titles_and_bodies_case_insensitively() {
        let repo = MemoryContentRepo::new(vec![
            post("a", "Harbor Lights", "night photography", "h1"),
            post("b", "Inland", "rivers and roads", "h2"),
        ]);
        let hits = repo.search_posts("HARBOR").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].post.slug, "a");

        let hits = repo.search_posts("rivers").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].post.slug, "b");
    }

    #[tokio::test]
    async fn autocomplete_collects_titles_and_tags_without_duplicates() {
        let mut tagged = post("a", "Harbor Lights", "", "h1");
        tagged.frontmatter.tags = vec!["harbor".into(), "night".into()];
        let repo = MemoryContentRepo::new(vec![tagged]);

        let suggestions = repo.search_autocomplete("har").await.unwrap();
        assert_eq!(suggestions, vec!["Harbor Lights".to_string(), "harbor".to_string()]);
    }
}
