//! Page-level feed aggregation.
//!
//! `FeedService` fetches the working set fresh per request and composes the
//! domain feeds into per-page view contexts. Nothing here holds state across
//! calls.

use std::sync::Arc;

use thiserror::Error;

use crate::application::archive::{YearGroup, group_by_year};
use crate::application::home::{featured_posts, shuffle_posts};
use crate::application::pagination::PageBounds;
use crate::application::search::matches_tag;
use crate::domain::feed::{non_projects, process_posts, projects};
use crate::domain::posts::Post;
use crate::infra::content::{ContentError, ContentRepo};

/// How many similar-post recommendations a detail page asks for.
const SIMILAR_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Content(#[from] ContentError),
}

/// Homepage context: both feeds shuffled per request, the featured trio, and
/// the year archive over the projects.
pub struct HomeContext {
    pub projects: Vec<Post>,
    pub articles: Vec<Post>,
    pub featured: Vec<Post>,
    pub year_groups: Vec<YearGroup>,
}

pub struct ProjectsContext {
    pub year_groups: Vec<YearGroup>,
}

/// One page of a flat listing.
pub struct ListingContext {
    pub posts: Vec<Post>,
    pub bounds: PageBounds,
}

pub struct TagContext {
    pub tag: String,
    pub posts: Vec<Post>,
}

pub struct PostDetail {
    pub post: Post,
    pub similar: Vec<Post>,
}

#[derive(Clone)]
pub struct FeedService {
    content: Arc<dyn ContentRepo>,
    page_size: usize,
    backfill_year: i32,
}

impl FeedService {
    pub fn new(content: Arc<dyn ContentRepo>, page_size: usize, backfill_year: i32) -> Self {
        Self {
            content,
            page_size,
            backfill_year,
        }
    }

    pub async fn home_context(&self) -> Result<HomeContext, FeedError> {
        let posts = self.content.get_all_posts().await?;

        let projects = shuffle_posts(&projects(&posts));
        let articles = shuffle_posts(&non_projects(&posts));
        let featured = featured_posts(&projects, self.backfill_year);
        let year_groups = group_by_year(&projects);

        Ok(HomeContext {
            projects,
            articles,
            featured,
            year_groups,
        })
    }

    pub async fn projects_context(&self) -> Result<ProjectsContext, FeedError> {
        let posts = self.content.get_all_posts().await?;
        Ok(ProjectsContext {
            year_groups: group_by_year(&projects(&posts)),
        })
    }

    pub async fn project_list_context(&self, page: usize) -> Result<ListingContext, FeedError> {
        let posts = self.content.get_all_posts().await?;
        Ok(self.paginate(projects(&posts), page))
    }

    pub async fn article_list_context(&self, page: usize) -> Result<ListingContext, FeedError> {
        let posts = self.content.get_all_posts().await?;
        Ok(self.paginate(non_projects(&posts), page))
    }

    fn paginate(&self, feed: Vec<Post>, page: usize) -> ListingContext {
        let bounds = PageBounds::compute(feed.len(), page, self.page_size);
        ListingContext {
            posts: bounds.slice(&feed).to_vec(),
            bounds,
        }
    }

    /// Posts matching a free-text tag, date-descending. The featured tier
    /// does not apply on tag pages.
    pub async fn tag_context(&self, tag: &str) -> Result<TagContext, FeedError> {
        let posts = self.content.get_all_posts().await?;
        let matched: Vec<Post> = posts.iter().filter(|p| matches_tag(p, tag)).cloned().collect();
        let mut matched = process_posts(&matched);
        matched.sort_by(|a, b| b.sort_date().cmp(&a.sort_date()));

        Ok(TagContext {
            tag: tag.to_string(),
            posts: matched,
        })
    }

    /// Slug lookup plus best-effort similar posts. A failed similarity fetch
    /// degrades to an empty list rather than failing the page.
    pub async fn post_detail(&self, slug: &str) -> Result<Option<PostDetail>, FeedError> {
        let Some(post) = self.content.get_post_by_slug(slug).await? else {
            return Ok(None);
        };

        let similar = match &post.hash {
            Some(hash) => match self
                .content
                .get_similar_posts_by_hash(hash, SIMILAR_LIMIT)
                .await
            {
                Ok(similar) => similar,
                Err(error) => {
                    tracing::warn!(%slug, %error, "similar-post lookup failed, continuing without");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        Ok(Some(PostDetail { post, similar }))
    }

    /// Year-scoped slug lookup. When the post records a year (or edition)
    /// that differs from the URL segment, the lookup misses; a post with no
    /// recorded year is reachable under any year.
    pub async fn year_post_detail(
        &self,
        year: &str,
        slug: &str,
    ) -> Result<Option<PostDetail>, FeedError> {
        let Some(detail) = self.post_detail(slug).await? else {
            return Ok(None);
        };

        if let Some(recorded) = detail.post.recorded_year() {
            if recorded.to_segment() != year {
                return Ok(None);
            }
        }

        Ok(Some(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::posts::YearValue;
    use crate::infra::content::MemoryContentRepo;

    fn project(slug: &str, year: i64, date: &str) -> Post {
        let mut p = Post {
            slug: slug.into(),
            original_file_path: format!("projects/{year}/{slug}.md"),
            hash: Some(format!("hash-{slug}")),
            ..Post::default()
        };
        p.frontmatter.year = Some(YearValue::Number(year));
        p.frontmatter.date = Some(date.into());
        p
    }

    fn article(slug: &str, date: &str) -> Post {
        let mut p = Post {
            slug: slug.into(),
            original_file_path: format!("articles/history/{slug}.md"),
            ..Post::default()
        };
        p.frontmatter.date = Some(date.into());
        p
    }

    fn service(posts: Vec<Post>, page_size: usize) -> FeedService {
        FeedService::new(Arc::new(MemoryContentRepo::new(posts)), page_size, 2024)
    }

    #[tokio::test]
    async fn home_context_partitions_the_working_set() {
        let svc = service(
            vec![
                project("p1", 2024, "2024-01-01"),
                project("p2", 2023, "2023-01-01"),
                article("a1", "2024-02-01"),
            ],
            200,
        );

        let home = svc.home_context().await.unwrap();
        assert_eq!(home.projects.len(), 2);
        assert_eq!(home.articles.len(), 1);
        assert_eq!(home.year_groups.len(), 2);
    }

    #[tokio::test]
    async fn listings_paginate_with_clamping() {
        let posts: Vec<Post> = (0..5)
            .map(|i| project(&format!("p{i}"), 2024, "2024-01-01"))
            .collect();
        let svc = service(posts, 2);

        let page = svc.project_list_context(9).await.unwrap();
        assert_eq!(page.bounds.current_page, 3);
        assert_eq!(page.posts.len(), 1);
        assert!(page.bounds.has_previous_page);
        assert!(!page.bounds.has_next_page);
    }

    #[tokio::test]
    async fn tag_pages_sort_by_date_ignoring_featured() {
        let mut featured = article("feat", "2024-01-01");
        featured.frontmatter.featured = true;
        featured.frontmatter.tags = vec!["light".into()];
        let mut plain = article("plain", "2024-06-01");
        plain.frontmatter.tags = vec!["light".into()];
        let unrelated = article("other", "2024-07-01");

        let svc = service(vec![featured, plain, unrelated], 200);
        let ctx = svc.tag_context("light").await.unwrap();
        let slugs: Vec<&str> = ctx.posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["plain", "feat"]);
    }

    #[tokio::test]
    async fn detail_pages_carry_similar_posts() {
        let svc = service(
            vec![
                project("p1", 2024, "2024-01-01"),
                project("p2", 2024, "2024-02-01"),
            ],
            200,
        );

        let detail = svc.post_detail("p1").await.unwrap().unwrap();
        assert_eq!(detail.post.slug, "p1");
        assert_eq!(detail.similar.len(), 1);
        assert_eq!(detail.similar[0].slug, "p2");

        assert!(svc.post_detail("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn year_mismatch_hides_the_post() {
        let svc = service(vec![project("p1", 2024, "2024-01-01")], 200);

        assert!(svc.year_post_detail("2024", "p1").await.unwrap().is_some());
        assert!(svc.year_post_detail("2023", "p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn posts_without_a_recorded_year_match_any_year_segment() {
        let svc = service(vec![article("a1", "2024-01-01")], 200);
        assert!(svc.year_post_detail("1999", "a1").await.unwrap().is_some());
    }
}
