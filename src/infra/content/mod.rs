//! Content API boundary.
//!
//! Posts live in a hosted headless-CMS service; this module owns the trait
//! the rest of the crate programs against, the production HTTP client, and
//! an in-process backend for tests and demo deployments.

mod hosted;
mod memory;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::posts::Post;

pub use hosted::HostedContentClient;
pub use memory::{MemoryContentRepo, demo_posts};

/// One full-text search hit as the service returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub post: Post,
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("content service returned status {status} for {path}")]
    Status { status: u16, path: String },
    #[error("content service url is invalid: {0}")]
    Url(#[from] url::ParseError),
}

/// The working-set contract with the content service. Every call may fail
/// with a transport error; callers convert that at the route boundary.
#[async_trait]
pub trait ContentRepo: Send + Sync {
    /// The full working set, fetched fresh per request.
    async fn get_all_posts(&self) -> Result<Vec<Post>, ContentError>;

    /// Single lookup; `None` maps to a 404 upstream.
    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>, ContentError>;

    /// Best-effort content-similarity recommendations.
    async fn get_similar_posts_by_hash(
        &self,
        hash: &str,
        limit: usize,
    ) -> Result<Vec<Post>, ContentError>;

    /// Full-text search over post bodies.
    async fn search_posts(&self, query: &str) -> Result<Vec<SearchHit>, ContentError>;

    /// Suggestion strings for the search box.
    async fn search_autocomplete(&self, query: &str) -> Result<Vec<String>, ContentError>;
}
