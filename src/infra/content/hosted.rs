use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ContentSettings;
use crate::domain::posts::Post;

use super::{ContentError, ContentRepo, SearchHit};

/// HTTP client for the hosted content service.
///
/// Project id and optional revision pin are baked into every request path;
/// the service resolves a missing revision to the latest release.
#[derive(Debug, Clone)]
pub struct HostedContentClient {
    http: reqwest::Client,
    base_url: Url,
    project_id: String,
    revision: String,
}

impl HostedContentClient {
    pub fn new(settings: &ContentSettings) -> Result<Self, ContentError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.clone(),
            project_id: settings.project_id.clone(),
            revision: settings
                .revision
                .clone()
                .unwrap_or_else(|| "latest".to_string()),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ContentError> {
        let full = format!(
            "projects/{}/{}/{}",
            self.project_id,
            self.revision,
            path.trim_start_matches('/')
        );
        Ok(self.base_url.join(&full)?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ContentError> {
        let url = self.endpoint(path)?;
        let response = self.http.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ContentRepo for HostedContentClient {
    async fn get_all_posts(&self) -> Result<Vec<Post>, ContentError> {
        self.get_json("posts", &[]).await
    }

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>, ContentError> {
        let path = format!("posts/slug/{slug}");
        let url = self.endpoint(&path)?;
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ContentError::Status {
                status: status.as_u16(),
                path,
            });
        }

        Ok(Some(response.json().await?))
    }

    async fn get_similar_posts_by_hash(
        &self,
        hash: &str,
        limit: usize,
    ) -> Result<Vec<Post>, ContentError> {
        let limit = limit.to_string();
        self.get_json(&format!("posts/similar/{hash}"), &[("limit", limit.as_str())])
            .await
    }

    async fn search_posts(&self, query: &str) -> Result<Vec<SearchHit>, ContentError> {
        self.get_json("search", &[("q", query)]).await
    }

    async fn search_autocomplete(&self, query: &str) -> Result<Vec<String>, ContentError> {
        self.get_json("search/autocomplete", &[("q", query)]).await
    }
}
