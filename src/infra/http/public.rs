use std::sync::Arc;

use axum::{
    Form, Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{
        Request, StatusCode,
        header::{CONTENT_TYPE, LOCATION},
    },
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    application::{
        error::{CONTENT_UNAVAILABLE, ErrorReport, HttpError},
        feed::{FeedError, FeedService, HomeContext, ListingContext, PostDetail},
        forms::{FormService, SUGGESTION_KINDS},
        home::FEATURED_COUNT,
        search::SearchService,
        sitemap,
    },
    config::SiteSettings,
    infra::content::ContentRepo,
    presentation::views::{
        BrandView, ErrorPageView, ErrorTemplate, FooterView, FormOutcomeView, HomePageContext,
        IndexTemplate, LayoutContext, ListingPageContext, ListingTemplate, NavigationLinkView,
        NavigationView, PageMetaView, PostCard, PostPageContext, PostTemplate, ProjectsPageContext,
        ProjectsTemplate, SearchPageContext, SearchTemplate, SiteChrome, SuggestPageContext,
        SuggestTemplate, TagPageContext, TagTemplate, post_card, post_cards,
        render_not_found_response, render_template_response, title_case, year_group_views,
    },
};

use super::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<FeedService>,
    pub search: Arc<SearchService>,
    pub forms: Arc<FormService>,
    pub content: Arc<dyn ContentRepo>,
    pub site: SiteSettings,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/projects", get(projects))
        .route("/projects/all", get(projects_all))
        .route("/projects/articles", get(projects_articles))
        .route("/projects/{tag}", get(tag_index))
        .route("/{year}/{slug}", get(year_post_detail))
        .route("/blog/{slug}", get(blog_redirect))
        .route("/search", get(search_page))
        .route("/api/search/autocomplete", get(autocomplete))
        .route("/sitemap.xml", get(sitemap_xml))
        .route("/robots.txt", get(robots_txt))
        .route("/suggest", get(suggest_page).post(suggest_submit))
        .route("/newsletter", post(newsletter_submit))
        .fallback(fallback_router)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

fn site_chrome(site: &SiteSettings) -> SiteChrome {
    SiteChrome {
        brand: BrandView {
            title: site.name.clone(),
            href: "/".to_string(),
        },
        navigation: NavigationView {
            entries: vec![
                NavigationLinkView {
                    label: "Projects".to_string(),
                    href: "/projects".to_string(),
                },
                NavigationLinkView {
                    label: "Articles".to_string(),
                    href: "/projects/articles".to_string(),
                },
                NavigationLinkView {
                    label: "Search".to_string(),
                    href: "/search".to_string(),
                },
                NavigationLinkView {
                    label: "Suggest".to_string(),
                    href: "/suggest".to_string(),
                },
            ],
        },
        footer: FooterView {
            copy: format!("{} — {}", site.name, site.description),
        },
        meta: PageMetaView {
            title: site.name.clone(),
            description: site.description.clone(),
            canonical: site.public_url.clone(),
        },
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageQuery {
    page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchQuery {
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsletterForm {
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct SuggestForm {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    email: String,
}

async fn index(State(state): State<AppState>) -> Response {
    let chrome = site_chrome(&state.site);

    match state.feed.home_context().await {
        Ok(content) => {
            let canonical = canonical_url(&state.site.public_url, "/");
            let view = LayoutContext::new(
                chrome.with_canonical(canonical),
                home_page_context(content),
            );
            render_template_response(IndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => feed_error_to_response(err, chrome),
    }
}

fn home_page_context(content: HomeContext) -> HomePageContext {
    // The featured strip only renders at full strength; a partial strip
    // looks broken, so the template gets an explicit guard.
    let show_featured = content.featured.len() >= FEATURED_COUNT;
    HomePageContext {
        featured: post_cards(&content.featured),
        show_featured,
        projects: post_cards(&content.projects),
        articles: post_cards(&content.articles),
        year_groups: year_group_views(&content.year_groups),
    }
}

async fn projects(State(state): State<AppState>) -> Response {
    let chrome = site_chrome(&state.site);

    match state.feed.projects_context().await {
        Ok(content) => {
            let canonical = canonical_url(&state.site.public_url, "/projects");
            let view = LayoutContext::new(
                chrome.with_canonical(canonical),
                ProjectsPageContext {
                    year_groups: year_group_views(&content.year_groups),
                },
            );
            render_template_response(ProjectsTemplate { view }, StatusCode::OK)
        }
        Err(err) => feed_error_to_response(err, chrome),
    }
}

async fn projects_all(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Response {
    let page = query.page.unwrap_or(1);
    let chrome = site_chrome(&state.site);

    match state.feed.project_list_context(page).await {
        Ok(content) => render_listing(
            &state,
            chrome,
            content,
            "All Projects".to_string(),
            "/projects/all".to_string(),
        ),
        Err(err) => feed_error_to_response(err, chrome),
    }
}

async fn projects_articles(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Response {
    let page = query.page.unwrap_or(1);
    let chrome = site_chrome(&state.site);

    match state.feed.article_list_context(page).await {
        Ok(content) => render_listing(
            &state,
            chrome,
            content,
            "Articles & Essays".to_string(),
            "/projects/articles".to_string(),
        ),
        Err(err) => feed_error_to_response(err, chrome),
    }
}

fn render_listing(
    state: &AppState,
    chrome: SiteChrome,
    content: ListingContext,
    heading: String,
    base_path: String,
) -> Response {
    let canonical = canonical_url(&state.site.public_url, &base_path);
    let page = ListingPageContext::new(
        heading,
        base_path,
        post_cards(&content.posts),
        content.bounds,
    );
    let view = LayoutContext::new(chrome.with_canonical(canonical), page);
    render_template_response(ListingTemplate { view }, StatusCode::OK)
}

async fn tag_index(State(state): State<AppState>, Path(tag): Path<String>) -> Response {
    let chrome = site_chrome(&state.site);

    match state.feed.tag_context(&tag).await {
        Ok(content) => {
            let canonical = canonical_url(&state.site.public_url, &format!("/projects/{tag}"));
            let view = LayoutContext::new(
                chrome.with_canonical(canonical),
                TagPageContext {
                    heading: title_case(&content.tag),
                    tag: content.tag,
                    posts: post_cards(&content.posts),
                },
            );
            render_template_response(TagTemplate { view }, StatusCode::OK)
        }
        Err(err) => feed_error_to_response(err, chrome),
    }
}

async fn year_post_detail(
    State(state): State<AppState>,
    Path((year, slug)): Path<(String, String)>,
) -> Response {
    let chrome = site_chrome(&state.site);

    match state.feed.year_post_detail(&year, &slug).await {
        Ok(Some(detail)) => {
            let path = format!("/{year}/{slug}");
            render_post_detail(&state, chrome, detail, &path)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => feed_error_to_response(err, chrome),
    }
}

async fn fallback_router(State(state): State<AppState>, request: Request<Body>) -> Response {
    let slug = request.uri().path().trim_matches('/');
    let chrome = site_chrome(&state.site);

    if slug.is_empty() || slug.contains('/') {
        return render_not_found_response(chrome);
    }

    match state.feed.post_detail(slug).await {
        Ok(Some(detail)) => {
            let path = format!("/{slug}");
            render_post_detail(&state, chrome, detail, &path)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => feed_error_to_response(err, chrome),
    }
}

fn render_post_detail(
    state: &AppState,
    chrome: SiteChrome,
    detail: PostDetail,
    path: &str,
) -> Response {
    let canonical = canonical_url(&state.site.public_url, path);
    let description = detail
        .post
        .frontmatter
        .description
        .as_deref()
        .or(detail.post.first_paragraph_text.as_deref())
        .unwrap_or_default()
        .to_string();
    let content = post_page_context(detail);
    let meta = chrome.meta.clone().with_canonical(canonical).with_content(
        content.title.clone(),
        fallback_description(&description, &state.site.description),
    );
    let view = LayoutContext::new(chrome.with_meta(meta), content);
    render_template_response(PostTemplate { view }, StatusCode::OK)
}

fn post_page_context(detail: PostDetail) -> PostPageContext {
    let card: PostCard = post_card(&detail.post);
    PostPageContext {
        title: card.title,
        published: card.published,
        iso_date: card.iso_date,
        category: card.category,
        tags: detail.post.frontmatter.tags.clone(),
        cover: card.cover,
        body_html: detail.post.html.clone().unwrap_or_default(),
        similar: post_cards(&detail.similar),
    }
}

/// Legacy `/blog/{slug}` URLs moved to bare `/{slug}` permanently; old
/// crawler indexes still carry them, so this answers 301 rather than 308.
async fn blog_redirect(Path(slug): Path<String>) -> Response {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, format!("/{slug}"))
        .body(Body::empty())
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

async fn search_page(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Response {
    let chrome = site_chrome(&state.site);
    let q = query.q.unwrap_or_default();

    match state.search.search(&q).await {
        Ok(results) => {
            let canonical = canonical_url(&state.site.public_url, "/search");
            let view = LayoutContext::new(
                chrome.with_canonical(canonical),
                SearchPageContext {
                    query: q.trim().to_string(),
                    results: post_cards(&results),
                },
            );
            render_template_response(SearchTemplate { view }, StatusCode::OK)
        }
        Err(err) => feed_error_to_response(FeedError::Content(err), chrome),
    }
}

async fn autocomplete(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<String>>, HttpError> {
    let q = query.q.unwrap_or_default();
    let suggestions = state.search.autocomplete(&q).await?;
    Ok(Json(suggestions))
}

async fn sitemap_xml(State(state): State<AppState>) -> Response {
    match state.content.get_all_posts().await {
        Ok(posts) => xml_response(
            sitemap::sitemap_xml(&state.site.public_url, &posts),
            "application/xml",
        ),
        Err(err) => HttpError::new(
            "infra::http::public::sitemap",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate sitemap",
            err.to_string(),
        )
        .into_response(),
    }
}

async fn robots_txt(State(state): State<AppState>) -> Response {
    plain_response(sitemap::robots_txt(&state.site.public_url))
}

async fn suggest_page(State(state): State<AppState>) -> Response {
    render_suggest(&state, None, StatusCode::OK)
}

async fn suggest_submit(
    State(state): State<AppState>,
    Form(form): Form<SuggestForm>,
) -> Response {
    let outcome = state
        .forms
        .suggest(&form.kind, &form.message, &form.email)
        .await;
    let status = if outcome.is_success() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    render_suggest(
        &state,
        Some(FormOutcomeView {
            success: outcome.is_success(),
            message: outcome.message().to_string(),
        }),
        status,
    )
}

async fn newsletter_submit(
    State(state): State<AppState>,
    Form(form): Form<NewsletterForm>,
) -> Response {
    let outcome = state.forms.subscribe(&form.email).await;
    let status = if outcome.is_success() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    render_suggest(
        &state,
        Some(FormOutcomeView {
            success: outcome.is_success(),
            message: outcome.message().to_string(),
        }),
        status,
    )
}

fn render_suggest(state: &AppState, outcome: Option<FormOutcomeView>, status: StatusCode) -> Response {
    let chrome = site_chrome(&state.site);
    let canonical = canonical_url(&state.site.public_url, "/suggest");
    let view = LayoutContext::new(
        chrome.with_canonical(canonical),
        SuggestPageContext {
            kinds: SUGGESTION_KINDS.iter().map(|k| k.to_string()).collect(),
            outcome,
        },
    );
    render_template_response(SuggestTemplate { view }, status)
}

fn feed_error_to_response(err: FeedError, chrome: SiteChrome) -> Response {
    let http_error = HttpError::from(err);
    let status = http_error.status();
    let content = ErrorPageView::unavailable(CONTENT_UNAVAILABLE);
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, status);
    ErrorReport::from_message(
        "infra::http::feed_error_to_response",
        status,
        http_error.public_message(),
    )
    .attach(&mut response);
    response
}

fn fallback_description(candidate: &str, fallback: &str) -> String {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn canonical_url(base: &str, path: &str) -> String {
    let root = format!("{}/", base.trim_end_matches('/'));
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        root
    } else {
        format!("{root}{trimmed}")
    }
}

fn xml_response(body: String, content_type: &str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn plain_response(body: String) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
