use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::application::archive::YearGroup;
use crate::application::error::{ErrorReport, HttpError};
use crate::application::pagination::PageBounds;
use crate::application::sitemap::post_path;
use crate::domain::posts::Post;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: SiteChrome) -> Response {
    let content = ErrorPageView::not_found();
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub canonical: String,
}

impl PageMetaView {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self { canonical, ..self }
    }

    pub fn with_content(self, title: String, description: String) -> Self {
        Self {
            title,
            description,
            ..self
        }
    }
}

/// Site-wide layout pieces shared by every page.
#[derive(Clone)]
pub struct SiteChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
}

impl SiteChrome {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self {
            meta: self.meta.with_canonical(canonical),
            ..self
        }
    }

    pub fn with_meta(self, meta: PageMetaView) -> Self {
        Self { meta, ..self }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: SiteChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            content,
        }
    }
}

/// One post as the listing grids render it.
#[derive(Clone)]
pub struct PostCard {
    pub href: String,
    pub title: String,
    pub excerpt: String,
    pub iso_date: String,
    pub published: String,
    pub category: Option<String>,
    pub cover: Option<String>,
    pub is_featured: bool,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
}

/// Build a card from a pipeline post. Undated posts render without a byline
/// date rather than showing the epoch.
pub fn post_card(post: &Post) -> PostCard {
    let dated = post
        .frontmatter
        .date
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    let (iso_date, published) = if dated {
        let date = post.sort_date();
        (
            date.format("%Y-%m-%d").to_string(),
            date.format("%B %d, %Y").to_string(),
        )
    } else {
        (String::new(), String::new())
    };

    PostCard {
        href: post_path(post),
        title: post.display_title().to_string(),
        excerpt: post
            .frontmatter
            .description
            .as_deref()
            .or(post.frontmatter.excerpt.as_deref())
            .or(post.first_paragraph_text.as_deref())
            .unwrap_or_default()
            .to_string(),
        iso_date,
        published,
        category: post.frontmatter.category.clone(),
        cover: post
            .frontmatter
            .cover_lg
            .as_deref()
            .or(post.frontmatter.cover.as_deref())
            .or(post.first_image.as_deref())
            .map(str::to_string),
        is_featured: post.frontmatter.featured,
        rating: post.rating.or(post.avg_rating),
        review_count: post.review_count,
    }
}

pub fn post_cards(posts: &[Post]) -> Vec<PostCard> {
    posts.iter().map(post_card).collect()
}

#[derive(Clone)]
pub struct YearGroupView {
    pub year: i32,
    pub posts: Vec<PostCard>,
}

pub fn year_group_views(groups: &[YearGroup]) -> Vec<YearGroupView> {
    groups
        .iter()
        .map(|group| YearGroupView {
            year: group.year,
            posts: post_cards(&group.posts),
        })
        .collect()
}

pub struct HomePageContext {
    pub featured: Vec<PostCard>,
    pub show_featured: bool,
    pub projects: Vec<PostCard>,
    pub articles: Vec<PostCard>,
    pub year_groups: Vec<YearGroupView>,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<HomePageContext>,
}

pub struct ProjectsPageContext {
    pub year_groups: Vec<YearGroupView>,
}

#[derive(Template)]
#[template(path = "projects.html")]
pub struct ProjectsTemplate {
    pub view: LayoutContext<ProjectsPageContext>,
}

pub struct ListingPageContext {
    pub heading: String,
    pub base_path: String,
    pub posts: Vec<PostCard>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_posts: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl ListingPageContext {
    pub fn new(heading: String, base_path: String, posts: Vec<PostCard>, bounds: PageBounds) -> Self {
        Self {
            heading,
            base_path,
            posts,
            current_page: bounds.current_page,
            total_pages: bounds.total_pages,
            total_posts: bounds.total_posts,
            has_next_page: bounds.has_next_page,
            has_previous_page: bounds.has_previous_page,
        }
    }

    pub fn next_href(&self) -> String {
        format!("{}?page={}", self.base_path, self.current_page + 1)
    }

    pub fn previous_href(&self) -> String {
        format!("{}?page={}", self.base_path, self.current_page.saturating_sub(1))
    }
}

#[derive(Template)]
#[template(path = "listing.html")]
pub struct ListingTemplate {
    pub view: LayoutContext<ListingPageContext>,
}

pub struct TagPageContext {
    pub tag: String,
    pub heading: String,
    pub posts: Vec<PostCard>,
}

#[derive(Template)]
#[template(path = "tag.html")]
pub struct TagTemplate {
    pub view: LayoutContext<TagPageContext>,
}

pub struct PostPageContext {
    pub title: String,
    pub published: String,
    pub iso_date: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub cover: Option<String>,
    pub body_html: String,
    pub similar: Vec<PostCard>,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostPageContext>,
}

pub struct SearchPageContext {
    pub query: String,
    pub results: Vec<PostCard>,
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub view: LayoutContext<SearchPageContext>,
}

pub struct FormOutcomeView {
    pub success: bool,
    pub message: String,
}

pub struct SuggestPageContext {
    pub kinds: Vec<String>,
    pub outcome: Option<FormOutcomeView>,
}

#[derive(Template)]
#[template(path = "suggest.html")]
pub struct SuggestTemplate {
    pub view: LayoutContext<SuggestPageContext>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Try returning to the homepage to continue exploring.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }

    pub fn unavailable(message: &str) -> Self {
        Self {
            title: "Something Went Wrong".to_string(),
            message: message.to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

pub fn title_case(tag: &str) -> String {
    let mut words = Vec::new();
    for segment in tag.split(['-', '_']) {
        if segment.is_empty() {
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            let mut word = String::new();
            word.extend(first.to_uppercase());
            for ch in chars {
                word.extend(ch.to_lowercase());
            }
            words.push(word);
        }
    }

    if words.is_empty() {
        tag.to_string()
    } else {
        words.join(" ")
    }
}
