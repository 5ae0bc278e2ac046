//! Feed composition: filter, categorize, sort.
//!
//! Each feed function takes the full working set and returns a fresh,
//! display-ordered subset. The pipeline order matters: filter first,
//! categorize the survivors, sort last on the resolved frontmatter.

use std::cmp::Ordering;

use crate::domain::category::with_category;
use crate::domain::classify::{is_article, is_guide, is_project};
use crate::domain::posts::Post;

/// Display comparator: featured posts first, then date descending. Ties keep
/// their input order (stable sort).
pub fn display_order(a: &Post, b: &Post) -> Ordering {
    b.frontmatter
        .featured
        .cmp(&a.frontmatter.featured)
        .then_with(|| b.sort_date().cmp(&a.sort_date()))
}

/// Sort a list of posts for display. Takes ownership and returns the sorted
/// vector; callers hand in pipeline-owned clones, so no shared collection is
/// ever reordered behind someone's back.
pub fn sort_posts(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(display_order);
    posts
}

/// Categorize then sort. Every element of the output is a fresh clone.
pub fn process_posts(posts: &[Post]) -> Vec<Post> {
    sort_posts(posts.iter().map(with_category).collect())
}

fn compose(posts: &[Post], keep: impl Fn(&Post) -> bool) -> Vec<Post> {
    let kept: Vec<Post> = posts.iter().filter(|p| keep(p)).cloned().collect();
    process_posts(&kept)
}

/// All classified projects, categorized and display-ordered.
pub fn projects(posts: &[Post]) -> Vec<Post> {
    compose(posts, is_project)
}

/// All classified guides, categorized and display-ordered.
pub fn guides(posts: &[Post]) -> Vec<Post> {
    compose(posts, is_guide)
}

/// All classified articles, categorized and display-ordered.
pub fn articles(posts: &[Post]) -> Vec<Post> {
    compose(posts, is_article)
}

/// The complement of the projects feed: guides, articles, and unclassified
/// posts together. This backs the "Articles & Essays" sections.
pub fn non_projects(posts: &[Post]) -> Vec<Post> {
    compose(posts, |p| !is_project(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::posts::YearValue;

    fn post(slug: &str, path: &str, date: Option<&str>, featured: bool) -> Post {
        let mut p = Post {
            slug: slug.into(),
            original_file_path: path.into(),
            ..Post::default()
        };
        p.frontmatter.date = date.map(str::to_string);
        p.frontmatter.featured = featured;
        p
    }

    fn slugs(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.slug.as_str()).collect()
    }

    #[test]
    fn featured_outranks_any_date() {
        let set = vec![
            post("old-featured", "projects/a.md", Some("2019-01-01"), true),
            post("new-plain", "projects/b.md", Some("2024-06-01"), false),
        ];
        assert_eq!(slugs(&sort_posts(set)), ["old-featured", "new-plain"]);
    }

    #[test]
    fn dates_sort_descending_within_a_tier() {
        let set = vec![
            post("mar", "projects/a.md", Some("2024-03-01"), false),
            post("jun", "projects/b.md", Some("2024-06-01"), false),
            post("jan", "projects/c.md", Some("2024-01-01"), false),
        ];
        assert_eq!(slugs(&sort_posts(set)), ["jun", "mar", "jan"]);
    }

    #[test]
    fn missing_dates_sink_in_both_tiers() {
        let set = vec![
            post("undated-featured", "projects/a.md", None, true),
            post("dated-featured", "projects/b.md", Some("2020-01-01"), true),
            post("undated", "projects/c.md", None, false),
            post("dated", "projects/d.md", Some("2020-01-01"), false),
        ];
        assert_eq!(
            slugs(&sort_posts(set)),
            ["dated-featured", "undated-featured", "dated", "undated"]
        );
    }

    #[test]
    fn equal_keys_preserve_input_order() {
        let set = vec![
            post("first", "projects/a.md", Some("2024-05-05"), true),
            post("second", "projects/b.md", Some("2024-05-05"), true),
        ];
        assert_eq!(slugs(&sort_posts(set)), ["first", "second"]);
    }

    #[test]
    fn projects_and_non_projects_partition_the_working_set() {
        let mut yeared = post("yeared", "random/d.md", Some("2023-01-01"), false);
        yeared.frontmatter.year = Some(YearValue::Number(2023));

        let set = vec![
            post("proj", "projects/2024/a.md", Some("2024-02-01"), false),
            post("guide", "articles/guides/light/b.md", Some("2024-03-01"), false),
            post("article", "articles/history/c.md", Some("2024-04-01"), false),
            yeared,
            post("stray", "random/e.md", None, false),
        ];

        let projects = projects(&set);
        let rest = non_projects(&set);
        assert_eq!(slugs(&projects), ["proj", "yeared"]);
        assert_eq!(slugs(&rest), ["article", "guide", "stray"]);
        assert_eq!(projects.len() + rest.len(), set.len());
    }

    #[test]
    fn feeds_categorize_without_touching_the_input() {
        let set = vec![post("guide", "articles/guides/light/b.md", None, false)];
        let out = guides(&set);
        assert_eq!(out[0].frontmatter.category.as_deref(), Some("light"));
        assert_eq!(set[0].frontmatter.category, None);
    }
}
