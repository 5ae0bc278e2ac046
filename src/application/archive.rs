//! Year-bucketed archive of projects.

use std::collections::BTreeMap;

use chrono::{Datelike, Utc};

use crate::domain::posts::Post;

/// One year's worth of projects, newest first inside the bucket.
#[derive(Debug, Clone)]
pub struct YearGroup {
    pub year: i32,
    pub posts: Vec<Post>,
}

fn bucket_year(post: &Post, current_year: i32) -> i32 {
    post.recorded_year()
        .and_then(|y| y.as_number())
        .unwrap_or(current_year)
}

/// Bucket posts by `year`, falling back to `edition`, then to the current
/// calendar year. String years coerce to integers so `"2023"` and `2023`
/// share a bucket. Buckets come out newest-year first; within a bucket the
/// order is date-descending only — the featured tier does not apply here.
pub fn group_by_year(posts: &[Post]) -> Vec<YearGroup> {
    let current_year = Utc::now().year();
    let mut buckets: BTreeMap<i32, Vec<Post>> = BTreeMap::new();

    for post in posts {
        buckets
            .entry(bucket_year(post, current_year))
            .or_default()
            .push(post.clone());
    }

    buckets
        .into_iter()
        .rev()
        .map(|(year, mut posts)| {
            posts.sort_by(|a, b| b.sort_date().cmp(&a.sort_date()));
            YearGroup { year, posts }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::posts::YearValue;

    fn post(slug: &str, year: Option<YearValue>, date: Option<&str>) -> Post {
        let mut p = Post {
            slug: slug.into(),
            original_file_path: format!("projects/{slug}.md"),
            ..Post::default()
        };
        p.frontmatter.year = year;
        p.frontmatter.date = date.map(str::to_string);
        p
    }

    #[test]
    fn string_and_numeric_years_share_a_bucket() {
        let groups = group_by_year(&[
            post("a", Some(YearValue::Text("2023".into())), None),
            post("b", Some(YearValue::Number(2023)), None),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].year, 2023);
        assert_eq!(groups[0].posts.len(), 2);
    }

    #[test]
    fn buckets_order_newest_year_first() {
        let groups = group_by_year(&[
            post("old", Some(YearValue::Number(2022)), None),
            post("new", Some(YearValue::Number(2024)), None),
            post("mid", Some(YearValue::Number(2023)), None),
        ]);
        let years: Vec<i32> = groups.iter().map(|g| g.year).collect();
        assert_eq!(years, [2024, 2023, 2022]);
    }

    #[test]
    fn edition_backs_up_a_missing_year() {
        let mut p = post("ed", None, None);
        p.frontmatter.edition = Some(YearValue::Text("2022".into()));
        let groups = group_by_year(&[p]);
        assert_eq!(groups[0].year, 2022);
    }

    #[test]
    fn missing_year_and_edition_fall_back_to_the_current_year() {
        let groups = group_by_year(&[post("now", None, None)]);
        assert_eq!(groups[0].year, Utc::now().year());
    }

    #[test]
    fn buckets_sort_by_date_descending_ignoring_featured() {
        let mut featured_old = post("feat", Some(YearValue::Number(2024)), Some("2024-01-01"));
        featured_old.frontmatter.featured = true;
        let plain_new = post("plain", Some(YearValue::Number(2024)), Some("2024-06-01"));

        let groups = group_by_year(&[featured_old, plain_new]);
        let slugs: Vec<&str> = groups[0].posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["plain", "feat"]);
    }
}
