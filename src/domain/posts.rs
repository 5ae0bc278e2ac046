//! Post records as delivered by the hosted content API.
//!
//! The wire format is camelCase JSON with an optional-everything frontmatter
//! block. Every consumer treats an absent field as "use fallback"; nothing in
//! this module raises for bad-but-present data.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNTITLED: &str = "Untitled";

/// A single content item (project, guide, or article).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Post {
    pub slug: String,
    pub original_file_path: String,
    pub frontmatter: Frontmatter,
    pub title: Option<String>,
    pub plain: Option<String>,
    pub first_paragraph_text: Option<String>,
    pub first_image: Option<String>,
    pub html: Option<String>,
    /// Content fingerprint used for similar-post lookups.
    pub hash: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub avg_rating: Option<f64>,
}

/// The metadata block attached to a post.
///
/// Strict-equality flags from the original data model survive here:
/// `featured` counts only when explicitly `true`, and `public` hides a post
/// only when explicitly `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub date: Option<String>,
    pub year: Option<YearValue>,
    pub edition: Option<YearValue>,
    pub featured: bool,
    pub public: bool,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub cover: Option<String>,
    #[serde(rename = "cover-lg")]
    pub cover_lg: Option<String>,
}

impl Default for Frontmatter {
    fn default() -> Self {
        Self {
            title: None,
            name: None,
            description: None,
            excerpt: None,
            category: None,
            tags: Vec::new(),
            date: None,
            year: None,
            edition: None,
            featured: false,
            public: true,
            kind: None,
            cover: None,
            cover_lg: None,
        }
    }
}

/// A year (or edition) field, which editors write either as a number or a
/// quoted string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearValue {
    Number(i64),
    Text(String),
}

impl YearValue {
    /// Truthiness as the upstream data model defines it: a number counts
    /// unless it is zero, a string counts unless it is empty. The string
    /// `"0"` is therefore truthy while the number `0` is not.
    pub fn is_truthy(&self) -> bool {
        match self {
            YearValue::Number(n) => *n != 0,
            YearValue::Text(s) => !s.is_empty(),
        }
    }

    /// Coerce to a calendar year. String years that fail to parse yield
    /// `None`; callers substitute the current year.
    pub fn as_number(&self) -> Option<i32> {
        match self {
            YearValue::Number(n) => i32::try_from(*n).ok(),
            YearValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// String form used in URLs (`/{year}/{slug}`) and equality checks
    /// against URL segments.
    pub fn to_segment(&self) -> String {
        match self {
            YearValue::Number(n) => n.to_string(),
            YearValue::Text(s) => s.clone(),
        }
    }
}

impl Post {
    /// Display title with the standard fallback chain.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.frontmatter.title.as_deref())
            .or(self.frontmatter.name.as_deref())
            .unwrap_or(UNTITLED)
    }

    /// The date key every ordering in the site uses. Missing or unparseable
    /// dates resolve to the Unix epoch so they sink to the bottom of
    /// descending sorts.
    pub fn sort_date(&self) -> DateTime<Utc> {
        parse_frontmatter_date(self.frontmatter.date.as_deref())
    }

    /// Truthy year field, if any.
    pub fn year(&self) -> Option<&YearValue> {
        self.frontmatter.year.as_ref().filter(|y| y.is_truthy())
    }

    /// Year recorded on the post for URL purposes: `year`, else `edition`.
    pub fn recorded_year(&self) -> Option<&YearValue> {
        self.year()
            .or_else(|| self.frontmatter.edition.as_ref().filter(|y| y.is_truthy()))
    }

    /// Whether the post appears in public enumerations (sitemap). Only an
    /// explicit `public: false` hides a post.
    pub fn is_public(&self) -> bool {
        self.frontmatter.public
    }
}

/// Parse a frontmatter date string, falling back to the epoch.
///
/// Accepts RFC 3339, a bare datetime, or a bare date.
pub fn parse_frontmatter_date(date: Option<&str>) -> DateTime<Utc> {
    let Some(raw) = date.map(str::trim).filter(|s| !s.is_empty()) else {
        return DateTime::UNIX_EPOCH;
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Utc);
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return parsed.and_utc();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return parsed.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    }

    DateTime::UNIX_EPOCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_truthiness_matches_upstream_semantics() {
        assert!(YearValue::Number(2024).is_truthy());
        assert!(!YearValue::Number(0).is_truthy());
        assert!(YearValue::Text("0".into()).is_truthy());
        assert!(!YearValue::Text(String::new()).is_truthy());
    }

    #[test]
    fn string_and_numeric_years_coerce_to_the_same_number() {
        assert_eq!(YearValue::Text("2023".into()).as_number(), Some(2023));
        assert_eq!(YearValue::Number(2023).as_number(), Some(2023));
        assert_eq!(YearValue::Text("winners".into()).as_number(), None);
    }

    #[test]
    fn missing_and_invalid_dates_fall_back_to_epoch() {
        assert_eq!(parse_frontmatter_date(None), DateTime::UNIX_EPOCH);
        assert_eq!(parse_frontmatter_date(Some("not a date")), DateTime::UNIX_EPOCH);
        assert!(parse_frontmatter_date(Some("2024-03-01")) > DateTime::UNIX_EPOCH);
        assert!(
            parse_frontmatter_date(Some("2024-03-01T12:30:00Z"))
                > parse_frontmatter_date(Some("2024-03-01"))
        );
    }

    #[test]
    fn display_title_fallback_chain() {
        let mut post = Post {
            title: Some("Record title".into()),
            ..Post::default()
        };
        post.frontmatter.title = Some("Frontmatter title".into());
        post.frontmatter.name = Some("Name".into());
        assert_eq!(post.display_title(), "Record title");

        post.title = None;
        assert_eq!(post.display_title(), "Frontmatter title");

        post.frontmatter.title = None;
        assert_eq!(post.display_title(), "Name");

        post.frontmatter.name = None;
        assert_eq!(post.display_title(), UNTITLED);
    }

    #[test]
    fn frontmatter_deserializes_with_wire_names_and_defaults() {
        let post: Post = serde_json::from_str(
            r#"{
                "slug": "signal-fires",
                "originalFilePath": "projects/2024/signal-fires.md",
                "frontmatter": {
                    "title": "Signal Fires",
                    "year": "2024",
                    "cover-lg": "https://cdn.example/cover-lg.webp",
                    "type": "photo-essay"
                }
            }"#,
        )
        .expect("post json");

        assert_eq!(post.original_file_path, "projects/2024/signal-fires.md");
        assert_eq!(post.frontmatter.year, Some(YearValue::Text("2024".into())));
        assert_eq!(post.frontmatter.kind.as_deref(), Some("photo-essay"));
        assert!(post.frontmatter.public);
        assert!(!post.frontmatter.featured);
    }
}
