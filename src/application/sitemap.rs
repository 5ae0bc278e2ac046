//! Sitemap and robots.txt generation.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::domain::posts::Post;

/// Static pages with their crawl hints, in the order they appear in the map.
const STATIC_PAGES: [(&str, &str, &str); 5] = [
    ("/", "daily", "1.0"),
    ("/projects", "weekly", "0.8"),
    ("/projects/all", "weekly", "0.6"),
    ("/projects/articles", "weekly", "0.6"),
    ("/search", "monthly", "0.5"),
];

fn push_url(xml: &mut String, loc: &str, lastmod: Option<&str>, changefreq: &str, priority: &str) {
    xml.push_str("  <url>\n");
    let _ = writeln!(xml, "    <loc>{}</loc>", escape(loc));
    if let Some(lastmod) = lastmod {
        let _ = writeln!(xml, "    <lastmod>{lastmod}</lastmod>");
    }
    let _ = writeln!(xml, "    <changefreq>{changefreq}</changefreq>");
    let _ = writeln!(xml, "    <priority>{priority}</priority>");
    xml.push_str("  </url>\n");
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// The canonical path for a post: `/{year}/{slug}` when it records a year or
/// edition, bare `/{slug}` otherwise.
pub fn post_path(post: &Post) -> String {
    match post.recorded_year() {
        Some(year) => format!("/{}/{}", year.to_segment(), post.slug),
        None => format!("/{}", post.slug),
    }
}

/// Render the full sitemap: static pages, every public post, and one entry
/// per distinct recorded year.
pub fn sitemap_xml(base_url: &str, posts: &[Post]) -> String {
    let base = base_url.trim_end_matches('/');
    let mut xml = String::from(concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    ));

    for (path, changefreq, priority) in STATIC_PAGES {
        push_url(&mut xml, &format!("{base}{path}"), None, changefreq, priority);
    }

    let mut years: BTreeSet<String> = BTreeSet::new();
    for post in posts.iter().filter(|p| p.is_public()) {
        if let Some(year) = post.recorded_year() {
            years.insert(year.to_segment());
        }
        let priority = if post.frontmatter.featured { "0.9" } else { "0.7" };
        let lastmod = post
            .frontmatter
            .date
            .as_ref()
            .map(|_| post.sort_date().format("%Y-%m-%d").to_string());
        push_url(
            &mut xml,
            &format!("{base}{}", post_path(post)),
            lastmod.as_deref(),
            "monthly",
            priority,
        );
    }

    for year in years {
        push_url(&mut xml, &format!("{base}/{year}"), None, "yearly", "0.5");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// robots.txt pointing crawlers at the sitemap.
pub fn robots_txt(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("User-agent: *\nAllow: /\n\nSitemap: {base}/sitemap.xml\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::posts::YearValue;

    fn post(slug: &str, year: Option<YearValue>, public: bool, featured: bool) -> Post {
        let mut p = Post {
            slug: slug.into(),
            original_file_path: format!("projects/{slug}.md"),
            ..Post::default()
        };
        p.frontmatter.year = year;
        p.frontmatter.public = public;
        p.frontmatter.featured = featured;
        p.frontmatter.date = Some("2024-03-01".into());
        p
    }

    #[test]
    fn static_pages_always_lead_the_map() {
        let xml = sitemap_xml("https://example.com", &[]);
        assert!(xml.contains("<loc>https://example.com/</loc>"));
        assert!(xml.contains("<loc>https://example.com/projects/articles</loc>"));
        assert!(xml.contains("<loc>https://example.com/search</loc>"));
    }

    #[test]
    fn private_posts_stay_out_of_the_map() {
        let xml = sitemap_xml(
            "https://example.com",
            &[
                post("visible", None, true, false),
                post("hidden", None, false, false),
            ],
        );
        assert!(xml.contains("/visible</loc>"));
        assert!(!xml.contains("/hidden</loc>"));
    }

    #[test]
    fn featured_posts_get_the_higher_priority() {
        let xml = sitemap_xml("https://example.com", &[post("star", None, true, true)]);
        let entry = xml.split("<url>").find(|e| e.contains("/star")).unwrap();
        assert!(entry.contains("<priority>0.9</priority>"));
    }

    #[test]
    fn yeared_posts_live_under_their_year_and_create_a_bucket() {
        let xml = sitemap_xml(
            "https://example.com",
            &[
                post("a", Some(YearValue::Number(2024)), true, false),
                post("b", Some(YearValue::Text("2024".into())), true, false),
            ],
        );
        assert!(xml.contains("<loc>https://example.com/2024/a</loc>"));
        assert_eq!(xml.matches("<loc>https://example.com/2024</loc>").count(), 1);
    }

    #[test]
    fn lastmod_comes_from_the_post_date() {
        let xml = sitemap_xml("https://example.com", &[post("dated", None, true, false)]);
        assert!(xml.contains("<lastmod>2024-03-01</lastmod>"));
    }

    #[test]
    fn robots_points_at_the_sitemap() {
        let robots = robots_txt("https://example.com/");
        assert!(robots.contains("Sitemap: https://example.com/sitemap.xml"));
    }
}
