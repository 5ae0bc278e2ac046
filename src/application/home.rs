//! Homepage featured-post selection.
//!
//! Ordering here is deliberately random per request (content-discovery
//! variety), so none of it is reproducible and none of it should be: the
//! only hard guarantees are membership and the size cap, which is what the
//! tests pin down.

use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::domain::posts::Post;

/// How many posts the featured section holds. Templates suppress the section
/// entirely when fewer are available.
pub const FEATURED_COUNT: usize = 3;

/// Fisher-Yates shuffle into a fresh vector.
pub fn shuffle_posts(posts: &[Post]) -> Vec<Post> {
    let mut shuffled: Vec<Post> = posts.to_vec();
    shuffled.shuffle(&mut thread_rng());
    shuffled
}

fn is_backfill_candidate(post: &Post, backfill_year: i32) -> bool {
    !post.frontmatter.featured
        && post
            .year()
            .and_then(|y| y.as_number())
            .is_some_and(|y| y == backfill_year)
}

/// Pick the featured trio: explicitly-featured posts first, backfilled with
/// a random sample of current-edition posts when fewer than three exist.
/// Returns fewer than three when even the combined pool is short.
pub fn featured_posts(posts: &[Post], backfill_year: i32) -> Vec<Post> {
    let featured: Vec<Post> = posts
        .iter()
        .filter(|p| p.frontmatter.featured)
        .cloned()
        .collect();

    if featured.len() >= FEATURED_COUNT {
        let mut picks = shuffle_posts(&featured);
        picks.truncate(FEATURED_COUNT);
        return picks;
    }

    let pool: Vec<Post> = posts
        .iter()
        .filter(|p| is_backfill_candidate(p, backfill_year))
        .cloned()
        .collect();

    let mut combined = featured;
    combined.extend(shuffle_posts(&pool));
    combined.truncate(FEATURED_COUNT);
    combined
}
