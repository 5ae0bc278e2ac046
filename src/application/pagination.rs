//! Offset pagination for the flat listing pages.

/// Resolved window over a feed of `total` posts.
///
/// `compute` is total over its inputs: a requested page outside
/// `[1, total_pages]` clamps, and an empty feed yields zero pages but still
/// reports page 1 so templates have something to print. That empty-set quirk
/// matches the route math this site has always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_posts: usize,
    pub start: usize,
    pub end: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PageBounds {
    pub fn compute(total: usize, requested_page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total.div_ceil(page_size);
        let current_page = requested_page.min(total_pages).max(1);

        let start = (current_page - 1) * page_size;
        let start = start.min(total);
        let end = (start + page_size).min(total);

        Self {
            current_page,
            total_pages,
            total_posts: total,
            start,
            end,
            has_next_page: current_page < total_pages,
            has_previous_page: current_page > 1,
        }
    }

    /// Slice a feed to the current window.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.start..self.end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_round_up_to_whole_pages() {
        let bounds = PageBounds::compute(450, 1, 200);
        assert_eq!(bounds.total_pages, 3);
        assert_eq!((bounds.start, bounds.end), (0, 200));
        assert!(bounds.has_next_page);
        assert!(!bounds.has_previous_page);
    }

    #[test]
    fn out_of_range_pages_clamp_to_the_last_page() {
        let bounds = PageBounds::compute(450, 5, 200);
        assert_eq!(bounds.current_page, 3);
        assert_eq!((bounds.start, bounds.end), (400, 450));
        assert!(!bounds.has_next_page);
        assert!(bounds.has_previous_page);
    }

    #[test]
    fn page_zero_clamps_to_the_first_page() {
        let bounds = PageBounds::compute(450, 0, 200);
        assert_eq!(bounds.current_page, 1);
        assert!(!bounds.has_previous_page);
    }

    #[test]
    fn empty_feeds_report_zero_pages_but_page_one() {
        let bounds = PageBounds::compute(0, 4, 200);
        assert_eq!(bounds.total_pages, 0);
        assert_eq!(bounds.current_page, 1);
        assert_eq!((bounds.start, bounds.end), (0, 0));
        assert!(!bounds.has_next_page);
        assert!(!bounds.has_previous_page);
    }

    #[test]
    fn slice_returns_the_window() {
        let items: Vec<usize> = (0..450).collect();
        let bounds = PageBounds::compute(items.len(), 3, 200);
        let window = bounds.slice(&items);
        assert_eq!(window.len(), 50);
        assert_eq!(window[0], 400);
    }
}
