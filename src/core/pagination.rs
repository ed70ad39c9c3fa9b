//! Page navigation and the visible page window

use serde::{Deserialize, Serialize};

/// Default number of contiguous page buttons
pub const DEFAULT_MAX_VISIBLE: usize = 5;

/// One entry of the rendered page list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "page")]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

/// Compute the visible page list
///
/// The contiguous window holds at most `max_visible` pages centred on
/// `current` and shifted to stay within `1..=total`. Page 1 and `total` are
/// always present; an ellipsis separates them from the window when pages are
/// skipped. `current` is clamped into range and `max_visible == 0` is treated
/// as 1.
///
/// ```
/// use console::core::pagination::{page_window, PageItem::*};
///
/// assert_eq!(
///     page_window(5, 10, 5),
///     vec![Page(1), Ellipsis, Page(3), Page(4), Page(5), Page(6), Page(7), Ellipsis, Page(10)]
/// );
/// ```
pub fn page_window(current: usize, total: usize, max_visible: usize) -> Vec<PageItem> {
    if total == 0 {
        return Vec::new();
    }
    let max_visible = max_visible.max(1);
    let current = current.clamp(1, total);

    if total <= max_visible {
        return (1..=total).map(PageItem::Page).collect();
    }

    let mut start = current.saturating_sub(max_visible / 2).max(1);
    let mut end = start + max_visible - 1;
    if end > total {
        end = total;
        start = total + 1 - max_visible;
    }

    let mut window = Vec::with_capacity(max_visible + 4);
    if start > 1 {
        window.push(PageItem::Page(1));
        if start > 2 {
            window.push(PageItem::Ellipsis);
        }
    }
    window.extend((start..=end).map(PageItem::Page));
    if end < total {
        if end < total - 1 {
            window.push(PageItem::Ellipsis);
        }
        window.push(PageItem::Page(total));
    }
    window
}

/// Pagination state `{ current_page, total_pages }` with its navigation actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pager {
    current_page: usize,
    total_pages: usize,
    #[serde(skip, default = "default_max_visible")]
    max_visible: usize,
}

fn default_max_visible() -> usize {
    DEFAULT_MAX_VISIBLE
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Pager {
    pub fn new(total_pages: usize) -> Self {
        Self {
            current_page: 1,
            total_pages,
            max_visible: DEFAULT_MAX_VISIBLE,
        }
    }

    pub fn with_max_visible(mut self, max_visible: usize) -> Self {
        self.max_visible = max_visible.max(1);
        self
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn can_previous(&self) -> bool {
        self.total_pages > 0 && self.current_page > 1
    }

    pub fn can_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Move one page back; no-op on the first page
    pub fn previous(&mut self) -> usize {
        if self.can_previous() {
            self.current_page -= 1;
        }
        self.current_page
    }

    /// Move one page forward; no-op on the last page
    pub fn next(&mut self) -> usize {
        if self.can_next() {
            self.current_page += 1;
        }
        self.current_page
    }

    /// Jump to a page, clamped into `1..=total_pages`
    pub fn go_to(&mut self, page: usize) -> usize {
        self.current_page = page.clamp(1, self.total_pages.max(1));
        self.current_page
    }

    /// Update the page count (e.g. after a filter change), keeping the
    /// current page in range
    pub fn set_total_pages(&mut self, total_pages: usize) {
        self.total_pages = total_pages;
        self.current_page = self.current_page.clamp(1, total_pages.max(1));
    }

    pub fn window(&self) -> Vec<PageItem> {
        page_window(self.current_page, self.total_pages, self.max_visible)
    }
}
