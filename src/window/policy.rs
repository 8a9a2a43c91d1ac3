//! Window maintenance policy
//!
//! Pure decision functions: given the current window, the current page and
//! the document length, decide whether the window has to move. Nothing here
//! renders or touches the queue.

use std::ops::RangeInclusive;

use super::types::{ScrollDirection, Window};

/// What the window should do in response to a page change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowDecision {
    /// Window already covers the current page well enough
    NoOp,
    /// Fetch `last + 1`, append it and evict the first entry
    SlideForward,
    /// Fetch `first - 1`, prepend it and evict the last entry
    SlideBackward,
    /// Discard and rebuild the window centred on the page
    ReloadAround(usize),
}

/// Page number at `floor(len / 2)` of the window
#[must_use]
pub fn midpoint_page<I>(window: &Window<I>) -> Option<usize> {
    window.entries().get(window.len() / 2).map(|e| e.page)
}

/// Decide how the window should react to `current_page`.
///
/// Sliding only ever looks in the direction the user is scrolling. A current
/// page outside the window (or an empty window) always asks for a reload.
#[must_use]
pub fn decide<I>(
    window: &Window<I>,
    current_page: usize,
    total_pages: usize,
    direction: ScrollDirection,
) -> WindowDecision {
    if total_pages == 0 {
        return WindowDecision::NoOp;
    }
    let current_page = current_page.clamp(1, total_pages);

    let (Some(first), Some(last), Some(midpoint)) =
        (window.first_page(), window.last_page(), midpoint_page(window))
    else {
        return WindowDecision::ReloadAround(current_page);
    };

    if current_page < first || current_page > last {
        return WindowDecision::ReloadAround(current_page);
    }

    match direction {
        ScrollDirection::Forward if current_page > midpoint && last < total_pages => {
            WindowDecision::SlideForward
        }
        ScrollDirection::Backward if current_page < midpoint && first > 1 => {
            WindowDecision::SlideBackward
        }
        _ => WindowDecision::NoOp,
    }
}

/// Pages to load when rebuilding the window around `target`.
///
/// Centred on the target where possible, shifted so it never runs past either
/// end of the document, and shorter than `window_size` only when the document
/// itself is.
#[must_use]
pub fn batch_range(target: usize, total_pages: usize, window_size: usize) -> RangeInclusive<usize> {
    let window_size = window_size.max(1);
    if total_pages == 0 {
        // Empty: start > end
        return 1..=0;
    }
    let target = target.clamp(1, total_pages);
    let latest_start = total_pages.saturating_sub(window_size).saturating_add(1).max(1);
    let start = target.saturating_sub(window_size / 2).clamp(1, latest_start);
    let end = (start + window_size - 1).min(total_pages);
    start..=end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::types::PageEntry;

    fn window_of(pages: RangeInclusive<usize>) -> Window<()> {
        let mut window = Window::new();
        for page in pages {
            window.push_back(PageEntry::new(page, ())).unwrap();
        }
        window
    }

    #[test]
    fn initial_batch_is_first_five() {
        assert_eq!(batch_range(1, 20, 5), 1..=5);
    }

    #[test]
    fn batch_clamps_near_end() {
        assert_eq!(batch_range(19, 20, 5), 16..=20);
        assert_eq!(batch_range(20, 20, 5), 16..=20);
    }

    #[test]
    fn batch_centres_in_the_middle() {
        assert_eq!(batch_range(10, 20, 5), 8..=12);
        assert_eq!(batch_range(10, 20, 4), 8..=11);
    }

    #[test]
    fn batch_shrinks_for_short_documents() {
        assert_eq!(batch_range(1, 3, 5), 1..=3);
        assert_eq!(batch_range(3, 3, 5), 1..=3);
        assert!(batch_range(1, 0, 5).is_empty());
    }

    #[test]
    fn batch_never_leaves_document() {
        for total in 1..=12 {
            for size in 1..=7 {
                for target in 0..=total + 2 {
                    let range = batch_range(target, total, size);
                    assert!(*range.start() >= 1);
                    assert!(*range.end() <= total);
                    assert_eq!(range.clone().count(), size.min(total));
                    let clamped = target.clamp(1, total);
                    assert!(range.contains(&clamped));
                }
            }
        }
    }

    #[test]
    fn midpoint_is_floor_of_half() {
        assert_eq!(midpoint_page(&window_of(1..=5)), Some(3));
        assert_eq!(midpoint_page(&window_of(1..=4)), Some(3));
        assert_eq!(midpoint_page(&window_of(7..=7)), Some(7));
        assert_eq!(midpoint_page(&Window::<()>::new()), None);
    }

    #[test]
    fn forward_slide_past_midpoint() {
        let window = window_of(1..=5);
        assert_eq!(
            decide(&window, 4, 20, ScrollDirection::Forward),
            WindowDecision::SlideForward
        );
    }

    #[test]
    fn at_midpoint_is_noop() {
        let window = window_of(1..=5);
        assert_eq!(
            decide(&window, 3, 20, ScrollDirection::Forward),
            WindowDecision::NoOp
        );
        assert_eq!(
            decide(&window, 3, 20, ScrollDirection::Backward),
            WindowDecision::NoOp
        );
    }

    #[test]
    fn forward_stops_at_document_end() {
        let window = window_of(16..=20);
        assert_eq!(
            decide(&window, 20, 20, ScrollDirection::Forward),
            WindowDecision::NoOp
        );
    }

    #[test]
    fn backward_slide_before_midpoint() {
        let window = window_of(5..=9);
        assert_eq!(
            decide(&window, 6, 20, ScrollDirection::Backward),
            WindowDecision::SlideBackward
        );
    }

    #[test]
    fn backward_stops_at_document_start() {
        let window = window_of(1..=5);
        assert_eq!(
            decide(&window, 1, 20, ScrollDirection::Backward),
            WindowDecision::NoOp
        );
    }

    #[test]
    fn direction_limits_which_edge_moves() {
        let window = window_of(5..=9);
        assert_eq!(
            decide(&window, 6, 20, ScrollDirection::Forward),
            WindowDecision::NoOp
        );
        assert_eq!(
            decide(&window, 8, 20, ScrollDirection::Backward),
            WindowDecision::NoOp
        );
    }

    #[test]
    fn outside_window_reloads() {
        let window = window_of(1..=5);
        assert_eq!(
            decide(&window, 12, 20, ScrollDirection::Forward),
            WindowDecision::ReloadAround(12)
        );
        assert_eq!(
            decide(&Window::<()>::new(), 3, 20, ScrollDirection::Backward),
            WindowDecision::ReloadAround(3)
        );
    }

    #[test]
    fn empty_document_is_noop() {
        assert_eq!(
            decide(&Window::<()>::new(), 1, 0, ScrollDirection::Forward),
            WindowDecision::NoOp
        );
    }
}
