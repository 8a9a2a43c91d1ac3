//! Window operations and how they run against a rasterizer

use log::{debug, warn};

use super::policy::{WindowDecision, batch_range, decide};
use super::rasterizer::PageRasterizer;
use super::request::RenderFault;
use super::types::{DocumentHandle, PageEntry, ScrollDirection, Window};

/// A unit of work for the operation queue.
///
/// Operations describe a transformation, not a snapshot: each one is applied
/// to whatever window the queue holds when it is drained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Check the window against the current page and slide it if needed
    Slide {
        current_page: usize,
        direction: ScrollDirection,
    },
    /// Rebuild the window around a page in one batch
    ReloadAround { page: usize },
}

/// A page that could not be rendered while running an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub page: usize,
    pub error: RenderFault,
}

/// Run `op` against `window`, producing the next window.
///
/// `window` is never modified; on failure the caller keeps it as is.
/// `is_current` is polled before every render so a superseded batch stops
/// early with [`RenderFault::Stale`].
pub fn execute<R: PageRasterizer>(
    op: Operation,
    window: &Window<R::Image>,
    document: &DocumentHandle<R::Document>,
    rasterizer: &mut R,
    window_size: usize,
    is_current: &dyn Fn() -> Result<(), RenderFault>,
) -> Result<Window<R::Image>, PageFailure> {
    let total_pages = document.total_pages();
    let decision = match op {
        Operation::Slide {
            current_page,
            direction,
        } => decide(window, current_page, total_pages, direction),
        Operation::ReloadAround { page } => WindowDecision::ReloadAround(page),
    };

    match decision {
        WindowDecision::NoOp => Ok(window.clone()),

        WindowDecision::SlideForward => {
            let Some(last) = window.last_page() else {
                return Ok(window.clone());
            };
            let page = last + 1;
            let resource = render_one(rasterizer, document, page, is_current)?;

            let mut next = window.clone();
            if let Err(entry) = next.push_back(PageEntry::new(page, resource)) {
                warn!("refusing non-contiguous append of page {}", entry.page);
                return Ok(window.clone());
            }
            let evicted = next.evict_front().map(|e| e.page);
            debug!("slid forward: +{page} -{evicted:?}");
            Ok(next)
        }

        WindowDecision::SlideBackward => {
            let Some(first) = window.first_page() else {
                return Ok(window.clone());
            };
            let Some(page) = first.checked_sub(1).filter(|&p| p >= 1) else {
                return Ok(window.clone());
            };
            let resource = render_one(rasterizer, document, page, is_current)?;

            let mut next = window.clone();
            if let Err(entry) = next.push_front(PageEntry::new(page, resource)) {
                warn!("refusing non-contiguous prepend of page {}", entry.page);
                return Ok(window.clone());
            }
            let evicted = next.evict_back().map(|e| e.page);
            debug!("slid backward: +{page} -{evicted:?}");
            Ok(next)
        }

        WindowDecision::ReloadAround(target) => {
            let range = batch_range(target, total_pages, window_size);
            debug!("batch load {range:?} around page {target}");

            let mut next = Window::new();
            for page in range {
                let resource = render_one(rasterizer, document, page, is_current)?;
                if let Err(entry) = next.push_back(PageEntry::new(page, resource)) {
                    warn!("refusing non-contiguous batch page {}", entry.page);
                    return Ok(window.clone());
                }
            }
            Ok(next)
        }
    }
}

fn render_one<R: PageRasterizer>(
    rasterizer: &mut R,
    document: &DocumentHandle<R::Document>,
    page: usize,
    is_current: &dyn Fn() -> Result<(), RenderFault>,
) -> Result<R::Image, PageFailure> {
    debug_assert!(
        (1..=document.total_pages()).contains(&page),
        "policy asked for page {page} of {}",
        document.total_pages()
    );
    is_current().map_err(|error| PageFailure { page, error })?;
    rasterizer
        .render(document, page)
        .map_err(|error| PageFailure { page, error })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::window::rasterizer::check_page_range;
    use crate::window::types::{DocumentId, Generation};

    /// Renders `page * 100`, records requests, fails listed pages
    #[derive(Default)]
    struct Recording {
        requested: Vec<usize>,
        failing: HashSet<usize>,
    }

    impl PageRasterizer for Recording {
        type Document = ();
        type Image = usize;

        fn render(
            &mut self,
            document: &DocumentHandle<()>,
            page: usize,
        ) -> Result<usize, RenderFault> {
            check_page_range(document, page)?;
            self.requested.push(page);
            if self.failing.contains(&page) {
                return Err(RenderFault::rasterizer(format!("cannot draw {page}")));
            }
            Ok(page * 100)
        }
    }

    fn doc(total: usize) -> DocumentHandle<()> {
        DocumentHandle::new(DocumentId(1), Arc::new(()), total)
    }

    fn always_current() -> Result<(), RenderFault> {
        Ok(())
    }

    fn run(
        op: Operation,
        window: &Window<usize>,
        total: usize,
        rasterizer: &mut Recording,
    ) -> Result<Window<usize>, PageFailure> {
        execute(op, window, &doc(total), rasterizer, 5, &always_current)
    }

    fn reload(page: usize, total: usize) -> Window<usize> {
        run(
            Operation::ReloadAround { page },
            &Window::new(),
            total,
            &mut Recording::default(),
        )
        .unwrap()
    }

    fn forward(current_page: usize) -> Operation {
        Operation::Slide {
            current_page,
            direction: ScrollDirection::Forward,
        }
    }

    fn backward(current_page: usize) -> Operation {
        Operation::Slide {
            current_page,
            direction: ScrollDirection::Backward,
        }
    }

    #[test]
    fn initial_batch_load() {
        assert_eq!(reload(1, 20).pages(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn jump_near_end_clamps() {
        assert_eq!(reload(19, 20).pages(), vec![16, 17, 18, 19, 20]);
    }

    #[test]
    fn batch_renders_sequentially_in_order() {
        let mut rasterizer = Recording::default();
        run(
            Operation::ReloadAround { page: 10 },
            &Window::new(),
            20,
            &mut rasterizer,
        )
        .unwrap();
        assert_eq!(rasterizer.requested, vec![8, 9, 10, 11, 12]);
    }

    #[test]
    fn forward_slide_appends_and_evicts() {
        let window = reload(1, 20);
        let mut rasterizer = Recording::default();
        let next = run(forward(4), &window, 20, &mut rasterizer).unwrap();

        assert_eq!(next.pages(), vec![2, 3, 4, 5, 6]);
        assert_eq!(rasterizer.requested, vec![6]);
        assert_eq!(next.get(6).map(|e| e.resource), Some(600));
    }

    #[test]
    fn backward_slide_prepends_and_evicts() {
        let window = reload(10, 20);
        let mut rasterizer = Recording::default();
        let next = run(backward(9), &window, 20, &mut rasterizer).unwrap();

        assert_eq!(next.pages(), vec![7, 8, 9, 10, 11]);
        assert_eq!(rasterizer.requested, vec![7]);
    }

    #[test]
    fn noop_keeps_pages_and_resources() {
        let window = reload(1, 20);
        let mut rasterizer = Recording::default();
        let next = run(forward(3), &window, 20, &mut rasterizer).unwrap();

        assert_eq!(next, window);
        assert!(rasterizer.requested.is_empty());
    }

    #[test]
    fn failed_slide_leaves_window_unchanged() {
        let window = reload(1, 20);
        let mut rasterizer = Recording {
            failing: HashSet::from([6]),
            ..Recording::default()
        };
        let failure = run(forward(4), &window, 20, &mut rasterizer).unwrap_err();

        assert_eq!(failure.page, 6);
        assert!(matches!(failure.error, RenderFault::Rasterizer { .. }));
    }

    #[test]
    fn failed_batch_reports_page() {
        let mut rasterizer = Recording {
            failing: HashSet::from([3]),
            ..Recording::default()
        };
        let failure = run(
            Operation::ReloadAround { page: 1 },
            &Window::new(),
            20,
            &mut rasterizer,
        )
        .unwrap_err();
        assert_eq!(failure.page, 3);
        assert_eq!(rasterizer.requested, vec![1, 2, 3]);
    }

    #[test]
    fn stale_batch_stops_before_rendering() {
        let mut rasterizer = Recording::default();
        let stale = || -> Result<(), RenderFault> {
            Err(RenderFault::Stale {
                requested: Generation::new(1),
                current: Generation::new(2),
            })
        };
        let failure = execute(
            Operation::ReloadAround { page: 1 },
            &Window::new(),
            &doc(20),
            &mut rasterizer,
            5,
            &stale,
        )
        .unwrap_err();
        assert!(matches!(failure.error, RenderFault::Stale { .. }));
        assert!(rasterizer.requested.is_empty());
    }

    /// Walk every page forward then back; every window must stay contiguous,
    /// in bounds and the same size after each slide.
    #[test]
    fn slides_preserve_invariants_over_full_document() {
        for total in [1, 2, 4, 5, 6, 9, 20] {
            let mut rasterizer = Recording::default();
            let mut window = run(
                Operation::ReloadAround { page: 1 },
                &Window::new(),
                total,
                &mut rasterizer,
            )
            .unwrap();
            let size = window.len();

            for current in 2..=total {
                window = run(forward(current), &window, total, &mut rasterizer).unwrap();
                assert!(window.is_consistent(total), "{total}: {:?}", window.pages());
                assert_eq!(window.len(), size);
                assert!(window.contains_page(current));
            }
            for current in (1..total).rev() {
                window = run(backward(current), &window, total, &mut rasterizer).unwrap();
                assert!(window.is_consistent(total), "{total}: {:?}", window.pages());
                assert_eq!(window.len(), size);
                assert!(window.contains_page(current));
            }
            assert!(rasterizer.requested.iter().all(|&p| (1..=total).contains(&p)));
        }
    }
}
