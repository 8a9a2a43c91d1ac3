//! Deterministic in-process rasterizer
//!
//! Stands in for a real PDF backend in the driver binary and in tests: pages
//! render to a short label after an optional delay, and selected pages fail.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use log::trace;

use crate::window::{DocumentHandle, PageRasterizer, RenderFault, check_page_range};

/// A document that only knows its title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticDocument {
    pub title: String,
}

impl SyntheticDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// The "image" produced for one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticPage {
    pub page: usize,
    pub label: Arc<str>,
}

#[derive(Debug, Default)]
pub struct SyntheticRasterizer {
    latency: Duration,
    failing: HashSet<usize>,
    renders: Arc<AtomicUsize>,
}

impl SyntheticRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long before every page
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail every render of `page`
    #[must_use]
    pub fn failing_on(mut self, pages: impl IntoIterator<Item = usize>) -> Self {
        self.failing.extend(pages);
        self
    }

    /// Shared counter of completed renders, readable after the rasterizer
    /// has moved onto the drain thread
    #[must_use]
    pub fn render_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.renders)
    }
}

impl PageRasterizer for SyntheticRasterizer {
    type Document = SyntheticDocument;
    type Image = SyntheticPage;

    fn render(
        &mut self,
        document: &DocumentHandle<SyntheticDocument>,
        page: usize,
    ) -> Result<SyntheticPage, RenderFault> {
        check_page_range(document, page)?;
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        if self.failing.contains(&page) {
            return Err(RenderFault::rasterizer(format!(
                "synthetic failure on page {page}"
            )));
        }

        self.renders.fetch_add(1, Ordering::SeqCst);
        trace!("rendered {} page {page}", document.id());
        Ok(SyntheticPage {
            page,
            label: format!("{} p{page}", document.document().title).into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::DocumentId;

    fn handle(total: usize) -> DocumentHandle<SyntheticDocument> {
        DocumentHandle::new(DocumentId(1), Arc::new(SyntheticDocument::new("demo")), total)
    }

    #[test]
    fn renders_labelled_pages() {
        let mut rasterizer = SyntheticRasterizer::new();
        let page = rasterizer.render(&handle(3), 2).unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(&*page.label, "demo p2");
        assert_eq!(rasterizer.render_counter().load(Ordering::SeqCst), 1);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut rasterizer = SyntheticRasterizer::new();
        assert_eq!(
            rasterizer.render(&handle(3), 4),
            Err(RenderFault::PageOutOfRange {
                page: 4,
                total_pages: 3
            })
        );
        assert!(rasterizer.render(&handle(3), 0).is_err());
    }

    #[test]
    fn failing_pages_fail_every_time() {
        let mut rasterizer = SyntheticRasterizer::new().failing_on([2]);
        assert!(rasterizer.render(&handle(3), 2).is_err());
        assert!(rasterizer.render(&handle(3), 2).is_err());
        assert!(rasterizer.render(&handle(3), 1).is_ok());
        assert_eq!(rasterizer.render_counter().load(Ordering::SeqCst), 1);
    }
}
