//! Page rasterizer seam and an LRU cache in front of it

use std::num::NonZeroUsize;

use log::trace;
use lru::LruCache;

use super::request::RenderFault;
use super::types::{DocumentHandle, DocumentId};

/// Produces a displayable image for one page of a document.
///
/// Runs on the queue's drain thread; a call may block for as long as
/// rendering takes. Implementations must fail with
/// [`RenderFault::PageOutOfRange`] for pages outside `1..=total_pages`.
pub trait PageRasterizer: Send + 'static {
    type Document: Send + Sync + 'static;
    type Image: Clone + Send + 'static;

    fn render(
        &mut self,
        document: &DocumentHandle<Self::Document>,
        page: usize,
    ) -> Result<Self::Image, RenderFault>;
}

/// Shared range check for rasterizer implementations
pub fn check_page_range<D>(document: &DocumentHandle<D>, page: usize) -> Result<(), RenderFault> {
    if page == 0 || page > document.total_pages() {
        return Err(RenderFault::PageOutOfRange {
            page,
            total_pages: document.total_pages(),
        });
    }
    Ok(())
}

/// Cache key for rendered pages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub document: DocumentId,
    /// Page number (1-indexed)
    pub page: usize,
}

/// Rasterizer wrapper that keeps recently rendered pages.
///
/// Sliding back and forth over the same pages hits the cache instead of the
/// inner rasterizer. Entries are keyed by document id, so a new document
/// never sees images of the previous one.
pub struct CachedRasterizer<R: PageRasterizer> {
    inner: R,
    cache: Option<LruCache<CacheKey, R::Image>>,
}

impl<R: PageRasterizer> CachedRasterizer<R> {
    /// Wrap `inner`; a capacity of 0 disables caching
    #[must_use]
    pub fn new(inner: R, capacity: usize) -> Self {
        Self {
            inner,
            cache: NonZeroUsize::new(capacity).map(LruCache::new),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Number of cached pages
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.as_ref().map_or(0, LruCache::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: PageRasterizer> PageRasterizer for CachedRasterizer<R> {
    type Document = R::Document;
    type Image = R::Image;

    fn render(
        &mut self,
        document: &DocumentHandle<Self::Document>,
        page: usize,
    ) -> Result<Self::Image, RenderFault> {
        let key = CacheKey {
            document: document.id(),
            page,
        };
        if let Some(image) = self.cache.as_mut().and_then(|c| c.get(&key)) {
            trace!("render cache hit for page {page} ({})", key.document);
            return Ok(image.clone());
        }

        let image = self.inner.render(document, page)?;
        if let Some(cache) = self.cache.as_mut() {
            cache.put(key, image.clone());
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// Counts calls, renders the page number
    struct Counting {
        calls: usize,
    }

    impl PageRasterizer for Counting {
        type Document = ();
        type Image = usize;

        fn render(
            &mut self,
            document: &DocumentHandle<()>,
            page: usize,
        ) -> Result<usize, RenderFault> {
            check_page_range(document, page)?;
            self.calls += 1;
            Ok(page)
        }
    }

    fn doc(id: u64) -> DocumentHandle<()> {
        DocumentHandle::new(DocumentId(id), Arc::new(()), 10)
    }

    #[test]
    fn cache_hit_skips_inner() {
        let mut cached = CachedRasterizer::new(Counting { calls: 0 }, 4);
        let doc = doc(1);

        assert_eq!(cached.render(&doc, 3), Ok(3));
        assert_eq!(cached.render(&doc, 3), Ok(3));
        assert_eq!(cached.inner().calls, 1);
        assert_eq!(cached.len(), 1);
    }

    #[test]
    fn new_document_misses() {
        let mut cached = CachedRasterizer::new(Counting { calls: 0 }, 4);
        cached.render(&doc(1), 3).unwrap();
        cached.render(&doc(2), 3).unwrap();
        assert_eq!(cached.inner().calls, 2);
        assert_eq!(cached.len(), 2);
    }

    #[test]
    fn lru_eviction() {
        let mut cached = CachedRasterizer::new(Counting { calls: 0 }, 2);
        let doc = doc(1);
        for page in 1..=3 {
            cached.render(&doc, page).unwrap();
        }
        assert_eq!(cached.len(), 2);
        cached.render(&doc, 1).unwrap();
        assert_eq!(cached.inner().calls, 4);
    }

    #[test]
    fn zero_capacity_disables_cache() {
        let mut cached = CachedRasterizer::new(Counting { calls: 0 }, 0);
        let doc = doc(1);
        cached.render(&doc, 2).unwrap();
        cached.render(&doc, 2).unwrap();
        assert_eq!(cached.inner().calls, 2);
        assert!(cached.is_empty());
    }

    #[test]
    fn out_of_range_is_not_cached() {
        let mut cached = CachedRasterizer::new(Counting { calls: 0 }, 4);
        let doc = doc(1);
        assert_eq!(
            cached.render(&doc, 11),
            Err(RenderFault::PageOutOfRange {
                page: 11,
                total_pages: 10
            })
        );
        assert!(cached.render(&doc, 0).is_err());
        assert!(cached.is_empty());
    }
}
