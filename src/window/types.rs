//! Core types for the page window

use std::fmt;
use std::sync::Arc;

/// Window epoch used to recognise stale operations and renders.
///
/// Bumped every time the window is discarded: a new document, or a jump
/// that rebuilds the window elsewhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl Generation {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Identity of a loaded document, unique per load
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// Direction of the most recent scroll movement
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Forward,
    Backward,
}

impl ScrollDirection {
    /// Direction implied by moving from `previous` to `current`, if any
    #[must_use]
    pub fn between(previous: usize, current: usize) -> Option<Self> {
        match current.cmp(&previous) {
            std::cmp::Ordering::Greater => Some(Self::Forward),
            std::cmp::Ordering::Less => Some(Self::Backward),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// A loaded document as seen by the window core.
///
/// The page count is fixed for the lifetime of the handle.
pub struct DocumentHandle<D> {
    id: DocumentId,
    document: Arc<D>,
    total_pages: usize,
}

impl<D> DocumentHandle<D> {
    #[must_use]
    pub fn new(id: DocumentId, document: Arc<D>, total_pages: usize) -> Self {
        Self {
            id,
            document,
            total_pages,
        }
    }

    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.id
    }

    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }
}

impl<D> Clone for DocumentHandle<D> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            document: Arc::clone(&self.document),
            total_pages: self.total_pages,
        }
    }
}

impl<D> fmt::Debug for DocumentHandle<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentHandle")
            .field("id", &self.id)
            .field("total_pages", &self.total_pages)
            .finish_non_exhaustive()
    }
}

/// One materialized page
#[derive(Clone, Debug, PartialEq)]
pub struct PageEntry<I> {
    /// Page number (1-indexed)
    pub page: usize,
    /// Rendered image resource
    pub resource: I,
}

impl<I> PageEntry<I> {
    #[must_use]
    pub fn new(page: usize, resource: I) -> Self {
        Self { page, resource }
    }
}

/// Contiguous, ascending run of materialized pages.
///
/// Mutated only through [`Window::push_back`], [`Window::push_front`] and the
/// eviction helpers, all of which refuse to break contiguity.
#[derive(Clone, Debug, PartialEq)]
pub struct Window<I> {
    entries: Vec<PageEntry<I>>,
}

impl<I> Default for Window<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> Window<I> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[PageEntry<I>] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First materialized page number
    #[must_use]
    pub fn first_page(&self) -> Option<usize> {
        self.entries.first().map(|e| e.page)
    }

    /// Last materialized page number
    #[must_use]
    pub fn last_page(&self) -> Option<usize> {
        self.entries.last().map(|e| e.page)
    }

    #[must_use]
    pub fn contains_page(&self, page: usize) -> bool {
        matches!(
            (self.first_page(), self.last_page()),
            (Some(first), Some(last)) if (first..=last).contains(&page)
        )
    }

    #[must_use]
    pub fn get(&self, page: usize) -> Option<&PageEntry<I>> {
        let first = self.first_page()?;
        self.entries.get(page.checked_sub(first)?)
    }

    /// Page numbers in window order
    #[must_use]
    pub fn pages(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.page).collect()
    }

    /// Append the page following the current last page.
    ///
    /// Returns the entry back if it would break contiguity.
    pub fn push_back(&mut self, entry: PageEntry<I>) -> Result<(), PageEntry<I>> {
        match self.last_page() {
            Some(last) if entry.page != last + 1 => Err(entry),
            _ => {
                self.entries.push(entry);
                Ok(())
            }
        }
    }

    /// Prepend the page preceding the current first page.
    pub fn push_front(&mut self, entry: PageEntry<I>) -> Result<(), PageEntry<I>> {
        match self.first_page() {
            Some(first) if entry.page + 1 != first => Err(entry),
            _ => {
                self.entries.insert(0, entry);
                Ok(())
            }
        }
    }

    /// Evict the leading entry, never the last remaining one
    pub fn evict_front(&mut self) -> Option<PageEntry<I>> {
        if self.entries.len() > 1 {
            Some(self.entries.remove(0))
        } else {
            None
        }
    }

    /// Evict the trailing entry, never the last remaining one
    pub fn evict_back(&mut self) -> Option<PageEntry<I>> {
        if self.entries.len() > 1 {
            self.entries.pop()
        } else {
            None
        }
    }

    /// Whether entries are ascending, gap-free and inside `1..=total_pages`
    #[must_use]
    pub fn is_consistent(&self, total_pages: usize) -> bool {
        let contiguous = self
            .entries
            .windows(2)
            .all(|pair| pair[1].page == pair[0].page + 1);
        let bounded = match (self.first_page(), self.last_page()) {
            (Some(first), Some(last)) => first >= 1 && last <= total_pages,
            _ => true,
        };
        contiguous && bounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_of(pages: std::ops::RangeInclusive<usize>) -> Window<usize> {
        let mut window = Window::new();
        for page in pages {
            window.push_back(PageEntry::new(page, page * 10)).unwrap();
        }
        window
    }

    #[test]
    fn push_back_rejects_gap() {
        let mut window = window_of(1..=3);
        let rejected = window.push_back(PageEntry::new(5, 50));
        assert_eq!(rejected.unwrap_err().page, 5);
        assert_eq!(window.pages(), vec![1, 2, 3]);
    }

    #[test]
    fn push_front_rejects_gap() {
        let mut window = window_of(4..=6);
        assert!(window.push_front(PageEntry::new(2, 20)).is_err());
        assert!(window.push_front(PageEntry::new(3, 30)).is_ok());
        assert_eq!(window.pages(), vec![3, 4, 5, 6]);
    }

    #[test]
    fn eviction_keeps_last_entry() {
        let mut window = window_of(7..=7);
        assert!(window.evict_front().is_none());
        assert!(window.evict_back().is_none());
        assert_eq!(window.pages(), vec![7]);
    }

    #[test]
    fn get_resolves_by_page_number() {
        let window = window_of(3..=5);
        assert_eq!(window.get(4).map(|e| e.resource), Some(40));
        assert!(window.get(2).is_none());
        assert!(window.get(6).is_none());
        assert!(window.contains_page(5));
        assert!(!window.contains_page(6));
    }

    #[test]
    fn consistency_checks_bounds() {
        let window = window_of(16..=20);
        assert!(window.is_consistent(20));
        assert!(!window.is_consistent(19));
        assert!(Window::<usize>::new().is_consistent(0));
    }

    #[test]
    fn direction_between_pages() {
        assert_eq!(
            ScrollDirection::between(3, 4),
            Some(ScrollDirection::Forward)
        );
        assert_eq!(
            ScrollDirection::between(4, 3),
            Some(ScrollDirection::Backward)
        );
        assert_eq!(ScrollDirection::between(4, 4), None);
    }
}
