//! Scroll offset <-> page number mapping
//!
//! Pages are stacked vertically, each `page_height` tall (at the current
//! scale) and separated by `page_spacing`. Page numbers are 1-indexed
//! everywhere in this module.

/// Aspect ratio of ISO 216 paper (A-series), height over width
pub const ISO_216_RATIO: f64 = std::f64::consts::SQRT_2;

/// Widest page the viewer lays out at scale 1.0
pub const MAX_BASE_PAGE_WIDTH: f64 = 500.0;

/// Horizontal padding subtracted from the viewer width before sizing a page
pub const VIEWER_HORIZONTAL_PADDING: f64 = 20.0;

/// Offset added before dividing so a page counts as current from its first pixel
const SCROLL_EPSILON: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("effective page height must be at least {min}, got {actual}")]
    PageTooSmall { min: f64, actual: f64 },

    #[error("scale must be finite and positive, got {0}")]
    InvalidScale(f64),
}

/// Viewport geometry supplied by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Page height at scale 1.0
    pub base_page_height: f64,
    /// Gap between consecutive pages (not scaled)
    pub page_spacing: f64,
    /// Current zoom factor
    pub scale: f64,
}

impl PageGeometry {
    pub fn new(
        base_page_height: f64,
        page_spacing: f64,
        scale: f64,
    ) -> Result<Self, GeometryError> {
        let geometry = Self {
            base_page_height,
            page_spacing,
            scale,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Size pages to fit a viewer of the given width, ISO 216 proportions
    pub fn for_viewer_width(viewer_width: f64, page_spacing: f64) -> Result<Self, GeometryError> {
        Self::new(base_page_height_for_width(viewer_width), page_spacing, 1.0)
    }

    fn validate(&self) -> Result<(), GeometryError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(GeometryError::InvalidScale(self.scale));
        }
        let effective = self.effective_page_height();
        if !effective.is_finite() || effective < SCROLL_EPSILON {
            return Err(GeometryError::PageTooSmall {
                min: SCROLL_EPSILON,
                actual: effective,
            });
        }
        Ok(())
    }

    /// Same geometry at a different scale
    pub fn with_scale(&self, scale: f64) -> Result<Self, GeometryError> {
        Self::new(self.base_page_height, self.page_spacing, scale)
    }

    /// Same geometry for a different viewer width, keeping the scale
    pub fn with_viewer_width(&self, viewer_width: f64) -> Result<Self, GeometryError> {
        Self::new(
            base_page_height_for_width(viewer_width),
            self.page_spacing,
            self.scale,
        )
    }

    /// Page height at the current scale
    #[must_use]
    pub fn page_height(&self) -> f64 {
        self.base_page_height * self.scale
    }

    /// Page height plus spacing: the scroll distance covered by one page
    #[must_use]
    pub fn effective_page_height(&self) -> f64 {
        self.page_height() + self.page_spacing
    }

    /// Current page for a scroll offset, clamped to `1..=total_pages`
    #[must_use]
    pub fn page_from_offset(&self, scroll_offset: f64, total_pages: usize) -> usize {
        let raw = ((scroll_offset.max(0.0) + SCROLL_EPSILON) / self.effective_page_height()).ceil();
        (raw as usize).clamp(1, total_pages.max(1))
    }

    /// Scroll offset that puts `page` at the top of the viewport
    #[must_use]
    pub fn offset_from_page(&self, page: usize) -> f64 {
        page.saturating_sub(1) as f64 * self.effective_page_height()
    }

    /// Distance from the top of the document container to the top of `page`
    #[must_use]
    pub fn page_top(&self, page: usize) -> f64 {
        page.saturating_sub(1) as f64 * self.page_height() + self.page_spacing * page as f64
    }

    /// Full scrollable height for a document of `total_pages`
    #[must_use]
    pub fn container_height(&self, total_pages: usize) -> f64 {
        total_pages as f64 * self.page_height() + (total_pages + 1) as f64 * self.page_spacing
    }
}

/// Page height at scale 1.0 for a viewer of the given width
#[must_use]
pub fn base_page_height_for_width(viewer_width: f64) -> f64 {
    let width = (viewer_width - VIEWER_HORIZONTAL_PADDING).min(MAX_BASE_PAGE_WIDTH);
    width.max(0.0) * ISO_216_RATIO
}

/// Proportionally carry a scroll offset across a scale change.
///
/// An offset of zero stays at the top.
#[must_use]
pub fn rescale_offset(scroll_offset: f64, old_scale: f64, new_scale: f64) -> f64 {
    if scroll_offset == 0.0 || old_scale <= 0.0 {
        return scroll_offset;
    }
    scroll_offset * (new_scale / old_scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> PageGeometry {
        PageGeometry::new(600.0, 15.0, 1.0).unwrap()
    }

    #[test]
    fn effective_height_includes_spacing() {
        assert_eq!(geometry().effective_page_height(), 615.0);
    }

    #[test]
    fn round_trip_page_seven() {
        let g = geometry();
        assert_eq!(g.page_from_offset(g.offset_from_page(7), 20), 7);
    }

    #[test]
    fn round_trip_every_page_at_several_scales() {
        for scale in [0.2, 0.6, 1.0, 1.4, 2.0] {
            let g = geometry().with_scale(scale).unwrap();
            for page in 1..=200 {
                assert_eq!(g.page_from_offset(g.offset_from_page(page), 200), page);
            }
        }
    }

    #[test]
    fn page_from_offset_is_monotonic() {
        let g = geometry();
        let mut previous = 1;
        for offset in (0..20_000).step_by(7) {
            let page = g.page_from_offset(f64::from(offset), 40);
            assert!(page >= previous);
            previous = page;
        }
    }

    #[test]
    fn page_from_offset_clamps() {
        let g = geometry();
        assert_eq!(g.page_from_offset(-50.0, 10), 1);
        assert_eq!(g.page_from_offset(1e9, 10), 10);
        assert_eq!(g.page_from_offset(0.0, 0), 1);
    }

    #[test]
    fn page_changes_just_before_boundary() {
        let g = geometry();
        assert_eq!(g.page_from_offset(614.0, 10), 1);
        assert_eq!(g.page_from_offset(614.5, 10), 2);
        assert_eq!(g.page_from_offset(615.0, 10), 2);
    }

    #[test]
    fn rescale_is_proportional() {
        assert_eq!(rescale_offset(1000.0, 1.0, 1.5), 1500.0);
        assert_eq!(rescale_offset(0.0, 1.0, 1.5), 0.0);
    }

    #[test]
    fn layout_helpers() {
        let g = geometry();
        assert_eq!(g.page_top(1), 15.0);
        assert_eq!(g.page_top(3), 2.0 * 600.0 + 45.0);
        assert_eq!(g.container_height(2), 1200.0 + 45.0);
    }

    #[test]
    fn viewer_width_sizing_caps_page_width() {
        let wide = PageGeometry::for_viewer_width(950.0, 15.0).unwrap();
        assert!((wide.base_page_height - 500.0 * ISO_216_RATIO).abs() < 1e-9);

        let narrow = PageGeometry::for_viewer_width(310.0, 15.0).unwrap();
        assert!((narrow.base_page_height - 290.0 * ISO_216_RATIO).abs() < 1e-9);
    }

    #[test]
    fn rejects_degenerate_geometry() {
        assert!(matches!(
            PageGeometry::new(0.0, 0.5, 1.0),
            Err(GeometryError::PageTooSmall { .. })
        ));
        assert!(matches!(
            PageGeometry::new(600.0, 15.0, 0.0),
            Err(GeometryError::InvalidScale(_))
        ));
        assert!(PageGeometry::new(600.0, 15.0, f64::NAN).is_err());
    }
}
