//! Viewer state management
//!
//! Tracks scroll offset, current page, zoom and geometry, and turns
//! presentation-layer intents into effects for the window manager.

use log::warn;

use super::geometry::{GeometryError, PageGeometry, rescale_offset};
use super::types::ScrollDirection;
use super::zoom::Zoom;
use super::{DEFAULT_PAGE_SPACING, DEFAULT_VIEWER_WIDTH, DEFAULT_WINDOW_SIZE};

/// Tunables for a viewer instance
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    /// Maximum number of materialized pages
    pub window_size: usize,
    /// Gap between pages
    pub page_spacing: f64,
    /// Width of the viewport, used to size pages
    pub viewer_width: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub scale_step: f64,
    /// Rendered pages kept in the LRU cache (0 disables)
    pub render_cache_pages: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            page_spacing: DEFAULT_PAGE_SPACING,
            viewer_width: DEFAULT_VIEWER_WIDTH,
            min_scale: Zoom::MIN_SCALE,
            max_scale: Zoom::MAX_SCALE,
            scale_step: Zoom::STEP,
            render_cache_pages: super::DEFAULT_CACHE_PAGES,
        }
    }
}

/// Current scroll/zoom state of the viewer
#[derive(Clone, Debug)]
pub struct ViewerState {
    /// Page layout at the current scale
    pub geometry: PageGeometry,

    /// Zoom stepping
    pub zoom: Zoom,

    /// Viewport width the geometry was derived from
    pub viewer_width: f64,

    /// Vertical scroll offset
    pub scroll_offset: f64,

    /// Current page (1-indexed)
    pub current_page: usize,

    /// Total page count, 0 while no document is loaded
    pub page_count: usize,
}

impl ViewerState {
    pub fn new(config: &ViewerConfig) -> Result<Self, GeometryError> {
        let geometry = PageGeometry::for_viewer_width(config.viewer_width, config.page_spacing)?;
        Ok(Self {
            geometry,
            zoom: Zoom::new(config.min_scale, config.max_scale, config.scale_step),
            viewer_width: config.viewer_width,
            scroll_offset: 0.0,
            current_page: 1,
            page_count: 0,
        })
    }

    #[must_use]
    pub fn has_document(&self) -> bool {
        self.page_count > 0
    }

    /// Apply a command and return resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::LoadDocument { page_count } => self.load_document(page_count),

            // Without a document only the layout can change
            Command::SetViewerWidth(width) if !self.has_document() => {
                self.set_viewer_width(width);
                vec![]
            }
            _ if !self.has_document() => vec![],

            Command::Scroll(offset) => self.scroll(offset),

            Command::JumpToPage(page) => {
                let page = page.clamp(1, self.page_count);
                self.current_page = page;
                self.scroll_offset = self.geometry.offset_from_page(page);
                vec![
                    Effect::ClearWindow,
                    Effect::LoadAround(page),
                    Effect::ScrollTo(self.scroll_offset),
                    Effect::PublishCurrentPage(page),
                ]
            }

            Command::NextPage => {
                let page = (self.current_page + 1).min(self.page_count);
                self.scroll_to_page(page)
            }

            Command::PreviousPage => {
                let page = self.current_page.saturating_sub(1).max(1);
                self.scroll_to_page(page)
            }

            Command::ZoomIn => {
                let old = self.zoom.factor();
                self.zoom.step_in();
                self.rescale_from(old)
            }

            Command::ZoomOut => {
                let old = self.zoom.factor();
                self.zoom.step_out();
                self.rescale_from(old)
            }

            Command::SetScale(scale) => {
                let old = self.zoom.factor();
                self.zoom.set(scale);
                self.rescale_from(old)
            }

            Command::Pinch(distance) => {
                let old = self.zoom.factor();
                self.zoom.pinch(distance);
                self.rescale_from(old)
            }

            Command::EndPinch => {
                self.zoom.end_pinch();
                vec![]
            }

            Command::SetViewerWidth(width) => {
                if !self.set_viewer_width(width) {
                    return vec![];
                }
                self.scroll_offset = self.geometry.offset_from_page(self.current_page);
                vec![Effect::ScrollTo(self.scroll_offset)]
            }

            Command::Reload => vec![Effect::LoadAround(self.current_page)],
        }
    }

    fn load_document(&mut self, page_count: usize) -> Vec<Effect> {
        self.page_count = page_count;
        self.zoom.reset();
        self.set_scale(self.zoom.factor());
        self.scroll_offset = 0.0;
        self.current_page = 1;
        if page_count == 0 {
            return vec![Effect::ClearWindow];
        }
        vec![
            Effect::ClearWindow,
            Effect::LoadAround(1),
            Effect::ScrollTo(0.0),
            Effect::PublishCurrentPage(1),
        ]
    }

    fn scroll(&mut self, offset: f64) -> Vec<Effect> {
        if !offset.is_finite() {
            return vec![];
        }
        self.scroll_offset = offset.max(0.0);
        let page = self
            .geometry
            .page_from_offset(self.scroll_offset, self.page_count);

        let Some(direction) = ScrollDirection::between(self.current_page, page) else {
            return vec![];
        };
        self.current_page = page;
        vec![
            Effect::PublishCurrentPage(page),
            Effect::CheckSlide {
                current_page: page,
                direction,
            },
        ]
    }

    fn scroll_to_page(&mut self, page: usize) -> Vec<Effect> {
        let offset = self.geometry.offset_from_page(page);
        let mut effects = vec![Effect::ScrollTo(offset)];
        effects.extend(self.scroll(offset));
        effects
    }

    /// Carry the scroll position over a zoom change from `old` to the current factor
    fn rescale_from(&mut self, old: f64) -> Vec<Effect> {
        let new = self.zoom.factor();
        if (new - old).abs() <= f64::EPSILON || !self.set_scale(new) {
            return vec![];
        }
        if self.scroll_offset == 0.0 {
            return vec![];
        }
        self.scroll_offset = rescale_offset(self.scroll_offset, old, new);
        let mut effects = vec![Effect::ScrollTo(self.scroll_offset)];

        // Spacing does not scale, so the rescaled offset can land on another page
        let page = self
            .geometry
            .page_from_offset(self.scroll_offset, self.page_count);
        if let Some(direction) = ScrollDirection::between(self.current_page, page) {
            self.current_page = page;
            effects.push(Effect::PublishCurrentPage(page));
            effects.push(Effect::CheckSlide {
                current_page: page,
                direction,
            });
        }
        effects
    }

    fn set_scale(&mut self, scale: f64) -> bool {
        match self.geometry.with_scale(scale) {
            Ok(geometry) => {
                self.geometry = geometry;
                true
            }
            Err(e) => {
                warn!("ignoring scale {scale}: {e}");
                false
            }
        }
    }

    fn set_viewer_width(&mut self, width: f64) -> bool {
        match self.geometry.with_viewer_width(width) {
            Ok(geometry) => {
                self.geometry = geometry;
                self.viewer_width = width;
                true
            }
            Err(e) => {
                warn!("ignoring viewer width {width}: {e}");
                false
            }
        }
    }
}

/// Intents from the presentation layer
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// A new document was parsed
    LoadDocument { page_count: usize },
    /// The viewport scrolled to an offset
    Scroll(f64),
    /// Navigate directly to a page
    JumpToPage(usize),
    /// Scroll to the start of the following page
    NextPage,
    /// Scroll to the start of the preceding page
    PreviousPage,
    ZoomIn,
    ZoomOut,
    /// Set an explicit zoom factor
    SetScale(f64),
    /// Two-finger distance sample
    Pinch(f64),
    /// Touch gesture ended
    EndPinch,
    /// The viewport was resized
    SetViewerWidth(f64),
    /// Rebuild the window around the current page (retry after a failure)
    Reload,
}

/// Effects produced by state changes
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Discard the window and everything queued for it
    ClearWindow,
    /// Batch-load the window around a page
    LoadAround(usize),
    /// Let the policy decide whether the window slides
    CheckSlide {
        current_page: usize,
        direction: ScrollDirection,
    },
    /// Ask the presentation layer to scroll
    ScrollTo(f64),
    /// Current page changed
    PublishCurrentPage(usize),
}
