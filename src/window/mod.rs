//! Virtualized page window
//!
//! Keeps a small, contiguous run of rendered pages around the current scroll
//! position instead of materializing the whole document.

mod geometry;
mod operation;
mod policy;
mod queue;
mod rasterizer;
mod request;
mod service;
mod state;
mod types;
mod zoom;

pub use geometry::{
    GeometryError, ISO_216_RATIO, PageGeometry, base_page_height_for_width, rescale_offset,
};
pub use operation::{Operation, PageFailure, execute};
pub use policy::{WindowDecision, batch_range, decide, midpoint_page};
pub use queue::OperationQueue;
pub use rasterizer::{CacheKey, CachedRasterizer, PageRasterizer, check_page_range};
pub use request::{RenderFault, ViewerEvent};
pub use service::WindowManager;
pub use state::{Command, Effect, ViewerConfig, ViewerState};
pub use types::{DocumentHandle, DocumentId, Generation, PageEntry, ScrollDirection, Window};
pub use zoom::Zoom;

/// Default number of pages kept rendered
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Default gap between pages
pub const DEFAULT_PAGE_SPACING: f64 = 15.0;

/// Default viewport width
pub const DEFAULT_VIEWER_WIDTH: f64 = 590.0;

/// Default render cache capacity in pages
pub const DEFAULT_CACHE_PAGES: usize = 16;
