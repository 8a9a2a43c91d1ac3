//! Render faults and the events published to the presentation layer

use super::types::{Generation, Window};

/// Errors from the page rasterizer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderFault {
    #[error("page {page} is outside 1..={total_pages}")]
    PageOutOfRange { page: usize, total_pages: usize },

    #[error("render superseded by {current} (requested under {requested})")]
    Stale {
        requested: Generation,
        current: Generation,
    },

    #[error("{detail}")]
    Rasterizer { detail: String },
}

impl RenderFault {
    pub fn rasterizer(msg: impl Into<String>) -> Self {
        Self::Rasterizer { detail: msg.into() }
    }
}

/// Published by the window core after every state change
#[derive(Debug, Clone)]
pub enum ViewerEvent<I> {
    /// The queue applied an operation; emitted once per operation, in order
    WindowChanged {
        generation: Generation,
        window: Window<I>,
    },

    /// Scrolling moved the current page
    CurrentPageChanged(usize),

    /// The core wants the viewport scrolled (zoom, jump, resize, page up/down)
    ScrollTo(f64),

    /// A page could not be rendered; the window was left as it was
    RenderFailed {
        generation: Generation,
        page: usize,
        error: RenderFault,
    },

    /// A new document was accepted
    DocumentLoaded {
        generation: Generation,
        total_pages: usize,
    },
}
