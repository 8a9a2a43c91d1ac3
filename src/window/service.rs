//! Window manager - owns viewer state and the operation queue

use std::sync::Arc;

use flume::{Receiver, Sender};
use log::{debug, info};

use super::geometry::{GeometryError, PageGeometry};
use super::operation::Operation;
use super::queue::OperationQueue;
use super::rasterizer::{CachedRasterizer, PageRasterizer};
use super::request::ViewerEvent;
use super::state::{Command, Effect, ViewerConfig, ViewerState};
use super::types::{DocumentHandle, DocumentId, Generation, Window};

/// One viewer instance: scroll state, the page window and its queue.
///
/// Presentation code feeds intents in (`scroll_to`, `jump_to_page`, zoom)
/// and reads [`ViewerEvent`]s back out.
pub struct WindowManager<R: PageRasterizer> {
    state: ViewerState,
    queue: OperationQueue<CachedRasterizer<R>>,
    events_tx: Sender<ViewerEvent<R::Image>>,
    events_rx: Receiver<ViewerEvent<R::Image>>,
    document: Option<DocumentHandle<R::Document>>,
    next_document_id: u64,
}

impl<R: PageRasterizer> WindowManager<R> {
    /// Create a manager with default configuration
    pub fn new(rasterizer: R) -> Result<Self, GeometryError> {
        Self::with_config(rasterizer, &ViewerConfig::default())
    }

    /// Create a manager with custom configuration
    pub fn with_config(rasterizer: R, config: &ViewerConfig) -> Result<Self, GeometryError> {
        let state = ViewerState::new(config)?;
        let (events_tx, events_rx) = flume::unbounded();
        let rasterizer = CachedRasterizer::new(rasterizer, config.render_cache_pages);
        let queue = OperationQueue::spawn(rasterizer, config.window_size, events_tx.clone());

        Ok(Self {
            state,
            queue,
            events_tx,
            events_rx,
            document: None,
            next_document_id: 1,
        })
    }

    /// Replace the current document and load its first pages.
    ///
    /// Anything still queued or rendering for the previous document is
    /// discarded.
    pub fn load_document(&mut self, document: R::Document, page_count: usize) -> DocumentId {
        let id = DocumentId(self.next_document_id);
        self.next_document_id += 1;
        info!("loading {id} with {page_count} pages");

        self.document = Some(DocumentHandle::new(id, Arc::new(document), page_count));

        // Announce before any job for the new generation is queued
        let generation = self.queue.generation().next();
        let _ = self.events_tx.send(ViewerEvent::DocumentLoaded {
            generation,
            total_pages: page_count,
        });
        self.apply_command(Command::LoadDocument { page_count });
        debug_assert_eq!(self.queue.generation(), generation);
        id
    }

    /// Apply a command to the viewer state
    pub fn apply_command(&mut self, cmd: Command) {
        let effects = self.state.apply(cmd);
        self.execute_effects(effects);
    }

    fn execute_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ClearWindow => {
                    self.queue.clear();
                }

                Effect::LoadAround(page) => {
                    self.enqueue(Operation::ReloadAround { page });
                }

                Effect::CheckSlide {
                    current_page,
                    direction,
                } => {
                    self.enqueue(Operation::Slide {
                        current_page,
                        direction,
                    });
                }

                Effect::ScrollTo(offset) => {
                    let _ = self.events_tx.send(ViewerEvent::ScrollTo(offset));
                }

                Effect::PublishCurrentPage(page) => {
                    let _ = self.events_tx.send(ViewerEvent::CurrentPageChanged(page));
                }
            }
        }
    }

    fn enqueue(&self, op: Operation) {
        match &self.document {
            Some(document) => self.queue.enqueue(document, op),
            None => debug!("no document, dropping {op:?}"),
        }
    }

    /// The viewport scrolled
    pub fn scroll_to(&mut self, offset: f64) {
        self.apply_command(Command::Scroll(offset));
    }

    /// Rebuild the window around `page` and scroll there
    pub fn jump_to_page(&mut self, page: usize) {
        self.apply_command(Command::JumpToPage(page));
    }

    pub fn next_page(&mut self) {
        self.apply_command(Command::NextPage);
    }

    pub fn previous_page(&mut self) {
        self.apply_command(Command::PreviousPage);
    }

    pub fn zoom_in(&mut self) {
        self.apply_command(Command::ZoomIn);
    }

    pub fn zoom_out(&mut self) {
        self.apply_command(Command::ZoomOut);
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.apply_command(Command::SetScale(scale));
    }

    pub fn pinch(&mut self, distance: f64) {
        self.apply_command(Command::Pinch(distance));
    }

    pub fn end_pinch(&mut self) {
        self.apply_command(Command::EndPinch);
    }

    pub fn set_viewer_width(&mut self, width: f64) {
        self.apply_command(Command::SetViewerWidth(width));
    }

    /// Retry loading around the current page, e.g. after a render failure
    pub fn reload(&mut self) {
        self.apply_command(Command::Reload);
    }

    /// Drain all events published so far
    pub fn poll_events(&self) -> Vec<ViewerEvent<R::Image>> {
        self.events_rx.try_iter().collect()
    }

    /// Get the event receiver for blocking or async usage
    #[must_use]
    pub fn event_receiver(&self) -> &Receiver<ViewerEvent<R::Image>> {
        &self.events_rx
    }

    /// Latest window published by the queue
    #[must_use]
    pub fn window(&self) -> Window<R::Image> {
        self.queue.window()
    }

    #[must_use]
    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    #[must_use]
    pub fn geometry(&self) -> &PageGeometry {
        &self.state.geometry
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.state.current_page
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.state.page_count
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.queue.generation()
    }

    #[must_use]
    pub fn document(&self) -> Option<&DocumentHandle<R::Document>> {
        self.document.as_ref()
    }

    /// Operations waiting in the queue
    #[must_use]
    pub fn pending_operations(&self) -> usize {
        self.queue.pending()
    }
}
