//! Operation queue - serializes every window mutation on one drain thread
//!
//! All operations go through a single FIFO channel. The drain thread owns the
//! rasterizer and the authoritative window: it pulls one job, runs it to
//! completion (blocking on renders), applies the result, publishes it and only
//! then pulls the next. Producers never block.
//!
//! Each job is tagged with the generation that was current when it was
//! enqueued. [`OperationQueue::clear`] bumps the generation, so everything
//! still queued is skipped and an in-flight result is thrown away instead of
//! landing in the fresh window. Reading or bumping the generation and sending
//! the job happen under one lock, so channel order matches generation order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use flume::{Receiver, Sender};
use log::{debug, error, info, warn};

use super::operation::{Operation, PageFailure, execute};
use super::rasterizer::PageRasterizer;
use super::request::{RenderFault, ViewerEvent};
use super::types::{DocumentHandle, Generation, Window};

enum Job<D> {
    Run {
        generation: Generation,
        document: DocumentHandle<D>,
        op: Operation,
    },
    Clear {
        generation: Generation,
    },
    Shutdown,
}

/// Serialized queue of window operations
pub struct OperationQueue<R: PageRasterizer> {
    job_tx: Mutex<Sender<Job<R::Document>>>,
    generation: Arc<AtomicU64>,
    window: Arc<Mutex<Window<R::Image>>>,
}

impl<R: PageRasterizer> OperationQueue<R> {
    /// Spawn the drain thread.
    ///
    /// Every applied operation is published on `events`.
    #[must_use]
    pub fn spawn(rasterizer: R, window_size: usize, events: Sender<ViewerEvent<R::Image>>) -> Self {
        let (job_tx, job_rx) = flume::unbounded();
        let generation = Arc::new(AtomicU64::new(0));
        let window = Arc::new(Mutex::new(Window::new()));

        let worker = DrainLoop {
            rasterizer,
            window_size: window_size.max(1),
            generation: Arc::clone(&generation),
            shared: Arc::clone(&window),
            current: Window::new(),
            events,
        };
        std::thread::spawn(move || worker.run(job_rx));

        Self {
            job_tx: Mutex::new(job_tx),
            generation,
            window,
        }
    }

    fn sender(&self) -> MutexGuard<'_, Sender<Job<R::Document>>> {
        self.job_tx.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generation that newly enqueued operations are tagged with
    #[must_use]
    pub fn generation(&self) -> Generation {
        Generation::new(self.generation.load(Ordering::SeqCst))
    }

    /// Append an operation; returns immediately
    pub fn enqueue(&self, document: &DocumentHandle<R::Document>, op: Operation) {
        let tx = self.sender();
        let generation = self.generation();
        debug!("enqueue {op:?} under {generation}");
        let job = Job::Run {
            generation,
            document: document.clone(),
            op,
        };
        if tx.send(job).is_err() {
            warn!("operation queue is shut down, dropping {op:?}");
        }
    }

    /// Discard all pending operations and empty the window.
    ///
    /// Returns the new generation.
    pub fn clear(&self) -> Generation {
        let tx = self.sender();
        let generation = Generation::new(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
        debug!("clear -> {generation}");
        if tx.send(Job::Clear { generation }).is_err() {
            warn!("operation queue is shut down, clear not delivered");
        }
        generation
    }

    /// Number of jobs waiting to be drained (including skipped stale ones)
    #[must_use]
    pub fn pending(&self) -> usize {
        self.sender().len()
    }

    /// Latest published window
    #[must_use]
    pub fn window(&self) -> Window<R::Image> {
        self.window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stop the drain thread after the jobs already queued
    pub fn shutdown(&self) {
        let _ = self.sender().send(Job::Shutdown);
    }
}

impl<R: PageRasterizer> Drop for OperationQueue<R> {
    /// Queued jobs go stale and an in-flight render stops at its next page
    fn drop(&mut self) {
        {
            let tx = self.sender();
            self.generation.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(Job::Shutdown);
        }
        debug!("operation queue dropped at {}", self.generation());
    }
}

struct DrainLoop<R: PageRasterizer> {
    rasterizer: R,
    window_size: usize,
    generation: Arc<AtomicU64>,
    shared: Arc<Mutex<Window<R::Image>>>,
    /// Authoritative window, only ever written here
    current: Window<R::Image>,
    events: Sender<ViewerEvent<R::Image>>,
}

impl<R: PageRasterizer> DrainLoop<R> {
    fn run(mut self, jobs: Receiver<Job<R::Document>>) {
        for job in jobs {
            match job {
                Job::Run {
                    generation,
                    document,
                    op,
                } => self.run_operation(generation, &document, op),

                Job::Clear { generation } => {
                    if generation != self.live_generation() {
                        debug!("skipping superseded clear {generation}");
                        continue;
                    }
                    self.current = Window::new();
                    self.publish(generation);
                }

                Job::Shutdown => break,
            }
        }
        info!("operation queue drained, exiting");
    }

    fn live_generation(&self) -> Generation {
        Generation::new(self.generation.load(Ordering::SeqCst))
    }

    fn run_operation(
        &mut self,
        generation: Generation,
        document: &DocumentHandle<R::Document>,
        op: Operation,
    ) {
        if generation != self.live_generation() {
            debug!("skipping stale {op:?} from {generation}");
            return;
        }

        let live = Arc::clone(&self.generation);
        let is_current = move || -> Result<(), RenderFault> {
            let current = Generation::new(live.load(Ordering::SeqCst));
            if current == generation {
                Ok(())
            } else {
                Err(RenderFault::Stale {
                    requested: generation,
                    current,
                })
            }
        };

        let result = execute(
            op,
            &self.current,
            document,
            &mut self.rasterizer,
            self.window_size,
            &is_current,
        );

        // A clear may have landed while we were rendering
        if let Err(stale) = is_current() {
            debug!("discarding result of {op:?}: {stale}");
            return;
        }

        match result {
            Ok(window) => {
                debug_assert!(window.is_consistent(document.total_pages()));
                self.current = window;
            }
            Err(PageFailure {
                error: RenderFault::Stale { .. },
                ..
            }) => {
                debug!("{op:?} superseded mid-render");
                return;
            }
            Err(PageFailure { page, error }) => {
                error!("{op:?} failed on page {page}: {error}");
                let _ = self.events.send(ViewerEvent::RenderFailed {
                    generation,
                    page,
                    error,
                });
            }
        }
        self.publish(generation);
    }

    fn publish(&self, generation: Generation) {
        *self
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = self.current.clone();
        let _ = self.events.send(ViewerEvent::WindowChanged {
            generation,
            window: self.current.clone(),
        });
    }
}
