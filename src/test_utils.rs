pub mod test_helpers {
    use std::time::{Duration, Instant};

    use flume::Receiver;

    use crate::synthetic::{SyntheticDocument, SyntheticRasterizer};
    use crate::window::{Generation, ViewerConfig, ViewerEvent, Window, WindowManager};

    pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Manager over a synthetic document with `pages` pages
    pub fn synthetic_manager(
        rasterizer: SyntheticRasterizer,
        pages: usize,
    ) -> WindowManager<SyntheticRasterizer> {
        synthetic_manager_with_config(rasterizer, pages, &ViewerConfig::default())
    }

    pub fn synthetic_manager_with_config(
        rasterizer: SyntheticRasterizer,
        pages: usize,
        config: &ViewerConfig,
    ) -> WindowManager<SyntheticRasterizer> {
        let mut manager =
            WindowManager::with_config(rasterizer, config).expect("test config is valid");
        manager.load_document(SyntheticDocument::new("test"), pages);
        manager
    }

    /// Collects events off a receiver, keeping everything seen so far.
    ///
    /// `wait_for` and the window helpers consume events in order; `wait_seen`
    /// also matches events that an earlier wait already stepped over.
    pub struct EventLog<I> {
        rx: Receiver<ViewerEvent<I>>,
        pub events: Vec<ViewerEvent<I>>,
        cursor: usize,
    }

    impl<I: Clone> EventLog<I> {
        pub fn new(rx: Receiver<ViewerEvent<I>>) -> Self {
            Self {
                rx,
                events: Vec::new(),
                cursor: 0,
            }
        }

        fn receive(&mut self, deadline: Instant) -> &ViewerEvent<I> {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let event = self
                .rx
                .recv_timeout(remaining)
                .expect("timed out waiting for viewer event");
            self.events.push(event);
            &self.events[self.events.len() - 1]
        }

        /// Next event after the cursor matching `predicate`.
        ///
        /// Panics after [`EVENT_TIMEOUT`] without a match.
        pub fn wait_for(&mut self, predicate: impl Fn(&ViewerEvent<I>) -> bool) -> ViewerEvent<I> {
            let deadline = Instant::now() + EVENT_TIMEOUT;
            loop {
                if self.cursor == self.events.len() {
                    self.receive(deadline);
                }
                let event = &self.events[self.cursor];
                self.cursor += 1;
                if predicate(event) {
                    return event.clone();
                }
            }
        }

        /// Any event matching `predicate`, received now or earlier
        pub fn wait_seen(&mut self, predicate: impl Fn(&ViewerEvent<I>) -> bool) -> ViewerEvent<I> {
            if let Some(event) = self.events.iter().find(|e| predicate(*e)) {
                return event.clone();
            }
            let deadline = Instant::now() + EVENT_TIMEOUT;
            loop {
                let event = self.receive(deadline);
                if predicate(event) {
                    return event.clone();
                }
            }
        }

        /// Next published window, whatever its generation
        pub fn next_window(&mut self) -> Window<I> {
            match self.wait_for(|e| matches!(e, ViewerEvent::WindowChanged { .. })) {
                ViewerEvent::WindowChanged { window, .. } => window,
                _ => unreachable!(),
            }
        }

        /// Next non-empty window published under `generation`
        pub fn settled_window(&mut self, generation: Generation) -> Window<I> {
            match self.wait_for(|e| {
                matches!(e, ViewerEvent::WindowChanged { generation: g, window }
                    if *g == generation && !window.is_empty())
            }) {
                ViewerEvent::WindowChanged { window, .. } => window,
                _ => unreachable!(),
            }
        }

        /// Keep receiving until nothing arrives for `quiet`
        pub fn drain_until_idle(&mut self, quiet: Duration) {
            while let Ok(event) = self.rx.recv_timeout(quiet) {
                self.events.push(event);
            }
        }

        /// Every published window, in order
        pub fn windows(&self) -> Vec<(Generation, Vec<usize>)> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    ViewerEvent::WindowChanged { generation, window } => {
                        Some((*generation, window.pages()))
                    }
                    _ => None,
                })
                .collect()
        }

        /// Pages reported as failed, in order
        pub fn failures(&self) -> Vec<usize> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    ViewerEvent::RenderFailed { page, .. } => Some(*page),
                    _ => None,
                })
                .collect()
        }
    }
}
