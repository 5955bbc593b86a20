use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};

use crate::config::PagerConfig;
use crate::messages::{Effect, Event, Update};
use crate::page::{Page, State};
use crate::reducer::reduce;
use crate::renderer::{DocumentRenderer, DocumentSource};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Pipeline already started")]
    AlreadyStarted,
    #[error("Pipeline is not running")]
    NotRunning,
    #[error("Pipeline was stopped")]
    Stopped,
}

enum Lifecycle {
    Idle {
        state_tx: watch::Sender<State>,
        effect_tx: mpsc::UnboundedSender<Effect>,
    },
    Running {
        event_tx: mpsc::UnboundedSender<Event>,
        dispatcher: JoinHandle<()>,
        reducer: JoinHandle<()>,
    },
    Stopped,
}

/// Turns view events into renderer work and folds the outcomes into [`State`].
///
/// Events are routed by a dispatcher task. Each page render runs in its own
/// task and documents are opened one after another by a dedicated opener
/// task. Every outcome funnels into one reducer task, the only writer of the
/// state.
pub struct Pipeline<R: DocumentRenderer> {
    renderer: Arc<R>,
    config: Arc<PagerConfig>,
    lifecycle: Lifecycle,
    state_rx: watch::Receiver<State>,
    effect_rx: Option<mpsc::UnboundedReceiver<Effect>>,
    closed: Arc<AtomicBool>,
}

impl<R: DocumentRenderer> Pipeline<R> {
    pub fn new(renderer: Arc<R>, config: PagerConfig) -> Self {
        let (state_tx, state_rx) = watch::channel(State::default());
        let (effect_tx, effect_rx) = mpsc::unbounded_channel();
        Self {
            renderer,
            config: Arc::new(config),
            lifecycle: Lifecycle::Idle {
                state_tx,
                effect_tx,
            },
            state_rx,
            effect_rx: Some(effect_rx),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawn the dispatcher and reducer on the current tokio runtime
    pub fn start(&mut self) -> Result<(), PipelineError> {
        let (state_tx, effect_tx) = match std::mem::replace(&mut self.lifecycle, Lifecycle::Stopped)
        {
            Lifecycle::Idle {
                state_tx,
                effect_tx,
            } => (state_tx, effect_tx),
            running @ Lifecycle::Running { .. } => {
                self.lifecycle = running;
                return Err(PipelineError::AlreadyStarted);
            }
            Lifecycle::Stopped => return Err(PipelineError::Stopped),
        };

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        let dispatcher = Dispatcher::new(
            self.renderer.clone(),
            self.config.clone(),
            self.state_rx.clone(),
            update_tx,
        );
        let dispatcher = tokio::spawn(dispatcher.run(event_rx));
        let reducer = tokio::spawn(fold_updates(update_rx, state_tx, effect_tx));

        self.lifecycle = Lifecycle::Running {
            event_tx,
            dispatcher,
            reducer,
        };
        log::debug!("Pipeline started");
        Ok(())
    }

    /// Queue an event for the dispatcher
    pub fn process_event(&self, event: Event) -> Result<(), PipelineError> {
        match &self.lifecycle {
            Lifecycle::Running { event_tx, .. } => event_tx
                .send(event)
                .map_err(|_| PipelineError::NotRunning),
            Lifecycle::Idle { .. } => Err(PipelineError::NotRunning),
            Lifecycle::Stopped => Err(PipelineError::Stopped),
        }
    }

    /// Observe state snapshots
    pub fn states(&self) -> watch::Receiver<State> {
        self.state_rx.clone()
    }

    /// The latest state snapshot
    pub fn state(&self) -> State {
        self.state_rx.borrow().clone()
    }

    /// The effect stream. There is exactly one; later calls return `None`.
    pub fn take_effects(&mut self) -> Option<mpsc::UnboundedReceiver<Effect>> {
        self.effect_rx.take()
    }

    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Running { .. })
    }

    /// Shut the pipeline down and close the renderer.
    ///
    /// Pending work is abandoned: queued events are dropped and in-flight
    /// render tasks are aborted. The renderer is closed exactly once no
    /// matter how often this is called.
    pub async fn stop(&mut self) {
        if let Lifecycle::Running {
            event_tx,
            dispatcher,
            reducer,
        } = std::mem::replace(&mut self.lifecycle, Lifecycle::Stopped)
        {
            drop(event_tx);
            dispatcher.abort();
            let _ = dispatcher.await;
            if let Err(e) = reducer.await {
                log::warn!("Reducer task ended abnormally: {}", e);
            }
            log::debug!("Pipeline stopped");
        }
        close_once(self.renderer.as_ref(), &self.closed).await;
    }
}

impl<R: DocumentRenderer> Drop for Pipeline<R> {
    fn drop(&mut self) {
        if let Lifecycle::Running { dispatcher, .. } = &self.lifecycle {
            dispatcher.abort();
        }
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let renderer = self.renderer.clone();
                let closed = self.closed.clone();
                handle.spawn(async move { close_once(renderer.as_ref(), &closed).await });
            }
            Err(_) => log::warn!("Pipeline dropped outside a runtime; renderer left open"),
        }
    }
}

async fn close_once<R: DocumentRenderer>(renderer: &R, closed: &AtomicBool) {
    if !closed.swap(true, Ordering::SeqCst) {
        renderer.close().await;
        log::debug!("Renderer closed");
    }
}

struct OpenRequest {
    generation: u64,
    source: DocumentSource,
}

/// Routes each event to its handler and owns the spawned work.
struct Dispatcher<R: DocumentRenderer> {
    renderer: Arc<R>,
    config: Arc<PagerConfig>,
    state: watch::Receiver<State>,
    updates: mpsc::UnboundedSender<Update>,
    opener: mpsc::UnboundedSender<OpenRequest>,
    // Dropping the set aborts every task still in it.
    workers: JoinSet<()>,
    next_generation: u64,
}

impl<R: DocumentRenderer> Dispatcher<R> {
    fn new(
        renderer: Arc<R>,
        config: Arc<PagerConfig>,
        state: watch::Receiver<State>,
        updates: mpsc::UnboundedSender<Update>,
    ) -> Self {
        let (opener, requests) = mpsc::unbounded_channel();
        let mut workers = JoinSet::new();
        workers.spawn(open_documents(requests, renderer.clone(), updates.clone()));
        let next_generation = state.borrow().generation();
        Self {
            renderer,
            config,
            state,
            updates,
            opener,
            workers,
            next_generation,
        }
    }

    async fn run(mut self, mut events: mpsc::UnboundedReceiver<Event>) {
        while let Some(event) = events.recv().await {
            log::debug!("event: {:?}", event);
            self.dispatch(event);
            self.reap_finished();
        }
        log::debug!("Event stream closed");
    }

    fn dispatch(&mut self, event: Event) {
        match event {
            Event::ShowFileSystem => self.emit(Update::ShowFileSystem {
                mime_types: self.config.mime_types.clone(),
            }),
            Event::OpenFile { source } => {
                self.next_generation += 1;
                let request = OpenRequest {
                    generation: self.next_generation,
                    source,
                };
                if self.opener.send(request).is_err() {
                    log::error!("Document opener is gone, dropping open request");
                }
            }
            Event::GetPage { page } => self.request_page(page),
        }
    }

    fn request_page(&mut self, number: usize) {
        let generation = {
            let state = self.state.borrow();
            match state.page(number) {
                None => {
                    log::warn!(
                        "Requested page {} but the document has {} pages",
                        number,
                        state.page_count()
                    );
                    None
                }
                Some(page) if page.is_loaded() => {
                    log::debug!("Page {} already rendered", number);
                    None
                }
                Some(_) => Some(state.generation()),
            }
        };

        let Some(generation) = generation else {
            self.emit(Update::NoOp);
            return;
        };

        // Let the view show a spinner before the render even starts
        self.emit(Update::Page {
            generation,
            page: Page::loading(number),
        });

        self.workers.spawn(render_page(
            self.renderer.clone(),
            self.updates.clone(),
            generation,
            number,
            self.config.target_width,
        ));
    }

    fn emit(&self, update: Update) {
        if self.updates.send(update).is_err() {
            log::debug!("Reducer is gone, dropping update");
        }
    }

    fn reap_finished(&mut self) {
        while let Some(joined) = self.workers.try_join_next() {
            if let Err(e) = joined {
                if e.is_panic() {
                    log::error!("Worker task panicked: {}", e);
                }
            }
        }
    }
}

async fn open_documents<R: DocumentRenderer>(
    mut requests: mpsc::UnboundedReceiver<OpenRequest>,
    renderer: Arc<R>,
    updates: mpsc::UnboundedSender<Update>,
) {
    while let Some(OpenRequest { generation, source }) = requests.recv().await {
        match renderer.open(&source).await {
            Ok(page_count) => {
                log::info!("Opened {} ({} pages)", source, page_count);
                let _ = updates.send(Update::Pages {
                    generation,
                    pages: Page::unloaded(page_count),
                });
                let _ = updates.send(Update::MoveToPage {
                    generation,
                    page: 0,
                });
            }
            Err(e) => {
                log::error!("Failed to open {}: {}", source, e);
                let _ = updates.send(Update::Error {
                    generation: None,
                    message: format!("Failed to open {}: {}", source, e),
                });
            }
        }
    }
}

async fn render_page<R: DocumentRenderer>(
    renderer: Arc<R>,
    updates: mpsc::UnboundedSender<Update>,
    generation: u64,
    number: usize,
    target_width: u32,
) {
    let update = match renderer.render(number, target_width).await {
        Ok(bitmap) => {
            log::debug!(
                "Rendered page {} at {}x{}",
                number,
                bitmap.width(),
                bitmap.height()
            );
            Update::Page {
                generation,
                page: Page::loaded(number, bitmap),
            }
        }
        Err(e) => {
            log::error!("Failed to render page {}: {}", number, e);
            Update::Error {
                generation: Some(generation),
                message: format!("Failed to render page {}: {}", number + 1, e),
            }
        }
    };
    let _ = updates.send(update);
}

async fn fold_updates(
    mut updates: mpsc::UnboundedReceiver<Update>,
    state: watch::Sender<State>,
    effects: mpsc::UnboundedSender<Effect>,
) {
    while let Some(update) = updates.recv().await {
        let mut effect = None;
        state.send_if_modified(|state| {
            let fold = reduce(state, update);
            effect = fold.effect;
            fold.changed
        });
        if let Some(effect) = effect {
            if effects.send(effect).is_err() {
                log::debug!("Effect receiver is gone");
            }
        }
    }
    log::debug!("Update stream closed");
}
