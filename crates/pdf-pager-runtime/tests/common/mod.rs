#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use image::{Rgba, RgbaImage};
use pdf_pager_runtime::{Bitmap, DocumentRenderer, DocumentSource, RenderError, Result};

/// Counters shared between a test and its stub renderer
#[derive(Default)]
pub struct Instrumentation {
    pub open_calls: AtomicUsize,
    pub render_calls: AtomicUsize,
    pub close_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub intervals: Mutex<Vec<(usize, Instant, Instant)>>,
}

impl Instrumentation {
    pub fn renders(&self) -> usize {
        self.render_calls.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Render intervals sorted by start time
    pub fn sorted_intervals(&self) -> Vec<(usize, Instant, Instant)> {
        let mut intervals = self.intervals.lock().unwrap().clone();
        intervals.sort_by_key(|(_, start, _)| *start);
        intervals
    }
}

/// In-memory renderer that knows a fixed set of documents.
///
/// With `serialized` set it behaves like a real single-page backend and
/// holds one lock for the duration of every call.
pub struct StubRenderer {
    documents: HashMap<PathBuf, usize>,
    open_document: Mutex<Option<usize>>,
    lock: tokio::sync::Mutex<()>,
    serialized: bool,
    render_delay: Duration,
    failing_page: Option<usize>,
    pub stats: Arc<Instrumentation>,
}

impl StubRenderer {
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            open_document: Mutex::new(None),
            lock: tokio::sync::Mutex::new(()),
            serialized: true,
            render_delay: Duration::from_millis(5),
            failing_page: None,
            stats: Arc::new(Instrumentation::default()),
        }
    }

    pub fn with_document(mut self, path: &str, page_count: usize) -> Self {
        self.documents.insert(PathBuf::from(path), page_count);
        self
    }

    pub fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    /// Rendering this page always fails
    pub fn with_failing_page(mut self, index: usize) -> Self {
        self.failing_page = Some(index);
        self
    }

    pub fn unserialized(mut self) -> Self {
        self.serialized = false;
        self
    }
}

impl DocumentRenderer for StubRenderer {
    async fn open(&self, source: &DocumentSource) -> Result<usize> {
        let _guard = self.lock.lock().await;
        self.stats.open_calls.fetch_add(1, Ordering::SeqCst);
        let page_count =
            *self
                .documents
                .get(source.path())
                .ok_or_else(|| RenderError::SourceUnreadable {
                    document: source.clone(),
                    reason: "no such document".to_string(),
                })?;
        *self.open_document.lock().unwrap() = Some(page_count);
        Ok(page_count)
    }

    async fn render(&self, index: usize, target_width: u32) -> Result<Bitmap> {
        let _guard = if self.serialized {
            Some(self.lock.lock().await)
        } else {
            None
        };
        self.stats.render_calls.fetch_add(1, Ordering::SeqCst);

        let page_count = (*self.open_document.lock().unwrap())
            .ok_or(RenderError::RendererNotInitialized)?;
        if index >= page_count {
            return Err(RenderError::IndexOutOfRange { index, page_count });
        }
        if self.failing_page == Some(index) {
            return Err(RenderError::Render("corrupt page".to_string()));
        }

        let now_in_flight = self.stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats
            .max_in_flight
            .fetch_max(now_in_flight, Ordering::SeqCst);
        let start = Instant::now();
        tokio::time::sleep(self.render_delay).await;
        let end = Instant::now();
        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.stats.intervals.lock().unwrap().push((index, start, end));

        let height = target_width * 3 / 2;
        Ok(Arc::new(RgbaImage::from_pixel(
            target_width,
            height,
            Rgba([255, 255, 255, 255]),
        )))
    }

    async fn close(&self) {
        let _guard = self.lock.lock().await;
        self.stats.close_calls.fetch_add(1, Ordering::SeqCst);
        *self.open_document.lock().unwrap() = None;
    }
}
