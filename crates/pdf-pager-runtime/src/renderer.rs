use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::bitmap::Bitmap;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot read document {document}: {reason}")]
    SourceUnreadable {
        document: DocumentSource,
        reason: String,
    },
    #[error("No document is open")]
    RendererNotInitialized,
    #[error("Page {index} is out of range (document has {page_count} pages)")]
    IndexOutOfRange { index: usize, page_count: usize },
    #[error("Render failed: {0}")]
    Render(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Location of a document the renderer can open
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentSource(PathBuf);

impl DocumentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for DocumentSource {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for DocumentSource {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Backend that opens one document and rasterizes its pages.
///
/// Implementations hold a single open document and must serialize `open`,
/// `render` and `close`: at most one of them runs at any time, and the
/// exclusion is released on every exit path. Callers are free to invoke
/// `render` concurrently and rely on the implementation to queue them.
pub trait DocumentRenderer: Send + Sync + 'static {
    /// Open `source` and return its page count.
    ///
    /// Replaces the currently open document on success. On failure the
    /// previously open document, if any, stays open.
    fn open(&self, source: &DocumentSource) -> impl Future<Output = Result<usize>> + Send;

    /// Render page `index` at `target_width` pixels wide. The height follows
    /// the page's aspect ratio and transparent areas come back white.
    fn render(&self, index: usize, target_width: u32)
    -> impl Future<Output = Result<Bitmap>> + Send;

    /// Release the open document. Calling this more than once is harmless.
    fn close(&self) -> impl Future<Output = ()> + Send;
}
