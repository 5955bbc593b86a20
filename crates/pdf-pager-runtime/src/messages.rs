use crate::page::Page;
use crate::renderer::DocumentSource;

/// Intents sent from the view to the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The user wants to pick a document
    ShowFileSystem,
    /// The user picked a document
    OpenFile { source: DocumentSource },
    /// The view needs the bitmap for a page
    GetPage { page: usize },
}

/// Outcomes produced by handling one event, folded into [`crate::State`]
/// by the reducer.
///
/// Document-bound updates carry the generation of the document session
/// they were produced for so that late arrivals from a replaced document
/// can be dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    NoOp,
    /// Replace the whole page list
    Pages { generation: u64, pages: Vec<Page> },
    /// Replace the single entry at `page.number`
    Page { generation: u64, page: Page },
    ShowFileSystem { mime_types: Vec<String> },
    MoveToPage { generation: u64, page: usize },
    /// A request failed. `generation` is `None` when the failure is not
    /// tied to a particular document session.
    Error {
        generation: Option<u64>,
        message: String,
    },
}

/// One-shot instructions for the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ShowFileSystem { mime_types: Vec<String> },
    MoveToPage { page: usize },
    ShowError { message: String },
}
