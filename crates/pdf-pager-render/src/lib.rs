//! pdfium-backed [`DocumentRenderer`](pdf_pager_runtime::DocumentRenderer).

mod pdfium;

pub use pdfium::{PdfiumRenderer, init_pdfium};
