use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use pdf_pager_runtime::{
    Bitmap, DocumentRenderer, DocumentSource, RenderError, Result, composite_onto_white,
    scaled_height,
};
use pdfium_render::prelude::*;
use tokio::sync::Mutex;

/// Bind to pdfium, trying `library_dir` first, then the vendored copy under
/// the working directory, then the system library.
pub fn init_pdfium(library_dir: Option<&Path>) -> std::result::Result<Pdfium, PdfiumError> {
    let vendor_dir = std::env::current_dir().ok().and_then(|mut p| {
        p.push("vendor/pdfium/lib");
        if p.exists() { Some(p) } else { None }
    });

    for dir in library_dir.map(Path::to_path_buf).into_iter().chain(vendor_dir) {
        match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir)) {
            Ok(binding) => return Ok(Pdfium::new(binding)),
            Err(e) => log::debug!("No usable pdfium in {}: {}", dir.display(), e),
        }
    }

    Pdfium::bind_to_system_library().map(Pdfium::new)
}

/// Point sizes of every page, by index
struct OpenDocument {
    path: PathBuf,
    page_sizes: Vec<(f32, f32)>,
}

/// Renders pages through pdfium, one call at a time.
///
/// pdfium work runs on the blocking pool while the document lock is held,
/// so `open`, `render` and `close` never overlap.
pub struct PdfiumRenderer {
    document: Mutex<Option<OpenDocument>>,
    library_dir: Option<PathBuf>,
}

impl PdfiumRenderer {
    pub fn new() -> Self {
        Self {
            document: Mutex::new(None),
            library_dir: None,
        }
    }

    /// Look for the pdfium library in `dir` before the default locations
    pub fn with_library_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            document: Mutex::new(None),
            library_dir: Some(dir.into()),
        }
    }
}

impl Default for PdfiumRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn backend_error(e: PdfiumError) -> RenderError {
    RenderError::Render(e.to_string())
}

fn read_page_sizes(
    library_dir: Option<&Path>,
    path: &Path,
) -> std::result::Result<Vec<(f32, f32)>, PdfiumError> {
    let pdfium = init_pdfium(library_dir)?;
    let document = pdfium.load_pdf_from_file(path, None)?;
    let sizes = document
        .pages()
        .iter()
        .map(|page| (page.width().value, page.height().value))
        .collect();
    Ok(sizes)
}

fn render_page(
    library_dir: Option<&Path>,
    path: &Path,
    index: usize,
    width: u32,
    height: u32,
) -> Result<RgbaImage> {
    let pdfium = init_pdfium(library_dir).map_err(backend_error)?;
    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(backend_error)?;
    // The file may have changed on disk since it was opened
    let page_count = document.pages().len() as usize;
    if index >= page_count {
        return Err(RenderError::IndexOutOfRange { index, page_count });
    }
    let page = document.pages().get(index as u16).map_err(backend_error)?;

    let config = PdfRenderConfig::new()
        .set_target_size(width as i32, height as i32)
        .set_clear_color(PdfColor::WHITE);

    let bitmap = page.render_with_config(&config).map_err(backend_error)?;
    let rgba_data = bitmap.as_rgba_bytes().to_vec();
    let (bitmap_width, bitmap_height) = (bitmap.width() as u32, bitmap.height() as u32);

    RgbaImage::from_raw(bitmap_width, bitmap_height, rgba_data).ok_or_else(|| {
        RenderError::Render(format!(
            "pdfium returned a bitmap smaller than {}x{}",
            bitmap_width, bitmap_height
        ))
    })
}

impl DocumentRenderer for PdfiumRenderer {
    async fn open(&self, source: &DocumentSource) -> Result<usize> {
        let mut document = self.document.lock().await;

        let path = source.path().to_path_buf();
        let library_dir = self.library_dir.clone();
        let page_sizes = {
            let path = path.clone();
            tokio::task::spawn_blocking(move || read_page_sizes(library_dir.as_deref(), &path))
                .await?
        }
        .map_err(|e| RenderError::SourceUnreadable {
            document: source.clone(),
            reason: e.to_string(),
        })?;

        let page_count = page_sizes.len();
        log::info!("Opened {} with {} pages", path.display(), page_count);
        // The previous document is only replaced once the new one loaded
        *document = Some(OpenDocument { path, page_sizes });
        Ok(page_count)
    }

    async fn render(&self, index: usize, target_width: u32) -> Result<Bitmap> {
        let document = self.document.lock().await;
        let open = document.as_ref().ok_or(RenderError::RendererNotInitialized)?;

        let &(page_width, page_height) =
            open.page_sizes
                .get(index)
                .ok_or(RenderError::IndexOutOfRange {
                    index,
                    page_count: open.page_sizes.len(),
                })?;
        let width = target_width.max(1);
        let height = scaled_height(width, page_width, page_height);

        let path = open.path.clone();
        let library_dir = self.library_dir.clone();
        let mut image = tokio::task::spawn_blocking(move || {
            render_page(library_dir.as_deref(), &path, index, width, height)
        })
        .await??;

        composite_onto_white(&mut image);
        log::debug!(
            "Rendered page {} at {}x{}",
            index,
            image.width(),
            image.height()
        );
        Ok(Arc::new(image))
    }

    async fn close(&self) {
        let mut document = self.document.lock().await;
        if let Some(closed) = document.take() {
            log::info!("Closed {}", closed.path.display());
        }
    }
}
