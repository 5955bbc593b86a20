use std::fmt;

use crate::bitmap::Bitmap;

/// View state of a single page.
///
/// Pages are values: the reducer replaces a whole record rather than
/// mutating one in place.
#[derive(Clone, PartialEq, Default)]
pub struct Page {
    pub number: usize,
    pub is_loading: bool,
    pub bitmap: Option<Bitmap>,
}

impl Page {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            is_loading: false,
            bitmap: None,
        }
    }

    pub fn loading(number: usize) -> Self {
        Self {
            number,
            is_loading: true,
            bitmap: None,
        }
    }

    pub fn loaded(number: usize, bitmap: Bitmap) -> Self {
        Self {
            number,
            is_loading: false,
            bitmap: Some(bitmap),
        }
    }

    /// `count` unloaded pages numbered from zero
    pub fn unloaded(count: usize) -> Vec<Page> {
        (0..count).map(Page::new).collect()
    }

    pub fn is_loaded(&self) -> bool {
        self.bitmap.is_some()
    }
}

// Bitmaps are summarized; dumping pixel buffers into logs is useless.
impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("number", &self.number)
            .field("is_loading", &self.is_loading)
            .field(
                "bitmap",
                &self
                    .bitmap
                    .as_ref()
                    .map(|bitmap| format!("{}x{}", bitmap.width(), bitmap.height())),
            )
            .finish()
    }
}

/// Snapshot of every page in the open document.
///
/// `pages[i].number == i` always holds. `generation` identifies the
/// document session the pages belong to; zero means nothing was opened yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct State {
    pages: Vec<Page>,
    generation: u64,
}

impl State {
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, number: usize) -> Option<&Page> {
        self.pages.get(number)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub(crate) fn replace_pages(&mut self, generation: u64, pages: Vec<Page>) {
        debug_assert!(pages.iter().enumerate().all(|(i, page)| page.number == i));
        self.generation = generation;
        self.pages = pages;
    }

    /// Returns `false` when `page.number` is outside the current document
    pub(crate) fn replace_page(&mut self, page: Page) -> bool {
        match self.pages.get_mut(page.number) {
            Some(slot) => {
                *slot = page;
                true
            }
            None => false,
        }
    }
}
