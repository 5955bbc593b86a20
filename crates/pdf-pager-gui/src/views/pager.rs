use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use eframe::egui;
use pdf_pager_runtime::{Bitmap, Page, State};

struct PageTexture {
    bitmap: Bitmap,
    handle: egui::TextureHandle,
}

pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 10.0;

/// One page at a time, with previous/next navigation and zoom.
///
/// Tracks which pages in the visible window were already requested so that a
/// page is asked for once, not once per frame. Pages that leave the window
/// are forgotten, so scrolling back to a page that never loaded asks again.
pub struct PagerView {
    current_page: usize,
    generation: u64,
    zoom: f32,
    requested: HashSet<usize>,
    textures: HashMap<usize, PageTexture>,
}

impl Default for PagerView {
    fn default() -> Self {
        Self {
            current_page: 0,
            generation: 0,
            zoom: 1.0,
            requested: HashSet::new(),
            textures: HashMap::new(),
        }
    }
}

impl PagerView {
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn move_to(&mut self, page: usize) {
        self.current_page = page;
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = if zoom.is_finite() {
            zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            1.0
        };
    }

    /// Forget everything tied to a previous document
    pub fn sync(&mut self, state: &State) {
        if state.generation() != self.generation {
            self.generation = state.generation();
            self.requested.clear();
            self.textures.clear();
        }
        self.current_page = self
            .current_page
            .min(state.page_count().saturating_sub(1));
    }

    /// Pages within `distance` of the current one that still need a render,
    /// current page first. A page is returned once while it stays in the
    /// window, including one stuck loading after a failed render.
    pub fn pages_to_request(&mut self, state: &State, distance: usize) -> Vec<usize> {
        if state.is_empty() {
            return Vec::new();
        }
        let first = self.current_page.saturating_sub(distance);
        let last = (self.current_page + distance).min(state.page_count() - 1);
        self.requested.retain(|page| (first..=last).contains(page));

        let mut wanted: Vec<usize> = (first..=last).collect();
        wanted.sort_by_key(|&page| page.abs_diff(self.current_page));
        wanted.retain(|&page| {
            let needs_render = state.page(page).is_some_and(|p| !p.is_loaded());
            needs_render && self.requested.insert(page)
        });
        wanted
    }

    pub fn show(&mut self, ui: &mut egui::Ui, state: &State) {
        if state.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(50.0);
                ui.heading("PDF Pager");
                ui.add_space(20.0);
                ui.label("Open a document to start reading");
            });
            return;
        }

        self.navigation(ui, state.page_count());
        ui.separator();

        let Some(page) = state.page(self.current_page) else {
            return;
        };
        match self.texture_for(ui.ctx(), page) {
            Some(texture) => {
                let size = texture.size_vec2() * self.zoom;
                egui::ScrollArea::both().show(ui, |ui| {
                    ui.centered_and_justified(|ui| {
                        ui.image((texture.id(), size));
                    });
                });
            }
            None => {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
            }
        }
    }

    fn navigation(&mut self, ui: &mut egui::Ui, page_count: usize) {
        let (back, forward, pinch) = ui.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowLeft) || i.key_pressed(egui::Key::PageUp),
                i.key_pressed(egui::Key::ArrowRight) || i.key_pressed(egui::Key::PageDown),
                i.zoom_delta(),
            )
        });
        // Ctrl+scroll and pinch gestures
        if pinch != 1.0 {
            self.set_zoom(self.zoom * pinch);
        }

        ui.horizontal(|ui| {
            let can_go_back = self.current_page > 0;
            let can_go_forward = self.current_page + 1 < page_count;

            if ui
                .add_enabled(can_go_back, egui::Button::new("◀ Previous"))
                .clicked()
                || (back && can_go_back)
            {
                self.current_page -= 1;
            }

            ui.label(format!("Page {} of {}", self.current_page + 1, page_count));

            if ui
                .add_enabled(can_go_forward, egui::Button::new("Next ▶"))
                .clicked()
                || (forward && can_go_forward)
            {
                self.current_page += 1;
            }

            ui.separator();

            let mut zoom = self.zoom;
            if ui
                .add(
                    egui::Slider::new(&mut zoom, MIN_ZOOM..=MAX_ZOOM)
                        .logarithmic(true)
                        .text("Zoom"),
                )
                .changed()
            {
                self.set_zoom(zoom);
            }
            if ui.button("1:1").clicked() {
                self.set_zoom(1.0);
            }
        });
    }

    fn texture_for(&mut self, ctx: &egui::Context, page: &Page) -> Option<egui::TextureHandle> {
        let bitmap = page.bitmap.as_ref()?;
        if let Some(cached) = self.textures.get(&page.number) {
            if Arc::ptr_eq(&cached.bitmap, bitmap) {
                return Some(cached.handle.clone());
            }
        }

        let size = [bitmap.width() as usize, bitmap.height() as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, bitmap.as_raw());
        let handle = ctx.load_texture(
            format!("page_{}", page.number),
            image,
            egui::TextureOptions::LINEAR,
        );
        self.textures.insert(
            page.number,
            PageTexture {
                bitmap: bitmap.clone(),
                handle: handle.clone(),
            },
        );
        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_pager_runtime::{Update, reduce};

    fn state_with(generation: u64, count: usize) -> State {
        let mut state = State::default();
        reduce(
            &mut state,
            Update::Pages {
                generation,
                pages: Page::unloaded(count),
            },
        );
        state
    }

    #[test]
    fn test_requests_current_page_first_then_neighbours() {
        let mut view = PagerView::default();
        let state = state_with(1, 10);
        view.sync(&state);
        view.move_to(4);

        assert_eq!(view.pages_to_request(&state, 1), vec![4, 3, 5]);
    }

    #[test]
    fn test_stuck_page_requested_again_after_scrolling_back() {
        let mut view = PagerView::default();
        let mut state = state_with(1, 10);
        view.sync(&state);

        assert_eq!(view.pages_to_request(&state, 1), vec![0, 1]);
        // Page 0 never finished rendering
        reduce(
            &mut state,
            Update::Page {
                generation: 1,
                page: Page::loading(0),
            },
        );
        assert!(view.pages_to_request(&state, 1).is_empty());

        view.move_to(5);
        assert_eq!(view.pages_to_request(&state, 1), vec![5, 4, 6]);

        view.move_to(0);
        assert_eq!(view.pages_to_request(&state, 1), vec![0, 1]);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = PagerView::default();
        assert_eq!(view.zoom(), 1.0);

        view.set_zoom(25.0);
        assert_eq!(view.zoom(), MAX_ZOOM);
        view.set_zoom(0.0);
        assert_eq!(view.zoom(), MIN_ZOOM);
        view.set_zoom(f32::NAN);
        assert_eq!(view.zoom(), 1.0);
    }

    #[test]
    fn test_each_page_requested_once_per_document() {
        let mut view = PagerView::default();
        let state = state_with(1, 3);
        view.sync(&state);

        assert_eq!(view.pages_to_request(&state, 1), vec![0, 1]);
        assert!(view.pages_to_request(&state, 1).is_empty());

        let reopened = state_with(2, 3);
        view.sync(&reopened);
        assert_eq!(view.pages_to_request(&reopened, 0), vec![0]);
    }

    #[test]
    fn test_window_clamped_to_document() {
        let mut view = PagerView::default();
        let state = state_with(1, 2);
        view.move_to(7);
        view.sync(&state);

        assert_eq!(view.current_page(), 1);
        assert_eq!(view.pages_to_request(&state, 2), vec![1, 0]);
    }

    #[test]
    fn test_nothing_to_request_without_document() {
        let mut view = PagerView::default();
        assert!(view.pages_to_request(&State::default(), 1).is_empty());
    }
}
