use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use eframe::egui;
use pdf_pager_render::PdfiumRenderer;
use pdf_pager_runtime::{Effect, Event, PagerConfig, Pipeline, State};
use tokio::sync::{mpsc, watch};

use crate::assets;
use crate::chooser;
use crate::logger::AppLogger;
use crate::views::{PagerView, show_log_panel};

pub struct PagerApp {
    pipeline: Pipeline<PdfiumRenderer>,
    states: watch::Receiver<State>,
    effects: mpsc::UnboundedReceiver<Effect>,
    pager: PagerView,
    prefetch_distance: usize,
    status: String,
    show_log: bool,
    logger: AppLogger,
    runtime: tokio::runtime::Handle,
}

impl PagerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: tokio::runtime::Handle,
        config: PagerConfig,
        logger: AppLogger,
    ) -> anyhow::Result<Self> {
        let prefetch_distance = config.prefetch_distance;
        let open_sample = config.open_sample_on_start;

        let mut pipeline = Pipeline::new(Arc::new(PdfiumRenderer::new()), config);
        let effects = pipeline
            .take_effects()
            .context("effect stream already taken")?;
        let states = pipeline.states();

        {
            let _guard = runtime.enter();
            pipeline.start()?;
        }

        // Repaint whenever a new snapshot is published
        let ctx = cc.egui_ctx.clone();
        let mut changes = pipeline.states();
        runtime.spawn(async move {
            while changes.changed().await.is_ok() {
                ctx.request_repaint();
            }
        });

        let mut status = String::new();
        if open_sample {
            match assets::stage_bundled(&assets::cache_root(), assets::SAMPLE_NAME, assets::SAMPLE_PDF)
            {
                Ok(path) => {
                    pipeline.process_event(Event::OpenFile {
                        source: path.into(),
                    })?;
                    status = "Opening sample document...".to_string();
                }
                Err(e) => log::warn!("Could not stage the sample document: {}", e),
            }
        }

        Ok(Self {
            pipeline,
            states,
            effects,
            pager: PagerView::default(),
            prefetch_distance,
            status,
            show_log: false,
            logger,
            runtime,
        })
    }

    fn send(&mut self, event: Event) {
        if let Err(e) = self.pipeline.process_event(event) {
            log::error!("Dropping event: {}", e);
            self.status = format!("Error: {}", e);
        }
    }

    /// Each effect is received once and acted on once
    fn run_effects(&mut self) {
        while let Ok(effect) = self.effects.try_recv() {
            match effect {
                Effect::ShowFileSystem { mime_types } => {
                    if let Some(path) = chooser::pick_document(&mime_types) {
                        self.status = format!("Opening {}...", path.display());
                        self.send(Event::OpenFile {
                            source: path.into(),
                        });
                    }
                }
                Effect::MoveToPage { page } => {
                    self.pager.move_to(page);
                    self.status.clear();
                }
                Effect::ShowError { message } => {
                    self.status = format!("Error: {}", message);
                }
            }
        }
    }
}

impl eframe::App for PagerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle drag-and-drop for PDF files
        let dropped: Vec<_> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("pdf"))
                .collect()
        });
        if let Some(path) = dropped.into_iter().last() {
            self.status = format!("Opening {}...", path.display());
            self.send(Event::OpenFile {
                source: path.into(),
            });
        }

        self.run_effects();

        let state = self.states.borrow_and_update().clone();
        self.pager.sync(&state);
        for page in self.pager.pages_to_request(&state, self.prefetch_distance) {
            self.send(Event::GetPage { page });
        }

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("📂 Open PDF...").clicked() {
                    self.send(Event::ShowFileSystem);
                }
                ui.separator();
                ui.toggle_value(&mut self.show_log, "📜 Log");
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            let status = if self.status.is_empty() {
                self.logger
                    .latest_problem()
                    .map(|entry| entry.message)
                    .unwrap_or_default()
            } else {
                self.status.clone()
            };
            ui.horizontal(|ui| {
                ui.label(status);
                if !state.is_empty() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(format!(
                            "{} / {}",
                            self.pager.current_page() + 1,
                            state.page_count()
                        ));
                    });
                }
            });
        });

        if self.show_log {
            egui::SidePanel::right("log")
                .resizable(true)
                .default_width(360.0)
                .show(ctx, |ui| show_log_panel(ui, &self.logger));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.pager.show(ui, &state);
        });

        // Effects do not touch the state, so poll for them
        ctx.request_repaint_after(Duration::from_millis(200));
    }
}

impl Drop for PagerApp {
    fn drop(&mut self) {
        log::info!("Shutting down");
        self.runtime.block_on(self.pipeline.stop());
    }
}
