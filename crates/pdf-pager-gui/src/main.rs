use eframe::egui;
use log::LevelFilter;
use pdf_pager_runtime::PagerConfig;

mod app;
mod assets;
mod chooser;
mod logger;
mod views;

use logger::AppLogger;

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let loaded = match assets::config_path() {
        Some(path) => runtime.block_on(PagerConfig::load_or_default(path)),
        None => Ok(PagerConfig::default()),
    };
    let (config, config_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (PagerConfig::default(), Some(e)),
    };

    let logger = AppLogger::new(config.max_log_entries, LevelFilter::Info);
    logger.clone().init()?;
    if let Some(e) = config_error {
        log::warn!("Ignoring unreadable config, using defaults: {}", e);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 1000.0])
            .with_title("PDF Pager"),
        ..Default::default()
    };

    let handle = runtime.handle().clone();
    eframe::run_native(
        "PDF Pager",
        options,
        Box::new(move |cc| {
            let app = app::PagerApp::new(cc, handle, config, logger)?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
