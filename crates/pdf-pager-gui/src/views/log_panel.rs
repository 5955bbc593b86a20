use eframe::egui;
use log::Level;

use crate::logger::AppLogger;

pub fn show_log_panel(ui: &mut egui::Ui, logger: &AppLogger) {
    ui.horizontal(|ui| {
        ui.heading("Log");
        if ui.button("Clear").clicked() {
            logger.clear();
        }
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for entry in logger.entries() {
                let color = match entry.level {
                    Level::Error => egui::Color32::LIGHT_RED,
                    Level::Warn => egui::Color32::YELLOW,
                    _ => ui.visuals().text_color(),
                };
                ui.colored_label(
                    color,
                    format!(
                        "{} {:<5} {}: {}",
                        entry.timestamp.format("%H:%M:%S"),
                        entry.level,
                        entry.target,
                        entry.message
                    ),
                );
            }
        });
}
