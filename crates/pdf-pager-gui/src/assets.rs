use std::io;
use std::path::{Path, PathBuf};

/// Sample document shipped inside the binary
pub const SAMPLE_NAME: &str = "sample.pdf";
pub const SAMPLE_PDF: &[u8] = include_bytes!("../../../assets/sample.pdf");

const APP_DIR: &str = "pdf-pager";

/// Directory bundled documents are staged into
pub fn cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

/// Where the settings file lives, if the platform has a config directory
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
}

/// Write `bytes` to `<root>/<name>` so the renderer can open it like any
/// other file. An identical existing copy is reused.
pub fn stage_bundled(root: &Path, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    let path = root.join(name);
    if let Ok(existing) = std::fs::read(&path) {
        if existing == bytes {
            return Ok(path);
        }
    }
    std::fs::create_dir_all(root)?;
    std::fs::write(&path, bytes)?;
    log::debug!("Staged {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}
