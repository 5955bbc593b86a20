use std::path::PathBuf;

/// File extensions matching the given MIME types
pub fn extensions_for(mime_types: &[String]) -> Vec<&'static str> {
    let mut extensions = Vec::new();
    for mime_type in mime_types {
        let extension = match mime_type.as_str() {
            "application/pdf" => "pdf",
            other => {
                log::warn!("No file extension known for {}", other);
                continue;
            }
        };
        if !extensions.contains(&extension) {
            extensions.push(extension);
        }
    }
    extensions
}

/// Ask the user for a document. `None` when the dialog is cancelled.
pub fn pick_document(mime_types: &[String]) -> Option<PathBuf> {
    let extensions = extensions_for(mime_types);
    let mut dialog = rfd::FileDialog::new().set_title("Open document");
    if !extensions.is_empty() {
        dialog = dialog.add_filter("Documents", extensions.as_slice());
    }
    dialog.pick_file()
}
