use arboard::Clipboard;

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Cannot copy empty text")]
    EmptyText,
    #[error("Failed to access clipboard: {0}")]
    ClipboardAccessFailed(String),
    #[error("Failed to set clipboard text: {0}")]
    ClipboardSetFailed(String),
}

/// Put `text` on the system clipboard
pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    // Guard: nothing useful to copy
    if text.is_empty() {
        return Err(ClipboardError::EmptyText);
    }

    let mut clipboard =
        Clipboard::new().map_err(|e| ClipboardError::ClipboardAccessFailed(e.to_string()))?;

    clipboard
        .set_text(text.to_string())
        .map_err(|e| ClipboardError::ClipboardSetFailed(e.to_string()))?;

    log::info!("Copied transcript to clipboard ({} chars)", text.len());

    Ok(())
}
