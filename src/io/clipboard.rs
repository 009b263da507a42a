/// Error type for clipboard access
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("nothing to copy")]
    Empty,
    #[error("clipboard unavailable: {0}")]
    Unavailable(#[from] arboard::Error),
}

/// Copy a single string to the system clipboard.
pub fn copy(text: &str) -> Result<(), ClipboardError> {
    if text.trim().is_empty() {
        return Err(ClipboardError::Empty);
    }
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_rejected_before_touching_clipboard() {
        assert!(matches!(copy(""), Err(ClipboardError::Empty)));
        assert!(matches!(copy("  \n"), Err(ClipboardError::Empty)));
    }
}
