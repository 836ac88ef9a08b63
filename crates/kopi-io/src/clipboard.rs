use anyhow::Context;

/// Thin clipboard collaborator. Read once per gesture, written once per
/// copy-result action.
pub struct Clipboard {
    inner: arboard::Clipboard,
}

impl Clipboard {
    pub fn new() -> Result<Self, anyhow::Error> {
        Ok(Self {
            inner: arboard::Clipboard::new().context("failed to open system clipboard")?,
        })
    }

    pub fn read_text(&mut self) -> Result<String, anyhow::Error> {
        self.inner.get_text().context("failed to read clipboard")
    }

    pub fn write_text(&mut self, text: &str) -> Result<(), anyhow::Error> {
        self.inner
            .set_text(text.to_string())
            .context("failed to write clipboard")
    }
}
