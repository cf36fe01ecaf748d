// ABOUTME: File-backed editor host used by the command-line binary
// ABOUTME: Treats a markdown note on disk as the document and an image file as the paste payload

use crate::paste::{ClipboardFile, Notifier};
use crate::placeholder::{
    Document, PendingUpload, PlaceholderCoordinator, Position, Resolution, TextDocument,
};
use anyhow::{Context, Result};
use cloudpaste_sdk::UploadOutcome;
use rand::Rng;
use std::path::{Path, PathBuf};

/// A markdown note on disk acting as the editor document.
#[derive(Debug, Clone)]
pub struct NoteFile {
    path: PathBuf,
}

impl NoteFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Note name without directory or extension, as the editor shows it
    pub fn basename(&self) -> Option<&str> {
        self.path.file_stem().and_then(|stem| stem.to_str())
    }

    /// Read the note; a note that does not exist yet is empty
    pub fn load(&self) -> Result<TextDocument> {
        if !self.path.exists() {
            return Ok(TextDocument::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read note: {}", self.path.display()))?;
        Ok(TextDocument::new(&content))
    }

    pub fn save(&self, doc: &TextDocument) -> Result<()> {
        std::fs::write(&self.path, doc.to_string())
            .with_context(|| format!("Failed to write note: {}", self.path.display()))
    }

    /// Insert a placeholder before 1-based `line`, or at the end of the note, and save
    pub fn insert_placeholder<R: Rng>(
        &self,
        coordinator: &mut PlaceholderCoordinator<R>,
        line: Option<usize>,
    ) -> Result<PendingUpload> {
        let mut doc = self.load()?;
        match line {
            Some(line) => doc.set_cursor(Position::new(line.saturating_sub(1), 0)),
            None => place_at_end(&mut doc),
        }

        let pending = coordinator.insert_placeholder(&mut doc);
        self.save(&doc)?;
        Ok(pending)
    }

    /// Re-read the note so edits made while uploading survive, then settle the placeholder
    pub fn settle(
        &self,
        pending: PendingUpload,
        outcome: &UploadOutcome,
        notifier: &dyn Notifier,
    ) -> Result<Resolution> {
        let mut doc = self.load()?;
        let resolution = pending.settle(&mut doc, outcome, notifier);
        if resolution != Resolution::NotFound {
            self.save(&doc)?;
        }
        Ok(resolution)
    }

    /// Clear a placeholder whose paste was abandoned by an error
    pub fn discard(&self, pending: PendingUpload) -> Result<Resolution> {
        let mut doc = self.load()?;
        let resolution = pending.clear(&mut doc);
        if resolution != Resolution::NotFound {
            self.save(&doc)?;
        }
        Ok(resolution)
    }
}

/// End of the note, on a fresh line when the last line has text
fn place_at_end(doc: &mut TextDocument) {
    doc.move_to_end();
    let last = doc.line_count() - 1;
    if doc.line(last).is_some_and(|text| !text.is_empty()) {
        doc.replace_selection("\n");
    }
}

/// Declared MIME type for a file, from its extension only
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "txt" | "md" => "text/plain",
        _ => return None,
    };
    Some(mime)
}

/// Build the paste payload for a file on disk
pub fn clipboard_file(path: &Path) -> Result<ClipboardFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image: {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let mime_type = mime_from_extension(path).unwrap_or("application/octet-stream");

    Ok(ClipboardFile::new(name, mime_type, bytes))
}
