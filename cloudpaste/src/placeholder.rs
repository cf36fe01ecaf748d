// ABOUTME: Placeholder lifecycle for pending uploads inside editor text
// ABOUTME: Inserts a unique markdown token at the cursor and later swaps it for the final image link

use crate::constants::placeholder::{ALT_TEXT, TOKEN_ALPHABET, TOKEN_LENGTH};
use rand::rngs::ThreadRng;
use rand::Rng;
use std::fmt;

/// Line-indexed text owned by the host editor.
///
/// Character positions are byte offsets into a line.
pub trait Document {
    fn line_count(&self) -> usize;

    fn line(&self, index: usize) -> Option<&str>;

    /// Replace `start..end` of line `line` with `text` (which may contain newlines)
    fn replace_range(&mut self, line: usize, start: usize, end: usize, text: &str);

    /// Replace the current selection, or insert at the cursor when nothing is selected
    fn replace_selection(&mut self, text: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// In-memory document with a cursor and optional selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    lines: Vec<String>,
    cursor: Position,
    anchor: Option<Position>,
}

impl Default for TextDocument {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: Position::default(),
            anchor: None,
        }
    }
}

impl TextDocument {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
            cursor: Position::default(),
            anchor: None,
        }
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn set_cursor(&mut self, position: Position) {
        self.anchor = None;
        self.cursor = self.clamp(position);
    }

    /// Place the cursor at the very end of the text
    pub fn move_to_end(&mut self) {
        let line = self.lines.len() - 1;
        let ch = self.lines[line].len();
        self.set_cursor(Position::new(line, ch));
    }

    pub fn select(&mut self, from: Position, to: Position) {
        self.anchor = Some(self.clamp(from));
        self.cursor = self.clamp(to);
    }

    fn clamp(&self, position: Position) -> Position {
        let line = position.line.min(self.lines.len() - 1);
        let text = &self.lines[line];
        let mut ch = position.ch.min(text.len());
        while !text.is_char_boundary(ch) {
            ch -= 1;
        }
        Position::new(line, ch)
    }

    /// Replace the text between two positions, returning the end of the inserted text
    fn splice(&mut self, from: Position, to: Position, text: &str) -> Position {
        let (from, to) = if from <= to { (from, to) } else { (to, from) };
        let (from, to) = (self.clamp(from), self.clamp(to));

        let prefix = &self.lines[from.line][..from.ch];
        let suffix = &self.lines[to.line][to.ch..];
        let merged = format!("{}{}{}", prefix, text, suffix);

        let inserted_lines = text.matches('\n').count();
        let end = match text.rfind('\n') {
            Some(last_newline) => Position::new(from.line + inserted_lines, text.len() - last_newline - 1),
            None => Position::new(from.line, from.ch + text.len()),
        };

        let replacement: Vec<String> = merged.split('\n').map(str::to_string).collect();
        self.lines.splice(from.line..=to.line, replacement);
        end
    }
}

impl Document for TextDocument {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    fn replace_range(&mut self, line: usize, start: usize, end: usize, text: &str) {
        if line >= self.lines.len() {
            return;
        }
        self.splice(Position::new(line, start), Position::new(line, end), text);
        self.cursor = self.clamp(self.cursor);
        self.anchor = self.anchor.map(|a| self.clamp(a));
    }

    fn replace_selection(&mut self, text: &str) {
        let from = self.anchor.take().unwrap_or(self.cursor);
        let end = self.splice(from, self.cursor, text);
        self.cursor = end;
    }
}

impl fmt::Display for TextDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// Markdown written while an upload is pending, e.g. `![uploading...](k3j9x0q2m1ab)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceholderToken {
    id: String,
    markdown: String,
}

impl PlaceholderToken {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let markdown = format!("![{}]({})", ALT_TEXT, id);
        Self { id, markdown }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The exact text searched for when resolving
    pub fn as_str(&self) -> &str {
        &self.markdown
    }
}

impl fmt::Display for PlaceholderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.markdown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Placeholder replaced by an image link on this line
    Resolved { line: usize },
    /// Placeholder replaced by an empty image link after a failure
    Cleared { line: usize },
    /// Placeholder no longer in the document; nothing changed
    NotFound,
}

/// A placeholder sitting in a document while its upload runs.
///
/// Consumed by exactly one [`resolve`](PendingUpload::resolve) or
/// [`clear`](PendingUpload::clear). Dropping it leaves the placeholder text in
/// place.
#[must_use = "a pending upload must be resolved or cleared"]
#[derive(Debug)]
pub struct PendingUpload {
    token: PlaceholderToken,
}

impl PendingUpload {
    pub fn token(&self) -> &PlaceholderToken {
        &self.token
    }

    pub fn resolve<D: Document + ?Sized>(self, doc: &mut D, url: &str) -> Resolution {
        match replace_first(doc, self.token.as_str(), &image_markdown(url)) {
            Some(line) if url.is_empty() => Resolution::Cleared { line },
            Some(line) => Resolution::Resolved { line },
            None => {
                log::warn!(
                    "Placeholder {} no longer in document, leaving text unchanged",
                    self.token.id()
                );
                Resolution::NotFound
            }
        }
    }

    pub fn clear<D: Document + ?Sized>(self, doc: &mut D) -> Resolution {
        self.resolve(doc, "")
    }
}

pub struct PlaceholderCoordinator<R: Rng = ThreadRng> {
    rng: R,
}

impl PlaceholderCoordinator<ThreadRng> {
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for PlaceholderCoordinator<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> PlaceholderCoordinator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate_token(&mut self) -> PlaceholderToken {
        PlaceholderToken::new(random_base36(&mut self.rng, TOKEN_LENGTH))
    }

    /// Insert `![uploading...](<token>)` plus a newline at the selection
    pub fn insert_placeholder<D: Document + ?Sized>(&mut self, doc: &mut D) -> PendingUpload {
        let token = self.generate_token();
        doc.replace_selection(&format!("{}\n", token));
        log::debug!("Inserted placeholder {}", token.id());
        PendingUpload { token }
    }
}

pub fn image_markdown(url: &str) -> String {
    format!("![]({})", url)
}

/// Replace the first occurrence of `target`, scanning lines from the top.
///
/// Returns the line index that changed, or `None` when `target` is absent.
pub fn replace_first<D: Document + ?Sized>(
    doc: &mut D,
    target: &str,
    replacement: &str,
) -> Option<usize> {
    let target = target.trim();
    if target.is_empty() {
        return None;
    }

    let (line, start) = (0..doc.line_count()).find_map(|index| {
        doc.line(index)
            .and_then(|text| text.find(target))
            .map(|start| (index, start))
    })?;

    doc.replace_range(line, start, start + target.len(), replacement);
    Some(line)
}

pub fn random_base36<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}
