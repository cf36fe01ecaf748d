// ABOUTME: Terminal rendering of notices, size previews and settings for the reference host
// ABOUTME: Writes user-facing messages to stderr with optional color

use crate::config::{SettingField, Settings};
use crate::negotiation::{PreviewText, SourceInfo};
use crate::paste::Notifier;
use owo_colors::OwoColorize;
use std::io::IsTerminal;

pub struct CliOutput {
    use_color: bool,
}

impl CliOutput {
    /// Create new CLI output utility with TTY detection
    pub fn new() -> Self {
        Self {
            use_color: std::io::stderr().is_terminal(),
        }
    }

    pub fn with_color(use_color: bool) -> Self {
        Self { use_color }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{}", self.label("error:", message, Tone::Error));
    }

    pub fn hint(&self, message: &str) {
        eprintln!("{}", self.label("hint:", message, Tone::Info));
    }

    pub fn success(&self, message: &str) {
        eprintln!("{}", self.label("success:", message, Tone::Success));
    }

    pub fn preview(&self, preview: &PreviewText) {
        if let Some(line) = self.preview_line(preview) {
            eprintln!("{}", line);
        }
    }

    pub fn source_info(&self, info: &SourceInfo) {
        eprintln!("{}", info);
    }

    /// Line shown for a preview state; nothing while processing is off
    pub fn preview_line(&self, preview: &PreviewText) -> Option<String> {
        match preview {
            PreviewText::Hidden => None,
            PreviewText::Calculating => Some(self.dim(&preview.to_string())),
            PreviewText::Estimate { .. } => Some(format!(
                "Estimated size after processing: {}",
                self.highlight(&preview.to_string())
            )),
            PreviewText::Failed => {
                Some(self.label("warning:", &preview.to_string(), Tone::Warning))
            }
        }
    }

    pub fn settings_table(&self, settings: &Settings) -> String {
        SettingField::ALL
            .iter()
            .map(|field| {
                let value = settings.get(*field);
                let shown = if value.is_empty() {
                    self.dim("(not set)")
                } else {
                    value.to_string()
                };
                format!(
                    "{:<14} {}  {}",
                    field.as_str(),
                    shown,
                    self.dim(&format!("# {}", field.description()))
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn label(&self, prefix: &str, message: &str, tone: Tone) -> String {
        let prefix = if !self.use_color {
            prefix.to_string()
        } else {
            match tone {
                Tone::Error => prefix.red().bold().to_string(),
                Tone::Warning => prefix.yellow().bold().to_string(),
                Tone::Info => prefix.blue().bold().to_string(),
                Tone::Success => prefix.green().bold().to_string(),
            }
        };

        format!("{} {}", prefix, message)
    }

    fn dim(&self, text: &str) -> String {
        if self.use_color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn highlight(&self, text: &str) -> String {
        if self.use_color {
            text.cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for CliOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for CliOutput {
    fn notify(&self, message: &str) {
        eprintln!("{}", self.label("notice:", message, Tone::Warning));
    }
}

#[derive(Clone, Copy)]
enum Tone {
    Error,
    Warning,
    Info,
    Success,
}
