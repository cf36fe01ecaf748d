// ABOUTME: Terminal options dialog for a paste, driving a negotiation session
// ABOUTME: Provides dialoguer prompts for downsampling, compression and upload name with live preview

use crate::cli_output::CliOutput;
use crate::media::{CompressionLevel, Transcode, UploadOptions};
use crate::negotiation::{NegotiationSession, NegotiationView, PreviewText};
use crate::paste::Notifier;
use anyhow::{anyhow, Result};
use dialoguer::{Input, Select};
use std::io::IsTerminal;

/// Negotiation surface rendered as lines on stderr.
pub struct TerminalView {
    output: CliOutput,
}

impl TerminalView {
    pub fn new(output: CliOutput) -> Self {
        Self { output }
    }
}

impl Notifier for TerminalView {
    fn notify(&self, message: &str) {
        self.output.notify(message);
    }
}

impl NegotiationView for TerminalView {
    fn render(&self, preview: &PreviewText) {
        self.output.preview(preview);
    }

    fn close(&self) {
        log::debug!("Options dialog closed");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuEntry {
    Downsample,
    Compression,
    FileName,
    Upload,
    Cancel,
}

const MENU: [MenuEntry; 5] = [
    MenuEntry::Downsample,
    MenuEntry::Compression,
    MenuEntry::FileName,
    MenuEntry::Upload,
    MenuEntry::Cancel,
];

fn menu_items(options: &UploadOptions) -> Vec<String> {
    MENU.iter()
        .map(|entry| match entry {
            MenuEntry::Downsample => format!(
                "Downsample to 25%: {}",
                if options.processing.downsample { "on" } else { "off" }
            ),
            MenuEntry::Compression => {
                format!("Compression: {}", options.processing.compression.label())
            }
            MenuEntry::FileName => {
                let name = options.file_name.trim();
                if name.is_empty() {
                    "File name: (assigned by Cloudinary)".to_string()
                } else {
                    format!("File name: {}", name)
                }
            }
            MenuEntry::Upload => "Upload".to_string(),
            MenuEntry::Cancel => "Cancel".to_string(),
        })
        .collect()
}

pub struct OptionsPrompter {
    is_tty: bool,
}

impl OptionsPrompter {
    pub fn new() -> Self {
        let is_tty = std::io::stdin().is_terminal();
        Self { is_tty }
    }

    /// Check if interactive prompts should be used
    pub fn should_prompt(&self) -> bool {
        self.is_tty && !self.is_in_ci()
    }

    /// Check if running in CI environment
    pub fn is_in_ci(&self) -> bool {
        std::env::var("CI").is_ok()
            || std::env::var("GITHUB_ACTIONS").is_ok()
            || std::env::var("JENKINS_URL").is_ok()
            || std::env::var("BUILDKITE").is_ok()
    }

    pub fn ensure_available(&self) -> Result<()> {
        if !self.should_prompt() {
            return Err(anyhow!(
                "Interactive prompts not available in non-TTY environment (use --yes)"
            ));
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn with_tty_override(mut self, is_tty: bool) -> Self {
        self.is_tty = is_tty;
        self
    }

    /// Run the dialog until the user uploads or cancels.
    ///
    /// Returns the confirmed options, or `None` on cancel.
    pub async fn negotiate<T: Transcode + 'static>(
        &self,
        session: &NegotiationSession<T>,
        output: &CliOutput,
    ) -> Result<Option<UploadOptions>> {
        self.ensure_available()?;

        output.source_info(&session.source_info());
        session.refresh().await;

        loop {
            let options = session.options();
            let selection = Select::new()
                .with_prompt("Upload options")
                .items(&menu_items(&options))
                .default(3)
                .interact()
                .map_err(|e| anyhow!("Failed to read selection: {}", e))?;

            match MENU[selection] {
                MenuEntry::Downsample => {
                    session.set_downsample(!options.processing.downsample).await
                }
                MenuEntry::Compression => {
                    let level = self.prompt_compression(options.processing.compression)?;
                    session.set_compression(level).await;
                }
                MenuEntry::FileName => {
                    let name: String = Input::new()
                        .with_prompt("File name")
                        .with_initial_text(options.file_name.clone())
                        .allow_empty(true)
                        .interact_text()
                        .map_err(|e| anyhow!("Failed to read file name: {}", e))?;
                    session.set_file_name(name);
                }
                MenuEntry::Upload => return Ok(session.confirm()),
                MenuEntry::Cancel => {
                    session.cancel();
                    return Ok(None);
                }
            }
        }
    }

    fn prompt_compression(&self, current: CompressionLevel) -> Result<CompressionLevel> {
        let labels: Vec<&str> = CompressionLevel::ALL.iter().map(|l| l.label()).collect();
        let default = CompressionLevel::ALL
            .iter()
            .position(|level| *level == current)
            .unwrap_or(0);

        let selection = Select::new()
            .with_prompt("Compression")
            .items(&labels)
            .default(default)
            .interact()
            .map_err(|e| anyhow!("Failed to select compression: {}", e))?;

        Ok(CompressionLevel::ALL[selection])
    }
}

impl Default for OptionsPrompter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_prompt_without_tty() {
        let prompter = OptionsPrompter::new().with_tty_override(false);
        assert!(!prompter.should_prompt());
    }

    #[test]
    fn test_should_prompt_with_tty() {
        let prompter = OptionsPrompter::new().with_tty_override(true);
        assert_eq!(prompter.should_prompt(), !prompter.is_in_ci());
    }

    #[test]
    fn test_menu_items_reflect_options() {
        let items = menu_items(&UploadOptions::new("Daily-x1y2z3"));
        assert_eq!(
            items,
            vec![
                "Downsample to 25%: on",
                "Compression: No compression",
                "File name: Daily-x1y2z3",
                "Upload",
                "Cancel",
            ]
        );
        assert_eq!(MENU[3], MenuEntry::Upload);
    }

    #[test]
    fn test_menu_items_blank_name() {
        let mut options = UploadOptions::new("");
        options.processing.compression = CompressionLevel::High;
        let items = menu_items(&options);
        assert_eq!(items[1], "Compression: High compression");
        assert_eq!(items[2], "File name: (assigned by Cloudinary)");
    }

    #[test]
    fn test_ensure_available_without_tty() {
        let err = OptionsPrompter::new()
            .with_tty_override(false)
            .ensure_available()
            .unwrap_err();
        assert!(err.to_string().contains("use --yes"));
    }

    #[tokio::test]
    async fn test_negotiate_requires_tty() {
        use crate::media::Transcoder;
        use cloudpaste_sdk::ImageAsset;
        use std::sync::Arc;

        let output = CliOutput::with_color(false);
        let session = NegotiationSession::open(
            ImageAsset::new(vec![0u8; 4], "image/png"),
            "x",
            Arc::new(Transcoder::new()),
            Arc::new(TerminalView::new(CliOutput::with_color(false))),
        );

        let result = OptionsPrompter::new()
            .with_tty_override(false)
            .negotiate(&session, &output)
            .await;
        assert!(result.is_err());
    }
}
