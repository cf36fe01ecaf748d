// ABOUTME: Main entry point for the cloudpaste command-line host
// ABOUTME: Wires notes on disk, the options dialog and the upload pipeline together

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cloudpaste::cli::{Cli, Commands, ConfigAction};
use cloudpaste::cli_output::CliOutput;
use cloudpaste::config::ConfigStore;
use cloudpaste::constants::ui::PROGRESS_BAR_TICK_MS;
use cloudpaste::host::{clipboard_file, NoteFile};
use cloudpaste::interactive::{OptionsPrompter, TerminalView};
use cloudpaste::media::{
    format_size, CompressionLevel, ProcessingOptions, Transcoder, UploadOptions,
};
use cloudpaste::negotiation::{estimate, NegotiationSession, SourceInfo};
use cloudpaste::paste::{
    accept_paste, default_upload_name, transcode_blocking, PasteEvent, PastePipeline,
};
use cloudpaste::placeholder::{PlaceholderCoordinator, Resolution};
use cloudpaste::PasteError;
use cloudpaste_sdk::{ImageAsset, UploadClient, UploadOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let use_color = if cli.force_color {
        true
    } else {
        !cli.no_color
            && std::env::var("NO_COLOR").is_err()
            && std::env::var("TERM").unwrap_or_default() != "dumb"
            && std::io::stderr().is_terminal()
    };
    let output = CliOutput::with_color(use_color);

    if let Err(e) = run(cli, &output, use_color).await {
        output.error(&format!("{:#}", e));
        if let Some(hint) = e.downcast_ref::<PasteError>().and_then(PasteError::help_text) {
            output.hint(hint);
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

async fn run(cli: Cli, output: &CliOutput, use_color: bool) -> Result<()> {
    match cli.command {
        Commands::Paste {
            image,
            note,
            line,
            name,
            downsample,
            compression,
            yes,
        } => {
            let processing = ProcessingOptions::new(downsample, compression);
            let request = PasteRequest {
                image: &image,
                note: NoteFile::new(note),
                line: line.map(|l| l as usize),
                name,
                processing,
                interactive: !yes,
            };
            paste(request, output, use_color).await
        }
        Commands::Preview {
            image,
            downsample,
            compression,
        } => preview(&image, downsample, compression, output).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let store = ConfigStore::load()?;
                println!("{}", output.settings_table(store.settings()));
                println!();
                println!("Saved to: {}", store.write_path().display());
                Ok(())
            }
            ConfigAction::Set { field, value } => {
                let mut store = ConfigStore::load()?;
                store.set(&field, &value)?;
                output.success(&format!("Saved {}", field.trim()));
                Ok(())
            }
        },
    }
}

struct PasteRequest<'a> {
    image: &'a Path,
    note: NoteFile,
    line: Option<usize>,
    name: Option<String>,
    processing: ProcessingOptions,
    interactive: bool,
}

async fn paste(request: PasteRequest<'_>, output: &CliOutput, use_color: bool) -> Result<()> {
    let event = PasteEvent::new(vec![clipboard_file(request.image)?]);
    let file = accept_paste(&event).ok_or_else(|| {
        anyhow!(
            "{} is not an image (only image/* pastes are handled)",
            request.image.display()
        )
    })?;
    let asset = file.to_asset();

    let settings = ConfigStore::load()?.settings().clone();
    let transcoder = Arc::new(Transcoder::new());
    let pipeline = PastePipeline::with_shared_transcoder(
        UploadClient::new()?,
        Arc::clone(&transcoder),
        settings.remote_config(),
    );

    // Refuse before touching the note when the dialog cannot run
    let prompter = OptionsPrompter::new();
    if request.interactive {
        prompter.ensure_available()?;
    }

    let mut coordinator = PlaceholderCoordinator::new();
    let pending = request
        .note
        .insert_placeholder(&mut coordinator, request.line)?;
    log::debug!(
        "Placeholder {} written to {}",
        pending.token().id(),
        request.note.path().display()
    );

    let file_name = request.name.clone().unwrap_or_else(|| {
        default_upload_name(request.note.basename(), &file.name, &mut rand::rng())
    });
    let initial = UploadOptions {
        file_name,
        processing: request.processing,
    };

    let confirmed = if request.interactive {
        let session = NegotiationSession::with_options(
            asset.clone(),
            initial,
            Arc::clone(&transcoder),
            Arc::new(TerminalView::new(CliOutput::with_color(use_color))),
        );
        match prompter.negotiate(&session, output).await {
            Ok(confirmed) => confirmed,
            Err(e) => {
                request.note.discard(pending)?;
                return Err(e);
            }
        }
    } else {
        Some(initial)
    };

    let Some(options) = confirmed else {
        output.hint(&format!(
            "Cancelled; placeholder {} left in {}",
            pending.token(),
            request.note.path().display()
        ));
        // Cancelling leaves the placeholder pending
        drop(pending);
        return Ok(());
    };

    let spinner = upload_spinner(&asset);
    let result = pipeline.try_commit(&asset, &options).await;
    spinner.finish_and_clear();

    let hint = result.as_ref().err().and_then(PasteError::help_text);
    if let Err(e) = &result {
        log::error!("Paste upload failed: {}", e);
    }
    let outcome = UploadOutcome::from(result);

    let resolution = request.note.settle(pending, &outcome, output)?;
    match (outcome, resolution) {
        (UploadOutcome::Success { url }, Resolution::NotFound) => {
            output.hint(&format!(
                "Placeholder was removed from the note; image uploaded to {}",
                url
            ));
        }
        (UploadOutcome::Success { url }, _) => output.success(&format!("Uploaded {}", url)),
        (UploadOutcome::Failure { .. }, _) => {
            if let Some(hint) = hint {
                output.hint(hint);
            }
            return Err(anyhow!("Upload did not complete"));
        }
    }

    Ok(())
}

fn upload_spinner(asset: &ImageAsset) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Uploading {} ({})...", asset.mime_type(), format_size(asset.len())));
    spinner.enable_steady_tick(Duration::from_millis(PROGRESS_BAR_TICK_MS));
    spinner
}

async fn preview(
    image: &Path,
    downsample: bool,
    compression: CompressionLevel,
    output: &CliOutput,
) -> Result<()> {
    let file = clipboard_file(image)?;
    if !file.is_image() {
        return Err(anyhow!("{} is not an image", image.display()));
    }

    let asset = file.to_asset();
    output.source_info(&SourceInfo::of(&asset));

    let processing = ProcessingOptions::new(downsample, compression);
    if processing.is_identity() {
        println!("No processing requested; the image is uploaded as is");
        return Ok(());
    }

    let processed = transcode_blocking(Arc::new(Transcoder::new()), asset.clone(), processing)
        .await
        .with_context(|| format!("Could not process {}", image.display()))?;

    if let Some(line) = output.preview_line(&estimate(&asset, &processed)) {
        println!("{}", line);
    }
    Ok(())
}
