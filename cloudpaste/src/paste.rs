// ABOUTME: Paste handling from clipboard payload to settled placeholder
// ABOUTME: Gates image pastes, names uploads, and runs transcode-then-upload for confirmed options

use crate::constants::{mime, placeholder::NAME_SUFFIX_LENGTH};
use crate::error::PasteError;
use crate::media::{ProcessingOptions, Transcode, UploadOptions};
use crate::placeholder::{random_base36, Document, PendingUpload, Resolution};
use cloudpaste_sdk::{
    ImageAsset, ImageUploader, RemoteConfig, UploadError, UploadOutcome, UploadedImage,
};
use rand::Rng;
use std::path::Path;
use std::sync::Arc;

/// Transient user-facing messages (toasts, status lines)
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// One file attached to a paste event.
#[derive(Debug, Clone)]
pub struct ClipboardFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ClipboardFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type
            .trim()
            .to_ascii_lowercase()
            .starts_with(mime::IMAGE_PREFIX)
    }

    pub fn to_asset(&self) -> ImageAsset {
        ImageAsset::new(self.bytes.clone(), self.mime_type.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PasteEvent {
    pub files: Vec<ClipboardFile>,
}

impl PasteEvent {
    pub fn new(files: Vec<ClipboardFile>) -> Self {
        Self { files }
    }
}

/// The file to handle for a paste, if any.
///
/// Only the first attached file is considered, and only when its declared
/// type is an image. Anything else is left to the host's default handling.
pub fn accept_paste(event: &PasteEvent) -> Option<&ClipboardFile> {
    event.files.first().filter(|file| file.is_image())
}

/// Name suggested for an upload.
///
/// `<note>-<6 base-36 chars>` while a note is active, otherwise the pasted
/// file name without its extension.
pub fn default_upload_name<R: Rng + ?Sized>(
    active_note: Option<&str>,
    file_name: &str,
    rng: &mut R,
) -> String {
    match active_note.map(str::trim).filter(|note| !note.is_empty()) {
        Some(note) => format!("{}-{}", note, random_base36(rng, NAME_SUFFIX_LENGTH)),
        None => Path::new(file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(file_name)
            .to_string(),
    }
}

/// Run a transcode on the blocking pool so the caller's task stays responsive.
pub async fn transcode_blocking<T: Transcode + 'static>(
    transcoder: Arc<T>,
    asset: ImageAsset,
    options: ProcessingOptions,
) -> Result<ImageAsset, PasteError> {
    let processed =
        tokio::task::spawn_blocking(move || transcoder.transcode(&asset, options)).await??;
    Ok(processed)
}

/// Transcode and upload for confirmed options.
pub struct PastePipeline<U, T> {
    uploader: U,
    transcoder: Arc<T>,
    config: RemoteConfig,
}

impl<U, T> PastePipeline<U, T>
where
    U: ImageUploader,
    T: Transcode + 'static,
{
    pub fn new(uploader: U, transcoder: T, config: RemoteConfig) -> Self {
        Self::with_shared_transcoder(uploader, Arc::new(transcoder), config)
    }

    pub fn with_shared_transcoder(uploader: U, transcoder: Arc<T>, config: RemoteConfig) -> Self {
        Self {
            uploader,
            transcoder,
            config,
        }
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    pub fn transcoder(&self) -> Arc<T> {
        Arc::clone(&self.transcoder)
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Process and upload once, returning the stored image or the first failure.
    ///
    /// Missing settings are reported before any image work or network call.
    pub async fn try_commit(
        &self,
        asset: &ImageAsset,
        options: &UploadOptions,
    ) -> Result<UploadedImage, PasteError> {
        let missing = self.config.missing_fields();
        if !missing.is_empty() {
            return Err(UploadError::Configuration(missing.join(", ")).into());
        }

        let processed =
            transcode_blocking(self.transcoder(), asset.clone(), options.processing).await?;

        log::info!(
            "Uploading {} ({} bytes, was {} bytes)",
            processed.mime_type(),
            processed.len(),
            asset.len()
        );

        let uploaded = self
            .uploader
            .upload(&processed, options.desired_name(), &self.config)
            .await?;
        Ok(uploaded)
    }

    pub async fn commit(&self, asset: &ImageAsset, options: &UploadOptions) -> UploadOutcome {
        let result = self.try_commit(asset, options).await;
        if let Err(e) = &result {
            log::error!("Paste upload failed: {}", e);
        }
        result.into()
    }
}

impl PendingUpload {
    /// Finish the placeholder for an upload outcome.
    ///
    /// Success swaps in the image link. Failure notifies the user with the
    /// reason and clears the placeholder to an empty link.
    pub fn settle<D: Document + ?Sized>(
        self,
        doc: &mut D,
        outcome: &UploadOutcome,
        notifier: &dyn Notifier,
    ) -> Resolution {
        match outcome {
            UploadOutcome::Success { url } => self.resolve(doc, url),
            UploadOutcome::Failure { reason } => {
                notifier.notify(&failure_notice(reason));
                self.clear(doc)
            }
        }
    }
}

fn failure_notice(reason: &str) -> String {
    // SDK upload errors already carry the prefix
    if reason.starts_with("Upload failed") {
        reason.to_string()
    } else {
        format!("Upload failed: {}", reason)
    }
}
