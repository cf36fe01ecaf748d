// ABOUTME: Options negotiation session with a live, single-flight size preview
// ABOUTME: Re-runs the transcoder on option changes and converges on the latest options

use crate::constants::ui;
use crate::media::{
    format_size, is_lossy, reduction_percent, CompressionLevel, Transcode, UploadOptions,
};
use crate::paste::{transcode_blocking, Notifier};
use cloudpaste_sdk::ImageAsset;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// What the preview area shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewText {
    /// No processing requested
    #[default]
    Hidden,
    Calculating,
    Estimate { size: String, reduction: i64 },
    Failed,
}

impl fmt::Display for PreviewText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewText::Hidden => Ok(()),
            PreviewText::Calculating => f.write_str(ui::PREVIEW_CALCULATING),
            PreviewText::Estimate { size, reduction } => {
                write!(f, "{} ({}% smaller)", size, reduction)
            }
            PreviewText::Failed => f.write_str(ui::PREVIEW_FAILED),
        }
    }
}

/// Preview for a processed asset relative to its original
pub fn estimate(original: &ImageAsset, processed: &ImageAsset) -> PreviewText {
    PreviewText::Estimate {
        size: format_size(processed.len()),
        reduction: reduction_percent(original.len(), processed.len()),
    }
}

/// Static facts about the pasted image shown next to the options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub original_size: String,
    pub mime_type: String,
    pub supports_compression: bool,
}

impl SourceInfo {
    pub fn of(asset: &ImageAsset) -> Self {
        Self {
            original_size: format_size(asset.len()),
            mime_type: asset.mime_type().to_string(),
            supports_compression: is_lossy(asset.mime_type()),
        }
    }

    pub fn format_note(&self) -> &'static str {
        if self.supports_compression {
            "(supports compression)"
        } else {
            "(will be converted to WebP for compression)"
        }
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Original size: {}\nFormat: {} {}",
            self.original_size,
            self.mime_type,
            self.format_note()
        )
    }
}

/// Host surface the session drives.
pub trait NegotiationView: Notifier {
    fn render(&self, preview: &PreviewText);

    fn close(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    Confirmed,
    Closed,
}

struct SessionState {
    options: UploadOptions,
    phase: Phase,
    in_flight: bool,
    stale: bool,
    preview: PreviewText,
}

/// Releases the preview slot when a refresh is dropped mid-transcode
struct InFlightGuard<'a> {
    state: &'a Mutex<SessionState>,
    armed: bool,
}

impl<'a> InFlightGuard<'a> {
    fn new(state: &'a Mutex<SessionState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            log::debug!("Preview abandoned before the transcode finished");
            self.state.lock().in_flight = false;
        }
    }
}

struct SessionInner<T> {
    asset: ImageAsset,
    transcoder: Arc<T>,
    view: Arc<dyn NegotiationView>,
    state: Mutex<SessionState>,
}

/// One open options dialog for one pasted image.
///
/// At most one preview transcode runs at a time. Changes made while one is
/// running mark it stale; when it finishes its result is dropped and the
/// latest options are previewed instead.
pub struct NegotiationSession<T> {
    inner: Arc<SessionInner<T>>,
}

impl<T> Clone for NegotiationSession<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transcode + 'static> NegotiationSession<T> {
    /// Open with the default options (downsample on, no compression)
    pub fn open(
        asset: ImageAsset,
        file_name: impl Into<String>,
        transcoder: Arc<T>,
        view: Arc<dyn NegotiationView>,
    ) -> Self {
        Self::with_options(asset, UploadOptions::new(file_name), transcoder, view)
    }

    pub fn with_options(
        asset: ImageAsset,
        options: UploadOptions,
        transcoder: Arc<T>,
        view: Arc<dyn NegotiationView>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                asset,
                transcoder,
                view,
                state: Mutex::new(SessionState {
                    options,
                    phase: Phase::Open,
                    in_flight: false,
                    stale: false,
                    preview: PreviewText::Hidden,
                }),
            }),
        }
    }

    pub fn source_info(&self) -> SourceInfo {
        SourceInfo::of(&self.inner.asset)
    }

    pub fn options(&self) -> UploadOptions {
        self.inner.state.lock().options.clone()
    }

    pub fn preview(&self) -> PreviewText {
        self.inner.state.lock().preview.clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.state.lock().phase
    }

    pub async fn set_downsample(&self, downsample: bool) {
        if self.update(|options| options.processing.downsample = downsample) {
            self.refresh().await;
        }
    }

    pub async fn set_compression(&self, level: CompressionLevel) {
        if self.update(|options| options.processing.compression = level) {
            self.refresh().await;
        }
    }

    /// The name does not affect the preview, so no transcode runs
    pub fn set_file_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.update(|options| options.file_name = name);
    }

    fn update(&self, change: impl FnOnce(&mut UploadOptions)) -> bool {
        let mut state = self.inner.state.lock();
        if state.phase != Phase::Open {
            return false;
        }
        change(&mut state.options);
        true
    }

    /// Recompute the preview for the current options.
    ///
    /// Returns immediately when another refresh is running; that refresh picks
    /// up the newer options once its own transcode finishes.
    pub async fn refresh(&self) {
        loop {
            let (processing, shown) = {
                let mut state = self.inner.state.lock();
                if state.phase != Phase::Open {
                    return;
                }
                if state.in_flight {
                    state.stale = true;
                    return;
                }
                state.stale = false;

                let processing = state.options.processing;
                if processing.is_identity() {
                    state.preview = PreviewText::Hidden;
                    (None, PreviewText::Hidden)
                } else {
                    state.in_flight = true;
                    state.preview = PreviewText::Calculating;
                    (Some(processing), PreviewText::Calculating)
                }
            };
            self.inner.view.render(&shown);

            let Some(processing) = processing else {
                return;
            };

            let mut guard = InFlightGuard::new(&self.inner.state);
            let result = transcode_blocking(
                Arc::clone(&self.inner.transcoder),
                self.inner.asset.clone(),
                processing,
            )
            .await;

            let preview = {
                let mut state = self.inner.state.lock();
                guard.disarm();
                state.in_flight = false;
                if state.phase != Phase::Open {
                    return;
                }
                if state.stale {
                    log::debug!("Options changed during preview, recomputing");
                    continue;
                }

                let preview = match &result {
                    Ok(processed) => estimate(&self.inner.asset, processed),
                    Err(e) => {
                        log::warn!("Size preview failed: {}", e);
                        PreviewText::Failed
                    }
                };
                state.preview = preview.clone();
                preview
            };

            self.inner.view.render(&preview);
            if preview == PreviewText::Failed {
                self.inner.view.notify(ui::PREVIEW_FAILED_NOTICE);
            }
            return;
        }
    }

    /// Freeze the options and close the surface.
    ///
    /// Returns `None` if the session was already confirmed or cancelled.
    pub fn confirm(&self) -> Option<UploadOptions> {
        let options = {
            let mut state = self.inner.state.lock();
            if state.phase != Phase::Open {
                return None;
            }
            state.phase = Phase::Confirmed;
            state.options.clone()
        };
        self.inner.view.close();
        Some(options)
    }

    /// Close without confirming; the paste's placeholder stays pending
    pub fn cancel(&self) {
        {
            let mut state = self.inner.state.lock();
            if state.phase != Phase::Open {
                return;
            }
            state.phase = Phase::Closed;
        }
        self.inner.view.close();
    }
}
