// ABOUTME: End-to-end tests for the paste flow against a mock Cloudinary endpoint
// ABOUTME: Covers placeholder insertion, live preview, transcoding, upload and placeholder settlement

use async_trait::async_trait;
use cloudpaste::media::{
    format_size, output_settings, reduction_percent, CompressionLevel, ImageError,
    ProcessingOptions, Transcode, Transcoder, UploadOptions,
};
use cloudpaste::negotiation::{NegotiationSession, NegotiationView, PreviewText};
use cloudpaste::paste::{accept_paste, ClipboardFile, Notifier, PasteEvent, PastePipeline};
use cloudpaste::placeholder::{
    Document, PlaceholderCoordinator, Position, Resolution, TextDocument,
};
use cloudpaste_sdk::{
    ImageAsset, ImageUploader, RemoteConfig, UploadClient, UploadOutcome, UploadedImage,
};
use image::codecs::jpeg::JpegEncoder;
use image::{GenericImageView, ImageEncoder, RgbImage};
use parking_lot::Mutex;
use std::sync::Arc;

const UPLOAD_PATH: &str = "/v1_1/demo/auto/upload";

#[derive(Default)]
struct RecordingView {
    rendered: Mutex<Vec<PreviewText>>,
    notices: Mutex<Vec<String>>,
}

impl Notifier for RecordingView {
    fn notify(&self, message: &str) {
        self.notices.lock().push(message.to_string());
    }
}

impl NegotiationView for RecordingView {
    fn render(&self, preview: &PreviewText) {
        self.rendered.lock().push(preview.clone());
    }

    fn close(&self) {}
}

/// Real client that also remembers what it was asked to upload
struct RecordingUploader {
    client: UploadClient,
    uploaded: Mutex<Vec<(ImageAsset, Option<String>)>>,
}

#[async_trait]
impl ImageUploader for RecordingUploader {
    async fn upload(
        &self,
        asset: &ImageAsset,
        desired_name: Option<&str>,
        config: &RemoteConfig,
    ) -> cloudpaste_sdk::Result<UploadedImage> {
        self.uploaded
            .lock()
            .push((asset.clone(), desired_name.map(str::to_string)));
        self.client.upload(asset, desired_name, config).await
    }
}

fn uploader(server: &mockito::ServerGuard) -> RecordingUploader {
    RecordingUploader {
        client: UploadClient::builder()
            .base_url(Some(server.url()))
            .build()
            .unwrap(),
        uploaded: Mutex::new(Vec::new()),
    }
}

fn config() -> RemoteConfig {
    RemoteConfig::new("demo", "unsigned").with_folder("notes")
}

fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let noise = (x.wrapping_mul(31) ^ y.wrapping_mul(17)) % 255;
        image::Rgb([(x % 256) as u8, (y % 256) as u8, noise as u8])
    });
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, 95)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buffer
}

fn success_body(url: &str) -> String {
    format!(r#"{{"secure_url":"{}","public_id":"x"}}"#, url)
}

#[tokio::test]
async fn test_full_paste_with_preview_and_upload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", UPLOAD_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(success_body("https://res.cloudinary.com/demo/image/upload/shot.jpg"))
        .expect(1)
        .create_async()
        .await;

    // Paste event from the host
    let event = PasteEvent::new(vec![ClipboardFile::new(
        "shot.jpg",
        "image/jpeg",
        jpeg_bytes(2000, 1000),
    )]);
    let file = accept_paste(&event).expect("image paste should be accepted");
    let asset = file.to_asset();

    let mut doc = TextDocument::new("# Notes\n\nBefore\nAfter");
    doc.set_cursor(Position::new(3, 0));
    let pending = PlaceholderCoordinator::new().insert_placeholder(&mut doc);
    assert!(doc.to_string().contains(pending.token().as_str()));

    // Negotiate: defaults are downsample on, no compression; pick medium
    let transcoder = Arc::new(Transcoder::new());
    let view = Arc::new(RecordingView::default());
    let session = NegotiationSession::open(
        asset.clone(),
        "Notes-abc123",
        Arc::clone(&transcoder),
        Arc::clone(&view) as Arc<dyn NegotiationView>,
    );
    session.refresh().await;
    session.set_compression(CompressionLevel::Medium).await;

    // Preview matches what the upload will actually send
    let expected = transcoder
        .transcode(&asset, ProcessingOptions::new(true, CompressionLevel::Medium))
        .unwrap();
    assert_eq!(
        session.preview(),
        PreviewText::Estimate {
            size: format_size(expected.len()),
            reduction: reduction_percent(asset.len(), expected.len()),
        }
    );
    assert_eq!(
        output_settings(asset.mime_type(), CompressionLevel::Medium).quality,
        Some(0.6)
    );
    assert!(view.notices.lock().is_empty());

    let options = session.confirm().unwrap();
    assert_eq!(
        options.processing,
        ProcessingOptions::new(true, CompressionLevel::Medium)
    );

    let pipeline =
        PastePipeline::with_shared_transcoder(uploader(&server), transcoder, config());
    let outcome = pipeline.commit(&asset, &options).await;
    mock.assert_async().await;

    assert_eq!(
        outcome.url(),
        Some("https://res.cloudinary.com/demo/image/upload/shot.jpg")
    );

    let resolution = pending.settle(&mut doc, &outcome, view.as_ref());
    assert_eq!(resolution, Resolution::Resolved { line: 3 });
    assert_eq!(
        doc.to_string(),
        "# Notes\n\nBefore\n![](https://res.cloudinary.com/demo/image/upload/shot.jpg)\nAfter"
    );
}

#[tokio::test]
async fn test_uploaded_asset_is_processed() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", UPLOAD_PATH)
        .with_status(200)
        .with_body(success_body("https://res.cloudinary.com/demo/a.jpg"))
        .create_async()
        .await;

    let original = ImageAsset::new(jpeg_bytes(2000, 1000), "image/jpeg");
    let pipeline = PastePipeline::new(uploader(&server), Transcoder::new(), config());
    let options = UploadOptions {
        file_name: "diagram".to_string(),
        processing: ProcessingOptions::new(true, CompressionLevel::Medium),
    };

    let outcome = pipeline.commit(&original, &options).await;
    assert!(outcome.is_success());

    let uploaded = pipeline_uploads(&pipeline);
    assert_eq!(uploaded.len(), 1);
    let (asset, name) = &uploaded[0];

    assert_eq!(asset.mime_type(), "image/jpeg");
    assert_eq!(name.as_deref(), Some("diagram"));
    assert!(asset.len() < original.len());
    let decoded = image::load_from_memory(asset.bytes()).unwrap();
    assert_eq!(decoded.dimensions(), (500, 250));
}

fn pipeline_uploads(
    pipeline: &PastePipeline<RecordingUploader, Transcoder>,
) -> Vec<(ImageAsset, Option<String>)> {
    pipeline.uploader().uploaded.lock().clone()
}

#[tokio::test]
async fn test_png_with_compression_uploads_webp() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", UPLOAD_PATH)
        .with_status(200)
        .with_body(success_body("https://res.cloudinary.com/demo/b.webp"))
        .create_async()
        .await;

    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(RgbImage::from_fn(64, 64, |x, y| {
        image::Rgb([x as u8, y as u8, 128])
    }))
    .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
    .unwrap();

    let pipeline = PastePipeline::new(uploader(&server), Transcoder::new(), config());
    let options = UploadOptions {
        file_name: String::new(),
        processing: ProcessingOptions::new(false, CompressionLevel::Low),
    };

    let outcome = pipeline
        .commit(&ImageAsset::new(png, "image/png"), &options)
        .await;
    assert!(outcome.is_success());

    let uploaded = pipeline_uploads(&pipeline);
    let (asset, name) = &uploaded[0];
    assert_eq!(asset.mime_type(), "image/webp");
    assert_eq!(name, &None);
    assert_eq!(
        image::guess_format(asset.bytes()).unwrap(),
        image::ImageFormat::WebP
    );
}

#[tokio::test]
async fn test_server_error_clears_placeholder_and_notifies() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", UPLOAD_PATH)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"Upload preset not found"}}"#)
        .expect(1)
        .create_async()
        .await;

    let view = RecordingView::default();
    let mut doc = TextDocument::new("text");
    doc.move_to_end();
    doc.replace_selection("\n");
    let pending = PlaceholderCoordinator::new().insert_placeholder(&mut doc);

    let pipeline = PastePipeline::new(uploader(&server), Transcoder::new(), config());
    let asset = ImageAsset::new(jpeg_bytes(64, 32), "image/jpeg");
    let outcome = pipeline
        .commit(&asset, &UploadOptions::new("note-x"))
        .await;
    mock.assert_async().await;

    assert!(matches!(outcome, UploadOutcome::Failure { .. }));
    let resolution = pending.settle(&mut doc, &outcome, &view);

    assert_eq!(resolution, Resolution::Cleared { line: 1 });
    assert_eq!(doc.to_string(), "text\n![]()\n");
    let notices = view.notices.lock();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].starts_with("Upload failed:"));
    assert!(notices[0].contains("Upload preset not found"));
}

#[tokio::test]
async fn test_missing_settings_never_reach_network() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let pipeline = PastePipeline::new(
        uploader(&server),
        Transcoder::new(),
        RemoteConfig::new("", "unsigned"),
    );
    let asset = ImageAsset::new(jpeg_bytes(16, 16), "image/jpeg");

    let outcome = pipeline.commit(&asset, &UploadOptions::new("x")).await;
    mock.assert_async().await;

    assert_eq!(
        outcome,
        UploadOutcome::Failure {
            reason: "Cloudinary settings not configured (missing cloud_name)".to_string()
        }
    );
    assert!(pipeline_uploads(&pipeline).is_empty());
}

#[tokio::test]
async fn test_undecodable_paste_fails_without_upload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", UPLOAD_PATH)
        .expect(0)
        .create_async()
        .await;

    let pipeline = PastePipeline::new(uploader(&server), Transcoder::new(), config());
    let asset = ImageAsset::new(b"not an image".to_vec(), "image/png");

    let result = pipeline.try_commit(&asset, &UploadOptions::new("x")).await;
    mock.assert_async().await;

    assert!(matches!(
        result,
        Err(cloudpaste::PasteError::Image(ImageError::Decode(_)))
    ));
}

#[tokio::test]
async fn test_concurrent_pastes_resolve_their_own_placeholders() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", UPLOAD_PATH)
        .with_status(200)
        .with_body(success_body("https://res.cloudinary.com/demo/same.jpg"))
        .expect(2)
        .create_async()
        .await;

    let doc = Mutex::new(TextDocument::new("start"));
    doc.lock().move_to_end();
    doc.lock().replace_selection("\n");

    let mut coordinator = PlaceholderCoordinator::new();
    let first = coordinator.insert_placeholder(&mut *doc.lock());
    let second = coordinator.insert_placeholder(&mut *doc.lock());

    let pipeline = PastePipeline::new(uploader(&server), Transcoder::new(), config());
    let small = ImageAsset::new(jpeg_bytes(32, 32), "image/jpeg");
    let large = ImageAsset::new(jpeg_bytes(400, 200), "image/jpeg");

    let large_options = UploadOptions::new("large");
    let small_options = UploadOptions::new("small");
    let (large_outcome, small_outcome) = tokio::join!(
        pipeline.commit(&large, &large_options),
        pipeline.commit(&small, &small_options),
    );

    // The user keeps typing above both placeholders meanwhile
    doc.lock().set_cursor(Position::new(0, 0));
    doc.lock().replace_selection("typed while uploading\n");

    let view = RecordingView::default();
    assert_eq!(
        second.settle(&mut *doc.lock(), &small_outcome, &view),
        Resolution::Resolved { line: 3 }
    );
    assert_eq!(
        first.settle(&mut *doc.lock(), &large_outcome, &view),
        Resolution::Resolved { line: 2 }
    );

    assert_eq!(
        doc.lock().to_string(),
        "typed while uploading\nstart\n![](https://res.cloudinary.com/demo/same.jpg)\n![](https://res.cloudinary.com/demo/same.jpg)\n"
    );
    assert!(view.notices.lock().is_empty());
}

#[tokio::test]
async fn test_deleted_placeholder_leaves_document_alone() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", UPLOAD_PATH)
        .with_status(200)
        .with_body(success_body("https://res.cloudinary.com/demo/gone.jpg"))
        .create_async()
        .await;

    let mut doc = TextDocument::new("");
    let pending = PlaceholderCoordinator::new().insert_placeholder(&mut doc);

    // User selects everything and replaces it
    doc = TextDocument::new("entirely new content");
    let before = doc.clone();

    let pipeline = PastePipeline::new(uploader(&server), Transcoder::new(), config());
    let outcome = pipeline
        .commit(&ImageAsset::new(jpeg_bytes(16, 16), "image/jpeg"), &UploadOptions::new("x"))
        .await;
    assert!(outcome.is_success());

    let resolution = pending.settle(&mut doc, &outcome, &RecordingView::default());
    assert_eq!(resolution, Resolution::NotFound);
    assert_eq!(doc, before);
}
