//! Shared fixtures: scripted service mocks and in-memory screenshots.

#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use truthlens::{
    ApiKey, AuditConfig, ServiceError, ServiceReply, TextService, UploadedImage, VisionService,
};

/// A service mock that replays one scripted result and records its inputs.
pub struct Scripted {
    name: &'static str,
    needs_key: bool,
    reply: Mutex<Result<ServiceReply, ServiceError>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
    last_key: Mutex<Option<String>>,
    last_prompt: Mutex<Option<String>>,
}

impl Scripted {
    pub fn ok(name: &'static str, text: &str) -> Arc<Self> {
        Self::with(name, Ok(ServiceReply::text(text)))
    }

    pub fn err(name: &'static str, error: ServiceError) -> Arc<Self> {
        Self::with(name, Err(error))
    }

    /// Like [`Scripted::ok`], but authenticates on its own like a
    /// provider-backed stage.
    pub fn keyless(name: &'static str, text: &str) -> Arc<Self> {
        Self::build(name, false, Ok(ServiceReply::text(text)))
    }

    fn with(name: &'static str, reply: Result<ServiceReply, ServiceError>) -> Arc<Self> {
        Self::build(name, true, reply)
    }

    fn build(
        name: &'static str,
        needs_key: bool,
        reply: Result<ServiceReply, ServiceError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            needs_key,
            reply: Mutex::new(reply),
            delay: Mutex::new(None),
            calls: AtomicUsize::new(0),
            last_key: Mutex::new(None),
            last_prompt: Mutex::new(None),
        })
    }

    pub fn set_reply(&self, reply: Result<ServiceReply, ServiceError>) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_key(&self) -> Option<String> {
        self.last_key.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }

    async fn respond(&self, key: &ApiKey, prompt: &str) -> Result<ServiceReply, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_key.lock().unwrap() = Some(key.expose().to_string());
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        let delay = *self.delay.lock().unwrap();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        self.reply.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionService for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    fn requires_key(&self) -> bool {
        self.needs_key
    }

    async fn analyze(
        &self,
        key: &ApiKey,
        prompt: &str,
        _image: &UploadedImage,
    ) -> Result<ServiceReply, ServiceError> {
        self.respond(key, prompt).await
    }
}

#[async_trait]
impl TextService for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    fn requires_key(&self) -> bool {
        self.needs_key
    }

    async fn complete(&self, key: &ApiKey, prompt: &str) -> Result<ServiceReply, ServiceError> {
        self.respond(key, prompt).await
    }
}

pub const VISION_KEY: &str = "AIza-test-vision-key";
pub const VERDICT_KEY: &str = "gsk_test_verdict_key";

pub fn config_with_keys() -> AuditConfig {
    AuditConfig::builder()
        .vision_key(VISION_KEY)
        .verdict_key(VERDICT_KEY)
        .api_timeout(Duration::from_secs(5))
        .build()
        .expect("valid config")
}

/// A freshly encoded PNG: no tag table at all.
pub fn plain_png() -> UploadedImage {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([0, 168, 107, 255])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("png encode");
    UploadedImage::from_bytes(buf, 1024 * 1024).expect("valid png")
}

/// SOI + APP1 Exif (IFD0: Software = "Snapseed") + EOI.
pub fn edited_jpeg() -> UploadedImage {
    let software = b"Snapseed\0";
    let mut tiff = vec![b'I', b'I', 0x2A, 0x00, 8, 0, 0, 0];
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0131u16.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes());
    tiff.extend_from_slice(&(software.len() as u32).to_le_bytes());
    tiff.extend_from_slice(&26u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(software);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    UploadedImage::from_bytes(jpeg, 1024 * 1024).expect("valid jpeg")
}
