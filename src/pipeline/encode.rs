//! Image encoding: [`UploadedImage`] → base64 payloads for multimodal APIs.
//!
//! The screenshot is forwarded byte-for-byte. Re-encoding would smooth
//! over exactly the compression seams and font artefacts the vision model
//! is asked to look for, so the original JPEG/PNG stream is wrapped as-is.

use crate::pipeline::input::UploadedImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use tracing::debug;

/// Base64 of the raw upload bytes.
pub fn to_base64(image: &UploadedImage) -> String {
    let b64 = STANDARD.encode(image.bytes());
    debug!("Encoded image → {} bytes base64", b64.len());
    b64
}

/// Wrap the upload for an edgequake-llm vision message.
///
/// `detail: "high"` keeps fine print such as transaction IDs legible to
/// GPT-4-class models that tile the image.
pub fn to_image_data(image: &UploadedImage) -> ImageData {
    ImageData::new(to_base64(image), image.mime_type()).with_detail("high")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn small_png() -> UploadedImage {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 160, 80, 255])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("png encode");
        UploadedImage::from_bytes(buf, 1024 * 1024).expect("valid png")
    }

    #[test]
    fn base64_round_trips_raw_bytes() {
        let upload = small_png();
        let decoded = STANDARD.decode(to_base64(&upload)).expect("valid base64");
        assert_eq!(decoded, upload.bytes());
    }

    #[test]
    fn image_data_carries_mime() {
        let data = to_image_data(&small_png());
        assert_eq!(data.mime_type, "image/png");
        assert!(!data.data.is_empty());
    }
}
