//! Camera frame encoding.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use tracing::{error, info};

use super::data_url;
use crate::error::CaptureError;

/// JPEG quality for captured frames
const CAPTURE_QUALITY: u8 = 90;

/// A video source that can hand out its current frame
pub trait Camera {
    /// The latest frame, or `None` while the stream is still starting
    fn current_frame(&self) -> Result<Option<RgbaImage>, CaptureError>;
}

/// Host without a usable camera
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCamera;

impl Camera for NoCamera {
    fn current_frame(&self) -> Result<Option<RgbaImage>, CaptureError> {
        Err(CaptureError::Unavailable)
    }
}

/// Grab the current frame from `camera` and encode it
pub fn capture(camera: &dyn Camera) -> Result<String, CaptureError> {
    let frame = camera.current_frame()?;
    encode_frame(frame.as_ref())
}

/// Encode the current camera frame as a JPEG data URL.
/// A missing or zero-sized frame means the stream has not produced video yet.
pub fn encode_frame(frame: Option<&RgbaImage>) -> Result<String, CaptureError> {
    let frame = match frame {
        Some(f) if f.width() > 0 && f.height() > 0 => f,
        _ => {
            error!("❌ Camera view is not ready or has zero dimensions");
            return Err(CaptureError::NotReady);
        }
    };

    let rgb = DynamicImage::ImageRgba8(frame.clone()).to_rgb8();
    let mut jpeg = Vec::new();
    if JpegEncoder::new_with_quality(&mut jpeg, CAPTURE_QUALITY)
        .encode_image(&rgb)
        .is_err()
        || jpeg.is_empty()
    {
        error!("❌ Failed to encode captured frame");
        return Err(CaptureError::EmptyFrame);
    }

    info!("📷 Captured {}x{} frame ({} bytes)", rgb.width(), rgb.height(), jpeg.len());
    Ok(data_url::encode("image/jpeg", &jpeg))
}
