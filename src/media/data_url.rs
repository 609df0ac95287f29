//! `data:<mime>;base64,<payload>` encoding for images.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;

use crate::error::{ReporterError, Result};

/// Wrap raw bytes into a base64 data URL
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Split a data URL into its MIME type and decoded payload
pub fn decode(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| ReporterError::InvalidDataUrl("missing data: prefix".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ReporterError::InvalidDataUrl("missing payload separator".to_string()))?;

    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| ReporterError::InvalidDataUrl("only base64 payloads are supported".to_string()))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ReporterError::InvalidDataUrl(e.to_string()))?;

    if bytes.is_empty() {
        return Err(ReporterError::InvalidDataUrl("empty payload".to_string()));
    }

    Ok((mime.to_string(), bytes))
}

/// Decoded payload only
pub fn decode_bytes(url: &str) -> Result<Vec<u8>> {
    decode(url).map(|(_, bytes)| bytes)
}

/// Sniff image bytes and return their MIME type, or `None` if they are not an image
pub fn image_mime(bytes: &[u8]) -> Option<&'static str> {
    let format = image::guess_format(bytes).ok()?;
    let mime = match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        _ => return None,
    };
    Some(mime)
}
