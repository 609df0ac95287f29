use image::codecs::jpeg::JpegEncoder;
use image::{imageops, imageops::FilterType, GenericImageView, RgbImage};
use tracing::debug;

use super::data_url;
use crate::error::{ReporterError, Result};

/// JPEG quality for thumbnails
const THUMBNAIL_QUALITY: u8 = 92;

/// Where a scaled image lands inside the thumbnail box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f64,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Fit `src` inside `box` without cropping.
/// The scale is `min(box_w / src_w, box_h / src_h)` and the result is centred,
/// leaving bars on the short axis.
pub fn letterbox(src_w: u32, src_h: u32, box_w: u32, box_h: u32) -> Placement {
    let scale = f64::min(
        box_w as f64 / src_w.max(1) as f64,
        box_h as f64 / src_h.max(1) as f64,
    );

    let width = ((src_w as f64 * scale).round() as u32).clamp(1, box_w.max(1));
    let height = ((src_h as f64 * scale).round() as u32).clamp(1, box_h.max(1));

    Placement {
        scale,
        x: (box_w.saturating_sub(width)) / 2,
        y: (box_h.saturating_sub(height)) / 2,
        width,
        height,
    }
}

/// Build a letterboxed JPEG thumbnail from an image data URL
pub fn create_thumbnail(image_url: &str, width: u32, height: u32) -> Result<String> {
    let bytes = data_url::decode_bytes(image_url)?;
    let source = image::load_from_memory(&bytes)?;
    let (src_w, src_h) = source.dimensions();

    let placement = letterbox(src_w, src_h, width, height);
    let scaled = source
        .resize_exact(placement.width, placement.height, FilterType::Triangle)
        .to_rgb8();

    // Bars stay black, as a JPEG of a transparent canvas would
    let mut canvas = RgbImage::new(width, height);
    imageops::overlay(&mut canvas, &scaled, placement.x as i64, placement.y as i64);

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, THUMBNAIL_QUALITY).encode_image(&canvas)?;

    debug!(
        "Thumbnail {}x{} -> {}x{} at ({}, {})",
        src_w, src_h, placement.width, placement.height, placement.x, placement.y
    );
    Ok(data_url::encode("image/jpeg", &jpeg))
}

/// Build thumbnails for every image.
/// Each one is encoded on the blocking pool; the call returns only once all
/// have finished, in the same order as `images`.
pub async fn create_thumbnails(images: Vec<String>, width: u32, height: u32) -> Result<Vec<String>> {
    let handles: Vec<_> = images
        .into_iter()
        .map(|url| tokio::task::spawn_blocking(move || create_thumbnail(&url, width, height)))
        .collect();

    let mut thumbnails = Vec::with_capacity(handles.len());
    for handle in handles {
        let thumbnail = handle
            .await
            .map_err(|e| ReporterError::Io(std::io::Error::other(format!("Task join error: {}", e))))??;
        thumbnails.push(thumbnail);
    }
    Ok(thumbnails)
}


#[cfg(test)]
mod tests {
    use super::samples::png_data_url;
    use super::*;

    #[test]
    fn test_letterbox_wide_source() {
        let p = letterbox(200, 100, 100, 100);
        assert_eq!(p.scale, 0.5);
        assert_eq!((p.width, p.height), (100, 50));
        assert_eq!((p.x, p.y), (0, 25));
    }

    #[test]
    fn test_letterbox_tall_source_upscales() {
        let p = letterbox(20, 40, 100, 100);
        assert_eq!(p.scale, 2.5);
        assert_eq!((p.width, p.height), (50, 100));
        assert_eq!((p.x, p.y), (25, 0));
    }

    #[test]
    fn test_letterbox_matching_aspect_fills_box() {
        let p = letterbox(400, 400, 100, 100);
        assert_eq!((p.x, p.y, p.width, p.height), (0, 0, 100, 100));
    }

    #[test]
    fn test_thumbnail_is_letterboxed_not_cropped() {
        let source = png_data_url(200, 100, [220, 20, 20]);
        let thumb = create_thumbnail(&source, 100, 100).unwrap();

        let (mime, bytes) = data_url::decode(&thumb).unwrap();
        assert_eq!(mime, "image/jpeg");

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (100, 100));

        // Bar above the image
        let bar = decoded.get_pixel(50, 5);
        assert!(bar[0] < 40, "expected dark bar, got {:?}", bar);

        // Image content, full width
        let inside = decoded.get_pixel(50, 50);
        assert!(inside[0] > 180, "expected red content, got {:?}", inside);
        let edge = decoded.get_pixel(2, 50);
        assert!(edge[0] > 180, "expected no horizontal crop, got {:?}", edge);
    }

    #[test]
    fn test_thumbnail_rejects_non_image() {
        let url = data_url::encode("image/png", b"definitely not a png");
        assert!(create_thumbnail(&url, 100, 100).is_err());
    }

    #[tokio::test]
    async fn test_create_thumbnails_keeps_order_and_count() {
        let images = vec![
            png_data_url(10, 10, [255, 0, 0]),
            png_data_url(30, 10, [0, 0, 255]),
            png_data_url(10, 30, [0, 255, 0]),
        ];
        let thumbs = create_thumbnails(images.clone(), 100, 100).await.unwrap();
        assert_eq!(thumbs.len(), images.len());

        let first = data_url::decode_bytes(&thumbs[0]).unwrap();
        let first = image::load_from_memory(&first).unwrap().to_rgb8();
        assert!(first.get_pixel(50, 50)[0] > 180);

        let second = data_url::decode_bytes(&thumbs[1]).unwrap();
        let second = image::load_from_memory(&second).unwrap().to_rgb8();
        assert!(second.get_pixel(50, 50)[2] > 180);
    }

    #[tokio::test]
    async fn test_create_thumbnails_fails_as_a_whole() {
        let images = vec![
            png_data_url(10, 10, [255, 0, 0]),
            "data:image/png;base64,AAAA".to_string(),
        ];
        assert!(create_thumbnails(images, 100, 100).await.is_err());
    }
}
