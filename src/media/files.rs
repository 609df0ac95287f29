//! Reading picked image files into data URLs.

use std::path::PathBuf;
use tracing::{info, warn};

use super::data_url;

/// Extensions offered by the file picker
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "bmp", "tif"];

/// Result of reading a batch of picked files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileBatch {
    /// Data URLs in the order the files were picked
    pub images: Vec<String>,
    /// Files that could not be read or are not images
    pub skipped: Vec<PathBuf>,
}

/// Read every file and encode it as a data URL.
/// All reads finish before the batch is returned, and results keep the
/// original selection order whatever order the reads complete in.
pub async fn read_image_files(paths: Vec<PathBuf>) -> FileBatch {
    let handles: Vec<_> = paths
        .into_iter()
        .map(|path| tokio::spawn(async move {
            let read = tokio::fs::read(&path).await;
            (path, read)
        }))
        .collect();

    let mut batch = FileBatch::default();
    for handle in handles {
        let (path, read) = match handle.await {
            Ok(result) => result,
            Err(e) => {
                warn!("⚠️  File read task failed: {}", e);
                continue;
            }
        };

        match read {
            Ok(bytes) => match data_url::image_mime(&bytes) {
                Some(mime) => batch.images.push(data_url::encode(mime, &bytes)),
                None => {
                    warn!("⚠️  Skipping non-image file: {}", path.display());
                    batch.skipped.push(path);
                }
            },
            Err(e) => {
                warn!("⚠️  Could not read {}: {}", path.display(), e);
                batch.skipped.push(path);
            }
        }
    }

    info!("🖼️  Read {} images, skipped {}", batch.images.len(), batch.skipped.len());
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::thumbnail::samples::png_data_url;

    #[tokio::test]
    async fn test_reads_in_selection_order_and_skips_non_images() {
        let dir = tempfile::tempdir().unwrap();

        let red = data_url::decode_bytes(&png_data_url(4, 4, [255, 0, 0])).unwrap();
        let blue = data_url::decode_bytes(&png_data_url(8, 2, [0, 0, 255])).unwrap();

        let first = dir.path().join("b_red.png");
        let notes = dir.path().join("notes.txt");
        let second = dir.path().join("a_blue.png");
        std::fs::write(&first, &red).unwrap();
        std::fs::write(&notes, b"not an image").unwrap();
        std::fs::write(&second, &blue).unwrap();

        let missing = dir.path().join("missing.png");
        let batch = read_image_files(vec![
            first.clone(),
            notes.clone(),
            second.clone(),
            missing.clone(),
        ])
        .await;

        assert_eq!(batch.images.len(), 2);
        assert_eq!(data_url::decode_bytes(&batch.images[0]).unwrap(), red);
        assert_eq!(data_url::decode_bytes(&batch.images[1]).unwrap(), blue);
        assert_eq!(batch.skipped, vec![notes, missing]);
    }
}
