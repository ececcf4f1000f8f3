//! Gallery-image scanning: decode a picked image file and feed the result
//! through the same admission path as camera frames.

use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::FilterType;

use super::decode;

/// Images larger than this on either edge are downscaled before decoding;
/// QR finder patterns survive the resize and detection gets much cheaper.
const MAX_DECODE_DIMENSION: u32 = 1280;

pub(crate) fn decode_image_file(path: &Path) -> Result<Option<String>> {
    let img = image::open(path)
        .with_context(|| format!("failed to open image {}", path.display()))?;

    let img = if img.width().max(img.height()) > MAX_DECODE_DIMENSION {
        img.resize(
            MAX_DECODE_DIMENSION,
            MAX_DECODE_DIMENSION,
            FilterType::Triangle,
        )
    } else {
        img
    };

    let luma = img.to_luma8();
    let (width, height) = luma.dimensions();
    Ok(decode::decode_grayscale(
        luma.as_raw(),
        width as usize,
        height as usize,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_error() {
        let result = decode_image_file(Path::new("/nonexistent/quickqr-test.png"));
        assert!(result.is_err());
    }

    #[test]
    fn blank_image_decodes_to_none() {
        let path =
            std::env::temp_dir().join(format!("quickqr-blank-{}.png", uuid::Uuid::new_v4()));
        let blank = image::GrayImage::from_pixel(200, 200, image::Luma([255u8]));
        blank.save(&path).expect("write blank image");

        let decoded = decode_image_file(&path).expect("decode");
        assert_eq!(decoded, None);

        let _ = std::fs::remove_file(path);
    }
}
